use std::{fs, path::Path};

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::STANDARD_GRAVITY;

/// Settings for the [`CameraModel`](crate::CameraModel).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Frame width in pixels.
    pub frame_width: f64,
    /// Frame height in pixels.
    pub frame_height: f64,
    /// Focal length in pixels. Defaults to the frame width.
    pub focal_length: Option<f64>,
}

impl CameraSettings {
    pub fn focal_length(&self) -> f64 {
        self.focal_length.unwrap_or(self.frame_width)
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            frame_width: 1920.0,
            frame_height: 1080.0,
            focal_length: None,
        }
    }
}

/// How the ball tracker turns positions into velocity and acceleration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingStrategy {
    /// Constant-acceleration Kalman filter
    #[default]
    Kalman,
    /// Blended finite differences between consecutive positions
    FiniteDifference,
}

/// Settings for the ball tracker.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerSettings {
    pub strategy: TrackingStrategy,
    /// Camera frame rate in Hz. One processed frame advances time by `1 / frame_rate`.
    pub frame_rate: f64,
    /// Observations below this confidence are handled as missing.
    pub min_confidence: f64,
    /// Number of consecutive missing frames after which the track is lost.
    pub max_lost_frames: u32,
    /// Initial variance of every state component for the Kalman filter.
    pub initial_var: f64,
    /// Transition variance for the Kalman filter.
    pub process_noise_var: f64,
    /// Measurement variance for the Kalman filter.
    pub measurement_var: f64,
    /// Weight of the newest finite-difference estimate against the previous smoothed
    /// value.
    pub blend_factor: f64,
    /// Maximum number of snapshots kept for one delivery.
    pub history_capacity: usize,
    /// Gravitational acceleration in m/s².
    pub gravity: f64,
}

impl TrackerSettings {
    /// Time between two frames, in seconds.
    pub fn dt(&self) -> f64 {
        1.0 / self.frame_rate
    }
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            strategy: TrackingStrategy::Kalman,
            frame_rate: 30.0,
            min_confidence: 0.5,
            max_lost_frames: 10,
            initial_var: 1.0,
            process_noise_var: 0.01,
            measurement_var: 0.1,
            blend_factor: 0.7,
            history_capacity: 300,
            gravity: STANDARD_GRAVITY,
        }
    }
}

/// Settings for the wicket tracker.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WicketSettings {
    /// Frames between two refreshes of the cached region.
    pub refresh_interval: u64,
    /// Stump detections below this confidence are ignored.
    pub min_confidence: f64,
    /// Stump height in meters.
    pub stump_height: f64,
    /// Distance between neighbouring stumps, in meters.
    pub stump_spacing: f64,
    /// Ratio between the inferred wicket height and the tallest pad, in pixels.
    pub pad_height_ratio: f64,
}

impl Default for WicketSettings {
    fn default() -> Self {
        Self {
            refresh_interval: 30,
            min_confidence: 0.5,
            stump_height: 0.71,
            stump_spacing: 0.11,
            pad_height_ratio: 2.0,
        }
    }
}

/// Settings for bounce and impact detection.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactSettings {
    /// Minimum drop in height, in meters, before a local minimum counts as a bounce.
    pub min_bounce_drop: f64,
}

impl Default for ImpactSettings {
    fn default() -> Self {
        Self {
            min_bounce_drop: 0.3,
        }
    }
}

/// Settings for the trajectory simulator.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Integration step in seconds.
    pub time_step: f64,
    /// Upper bound on integration steps.
    pub max_iterations: usize,
    /// kg/m³
    pub air_density: f64,
    pub drag_coefficient: f64,
    /// Ball radius in meters.
    pub ball_radius: f64,
    /// Ball mass in kg.
    pub ball_mass: f64,
    /// Scale of the Magnus acceleration.
    pub magnus_coefficient: f64,
    /// Gravitational acceleration in m/s².
    pub gravity: f64,
}

impl SimulationSettings {
    /// Same settings without drag and spin effects.
    pub fn vacuum(&self) -> Self {
        Self {
            drag_coefficient: 0.0,
            magnus_coefficient: 0.0,
            ..self.clone()
        }
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            time_step: 0.01,
            max_iterations: 1000,
            air_density: 1.225,
            drag_coefficient: 0.47,
            ball_radius: 0.036,
            ball_mass: 0.16,
            magnus_coefficient: 0.005,
            gravity: STANDARD_GRAVITY,
        }
    }
}

/// Settings for the decision engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionSettings {
    /// Maximum lateral distance, in meters, between impact and wicket for the impact
    /// to count as inline (exclusive).
    pub inline_tolerance: f64,
    /// Half width of the wicket envelope used for the wicket-hit test, in meters.
    pub wicket_half_width: f64,
}

impl Default for DecisionSettings {
    fn default() -> Self {
        Self {
            inline_tolerance: 0.2,
            wicket_half_width: 0.2,
        }
    }
}

/// Settings for a full delivery review.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewSettings {
    pub camera: CameraSettings,
    pub tracker: TrackerSettings,
    pub wicket: WicketSettings,
    pub impact: ImpactSettings,
    pub simulation: SimulationSettings,
    pub decision: DecisionSettings,
}

impl ReviewSettings {
    /// Load the review settings from a file, or store the default settings if the file
    /// does not exist. Falls back to the defaults if the file cannot be parsed.
    pub fn load_or_insert(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => Ok(settings),
                Err(err) => {
                    log::error!("Failed to parse review settings: {}", err);
                    Ok(Self::default())
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let settings = Self::default();
                if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                    fs::create_dir_all(dir).with_context(|| {
                        format!("Failed to create settings directory {}", dir.display())
                    })?;
                }
                fs::write(path, serde_json::to_string_pretty(&settings)?)
                    .with_context(|| format!("Failed to write review settings to {}", path.display()))?;
                log::info!("Wrote default review settings to {}", path.display());
                Ok(settings)
            }
            Err(err) => Err(err)
                .with_context(|| format!("Failed to read review settings from {}", path.display())),
        }
    }

    /// Store the review settings in the given file.
    pub async fn store(&self, path: impl AsRef<Path>) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path.as_ref(), contents)
            .await
            .with_context(|| format!("Failed to write review settings to {}", path.as_ref().display()))
    }

    /// Reject values that make the pipeline meaningless.
    pub fn validate(&self) -> Result<()> {
        let camera = &self.camera;
        ensure!(
            camera.frame_width > 0.0 && camera.frame_height > 0.0,
            "frame dimensions must be positive"
        );
        ensure!(camera.focal_length() > 0.0, "focal length must be positive");

        let tracker = &self.tracker;
        ensure!(tracker.frame_rate > 0.0, "frame rate must be positive");
        ensure!(
            (0.0..=1.0).contains(&tracker.min_confidence),
            "tracker min_confidence must be in [0, 1]"
        );
        ensure!(
            (0.0..=1.0).contains(&tracker.blend_factor),
            "blend factor must be in [0, 1]"
        );
        ensure!(
            tracker.initial_var > 0.0 && tracker.measurement_var > 0.0,
            "filter variances must be positive"
        );
        ensure!(tracker.process_noise_var >= 0.0, "process noise must not be negative");
        ensure!(tracker.history_capacity > 0, "history capacity must be positive");

        let wicket = &self.wicket;
        ensure!(wicket.refresh_interval > 0, "wicket refresh interval must be positive");
        ensure!(wicket.stump_height > 0.0, "stump height must be positive");
        ensure!(wicket.pad_height_ratio > 0.0, "pad height ratio must be positive");

        ensure!(
            self.impact.min_bounce_drop >= 0.0,
            "minimum bounce drop must not be negative"
        );

        let sim = &self.simulation;
        ensure!(sim.time_step > 0.0, "simulation time step must be positive");
        ensure!(sim.max_iterations > 0, "simulation needs at least one iteration");
        ensure!(
            sim.ball_mass > 0.0 && sim.ball_radius > 0.0,
            "ball mass and radius must be positive"
        );

        ensure!(
            self.decision.inline_tolerance > 0.0 && self.decision.wicket_half_width > 0.0,
            "decision tolerances must be positive"
        );
        Ok(())
    }
}
