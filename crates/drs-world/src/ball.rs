use std::collections::VecDeque;

use drs_core::{
    gravity, Spin, TrackedBallState, TrackerSettings, TrackingStrategy, Vector3,
    HISTORICAL_POSITIONS_LEN,
};
use nalgebra::SVector;

use crate::filter::{Kalman, KalmanBuilder, VectorLowPassFilter};

#[derive(Debug, Clone, Copy)]
struct Kinematics {
    position: Vector3,
    velocity: Vector3,
    acceleration: Vector3,
}

impl Kinematics {
    fn from_state(x: &SVector<f64, 9>) -> Self {
        Self {
            position: x.fixed_rows::<3>(0).clone_owned(),
            velocity: x.fixed_rows::<3>(3).clone_owned(),
            acceleration: x.fixed_rows::<3>(6).clone_owned(),
        }
    }
}

/// State estimator for one track.
enum Estimator {
    Kalman(Kalman<3, 9>),
    FiniteDifference {
        position: Vector3,
        velocity: VectorLowPassFilter,
        acceleration: VectorLowPassFilter,
    },
}

impl Estimator {
    fn start(settings: &TrackerSettings, position: Vector3, t: f64) -> Self {
        match settings.strategy {
            TrackingStrategy::Kalman => Estimator::Kalman(
                KalmanBuilder::new(
                    settings.initial_var,
                    settings.measurement_var,
                    settings.process_noise_var,
                )
                .build_ball(position, settings.gravity, t),
            ),
            TrackingStrategy::FiniteDifference => Estimator::FiniteDifference {
                position,
                velocity: VectorLowPassFilter::with_initial(
                    settings.blend_factor,
                    Vector3::zeros(),
                ),
                acceleration: VectorLowPassFilter::with_initial(
                    settings.blend_factor,
                    gravity(settings.gravity),
                ),
            },
        }
    }

    fn kinematics(&self) -> Kinematics {
        match self {
            Estimator::Kalman(kf) => Kinematics::from_state(kf.state()),
            Estimator::FiniteDifference {
                position,
                velocity,
                acceleration,
            } => Kinematics {
                position: *position,
                velocity: velocity.value().unwrap_or_else(Vector3::zeros),
                acceleration: acceleration.value().unwrap_or_else(Vector3::zeros),
            },
        }
    }

    fn observe(&mut self, measured: Vector3, t: f64, dt: f64) -> Kinematics {
        match self {
            Estimator::Kalman(kf) => {
                kf.update(measured, t);
            }
            Estimator::FiniteDifference {
                position,
                velocity,
                acceleration,
            } => {
                let prev_velocity = velocity.value().unwrap_or_else(Vector3::zeros);
                let new_velocity = velocity.update((measured - *position) / dt);
                acceleration.update((new_velocity - prev_velocity) / dt);
                *position = measured;
            }
        }
        self.kinematics()
    }

    fn predict(&mut self, t: f64, dt: f64) -> Kinematics {
        match self {
            Estimator::Kalman(kf) => {
                if kf.predict(t).is_none() {
                    log::warn!("Ball filter asked to predict into the past (t={:.3})", t);
                }
            }
            Estimator::FiniteDifference {
                position,
                velocity,
                acceleration,
            } => {
                let v = velocity.value().unwrap_or_else(Vector3::zeros);
                let a = acceleration.value().unwrap_or_else(Vector3::zeros);
                *position += v * dt + a * (0.5 * dt * dt);
                velocity.set(v + a * dt);
            }
        }
        self.kinematics()
    }
}

/// Tracker for the ball during one delivery.
///
/// Every call to [`observe`](BallTracker::observe) or [`missing`](BallTracker::missing)
/// consumes one frame. Emitted snapshots are appended to a bounded per-delivery history.
pub struct BallTracker {
    settings: TrackerSettings,
    /// Index of the first frame of the delivery
    start_frame: u64,
    /// Index of the frame consumed by the next call
    next_frame: u64,
    /// `None` while not tracking
    estimator: Option<Estimator>,
    spin: Spin,
    lost_frame_count: u32,
    /// Recent positions of the current track
    recent_positions: VecDeque<Vector3>,
    history: VecDeque<TrackedBallState>,
}

impl BallTracker {
    /// Create a new BallTracker whose first frame has index 0.
    pub fn new(settings: &TrackerSettings) -> Self {
        Self::starting_at(settings, 0)
    }

    /// Create a new BallTracker whose first frame has index `frame_index`.
    pub fn starting_at(settings: &TrackerSettings, frame_index: u64) -> Self {
        Self {
            settings: settings.clone(),
            start_frame: frame_index,
            next_frame: frame_index,
            estimator: None,
            spin: Spin::nominal(),
            lost_frame_count: 0,
            recent_positions: VecDeque::with_capacity(HISTORICAL_POSITIONS_LEN),
            history: VecDeque::new(),
        }
    }

    /// Takes effect with the next track.
    pub fn update_settings(&mut self, settings: &TrackerSettings) {
        self.settings = settings.clone();
    }

    pub fn set_spin(&mut self, spin: Spin) {
        self.spin = spin;
    }

    pub fn spin(&self) -> Spin {
        self.spin
    }

    /// Whether a track is active. Turns false once more than `max_lost_frames`
    /// consecutive frames went by without an accepted observation.
    pub fn is_tracking(&self) -> bool {
        self.estimator.is_some()
    }

    pub fn lost_frame_count(&self) -> u32 {
        self.lost_frame_count
    }

    /// Index of the frame the next call will consume.
    pub fn next_frame_index(&self) -> u64 {
        self.next_frame
    }

    /// Most recently emitted snapshot.
    pub fn get(&self) -> Option<&TrackedBallState> {
        self.history.back()
    }

    /// All snapshots emitted during this delivery, oldest first.
    pub fn history(&self) -> &VecDeque<TrackedBallState> {
        &self.history
    }

    /// Forget everything and start a new delivery at `frame_index`.
    pub fn reset(&mut self, frame_index: u64) {
        self.start_frame = frame_index;
        self.next_frame = frame_index;
        self.estimator = None;
        self.lost_frame_count = 0;
        self.recent_positions.clear();
        self.history.clear();
    }

    /// Feed a position estimate for the current frame.
    ///
    /// Observations below the confidence threshold, or with non-finite coordinates,
    /// are handled exactly like a missing frame.
    pub fn observe(&mut self, position: Vector3, confidence: f64) -> Option<TrackedBallState> {
        if !(confidence >= self.settings.min_confidence) || !position.iter().all(|c| c.is_finite())
        {
            log::debug!(
                "Rejected ball observation at frame {} (confidence {:.2})",
                self.next_frame,
                confidence
            );
            return self.missing();
        }

        let (frame, t) = self.advance();
        let dt = self.settings.dt();
        let kinematics = match self.estimator.as_mut() {
            Some(estimator) => estimator.observe(position, t, dt),
            None => {
                log::debug!("Ball tracker received first data at frame {}", frame);
                let estimator = Estimator::start(&self.settings, position, t);
                let kinematics = estimator.kinematics();
                self.estimator = Some(estimator);
                kinematics
            }
        };
        self.lost_frame_count = 0;
        Some(self.emit(frame, t, kinematics, confidence, false))
    }

    /// Signal that the current frame has no usable observation.
    ///
    /// Returns an extrapolated state while the track survives. Does nothing but
    /// consume the frame when no track is active.
    pub fn missing(&mut self) -> Option<TrackedBallState> {
        let (frame, t) = self.advance();
        self.estimator.as_ref()?;

        self.lost_frame_count += 1;
        if self.lost_frame_count > self.settings.max_lost_frames {
            log::warn!(
                "Lost ball track at frame {} after {} frames without observation",
                frame,
                self.lost_frame_count
            );
            self.estimator = None;
            self.recent_positions.clear();
            return None;
        }

        let dt = self.settings.dt();
        let kinematics = self.estimator.as_mut()?.predict(t, dt);
        let confidence = (0.9 - 0.08 * self.lost_frame_count as f64).max(0.1);
        Some(self.emit(frame, t, kinematics, confidence, true))
    }

    /// Consume every frame before `frame_index` as a missing frame.
    ///
    /// Once no track is active the remaining frames are skipped without stepping the
    /// estimator, so the cost is bounded by `max_lost_frames`. Returns the extrapolated
    /// states emitted on the way.
    pub fn skip_to(&mut self, frame_index: u64) -> Vec<TrackedBallState> {
        let mut states = Vec::new();
        while self.next_frame < frame_index && self.is_tracking() {
            states.extend(self.missing());
        }
        self.next_frame = self.next_frame.max(frame_index);
        states
    }

    fn advance(&mut self) -> (u64, f64) {
        let frame = self.next_frame;
        self.next_frame += 1;
        let t = (frame - self.start_frame) as f64 * self.settings.dt();
        (frame, t)
    }

    fn emit(
        &mut self,
        frame_index: u64,
        timestamp: f64,
        kinematics: Kinematics,
        confidence: f64,
        predicted: bool,
    ) -> TrackedBallState {
        if self.recent_positions.len() == HISTORICAL_POSITIONS_LEN {
            self.recent_positions.pop_front();
        }
        self.recent_positions.push_back(kinematics.position);

        let state = TrackedBallState {
            frame_index,
            timestamp,
            current_position: kinematics.position,
            velocity: kinematics.velocity,
            acceleration: kinematics.acceleration,
            spin: self.spin,
            detection_confidence: confidence,
            lost_frame_count: self.lost_frame_count,
            predicted,
            historical_positions: self.recent_positions.iter().copied().collect(),
        };

        if self.history.len() >= self.settings.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(state.clone());
        state
    }
}
