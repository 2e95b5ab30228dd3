use std::collections::VecDeque;

mod ball;
mod bounce;
mod filter;
mod utils;
mod wicket;

pub use ball::BallTracker;
pub use bounce::{detect_bounce, detect_impact, ImpactAnalysis};
pub use wicket::WicketTracker;

use drs_core::{
    CameraModel, FrameInput, ReferenceObject, ReviewSettings, Spin, TrackedBallState,
    WicketRegion,
};
use serde::{Deserialize, Serialize};

/// Frame counters for one delivery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameStats {
    /// Frames handed to the tracker, including gap frames
    pub processed: u64,
    /// Frames that produced an observed ball state
    pub observed: u64,
    /// Frames that produced an extrapolated ball state
    pub predicted: u64,
    /// Frames dropped because they arrived out of order
    pub skipped: u64,
}

/// Tracks the ball and the wicket over the frames of a single delivery.
///
/// Each delivery gets its own instance; nothing is shared between deliveries.
pub struct DeliveryTracker {
    camera: CameraModel,
    settings: ReviewSettings,
    ball_tracker: Option<BallTracker>,
    wicket_tracker: WicketTracker,
    spin: Spin,
    /// Index of the last processed frame
    last_frame: Option<u64>,
    stats: FrameStats,
}

impl DeliveryTracker {
    pub fn new(settings: &ReviewSettings) -> Self {
        let camera = CameraModel::new(&settings.camera);
        Self {
            wicket_tracker: WicketTracker::new(camera.clone(), &settings.wicket),
            camera,
            settings: settings.clone(),
            ball_tracker: None,
            spin: Spin::nominal(),
            last_frame: None,
            stats: FrameStats::default(),
        }
    }

    /// Set the spin estimate attached to every ball state.
    pub fn set_spin(&mut self, spin: Spin) {
        self.spin = spin;
        if let Some(ball_tracker) = self.ball_tracker.as_mut() {
            ball_tracker.set_spin(spin);
        }
    }

    /// Process the detections of one frame.
    ///
    /// Frames must arrive in order. Gaps in the frame index are filled with missing
    /// frames; frames at or before the last processed index are dropped.
    pub fn update(&mut self, frame: &FrameInput) -> Option<TrackedBallState> {
        if let Some(last) = self.last_frame {
            if frame.frame_index <= last {
                log::warn!(
                    "Dropping frame {} (already processed up to {})",
                    frame.frame_index,
                    last
                );
                self.stats.skipped += 1;
                return None;
            }
        }
        self.last_frame = Some(frame.frame_index);

        let spin = self.spin;
        let tracker_settings = &self.settings.tracker;
        let ball_tracker = self.ball_tracker.get_or_insert_with(|| {
            let mut tracker = BallTracker::starting_at(tracker_settings, frame.frame_index);
            tracker.set_spin(spin);
            tracker
        });

        let gap = frame.frame_index.saturating_sub(ball_tracker.next_frame_index());
        if gap > 0 {
            log::debug!(
                "No input for frames {}..{}",
                ball_tracker.next_frame_index(),
                frame.frame_index
            );
        }
        let gap_predicted = ball_tracker.skip_to(frame.frame_index).len() as u64;

        let state = match &frame.ball_detection {
            Some(detection) => {
                let position = self.camera.estimate_object(
                    detection.pixel_center,
                    2.0 * detection.pixel_radius,
                    ReferenceObject::Ball,
                );
                ball_tracker.observe(position, detection.confidence)
            }
            None => ball_tracker.missing(),
        };

        self.stats.processed += gap + 1;
        self.stats.predicted += gap_predicted;
        match &state {
            Some(s) if s.predicted => self.stats.predicted += 1,
            Some(_) => self.stats.observed += 1,
            None => {}
        }

        if frame.bat_detection.is_some() {
            log::trace!("Bat visible at frame {}", frame.frame_index);
        }
        self.wicket_tracker.update(
            frame.frame_index,
            &frame.stump_detections,
            frame.pad_detections.as_deref(),
            frame.bails_dislodged,
        );

        state
    }

    /// All ball states of this delivery, oldest first.
    pub fn history(&self) -> Vec<TrackedBallState> {
        self.ball_tracker
            .as_ref()
            .map(|t| t.history().iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn history_ref(&self) -> Option<&VecDeque<TrackedBallState>> {
        self.ball_tracker.as_ref().map(|t| t.history())
    }

    pub fn is_tracking(&self) -> bool {
        self.ball_tracker.as_ref().map_or(false, |t| t.is_tracking())
    }

    pub fn wicket(&self) -> Option<&WicketRegion> {
        self.wicket_tracker.get()
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Locate bounce and impact in the states tracked so far.
    pub fn impact(&self) -> Option<ImpactAnalysis> {
        let history = self.history_ref()?;
        ImpactAnalysis::from_history(history, self.settings.impact.min_bounce_drop)
    }
}
