mod decision;

pub use decision::{adjudicate, decide, is_inline};

use anyhow::Result;
use drs_core::{
    DecisionResult, DeliveryInput, FrameInput, ReviewSettings, Spin, Termination,
    TrackedBallState, TrajectoryPoint, Vector3, WicketRegion,
};
use drs_simulator::{simulate, LaunchState};
use drs_world::{DeliveryTracker, FrameStats};
use serde::{Deserialize, Serialize};

/// Outcome of a completed review.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReviewReport {
    pub delivery_id: String,
    pub decision: DecisionResult,
    /// `None` if the review stopped before the check could be made
    pub inline: Option<bool>,
    pub edge_detected: bool,
    pub wicket_hit: Option<bool>,
    pub bounce_frame: Option<u64>,
    pub impact_frame: Option<u64>,
    pub impact_position: Option<Vector3>,
    /// Predicted flight from the last free-flight state towards the stumps
    pub trajectory: Vec<TrajectoryPoint>,
    pub termination: Option<Termination>,
    pub wicket: Option<WicketRegion>,
    pub frames: FrameStats,
}

/// Review pipeline for one delivery.
///
/// Frames are fed in order through [`process_frame`](DeliveryReview::process_frame);
/// [`finish`](DeliveryReview::finish) then runs impact detection, trajectory prediction
/// and the decision.
pub struct DeliveryReview {
    delivery_id: String,
    settings: ReviewSettings,
    tracker: DeliveryTracker,
    edge_detected: bool,
}

impl DeliveryReview {
    /// Fails if `settings` do not pass [`ReviewSettings::validate`].
    pub fn new(delivery_id: impl Into<String>, settings: &ReviewSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            delivery_id: delivery_id.into(),
            settings: settings.clone(),
            tracker: DeliveryTracker::new(settings),
            edge_detected: false,
        })
    }

    pub fn set_spin(&mut self, spin: Spin) {
        self.tracker.set_spin(spin);
    }

    pub fn set_edge_detected(&mut self, edge_detected: bool) {
        self.edge_detected = edge_detected;
    }

    pub fn process_frame(&mut self, frame: &FrameInput) -> Option<TrackedBallState> {
        self.tracker.update(frame)
    }

    pub fn tracker(&self) -> &DeliveryTracker {
        &self.tracker
    }

    pub fn finish(self) -> ReviewReport {
        let wicket = self.tracker.wicket().cloned();
        let history = self.tracker.history();
        let analysis = self.tracker.impact();

        let mut report = ReviewReport {
            delivery_id: self.delivery_id.clone(),
            decision: DecisionResult::indeterminate(),
            inline: None,
            edge_detected: self.edge_detected,
            wicket_hit: None,
            bounce_frame: None,
            impact_frame: None,
            impact_position: None,
            trajectory: Vec::new(),
            termination: None,
            wicket: wicket.clone(),
            frames: self.tracker.stats(),
        };

        let Some(analysis) = analysis else {
            log::info!("[{}] ball never observed, review is indeterminate", self.delivery_id);
            return report;
        };
        let impact = &history[analysis.impact];
        report.bounce_frame = analysis.bounce.map(|i| history[i].frame_index);
        report.impact_frame = Some(impact.frame_index);
        report.impact_position = Some(impact.current_position);

        let Some(wicket) = wicket else {
            report.decision = adjudicate(
                Some(&impact.current_position),
                None,
                self.edge_detected,
                false,
                &self.settings.decision,
            );
            return report;
        };

        let launch = LaunchState::from_tracked(&history[analysis.launch_index()]);
        let trajectory = simulate(&launch, wicket.base_center.z, &self.settings.simulation);
        let wicket_hit = trajectory.hits_wicket(
            &wicket,
            self.settings.decision.wicket_half_width,
            self.settings.simulation.ball_radius,
        );
        if trajectory.termination == Termination::IterationLimit {
            log::info!(
                "[{}] predicted path never reaches the stumps",
                self.delivery_id
            );
        }

        report.inline = Some(is_inline(
            &impact.current_position,
            &wicket,
            self.settings.decision.inline_tolerance,
        ));
        report.wicket_hit = Some(wicket_hit);
        report.decision = adjudicate(
            Some(&impact.current_position),
            Some(&wicket),
            self.edge_detected,
            wicket_hit,
            &self.settings.decision,
        );
        report.termination = Some(trajectory.termination);
        report.trajectory = trajectory.points;

        log::info!("[{}] decision: {}", self.delivery_id, report.decision);
        report
    }
}

/// Run a complete delivery through a fresh pipeline.
pub fn review_delivery(input: &DeliveryInput, settings: &ReviewSettings) -> Result<ReviewReport> {
    let mut review = DeliveryReview::new(input.delivery_id.clone(), settings)?;
    review.set_spin(input.spin.unwrap_or_else(Spin::nominal));
    review.set_edge_detected(input.edge_detected);
    for frame in &input.frames {
        review.process_frame(frame);
    }
    Ok(review.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use drs_core::{
        BallDetection, DecisionReason, PixelBox, StumpDetection, TrackingStrategy, Vector2,
    };

    const FOCAL: f64 = 1920.0;

    fn ball_at(pos: Vector3) -> BallDetection {
        BallDetection {
            pixel_center: Vector2::new(
                960.0 + pos.x / pos.z * 960.0,
                540.0 - pos.y / pos.z * 540.0,
            ),
            pixel_radius: FOCAL * 0.072 / pos.z / 2.0,
            confidence: 0.9,
        }
    }

    /// Stump box whose base lies at (0, 0, 10).
    fn stumps() -> Vec<StumpDetection> {
        let h = FOCAL * 0.71 / 10.0;
        vec![StumpDetection {
            pixel_bbox: PixelBox::new(950.0, 540.0 - h, 20.0, h),
            confidence: 0.95,
        }]
    }

    /// Ball travelling at 15 m/s towards the stumps at depth 10, last seen at 9.95.
    fn delivery(x: f64, edge_detected: bool) -> DeliveryInput {
        let frames = (0..4u64)
            .map(|i| {
                let mut frame = FrameInput::empty(i, i as f64 / 30.0);
                frame.ball_detection = Some(ball_at(Vector3::new(x, 0.3, 8.45 + 0.5 * i as f64)));
                frame.stump_detections = stumps();
                frame
            })
            .collect();
        DeliveryInput {
            delivery_id: "test".to_string(),
            edge_detected,
            spin: None,
            frames,
        }
    }

    fn settings() -> ReviewSettings {
        let mut settings = ReviewSettings::default();
        settings.tracker.strategy = TrackingStrategy::FiniteDifference;
        settings
    }

    #[test]
    fn test_straight_delivery_is_out() {
        let report = review_delivery(&delivery(0.0, false), &settings()).unwrap();
        assert_eq!(report.decision, DecisionResult::out());
        assert_eq!(report.inline, Some(true));
        assert_eq!(report.wicket_hit, Some(true));
        assert_eq!(report.bounce_frame, None);
        assert_eq!(report.impact_frame, Some(3));
        assert_eq!(report.termination, Some(Termination::ReachedStumpPlane));
        assert!(report.trajectory.len() >= 2);
        assert_eq!(report.frames.observed, 4);
    }

    #[test]
    fn test_edge_overrides_hit() {
        let report = review_delivery(&delivery(0.0, true), &settings()).unwrap();
        assert_eq!(
            report.decision,
            DecisionResult::not_out(DecisionReason::EdgeDetected)
        );
    }

    #[test]
    fn test_wide_delivery_is_not_inline() {
        let report = review_delivery(&delivery(1.0, false), &settings()).unwrap();
        assert_eq!(
            report.decision,
            DecisionResult::not_out(DecisionReason::NotInline)
        );
        assert_eq!(report.inline, Some(false));
    }

    #[test]
    fn test_no_wicket_is_indeterminate() {
        let mut input = delivery(0.0, false);
        for frame in &mut input.frames {
            frame.stump_detections.clear();
        }
        let report = review_delivery(&input, &settings()).unwrap();
        assert!(report.decision.is_indeterminate());
        assert!(report.wicket.is_none());
        assert_eq!(report.impact_frame, Some(3));
        assert!(report.trajectory.is_empty());
    }

    #[test]
    fn test_no_ball_is_indeterminate() {
        let mut input = delivery(0.0, false);
        for frame in &mut input.frames {
            frame.ball_detection = None;
        }
        let report = review_delivery(&input, &settings()).unwrap();
        assert!(report.decision.is_indeterminate());
        assert!(report.wicket.is_some());
        assert_eq!(report.frames.processed, 4);
        assert_eq!(report.frames.observed, 0);
    }

    #[test]
    fn test_diverging_prediction_misses() {
        let mut settings = settings();
        settings.simulation.time_step = 1e-6;
        settings.simulation.max_iterations = 1;
        let report = review_delivery(&delivery(0.0, false), &settings).unwrap();
        assert_eq!(report.termination, Some(Termination::IterationLimit));
        assert_eq!(
            report.decision,
            DecisionResult::not_out(DecisionReason::MissingWicket)
        );
    }

    #[test]
    fn test_incremental_review() {
        let input = delivery(0.0, false);
        let mut review = DeliveryReview::new("incremental", &settings()).unwrap();
        review.set_spin(Spin::none());
        for frame in &input.frames {
            assert!(review.process_frame(frame).is_some());
        }
        assert!(review.tracker().is_tracking());
        let report = review.finish();
        assert_eq!(report.delivery_id, "incremental");
        assert_eq!(report.decision, DecisionResult::out());
    }

    #[test]
    fn test_report_serializes() {
        let report = review_delivery(&delivery(0.0, false), &settings()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["decision"]["reason"], "OUT");
        assert_eq!(json["decision"]["out"], true);
    }

    fn frame_at(index: u64, ball: Option<Vector3>) -> FrameInput {
        let mut frame = FrameInput::empty(index, index as f64 / 30.0);
        frame.ball_detection = ball.map(ball_at);
        frame.stump_detections = stumps();
        frame
    }

    fn input(frames: Vec<FrameInput>) -> DeliveryInput {
        DeliveryInput {
            delivery_id: "test".to_string(),
            edge_detected: false,
            spin: None,
            frames,
        }
    }

    #[test]
    fn test_ball_hidden_behind_pad() {
        // seen for four frames, then occluded while the tracker extrapolates
        let mut occluded = delivery(0.0, false);
        occluded.frames.extend((4..10).map(|i| frame_at(i, None)));

        let report = review_delivery(&occluded, &settings()).unwrap();
        assert_eq!(report.impact_frame, Some(3));
        assert_relative_eq!(report.impact_position.unwrap().z, 9.95, epsilon = 1e-6);
        assert_eq!(report.frames.observed, 4);
        assert_eq!(report.frames.predicted, 6);
        assert_eq!(report.decision, DecisionResult::out());
        assert_relative_eq!(report.trajectory[0].position.z, 9.95, epsilon = 1e-6);
    }

    #[test]
    fn test_bounce_then_pad() {
        let path = [
            (1.0, 7.5),
            (0.6, 8.0),
            (0.05, 8.5),
            (0.3, 9.0),
            (0.45, 9.5),
            (0.5, 9.98),
            // comes back off the pad
            (0.5, 9.95),
        ];
        let frames = path
            .iter()
            .enumerate()
            .map(|(i, &(y, z))| frame_at(i as u64, Some(Vector3::new(0.0, y, z))))
            .collect();

        let report = review_delivery(&input(frames), &settings()).unwrap();
        assert_eq!(report.bounce_frame, Some(2));
        assert_eq!(report.impact_frame, Some(6));
        assert_eq!(report.inline, Some(true));
        // launched from the last frame before contact
        assert_relative_eq!(report.trajectory[0].position.z, 9.98, epsilon = 1e-6);
        assert_eq!(report.termination, Some(Termination::ReachedStumpPlane));
        assert_eq!(report.decision, DecisionResult::out());
    }

    #[test]
    fn test_track_lost_mid_delivery() {
        // a stationary false track far from the stumps, lost, then the real delivery
        let mut frames: Vec<FrameInput> = (0..4)
            .map(|i| frame_at(i, Some(Vector3::new(0.0, 0.3, 5.0))))
            .collect();
        frames.extend((4..15).map(|i| frame_at(i, None)));
        frames.extend((0..4u64).map(|i| {
            frame_at(15 + i, Some(Vector3::new(0.0, 0.3, 8.45 + 0.5 * i as f64)))
        }));

        let mut review = DeliveryReview::new("lost", &settings()).unwrap();
        for frame in &frames {
            review.process_frame(frame);
        }
        assert!(review.tracker().is_tracking());
        let report = review.finish();
        assert_eq!(report.frames.observed, 8);
        assert_eq!(report.frames.predicted, 10);
        assert_eq!(report.bounce_frame, None);
        assert_eq!(report.impact_frame, Some(18));
        assert_eq!(report.decision, DecisionResult::out());
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let mut bad_blend = settings();
        bad_blend.tracker.blend_factor = 1.5;
        assert!(review_delivery(&delivery(0.0, false), &bad_blend).is_err());

        let mut no_frame_rate = settings();
        no_frame_rate.tracker.frame_rate = 0.0;
        assert!(DeliveryReview::new("bad", &no_frame_rate).is_err());
    }
}
