use serde::{Deserialize, Serialize};

use crate::{PixelBox, Spin, Vector2};

/// Ball detection produced by an upstream detector.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BallDetection {
    pub pixel_center: Vector2,
    pub pixel_radius: f64,
    pub confidence: f64,
}

/// A single detected stump.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StumpDetection {
    pub pixel_bbox: PixelBox,
    pub confidence: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PadSide {
    Left,
    Right,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PadDetection {
    pub pixel_bbox: PixelBox,
    pub side: PadSide,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatDetection {
    pub pixel_bbox: PixelBox,
}

/// All detections for one video frame.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FrameInput {
    pub frame_index: u64,
    /// Capture time in seconds
    pub timestamp: f64,
    #[serde(default)]
    pub ball_detection: Option<BallDetection>,
    #[serde(default)]
    pub stump_detections: Vec<StumpDetection>,
    #[serde(default)]
    pub pad_detections: Option<Vec<PadDetection>>,
    #[serde(default)]
    pub bat_detection: Option<BatDetection>,
    /// Per-bail dislodged flags from an upstream bail monitor
    #[serde(default)]
    pub bails_dislodged: Option<[bool; 2]>,
}

impl FrameInput {
    /// A frame without any detections.
    pub fn empty(frame_index: u64, timestamp: f64) -> Self {
        Self {
            frame_index,
            timestamp,
            ball_detection: None,
            stump_detections: Vec::new(),
            pad_detections: None,
            bat_detection: None,
            bails_dislodged: None,
        }
    }
}

/// A complete delivery submitted for review.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeliveryInput {
    pub delivery_id: String,
    /// Whether an external edge detector heard bat contact before the pad
    #[serde(default)]
    pub edge_detected: bool,
    /// Spin estimate. [`Spin::nominal`] is used when absent.
    #[serde(default)]
    pub spin: Option<Spin>,
    pub frames: Vec<FrameInput>,
}
