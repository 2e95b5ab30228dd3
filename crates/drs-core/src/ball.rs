use serde::{Deserialize, Serialize};

use crate::Vector3;

/// Number of recent positions kept on every [`TrackedBallState`].
pub const HISTORICAL_POSITIONS_LEN: usize = 10;

/// Spin of the ball, as an externally supplied estimate.
///
/// The axis is normalized on deserialization.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "SpinRepr")]
pub struct Spin {
    /// Unit rotation axis
    pub axis: Vector3,
    /// Angular rate \[rad/s]
    pub rate: f64,
}

#[derive(Deserialize)]
struct SpinRepr {
    axis: Vector3,
    rate: f64,
}

impl From<SpinRepr> for Spin {
    fn from(repr: SpinRepr) -> Self {
        Spin::new(repr.axis, repr.rate)
    }
}

impl Spin {
    pub fn new(axis: Vector3, rate: f64) -> Self {
        let axis = axis.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros);
        Self { axis, rate }
    }

    /// Typical seam/swing delivery, used when no estimate is available.
    pub fn nominal() -> Self {
        Self::new(Vector3::new(0.1, 0.8, 0.2), 25.5)
    }

    pub fn none() -> Self {
        Self {
            axis: Vector3::zeros(),
            rate: 0.0,
        }
    }

    /// Angular velocity vector (`rate * axis`).
    pub fn angular_velocity(&self) -> Vector3 {
        self.axis * self.rate
    }
}

impl Default for Spin {
    fn default() -> Self {
        Self::nominal()
    }
}

/// Snapshot of the ball tracker after one processed frame.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackedBallState {
    pub frame_index: u64,
    /// Seconds since the start of the delivery
    pub timestamp: f64,
    pub current_position: Vector3,
    pub velocity: Vector3,
    pub acceleration: Vector3,
    pub spin: Spin,
    /// Confidence of the observation, or the decayed confidence of a prediction
    pub detection_confidence: f64,
    /// Consecutive frames without an accepted observation
    pub lost_frame_count: u32,
    /// Whether this state was extrapolated rather than observed
    pub predicted: bool,
    /// Most recent positions of the current track, oldest first
    pub historical_positions: Vec<Vector3>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_deserialized_axis_is_normalized() {
        let spin: Spin =
            serde_json::from_str(r#"{"axis": [0.0, 2.0, 0.0], "rate": 30.0}"#).unwrap();
        assert_eq!(spin.axis, Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(spin.rate, 30.0);

        let still: Spin =
            serde_json::from_str(r#"{"axis": [0.0, 0.0, 0.0], "rate": 0.0}"#).unwrap();
        assert_eq!(still, Spin::none());
    }

    #[test]
    fn test_nominal_spin_is_normalized() {
        let spin = Spin::nominal();
        assert_relative_eq!(spin.axis.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(spin.rate, 25.5);
        assert!(spin.axis.y > spin.axis.x && spin.axis.y > spin.axis.z);
    }

    #[test]
    fn test_zero_axis() {
        let spin = Spin::new(Vector3::zeros(), 10.0);
        assert_eq!(spin.angular_velocity(), Vector3::zeros());
    }
}
