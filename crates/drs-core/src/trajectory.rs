use serde::{Deserialize, Serialize};

use crate::Vector3;

/// One step of a simulated trajectory.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    /// Seconds since the launch state
    pub time_offset: f64,
    pub position: Vector3,
    pub velocity: Vector3,
}

/// Why a simulation stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The ball crossed (or touched) the stump plane
    ReachedStumpPlane,
    /// The iteration bound was hit, or the state stopped being finite
    IterationLimit,
}

/// Depth-axis crossing of the segment `a -> b` with the plane `z = depth`.
///
/// Returns the interpolated crossing point, or `None` if both points lie strictly on
/// the same side of the plane.
pub fn plane_crossing(a: &Vector3, b: &Vector3, depth: f64) -> Option<Vector3> {
    let da = a.z - depth;
    let db = b.z - depth;
    if da * db > 0.0 {
        return None;
    }
    if da == db {
        // segment lies in the plane
        return Some(*a);
    }
    let f = da / (da - db);
    Some(a + (b - a) * f)
}
