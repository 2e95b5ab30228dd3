mod forces;

pub use forces::BallForces;

use drs_core::{
    plane_crossing, SimulationSettings, Spin, Termination, TrackedBallState, TrajectoryPoint,
    Vector3, WicketRegion,
};
use serde::{Deserialize, Serialize};

/// Initial conditions for a simulation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaunchState {
    pub position: Vector3,
    pub velocity: Vector3,
    pub spin: Spin,
}

impl LaunchState {
    pub fn from_tracked(state: &TrackedBallState) -> Self {
        Self {
            position: state.current_position,
            velocity: state.velocity,
            spin: state.spin,
        }
    }
}

/// Output of [`simulate`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulatedTrajectory {
    /// Starts with the launch state at time offset 0
    pub points: Vec<TrajectoryPoint>,
    pub termination: Termination,
    pub stump_plane_depth: f64,
}

impl SimulatedTrajectory {
    pub fn reached_stump_plane(&self) -> bool {
        self.termination == Termination::ReachedStumpPlane
    }

    /// Where the ball passes through the stump plane, interpolated between the last
    /// two steps.
    pub fn stump_plane_crossing(&self) -> Option<Vector3> {
        if !self.reached_stump_plane() {
            return None;
        }
        match self.points.as_slice() {
            [.., a, b] => plane_crossing(&a.position, &b.position, self.stump_plane_depth),
            [only] => Some(only.position),
            [] => None,
        }
    }

    /// Whether the ball passes through the wicket envelope: within `half_width` of the
    /// middle stump laterally and between the ground and the stump tops, widened by one
    /// ball radius at the top.
    pub fn hits_wicket(&self, wicket: &WicketRegion, half_width: f64, ball_radius: f64) -> bool {
        let Some(crossing) = self.stump_plane_crossing() else {
            return false;
        };
        let lateral = (crossing.x - wicket.base_center.x).abs();
        lateral <= half_width
            && crossing.y >= wicket.base_center.y
            && crossing.y <= wicket.top_height() + ball_radius
    }
}

/// Integrate the flight of the ball from `launch` until it crosses the plane
/// `z = stump_plane_depth`.
///
/// Uses semi-implicit Euler steps of `settings.time_step`. Stops early with
/// [`Termination::IterationLimit`] after `settings.max_iterations` steps or when the state
/// stops being finite. The result depends only on the arguments.
pub fn simulate(
    launch: &LaunchState,
    stump_plane_depth: f64,
    settings: &SimulationSettings,
) -> SimulatedTrajectory {
    let forces = BallForces::new(settings, &launch.spin);
    let dt = settings.time_step;
    let mut position = launch.position;
    let mut velocity = launch.velocity;
    let mut points = vec![TrajectoryPoint {
        time_offset: 0.0,
        position,
        velocity,
    }];
    let done = |points: Vec<TrajectoryPoint>, termination| SimulatedTrajectory {
        points,
        termination,
        stump_plane_depth,
    };

    let start_side = position.z - stump_plane_depth;
    if start_side == 0.0 {
        return done(points, Termination::ReachedStumpPlane);
    }

    for step in 1..=settings.max_iterations {
        velocity += forces.acceleration(&velocity) * dt;
        position += velocity * dt;
        if !position.iter().chain(velocity.iter()).all(|c| c.is_finite()) {
            log::warn!("Trajectory diverged after {} steps", step);
            return done(points, Termination::IterationLimit);
        }
        points.push(TrajectoryPoint {
            time_offset: step as f64 * dt,
            position,
            velocity,
        });
        if (position.z - stump_plane_depth) * start_side <= 0.0 {
            return done(points, Termination::ReachedStumpPlane);
        }
    }

    log::debug!(
        "Trajectory did not reach z={:.2} within {} steps",
        stump_plane_depth,
        settings.max_iterations
    );
    done(points, Termination::IterationLimit)
}
