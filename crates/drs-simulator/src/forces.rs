use std::f64::consts::PI;

use drs_core::{gravity, SimulationSettings, Spin, Vector3};

/// Accelerations acting on a ball in flight.
#[derive(Debug, Clone)]
pub struct BallForces {
    /// `½·ρ·Cd·A / m`
    drag_factor: f64,
    /// Magnus coefficient times the angular velocity
    magnus: Vector3,
    gravity: Vector3,
}

impl BallForces {
    pub fn new(settings: &SimulationSettings, spin: &Spin) -> Self {
        let area = PI * settings.ball_radius.powi(2);
        Self {
            drag_factor: 0.5 * settings.air_density * settings.drag_coefficient * area
                / settings.ball_mass,
            magnus: spin.angular_velocity() * settings.magnus_coefficient,
            gravity: gravity(settings.gravity),
        }
    }

    /// Quadratic air resistance, opposite to the velocity.
    pub fn drag(&self, velocity: &Vector3) -> Vector3 {
        -velocity * (self.drag_factor * velocity.norm())
    }

    pub fn magnus(&self, velocity: &Vector3) -> Vector3 {
        self.magnus.cross(velocity)
    }

    pub fn gravity(&self) -> Vector3 {
        self.gravity
    }

    /// Total acceleration at the given velocity.
    pub fn acceleration(&self, velocity: &Vector3) -> Vector3 {
        self.drag(velocity) + self.magnus(velocity) + self.gravity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_drag_opposes_velocity() {
        let forces = BallForces::new(&SimulationSettings::default(), &Spin::none());
        let v = Vector3::new(3.0, -4.0, 0.0);
        let drag = forces.drag(&v);
        assert_relative_eq!(drag.normalize(), -v.normalize(), epsilon = 1e-12);

        // quadratic in speed
        let double = forces.drag(&(v * 2.0));
        assert_relative_eq!(double.norm(), 4.0 * drag.norm(), epsilon = 1e-12);

        let expected = 0.5 * 1.225 * 0.47 * PI * 0.036f64.powi(2) / 0.16 * 25.0;
        assert_relative_eq!(drag.norm(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_magnus_direction() {
        let forces = BallForces::new(
            &SimulationSettings::default(),
            &Spin::new(Vector3::new(0.0, 1.0, 0.0), 20.0),
        );
        // spin about the vertical axis curls a ball travelling in +z towards +x
        let magnus = forces.magnus(&Vector3::new(0.0, 0.0, 30.0));
        assert_relative_eq!(magnus, Vector3::new(0.005 * 20.0 * 30.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_vacuum_is_gravity_only() {
        let forces = BallForces::new(&SimulationSettings::default().vacuum(), &Spin::nominal());
        let a = forces.acceleration(&Vector3::new(1.0, 2.0, 30.0));
        assert_relative_eq!(a, Vector3::new(0.0, -9.81, 0.0));
    }
}
