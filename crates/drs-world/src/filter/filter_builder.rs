use drs_core::{gravity, Vector3};
use nalgebra::{SMatrix, SVector};

use super::kalman::Kalman;
use super::matrix_gen::{ConstantAccelerationModel, UniformNoise};

#[derive(Debug)]
pub struct KalmanBuilder {
    init_var: f64,
    measurement_var: f64,
    unit_transition_var: f64,
}

impl KalmanBuilder {
    pub fn new(init_var: f64, measurement_var: f64, unit_transition_var: f64) -> Self {
        KalmanBuilder {
            init_var,
            measurement_var,
            unit_transition_var,
        }
    }

    /// Filter over position, velocity and acceleration, observing position only.
    ///
    /// The ball starts at rest at `init_pos` with free-fall acceleration.
    pub fn build_ball(&self, init_pos: Vector3, g: f64, init_time: f64) -> Kalman<3, 9> {
        #[allow(non_snake_case)]
        let mut H = SMatrix::<f64, 3, 9>::zeros();
        H.fixed_view_mut::<3, 3>(0, 0)
            .copy_from(&SMatrix::<f64, 3, 3>::identity());
        #[allow(non_snake_case)]
        let R = SMatrix::<f64, 3, 3>::identity() * self.measurement_var;
        #[allow(non_snake_case)]
        let P = SMatrix::<f64, 9, 9>::identity() * self.init_var;

        let mut x = SVector::<f64, 9>::zeros();
        x.fixed_rows_mut::<3>(0).copy_from(&init_pos);
        x.fixed_rows_mut::<3>(6).copy_from(&gravity(g));

        Kalman::new(
            self.unit_transition_var,
            init_time,
            Box::new(ConstantAccelerationModel),
            H,
            Box::new(UniformNoise),
            R,
            P,
            x,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_initial_state() {
        let kf = KalmanBuilder::new(1.0, 0.1, 0.01).build_ball(Vector3::new(1.0, 2.0, 3.0), 9.81, 0.0);
        let x = kf.state();
        assert_relative_eq!(x[0], 1.0);
        assert_relative_eq!(x[2], 3.0);
        assert_relative_eq!(x[3], 0.0);
        assert_relative_eq!(x[7], -9.81);
        assert_relative_eq!(kf.covariance()[(4, 4)], 1.0);
    }
}
