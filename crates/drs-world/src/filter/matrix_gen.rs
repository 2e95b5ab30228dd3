use nalgebra::{Matrix3, SMatrix};

/// Produces a matrix for a given time step.
pub trait MatrixCreator<const D: usize>: Send + Sync {
    fn create_matrix(&self, delta_t: f64) -> SMatrix<f64, D, D>;
}

fn block_upper(diag: f64, first: f64, second: f64) -> SMatrix<f64, 9, 9> {
    let mut result = SMatrix::<f64, 9, 9>::zeros();
    let eye = Matrix3::<f64>::identity();
    for i in 0..3 {
        result
            .fixed_view_mut::<3, 3>(3 * i, 3 * i)
            .copy_from(&(eye * diag));
    }
    result.fixed_view_mut::<3, 3>(0, 3).copy_from(&(eye * first));
    result.fixed_view_mut::<3, 3>(3, 6).copy_from(&(eye * first));
    result.fixed_view_mut::<3, 3>(0, 6).copy_from(&(eye * second));
    result
}

/// Constant-acceleration kinematics over the state
/// `[x, y, z, vx, vy, vz, ax, ay, az]`.
pub struct ConstantAccelerationModel;

impl MatrixCreator<9> for ConstantAccelerationModel {
    fn create_matrix(&self, delta_t: f64) -> SMatrix<f64, 9, 9> {
        block_upper(1.0, delta_t, 0.5 * delta_t.powi(2))
    }
}

/// Identity noise, independent of the time step. Scaled by the filter's variance.
pub struct UniformNoise;

impl<const D: usize> MatrixCreator<D> for UniformNoise {
    fn create_matrix(&self, _delta_t: f64) -> SMatrix<f64, D, D> {
        SMatrix::<f64, D, D>::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::SVector;

    #[test]
    fn test_constant_acceleration_step() {
        let a = ConstantAccelerationModel.create_matrix(2.0);
        let x = SVector::<f64, 9>::from_column_slice(&[
            1.0, 2.0, 3.0, 1.0, 0.0, -1.0, 0.0, -2.0, 0.5,
        ]);
        let next = a * x;
        // p + v*dt + a*dt²/2
        assert_eq!(next.fixed_rows::<3>(0).clone_owned(), nalgebra::Vector3::new(3.0, -2.0, 2.0));
        // v + a*dt
        assert_eq!(next.fixed_rows::<3>(3).clone_owned(), nalgebra::Vector3::new(1.0, -4.0, 0.0));
        assert_eq!(next.fixed_rows::<3>(6).clone_owned(), nalgebra::Vector3::new(0.0, -2.0, 0.5));
    }

    #[test]
    fn test_uniform_noise() {
        let q: SMatrix<f64, 9, 9> = UniformNoise.create_matrix(0.3);
        assert_eq!(q, SMatrix::<f64, 9, 9>::identity());
    }
}
