use nalgebra::{SMatrix, SVector};

use super::matrix_gen::MatrixCreator;

/// Linear Kalman filter with an `OS`-dimensional observation space and an
/// `SS`-dimensional state space.
#[allow(non_snake_case)]
pub struct Kalman<const OS: usize, const SS: usize> {
    // scale of the transition noise
    var: f64,
    // time of the current state in seconds
    t: f64,
    // Transition matrix
    A: Box<dyn MatrixCreator<SS>>,
    // Transformation (observation) matrix
    H: SMatrix<f64, OS, SS>,
    // Process noise covariance matrix
    Q: Box<dyn MatrixCreator<SS>>,
    // Measurement noise covariance matrix
    R: SMatrix<f64, OS, OS>,
    // Error covariance matrix
    P: SMatrix<f64, SS, SS>,
    // State vector
    x: SVector<f64, SS>,
}

#[allow(non_snake_case)]
impl<const OS: usize, const SS: usize> Kalman<OS, SS> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        var: f64,
        t: f64,
        A: Box<dyn MatrixCreator<SS>>,
        H: SMatrix<f64, OS, SS>,
        Q: Box<dyn MatrixCreator<SS>>,
        R: SMatrix<f64, OS, OS>,
        P: SMatrix<f64, SS, SS>,
        x: SVector<f64, SS>,
    ) -> Self {
        Kalman {
            var,
            t,
            A,
            H,
            Q,
            R,
            P,
            x,
        }
    }

    pub fn state(&self) -> &SVector<f64, SS> {
        &self.x
    }

    #[cfg(test)]
    pub(crate) fn covariance(&self) -> &SMatrix<f64, SS, SS> {
        &self.P
    }

    fn propagate(&self, dt: f64) -> (SVector<f64, SS>, SMatrix<f64, SS, SS>) {
        let A = self.A.create_matrix(dt);
        let Q = self.Q.create_matrix(dt) * self.var;
        let x = A * self.x;
        let P = A * self.P * A.transpose() + Q;
        (x, P)
    }

    // advance the filter to `newt` without an observation
    // returns None if `newt` lies in the past
    pub fn predict(&mut self, newt: f64) -> Option<SVector<f64, SS>> {
        let dt = newt - self.t;
        if dt < 0.0 {
            return None;
        }
        let (x, P) = self.propagate(dt);
        self.x = x;
        self.P = P;
        self.t = newt;
        Some(self.x)
    }

    // fold an observation taken at `newt` into the state
    // returns None if the observation is older than the current state
    pub fn update(&mut self, z: SVector<f64, OS>, newt: f64) -> Option<SVector<f64, SS>> {
        let dt = newt - self.t;
        if dt < 0.0 {
            return None;
        }
        let (x, P) = self.propagate(dt);
        let r = z - self.H * x;
        let S = self.H * P * self.H.transpose() + self.R;
        let Some(S_inv) = S.try_inverse() else {
            log::warn!("Singular innovation covariance at t={:.3}, dropping observation", newt);
            self.x = x;
            self.P = P;
            self.t = newt;
            return None;
        };
        let K = P * self.H.transpose() * S_inv;
        self.x = x + K * r;
        self.P = P - K * self.H * P;
        self.t = newt;
        Some(self.x)
    }
}
