mod ball;
mod camera;
mod decision;
mod frame;
mod geom;
mod settings;
mod trajectory;
mod wicket;

pub use ball::*;
pub use camera::*;
pub use decision::*;
pub use frame::*;
pub use geom::*;
pub use settings::*;
pub use trajectory::*;
pub use wicket::*;

pub type Vector2 = nalgebra::Vector2<f64>;
pub type Vector3 = nalgebra::Vector3<f64>;

/// Magnitude of gravitational acceleration \[m/s²]. Gravity always acts along `-y`.
pub const STANDARD_GRAVITY: f64 = 9.81;

/// Gravity as a vector in world coordinates.
pub fn gravity(magnitude: f64) -> Vector3 {
    Vector3::new(0.0, -magnitude, 0.0)
}
