mod filter_builder;
mod kalman;
mod lpf;
mod matrix_gen;

pub use filter_builder::KalmanBuilder;
pub use kalman::Kalman;
pub use lpf::VectorLowPassFilter;
