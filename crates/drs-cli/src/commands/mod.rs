pub mod review;
pub mod simulate;
