use serde::{Deserialize, Serialize};

use crate::{CameraSettings, Vector2, Vector3};

/// Diameter of a cricket ball, in meters.
pub const BALL_DIAMETER: f64 = 0.072;
/// Height of a stump above the ground, in meters.
pub const STUMP_HEIGHT: f64 = 0.71;
/// Height of an average adult, in meters.
pub const PERSON_HEIGHT: f64 = 1.75;
/// Depth reported when the apparent size of an object is unusable, in meters.
pub const SENTINEL_DEPTH: f64 = 10.0;

/// Object classes with a known real-world size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceObject {
    Ball,
    Stump,
    Person,
}

impl ReferenceObject {
    /// The real-world size matching the apparent size measured for this class.
    pub fn real_size(&self) -> f64 {
        match self {
            ReferenceObject::Ball => BALL_DIAMETER,
            ReferenceObject::Stump => STUMP_HEIGHT,
            ReferenceObject::Person => PERSON_HEIGHT,
        }
    }
}

/// Monocular pinhole approximation used to lift 2D detections into world space.
///
/// Depth follows from the ratio between the known size of an object and its apparent
/// size in pixels. The lateral and vertical coordinates scale the normalized image
/// offset from the frame center by that depth. The result is only as good as the
/// apparent-size measurement; this is not a calibrated reconstruction.
#[derive(Clone, Debug)]
pub struct CameraModel {
    frame_width: f64,
    frame_height: f64,
    focal_length: f64,
}

impl CameraModel {
    pub fn new(settings: &CameraSettings) -> Self {
        Self {
            frame_width: settings.frame_width,
            frame_height: settings.frame_height,
            focal_length: settings.focal_length(),
        }
    }

    pub fn focal_length(&self) -> f64 {
        self.focal_length
    }

    pub fn frame_height(&self) -> f64 {
        self.frame_height
    }

    /// Depth of an object of `real_size` meters that appears `apparent_size_px` pixels
    /// large. Returns [`SENTINEL_DEPTH`] if the apparent size is zero, negative or not
    /// finite.
    pub fn depth(&self, apparent_size_px: f64, real_size: f64) -> f64 {
        if !apparent_size_px.is_finite() || apparent_size_px <= 0.0 {
            return SENTINEL_DEPTH;
        }
        self.focal_length * real_size / apparent_size_px
    }

    /// Estimate the world position of the image point `pixel`.
    pub fn estimate(&self, pixel: Vector2, apparent_size_px: f64, real_size: f64) -> Vector3 {
        let z = self.depth(apparent_size_px, real_size);
        let half_w = self.frame_width / 2.0;
        let half_h = self.frame_height / 2.0;
        let x = ((pixel.x - half_w) / half_w) * z;
        let y = -((pixel.y - half_h) / half_h) * z;
        Vector3::new(x, y, z)
    }

    pub fn estimate_object(
        &self,
        pixel: Vector2,
        apparent_size_px: f64,
        object: ReferenceObject,
    ) -> Vector3 {
        self.estimate(pixel, apparent_size_px, object.real_size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera() -> CameraModel {
        CameraModel::new(&CameraSettings {
            frame_width: 1920.0,
            frame_height: 1080.0,
            focal_length: None,
        })
    }

    #[test]
    fn test_focal_length_defaults_to_frame_width() {
        assert_eq!(camera().focal_length(), 1920.0);
    }

    #[test]
    fn test_center_pixel() {
        let pos = camera().estimate_object(Vector2::new(960.0, 540.0), 19.2, ReferenceObject::Ball);
        assert_relative_eq!(pos.z, 1920.0 * 0.072 / 19.2, epsilon = 1e-9);
        assert_relative_eq!(pos.x, 0.0);
        assert_relative_eq!(pos.y, 0.0);
    }

    #[test]
    fn test_off_center_pixel() {
        // quarter frame to the right and above the center
        let pos = camera().estimate(Vector2::new(1440.0, 270.0), 192.0, 1.0);
        assert_relative_eq!(pos.z, 10.0, epsilon = 1e-9);
        assert_relative_eq!(pos.x, 5.0, epsilon = 1e-9);
        assert_relative_eq!(pos.y, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_size_gives_sentinel_depth() {
        let cam = camera();
        assert_eq!(cam.depth(0.0, STUMP_HEIGHT), SENTINEL_DEPTH);
        assert_eq!(cam.depth(f64::NAN, STUMP_HEIGHT), SENTINEL_DEPTH);
        let pos = cam.estimate(Vector2::new(0.0, 1080.0), 0.0, STUMP_HEIGHT);
        assert_relative_eq!(pos, Vector3::new(-10.0, -10.0, 10.0), epsilon = 1e-9);
    }
}
