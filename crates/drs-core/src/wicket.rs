use serde::{Deserialize, Serialize};

use crate::{PixelBox, Vector3};

/// Where a [`WicketRegion`] came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WicketSource {
    /// Merged from stump detections
    Stumps,
    /// Inferred from the batsman's pads while the stumps were hidden
    Pads,
}

/// The three stumps as a single tracked object.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WicketRegion {
    /// Point on the ground below the middle stump
    pub base_center: Vector3,
    /// Tops of the off, middle and leg stump
    pub stump_tops: [Vector3; 3],
    pub bails_dislodged: [bool; 2],
    /// 0.0 when the region was inferred rather than observed
    pub confidence: f64,
    pub pixel_box: PixelBox,
    pub source: WicketSource,
}

impl WicketRegion {
    /// Build a region around `base_center`. The stumps stand `stump_height` tall and
    /// are spaced `stump_spacing` apart along the depth axis.
    pub fn from_base(
        base_center: Vector3,
        stump_height: f64,
        stump_spacing: f64,
        confidence: f64,
        pixel_box: PixelBox,
        source: WicketSource,
    ) -> Self {
        let top = base_center + Vector3::new(0.0, stump_height, 0.0);
        Self {
            base_center,
            stump_tops: [
                top - Vector3::new(0.0, 0.0, stump_spacing),
                top,
                top + Vector3::new(0.0, 0.0, stump_spacing),
            ],
            bails_dislodged: [false; 2],
            confidence,
            pixel_box,
            source,
        }
    }

    /// Nearest and farthest depth covered by the stumps, as `(min, max)`.
    pub fn depth_range(&self) -> (f64, f64) {
        self.stump_tops
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), top| {
                (lo.min(top.z), hi.max(top.z))
            })
    }

    /// Height of the highest stump top.
    pub fn top_height(&self) -> f64 {
        self.stump_tops
            .iter()
            .map(|top| top.y)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn is_inferred(&self) -> bool {
        self.source == WicketSource::Pads
    }

    pub fn any_bail_dislodged(&self) -> bool {
        self.bails_dislodged.iter().any(|b| *b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_base() {
        let region = WicketRegion::from_base(
            Vector3::new(8.0, 0.0, 6.8),
            0.71,
            0.1,
            1.0,
            PixelBox::new(0.0, 0.0, 10.0, 10.0),
            WicketSource::Stumps,
        );
        let (lo, hi) = region.depth_range();
        assert_relative_eq!(lo, 6.7, epsilon = 1e-12);
        assert_relative_eq!(hi, 6.9, epsilon = 1e-12);
        assert_relative_eq!(region.top_height(), 0.71);
        assert_relative_eq!(region.stump_tops[1], Vector3::new(8.0, 0.71, 6.8));
        assert!(!region.is_inferred());
        assert!(!region.any_bail_dislodged());
    }
}
