use drs_core::{
    CameraModel, PadDetection, PixelBox, StumpDetection, WicketRegion, WicketSettings,
    WicketSource,
};

use crate::utils::IntervalTrigger;

/// Stabilizes per-frame stump detections into one [`WicketRegion`].
///
/// The region is only recomputed every `refresh_interval` frames; in between, the
/// cached region is returned unchanged.
pub struct WicketTracker {
    camera: CameraModel,
    settings: WicketSettings,
    refresh: IntervalTrigger,
    region: Option<WicketRegion>,
    bails_dislodged: [bool; 2],
}

impl WicketTracker {
    pub fn new(camera: CameraModel, settings: &WicketSettings) -> Self {
        Self {
            camera,
            settings: settings.clone(),
            refresh: IntervalTrigger::new(settings.refresh_interval),
            region: None,
            bails_dislodged: [false; 2],
        }
    }

    pub fn get(&self) -> Option<&WicketRegion> {
        self.region.as_ref()
    }

    /// Update the tracker with the detections of one frame.
    ///
    /// Returns `None` only if no region has ever been established.
    pub fn update(
        &mut self,
        frame_index: u64,
        stumps: &[StumpDetection],
        pads: Option<&[PadDetection]>,
        bails_dislodged: Option<[bool; 2]>,
    ) -> Option<&WicketRegion> {
        if let Some(bails) = bails_dislodged {
            // a dislodged bail stays dislodged for the rest of the delivery
            for (seen, now) in self.bails_dislodged.iter_mut().zip(bails) {
                *seen |= now;
            }
        }

        if self.region.is_none() || self.refresh.is_due(frame_index) {
            let fresh = self
                .from_stumps(stumps)
                .or_else(|| pads.and_then(|pads| self.from_pads(pads)));
            if let Some(region) = fresh {
                if self.region.is_none() {
                    log::debug!(
                        "Wicket established at frame {} from {:?}",
                        frame_index,
                        region.source
                    );
                }
                self.region = Some(region);
                self.refresh.fire(frame_index);
            }
        }

        let bails = self.bails_dislodged;
        self.region.as_mut().map(|region| {
            region.bails_dislodged = bails;
            &*region
        })
    }

    fn from_stumps(&self, stumps: &[StumpDetection]) -> Option<WicketRegion> {
        let accepted: Vec<&StumpDetection> = stumps
            .iter()
            .filter(|s| s.confidence >= self.settings.min_confidence)
            .collect();
        let first = accepted.first()?;

        let left = accepted.iter().map(|s| s.pixel_bbox.x).fold(f64::INFINITY, f64::min);
        let top = accepted.iter().map(|s| s.pixel_bbox.y).fold(f64::INFINITY, f64::min);
        let right = accepted
            .iter()
            .map(|s| s.pixel_bbox.right())
            .fold(f64::NEG_INFINITY, f64::max);
        // heights are standardized to the tallest stump
        let height = accepted
            .iter()
            .map(|s| s.pixel_bbox.h)
            .fold(first.pixel_bbox.h, f64::max);
        let confidence = accepted
            .iter()
            .map(|s| s.confidence)
            .fold(first.confidence, f64::max);

        let merged = PixelBox::new(left, top, right - left, height);
        Some(self.region_from_box(merged, confidence, WicketSource::Stumps))
    }

    fn from_pads(&self, pads: &[PadDetection]) -> Option<WicketRegion> {
        let union = PixelBox::union_all(pads.iter().map(|p| &p.pixel_bbox))?;
        let tallest = pads.iter().map(|p| p.pixel_bbox.h).fold(0.0, f64::max);
        let height = (tallest * self.settings.pad_height_ratio).min(self.camera.frame_height());
        let bottom = union.bottom();
        let top = (bottom - height).max(0.0);
        let inferred = PixelBox::new(union.x, top, union.w, height);
        Some(self.region_from_box(inferred, 0.0, WicketSource::Pads))
    }

    fn region_from_box(&self, pixel_box: PixelBox, confidence: f64, source: WicketSource) -> WicketRegion {
        let base_center = self.camera.estimate(
            pixel_box.bottom_center(),
            pixel_box.h,
            self.settings.stump_height,
        );
        let mut region = WicketRegion::from_base(
            base_center,
            self.settings.stump_height,
            self.settings.stump_spacing,
            confidence,
            pixel_box,
            source,
        );
        region.bails_dislodged = self.bails_dislodged;
        region
    }
}
