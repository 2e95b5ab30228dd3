use drs_core::Vector3;

/// Exponential low-pass filter for vectors.
///
/// Each update moves the filtered value by `alpha` towards the new sample, so `alpha`
/// is the weight of the newest sample.
#[derive(Debug, Clone)]
pub struct VectorLowPassFilter {
    alpha: f64,
    filtered: Option<Vector3>,
}

impl VectorLowPassFilter {
    /// Creates a new `VectorLowPassFilter` with the specified alpha value.
    pub fn new(alpha: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&alpha),
            "Alpha must be between 0 and 1"
        );
        VectorLowPassFilter {
            alpha,
            filtered: None,
        }
    }

    /// Creates a filter that already holds `initial`.
    pub fn with_initial(alpha: f64, initial: Vector3) -> Self {
        let mut filter = Self::new(alpha);
        filter.filtered = Some(initial);
        filter
    }

    /// Updates the filter with a new sample and returns the filtered result.
    pub fn update(&mut self, sample: Vector3) -> Vector3 {
        let next = match self.filtered {
            Some(filtered) => filtered + (sample - filtered) * self.alpha,
            None => sample,
        };
        self.filtered = Some(next);
        next
    }

    pub fn value(&self) -> Option<Vector3> {
        self.filtered
    }

    /// Overwrite the filtered value, e.g. after extrapolating it.
    pub fn set(&mut self, value: Vector3) {
        self.filtered = Some(value);
    }
}
