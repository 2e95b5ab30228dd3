use drs_core::TrackedBallState;

/// Bounce and impact frames found in a delivery, as indices into the history that was
/// analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImpactAnalysis {
    /// Pitch bounce, `None` for a full toss
    pub bounce: Option<usize>,
    /// First frame of pad/bat contact, or the last observed frame if there was none
    pub impact: usize,
    /// Whether the impact was found through a reversal of the depth coordinate
    pub depth_reversal: bool,
    /// Last observed state before contact
    launch: usize,
}

impl ImpactAnalysis {
    /// Run bounce and impact detection over a tracked delivery.
    ///
    /// Extrapolated states after the last observation are ignored. Returns `None` if the
    /// history holds no observed state.
    pub fn from_history<'a>(
        history: impl IntoIterator<Item = &'a TrackedBallState>,
        min_drop: f64,
    ) -> Option<Self> {
        let mut states: Vec<&TrackedBallState> = history.into_iter().collect();
        let last_observed = states.iter().rposition(|s| !s.predicted)?;
        states.truncate(last_observed + 1);

        let (heights, depths): (Vec<f64>, Vec<f64>) = states
            .iter()
            .map(|s| (s.current_position.y, s.current_position.z))
            .unzip();
        let bounce = detect_bounce(&heights, min_drop);
        let (impact, depth_reversal) = detect_impact(&depths, bounce)?;

        let mut launch = if depth_reversal { impact - 1 } else { impact };
        while launch > 0 && states[launch].predicted {
            launch -= 1;
        }
        Some(Self {
            bounce,
            impact,
            depth_reversal,
            launch,
        })
    }

    /// Index of the last observed free-flight state before contact. Trajectory
    /// prediction starts here.
    pub fn launch_index(&self) -> usize {
        self.launch
    }
}

/// Find the pitch bounce in a sequence of heights.
///
/// The bounce is the first local minimum (`h[i] < h[i-1]` and `h[i] <= h[i+1]`) whose
/// height lies more than `min_drop` below the local maximum that precedes its descent.
/// Smaller dips are skipped.
pub fn detect_bounce(heights: &[f64], min_drop: f64) -> Option<usize> {
    if heights.len() < 3 {
        return None;
    }
    for i in 1..heights.len() - 1 {
        if !(heights[i] < heights[i - 1] && heights[i] <= heights[i + 1]) {
            continue;
        }
        let mut peak = i - 1;
        while peak > 0 && heights[peak - 1] >= heights[peak] {
            peak -= 1;
        }
        let drop = heights[peak] - heights[i];
        if drop > min_drop {
            return Some(i);
        }
        log::trace!("Ignoring dip at {} (drop {:.3} m)", i, drop);
    }
    None
}

/// Find the impact frame in a sequence of depths.
///
/// After a bounce, impact is the first frame whose depth is smaller than the one
/// before it. Without a bounce, or without such a frame, the last frame is the impact.
/// The flag tells whether a reversal was found. Returns `None` for an empty sequence.
pub fn detect_impact(depths: &[f64], bounce: Option<usize>) -> Option<(usize, bool)> {
    let last = depths.len().checked_sub(1)?;
    if let Some(bounce) = bounce {
        if let Some(i) = (bounce + 1..depths.len()).find(|&i| depths[i] < depths[i - 1]) {
            return Some((i, true));
        }
    }
    Some((last, false))
}
