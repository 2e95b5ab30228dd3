use drs_core::{DecisionReason, DecisionResult, DecisionSettings, Vector3, WicketRegion};

/// Whether the impact lies in line with the stumps: laterally closer than `tolerance`
/// to the wicket and inside its depth range.
pub fn is_inline(impact: &Vector3, wicket: &WicketRegion, tolerance: f64) -> bool {
    let (near, far) = wicket.depth_range();
    (impact.x - wicket.base_center.x).abs() < tolerance && (near..=far).contains(&impact.z)
}

/// Combine the three facts of a review into a verdict.
///
/// The checks short-circuit in order: not inline, then edge, then a miss.
pub fn decide(inline: bool, edge_detected: bool, wicket_hit: bool) -> DecisionResult {
    if !inline {
        DecisionResult::not_out(DecisionReason::NotInline)
    } else if edge_detected {
        DecisionResult::not_out(DecisionReason::EdgeDetected)
    } else if !wicket_hit {
        DecisionResult::not_out(DecisionReason::MissingWicket)
    } else {
        DecisionResult::out()
    }
}

/// Like [`decide`], but refuses to adjudicate without an impact position or a wicket.
pub fn adjudicate(
    impact: Option<&Vector3>,
    wicket: Option<&WicketRegion>,
    edge_detected: bool,
    wicket_hit: bool,
    settings: &DecisionSettings,
) -> DecisionResult {
    match (impact, wicket) {
        (Some(impact), Some(wicket)) => decide(
            is_inline(impact, wicket, settings.inline_tolerance),
            edge_detected,
            wicket_hit,
        ),
        (None, _) => {
            log::info!("No ball track, cannot adjudicate");
            DecisionResult::indeterminate()
        }
        (_, None) => {
            log::info!("No wicket region, cannot adjudicate");
            DecisionResult::indeterminate()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drs_core::{PixelBox, WicketSource};

    fn wicket() -> WicketRegion {
        // tops at depths 6.7, 6.8 and 6.9
        WicketRegion::from_base(
            Vector3::new(8.0, 0.0, 6.8),
            0.71,
            0.1,
            1.0,
            PixelBox::new(0.0, 0.0, 1.0, 1.0),
            WicketSource::Stumps,
        )
    }

    #[test]
    fn test_truth_table() {
        for edge in [false, true] {
            for hit in [false, true] {
                assert_eq!(
                    decide(false, edge, hit),
                    DecisionResult::not_out(DecisionReason::NotInline)
                );
            }
        }
        for hit in [false, true] {
            assert_eq!(
                decide(true, true, hit),
                DecisionResult::not_out(DecisionReason::EdgeDetected)
            );
        }
        assert_eq!(
            decide(true, false, false),
            DecisionResult::not_out(DecisionReason::MissingWicket)
        );
        assert_eq!(decide(true, false, true), DecisionResult::out());
        assert!(decide(true, false, true).out);
    }

    #[test]
    fn test_impact_outside_depth_range_is_not_inline() {
        let impact = Vector3::new(8.0, 0.01, 4.5);
        assert!(!is_inline(&impact, &wicket(), 0.2));
        let result = adjudicate(
            Some(&impact),
            Some(&wicket()),
            false,
            true,
            &DecisionSettings::default(),
        );
        assert_eq!(result, DecisionResult::not_out(DecisionReason::NotInline));
    }

    #[test]
    fn test_impact_in_line_is_out() {
        let impact = Vector3::new(8.0, 0.01, 6.8);
        assert!(is_inline(&impact, &wicket(), 0.2));
        let result = adjudicate(
            Some(&impact),
            Some(&wicket()),
            false,
            true,
            &DecisionSettings::default(),
        );
        assert_eq!(result, DecisionResult::out());
    }

    #[test]
    fn test_inline_boundaries() {
        let w = wicket();
        // lateral tolerance is exclusive
        assert!(!is_inline(&Vector3::new(8.25, 0.0, 6.8), &w, 0.25));
        assert!(is_inline(&Vector3::new(8.1, 0.0, 6.8), &w, 0.2));
        // depth range is inclusive
        let (near, far) = w.depth_range();
        assert!(is_inline(&Vector3::new(8.0, 0.0, near), &w, 0.2));
        assert!(is_inline(&Vector3::new(8.0, 0.0, far), &w, 0.2));
        assert!(!is_inline(&Vector3::new(8.0, 0.0, far + 1e-9), &w, 0.2));
    }

    #[test]
    fn test_missing_facts_are_indeterminate() {
        let settings = DecisionSettings::default();
        let impact = Vector3::new(8.0, 0.01, 6.8);
        assert_eq!(
            adjudicate(Some(&impact), None, false, true, &settings),
            DecisionResult::indeterminate()
        );
        assert_eq!(
            adjudicate(None, Some(&wicket()), false, true, &settings),
            DecisionResult::indeterminate()
        );
    }
}
