use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionReason {
    NotInline,
    EdgeDetected,
    MissingWicket,
    Out,
    /// Not enough information to adjudicate
    Indeterminate,
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DecisionReason::NotInline => "NOT_INLINE",
            DecisionReason::EdgeDetected => "EDGE_DETECTED",
            DecisionReason::MissingWicket => "MISSING_WICKET",
            DecisionReason::Out => "OUT",
            DecisionReason::Indeterminate => "INDETERMINATE",
        };
        f.write_str(s)
    }
}

/// Verdict of a review.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionResult {
    pub out: bool,
    pub reason: DecisionReason,
}

impl DecisionResult {
    pub fn not_out(reason: DecisionReason) -> Self {
        Self { out: false, reason }
    }

    pub fn out() -> Self {
        Self {
            out: true,
            reason: DecisionReason::Out,
        }
    }

    pub fn indeterminate() -> Self {
        Self::not_out(DecisionReason::Indeterminate)
    }

    pub fn is_indeterminate(&self) -> bool {
        self.reason == DecisionReason::Indeterminate
    }
}

impl fmt::Display for DecisionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.out, self.reason) {
            (_, DecisionReason::Indeterminate) => write!(f, "INDETERMINATE"),
            (true, reason) => write!(f, "OUT ({})", reason),
            (false, reason) => write!(f, "NOT OUT ({})", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_serialization() {
        let json = serde_json::to_string(&DecisionResult::not_out(DecisionReason::MissingWicket))
            .unwrap();
        assert_eq!(json, r#"{"out":false,"reason":"MISSING_WICKET"}"#);
        let parsed: DecisionReason = serde_json::from_str(r#""NOT_INLINE""#).unwrap();
        assert_eq!(parsed, DecisionReason::NotInline);
    }

    #[test]
    fn test_display() {
        assert_eq!(DecisionResult::out().to_string(), "OUT (OUT)");
        assert_eq!(
            DecisionResult::not_out(DecisionReason::EdgeDetected).to_string(),
            "NOT OUT (EDGE_DETECTED)"
        );
        assert_eq!(DecisionResult::indeterminate().to_string(), "INDETERMINATE");
    }
}
