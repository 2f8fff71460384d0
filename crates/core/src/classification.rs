//! The tri-level severity vocabulary shared by every skill.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Escalation urgency of an assessment.
///
/// Variants are declared in increasing severity, so the derived `Ord`
/// gives `Green < Yellow < Red`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Classification {
    /// Acceptable or standard; proceed without escalation.
    Green,
    /// Needs review: flag issues and suggest modifications.
    Yellow,
    /// Significant issues; full review required.
    Red,
}

impl Classification {
    /// All members, least severe first.
    pub const ALL: [Classification; 3] = [Self::Green, Self::Yellow, Self::Red];

    /// The wire value ("GREEN", "YELLOW" or "RED").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "GREEN",
            Self::Yellow => "YELLOW",
            Self::Red => "RED",
        }
    }

    /// Whether this level calls for human review before acting.
    pub fn needs_review(&self) -> bool {
        *self != Self::Green
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The string was not one of the three recognized values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized classification '{0}' (expected GREEN, YELLOW or RED)")]
pub struct UnknownClassification(pub String);

impl FromStr for Classification {
    type Err = UnknownClassification;

    /// Exact match only. Model output such as "green" or "ORANGE" is rejected
    /// so that callers decide how to treat off-vocabulary values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GREEN" => Ok(Self::Green),
            "YELLOW" => Ok(Self::Yellow),
            "RED" => Ok(Self::Red),
            other => Err(UnknownClassification(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_roundtrip_for_every_member() {
        for c in Classification::ALL {
            let parsed: Classification = c.as_str().parse().unwrap();
            assert_eq!(parsed, c);
            assert_eq!(parsed.as_str(), c.as_str());
        }
    }

    #[test]
    fn severity_order() {
        assert!(Classification::Green < Classification::Yellow);
        assert!(Classification::Yellow < Classification::Red);
        assert_eq!(
            Classification::ALL.iter().max(),
            Some(&Classification::Red)
        );
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_value(Classification::Yellow).unwrap();
        assert_eq!(json, serde_json::json!("YELLOW"));

        let back: Classification = serde_json::from_value(serde_json::json!("RED")).unwrap();
        assert_eq!(back, Classification::Red);
    }

    #[test]
    fn off_vocabulary_rejected() {
        let err = "ORANGE".parse::<Classification>().unwrap_err();
        assert_eq!(err.0, "ORANGE");
        assert!(err.to_string().contains("ORANGE"));
        assert!("green".parse::<Classification>().is_err());
    }

    #[test]
    fn review_flag() {
        assert!(!Classification::Green.needs_review());
        assert!(Classification::Yellow.needs_review());
        assert!(Classification::Red.needs_review());
    }
}
