//! The uniform output record produced by every skill.

use crate::classification::Classification;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Structured output of one skill invocation.
///
/// Constructed once by a skill's parser, enriched by the manager with the
/// model id and skill name, then handed to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillResult {
    /// Exactly one severity level.
    pub classification: Classification,

    /// Domain-specific score; range varies by skill (0-100 triage, 1-25 risk).
    #[serde(default)]
    pub score: Option<f64>,

    #[serde(default)]
    pub summary: String,

    /// Ordered structured findings.
    #[serde(default)]
    pub issues: Vec<Value>,

    /// Ordered structured actions.
    #[serde(default)]
    pub recommendations: Vec<Value>,

    #[serde(default)]
    pub escalation_required: bool,

    /// Should be present whenever `escalation_required` is set.
    #[serde(default)]
    pub escalation_reason: Option<String>,

    /// Verbatim model text, kept for audit.
    #[serde(default)]
    pub raw_response: String,

    /// Domain-specific extras (phase assessment, risk sub-scores, ...).
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl SkillResult {
    /// An empty result with the given classification.
    pub fn new(classification: Classification) -> Self {
        Self {
            classification,
            score: None,
            summary: String::new(),
            issues: Vec::new(),
            recommendations: Vec::new(),
            escalation_required: false,
            escalation_reason: None,
            raw_response: String::new(),
            metadata: Map::new(),
        }
    }

    /// A "needs human attention" result: escalation forced with a reason.
    pub fn degraded(
        classification: Classification,
        summary: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            summary: summary.into(),
            escalation_required: true,
            escalation_reason: Some(reason.into()),
            ..Self::new(classification)
        }
    }

    /// Force escalation with a reason, keeping any reason already present.
    pub fn escalate(&mut self, reason: impl Into<String>) {
        self.escalation_required = true;
        if self.escalation_reason.is_none() {
            self.escalation_reason = Some(reason.into());
        }
    }

    /// Look up a metadata entry.
    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// Plain nested map for transport and logging.
    ///
    /// The classification is rendered as its string value. The raw model
    /// text is left out; it stays on the struct for audit.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("classification".into(), Value::from(self.classification.as_str()));
        map.insert(
            "score".into(),
            self.score
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        );
        map.insert("summary".into(), Value::from(self.summary.clone()));
        map.insert("issues".into(), Value::Array(self.issues.clone()));
        map.insert("recommendations".into(), Value::Array(self.recommendations.clone()));
        map.insert("escalation_required".into(), Value::Bool(self.escalation_required));
        map.insert(
            "escalation_reason".into(),
            self.escalation_reason.clone().map(Value::from).unwrap_or(Value::Null),
        );
        map.insert("metadata".into(), Value::Object(self.metadata.clone()));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn to_map_renders_classification_as_string() {
        for c in Classification::ALL {
            let map = SkillResult::new(c).to_map();
            assert_eq!(map["classification"], Value::String(c.as_str().to_string()));
        }
    }

    #[test]
    fn to_map_shape() {
        let mut result = SkillResult::new(Classification::Yellow);
        result.score = Some(72.0);
        result.summary = "Discovery running long".into();
        result.issues.push(json!({"category": "tasks", "severity": "medium"}));
        result.raw_response = "{...}".into();
        result.metadata.insert("skill".into(), json!("case_triage"));

        let map = result.to_map();
        assert_eq!(map["score"], json!(72.0));
        assert_eq!(map["issues"].as_array().unwrap().len(), 1);
        assert_eq!(map["escalation_reason"], Value::Null);
        assert_eq!(map["metadata"]["skill"], "case_triage");
        assert!(!map.contains_key("raw_response"));
    }

    #[test]
    fn missing_score_is_null() {
        let map = SkillResult::new(Classification::Green).to_map();
        assert_eq!(map["score"], Value::Null);
    }

    #[test]
    fn degraded_forces_escalation() {
        let result = SkillResult::degraded(
            Classification::Red,
            "Failed to parse response",
            "AI response parsing failed",
        );
        assert!(result.escalation_required);
        assert_eq!(result.escalation_reason.as_deref(), Some("AI response parsing failed"));
        assert_eq!(result.classification, Classification::Red);
    }

    #[test]
    fn escalate_keeps_existing_reason() {
        let mut result = SkillResult::new(Classification::Yellow);
        result.escalation_reason = Some("model reason".into());
        result.escalate("local reason");
        assert!(result.escalation_required);
        assert_eq!(result.escalation_reason.as_deref(), Some("model reason"));
    }

    #[test]
    fn serde_roundtrip_keeps_raw_response() {
        let mut result = SkillResult::new(Classification::Green);
        result.raw_response = "verbatim".into();
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"GREEN\""));
        let back: SkillResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.raw_response, "verbatim");
    }
}
