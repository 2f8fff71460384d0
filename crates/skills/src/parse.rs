//! Shared response-parsing pipeline.
//!
//! Every skill turns model text into a [`SkillResult`] in three stages:
//! extraction of the first top-level JSON object, decoding into a map, and
//! projection of named fields onto the result. Extraction and decoding
//! failures, as well as an off-vocabulary classification, never propagate:
//! they degrade into an escalated result described by the skill's
//! [`FallbackPolicy`].

use lexskill_core::{Classification, SkillResult};
use serde_json::{Map, Value};
use tracing::warn;

/// Characters of model text quoted in degradation logs.
const LOG_EXCERPT_CHARS: usize = 200;

/// Why a response could not be projected onto a result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseFailure {
    #[error("no JSON object found in response")]
    NoJsonObject,

    #[error("invalid JSON in response: {0}")]
    InvalidJson(String),

    #[error("unrecognized classification in response: {0}")]
    UnknownClassification(String),
}

impl ParseFailure {
    /// Short tag for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoJsonObject => "no_json_object",
            Self::InvalidJson(_) => "invalid_json",
            Self::UnknownClassification(_) => "unknown_classification",
        }
    }
}

/// Locate the first top-level JSON object in `text`.
///
/// Scans from the first `{` keeping brace depth, ignoring braces inside
/// string literals (escape-aware), and returns the slice up to the matching
/// `}`. If the braces never balance the slice runs to the last `}` instead,
/// so the decoder reports the malformed candidate rather than nothing.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }

    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Extract and decode the first JSON object in `text`.
pub fn decode(text: &str) -> Result<Map<String, Value>, ParseFailure> {
    let candidate = extract_json_object(text).ok_or(ParseFailure::NoJsonObject)?;
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ParseFailure::InvalidJson(format!(
            "expected an object, got {other}"
        ))),
        Err(e) => Err(ParseFailure::InvalidJson(e.to_string())),
    }
}

/// The degraded result a skill returns when its response cannot be parsed.
#[derive(Debug, Clone, Copy)]
pub struct FallbackPolicy {
    pub classification: Classification,
    /// Summary when no JSON object was found
    pub missing_summary: &'static str,
    /// Summary when the candidate did not decode or carried a bad classification
    pub invalid_summary: &'static str,
    pub reason: &'static str,
}

impl FallbackPolicy {
    pub fn degrade(&self, failure: &ParseFailure) -> SkillResult {
        let summary = match failure {
            ParseFailure::NoJsonObject => self.missing_summary,
            ParseFailure::InvalidJson(_) | ParseFailure::UnknownClassification(_) => {
                self.invalid_summary
            }
        };
        let mut result = SkillResult::degraded(self.classification, summary, self.reason);
        result
            .metadata
            .insert("parse_failure".into(), Value::from(failure.to_string()));
        result
    }
}

/// Run the full pipeline for one skill.
///
/// `project` maps the decoded object onto a result; it may reject the
/// object with [`ParseFailure::UnknownClassification`]. The verbatim text
/// is stored on the result either way.
pub fn parse_with<F>(skill: &str, response: &str, policy: &FallbackPolicy, project: F) -> SkillResult
where
    F: FnOnce(&Map<String, Value>) -> Result<SkillResult, ParseFailure>,
{
    let mut result = match decode(response).and_then(|data| project(&data)) {
        Ok(result) => result,
        Err(failure) => {
            warn!(
                skill = %skill,
                failure = failure.kind(),
                error = %failure,
                excerpt = %excerpt(response),
                "Model response degraded to fallback"
            );
            policy.degrade(&failure)
        }
    };
    result.raw_response = response.to_string();
    result
}

fn excerpt(text: &str) -> String {
    text.chars().take(LOG_EXCERPT_CHARS).collect()
}

// --- Field projection helpers ---

/// Resolve the classification field; absent or null falls back to `default`.
pub fn classification_field(
    data: &Map<String, Value>,
    key: &str,
    default: Classification,
) -> Result<Classification, ParseFailure> {
    match data.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::String(s)) => s
            .parse()
            .map_err(|_| ParseFailure::UnknownClassification(s.clone())),
        Some(other) => Err(ParseFailure::UnknownClassification(other.to_string())),
    }
}

/// String field, empty when absent or not a string.
pub fn str_field(data: &Map<String, Value>, key: &str) -> String {
    opt_str_field(data, key).unwrap_or_default()
}

pub fn opt_str_field(data: &Map<String, Value>, key: &str) -> Option<String> {
    data.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Numeric field. Numeric strings such as `"12"` are accepted.
pub fn number_field(data: &Map<String, Value>, key: &str) -> Option<f64> {
    match data.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn bool_field(data: &Map<String, Value>, key: &str, default: bool) -> bool {
    data.get(key).and_then(Value::as_bool).unwrap_or(default)
}

/// Array field, empty when absent or not an array.
pub fn array_field(data: &Map<String, Value>, key: &str) -> Vec<Value> {
    match data.get(key) {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}

/// Object field, `{}` when absent or not an object.
pub fn object_field(data: &Map<String, Value>, key: &str) -> Value {
    match data.get(key) {
        Some(v @ Value::Object(_)) => v.clone(),
        _ => Value::Object(Map::new()),
    }
}

/// Field copied as-is, `null` when absent.
pub fn raw_field(data: &Map<String, Value>, key: &str) -> Value {
    data.get(key).cloned().unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const POLICY: FallbackPolicy = FallbackPolicy {
        classification: Classification::Yellow,
        missing_summary: "Failed to parse response",
        invalid_summary: "Invalid JSON in response",
        reason: "AI response parsing failed - manual review needed",
    };

    #[test]
    fn extracts_object_from_fenced_block() {
        let text = "Sure, result:\n```json\n{\"classification\":\"RED\",\"risk_score\":20}\n```";
        assert_eq!(
            extract_json_object(text),
            Some("{\"classification\":\"RED\",\"risk_score\":20}")
        );
        let data = decode(text).unwrap();
        assert_eq!(data["classification"], "RED");
    }

    #[test]
    fn braces_inside_strings_do_not_close_the_object() {
        let text = r#"Here: {"summary": "use {{client_name}} and a stray } brace", "n": {"a": 1}} trailing {"x": 2}"#;
        let candidate = extract_json_object(text).unwrap();
        assert!(candidate.ends_with(r#""n": {"a": 1}}"#));
        let data = decode(text).unwrap();
        assert_eq!(data["summary"], "use {{client_name}} and a stray } brace");
        assert!(!data.contains_key("x"));
    }

    #[test]
    fn escaped_quotes_inside_strings() {
        let text = r#"{"summary": "she said \"} {\" loudly", "score": 5}"#;
        let data = decode(text).unwrap();
        assert_eq!(data["score"], 5);
    }

    #[test]
    fn only_first_of_multiple_objects() {
        let text = r#"{"classification": "GREEN"} and then {"classification": "RED"}"#;
        let data = decode(text).unwrap();
        assert_eq!(data["classification"], "GREEN");
    }

    #[test]
    fn no_brace_is_no_json_object() {
        assert_eq!(decode("I cannot assess this case."), Err(ParseFailure::NoJsonObject));
        assert_eq!(decode("} backwards {"), Err(ParseFailure::NoJsonObject));
        assert_eq!(decode(""), Err(ParseFailure::NoJsonObject));
    }

    #[test]
    fn unbalanced_candidate_is_invalid_json() {
        let err = decode(r#"{"a": {"b": 1} oops }"#).unwrap_err();
        assert!(matches!(err, ParseFailure::InvalidJson(_)));

        let err = decode(r#"{"a": {"b": 1}"#).unwrap_err();
        assert!(matches!(err, ParseFailure::InvalidJson(_)));
    }

    #[test]
    fn multibyte_text_around_object() {
        let text = "Résumé — voilà: {\"summary\": \"café ✓\"} ✔";
        let data = decode(text).unwrap();
        assert_eq!(data["summary"], "café ✓");
    }

    #[test]
    fn classification_field_rules() {
        let data = json!({"a": "RED", "b": "ORANGE", "c": null, "d": 3})
            .as_object()
            .unwrap()
            .clone();
        assert_eq!(
            classification_field(&data, "a", Classification::Yellow),
            Ok(Classification::Red)
        );
        assert_eq!(
            classification_field(&data, "b", Classification::Yellow),
            Err(ParseFailure::UnknownClassification("ORANGE".into()))
        );
        assert_eq!(
            classification_field(&data, "c", Classification::Yellow),
            Ok(Classification::Yellow)
        );
        assert_eq!(
            classification_field(&data, "missing", Classification::Green),
            Ok(Classification::Green)
        );
        assert!(classification_field(&data, "d", Classification::Yellow).is_err());
    }

    #[test]
    fn field_helpers_default_on_wrong_types() {
        let data = json!({"s": 1, "n": "12", "b": "yes", "arr": {}, "obj": []})
            .as_object()
            .unwrap()
            .clone();
        assert_eq!(str_field(&data, "s"), "");
        assert_eq!(number_field(&data, "n"), Some(12.0));
        assert!(!bool_field(&data, "b", false));
        assert!(array_field(&data, "arr").is_empty());
        assert_eq!(object_field(&data, "obj"), json!({}));
        assert_eq!(raw_field(&data, "missing"), Value::Null);
    }

    #[test]
    fn parse_with_degrades_and_keeps_raw_text() {
        let result = parse_with("test", "no json here", &POLICY, |_| unreachable!());
        assert_eq!(result.classification, Classification::Yellow);
        assert_eq!(result.summary, "Failed to parse response");
        assert!(result.escalation_required);
        assert_eq!(result.raw_response, "no json here");
        assert!(result.meta("parse_failure").is_some());
    }

    #[test]
    fn parse_with_invalid_json_summary() {
        let result = parse_with("test", "{not json}", &POLICY, |_| unreachable!());
        assert_eq!(result.summary, "Invalid JSON in response");
        assert_eq!(
            result.escalation_reason.as_deref(),
            Some("AI response parsing failed - manual review needed")
        );
    }

    #[test]
    fn parse_with_schema_violation_degrades() {
        let result = parse_with("test", r#"{"classification": "PURPLE"}"#, &POLICY, |data| {
            let c = classification_field(data, "classification", Classification::Yellow)?;
            Ok(SkillResult::new(c))
        });
        assert!(result.escalation_required);
        assert_eq!(result.classification, Classification::Yellow);
        assert!(
            result.meta("parse_failure").unwrap().as_str().unwrap().contains("PURPLE")
        );
    }

    #[test]
    fn parse_with_success_sets_raw_text() {
        let text = r#"{"classification": "GREEN"}"#;
        let result = parse_with("test", text, &POLICY, |data| {
            Ok(SkillResult::new(classification_field(
                data,
                "classification",
                Classification::Yellow,
            )?))
        });
        assert_eq!(result.classification, Classification::Green);
        assert!(!result.escalation_required);
        assert_eq!(result.raw_response, text);
    }
}
