//! Template variable resolution and plain placeholder substitution.

use chrono::{Datelike, NaiveDate};
use lexskill_core::error::{Error, Result};
use regex_lite::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// `{{ name }}` placeholders; the name is trimmed.
const PLACEHOLDER_PATTERN: &str = r"\{\{([^}]+)\}\}";

/// Where a variable's value came from, in resolution priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableSource {
    Explicit,
    CaseData,
    Computed,
    Inferred,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedVariable {
    pub value: Value,
    pub source: VariableSource,
    pub confidence: Confidence,
}

/// Outcome of resolving a template's variables before any model inference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableResolution {
    pub resolved: BTreeMap<String, ResolvedVariable>,
    /// Names left for the model to infer, in template order
    pub missing: Vec<String>,
}

impl VariableResolution {
    /// Flat name → value map of everything resolved.
    pub fn values(&self) -> Map<String, Value> {
        self.resolved
            .iter()
            .map(|(name, v)| (name.clone(), v.value.clone()))
            .collect()
    }

    /// Name → `{value, source, confidence}` objects.
    pub fn to_map(&self) -> Result<Map<String, Value>> {
        match serde_json::to_value(&self.resolved)? {
            Value::Object(map) => Ok(map),
            other => Err(Error::Internal(format!(
                "resolved variables serialized as non-object: {other}"
            ))),
        }
    }
}

/// Values derivable without any case data.
fn computed_value(name: &str, today: NaiveDate) -> Option<Value> {
    match name {
        "current_date" => Some(Value::from(today.format("%Y-%m-%d").to_string())),
        "current_year" => Some(Value::from(today.year())),
        _ => None,
    }
}

/// Resolve each named variable: explicit value, then case data, then a
/// computed value. Null values count as absent.
pub fn resolve_variables(
    names: &[String],
    explicit: &Map<String, Value>,
    case_data: &Map<String, Value>,
    today: NaiveDate,
) -> VariableResolution {
    let mut resolution = VariableResolution::default();

    for name in names {
        let found = |map: &Map<String, Value>| map.get(name).filter(|v| !v.is_null()).cloned();

        let resolved = if let Some(value) = found(explicit) {
            Some((value, VariableSource::Explicit, Confidence::High))
        } else if let Some(value) = found(case_data) {
            Some((value, VariableSource::CaseData, Confidence::Medium))
        } else {
            computed_value(name, today).map(|v| (v, VariableSource::Computed, Confidence::High))
        };

        match resolved {
            Some((value, source, confidence)) => {
                resolution.resolved.insert(
                    name.clone(),
                    ResolvedVariable {
                        value,
                        source,
                        confidence,
                    },
                );
            }
            None if !resolution.missing.contains(name) => resolution.missing.push(name.clone()),
            None => {}
        }
    }

    resolution
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Replace `{{name}}` placeholders with values; unknown names stay as written.
pub fn substitute(content: &str, values: &Map<String, Value>) -> String {
    let Ok(re) = Regex::new(PLACEHOLDER_PATTERN) else {
        return content.to_string();
    };
    re.replace_all(content, |caps: &Captures<'_>| match values.get(caps[1].trim()) {
        Some(value) => display(value),
        None => caps[0].to_string(),
    })
    .into_owned()
}

/// Placeholder names in order of first appearance.
pub fn placeholders(content: &str) -> Vec<String> {
    let Ok(re) = Regex::new(PLACEHOLDER_PATTERN) else {
        return Vec::new();
    };
    let mut names: Vec<String> = Vec::new();
    for caps in re.captures_iter(content) {
        let name = caps[1].trim().to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}
