//! Case triage: case health against the seven-phase case framework.
//!
//! The model supplies score, classification and escalation directly; the
//! phase assessment is stored in metadata as returned, never re-derived.

use crate::parse::{self, FallbackPolicy};
use lexskill_core::{Classification, Skill, SkillConfig, SkillResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const NAME: &str = "case_triage";

/// One phase of the case lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CasePhase {
    pub number: u8,
    pub name: &'static str,
    pub owner: &'static str,
    pub min_days: u32,
    pub max_days: u32,
}

pub const CASE_PHASES: [CasePhase; 7] = [
    CasePhase { number: 1, name: "Intake & Case Initiation", owner: "Intake Team", min_days: 1, max_days: 3 },
    CasePhase { number: 2, name: "Discovery & Investigation", owner: "Paralegals", min_days: 14, max_days: 56 },
    CasePhase { number: 3, name: "Legal Analysis & Motion Practice", owner: "Attorneys", min_days: 21, max_days: 70 },
    CasePhase { number: 4, name: "Case Strategy & Negotiation", owner: "Attorneys", min_days: 14, max_days: 42 },
    CasePhase { number: 5, name: "Trial Preparation", owner: "Attorneys", min_days: 14, max_days: 56 },
    CasePhase { number: 6, name: "Disposition & Sentencing", owner: "Attorneys", min_days: 1, max_days: 42 },
    CasePhase { number: 7, name: "Post-Disposition & Case Closure", owner: "Admin", min_days: 7, max_days: 28 },
];

/// Look up a phase by its 1-based number.
pub fn case_phase(number: u8) -> Option<&'static CasePhase> {
    CASE_PHASES.iter().find(|p| p.number == number)
}

const DOMAIN_TRIGGERS: &[&str] = &[
    "License filing deadline within 5 days",
    "Court date within 7 days with incomplete preparation",
    "Discovery deadline within 14 days with outstanding items",
];

const FALLBACK: FallbackPolicy = FallbackPolicy {
    classification: Classification::Yellow,
    missing_summary: "Failed to parse response",
    invalid_summary: "Invalid JSON in response",
    reason: "AI response parsing failed - manual review needed",
};

/// Typed view of the `phase_assessment` metadata entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseAssessment {
    pub current_phase: Option<u8>,
    pub days_in_phase: Option<f64>,
    pub expected_duration: Option<f64>,
    /// "on_track", "at_risk" or "overdue"
    pub phase_health: Option<String>,
}

impl PhaseAssessment {
    pub fn phase(&self) -> Option<&'static CasePhase> {
        self.current_phase.and_then(case_phase)
    }

    /// Days in phase as a fraction of the expected duration.
    pub fn progress(&self) -> Option<f64> {
        match (self.days_in_phase, self.expected_duration) {
            (Some(days), Some(expected)) if expected > 0.0 => Some(days / expected),
            _ => None,
        }
    }
}

/// Read the phase assessment back out of a triage result.
///
/// Returns `None` when the entry is missing or not shaped like an assessment.
pub fn phase_assessment(result: &SkillResult) -> Option<PhaseAssessment> {
    let value = result.meta("phase_assessment")?;
    serde_json::from_value(value.clone()).ok()
}

pub struct CaseTriageSkill {
    config: SkillConfig,
}

impl CaseTriageSkill {
    pub fn new() -> Self {
        Self {
            config: SkillConfig::new(NAME, "Assess case health using GREEN/YELLOW/RED classification"),
        }
    }

    fn phase_table() -> String {
        let mut table = String::from(
            "| Phase | Name | Owner | Typical Duration |\n|-------|------|-------|------------------|\n",
        );
        for p in &CASE_PHASES {
            table.push_str(&format!(
                "| {} | {} | {} | {}-{} days |\n",
                p.number, p.name, p.owner, p.min_days, p.max_days
            ));
        }
        table
    }
}

impl Default for CaseTriageSkill {
    fn default() -> Self {
        Self::new()
    }
}

impl Skill for CaseTriageSkill {
    fn config(&self) -> &SkillConfig {
        &self.config
    }

    fn config_mut(&mut self) -> &mut SkillConfig {
        &mut self.config
    }

    fn system_prompt(&self) -> String {
        format!(
            r#"You are a case health assessment assistant for a law firm.
You evaluate cases against operational standards and flag those requiring attention.

{disclaimer}

## 7-Phase Case Framework

{phases}
## Classification Criteria

### GREEN - On Track
All of the following must be true:
- Case progressing within expected phase duration
- All required tasks for current phase completed or on schedule
- Client communication within last 14 days
- No critical data missing (lead attorney, client contact)
- Financial status current (no invoices 30+ days overdue)

### YELLOW - Attention Needed
One or more of the following:
- Case at 75-100% of expected phase duration
- 1-2 non-critical tasks overdue
- Client contact needed within 7 days
- Minor data quality issues (missing non-critical fields)
- Invoice 30-59 days overdue

### RED - Immediate Action Required
One or more of the following:
- Case exceeded expected phase duration by >25%
- 3+ overdue tasks OR any critical task overdue
- No client contact in 30+ days
- Missing critical data (no lead attorney, no client contact info)
- Invoice 60+ days overdue or payment plan severely delinquent
- Approaching statutory deadline (DOR/PFR filing)

{escalation}
## Output Format

Respond with a JSON object:
```json
{{
  "classification": "GREEN|YELLOW|RED",
  "score": 0-100,
  "summary": "Brief 1-2 sentence assessment",
  "phase_assessment": {{
    "current_phase": 1-7,
    "days_in_phase": number,
    "expected_duration": number,
    "phase_health": "on_track|at_risk|overdue"
  }},
  "issues": [
    {{"category": "string", "description": "string", "severity": "high|medium|low"}}
  ],
  "recommendations": [
    {{"action": "string", "owner": "string", "priority": "HIGH|MEDIUM|LOW", "deadline": "string"}}
  ],
  "escalation_required": true|false,
  "escalation_reason": "string or null"
}}
```
"#,
            disclaimer = self.config.disclaimer(),
            phases = Self::phase_table(),
            escalation = self.config.escalation_section("case-specific", DOMAIN_TRIGGERS),
        )
    }

    fn parse_response(&self, response: &str) -> SkillResult {
        parse::parse_with(NAME, response, &FALLBACK, |data| {
            let mut result = SkillResult::new(parse::classification_field(
                data,
                "classification",
                Classification::Yellow,
            )?);
            result.score = parse::number_field(data, "score");
            result.summary = parse::str_field(data, "summary");
            result.issues = parse::array_field(data, "issues");
            result.recommendations = parse::array_field(data, "recommendations");
            result.escalation_required = parse::bool_field(data, "escalation_required", false);
            result.escalation_reason = parse::opt_str_field(data, "escalation_reason");
            result.metadata.insert(
                "phase_assessment".into(),
                parse::object_field(data, "phase_assessment"),
            );
            Ok(result)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prompt_carries_phase_table_and_triggers() {
        let prompt = CaseTriageSkill::new().system_prompt();
        assert!(prompt.contains("| 3 | Legal Analysis & Motion Practice | Attorneys | 21-70 days |"));
        assert!(prompt.contains("| 7 | Post-Disposition & Case Closure | Admin | 7-28 days |"));
        assert!(prompt.contains("do not provide\nlegal advice"));
        assert!(prompt.contains("Client threatens bar complaint or lawsuit"));
        assert!(prompt.contains("Additional case-specific triggers:"));
        assert!(prompt.contains("License filing deadline within 5 days"));
        assert!(prompt.contains("\"phase_health\": \"on_track|at_risk|overdue\""));
    }

    #[test]
    fn parses_full_response() {
        let response = json!({
            "classification": "RED",
            "score": 35,
            "summary": "Discovery 40% over expected duration",
            "phase_assessment": {
                "current_phase": 2,
                "days_in_phase": 78,
                "expected_duration": 56,
                "phase_health": "overdue"
            },
            "issues": [{"category": "timeline", "description": "Phase overdue", "severity": "high"}],
            "recommendations": [{"action": "Review discovery", "owner": "Lead attorney", "priority": "HIGH", "deadline": "Friday"}],
            "escalation_required": true,
            "escalation_reason": "Phase exceeded by more than 25%"
        })
        .to_string();

        let result = CaseTriageSkill::new().parse_response(&format!("Assessment:\n{response}"));
        assert_eq!(result.classification, Classification::Red);
        assert_eq!(result.score, Some(35.0));
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.recommendations[0]["owner"], "Lead attorney");
        assert!(result.escalation_required);
        assert_eq!(
            result.escalation_reason.as_deref(),
            Some("Phase exceeded by more than 25%")
        );

        let phase = phase_assessment(&result).unwrap();
        assert_eq!(phase.current_phase, Some(2));
        assert_eq!(phase.phase().unwrap().name, "Discovery & Investigation");
        assert!(phase.progress().unwrap() > 1.25);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let result = CaseTriageSkill::new().parse_response("{}");
        assert_eq!(result.classification, Classification::Yellow);
        assert_eq!(result.score, None);
        assert!(!result.escalation_required);
        assert_eq!(result.meta("phase_assessment"), Some(&json!({})));
        assert_eq!(phase_assessment(&result), Some(PhaseAssessment::default()));
    }

    #[test]
    fn unparseable_response_escalates_yellow() {
        let result = CaseTriageSkill::new().parse_response("The case looks fine to me.");
        assert_eq!(result.classification, Classification::Yellow);
        assert_eq!(result.summary, "Failed to parse response");
        assert!(result.escalation_required);
        assert_eq!(
            result.escalation_reason.as_deref(),
            Some("AI response parsing failed - manual review needed")
        );
    }

    #[test]
    fn off_vocabulary_classification_degrades() {
        let result = CaseTriageSkill::new().parse_response(r#"{"classification": "AMBER", "score": 60}"#);
        assert_eq!(result.classification, Classification::Yellow);
        assert_eq!(result.summary, "Invalid JSON in response");
        assert!(result.escalation_required);
        assert_eq!(result.score, None);
    }

    #[test]
    fn phase_lookup() {
        assert_eq!(case_phase(1).unwrap().max_days, 3);
        assert!(case_phase(0).is_none());
        assert!(case_phase(8).is_none());
        assert_eq!(CASE_PHASES.len(), 7);
    }

    #[test]
    fn malformed_phase_metadata_is_none() {
        let mut result = SkillResult::new(Classification::Green);
        result
            .metadata
            .insert("phase_assessment".into(), Value::String("phase 2".into()));
        assert!(phase_assessment(&result).is_none());
    }
}
