//! Collections risk: severity × likelihood scoring with a dunning cadence.
//!
//! Classification is derived locally from the model's `risk_score`; any
//! classification the model asserts is ignored.

use crate::parse::{self, FallbackPolicy};
use lexskill_core::{Classification, Skill, SkillConfig, SkillResult};
use serde_json::Value;

pub const NAME: &str = "collections_risk";

/// Score used when the model omits `risk_score`.
pub const DEFAULT_RISK_SCORE: f64 = 10.0;

const DOMAIN_TRIGGERS: &[&str] = &[
    "Client explicitly disputes owing the amount",
    "Client threatens complaint or litigation",
    "Case involves personal injury or sensitive matter",
    "Total firm exposure with this client exceeds $50,000",
];

const FALLBACK: FallbackPolicy = FallbackPolicy {
    classification: Classification::Yellow,
    missing_summary: "Failed to parse response",
    invalid_summary: "Invalid JSON in response",
    reason: "AI response parsing failed - manual review needed",
};

/// Map a 1-25 risk score onto the severity vocabulary.
///
/// `<= 4` is GREEN, `<= 15` is YELLOW, anything higher is RED.
pub fn classify_risk_score(score: f64) -> Classification {
    if score <= 4.0 {
        Classification::Green
    } else if score <= 15.0 {
        Classification::Yellow
    } else {
        Classification::Red
    }
}

/// Step in the collections communication cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DunningStage {
    Reminder,
    FollowUp,
    Urgent,
    Final,
}

impl DunningStage {
    pub const ALL: [DunningStage; 4] = [Self::Reminder, Self::FollowUp, Self::Urgent, Self::Final];

    /// Stage for an invoice this many days past due; none before day 5.
    pub fn for_days_past_due(days: u32) -> Option<Self> {
        match days {
            0..=4 => None,
            5..=14 => Some(Self::Reminder),
            15..=29 => Some(Self::FollowUp),
            30..=44 => Some(Self::Urgent),
            _ => Some(Self::Final),
        }
    }

    /// 1-based stage number as used in `recommended_stage`.
    pub fn number(&self) -> u8 {
        match self {
            Self::Reminder => 1,
            Self::FollowUp => 2,
            Self::Urgent => 3,
            Self::Final => 4,
        }
    }

    pub fn from_number(n: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|s| u64::from(s.number()) == n)
    }

    pub fn days_label(&self) -> &'static str {
        match self {
            Self::Reminder => "5-14 days",
            Self::FollowUp => "15-29 days",
            Self::Urgent => "30-44 days",
            Self::Final => "45+ days",
        }
    }

    pub fn guidance(&self) -> &'static str {
        match self {
            Self::Reminder => "Friendly reminder, assume oversight",
            Self::FollowUp => "Firm follow-up, request response",
            Self::Urgent => "Urgent notice, payment plan offer",
            Self::Final => "Final notice, NOIW warning",
        }
    }
}

/// The stage the model recommended, if it named a valid one.
pub fn recommended_stage(result: &SkillResult) -> Option<DunningStage> {
    result
        .meta("recommended_stage")
        .and_then(Value::as_u64)
        .and_then(DunningStage::from_number)
}

pub struct CollectionsRiskSkill {
    config: SkillConfig,
}

impl CollectionsRiskSkill {
    pub fn new() -> Self {
        Self {
            config: SkillConfig::new(NAME, "Assess collection risk and recommend dunning approach"),
        }
    }

    fn dunning_guidelines() -> String {
        DunningStage::ALL
            .iter()
            .map(|s| format!("- **Stage {} ({})**: {}\n", s.number(), s.days_label(), s.guidance()))
            .collect()
    }
}

impl Default for CollectionsRiskSkill {
    fn default() -> Self {
        Self::new()
    }
}

impl Skill for CollectionsRiskSkill {
    fn config(&self) -> &SkillConfig {
        &self.config
    }

    fn config_mut(&mut self) -> &mut SkillConfig {
        &mut self.config
    }

    fn system_prompt(&self) -> String {
        format!(
            r#"You are a collections risk assessment assistant for a law firm.
You evaluate client payment risk and recommend appropriate collection actions.

{disclaimer}

## Risk Assessment Framework

### Severity (Financial Impact) - Score 1-5

| Score | Label | Criteria |
|-------|-------|----------|
| 1 | Minimal | <$500 outstanding, single invoice |
| 2 | Low | $500-$2,000 outstanding |
| 3 | Moderate | $2,000-$10,000 outstanding |
| 4 | High | $10,000-$25,000 outstanding |
| 5 | Critical | >$25,000 outstanding or multiple cases delinquent |

### Likelihood (Payment Default Risk) - Score 1-5

| Score | Label | Criteria |
|-------|-------|----------|
| 1 | Remote | First-time delay, excellent history, responsive |
| 2 | Unlikely | Occasional delays, good communication, active case |
| 3 | Possible | Multiple delays, needs reminders, case active |
| 4 | Likely | Broken promises, limited responsiveness, case may be complete |
| 5 | Almost Certain | 60+ days overdue, unresponsive, multiple broken promises |

### Risk Modifiers

**Reduce risk score by 1-2 if:**
- Long-term client with good historical relationship
- Active case with clear ongoing value to client
- Recent significant payment received
- Payment plan in place and currently compliant

**Increase risk score by 1-2 if:**
- New client with no payment history
- Case closed with poor outcome
- Prior collection issues at this firm
- Client disputed invoice legitimacy
- Contact information may be outdated

## Risk Score Interpretation

| Score | Risk Level | Color | Recommended Action |
|-------|------------|-------|-------------------|
| 1-4 | Low | GREEN | Standard dunning sequence |
| 5-9 | Medium | YELLOW | Accelerated dunning, offer payment plan |
| 10-15 | High | YELLOW | Attorney review, NOIW consideration |
| 16-25 | Critical | RED | Immediate NOIW, potential withdrawal |

## Dunning Stage Guidelines

Based on days past due:
{dunning}
{escalation}
## Output Format

Respond with a JSON object:
```json
{{
  "classification": "GREEN|YELLOW|RED",
  "risk_score": 1-25,
  "severity": {{
    "score": 1-5,
    "label": "string",
    "rationale": "string"
  }},
  "likelihood": {{
    "score": 1-5,
    "label": "string",
    "rationale": "string"
  }},
  "modifiers_applied": [
    {{"type": "increase|decrease", "reason": "string", "amount": 1-2}}
  ],
  "summary": "Brief assessment",
  "recommended_stage": 1-4,
  "recommended_actions": [
    {{"action": "string", "timing": "string", "channel": "email|phone|letter"}}
  ],
  "payment_plan_recommended": true|false,
  "noiw_recommended": true|false,
  "communication_tone": "friendly|firm|urgent|final",
  "issues": [
    {{"category": "string", "description": "string", "severity": "high|medium|low"}}
  ],
  "escalation_required": true|false,
  "escalation_reason": "string or null"
}}
```
"#,
            disclaimer = self.config.disclaimer(),
            dunning = Self::dunning_guidelines(),
            escalation = self.config.escalation_section("collections-specific", DOMAIN_TRIGGERS),
        )
    }

    fn parse_response(&self, response: &str) -> SkillResult {
        parse::parse_with(NAME, response, &FALLBACK, |data| {
            let risk_score = parse::number_field(data, "risk_score").unwrap_or(DEFAULT_RISK_SCORE);

            let mut result = SkillResult::new(classify_risk_score(risk_score));
            result.score = Some(risk_score);
            result.summary = parse::str_field(data, "summary");
            result.issues = parse::array_field(data, "issues");
            result.recommendations = parse::array_field(data, "recommended_actions");
            result.escalation_required = parse::bool_field(data, "escalation_required", false);
            result.escalation_reason = parse::opt_str_field(data, "escalation_reason");

            let meta = &mut result.metadata;
            meta.insert("severity".into(), parse::object_field(data, "severity"));
            meta.insert("likelihood".into(), parse::object_field(data, "likelihood"));
            meta.insert(
                "modifiers".into(),
                Value::Array(parse::array_field(data, "modifiers_applied")),
            );
            meta.insert("recommended_stage".into(), parse::raw_field(data, "recommended_stage"));
            meta.insert(
                "payment_plan_recommended".into(),
                Value::Bool(parse::bool_field(data, "payment_plan_recommended", false)),
            );
            meta.insert(
                "noiw_recommended".into(),
                Value::Bool(parse::bool_field(data, "noiw_recommended", false)),
            );
            meta.insert(
                "communication_tone".into(),
                Value::from(
                    parse::opt_str_field(data, "communication_tone").unwrap_or_else(|| "firm".into()),
                ),
            );
            Ok(result)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(v: Value) -> SkillResult {
        CollectionsRiskSkill::new().parse_response(&v.to_string())
    }

    #[test]
    fn score_boundaries() {
        assert_eq!(classify_risk_score(1.0), Classification::Green);
        assert_eq!(classify_risk_score(4.0), Classification::Green);
        assert_eq!(classify_risk_score(5.0), Classification::Yellow);
        assert_eq!(classify_risk_score(15.0), Classification::Yellow);
        assert_eq!(classify_risk_score(16.0), Classification::Red);
        assert_eq!(classify_risk_score(25.0), Classification::Red);
    }

    #[test]
    fn classification_derived_from_score_not_model() {
        let result = parse(json!({"classification": "RED", "risk_score": 3}));
        assert_eq!(result.classification, Classification::Green);
        assert_eq!(result.score, Some(3.0));

        let result = parse(json!({"classification": "GREEN", "risk_score": 20}));
        assert_eq!(result.classification, Classification::Red);
    }

    #[test]
    fn off_vocabulary_model_classification_is_ignored() {
        let result = parse(json!({"classification": "ORANGE", "risk_score": 12}));
        assert_eq!(result.classification, Classification::Yellow);
        assert!(!result.escalation_required);
    }

    #[test]
    fn missing_score_defaults_to_ten() {
        let result = parse(json!({"summary": "Limited data"}));
        assert_eq!(result.score, Some(DEFAULT_RISK_SCORE));
        assert_eq!(result.classification, Classification::Yellow);
    }

    #[test]
    fn metadata_projection() {
        let result = parse(json!({
            "risk_score": 18,
            "severity": {"score": 4, "label": "High", "rationale": "$14k outstanding"},
            "likelihood": {"score": 4, "label": "Likely", "rationale": "Two broken promises"},
            "modifiers_applied": [{"type": "increase", "reason": "Prior issues", "amount": 2}],
            "recommended_stage": 4,
            "recommended_actions": [{"action": "Send NOIW", "timing": "Today", "channel": "letter"}],
            "noiw_recommended": true,
            "escalation_required": true,
            "escalation_reason": "Client disputes the invoice"
        }));

        assert_eq!(result.classification, Classification::Red);
        assert_eq!(result.recommendations[0]["action"], "Send NOIW");
        assert_eq!(result.meta("severity").unwrap()["label"], "High");
        assert_eq!(result.meta("modifiers").unwrap().as_array().unwrap().len(), 1);
        assert_eq!(result.meta("noiw_recommended"), Some(&json!(true)));
        assert_eq!(result.meta("payment_plan_recommended"), Some(&json!(false)));
        assert_eq!(result.meta("communication_tone"), Some(&json!("firm")));
        assert_eq!(recommended_stage(&result), Some(DunningStage::Final));
        assert!(result.escalation_required);
    }

    #[test]
    fn model_escalation_honored_as_is() {
        let result = parse(json!({"risk_score": 22, "escalation_required": false}));
        assert_eq!(result.classification, Classification::Red);
        assert!(!result.escalation_required);
    }

    #[test]
    fn dunning_stage_windows() {
        assert_eq!(DunningStage::for_days_past_due(0), None);
        assert_eq!(DunningStage::for_days_past_due(4), None);
        assert_eq!(DunningStage::for_days_past_due(5), Some(DunningStage::Reminder));
        assert_eq!(DunningStage::for_days_past_due(14), Some(DunningStage::Reminder));
        assert_eq!(DunningStage::for_days_past_due(15), Some(DunningStage::FollowUp));
        assert_eq!(DunningStage::for_days_past_due(30), Some(DunningStage::Urgent));
        assert_eq!(DunningStage::for_days_past_due(44), Some(DunningStage::Urgent));
        assert_eq!(DunningStage::for_days_past_due(45), Some(DunningStage::Final));
        assert_eq!(DunningStage::for_days_past_due(400), Some(DunningStage::Final));
    }

    #[test]
    fn prompt_lists_stages_and_triggers() {
        let prompt = CollectionsRiskSkill::new().system_prompt();
        assert!(prompt.contains("- **Stage 1 (5-14 days)**: Friendly reminder, assume oversight"));
        assert!(prompt.contains("- **Stage 4 (45+ days)**: Final notice, NOIW warning"));
        assert!(prompt.contains("Additional collections-specific triggers:"));
        assert!(prompt.contains("exceeds $50,000"));
    }

    #[test]
    fn unparseable_response_escalates_yellow() {
        let result = CollectionsRiskSkill::new().parse_response("```json\n{risk_score: 12}\n```");
        assert_eq!(result.classification, Classification::Yellow);
        assert_eq!(result.summary, "Invalid JSON in response");
        assert!(result.escalation_required);
    }
}
