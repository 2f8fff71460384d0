//! Daily operations briefing for a staff member.

use crate::parse::{self, FallbackPolicy};
use lexskill_core::{Classification, Skill, SkillConfig, SkillResult};
use serde_json::Value;

pub const NAME: &str = "briefing";

/// Priority alerts at or above this count force escalation.
pub const ALERT_ESCALATION_THRESHOLD: usize = 5;

pub const ALERT_ESCALATION_REASON: &str = "High number of priority alerts";

const FALLBACK: FallbackPolicy = FallbackPolicy {
    classification: Classification::Yellow,
    missing_summary: "Failed to parse briefing response",
    invalid_summary: "Invalid JSON in briefing response",
    reason: "AI response parsing failed - manual review needed",
};

/// `max(0, 100 - 10 × alerts)`.
pub fn briefing_score(alert_count: usize) -> f64 {
    100usize.saturating_sub(alert_count.saturating_mul(10)) as f64
}

pub struct BriefingSkill {
    config: SkillConfig,
}

impl BriefingSkill {
    pub fn new() -> Self {
        Self {
            config: SkillConfig::new(NAME, "Generate daily ops briefings for staff members")
                .with_max_tokens(4096),
        }
    }
}

impl Default for BriefingSkill {
    fn default() -> Self {
        Self::new()
    }
}

impl Skill for BriefingSkill {
    fn config(&self) -> &SkillConfig {
        &self.config
    }

    fn config_mut(&mut self) -> &mut SkillConfig {
        &mut self.config
    }

    fn system_prompt(&self) -> String {
        format!(
            r#"You are an operations briefing assistant for a law firm.
You synthesize case management and collections data into actionable daily briefings.

{disclaimer}

## Staff Roles and Briefing Focus

| Role | Focus Areas | Key Metrics |
|------|-------------|-------------|
| AR Specialist | Collections, payment plans, aging, NOIW | AR total, 60+ day %, compliance rate |
| Intake Lead | New cases, leads, case setup | Cases/week, conversion, assignment rate |
| Senior Paralegal | Tasks, team ops, daily huddle | Open tasks, done this week, overdue |
| Legal Assistant | Case tasks, discovery, filings | Assigned tasks, deadlines, completions |

## Briefing Structure

### 1. Priority Alerts (RED)
Critical items requiring immediate attention:
- Overdue statutory deadlines (DOR/PFR filings)
- Severely delinquent accounts (60+ days)
- Cases stalled >50% over expected duration
- Critical tasks overdue
- NOIW cases requiring action

### 2. Today's Focus (YELLOW)
Items needing attention today:
- Cases approaching phase limits
- Follow-up calls scheduled/needed
- Documents awaiting review
- Deadlines within 7 days
- Payment promises due today

### 3. Metrics Snapshot
Key numbers for the day:
- Open cases by phase
- AR aging summary
- Task completion rate
- Collection activity

### 4. Wins & Progress (GREEN)
Brief acknowledgment of positive items:
- Cases closed this week
- Payments received
- Tasks completed
- Payment plans established

### 5. Action Items
Specific, assignable tasks:
- Clear description of what needs to be done
- Owner (specific person)
- Priority (HIGH/MEDIUM/LOW)
- Deadline (specific date)

## Briefing Tone Guidelines

- **Concise**: Scannable, no fluff
- **Actionable**: Every item has a next step
- **Prioritized**: Most important first
- **Specific**: Names, numbers, dates

{escalation}
## Output Format

Respond with a JSON object:
```json
{{
  "briefing_date": "YYYY-MM-DD",
  "staff_role": "string",
  "staff_name": "string",
  "priority_alerts": [
    {{
      "type": "deadline|collections|case_stalled|task_overdue|noiw",
      "description": "string",
      "case_id": "string or null",
      "action_required": "string",
      "deadline": "string"
    }}
  ],
  "todays_focus": [
    {{"category": "string", "description": "string", "related_items": ["string"]}}
  ],
  "metrics_snapshot": {{
    "primary_metrics": [
      {{"name": "string", "value": "string", "trend": "up|down|stable", "status": "good|warning|critical"}}
    ]
  }},
  "wins": [
    {{"description": "string"}}
  ],
  "action_items": [
    {{"action": "string", "owner": "string", "priority": "HIGH|MEDIUM|LOW", "deadline": "string", "context": "string"}}
  ],
  "summary": "1-2 sentence overall assessment",
  "overall_status": "GREEN|YELLOW|RED"
}}
```
"#,
            disclaimer = self.config.disclaimer(),
            escalation = self.config.escalation_section("briefing", &[]),
        )
    }

    fn parse_response(&self, response: &str) -> SkillResult {
        parse::parse_with(NAME, response, &FALLBACK, |data| {
            let classification =
                parse::classification_field(data, "overall_status", Classification::Yellow)?;
            let alerts = parse::array_field(data, "priority_alerts");
            let alert_count = alerts.len();

            let mut result = SkillResult::new(classification);
            result.score = Some(briefing_score(alert_count));
            result.summary = parse::str_field(data, "summary");
            result.issues = alerts;
            result.recommendations = parse::array_field(data, "action_items");
            // Escalation follows the alert count only; the reply schema has no escalation fields.
            if alert_count >= ALERT_ESCALATION_THRESHOLD {
                result.escalate(ALERT_ESCALATION_REASON);
            }

            let meta = &mut result.metadata;
            meta.insert("briefing_date".into(), parse::raw_field(data, "briefing_date"));
            meta.insert("staff_role".into(), parse::raw_field(data, "staff_role"));
            meta.insert("staff_name".into(), parse::raw_field(data, "staff_name"));
            meta.insert(
                "todays_focus".into(),
                Value::Array(parse::array_field(data, "todays_focus")),
            );
            meta.insert(
                "metrics_snapshot".into(),
                parse::object_field(data, "metrics_snapshot"),
            );
            meta.insert("wins".into(), Value::Array(parse::array_field(data, "wins")));
            Ok(result)
        })
    }
}

fn text_or<'a>(value: Option<&'a Value>, default: &'a str) -> &'a str {
    value.and_then(Value::as_str).unwrap_or(default)
}

/// Display form of a JSON value: strings unquoted, null as "None".
fn display(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "None".into(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Render a briefing result as readable markdown.
pub fn format_briefing_markdown(result: &SkillResult) -> String {
    let meta = &result.metadata;
    let mut lines = vec![
        format!("# Daily Briefing - {}", text_or(meta.get("staff_name"), "Staff")),
        format!("**Date**: {}", text_or(meta.get("briefing_date"), "Today")),
        format!("**Role**: {}", text_or(meta.get("staff_role"), "Unknown")),
        format!("**Status**: {}", result.classification),
        String::new(),
        "## Summary".into(),
        result.summary.clone(),
        String::new(),
    ];

    if !result.issues.is_empty() {
        lines.push("## 🔴 Priority Alerts".into());
        for alert in &result.issues {
            lines.push(format!(
                "- **{}**: {}",
                text_or(alert.get("type"), "Alert"),
                display(alert.get("description"))
            ));
            if let Some(action) = alert.get("action_required").and_then(Value::as_str) {
                if !action.is_empty() {
                    lines.push(format!("  - Action: {action}"));
                }
            }
        }
        lines.push(String::new());
    }

    let focus = meta.get("todays_focus").and_then(Value::as_array);
    if let Some(items) = focus.filter(|items| !items.is_empty()) {
        lines.push("## 🟡 Today's Focus".into());
        for item in items {
            lines.push(format!(
                "- **{}**: {}",
                display(item.get("category")),
                display(item.get("description"))
            ));
        }
        lines.push(String::new());
    }

    let metrics = meta
        .get("metrics_snapshot")
        .and_then(|m| m.get("primary_metrics"))
        .and_then(Value::as_array);
    if let Some(metrics) = metrics.filter(|m| !m.is_empty()) {
        lines.push("## 📊 Metrics Snapshot".into());
        for metric in metrics {
            let marker = match text_or(metric.get("status"), "good") {
                "good" => "✅",
                "warning" => "⚠️",
                "critical" => "🔴",
                _ => "📊",
            };
            lines.push(format!(
                "- {marker} **{}**: {}",
                display(metric.get("name")),
                display(metric.get("value"))
            ));
        }
        lines.push(String::new());
    }

    let wins = meta.get("wins").and_then(Value::as_array);
    if let Some(wins) = wins.filter(|w| !w.is_empty()) {
        lines.push("## 🟢 Wins & Progress".into());
        for win in wins {
            lines.push(format!("- {}", display(win.get("description"))));
        }
        lines.push(String::new());
    }

    if !result.recommendations.is_empty() {
        lines.push("## ✅ Action Items".into());
        for item in &result.recommendations {
            let marker = match text_or(item.get("priority"), "MEDIUM") {
                "HIGH" => "🔴",
                "MEDIUM" => "🟡",
                "LOW" => "🟢",
                _ => "⬜",
            };
            lines.push(format!("- {marker} **{}**", display(item.get("action"))));
            lines.push(format!(
                "  - Owner: {} | Due: {}",
                display(item.get("owner")),
                display(item.get("deadline"))
            ));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}
