//! Document generation: fill a firm template and assess the draft's quality.

use crate::parse::{self, FallbackPolicy};
use lexskill_core::{Classification, Skill, SkillConfig, SkillResult};
use serde_json::Value;

pub const NAME: &str = "document_generation";

const FALLBACK: FallbackPolicy = FallbackPolicy {
    classification: Classification::Red,
    missing_summary: "Failed to parse document generation response",
    invalid_summary: "Invalid JSON in response",
    reason: "AI response parsing failed - manual drafting needed",
};

pub struct DocumentGenerationSkill {
    config: SkillConfig,
}

impl DocumentGenerationSkill {
    pub fn new() -> Self {
        Self {
            config: SkillConfig::new(
                NAME,
                "Generate legal documents from templates with AI customization",
            )
            .with_max_tokens(8192),
        }
    }
}

impl Default for DocumentGenerationSkill {
    fn default() -> Self {
        Self::new()
    }
}

impl Skill for DocumentGenerationSkill {
    fn config(&self) -> &SkillConfig {
        &self.config
    }

    fn config_mut(&mut self) -> &mut SkillConfig {
        &mut self.config
    }

    fn system_prompt(&self) -> String {
        format!(
            r#"You are a legal document drafting assistant for a law firm.
You generate customized legal documents by filling templates with case-specific information
while maintaining proper legal language and formatting.

{disclaimer}

## Document Generation Process

### 1. Template Analysis
- Identify all variables/placeholders in the template (marked as {{{{variable_name}}}})
- Understand the document structure and required sections
- Note any conditional sections based on case type or circumstances

### 2. Variable Resolution
Values already resolved are listed under "resolved_variables" with their source.
For each remaining variable, determine the value from:
1. **Explicit values**: Provided directly in the request
2. **Case data**: Retrieved from the case management system
3. **Computed values**: Calculated from other data (dates, deadlines, etc.)
4. **AI inference**: Reasonably inferred from context (with confidence flag)

### 3. Content Adaptation
Based on the context provided, adapt the document content:
- **Court-specific language**: Use proper forms of address and procedural references
- **Case-type adjustments**: Tailor arguments and references to the case type
- **Client circumstances**: Incorporate relevant facts that strengthen the document
- **Jurisdiction requirements**: Ensure compliance with local rules

### 4. Quality Assessment

**GREEN - Ready for Review**
- All required variables filled
- Content appropriate for the case type and court
- No logical inconsistencies
- Proper legal formatting maintained

**YELLOW - Needs Attorney Review**
- Some variables inferred (not explicitly provided)
- Content adapted significantly from template
- Unusual circumstances that may need verification
- First use of template for this case type

**RED - Requires Revision**
- Missing critical information
- Potential factual inconsistencies
- Template may not be appropriate for the situation
- Legal arguments may need strengthening

{escalation}
## Output Format

Respond with a JSON object:
```json
{{
  "classification": "GREEN|YELLOW|RED",
  "document_content": "Full document text with all variables filled",
  "variables_filled": {{
    "variable_name": {{
      "value": "the value used",
      "source": "explicit|case_data|computed|inferred",
      "confidence": "high|medium|low"
    }}
  }},
  "missing_variables": ["list of variables that could not be filled"],
  "adaptations_made": [
    {{"section": "string", "change": "string", "reason": "string"}}
  ],
  "review_notes": [
    {{"issue": "string", "recommendation": "string", "priority": "HIGH|MEDIUM|LOW"}}
  ],
  "summary": "Brief description of the generated document",
  "escalation_required": true|false,
  "escalation_reason": "string or null"
}}
```

## Important Guidelines

1. **Preserve Legal Precision**: Never paraphrase legal terms of art or citations
2. **Flag Uncertainty**: Always note when information is inferred vs. explicitly provided
3. **Maintain Formatting**: Keep the document structure intact (headers, numbering, etc.)
4. **Date Accuracy**: Use current date unless otherwise specified
5. **Name Consistency**: Use exact names as provided throughout
6. **Court Protocols**: Follow proper court formatting and addressing conventions
"#,
            disclaimer = self.config.disclaimer(),
            escalation = self.config.escalation_section("drafting", &[]),
        )
    }

    fn parse_response(&self, response: &str) -> SkillResult {
        parse::parse_with(NAME, response, &FALLBACK, |data| {
            let mut result = SkillResult::new(parse::classification_field(
                data,
                "classification",
                Classification::Yellow,
            )?);
            result.summary = parse::str_field(data, "summary");
            result.issues = parse::array_field(data, "review_notes");
            result.recommendations = parse::array_field(data, "adaptations_made");
            result.escalation_required = parse::bool_field(data, "escalation_required", false);
            result.escalation_reason = parse::opt_str_field(data, "escalation_reason");

            let meta = &mut result.metadata;
            meta.insert(
                "document_content".into(),
                Value::from(parse::str_field(data, "document_content")),
            );
            meta.insert(
                "variables_filled".into(),
                parse::object_field(data, "variables_filled"),
            );
            meta.insert(
                "missing_variables".into(),
                Value::Array(parse::array_field(data, "missing_variables")),
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
    fn budget_is_8192() {
        let skill = DocumentGenerationSkill::new();
        assert_eq!(skill.config().max_tokens, 8192);
        assert_eq!(skill.name(), NAME);
    }

    #[test]
    fn prompt_shows_placeholder_syntax() {
        let prompt = DocumentGenerationSkill::new().system_prompt();
        assert!(prompt.contains("(marked as {{variable_name}})"));
        assert!(prompt.contains("\"source\": \"explicit|case_data|computed|inferred\""));
    }

    #[test]
    fn parses_draft() {
        let response = json!({
            "classification": "GREEN",
            "document_content": "IN THE MUNICIPAL COURT OF HAMILTON\n\nComes now Jane Roe...",
            "variables_filled": {"client_name": {"value": "Jane Roe", "source": "explicit", "confidence": "high"}},
            "missing_variables": [],
            "adaptations_made": [{"section": "Caption", "change": "Court name", "reason": "Venue"}],
            "review_notes": [{"issue": "Verify BAC", "recommendation": "Check report", "priority": "LOW"}],
            "summary": "Plea drafted",
            "escalation_required": false,
            "escalation_reason": null
        });
        let result = DocumentGenerationSkill::new().parse_response(&response.to_string());

        assert_eq!(result.classification, Classification::Green);
        assert!(result.score.is_none());
        assert_eq!(result.issues[0]["issue"], "Verify BAC");
        assert_eq!(result.recommendations[0]["section"], "Caption");
        assert!(result.meta("document_content").unwrap().as_str().unwrap().contains("Jane Roe"));
        assert_eq!(
            result.meta("variables_filled").unwrap()["client_name"]["source"],
            "explicit"
        );
        assert!(!result.escalation_required);
    }

    #[test]
    fn escalation_as_supplied() {
        let result = DocumentGenerationSkill::new().parse_response(
            r#"{"classification": "YELLOW", "escalation_required": true, "escalation_reason": "Unusual venue"}"#,
        );
        assert!(result.escalation_required);
        assert_eq!(result.escalation_reason.as_deref(), Some("Unusual venue"));
        assert_eq!(result.meta("document_content"), Some(&json!("")));
    }

    #[test]
    fn unparseable_response_is_red() {
        let result = DocumentGenerationSkill::new().parse_response("Dear Judge,");
        assert_eq!(result.classification, Classification::Red);
        assert_eq!(result.summary, "Failed to parse document generation response");
        assert_eq!(
            result.escalation_reason.as_deref(),
            Some("AI response parsing failed - manual drafting needed")
        );
        assert!(result.meta("document_content").is_none());
    }

    #[test]
    fn braces_in_document_body() {
        let response = r#"Draft below.
{"classification": "YELLOW", "document_content": "Total due: {{amount}} } payable", "summary": "ok"}
Let me know if you need changes {or not}."#;
        let result = DocumentGenerationSkill::new().parse_response(response);
        assert_eq!(result.classification, Classification::Yellow);
        assert_eq!(
            result.meta("document_content"),
            Some(&json!("Total due: {{amount}} } payable"))
        );
    }
}
