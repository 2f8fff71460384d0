//! Skill trait: one task domain sharing the uniform result contract.
//!
//! A skill knows two things: how to instruct the model (its system prompt)
//! and how to turn the model's free-text reply back into a [`SkillResult`].
//! Both are pure functions of skill state; the network call lives in the
//! skill manager.

use crate::result::SkillResult;
use serde::{Deserialize, Serialize};

/// Default model for every skill unless overridden.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Default output budget.
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Disclaimer injected into every skill prompt.
pub const DISCLAIMER: &str = "\
**Important**: You assist with law firm operational workflows but do not provide
legal advice. All assessments should be reviewed by qualified professionals
before being relied upon for legal decisions.";

/// Escalation triggers that apply to every skill.
pub const UNIVERSAL_ESCALATION_TRIGGERS: &[&str] = &[
    "Matter involves potential litigation or malpractice claim",
    "Client threatens bar complaint or lawsuit",
    "Regulatory or ethics inquiry involved",
    "Media attention is involved or likely",
    "Situation is unprecedented (no prior handling by the firm)",
    "Matter involves firm leadership or partners",
    "Client is unresponsive for 60+ days with significant balance",
];

/// Identity and budget of a skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillConfig {
    /// Unique key in the registry
    pub name: String,

    /// One-line description for listings
    pub description: String,

    /// Model identifier sent to the provider
    pub model: String,

    /// Output token budget
    pub max_tokens: u32,

    /// Universal escalation triggers; domain triggers are appended in the prompt
    pub escalation_triggers: Vec<String>,
}

impl SkillConfig {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            model: DEFAULT_MODEL.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            escalation_triggers: UNIVERSAL_ESCALATION_TRIGGERS
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// The disclaimer every prompt carries.
    pub fn disclaimer(&self) -> &'static str {
        DISCLAIMER
    }

    /// Render the "Escalation Triggers" prompt section: universal triggers
    /// first, then the domain-specific ones under their own heading.
    pub fn escalation_section(&self, domain_label: &str, domain_triggers: &[&str]) -> String {
        let mut out = String::from("## Escalation Triggers\n");
        for trigger in &self.escalation_triggers {
            out.push_str("- ");
            out.push_str(trigger);
            out.push('\n');
        }
        if !domain_triggers.is_empty() {
            out.push_str(&format!("\nAdditional {domain_label} triggers:\n"));
            for trigger in domain_triggers {
                out.push_str("- ");
                out.push_str(trigger);
                out.push('\n');
            }
        }
        out
    }
}

/// The core Skill trait.
///
/// Each task domain (case triage, collections risk, briefing, charge
/// extraction, document generation) implements this trait and is
/// registered with the skill manager under `config().name`.
pub trait Skill: Send + Sync {
    /// Identity, model and budget.
    fn config(&self) -> &SkillConfig;

    /// Mutable access for per-deployment model/budget overrides.
    fn config_mut(&mut self) -> &mut SkillConfig;

    /// The full system prompt for this skill.
    fn system_prompt(&self) -> String;

    /// Turn the model's reply into a result.
    ///
    /// Must never fail: malformed replies degrade into an escalated result.
    fn parse_response(&self, response: &str) -> SkillResult;

    /// Registry key.
    fn name(&self) -> &str {
        &self.config().name
    }

    /// System prompt plus optional caller context under its own heading.
    fn build_system_prompt(&self, additional_context: Option<&str>) -> String {
        let mut prompt = self.system_prompt();
        if let Some(context) = additional_context.filter(|c| !c.is_empty()) {
            prompt.push_str("\n\n## Additional Context\n");
            prompt.push_str(context);
        }
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::Classification;

    struct EchoSkill {
        config: SkillConfig,
    }

    impl Skill for EchoSkill {
        fn config(&self) -> &SkillConfig {
            &self.config
        }

        fn config_mut(&mut self) -> &mut SkillConfig {
            &mut self.config
        }

        fn system_prompt(&self) -> String {
            format!("You echo.\n\n{}", self.config.disclaimer())
        }

        fn parse_response(&self, response: &str) -> SkillResult {
            let mut result = SkillResult::new(Classification::Green);
            result.summary = response.to_string();
            result
        }
    }

    fn echo() -> EchoSkill {
        EchoSkill {
            config: SkillConfig::new("echo", "Echo input"),
        }
    }

    #[test]
    fn config_defaults() {
        let config = SkillConfig::new("echo", "Echo input");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(config.escalation_triggers.len(), UNIVERSAL_ESCALATION_TRIGGERS.len());
    }

    #[test]
    fn builder_overrides() {
        let config = SkillConfig::new("echo", "Echo input")
            .with_model("claude-haiku")
            .with_max_tokens(512);
        assert_eq!(config.model, "claude-haiku");
        assert_eq!(config.max_tokens, 512);
    }

    #[test]
    fn context_appended_under_heading() {
        let skill = echo();
        let prompt = skill.build_system_prompt(Some("Client speaks Spanish"));
        assert!(prompt.starts_with("You echo."));
        assert!(prompt.ends_with("## Additional Context\nClient speaks Spanish"));
    }

    #[test]
    fn no_context_leaves_prompt_untouched() {
        let skill = echo();
        assert_eq!(skill.build_system_prompt(None), skill.system_prompt());
        assert_eq!(skill.build_system_prompt(Some("")), skill.system_prompt());
    }

    #[test]
    fn escalation_section_lists_universal_then_domain() {
        let config = SkillConfig::new("echo", "Echo input");
        let section = config.escalation_section("case-specific", &["Court date within 7 days"]);
        let universal = section.find("malpractice").unwrap();
        let domain = section.find("Court date within 7 days").unwrap();
        assert!(universal < domain);
        assert!(section.contains("Additional case-specific triggers:"));
    }

    #[test]
    fn name_comes_from_config() {
        assert_eq!(echo().name(), "echo");
    }
}
