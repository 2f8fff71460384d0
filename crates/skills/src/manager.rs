//! Skill manager: the registry and the single execution path.
//!
//! Holds named skill instances, builds each prompt, performs one provider
//! call per item, delegates parsing to the skill, and stamps the result
//! with the model and skill name.

use crate::{BriefingSkill, CaseTriageSkill, ChargeExtractionSkill, CollectionsRiskSkill, DocumentGenerationSkill};
use futures::stream::{self, StreamExt};
use lexskill_config::SkillOverride;
use lexskill_core::error::{Error, ProviderError, Result};
use lexskill_core::{Provider, ProviderRequest, Skill, SkillResult};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Name and description of a registered skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillInfo {
    pub name: String,
    pub description: String,
}

/// Render task input as the user turn.
///
/// Objects are pretty-printed JSON, strings pass through unchanged, and
/// any other value uses its compact JSON form.
pub fn serialize_input(input: &Value) -> String {
    match input {
        Value::Object(_) => serde_json::to_string_pretty(input).unwrap_or_else(|_| input.to_string()),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Fresh instances of the five built-in skills, in registration order.
pub fn builtin_skills() -> Vec<Box<dyn Skill>> {
    vec![
        Box::new(CaseTriageSkill::new()),
        Box::new(CollectionsRiskSkill::new()),
        Box::new(BriefingSkill::new()),
        Box::new(ChargeExtractionSkill::new()),
        Box::new(DocumentGenerationSkill::new()),
    ]
}

/// Registry of skills bound to one provider.
///
/// Skills keep registration order. Registering a name that already exists
/// replaces that skill in place: the latest registration wins.
pub struct SkillManager {
    provider: Arc<dyn Provider>,
    skills: Vec<Box<dyn Skill>>,
}

impl SkillManager {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            skills: Vec::new(),
        }
    }

    /// A manager with all five built-in skills registered.
    pub fn with_defaults(provider: Arc<dyn Provider>) -> Self {
        let mut manager = Self::new(provider);
        for skill in builtin_skills() {
            manager.register(skill);
        }
        manager
    }

    /// Register a skill. Replaces any existing skill with the same name.
    pub fn register(&mut self, skill: Box<dyn Skill>) {
        match self.skills.iter().position(|s| s.name() == skill.name()) {
            Some(i) => {
                debug!(skill = %skill.name(), "Replacing registered skill");
                self.skills[i] = skill;
            }
            None => self.skills.push(skill),
        }
    }

    /// Get a skill by name.
    pub fn get(&self, name: &str) -> Option<&dyn Skill> {
        self.skills.iter().find(|s| s.name() == name).map(|s| s.as_ref())
    }

    /// All registered skills, in registration order.
    pub fn list_skills(&self) -> Vec<SkillInfo> {
        self.skills
            .iter()
            .map(|s| SkillInfo {
                name: s.config().name.clone(),
                description: s.config().description.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Point every skill at `model`. Per-skill overrides applied later still win.
    pub fn set_default_model(&mut self, model: &str) {
        for skill in &mut self.skills {
            skill.config_mut().model = model.to_string();
        }
    }

    /// Apply per-skill model and budget overrides, keyed by skill name.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, SkillOverride>) {
        for (name, over) in overrides {
            let Some(skill) = self.skills.iter_mut().find(|s| s.name() == name) else {
                warn!(skill = %name, "Override for unknown skill ignored");
                continue;
            };
            let config = skill.config_mut();
            if let Some(model) = &over.model {
                config.model = model.clone();
            }
            if let Some(max_tokens) = over.max_tokens {
                config.max_tokens = max_tokens;
            }
        }
    }

    /// Run one skill on one input.
    ///
    /// Fails with [`Error::UnknownSkill`] for an unregistered name and with
    /// [`Error::Provider`] when the model call fails. Malformed model output
    /// is not an error: it comes back as an escalated result.
    pub async fn execute(&self, name: &str, input: &Value, context: Option<&str>) -> Result<SkillResult> {
        let skill = self
            .get(name)
            .ok_or_else(|| Error::UnknownSkill(name.to_string()))?;
        let config = skill.config();

        let request = ProviderRequest::single_turn(
            config.model.clone(),
            config.max_tokens,
            skill.build_system_prompt(context),
            serialize_input(input),
        );

        debug!(
            skill = %name,
            model = %config.model,
            max_tokens = config.max_tokens,
            provider = %self.provider.name(),
            "Executing skill"
        );

        let response = self.provider.complete(request).await?;
        let text = response.first_text().ok_or(ProviderError::EmptyResponse)?;

        let mut result = skill.parse_response(text);
        result.raw_response = text.to_string();
        result.metadata.insert("model".into(), Value::from(config.model.clone()));
        result.metadata.insert("skill".into(), Value::from(name));

        info!(
            skill = %name,
            classification = %result.classification,
            escalation_required = result.escalation_required,
            "Skill completed"
        );

        Ok(result)
    }

    /// Run one skill over many inputs, strictly in order.
    ///
    /// The first error aborts the batch; remaining items are not sent.
    pub async fn batch_execute(
        &self,
        name: &str,
        items: &[Value],
        context: Option<&str>,
    ) -> Result<Vec<SkillResult>> {
        let mut results = Vec::with_capacity(items.len());
        for item in items {
            results.push(self.execute(name, item, context).await?);
        }
        Ok(results)
    }

    /// Run one skill over many inputs with at most `concurrency` in flight.
    ///
    /// Results come back in input order, one per item. A failed item does
    /// not stop the others.
    pub async fn batch_execute_concurrent(
        &self,
        name: &str,
        items: &[Value],
        context: Option<&str>,
        concurrency: usize,
    ) -> Vec<Result<SkillResult>> {
        stream::iter(items.iter().map(|item| self.execute(name, item, context)))
            .buffered(concurrency.max(1))
            .collect()
            .await
    }
}
