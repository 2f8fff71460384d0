//! The end-to-end document workflow.
//!
//! Template lookup, case context, variable resolution, drafting (through the
//! `document_generation` skill when a manager is attached, plain placeholder
//! substitution otherwise), rendering, and the generation log.

use crate::render::{DocumentRenderer, TextFileRenderer, output_filename};
use crate::store::{CaseStore, GeneratedDocument, Template, TemplateStore};
use crate::variables::{placeholders, resolve_variables, substitute};
use chrono::{Local, Utc};
use lexskill_core::error::{Error, Result};
use lexskill_core::{Classification, SkillResult};
use lexskill_skills::SkillManager;
use lexskill_skills::document;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

const NO_AI_REVIEW: &str = "No AI review - manual review required";

/// What to draft and for whom.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub template_name: String,
    pub case_id: Option<u64>,
    pub client_name: Option<String>,
    pub court: Option<String>,
    pub purpose: Option<String>,
    pub additional_context: Option<String>,
    pub explicit_variables: Map<String, Value>,
    /// Defaults to the working directory.
    pub output_dir: Option<PathBuf>,
}

impl GenerationRequest {
    pub fn new(template_name: impl Into<String>) -> Self {
        Self {
            template_name: template_name.into(),
            ..Self::default()
        }
    }

    pub fn with_case(mut self, case_id: u64) -> Self {
        self.case_id = Some(case_id);
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.explicit_variables.insert(name.into(), value.into());
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityAssessment {
    pub classification: Classification,
    pub issues: Vec<Value>,
    pub escalation_required: bool,
    pub escalation_reason: Option<String>,
}

impl QualityAssessment {
    fn from_result(result: &SkillResult) -> Self {
        Self {
            classification: result.classification,
            issues: result.issues.clone(),
            escalation_required: result.escalation_required,
            escalation_reason: result.escalation_reason.clone(),
        }
    }

    fn unreviewed() -> Self {
        Self {
            classification: Classification::Yellow,
            issues: vec![Value::from(NO_AI_REVIEW)],
            escalation_required: false,
            escalation_reason: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub output_path: PathBuf,
    pub template_used: String,
    pub quality_assessment: QualityAssessment,
    pub variables_filled: Map<String, Value>,
    pub missing_variables: Vec<String>,
    pub document_content: String,
}

struct Draft {
    content: String,
    assessment: QualityAssessment,
    variables_filled: Map<String, Value>,
    missing_variables: Vec<String>,
}

pub struct DocumentGenerator {
    templates: Arc<dyn TemplateStore>,
    cases: Option<Arc<dyn CaseStore>>,
    manager: Option<Arc<SkillManager>>,
    renderer: Box<dyn DocumentRenderer>,
}

impl DocumentGenerator {
    pub fn new(templates: Arc<dyn TemplateStore>) -> Self {
        Self {
            templates,
            cases: None,
            manager: None,
            renderer: Box::new(TextFileRenderer),
        }
    }

    pub fn with_case_store(mut self, cases: Arc<dyn CaseStore>) -> Self {
        self.cases = Some(cases);
        self
    }

    /// Draft through the model. Without a manager, templates are filled by
    /// plain substitution and flagged for manual review.
    pub fn with_skill_manager(mut self, manager: Arc<SkillManager>) -> Self {
        self.manager = Some(manager);
        self
    }

    pub fn with_renderer(mut self, renderer: Box<dyn DocumentRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutcome> {
        let template = self.find_template(&request.template_name).await?;
        let content = load_template_content(&template).await?;
        let case_context = self.case_context(request.case_id).await;

        let names = if template.variables.is_empty() {
            placeholders(&content)
        } else {
            template.variables.clone()
        };
        let now = Local::now().naive_local();
        let resolution = resolve_variables(&names, &request.explicit_variables, &case_context, now.date());

        debug!(
            template = %template.name,
            resolved = resolution.resolved.len(),
            missing = resolution.missing.len(),
            "Variables resolved"
        );

        let client_name = request
            .client_name
            .clone()
            .or_else(|| string_at(&case_context, "client_name"));

        let resolved = resolution.to_map()?;

        let draft = match &self.manager {
            Some(manager) => {
                let input = generation_input(
                    &template,
                    &content,
                    &case_context,
                    &resolved,
                    &resolution.missing,
                    request,
                    client_name.as_deref(),
                    now.date().format("%Y-%m-%d").to_string(),
                );
                self.draft_with_model(manager, &input, &resolved, &resolution.missing)
                    .await?
            }
            None => Draft {
                content: substitute(&content, &resolution.values()),
                assessment: QualityAssessment::unreviewed(),
                variables_filled: resolved,
                missing_variables: resolution.missing.clone(),
            },
        };

        let dir = request.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        let filename = output_filename(&template.name, request.case_id, now, self.renderer.extension());
        let output_path = dir.join(filename);
        self.renderer.render(&draft.content, &output_path).await?;

        self.templates
            .log_generation(GeneratedDocument {
                template_id: template.id,
                template_name: template.name.clone(),
                case_id: request.case_id,
                case_name: string_at(&case_context, "case_name"),
                client_id: case_context.get("client_id").and_then(Value::as_u64),
                client_name,
                court: request.court.clone(),
                purpose: request.purpose.clone(),
                variables_used: draft.variables_filled.clone(),
                output_path: output_path.clone(),
                generated_by: "system".into(),
                generated_at: Utc::now(),
            })
            .await?;

        info!(
            template = %template.name,
            classification = %draft.assessment.classification,
            path = %output_path.display(),
            "Document generated"
        );

        Ok(GenerationOutcome {
            output_path,
            template_used: template.name,
            quality_assessment: draft.assessment,
            variables_filled: draft.variables_filled,
            missing_variables: draft.missing_variables,
            document_content: draft.content,
        })
    }

    /// Exact name first, then the best search hit.
    async fn find_template(&self, name: &str) -> Result<Template> {
        if let Some(template) = self.templates.get_by_name(name).await? {
            return Ok(template);
        }
        self.templates
            .search(name, 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Document(format!("Template not found: {name}")))
    }

    /// Missing or failing case data never blocks drafting.
    async fn case_context(&self, case_id: Option<u64>) -> Map<String, Value> {
        let (Some(case_id), Some(cases)) = (case_id, &self.cases) else {
            return Map::new();
        };
        match cases.case_context(case_id).await {
            Ok(Some(context)) => context,
            Ok(None) => {
                debug!(case_id, "No case data");
                Map::new()
            }
            Err(e) => {
                warn!(case_id, error = %e, "Could not load case context");
                Map::new()
            }
        }
    }

    async fn draft_with_model(
        &self,
        manager: &SkillManager,
        input: &Value,
        resolved: &Map<String, Value>,
        missing: &[String],
    ) -> Result<Draft> {
        let result = manager.execute(document::NAME, input, None).await?;

        let content = result
            .meta("document_content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        if result.classification == Classification::Red && content.is_empty() {
            return Err(Error::Document(
                result
                    .escalation_reason
                    .clone()
                    .unwrap_or_else(|| "model returned no document".into()),
            ));
        }

        // The model's account of what it filled wins over the pre-resolution.
        let mut variables_filled = resolved.clone();
        if let Some(filled) = result.meta("variables_filled").and_then(Value::as_object) {
            variables_filled.extend(filled.clone());
        }

        let missing_variables = match result.meta("missing_variables").and_then(Value::as_array) {
            Some(items) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            None => missing.to_vec(),
        };

        Ok(Draft {
            content,
            assessment: QualityAssessment::from_result(&result),
            variables_filled,
            missing_variables,
        })
    }
}

/// Template body as text; a template without a readable file has an empty body.
async fn load_template_content(template: &Template) -> Result<String> {
    let Some(path) = &template.file_path else {
        return Ok(String::new());
    };
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(template = %template.name, path = %path.display(), "Template file missing");
            Ok(String::new())
        }
        Err(e) => Err(Error::Document(format!(
            "Cannot read template {}: {e}",
            path.display()
        ))),
    }
}

fn string_at(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

fn generation_input(
    template: &Template,
    content: &str,
    case_context: &Map<String, Value>,
    resolved: &Map<String, Value>,
    missing: &[String],
    request: &GenerationRequest,
    client_name: Option<&str>,
    current_date: String,
) -> Value {
    let case_type = string_at(case_context, "case_type").or_else(|| template.case_types.first().cloned());
    json!({
        "template_name": template.name,
        "template_content": content,
        "template_variables": template.variables,
        "template_description": template.description,
        "case_context": case_context,
        "explicit_values": request.explicit_variables,
        "resolved_variables": resolved,
        "missing_variables": missing,
        "client_name": client_name,
        "court": request.court.clone().or_else(|| template.court_type.clone()),
        "jurisdiction": template.jurisdiction,
        "case_type": case_type,
        "purpose": request.purpose,
        "additional_context": request.additional_context,
        "current_date": current_date,
    })
}
