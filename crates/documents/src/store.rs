//! Template catalog and case-data seams, with in-memory implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lexskill_core::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;

/// A firm document template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Plain-text body on disk; `None` means the template has no body yet.
    #[serde(default)]
    pub file_path: Option<PathBuf>,
    /// Placeholder names the template expects
    #[serde(default)]
    pub variables: Vec<String>,
    #[serde(default)]
    pub court_type: Option<String>,
    #[serde(default)]
    pub jurisdiction: Option<String>,
    #[serde(default)]
    pub case_types: Vec<String>,
}

/// One entry in the generation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedDocument {
    pub template_id: u64,
    pub template_name: String,
    pub case_id: Option<u64>,
    pub case_name: Option<String>,
    pub client_id: Option<u64>,
    pub client_name: Option<String>,
    pub court: Option<String>,
    pub purpose: Option<String>,
    pub variables_used: Map<String, Value>,
    pub output_path: PathBuf,
    pub generated_by: String,
    pub generated_at: DateTime<Utc>,
}

/// Where templates live and where generations are recorded.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Exact-name lookup.
    async fn get_by_name(&self, name: &str) -> Result<Option<Template>>;

    /// Free-text search, best match first.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Template>>;

    async fn log_generation(&self, document: GeneratedDocument) -> Result<()>;
}

/// Source of per-case facts used to fill template variables.
#[async_trait]
pub trait CaseStore: Send + Sync {
    /// Flat key/value view of a case, or `None` if the case is unknown.
    async fn case_context(&self, case_id: u64) -> Result<Option<Map<String, Value>>>;
}

/// Templates held in a `Vec`, with the generation log kept alongside.
#[derive(Default)]
pub struct InMemoryTemplateStore {
    templates: Vec<Template>,
    log: RwLock<Vec<GeneratedDocument>>,
}

impl InMemoryTemplateStore {
    pub fn new(templates: Vec<Template>) -> Self {
        Self {
            templates,
            log: RwLock::new(Vec::new()),
        }
    }

    /// Everything logged so far, oldest first.
    pub async fn generations(&self) -> Vec<GeneratedDocument> {
        self.log.read().await.clone()
    }
}

#[async_trait]
impl TemplateStore for InMemoryTemplateStore {
    async fn get_by_name(&self, name: &str) -> Result<Option<Template>> {
        Ok(self.templates.iter().find(|t| t.name == name).cloned())
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Template>> {
        let terms: Vec<String> = query
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        // Rank by how many query terms hit the name or description.
        let mut scored: Vec<(usize, &Template)> = self
            .templates
            .iter()
            .filter_map(|t| {
                let haystack = format!("{} {}", t.name, t.description).to_lowercase();
                let hits = terms.iter().filter(|term| haystack.contains(term.as_str())).count();
                (hits > 0).then_some((hits, t))
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(scored.into_iter().take(limit).map(|(_, t)| t.clone()).collect())
    }

    async fn log_generation(&self, document: GeneratedDocument) -> Result<()> {
        self.log.write().await.push(document);
        Ok(())
    }
}

/// Case contexts keyed by case id.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCaseStore {
    cases: HashMap<u64, Map<String, Value>>,
}

impl InMemoryCaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, case_id: u64, context: Map<String, Value>) {
        self.cases.insert(case_id, context);
    }
}

#[async_trait]
impl CaseStore for InMemoryCaseStore {
    async fn case_context(&self, case_id: u64) -> Result<Option<Map<String, Value>>> {
        Ok(self.cases.get(&case_id).cloned())
    }
}
