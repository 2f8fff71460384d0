//! `lexskill draft`: fill a template from a JSON catalog.

use super::{build_manager, load_config};
use lexskill_documents::{DocumentGenerator, GenerationRequest, InMemoryTemplateStore, Template};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

pub struct DraftArgs {
    pub template: String,
    pub templates: PathBuf,
    pub case_id: Option<u64>,
    pub vars: Vec<String>,
    pub purpose: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub no_ai: bool,
}

pub async fn run(args: DraftArgs) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = std::fs::read_to_string(&args.templates)
        .map_err(|e| format!("Cannot read {}: {e}", args.templates.display()))?;
    let templates: Vec<Template> = serde_json::from_str(&catalog)?;
    let store = Arc::new(InMemoryTemplateStore::new(templates));

    let mut generator = DocumentGenerator::new(store);
    if !args.no_ai {
        let config = load_config()?;
        generator = generator.with_skill_manager(Arc::new(build_manager(&config)?));
    }

    let mut request = GenerationRequest::new(args.template);
    request.case_id = args.case_id;
    request.purpose = args.purpose;
    request.output_dir = args.output_dir;
    for var in &args.vars {
        let (name, value) = parse_var(var)?;
        request = request.with_variable(name, value);
    }

    let outcome = generator.generate(&request).await?;

    println!("✅ {} → {}", outcome.template_used, outcome.output_path.display());
    println!("   Quality: {}", outcome.quality_assessment.classification);
    if !outcome.missing_variables.is_empty() {
        println!("   Missing: {}", outcome.missing_variables.join(", "));
    }
    if let Some(reason) = &outcome.quality_assessment.escalation_reason {
        println!("   ⚠️  {reason}");
    }
    Ok(())
}

/// `name=value`; the value is taken as JSON when it parses, text otherwise.
fn parse_var(raw: &str) -> Result<(String, Value), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("Expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("Empty variable name in '{raw}'"));
    }
    Ok((name.to_string(), super::parse_input(value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn variable_arguments() {
        assert_eq!(
            parse_var("client_name=Jane Roe").unwrap(),
            ("client_name".to_string(), json!("Jane Roe"))
        );
        assert_eq!(parse_var("count=3").unwrap().1, json!(3));
        assert_eq!(parse_var("note=a=b").unwrap().1, json!("a=b"));
        assert!(parse_var("novalue").is_err());
        assert!(parse_var("=x").is_err());
    }
}
