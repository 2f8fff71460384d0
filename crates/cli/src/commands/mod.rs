pub mod batch;
pub mod draft;
pub mod onboard;
pub mod run;
pub mod skills;
pub mod status;

use lexskill_config::{AppConfig, ConfigError};
use lexskill_core::Error;
use lexskill_skills::SkillManager;
use serde_json::Value;
use std::io::Read;

pub fn load_config() -> Result<AppConfig, Error> {
    AppConfig::load().map_err(config_error)
}

fn config_error(err: ConfigError) -> Error {
    Error::Config {
        message: err.to_string(),
    }
}

/// Manager with the built-in skills, the configured default model, then
/// per-skill overrides on top.
pub fn build_manager(config: &AppConfig) -> Result<SkillManager, Box<dyn std::error::Error>> {
    let provider = lexskill_providers::build_from_config(config)?;
    let mut manager = SkillManager::with_defaults(provider);
    manager.set_default_model(&config.default_model);
    manager.apply_overrides(&config.skills);
    Ok(manager)
}

/// Read task input from a file, or stdin for `-`/`None`.
pub fn read_input(path: Option<&str>) -> Result<Value, Box<dyn std::error::Error>> {
    let text = match path {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
        Some(path) => std::fs::read_to_string(path).map_err(|e| format!("Cannot read {path}: {e}"))?,
    };
    Ok(parse_input(&text))
}

/// JSON when it parses, otherwise the raw text (police reports, notes).
pub fn parse_input(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_or_text_input() {
        assert_eq!(parse_input(r#"{"case_id": 7}"#), json!({"case_id": 7}));
        assert_eq!(
            parse_input("Officer observed the vehicle weaving."),
            json!("Officer observed the vehicle weaving.")
        );
    }

    #[test]
    fn config_failures_become_config_errors() {
        let err = config_error(ConfigError::ValidationError(
            "batch.concurrency must be at least 1".into(),
        ));
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().starts_with("Configuration error: "));
        assert!(err.to_string().contains("batch.concurrency must be at least 1"));
    }

    #[test]
    fn input_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("case.json");
        std::fs::write(&path, r#"[{"a": 1}, {"a": 2}]"#).unwrap();
        let value = read_input(path.to_str()).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(2));
    }
}
