//! `lexskill status`: configuration summary.

use super::load_config;
use lexskill_config::AppConfig;
use lexskill_skills::builtin_skills;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;

    println!("LexSkill Status");
    println!("===============");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Model:        {}", config.default_model);
    println!(
        "  Base URL:     {}",
        config.base_url.as_deref().unwrap_or("https://api.anthropic.com (default)")
    );
    println!("  Timeout:      {}s", config.request_timeout_secs);
    println!(
        "  Retries:      {} (base {}ms, max {}ms)",
        config.retry.max_retries, config.retry.base_delay_ms, config.retry.max_delay_ms
    );
    println!("  Concurrency:  {}", config.batch.concurrency);
    println!(
        "  API key:      {}",
        if config.has_api_key() { "configured" } else { "missing" }
    );

    println!("\n  Skills:");
    for skill in builtin_skills() {
        let name = &skill.config().name;
        let model = config
            .skills
            .get(name)
            .and_then(|o| o.model.as_deref())
            .unwrap_or(&config.default_model);
        println!("    {name:<22} {model}");
    }

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file, run `lexskill onboard` first");
    }

    Ok(())
}
