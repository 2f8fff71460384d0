//! `lexskill run`: one skill, one input.

use super::{build_manager, load_config, read_input};
use lexskill_skills::{briefing, format_briefing_markdown};

pub async fn run(
    skill: &str,
    input: Option<&str>,
    context: Option<&str>,
    markdown: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let manager = build_manager(&config)?;
    let input = read_input(input)?;

    let result = manager.execute(skill, &input, context).await?;

    if markdown && skill == briefing::NAME {
        println!("{}", format_briefing_markdown(&result));
    } else {
        if markdown {
            tracing::warn!(skill = %skill, "Markdown output is only available for briefings");
        }
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    Ok(())
}
