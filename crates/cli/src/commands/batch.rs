//! `lexskill batch`: one skill over a JSON array of inputs.

use super::{build_manager, load_config, read_input};
use lexskill_core::{Classification, SkillResult};
use serde_json::{Value, json};

pub async fn run(
    skill: &str,
    input: &str,
    context: Option<&str>,
    concurrency: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let manager = build_manager(&config)?;

    let Value::Array(items) = read_input(Some(input))? else {
        return Err(format!("{input} must contain a JSON array").into());
    };
    let concurrency = concurrency.unwrap_or(config.batch.concurrency).max(1);

    tracing::info!(skill = %skill, items = items.len(), concurrency, "Starting batch");

    // Sequential mode stops at the first failure; concurrent mode reports per item.
    let output: Vec<Value> = if concurrency == 1 {
        let results = manager.batch_execute(skill, &items, context).await?;
        print_tally(results.iter());
        results
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<_, _>>()?
    } else {
        let results = manager
            .batch_execute_concurrent(skill, &items, context, concurrency)
            .await;
        print_tally(results.iter().filter_map(|r| r.as_ref().ok()));
        results
            .into_iter()
            .map(|r| match r {
                Ok(result) => serde_json::to_value(&result).unwrap_or(Value::Null),
                Err(e) => json!({ "error": e.to_string() }),
            })
            .collect()
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tally<'a>(results: impl Iterator<Item = &'a SkillResult>) {
    let mut counts = [0usize; 3];
    let mut escalations = 0;
    for result in results {
        counts[result.classification as usize] += 1;
        if result.escalation_required {
            escalations += 1;
        }
    }
    let summary: Vec<String> = Classification::ALL
        .iter()
        .zip(counts)
        .map(|(c, n)| format!("{c}: {n}"))
        .collect();
    eprintln!("{}  escalations: {escalations}", summary.join("  "));
}
