//! LexSkill CLI, the main entry point.
//!
//! Commands:
//! - `onboard` writes a default config
//! - `skills` lists registered skills
//! - `run` runs one skill on one input
//! - `batch` runs one skill over a JSON array
//! - `draft` fills a document template
//! - `status` shows configuration and key presence

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "lexskill",
    about = "LexSkill: structured, auditable AI assessments for legal operations",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config to ~/.lexskill/config.toml
    Onboard,

    /// List available skills
    Skills,

    /// Run one skill on one input
    Run {
        /// Skill name, e.g. case_triage
        skill: String,

        /// Input file (JSON or plain text); `-` or omitted reads stdin
        #[arg(short, long)]
        input: Option<String>,

        /// Extra context appended to the system prompt
        #[arg(short, long)]
        context: Option<String>,

        /// Print briefing results as markdown
        #[arg(long)]
        markdown: bool,
    },

    /// Run one skill over every element of a JSON array
    Batch {
        skill: String,

        /// File holding a JSON array of inputs
        #[arg(short, long)]
        input: String,

        #[arg(short, long)]
        context: Option<String>,

        /// Items in flight at once (defaults to `batch.concurrency`)
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Fill a document template
    Draft {
        /// Template name or search terms
        template: String,

        /// JSON file holding the template catalog
        #[arg(long)]
        templates: PathBuf,

        #[arg(long)]
        case_id: Option<u64>,

        /// Explicit variable, `name=value` (repeatable)
        #[arg(long = "var", value_name = "NAME=VALUE")]
        vars: Vec<String>,

        #[arg(long)]
        purpose: Option<String>,

        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Skip the model and fill placeholders directly
        #[arg(long)]
        no_ai: bool,
    },

    /// Show configuration status
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Skills => commands::skills::run().await?,
        Commands::Run {
            skill,
            input,
            context,
            markdown,
        } => commands::run::run(&skill, input.as_deref(), context.as_deref(), markdown).await?,
        Commands::Batch {
            skill,
            input,
            context,
            concurrency,
        } => commands::batch::run(&skill, &input, context.as_deref(), concurrency).await?,
        Commands::Draft {
            template,
            templates,
            case_id,
            vars,
            purpose,
            output_dir,
            no_ai,
        } => {
            commands::draft::run(commands::draft::DraftArgs {
                template,
                templates,
                case_id,
                vars,
                purpose,
                output_dir,
                no_ai,
            })
            .await?
        }
        Commands::Status => commands::status::run().await?,
    }

    Ok(())
}
