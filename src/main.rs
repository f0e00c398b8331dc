use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use configuration::{UnderwritingConfig, load_settings, logging::init_tracing};
use core_types::ApplicationData;
use engine::{DealRequest, UnderwritingEngine};
use rust_decimal::Decimal;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod report;
mod statement;

/// The entry point for the underwriting command-line tool.
fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging settings live in the same file as the reference tables, so the
    // raw settings are loaded before the subscriber and validated after it.
    let settings = load_settings(cli.config.as_deref()).context("Failed to load configuration")?;
    let _guard = init_tracing(&settings.logging)?;
    let config = UnderwritingConfig::from_settings(settings).context("Configuration is invalid")?;

    match cli.command {
        Commands::Evaluate(args) => handle_evaluate(args, config),
        Commands::Grades => {
            println!("{}", report::render_grades(&config.grades));
            Ok(())
        }
        Commands::CheckConfig => {
            println!(
                "Configuration OK: {} rules, {} lenders, {} grades, {} industries",
                config.rules.len(),
                config.lenders.len(),
                config.grades.rows().len(),
                config.industries.len()
            );
            Ok(())
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Scores merchant-funding applications from bank statement data.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to underwriting.toml. Built-in tables are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a deal through classification, analytics, scoring and pricing.
    Evaluate(EvaluateArgs),
    /// Print the letter-grade table.
    Grades,
    /// Load and validate every reference table, then exit.
    CheckConfig,
}

#[derive(Parser)]
struct EvaluateArgs {
    /// Statement CSV with columns date,amount,direction,memo,balance.
    #[arg(long)]
    transactions: PathBuf,

    /// Application JSON (credit score, time in business, industry, ...).
    #[arg(long)]
    application: PathBuf,

    /// The advance the merchant asked for.
    #[arg(long)]
    requested: Decimal,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

// ==============================================================================
// Evaluate Command Logic
// ==============================================================================

fn load_application(path: &Path) -> Result<ApplicationData> {
    let file = File::open(path).with_context(|| format!("Failed to open application {}", path.display()))?;
    serde_json::from_reader(file).with_context(|| format!("Failed to parse application {}", path.display()))
}

fn handle_evaluate(args: EvaluateArgs, config: UnderwritingConfig) -> Result<()> {
    let transactions = statement::load_statement(&args.transactions)?;
    let application = load_application(&args.application)?;
    let request = DealRequest::new(application, transactions, args.requested);

    let engine = UnderwritingEngine::new(Arc::new(config));
    let decision = engine.evaluate(&request).context("Underwriting failed")?;

    match args.format {
        OutputFormat::Table => print!("{}", report::render_decision(&decision, &engine.config().weights)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&decision)?),
    }
    Ok(())
}
