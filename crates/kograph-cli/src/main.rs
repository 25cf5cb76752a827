//! kograph CLI - Command-line interface
//!
//! Usage:
//!   kograph extract "<text>"
//!   kograph extract --file news.txt --strategy rules
//!   kograph extract --sample --no-save
//!   kograph sample
//!   kograph types

use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgGroup, Args, Parser, Subcommand};

use kograph_core::config::parse_temperature;
use kograph_core::{AppConfig, ConfigError, EntityType, LlmProvider, LoggingConfig};
use kograph_pipeline::{KnowledgeGraphPipeline, PipelineOutcome, StrategyChoice, SAMPLE_TEXT};

#[derive(Parser)]
#[command(name = "kograph")]
#[command(about = "Korean knowledge-graph extraction CLI")]
#[command(version)]
struct Cli {
    /// TOML configuration file (environment variables take precedence)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract entities and relations from text
    Extract(ExtractArgs),
    /// Print the built-in sample text
    Sample,
    /// List entity types and their colours
    Types,
}

#[derive(Args)]
#[command(group(ArgGroup::new("input").required(true).args(["text", "file", "sample"])))]
struct ExtractArgs {
    /// Text to analyze
    text: Option<String>,

    /// Read the text from a UTF-8 file
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Use the built-in sample text
    #[arg(long)]
    sample: bool,

    /// Extraction strategy: auto, llm, or rules
    #[arg(long, default_value_t = StrategyChoice::Auto)]
    strategy: StrategyChoice,

    /// LLM provider: gemini or openai
    #[arg(long)]
    provider: Option<LlmProvider>,

    /// Model name passed to the provider
    #[arg(long)]
    model: Option<String>,

    /// Generation temperature in [0.0, 1.0]
    #[arg(long, value_parser = parse_temperature_arg)]
    temperature: Option<f32>,

    /// API key (defaults to the provider's environment variable)
    #[arg(long)]
    api_key: Option<String>,

    /// Directory artifacts are written to
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Do not write artifact files
    #[arg(long)]
    no_save: bool,
}

fn parse_temperature_arg(value: &str) -> Result<f32, ConfigError> {
    parse_temperature("--temperature", value)
}

// ============================================================================
// Configuration and logging
// ============================================================================

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

/// Apply command-line overrides on top of file and environment settings
fn apply_overrides(config: &mut AppConfig, args: &ExtractArgs) {
    if let Some(provider) = args.provider {
        if provider != config.llm.provider {
            // a key configured for another provider does not carry over
            config.llm.provider = provider;
            config.llm.api_key = std::env::var(provider.api_key_env()).ok();
        }
    }
    if let Some(key) = &args.api_key {
        config.llm.api_key = Some(key.clone());
    }
    if let Some(model) = &args.model {
        config.llm.model = model.clone();
    }
    if let Some(temperature) = args.temperature {
        config.llm.temperature = temperature;
    }
    if let Some(dir) = &args.output_dir {
        config.output.dir = dir.clone();
    }
}

/// Logs go to stderr; RUST_LOG wins over the configured level
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.level.as_str().into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

// ============================================================================
// Commands
// ============================================================================

fn read_input(args: &ExtractArgs) -> anyhow::Result<String> {
    if args.sample {
        return Ok(SAMPLE_TEXT.to_string());
    }
    if let Some(path) = &args.file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }
    args.text
        .clone()
        .context("no input text given (use TEXT, --file, or --sample)")
}

async fn extract(mut config: AppConfig, args: ExtractArgs) -> anyhow::Result<()> {
    apply_overrides(&mut config, &args);

    let text = read_input(&args)?;
    if text.trim().is_empty() {
        anyhow::bail!("input text is empty");
    }

    tracing::debug!(
        provider = ?config.llm.provider,
        model = %config.llm.model,
        strategy = %args.strategy,
        "Configuration loaded"
    );

    let pipeline = KnowledgeGraphPipeline::new(&config.llm, args.strategy)?;
    let outcome = pipeline.run(&text).await;

    if !outcome.success {
        anyhow::bail!(
            "extraction failed: {}",
            outcome.message.as_deref().unwrap_or("unknown error")
        );
    }

    print_outcome(&outcome);

    if !args.no_save {
        let written = outcome.save(&config.output.dir)?;
        println!("\nArtifacts:");
        for (kind, path) in &written {
            println!("  {:<26} {}", kind.to_string(), path.display());
        }
    }

    Ok(())
}

fn print_outcome(outcome: &PipelineOutcome) {
    let summary = &outcome.summary;

    println!("Strategy:  {}", outcome.strategy);
    println!("Entities:  {}", outcome.entities().len());
    println!("Relations: {}", outcome.relations().len());

    println!("\nGraph metrics:");
    println!("  Nodes:      {}", summary.node_count);
    println!("  Edges:      {}", summary.edge_count);
    println!("  Density:    {:.4}", summary.density);
    println!("  Components: {}", summary.components);

    if !summary.entity_types.is_empty() {
        println!("\nEntity types:");
        for (entity_type, count) in &summary.entity_types {
            println!("  {:<14} {}", entity_type.as_str(), count);
        }
    }

    if !summary.relation_labels.is_empty() {
        println!("\nRelation labels:");
        for (label, count) in &summary.relation_labels {
            println!("  {:<14} {}", label, count);
        }
    }
}

fn print_types() {
    for entity_type in EntityType::ALL {
        println!(
            "{:<14} {}  {}",
            entity_type.as_str(),
            entity_type.color(),
            entity_type.description_ko()
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_ref())?;
    init_tracing(&config.logging);

    match cli.command {
        Commands::Extract(args) => extract(config, args).await?,
        Commands::Sample => print!("{}", SAMPLE_TEXT),
        Commands::Types => print_types(),
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
