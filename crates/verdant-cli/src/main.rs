//! `verdant`: RED/YELLOW/GREEN product verdicts from the command line.
//!
//! Logs go to stderr; stdout carries only the command's output.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use verdant_core::{OverallResult, RuleBook, Status, UserProfile};
use verdant_runtime::{Orchestrator, RuntimeConfig, SourceRegistry};

#[derive(Parser)]
#[command(name = "verdant", about = "Product health and values verdicts")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a product and print its verdict
    Analyze {
        /// Product identifier (usually a barcode)
        identifier: String,

        /// User profile (YAML or JSON)
        #[arg(short, long)]
        profile: Option<PathBuf>,

        /// Runtime configuration (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Rule book overriding the built-in tables (YAML)
        #[arg(short, long)]
        rules: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Validate a user profile file
    ValidateProfile {
        file: PathBuf,
    },

    /// List the configured source chain
    Sources {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the built-in rule book as YAML
    Rules,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Analyze {
            identifier,
            profile,
            config,
            rules,
            format,
        } => {
            analyze(
                &identifier,
                profile.as_deref(),
                config.as_deref(),
                rules.as_deref(),
                format,
            )
            .await
        }
        Commands::ValidateProfile { file } => validate_profile(&file),
        Commands::Sources { config } => list_sources(config.as_deref()),
        Commands::Rules => print_rules(),
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "verdant=debug" } else { "verdant=info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time(),
        )
        .init();
}

fn load_config(path: Option<&Path>) -> Result<RuntimeConfig> {
    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Loading runtime config");
            RuntimeConfig::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        }
        None => Ok(RuntimeConfig::default()),
    }
}

fn load_rules(path: Option<&Path>) -> Result<RuleBook> {
    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Loading rule book");
            RuleBook::from_yaml_file(path)
                .with_context(|| format!("Failed to load rule book from {}", path.display()))
        }
        None => Ok(RuleBook::default()),
    }
}

fn load_profile(path: &Path) -> Result<UserProfile> {
    UserProfile::from_file(path)
        .with_context(|| format!("Failed to load profile from {}", path.display()))
}

async fn analyze(
    identifier: &str,
    profile: Option<&Path>,
    config: Option<&Path>,
    rules: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let config = load_config(config)?;
    let rules = load_rules(rules)?;
    let profile = profile.map(load_profile).transpose()?;

    let orchestrator =
        Orchestrator::from_config(&config, &rules).context("Failed to build orchestrator")?;
    tracing::debug!(
        sources = orchestrator.resolver().sources().len(),
        evaluators = orchestrator.registry().len(),
        with_profile = profile.is_some(),
        "Orchestrator ready"
    );

    let result = orchestrator
        .handle(identifier, profile)
        .await
        .with_context(|| format!("Failed to evaluate product {}", identifier))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => print_text(&result),
    }

    Ok(())
}

fn status_marker(status: Status) -> &'static str {
    match status {
        Status::Red => "[RED]   ",
        Status::Yellow => "[YELLOW]",
        Status::Green => "[GREEN] ",
    }
}

fn print_text(result: &OverallResult) {
    println!("{} ({})", result.product_name, result.product_id);
    println!(
        "{} overall score {:.0}",
        status_marker(result.overall_status),
        result.overall_score
    );
    println!();

    for verdict in &result.agent_verdicts {
        println!(
            "{} {:<18} {:>3.0}  {}",
            status_marker(verdict.status),
            verdict.agent_name,
            verdict.score,
            verdict.reasoning
        );
    }
}

fn validate_profile(file: &Path) -> Result<()> {
    let profile = load_profile(file)?;

    println!("Profile is valid: {}", file.display());
    if let Some(user) = &profile.user_id {
        println!("  user: {}", user);
    }
    println!(
        "  allergens: {}",
        display_list(&profile.health_profile.allergens)
    );
    println!(
        "  conditions: {}",
        display_list(&profile.health_profile.conditions)
    );
    for (category, weight) in &profile.value_profile.weights {
        println!("  weight {}: {:.2}", category, weight);
    }

    Ok(())
}

fn display_list(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

fn list_sources(config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let registry = SourceRegistry::with_defaults();

    println!("Default timeout: {:?}", config.default_timeout);
    for (position, source) in config.sources.iter().enumerate() {
        let description = registry
            .description(&source.source_type)
            .unwrap_or("unregistered");
        println!(
            "{}. {} (timeout {:?}) - {}",
            position + 1,
            source.name.as_deref().unwrap_or(&source.source_type),
            config.timeout_for(source),
            description
        );
    }

    Ok(())
}

fn print_rules() -> Result<()> {
    let yaml = RuleBook::default()
        .to_yaml()
        .context("Failed to serialize rule book")?;
    print!("{}", yaml);
    Ok(())
}
