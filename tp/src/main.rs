//! TripPlanner - CLI entry point

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, info};

use tripplanner::cli::{Cli, Command, OutputFormat, PrefsCommand};
use tripplanner::config::Config;
use tripplanner::{PipelineController, PlanError, PreferenceStore, PromptLoader, StageBackends, TripResult};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tripplanner")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level).map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    };

    let log_file = fs::File::create(log_dir.join("tripplanner.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(preferences = %config.preferences_path.display(), "TripPlanner loaded config");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Plan {
            destination,
            days,
            prefer,
            format,
        } => {
            cmd_plan(&config, &destination, days, &prefer, format).await
        }
        Command::Prefs { command } => cmd_prefs(&config, command),
    }
}

async fn cmd_plan(
    config: &Config,
    destination: &str,
    days: u32,
    prefer: &[String],
    format: OutputFormat,
) -> Result<()> {
    config.validate()?;

    let prompts = PromptLoader::new(&config.prompts_dir);
    let backends =
        StageBackends::from_config(&config.stages, prompts).context("Failed to initialize generation backends")?;
    let mut controller = PipelineController::open(&config.preferences_path, backends);

    for text in prefer {
        if controller.add_preference(text)? {
            println!("{} Preference saved: {}", "✓".green(), text);
        }
    }

    if format == OutputFormat::Text {
        println!("Planning your {}-day trip to {}...", days, destination.cyan());
    }

    let result = match controller.plan_trip(destination, days).await {
        Ok(result) => result,
        Err(e) => {
            if let Some(hint) = failure_hint(config, &e) {
                eprintln!("{} {}", "hint:".yellow(), hint);
            }
            return Err(e).context("Failed to generate travel plan");
        }
    };

    match format {
        OutputFormat::Text => print_plan(&result),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }
    Ok(())
}

/// Point the user at the likely fix for credential and quota failures
fn failure_hint(config: &Config, err: &PlanError) -> Option<String> {
    let llm = err.llm_error()?;
    let stage = err.stage()?;
    let stage_config = config.stages.get(stage);
    if llm.is_auth() {
        Some(format!(
            "{} rejected the API key; check the {} environment variable",
            stage_config.provider, stage_config.api_key_env
        ))
    } else if llm.is_quota() {
        Some(format!(
            "{} quota or rate limit reached for {}; try again later",
            stage_config.provider, stage_config.model
        ))
    } else {
        None
    }
}

fn print_plan(result: &TripResult) {
    let rule = "=".repeat(60);
    for (title, body) in [
        ("DAY-BY-DAY OUTLINE", &result.outline),
        ("DETAILED ITINERARY", &result.detailed_itinerary),
        ("PACKING CHECKLIST", &result.packing_checklist),
    ] {
        println!("\n{}\n{}\n{}", rule, title.bold(), rule);
        println!("{}", body);
    }
    println!("\n{} Your complete travel plan is ready!", "✓".green());
}

fn cmd_prefs(config: &Config, command: PrefsCommand) -> Result<()> {
    let mut store = PreferenceStore::open(&config.preferences_path);

    match command {
        PrefsCommand::Add { text } => {
            let text = text.trim();
            if text.is_empty() {
                eyre::bail!("Preference must not be empty");
            }
            if store.add(text) {
                println!("{} Preference saved: {}", "✓".green(), text);
            } else {
                println!("Preference already stored: {}", text);
            }
        }
        PrefsCommand::Remove { text } => {
            let text = text.trim();
            if store.remove(text) {
                println!("{} Preference removed: {}", "✓".green(), text);
            } else {
                println!("No such preference: {}", text.yellow());
            }
        }
        PrefsCommand::List => {
            let preferences = store.all();
            if preferences.is_empty() {
                println!("No preferences stored yet.");
            } else {
                for (i, preference) in preferences.iter().enumerate() {
                    println!("{:>3}. {}", i + 1, preference);
                }
            }
        }
    }
    Ok(())
}
