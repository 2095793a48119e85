//! CLI command definitions and subcommands

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// TripPlanner - outline, itinerary and packing list from three LLM stages
#[derive(Parser)]
#[command(name = "tp", author, version, about = "Layered travel planner backed by three LLM stages", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Plan a trip: outline, detailed itinerary, packing checklist
    Plan {
        /// Where to go
        destination: String,

        /// Trip length in days
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        days: u32,

        /// Preference to store before planning (repeatable)
        #[arg(short, long = "prefer", value_name = "TEXT")]
        prefer: Vec<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Manage stored travel preferences
    Prefs {
        #[command(subcommand)]
        command: PrefsCommand,
    },
}

/// Preference subcommands
#[derive(Debug, Subcommand)]
pub enum PrefsCommand {
    /// Store a preference (e.g. "I prefer nature over museums")
    Add {
        #[arg(required = true)]
        text: String,
    },

    /// Delete a stored preference
    Remove {
        #[arg(required = true)]
        text: String,
    },

    /// Show stored preferences
    List,
}

/// Output format for `plan`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plan() {
        let cli = Cli::try_parse_from(["tp", "plan", "Japan", "7", "--prefer", "ramen", "-f", "json"]).unwrap();
        match cli.command {
            Command::Plan {
                destination,
                days,
                prefer,
                format,
            } => {
                assert_eq!(destination, "Japan");
                assert_eq!(days, 7);
                assert_eq!(prefer, vec!["ramen".to_string()]);
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_zero_days() {
        assert!(Cli::try_parse_from(["tp", "plan", "Japan", "0"]).is_err());
    }

    #[test]
    fn test_parse_prefs_with_global_config() {
        let cli = Cli::try_parse_from(["tp", "prefs", "add", "love hiking", "--config", "tp.yml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("tp.yml")));
        assert!(matches!(
            cli.command,
            Command::Prefs {
                command: PrefsCommand::Add { .. }
            }
        ));
    }
}
