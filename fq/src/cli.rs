//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Fairqueue - bounded fair request scheduler
#[derive(Parser)]
#[command(
    name = "fairqueue",
    about = "Bounded fair request scheduler demo and load driver",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Fire a burst of synthetic operations at the scheduler
    Run {
        /// Number of operations to submit
        #[arg(short, long)]
        ops: Option<usize>,

        /// Simulated backend latency per operation in milliseconds
        #[arg(long)]
        op_delay_ms: Option<u64>,

        /// Percentage of operations that fail in the backend
        #[arg(long)]
        fail_percent: Option<u8>,

        /// Override max concurrent operations
        #[arg(long)]
        max_concurrent: Option<usize>,

        /// Override max queue size
        #[arg(long)]
        max_queue_size: Option<usize>,

        /// Override queue-wait timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Output format for reports
#[derive(Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_command() {
        let cli = Cli::parse_from(["fq"]);
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_parse_run_overrides() {
        let cli = Cli::parse_from(["fq", "run", "--ops", "10", "--max-concurrent", "2", "--format", "json"]);

        match cli.command {
            Some(Command::Run {
                ops,
                max_concurrent,
                format,
                ..
            }) => {
                assert_eq!(ops, Some(10));
                assert_eq!(max_concurrent, Some(2));
                assert!(matches!(format, OutputFormat::Json));
            }
            _ => panic!("Expected run command"),
        }
    }

    #[test]
    fn test_output_format_parse() {
        assert!(matches!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text));
        assert!(matches!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Text.to_string(), "text");
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }
}
