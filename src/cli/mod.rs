//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Sitemapper using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Sitemapper - search index to sitemap export tool
#[derive(Parser, Debug)]
#[command(name = "sitemapper")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "sitemapper.toml", env = "SITEMAPPER_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SITEMAPPER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export all indices to sitemap artifacts and reconcile the store
    Generate(commands::generate::GenerateArgs),

    /// Backfill missing page artifacts without a full export
    Repair(commands::repair::RepairArgs),

    /// Delete expired documents from the search index
    Purge(commands::purge::PurgeArgs),

    /// Show stored artifacts and per-index page coverage
    Status(commands::status::StatusArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_generate() {
        let cli = Cli::parse_from(["sitemapper", "generate"]);
        assert_eq!(cli.config, "sitemapper.toml");
        assert!(matches!(cli.command, Commands::Generate(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["sitemapper", "--config", "custom.toml", "generate"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["sitemapper", "--log-level", "debug", "generate"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_repair() {
        let cli = Cli::parse_from(["sitemapper", "repair", "--index", "jobs_idx"]);
        assert!(matches!(cli.command, Commands::Repair(_)));
    }

    #[test]
    fn test_cli_parse_purge() {
        let cli = Cli::parse_from(["sitemapper", "purge", "--older-than-days", "30", "--yes"]);
        assert!(matches!(cli.command, Commands::Purge(_)));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["sitemapper", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_status() {
        let cli = Cli::parse_from(["sitemapper", "status"]);
        assert!(matches!(cli.command, Commands::Status(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["sitemapper", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
