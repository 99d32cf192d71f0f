//! CLI definitions for the dropin inspector.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use dropin_core::ItemId;

/// Dropin inspector CLI.
#[derive(Parser)]
#[command(name = "dropin-inspector")]
#[command(about = "Inspect dropin block and slot structure in page snapshots")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "config/default.toml",
        env = "DROPIN_INSPECTOR_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Also write logs to ~/.dropin-inspector/logs
    #[arg(long, global = true)]
    pub log_file: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Detect blocks and slots in a page fixture
    Detect {
        /// Page fixture (JSON)
        fixture: PathBuf,

        /// Include markers with no rendered content
        #[arg(long)]
        show_empty: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Outline)]
        format: OutputFormat,
    },

    /// Highlight items in a page fixture and report where their labels land
    Highlight {
        /// Page fixture (JSON)
        fixture: PathBuf,

        /// Highlight every block and slot
        #[arg(long, conflicts_with = "ids")]
        all: bool,

        /// Item to highlight (e.g. block-0, slot-2); repeatable
        #[arg(long = "id", value_name = "ID")]
        ids: Vec<ItemId>,

        /// Include markers with no rendered content
        #[arg(long)]
        show_empty: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Outline)]
        format: OutputFormat,
    },

    /// Show the stored panel preferences
    Prefs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Indented text tree
    Outline,
    /// JSON document
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_detect() {
        let cli = Cli::parse_from(["dropin-inspector", "detect", "page.json", "--show-empty"]);
        match cli.command {
            Commands::Detect {
                fixture,
                show_empty,
                format,
            } => {
                assert_eq!(fixture, PathBuf::from("page.json"));
                assert!(show_empty);
                assert_eq!(format, OutputFormat::Outline);
            }
            _ => panic!("expected detect"),
        }
    }

    #[test]
    fn test_parse_highlight_ids() {
        let cli = Cli::parse_from([
            "dropin-inspector",
            "highlight",
            "page.json",
            "--id",
            "block-0",
            "--id",
            "slot-3",
            "--format",
            "json",
        ]);
        match cli.command {
            Commands::Highlight { ids, all, format, .. } => {
                assert_eq!(ids, vec![ItemId::Block(0), ItemId::Slot(3)]);
                assert!(!all);
                assert_eq!(format, OutputFormat::Json);
            }
            _ => panic!("expected highlight"),
        }
    }

    #[test]
    fn test_malformed_id_rejected() {
        let result = Cli::try_parse_from(["dropin-inspector", "highlight", "p.json", "--id", "hero"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_all_conflicts_with_ids() {
        let result = Cli::try_parse_from([
            "dropin-inspector",
            "highlight",
            "p.json",
            "--all",
            "--id",
            "block-0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::parse_from(["dropin-inspector", "prefs", "--config", "custom.toml"]);
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
    }
}
