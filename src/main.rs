//! Dropin Inspector - block and slot structure inspector.
//!
//! Main entry point for the dropin-inspector CLI.

mod cli;
mod cmd_detect;
mod cmd_highlight;
mod cmd_prefs;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use dropin_config::{ConfigLoader, ConfigValidator};
use tracing::{debug, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Cli, Commands};
use cmd_detect::handle_detect;
use cmd_highlight::handle_highlight;
use cmd_prefs::handle_prefs;

/// Get the .dropin-inspector directory path.
fn inspector_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".dropin-inspector"))
        .unwrap_or_else(|| PathBuf::from(".dropin-inspector"))
}

/// Initialize tracing with console output and, optionally, a daily log file.
///
/// Console logs go to stderr so command output on stdout stays parseable.
fn init_tracing(log_file: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = if log_file {
        let log_dir = inspector_dir().join("logs");
        std::fs::create_dir_all(&log_dir)?;

        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("dropin-inspector")
            .filename_suffix("log")
            .max_log_files(14)
            .build(&log_dir)?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        // Keep the writer alive for the program duration.
        static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
            std::sync::OnceLock::new();
        let _ = GUARD.set(guard);

        Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.log_file)?;

    let config = ConfigLoader::load_or_default(&cli.config)?;
    let warnings = ConfigValidator::validate(&config)?.into_error()?;
    for warning in warnings {
        warn!("Config {}: {}", warning.path, warning.message);
    }
    debug!("Using configuration from {}", cli.config.display());
    let config = Arc::new(config);

    match cli.command {
        Commands::Detect {
            fixture,
            show_empty,
            format,
        } => handle_detect(&config, &fixture, show_empty, format).await,
        Commands::Highlight {
            fixture,
            all,
            ids,
            show_empty,
            format,
        } => handle_highlight(config, &fixture, all, ids, show_empty, format).await,
        Commands::Prefs => handle_prefs(&config).await,
    }
}
