//! `detect` subcommand: one detection pass over a page fixture.

use std::path::Path;

use dropin_config::Config;
use dropin_core::{render_outline, StructureDetector};
use dropin_dom_snapshot::{LabelMetrics, SnapshotDocument};
use tracing::info;

use crate::cli::OutputFormat;
use crate::cmd_prefs::stored_show_empty;

/// Load a page fixture, sizing labels from the configured font metrics.
pub(crate) fn load_fixture(
    config: &Config,
    fixture: &Path,
) -> Result<SnapshotDocument, Box<dyn std::error::Error>> {
    let metrics = LabelMetrics {
        char_width: config.labels.char_width,
        padding_x: config.labels.padding_x,
        height: config.labels.label_height,
    };
    let doc = SnapshotDocument::from_path(fixture)?.with_label_metrics(metrics);
    info!("Loaded fixture {}", fixture.display());
    Ok(doc)
}

/// Handle the detect subcommand.
///
/// Starts from the stored empty-slot filter; `--show-empty` forces it on
/// for this run without saving.
pub(crate) async fn handle_detect(
    config: &Config,
    fixture: &Path,
    show_empty: bool,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load_fixture(config, fixture)?;
    let mut detector = StructureDetector::from_config(config);
    detector.set_show_empty(show_empty || stored_show_empty(config).await);

    let structure = detector.detect(&doc);
    info!(
        "Detected {} blocks and {} slots",
        structure.totals.blocks, structure.totals.slots
    );

    match format {
        OutputFormat::Outline => print!("{}", render_outline(&structure, &[])),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&structure)?),
    }
    Ok(())
}
