//! `highlight` subcommand: run a session against a fixture and report labels.

use std::path::Path;
use std::sync::Arc;

use dropin_config::Config;
use dropin_core::{render_outline, ItemId};
use dropin_dom_snapshot::SnapshotDocument;
use dropin_runloop::{Inspector, InspectorCommand};
use serde_json::json;
use tracing::warn;

use crate::cli::OutputFormat;
use crate::cmd_detect::load_fixture;
use crate::cmd_prefs::open_store;

/// Handle the highlight subcommand.
pub(crate) async fn handle_highlight(
    config: Arc<Config>,
    fixture: &Path,
    all: bool,
    ids: Vec<ItemId>,
    show_empty: bool,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load_fixture(&config, fixture)?;
    let inspector = run_session(config, doc, all, ids, show_empty).await;
    print_report(&inspector, format)
}

/// Open the panel on `doc` and apply the requested highlights one by one.
///
/// Stored preferences are restored first. `--show-empty` turns the filter on
/// and that choice is saved with the rest of the panel state.
pub(crate) async fn run_session(
    config: Arc<Config>,
    doc: SnapshotDocument,
    all: bool,
    ids: Vec<ItemId>,
    show_empty: bool,
) -> Inspector<SnapshotDocument> {
    let (mut inspector, _events) = Inspector::new(doc, config.clone());
    if let Some(store) = open_store(&config).await {
        inspector = inspector.with_store(store);
    }
    inspector.restore().await;

    if show_empty && !inspector.detector().show_empty() {
        inspector.handle_command(InspectorCommand::ToggleEmptySlots).await;
    }
    if !inspector.is_visible() {
        inspector.handle_command(InspectorCommand::ShowPanel).await;
    }

    if all {
        inspector
            .handle_command(InspectorCommand::ToggleAllHighlights)
            .await;
    }
    for id in ids {
        let Some(item) = inspector.structure().find(id) else {
            warn!("No {} on this page", id);
            continue;
        };
        inspector
            .handle_command(InspectorCommand::ToggleHighlight {
                id,
                name: item.name,
            })
            .await;
        settle(&mut inspector, &config);
    }
    inspector
}

/// Let the scroll land and the deferred label appear.
fn settle(inspector: &mut Inspector<SnapshotDocument>, config: &Config) {
    inspector.document_mut().finish_scroll();
    let wait = config.timing.smooth_scroll().max(config.timing.scroll_settle());
    inspector.advance_by(wait);
}

fn print_report(
    inspector: &Inspector<SnapshotDocument>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let structure = inspector.structure();
    let engine = inspector.engine();
    let labels = engine.label_positions();

    match format {
        OutputFormat::Outline => {
            print!("{}", render_outline(structure, &engine.active_ids()));
            if !labels.is_empty() {
                println!();
                println!("Labels:");
            }
            for (id, rect) in &labels {
                println!(
                    "  {} at top {:.1}, left {:.1} ({:.1} x {:.1})",
                    id, rect.top, rect.left, rect.width, rect.height
                );
            }
        }
        OutputFormat::Json => {
            let labels: Vec<_> = labels
                .iter()
                .map(|(id, rect)| {
                    json!({
                        "id": id,
                        "top": rect.top,
                        "left": rect.left,
                        "width": rect.width,
                        "height": rect.height,
                    })
                })
                .collect();
            let report = json!({
                "structure": structure,
                "active": engine.active_ids(),
                "labels": labels,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
