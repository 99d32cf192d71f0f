//! Inspector session: panel lifecycle, change watchers, and preferences.
//!
//! An [`Inspector`] owns the page document and everything the panel needs.
//! All work runs to completion on the caller's task; deferred work (label
//! creation after a scroll, debounced reloads, navigation polling) goes onto
//! a [`TimerQueue`] and runs when the clock is advanced past its deadline.

use std::sync::Arc;
use std::time::Duration;

use dropin_config::Config;
use dropin_core::{HighlightEngine, HighlightOutcome, ItemId, Structure, StructureDetector};
use dropin_protocols::{keys, HostDocument, MutationRecord, PreferenceStore, StorageError};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::{SessionError, SessionResult};
use crate::events::{InspectorCommand, InspectorTask, PanelEvent, PanelPosition, PanelState};
use crate::timer::{TimerId, TimerQueue};

/// One inspector attached to one page.
pub struct Inspector<D> {
    doc: D,
    config: Arc<Config>,
    detector: StructureDetector,
    engine: HighlightEngine,
    timers: TimerQueue<InspectorTask>,
    panel: PanelState,
    structure: Structure,
    current_url: String,
    debounce: Option<TimerId>,
    store: Option<Arc<dyn PreferenceStore>>,
    events: mpsc::UnboundedSender<PanelEvent>,
}

impl<D: HostDocument> Inspector<D> {
    /// Attach to a document. Navigation polling starts immediately.
    pub fn new(doc: D, config: Arc<Config>) -> (Self, mpsc::UnboundedReceiver<PanelEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let mut timers = TimerQueue::new();
        timers.schedule_repeating(config.timing.nav_poll(), InspectorTask::NavPoll);

        let inspector = Self {
            current_url: doc.url(),
            detector: StructureDetector::from_config(&config),
            engine: HighlightEngine::new(&config),
            doc,
            config,
            timers,
            panel: PanelState::default(),
            structure: Structure::default(),
            debounce: None,
            store: None,
            events,
        };
        (inspector, events_rx)
    }

    /// Persist preferences through `store`.
    pub fn with_store(mut self, store: Arc<dyn PreferenceStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn document(&self) -> &D {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.doc
    }

    pub fn into_document(self) -> D {
        self.doc
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn detector(&self) -> &StructureDetector {
        &self.detector
    }

    pub fn engine(&self) -> &HighlightEngine {
        &self.engine
    }

    pub fn panel(&self) -> &PanelState {
        &self.panel
    }

    /// The structure most recently shown in the panel.
    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    pub fn is_visible(&self) -> bool {
        self.panel.visible
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// When the next deferred task is due.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Whether a debounced reload is waiting.
    pub fn refresh_pending(&self) -> bool {
        self.debounce
            .is_some_and(|timer| self.timers.is_scheduled(timer))
    }

    // ========================================================================
    // Commands
    // ========================================================================

    pub async fn handle_command(&mut self, command: InspectorCommand) {
        debug!("Inspector command: {:?}", command);
        match command {
            InspectorCommand::TogglePanel => {
                if self.panel.visible {
                    self.hide_panel().await;
                } else {
                    self.show_panel().await;
                }
            }
            InspectorCommand::ShowPanel => self.show_panel().await,
            InspectorCommand::HidePanel => self.hide_panel().await,
            InspectorCommand::Refresh => self.load_structure(),
            InspectorCommand::ToggleHighlight { id, name } => {
                self.toggle_highlight(id, &name);
            }
            InspectorCommand::ClearAllHighlights => self.clear_highlights(),
            InspectorCommand::ToggleAllHighlights => {
                self.toggle_all_highlights();
            }
            InspectorCommand::ToggleEmptySlots => self.toggle_empty_slots().await,
            InspectorCommand::ToggleExpand { id } => self.toggle_expand(id),
            InspectorCommand::ToggleCollapseAll => self.toggle_collapse_all(),
            InspectorCommand::ToggleMinimize => self.toggle_minimize(),
            InspectorCommand::MovePanel { top, left } => self.move_panel(top, left).await,
        }
    }

    /// Open the panel: detect, render, start watching, persist.
    pub async fn show_panel(&mut self) {
        self.panel.visible = true;
        info!("Inspector panel shown");
        self.emit(PanelEvent::PanelShown);
        self.load_structure();
        self.persist().await;
    }

    /// Close the panel: stop watching, clear highlights, persist.
    pub async fn hide_panel(&mut self) {
        self.panel.visible = false;
        if let Some(timer) = self.debounce.take() {
            self.timers.cancel(timer);
        }
        self.engine.clear_all(&mut self.doc);
        info!("Inspector panel hidden");
        self.emit(PanelEvent::PanelHidden);
        self.emit_highlights();
        self.persist().await;
    }

    /// Re-run detection and publish the result.
    pub fn load_structure(&mut self) {
        let structure = self.detector.detect(&self.doc);
        info!(
            "Structure loaded: {} blocks, {} slots",
            structure.totals.blocks, structure.totals.slots
        );
        let summary = structure.summary();
        self.structure = structure;
        self.emit(PanelEvent::StructureLoaded {
            structure: self.structure.clone(),
            summary,
        });
    }

    /// Toggle one highlight, deferring its label until the scroll settles.
    pub fn toggle_highlight(&mut self, id: ItemId, name: &str) -> HighlightOutcome {
        let outcome = self.engine.toggle(&mut self.doc, &self.detector, id, name);
        if let Some(pending) = outcome.pending() {
            self.timers
                .schedule(pending.delay, InspectorTask::CreateLabel(pending.id));
        }
        self.emit_highlights();
        outcome
    }

    pub fn clear_highlights(&mut self) {
        self.engine.clear_all(&mut self.doc);
        self.emit_highlights();
    }

    /// Clear everything if anything is highlighted, else highlight everything.
    pub fn toggle_all_highlights(&mut self) -> usize {
        let count = self.engine.toggle_all(&mut self.doc, &self.detector);
        self.emit_highlights();
        count
    }

    /// Flip the empty-marker filter and reload.
    pub async fn toggle_empty_slots(&mut self) {
        let show_empty = !self.detector.show_empty();
        self.detector.set_show_empty(show_empty);
        self.engine.clear_all(&mut self.doc);
        self.emit_highlights();
        self.load_structure();
        self.emit(PanelEvent::EmptyFilterChanged { show_empty });
        self.persist().await;
    }

    pub fn toggle_expand(&mut self, id: ItemId) {
        if !self.panel.expanded.remove(&id) {
            self.panel.expanded.insert(id);
        }
        self.emit_expansion();
    }

    /// Collapse everything if anything is expanded, else expand everything.
    pub fn toggle_collapse_all(&mut self) {
        if self.panel.expanded.is_empty() {
            let structure = self.detector.detect(&self.doc);
            self.panel.expanded = structure.expandable_ids().into_iter().collect();
        } else {
            self.panel.expanded.clear();
        }
        self.emit_expansion();
    }

    pub fn toggle_minimize(&mut self) {
        self.panel.minimized = !self.panel.minimized;
        self.emit(PanelEvent::MinimizeChanged {
            minimized: self.panel.minimized,
        });
    }

    /// Record the panel position at the end of a drag.
    pub async fn move_panel(&mut self, top: f64, left: f64) {
        self.panel.position = Some(PanelPosition::new(top, left));
        self.persist().await;
    }

    // ========================================================================
    // Page watchers
    // ========================================================================

    /// Feed a batch of DOM mutations.
    ///
    /// Returns whether the batch restarted the debounced reload.
    pub fn on_mutations(&mut self, records: &[MutationRecord]) -> bool {
        if !self.panel.visible {
            return false;
        }
        let relevant = records
            .iter()
            .flat_map(|record| record.added.iter())
            .any(|node| self.detector.contains_marker(&self.doc, *node));
        if !relevant {
            return false;
        }

        let delay = self.config.timing.debounce();
        self.debounce = Some(self.timers.reschedule(
            self.debounce.take(),
            delay,
            InspectorTask::RefreshStructure,
        ));
        debug!("Marker mutation seen, reload in {:?}", delay);
        true
    }

    /// A history pop happened; tear down and reload once the page settles.
    pub fn on_popstate(&mut self) {
        if !self.panel.visible {
            return;
        }
        self.timers
            .schedule(self.config.timing.page_load(), InspectorTask::PopState);
    }

    /// Run every task due at or before `now`.
    pub fn advance_to(&mut self, now: Duration) {
        while let Some((timer, task)) = self.timers.pop_due(now) {
            self.run_task(timer, task);
        }
        self.timers.settle(now);
    }

    pub fn advance_by(&mut self, delta: Duration) {
        self.advance_to(self.timers.now() + delta);
    }

    fn run_task(&mut self, timer: TimerId, task: InspectorTask) {
        match task {
            InspectorTask::CreateLabel(id) => {
                if !self.engine.create_label(&mut self.doc, id) {
                    debug!("Deferred label for {} dropped", id);
                }
            }
            InspectorTask::RefreshStructure => {
                if self.debounce == Some(timer) {
                    self.debounce = None;
                }
                if self.panel.visible {
                    self.load_structure();
                }
            }
            InspectorTask::NavPoll => self.check_navigation(),
            InspectorTask::PageLoaded => {
                if self.panel.visible {
                    self.load_structure();
                }
            }
            InspectorTask::PopState => {
                if self.panel.visible {
                    self.engine.reset_for_navigation(&mut self.doc);
                    self.emit_highlights();
                    self.load_structure();
                }
            }
        }
    }

    fn check_navigation(&mut self) {
        let url = self.doc.url();
        if url == self.current_url {
            return;
        }
        info!("Navigation detected: {} -> {}", self.current_url, url);
        self.current_url = url;

        if self.panel.visible {
            self.engine.reset_for_navigation(&mut self.doc);
            self.emit_highlights();
            self.timers
                .schedule(self.config.timing.page_load(), InspectorTask::PageLoaded);
        }
    }

    // ========================================================================
    // Preferences
    // ========================================================================

    /// Apply persisted preferences. Re-opens the panel if it was open.
    pub async fn restore(&mut self) {
        let Some(store) = self.store.clone() else {
            return;
        };
        let entries = match store.get(&keys::ALL).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to read preferences: {}", e);
                return;
            }
        };

        let mut visible = false;
        for (key, value) in entries {
            match key.as_str() {
                keys::SHOW_EMPTY => match expect_bool(&key, &value) {
                    Ok(show_empty) => self.detector.set_show_empty(show_empty),
                    Err(e) => warn!("Ignoring preference: {}", e),
                },
                keys::VISIBLE => match expect_bool(&key, &value) {
                    Ok(flag) => visible = flag,
                    Err(e) => warn!("Ignoring preference: {}", e),
                },
                keys::POSITION => match parse_position(&key, value) {
                    Ok(position) => self.panel.position = position,
                    Err(e) => warn!("Ignoring preference: {}", e),
                },
                other => debug!("Unknown preference key {}", other),
            }
        }

        info!(
            "Preferences restored (visible: {}, show_empty: {})",
            visible,
            self.detector.show_empty()
        );
        if visible {
            self.show_panel().await;
        }
    }

    /// Save panel preferences. Failures are logged, never returned.
    pub async fn persist(&self) {
        if let Err(e) = self.try_persist().await {
            warn!("Failed to save preferences: {}", e);
        }
    }

    async fn try_persist(&self) -> SessionResult<()> {
        let Some(store) = self.store.clone() else {
            return Ok(());
        };
        let position = match &self.panel.position {
            Some(position) => serde_json::to_value(position).map_err(StorageError::from)?,
            None => Value::Null,
        };
        let entries = vec![
            (keys::VISIBLE.to_string(), Value::Bool(self.panel.visible)),
            (keys::POSITION.to_string(), position),
            (
                keys::SHOW_EMPTY.to_string(),
                Value::Bool(self.detector.show_empty()),
            ),
        ];
        store.set(entries).await?;
        Ok(())
    }

    // ========================================================================
    // Events
    // ========================================================================

    fn emit(&self, event: PanelEvent) {
        if self.events.send(event).is_err() {
            warn!("Panel event receiver dropped");
        }
    }

    fn emit_highlights(&self) {
        self.emit(PanelEvent::HighlightsChanged {
            active: self.engine.active_ids(),
        });
    }

    fn emit_expansion(&self) {
        self.emit(PanelEvent::ExpansionChanged {
            expanded: self.panel.expanded.iter().copied().collect(),
        });
    }
}

fn expect_bool(key: &str, value: &Value) -> SessionResult<bool> {
    value.as_bool().ok_or_else(|| SessionError::InvalidPreference {
        key: key.to_string(),
        message: format!("expected a boolean, got {}", value),
    })
}

fn parse_position(key: &str, value: Value) -> SessionResult<Option<PanelPosition>> {
    if value.is_null() {
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| SessionError::InvalidPreference {
            key: key.to_string(),
            message: e.to_string(),
        })
}

#[cfg(test)]
#[path = "inspector_tests.rs"]
mod tests;
