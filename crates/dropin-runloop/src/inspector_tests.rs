use super::*;
use async_trait::async_trait;
use dropin_dom_snapshot::{NodeSpec, SnapshotDocument};
use dropin_prefs_json::InMemoryPreferenceStore;
use dropin_protocols::{NodeKey, Viewport};
use serde_json::json;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn block(name: &str) -> NodeSpec {
    NodeSpec::new("section").attr("data-block-name", name)
}

fn slot(name: &str) -> NodeSpec {
    NodeSpec::new("div").attr("data-slot", name)
}

fn shop_root() -> NodeSpec {
    NodeSpec::new("body")
        .rect(0.0, 0.0, 1280.0, 4000.0)
        .child(
            block("Hero")
                .rect(0.0, 100.0, 1280.0, 300.0)
                .child(
                    slot("cta")
                        .text("Buy now")
                        .rect(40.0, 150.0, 300.0, 50.0),
                )
                .child(slot("sidebar")),
        )
        .child(block("Reviews").text("Five stars").rect(0.0, 2000.0, 1280.0, 400.0))
}

fn shop_page() -> SnapshotDocument {
    SnapshotDocument::from_root("https://shop.example/", Viewport::default(), shop_root())
}

fn inspector() -> (Inspector<SnapshotDocument>, mpsc::UnboundedReceiver<PanelEvent>) {
    Inspector::new(shop_page(), Arc::new(Config::default()))
}

fn drain(rx: &mut mpsc::UnboundedReceiver<PanelEvent>) -> Vec<PanelEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn id_of(structure: &Structure, name: &str) -> ItemId {
    structure
        .items()
        .into_iter()
        .find(|item| item.name == name)
        .map(|item| item.id)
        .unwrap()
}

fn block_names(structure: &Structure) -> Vec<String> {
    structure
        .items()
        .into_iter()
        .filter(|item| matches!(item.id, ItemId::Block(_)))
        .map(|item| item.name)
        .collect()
}

fn append_block(inspector: &mut Inspector<SnapshotDocument>, name: &str, top: f64) -> NodeKey {
    let doc = inspector.document_mut();
    let root = doc.root();
    doc.append_child(root, block(name).text(name).rect(0.0, top, 1280.0, 100.0))
        .unwrap()
}

struct FailingStore;

#[async_trait]
impl PreferenceStore for FailingStore {
    async fn get(&self, _keys: &[&str]) -> Result<Vec<(String, Value)>, StorageError> {
        Err(StorageError::Unavailable("offline".to_string()))
    }

    async fn set(&self, _entries: Vec<(String, Value)>) -> Result<(), StorageError> {
        Err(StorageError::WriteFailed("quota exceeded".to_string()))
    }
}

// ============================================================================
// Panel lifecycle
// ============================================================================

#[tokio::test]
async fn test_new_inspector_is_hidden_and_polling() {
    let (inspector, _rx) = inspector();

    assert!(!inspector.is_visible());
    assert!(inspector.structure().is_empty());
    assert_eq!(inspector.next_deadline(), Some(ms(500)));
}

#[tokio::test]
async fn test_show_panel_loads_structure() {
    let (mut inspector, mut rx) = inspector();

    inspector.show_panel().await;

    assert!(inspector.is_visible());
    assert_eq!(block_names(inspector.structure()), vec!["Hero", "Reviews"]);

    let events = drain(&mut rx);
    assert_eq!(events[0], PanelEvent::PanelShown);
    match &events[1] {
        PanelEvent::StructureLoaded { structure, summary } => {
            assert_eq!(structure.totals.blocks, 2);
            assert_eq!(summary, "2 blocks • 1 slots");
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_toggle_panel_command() {
    let (mut inspector, mut rx) = inspector();

    inspector.handle_command(InspectorCommand::TogglePanel).await;
    assert!(inspector.is_visible());

    inspector.handle_command(InspectorCommand::TogglePanel).await;
    assert!(!inspector.is_visible());

    let events = drain(&mut rx);
    assert!(events.contains(&PanelEvent::PanelHidden));
}

#[tokio::test]
async fn test_hide_panel_clears_highlights() {
    let (mut inspector, mut rx) = inspector();
    inspector.show_panel().await;
    inspector.toggle_all_highlights();
    assert!(inspector.engine().has_active());
    drain(&mut rx);

    inspector.hide_panel().await;

    assert!(!inspector.engine().has_active());
    assert!(inspector.document().labels().is_empty());
    let events = drain(&mut rx);
    assert!(events.contains(&PanelEvent::HighlightsChanged { active: vec![] }));
}

#[tokio::test]
async fn test_refresh_command_reloads() {
    let (mut inspector, _rx) = inspector();
    inspector.show_panel().await;
    append_block(&mut inspector, "Promo", 800.0);

    inspector.handle_command(InspectorCommand::Refresh).await;

    assert_eq!(inspector.structure().totals.blocks, 3);
}

#[tokio::test]
async fn test_toggle_minimize() {
    let (mut inspector, mut rx) = inspector();

    inspector.handle_command(InspectorCommand::ToggleMinimize).await;

    assert!(inspector.panel().minimized);
    assert_eq!(
        drain(&mut rx),
        vec![PanelEvent::MinimizeChanged { minimized: true }]
    );
}

// ============================================================================
// Highlights
// ============================================================================

#[tokio::test]
async fn test_label_waits_for_scroll_to_settle() {
    let (mut inspector, _rx) = inspector();
    inspector.show_panel().await;
    let hero = id_of(inspector.structure(), "Hero");

    let outcome = inspector.toggle_highlight(hero, "Hero");

    assert!(outcome.pending().is_some());
    assert!(inspector.engine().is_active(hero));
    assert!(inspector.document().labels().is_empty());

    inspector.advance_by(ms(399));
    assert!(inspector.document().labels().is_empty());

    inspector.advance_by(ms(1));
    assert!(inspector.document().label_with_text("Hero").is_some());
}

#[tokio::test]
async fn test_far_element_uses_short_settle_delay() {
    let (mut inspector, _rx) = inspector();
    inspector.show_panel().await;
    let reviews = id_of(inspector.structure(), "Reviews");

    let outcome = inspector.toggle_highlight(reviews, "Reviews");

    assert_eq!(outcome.pending().map(|pending| pending.delay), Some(ms(50)));
    inspector.advance_by(ms(50));
    assert!(inspector.document().label_with_text("Reviews").is_some());
}

#[tokio::test]
async fn test_label_dropped_when_highlight_removed_first() {
    let (mut inspector, _rx) = inspector();
    inspector.show_panel().await;
    let hero = id_of(inspector.structure(), "Hero");

    inspector.toggle_highlight(hero, "Hero");
    let outcome = inspector.toggle_highlight(hero, "Hero");
    assert_eq!(outcome, HighlightOutcome::Removed);

    inspector.advance_by(ms(1_000));
    assert!(inspector.document().labels().is_empty());
    assert!(!inspector.engine().has_active());
}

#[tokio::test]
async fn test_unknown_id_changes_nothing() {
    let (mut inspector, _rx) = inspector();
    inspector.show_panel().await;

    let outcome = inspector.toggle_highlight(ItemId::Block(42), "Ghost");

    assert_eq!(outcome, HighlightOutcome::NotFound);
    assert!(!inspector.engine().has_active());
    assert_eq!(inspector.next_deadline(), Some(ms(500)));
}

#[tokio::test]
async fn test_toggle_highlight_command_emits_active_ids() {
    let (mut inspector, mut rx) = inspector();
    inspector.show_panel().await;
    let hero = id_of(inspector.structure(), "Hero");
    drain(&mut rx);

    inspector
        .handle_command(InspectorCommand::ToggleHighlight {
            id: hero,
            name: "Hero".to_string(),
        })
        .await;

    assert_eq!(
        drain(&mut rx),
        vec![PanelEvent::HighlightsChanged { active: vec![hero] }]
    );
}

#[tokio::test]
async fn test_toggle_all_then_clear() {
    let (mut inspector, _rx) = inspector();
    inspector.show_panel().await;

    inspector
        .handle_command(InspectorCommand::ToggleAllHighlights)
        .await;
    assert_eq!(inspector.engine().active_ids().len(), 3);
    assert_eq!(inspector.document().labels().len(), 3);

    inspector
        .handle_command(InspectorCommand::ClearAllHighlights)
        .await;
    assert!(!inspector.engine().has_active());
    assert!(inspector.document().labels().is_empty());
}

// ============================================================================
// Empty filter and expansion
// ============================================================================

#[tokio::test]
async fn test_toggle_empty_slots_reloads_and_persists() {
    let store = Arc::new(InMemoryPreferenceStore::new());
    let (inspector, mut rx) = inspector();
    let mut inspector = inspector.with_store(store.clone());
    inspector.show_panel().await;
    inspector.toggle_all_highlights();
    assert_eq!(inspector.structure().totals.slots, 1);
    drain(&mut rx);

    inspector
        .handle_command(InspectorCommand::ToggleEmptySlots)
        .await;

    assert!(inspector.detector().show_empty());
    assert_eq!(inspector.structure().totals.slots, 2);
    assert!(!inspector.engine().has_active());
    assert!(drain(&mut rx).contains(&PanelEvent::EmptyFilterChanged { show_empty: true }));
    assert_eq!(
        store.snapshot().await.get(keys::SHOW_EMPTY),
        Some(&json!(true))
    );
}

#[tokio::test]
async fn test_toggle_expand() {
    let (mut inspector, mut rx) = inspector();
    inspector.show_panel().await;
    let hero = id_of(inspector.structure(), "Hero");
    drain(&mut rx);

    inspector.toggle_expand(hero);
    assert!(inspector.panel().is_expanded(hero));
    inspector.toggle_expand(hero);
    assert!(!inspector.panel().is_expanded(hero));

    assert_eq!(
        drain(&mut rx),
        vec![
            PanelEvent::ExpansionChanged { expanded: vec![hero] },
            PanelEvent::ExpansionChanged { expanded: vec![] },
        ]
    );
}

#[tokio::test]
async fn test_collapse_all_toggles_between_all_and_none() {
    let (mut inspector, _rx) = inspector();
    inspector.show_panel().await;
    let hero = id_of(inspector.structure(), "Hero");

    inspector
        .handle_command(InspectorCommand::ToggleCollapseAll)
        .await;
    let expanded: Vec<ItemId> = inspector.panel().expanded.iter().copied().collect();
    assert_eq!(expanded, inspector.structure().expandable_ids());
    assert!(expanded.contains(&hero));

    inspector
        .handle_command(InspectorCommand::ToggleCollapseAll)
        .await;
    assert!(inspector.panel().expanded.is_empty());
}

#[tokio::test]
async fn test_collapse_all_with_partial_expansion_collapses() {
    let (mut inspector, _rx) = inspector();
    inspector.show_panel().await;
    let hero = id_of(inspector.structure(), "Hero");
    inspector.toggle_expand(hero);

    inspector.toggle_collapse_all();

    assert!(inspector.panel().expanded.is_empty());
}

// ============================================================================
// Mutation watch
// ============================================================================

#[tokio::test]
async fn test_marker_mutation_reloads_after_debounce() {
    let (mut inspector, _rx) = inspector();
    inspector.show_panel().await;
    let promo = append_block(&mut inspector, "Promo", 800.0);

    assert!(inspector.on_mutations(&[MutationRecord { added: vec![promo] }]));
    assert!(inspector.refresh_pending());

    inspector.advance_by(ms(299));
    assert_eq!(inspector.structure().totals.blocks, 2);

    inspector.advance_by(ms(1));
    assert_eq!(inspector.structure().totals.blocks, 3);
    assert!(!inspector.refresh_pending());
}

#[tokio::test]
async fn test_descendant_marker_is_relevant() {
    let (mut inspector, _rx) = inspector();
    inspector.show_panel().await;
    let doc = inspector.document_mut();
    let root = doc.root();
    let wrapper = doc
        .append_child(
            root,
            NodeSpec::new("div")
                .rect(0.0, 800.0, 1280.0, 100.0)
                .child(block("Nested").text("inside").rect(0.0, 800.0, 1280.0, 100.0)),
        )
        .unwrap();

    assert!(inspector.on_mutations(&[MutationRecord { added: vec![wrapper] }]));
}

#[tokio::test]
async fn test_mutation_burst_restarts_debounce() {
    let (mut inspector, _rx) = inspector();
    inspector.show_panel().await;

    let first = append_block(&mut inspector, "First", 800.0);
    inspector.on_mutations(&[MutationRecord { added: vec![first] }]);
    inspector.advance_by(ms(200));

    let second = append_block(&mut inspector, "Second", 1000.0);
    inspector.on_mutations(&[MutationRecord { added: vec![second] }]);
    inspector.advance_by(ms(200));
    assert_eq!(inspector.structure().totals.blocks, 2);

    inspector.advance_by(ms(100));
    assert_eq!(inspector.structure().totals.blocks, 4);
}

#[tokio::test]
async fn test_unmarked_mutation_is_ignored() {
    let (mut inspector, _rx) = inspector();
    inspector.show_panel().await;
    let doc = inspector.document_mut();
    let root = doc.root();
    let plain = doc
        .append_child(root, NodeSpec::new("p").text("hello"))
        .unwrap();

    assert!(!inspector.on_mutations(&[MutationRecord { added: vec![plain] }]));
    assert!(!inspector.refresh_pending());
}

#[tokio::test]
async fn test_mutation_while_hidden_is_ignored() {
    let (mut inspector, _rx) = inspector();
    let promo = append_block(&mut inspector, "Promo", 800.0);

    assert!(!inspector.on_mutations(&[MutationRecord { added: vec![promo] }]));
}

#[tokio::test]
async fn test_hide_cancels_pending_reload() {
    let (mut inspector, mut rx) = inspector();
    inspector.show_panel().await;
    let promo = append_block(&mut inspector, "Promo", 800.0);
    inspector.on_mutations(&[MutationRecord { added: vec![promo] }]);

    inspector.hide_panel().await;
    drain(&mut rx);
    inspector.advance_by(ms(1_000));

    assert!(!inspector.refresh_pending());
    assert!(!drain(&mut rx)
        .iter()
        .any(|event| matches!(event, PanelEvent::StructureLoaded { .. })));
}

// ============================================================================
// Navigation watch
// ============================================================================

#[tokio::test]
async fn test_url_change_drops_labels_then_reloads() {
    let (mut inspector, _rx) = inspector();
    inspector.show_panel().await;
    let hero = id_of(inspector.structure(), "Hero");
    inspector.toggle_highlight(hero, "Hero");
    inspector.advance_by(ms(400));
    assert_eq!(inspector.document().labels().len(), 1);

    inspector.document_mut().replace_root(
        "https://shop.example/cart",
        NodeSpec::new("body")
            .rect(0.0, 0.0, 1280.0, 2000.0)
            .child(block("Cart").text("3 items").rect(0.0, 50.0, 1280.0, 300.0)),
    );

    // The poll at 500ms notices the new URL.
    inspector.advance_by(ms(100));
    assert!(!inspector.engine().has_active());
    assert!(inspector.document().labels().is_empty());
    assert_eq!(block_names(inspector.structure()), vec!["Hero", "Reviews"]);

    inspector.advance_by(ms(500));
    assert_eq!(block_names(inspector.structure()), vec!["Cart"]);
}

#[tokio::test]
async fn test_url_change_while_hidden_only_tracks() {
    let (mut inspector, mut rx) = inspector();
    inspector.document_mut().navigate("https://shop.example/about");

    inspector.advance_by(ms(2_000));

    assert!(inspector.structure().is_empty());
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_same_url_does_not_reload() {
    let (mut inspector, mut rx) = inspector();
    inspector.show_panel().await;
    drain(&mut rx);

    inspector.advance_by(ms(5_000));

    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_popstate_tears_down_and_reloads() {
    let (mut inspector, mut rx) = inspector();
    inspector.show_panel().await;
    inspector.toggle_all_highlights();
    drain(&mut rx);

    inspector.on_popstate();
    inspector.advance_by(ms(499));
    assert!(inspector.engine().has_active());

    inspector.advance_by(ms(1));
    assert!(!inspector.engine().has_active());
    assert!(inspector.document().labels().is_empty());

    let events = drain(&mut rx);
    assert!(events.contains(&PanelEvent::HighlightsChanged { active: vec![] }));
    assert!(events
        .iter()
        .any(|event| matches!(event, PanelEvent::StructureLoaded { .. })));
}

#[tokio::test]
async fn test_popstate_while_hidden_is_ignored() {
    let (mut inspector, _rx) = inspector();

    inspector.on_popstate();

    assert_eq!(inspector.next_deadline(), Some(ms(500)));
}

// ============================================================================
// Preferences
// ============================================================================

#[tokio::test]
async fn test_persist_writes_every_key() {
    let store = Arc::new(InMemoryPreferenceStore::new());
    let (inspector, _rx) = inspector();
    let mut inspector = inspector.with_store(store.clone());

    inspector.show_panel().await;
    inspector
        .handle_command(InspectorCommand::MovePanel {
            top: 120.0,
            left: 40.0,
        })
        .await;

    let saved = store.snapshot().await;
    assert_eq!(saved.get(keys::VISIBLE), Some(&json!(true)));
    assert_eq!(saved.get(keys::SHOW_EMPTY), Some(&json!(false)));
    assert_eq!(
        saved.get(keys::POSITION),
        Some(&json!({"top": "120px", "left": "40px", "right": "auto"}))
    );
}

#[tokio::test]
async fn test_hide_persists_hidden() {
    let store = Arc::new(InMemoryPreferenceStore::new());
    let (inspector, _rx) = inspector();
    let mut inspector = inspector.with_store(store.clone());

    inspector.show_panel().await;
    inspector.hide_panel().await;

    assert_eq!(
        store.snapshot().await.get(keys::VISIBLE),
        Some(&json!(false))
    );
}

#[tokio::test]
async fn test_restore_reopens_panel() {
    let store = Arc::new(InMemoryPreferenceStore::with_entries([
        (keys::VISIBLE, json!(true)),
        (keys::SHOW_EMPTY, json!(true)),
        (
            keys::POSITION,
            json!({"top": "10px", "left": "20px", "right": "auto"}),
        ),
    ]));
    let (inspector, _rx) = inspector();
    let mut inspector = inspector.with_store(store.clone());

    inspector.restore().await;

    assert!(inspector.is_visible());
    assert!(inspector.detector().show_empty());
    assert_eq!(inspector.structure().totals.slots, 2);
    assert_eq!(
        inspector.panel().position,
        Some(PanelPosition::new(10.0, 20.0))
    );
    // Re-opening saves again without losing the position.
    assert_eq!(
        store.snapshot().await.get(keys::POSITION),
        Some(&json!({"top": "10px", "left": "20px", "right": "auto"}))
    );
}

#[tokio::test]
async fn test_restore_hidden_stays_hidden() {
    let store = Arc::new(InMemoryPreferenceStore::with_entries([
        (keys::VISIBLE, json!(false)),
        (keys::SHOW_EMPTY, json!(true)),
    ]));
    let (inspector, _rx) = inspector();
    let mut inspector = inspector.with_store(store);

    inspector.restore().await;

    assert!(!inspector.is_visible());
    assert!(inspector.detector().show_empty());
    assert!(inspector.structure().is_empty());
}

#[tokio::test]
async fn test_restore_ignores_malformed_values() {
    let store = Arc::new(InMemoryPreferenceStore::with_entries([
        (keys::VISIBLE, json!("yes")),
        (keys::POSITION, json!([1, 2])),
    ]));
    let (inspector, _rx) = inspector();
    let mut inspector = inspector.with_store(store);

    inspector.restore().await;

    assert!(!inspector.is_visible());
    assert!(inspector.panel().position.is_none());
}

#[tokio::test]
async fn test_restore_without_store_is_noop() {
    let (mut inspector, mut rx) = inspector();

    inspector.restore().await;

    assert!(!inspector.is_visible());
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_storage_failures_are_not_fatal() {
    let (inspector, _rx) = inspector();
    let mut inspector = inspector.with_store(Arc::new(FailingStore));

    inspector.restore().await;
    assert!(!inspector.is_visible());

    inspector.show_panel().await;
    assert!(inspector.is_visible());
    assert_eq!(inspector.structure().totals.blocks, 2);
}

#[test]
fn test_expect_bool() {
    assert!(expect_bool("k", &json!(true)).unwrap());
    assert!(matches!(
        expect_bool("k", &json!(1)),
        Err(SessionError::InvalidPreference { .. })
    ));
}

#[test]
fn test_parse_position_null_is_none() {
    assert_eq!(parse_position("k", Value::Null).unwrap(), None);
}
