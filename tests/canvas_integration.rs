//! Integration tests for Funnelcraft
//!
//! These tests drive the canvas editor end to end:
//! - SQLite persistence across editor sessions
//! - Step switching with pending edits
//! - Scripted edit commands
//! - Debounced autosave against the in-memory store

use std::sync::Arc;
use std::time::Duration;

use funnelcraft_canvas::{
    CanvasConfig, CanvasEditor, CanvasEvent, EditCommand, ElementKind, ElementStore, Funnel,
    MemoryElementStore, SqliteElementStore, Step, StepId, SwitchOutcome, SyncPhase,
};
use serde_json::json;
use sqlx::sqlite::SqlitePoolOptions;

async fn sqlite_store() -> Arc<SqliteElementStore> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    let store = SqliteElementStore::new(pool);
    store.init().await.unwrap();
    Arc::new(store)
}

async fn open(store: Arc<dyn ElementStore>, step: &str) -> CanvasEditor {
    let mut editor = CanvasEditor::new(store, CanvasConfig::default()).unwrap();
    let outcome = editor.switch_step(step).await;
    assert!(matches!(outcome, SwitchOutcome::Loaded(_)));
    editor
}

// ============================================================================
// SQLite Persistence
// ============================================================================

#[tokio::test]
async fn test_sqlite_edits_survive_reopen() {
    let store = sqlite_store().await;
    let mut editor = open(store.clone(), "landing").await;

    let heading = editor.add(ElementKind::Heading).unwrap();
    let button = editor.add(ElementKind::Button).unwrap();
    editor.move_up(button.id);
    assert!(tokio_test::assert_ok!(editor.flush().await));
    editor.close().await.unwrap();

    let reopened = open(store.clone(), "landing").await;
    let ids: Vec<_> = reopened.elements().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![button.id, heading.id]);
    assert_eq!(reopened.elements()[1].content, ElementKind::Heading.default_content());
    assert!(!reopened.can_undo());
}

#[tokio::test]
async fn test_sqlite_switch_flushes_previous_step() {
    let store = sqlite_store().await;
    let mut editor = open(store.clone(), "s1").await;

    editor.add(ElementKind::Text);
    editor.add(ElementKind::Image);
    assert_eq!(editor.phase(), SyncPhase::Dirty);

    let outcome = editor.switch_step("s2").await;
    assert!(matches!(outcome, SwitchOutcome::Loaded(ref list) if list.is_empty()));

    let s1 = store.get_elements(&StepId::from("s1")).await.unwrap();
    assert_eq!(s1.len(), 2);
    assert!(store.get_elements(&StepId::from("s2")).await.unwrap().is_empty());
    assert_eq!(editor.step_id(), Some(&StepId::from("s2")));
    assert!(editor.elements().is_empty());
}

#[tokio::test]
async fn test_undo_to_saved_state_writes_nothing() {
    let store = sqlite_store().await;
    let mut editor = open(store.clone(), "s1").await;

    editor.add(ElementKind::Form);
    editor.undo();

    assert!(!editor.flush().await.unwrap());
    assert!(store.list_steps().await.unwrap().is_empty());
}

// ============================================================================
// Scripted Commands
// ============================================================================

#[tokio::test]
async fn test_command_script_applies_in_order() {
    let store = sqlite_store().await;
    let mut editor = open(store.clone(), "checkout").await;

    let script = json!([
        { "type": "add", "kind": "heading" },
        { "type": "add", "kind": "form" },
        { "type": "insert_at", "kind": "divider", "index": 1 },
        { "type": "reorder", "source": 0, "target": 2 },
        { "type": "undo" },
        { "type": "redo" }
    ]);
    let commands: Vec<EditCommand> = serde_json::from_value(script).unwrap();

    let applied: Vec<bool> = commands.into_iter().map(|c| editor.apply(c)).collect();
    assert_eq!(applied, vec![true; 6]);

    let kinds: Vec<_> = editor.elements().iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![ElementKind::Divider, ElementKind::Form, ElementKind::Heading]
    );

    editor.flush().await.unwrap();
    let stored = store.get_elements(&StepId::from("checkout")).await.unwrap();
    assert_eq!(stored, editor.elements());
}

#[tokio::test]
async fn test_command_on_missing_element_is_noop() {
    let store = sqlite_store().await;
    let mut editor = open(store, "s1").await;
    editor.add(ElementKind::Text);

    let missing = funnelcraft_canvas::ElementId::new();
    assert!(!editor.apply(EditCommand::Remove { element_id: missing }));
    assert!(!editor.apply(EditCommand::MoveDown { element_id: missing }));
    assert_eq!(editor.elements().len(), 1);
}

// ============================================================================
// Debounced Autosave
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_autosave_after_quiet_period() {
    let store = Arc::new(MemoryElementStore::new());
    let mut editor = open(store.clone(), "s1").await;
    let mut rx = editor.subscribe();

    let text = editor.add(ElementKind::Text).unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    editor.update_content(text.id, json!({ "text": "Hello" }));
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(store.writes().await.is_empty());

    tokio::time::sleep(Duration::from_millis(400)).await;
    let writes = store.writes_for(&StepId::from("s1")).await;
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0][0].content, json!({ "text": "Hello" }));
    assert_eq!(editor.phase(), SyncPhase::Idle);

    let mut saw_saved = false;
    while let Ok(event) = rx.try_recv() {
        if let CanvasEvent::Saved { step_id, count } = event {
            assert_eq!(step_id, StepId::from("s1"));
            assert_eq!(count, 1);
            saw_saved = true;
        }
    }
    assert!(saw_saved);
}

#[tokio::test(start_paused = true)]
async fn test_failed_save_keeps_edits_for_retry() {
    let store = Arc::new(MemoryElementStore::new());
    let mut editor = open(store.clone(), "s1").await;

    store.fail_writes(true);
    editor.add(ElementKind::Video);
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(editor.phase(), SyncPhase::Dirty);
    assert_eq!(editor.elements().len(), 1);

    store.fail_writes(false);
    assert!(editor.flush().await.unwrap());
    assert_eq!(store.snapshot(&StepId::from("s1")).await.len(), 1);
}

// ============================================================================
// Funnel Cache
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_funnel_cache_skips_store_read() {
    let store = Arc::new(MemoryElementStore::new());
    let mut editor = CanvasEditor::new(store.clone(), CanvasConfig::default()).unwrap();

    let cached = vec![funnelcraft_canvas::Element::new(ElementKind::Countdown)];
    let funnel = Funnel::new("Webinar")
        .with_step(Step::new("register", "Register").with_elements(cached.clone()))
        .with_step(Step::new("thanks", "Thanks"));

    editor.switch_step_with_funnel("register", &funnel).await;
    assert_eq!(editor.elements(), cached.as_slice());
    assert_eq!(store.read_count(), 0);

    editor.switch_step_with_funnel("thanks", &funnel).await;
    assert!(editor.elements().is_empty());
    assert_eq!(store.read_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_returning_to_step_keeps_saved_edits() {
    let store = Arc::new(MemoryElementStore::new());
    let first = funnelcraft_canvas::Element::new(ElementKind::Heading);
    store.seed("a", vec![first.clone()]).await;
    let funnel = Funnel::new("Launch")
        .with_step(Step::new("a", "Opt-in").with_elements(vec![first.clone()]))
        .with_step(Step::new("b", "Offer"));
    let mut editor = CanvasEditor::new(store.clone(), CanvasConfig::default()).unwrap();

    editor.switch_step_with_funnel("a", &funnel).await;
    let added = editor.add(ElementKind::Button).unwrap();
    editor.switch_step_with_funnel("b", &funnel).await;
    assert_eq!(store.snapshot(&StepId::from("a")).await.len(), 2);

    // The funnel still holds the pre-edit list for "a"
    editor.switch_step_with_funnel("a", &funnel).await;
    assert_eq!(editor.elements().len(), 2);
    assert!(!editor.sync().is_dirty());

    editor.add(ElementKind::Text);
    editor.flush().await.unwrap();
    let stored = store.snapshot(&StepId::from("a")).await;
    let ids: Vec<_> = stored.iter().map(|e| e.id).collect();
    assert_eq!(ids.len(), 3);
    assert_eq!(ids[0], first.id);
    assert_eq!(ids[1], added.id);
}
