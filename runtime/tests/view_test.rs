//! Tests for the item rows, the aggregate view and the application wiring

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect

use std::rc::Rc;
use todo_sync_core::{CollectionEvent, Filter, PersistenceError, TodoId, TodoRecord};
use todo_sync_runtime::view::Key;
use todo_sync_runtime::{EditOutcome, Item, SyncError, TodoApp};
use todo_sync_testing::{EventRecorder, MockRemoteStore, Op, todo};

const BASE: &str = "/api/todo";

async fn started(records: Vec<TodoRecord>) -> (Rc<MockRemoteStore>, TodoApp) {
    let store = Rc::new(MockRemoteStore::with_records(records));
    let app = TodoApp::new(BASE, Rc::<MockRemoteStore>::clone(&store));
    app.start().await.unwrap();
    store.clear_calls();
    (store, app)
}

fn ids(items: &[Item]) -> Vec<TodoId> {
    items.iter().filter_map(Item::id).collect()
}

#[tokio::test]
async fn test_create_toggle_and_filter_scenario() {
    let (_store, app) = started(Vec::new()).await;
    let view = app.view();

    view.set_input("Buy milk");
    let item = view.create_on_enter(Key::Enter).await.unwrap().unwrap();

    assert_eq!(view.input(), "");
    assert_eq!(app.collection().remaining().len(), 1);
    assert_eq!(app.collection().completed().len(), 0);
    let chrome = view.chrome();
    assert_eq!((chrome.stats.remaining, chrome.stats.completed), (1, 0));
    assert_eq!(chrome.stats.items_word(), "item");
    assert!(chrome.main_visible && chrome.footer_visible);
    assert!(!chrome.all_checked);

    let row = view.item_view(item.key()).unwrap();
    row.toggle().await.unwrap();

    assert_eq!(app.collection().remaining().len(), 0);
    assert_eq!(app.collection().completed().len(), 1);
    assert!(view.chrome().all_checked);
    assert!(row.row().fragment.completed);

    app.navigate("#/active");
    assert!(row.is_hidden());
    assert_eq!(view.chrome().selected, Filter::Active);

    app.navigate("#/completed");
    assert!(!row.is_hidden());
    assert_eq!(view.visible_item_views().len(), 1);
}

#[tokio::test]
async fn test_clear_completed_removes_only_completed_items() {
    let (store, app) = started(vec![
        todo("a", "Milk", true, 1),
        todo("b", "Bread", false, 2),
        todo("c", "Eggs", true, 3),
    ])
    .await;

    let removed = app.view().clear_completed().await.unwrap();

    assert_eq!(removed, 2);
    assert_eq!(store.count(Op::Delete), 2);
    assert_eq!(ids(&app.collection().items()), [TodoId::new("b")]);
    assert_eq!(app.view().item_views().len(), 1);
    assert_eq!(app.view().chrome().stats.completed, 0);
}

#[tokio::test]
async fn test_clear_completed_reports_first_failure_and_keeps_successes() {
    let (store, app) = started(vec![
        todo("a", "Milk", true, 1),
        todo("b", "Bread", true, 2),
    ])
    .await;
    store.fail_next(Op::Delete, PersistenceError::Transport("offline".into()));

    let result = app.view().clear_completed().await;

    assert!(result.unwrap_err().is_persistence());
    assert_eq!(store.count(Op::Delete), 2);
    assert_eq!(app.collection().len(), 1);
    assert_eq!(app.view().item_views().len(), 1);
}

#[tokio::test]
async fn test_toggle_all_issues_one_update_per_item() {
    let (store, app) = started(vec![
        todo("a", "Milk", false, 1),
        todo("b", "Bread", true, 2),
        todo("c", "Eggs", false, 3),
    ])
    .await;

    let updated = app.view().toggle_all_complete(true).await.unwrap();

    assert_eq!(updated, 3);
    assert_eq!(store.count(Op::Update), 3);
    assert!(app.collection().remaining().is_empty());
    assert!(app.view().chrome().all_checked);

    app.view().toggle_all_complete(false).await.unwrap();
    assert_eq!(app.collection().remaining().len(), 3);
    assert!(!app.view().chrome().all_checked);
}

#[tokio::test]
async fn test_reset_rebuilds_rows_once_in_collection_order() {
    let store = Rc::new(MockRemoteStore::with_records(vec![
        todo("c", "Eggs", false, 3),
        todo("a", "Milk", false, 1),
        todo("b", "Bread", false, 2),
    ]));
    let app = TodoApp::new(BASE, Rc::<MockRemoteStore>::clone(&store));
    let recorder = EventRecorder::attach(app.collection().events());
    let rebuilds = app.view().chrome().rebuilds;

    app.start().await.unwrap();

    assert_eq!(app.view().chrome().rebuilds, rebuilds + 1);
    assert_eq!(
        recorder.count(|event| matches!(event, CollectionEvent::Add(_))),
        0
    );
    let titles: Vec<String> = app
        .view()
        .item_views()
        .iter()
        .map(|row| row.row().fragment.title)
        .collect();
    assert_eq!(titles, ["Milk", "Bread", "Eggs"]);
}

#[tokio::test]
async fn test_reload_tears_down_previous_rows() {
    let (_store, app) = started(vec![todo("a", "Milk", false, 1)]).await;
    let old_row = app.view().item_views().remove(0);
    assert_eq!(old_row.subscription_count(), 2);

    app.collection().load().await.unwrap();

    assert!(old_row.is_removed());
    assert_eq!(old_row.subscription_count(), 0);
    assert_eq!(old_row.item().events().listener_count(), 0);
    let new_row = app.view().item_views().remove(0);
    assert!(!new_row.is_removed());
}

#[tokio::test]
async fn test_add_appends_one_row_without_touching_others() {
    let (_store, app) = started(vec![todo("a", "Milk", false, 1)]).await;
    let existing = app.view().item_views().remove(0);
    let renders = existing.row().renders;

    app.view().set_input("Bread");
    app.view().create_on_enter(Key::Enter).await.unwrap();

    assert_eq!(app.view().item_views().len(), 2);
    assert_eq!(existing.row().renders, renders);
    assert!(app.view().item_views()[0].item().ptr_eq(existing.item()));
}

#[tokio::test]
async fn test_destroy_detaches_row_subscriptions() {
    let (_store, app) = started(vec![todo("a", "Milk", false, 1)]).await;
    let row = app.view().item_views().remove(0);

    row.destroy().await.unwrap();

    assert!(row.is_removed());
    assert_eq!(row.subscription_count(), 0);
    assert_eq!(row.item().events().listener_count(), 0);
    assert!(app.view().item_views().is_empty());
    assert!(!app.view().chrome().main_visible);
    assert!(!app.view().chrome().footer_visible);
}

#[tokio::test]
async fn test_edit_commits_trimmed_title_on_enter() {
    let (store, app) = started(vec![todo("a", "Milk", false, 1)]).await;
    let row = app.view().item_views().remove(0);

    row.edit();
    assert!(row.is_editing());
    assert_eq!(row.row().draft, "Milk");

    row.set_draft("  Oat milk ");
    row.handle_key(Key::Enter).await.unwrap();

    assert!(!row.is_editing());
    assert_eq!(row.row().fragment.title, "Oat milk");
    assert_eq!(row.blur().await.unwrap(), None);
    assert_eq!(store.count(Op::Update), 1);
}

#[tokio::test]
async fn test_edit_to_blank_title_removes_item() {
    let (store, app) = started(vec![todo("a", "Milk", false, 1)]).await;
    let row = app.view().item_views().remove(0);

    row.edit();
    row.set_draft("   ");
    let outcome = row.blur().await.unwrap();

    assert_eq!(outcome, Some(EditOutcome::Destroyed));
    assert!(row.is_removed());
    assert!(app.collection().is_empty());
    assert_eq!(store.count(Op::Update), 0);
    assert_eq!(store.count(Op::Delete), 1);
}

#[tokio::test]
async fn test_escape_cancels_edit_without_persisting() {
    let (store, app) = started(vec![todo("a", "Milk", false, 1)]).await;
    let row = app.view().item_views().remove(0);

    row.edit();
    row.set_draft("Something else");
    row.handle_key(Key::Escape).await.unwrap();

    assert!(!row.is_editing());
    assert_eq!(row.item().title(), "Milk");
    assert_eq!(row.blur().await.unwrap(), None);
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_create_on_enter_ignores_blank_input_and_other_keys() {
    let (store, app) = started(Vec::new()).await;
    let view = app.view();

    view.set_input("   ");
    assert!(view.create_on_enter(Key::Enter).await.unwrap().is_none());

    view.set_input("Milk");
    assert!(view.create_on_enter(Key::Other).await.unwrap().is_none());
    assert_eq!(view.input(), "Milk");

    assert!(store.calls().is_empty());
    assert!(app.collection().is_empty());
}

#[tokio::test]
async fn test_failed_create_restores_input() {
    let (store, app) = started(Vec::new()).await;
    store.fail_next(Op::Create, PersistenceError::Transport("offline".into()));

    app.view().set_input("Milk");
    let result = app.view().create_on_enter(Key::from_code(13)).await;

    assert!(matches!(result, Err(SyncError::Persistence(_))));
    assert_eq!(app.view().input(), "Milk");
    assert!(app.view().item_views().is_empty());
    assert!(!app.view().chrome().main_visible);
}

#[tokio::test]
async fn test_failed_toggle_rerenders_previous_state() {
    let (store, app) = started(vec![todo("a", "Milk", false, 1)]).await;
    let row = app.view().item_views().remove(0);
    app.navigate("#/active");
    store.fail_next(Op::Update, PersistenceError::Transport("offline".into()));

    assert!(row.toggle().await.is_err());

    assert!(!row.row().fragment.completed);
    assert!(!row.is_hidden());
    assert_eq!(app.view().chrome().stats.remaining, 1);
}

#[tokio::test]
async fn test_unknown_route_selects_all() {
    let (_store, app) = started(vec![todo("a", "Milk", true, 1)]).await;
    let row = app.view().item_views().remove(0);

    assert_eq!(app.navigate("#/active"), Filter::Active);
    assert!(row.is_hidden());

    assert_eq!(app.navigate("#/bogus"), Filter::All);
    assert!(!row.is_hidden());
    assert_eq!(app.view().chrome().selected, Filter::All);
}

#[tokio::test]
async fn test_disposed_view_stops_listening() {
    let (_store, app) = started(vec![todo("a", "Milk", false, 1)]).await;
    let row = app.view().item_views().remove(0);
    let renders = app.view().chrome().renders;

    app.view().dispose();
    app.navigate("#/completed");

    assert!(row.is_removed());
    assert_eq!(app.view().chrome().renders, renders);
    assert_eq!(app.collection().events().listener_count(), 0);
}
