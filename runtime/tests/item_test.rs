//! Tests for per-item persistence: toggling, editing and destroying

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect

use std::rc::Rc;
use todo_sync_core::{
    CollectionEvent, Field, ItemEvent, PersistenceError, TodoDraft, TodoPatch, TodoRecord,
    smallvec,
};
use todo_sync_runtime::{Collection, EditOutcome, Item, SyncError};
use todo_sync_testing::{Call, EventRecorder, MockRemoteStore, Op, todo};

const BASE: &str = "/api/todo";

async fn loaded(records: Vec<TodoRecord>) -> (Rc<MockRemoteStore>, Collection) {
    let store = Rc::new(MockRemoteStore::with_records(records));
    let todos = Collection::new(BASE, Rc::<MockRemoteStore>::clone(&store));
    todos.load().await.unwrap();
    store.clear_calls();
    (store, todos)
}

fn first(todos: &Collection) -> Item {
    todos.items().into_iter().next().expect("collection is not empty")
}

#[tokio::test]
async fn test_toggle_persists_only_completed() {
    let (store, todos) = loaded(vec![todo("a", "Buy milk", false, 1)]).await;
    let item = first(&todos);
    let recorder = EventRecorder::attach(item.events());

    item.toggle_completion().await.unwrap();

    assert!(item.completed());
    assert_eq!(
        store.calls(),
        vec![Call::Update {
            url: "/api/todo/a".into(),
            patch: TodoPatch::completed(true),
        }]
    );
    assert_eq!(
        recorder.events(),
        vec![ItemEvent::Changed(smallvec![Field::Completed]), ItemEvent::Synced]
    );
    assert!(store.record(&item.id().unwrap()).unwrap().attributes.completed);
}

#[tokio::test]
async fn test_failed_toggle_is_reverted() {
    let (store, todos) = loaded(vec![todo("a", "Buy milk", false, 1)]).await;
    let item = first(&todos);
    store.fail_next(Op::Update, PersistenceError::Transport("timeout".into()));
    let item_events = EventRecorder::attach(item.events());
    let collection_events = EventRecorder::attach(todos.events());

    let result = item.toggle_completion().await;

    assert!(result.unwrap_err().is_persistence());
    assert!(!item.completed());
    assert_eq!(todos.remaining().len(), 1);
    assert_eq!(
        item_events.count(|event| event.touches(Field::Completed)),
        2,
        "one change for the toggle and one for the rollback"
    );
    assert!(matches!(item_events.events().last(), Some(ItemEvent::Failed(_))));
    assert_eq!(
        collection_events.count(|event| matches!(event, CollectionEvent::Failed { .. })),
        1
    );
    assert!(!store.record(&item.id().unwrap()).unwrap().attributes.completed);
}

#[tokio::test]
async fn test_failed_save_keeps_fields_overwritten_since() {
    let (store, todos) = loaded(vec![todo("a", "Buy milk", false, 1)]).await;
    let item = first(&todos);
    store.hold(Op::Update);

    let mut toggle = Box::pin(item.save(TodoPatch::completed(true)));
    assert!(futures::poll!(&mut toggle).is_pending());
    let mut untoggle = Box::pin(item.save(TodoPatch::completed(false)));
    assert!(futures::poll!(&mut untoggle).is_pending());
    let mut rename = Box::pin(item.save(TodoPatch::title("Buy oat milk")));
    assert!(futures::poll!(&mut rename).is_pending());

    store.fail_next(Op::Update, PersistenceError::Transport("timeout".into()));
    store.release(Op::Update);

    assert!(toggle.await.is_err());
    untoggle.await.unwrap();
    rename.await.unwrap();

    assert!(!item.completed());
    assert_eq!(item.title(), "Buy oat milk");
}

#[tokio::test]
async fn test_apply_edit_saves_trimmed_title() {
    let (store, todos) = loaded(vec![todo("a", "Buy milk", false, 1)]).await;
    let item = first(&todos);

    let outcome = item.apply_edit("  Buy bread  ").await.unwrap();

    assert_eq!(outcome, EditOutcome::Saved);
    assert_eq!(item.title(), "Buy bread");
    assert_eq!(
        store.calls(),
        vec![Call::Update {
            url: "/api/todo/a".into(),
            patch: TodoPatch::title("Buy bread"),
        }]
    );
}

#[tokio::test]
async fn test_apply_edit_with_blank_title_destroys() {
    let (store, todos) = loaded(vec![todo("a", "Buy milk", false, 1)]).await;
    let item = first(&todos);

    let outcome = item.apply_edit(" \t ").await.unwrap();

    assert_eq!(outcome, EditOutcome::Destroyed);
    assert!(todos.is_empty());
    assert_eq!(store.count(Op::Update), 0);
    assert_eq!(store.calls(), vec![Call::Delete { url: "/api/todo/a".into() }]);
    assert!(store.records().is_empty());
}

#[tokio::test]
async fn test_destroy_waits_for_the_store() {
    let (store, todos) = loaded(vec![todo("a", "Buy milk", false, 1)]).await;
    let item = first(&todos);
    let item_events = EventRecorder::attach(item.events());
    let collection_events = EventRecorder::attach(todos.events());
    store.hold(Op::Delete);

    let mut destroy = Box::pin(item.destroy());
    assert!(futures::poll!(&mut destroy).is_pending());
    assert_eq!(todos.len(), 1);
    assert!(item_events.is_empty());

    store.release(Op::Delete);
    destroy.await.unwrap();

    assert!(todos.is_empty());
    assert!(!item.is_attached());
    assert_eq!(item_events.events(), vec![ItemEvent::Destroyed]);
    assert_eq!(
        collection_events.events(),
        vec![CollectionEvent::Remove(item.key())]
    );
}

#[tokio::test]
async fn test_failed_destroy_keeps_item() {
    let (store, todos) = loaded(vec![todo("a", "Buy milk", false, 1)]).await;
    let item = first(&todos);
    store.fail_next(
        Op::Delete,
        PersistenceError::Status {
            url: "/api/todo/a".into(),
            status: 503,
        },
    );

    let result = item.destroy().await;

    assert!(result.unwrap_err().is_persistence());
    assert_eq!(todos.len(), 1);
    assert!(item.is_attached());
    assert_eq!(store.records().len(), 1);
}

#[tokio::test]
async fn test_destroy_of_item_missing_remotely_succeeds() {
    let (store, todos) = loaded(vec![todo("a", "Buy milk", false, 1)]).await;
    let item = first(&todos);
    store.fail_next(Op::Delete, PersistenceError::NotFound("/api/todo/a".into()));

    item.destroy().await.unwrap();

    assert!(todos.is_empty());
}

#[tokio::test]
async fn test_destroy_while_create_is_pending_is_rejected() {
    let (store, todos) = loaded(Vec::new()).await;
    store.hold(Op::Create);

    let mut create = Box::pin(todos.create(TodoDraft::new("Buy milk")));
    assert!(futures::poll!(&mut create).is_pending());
    let pending = first(&todos);
    assert!(pending.is_new());
    assert_eq!(pending.url(), BASE);

    assert_eq!(
        pending.destroy().await,
        Err(SyncError::NotYetPersisted(pending.key()))
    );
    assert_eq!(
        pending.toggle_completion().await,
        Err(SyncError::NotYetPersisted(pending.key()))
    );
    assert!(!pending.completed());
    assert_eq!(store.count(Op::Delete), 0);
    assert_eq!(store.count(Op::Update), 0);

    store.release(Op::Create);
    let created = create.await.unwrap().unwrap();
    assert!(created.ptr_eq(&pending));

    pending.destroy().await.unwrap();
    assert!(todos.is_empty());
}

#[tokio::test]
async fn test_destroyed_item_rejects_further_operations() {
    let (store, todos) = loaded(vec![todo("a", "Buy milk", false, 1)]).await;
    let item = first(&todos);
    item.destroy().await.unwrap();
    store.clear_calls();

    assert_eq!(item.destroy().await, Err(SyncError::Detached(item.key())));
    assert_eq!(
        item.apply_edit("Again").await,
        Err(SyncError::Detached(item.key()))
    );
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_item_subscription_ends_on_dispose() {
    let (_store, todos) = loaded(vec![todo("a", "Buy milk", false, 1)]).await;
    let item = first(&todos);
    let subscription = item.subscribe(|_| {});
    assert_eq!(item.events().listener_count(), 1);

    subscription.dispose();

    assert_eq!(item.events().listener_count(), 0);
}
