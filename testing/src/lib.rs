//! # Todo Sync Testing
//!
//! Testing utilities for the todo sync engine.
//!
//! This crate provides:
//! - [`MockRemoteStore`]: a scripted, call-recording [`RemoteStore`](todo_sync_core::RemoteStore)
//! - [`EventRecorder`]: captures notifications from any channel
//! - [`properties`]: proptest strategies for titles and user action sequences
//! - Record builders and a tracing initializer for tests
//!
//! ## Example
//!
//! ```ignore
//! use todo_sync_testing::{MockRemoteStore, Op, todo};
//! use todo_sync_runtime::Collection;
//! use std::rc::Rc;
//!
//! #[tokio::test]
//! async fn loads_seeded_items() {
//!     let store = Rc::new(MockRemoteStore::with_records(vec![todo("a", "Buy milk", false, 1)]));
//!     let todos = Collection::new("/api/todo", store.clone());
//!
//!     todos.load().await.unwrap();
//!     assert_eq!(todos.len(), 1);
//!     assert_eq!(store.count(Op::Fetch), 1);
//! }
//! ```

pub mod mock_store;
pub mod properties;
pub mod recorder;

pub use mock_store::{Call, MockRemoteStore, Op};
pub use recorder::EventRecorder;

use todo_sync_core::{TodoAttributes, TodoId, TodoRecord};

/// Build a stored record.
#[must_use]
pub fn todo(id: &str, title: &str, completed: bool, order: i64) -> TodoRecord {
    TodoRecord::new(
        TodoId::new(id),
        TodoAttributes {
            title: title.to_string(),
            completed,
            order,
        },
    )
}

/// Route `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
