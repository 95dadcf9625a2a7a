//! # Todo Sync Runtime
//!
//! The state-synchronization engine: keeps an in-memory todo list, a remote store and
//! a set of headless views consistent with each other.
//!
//! ## Core Components
//!
//! - **Item** ([`Item`]): one todo with its own notifications and per-item persistence
//! - **Collection** ([`Collection`]): the ordered, persisted set of items
//! - **Filter Controller** ([`FilterController`]): route-driven `all` / `active` /
//!   `completed` state machine with a single writer
//! - **Views** ([`view`]): per-item rows and the aggregate list view
//! - **App** ([`TodoApp`]): wires everything to a base address and a remote store
//! - **HTTP store** ([`HttpRemoteStore`]): [`RemoteStore`](todo_sync_core::RemoteStore)
//!   over the REST API
//!
//! ## Execution Model
//!
//! Everything runs on one logical event loop. Notifications are delivered
//! synchronously, so once a mutating call returns every view has re-rendered. The
//! only suspension points are remote calls.
//!
//! ## Example
//!
//! ```no_run
//! use todo_sync_runtime::{HttpRemoteStore, TodoApp, view::Key};
//! use std::rc::Rc;
//!
//! # async fn example() -> Result<(), todo_sync_runtime::SyncError> {
//! let app = TodoApp::new("/api/todo", Rc::new(HttpRemoteStore::new("http://localhost:8080")));
//! app.start().await?;
//!
//! app.view().set_input("Buy milk");
//! app.view().create_on_enter(Key::Enter).await?;
//!
//! app.navigate("#/active");
//! assert_eq!(app.view().chrome().stats.remaining, 1);
//! # Ok(())
//! # }
//! ```

/// Application bootstrap
pub mod app;

/// The Item Collection
pub mod collection;

/// Errors returned by engine operations
pub mod error;

/// Filter state and its controller
pub mod filter;

/// HTTP implementation of the remote store
pub mod http;

/// The Item Entity
pub mod item;

/// Prometheus metrics for remote persistence calls
pub mod metrics;

pub mod view;

pub use app::{DEFAULT_API_BASE, TodoApp};
pub use collection::Collection;
pub use error::SyncError;
pub use filter::{FilterController, FilterState};
pub use http::HttpRemoteStore;
pub use item::{EditOutcome, Item};
pub use view::{AppView, ItemView};
