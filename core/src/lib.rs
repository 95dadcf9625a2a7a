//! # Todo Sync Core
//!
//! Core types and contracts for the todo state-synchronization engine.
//!
//! This crate holds everything the engine and its collaborators agree on, and nothing
//! that performs I/O:
//!
//! - **Data model** ([`todo`]): identifiers, attributes, partial updates, the wire record
//!   and persistence addresses
//! - **Filters** ([`filter`]): the `all` / `active` / `completed` partition and route
//!   token parsing
//! - **Notifications** ([`event`]): item, collection and filter notifications
//! - **Channels** ([`channel`]): synchronous listener registries with disposal handles
//! - **Remote store** ([`remote`]): the CRUD contract the collection persists through
//! - **Errors** ([`error`]): transport-level failures
//!
//! ## Execution Model
//!
//! The engine is single-threaded and cooperative. Shared state lives behind `Rc` and
//! `RefCell`, notifications are delivered synchronously, and only remote calls suspend.
//! Nothing here is `Send`, by construction.

pub use smallvec::{SmallVec, smallvec};

pub mod channel;
pub mod error;
pub mod event;
pub mod filter;
pub mod remote;
pub mod todo;

pub use channel::{Channel, Scope, Subscription};
pub use error::PersistenceError;
pub use event::{CollectionEvent, FilterChanged, ItemEvent};
pub use filter::Filter;
pub use remote::{RemoteFuture, RemoteStore};
pub use todo::{
    ChangedFields, Field, ItemKey, MAX_ORDER, TodoAttributes, TodoDraft, TodoId, TodoPatch,
    TodoRecord, persistence_address,
};
