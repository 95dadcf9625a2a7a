//! The remote persistence contract.
//!
//! The remote store is an opaque CRUD interface over a base collection address:
//!
//! | call | request | result |
//! |---|---|---|
//! | [`RemoteStore::fetch`] | `GET base` | ordered list of records |
//! | [`RemoteStore::create`] | `POST base` with attributes | created record with identifier |
//! | [`RemoteStore::update`] | `PATCH base/id` with changed fields only | success / failure |
//! | [`RemoteStore::delete`] | `DELETE base/id` | success / failure |
//!
//! Every call takes the persistence address of its target (see
//! [`persistence_address`](crate::todo::persistence_address)), so implementations never
//! need to know how addresses are derived.
//!
//! # Implementations
//!
//! - `HttpRemoteStore` (in `todo-sync-runtime`): talks to the REST server
//! - `MockRemoteStore` (in `todo-sync-testing`): scripted, call-recording store for tests
//!
//! # Dyn Compatibility
//!
//! Methods return boxed futures instead of using `async fn` so the collection can hold
//! an `Rc<dyn RemoteStore>`. The futures are not `Send`: the sync engine runs on a
//! single logical event loop.

use crate::error::PersistenceError;
use crate::todo::{TodoAttributes, TodoPatch, TodoRecord};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by [`RemoteStore`] methods.
pub type RemoteFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, PersistenceError>> + 'a>>;

/// CRUD access to the remote collection.
pub trait RemoteStore {
    /// Load every record stored under `url` (the collection base address).
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] when the request fails or the response cannot be
    /// decoded.
    fn fetch(&self, url: &str) -> RemoteFuture<'_, Vec<TodoRecord>>;

    /// Persist a new item under `url` (the collection base address).
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] when the store rejects the item.
    fn create(&self, url: &str, attributes: TodoAttributes) -> RemoteFuture<'_, TodoRecord>;

    /// Apply a partial update to the item stored at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::NotFound`] when nothing is stored at `url`, or
    /// another [`PersistenceError`] when the request fails.
    fn update(&self, url: &str, patch: TodoPatch) -> RemoteFuture<'_, ()>;

    /// Remove the item stored at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::NotFound`] when nothing is stored at `url`, or
    /// another [`PersistenceError`] when the request fails.
    fn delete(&self, url: &str) -> RemoteFuture<'_, ()>;
}
