//! The Item Collection: the ordered, remotely persisted set of items for a session.
//!
//! The collection is the single shared mutable resource of the engine. Its contents
//! only change through [`Collection::load`], [`Collection::create`] and item
//! destruction, and every change is announced on its [`Channel`] before the call that
//! caused it returns.
//!
//! # Ordering
//!
//! Items are kept in ascending `order`. A load sorts the fetched records (stable, so
//! equal orders keep the store's sequence); a create appends, which preserves the
//! sort because [`Collection::next_order`] is strictly greater than every existing
//! order.
//!
//! # Example
//!
//! ```no_run
//! use todo_sync_runtime::{Collection, HttpRemoteStore};
//! use todo_sync_core::TodoDraft;
//! use std::rc::Rc;
//!
//! # async fn example() -> Result<(), todo_sync_runtime::SyncError> {
//! let store = Rc::new(HttpRemoteStore::new("http://localhost:8080"));
//! let todos = Collection::new("/api/todo", store);
//!
//! todos.load().await?;
//! todos.create(TodoDraft::new("Buy milk")).await?;
//!
//! println!("{} left", todos.remaining().len());
//! # Ok(())
//! # }
//! ```

use crate::error::SyncError;
use crate::item::Item;
use crate::metrics::{Operation, observe};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use todo_sync_core::{
    Channel, CollectionEvent, ItemKey, RemoteStore, Subscription, TodoAttributes, TodoDraft,
    TodoId,
};

pub(crate) struct CollectionInner {
    pub(crate) base: Rc<str>,
    pub(crate) store: Rc<dyn RemoteStore>,
    pub(crate) events: Channel<CollectionEvent>,
    items: RefCell<Vec<Item>>,
    next_key: Cell<u64>,
    loading: Cell<bool>,
    pending_creates: Cell<usize>,
}

impl CollectionInner {
    /// Remove an item and announce it. Returns `None` if it was already gone.
    pub(crate) fn remove(&self, key: ItemKey) -> Option<Item> {
        let removed = {
            let mut items = self.items.borrow_mut();
            let position = items.iter().position(|item| item.key() == key)?;
            items.remove(position)
        };

        removed.detach();
        removed.announce_destroyed();
        self.events.emit(&CollectionEvent::Remove(key));
        Some(removed)
    }

    fn holds_id(&self, id: &TodoId, except: ItemKey) -> bool {
        self.items
            .borrow()
            .iter()
            .any(|item| item.key() != except && item.id().as_ref() == Some(id))
    }

    fn allocate_key(&self) -> ItemKey {
        let raw = self.next_key.get();
        self.next_key.set(raw + 1);
        ItemKey::new(raw)
    }
}

/// Resets the loading flag even if the load future is dropped mid-flight.
struct LoadingGuard<'a>(&'a Cell<bool>);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Counts one in-flight create for as long as it lives.
struct PendingCreate<'a>(&'a Cell<usize>);

impl<'a> PendingCreate<'a> {
    fn enter(counter: &'a Cell<usize>) -> Self {
        counter.set(counter.get() + 1);
        Self(counter)
    }
}

impl Drop for PendingCreate<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

/// Ordered, persisted collection of [`Item`]s.
///
/// Cloning yields another handle to the same collection.
#[derive(Clone)]
pub struct Collection {
    inner: Rc<CollectionInner>,
}

impl Collection {
    /// Create an empty collection persisted at `base` through `store`.
    #[must_use]
    pub fn new(base: impl Into<String>, store: Rc<dyn RemoteStore>) -> Self {
        let base: String = base.into();
        Self {
            inner: Rc::new(CollectionInner {
                base: Rc::from(base.trim_end_matches('/')),
                store,
                events: Channel::new(),
                items: RefCell::new(Vec::new()),
                next_key: Cell::new(1),
                loading: Cell::new(false),
                pending_creates: Cell::new(0),
            }),
        }
    }

    /// Base persistence address.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base
    }

    /// The collection's notification channel.
    #[must_use]
    pub fn events(&self) -> &Channel<CollectionEvent> {
        &self.inner.events
    }

    /// Listen to every collection notification.
    #[must_use = "dropping the subscription detaches the listener immediately"]
    pub fn subscribe(&self, listener: impl Fn(&CollectionEvent) + 'static) -> Subscription {
        self.inner.events.subscribe(listener)
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    /// True when there are no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.items.borrow().is_empty()
    }

    /// Snapshot of the items, in display order.
    #[must_use]
    pub fn items(&self) -> Vec<Item> {
        self.inner.items.borrow().clone()
    }

    /// Look an item up by its in-memory key.
    #[must_use]
    pub fn get(&self, key: ItemKey) -> Option<Item> {
        self.inner
            .items
            .borrow()
            .iter()
            .find(|item| item.key() == key)
            .cloned()
    }

    /// Look an item up by its server identifier.
    #[must_use]
    pub fn find(&self, id: &TodoId) -> Option<Item> {
        self.inner
            .items
            .borrow()
            .iter()
            .find(|item| item.id().as_ref() == Some(id))
            .cloned()
    }

    /// Items whose `completed` flag is set. Recomputed on every call.
    #[must_use]
    pub fn completed(&self) -> Vec<Item> {
        self.partition(true)
    }

    /// Items whose `completed` flag is clear. Recomputed on every call.
    #[must_use]
    pub fn remaining(&self) -> Vec<Item> {
        self.partition(false)
    }

    fn partition(&self, completed: bool) -> Vec<Item> {
        self.inner
            .items
            .borrow()
            .iter()
            .filter(|item| item.completed() == completed)
            .cloned()
            .collect()
    }

    /// `1 + max(order)` over the current items, or `1` when empty.
    ///
    /// # Errors
    ///
    /// [`SyncError::OrderExhausted`] if an item already holds `i64::MAX`.
    pub fn next_order(&self) -> Result<i64, SyncError> {
        let max = self.inner.items.borrow().iter().map(Item::order).max();
        match max {
            None => Ok(1),
            Some(max) => max.checked_add(1).ok_or(SyncError::OrderExhausted(max)),
        }
    }

    /// Whether a load is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.loading.get()
    }

    /// Number of creates still waiting for the remote store.
    #[must_use]
    pub fn pending_creates(&self) -> usize {
        self.inner.pending_creates.get()
    }

    /// Fetch everything from the remote store and replace the contents.
    ///
    /// The replacement is a single step followed by exactly one
    /// [`CollectionEvent::Reset`]; no per-item `Add` notifications are emitted.
    /// Records are de-duplicated by identifier (first wins) and sorted by order.
    ///
    /// Returns the number of items loaded.
    ///
    /// # Errors
    ///
    /// - [`SyncError::LoadInProgress`] if another load is in flight
    /// - [`SyncError::CreatePending`] if a create is still waiting for the store;
    ///   nothing is fetched
    /// - [`SyncError::Persistence`] if the fetch failed; contents are left untouched
    #[tracing::instrument(skip(self), fields(base = %self.inner.base))]
    pub async fn load(&self) -> Result<usize, SyncError> {
        let pending = self.pending_creates();
        if pending > 0 {
            return Err(SyncError::CreatePending(pending));
        }
        if self.inner.loading.replace(true) {
            return Err(SyncError::LoadInProgress);
        }
        let guard = LoadingGuard(&self.inner.loading);

        let base = Rc::clone(&self.inner.base);
        let result = observe(Operation::Fetch, &base, self.inner.store.fetch(&base)).await;
        drop(guard);

        let records = match result {
            Ok(records) => records,
            Err(error) => {
                self.inner.events.emit(&CollectionEvent::Failed {
                    key: None,
                    message: error.to_string(),
                });
                return Err(error.into());
            }
        };

        let mut seen = HashSet::new();
        let mut fresh: Vec<Item> = records
            .into_iter()
            .filter(|record| seen.insert(record.id.clone()))
            .map(|record| {
                Item::new(
                    self.inner.allocate_key(),
                    Some(record.id),
                    record.attributes,
                    &self.inner,
                )
            })
            .collect();
        fresh.sort_by_key(Item::order);

        let count = fresh.len();
        let stale = std::mem::replace(&mut *self.inner.items.borrow_mut(), fresh);
        for item in &stale {
            item.detach();
        }

        tracing::info!(count, replaced = stale.len(), "collection reset");
        self.inner.events.emit(&CollectionEvent::Reset);
        Ok(count)
    }

    /// Create an item from a user submission and persist it.
    ///
    /// The title is trimmed; a blank title is ignored (`Ok(None)`, nothing created,
    /// no remote call). Otherwise the item is inserted with [`Collection::next_order`],
    /// exactly one [`CollectionEvent::Add`] fires, and the item is POSTed. On success it
    /// receives its identifier; on failure it is removed again.
    ///
    /// # Errors
    ///
    /// - [`SyncError::LoadInProgress`] if a load is in flight (nothing is inserted)
    /// - [`SyncError::OrderExhausted`] if no order is left (nothing is inserted)
    /// - [`SyncError::Persistence`] if the POST failed (the item is rolled back)
    /// - [`SyncError::DuplicateId`] if the store returned an identifier already in use
    ///   (the item is rolled back)
    #[tracing::instrument(skip(self, draft), fields(base = %self.inner.base))]
    pub async fn create(&self, draft: TodoDraft) -> Result<Option<Item>, SyncError> {
        let title = draft.title.trim();
        if title.is_empty() {
            tracing::debug!("ignoring create with a blank title");
            return Ok(None);
        }
        if self.is_loading() {
            return Err(SyncError::LoadInProgress);
        }

        let attributes = TodoAttributes {
            title: title.to_string(),
            completed: draft.completed,
            order: self.next_order()?,
        };
        let item = Item::new(
            self.inner.allocate_key(),
            None,
            attributes.clone(),
            &self.inner,
        );
        self.inner.items.borrow_mut().push(item.clone());
        self.inner.events.emit(&CollectionEvent::Add(item.key()));

        let base = Rc::clone(&self.inner.base);
        let pending = PendingCreate::enter(&self.inner.pending_creates);
        let call = self.inner.store.create(&base, attributes);
        let result = observe(Operation::Create, &base, call).await;
        drop(pending);

        match result {
            Ok(record) => {
                if self.inner.holds_id(&record.id, item.key()) {
                    tracing::warn!(id = %record.id, "remote store returned a duplicate identifier");
                    self.inner.events.emit(&CollectionEvent::Failed {
                        key: Some(item.key()),
                        message: format!("duplicate identifier {}", record.id),
                    });
                    self.inner.remove(item.key());
                    return Err(SyncError::DuplicateId(record.id));
                }
                item.assign_id(&self.inner, record.id);
                Ok(Some(item))
            }
            Err(error) => {
                item.announce_failure(&self.inner, &error);
                self.inner.remove(item.key());
                Err(error.into())
            }
        }
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("base", &self.inner.base)
            .field("items", &*self.inner.items.borrow())
            .field("loading", &self.inner.loading.get())
            .field("pending_creates", &self.inner.pending_creates.get())
            .finish()
    }
}
