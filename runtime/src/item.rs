//! The Item Entity: one todo, its notifications and its per-item persistence.
//!
//! An [`Item`] is a cheap, clonable handle. Every handle to the same item shares its
//! state and its notification channel.
//!
//! # Persistence Policy
//!
//! - [`Item::save`] (and therefore [`Item::toggle_completion`] and [`Item::apply_edit`])
//!   is **optimistic**: the change is applied and announced first, then PATCHed. If the
//!   PATCH fails, every field that still holds the value this save wrote is restored
//!   and a second change notification fires.
//! - [`Item::destroy`] is **pessimistic**: the DELETE has to succeed before the item
//!   leaves the collection. A `NotFound` answer counts as success.
//! - Neither operation is possible before the create call has assigned an identifier:
//!   both return [`SyncError::NotYetPersisted`] and change nothing.

use crate::collection::CollectionInner;
use crate::error::SyncError;
use crate::metrics::{Operation, observe};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use todo_sync_core::{
    Channel, ChangedFields, CollectionEvent, Field, ItemEvent, ItemKey, PersistenceError,
    Subscription, TodoAttributes, TodoId, TodoPatch, persistence_address,
};

/// What [`Item::apply_edit`] did with the submitted title.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    /// The trimmed title was saved.
    Saved,
    /// The title was blank, so the item was destroyed.
    Destroyed,
}

struct ItemState {
    id: Option<TodoId>,
    attributes: TodoAttributes,
    attached: bool,
}

pub(crate) struct ItemInner {
    key: ItemKey,
    base: Rc<str>,
    state: RefCell<ItemState>,
    events: Channel<ItemEvent>,
    owner: Weak<CollectionInner>,
}

/// Handle to a single todo.
#[derive(Clone)]
pub struct Item {
    inner: Rc<ItemInner>,
}

impl Item {
    pub(crate) fn new(
        key: ItemKey,
        id: Option<TodoId>,
        attributes: TodoAttributes,
        owner: &Rc<CollectionInner>,
    ) -> Self {
        Self {
            inner: Rc::new(ItemInner {
                key,
                base: Rc::clone(&owner.base),
                state: RefCell::new(ItemState {
                    id,
                    attributes,
                    attached: true,
                }),
                events: Channel::new(),
                owner: Rc::downgrade(owner),
            }),
        }
    }

    /// Transient in-memory handle.
    #[must_use]
    pub fn key(&self) -> ItemKey {
        self.inner.key
    }

    /// Server-assigned identifier, absent until the create call succeeds.
    #[must_use]
    pub fn id(&self) -> Option<TodoId> {
        self.inner.state.borrow().id.clone()
    }

    /// Whether the item has no identifier yet.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.inner.state.borrow().id.is_none()
    }

    /// Current title.
    #[must_use]
    pub fn title(&self) -> String {
        self.inner.state.borrow().attributes.title.clone()
    }

    /// Current completion state.
    #[must_use]
    pub fn completed(&self) -> bool {
        self.inner.state.borrow().attributes.completed
    }

    /// Display ordering key.
    #[must_use]
    pub fn order(&self) -> i64 {
        self.inner.state.borrow().attributes.order
    }

    /// Snapshot of all attributes.
    #[must_use]
    pub fn attributes(&self) -> TodoAttributes {
        self.inner.state.borrow().attributes.clone()
    }

    /// Whether the item is still part of its collection.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.inner.state.borrow().attached
    }

    /// Persistence address: the collection base while unpersisted, `base/<id>` after.
    #[must_use]
    pub fn url(&self) -> String {
        persistence_address(&self.inner.base, self.inner.state.borrow().id.as_ref())
    }

    /// This item's notification channel.
    #[must_use]
    pub fn events(&self) -> &Channel<ItemEvent> {
        &self.inner.events
    }

    /// Listen to this item's notifications.
    #[must_use = "dropping the subscription detaches the listener immediately"]
    pub fn subscribe(&self, listener: impl Fn(&ItemEvent) + 'static) -> Subscription {
        self.inner.events.subscribe(listener)
    }

    /// Whether two handles refer to the same item.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Flip `completed` and persist only that field.
    ///
    /// # Errors
    ///
    /// See [`Item::save`].
    pub async fn toggle_completion(&self) -> Result<(), SyncError> {
        let completed = !self.completed();
        self.save(TodoPatch::completed(completed)).await
    }

    /// Save an edited title.
    ///
    /// The title is trimmed. A blank title is a request to delete the item, not to
    /// store an empty title.
    ///
    /// # Errors
    ///
    /// See [`Item::save`] and [`Item::destroy`].
    pub async fn apply_edit(&self, title: &str) -> Result<EditOutcome, SyncError> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            self.destroy().await?;
            return Ok(EditOutcome::Destroyed);
        }

        self.save(TodoPatch::title(trimmed)).await?;
        Ok(EditOutcome::Saved)
    }

    /// Apply `patch` locally and persist it as a partial update.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Detached`] if the item left its collection
    /// - [`SyncError::NotYetPersisted`] if the create call is still pending
    /// - [`SyncError::Persistence`] if the PATCH failed; the local change is reverted
    #[tracing::instrument(skip(self, patch), fields(item = %self.key()))]
    pub async fn save(&self, patch: TodoPatch) -> Result<(), SyncError> {
        let owner = self.owner()?;
        let id = self.id().ok_or(SyncError::NotYetPersisted(self.key()))?;

        let (previous, changed) = {
            let mut state = self.inner.state.borrow_mut();
            let previous = state.attributes.clone();
            let changed = state.attributes.apply(&patch);
            (previous, changed)
        };
        if !changed.is_empty() {
            self.announce_change(&owner, changed);
        }

        let url = persistence_address(&owner.base, Some(&id));
        let call = owner.store.update(&url, patch.clone());
        let result = observe(Operation::Update, &url, call).await;

        match result {
            Ok(()) => {
                self.announce_sync(&owner);
                Ok(())
            }
            Err(error) => {
                let restored = self.revert(&previous, &patch);
                if !restored.is_empty() {
                    self.announce_change(&owner, restored);
                }
                self.announce_failure(&owner, &error);
                Err(error.into())
            }
        }
    }

    /// Delete the item remotely, then remove it from its collection.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Detached`] if the item already left its collection
    /// - [`SyncError::NotYetPersisted`] if the create call is still pending
    /// - [`SyncError::Persistence`] if the DELETE failed; the item stays in place
    #[tracing::instrument(skip(self), fields(item = %self.key()))]
    pub async fn destroy(&self) -> Result<(), SyncError> {
        let owner = self.owner()?;
        let id = self.id().ok_or(SyncError::NotYetPersisted(self.key()))?;

        let url = persistence_address(&owner.base, Some(&id));
        match observe(Operation::Delete, &url, owner.store.delete(&url)).await {
            Ok(()) => {}
            Err(error) if error.is_not_found() => {
                tracing::debug!(%url, "item already absent from remote store");
            }
            Err(error) => {
                self.announce_failure(&owner, &error);
                return Err(error.into());
            }
        }

        owner.remove(self.key());
        Ok(())
    }

    fn owner(&self) -> Result<Rc<CollectionInner>, SyncError> {
        if !self.is_attached() {
            return Err(SyncError::Detached(self.key()));
        }
        self.inner
            .owner
            .upgrade()
            .ok_or(SyncError::Detached(self.key()))
    }

    /// Undo the fields of `patch` that still hold the value it wrote.
    fn revert(&self, previous: &TodoAttributes, patch: &TodoPatch) -> ChangedFields {
        let mut state = self.inner.state.borrow_mut();
        let current = &mut state.attributes;
        let mut restored = ChangedFields::new();

        if let Some(title) = &patch.title {
            if current.title == *title && current.title != previous.title {
                current.title.clone_from(&previous.title);
                restored.push(Field::Title);
            }
        }
        if let Some(completed) = patch.completed {
            if current.completed == completed && current.completed != previous.completed {
                current.completed = previous.completed;
                restored.push(Field::Completed);
            }
        }
        if let Some(order) = patch.order {
            if current.order == order && current.order != previous.order {
                current.order = previous.order;
                restored.push(Field::Order);
            }
        }
        restored
    }

    pub(crate) fn assign_id(&self, owner: &CollectionInner, id: TodoId) {
        self.inner.state.borrow_mut().id = Some(id);
        let mut fields = ChangedFields::new();
        fields.push(Field::Id);
        self.announce_change(owner, fields);
        self.announce_sync(owner);
    }

    pub(crate) fn detach(&self) {
        self.inner.state.borrow_mut().attached = false;
    }

    pub(crate) fn announce_destroyed(&self) {
        self.inner.events.emit(&ItemEvent::Destroyed);
    }

    fn announce_change(&self, owner: &CollectionInner, fields: ChangedFields) {
        self.inner.events.emit(&ItemEvent::Changed(fields.clone()));
        if self.is_attached() {
            owner.events.emit(&CollectionEvent::Change {
                key: self.key(),
                fields,
            });
        }
    }

    fn announce_sync(&self, owner: &CollectionInner) {
        self.inner.events.emit(&ItemEvent::Synced);
        if self.is_attached() {
            owner.events.emit(&CollectionEvent::Sync(self.key()));
        }
    }

    pub(crate) fn announce_failure(&self, owner: &CollectionInner, error: &PersistenceError) {
        self.inner.events.emit(&ItemEvent::Failed(error.to_string()));
        if self.is_attached() {
            owner.events.emit(&CollectionEvent::Failed {
                key: Some(self.key()),
                message: error.to_string(),
            });
        }
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Item")
            .field("key", &self.inner.key)
            .field("id", &state.id)
            .field("title", &state.attributes.title)
            .field("completed", &state.attributes.completed)
            .field("order", &state.attributes.order)
            .field("attached", &state.attached)
            .finish()
    }
}
