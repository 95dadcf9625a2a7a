//! Notifications emitted by items, the collection and the filter controller.
//!
//! Notifications are facts about something that already happened to in-memory state.
//! They are delivered synchronously through a [`Channel`](crate::channel::Channel):
//! by the time the mutating call returns, every listener has run.
//!
//! # Example
//!
//! ```
//! use todo_sync_core::event::{CollectionEvent, ItemEvent};
//! use todo_sync_core::todo::{Field, ItemKey};
//! use todo_sync_core::smallvec;
//!
//! let toggled = ItemEvent::Changed(smallvec![Field::Completed]);
//! assert!(toggled.touches(Field::Completed));
//! assert!(!toggled.touches(Field::Title));
//!
//! assert_eq!(CollectionEvent::Add(ItemKey::new(1)).name(), "add");
//! ```

use crate::todo::{ChangedFields, Field, ItemKey};

/// Notifications scoped to a single item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemEvent {
    /// One or more attributes changed locally (including rollbacks and the
    /// identifier being assigned).
    Changed(ChangedFields),
    /// A remote call for this item completed successfully.
    Synced,
    /// The item left its collection. No further notifications follow.
    Destroyed,
    /// A remote call for this item failed; local state has been restored.
    Failed(String),
}

impl ItemEvent {
    /// Whether this is a change notification that includes `field`.
    #[must_use]
    pub fn touches(&self, field: Field) -> bool {
        matches!(self, Self::Changed(fields) if fields.contains(&field))
    }

    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Changed(_) => "change",
            Self::Synced => "sync",
            Self::Destroyed => "destroy",
            Self::Failed(_) => "error",
        }
    }
}

/// Collection-level notifications.
///
/// Listeners that want to observe everything (the aggregate view) subscribe once and
/// receive every variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CollectionEvent {
    /// A single item was inserted by a user-initiated create.
    Add(ItemKey),
    /// A single item was removed.
    Remove(ItemKey),
    /// The whole contents were replaced by a load.
    Reset,
    /// An item's attributes changed.
    Change {
        /// The item that changed.
        key: ItemKey,
        /// The fields that changed.
        fields: ChangedFields,
    },
    /// A remote call for an item completed successfully.
    Sync(ItemKey),
    /// A remote call failed.
    Failed {
        /// The affected item, if the failure concerned one.
        key: Option<ItemKey>,
        /// Human-readable reason.
        message: String,
    },
}

impl CollectionEvent {
    /// The item this notification concerns, if any.
    #[must_use]
    pub const fn key(&self) -> Option<ItemKey> {
        match self {
            Self::Add(key) | Self::Remove(key) | Self::Sync(key) | Self::Change { key, .. } => {
                Some(*key)
            }
            Self::Failed { key, .. } => *key,
            Self::Reset => None,
        }
    }

    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Add(_) => "add",
            Self::Remove(_) => "remove",
            Self::Reset => "reset",
            Self::Change { .. } => "change",
            Self::Sync(_) => "sync",
            Self::Failed { .. } => "error",
        }
    }
}

/// Broadcast by the filter controller on every route transition.
///
/// Carries no payload: listeners read the current filter themselves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FilterChanged;
