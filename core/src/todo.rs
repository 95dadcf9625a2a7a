//! Todo data model and wire representation.
//!
//! Items exist in two shapes:
//!
//! - **In memory**: [`TodoAttributes`] plus an optional [`TodoId`] (absent until the
//!   remote store has accepted the item) and a transient [`ItemKey`].
//! - **On the wire**: [`TodoRecord`], which carries the identifier as a
//!   `"url": "/<id>"` field so the persistence address of a stored item is always
//!   `base + "/" + id`.
//!
//! Partial updates travel as [`TodoPatch`]; only the fields that changed are
//! serialized.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::fmt;

/// Identifier assigned by the remote store on first successful persistence.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    /// Wrap a raw identifier.
    ///
    /// A leading `/` (as used in the `url` wire field) is stripped.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        match id.strip_prefix('/') {
            Some(stripped) => Self(stripped.to_string()),
            None => Self(id),
        }
    }

    /// The bare identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier as a path segment (`/<id>`), the form used on the wire.
    #[must_use]
    pub fn path(&self) -> String {
        format!("/{}", self.0)
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TodoId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TodoId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Transient in-memory handle for an item.
///
/// Keys are assigned by the owning collection at insertion time and are never
/// reused within a session, so they stay valid before the item has a [`TodoId`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey(u64);

impl ItemKey {
    /// Create a key from its raw value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// The persisted attributes of a todo.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoAttributes {
    /// Task text.
    #[serde(default)]
    pub title: String,
    /// Whether the task is done.
    #[serde(default)]
    pub completed: bool,
    /// Display ordering key, assigned at creation.
    #[serde(default)]
    pub order: i64,
}

impl TodoAttributes {
    /// Apply a patch in place, returning the fields whose value actually changed.
    pub fn apply(&mut self, patch: &TodoPatch) -> ChangedFields {
        let mut changed = ChangedFields::new();
        if let Some(title) = &patch.title {
            if *title != self.title {
                self.title.clone_from(title);
                changed.push(Field::Title);
            }
        }
        if let Some(completed) = patch.completed {
            if completed != self.completed {
                self.completed = completed;
                changed.push(Field::Completed);
            }
        }
        if let Some(order) = patch.order {
            if order != self.order {
                self.order = order;
                changed.push(Field::Order);
            }
        }
        changed
    }
}

/// What a user submits when creating a todo. The order is always assigned by the
/// collection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoDraft {
    /// Task text, trimmed before use.
    pub title: String,
    /// Initial completion state.
    pub completed: bool,
}

impl TodoDraft {
    /// A new, not yet completed draft.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            completed: false,
        }
    }
}

/// A partial update carrying only the changed fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoPatch {
    /// New title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New completion state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    /// New order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl TodoPatch {
    /// Patch that only sets the title.
    #[must_use]
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Patch that only sets the completion flag.
    #[must_use]
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    /// True when no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.completed.is_none() && self.order.is_none()
    }
}

/// Wire representation of a stored todo.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoRecord {
    /// Identifier, serialized as `"url": "/<id>"`.
    #[serde(
        rename = "url",
        serialize_with = "serialize_id_path",
        deserialize_with = "deserialize_id_path"
    )]
    pub id: TodoId,
    /// Stored attributes.
    #[serde(flatten)]
    pub attributes: TodoAttributes,
}

impl TodoRecord {
    /// Build a record from an identifier and attributes.
    #[must_use]
    pub const fn new(id: TodoId, attributes: TodoAttributes) -> Self {
        Self { id, attributes }
    }
}

fn serialize_id_path<S: Serializer>(id: &TodoId, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&id.path())
}

fn deserialize_id_path<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TodoId, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Ok(TodoId::new(raw))
}

/// An attribute of an item that can change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    /// `title`
    Title,
    /// `completed`
    Completed,
    /// `order`
    Order,
    /// The server-assigned identifier.
    Id,
}

/// Set of fields touched by one mutation.
pub type ChangedFields = SmallVec<[Field; 4]>;

/// Largest `order` the REST server stores: the biggest integer a JSON number
/// decoded as a double still represents exactly.
pub const MAX_ORDER: i64 = (1 << 53) - 1;

/// Resolve the persistence address of an item.
///
/// Unpersisted items live at the collection's base address; persisted items at
/// `base/<id>`.
#[must_use]
pub fn persistence_address(base: &str, id: Option<&TodoId>) -> String {
    let base = base.trim_end_matches('/');
    match id {
        Some(id) => format!("{base}/{id}"),
        None => base.to_string(),
    }
}
