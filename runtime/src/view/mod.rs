//! Headless view models.
//!
//! Views hold exactly what a renderer needs (the fragments below, visibility flags,
//! edit-mode state) and keep it current by listening to entity, collection and filter
//! notifications. Markup is left to whoever consumes the fragments.
//!
//! - [`ItemView`] renders one item and owns its row interactions
//! - [`AppView`] orchestrates the list, the footer and the new-item input

mod app_view;
mod item_view;

pub use app_view::{AppView, Chrome};
pub use item_view::{ItemView, Row};

use serde::Serialize;
use todo_sync_core::TodoId;

/// Keyboard input the views react to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    /// Confirms the current input.
    Enter,
    /// Cancels an edit.
    Escape,
    /// Anything else.
    Other,
}

impl Key {
    /// Map a DOM key code.
    #[must_use]
    pub const fn from_code(code: u32) -> Self {
        match code {
            13 => Self::Enter,
            27 => Self::Escape,
            _ => Self::Other,
        }
    }
}

/// Data consumed by the item template.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ItemFragment {
    /// Server identifier, absent while the create call is pending.
    pub id: Option<TodoId>,
    /// Title.
    pub title: String,
    /// Completion flag.
    pub completed: bool,
}

/// Data consumed by the stats template.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatsFragment {
    /// `completed().len()`
    pub completed: usize,
    /// `remaining().len()`
    pub remaining: usize,
}

impl StatsFragment {
    /// `"item"` or `"items"`, agreeing with `remaining`.
    #[must_use]
    pub const fn items_word(&self) -> &'static str {
        if self.remaining == 1 { "item" } else { "items" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_codes() {
        assert_eq!(Key::from_code(13), Key::Enter);
        assert_eq!(Key::from_code(27), Key::Escape);
        assert_eq!(Key::from_code(65), Key::Other);
    }

    #[test]
    fn stats_word_agrees_with_remaining() {
        let one = StatsFragment {
            completed: 3,
            remaining: 1,
        };
        let none = StatsFragment::default();

        assert_eq!(one.items_word(), "item");
        assert_eq!(none.items_word(), "items");
    }
}
