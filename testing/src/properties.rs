//! proptest strategies for titles and user action sequences.

use proptest::prelude::*;

/// A title with at least one visible character.
pub fn title() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9 ]{0,24}"
}

/// A title that trims to nothing.
pub fn blank_title() -> impl Strategy<Value = String> {
    "[ \t]{0,6}"
}

/// A user action against a list, with indices resolved modulo the list length.
#[derive(Clone, Debug)]
pub enum ListAction {
    /// Submit a new item.
    Create(String),
    /// Toggle the completion of the item at an index.
    Toggle(usize),
    /// Destroy the item at an index.
    Destroy(usize),
    /// Replace the title of the item at an index.
    Edit(usize, String),
}

/// A single [`ListAction`]. Creates are weighted up so lists do not stay empty.
pub fn list_action() -> impl Strategy<Value = ListAction> {
    prop_oneof![
        3 => title().prop_map(ListAction::Create),
        2 => any::<usize>().prop_map(ListAction::Toggle),
        1 => any::<usize>().prop_map(ListAction::Destroy),
        1 => (any::<usize>(), prop_oneof![title(), blank_title()])
            .prop_map(|(index, title)| ListAction::Edit(index, title)),
    ]
}

/// A sequence of up to `max` actions.
pub fn list_actions(max: usize) -> impl Strategy<Value = Vec<ListAction>> {
    prop::collection::vec(list_action(), 0..=max)
}
