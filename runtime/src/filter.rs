//! The Filter Controller and the shared filter state it writes.
//!
//! [`FilterController`] is the only writer of the current [`Filter`]. Views hold a
//! [`FilterState`], a read-only handle to the same value plus the broadcast channel,
//! and re-derive their own visibility when [`FilterChanged`] fires.

use std::cell::Cell;
use std::rc::Rc;
use todo_sync_core::filter::route_token;
use todo_sync_core::{Channel, Filter, FilterChanged, Subscription};

/// Read-only view of the current filter.
#[derive(Clone, Debug, Default)]
pub struct FilterState {
    current: Rc<Cell<Filter>>,
    changed: Channel<FilterChanged>,
}

impl FilterState {
    /// The active filter.
    #[must_use]
    pub fn get(&self) -> Filter {
        self.current.get()
    }

    /// Whether an item with the given completion state is visible right now.
    #[must_use]
    pub fn is_visible(&self, completed: bool) -> bool {
        self.current.get().admits(completed)
    }

    /// Listen for filter transitions.
    #[must_use = "dropping the subscription detaches the listener immediately"]
    pub fn subscribe(&self, listener: impl Fn(&FilterChanged) + 'static) -> Subscription {
        self.changed.subscribe(listener)
    }
}

/// Route-driven filter state machine. Starts at [`Filter::All`].
#[derive(Debug, Default)]
pub struct FilterController {
    state: FilterState,
}

impl FilterController {
    /// Create a controller in the `all` state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A reader handle to hand to views.
    #[must_use]
    pub fn state(&self) -> FilterState {
        self.state.clone()
    }

    /// The active filter.
    #[must_use]
    pub fn current(&self) -> Filter {
        self.state.get()
    }

    /// Apply a route token and broadcast the transition.
    ///
    /// Unknown and empty tokens resolve to [`Filter::All`]. The broadcast fires on
    /// every call, including when the filter does not change.
    pub fn route(&self, token: &str) -> Filter {
        let filter = Filter::from_route(token);
        self.state.current.set(filter);
        tracing::debug!(token, %filter, "filter routed");
        self.state.changed.emit(&FilterChanged);
        filter
    }

    /// Apply a raw location fragment such as `#/active`.
    pub fn navigate(&self, fragment: &str) -> Filter {
        self.route(route_token(fragment))
    }
}
