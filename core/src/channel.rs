//! Synchronous notification channels.
//!
//! A [`Channel`] is a single-threaded listener registry. Emitting a notification calls
//! every registered listener before `emit` returns, which is what lets callers assume
//! that all dependent views have re-rendered once a mutation returns.
//!
//! # Disposal
//!
//! [`Channel::subscribe`] returns a [`Subscription`]. Disposing it (explicitly with
//! [`Subscription::dispose`] or by dropping it) detaches the listener. Views keep their
//! subscriptions in a [`Scope`] and clear it when they are torn down, so nothing stays
//! registered against a view that no longer exists.
//!
//! # Re-entrancy
//!
//! `emit` works on a snapshot of the listener list and holds no borrow while a listener
//! runs. Listeners may therefore subscribe, dispose (including themselves) or emit on
//! the same channel. A listener disposed during an emission is not called for the rest
//! of it; a listener added during an emission first hears the next one.
//!
//! # Example
//!
//! ```
//! use todo_sync_core::channel::Channel;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let channel: Channel<u32> = Channel::new();
//! let seen = Rc::new(Cell::new(0));
//!
//! let sink = Rc::clone(&seen);
//! let subscription = channel.subscribe(move |value| sink.set(sink.get() + value));
//!
//! channel.emit(&2);
//! subscription.dispose();
//! channel.emit(&5);
//!
//! assert_eq!(seen.get(), 2);
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<E> = Rc<dyn Fn(&E)>;

struct Listener<E> {
    id: u64,
    active: Rc<Cell<bool>>,
    callback: Callback<E>,
}

impl<E> Clone for Listener<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            active: Rc::clone(&self.active),
            callback: Rc::clone(&self.callback),
        }
    }
}

struct Registry<E> {
    next_id: u64,
    listeners: Vec<Listener<E>>,
}

/// A synchronous, single-threaded notification channel.
///
/// Cloning a channel yields another handle to the same registry.
pub struct Channel<E> {
    registry: Rc<RefCell<Registry<E>>>,
}

impl<E: 'static> Channel<E> {
    /// Create a channel with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Register a listener.
    ///
    /// The listener stays registered until the returned [`Subscription`] is disposed
    /// or dropped.
    #[must_use = "dropping the subscription detaches the listener immediately"]
    pub fn subscribe(&self, listener: impl Fn(&E) + 'static) -> Subscription {
        let active = Rc::new(Cell::new(true));
        let id = {
            let mut registry = self.registry.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.listeners.push(Listener {
                id,
                active: Rc::clone(&active),
                callback: Rc::new(listener),
            });
            id
        };

        let registry: Weak<RefCell<Registry<E>>> = Rc::downgrade(&self.registry);
        Subscription::new(move || {
            active.set(false);
            if let Some(registry) = registry.upgrade() {
                registry
                    .borrow_mut()
                    .listeners
                    .retain(|listener| listener.id != id);
            }
        })
    }

    /// Deliver `event` to every registered listener, in registration order.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Listener<E>> = self.registry.borrow().listeners.clone();
        for listener in snapshot {
            if listener.active.get() {
                (listener.callback)(event);
            }
        }
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }
}

impl<E: 'static> Default for Channel<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for Channel<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Rc::clone(&self.registry),
        }
    }
}

impl<E> fmt::Debug for Channel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("listeners", &self.registry.borrow().listeners.len())
            .finish()
    }
}

/// Disposal handle for a registered listener.
///
/// When dropped, the listener is detached.
pub struct Subscription {
    dispose: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(dispose: impl FnOnce() + 'static) -> Self {
        Self {
            dispose: Some(Box::new(dispose)),
        }
    }

    /// Detach the listener now.
    pub fn dispose(mut self) {
        self.run_dispose();
    }

    fn run_dispose(&mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_dispose();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.dispose.is_some())
            .finish()
    }
}

/// A bag of subscriptions owned by one view.
///
/// Clearing or dropping the scope disposes every subscription it holds.
#[derive(Debug, Default)]
pub struct Scope {
    subscriptions: Vec<Subscription>,
}

impl Scope {
    /// Create an empty scope.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
        }
    }

    /// Keep `subscription` alive until the scope is cleared.
    pub fn add(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// True when the scope holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Dispose every subscription.
    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }
}
