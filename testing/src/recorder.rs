//! Capture notifications for later assertions.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use todo_sync_core::{Channel, Subscription};

/// Records every notification emitted on a channel while it is alive.
///
/// # Example
///
/// ```
/// use todo_sync_core::Channel;
/// use todo_sync_testing::EventRecorder;
///
/// let channel: Channel<&'static str> = Channel::new();
/// let recorder = EventRecorder::attach(&channel);
///
/// channel.emit(&"add");
/// channel.emit(&"reset");
///
/// assert_eq!(recorder.events(), vec!["add", "reset"]);
/// assert_eq!(recorder.count(|event| *event == "reset"), 1);
/// ```
pub struct EventRecorder<E> {
    events: Rc<RefCell<Vec<E>>>,
    _subscription: Subscription,
}

impl<E: Clone + 'static> EventRecorder<E> {
    /// Start recording `channel`.
    #[must_use]
    pub fn attach(channel: &Channel<E>) -> Self {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let subscription = channel.subscribe(move |event: &E| sink.borrow_mut().push(event.clone()));
        Self {
            events,
            _subscription: subscription,
        }
    }

    /// Everything recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<E> {
        self.events.borrow().clone()
    }

    /// Number of recorded notifications matching `predicate`.
    #[must_use]
    pub fn count(&self, predicate: impl Fn(&E) -> bool) -> usize {
        self.events.borrow().iter().filter(|event| predicate(event)).count()
    }

    /// Number of recorded notifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    /// True when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl<E: fmt::Debug> fmt::Debug for EventRecorder<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRecorder")
            .field("events", &*self.events.borrow())
            .finish_non_exhaustive()
    }
}
