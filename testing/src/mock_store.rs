//! Scripted in-memory remote store.
//!
//! [`MockRemoteStore`] behaves like the REST server (records keyed by identifier,
//! `NotFound` for unknown addresses) and adds the knobs tests need:
//!
//! - every call is recorded the moment it is issued ([`MockRemoteStore::calls`])
//! - [`MockRemoteStore::fail_next`] queues a failure for the next call of a kind
//! - [`MockRemoteStore::hold`] parks calls of a kind until [`MockRemoteStore::release`],
//!   which is how tests observe an operation while its remote call is in flight
//! - [`MockRemoteStore::assign_next_id`] forces the identifier of the next create
//!
//! Scripted failures are consumed when the call completes, so a failure can be
//! queued for a call that is already held.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use todo_sync_core::{
    PersistenceError, RemoteFuture, RemoteStore, TodoAttributes, TodoId, TodoPatch, TodoRecord,
};
use tokio::sync::Semaphore;

/// Kind of remote call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    /// `GET base`
    Fetch,
    /// `POST base`
    Create,
    /// `PATCH base/id`
    Update,
    /// `DELETE base/id`
    Delete,
}

/// A call as the store received it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    /// A fetch of `url`.
    Fetch {
        /// Requested address.
        url: String,
    },
    /// A create under `url`.
    Create {
        /// Requested address.
        url: String,
        /// Submitted attributes.
        attributes: TodoAttributes,
    },
    /// A partial update of `url`.
    Update {
        /// Requested address.
        url: String,
        /// Submitted fields.
        patch: TodoPatch,
    },
    /// A delete of `url`.
    Delete {
        /// Requested address.
        url: String,
    },
}

impl Call {
    /// Kind of call.
    #[must_use]
    pub const fn op(&self) -> Op {
        match self {
            Self::Fetch { .. } => Op::Fetch,
            Self::Create { .. } => Op::Create,
            Self::Update { .. } => Op::Update,
            Self::Delete { .. } => Op::Delete,
        }
    }

    /// Requested address.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Fetch { url }
            | Self::Create { url, .. }
            | Self::Update { url, .. }
            | Self::Delete { url } => url,
        }
    }
}

#[derive(Default)]
struct MockState {
    records: Vec<TodoRecord>,
    calls: Vec<Call>,
    failures: HashMap<Op, VecDeque<PersistenceError>>,
    forced_ids: VecDeque<TodoId>,
    gates: HashMap<Op, Rc<Semaphore>>,
    next_id: u64,
}

/// In-memory [`RemoteStore`] for tests.
///
/// # Example
///
/// ```
/// use todo_sync_testing::{MockRemoteStore, Op};
/// use todo_sync_core::{PersistenceError, RemoteStore, TodoAttributes};
///
/// # async fn example() {
/// let store = MockRemoteStore::new();
/// store.fail_next(Op::Create, PersistenceError::Transport("offline".into()));
///
/// let failed = store.create("/api/todo", TodoAttributes::default()).await;
/// assert!(failed.is_err());
/// assert_eq!(store.count(Op::Create), 1);
/// assert!(store.records().is_empty());
/// # }
/// ```
#[derive(Default)]
pub struct MockRemoteStore {
    state: RefCell<MockState>,
}

impl MockRemoteStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `records`, returned by fetches in this order.
    #[must_use]
    pub fn with_records(records: Vec<TodoRecord>) -> Self {
        let store = Self::new();
        store.state.borrow_mut().records = records;
        store
    }

    /// Add a record directly, without recording a call.
    pub fn seed(&self, record: TodoRecord) {
        self.state.borrow_mut().records.push(record);
    }

    /// Current stored records.
    #[must_use]
    pub fn records(&self) -> Vec<TodoRecord> {
        self.state.borrow().records.clone()
    }

    /// The stored record with identifier `id`.
    #[must_use]
    pub fn record(&self, id: &TodoId) -> Option<TodoRecord> {
        self.state
            .borrow()
            .records
            .iter()
            .find(|record| &record.id == id)
            .cloned()
    }

    /// Every call issued so far, in issue order.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    /// Number of calls of one kind issued so far.
    #[must_use]
    pub fn count(&self, op: Op) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|call| call.op() == op)
            .count()
    }

    /// Forget recorded calls (records are kept).
    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Make the next call of kind `op` fail with `error`.
    ///
    /// Queued failures are consumed in order, one per call.
    pub fn fail_next(&self, op: Op, error: PersistenceError) {
        self.state
            .borrow_mut()
            .failures
            .entry(op)
            .or_default()
            .push_back(error);
    }

    /// Use `id` for the next successful create.
    pub fn assign_next_id(&self, id: impl Into<TodoId>) {
        self.state.borrow_mut().forced_ids.push_back(id.into());
    }

    /// Park calls of kind `op` until [`MockRemoteStore::release`].
    pub fn hold(&self, op: Op) {
        self.state
            .borrow_mut()
            .gates
            .entry(op)
            .or_insert_with(|| Rc::new(Semaphore::new(0)));
    }

    /// Let parked and future calls of kind `op` complete.
    pub fn release(&self, op: Op) {
        if let Some(gate) = self.state.borrow_mut().gates.remove(&op) {
            gate.close();
        }
    }

    /// Record the call and return the gate it must pass, if any.
    fn issue(&self, call: Call) -> Option<Rc<Semaphore>> {
        let mut state = self.state.borrow_mut();
        let gate = state.gates.get(&call.op()).cloned();
        state.calls.push(call);
        gate
    }

    fn scripted_failure(&self, op: Op) -> Option<PersistenceError> {
        self.state
            .borrow_mut()
            .failures
            .get_mut(&op)
            .and_then(VecDeque::pop_front)
    }

    fn position(state: &MockState, url: &str) -> Option<usize> {
        let id = TodoId::new(url.rsplit('/').next().unwrap_or(url));
        state.records.iter().position(|record| record.id == id)
    }
}

async fn pass(gate: Option<Rc<Semaphore>>) {
    if let Some(gate) = gate {
        // A closed gate has been released.
        let _ = gate.acquire().await;
    }
}

impl RemoteStore for MockRemoteStore {
    fn fetch(&self, url: &str) -> RemoteFuture<'_, Vec<TodoRecord>> {
        let gate = self.issue(Call::Fetch {
            url: url.to_string(),
        });
        Box::pin(async move {
            pass(gate).await;
            if let Some(error) = self.scripted_failure(Op::Fetch) {
                return Err(error);
            }
            Ok(self.records())
        })
    }

    fn create(&self, url: &str, attributes: TodoAttributes) -> RemoteFuture<'_, TodoRecord> {
        let gate = self.issue(Call::Create {
            url: url.to_string(),
            attributes: attributes.clone(),
        });
        Box::pin(async move {
            pass(gate).await;
            if let Some(error) = self.scripted_failure(Op::Create) {
                return Err(error);
            }

            let mut state = self.state.borrow_mut();
            let id = match state.forced_ids.pop_front() {
                Some(id) => id,
                None => {
                    state.next_id += 1;
                    TodoId::new(format!("todo-{}", state.next_id))
                }
            };
            let record = TodoRecord::new(id, attributes);
            state.records.push(record.clone());
            Ok(record)
        })
    }

    fn update(&self, url: &str, patch: TodoPatch) -> RemoteFuture<'_, ()> {
        let url = url.to_string();
        let gate = self.issue(Call::Update {
            url: url.clone(),
            patch: patch.clone(),
        });
        Box::pin(async move {
            pass(gate).await;
            if let Some(error) = self.scripted_failure(Op::Update) {
                return Err(error);
            }

            let mut state = self.state.borrow_mut();
            let position =
                Self::position(&state, &url).ok_or_else(|| PersistenceError::NotFound(url))?;
            state.records[position].attributes.apply(&patch);
            Ok(())
        })
    }

    fn delete(&self, url: &str) -> RemoteFuture<'_, ()> {
        let url = url.to_string();
        let gate = self.issue(Call::Delete { url: url.clone() });
        Box::pin(async move {
            pass(gate).await;
            if let Some(error) = self.scripted_failure(Op::Delete) {
                return Err(error);
            }

            let mut state = self.state.borrow_mut();
            let position =
                Self::position(&state, &url).ok_or_else(|| PersistenceError::NotFound(url))?;
            state.records.remove(position);
            Ok(())
        })
    }
}

impl std::fmt::Debug for MockRemoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("MockRemoteStore")
            .field("records", &state.records.len())
            .field("calls", &state.calls.len())
            .finish_non_exhaustive()
    }
}
