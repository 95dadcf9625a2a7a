//! View model for the whole list.

use super::{ItemView, Key, StatsFragment};
use crate::collection::Collection;
use crate::error::SyncError;
use crate::filter::FilterState;
use crate::item::Item;
use futures::future::join_all;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use todo_sync_core::{CollectionEvent, Filter, ItemKey, Scope, TodoDraft, TodoPatch};

/// Everything outside the item rows: panels, stats, toggle-all and filter links.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Chrome {
    /// The main panel (list and toggle-all) is shown.
    pub main_visible: bool,
    /// The footer (stats and filter links) is shown.
    pub footer_visible: bool,
    /// Counts for the stats template.
    pub stats: StatsFragment,
    /// The toggle-all checkbox is checked.
    pub all_checked: bool,
    /// The highlighted filter link.
    pub selected: Filter,
    /// Number of chrome renders so far.
    pub renders: usize,
    /// Number of full list rebuilds so far.
    pub rebuilds: usize,
}

struct AppViewInner {
    collection: Collection,
    filter: FilterState,
    views: RefCell<IndexMap<ItemKey, ItemView>>,
    chrome: RefCell<Chrome>,
    input: RefCell<String>,
    scope: RefCell<Scope>,
}

/// Orchestrates the list.
///
/// Item views are kept in an [`IndexMap`] keyed by [`ItemKey`], in collection order.
/// The aggregate view never persists anything itself; every mutation goes through
/// the collection or an item.
#[derive(Clone)]
pub struct AppView {
    inner: Rc<AppViewInner>,
}

impl AppView {
    /// Build the view over the current contents and start listening.
    #[must_use]
    pub fn new(collection: Collection, filter: FilterState) -> Self {
        let view = Self {
            inner: Rc::new(AppViewInner {
                collection,
                filter,
                views: RefCell::new(IndexMap::new()),
                chrome: RefCell::new(Chrome::default()),
                input: RefCell::new(String::new()),
                scope: RefCell::new(Scope::new()),
            }),
        };

        let weak = Rc::downgrade(&view.inner);
        let on_collection = view.inner.collection.subscribe(move |event| {
            if let Some(view) = Self::upgrade(&weak) {
                view.on_collection_event(event);
            }
        });

        let weak = Rc::downgrade(&view.inner);
        let on_filter = view.inner.filter.subscribe(move |_| {
            if let Some(view) = Self::upgrade(&weak) {
                view.render();
            }
        });

        {
            let mut scope = view.inner.scope.borrow_mut();
            scope.add(on_collection);
            scope.add(on_filter);
        }

        view.add_all();
        view.render();
        view
    }

    fn upgrade(weak: &Weak<AppViewInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    fn on_collection_event(&self, event: &CollectionEvent) {
        match event {
            CollectionEvent::Reset => self.add_all(),
            CollectionEvent::Add(key) => {
                if let Some(item) = self.inner.collection.get(*key) {
                    self.add_one(item);
                }
            }
            CollectionEvent::Remove(key) => {
                let removed = self.inner.views.borrow_mut().shift_remove(key);
                if let Some(view) = removed {
                    view.teardown();
                }
            }
            CollectionEvent::Change { .. }
            | CollectionEvent::Sync(_)
            | CollectionEvent::Failed { .. } => {}
        }
        self.render();
    }

    fn add_one(&self, item: Item) {
        let key = item.key();
        let view = ItemView::mount(item, self.inner.filter.clone());
        self.inner.views.borrow_mut().insert(key, view);
    }

    fn add_all(&self) {
        let stale: Vec<ItemView> = self
            .inner
            .views
            .borrow_mut()
            .drain(..)
            .map(|(_, view)| view)
            .collect();
        for view in &stale {
            view.teardown();
        }

        let fresh: IndexMap<ItemKey, ItemView> = self
            .inner
            .collection
            .items()
            .into_iter()
            .map(|item| (item.key(), ItemView::mount(item, self.inner.filter.clone())))
            .collect();

        let count = fresh.len();
        *self.inner.views.borrow_mut() = fresh;
        self.inner.chrome.borrow_mut().rebuilds += 1;
        tracing::debug!(count, torn_down = stale.len(), "item list rebuilt");
    }

    fn render(&self) {
        let collection = &self.inner.collection;
        let stats = StatsFragment {
            completed: collection.completed().len(),
            remaining: collection.remaining().len(),
        };
        let populated = !collection.is_empty();
        let selected = self.inner.filter.get();

        let mut chrome = self.inner.chrome.borrow_mut();
        chrome.main_visible = populated;
        chrome.footer_visible = populated;
        chrome.all_checked = stats.remaining == 0;
        chrome.stats = stats;
        chrome.selected = selected;
        chrome.renders += 1;
    }

    /// The collection being displayed.
    #[must_use]
    pub fn collection(&self) -> &Collection {
        &self.inner.collection
    }

    /// Snapshot of the chrome state.
    #[must_use]
    pub fn chrome(&self) -> Chrome {
        self.inner.chrome.borrow().clone()
    }

    /// The row for `key`, if one is rendered.
    #[must_use]
    pub fn item_view(&self, key: ItemKey) -> Option<ItemView> {
        self.inner.views.borrow().get(&key).cloned()
    }

    /// Every rendered row, in display order.
    #[must_use]
    pub fn item_views(&self) -> Vec<ItemView> {
        self.inner.views.borrow().values().cloned().collect()
    }

    /// Rows not hidden by the current filter, in display order.
    #[must_use]
    pub fn visible_item_views(&self) -> Vec<ItemView> {
        self.inner
            .views
            .borrow()
            .values()
            .filter(|view| !view.is_hidden())
            .cloned()
            .collect()
    }

    /// Contents of the new-item input.
    #[must_use]
    pub fn input(&self) -> String {
        self.inner.input.borrow().clone()
    }

    /// Replace the contents of the new-item input.
    pub fn set_input(&self, text: impl Into<String>) {
        *self.inner.input.borrow_mut() = text.into();
    }

    /// Create an item from the new-item input when `key` is Enter.
    ///
    /// The input is cleared before the create call is awaited. Blank input and
    /// other keys do nothing.
    ///
    /// # Errors
    ///
    /// See [`Collection::create`]. On failure the submitted text is put back into the
    /// input unless something new was typed meanwhile.
    pub async fn create_on_enter(&self, key: Key) -> Result<Option<Item>, SyncError> {
        if key != Key::Enter {
            return Ok(None);
        }
        let text = self.inner.input.borrow().trim().to_string();
        if text.is_empty() {
            return Ok(None);
        }
        self.inner.input.borrow_mut().clear();

        match self.inner.collection.create(TodoDraft::new(text.clone())).await {
            Ok(item) => Ok(item),
            Err(error) => {
                let mut input = self.inner.input.borrow_mut();
                if input.is_empty() {
                    *input = text;
                }
                Err(error)
            }
        }
    }

    /// Destroy every completed item.
    ///
    /// All deletes are issued; deletes that succeed stand even if others fail.
    /// Returns the number of items removed.
    ///
    /// # Errors
    ///
    /// Returns the first failure.
    pub async fn clear_completed(&self) -> Result<usize, SyncError> {
        let targets = self.inner.collection.completed();
        let results = join_all(targets.iter().map(Item::destroy)).await;
        tally(results)
    }

    /// Set `completed` on every item, one update per item.
    ///
    /// Returns the number of items updated.
    ///
    /// # Errors
    ///
    /// Returns the first failure; items whose update failed are rolled back.
    pub async fn toggle_all_complete(&self, completed: bool) -> Result<usize, SyncError> {
        let targets = self.inner.collection.items();
        let results = join_all(
            targets
                .iter()
                .map(|item| item.save(TodoPatch::completed(completed))),
        )
        .await;
        tally(results)
    }

    /// Tear down every row and stop listening.
    pub fn dispose(&self) {
        self.inner.scope.borrow_mut().clear();
        let views: Vec<ItemView> = self
            .inner
            .views
            .borrow_mut()
            .drain(..)
            .map(|(_, view)| view)
            .collect();
        for view in views {
            view.teardown();
        }
    }
}

fn tally(results: Vec<Result<(), SyncError>>) -> Result<usize, SyncError> {
    let mut succeeded = 0;
    let mut first_error = None;
    for result in results {
        match result {
            Ok(()) => succeeded += 1,
            Err(error) => {
                first_error.get_or_insert(error);
            }
        }
    }
    first_error.map_or(Ok(succeeded), Err)
}

impl fmt::Debug for AppView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppView")
            .field("rows", &self.inner.views.borrow().len())
            .field("chrome", &*self.inner.chrome.borrow())
            .field("input", &*self.inner.input.borrow())
            .finish()
    }
}
