//! View model for a single item row.

use super::{ItemFragment, Key};
use crate::error::SyncError;
use crate::filter::FilterState;
use crate::item::{EditOutcome, Item};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use todo_sync_core::{Field, ItemEvent, ItemKey, Scope};

/// Rendered state of one row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Row {
    /// What the item template was last rendered with.
    pub fragment: ItemFragment,
    /// Hidden by the current filter.
    pub hidden: bool,
    /// Edit mode is open.
    pub editing: bool,
    /// Contents of the edit input.
    pub draft: String,
    /// The row has been torn down and detached from every channel.
    pub removed: bool,
    /// Number of renders so far.
    pub renders: usize,
}

struct ItemViewInner {
    item: Item,
    filter: FilterState,
    row: RefCell<Row>,
    scope: RefCell<Scope>,
}

/// Renders one [`Item`] and handles its row interactions.
///
/// The view listens to its item and to the filter through subscriptions held in a
/// [`Scope`]; [`ItemView::teardown`] (run automatically when the item is destroyed)
/// disposes all of them.
#[derive(Clone)]
pub struct ItemView {
    inner: Rc<ItemViewInner>,
}

impl ItemView {
    /// Render `item` and start listening for its changes and for filter transitions.
    #[must_use]
    pub fn mount(item: Item, filter: FilterState) -> Self {
        let view = Self {
            inner: Rc::new(ItemViewInner {
                item,
                filter,
                row: RefCell::new(Row::default()),
                scope: RefCell::new(Scope::new()),
            }),
        };
        view.render();
        view.apply_visibility();

        let weak = Rc::downgrade(&view.inner);
        let on_item = view.inner.item.subscribe(move |event| {
            let Some(view) = Self::upgrade(&weak) else {
                return;
            };
            match event {
                ItemEvent::Changed(fields) => {
                    view.render();
                    if fields.contains(&Field::Completed) {
                        view.apply_visibility();
                    }
                }
                ItemEvent::Destroyed => view.teardown(),
                ItemEvent::Synced | ItemEvent::Failed(_) => {}
            }
        });

        let weak = Rc::downgrade(&view.inner);
        let on_filter = view.inner.filter.subscribe(move |_| {
            if let Some(view) = Self::upgrade(&weak) {
                view.apply_visibility();
            }
        });

        {
            let mut scope = view.inner.scope.borrow_mut();
            scope.add(on_item);
            scope.add(on_filter);
        }
        view
    }

    fn upgrade(weak: &Weak<ItemViewInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    /// The rendered item.
    #[must_use]
    pub fn item(&self) -> &Item {
        &self.inner.item
    }

    /// Key of the rendered item.
    #[must_use]
    pub fn key(&self) -> ItemKey {
        self.inner.item.key()
    }

    /// Snapshot of the row state.
    #[must_use]
    pub fn row(&self) -> Row {
        self.inner.row.borrow().clone()
    }

    /// Hidden by the current filter.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.inner.row.borrow().hidden
    }

    /// Edit mode is open.
    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.inner.row.borrow().editing
    }

    /// The row has been torn down.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.inner.row.borrow().removed
    }

    /// Number of live subscriptions held by this row.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.inner.scope.borrow().len()
    }

    /// Open edit mode with the input pre-filled with the current title.
    pub fn edit(&self) {
        let title = self.inner.item.title();
        let mut row = self.inner.row.borrow_mut();
        if row.removed {
            return;
        }
        row.editing = true;
        row.draft = title;
    }

    /// Replace the edit input's contents.
    pub fn set_draft(&self, text: impl Into<String>) {
        self.inner.row.borrow_mut().draft = text.into();
    }

    /// React to a key press inside the edit input.
    ///
    /// Enter commits the edit, Escape cancels it, anything else is ignored.
    ///
    /// # Errors
    ///
    /// See [`Item::apply_edit`].
    pub async fn handle_key(&self, key: Key) -> Result<(), SyncError> {
        match key {
            Key::Enter => self.commit_edit().await.map(|_| ()),
            Key::Escape => {
                self.cancel_edit();
                Ok(())
            }
            Key::Other => Ok(()),
        }
    }

    /// The edit input lost focus: commit the edit.
    ///
    /// # Errors
    ///
    /// See [`Item::apply_edit`].
    pub async fn blur(&self) -> Result<Option<EditOutcome>, SyncError> {
        self.commit_edit().await
    }

    /// Close edit mode and apply the draft.
    ///
    /// Returns `Ok(None)` when edit mode was not open. A blank draft destroys the item.
    ///
    /// # Errors
    ///
    /// See [`Item::apply_edit`]. Edit mode is closed either way.
    pub async fn commit_edit(&self) -> Result<Option<EditOutcome>, SyncError> {
        let draft = {
            let mut row = self.inner.row.borrow_mut();
            if !row.editing {
                return Ok(None);
            }
            row.editing = false;
            std::mem::take(&mut row.draft)
        };

        let result = self.inner.item.apply_edit(&draft).await;
        self.render();
        result.map(Some)
    }

    /// Leave edit mode without persisting anything.
    pub fn cancel_edit(&self) {
        let mut row = self.inner.row.borrow_mut();
        row.editing = false;
        row.draft.clear();
    }

    /// The completion checkbox was clicked.
    ///
    /// # Errors
    ///
    /// See [`Item::toggle_completion`].
    pub async fn toggle(&self) -> Result<(), SyncError> {
        self.inner.item.toggle_completion().await
    }

    /// The destroy button was clicked.
    ///
    /// # Errors
    ///
    /// See [`Item::destroy`].
    pub async fn destroy(&self) -> Result<(), SyncError> {
        self.inner.item.destroy().await
    }

    /// Remove the row and dispose every subscription. Idempotent.
    pub fn teardown(&self) {
        {
            let mut row = self.inner.row.borrow_mut();
            if row.removed {
                return;
            }
            row.removed = true;
            row.editing = false;
        }
        self.inner.scope.borrow_mut().clear();
        tracing::trace!(item = %self.key(), "item view torn down");
    }

    fn render(&self) {
        let item = &self.inner.item;
        let fragment = ItemFragment {
            id: item.id(),
            title: item.title(),
            completed: item.completed(),
        };

        let mut row = self.inner.row.borrow_mut();
        if row.removed {
            return;
        }
        row.fragment = fragment;
        row.renders += 1;
    }

    fn apply_visibility(&self) {
        let hidden = !self.inner.filter.is_visible(self.inner.item.completed());
        let mut row = self.inner.row.borrow_mut();
        if !row.removed {
            row.hidden = hidden;
        }
    }
}

impl fmt::Debug for ItemView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemView")
            .field("item", &self.inner.item)
            .field("row", &*self.inner.row.borrow())
            .finish()
    }
}
