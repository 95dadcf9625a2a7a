//! Application bootstrap: wires the collection, the router and the aggregate view.

use crate::collection::Collection;
use crate::error::SyncError;
use crate::filter::FilterController;
use crate::view::AppView;
use std::rc::Rc;
use todo_sync_core::{Filter, RemoteStore};

/// Base address the server exposes the collection under.
pub const DEFAULT_API_BASE: &str = "/api/todo";

/// A running todo application.
#[derive(Debug)]
pub struct TodoApp {
    collection: Collection,
    router: FilterController,
    view: AppView,
}

impl TodoApp {
    /// Wire up an application whose collection lives at `base`.
    #[must_use]
    pub fn new(base: impl Into<String>, store: Rc<dyn RemoteStore>) -> Self {
        let collection = Collection::new(base, store);
        let router = FilterController::new();
        let view = AppView::new(collection.clone(), router.state());
        Self {
            collection,
            router,
            view,
        }
    }

    /// Perform the initial load. Returns the number of items loaded.
    ///
    /// # Errors
    ///
    /// See [`Collection::load`].
    pub async fn start(&self) -> Result<usize, SyncError> {
        let count = self.collection.load().await?;
        tracing::info!(count, base = self.collection.base_url(), "todo app started");
        Ok(count)
    }

    /// Feed a location fragment (`#/active`, `#/completed`, ...) to the router.
    pub fn navigate(&self, fragment: &str) -> Filter {
        self.router.navigate(fragment)
    }

    /// The item collection.
    #[must_use]
    pub const fn collection(&self) -> &Collection {
        &self.collection
    }

    /// The filter router.
    #[must_use]
    pub const fn router(&self) -> &FilterController {
        &self.router
    }

    /// The aggregate view.
    #[must_use]
    pub const fn view(&self) -> &AppView {
        &self.view
    }
}
