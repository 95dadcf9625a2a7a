//! Server-side todo storage.
//!
//! [`TodoRepository`] is the storage seam of the REST server. Handlers only talk to
//! the trait; [`InMemoryTodoRepository`] is the implementation the server ships with.
//!
//! # Dyn Compatibility
//!
//! Methods return boxed `Send` futures so the router state can hold an
//! `Arc<dyn TodoRepository>` shared across worker threads.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use todo_sync_core::{TodoAttributes, TodoId, TodoPatch, TodoRecord};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Errors from repository operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// No todo is stored under the identifier
    #[error("Todo not found: {0}")]
    NotFound(TodoId),
    /// The storage backend failed
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Boxed future returned by [`TodoRepository`] methods.
pub type RepositoryFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Storage for the todo list served over HTTP.
pub trait TodoRepository: Send + Sync {
    /// All todos, ascending by order.
    fn list(&self) -> RepositoryFuture<'_, Vec<TodoRecord>>;

    /// One todo.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::NotFound`] if `id` is unknown.
    fn get(&self, id: TodoId) -> RepositoryFuture<'_, TodoRecord>;

    /// Store a new todo under a fresh identifier.
    fn create(&self, attributes: TodoAttributes) -> RepositoryFuture<'_, TodoRecord>;

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::NotFound`] if `id` is unknown.
    fn update(&self, id: TodoId, patch: TodoPatch) -> RepositoryFuture<'_, TodoRecord>;

    /// Replace every attribute.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::NotFound`] if `id` is unknown.
    fn replace(&self, id: TodoId, attributes: TodoAttributes)
    -> RepositoryFuture<'_, TodoRecord>;

    /// Remove a todo.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::NotFound`] if `id` is unknown.
    fn delete(&self, id: TodoId) -> RepositoryFuture<'_, ()>;

    /// Remove every todo.
    fn clear(&self) -> RepositoryFuture<'_, ()>;

    /// Number of stored todos.
    fn count(&self) -> RepositoryFuture<'_, usize>;
}

/// In-memory repository. Contents are lost on restart.
///
/// # Example
///
/// ```
/// use todo_sync_web::repository::{InMemoryTodoRepository, TodoRepository};
/// use todo_sync_core::TodoAttributes;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let repository = InMemoryTodoRepository::new();
/// let created = repository
///     .create(TodoAttributes { title: "Buy milk".into(), completed: false, order: 1 })
///     .await?;
///
/// assert_eq!(repository.get(created.id.clone()).await?, created);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryTodoRepository {
    todos: Arc<RwLock<HashMap<TodoId, TodoAttributes>>>,
}

impl InMemoryTodoRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TodoRepository for InMemoryTodoRepository {
    fn list(&self) -> RepositoryFuture<'_, Vec<TodoRecord>> {
        Box::pin(async move {
            let todos = self.todos.read().await;
            let mut records: Vec<TodoRecord> = todos
                .iter()
                .map(|(id, attributes)| TodoRecord::new(id.clone(), attributes.clone()))
                .collect();
            records.sort_by(|a, b| {
                a.attributes
                    .order
                    .cmp(&b.attributes.order)
                    .then_with(|| a.id.cmp(&b.id))
            });
            Ok(records)
        })
    }

    fn get(&self, id: TodoId) -> RepositoryFuture<'_, TodoRecord> {
        Box::pin(async move {
            let todos = self.todos.read().await;
            let attributes = todos
                .get(&id)
                .cloned()
                .ok_or_else(|| RepositoryError::NotFound(id.clone()))?;
            Ok(TodoRecord::new(id, attributes))
        })
    }

    fn create(&self, attributes: TodoAttributes) -> RepositoryFuture<'_, TodoRecord> {
        Box::pin(async move {
            let id = TodoId::new(Uuid::new_v4().to_string());
            self.todos
                .write()
                .await
                .insert(id.clone(), attributes.clone());
            tracing::debug!(%id, "todo stored");
            Ok(TodoRecord::new(id, attributes))
        })
    }

    fn update(&self, id: TodoId, patch: TodoPatch) -> RepositoryFuture<'_, TodoRecord> {
        Box::pin(async move {
            let mut todos = self.todos.write().await;
            let attributes = todos
                .get_mut(&id)
                .ok_or_else(|| RepositoryError::NotFound(id.clone()))?;
            attributes.apply(&patch);
            let attributes = attributes.clone();
            Ok(TodoRecord::new(id, attributes))
        })
    }

    fn replace(
        &self,
        id: TodoId,
        attributes: TodoAttributes,
    ) -> RepositoryFuture<'_, TodoRecord> {
        Box::pin(async move {
            let mut todos = self.todos.write().await;
            let stored = todos
                .get_mut(&id)
                .ok_or_else(|| RepositoryError::NotFound(id.clone()))?;
            stored.clone_from(&attributes);
            Ok(TodoRecord::new(id, attributes))
        })
    }

    fn delete(&self, id: TodoId) -> RepositoryFuture<'_, ()> {
        Box::pin(async move {
            self.todos
                .write()
                .await
                .remove(&id)
                .map(|_| ())
                .ok_or(RepositoryError::NotFound(id))
        })
    }

    fn clear(&self) -> RepositoryFuture<'_, ()> {
        Box::pin(async move {
            self.todos.write().await.clear();
            Ok(())
        })
    }

    fn count(&self) -> RepositoryFuture<'_, usize> {
        Box::pin(async move { Ok(self.todos.read().await.len()) })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn attributes(title: &str, order: i64) -> TodoAttributes {
        TodoAttributes {
            title: title.to_string(),
            completed: false,
            order,
        }
    }

    #[tokio::test]
    async fn test_list_is_sorted_by_order() {
        let repository = InMemoryTodoRepository::new();
        repository.create(attributes("third", 3)).await.unwrap();
        repository.create(attributes("first", 1)).await.unwrap();
        repository.create(attributes("second", 2)).await.unwrap();

        let titles: Vec<String> = repository
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|record| record.attributes.title)
            .collect();

        assert_eq!(titles, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_update_applies_only_present_fields() {
        let repository = InMemoryTodoRepository::new();
        let created = repository.create(attributes("milk", 1)).await.unwrap();

        let updated = repository
            .update(created.id.clone(), TodoPatch::completed(true))
            .await
            .unwrap();

        assert!(updated.attributes.completed);
        assert_eq!(updated.attributes.title, "milk");
        assert_eq!(updated.attributes.order, 1);
    }

    #[tokio::test]
    async fn test_replace_overwrites_everything() {
        let repository = InMemoryTodoRepository::new();
        let created = repository.create(attributes("milk", 1)).await.unwrap();

        repository
            .replace(created.id.clone(), attributes("bread", 9))
            .await
            .unwrap();

        let stored = repository.get(created.id).await.unwrap();
        assert_eq!(stored.attributes, attributes("bread", 9));
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let repository = InMemoryTodoRepository::new();
        let missing = TodoId::new("missing");

        assert_eq!(
            repository.get(missing.clone()).await,
            Err(RepositoryError::NotFound(missing.clone()))
        );
        assert!(repository.delete(missing.clone()).await.is_err());
        assert!(
            repository
                .update(missing, TodoPatch::title("x"))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_clear_and_count() {
        let repository = InMemoryTodoRepository::new();
        repository.create(attributes("a", 1)).await.unwrap();
        repository.create(attributes("b", 2)).await.unwrap();
        assert_eq!(repository.count().await.unwrap(), 2);

        repository.clear().await.unwrap();

        assert_eq!(repository.count().await.unwrap(), 0);
    }
}
