//! [`RemoteStore`] over the REST todo API.
//!
//! Addresses handed in by the collection (`/api/todo`, `/api/todo/<id>`) are joined
//! onto the configured origin, so the same collection can talk to any server.

use reqwest::{Client, Response, StatusCode};
use todo_sync_core::{
    PersistenceError, RemoteFuture, RemoteStore, TodoAttributes, TodoPatch, TodoRecord,
};

/// HTTP client for the todo REST API.
#[derive(Clone, Debug)]
pub struct HttpRemoteStore {
    client: Client,
    origin: String,
}

impl HttpRemoteStore {
    /// Create a store talking to `origin` (for example `http://localhost:8080`).
    #[must_use]
    pub fn new(origin: impl Into<String>) -> Self {
        Self::with_client(Client::new(), origin)
    }

    /// Create a store with a preconfigured client.
    #[must_use]
    pub fn with_client(client: Client, origin: impl Into<String>) -> Self {
        let origin: String = origin.into();
        Self {
            client,
            origin: origin.trim_end_matches('/').to_string(),
        }
    }

    /// The configured origin.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    fn endpoint(&self, url: &str) -> String {
        if url.starts_with('/') {
            format!("{}{url}", self.origin)
        } else {
            format!("{}/{url}", self.origin)
        }
    }
}

/// Map a non-success status to an error, keeping successful responses.
fn check(url: &str, response: Response) -> Result<Response, PersistenceError> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::NOT_FOUND => Err(PersistenceError::NotFound(url.to_string())),
        status => Err(PersistenceError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        }),
    }
}

fn transport(error: &reqwest::Error) -> PersistenceError {
    PersistenceError::Transport(error.to_string())
}

fn decode(error: &reqwest::Error) -> PersistenceError {
    PersistenceError::Decode(error.to_string())
}

impl RemoteStore for HttpRemoteStore {
    fn fetch(&self, url: &str) -> RemoteFuture<'_, Vec<TodoRecord>> {
        let endpoint = self.endpoint(url);
        Box::pin(async move {
            let response = self
                .client
                .get(&endpoint)
                .send()
                .await
                .map_err(|e| transport(&e))?;
            check(&endpoint, response)?
                .json::<Vec<TodoRecord>>()
                .await
                .map_err(|e| decode(&e))
        })
    }

    fn create(&self, url: &str, attributes: TodoAttributes) -> RemoteFuture<'_, TodoRecord> {
        let endpoint = self.endpoint(url);
        Box::pin(async move {
            let response = self
                .client
                .post(&endpoint)
                .json(&attributes)
                .send()
                .await
                .map_err(|e| transport(&e))?;
            check(&endpoint, response)?
                .json::<TodoRecord>()
                .await
                .map_err(|e| decode(&e))
        })
    }

    fn update(&self, url: &str, patch: TodoPatch) -> RemoteFuture<'_, ()> {
        let endpoint = self.endpoint(url);
        Box::pin(async move {
            let response = self
                .client
                .patch(&endpoint)
                .json(&patch)
                .send()
                .await
                .map_err(|e| transport(&e))?;
            check(&endpoint, response)?;
            Ok(())
        })
    }

    fn delete(&self, url: &str) -> RemoteFuture<'_, ()> {
        let endpoint = self.endpoint(url);
        Box::pin(async move {
            let response = self
                .client
                .delete(&endpoint)
                .send()
                .await
                .map_err(|e| transport(&e))?;
            check(&endpoint, response)?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_addresses_onto_origin() {
        let store = HttpRemoteStore::new("http://localhost:8080/");

        assert_eq!(store.origin(), "http://localhost:8080");
        assert_eq!(store.endpoint("/api/todo"), "http://localhost:8080/api/todo");
        assert_eq!(
            store.endpoint("api/todo/abc"),
            "http://localhost:8080/api/todo/abc"
        );
    }
}
