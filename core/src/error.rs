//! Transport-level errors reported by a [`RemoteStore`](crate::remote::RemoteStore).

use thiserror::Error;

/// A create, fetch, update or delete call to the remote store failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// The request never produced a response (connection refused, timeout, ...).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The store answered with a non-success status.
    #[error("Remote store answered {status} for {url}")]
    Status {
        /// Address of the failed request.
        url: String,
        /// HTTP-style status code.
        status: u16,
    },

    /// Nothing is stored at the address.
    #[error("Nothing stored at {0}")]
    NotFound(String),

    /// The response body could not be decoded.
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl PersistenceError {
    /// Whether the failure means the target no longer exists remotely.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_address() {
        let err = PersistenceError::Status {
            url: "/api/todo/1".to_string(),
            status: 500,
        };
        assert_eq!(err.to_string(), "Remote store answered 500 for /api/todo/1");
        assert!(PersistenceError::NotFound("/api/todo/1".to_string()).is_not_found());
    }
}
