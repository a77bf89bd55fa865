use thiserror::Error;

use crate::workflow::WorkflowStatus;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    /// The entry exists only on the main line; callers should load it the
    /// standard way instead of treating this as a failure.
    #[error("{collection}/{slug} is not under editorial workflow")]
    NotUnderEditorialWorkflow { collection: String, slug: String },
    #[error("entry {collection}/{slug} not found")]
    NotFound { collection: String, slug: String },
    #[error("cannot publish {collection}/{slug} while it is in {status}")]
    NotReadyToPublish {
        collection: String,
        slug: String,
        status: WorkflowStatus,
    },
    #[error("'{0}' is not a valid slug or collection name")]
    InvalidSlug(String),
    #[error("{0}")]
    Network(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("authentication failed: {0}")]
    Unauthorized(String),
}

impl BackendError {
    pub fn is_not_under_editorial_workflow(&self) -> bool {
        matches!(self, BackendError::NotUnderEditorialWorkflow { .. })
    }
}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        BackendError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Storage(format!("malformed entry file: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_error_displays_verbatim() {
        let err = BackendError::Network("network error".to_string());
        assert_eq!(err.to_string(), "network error");
    }

    #[test]
    fn test_redirect_detection() {
        let err = BackendError::NotUnderEditorialWorkflow {
            collection: "posts".into(),
            slug: "a".into(),
        };
        assert!(err.is_not_under_editorial_workflow());
        assert!(!BackendError::Network("x".into()).is_not_under_editorial_workflow());
    }
}
