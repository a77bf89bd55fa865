use thiserror::Error;

use crate::backend::BackendError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkflowError {
    #[error("entry has invalid fields: {}", .fields.join(", "))]
    Validation { fields: Vec<String> },

    #[error("draft has no entry to persist")]
    EmptyDraft,

    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    #[error("failed to persist entry: {0}")]
    Persist(#[source] BackendError),
}

impl WorkflowError {
    pub fn is_validation(&self) -> bool {
        matches!(self, WorkflowError::Validation { .. })
    }
}
