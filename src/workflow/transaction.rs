use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Correlates an optimistic update with its eventual commit or revert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for TransactionId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimistKind {
    Begin,
    Commit,
    Revert,
}

/// Marker attached to state-changing actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Optimist {
    #[serde(rename = "type")]
    pub kind: OptimistKind,
    pub id: TransactionId,
}

impl Optimist {
    pub fn begin(id: TransactionId) -> Self {
        Self { kind: OptimistKind::Begin, id }
    }

    pub fn commit(id: TransactionId) -> Self {
        Self { kind: OptimistKind::Commit, id }
    }

    pub fn revert(id: TransactionId) -> Self {
        Self { kind: OptimistKind::Revert, id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(TransactionId::generate(), TransactionId::generate());
    }

    #[test]
    fn test_marker_serializes_like_action_field() {
        let id = TransactionId::generate();
        let value = serde_json::to_value(Optimist::revert(id)).unwrap();
        assert_eq!(value["type"], "revert");
        assert_eq!(value["id"], id.to_string());
    }
}
