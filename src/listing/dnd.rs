use crate::workflow::WorkflowStatus;

/// Cards may only be dropped on targets sharing this namespace.
pub const DND_NAMESPACE: &str = "cms-unpublished-entries";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSource {
    pub namespace: String,
    pub collection: String,
    pub slug: String,
    pub own_status: WorkflowStatus,
}

impl DragSource {
    pub fn new(collection: impl Into<String>, slug: impl Into<String>, own_status: WorkflowStatus) -> Self {
        Self {
            namespace: DND_NAMESPACE.to_string(),
            collection: collection.into(),
            slug: slug.into(),
            own_status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTarget {
    pub namespace: String,
    pub status: WorkflowStatus,
}

impl DropTarget {
    pub fn new(status: WorkflowStatus) -> Self {
        Self {
            namespace: DND_NAMESPACE.to_string(),
            status,
        }
    }

    pub fn accepts(&self, source: &DragSource) -> bool {
        self.namespace == source.namespace
    }
}
