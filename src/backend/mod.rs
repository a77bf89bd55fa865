//! Backend adapters - the storage side of the editorial workflow

pub mod errors;
pub mod local;
pub mod test_repo;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::auth::{Credentials, User};
use crate::config::{DraftlineConfig, IntegrationsConfig};
use crate::media::AssetProxy;
use crate::workflow::{Collection, Entry, EntryDraft, UnpublishedEntry, WorkflowStatus};

pub use errors::BackendError;
pub use local::LocalBackend;
pub use test_repo::{BackendOperation, TestBackend};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnpublishedEntries {
    pub entries: Vec<UnpublishedEntry>,
    pub pagination: Pagination,
}

/// Everything a backend needs to write an entry.
#[derive(Debug, Clone, Copy)]
pub struct PersistRequest<'a> {
    pub config: &'a DraftlineConfig,
    pub collection: &'a Collection,
    pub draft: &'a EntryDraft,
    pub assets: &'a [AssetProxy],
    pub integrations: &'a IntegrationsConfig,
}

/// Which backend write a save turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistTarget {
    /// First save of an entry into the workflow.
    NewEntry,
    /// Re-save of an entry that is already unpublished.
    ExistingUnpublished,
}

/// Storage/version-control provider behind the workflow.
#[async_trait]
pub trait Backend: Send + Sync {
    fn name(&self) -> &str;

    async fn authenticate(&self, credentials: &Credentials) -> Result<User, BackendError>;

    /// Load a published entry.
    async fn entry(&self, collection: &Collection, slug: &str) -> Result<Entry, BackendError>;

    async fn unpublished_entry(
        &self,
        collection: &Collection,
        slug: &str,
    ) -> Result<UnpublishedEntry, BackendError>;

    async fn unpublished_entries(
        &self,
        collections: &[Collection],
    ) -> Result<UnpublishedEntries, BackendError>;

    async fn persist_entry(&self, request: PersistRequest<'_>) -> Result<(), BackendError>;

    async fn persist_unpublished_entry(&self, request: PersistRequest<'_>) -> Result<(), BackendError>;

    async fn update_unpublished_entry_status(
        &self,
        collection: &str,
        slug: &str,
        new_status: WorkflowStatus,
    ) -> Result<(), BackendError>;

    async fn delete_unpublished_entry(&self, collection: &str, slug: &str) -> Result<(), BackendError>;

    async fn publish_unpublished_entry(&self, collection: &str, slug: &str) -> Result<(), BackendError>;
}

/// Build the backend named in the configuration.
pub fn from_config(config: &DraftlineConfig) -> anyhow::Result<std::sync::Arc<dyn Backend>> {
    match config.backend.name.as_str() {
        "local" => Ok(std::sync::Arc::new(LocalBackend::new(&config.backend.data_dir))),
        "test-repo" => Ok(std::sync::Arc::new(TestBackend::new())),
        other => Err(anyhow::anyhow!(
            "Unknown backend '{other}' (expected 'local' or 'test-repo')"
        )),
    }
}
