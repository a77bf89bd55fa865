//! In-memory backend - no side effects, with failure injection for tests

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Duration;

use super::{Backend, BackendError, Pagination, PersistRequest, UnpublishedEntries};
use crate::auth::{Credentials, User};
use crate::config::PublishMode;
use crate::workflow::{Collection, Entry, EntryKey, UnpublishedEntry, WorkflowStatus};

/// Backend calls recorded by [`TestBackend`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BackendOperation {
    Authenticate,
    Entry { collection: String, slug: String },
    UnpublishedEntry { collection: String, slug: String },
    UnpublishedEntries,
    PersistEntry { collection: String, slug: String },
    PersistUnpublishedEntry { collection: String, slug: String },
    UpdateStatus { collection: String, slug: String, status: WorkflowStatus },
    DeleteUnpublishedEntry { collection: String, slug: String },
    PublishUnpublishedEntry { collection: String, slug: String },
}

impl BackendOperation {
    fn name(&self) -> &'static str {
        match self {
            BackendOperation::Authenticate => "authenticate",
            BackendOperation::Entry { .. } => "entry",
            BackendOperation::UnpublishedEntry { .. } => "unpublished_entry",
            BackendOperation::UnpublishedEntries => "unpublished_entries",
            BackendOperation::PersistEntry { .. } => "persist_entry",
            BackendOperation::PersistUnpublishedEntry { .. } => "persist_unpublished_entry",
            BackendOperation::UpdateStatus { .. } => "update_unpublished_entry_status",
            BackendOperation::DeleteUnpublishedEntry { .. } => "delete_unpublished_entry",
            BackendOperation::PublishUnpublishedEntry { .. } => "publish_unpublished_entry",
        }
    }
}

/// Entries held in memory, like a repository that never leaves the browser.
#[derive(Debug)]
pub struct TestBackend {
    user: User,
    published: Mutex<BTreeMap<EntryKey, Entry>>,
    unpublished: Mutex<BTreeMap<EntryKey, UnpublishedEntry>>,
    failures: Mutex<HashMap<&'static str, BackendError>>,
    executed: Mutex<Vec<BackendOperation>>,
    latency: Mutex<HashMap<EntryKey, Duration>>,
}

impl Default for TestBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TestBackend {
    pub fn new() -> Self {
        Self {
            user: User {
                login: "test".to_string(),
                name: Some("Test User".to_string()),
                backend_name: "test-repo".to_string(),
            },
            published: Mutex::new(BTreeMap::new()),
            unpublished: Mutex::new(BTreeMap::new()),
            failures: Mutex::new(HashMap::new()),
            executed: Mutex::new(Vec::new()),
            latency: Mutex::new(HashMap::new()),
        }
    }

    pub fn add_published(&self, entry: Entry) {
        lock(&self.published).insert(entry.key(), entry);
    }

    pub fn add_unpublished(&self, entry: UnpublishedEntry) {
        lock(&self.unpublished).insert(entry.key(), entry);
    }

    pub fn published(&self, collection: &str, slug: &str) -> Option<Entry> {
        lock(&self.published)
            .get(&EntryKey::new(collection, slug))
            .cloned()
    }

    pub fn unpublished(&self, collection: &str, slug: &str) -> Option<UnpublishedEntry> {
        lock(&self.unpublished)
            .get(&EntryKey::new(collection, slug))
            .cloned()
    }

    /// Make the next call of the named operation fail with `error`.
    pub fn fail_next(&self, operation: &'static str, error: BackendError) {
        lock(&self.failures).insert(operation, error);
    }

    /// Delay every call touching this entry.
    pub fn set_latency(&self, collection: &str, slug: &str, delay: Duration) {
        lock(&self.latency).insert(EntryKey::new(collection, slug), delay);
    }

    pub fn get_executed_operations(&self) -> Vec<BackendOperation> {
        lock(&self.executed).clone()
    }

    pub fn clear_executed_operations(&self) {
        lock(&self.executed).clear();
    }

    async fn record(&self, operation: BackendOperation, key: Option<EntryKey>) -> Result<(), BackendError> {
        let name = operation.name();
        lock(&self.executed).push(operation);

        let delay = key.and_then(|key| lock(&self.latency).get(&key).copied());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match lock(&self.failures).remove(name) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn draft_entry(request: &PersistRequest<'_>) -> Result<Entry, BackendError> {
        request
            .draft
            .entry
            .clone()
            .ok_or_else(|| BackendError::Storage("draft has no entry".to_string()))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[async_trait]
impl Backend for TestBackend {
    fn name(&self) -> &str {
        "test-repo"
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<User, BackendError> {
        self.record(BackendOperation::Authenticate, None).await?;
        if credentials.token.is_empty() {
            return Err(BackendError::Unauthorized("empty token".to_string()));
        }
        Ok(self.user.clone())
    }

    async fn entry(&self, collection: &Collection, slug: &str) -> Result<Entry, BackendError> {
        let key = EntryKey::new(&collection.name, slug);
        self.record(
            BackendOperation::Entry {
                collection: collection.name.clone(),
                slug: slug.to_string(),
            },
            Some(key.clone()),
        )
        .await?;

        lock(&self.published)
            .get(&key)
            .cloned()
            .ok_or(BackendError::NotFound {
                collection: key.collection,
                slug: key.slug,
            })
    }

    async fn unpublished_entry(
        &self,
        collection: &Collection,
        slug: &str,
    ) -> Result<UnpublishedEntry, BackendError> {
        let key = EntryKey::new(&collection.name, slug);
        self.record(
            BackendOperation::UnpublishedEntry {
                collection: collection.name.clone(),
                slug: slug.to_string(),
            },
            Some(key.clone()),
        )
        .await?;

        lock(&self.unpublished)
            .get(&key)
            .cloned()
            .ok_or(BackendError::NotUnderEditorialWorkflow {
                collection: key.collection,
                slug: key.slug,
            })
    }

    async fn unpublished_entries(
        &self,
        collections: &[Collection],
    ) -> Result<UnpublishedEntries, BackendError> {
        self.record(BackendOperation::UnpublishedEntries, None).await?;

        let entries: Vec<UnpublishedEntry> = lock(&self.unpublished)
            .values()
            .filter(|entry| collections.iter().any(|c| c.name == entry.collection))
            .cloned()
            .collect();
        let total = entries.len() as u32;

        Ok(UnpublishedEntries {
            entries,
            pagination: Pagination {
                page: 1,
                per_page: total,
                total,
            },
        })
    }

    async fn persist_entry(&self, request: PersistRequest<'_>) -> Result<(), BackendError> {
        let entry = Self::draft_entry(&request)?;
        self.record(
            BackendOperation::PersistEntry {
                collection: entry.collection.clone(),
                slug: entry.slug.clone(),
            },
            Some(entry.key()),
        )
        .await?;

        if request.config.publish_mode != PublishMode::EditorialWorkflow {
            self.add_published(entry);
            return Ok(());
        }

        let is_modification = lock(&self.published).contains_key(&entry.key());
        let mut unpublished = UnpublishedEntry::new(
            &entry.collection,
            &entry.slug,
            entry.data.clone(),
            WorkflowStatus::first(),
            &self.user.login,
            Utc::now(),
        );
        unpublished.is_modification = is_modification;
        self.add_unpublished(unpublished);
        Ok(())
    }

    async fn persist_unpublished_entry(&self, request: PersistRequest<'_>) -> Result<(), BackendError> {
        let entry = Self::draft_entry(&request)?;
        self.record(
            BackendOperation::PersistUnpublishedEntry {
                collection: entry.collection.clone(),
                slug: entry.slug.clone(),
            },
            Some(entry.key()),
        )
        .await?;

        let mut unpublished = lock(&self.unpublished);
        let existing = unpublished
            .get_mut(&entry.key())
            .ok_or_else(|| BackendError::NotFound {
                collection: entry.collection.clone(),
                slug: entry.slug.clone(),
            })?;
        existing.data = entry.data;
        existing.meta_data.time_stamp = Utc::now();
        existing.meta_data.user = self.user.login.clone();
        Ok(())
    }

    async fn update_unpublished_entry_status(
        &self,
        collection: &str,
        slug: &str,
        new_status: WorkflowStatus,
    ) -> Result<(), BackendError> {
        let key = EntryKey::new(collection, slug);
        self.record(
            BackendOperation::UpdateStatus {
                collection: collection.to_string(),
                slug: slug.to_string(),
                status: new_status,
            },
            Some(key.clone()),
        )
        .await?;

        let mut unpublished = lock(&self.unpublished);
        let entry = unpublished.get_mut(&key).ok_or(BackendError::NotFound {
            collection: key.collection.clone(),
            slug: key.slug.clone(),
        })?;
        entry.meta_data.status = new_status;
        Ok(())
    }

    async fn delete_unpublished_entry(&self, collection: &str, slug: &str) -> Result<(), BackendError> {
        let key = EntryKey::new(collection, slug);
        self.record(
            BackendOperation::DeleteUnpublishedEntry {
                collection: collection.to_string(),
                slug: slug.to_string(),
            },
            Some(key.clone()),
        )
        .await?;

        lock(&self.unpublished)
            .remove(&key)
            .map(|_| ())
            .ok_or(BackendError::NotFound {
                collection: key.collection,
                slug: key.slug,
            })
    }

    async fn publish_unpublished_entry(&self, collection: &str, slug: &str) -> Result<(), BackendError> {
        let key = EntryKey::new(collection, slug);
        self.record(
            BackendOperation::PublishUnpublishedEntry {
                collection: collection.to_string(),
                slug: slug.to_string(),
            },
            Some(key.clone()),
        )
        .await?;

        let mut unpublished = lock(&self.unpublished);
        let status = unpublished
            .get(&key)
            .map(UnpublishedEntry::status)
            .ok_or_else(|| BackendError::NotFound {
                collection: key.collection.clone(),
                slug: key.slug.clone(),
            })?;
        if !status.is_terminal() {
            return Err(BackendError::NotReadyToPublish {
                collection: key.collection,
                slug: key.slug,
                status,
            });
        }

        if let Some(entry) = unpublished.remove(&key) {
            let collection = Collection::new(&entry.collection);
            lock(&self.published).insert(key, entry.to_entry(&collection));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DraftlineConfig;
    use crate::workflow::EntryDraft;
    use serde_json::json;

    fn posts() -> Collection {
        Collection::new("posts")
    }

    #[tokio::test]
    async fn test_persist_new_entry_starts_as_draft() {
        let backend = TestBackend::new();
        let config = DraftlineConfig::default();
        let draft = EntryDraft::new(Entry::new(&posts(), "hello", json!({"title": "Hello"})));

        backend
            .persist_entry(PersistRequest {
                config: &config,
                collection: &posts(),
                draft: &draft,
                assets: &[],
                integrations: &config.integrations,
            })
            .await
            .unwrap();

        let stored = backend.unpublished("posts", "hello").unwrap();
        assert_eq!(stored.status(), WorkflowStatus::Draft);
        assert!(!stored.is_modification);
        assert_eq!(stored.meta_data.user, "test");
    }

    #[tokio::test]
    async fn test_unknown_unpublished_entry_redirects() {
        let backend = TestBackend::new();
        let err = backend.unpublished_entry(&posts(), "missing").await.unwrap_err();
        assert!(err.is_not_under_editorial_workflow());
    }

    #[tokio::test]
    async fn test_publish_rejected_before_terminal_status() {
        let backend = TestBackend::new();
        backend.add_unpublished(UnpublishedEntry::new(
            "posts",
            "a",
            json!({}),
            WorkflowStatus::Review,
            "u",
            Utc::now(),
        ));

        let err = backend.publish_unpublished_entry("posts", "a").await.unwrap_err();
        assert!(matches!(err, BackendError::NotReadyToPublish { .. }));
        assert!(backend.unpublished("posts", "a").is_some());

        backend
            .update_unpublished_entry_status("posts", "a", WorkflowStatus::Ready)
            .await
            .unwrap();
        backend.publish_unpublished_entry("posts", "a").await.unwrap();
        assert!(backend.unpublished("posts", "a").is_none());
        assert!(backend.published("posts", "a").is_some());
    }

    #[tokio::test]
    async fn test_injected_failure_applies_once() {
        let backend = TestBackend::new();
        backend.add_unpublished(UnpublishedEntry::new(
            "posts",
            "a",
            json!({}),
            WorkflowStatus::Draft,
            "u",
            Utc::now(),
        ));
        backend.fail_next(
            "delete_unpublished_entry",
            BackendError::Network("network error".into()),
        );

        assert!(backend.delete_unpublished_entry("posts", "a").await.is_err());
        assert!(backend.delete_unpublished_entry("posts", "a").await.is_ok());

        let executed = backend.get_executed_operations();
        assert_eq!(executed.len(), 2);
        assert!(matches!(executed[0], BackendOperation::DeleteUnpublishedEntry { .. }));
    }
}
