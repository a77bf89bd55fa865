use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use super::{Backend, BackendError, Pagination, PersistRequest, UnpublishedEntries};
use crate::auth::{Credentials, User};
use crate::config::PublishMode;
use crate::workflow::{Collection, Entry, UnpublishedEntry, WorkflowStatus};

/// Stores entries as JSON files under a data directory:
///
/// - `content/<collection>/<slug>.json` for published entries
/// - `workflow/<collection>/<slug>.json` for unpublished entries
/// - `media/<path>` for uploaded assets
#[derive(Debug, Clone)]
pub struct LocalBackend {
    root: PathBuf,
    user: String,
}

impl LocalBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let user = std::env::var("USER").unwrap_or_else(|_| "local".to_string());
        Self {
            root: root.into(),
            user,
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn content_path(&self, collection: &str, slug: &str) -> Result<PathBuf, BackendError> {
        Ok(self
            .root
            .join("content")
            .join(path_segment(collection)?)
            .join(format!("{}.json", path_segment(slug)?)))
    }

    fn workflow_dir(&self, collection: &str) -> Result<PathBuf, BackendError> {
        Ok(self.root.join("workflow").join(path_segment(collection)?))
    }

    fn workflow_path(&self, collection: &str, slug: &str) -> Result<PathBuf, BackendError> {
        Ok(self
            .workflow_dir(collection)?
            .join(format!("{}.json", path_segment(slug)?)))
    }

    fn media_path(&self, path: &str) -> Result<PathBuf, BackendError> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative.components().any(|c| !matches!(c, Component::Normal(_))) {
            return Err(BackendError::Storage(format!("invalid media path '{path}'")));
        }
        Ok(self.root.join("media").join(relative))
    }

    async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, BackendError> {
        match fs::read_to_string(path).await {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), BackendError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let serialized = serde_json::to_string_pretty(value)?;

        // Write to a temp file and rename so readers never see half an entry
        let temp_file = path.with_extension("json.tmp");
        fs::write(&temp_file, serialized).await?;
        fs::rename(&temp_file, path).await?;
        Ok(())
    }

    async fn remove(path: &Path, collection: &str, slug: &str) -> Result<(), BackendError> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(BackendError::NotFound {
                collection: collection.to_string(),
                slug: slug.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn load_unpublished(&self, collection: &str, slug: &str) -> Result<UnpublishedEntry, BackendError> {
        Self::read_json(&self.workflow_path(collection, slug)?)
            .await?
            .ok_or_else(|| BackendError::NotFound {
                collection: collection.to_string(),
                slug: slug.to_string(),
            })
    }

    async fn write_assets(&self, request: &PersistRequest<'_>) -> Result<(), BackendError> {
        for asset in request.assets.iter().filter(|a| !a.uploaded) {
            let Some(bytes) = &asset.file else {
                continue;
            };
            let target = self.media_path(&asset.path)?;
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&target, bytes).await?;
            debug!(path = %asset.path, "Stored media file");
        }
        Ok(())
    }

    fn draft_entry(request: &PersistRequest<'_>) -> Result<Entry, BackendError> {
        request
            .draft
            .entry
            .clone()
            .ok_or_else(|| BackendError::Storage("draft has no entry".to_string()))
    }
}

/// Collection names and slugs each map to exactly one path segment under
/// the data directory.
fn path_segment(value: &str) -> Result<&str, BackendError> {
    if value.is_empty() || value == "." || value == ".." || value.contains(['/', '\\']) {
        return Err(BackendError::InvalidSlug(value.to_string()));
    }
    Ok(value)
}

#[async_trait]
impl Backend for LocalBackend {
    fn name(&self) -> &str {
        "local"
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<User, BackendError> {
        if credentials.token.trim().is_empty() {
            return Err(BackendError::Unauthorized("empty token".to_string()));
        }
        Ok(User {
            login: credentials.login.clone().unwrap_or_else(|| self.user.clone()),
            name: None,
            backend_name: self.name().to_string(),
        })
    }

    async fn entry(&self, collection: &Collection, slug: &str) -> Result<Entry, BackendError> {
        Self::read_json(&self.content_path(&collection.name, slug)?)
            .await?
            .ok_or_else(|| BackendError::NotFound {
                collection: collection.name.clone(),
                slug: slug.to_string(),
            })
    }

    async fn unpublished_entry(
        &self,
        collection: &Collection,
        slug: &str,
    ) -> Result<UnpublishedEntry, BackendError> {
        Self::read_json(&self.workflow_path(&collection.name, slug)?)
            .await?
            .ok_or_else(|| BackendError::NotUnderEditorialWorkflow {
                collection: collection.name.clone(),
                slug: slug.to_string(),
            })
    }

    async fn unpublished_entries(
        &self,
        collections: &[Collection],
    ) -> Result<UnpublishedEntries, BackendError> {
        let mut entries = Vec::new();

        for collection in collections {
            let dir = self.workflow_dir(&collection.name)?;
            let mut dir_entries = match fs::read_dir(&dir).await {
                Ok(read_dir) => read_dir,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            while let Some(dir_entry) = dir_entries.next_entry().await? {
                let path = dir_entry.path();
                if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                    continue;
                }
                if let Some(entry) = Self::read_json::<UnpublishedEntry>(&path).await? {
                    entries.push(entry);
                }
            }
        }

        entries.sort_by(|a, b| a.key().cmp(&b.key()));
        let total = entries.len() as u32;
        debug!(total, "Listed unpublished entries");

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
        self.write_assets(&request).await?;

        if request.config.publish_mode != PublishMode::EditorialWorkflow {
            Self::write_json(&self.content_path(&entry.collection, &entry.slug)?, &entry).await?;
            info!(collection = %entry.collection, slug = %entry.slug, "Published entry directly");
            return Ok(());
        }

        let is_modification = fs::try_exists(self.content_path(&entry.collection, &entry.slug)?).await?;
        let mut unpublished = UnpublishedEntry::new(
            &entry.collection,
            &entry.slug,
            entry.data,
            WorkflowStatus::first(),
            &self.user,
            Utc::now(),
        );
        unpublished.is_modification = is_modification;

        Self::write_json(&self.workflow_path(&unpublished.collection, &unpublished.slug)?, &unpublished).await?;
        info!(
            collection = %unpublished.collection,
            slug = %unpublished.slug,
            is_modification,
            "Created unpublished entry"
        );
        Ok(())
    }

    async fn persist_unpublished_entry(&self, request: PersistRequest<'_>) -> Result<(), BackendError> {
        let entry = Self::draft_entry(&request)?;
        self.write_assets(&request).await?;

        let mut existing = self.load_unpublished(&entry.collection, &entry.slug).await?;
        existing.data = entry.data;
        existing.meta_data.user = self.user.clone();
        existing.meta_data.time_stamp = Utc::now();

        Self::write_json(&self.workflow_path(&existing.collection, &existing.slug)?, &existing).await
    }

    async fn update_unpublished_entry_status(
        &self,
        collection: &str,
        slug: &str,
        new_status: WorkflowStatus,
    ) -> Result<(), BackendError> {
        let mut entry = self.load_unpublished(collection, slug).await?;
        entry.meta_data.status = new_status;
        Self::write_json(&self.workflow_path(collection, slug)?, &entry).await
    }

    async fn delete_unpublished_entry(&self, collection: &str, slug: &str) -> Result<(), BackendError> {
        Self::remove(&self.workflow_path(collection, slug)?, collection, slug).await
    }

    async fn publish_unpublished_entry(&self, collection: &str, slug: &str) -> Result<(), BackendError> {
        let entry = self.load_unpublished(collection, slug).await?;
        if !entry.status().is_terminal() {
            return Err(BackendError::NotReadyToPublish {
                collection: collection.to_string(),
                slug: slug.to_string(),
                status: entry.status(),
            });
        }

        let published = entry.to_entry(&Collection::new(collection));
        Self::write_json(&self.content_path(collection, slug)?, &published).await?;
        Self::remove(&self.workflow_path(collection, slug)?, collection, slug).await?;
        info!(collection, slug, "Merged unpublished entry");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DraftlineConfig;
    use crate::media::AssetProxy;
    use crate::workflow::EntryDraft;
    use serde_json::json;
    use tempfile::TempDir;

    fn posts() -> Collection {
        Collection::new("posts")
    }

    async fn save(backend: &LocalBackend, config: &DraftlineConfig, draft: &EntryDraft, assets: &[AssetProxy]) {
        backend
            .persist_entry(PersistRequest {
                config,
                collection: &posts(),
                draft,
                assets,
                integrations: &config.integrations,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_full_lifecycle_on_disk() {
        let dir = TempDir::new().unwrap();
        let backend = LocalBackend::new(dir.path()).with_user("ada");
        let config = DraftlineConfig::default();
        let draft = EntryDraft::new(Entry::new(&posts(), "hello", json!({"title": "Hello"})));

        save(&backend, &config, &draft, &[]).await;
        let listed = backend.unpublished_entries(&[posts()]).await.unwrap();
        assert_eq!(listed.entries.len(), 1);
        assert_eq!(listed.pagination.total, 1);
        assert_eq!(listed.entries[0].meta_data.user, "ada");

        let err = backend.publish_unpublished_entry("posts", "hello").await.unwrap_err();
        assert!(matches!(err, BackendError::NotReadyToPublish { .. }));

        backend
            .update_unpublished_entry_status("posts", "hello", WorkflowStatus::Ready)
            .await
            .unwrap();
        backend.publish_unpublished_entry("posts", "hello").await.unwrap();

        let published = backend.entry(&posts(), "hello").await.unwrap();
        assert_eq!(published.data["title"], "Hello");
        assert!(backend
            .unpublished_entry(&posts(), "hello")
            .await
            .unwrap_err()
            .is_not_under_editorial_workflow());
    }

    #[tokio::test]
    async fn test_resave_marks_modification_and_writes_media() {
        let dir = TempDir::new().unwrap();
        let backend = LocalBackend::new(dir.path());
        let config = DraftlineConfig::default();

        backend
            .publish_unpublished_entry("posts", "missing")
            .await
            .unwrap_err();

        let published = Entry::new(&posts(), "old", json!({"title": "Old"}));
        LocalBackend::write_json(&backend.content_path("posts", "old").unwrap(), &published)
            .await
            .unwrap();

        let asset = AssetProxy::new("uploads/cat.png", b"png".to_vec());
        let draft = EntryDraft::new(Entry::new(&posts(), "old", json!({"title": "Newer"})));
        save(&backend, &config, &draft, &[asset]).await;

        let stored = backend.unpublished_entry(&posts(), "old").await.unwrap();
        assert!(stored.is_modification);
        assert_eq!(
            std::fs::read(dir.path().join("media/uploads/cat.png")).unwrap(),
            b"png"
        );
    }

    #[tokio::test]
    async fn test_delete_missing_entry_is_not_found() {
        let dir = TempDir::new().unwrap();
        let backend = LocalBackend::new(dir.path());
        let err = backend.delete_unpublished_entry("posts", "nope").await.unwrap_err();
        assert!(matches!(err, BackendError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_traversal_slugs_stay_inside_data_dir() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("data");
        let backend = LocalBackend::new(&data);
        let config = DraftlineConfig::default();
        let slug = "../../../escaped";

        let draft = EntryDraft::new(Entry::new(&posts(), slug, json!({"title": "Out"})));
        let err = backend
            .persist_entry(PersistRequest {
                config: &config,
                collection: &posts(),
                draft: &draft,
                assets: &[],
                integrations: &config.integrations,
            })
            .await
            .unwrap_err();
        assert_eq!(err, BackendError::InvalidSlug(slug.to_string()));

        let err = backend
            .update_unpublished_entry_status("posts", slug, WorkflowStatus::Ready)
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::InvalidSlug(_)));

        let err = backend.delete_unpublished_entry("posts", slug).await.unwrap_err();
        assert!(matches!(err, BackendError::InvalidSlug(_)));

        for bad in ["", "..", "a/b", "a\\b"] {
            assert!(backend.delete_unpublished_entry("posts", bad).await.is_err());
            assert!(backend.delete_unpublished_entry(bad, "a").await.is_err());
        }
        assert!(!dir.path().join("escaped.json").exists());
        assert!(!data.exists());
    }

    #[tokio::test]
    async fn test_media_paths_cannot_escape() {
        let dir = TempDir::new().unwrap();
        let backend = LocalBackend::new(dir.path().join("data"));
        let config = DraftlineConfig::default();
        let asset = AssetProxy::new("../outside.png", b"png".to_vec());
        let draft = EntryDraft::new(Entry::new(&posts(), "pic", json!({"title": "Pic"})));

        let err = backend
            .persist_entry(PersistRequest {
                config: &config,
                collection: &posts(),
                draft: &draft,
                assets: &[asset],
                integrations: &config.integrations,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Storage(_)));
        assert!(!dir.path().join("outside.png").exists());
    }
}
