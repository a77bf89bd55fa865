use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use std::path::PathBuf;

use draftline::backend::PersistTarget;
use draftline::media::{AssetProxy, MediaLibrary};
use draftline::workflow::{Entry, EntryDraft, WorkflowError};

use super::{Command, Session};

pub struct ShowCommand {
    pub collection: String,
    pub slug: String,
}

impl Command for ShowCommand {
    async fn execute(&self, session: &Session) -> Result<()> {
        let collection = session.collection(&self.collection)?;
        session
            .workflow
            .load_unpublished_entry(session.dispatch(), collection, &self.slug)
            .await;

        let state = session.store.state();
        if let Some(entry) = state.editorial_workflow.entry(&self.collection, &self.slug) {
            println!("📝 {}/{} ({})", self.collection, self.slug, entry.status().description());
            println!("   👤 {}", entry.meta_data.user);
            println!("   🕒 {}", entry.meta_data.time_stamp.to_rfc3339());
            println!("{}", serde_json::to_string_pretty(&entry.data)?);
            return Ok(());
        }
        if let Some(entry) = state.entries.entry(&self.collection, &self.slug) {
            println!("📰 {}/{} (published)", self.collection, self.slug);
            println!("   📄 {}", entry.path);
            println!("{}", serde_json::to_string_pretty(&entry.data)?);
            return Ok(());
        }

        session.report_notifications()?;
        bail!("Entry {}/{} not found", self.collection, self.slug)
    }
}

pub struct SaveCommand {
    pub collection: String,
    pub slug: String,
    pub fields: Vec<(String, String)>,
    pub data: Option<String>,
    pub media: Vec<PathBuf>,
}

impl SaveCommand {
    /// Current data of the entry, from the workflow or the published content.
    async fn existing(&self, session: &Session) -> Result<(PersistTarget, Map<String, Value>)> {
        let collection = session.collection(&self.collection)?;
        let backend = session.workflow.backend();

        let (target, data) = match backend.unpublished_entry(collection, &self.slug).await {
            Ok(entry) => (PersistTarget::ExistingUnpublished, entry.data),
            Err(e) if e.is_not_under_editorial_workflow() => {
                let data = backend
                    .entry(collection, &self.slug)
                    .await
                    .map(|entry| entry.data)
                    .unwrap_or(Value::Null);
                (PersistTarget::NewEntry, data)
            }
            Err(e) => return Err(e).context("Failed to look up entry"),
        };

        let data = match data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Ok((target, data))
    }

    async fn media_library(&self) -> Result<(MediaLibrary, Vec<String>)> {
        let mut library = MediaLibrary::new();
        let mut paths = Vec::new();
        for file in &self.media {
            let bytes = tokio::fs::read(file)
                .await
                .with_context(|| format!("Failed to read media file {}", file.display()))?;
            let name = file
                .file_name()
                .and_then(|name| name.to_str())
                .with_context(|| format!("Invalid media file name {}", file.display()))?;
            let path = format!("uploads/{name}");
            library.add(AssetProxy::new(path.clone(), bytes));
            paths.push(path);
        }
        Ok((library, paths))
    }
}

impl Command for SaveCommand {
    async fn execute(&self, session: &Session) -> Result<()> {
        let collection = session.collection(&self.collection)?;
        let (target, mut data) = self.existing(session).await?;

        if let Some(raw) = &self.data {
            match serde_json::from_str::<Value>(raw).context("--data must be valid JSON")? {
                Value::Object(map) => data.extend(map),
                _ => bail!("--data must be a JSON object"),
            }
        }
        for (key, value) in &self.fields {
            data.insert(key.clone(), Value::String(value.clone()));
        }

        let (media, paths) = self.media_library().await?;
        let mut draft = EntryDraft::new(Entry::new(collection, &self.slug, Value::Object(data))).with_media(paths);
        draft.validate(collection);

        match session
            .workflow
            .persist_unpublished_entry(session.dispatch(), collection, &draft, &media, target)
            .await
        {
            Ok(()) => {
                session.report_notifications()?;
                if session.config.is_editorial_workflow() {
                    println!("💾 {}/{} saved to the editorial workflow", self.collection, self.slug);
                } else {
                    println!("📰 {}/{} published", self.collection, self.slug);
                }
                Ok(())
            }
            Err(WorkflowError::Validation { .. }) => {
                println!("❌ Entry has invalid fields:");
                for (field, errors) in &draft.fields_errors {
                    for error in errors {
                        println!("   • {field}: {error}");
                    }
                }
                bail!("Entry was not saved")
            }
            Err(e) => {
                session.report_notifications()?;
                Err(e.into())
            }
        }
    }
}
