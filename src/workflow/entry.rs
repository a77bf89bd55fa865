use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use super::status::WorkflowStatus;

/// Identifies an entry across collections. Slugs are only unique per collection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryKey {
    pub collection: String,
    pub slug: String,
}

impl EntryKey {
    pub fn new(collection: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            slug: slug.into(),
        }
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.slug)
    }
}

fn default_widget() -> String {
    "string".to_string()
}

fn default_required() -> bool {
    true
}

/// A field declared on a collection. Object widgets nest `fields`; list
/// widgets may nest either `fields` or a single `field`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_widget")]
    pub widget: String,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub field: Option<Box<Field>>,
}

impl Field {
    pub fn new(name: impl Into<String>, widget: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            widget: widget.into(),
            required: true,
            fields: Vec::new(),
            field: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            folder: None,
            fields: Vec::new(),
        }
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Repository path of an entry of this collection.
    pub fn entry_path(&self, slug: &str) -> String {
        let folder = self.folder.as_deref().unwrap_or(&self.name);
        format!("{}/{}.md", folder.trim_end_matches('/'), slug)
    }
}

/// An entry as stored on the main line, or as edited in the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub collection: String,
    pub slug: String,
    #[serde(default)]
    pub path: String,
    #[serde(default = "empty_object")]
    pub data: Value,
    #[serde(default)]
    pub partial: bool,
}

pub(crate) fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

impl Entry {
    pub fn new(collection: &Collection, slug: impl Into<String>, data: Value) -> Self {
        let slug = slug.into();
        Self {
            collection: collection.name.clone(),
            path: collection.entry_path(&slug),
            slug,
            data,
            partial: false,
        }
    }

    pub fn key(&self) -> EntryKey {
        EntryKey::new(&self.collection, &self.slug)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryMetaData {
    pub status: WorkflowStatus,
    pub collection: String,
    #[serde(default)]
    pub user: String,
    pub time_stamp: DateTime<Utc>,
}

/// A content entry that has not been merged into the main line yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnpublishedEntry {
    pub slug: String,
    pub collection: String,
    #[serde(default = "empty_object")]
    pub data: Value,
    pub meta_data: EntryMetaData,
    #[serde(default)]
    pub is_modification: bool,
    #[serde(default)]
    pub is_persisting: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_updating_status: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_publishing: bool,
}

impl UnpublishedEntry {
    pub fn new(
        collection: impl Into<String>,
        slug: impl Into<String>,
        data: Value,
        status: WorkflowStatus,
        user: impl Into<String>,
        time_stamp: DateTime<Utc>,
    ) -> Self {
        let collection = collection.into();
        Self {
            slug: slug.into(),
            data,
            meta_data: EntryMetaData {
                status,
                collection: collection.clone(),
                user: user.into(),
                time_stamp,
            },
            collection,
            is_modification: false,
            is_persisting: false,
            is_updating_status: false,
            is_publishing: false,
        }
    }

    pub fn key(&self) -> EntryKey {
        EntryKey::new(&self.collection, &self.slug)
    }

    pub fn status(&self) -> WorkflowStatus {
        self.meta_data.status
    }

    pub fn title(&self) -> Option<&str> {
        self.data.get("title").and_then(Value::as_str)
    }

    /// The `author` field if the collection has one, the committing user otherwise.
    pub fn author(&self) -> &str {
        self.data
            .get("author")
            .and_then(Value::as_str)
            .unwrap_or(&self.meta_data.user)
    }

    /// Whether the listing may offer publishing for this entry.
    pub fn can_publish(&self) -> bool {
        self.status().is_terminal() && !self.is_persisting
    }

    pub fn to_entry(&self, collection: &Collection) -> Entry {
        let mut entry = Entry::new(collection, self.slug.clone(), self.data.clone());
        entry.collection = self.collection.clone();
        entry
    }
}

/// The editor's working copy of an entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EntryDraft {
    pub entry: Option<Entry>,
    #[serde(default)]
    pub media_files: Vec<String>,
    #[serde(default)]
    pub fields_errors: BTreeMap<String, Vec<String>>,
}

impl EntryDraft {
    pub fn new(entry: Entry) -> Self {
        Self {
            entry: Some(entry),
            media_files: Vec::new(),
            fields_errors: BTreeMap::new(),
        }
    }

    pub fn with_media(mut self, paths: impl IntoIterator<Item = String>) -> Self {
        self.media_files.extend(paths);
        self
    }

    pub fn has_errors(&self) -> bool {
        self.fields_errors.values().any(|errors| !errors.is_empty())
    }

    /// Recompute `fields_errors` from the collection's required fields.
    pub fn validate(&mut self, collection: &Collection) {
        self.fields_errors.clear();
        let Some(entry) = &self.entry else {
            return;
        };
        for field in collection.fields.iter().filter(|f| f.required) {
            let missing = match entry.data.get(&field.name) {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.trim().is_empty(),
                Some(Value::Array(items)) => items.is_empty(),
                Some(_) => false,
            };
            if missing {
                self.fields_errors.insert(
                    field.name.clone(),
                    vec![format!("{} is required.", field.display_label())],
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn posts() -> Collection {
        Collection::new("posts").with_fields(vec![
            Field::new("title", "string"),
            Field::new("body", "markdown"),
            Field::new("tags", "list").optional(),
        ])
    }

    #[test]
    fn test_author_falls_back_to_user() {
        let mut entry = UnpublishedEntry::new(
            "posts",
            "hello-world",
            json!({"title": "Hello"}),
            WorkflowStatus::Draft,
            "octocat",
            Utc::now(),
        );
        assert_eq!(entry.author(), "octocat");
        entry.data = json!({"title": "Hello", "author": "Ada"});
        assert_eq!(entry.author(), "Ada");
    }

    #[test]
    fn test_can_publish_requires_terminal_status() {
        let mut entry = UnpublishedEntry::new(
            "posts",
            "a",
            json!({}),
            WorkflowStatus::Review,
            "u",
            Utc::now(),
        );
        assert!(!entry.can_publish());
        entry.meta_data.status = WorkflowStatus::Ready;
        assert!(entry.can_publish());
        entry.is_persisting = true;
        assert!(!entry.can_publish());
    }

    #[test]
    fn test_validate_reports_required_fields() {
        let collection = posts();
        let mut draft = EntryDraft::new(Entry::new(
            &collection,
            "hello",
            json!({"title": "  ", "tags": []}),
        ));
        draft.validate(&collection);

        assert!(draft.has_errors());
        assert_eq!(
            draft.fields_errors.get("title").unwrap(),
            &vec!["title is required.".to_string()]
        );
        assert!(draft.fields_errors.contains_key("body"));
        assert!(!draft.fields_errors.contains_key("tags"));
    }

    #[test]
    fn test_entry_path_uses_folder() {
        let mut collection = posts();
        collection.folder = Some("content/posts/".to_string());
        assert_eq!(collection.entry_path("hi"), "content/posts/hi.md");
        assert_eq!(posts().entry_path("hi"), "posts/hi.md");
    }

    #[test]
    fn test_unpublished_entry_wire_format() {
        let entry = UnpublishedEntry::new(
            "posts",
            "hello-world",
            json!({"title": "Hello"}),
            WorkflowStatus::Review,
            "octocat",
            Utc::now(),
        );
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["metaData"]["status"], "review");
        assert_eq!(value["isModification"], false);
        assert!(value.get("isPublishing").is_none());
    }
}
