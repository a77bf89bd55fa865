use std::collections::{BTreeMap, BTreeSet};

use crate::actions::{Action, Payload};
use crate::backend::Pagination;

use super::entry::{EntryKey, UnpublishedEntry};
use super::status::WorkflowStatus;

/// Unpublished entries known to the client and their in-flight flags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorialWorkflowState {
    pub entities: BTreeMap<EntryKey, UnpublishedEntry>,
    /// Entries with a single-entry load in flight.
    pub fetching: BTreeSet<EntryKey>,
    pub is_fetching: bool,
    pub pages: Option<Pagination>,
    pub error: Option<String>,
}

/// Entries sharing one workflow status, as shown in a board column.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusColumn {
    pub status: WorkflowStatus,
    pub entries: Vec<UnpublishedEntry>,
}

impl EditorialWorkflowState {
    pub fn entry(&self, collection: &str, slug: &str) -> Option<&UnpublishedEntry> {
        self.entities.get(&EntryKey::new(collection, slug))
    }

    pub fn is_fetching_entry(&self, collection: &str, slug: &str) -> bool {
        self.fetching.contains(&EntryKey::new(collection, slug))
    }

    /// One column per status in workflow order, empty ones included.
    pub fn entries_by_status(&self) -> Vec<StatusColumn> {
        WorkflowStatus::ALL
            .iter()
            .map(|&status| StatusColumn {
                status,
                entries: self
                    .entities
                    .values()
                    .filter(|entry| entry.status() == status)
                    .cloned()
                    .collect(),
            })
            .collect()
    }

    fn entity_mut(&mut self, collection: &str, slug: &str) -> Option<&mut UnpublishedEntry> {
        self.entities.get_mut(&EntryKey::new(collection, slug))
    }
}

pub fn reduce(state: &mut EditorialWorkflowState, action: &Action) {
    match &action.payload {
        Payload::UnpublishedEntryRequest { collection, slug } => {
            state.fetching.insert(EntryKey::new(collection, slug));
        }
        Payload::UnpublishedEntrySuccess { entry, .. } => {
            let key = entry.key();
            state.fetching.remove(&key);
            state.entities.insert(key, entry.clone());
        }
        Payload::UnpublishedEntryRedirect { collection, slug } => {
            let key = EntryKey::new(collection, slug);
            state.fetching.remove(&key);
            state.entities.remove(&key);
        }
        Payload::UnpublishedEntriesRequest => state.is_fetching = true,
        Payload::UnpublishedEntriesSuccess { entries, pages } => {
            for entry in entries {
                state.entities.insert(entry.key(), entry.clone());
            }
            state.pages = Some(pages.clone());
            state.is_fetching = false;
            state.error = None;
        }
        Payload::UnpublishedEntriesFailure { error } => {
            state.is_fetching = false;
            state.error = Some(error.clone());
        }
        Payload::UnpublishedEntryPersistRequest {
            collection,
            entry,
            time_stamp,
        } => {
            let key = EntryKey::new(collection, &entry.slug);
            let existing = state.entities.entry(key).or_insert_with(|| {
                UnpublishedEntry::new(
                    collection.as_str(),
                    entry.slug.as_str(),
                    entry.data.clone(),
                    WorkflowStatus::first(),
                    "",
                    *time_stamp,
                )
            });
            existing.data = entry.data.clone();
            existing.meta_data.time_stamp = *time_stamp;
            existing.is_persisting = true;
        }
        Payload::UnpublishedEntryPersistSuccess { collection, entry } => {
            if let Some(existing) = state.entity_mut(collection, &entry.slug) {
                existing.data = entry.data.clone();
                existing.is_persisting = false;
            }
        }
        Payload::StatusChangeRequest {
            collection,
            slug,
            new_status,
            ..
        } => {
            if let Some(existing) = state.entity_mut(collection, slug) {
                existing.meta_data.status = *new_status;
                existing.is_updating_status = true;
            }
        }
        Payload::StatusChangeSuccess {
            collection,
            slug,
            new_status,
            ..
        } => {
            if let Some(existing) = state.entity_mut(collection, slug) {
                existing.meta_data.status = *new_status;
                existing.is_updating_status = false;
            }
        }
        Payload::PublishRequest { collection, slug } => {
            if let Some(existing) = state.entity_mut(collection, slug) {
                existing.is_publishing = true;
            }
        }
        Payload::PublishSuccess { collection, slug } => {
            state.entities.remove(&EntryKey::new(collection, slug));
        }
        // Failures are undone by the optimistic layer
        _ => {}
    }
}
