//! Published entries and the standard (non-workflow) load path

use std::collections::{BTreeMap, BTreeSet};
use tracing::{warn, Instrument};

use crate::actions::{self, Action, Payload};
use crate::backend::Backend;
use crate::config::NotificationConfig;
use crate::notifications::{Notification, NotificationKind};
use crate::store::Dispatch;
use crate::telemetry::create_workflow_span;
use crate::workflow::{Collection, Entry, EntryKey};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntriesState {
    pub entities: BTreeMap<EntryKey, Entry>,
    pub fetching: BTreeSet<EntryKey>,
    pub errors: BTreeMap<EntryKey, String>,
}

impl EntriesState {
    pub fn entry(&self, collection: &str, slug: &str) -> Option<&Entry> {
        self.entities.get(&EntryKey::new(collection, slug))
    }

    pub fn is_fetching(&self, collection: &str, slug: &str) -> bool {
        self.fetching.contains(&EntryKey::new(collection, slug))
    }

    pub fn error(&self, collection: &str, slug: &str) -> Option<&str> {
        self.errors.get(&EntryKey::new(collection, slug)).map(String::as_str)
    }
}

pub fn reduce(state: &mut EntriesState, action: &Action) {
    match &action.payload {
        Payload::EntryRequest { collection, slug } => {
            let key = EntryKey::new(collection, slug);
            state.errors.remove(&key);
            state.fetching.insert(key);
        }
        Payload::EntrySuccess { collection, entry } => {
            let key = EntryKey::new(collection, &entry.slug);
            state.fetching.remove(&key);
            state.errors.remove(&key);
            state.entities.insert(key, entry.clone());
        }
        Payload::EntryFailure {
            collection,
            slug,
            error,
        } => {
            let key = EntryKey::new(collection, slug);
            state.fetching.remove(&key);
            state.errors.insert(key, error.clone());
        }
        _ => {}
    }
}

/// Load a published entry.
pub async fn load_entry(
    backend: &dyn Backend,
    dispatch: &dyn Dispatch,
    notifications: &NotificationConfig,
    collection: &Collection,
    slug: &str,
) {
    let span = create_workflow_span("load_entry", Some(&collection.name), Some(slug), None);
    async {
        dispatch.dispatch(actions::entry_loading(&collection.name, slug));
        match backend.entry(collection, slug).await {
            Ok(entry) => dispatch.dispatch(actions::entry_loaded(&collection.name, entry)),
            Err(error) => {
                warn!(error = %error, "Failed to load entry");
                dispatch.dispatch(actions::notif_send(Notification::new(
                    format!("Failed to load entry: {error}"),
                    NotificationKind::Danger,
                    notifications.danger_dismiss(),
                )));
                dispatch.dispatch(actions::entry_load_error(&error, &collection.name, slug));
            }
        }
    }
    .instrument(span)
    .await
}
