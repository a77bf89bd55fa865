use chrono::{DateTime, Utc};
use tracing::debug;

use super::dnd::{DragSource, DropTarget};
use crate::store::Dispatch;
use crate::ui::Card;
use crate::workflow::{EditorialWorkflow, EditorialWorkflowState, UnpublishedEntry, WorkflowStatus};

pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this entry?";
pub const PUBLISH_CONFIRMATION: &str = "Are you sure you want to publish this entry?";

/// Asks the user a yes/no question.
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// What the board asks the workflow to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingIntent {
    ChangeStatus {
        collection: String,
        slug: String,
        old_status: WorkflowStatus,
        new_status: WorkflowStatus,
    },
    Delete {
        collection: String,
        slug: String,
    },
    Publish {
        collection: String,
        slug: String,
    },
}

impl ListingIntent {
    pub async fn execute(&self, workflow: &EditorialWorkflow, dispatch: &dyn Dispatch) {
        match self {
            ListingIntent::ChangeStatus {
                collection,
                slug,
                old_status,
                new_status,
            } => {
                workflow
                    .update_unpublished_entry_status(dispatch, collection, slug, *old_status, *new_status)
                    .await
            }
            ListingIntent::Delete { collection, slug } => {
                workflow.delete_unpublished_entry(dispatch, collection, slug).await
            }
            ListingIntent::Publish { collection, slug } => {
                workflow.publish_unpublished_entry(dispatch, collection, slug).await
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListingCard {
    pub source: DragSource,
    pub class_names: String,
    /// Capitalized collection name.
    pub meta: String,
    /// `New` unless the entry edits a published one.
    pub label: &'static str,
    pub title: Option<String>,
    pub subtitle: String,
    pub last_updated: String,
    pub edit_link: String,
    pub can_publish: bool,
}

impl ListingCard {
    fn from_entry(entry: &UnpublishedEntry) -> Self {
        let collection = &entry.meta_data.collection;
        Self {
            source: DragSource::new(collection, &entry.slug, entry.status()),
            class_names: Card::new("nc-unpublishedListing-card").class_names(),
            meta: capitalize(collection),
            label: if entry.is_modification { "" } else { "New" },
            title: entry.title().map(str::to_string),
            subtitle: format!("by {}", entry.author()),
            last_updated: format!(
                "Last updated: {} by {}",
                format_timestamp(&entry.meta_data.time_stamp),
                entry.meta_data.user
            ),
            edit_link: format!("collections/{}/entries/{}", collection, entry.slug),
            can_publish: entry.can_publish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListingColumn {
    pub status: WorkflowStatus,
    pub heading: &'static str,
    pub target: DropTarget,
    pub cards: Vec<ListingCard>,
}

/// The editorial workflow board.
#[derive(Debug, Clone, PartialEq)]
pub struct UnpublishedListing {
    pub columns: Vec<ListingColumn>,
}

impl UnpublishedListing {
    pub fn from_state(state: &EditorialWorkflowState) -> Self {
        let columns = state
            .entries_by_status()
            .into_iter()
            .map(|column| ListingColumn {
                status: column.status,
                heading: column.status.description(),
                target: DropTarget::new(column.status),
                cards: column.entries.iter().map(ListingCard::from_entry).collect(),
            })
            .collect();
        Self { columns }
    }

    pub fn column(&self, status: WorkflowStatus) -> Option<&ListingColumn> {
        self.columns.iter().find(|column| column.status == status)
    }

    pub fn card(&self, collection: &str, slug: &str) -> Option<&ListingCard> {
        self.columns
            .iter()
            .flat_map(|column| column.cards.iter())
            .find(|card| card.source.collection == collection && card.source.slug == slug)
    }

    /// A card dropped on a column. Foreign drags and drops back onto the
    /// origin column are ignored.
    pub fn handle_drop(&self, target: &DropTarget, source: &DragSource) -> Option<ListingIntent> {
        if !target.accepts(source) {
            debug!(namespace = %source.namespace, "Ignoring drop from another namespace");
            return None;
        }
        if target.status == source.own_status {
            return None;
        }
        Some(ListingIntent::ChangeStatus {
            collection: source.collection.clone(),
            slug: source.slug.clone(),
            old_status: source.own_status,
            new_status: target.status,
        })
    }

    pub fn request_delete(&self, collection: &str, slug: &str, confirm: &dyn Confirm) -> Option<ListingIntent> {
        if !confirm.confirm(DELETE_CONFIRMATION) {
            return None;
        }
        Some(ListingIntent::Delete {
            collection: collection.to_string(),
            slug: slug.to_string(),
        })
    }

    /// Only cards on the board at the terminal status, and not being saved,
    /// can be published; anything else is dropped without asking.
    pub fn request_publish(&self, collection: &str, slug: &str, confirm: &dyn Confirm) -> Option<ListingIntent> {
        if !self.card(collection, slug).is_some_and(|card| card.can_publish) {
            return None;
        }
        if !confirm.confirm(PUBLISH_CONFIRMATION) {
            return None;
        }
        Some(ListingIntent::Publish {
            collection: collection.to_string(),
            slug: slug.to_string(),
        })
    }
}

/// Upper-case the first character and lower-case the rest.
fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn format_timestamp(time_stamp: &DateTime<Utc>) -> String {
    time_stamp.format("%a, %b %-d, %Y %-I:%M %p").to_string()
}
