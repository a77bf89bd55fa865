//! The action contract consumed by the reducers.
//!
//! Every action has a stable string kind, a payload shaped per kind and an
//! optional optimistic marker. Actions serialize as
//! `{"type": ..., "payload": ..., "optimist": ..., "error": ...}`.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::auth::User;
use crate::backend::{BackendError, Pagination};
use crate::notifications::Notification;
use crate::workflow::{Entry, Optimist, OptimistKind, TransactionId, UnpublishedEntry, WorkflowStatus};

pub const UNPUBLISHED_ENTRY_REQUEST: &str = "UNPUBLISHED_ENTRY_REQUEST";
pub const UNPUBLISHED_ENTRY_SUCCESS: &str = "UNPUBLISHED_ENTRY_SUCCESS";
pub const UNPUBLISHED_ENTRY_REDIRECT: &str = "UNPUBLISHED_ENTRY_REDIRECT";

pub const UNPUBLISHED_ENTRIES_REQUEST: &str = "UNPUBLISHED_ENTRIES_REQUEST";
pub const UNPUBLISHED_ENTRIES_SUCCESS: &str = "UNPUBLISHED_ENTRIES_SUCCESS";
pub const UNPUBLISHED_ENTRIES_FAILURE: &str = "UNPUBLISHED_ENTRIES_FAILURE";

pub const UNPUBLISHED_ENTRY_PERSIST_REQUEST: &str = "UNPUBLISHED_ENTRY_PERSIST_REQUEST";
pub const UNPUBLISHED_ENTRY_PERSIST_SUCCESS: &str = "UNPUBLISHED_ENTRY_PERSIST_SUCCESS";
pub const UNPUBLISHED_ENTRY_PERSIST_FAILURE: &str = "UNPUBLISHED_ENTRY_PERSIST_FAILURE";

pub const UNPUBLISHED_ENTRY_STATUS_CHANGE_REQUEST: &str = "UNPUBLISHED_ENTRY_STATUS_CHANGE_REQUEST";
pub const UNPUBLISHED_ENTRY_STATUS_CHANGE_SUCCESS: &str = "UNPUBLISHED_ENTRY_STATUS_CHANGE_SUCCESS";
pub const UNPUBLISHED_ENTRY_STATUS_CHANGE_FAILURE: &str = "UNPUBLISHED_ENTRY_STATUS_CHANGE_FAILURE";

pub const UNPUBLISHED_ENTRY_PUBLISH_REQUEST: &str = "UNPUBLISHED_ENTRY_PUBLISH_REQUEST";
pub const UNPUBLISHED_ENTRY_PUBLISH_SUCCESS: &str = "UNPUBLISHED_ENTRY_PUBLISH_SUCCESS";
pub const UNPUBLISHED_ENTRY_PUBLISH_FAILURE: &str = "UNPUBLISHED_ENTRY_PUBLISH_FAILURE";

pub const ENTRY_REQUEST: &str = "ENTRY_REQUEST";
pub const ENTRY_SUCCESS: &str = "ENTRY_SUCCESS";
pub const ENTRY_FAILURE: &str = "ENTRY_FAILURE";

pub const NOTIF_SEND: &str = "NOTIF_SEND";
pub const NOTIF_DISMISS: &str = "NOTIF_DISMISS";

pub const AUTH_REQUEST: &str = "AUTH_REQUEST";
pub const AUTH_SUCCESS: &str = "AUTH_SUCCESS";
pub const AUTH_FAILURE: &str = "AUTH_FAILURE";
pub const AUTH_REQUEST_DONE: &str = "AUTH_REQUEST_DONE";
pub const SHOW_AUTH_POPUP: &str = "SHOW_AUTH_POPUP";
pub const LOGOUT: &str = "LOGOUT";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    UnpublishedEntryRequest {
        collection: String,
        slug: String,
    },
    UnpublishedEntrySuccess {
        collection: String,
        entry: UnpublishedEntry,
    },
    UnpublishedEntryRedirect {
        collection: String,
        slug: String,
    },
    UnpublishedEntriesRequest,
    UnpublishedEntriesSuccess {
        entries: Vec<UnpublishedEntry>,
        pages: Pagination,
    },
    UnpublishedEntriesFailure {
        error: String,
    },
    UnpublishedEntryPersistRequest {
        collection: String,
        entry: Entry,
        #[serde(rename = "timeStamp")]
        time_stamp: DateTime<Utc>,
    },
    UnpublishedEntryPersistSuccess {
        collection: String,
        entry: Entry,
    },
    UnpublishedEntryPersistFailure {
        error: String,
    },
    StatusChangeRequest {
        collection: String,
        slug: String,
        #[serde(rename = "oldStatus")]
        old_status: WorkflowStatus,
        #[serde(rename = "newStatus")]
        new_status: WorkflowStatus,
    },
    StatusChangeSuccess {
        collection: String,
        slug: String,
        #[serde(rename = "oldStatus")]
        old_status: WorkflowStatus,
        #[serde(rename = "newStatus")]
        new_status: WorkflowStatus,
    },
    StatusChangeFailure {
        collection: String,
        slug: String,
    },
    PublishRequest {
        collection: String,
        slug: String,
    },
    PublishSuccess {
        collection: String,
        slug: String,
    },
    PublishFailure {
        collection: String,
        slug: String,
    },
    EntryRequest {
        collection: String,
        slug: String,
    },
    EntrySuccess {
        collection: String,
        entry: Entry,
    },
    EntryFailure {
        collection: String,
        slug: String,
        error: String,
    },
    NotifSend(Notification),
    NotifDismiss {
        id: Uuid,
    },
    AuthRequest,
    AuthSuccess(User),
    AuthFailure {
        error: String,
    },
    AuthRequestDone,
    ShowAuthPopup,
    Logout,
}

impl Payload {
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::UnpublishedEntryRequest { .. } => UNPUBLISHED_ENTRY_REQUEST,
            Payload::UnpublishedEntrySuccess { .. } => UNPUBLISHED_ENTRY_SUCCESS,
            Payload::UnpublishedEntryRedirect { .. } => UNPUBLISHED_ENTRY_REDIRECT,
            Payload::UnpublishedEntriesRequest => UNPUBLISHED_ENTRIES_REQUEST,
            Payload::UnpublishedEntriesSuccess { .. } => UNPUBLISHED_ENTRIES_SUCCESS,
            Payload::UnpublishedEntriesFailure { .. } => UNPUBLISHED_ENTRIES_FAILURE,
            Payload::UnpublishedEntryPersistRequest { .. } => UNPUBLISHED_ENTRY_PERSIST_REQUEST,
            Payload::UnpublishedEntryPersistSuccess { .. } => UNPUBLISHED_ENTRY_PERSIST_SUCCESS,
            Payload::UnpublishedEntryPersistFailure { .. } => UNPUBLISHED_ENTRY_PERSIST_FAILURE,
            Payload::StatusChangeRequest { .. } => UNPUBLISHED_ENTRY_STATUS_CHANGE_REQUEST,
            Payload::StatusChangeSuccess { .. } => UNPUBLISHED_ENTRY_STATUS_CHANGE_SUCCESS,
            Payload::StatusChangeFailure { .. } => UNPUBLISHED_ENTRY_STATUS_CHANGE_FAILURE,
            Payload::PublishRequest { .. } => UNPUBLISHED_ENTRY_PUBLISH_REQUEST,
            Payload::PublishSuccess { .. } => UNPUBLISHED_ENTRY_PUBLISH_SUCCESS,
            Payload::PublishFailure { .. } => UNPUBLISHED_ENTRY_PUBLISH_FAILURE,
            Payload::EntryRequest { .. } => ENTRY_REQUEST,
            Payload::EntrySuccess { .. } => ENTRY_SUCCESS,
            Payload::EntryFailure { .. } => ENTRY_FAILURE,
            Payload::NotifSend(_) => NOTIF_SEND,
            Payload::NotifDismiss { .. } => NOTIF_DISMISS,
            Payload::AuthRequest => AUTH_REQUEST,
            Payload::AuthSuccess(_) => AUTH_SUCCESS,
            Payload::AuthFailure { .. } => AUTH_FAILURE,
            Payload::AuthRequestDone => AUTH_REQUEST_DONE,
            Payload::ShowAuthPopup => SHOW_AUTH_POPUP,
            Payload::Logout => LOGOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub payload: Payload,
    pub optimist: Option<Optimist>,
    pub error: Option<String>,
}

impl Action {
    pub fn new(payload: Payload) -> Self {
        Self {
            payload,
            optimist: None,
            error: None,
        }
    }

    fn with_optimist(mut self, optimist: Optimist) -> Self {
        self.optimist = Some(optimist);
        self
    }

    fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn kind(&self) -> &'static str {
        self.payload.kind()
    }

    pub fn transaction(&self) -> Option<TransactionId> {
        self.optimist.map(|o| o.id)
    }

    pub fn is_optimistic(&self, kind: OptimistKind) -> bool {
        self.optimist.is_some_and(|o| o.kind == kind)
    }
}

impl From<Payload> for Action {
    fn from(payload: Payload) -> Self {
        Action::new(payload)
    }
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a> {
            #[serde(rename = "type")]
            kind: &'static str,
            payload: &'a Payload,
            #[serde(skip_serializing_if = "Option::is_none")]
            optimist: Option<&'a Optimist>,
            #[serde(skip_serializing_if = "Option::is_none")]
            error: Option<&'a String>,
        }

        Wire {
            kind: self.kind(),
            payload: &self.payload,
            optimist: self.optimist.as_ref(),
            error: self.error.as_ref(),
        }
        .serialize(serializer)
    }
}

// Unpublished entry loading

pub fn unpublished_entry_loading(collection: &str, slug: &str) -> Action {
    Payload::UnpublishedEntryRequest {
        collection: collection.to_string(),
        slug: slug.to_string(),
    }
    .into()
}

pub fn unpublished_entry_loaded(collection: &str, entry: UnpublishedEntry) -> Action {
    Payload::UnpublishedEntrySuccess {
        collection: collection.to_string(),
        entry,
    }
    .into()
}

pub fn unpublished_entry_redirected(collection: &str, slug: &str) -> Action {
    Payload::UnpublishedEntryRedirect {
        collection: collection.to_string(),
        slug: slug.to_string(),
    }
    .into()
}

pub fn unpublished_entries_loading() -> Action {
    Payload::UnpublishedEntriesRequest.into()
}

pub fn unpublished_entries_loaded(entries: Vec<UnpublishedEntry>, pages: Pagination) -> Action {
    Payload::UnpublishedEntriesSuccess { entries, pages }.into()
}

pub fn unpublished_entries_failed(error: &BackendError) -> Action {
    Action::new(Payload::UnpublishedEntriesFailure {
        error: error.to_string(),
    })
    .with_error("Failed to load entries")
}

// Persisting

pub fn unpublished_entry_persisting(collection: &str, entry: Entry, id: TransactionId) -> Action {
    Action::new(Payload::UnpublishedEntryPersistRequest {
        collection: collection.to_string(),
        entry,
        time_stamp: Utc::now(),
    })
    .with_optimist(Optimist::begin(id))
}

pub fn unpublished_entry_persisted(collection: &str, entry: Entry, id: TransactionId) -> Action {
    Action::new(Payload::UnpublishedEntryPersistSuccess {
        collection: collection.to_string(),
        entry,
    })
    .with_optimist(Optimist::commit(id))
}

pub fn unpublished_entry_persisted_fail(error: &BackendError, id: TransactionId) -> Action {
    Action::new(Payload::UnpublishedEntryPersistFailure {
        error: error.to_string(),
    })
    .with_optimist(Optimist::revert(id))
    .with_error(error.to_string())
}

// Status changes

pub fn unpublished_entry_status_change_request(
    collection: &str,
    slug: &str,
    old_status: WorkflowStatus,
    new_status: WorkflowStatus,
    id: TransactionId,
) -> Action {
    Action::new(Payload::StatusChangeRequest {
        collection: collection.to_string(),
        slug: slug.to_string(),
        old_status,
        new_status,
    })
    .with_optimist(Optimist::begin(id))
}

pub fn unpublished_entry_status_change_persisted(
    collection: &str,
    slug: &str,
    old_status: WorkflowStatus,
    new_status: WorkflowStatus,
    id: TransactionId,
) -> Action {
    Action::new(Payload::StatusChangeSuccess {
        collection: collection.to_string(),
        slug: slug.to_string(),
        old_status,
        new_status,
    })
    .with_optimist(Optimist::commit(id))
}

pub fn unpublished_entry_status_change_error(collection: &str, slug: &str, id: TransactionId) -> Action {
    Action::new(Payload::StatusChangeFailure {
        collection: collection.to_string(),
        slug: slug.to_string(),
    })
    .with_optimist(Optimist::revert(id))
}

// Publishing and deleting share these: both take the entry out of the workflow.

pub fn unpublished_entry_publish_request(collection: &str, slug: &str, id: TransactionId) -> Action {
    Action::new(Payload::PublishRequest {
        collection: collection.to_string(),
        slug: slug.to_string(),
    })
    .with_optimist(Optimist::begin(id))
}

pub fn unpublished_entry_published(collection: &str, slug: &str, id: TransactionId) -> Action {
    Action::new(Payload::PublishSuccess {
        collection: collection.to_string(),
        slug: slug.to_string(),
    })
    .with_optimist(Optimist::commit(id))
}

pub fn unpublished_entry_publish_error(collection: &str, slug: &str, id: TransactionId) -> Action {
    Action::new(Payload::PublishFailure {
        collection: collection.to_string(),
        slug: slug.to_string(),
    })
    .with_optimist(Optimist::revert(id))
}

// Published entries

pub fn entry_loading(collection: &str, slug: &str) -> Action {
    Payload::EntryRequest {
        collection: collection.to_string(),
        slug: slug.to_string(),
    }
    .into()
}

pub fn entry_loaded(collection: &str, entry: Entry) -> Action {
    Payload::EntrySuccess {
        collection: collection.to_string(),
        entry,
    }
    .into()
}

pub fn entry_load_error(error: &BackendError, collection: &str, slug: &str) -> Action {
    Action::new(Payload::EntryFailure {
        collection: collection.to_string(),
        slug: slug.to_string(),
        error: error.to_string(),
    })
    .with_error(error.to_string())
}

// Notifications

pub fn notif_send(notification: Notification) -> Action {
    Payload::NotifSend(notification).into()
}

pub fn notif_dismiss(id: Uuid) -> Action {
    Payload::NotifDismiss { id }.into()
}

// Authentication

pub fn authenticating() -> Action {
    Payload::AuthRequest.into()
}

pub fn authenticate(user: User) -> Action {
    Payload::AuthSuccess(user).into()
}

pub fn auth_error(error: impl Into<String>) -> Action {
    let error = error.into();
    Action::new(Payload::AuthFailure { error: error.clone() }).with_error(error)
}

pub fn done_authenticating() -> Action {
    Payload::AuthRequestDone.into()
}

pub fn show_auth_popup() -> Action {
    Payload::ShowAuthPopup.into()
}

pub fn logout() -> Action {
    Payload::Logout.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_change_wire_format() {
        let id = TransactionId::generate();
        let action = unpublished_entry_status_change_request(
            "posts",
            "hello-world",
            WorkflowStatus::Draft,
            WorkflowStatus::Review,
            id,
        );
        let value = serde_json::to_value(&action).unwrap();

        assert_eq!(value["type"], UNPUBLISHED_ENTRY_STATUS_CHANGE_REQUEST);
        assert_eq!(value["payload"]["collection"], "posts");
        assert_eq!(value["payload"]["slug"], "hello-world");
        assert_eq!(value["payload"]["oldStatus"], "draft");
        assert_eq!(value["payload"]["newStatus"], "review");
        assert_eq!(value["optimist"]["type"], "begin");
        assert_eq!(value["optimist"]["id"], id.to_string());
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_triad_shares_transaction() {
        let id = TransactionId::generate();
        let begin = unpublished_entry_publish_request("posts", "a", id);
        let commit = unpublished_entry_published("posts", "a", id);
        let revert = unpublished_entry_publish_error("posts", "a", id);

        assert!(begin.is_optimistic(OptimistKind::Begin));
        assert!(commit.is_optimistic(OptimistKind::Commit));
        assert!(revert.is_optimistic(OptimistKind::Revert));
        assert_eq!(begin.transaction(), Some(id));
        assert_eq!(commit.transaction(), Some(id));
        assert_eq!(revert.transaction(), Some(id));
    }

    #[test]
    fn test_entries_failure_carries_message_and_error() {
        let action = unpublished_entries_failed(&BackendError::Network("offline".into()));
        assert_eq!(action.kind(), UNPUBLISHED_ENTRIES_FAILURE);
        assert_eq!(action.error.as_deref(), Some("Failed to load entries"));
        assert_eq!(
            action.payload,
            Payload::UnpublishedEntriesFailure {
                error: "offline".to_string()
            }
        );
        assert!(action.optimist.is_none());
    }
}
