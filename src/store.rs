//! Application store: root state behind the optimistic layer

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::actions::{Action, Payload};
use crate::auth::{self, AuthState};
use crate::entries::{self, EntriesState};
use crate::notifications::{self, Notification, NotificationsState};
use crate::optimist::OptimisticLayer;
use crate::workflow::{self, EditorialWorkflowState};

/// Sink the workflow operations report their progress into.
pub trait Dispatch: Send + Sync {
    fn dispatch(&self, action: Action);
}

impl<D: Dispatch + ?Sized> Dispatch for Arc<D> {
    fn dispatch(&self, action: Action) {
        (**self).dispatch(action)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub editorial_workflow: EditorialWorkflowState,
    pub entries: EntriesState,
    pub auth: AuthState,
    pub notifications: NotificationsState,
}

pub fn reduce(state: &mut AppState, action: &Action) {
    workflow::reduce(&mut state.editorial_workflow, action);
    entries::reduce(&mut state.entries, action);
    auth::reduce(&mut state.auth, action);
    notifications::reduce(&mut state.notifications, action);
}

type RootReducer = fn(&mut AppState, &Action);

/// Shared store. Dispatches are serialized; no lock is held across an await.
#[derive(Debug)]
pub struct Store {
    inner: Mutex<OptimisticLayer<AppState, RootReducer>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(AppState::default())
    }
}

impl Store {
    pub fn new(initial: AppState) -> Self {
        Self {
            inner: Mutex::new(OptimisticLayer::new(initial, reduce as RootReducer)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, OptimisticLayer<AppState, RootReducer>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> AppState {
        self.lock().state().clone()
    }

    /// Number of optimistic transactions still awaiting commit or revert.
    pub fn pending_transactions(&self) -> usize {
        self.lock().pending()
    }
}

impl Dispatch for Store {
    fn dispatch(&self, action: Action) {
        debug!(
            action = action.kind(),
            transaction.id = ?action.transaction(),
            "Dispatching action"
        );
        self.lock().apply(action);
    }
}

/// Dispatch sink that only records what it receives.
#[derive(Debug, Default)]
pub struct ActionRecorder {
    actions: Mutex<Vec<Action>>,
}

impl ActionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Action>> {
        self.actions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn actions(&self) -> Vec<Action> {
        self.lock().clone()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.lock().iter().map(Action::kind).collect()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.lock()
            .iter()
            .filter_map(|action| match &action.payload {
                Payload::NotifSend(notification) => Some(notification.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl Dispatch for ActionRecorder {
    fn dispatch(&self, action: Action) {
        self.lock().push(action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions;
    use crate::backend::Pagination;
    use crate::notifications::NotificationKind;
    use crate::workflow::{TransactionId, UnpublishedEntry, WorkflowStatus};
    use chrono::Utc;
    use serde_json::json;
    use std::time::Duration;

    fn entry(slug: &str, status: WorkflowStatus) -> UnpublishedEntry {
        UnpublishedEntry::new("posts", slug, json!({"title": slug}), status, "alice", Utc::now())
    }

    #[test]
    fn test_revert_restores_status_and_keeps_notification() {
        let store = Store::default();
        store.dispatch(actions::unpublished_entries_loaded(
            vec![entry("a", WorkflowStatus::Draft)],
            Pagination::default(),
        ));

        let id = TransactionId::generate();
        store.dispatch(actions::unpublished_entry_status_change_request(
            "posts",
            "a",
            WorkflowStatus::Draft,
            WorkflowStatus::Review,
            id,
        ));
        assert_eq!(
            store.state().editorial_workflow.entry("posts", "a").unwrap().status(),
            WorkflowStatus::Review
        );
        assert_eq!(store.pending_transactions(), 1);

        store.dispatch(actions::notif_send(Notification::new(
            "unrelated",
            NotificationKind::Info,
            Duration::from_secs(1),
        )));
        store.dispatch(actions::unpublished_entry_status_change_error("posts", "a", id));

        let state = store.state();
        let reverted = state.editorial_workflow.entry("posts", "a").unwrap();
        assert_eq!(reverted.status(), WorkflowStatus::Draft);
        assert!(!reverted.is_updating_status);
        assert_eq!(state.notifications.items.len(), 1);
        assert_eq!(store.pending_transactions(), 0);
    }

    #[test]
    fn test_recorder_collects_kinds_in_order() {
        let recorder = ActionRecorder::new();
        recorder.dispatch(actions::unpublished_entries_loading());
        recorder.dispatch(actions::logout());
        assert_eq!(
            recorder.kinds(),
            vec![actions::UNPUBLISHED_ENTRIES_REQUEST, actions::LOGOUT]
        );
        recorder.clear();
        assert!(recorder.is_empty());
    }
}
