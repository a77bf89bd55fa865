//! Operations that drive the editorial workflow.
//!
//! Each operation dispatches a request action carrying an optimistic `begin`
//! marker, calls the backend, then dispatches either the matching `commit`
//! or `revert` under the same transaction id. User-facing failures also
//! produce a notification, sent before the revert.

use std::sync::Arc;
use tracing::{debug, error, info, warn, Instrument};

use crate::actions;
use crate::backend::{Backend, BackendError, PersistRequest, PersistTarget};
use crate::config::DraftlineConfig;
use crate::entries;
use crate::media::MediaLibrary;
use crate::notifications::{Notification, NotificationKind};
use crate::serializers::SerializerRegistry;
use crate::store::Dispatch;
use crate::telemetry::{create_workflow_span, OperationTimer};

use super::entry::{Collection, EntryDraft};
use super::errors::WorkflowError;
use super::status::WorkflowStatus;
use super::transaction::TransactionId;

#[derive(Clone)]
pub struct EditorialWorkflow {
    backend: Arc<dyn Backend>,
    config: Arc<DraftlineConfig>,
    serializers: Arc<SerializerRegistry>,
}

impl std::fmt::Debug for EditorialWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorialWorkflow")
            .field("backend", &self.backend.name())
            .field("publish_mode", &self.config.publish_mode)
            .field("serializers", &self.serializers)
            .finish()
    }
}

impl EditorialWorkflow {
    pub fn new(backend: Arc<dyn Backend>, config: Arc<DraftlineConfig>) -> Self {
        Self {
            backend,
            config,
            serializers: Arc::new(SerializerRegistry::new()),
        }
    }

    pub fn with_serializers(mut self, serializers: SerializerRegistry) -> Self {
        self.serializers = Arc::new(serializers);
        self
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn config(&self) -> &DraftlineConfig {
        &self.config
    }

    fn danger(&self, message: String) -> actions::Action {
        actions::notif_send(Notification::new(
            message,
            NotificationKind::Danger,
            self.config.notifications.danger_dismiss(),
        ))
    }

    /// Load one unpublished entry, falling back to the published entry when
    /// the backend reports it is not under the editorial workflow.
    pub async fn load_unpublished_entry(&self, dispatch: &dyn Dispatch, collection: &Collection, slug: &str) {
        let span = create_workflow_span("load_unpublished_entry", Some(&collection.name), Some(slug), None);
        async {
            dispatch.dispatch(actions::unpublished_entry_loading(&collection.name, slug));
            match self.backend.unpublished_entry(collection, slug).await {
                Ok(entry) => {
                    debug!(status = %entry.status(), "Unpublished entry loaded");
                    dispatch.dispatch(actions::unpublished_entry_loaded(&collection.name, entry));
                }
                Err(err) if err.is_not_under_editorial_workflow() => {
                    info!("Entry is not under editorial workflow, loading published entry");
                    dispatch.dispatch(actions::unpublished_entry_redirected(&collection.name, slug));
                    entries::load_entry(
                        self.backend.as_ref(),
                        dispatch,
                        &self.config.notifications,
                        collection,
                        slug,
                    )
                    .await;
                }
                Err(err) => {
                    warn!(error = %err, "Failed to load unpublished entry");
                    dispatch.dispatch(self.danger(format!("Error loading entry: {err}")));
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Load the board. Does nothing unless the editorial workflow is enabled.
    pub async fn load_unpublished_entries(&self, dispatch: &dyn Dispatch, collections: &[Collection]) {
        if !self.config.is_editorial_workflow() {
            debug!("Editorial workflow disabled, skipping unpublished entries");
            return;
        }

        let span = create_workflow_span("load_unpublished_entries", None, None, None);
        async {
            dispatch.dispatch(actions::unpublished_entries_loading());
            let timer = OperationTimer::new("unpublished_entries");
            match self.backend.unpublished_entries(collections).await {
                Ok(response) => {
                    timer.finish(true);
                    info!(count = response.entries.len(), "Unpublished entries loaded");
                    dispatch.dispatch(actions::unpublished_entries_loaded(
                        response.entries,
                        response.pagination,
                    ));
                }
                Err(err) => {
                    timer.finish(false);
                    error!(error = %err, "Failed to load unpublished entries");
                    dispatch.dispatch(actions::unpublished_entries_failed(&err));
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Save a draft. Rejected before anything is dispatched when the draft
    /// has field errors. On backend failure the error is also returned so
    /// the caller can keep the editor open.
    pub async fn persist_unpublished_entry(
        &self,
        dispatch: &dyn Dispatch,
        collection: &Collection,
        draft: &EntryDraft,
        media: &MediaLibrary,
        target: PersistTarget,
    ) -> Result<(), WorkflowError> {
        if draft.has_errors() {
            let fields = draft
                .fields_errors
                .iter()
                .filter(|(_, errors)| !errors.is_empty())
                .map(|(field, _)| field.clone())
                .collect();
            return Err(WorkflowError::Validation { fields });
        }
        let entry = draft.entry.as_ref().ok_or(WorkflowError::EmptyDraft)?;

        let transaction_id = TransactionId::generate();
        let span = create_workflow_span(
            "persist_unpublished_entry",
            Some(&collection.name),
            Some(&entry.slug),
            Some(transaction_id),
        );

        async {
            let assets = media.resolve(&draft.media_files);

            let mut serialized_entry = entry.clone();
            serialized_entry.data = self.serializers.serialize_values(&entry.data, &collection.fields);
            let serialized_draft = EntryDraft {
                entry: Some(serialized_entry.clone()),
                ..draft.clone()
            };

            dispatch.dispatch(actions::unpublished_entry_persisting(
                &collection.name,
                serialized_entry.clone(),
                transaction_id,
            ));

            let request = PersistRequest {
                config: &self.config,
                collection,
                draft: &serialized_draft,
                assets: &assets,
                integrations: &self.config.integrations,
            };
            let timer = OperationTimer::new("persist_entry");
            let result = match target {
                PersistTarget::ExistingUnpublished => self.backend.persist_unpublished_entry(request).await,
                PersistTarget::NewEntry => self.backend.persist_entry(request).await,
            };
            timer.finish(result.is_ok());

            match result {
                Ok(()) => {
                    info!(assets = assets.len(), ?target, "Entry saved");
                    dispatch.dispatch(actions::notif_send(Notification::new(
                        "Entry saved",
                        NotificationKind::Success,
                        self.config.notifications.success_dismiss(),
                    )));
                    dispatch.dispatch(actions::unpublished_entry_persisted(
                        &collection.name,
                        serialized_entry,
                        transaction_id,
                    ));
                    Ok(())
                }
                Err(err) => {
                    error!(error = %err, ?target, "Failed to persist entry");
                    dispatch.dispatch(self.danger(format!("Failed to persist entry: {err}")));
                    dispatch.dispatch(actions::unpublished_entry_persisted_fail(&err, transaction_id));
                    Err(WorkflowError::Persist(err))
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Move an entry between workflow statuses. Failures only revert.
    pub async fn update_unpublished_entry_status(
        &self,
        dispatch: &dyn Dispatch,
        collection: &str,
        slug: &str,
        old_status: WorkflowStatus,
        new_status: WorkflowStatus,
    ) {
        let transaction_id = TransactionId::generate();
        let span = create_workflow_span(
            "update_unpublished_entry_status",
            Some(collection),
            Some(slug),
            Some(transaction_id),
        );
        async {
            dispatch.dispatch(actions::unpublished_entry_status_change_request(
                collection,
                slug,
                old_status,
                new_status,
                transaction_id,
            ));
            match self
                .backend
                .update_unpublished_entry_status(collection, slug, new_status)
                .await
            {
                Ok(()) => {
                    info!(%old_status, %new_status, "Entry status updated");
                    dispatch.dispatch(actions::unpublished_entry_status_change_persisted(
                        collection,
                        slug,
                        old_status,
                        new_status,
                        transaction_id,
                    ));
                }
                Err(err) => {
                    warn!(error = %err, %old_status, %new_status, "Failed to update entry status");
                    dispatch.dispatch(actions::unpublished_entry_status_change_error(
                        collection,
                        slug,
                        transaction_id,
                    ));
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Discard an unpublished entry (close its pull request).
    pub async fn delete_unpublished_entry(&self, dispatch: &dyn Dispatch, collection: &str, slug: &str) {
        self.remove_from_workflow(dispatch, collection, slug, Removal::Delete)
            .await
    }

    /// Merge an unpublished entry into the published content.
    pub async fn publish_unpublished_entry(&self, dispatch: &dyn Dispatch, collection: &str, slug: &str) {
        self.remove_from_workflow(dispatch, collection, slug, Removal::Publish)
            .await
    }

    async fn remove_from_workflow(&self, dispatch: &dyn Dispatch, collection: &str, slug: &str, removal: Removal) {
        let transaction_id = TransactionId::generate();
        let span = create_workflow_span(removal.operation(), Some(collection), Some(slug), Some(transaction_id));
        async {
            dispatch.dispatch(actions::unpublished_entry_publish_request(collection, slug, transaction_id));
            let result = match removal {
                Removal::Delete => self.backend.delete_unpublished_entry(collection, slug).await,
                Removal::Publish => self.backend.publish_unpublished_entry(collection, slug).await,
            };
            match result {
                Ok(()) => {
                    info!("{}", removal.success_log());
                    dispatch.dispatch(actions::unpublished_entry_published(collection, slug, transaction_id));
                }
                Err(err) => {
                    error!(error = %err, "{}", removal.failure_log());
                    dispatch.dispatch(self.danger(removal.failure_message(&err)));
                    dispatch.dispatch(actions::unpublished_entry_publish_error(collection, slug, transaction_id));
                }
            }
        }
        .instrument(span)
        .await
    }
}

#[derive(Debug, Clone, Copy)]
enum Removal {
    Delete,
    Publish,
}

impl Removal {
    fn operation(self) -> &'static str {
        match self {
            Removal::Delete => "delete_unpublished_entry",
            Removal::Publish => "publish_unpublished_entry",
        }
    }

    fn success_log(self) -> &'static str {
        match self {
            Removal::Delete => "Unpublished entry deleted",
            Removal::Publish => "Entry published",
        }
    }

    fn failure_log(self) -> &'static str {
        match self {
            Removal::Delete => "Failed to delete unpublished entry",
            Removal::Publish => "Failed to publish entry",
        }
    }

    fn failure_message(self, err: &BackendError) -> String {
        match self {
            Removal::Delete => format!("Failed to close PR: {err}"),
            Removal::Publish => format!("Failed to merge: {err}"),
        }
    }
}
