//! Draftline: editorial workflow core for a Git-backed CMS.
//!
//! Exposes the workflow, store and view-models for the CLI and tests

pub mod actions;
pub mod auth;
pub mod backend;
pub mod config;
pub mod entries;
pub mod listing;
pub mod media;
pub mod notifications;
pub mod optimist;
pub mod serializers;
pub mod store;
pub mod telemetry;
pub mod ui;
pub mod workflow;

// Re-export key types for easy access
pub use actions::{Action, Payload};
pub use auth::{AuthError, Authenticator, AuthenticationPage, Credentials, User};
pub use backend::{Backend, BackendError, LocalBackend, PersistTarget, TestBackend};
pub use config::{config, DraftlineConfig, PublishMode};
pub use listing::{ListingIntent, UnpublishedListing};
pub use media::{AssetProxy, MediaLibrary};
pub use notifications::{Notification, NotificationKind};
pub use store::{ActionRecorder, AppState, Dispatch, Store};
pub use telemetry::init_telemetry;
pub use workflow::{
    Collection, EditorialWorkflow, Entry, EntryDraft, TransactionId, UnpublishedEntry, WorkflowError,
    WorkflowStatus,
};
