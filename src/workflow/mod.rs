//! Editorial workflow: entry model, reducer and the operations that drive it

pub mod editorial;
pub mod entry;
pub mod errors;
pub mod reducer;
pub mod status;
pub mod transaction;

pub use editorial::EditorialWorkflow;
pub use entry::{Collection, Entry, EntryDraft, EntryKey, EntryMetaData, Field, UnpublishedEntry};
pub use errors::WorkflowError;
pub use reducer::{reduce, EditorialWorkflowState, StatusColumn};
pub use status::{UnknownStatus, WorkflowStatus};
pub use transaction::{Optimist, OptimistKind, TransactionId};
