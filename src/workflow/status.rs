use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Position of an unpublished entry in the editorial workflow.
///
/// Variants are declared in workflow order, so `Ord` follows the board's
/// column order. Only the last status allows publishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WorkflowStatus {
    #[serde(rename = "draft")]
    Draft,
    #[serde(rename = "review", alias = "pending_review")]
    Review,
    #[serde(rename = "ready", alias = "pending_publish")]
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown workflow status '{0}' (expected draft, review or ready)")]
pub struct UnknownStatus(pub String);

impl WorkflowStatus {
    pub const ALL: [WorkflowStatus; 3] = [
        WorkflowStatus::Draft,
        WorkflowStatus::Review,
        WorkflowStatus::Ready,
    ];

    /// Status given to entries the first time they are saved.
    pub fn first() -> Self {
        Self::ALL[0]
    }

    /// The status an entry must reach before it can be published.
    pub fn terminal() -> Self {
        Self::ALL[Self::ALL.len() - 1]
    }

    pub fn is_terminal(self) -> bool {
        self == Self::terminal()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowStatus::Draft => "draft",
            WorkflowStatus::Review => "review",
            WorkflowStatus::Ready => "ready",
        }
    }

    /// Column heading shown on the listing board.
    pub fn description(self) -> &'static str {
        match self {
            WorkflowStatus::Draft => "Drafts",
            WorkflowStatus::Review => "In Review",
            WorkflowStatus::Ready => "Ready",
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(WorkflowStatus::Draft),
            "review" | "pending_review" => Ok(WorkflowStatus::Review),
            "ready" | "pending_publish" => Ok(WorkflowStatus::Ready),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}
