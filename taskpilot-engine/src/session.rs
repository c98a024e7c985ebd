use serde::{Deserialize, Serialize};
use taskpilot_core::context::BusinessContext;
use taskpilot_core::proposal::ProposalError;
use taskpilot_core::types::{ProposedRecord, StatusMessage};

pub const MISSING_CONTENT_KEY: &str = "Please add your Google AI API Key.";
pub const MISSING_BOARD_KEY: &str = "Please enter your monday.com API Key.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationStage {
    Idle,
    Submitting,
}

/// How one generation cycle ended.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    /// Neither text nor image was given; nothing was sent.
    Skipped,
    /// Another generation is still outstanding.
    Busy,
    MissingCredential,
    Proposed(Vec<ProposedRecord>),
    Rejected(ProposalError),
    RelayFailed(String),
}

impl GenerationOutcome {
    pub fn status(&self) -> Option<StatusMessage> {
        match self {
            GenerationOutcome::Skipped => None,
            GenerationOutcome::Busy => Some(StatusMessage::info(
                "A generation request is already in progress.",
            )),
            GenerationOutcome::MissingCredential => Some(StatusMessage::error(MISSING_CONTENT_KEY)),
            GenerationOutcome::Proposed(records) => Some(StatusMessage::success(format!(
                "{} task(s) proposed.",
                records.len()
            ))),
            GenerationOutcome::Rejected(e) => Some(StatusMessage::error(e.to_string())),
            GenerationOutcome::RelayFailed(e) => {
                Some(StatusMessage::error(format!("AI Error: {e}")))
            }
        }
    }
}

/// How one approval ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalOutcome {
    UnknownRecord,
    AlreadyApproving,
    MissingCredential,
    EmptyTitle,
    CreateFailed(String),
    Created { title: String },
    CreatedWithUpdate { title: String },
    UpdateFailed { title: String, error: String },
}

impl ApprovalOutcome {
    /// Once the item exists on the board the record leaves the pending list,
    /// whether or not the description made it.
    pub fn removes_record(&self) -> bool {
        matches!(
            self,
            ApprovalOutcome::Created { .. }
                | ApprovalOutcome::CreatedWithUpdate { .. }
                | ApprovalOutcome::UpdateFailed { .. }
        )
    }

    pub fn status(&self) -> StatusMessage {
        match self {
            ApprovalOutcome::UnknownRecord => StatusMessage::error("That task is no longer pending."),
            ApprovalOutcome::AlreadyApproving => {
                StatusMessage::info("That task is already being approved.")
            }
            ApprovalOutcome::MissingCredential => StatusMessage::error(MISSING_BOARD_KEY),
            ApprovalOutcome::EmptyTitle => StatusMessage::error("Task title cannot be empty."),
            ApprovalOutcome::CreateFailed(e) => {
                StatusMessage::error(format!("Failed to create task. {e}"))
            }
            ApprovalOutcome::Created { title } => {
                StatusMessage::success(format!("Task \"{title}\" created!"))
            }
            ApprovalOutcome::CreatedWithUpdate { title } => {
                StatusMessage::success(format!("Task \"{title}\" created with update!"))
            }
            ApprovalOutcome::UpdateFailed { error, .. } => StatusMessage::error(format!(
                "Task created, but failed to add update: {error}"
            )),
        }
    }
}

/// How one context sync ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    MissingCredential,
    Synced(BusinessContext),
    Failed(String),
    Malformed,
}

impl SyncOutcome {
    pub fn status(&self) -> StatusMessage {
        match self {
            SyncOutcome::MissingCredential => StatusMessage::error(MISSING_BOARD_KEY),
            SyncOutcome::Synced(_) => StatusMessage::success("Companies loaded successfully!"),
            SyncOutcome::Failed(e) => {
                StatusMessage::error(format!("Failed to sync companies: {e}"))
            }
            SyncOutcome::Malformed => StatusMessage::error("Error processing companies."),
        }
    }
}
