use crate::session::{ApprovalOutcome, GenerationOutcome, GenerationStage, SyncOutcome};
use serde::{Deserialize, Serialize};
use taskpilot_core::context::BusinessContext;
use taskpilot_core::types::{ProposedRecord, RecordId, RecordPatch, StatusMessage};

#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Credentials {
    pub content_api_key: String,
    pub board_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mark = |s: &str| if s.is_empty() { "<unset>" } else { "[REDACTED]" };
        f.debug_struct("Credentials")
            .field("content_api_key", &mark(&self.content_api_key))
            .field("board_api_key", &mark(&self.board_api_key))
            .finish()
    }
}

impl Credentials {
    pub fn content_key(&self) -> Option<&str> {
        Some(self.content_api_key.as_str()).filter(|s| !s.trim().is_empty())
    }

    pub fn board_key(&self) -> Option<&str> {
        Some(self.board_api_key.as_str()).filter(|s| !s.trim().is_empty())
    }
}

/// Everything the popup shows. Only changed through [`reduce`].
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub credentials: Credentials,
    pub pending: Vec<ProposedRecord>,
    pub context: BusinessContext,
    pub last_sync_unix_ms: Option<i64>,
    pub generation: GenerationStage,
    pub syncing: bool,
    pub approving: Vec<RecordId>,
    pub status: Option<StatusMessage>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            pending: vec![],
            context: BusinessContext::default(),
            last_sync_unix_ms: None,
            generation: GenerationStage::Idle,
            syncing: false,
            approving: vec![],
            status: None,
        }
    }
}

impl AppState {
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn is_generating(&self) -> bool {
        self.generation == GenerationStage::Submitting
    }

    pub fn can_start_generation(&self) -> bool {
        !self.is_generating()
    }

    pub fn record(&self, id: &RecordId) -> Option<&ProposedRecord> {
        self.pending.iter().find(|r| &r.id == id)
    }

    pub fn is_approving(&self, id: &RecordId) -> bool {
        self.approving.contains(id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StateEvent {
    CredentialsChanged(Credentials),
    SettingsSaved,
    GenerationStarted,
    GenerationFinished(GenerationOutcome),
    RecordEdited { id: RecordId, patch: RecordPatch },
    RecordDiscarded(RecordId),
    ApprovalStarted(RecordId),
    ApprovalFinished { id: RecordId, outcome: ApprovalOutcome },
    SyncStarted,
    SyncFinished { outcome: SyncOutcome, at_unix_ms: i64 },
    BackgroundSyncFinished { outcome: SyncOutcome, at_unix_ms: i64 },
    StatusCleared,
}

pub fn reduce(mut state: AppState, event: StateEvent) -> AppState {
    match event {
        StateEvent::CredentialsChanged(credentials) => {
            state.credentials = credentials;
        }
        StateEvent::SettingsSaved => {
            state.status = Some(StatusMessage::success("Settings saved!"));
        }
        StateEvent::GenerationStarted => {
            state.generation = GenerationStage::Submitting;
            state.pending.clear();
            state.status = None;
        }
        StateEvent::GenerationFinished(outcome) => {
            // Busy is reported by a second caller; the first request is still running.
            if outcome != GenerationOutcome::Busy {
                state.generation = GenerationStage::Idle;
            }
            if let Some(status) = outcome.status() {
                state.status = Some(status);
            }
            if let GenerationOutcome::Proposed(records) = outcome {
                state.pending = records;
            }
        }
        StateEvent::RecordEdited { id, patch } => {
            if let Some(record) = state.pending.iter_mut().find(|r| r.id == id) {
                patch.apply(record);
            }
        }
        StateEvent::RecordDiscarded(id) => {
            state.pending.retain(|r| r.id != id);
        }
        StateEvent::ApprovalStarted(id) => {
            if let Some(title) = state.record(&id).map(|r| r.title.clone()) {
                state.status = Some(StatusMessage::info(format!("Approving \"{title}\"...")));
            }
            if !state.approving.contains(&id) {
                state.approving.push(id);
            }
        }
        StateEvent::ApprovalFinished { id, outcome } => {
            // A duplicate request must not clear the marker of the approval still running.
            if outcome != ApprovalOutcome::AlreadyApproving {
                state.approving.retain(|a| a != &id);
            }
            if outcome.removes_record() {
                state.pending.retain(|r| r.id != id);
            }
            state.status = Some(outcome.status());
        }
        StateEvent::SyncStarted => {
            state.syncing = true;
            state.status = None;
        }
        StateEvent::SyncFinished {
            outcome,
            at_unix_ms,
        } => {
            state.syncing = false;
            state.status = Some(outcome.status());
            match outcome {
                SyncOutcome::Synced(ctx) => {
                    state.context = ctx;
                    state.last_sync_unix_ms = Some(at_unix_ms);
                }
                SyncOutcome::Failed(_) | SyncOutcome::Malformed => {
                    state.context = BusinessContext::default();
                }
                SyncOutcome::MissingCredential => {}
            }
        }
        StateEvent::BackgroundSyncFinished {
            outcome,
            at_unix_ms,
        } => {
            // Background refreshes never touch the status line; failures keep the last snapshot.
            if let SyncOutcome::Synced(ctx) = outcome {
                state.context = ctx;
                state.last_sync_unix_ms = Some(at_unix_ms);
            }
        }
        StateEvent::StatusCleared => {
            state.status = None;
        }
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskpilot_core::context::Company;
    use taskpilot_core::types::StatusKind;

    fn with_pending(records: Vec<ProposedRecord>) -> AppState {
        let state = reduce(AppState::default(), StateEvent::GenerationStarted);
        reduce(
            state,
            StateEvent::GenerationFinished(GenerationOutcome::Proposed(records)),
        )
    }

    #[test]
    fn generation_cycle_returns_to_idle() {
        let state = reduce(AppState::default(), StateEvent::GenerationStarted);
        assert!(state.is_generating());
        assert!(!state.can_start_generation());

        let state = reduce(
            state,
            StateEvent::GenerationFinished(GenerationOutcome::RelayFailed("down".into())),
        );
        assert!(!state.is_generating());
        assert_eq!(state.status.unwrap().text, "AI Error: down");
    }

    #[test]
    fn busy_does_not_end_outstanding_generation() {
        let state = reduce(AppState::default(), StateEvent::GenerationStarted);
        let state = reduce(state, StateEvent::GenerationFinished(GenerationOutcome::Busy));
        assert!(state.is_generating());
    }

    #[test]
    fn new_generation_clears_old_proposals() {
        let state = with_pending(vec![ProposedRecord::new("old")]);
        assert_eq!(state.pending.len(), 1);

        let state = reduce(state, StateEvent::GenerationStarted);
        assert!(state.pending.is_empty());
    }

    #[test]
    fn back_to_back_approvals_remove_only_their_own_record() {
        let a = ProposedRecord::new("A");
        let b = ProposedRecord::new("B");
        let c = ProposedRecord::new("C");
        let state = with_pending(vec![a.clone(), b.clone(), c.clone()]);

        let state = reduce(state, StateEvent::ApprovalStarted(a.id.clone()));
        let state = reduce(state, StateEvent::ApprovalStarted(b.id.clone()));
        assert!(state.is_approving(&a.id) && state.is_approving(&b.id));

        let state = reduce(
            state,
            StateEvent::ApprovalFinished {
                id: b.id.clone(),
                outcome: ApprovalOutcome::Created { title: "B".into() },
            },
        );
        let state = reduce(
            state,
            StateEvent::ApprovalFinished {
                id: a.id.clone(),
                outcome: ApprovalOutcome::UpdateFailed {
                    title: "A".into(),
                    error: "nope".into(),
                },
            },
        );

        assert_eq!(state.pending, vec![c]);
        assert!(state.approving.is_empty());
    }

    #[test]
    fn failed_create_keeps_record_pending() {
        let a = ProposedRecord::new("A");
        let state = with_pending(vec![a.clone()]);
        let state = reduce(
            state,
            StateEvent::ApprovalFinished {
                id: a.id.clone(),
                outcome: ApprovalOutcome::CreateFailed("bad".into()),
            },
        );
        assert_eq!(state.pending.len(), 1);
        assert_eq!(state.status.unwrap().kind, StatusKind::Error);
    }

    #[test]
    fn edit_and_discard_act_by_id() {
        let a = ProposedRecord::new("A");
        let b = ProposedRecord::new("B");
        let state = with_pending(vec![a.clone(), b.clone()]);

        let state = reduce(
            state,
            StateEvent::RecordEdited {
                id: a.id.clone(),
                patch: RecordPatch {
                    title: Some("A2".into()),
                    ..Default::default()
                },
            },
        );
        assert_eq!(state.record(&a.id).unwrap().title, "A2");

        let state = reduce(state, StateEvent::RecordDiscarded(a.id.clone()));
        assert_eq!(state.pending, vec![b]);
    }

    #[test]
    fn manual_sync_failure_clears_context() {
        let ctx = BusinessContext::with_companies(vec![Company::new("Acme", "AC")]);
        let state = reduce(AppState::default(), StateEvent::SyncStarted);
        let state = reduce(
            state,
            StateEvent::SyncFinished {
                outcome: SyncOutcome::Synced(ctx.clone()),
                at_unix_ms: 10,
            },
        );
        assert_eq!(state.context, ctx);
        assert_eq!(state.last_sync_unix_ms, Some(10));
        assert!(!state.syncing);

        let state = reduce(
            state,
            StateEvent::SyncFinished {
                outcome: SyncOutcome::Failed("down".into()),
                at_unix_ms: 20,
            },
        );
        assert!(state.context.is_empty());
        assert_eq!(state.last_sync_unix_ms, Some(10));
        assert_eq!(state.status.unwrap().text, "Failed to sync companies: down");
    }

    #[test]
    fn background_sync_failure_is_silent() {
        let ctx = BusinessContext::with_companies(vec![Company::new("Acme", "AC")]);
        let state = reduce(
            AppState::default(),
            StateEvent::BackgroundSyncFinished {
                outcome: SyncOutcome::Synced(ctx.clone()),
                at_unix_ms: 1,
            },
        );
        let state = reduce(
            state,
            StateEvent::BackgroundSyncFinished {
                outcome: SyncOutcome::Failed("down".into()),
                at_unix_ms: 2,
            },
        );

        assert_eq!(state.context, ctx);
        assert_eq!(state.last_sync_unix_ms, Some(1));
        assert_eq!(state.status, None);
    }
}
