use crate::session::{ApprovalOutcome, GenerationOutcome, SyncOutcome};
use crate::traits::{Relay, RelayRequest, RelayResult};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use taskpilot_core::config::AppConfig;
use taskpilot_core::context::BusinessContext;
use taskpilot_core::prompt::{UserInput, build_task_prompt};
use taskpilot_core::proposal::{ProposalError, parse_task_list};
use taskpilot_core::types::ProposedRecord;
use taskpilot_providers::gemini::build_generate_content_payload;
use taskpilot_providers::monday::{
    CREATE_ITEM_MUTATION, CREATE_UPDATE_MUTATION, companies_query, companies_variables,
    create_item_variables, create_update_variables,
};
use taskpilot_providers::parse::{created_item_id, generated_text, parse_companies};

/// Proposal, approval and sync pipelines over a [`Relay`].
///
/// Holds no state between calls; the caller owns the application state.
#[derive(Clone)]
pub struct TaskEngine {
    cfg: AppConfig,
    relay: Arc<dyn Relay>,
}

impl TaskEngine {
    pub fn new(cfg: AppConfig, relay: Arc<dyn Relay>) -> Self {
        Self { cfg, relay }
    }

    pub fn config(&self) -> &AppConfig {
        &self.cfg
    }

    /// Prompt -> relay -> parse. Either every proposed task comes back or none does.
    pub async fn generate(
        &self,
        credential: Option<&str>,
        ctx: &BusinessContext,
        input: &UserInput,
    ) -> GenerationOutcome {
        if input.is_empty() {
            return GenerationOutcome::Skipped;
        }
        let Some(credential) = credential else {
            return GenerationOutcome::MissingCredential;
        };

        let prompt = build_task_prompt(ctx, input);
        let payload = build_generate_content_payload(&prompt, input);

        let t0 = Instant::now();
        let result = self
            .relay
            .send(RelayRequest::GenerateContent {
                payload,
                credential: credential.to_string(),
            })
            .await;
        log::debug!("generate content finished in {:?}", t0.elapsed());

        let body = match result {
            RelayResult::Success(body) => body,
            RelayResult::Failure(e) => {
                log::warn!("generation failed: {e}");
                return GenerationOutcome::RelayFailed(e);
            }
        };

        let Some(text) = generated_text(&body) else {
            return GenerationOutcome::Rejected(ProposalError::EmptyResponse);
        };

        match parse_task_list(&text) {
            Ok(records) => {
                log::info!("proposed {} task(s)", records.len());
                GenerationOutcome::Proposed(records)
            }
            Err(e) => {
                log::warn!("rejected model answer: {e}");
                GenerationOutcome::Rejected(e)
            }
        }
    }

    /// Creates the item, then attaches the description as an update.
    ///
    /// The two calls are not transactional: a failed update does not undo the item.
    pub async fn approve(
        &self,
        credential: Option<&str>,
        record: &ProposedRecord,
    ) -> ApprovalOutcome {
        let Some(credential) = credential else {
            return ApprovalOutcome::MissingCredential;
        };
        if !record.is_approvable() {
            return ApprovalOutcome::EmptyTitle;
        }

        let variables = create_item_variables(
            self.cfg.board.tasks_board_id,
            &record.title,
            &record.status,
            &record.priority,
        );
        let created = self
            .board_call(credential, CREATE_ITEM_MUTATION, variables)
            .await;

        let item_id = match created {
            RelayResult::Success(data) => match created_item_id(&data) {
                Ok(id) => id,
                // The item exists on the board; a retry would create a duplicate.
                Err(e) => {
                    log::warn!("create_item for {} returned no id: {e:#}", record.id);
                    if !record.has_description() {
                        return ApprovalOutcome::Created {
                            title: record.title.clone(),
                        };
                    }
                    return ApprovalOutcome::UpdateFailed {
                        title: record.title.clone(),
                        error: e.to_string(),
                    };
                }
            },
            RelayResult::Failure(e) => {
                log::warn!("create_item failed for {}: {e}", record.id);
                return ApprovalOutcome::CreateFailed(e);
            }
        };
        log::info!("created board item {item_id} for record {}", record.id);

        if !record.has_description() {
            return ApprovalOutcome::Created {
                title: record.title.clone(),
            };
        }

        let update = self
            .board_call(
                credential,
                CREATE_UPDATE_MUTATION,
                create_update_variables(&item_id, &record.description),
            )
            .await;

        match update {
            RelayResult::Success(_) => ApprovalOutcome::CreatedWithUpdate {
                title: record.title.clone(),
            },
            RelayResult::Failure(error) => {
                log::warn!("create_update failed for item {item_id}: {error}");
                ApprovalOutcome::UpdateFailed {
                    title: record.title.clone(),
                    error,
                }
            }
        }
    }

    /// Reads the companies board into a fresh context snapshot.
    pub async fn sync_context(&self, credential: Option<&str>) -> SyncOutcome {
        let Some(credential) = credential else {
            return SyncOutcome::MissingCredential;
        };

        let board = &self.cfg.board;
        let result = self
            .board_call(
                credential,
                &companies_query(&board.company_code_column),
                companies_variables(board.companies_board_id),
            )
            .await;

        let data = match result {
            RelayResult::Success(data) => data,
            RelayResult::Failure(e) => return SyncOutcome::Failed(e),
        };

        match parse_companies(&data) {
            Ok(companies) => {
                log::info!("synced {} companies", companies.len());
                SyncOutcome::Synced(BusinessContext::with_companies(companies).with_labels(
                    Some(board.status_labels.clone()),
                    Some(board.priority_labels.clone()),
                ))
            }
            Err(e) => {
                log::warn!("unexpected companies payload: {e:#}");
                SyncOutcome::Malformed
            }
        }
    }

    async fn board_call(&self, credential: &str, query: &str, variables: Value) -> RelayResult {
        self.relay
            .send(RelayRequest::BoardCall {
                credential: credential.to_string(),
                query: query.to_string(),
                variables,
            })
            .await
    }
}
