use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use taskpilot_core::prompt::UserInput;
use taskpilot_core::types::{RecordId, RecordPatch};
use taskpilot_engine::engine::TaskEngine;
use taskpilot_engine::session::{ApprovalOutcome, GenerationOutcome, SyncOutcome};
use taskpilot_engine::state::{AppState, Credentials, StateEvent, reduce};
use taskpilot_runtime::config_store::ConfigStore;
use taskpilot_runtime::defaults::{config_path, settings_path};
use taskpilot_runtime::runtime_engine::build_engine_from_config;
use taskpilot_runtime::secrets::{
    CredentialStore, KeyringCredentialStore, load_credentials, save_credentials,
};
use taskpilot_runtime::settings_store::FileCredentialStore;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

fn now_unix_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Everything the popup can do, over one shared [`AppState`].
///
/// Network calls never run while the state lock is held.
#[derive(Clone)]
pub struct AppService {
    engine: TaskEngine,
    credentials: Arc<dyn CredentialStore>,
    state: Arc<Mutex<AppState>>,
}

impl AppService {
    pub fn new(engine: TaskEngine, credentials: Arc<dyn CredentialStore>) -> anyhow::Result<Self> {
        let creds = load_credentials(credentials.as_ref())?;
        Ok(Self {
            engine,
            credentials,
            state: Arc::new(Mutex::new(AppState::default().with_credentials(creds))),
        })
    }

    /// Config and credentials from `dir`; keys go to the OS keyring when asked.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(dir: &Path, use_keyring: bool) -> anyhow::Result<Self> {
        let store = ConfigStore::at_path(config_path(dir));
        let cfg = store.load_or_default()?;
        if !store.path().exists() {
            store.save(&cfg)?;
            log::info!("wrote default config to {}", store.path().display());
        }
        let engine = build_engine_from_config(cfg)?;

        let credentials: Arc<dyn CredentialStore> = if use_keyring {
            Arc::new(KeyringCredentialStore)
        } else {
            Arc::new(FileCredentialStore::at_path(settings_path(dir)))
        };
        Self::new(engine, credentials)
    }

    pub fn context_refresh_period(&self) -> Duration {
        Duration::from_secs(self.engine.config().context_refresh_secs.max(1))
    }

    pub async fn snapshot(&self) -> AppState {
        self.state.lock().await.clone()
    }

    async fn apply(&self, event: StateEvent) -> AppState {
        let mut state = self.state.lock().await;
        let next = reduce(std::mem::take(&mut *state), event);
        *state = next.clone();
        next
    }

    /// Replaces the in-memory keys. Nothing is written until [`Self::save_settings`].
    pub async fn set_credentials(&self, credentials: Credentials) {
        self.apply(StateEvent::CredentialsChanged(credentials)).await;
    }

    /// Persists the keys, then resyncs the context with them.
    pub async fn save_settings(&self) -> anyhow::Result<SyncOutcome> {
        let creds = self.state.lock().await.credentials.clone();
        save_credentials(self.credentials.as_ref(), &creds)?;
        self.apply(StateEvent::SettingsSaved).await;
        log::info!("settings saved");

        Ok(self.sync_context().await)
    }

    /// One generation at a time; a second request while one is outstanding is refused.
    pub async fn generate(&self, input: UserInput) -> GenerationOutcome {
        if input.is_empty() {
            return GenerationOutcome::Skipped;
        }

        let (credential, ctx) = {
            let mut state = self.state.lock().await;

            let refused = if !state.can_start_generation() {
                Some(GenerationOutcome::Busy)
            } else if state.credentials.content_key().is_none() {
                Some(GenerationOutcome::MissingCredential)
            } else {
                None
            };

            if let Some(outcome) = refused {
                *state = reduce(
                    std::mem::take(&mut *state),
                    StateEvent::GenerationFinished(outcome.clone()),
                );
                return outcome;
            }

            *state = reduce(std::mem::take(&mut *state), StateEvent::GenerationStarted);
            (
                state.credentials.content_key().map(str::to_string),
                state.context.clone(),
            )
        };

        let outcome = self
            .engine
            .generate(credential.as_deref(), &ctx, &input)
            .await;
        self.apply(StateEvent::GenerationFinished(outcome.clone()))
            .await;
        outcome
    }

    pub async fn approve(&self, id: &RecordId) -> ApprovalOutcome {
        let (credential, record) = {
            let mut state = self.state.lock().await;

            let refused = match state.record(id) {
                None => Some(ApprovalOutcome::UnknownRecord),
                Some(_) if state.is_approving(id) => Some(ApprovalOutcome::AlreadyApproving),
                Some(_) => None,
            };
            if let Some(outcome) = refused {
                *state = reduce(
                    std::mem::take(&mut *state),
                    StateEvent::ApprovalFinished {
                        id: id.clone(),
                        outcome: outcome.clone(),
                    },
                );
                return outcome;
            }

            let record = state.record(id).cloned();
            *state = reduce(
                std::mem::take(&mut *state),
                StateEvent::ApprovalStarted(id.clone()),
            );
            (state.credentials.board_key().map(str::to_string), record)
        };

        let Some(record) = record else {
            return ApprovalOutcome::UnknownRecord;
        };

        let outcome = self.engine.approve(credential.as_deref(), &record).await;
        self.apply(StateEvent::ApprovalFinished {
            id: id.clone(),
            outcome: outcome.clone(),
        })
        .await;

        if outcome.removes_record() {
            let svc = self.clone();
            tokio::spawn(async move { svc.refresh_context_in_background().await });
        }
        outcome
    }

    pub async fn discard(&self, id: &RecordId) {
        self.apply(StateEvent::RecordDiscarded(id.clone())).await;
    }

    /// Returns false when the record is no longer pending.
    pub async fn edit(&self, id: &RecordId, patch: RecordPatch) -> bool {
        let state = self
            .apply(StateEvent::RecordEdited {
                id: id.clone(),
                patch,
            })
            .await;
        state.record(id).is_some()
    }

    pub async fn clear_status(&self) {
        self.apply(StateEvent::StatusCleared).await;
    }

    /// User-triggered sync: reports its outcome on the status line.
    pub async fn sync_context(&self) -> SyncOutcome {
        let credential = {
            let state = self.state.lock().await;
            state.credentials.board_key().map(str::to_string)
        };

        if credential.is_some() {
            self.apply(StateEvent::SyncStarted).await;
        }

        let outcome = self.engine.sync_context(credential.as_deref()).await;
        self.apply(StateEvent::SyncFinished {
            outcome: outcome.clone(),
            at_unix_ms: now_unix_ms(),
        })
        .await;
        outcome
    }

    /// Best-effort sync: failures are logged, never shown, and the last snapshot stays.
    pub async fn refresh_context_in_background(&self) {
        let credential = {
            let state = self.state.lock().await;
            state.credentials.board_key().map(str::to_string)
        };
        let Some(credential) = credential else {
            log::debug!("skipping context refresh: no board key");
            return;
        };

        let outcome = self.engine.sync_context(Some(&credential)).await;
        if !matches!(outcome, SyncOutcome::Synced(_)) {
            log::warn!("background context refresh failed: {}", outcome.status().text);
        }
        self.apply(StateEvent::BackgroundSyncFinished {
            outcome,
            at_unix_ms: now_unix_ms(),
        })
        .await;
    }

    /// Refreshes the context every `period`, starting one period from now.
    pub fn spawn_context_refresh(&self, period: Duration) -> JoinHandle<()> {
        let svc = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                svc.refresh_context_in_background().await;
            }
        })
    }
}
