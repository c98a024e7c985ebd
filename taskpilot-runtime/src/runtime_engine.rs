use std::sync::Arc;

use taskpilot_core::config::AppConfig;
use taskpilot_engine::engine::TaskEngine;
use taskpilot_engine::traits::Relay;

use crate::background::BackgroundRelay;
use crate::relay::HttpRelay;

/// Build a runnable engine from config: HTTP relay served from a background task.
///
/// Must be called from within a tokio runtime.
pub fn build_engine_from_config(cfg: AppConfig) -> anyhow::Result<TaskEngine> {
    let http: Arc<dyn Relay> = Arc::new(HttpRelay::new(&cfg)?);
    let relay: Arc<dyn Relay> = Arc::new(BackgroundRelay::spawn(http));
    Ok(TaskEngine::new(cfg, relay))
}
