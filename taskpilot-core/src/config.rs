use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub base_url: String,
    pub model: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".into(),
            model: "gemini-1.5-flash-latest".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSettings {
    pub api_url: String,
    pub api_version: String,
    pub companies_board_id: u64,
    pub tasks_board_id: u64,
    pub company_code_column: String,

    // Optional label sets passed to the prompt; the board itself is the authority.
    #[serde(default)]
    pub status_labels: Vec<String>,
    #[serde(default)]
    pub priority_labels: Vec<String>,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.monday.com/v2".into(),
            api_version: "2023-10".into(),
            companies_board_id: 8_123_809_226,
            tasks_board_id: 8_575_873_550,
            company_code_column: "text_mkkk3hmx".into(),
            status_labels: vec![],
            priority_labels: vec![],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpTimeouts {
    pub connect_secs: u64,
    pub request_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            request_secs: 60,
        }
    }
}

impl HttpTimeouts {
    /// Zero would fail every call at once, so both are at least one second.
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs.max(1))
    }

    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub generation: GenerationSettings,
    #[serde(default)]
    pub board: BoardSettings,
    #[serde(default)]
    pub timeouts: HttpTimeouts,
    #[serde(default = "default_refresh_interval_secs")]
    pub context_refresh_secs: u64,
}

fn default_refresh_interval_secs() -> u64 {
    300
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            generation: GenerationSettings::default(),
            board: BoardSettings::default(),
            timeouts: HttpTimeouts::default(),
            context_refresh_secs: default_refresh_interval_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let cfg: AppConfig =
            serde_json::from_str(r#"{"board":{"api_url":"http://localhost","api_version":"2024-01","companies_board_id":1,"tasks_board_id":2,"company_code_column":"code"}}"#)
                .unwrap();
        assert_eq!(cfg.board.tasks_board_id, 2);
        assert!(cfg.board.status_labels.is_empty());
        assert_eq!(cfg.generation.model, "gemini-1.5-flash-latest");
        assert_eq!(cfg.context_refresh_secs, 300);
    }

    #[test]
    fn zero_timeouts_are_clamped() {
        let cfg: AppConfig =
            serde_json::from_str(r#"{"timeouts":{"connect_secs":0,"request_secs":0}}"#).unwrap();
        assert_eq!(cfg.timeouts.connect(), Duration::from_secs(1));
        assert_eq!(cfg.timeouts.request(), Duration::from_secs(1));
        assert_eq!(HttpTimeouts::default().request(), Duration::from_secs(60));
    }
}
