use serde_json::Value;
use taskpilot_core::config::{AppConfig, BoardSettings, GenerationSettings};
use taskpilot_engine::traits::{Relay, RelayRequest, RelayResult};
use taskpilot_providers::gemini::{GenerateContentConfig, build_generate_content_request};
use taskpilot_providers::monday::{BoardApiConfig, build_graphql_request};
use taskpilot_providers::parse::{first_graphql_error, parse_json_body};
use taskpilot_providers::request::HttpRequest;
use taskpilot_providers::runtime::{build_client, execute};
use thiserror::Error;

/// Why a relay call failed. Only the message crosses the relay boundary.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("{0:#}")]
    Transport(anyhow::Error),
    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Monday API Error: {0}")]
    Application(String),
    #[error("API returned status {status}: {body} (Monday API Error: {message})")]
    StatusWithApplication {
        status: u16,
        body: String,
        message: String,
    },
    #[error("{0:#}")]
    Malformed(anyhow::Error),
}

/// Relay over HTTPS to the content and board APIs.
#[derive(Clone)]
pub struct HttpRelay {
    client: reqwest::Client,
    generation: GenerationSettings,
    board: BoardSettings,
}

impl std::fmt::Debug for HttpRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRelay")
            .field("generation", &self.generation)
            .field("board_api_url", &self.board.api_url)
            .finish()
    }
}

impl HttpRelay {
    pub fn new(cfg: &AppConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_client(&cfg.timeouts)?,
            generation: cfg.generation.clone(),
            board: cfg.board.clone(),
        })
    }

    async fn generate_content(&self, payload: &Value, credential: &str) -> Result<Value, RelayError> {
        let cfg = GenerateContentConfig {
            base_url: self.generation.base_url.clone(),
            model: self.generation.model.clone(),
            api_key: credential.to_string(),
        };
        let req = build_generate_content_request(&cfg, payload);
        self.fetch_json(&req).await
    }

    async fn board_call(
        &self,
        credential: &str,
        query: &str,
        variables: &Value,
    ) -> Result<Value, RelayError> {
        let cfg = BoardApiConfig {
            api_url: self.board.api_url.clone(),
            api_version: self.board.api_version.clone(),
            api_key: credential.to_string(),
        };
        let req = build_graphql_request(&cfg, query, variables);
        let body = match self.fetch_json(&req).await {
            // The raw body is JSON-escaped; surface the decoded message next to it.
            Err(RelayError::Status { status, body }) => {
                let embedded = parse_json_body(&body)
                    .ok()
                    .and_then(|v| first_graphql_error(&v));
                return Err(match embedded {
                    Some(message) => RelayError::StatusWithApplication {
                        status,
                        body,
                        message,
                    },
                    None => RelayError::Status { status, body },
                });
            }
            res => res?,
        };

        // A 200 can still carry application errors.
        if let Some(msg) = first_graphql_error(&body) {
            return Err(RelayError::Application(msg));
        }

        Ok(body.get("data").cloned().unwrap_or(Value::Null))
    }

    async fn fetch_json(&self, req: &HttpRequest) -> Result<Value, RelayError> {
        let resp = execute(&self.client, req)
            .await
            .map_err(RelayError::Transport)?;

        if !resp.is_success() {
            return Err(RelayError::Status {
                status: resp.status,
                body: resp.body,
            });
        }

        parse_json_body(&resp.body).map_err(RelayError::Malformed)
    }
}

#[async_trait::async_trait]
impl Relay for HttpRelay {
    async fn send(&self, request: RelayRequest) -> RelayResult {
        let kind = request.kind();
        let res = match &request {
            RelayRequest::GenerateContent {
                payload,
                credential,
            } => self.generate_content(payload, credential).await,
            RelayRequest::BoardCall {
                credential,
                query,
                variables,
            } => self.board_call(credential, query, variables).await,
        };

        match res {
            Ok(data) => RelayResult::Success(data),
            Err(e) => {
                log::error!("{kind} relay call failed: {e}");
                RelayResult::Failure(e.to_string())
            }
        }
    }
}
