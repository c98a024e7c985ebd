use crate::request::HttpRequest;
use base64::Engine as _;
use serde_json::{Value, json};
use taskpilot_core::prompt::UserInput;

#[derive(Clone, PartialEq, Eq)]
pub struct GenerateContentConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
}

impl std::fmt::Debug for GenerateContentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerateContentConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Request body for `generateContent`: the prompt, then the raw request text and image.
pub fn build_generate_content_payload(prompt: &str, input: &UserInput) -> Value {
    let mut parts = vec![json!({ "text": prompt })];

    if let Some(text) = input.text_content() {
        parts.push(json!({ "text": format!("User Request Text: \"{text}\"") }));
    }
    if let Some(image) = &input.image {
        parts.push(json!({ "text": "User Request Image:" }));
        parts.push(json!({
            "inlineData": {
                "mimeType": image.mime_type,
                "data": base64::engine::general_purpose::STANDARD.encode(&image.bytes),
            }
        }));
    }

    json!({
        "contents": [{ "role": "user", "parts": parts }],
        "generationConfig": { "responseMimeType": "application/json" },
    })
}

pub fn build_generate_content_request(cfg: &GenerateContentConfig, payload: &Value) -> HttpRequest {
    let key: String = url::form_urlencoded::byte_serialize(cfg.api_key.as_bytes()).collect();
    let url = format!(
        "{}/v1beta/models/{}:generateContent?key={}",
        cfg.base_url.trim_end_matches('/'),
        cfg.model,
        key
    );

    HttpRequest::post_json(url, payload.to_string())
}
