use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One outbound call, immutable once handed to a [`Relay`].
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum RelayRequest {
    GenerateContent {
        payload: Value,
        credential: String,
    },
    BoardCall {
        credential: String,
        query: String,
        variables: Value,
    },
}

impl RelayRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            RelayRequest::GenerateContent { .. } => "GenerateContent",
            RelayRequest::BoardCall { .. } => "BoardCall",
        }
    }
}

impl std::fmt::Debug for RelayRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelayRequest::GenerateContent { payload, .. } => f
                .debug_struct("GenerateContent")
                .field("payload_len", &payload.to_string().len())
                .field("credential", &"[REDACTED]")
                .finish(),
            RelayRequest::BoardCall {
                query, variables, ..
            } => f
                .debug_struct("BoardCall")
                .field("credential", &"[REDACTED]")
                .field("query", query)
                .field("variables", variables)
                .finish(),
        }
    }
}

/// Normalized outcome of a relay call. Serializes as `{success, data}` or `{success, error}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireResult", try_from = "WireResult")]
pub enum RelayResult {
    Success(Value),
    Failure(String),
}

impl RelayResult {
    pub fn failure(error: impl Into<String>) -> Self {
        RelayResult::Failure(error.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RelayResult::Success(_))
    }
}

#[derive(Serialize, Deserialize)]
struct WireResult {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<RelayResult> for WireResult {
    fn from(r: RelayResult) -> Self {
        match r {
            RelayResult::Success(data) => WireResult {
                success: true,
                data: Some(data),
                error: None,
            },
            RelayResult::Failure(error) => WireResult {
                success: false,
                data: None,
                error: Some(error),
            },
        }
    }
}

impl TryFrom<WireResult> for RelayResult {
    type Error = String;

    fn try_from(w: WireResult) -> Result<Self, Self::Error> {
        match (w.success, w.data, w.error) {
            (true, data, None) => Ok(RelayResult::Success(data.unwrap_or(Value::Null))),
            (false, None, Some(error)) => Ok(RelayResult::Failure(error)),
            _ => Err("relay result must carry exactly one of data or error".into()),
        }
    }
}

/// Performs one outbound call per request and always resolves, exactly once.
#[async_trait]
pub trait Relay: Send + Sync {
    async fn send(&self, request: RelayRequest) -> RelayResult;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_wire_shape() {
        let s = serde_json::to_value(RelayResult::Success(json!({"a": 1}))).unwrap();
        assert_eq!(s, json!({"success": true, "data": {"a": 1}}));
    }

    #[test]
    fn failure_wire_shape() {
        let s = serde_json::to_value(RelayResult::failure("boom")).unwrap();
        assert_eq!(s, json!({"success": false, "error": "boom"}));
    }

    #[test]
    fn rejects_mixed_shapes() {
        let mixed = json!({"success": true, "data": 1, "error": "x"});
        assert!(serde_json::from_value::<RelayResult>(mixed).is_err());

        let parsed: RelayResult =
            serde_json::from_value(json!({"success": false, "error": "x"})).unwrap();
        assert_eq!(parsed, RelayResult::failure("x"));
    }

    #[test]
    fn request_debug_hides_credential() {
        let req = RelayRequest::BoardCall {
            credential: "tok-secret".into(),
            query: "query { me { id } }".into(),
            variables: json!({}),
        };
        let s = format!("{req:?}");
        assert!(!s.contains("tok-secret"));
        assert!(s.contains("me { id }"));
        assert_eq!(req.kind(), "BoardCall");
    }

    #[test]
    fn request_is_tagged_by_kind() {
        let req = RelayRequest::GenerateContent {
            payload: json!({}),
            credential: "k".into(),
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["kind"], "GenerateContent");
    }
}
