use crate::request::HttpRequest;
use serde_json::{Value, json};

pub const CREATE_ITEM_MUTATION: &str = "mutation ($item_name: String!, $board_id: ID!, $column_values: JSON) {
    create_item (board_id: $board_id, item_name: $item_name, column_values: $column_values) { id }
}";

pub const CREATE_UPDATE_MUTATION: &str = "mutation ($item_id: ID!, $body: String!) {
    create_update (item_id: $item_id, body: $body) { id }
}";

#[derive(Clone, PartialEq, Eq)]
pub struct BoardApiConfig {
    pub api_url: String,
    pub api_version: String,
    pub api_key: String,
}

impl std::fmt::Debug for BoardApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardApiConfig")
            .field("api_url", &self.api_url)
            .field("api_version", &self.api_version)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

pub fn build_graphql_request(cfg: &BoardApiConfig, query: &str, variables: &Value) -> HttpRequest {
    let payload = json!({ "query": query, "variables": variables });

    HttpRequest::post_json(cfg.api_url.clone(), payload.to_string())
        .with_header("Authorization", cfg.api_key.clone())
        .with_header("API-Version", cfg.api_version.clone())
}

/// Reads every item of the companies board with its code column.
pub fn companies_query(code_column: &str) -> String {
    format!(
        "query SyncBoards($boardIds: [ID!]) {{
    boards(ids: $boardIds) {{
        id
        name
        items_page(limit: 500) {{
            items {{
                id
                name
                column_values(ids: [\"{code_column}\"]) {{
                    id
                    text
                }}
            }}
        }}
    }}
}}"
    )
}

pub fn companies_variables(board_id: u64) -> Value {
    json!({ "boardIds": [board_id] })
}

pub fn create_item_variables(board_id: u64, item_name: &str, status: &str, priority: &str) -> Value {
    // The board API wants column values as a JSON-encoded string.
    let column_values = json!({
        "status": { "label": status },
        "priority": { "label": priority },
    });

    json!({
        "board_id": board_id,
        "item_name": item_name,
        "column_values": column_values.to_string(),
    })
}

pub fn create_update_variables(item_id: &str, body: &str) -> Value {
    json!({ "item_id": item_id, "body": body })
}
