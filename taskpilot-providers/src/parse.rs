use anyhow::{Context, anyhow};
use serde::Deserialize;
use serde_json::Value;
use taskpilot_core::context::Company;

pub fn parse_json_body(body: &str) -> anyhow::Result<Value> {
    serde_json::from_str(body).context("decode response JSON")
}

/// First embedded GraphQL error, if the body carries a non-empty `errors` value.
///
/// A list yields its first entry; any other non-empty value counts as an error too.
pub fn first_graphql_error(body: &Value) -> Option<String> {
    let first = match body.get("errors")? {
        Value::Null | Value::Bool(false) => return None,
        Value::String(s) if s.is_empty() => return None,
        Value::Object(map) if map.is_empty() => return None,
        Value::Array(list) => list.first()?,
        other => other,
    };
    let msg = match first {
        Value::String(s) => s.clone(),
        _ => first
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| first.to_string()),
    };
    Some(msg)
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    text: Option<String>,
}

/// `candidates[0].content.parts[0].text`, when present and non-empty.
pub fn generated_text(body: &Value) -> Option<String> {
    let resp = GenerateContentResponse::deserialize(body).ok()?;
    resp.candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .next()?
        .text
        .filter(|t| !t.is_empty())
}

#[derive(Debug, Deserialize)]
struct BoardsData {
    boards: Vec<Board>,
}

#[derive(Debug, Deserialize)]
struct Board {
    items_page: Option<ItemsPage>,
}

#[derive(Debug, Deserialize)]
struct ItemsPage {
    #[serde(default)]
    items: Vec<BoardItem>,
}

#[derive(Debug, Deserialize)]
struct BoardItem {
    #[serde(default)]
    name: String,
    #[serde(default)]
    column_values: Vec<ColumnValue>,
}

#[derive(Debug, Deserialize)]
struct ColumnValue {
    text: Option<String>,
}

/// Companies from the first board of a sync query; items without a name or code are dropped.
pub fn parse_companies(data: &Value) -> anyhow::Result<Vec<Company>> {
    let data = BoardsData::deserialize(data).context("decode boards data")?;

    let items = data
        .boards
        .into_iter()
        .next()
        .and_then(|b| b.items_page)
        .map(|p| p.items)
        .unwrap_or_default();

    Ok(items
        .into_iter()
        .map(|item| {
            let code = item
                .column_values
                .into_iter()
                .next()
                .and_then(|c| c.text)
                .unwrap_or_default()
                .to_uppercase();
            Company::new(item.name, code)
        })
        .filter(|c| !c.name.is_empty() && !c.code.is_empty())
        .collect())
}

/// Id of the item returned by a `create_item` mutation.
pub fn created_item_id(data: &Value) -> anyhow::Result<String> {
    match data.pointer("/create_item/id") {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(anyhow!("no item id in create_item response")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finds_first_graphql_error() {
        let body = json!({"errors":[{"message":"first"},{"message":"second"}]});
        assert_eq!(first_graphql_error(&body).as_deref(), Some("first"));
        assert_eq!(first_graphql_error(&json!({"errors": []})), None);
        assert_eq!(first_graphql_error(&json!({"data": {}})), None);
        assert_eq!(first_graphql_error(&json!({"errors": null})), None);
    }

    #[test]
    fn non_list_errors_still_count() {
        assert_eq!(
            first_graphql_error(&json!({"errors": {"message": "Rate limit exceeded"}})).as_deref(),
            Some("Rate limit exceeded")
        );
        assert_eq!(
            first_graphql_error(&json!({"errors": "Unauthorized"})).as_deref(),
            Some("Unauthorized")
        );
        assert_eq!(
            first_graphql_error(&json!({"errors": true})).as_deref(),
            Some("true")
        );
    }

    #[test]
    fn extracts_generated_text() {
        let body = json!({"candidates":[{"content":{"parts":[{"text":"{\"tasks\":[]}"}]}}]});
        assert_eq!(generated_text(&body).as_deref(), Some("{\"tasks\":[]}"));
    }

    #[test]
    fn missing_generated_text_is_none() {
        assert_eq!(generated_text(&json!({})), None);
        assert_eq!(generated_text(&json!({"candidates": []})), None);
        assert_eq!(
            generated_text(&json!({"candidates":[{"finishReason":"SAFETY"}]})),
            None
        );
        assert_eq!(
            generated_text(&json!({"candidates":[{"content":{"parts":[{"text":""}]}}]})),
            None
        );
    }

    #[test]
    fn parses_companies_and_uppercases_codes() {
        let data = json!({"boards":[{"id":"1","name":"Companies","items_page":{"items":[
            {"id":"a","name":"Acme Corp","column_values":[{"id":"c","text":"acme"}]},
            {"id":"b","name":"No Code","column_values":[{"id":"c","text":""}]},
            {"id":"c","name":"","column_values":[{"id":"c","text":"X"}]},
            {"id":"d","name":"Bare","column_values":[]}
        ]}}]});

        let companies = parse_companies(&data).unwrap();
        assert_eq!(companies, vec![Company::new("Acme Corp", "ACME")]);
    }

    #[test]
    fn empty_boards_yield_no_companies() {
        assert!(parse_companies(&json!({"boards": []})).unwrap().is_empty());
        assert!(parse_companies(&json!({"nope": 1})).is_err());
    }

    #[test]
    fn reads_created_item_id() {
        assert_eq!(
            created_item_id(&json!({"create_item":{"id":"123"}})).unwrap(),
            "123"
        );
        assert_eq!(created_item_id(&json!({"create_item":{"id":5}})).unwrap(), "5");
        assert!(created_item_id(&json!({"create_item":null})).is_err());
    }
}
