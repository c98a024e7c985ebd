use crate::text::strip_code_fence;
use crate::types::{DEFAULT_PRIORITY, DEFAULT_STATUS, ProposedRecord, RecordId};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProposalError {
    #[error("AI returned an empty proposal.")]
    EmptyResponse,
    #[error("Failed to parse AI response.")]
    Malformed,
    #[error("AI could not identify any tasks.")]
    NoTasks,
}

#[derive(Debug, Deserialize)]
struct TaskList {
    #[serde(default)]
    tasks: Option<Vec<ProposedTask>>,
}

#[derive(Debug, Deserialize)]
struct ProposedTask {
    #[serde(default)]
    task_name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    priority: Option<String>,
}

impl From<ProposedTask> for ProposedRecord {
    fn from(t: ProposedTask) -> Self {
        Self {
            id: RecordId::new(),
            title: t.task_name,
            description: t.description.unwrap_or_default(),
            status: t
                .status
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_STATUS.into()),
            priority: t
                .priority
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PRIORITY.into()),
        }
    }
}

/// Turns the model's answer text into fresh proposed records.
///
/// Either every task becomes a record or none does.
pub fn parse_task_list(raw_text: &str) -> Result<Vec<ProposedRecord>, ProposalError> {
    if raw_text.trim().is_empty() {
        return Err(ProposalError::EmptyResponse);
    }

    let json = strip_code_fence(raw_text);
    let list: TaskList = serde_json::from_str(&json).map_err(|_| ProposalError::Malformed)?;

    match list.tasks {
        Some(tasks) if !tasks.is_empty() => {
            Ok(tasks.into_iter().map(ProposedRecord::from).collect())
        }
        _ => Err(ProposalError::NoTasks),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_task_list_is_no_tasks() {
        assert_eq!(parse_task_list("{\"tasks\":[]}"), Err(ProposalError::NoTasks));
    }

    #[test]
    fn missing_tasks_key_is_no_tasks() {
        assert_eq!(parse_task_list("{}"), Err(ProposalError::NoTasks));
    }

    #[test]
    fn null_tasks_is_no_tasks() {
        assert_eq!(parse_task_list("{\"tasks\":null}"), Err(ProposalError::NoTasks));
    }

    #[test]
    fn errors_are_cloneable_into_outcomes() {
        let e = ProposalError::Malformed;
        assert_eq!(e.clone().to_string(), "Failed to parse AI response.");
    }

    #[test]
    fn single_task_becomes_one_record() {
        let records = parse_task_list(
            r#"{"tasks":[{"task_name":"OPS > fix printer","description":"Office printer jams","status":"Needs Action","priority":"High"}]}"#,
        )
        .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "OPS > fix printer");
        assert_eq!(records[0].description, "Office printer jams");
        assert_eq!(records[0].priority, "High");
    }

    #[test]
    fn fenced_answer_is_parsed_with_defaults() {
        let records =
            parse_task_list("```json\n{\"tasks\":[{\"task_name\":\"A\"},{\"task_name\":\"B\"}]}\n```")
                .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].status, DEFAULT_STATUS);
        assert_eq!(records[0].priority, DEFAULT_PRIORITY);
        assert!(records[0].description.is_empty());
        assert_ne!(records[0].id, records[1].id);
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(parse_task_list("tasks: none"), Err(ProposalError::Malformed));
        assert_eq!(
            parse_task_list("{\"tasks\":[{\"task_name\":1}]}"),
            Err(ProposalError::Malformed)
        );
    }

    #[test]
    fn blank_text_is_empty_response() {
        assert_eq!(parse_task_list("  \n"), Err(ProposalError::EmptyResponse));
    }
}
