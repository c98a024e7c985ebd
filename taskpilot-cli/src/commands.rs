use std::path::PathBuf;

use taskpilot_core::types::RecordPatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTarget {
    Content,
    Board,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Text(String),
    Image(PathBuf),
    Clear,
    Generate,
    List,
    /// 1-based position in the pending list.
    Edit { index: usize, patch: RecordPatch },
    Approve(usize),
    Discard(usize),
    Companies,
    Sync,
    Key { target: KeyTarget, value: String },
    Save,
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  text <message>                 set the request text
  image <path>                   attach a screenshot
  clear                          drop text and image
  generate                       ask the model for tasks
  list                           show pending tasks
  edit <n> <field> <value>       field: title | desc | status | priority
  approve <n>                    create task n on the board
  discard <n>                    drop task n
  companies                      show the synced company list
  sync                           reload companies now
  key gemini|monday <value>      set an API key (use `save` to persist)
  save                           persist keys and resync
  status                         show the last status message
  help                           this text
  quit                           exit";

fn parse_index(raw: Option<&str>) -> Result<usize, String> {
    let raw = raw.ok_or("missing task number")?;
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("not a task number: {raw}")),
    }
}

fn parse_edit(rest: &str) -> Result<Command, String> {
    let mut parts = rest.splitn(3, char::is_whitespace);
    let index = parse_index(parts.next())?;
    let field = parts.next().ok_or("missing field")?;
    let value = parts.next().unwrap_or("").trim().to_string();

    let mut patch = RecordPatch::default();
    match field {
        "title" => patch.title = Some(value),
        "desc" | "description" => patch.description = Some(value),
        "status" => patch.status = Some(value),
        "priority" => patch.priority = Some(value),
        other => return Err(format!("unknown field: {other}")),
    }
    Ok(Command::Edit { index, patch })
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map(|(v, r)| (v, r.trim()))
        .unwrap_or((line, ""));

    let cmd = match verb {
        "text" => Command::Text(rest.to_string()),
        "image" if rest.is_empty() => return Err("missing image path".into()),
        "image" => Command::Image(PathBuf::from(rest)),
        "clear" => Command::Clear,
        "generate" | "gen" => Command::Generate,
        "list" | "ls" => Command::List,
        "edit" => parse_edit(rest)?,
        "approve" => Command::Approve(parse_index(Some(rest).filter(|r| !r.is_empty()))?),
        "discard" => Command::Discard(parse_index(Some(rest).filter(|r| !r.is_empty()))?),
        "companies" => Command::Companies,
        "sync" => Command::Sync,
        "key" => {
            let (which, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            let target = match which {
                "gemini" => KeyTarget::Content,
                "monday" => KeyTarget::Board,
                other => return Err(format!("unknown key: {other:?} (gemini or monday)")),
            };
            Command::Key {
                target,
                value: value.trim().to_string(),
            }
        }
        "save" => Command::Save,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command: {other} (try `help`)")),
    };
    Ok(Some(cmd))
}
