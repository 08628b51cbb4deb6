use std::fmt;

use serde::Deserialize;

use crate::error::AgentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Select,
    Insert,
    Update,
    Delete,
    Help,
}

impl Action {
    pub fn parse(value: &str) -> Option<Action> {
        match value.trim().to_uppercase().as_str() {
            "SELECT" => Some(Action::Select),
            "INSERT" => Some(Action::Insert),
            "UPDATE" => Some(Action::Update),
            "DELETE" => Some(Action::Delete),
            "HELP" => Some(Action::Help),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Select => "SELECT",
            Action::Insert => "INSERT",
            Action::Update => "UPDATE",
            Action::Delete => "DELETE",
            Action::Help => "HELP",
        }
    }

    /// Verb for write confirmations ("3 record(s) updated.").
    pub fn past_tense(&self) -> &'static str {
        match self {
            Action::Select => "selected",
            Action::Insert => "inserted",
            Action::Update => "updated",
            Action::Delete => "deleted",
            Action::Help => "answered",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The model's reply, validated. `sql` is `None` when the model sent null,
/// an empty string, or nothing at all.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionDecision {
    pub action: Action,
    pub sql: Option<String>,
    pub explanation: String,
    pub needs_data: bool,
}

#[derive(Deserialize)]
struct RawDecision {
    action: String,
    #[serde(default)]
    sql: Option<String>,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    needs_data: bool,
}

/// Pulls the decision out of whatever text the model produced. Models wrap
/// JSON in prose despite instructions, so the first balanced object is
/// extracted and decoded; the object itself is held to the contract
/// (a real action value is required, unknown ones are rejected).
pub fn parse_decision(raw: &str) -> Result<ActionDecision, AgentError> {
    let object = extract_json_object(raw)
        .ok_or_else(|| AgentError::Parse("no JSON object in model output".to_string()))?;

    let parsed: RawDecision =
        serde_json::from_str(object).map_err(|e| AgentError::Parse(e.to_string()))?;

    let action = Action::parse(&parsed.action)
        .ok_or_else(|| AgentError::Parse(format!("unknown action '{}'", parsed.action)))?;

    let sql = parsed
        .sql
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    Ok(ActionDecision {
        action,
        sql,
        explanation: parsed.explanation,
        needs_data: parsed.needs_data,
    })
}

/// Best-effort: scans from the first `{` to its matching `}`, skipping brace
/// characters inside string literals. Falls back to the last `}` when the
/// text is unbalanced, which keeps truncated replies recoverable by the
/// caller's JSON parser if at all possible.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escape = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            if escape {
                escape = false;
            } else if c == '\\' {
                escape = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    let end = text.rfind('}')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}
