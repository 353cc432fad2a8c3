//! Response parser — turns raw model text into exactly one [`Action`].
//!
//! Models wrap the tool-call JSON in markdown fences, add prose before or
//! after it, or forget it entirely. The parser strips fences, finds the
//! first balanced `{...}` object and reads the `{"tool": ..., "args": ...}`
//! protocol out of it. Anything it cannot read becomes [`Action::Malformed`];
//! the parser itself never fails.

use serde_json::Value;
use std::collections::HashMap;

/// Reserved tool name that ends the loop.
pub const FINAL_ANSWER_TOOL: &str = "final_answer";

/// What the model asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Stop and return `answer`. Only terminal when `answer` is non-empty.
    FinalAnswer { answer: String },

    /// Invoke a tool. `tool_name` is lower-cased.
    ToolCall {
        tool_name: String,
        args: HashMap<String, String>,
    },

    /// The reply did not follow the protocol.
    Malformed { raw_text: String },
}

/// Parse a model reply into an action.
pub fn parse_action(raw: &str) -> Action {
    let stripped = strip_code_fences(raw);
    let candidate = extract_json_object(&stripped).unwrap_or_else(|| stripped.trim());

    read_protocol(candidate).unwrap_or_else(|| Action::Malformed {
        raw_text: raw.to_string(),
    })
}

fn read_protocol(candidate: &str) -> Option<Action> {
    let value: Value = serde_json::from_str(candidate).ok()?;
    let object = value.as_object()?;
    let tool_name = object.get("tool")?.as_str()?.to_lowercase();

    let args = match object.get("args") {
        None | Some(Value::Null) => HashMap::new(),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(k, v)| (k.clone(), value_to_string(v)))
            .collect(),
        Some(_) => return None,
    };

    if tool_name == FINAL_ANSWER_TOOL {
        let answer = args.get("answer").cloned().unwrap_or_default();
        return Some(Action::FinalAnswer { answer });
    }

    Some(Action::ToolCall { tool_name, args })
}

/// Arguments are strings on the wire; other JSON values keep their JSON text.
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Remove every markdown code fence marker (```` ``` ```` or ```` ```json ````),
/// along with the whitespace that follows it.
pub fn strip_code_fences(text: &str) -> String {
    const FENCE: &str = "```";

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find(FENCE) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + FENCE.len()..];
        rest = rest.strip_prefix("json").unwrap_or(rest);
        rest = rest.trim_start();
    }
    out.push_str(rest);
    out
}

/// Find the first balanced `{...}` substring.
///
/// Braces inside JSON string literals are ignored, so `{"answer": "a } b"}`
/// is returned whole. Scanning restarts at the next `{` when an opening brace
/// is never closed. This is still a heuristic: prose containing stray braces
/// before the real object will be picked up first.
pub fn extract_json_object(text: &str) -> Option<&str> {
    text.char_indices()
        .filter(|(_, c)| *c == '{')
        .find_map(|(start, _)| balanced_end(&text[start..]).map(|end| &text[start..start + end]))
}

/// Byte length of the balanced object at the start of `text`, if it closes.
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }

    None
}
