// Agent response normalizer - turns an arbitrary reply payload into a fixed
// internal record. Pure and total: no input shape may panic or error out;
// each field is type-checked independently and falls back to its documented
// default on mismatch.

use serde_json::{Map, Value};

use crate::client::AgentCallResult;
use crate::models::{AgentPayload, ConfidenceEntry, PrdStage};

/// Normalize a raw agent reply into an [`AgentPayload`].
///
/// Returns `None` only when the call itself reported failure
/// (`success=false`); every successful reply produces a payload, however
/// malformed its result field is.
pub fn normalize_agent_reply(reply: &AgentCallResult) -> Option<AgentPayload> {
    if !reply.success {
        return None;
    }

    let raw_result = reply.response.as_ref().and_then(|r| r.result.as_ref());

    // Locate the structured result: a JSON-encoded string is parsed; a parse
    // failure demotes the whole string to the message; a structured object is
    // used directly; anything else yields an empty structure.
    let parsed: Map<String, Value> = match raw_result {
        Some(Value::String(s)) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Map::new(),
            Err(_) => {
                let mut map = Map::new();
                map.insert("message".to_string(), Value::String(s.clone()));
                map
            }
        },
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };

    let top_level_message = reply
        .response
        .as_ref()
        .and_then(|r| r.message.as_deref())
        .unwrap_or("");

    // Message fallback chain: parsed message field, then the reply's
    // top-level message, then empty
    let mut message = string_field(&parsed, "message");
    if message.is_empty() {
        message = top_level_message.to_string();
    }

    let current_stage = parsed
        .get("current_stage")
        .and_then(Value::as_str)
        .and_then(PrdStage::from_key);

    Some(AgentPayload {
        message,
        current_stage,
        review_action_needed: bool_field(&parsed, "review_action_needed"),
        section_title: string_field(&parsed, "section_title"),
        section_content: string_field(&parsed, "section_content"),
        approved_sections: string_list_field(&parsed, "approved_sections"),
        gap_items: string_list_field(&parsed, "gap_items"),
        overall_confidence: score_field(parsed.get("overall_confidence")),
        confidence_breakdown: confidence_entries(parsed.get("confidence_breakdown")),
        reflection: string_field(&parsed, "reflection"),
        accuracy_flags: string_list_field(&parsed, "accuracy_flags"),
    })
}

/// Raw text worth showing when normalization yields nothing usable:
/// the reply's top-level message, or a `text` field inside a structured
/// result. Returns `None` when neither is present.
pub fn fallback_reply_text(reply: &AgentCallResult) -> Option<String> {
    let body = reply.response.as_ref()?;

    if let Some(message) = body.message.as_deref() {
        if !message.is_empty() {
            return Some(message.to_string());
        }
    }

    body.result
        .as_ref()
        .and_then(Value::as_object)
        .and_then(|map| map.get("text"))
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(String::from)
}

fn string_field(map: &Map<String, Value>, key: &str) -> String {
    map.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn bool_field(map: &Map<String, Value>, key: &str) -> bool {
    map.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// Arrays keep only their string elements; a non-array value defaults to
/// an empty list
fn string_list_field(map: &Map<String, Value>, key: &str) -> Vec<String> {
    map.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Scores are integers clamped into 0-100; anything non-numeric is 0
fn score_field(value: Option<&Value>) -> u8 {
    match value {
        Some(v) => v
            .as_i64()
            .or_else(|| v.as_f64().map(|f| f as i64))
            .map(|n| n.clamp(0, 100) as u8)
            .unwrap_or(0),
        None => 0,
    }
}

/// Entries that are not well-formed objects are dropped; surviving entries
/// default each field independently
fn confidence_entries(value: Option<&Value>) -> Vec<ConfidenceEntry> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_object)
                .map(|entry| ConfidenceEntry {
                    aspect: string_field(entry, "aspect"),
                    score: score_field(entry.get("score")),
                    reasoning: string_field(entry, "reasoning"),
                })
                .collect()
        })
        .unwrap_or_default()
}
