// Conversation log entries

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AgentPayload;

/// Enum for turn authorship with compile-time validation.
/// Serializes/deserializes as lowercase strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Agent,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Agent => "agent",
        }
    }
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TurnRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(TurnRole::User),
            "agent" => Ok(TurnRole::Agent),
            _ => Err(format!(
                "Invalid turn role: '{}'. Expected 'user' or 'agent'",
                s
            )),
        }
    }
}

/// Attachment reference shown on a user turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnAttachment {
    /// Original filename
    pub name: String,
    /// Human-readable size (e.g. "1.2 MB")
    pub human_size: String,
}

/// One exchange unit in the conversation log.
///
/// Turns are append-only: once created they are never mutated, and ordering
/// follows creation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    pub id: String,
    pub role: TurnRole,
    /// Display text; for agent turns this is the normalized message
    pub content: String,
    /// Present only on agent turns that carried a usable structured reply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_payload: Option<AgentPayload>,
    /// Present only on user turns that included files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<TurnAttachment>>,
    pub created_at: String,
}

impl Turn {
    /// Create a user turn, attaching file references only when present
    pub fn user(content: impl Into<String>, attachments: Vec<TurnAttachment>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: TurnRole::User,
            content: content.into(),
            agent_payload: None,
            attachments: if attachments.is_empty() {
                None
            } else {
                Some(attachments)
            },
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Create an agent turn from a normalized payload; the display content is
    /// the payload's message
    pub fn agent(payload: AgentPayload) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: TurnRole::Agent,
            content: payload.message.clone(),
            agent_payload: Some(payload),
            attachments: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Create a plain agent turn with no structured payload.
    /// Used when normalization yielded nothing usable.
    pub fn fallback(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: TurnRole::Agent,
            content: content.into(),
            agent_payload: None,
            attachments: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
