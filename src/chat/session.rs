// Session identity threaded through every agent call

use uuid::Uuid;

/// Identifies one conversation against the remote agent.
/// The session id is minted once at startup and never changes.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub session_id: String,
    pub agent_id: String,
    pub started_at: String,
}

impl SessionHandle {
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            agent_id: agent_id.into(),
            started_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
