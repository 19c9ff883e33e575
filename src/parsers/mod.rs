// Parsers for raw agent output

mod agent_response;

pub use agent_response::{fallback_reply_text, normalize_agent_reply};
