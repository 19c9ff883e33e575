// External collaborators: the conversational agent and the asset upload
// service. Both are single-shot async calls with no retry or timeout; the
// agent's idempotency under re-send is unverified, so none is added here.

mod http;

pub use http::{HttpAgentClient, HttpUploadClient};

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service unreachable: {0}")]
    Unreachable(String),
}

// ============================================================================
// Agent Call Contract
// ============================================================================

/// Outbound agent request. The session id is threaded through unchanged for
/// the whole session; asset ids reference previously uploaded documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRequest {
    pub message: String,
    pub agent_id: String,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub asset_ids: Vec<String>,
}

/// Inner body of an agent reply. `result` is deliberately left opaque: the
/// agent may send a JSON-encoded string, a structured object, or garbage,
/// and only the normalizer decides what to make of it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentReplyBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
}

/// Raw agent call result as received on the wire
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCallResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub response: Option<AgentReplyBody>,
}

/// Seam to the remote conversational agent
pub trait AgentClient: Send + Sync {
    fn call_agent(
        &self,
        request: AgentRequest,
    ) -> BoxFuture<'_, Result<AgentCallResult, ClientError>>;
}

// ============================================================================
// Upload Contract
// ============================================================================

/// One file selected for upload, one call per file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFile {
    pub name: String,
    pub mime_type: String,
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl UploadFile {
    /// Build an upload from raw bytes, inferring the MIME type from the
    /// filename extension
    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Self {
        let name = name.into();
        let mime_type = mime_guess::from_path(&name)
            .first_or_octet_stream()
            .to_string();
        Self {
            name,
            mime_type,
            data,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Upload service reply
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub asset_ids: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Seam to the file storage service
pub trait UploadClient: Send + Sync {
    fn upload(&self, file: UploadFile) -> BoxFuture<'_, Result<UploadResult, ClientError>>;
}
