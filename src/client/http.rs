// HTTP implementations of the agent and upload seams

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use futures_util::future::BoxFuture;
use serde_json::json;

use super::{
    AgentCallResult, AgentClient, AgentRequest, ClientError, UploadClient, UploadFile,
    UploadResult,
};

/// Talks to the remote conversational agent over JSON HTTP
pub struct HttpAgentClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAgentClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn message_url(&self, agent_id: &str) -> String {
        format!(
            "{}/agents/{}/messages",
            self.base_url.trim_end_matches('/'),
            agent_id
        )
    }
}

impl AgentClient for HttpAgentClient {
    fn call_agent(
        &self,
        request: AgentRequest,
    ) -> BoxFuture<'_, Result<AgentCallResult, ClientError>> {
        Box::pin(async move {
            let url = self.message_url(&request.agent_id);
            log::debug!(
                "Calling agent {} (session {}, {} asset refs)",
                request.agent_id,
                request.session_id,
                request.asset_ids.len()
            );

            let response = self
                .http
                .post(&url)
                .json(&json!({
                    "message": request.message,
                    "sessionId": request.session_id,
                    "assetIds": request.asset_ids,
                }))
                .send()
                .await?;

            let result = response.error_for_status()?.json::<AgentCallResult>().await?;
            Ok(result)
        })
    }
}

/// Ships one file per call to the storage service as base64 JSON
pub struct HttpUploadClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpUploadClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn assets_url(&self) -> String {
        format!("{}/assets", self.base_url.trim_end_matches('/'))
    }
}

impl UploadClient for HttpUploadClient {
    fn upload(&self, file: UploadFile) -> BoxFuture<'_, Result<UploadResult, ClientError>> {
        Box::pin(async move {
            log::debug!("Uploading {} ({} bytes)", file.name, file.data.len());

            let response = self
                .http
                .post(self.assets_url())
                .json(&json!({
                    "name": file.name,
                    "mimeType": file.mime_type,
                    "data": BASE64.encode(&file.data),
                }))
                .send()
                .await?;

            let result = response.error_for_status()?.json::<UploadResult>().await?;
            Ok(result)
        })
    }
}
