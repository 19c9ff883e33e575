// Chat controller - owns the store, the attachment tray, and the session,
// and drives the send / approve / request-changes / attach flows against
// the external services.

use futures_util::future::join_all;
use thiserror::Error;

use crate::client::{AgentClient, AgentRequest, UploadClient, UploadFile};
use crate::models::{StageProjection, Turn};
use crate::parsers::{fallback_reply_text, normalize_agent_reply};

use super::attachments::AttachmentManager;
use super::composer::{
    request_changes_message, ComposedTurn, APPROVAL_MESSAGE, WELCOME_KICKOFF,
};
use super::projector::project_stages;
use super::session::SessionHandle;
use super::store::ConversationStore;

/// Placeholder agent turn when a reply carried nothing displayable
const NO_RESPONSE_TEXT: &str = "No response received.";

/// Agent turn shown when the call itself failed
const ERROR_TURN_TEXT: &str = "Sorry, something went wrong. Please try again.";

/// Transient banner paired with the error turn
const ERROR_BANNER_TEXT: &str = "Failed to get a response. Please try again.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("an agent call is already in flight")]
    Busy,

    #[error("nothing to send: no text and no uploaded attachment")]
    EmptyMessage,

    #[error("no section is awaiting review")]
    NoPendingReview,

    #[error("change requests need feedback text")]
    EmptyFeedback,
}

/// Drives one PRD-building conversation.
///
/// At most one agent call is in flight at a time; the busy flag gates send,
/// approve, and request-changes alike. Uploads run independently of it.
/// Calls carry no timeout, so a hung agent call keeps the controller busy
/// until it resolves.
pub struct ChatController<A: AgentClient, U: UploadClient> {
    store: ConversationStore,
    attachments: AttachmentManager,
    session: SessionHandle,
    agent: A,
    uploader: U,
    busy: bool,
    banner: Option<String>,
}

impl<A: AgentClient, U: UploadClient> ChatController<A, U> {
    pub fn new(agent: A, uploader: U, agent_id: impl Into<String>) -> Self {
        Self {
            store: ConversationStore::new(),
            attachments: AttachmentManager::new(),
            session: SessionHandle::new(agent_id),
            agent,
            uploader,
            busy: false,
            banner: None,
        }
    }

    // ========================================================================
    // User actions
    // ========================================================================

    /// Kick off the conversation. The greeting goes to the agent but is not
    /// recorded as a user turn, so the agent speaks first on screen.
    pub async fn start(&mut self) -> Result<(), ChatError> {
        if self.busy {
            return Err(ChatError::Busy);
        }
        log::info!(
            "Starting session {} against agent {}",
            self.session.session_id,
            self.session.agent_id
        );
        self.dispatch(WELCOME_KICKOFF.to_string(), vec![]).await;
        Ok(())
    }

    /// Send a user message, consuming any completed attachments.
    ///
    /// The pending attachment tray is cleared once the send is composed,
    /// whatever the call's outcome; files still uploading or failed are
    /// dropped from the send silently.
    pub async fn send(&mut self, text: &str) -> Result<(), ChatError> {
        if self.busy {
            return Err(ChatError::Busy);
        }

        let composed = ComposedTurn::compose(
            text,
            self.attachments.asset_ids(),
            self.attachments.display_attachments(),
        )
        .ok_or(ChatError::EmptyMessage)?;

        self.store.append_user_turn(Turn::user(
            composed.display_text,
            composed.display_attachments,
        ));
        self.attachments.clear();

        self.dispatch(composed.transmit_text, composed.asset_ids).await;
        Ok(())
    }

    /// Approve the section under review: capture it into the ledger, then
    /// speak the fixed approval phrase as a user turn.
    pub async fn approve(&mut self) -> Result<(), ChatError> {
        if self.busy {
            return Err(ChatError::Busy);
        }

        let (title, content) = {
            let pending = self.store.pending_review().ok_or(ChatError::NoPendingReview)?;
            (pending.section_title.clone(), pending.section_content.clone())
        };

        self.store.record_explicit_approval(title, content);
        self.store
            .append_user_turn(Turn::user(APPROVAL_MESSAGE, vec![]));
        self.dispatch(APPROVAL_MESSAGE.to_string(), vec![]).await;
        Ok(())
    }

    /// Ask for changes to the section under review. The ledger is not
    /// touched.
    pub async fn request_changes(&mut self, feedback: &str) -> Result<(), ChatError> {
        if self.busy {
            return Err(ChatError::Busy);
        }
        if self.store.pending_review().is_none() {
            return Err(ChatError::NoPendingReview);
        }
        let feedback = feedback.trim();
        if feedback.is_empty() {
            return Err(ChatError::EmptyFeedback);
        }

        let message = request_changes_message(feedback);
        self.store.append_user_turn(Turn::user(message.clone(), vec![]));
        self.dispatch(message, vec![]).await;
        Ok(())
    }

    /// Upload a batch of files. Uploads run concurrently; each file settles
    /// on its own and a failure leaves its siblings alone. Independent of
    /// the agent-call busy flag.
    pub async fn attach_files(&mut self, files: Vec<UploadFile>) {
        let tagged: Vec<(String, UploadFile)> = files
            .into_iter()
            .map(|file| (self.attachments.select(&file.name, file.size_bytes()), file))
            .collect();

        let uploader = &self.uploader;
        let uploads = tagged.into_iter().map(|(id, file)| async move {
            let outcome = uploader.upload(file).await;
            (id, outcome)
        });

        for (id, outcome) in join_all(uploads).await {
            self.attachments.resolve_upload(&id, outcome);
        }
    }

    pub fn remove_attachment(&mut self, id: &str) {
        self.attachments.remove(id);
    }

    pub fn clear_attachments(&mut self) {
        self.attachments.clear();
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn attachments(&self) -> &AttachmentManager {
        &self.attachments
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Take the transient error banner, if one is pending
    pub fn take_banner(&mut self) -> Option<String> {
        self.banner.take()
    }

    /// Current progress projection for the stage tracker
    pub fn stage_progress(&self) -> Vec<StageProjection> {
        project_stages(self.store.current_stage(), self.store.approved_sections())
    }

    // ========================================================================
    // Agent call
    // ========================================================================

    /// Run one agent call and fold the reply into the store. A structured
    /// reply becomes an agent turn with workflow effects; a failed reply
    /// falls back to its raw text; a transport error produces an apology
    /// turn plus a transient banner.
    async fn dispatch(&mut self, transmit_text: String, asset_ids: Vec<String>) {
        self.busy = true;
        self.banner = None;

        let request = AgentRequest {
            message: transmit_text,
            agent_id: self.session.agent_id.clone(),
            session_id: self.session.session_id.clone(),
            asset_ids,
        };

        match self.agent.call_agent(request).await {
            Ok(reply) => match normalize_agent_reply(&reply) {
                Some(payload) => self.store.append_agent_turn(payload),
                None => {
                    let text = fallback_reply_text(&reply)
                        .unwrap_or_else(|| NO_RESPONSE_TEXT.to_string());
                    self.store.append_fallback_turn(text);
                }
            },
            Err(e) => {
                log::warn!("Agent call failed: {}", e);
                self.banner = Some(ERROR_BANNER_TEXT.to_string());
                self.store.append_fallback_turn(ERROR_TURN_TEXT);
            }
        }

        self.busy = false;
    }
}
