//! Conversation state and workflow logic
//!
//! The controller owns everything: the append-only store, the attachment
//! tray, and the session handle. Render and transport stay outside.

mod attachments;
mod composer;
mod controller;
mod projector;
mod session;
mod store;

pub use attachments::{AttachmentManager, SelectedFile, UploadState};
pub use composer::{
    request_changes_message, ComposedTurn, APPROVAL_MESSAGE, EXTRACTION_PROMPT,
    UPLOAD_DISPLAY_TEXT, WELCOME_KICKOFF,
};
pub use controller::{ChatController, ChatError};
pub use projector::project_stages;
pub use session::SessionHandle;
pub use store::ConversationStore;
