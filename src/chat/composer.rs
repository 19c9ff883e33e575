// Turn composer - fixed prompt templates and the transmit/display split
// for outgoing user turns.

use crate::models::TurnAttachment;

/// Hidden kick-off message sent when a session starts. It is transmitted to
/// the agent but never shown as a user turn.
pub const WELCOME_KICKOFF: &str = "Hello, I want to build a PRD";

/// Fixed phrase dispatched when the user approves a section under review
pub const APPROVAL_MESSAGE: &str = "I approve this section";

/// Placeholder shown as the user's turn when documents are sent without any
/// typed text
pub const UPLOAD_DISPLAY_TEXT: &str = "uploaded documents for analysis";

/// Full extraction prompt sent when documents are attached with no typed
/// text. Lists the eight PRD facets the agent should pull out of the
/// uploaded material.
pub const EXTRACTION_PROMPT: &str = "I have uploaded documents for you to analyze. \
Please read them carefully and extract everything relevant to a product requirements document, covering:\n\
1. Problem statement and goals\n\
2. Target users and use cases\n\
3. Functional requirements\n\
4. Non-functional requirements\n\
5. Success metrics\n\
6. Risks and mitigations\n\
7. Assumptions and constraints\n\
8. Open questions\n\
Summarize what you found and ask me about anything the documents leave unclear.";

/// Condensed facet checklist appended when the user sends typed text along
/// with documents
const FACET_CHECKLIST: &str = "While reading, note anything relevant to: problem statement and goals, \
target users and use cases, functional requirements, non-functional requirements, \
success metrics, risks and mitigations, assumptions and constraints, and open questions.";

/// Context sentence prefixed to typed text when documents accompany it
const DOCUMENT_CONTEXT: &str = "I have uploaded documents for you to analyze alongside this message.";

/// Fixed wrapper for review feedback
pub fn request_changes_message(feedback: &str) -> String {
    format!("I would like the following changes: {}", feedback)
}

/// The composed send: what goes over the wire, what the user sees as their
/// own turn, and which completed uploads ride along.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedTurn {
    pub transmit_text: String,
    pub display_text: String,
    pub asset_ids: Vec<String>,
    pub display_attachments: Vec<TurnAttachment>,
}

impl ComposedTurn {
    /// Build the outgoing turn from typed text and the completed uploads.
    /// Returns `None` when there is nothing to send: no text and no
    /// completed attachment.
    ///
    /// Only completed uploads contribute asset references and displayed
    /// attachment chips; files still uploading or failed are left out
    /// without blocking the send.
    pub fn compose(
        text: &str,
        asset_ids: Vec<String>,
        display_attachments: Vec<TurnAttachment>,
    ) -> Option<ComposedTurn> {
        let text = text.trim();
        let has_attachments = !asset_ids.is_empty();

        if text.is_empty() && !has_attachments {
            return None;
        }

        let (transmit_text, display_text) = if !has_attachments {
            (text.to_string(), text.to_string())
        } else if text.is_empty() {
            (EXTRACTION_PROMPT.to_string(), UPLOAD_DISPLAY_TEXT.to_string())
        } else {
            (
                format!("{}\n\n{}\n\n{}", DOCUMENT_CONTEXT, text, FACET_CHECKLIST),
                text.to_string(),
            )
        };

        Some(ComposedTurn {
            transmit_text,
            display_text,
            asset_ids,
            display_attachments,
        })
    }
}
