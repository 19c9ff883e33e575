// Conversation store - the append-only log plus derived workflow state.
//
// All mutation goes through the append methods; turns are never edited or
// removed once pushed. Stage and ledger updates happen only as a side effect
// of appending an agent turn or recording an explicit approval.

use crate::models::{AgentPayload, ApprovedSection, PrdStage, Turn};

/// Holds the conversation log, the current workflow stage, and the ledger of
/// approved PRD sections.
#[derive(Debug, Default)]
pub struct ConversationStore {
    turns: Vec<Turn>,
    current_stage: PrdStage,
    approved: Vec<ApprovedSection>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Append paths
    // ========================================================================

    pub fn append_user_turn(&mut self, turn: Turn) {
        debug_assert!(turn.agent_payload.is_none());
        self.turns.push(turn);
    }

    /// Append a structured agent turn and fold its workflow claims into the
    /// derived state.
    ///
    /// Stage updates are last-write-wins, but only for a recognized stage key;
    /// a reply without one leaves the stage untouched. Ledger entries are
    /// first-write-wins: a title already present is never overwritten.
    pub fn append_agent_turn(&mut self, payload: AgentPayload) {
        if let Some(stage) = payload.current_stage {
            if stage != self.current_stage {
                log::debug!(
                    "Stage transition: {} -> {}",
                    self.current_stage,
                    stage
                );
            }
            self.current_stage = stage;
        }

        for title in &payload.approved_sections {
            self.record_approval(title.clone(), String::new());
        }

        self.turns.push(Turn::agent(payload));
    }

    /// Append an agent turn carrying plain text only, with no workflow
    /// effects. Used for fallback and error placeholder replies.
    pub fn append_fallback_turn(&mut self, content: impl Into<String>) {
        self.turns.push(Turn::fallback(content));
    }

    /// Record a section approved directly by the user, with its reviewed
    /// content. First write for a title wins here too.
    pub fn record_explicit_approval(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) {
        self.record_approval(title.into(), content.into());
    }

    fn record_approval(&mut self, title: String, content: String) {
        if self.approved.iter().any(|s| s.title == title) {
            log::debug!("Section '{}' already in ledger, keeping first write", title);
            return;
        }
        log::info!("Section approved: '{}'", title);
        self.approved.push(ApprovedSection { title, content });
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn current_stage(&self) -> PrdStage {
        self.current_stage
    }

    pub fn approved_sections(&self) -> &[ApprovedSection] {
        &self.approved
    }

    /// The payload awaiting a review decision, if the most recent agent turn
    /// asked for one. Only the latest agent turn counts; older review
    /// requests are superseded.
    pub fn pending_review(&self) -> Option<&AgentPayload> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role == crate::models::TurnRole::Agent)
            .and_then(|t| t.agent_payload.as_ref())
            .filter(|p| p.has_review_action())
    }
}
