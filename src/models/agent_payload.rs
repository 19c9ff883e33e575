// Normalized agent reply - every field carries a safe default

use serde::{Deserialize, Serialize};

use super::PrdStage;

/// One aspect of the agent's confidence self-assessment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceEntry {
    /// What is being scored (e.g. "requirements coverage")
    pub aspect: String,
    /// Score 0-100
    pub score: u8,
    /// The agent's stated reasoning for the score
    pub reasoning: String,
}

/// Normalized view of one structured agent reply.
///
/// Produced exclusively by the response normalizer; raw agent output never
/// reaches the conversation store. Absent or wrongly typed fields have
/// already been replaced with the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPayload {
    /// Free text shown as the agent's words, never null
    pub message: String,
    /// Stage the agent declared, if it named one of the seven known keys.
    /// None means absent or unrecognized; the store keeps its previous stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_stage: Option<PrdStage>,
    /// Whether a review action surface should be offered
    pub review_action_needed: bool,
    /// Section under review, empty when not applicable
    pub section_title: String,
    pub section_content: String,
    /// Section titles the agent reports as approved so far
    pub approved_sections: Vec<String>,
    /// Gap descriptions, empty when none
    pub gap_items: Vec<String>,
    /// Overall confidence 0-100; 0 means "not provided"
    pub overall_confidence: u8,
    pub confidence_breakdown: Vec<ConfidenceEntry>,
    /// Agent's free-text reflection, empty when absent
    pub reflection: String,
    /// Free-text accuracy warnings, empty when absent
    pub accuracy_flags: Vec<String>,
}

impl Default for AgentPayload {
    fn default() -> Self {
        Self {
            message: String::new(),
            current_stage: None,
            review_action_needed: false,
            section_title: String::new(),
            section_content: String::new(),
            approved_sections: vec![],
            gap_items: vec![],
            overall_confidence: 0,
            confidence_breakdown: vec![],
            reflection: String::new(),
            accuracy_flags: vec![],
        }
    }
}

impl AgentPayload {
    /// A review action is only offered when the agent asked for one AND sent
    /// both a title and content to review
    pub fn has_review_action(&self) -> bool {
        self.review_action_needed
            && !self.section_title.is_empty()
            && !self.section_content.is_empty()
    }
}
