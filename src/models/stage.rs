//! PRD workflow stages
//!
//! Defines the fixed, ordered, closed list of workflow stages the agent can
//! declare, plus the per-stage status used for progress display.

use serde::{Deserialize, Serialize};

/// Workflow stages (7 fixed stages, information gathering through completion)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrdStage {
    /// Open-ended interview before any section is drafted
    #[serde(rename = "information_gathering")]
    InformationGathering,
    /// Review checkpoint for the Problem Statement & Goals section
    #[serde(rename = "review_1_problem_goals")]
    Review1ProblemGoals,
    /// Review checkpoint for the Use Cases section
    #[serde(rename = "review_2_use_cases")]
    Review2UseCases,
    /// Review checkpoint for the Requirements & Analysis section
    #[serde(rename = "review_3_requirements")]
    Review3Requirements,
    /// Review checkpoint for the Risks section
    #[serde(rename = "review_4_risks")]
    Review4Risks,
    /// Gap analysis and next steps
    #[serde(rename = "gap_analysis")]
    GapAnalysis,
    /// Terminal stage - the PRD is done
    #[serde(rename = "completed")]
    Completed,
}

impl PrdStage {
    /// Get all stages in workflow order
    pub fn all() -> &'static [PrdStage] {
        &[
            PrdStage::InformationGathering,
            PrdStage::Review1ProblemGoals,
            PrdStage::Review2UseCases,
            PrdStage::Review3Requirements,
            PrdStage::Review4Risks,
            PrdStage::GapAnalysis,
            PrdStage::Completed,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PrdStage::InformationGathering => "information_gathering",
            PrdStage::Review1ProblemGoals => "review_1_problem_goals",
            PrdStage::Review2UseCases => "review_2_use_cases",
            PrdStage::Review3Requirements => "review_3_requirements",
            PrdStage::Review4Risks => "review_4_risks",
            PrdStage::GapAnalysis => "gap_analysis",
            PrdStage::Completed => "completed",
        }
    }

    /// Parse a stage key, returning None for anything outside the closed set.
    /// The agent is untrusted here; unknown keys must never become a stage.
    pub fn from_key(key: &str) -> Option<PrdStage> {
        PrdStage::all().iter().copied().find(|s| s.as_str() == key)
    }

    /// Get the display label for this stage
    pub fn label(&self) -> &'static str {
        match self {
            PrdStage::InformationGathering => "Information Gathering",
            PrdStage::Review1ProblemGoals => "Problem & Goals",
            PrdStage::Review2UseCases => "Use Cases",
            PrdStage::Review3Requirements => "Requirements & Analysis",
            PrdStage::Review4Risks => "Risks",
            PrdStage::GapAnalysis => "Gap Analysis & Next Steps",
            PrdStage::Completed => "Completed",
        }
    }

    /// Get the short label used in compact progress displays
    pub fn short_label(&self) -> &'static str {
        match self {
            PrdStage::InformationGathering => "Gather",
            PrdStage::Review1ProblemGoals => "Review 1",
            PrdStage::Review2UseCases => "Review 2",
            PrdStage::Review3Requirements => "Review 3",
            PrdStage::Review4Risks => "Review 4",
            PrdStage::GapAnalysis => "Gaps",
            PrdStage::Completed => "Done",
        }
    }

    /// The PRD section title a review stage gates on, if any.
    /// Only the four review stages carry a section.
    pub fn section_title(&self) -> Option<&'static str> {
        match self {
            PrdStage::Review1ProblemGoals => Some("Problem Statement & Goals"),
            PrdStage::Review2UseCases => Some("Use Cases"),
            PrdStage::Review3Requirements => Some("Requirements & Analysis"),
            PrdStage::Review4Risks => Some("Risks"),
            _ => None,
        }
    }

    /// Get the stage index (0-based)
    pub fn index(&self) -> usize {
        PrdStage::all()
            .iter()
            .position(|s| s == self)
            .unwrap_or_default()
    }

    /// Check if this is the terminal stage
    pub fn is_terminal(&self) -> bool {
        matches!(self, PrdStage::Completed)
    }

    /// Display label for a raw stage key, falling back to the initial stage's
    /// label for unknown keys
    pub fn label_for_key(key: &str) -> &'static str {
        PrdStage::from_key(key)
            .unwrap_or(PrdStage::InformationGathering)
            .label()
    }
}

impl Default for PrdStage {
    fn default() -> Self {
        PrdStage::InformationGathering
    }
}

impl std::fmt::Display for PrdStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PrdStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrdStage::from_key(s).ok_or_else(|| format!("Unknown PRD stage: '{}'", s))
    }
}

/// Status of a stage as shown in the progress tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// Stage has not been reached
    Pending,
    /// Stage is the agent's declared current position
    InReview,
    /// Stage's section is in the approved ledger, or the workflow finished here
    Approved,
}

impl Default for StageStatus {
    fn default() -> Self {
        StageStatus::Pending
    }
}

/// One row of the derived progress view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageProjection {
    pub stage: PrdStage,
    pub status: StageStatus,
}

/// An approved PRD section in the ledger.
/// Content may be empty when the agent announced approval by bare title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovedSection {
    pub title: String,
    pub content: String,
}

/// Section titles that make up the exported PRD, in document order
pub const EXPORT_SECTION_TITLES: [&str; 5] = [
    "Problem Statement & Goals",
    "Use Cases",
    "Requirements & Analysis",
    "Risks",
    "Gap Analysis & Next Steps",
];
