// Stage projector - pure derivation of per-stage statuses for the progress
// tracker. No access to the turn log; only the declared stage and the
// approved-sections ledger feed in.

use crate::models::{ApprovedSection, PrdStage, StageProjection, StageStatus};

/// Project `(current_stage, approved_sections)` onto the seven fixed stages.
///
/// A stage whose named section is in the ledger is `Approved` no matter
/// where the current position sits. Otherwise the current stage is
/// `InReview`, except the terminal stage which reads `Approved` when
/// reached. Everything else is `Pending`.
pub fn project_stages(
    current_stage: PrdStage,
    approved_sections: &[ApprovedSection],
) -> Vec<StageProjection> {
    PrdStage::all()
        .iter()
        .map(|&stage| {
            let ledger_approved = stage
                .section_title()
                .map(|title| approved_sections.iter().any(|s| s.title == title))
                .unwrap_or(false);

            let status = if ledger_approved {
                StageStatus::Approved
            } else if stage == current_stage {
                if stage.is_terminal() {
                    StageStatus::Approved
                } else {
                    StageStatus::InReview
                }
            } else {
                StageStatus::Pending
            };

            StageProjection { stage, status }
        })
        .collect()
}
