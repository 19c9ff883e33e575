// Canonical type definitions for the PRD builder chat client

mod agent_payload;
mod stage;
mod turn;

pub use agent_payload::{AgentPayload, ConfidenceEntry};
pub use stage::{ApprovedSection, PrdStage, StageProjection, StageStatus, EXPORT_SECTION_TITLES};
pub use turn::{Turn, TurnAttachment, TurnRole};
