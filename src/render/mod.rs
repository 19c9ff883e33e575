//! Terminal presentation of turns, review cards, progress, and the PRD
//! preview. Pure string builders; all state comes in as arguments.

use pulldown_cmark::{Event, Parser, Tag, TagEnd};

use crate::models::{
    AgentPayload, ApprovedSection, StageProjection, StageStatus, Turn, TurnRole,
    EXPORT_SECTION_TITLES,
};

/// Flatten markdown to readable plain text for terminal display.
/// Headings keep their text on their own line, list items get a dash,
/// inline code keeps its text, everything else is stripped.
pub fn markdown_to_text(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut out = String::new();
    let mut list_depth: usize = 0;

    for event in parser {
        match event {
            Event::Start(Tag::Item) => {
                out.push_str(&"  ".repeat(list_depth.saturating_sub(1)));
                out.push_str("- ");
            }
            Event::Start(Tag::List(_)) => list_depth += 1,
            Event::End(TagEnd::List(_)) => {
                list_depth = list_depth.saturating_sub(1);
                if list_depth == 0 {
                    out.push('\n');
                }
            }
            Event::End(TagEnd::Item) => out.push('\n'),
            Event::End(TagEnd::Heading(_)) | Event::End(TagEnd::Paragraph) => {
                out.push_str("\n\n");
            }
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak | Event::HardBreak => out.push('\n'),
            _ => {}
        }
    }

    out.trim_end().to_string()
}

/// Render one turn as chat lines
pub fn render_turn(turn: &Turn) -> String {
    let speaker = match turn.role {
        TurnRole::User => "You",
        TurnRole::Agent => "Agent",
    };
    let mut out = format!("{}: {}", speaker, markdown_to_text(&turn.content));

    if let Some(attachments) = &turn.attachments {
        for a in attachments {
            out.push_str(&format!("\n  [attached: {} ({})]", a.name, a.human_size));
        }
    }
    out
}

/// Render the review card for a payload awaiting a decision.
/// Caller is responsible for only passing payloads with a review action.
pub fn render_review_card(payload: &AgentPayload) -> String {
    let mut out = format!(
        "--- Section for review: {} ---\n{}\n",
        payload.section_title,
        markdown_to_text(&payload.section_content)
    );
    out.push_str("--- /approve to accept, /changes <feedback> to revise ---");
    out
}

/// Render the seven-stage progress tracker
pub fn render_stage_tracker(projection: &[StageProjection]) -> String {
    projection
        .iter()
        .map(|p| {
            let marker = match p.status {
                StageStatus::Approved => "[x]",
                StageStatus::InReview => "[>]",
                StageStatus::Pending => "[ ]",
            };
            format!("{} {}", marker, p.stage.label())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the agent's confidence self-assessment, empty string when the
/// payload carries none
pub fn render_confidence(payload: &AgentPayload) -> String {
    if payload.overall_confidence == 0 && payload.confidence_breakdown.is_empty() {
        return String::new();
    }

    let mut out = format!("Confidence: {}%", payload.overall_confidence);
    for entry in &payload.confidence_breakdown {
        out.push_str(&format!("\n  {} {}%", entry.aspect, entry.score));
        if !entry.reasoning.is_empty() {
            out.push_str(&format!(" - {}", entry.reasoning));
        }
    }
    if !payload.reflection.is_empty() {
        out.push_str(&format!("\nReflection: {}", payload.reflection));
    }
    for flag in &payload.accuracy_flags {
        out.push_str(&format!("\n! {}", flag));
    }
    out
}

/// Render gap items as a bulleted list, empty string when none
pub fn render_gap_items(payload: &AgentPayload) -> String {
    if payload.gap_items.is_empty() {
        return String::new();
    }
    let mut out = String::from("Identified gaps:");
    for item in &payload.gap_items {
        out.push_str(&format!("\n  - {}", item));
    }
    out
}

/// Render the PRD preview: every expected section in document order, with
/// captured content or a placeholder
pub fn render_prd_preview(sections: &[ApprovedSection]) -> String {
    EXPORT_SECTION_TITLES
        .iter()
        .map(|title| match sections.iter().find(|s| s.title == *title) {
            Some(section) if !section.content.is_empty() => {
                format!("# {}\n\n{}", title, markdown_to_text(&section.content))
            }
            Some(_) => format!("# {}\n\n(approved, content pending)", title),
            None => format!("# {}\n\n(not yet approved)", title),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Assemble the exported PRD from the approved ledger, in capture order
pub fn export_prd(sections: &[ApprovedSection]) -> String {
    if sections.is_empty() {
        return "No approved sections yet.".to_string();
    }
    sections
        .iter()
        .map(|s| format!("# {}\n\n{}", s.title, s.content))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConfidenceEntry, PrdStage};

    #[test]
    fn test_markdown_to_text_strips_formatting() {
        let text = markdown_to_text("## Goals\n\nShip **fast** and `safe`.\n\n- one\n- two");
        assert!(text.contains("Goals"));
        assert!(text.contains("Ship fast and safe."));
        assert!(text.contains("- one"));
        assert!(!text.contains("**"));
        assert!(!text.contains("##"));
    }

    #[test]
    fn test_markdown_to_text_plain_passthrough() {
        assert_eq!(markdown_to_text("just words"), "just words");
        assert_eq!(markdown_to_text(""), "");
    }

    #[test]
    fn test_render_turn_shows_speaker_and_attachments() {
        let turn = Turn::user(
            "see attached",
            vec![crate::models::TurnAttachment {
                name: "notes.pdf".to_string(),
                human_size: "2.0 KB".to_string(),
            }],
        );
        let rendered = render_turn(&turn);
        assert!(rendered.starts_with("You: see attached"));
        assert!(rendered.contains("[attached: notes.pdf (2.0 KB)]"));
    }

    #[test]
    fn test_review_card_names_section() {
        let payload = AgentPayload {
            section_title: "Use Cases".to_string(),
            section_content: "## Core Use Cases".to_string(),
            review_action_needed: true,
            ..Default::default()
        };
        let card = render_review_card(&payload);
        assert!(card.contains("Section for review: Use Cases"));
        assert!(card.contains("/approve"));
    }

    #[test]
    fn test_stage_tracker_markers() {
        let projection = vec![
            StageProjection {
                stage: PrdStage::InformationGathering,
                status: StageStatus::Approved,
            },
            StageProjection {
                stage: PrdStage::Review1ProblemGoals,
                status: StageStatus::InReview,
            },
            StageProjection {
                stage: PrdStage::Review2UseCases,
                status: StageStatus::Pending,
            },
        ];
        let tracker = render_stage_tracker(&projection);
        assert_eq!(
            tracker,
            "[x] Information Gathering\n[>] Problem & Goals\n[ ] Use Cases"
        );
    }

    #[test]
    fn test_confidence_rendering() {
        let payload = AgentPayload {
            overall_confidence: 80,
            confidence_breakdown: vec![ConfidenceEntry {
                aspect: "coverage".to_string(),
                score: 70,
                reasoning: "two flows missing".to_string(),
            }],
            accuracy_flags: vec!["metrics unverified".to_string()],
            ..Default::default()
        };
        let rendered = render_confidence(&payload);
        assert!(rendered.contains("Confidence: 80%"));
        assert!(rendered.contains("coverage 70% - two flows missing"));
        assert!(rendered.contains("! metrics unverified"));

        assert_eq!(render_confidence(&AgentPayload::default()), "");
    }

    #[test]
    fn test_export_prd_joins_sections_with_rules() {
        let sections = vec![
            ApprovedSection {
                title: "Use Cases".to_string(),
                content: "## Core Use Cases".to_string(),
            },
            ApprovedSection {
                title: "Risks".to_string(),
                content: String::new(),
            },
        ];
        let prd = export_prd(&sections);
        assert!(prd.starts_with("# Use Cases\n\n## Core Use Cases"));
        assert!(prd.contains("\n\n---\n\n# Risks"));
    }

    #[test]
    fn test_export_prd_empty_ledger() {
        assert_eq!(export_prd(&[]), "No approved sections yet.");
    }

    #[test]
    fn test_prd_preview_lists_every_expected_section() {
        let sections = vec![
            ApprovedSection {
                title: "Use Cases".to_string(),
                content: "## Core Use Cases".to_string(),
            },
            ApprovedSection {
                title: "Risks".to_string(),
                content: String::new(),
            },
        ];
        let preview = render_prd_preview(&sections);
        assert!(preview.contains("# Problem Statement & Goals\n\n(not yet approved)"));
        assert!(preview.contains("Core Use Cases"));
        assert!(preview.contains("# Risks\n\n(approved, content pending)"));
        assert!(preview.contains("# Gap Analysis & Next Steps"));
    }

    #[test]
    fn test_gap_items_rendering() {
        let payload = AgentPayload {
            gap_items: vec!["No offline story".to_string()],
            ..Default::default()
        };
        assert_eq!(
            render_gap_items(&payload),
            "Identified gaps:\n  - No offline story"
        );
        assert_eq!(render_gap_items(&AgentPayload::default()), "");
    }
}
