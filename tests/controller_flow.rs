// End-to-end conversation flows against scripted agent and upload services

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;
use serde_json::json;

use prd_builder_lib::chat::{ChatController, UploadState, EXTRACTION_PROMPT};
use prd_builder_lib::client::{
    AgentCallResult, AgentClient, AgentReplyBody, AgentRequest, ClientError, UploadClient,
    UploadFile, UploadResult,
};
use prd_builder_lib::models::{PrdStage, StageStatus, TurnRole};
use prd_builder_lib::render;

struct ScriptedAgent {
    replies: Mutex<VecDeque<Result<AgentCallResult, ClientError>>>,
    requests: Arc<Mutex<Vec<AgentRequest>>>,
}

impl ScriptedAgent {
    fn new(replies: Vec<Result<AgentCallResult, ClientError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Arc::new(Mutex::new(vec![])),
        }
    }

    /// Handle to the request log, usable after the agent moves into the
    /// controller
    fn request_log(&self) -> Arc<Mutex<Vec<AgentRequest>>> {
        Arc::clone(&self.requests)
    }
}

impl AgentClient for ScriptedAgent {
    fn call_agent(
        &self,
        request: AgentRequest,
    ) -> BoxFuture<'_, Result<AgentCallResult, ClientError>> {
        self.requests.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ClientError::Unreachable("script exhausted".to_string())));
        Box::pin(async move { reply })
    }
}

struct ScriptedUploader {
    outcomes: Mutex<Vec<(String, Result<UploadResult, ClientError>)>>,
}

impl ScriptedUploader {
    fn new(outcomes: Vec<(&str, Result<UploadResult, ClientError>)>) -> Self {
        Self {
            outcomes: Mutex::new(
                outcomes
                    .into_iter()
                    .map(|(name, outcome)| (name.to_string(), outcome))
                    .collect(),
            ),
        }
    }

    fn empty() -> Self {
        Self::new(vec![])
    }
}

impl UploadClient for ScriptedUploader {
    fn upload(&self, file: UploadFile) -> BoxFuture<'_, Result<UploadResult, ClientError>> {
        let mut outcomes = self.outcomes.lock().unwrap();
        let position = outcomes.iter().position(|(name, _)| *name == file.name);
        let outcome = match position {
            Some(i) => outcomes.remove(i).1,
            None => Err(ClientError::Unreachable("unexpected upload".to_string())),
        };
        Box::pin(async move { outcome })
    }
}

fn structured(result: serde_json::Value) -> Result<AgentCallResult, ClientError> {
    Ok(AgentCallResult {
        success: true,
        response: Some(AgentReplyBody {
            message: None,
            result: Some(result),
        }),
    })
}

fn string_result(result: &str) -> Result<AgentCallResult, ClientError> {
    structured(json!(result))
}

fn uploaded(asset_id: &str) -> Result<UploadResult, ClientError> {
    Ok(UploadResult {
        success: true,
        asset_ids: vec![asset_id.to_string()],
        error: None,
    })
}

#[tokio::test]
async fn full_review_cycle_builds_an_exportable_prd() {
    let agent = ScriptedAgent::new(vec![
        structured(json!({
            "message": "Welcome! What are we building?",
            "current_stage": "information_gathering"
        })),
        structured(json!({
            "message": "Here is the problem statement draft.",
            "current_stage": "review_1_problem_goals",
            "review_action_needed": true,
            "section_title": "Problem Statement & Goals",
            "section_content": "## Problem\n\nTeams lose track of work."
        })),
        structured(json!({
            "message": "Approved. On to use cases.",
            "current_stage": "review_2_use_cases",
            "review_action_needed": true,
            "section_title": "Use Cases",
            "section_content": "## Core Use Cases",
            "approved_sections": ["Problem Statement & Goals"]
        })),
        structured(json!({
            "message": "Revised use cases.",
            "current_stage": "review_2_use_cases",
            "review_action_needed": true,
            "section_title": "Use Cases",
            "section_content": "## Core Use Cases (revised)"
        })),
    ]);
    let mut controller = ChatController::new(agent, ScriptedUploader::empty(), "agent-1");

    controller.start().await.unwrap();
    controller.send("a task tracker for remote teams").await.unwrap();
    controller.approve().await.unwrap();
    controller
        .request_changes("cover the reporting flow too")
        .await
        .unwrap();

    // The kickoff is hidden, so turns are agent, user, agent, user, agent,
    // user, agent
    let turns = controller.store().turns();
    assert_eq!(turns.len(), 7);
    assert_eq!(turns[0].role, TurnRole::Agent);
    assert_eq!(turns[3].content, "I approve this section");
    assert_eq!(
        turns[5].content,
        "I would like the following changes: cover the reporting flow too"
    );

    // Ledger captured the reviewed content at approval time
    let ledger = controller.store().approved_sections();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].title, "Problem Statement & Goals");
    assert_eq!(ledger[0].content, "## Problem\n\nTeams lose track of work.");

    // The revised draft is pending review again
    let pending = controller.store().pending_review().unwrap();
    assert_eq!(pending.section_content, "## Core Use Cases (revised)");

    let prd = render::export_prd(ledger);
    assert!(prd.starts_with("# Problem Statement & Goals"));
    assert!(prd.contains("Teams lose track of work."));
}

#[tokio::test]
async fn unrecognized_stage_key_leaves_stage_untouched() {
    // A JSON-string result with a bogus stage key normalizes to message
    // "hi" and no stage change
    let agent = ScriptedAgent::new(vec![
        structured(json!({
            "message": "ok",
            "current_stage": "information_gathering"
        })),
        string_result("{\"message\":\"hi\",\"current_stage\":\"bogus\"}"),
    ]);
    let mut controller = ChatController::new(agent, ScriptedUploader::empty(), "agent-1");

    controller.send("start").await.unwrap();
    controller.send("next").await.unwrap();

    assert_eq!(
        controller.store().current_stage(),
        PrdStage::InformationGathering
    );
    assert_eq!(controller.store().turns().last().unwrap().content, "hi");
}

#[tokio::test]
async fn mixed_upload_batch_sends_only_the_survivor() {
    // Two files, one upload succeeds and one fails; an empty-text send
    // ships the extraction prompt referencing only the success
    let agent = ScriptedAgent::new(vec![structured(json!({
        "message": "Reading your documents now."
    }))]);
    let uploader = ScriptedUploader::new(vec![
        ("requirements.pdf", uploaded("a1")),
        (
            "mockups.png",
            Err(ClientError::Unreachable("storage down".to_string())),
        ),
    ]);
    let request_log = agent.request_log();
    let mut controller = ChatController::new(agent, uploader, "agent-1");

    controller
        .attach_files(vec![
            UploadFile::from_bytes("requirements.pdf", vec![0; 4096]),
            UploadFile::from_bytes("mockups.png", vec![0; 4096]),
        ])
        .await;

    // Both files reached a terminal state; the failure is visible on its chip
    assert_eq!(controller.attachments().batch_progress(), 100);
    let failed = controller
        .attachments()
        .files()
        .iter()
        .find(|f| f.name == "mockups.png")
        .unwrap();
    assert!(matches!(failed.state, UploadState::Failed { .. }));

    controller.send("").await.unwrap();

    let requests = request_log.lock().unwrap();
    assert_eq!(requests[0].message, EXTRACTION_PROMPT);
    assert_eq!(requests[0].asset_ids, vec!["a1"]);

    let user_turn = &controller.store().turns()[0];
    let chips = user_turn.attachments.as_ref().unwrap();
    assert_eq!(chips.len(), 1);
    assert_eq!(chips[0].name, "requirements.pdf");
}

#[tokio::test]
async fn agent_announced_approval_creates_placeholder_entry() {
    // approved_sections arrives with no prior explicit approval
    let agent = ScriptedAgent::new(vec![structured(json!({
        "message": "Use cases were accepted earlier in our chat.",
        "approved_sections": ["Use Cases"]
    }))]);
    let mut controller = ChatController::new(agent, ScriptedUploader::empty(), "agent-1");

    controller.send("where were we?").await.unwrap();

    let ledger = controller.store().approved_sections();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].title, "Use Cases");
    assert_eq!(ledger[0].content, "");

    // The placeholder still lights up its stage in the tracker
    let progress = controller.stage_progress();
    let use_cases = progress
        .iter()
        .find(|p| p.stage == PrdStage::Review2UseCases)
        .unwrap();
    assert_eq!(use_cases.status, StageStatus::Approved);
}

#[tokio::test]
async fn repeated_stage_declaration_is_idempotent() {
    // The same stage and approvals declared twice in a row
    let reply = json!({
        "message": "Still reviewing use cases.",
        "current_stage": "review_2_use_cases",
        "approved_sections": ["Problem Statement & Goals"]
    });
    let agent = ScriptedAgent::new(vec![structured(reply.clone()), structured(reply)]);
    let mut controller = ChatController::new(agent, ScriptedUploader::empty(), "agent-1");

    controller.send("one").await.unwrap();
    let stage_after_first = controller.store().current_stage();
    controller.send("two").await.unwrap();

    assert_eq!(controller.store().current_stage(), stage_after_first);
    assert_eq!(controller.store().current_stage(), PrdStage::Review2UseCases);
    assert_eq!(controller.store().approved_sections().len(), 1);
}

#[tokio::test]
async fn transport_failure_recovers_with_retry_path() {
    let agent = ScriptedAgent::new(vec![
        Err(ClientError::Unreachable("connection refused".to_string())),
        structured(json!({"message": "Back online."})),
    ]);
    let mut controller = ChatController::new(agent, ScriptedUploader::empty(), "agent-1");

    controller.send("hello?").await.unwrap();
    assert!(controller.take_banner().is_some());
    assert_eq!(
        controller.store().turns()[1].content,
        "Sorry, something went wrong. Please try again."
    );

    // Re-sending works; the banner does not linger
    controller.send("hello again").await.unwrap();
    assert_eq!(controller.take_banner(), None);
    assert_eq!(controller.store().turns().last().unwrap().content, "Back online.");
}
