// PRD builder - interactive terminal client for the PRD-building agent

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use prd_builder_lib::chat::ChatController;
use prd_builder_lib::client::{HttpAgentClient, HttpUploadClient, UploadFile};
use prd_builder_lib::config::{AppConfig, ConfigLoader};
use prd_builder_lib::render;

/// PRD Builder - converse with an agent to draft and approve a PRD
#[derive(Parser, Debug)]
#[command(name = "prd-builder")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the agent service (overrides config)
    #[arg(long, env = "PRD_AGENT_URL")]
    agent_url: Option<String>,

    /// Agent identifier to converse with (overrides config)
    #[arg(long, env = "PRD_AGENT_ID")]
    agent_id: Option<String>,

    /// Base URL of the upload service (overrides config)
    #[arg(long, env = "PRD_UPLOAD_URL")]
    upload_url: Option<String>,

    /// Path to a config file (defaults to the global config)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let agent = HttpAgentClient::new(config.agent.base_url.clone());
    let uploader = HttpUploadClient::new(config.uploads.base_url.clone());
    let mut controller = ChatController::new(agent, uploader, config.agent.agent_id.clone());

    println!("PRD Builder - type a message, or /help for commands.");
    let mut printed = 0;

    if let Err(e) = controller.start().await {
        log::warn!("Session start rejected: {}", e);
    }
    printed = flush_output(&mut controller, printed);

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_command(line) {
            Command::Quit => break,
            Command::Help => print_help(),
            Command::Progress => {
                println!("{}", render::render_stage_tracker(&controller.stage_progress()));
                if controller.attachments().has_uploads_in_flight() {
                    println!("Uploads: {}%", controller.attachments().batch_progress());
                }
            }
            Command::Export => {
                println!("{}", render::export_prd(controller.store().approved_sections()));
            }
            Command::Preview => {
                println!("{}", render::render_prd_preview(controller.store().approved_sections()));
            }
            Command::Attach(paths) => {
                let files = read_files(&paths);
                if files.is_empty() {
                    println!("Nothing attached.");
                    continue;
                }
                controller.attach_files(files).await;
                for file in controller.attachments().files() {
                    use prd_builder_lib::chat::UploadState;
                    match &file.state {
                        UploadState::Uploaded { .. } => {
                            println!("  {} ({}) ready", file.name, file.human_size)
                        }
                        UploadState::Failed { message } => {
                            println!("  {} failed: {}", file.name, message)
                        }
                        UploadState::Uploading => {
                            println!("  {} uploading...", file.name)
                        }
                    }
                }
            }
            Command::Approve => {
                if let Err(e) = controller.approve().await {
                    println!("{}", e);
                }
                printed = flush_output(&mut controller, printed);
            }
            Command::Changes(feedback) => {
                if let Err(e) = controller.request_changes(&feedback).await {
                    println!("{}", e);
                }
                printed = flush_output(&mut controller, printed);
            }
            Command::Send(text) => {
                if let Err(e) = controller.send(&text).await {
                    println!("{}", e);
                }
                printed = flush_output(&mut controller, printed);
            }
        }
    }

    Ok(())
}

enum Command {
    Send(String),
    Attach(Vec<PathBuf>),
    Approve,
    Changes(String),
    Export,
    Preview,
    Progress,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Command {
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head {
        "/attach" => Command::Attach(rest.split_whitespace().map(PathBuf::from).collect()),
        "/approve" => Command::Approve,
        "/changes" => Command::Changes(rest.to_string()),
        "/export" => Command::Export,
        "/preview" => Command::Preview,
        "/progress" => Command::Progress,
        "/help" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        _ => Command::Send(line.to_string()),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  /attach <paths...>   upload files for the next message");
    println!("  /approve             approve the section under review");
    println!("  /changes <feedback>  request changes to the section under review");
    println!("  /progress            show the stage tracker");
    println!("  /preview             show all PRD sections with approval status");
    println!("  /export              print the PRD assembled from approved sections");
    println!("  /quit                exit");
    println!("Anything else is sent to the agent as a message.");
}

/// Print everything that arrived since the last flush: new turns, the
/// review card if one is pending, and any transient banner.
fn flush_output<A, U>(controller: &mut ChatController<A, U>, printed: usize) -> usize
where
    A: prd_builder_lib::client::AgentClient,
    U: prd_builder_lib::client::UploadClient,
{
    let turns = controller.store().turns();
    for turn in &turns[printed..] {
        println!("{}", render::render_turn(turn));

        if let Some(payload) = &turn.agent_payload {
            let confidence = render::render_confidence(payload);
            if !confidence.is_empty() {
                println!("{}", confidence);
            }
            let gaps = render::render_gap_items(payload);
            if !gaps.is_empty() {
                println!("{}", gaps);
            }
        }
        println!();
    }
    let count = turns.len();

    if let Some(pending) = controller.store().pending_review() {
        println!("{}", render::render_review_card(pending));
    }
    if let Some(banner) = controller.take_banner() {
        println!("! {}", banner);
    }

    count
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let loader = ConfigLoader::new();
    let mut config = match &cli.config {
        Some(path) => loader
            .load_from_path(path)
            .with_context(|| format!("loading config from {}", path.display()))?
            .with_context(|| format!("config file not found: {}", path.display()))?,
        None => loader.load_global()?.unwrap_or_default(),
    };

    if let Some(url) = &cli.agent_url {
        config.agent.base_url = url.clone();
    }
    if let Some(id) = &cli.agent_id {
        config.agent.agent_id = id.clone();
    }
    if let Some(url) = &cli.upload_url {
        config.uploads.base_url = url.clone();
    } else if cli.agent_url.is_some() {
        // With only the agent URL overridden, uploads follow it
        config.uploads.base_url = config.agent.base_url.clone();
    }

    Ok(config)
}

fn read_files(paths: &[PathBuf]) -> Vec<UploadFile> {
    let mut files = Vec::new();
    for path in paths {
        match std::fs::read(path) {
            Ok(data) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                files.push(UploadFile::from_bytes(name, data));
            }
            Err(e) => println!("Skipping {}: {}", path.display(), e),
        }
    }
    files
}
