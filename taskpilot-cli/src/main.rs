mod commands;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use taskpilot_appcore::service::AppService;
use taskpilot_core::prompt::UserInput;
use taskpilot_core::types::{RecordId, StatusKind, StatusMessage};
use taskpilot_engine::state::AppState;
use taskpilot_runtime::defaults::default_config_dir;
use taskpilot_runtime::fs_util::ensure_dir;
use taskpilot_runtime::image::load_image;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::commands::{Command, HELP, KeyTarget, parse_line};

#[derive(Parser)]
#[command(name = "taskpilot")]
#[command(about = "Turn free-form requests and screenshots into monday.com tasks")]
#[command(version)]
struct Cli {
    /// Directory holding config.json and settings.json
    #[arg(long, env = "TASKPILOT_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Keep API keys in the OS keyring instead of settings.json
    #[arg(long)]
    keyring: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn print_status(status: &StatusMessage) {
    match status.kind {
        StatusKind::Error => println!("! {}", status.text),
        StatusKind::Success => println!("ok {}", status.text),
        StatusKind::Info => println!("- {}", status.text),
    }
}

fn print_pending(state: &AppState) {
    if state.pending.is_empty() {
        println!("no pending tasks");
        return;
    }
    for (i, r) in state.pending.iter().enumerate() {
        let busy = if state.is_approving(&r.id) { " (approving)" } else { "" };
        println!("{}. {} [{} / {}]{busy}", i + 1, r.title, r.status, r.priority);
        if r.has_description() {
            println!("   {}", r.description);
        }
    }
}

fn print_draft(draft: &UserInput) {
    match (draft.text_content(), &draft.image) {
        (None, None) => println!("draft is empty"),
        (text, image) => {
            if let Some(t) = text {
                println!("text: {t}");
            }
            if let Some(img) = image {
                println!("image: {} ({} bytes)", img.mime_type, img.bytes.len());
            }
        }
    }
}

/// Resolves a 1-based list position against the current pending list.
async fn record_at(svc: &AppService, index: usize) -> Option<RecordId> {
    let state = svc.snapshot().await;
    let id = state.pending.get(index - 1).map(|r| r.id.clone());
    if id.is_none() {
        println!("! no task #{index} (see `list`)");
    }
    id
}

async fn run_command(svc: &AppService, draft: &mut UserInput, cmd: Command) -> bool {
    match cmd {
        Command::Text(text) => {
            draft.text = Some(text).filter(|t| !t.is_empty());
            print_draft(draft);
        }
        Command::Image(path) => match load_image(&path) {
            Ok(img) => {
                draft.image = Some(img);
                print_draft(draft);
            }
            Err(e) => println!("! {e}"),
        },
        Command::Clear => {
            *draft = UserInput::default();
            svc.clear_status().await;
            println!("draft cleared");
        }
        Command::Generate => {
            if draft.is_empty() {
                println!("! nothing to send: use `text` or `image` first");
                return true;
            }
            println!("- generating...");
            let outcome = svc.generate(draft.clone()).await;
            if let Some(status) = outcome.status() {
                print_status(&status);
            }
            print_pending(&svc.snapshot().await);
        }
        Command::List => print_pending(&svc.snapshot().await),
        Command::Edit { index, patch } => {
            if let Some(id) = record_at(svc, index).await {
                if svc.edit(&id, patch).await {
                    print_pending(&svc.snapshot().await);
                }
            }
        }
        Command::Approve(index) => {
            if let Some(id) = record_at(svc, index).await {
                // Approvals run independently so the session stays responsive.
                let svc = svc.clone();
                tokio::spawn(async move {
                    let outcome = svc.approve(&id).await;
                    print_status(&outcome.status());
                });
            }
        }
        Command::Discard(index) => {
            if let Some(id) = record_at(svc, index).await {
                svc.discard(&id).await;
                print_pending(&svc.snapshot().await);
            }
        }
        Command::Companies => {
            let state = svc.snapshot().await;
            if state.context.companies.is_empty() {
                println!("no companies loaded");
            }
            for c in &state.context.companies {
                println!("{} ({})", c.name, c.code);
            }
        }
        Command::Sync => {
            let outcome = svc.sync_context().await;
            print_status(&outcome.status());
        }
        Command::Key { target, value } => {
            let mut creds = svc.snapshot().await.credentials;
            match target {
                KeyTarget::Content => creds.content_api_key = value,
                KeyTarget::Board => creds.board_api_key = value,
            }
            svc.set_credentials(creds).await;
            println!("key updated (run `save` to persist)");
        }
        Command::Save => match svc.save_settings().await {
            Ok(outcome) => {
                print_status(&StatusMessage::success("Settings saved!"));
                print_status(&outcome.status());
            }
            Err(e) => println!("! failed to save settings: {e:#}"),
        },
        Command::Status => match svc.snapshot().await.status {
            Some(status) => print_status(&status),
            None => println!("no status"),
        },
        Command::Help => println!("{HELP}"),
        Command::Quit => return false,
    }
    true
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let dir = cli.config_dir.unwrap_or_else(default_config_dir);
    ensure_dir(&dir)?;
    log::debug!("using config dir {}", dir.display());

    let svc = AppService::open(&dir, cli.keyring)?;

    if svc.snapshot().await.credentials.board_key().is_some() {
        svc.refresh_context_in_background().await;
    }
    let refresh = svc.spawn_context_refresh(svc.context_refresh_period());

    println!("taskpilot: type `help` for commands");
    let mut draft = UserInput::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        match parse_line(&line) {
            Ok(Some(cmd)) => {
                if !run_command(&svc, &mut draft, cmd).await {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => println!("! {e}"),
        }
    }

    refresh.abort();
    Ok(())
}
