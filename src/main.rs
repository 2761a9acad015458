//! Atelier - AI image generation studio with a durable local history.

mod adapters;
mod cassette;
mod cli;
mod config;
mod context;
mod error;
mod history;
mod output;
mod ports;
mod reference;
mod session;

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, GenerateArgs, HistoryCommand};
use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::AtelierError;
use crate::ports::GenerationRequest;
use crate::session::{FailureKind, GenerationSession, SessionState};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Initialize stderr logging; `-v` raises the default filter to debug,
/// `RUST_LOG` overrides both.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "atelier=debug" } else { "atelier=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

async fn run(cli: Cli) -> Result<(), AtelierError> {
    let config_path = config::discover_config_path(cli.config.as_deref());
    let config = Config::load(&config_path).map_err(AtelierError::Config)?;

    match cli.command {
        Command::Generate(args) => run_generate(args, &config).await,
        Command::History { command } => run_history(&command, &config),
    }
}

async fn run_generate(args: GenerateArgs, config: &Config) -> Result<(), AtelierError> {
    let prompt = args.resolve_prompt()?;

    let mut reference_images = Vec::with_capacity(args.images.len());
    for path in &args.images {
        reference_images.push(reference::load_reference_image(Path::new(path))?);
    }

    let request = GenerationRequest {
        prompt,
        reference_images,
        aspect_ratio: args.aspect_ratio,
    };

    // Mode selection: replay / record / live.
    let replay_path = std::env::var("ATELIER_REPLAY").ok();
    let is_recording = std::env::var("ATELIER_REC").is_ok_and(|v| v == "true" || v == "1");

    let (ctx, recording_session) = if let Some(ref cassette_path) = replay_path {
        debug!(cassette = %cassette_path, "replaying");
        (ServiceContext::replaying(Path::new(cassette_path), config)?, None)
    } else if is_recording {
        debug!("recording mode enabled");
        let (ctx, session) = ServiceContext::recording(config)?;
        (ctx, Some(session))
    } else {
        (ServiceContext::live(config), None)
    };

    let mut session = GenerationSession::new(ctx.generator, ctx.history);
    session.submit(request).await?;

    let outcome = match session.state() {
        SessionState::Succeeded { image, request } => {
            let output_path =
                output::resolve_output_path(args.output.as_deref(), &request.prompt);
            output::save_image(&image.data, &image.mime_type, &output_path)?;
            eprintln!("Saved: {}", output_path.display());
            Ok(())
        }
        SessionState::Failed { kind: FailureKind::MissingCredential, .. } => {
            Err(AtelierError::MissingApiKey { env_var: "GEMINI_API_KEY".into() })
        }
        SessionState::Failed { kind: FailureKind::Generation, .. } => {
            Err(AtelierError::Generation)
        }
        // A whitespace-only prompt leaves the session idle; nothing to do.
        SessionState::Idle | SessionState::Loading { .. } => Ok(()),
    };

    // Finish recording if active. The session holds the recording
    // generator, so it must go first.
    if let Some(recording) = recording_session {
        drop(session);
        match recording.finish() {
            Ok(path) => eprintln!("Cassette saved: {}", path.display()),
            Err(e) => eprintln!("Warning: failed to save cassette: {e}"),
        }
    }

    outcome
}

fn run_history(command: &HistoryCommand, config: &Config) -> Result<(), AtelierError> {
    let history = context::history_store(config);

    match command {
        HistoryCommand::List => {
            let log = history.list();
            if log.is_empty() {
                eprintln!("No generations recorded yet.");
                return Ok(());
            }
            for record in log {
                println!(
                    "{}  {}  {}",
                    record.id,
                    format_timestamp(record.created_at_ms),
                    summarize(&record.prompt)
                );
            }
            Ok(())
        }
        HistoryCommand::Save { id, output } => {
            let record = history
                .list()
                .into_iter()
                .find(|r| r.id == *id)
                .ok_or_else(|| {
                    AtelierError::InvalidArgument(format!("No history record with id '{id}'"))
                })?;
            let path = output
                .as_deref()
                .map_or_else(|| PathBuf::from(format!("generated-image-{id}.jpg")), PathBuf::from);
            output::save_image(&record.image_data, &record.mime_type, &path)?;
            eprintln!("Saved: {}", path.display());
            Ok(())
        }
        HistoryCommand::Remove { id } => {
            history.remove(id)?;
            eprintln!("Removed: {id}");
            Ok(())
        }
    }
}

/// Render a millisecond timestamp for the history listing.
fn format_timestamp(millis: i64) -> String {
    chrono::DateTime::<chrono::Utc>::from_timestamp_millis(millis)
        .map_or_else(|| millis.to_string(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Single-line prompt preview for the history listing.
fn summarize(prompt: &str) -> String {
    const MAX: usize = 60;
    let flattened: String = prompt.split_whitespace().collect::<Vec<_>>().join(" ");
    if flattened.chars().count() <= MAX {
        flattened
    } else {
        let truncated: String = flattened.chars().take(MAX).collect();
        format!("{truncated}...")
    }
}
