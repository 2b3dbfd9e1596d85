use std::io;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use conversation_log::{Clock, SystemClock};
use crew_debugger::{system_instructions_from_env, SessionController};
use debugger_cli::config::{CliConfig, API_KEY_ENV_VAR};
use debugger_cli::files::ArtifactPaths;
use debugger_cli::repl::Repl;
use generation_client::GenerationClient;
use generation_client_messages_api::MessagesApiGenerationClient;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "crew-debugger",
    version,
    about = "Diagnose a CrewAI project by talking to a model primed with its files"
)]
struct Cli {
    #[command(flatten)]
    files: ArtifactPaths,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    // Resolve the local offset before the client runtime spawns threads.
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::local());

    let config = CliConfig::from_env()?;
    let api_config = config.messages_api_config(std::env::var(API_KEY_ENV_VAR).ok())?;
    let client = MessagesApiGenerationClient::new(api_config)
        .context("failed to start the generation client")?;
    let profile = client.profile();
    tracing::info!(provider = %profile.provider_id, model = %profile.model_id, "client ready");

    let controller = SessionController::with_clock(
        Arc::new(client),
        system_instructions_from_env(),
        Arc::clone(&clock),
    );
    let working_dir = std::env::current_dir().context("failed to resolve working directory")?;

    let stdin = io::stdin();
    Repl::new(
        &controller,
        &cli.files,
        clock,
        working_dir,
        io::stdout().lock(),
        io::stderr(),
    )
    .run(stdin.lock())?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
