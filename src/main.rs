use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;

use parallels_config::Config;
use parallels_dispatch::{DispatchScope, Dispatcher, ExecutionRequest, TracingNotifier, build_client};
use parallels_server::{AppState, prepare, shutdown_signal};

mod logging;

/// Parallels - POST a batch of JSON payloads to one webhook concurrently
#[derive(Parser)]
#[command(name = "parallels")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to a JSON config file. Environment variables override its values.
  #[arg(long, global = true, env = "PARALLELS_CONFIG")]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Serve the HTTP API (the default)
  Serve,

  /// Dispatch one batch and print the results as JSON
  Run {
    /// Path to the request file (reads stdin when omitted)
    request_file: Option<PathBuf>,
  },
}

fn main() -> Result<ExitCode> {
  let cli = Cli::parse();

  let config = load_config(cli.config.as_deref())?;
  logging::init(&config.logger)?;

  let rt = tokio::runtime::Runtime::new()?;

  match cli.command.unwrap_or(Commands::Serve) {
    Commands::Serve => {
      rt.block_on(serve(config))?;
      Ok(ExitCode::SUCCESS)
    }
    Commands::Run { request_file } => rt.block_on(run(config, request_file)),
  }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
  let config = match path {
    Some(path) => Config::from_file(path)?,
    None => Config::from_env()?,
  };
  config.validate().context("invalid configuration")?;
  Ok(config)
}

fn dispatcher(config: &Config) -> Result<Dispatcher> {
  let client = build_client(&config.dispatch.user_agent).context("failed to build HTTP client")?;
  Ok(Dispatcher::new(client, Arc::new(TracingNotifier)))
}

async fn serve(config: Config) -> Result<()> {
  let state = AppState::new(
    dispatcher(&config)?,
    config.dispatch.clone(),
    CancellationToken::new(),
  );

  let listener = parallels_server::bind(&config.server).await?;
  info!(
    addr = %config.server.addr(),
    log_level = %config.logger.level,
    default_timeout = config.dispatch.default_timeout,
    "starting parallels server"
  );

  parallels_server::serve(listener, state, &config.server, shutdown_signal()).await?;
  Ok(())
}

async fn run(config: Config, request_file: Option<PathBuf>) -> Result<ExitCode> {
  let content = match &request_file {
    Some(path) => tokio::fs::read_to_string(path)
      .await
      .with_context(|| format!("failed to read request file: {}", path.display()))?,
    None => read_request_from_stdin()?,
  };

  let request: ExecutionRequest =
    serde_json::from_str(&content).context("failed to parse execution request")?;
  let request = prepare(request, &config.dispatch).context("invalid execution request")?;

  eprintln!(
    "Dispatching {} payload(s) to {}",
    request.payloads.len(),
    request.webhook_url
  );

  let cancel = CancellationToken::new();
  let scope = DispatchScope::new(cancel.clone())
    .with_timeout(Duration::from_secs(request.timeout) + config.dispatch.deadline_margin());

  // Ctrl-C cancels the batch; every task still reports.
  let interrupt = tokio::spawn(async move {
    shutdown_signal().await;
    cancel.cancel();
  });

  let response = dispatcher(&config)?.dispatch(request, scope).await;
  interrupt.abort();

  let summary = response.summary;
  eprintln!(
    "Completed: {} succeeded, {} failed ({} timed out) in {} ms",
    summary.successful_requests,
    summary.failed_requests,
    summary.timeout_requests,
    summary.total_duration_ms
  );

  println!("{}", serde_json::to_string_pretty(&response)?);

  if summary.successful_requests == 0 {
    Ok(ExitCode::from(2))
  } else {
    Ok(ExitCode::SUCCESS)
  }
}

fn read_request_from_stdin() -> Result<String> {
  if io::stdin().is_terminal() {
    bail!("no request given: pass a request file or pipe one on stdin");
  }

  let mut input = String::new();
  io::stdin()
    .read_to_string(&mut input)
    .context("failed to read request from stdin")?;

  if input.trim().is_empty() {
    bail!("request on stdin is empty");
  }
  Ok(input)
}
