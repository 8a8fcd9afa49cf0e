use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use billsight_client::{CancellationToken, ContentUnderstandingClient, HttpTransport};
use billsight_extract::Normalizer;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::Settings;

#[derive(Debug, Parser)]
#[command(name = "billsight", version, about = "Extract billing data from utility bills")]
struct Cli {
    /// Settings file (TOML).
    #[arg(long, global = true, env = "BILLSIGHT_CONFIG")]
    config: Option<PathBuf>,

    /// Service endpoint, overrides settings and environment.
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Analyzer id, overrides settings and environment.
    #[arg(long, global = true)]
    analyzer: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Analyze local files or URLs and print the extracted records as JSON.
    Analyze {
        #[arg(long)]
        timeout_secs: Option<u64>,
        #[arg(long)]
        interval_secs: Option<u64>,
        #[arg(required = true)]
        targets: Vec<String>,
    },
    /// Replace the analyzer with the schema in a JSON definition file.
    Provision {
        #[arg(long)]
        definition: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every document succeeded.
async fn run(cli: Cli) -> anyhow::Result<bool> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(endpoint) = cli.endpoint {
        settings.endpoint = Some(endpoint);
    }
    if let Some(analyzer) = cli.analyzer {
        settings.analyzer_id = Some(analyzer);
    }
    if let Command::Analyze { timeout_secs, interval_secs, .. } = &cli.command {
        if let Some(secs) = timeout_secs {
            settings.polling.timeout_secs = *secs;
        }
        if let Some(secs) = interval_secs {
            settings.polling.interval_secs = *secs;
        }
    }

    let analyzer_id = settings.analyzer_id()?.to_string();
    let client = build_client(&settings)?;

    // ── Ctrl-C cancels any in-flight wait ────────────────────────────────────
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling");
            on_signal.cancel();
        }
    });

    match cli.command {
        Command::Analyze { targets, .. } => {
            let normalizer = Normalizer::new(settings.fields.clone());
            let reports =
                commands::analyze(&client, &analyzer_id, &normalizer, &targets, &cancel).await;
            println!("{}", serde_json::to_string_pretty(&reports)?);

            let failed = reports.iter().filter(|r| !r.is_success()).count();
            tracing::info!(total = reports.len(), failed, "Batch complete");
            Ok(failed == 0 && reports.len() == targets.len())
        }
        Command::Provision { definition } => {
            let text = std::fs::read_to_string(&definition)
                .with_context(|| format!("Failed to read {}", definition.display()))?;
            let result = commands::provision(&client, &analyzer_id, &text, &cancel)
                .await
                .map_err(|e| anyhow::anyhow!(e.message))?;
            println!("{}", serde_json::to_string_pretty(result.raw())?);
            Ok(true)
        }
    }
}

fn build_client(settings: &Settings) -> anyhow::Result<ContentUnderstandingClient<HttpTransport>> {
    let transport = HttpTransport::new(settings.request_timeout())?;
    let client = settings.client_builder()?.build(transport)?;
    tracing::debug!(
        interval = ?Duration::from_secs(settings.polling.interval_secs),
        timeout = ?Duration::from_secs(settings.polling.timeout_secs),
        "Client ready"
    );
    Ok(client)
}
