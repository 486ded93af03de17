/*
[INPUT]:  CLI arguments, optional configuration file, Ctrl-C
[OUTPUT]: Kline events on stdout until interrupted or the stream fails
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, startup flow, or shutdown handling
*/

use std::io;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use binance_wss_adapter::{KlineWebSocket, StreamConfig, SubscriptionTarget};
use binance_wss_cli::cli::{Command, KlineArgs, WssCommand};
use binance_wss_cli::{Cli, Settings, run_session};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config_path.as_deref()).context("load settings")?;

    match cli.command {
        Command::Wss {
            command: WssCommand::Kline(args),
        } => {
            init_tracing(cli.log_level.as_deref(), &settings, args.verbose)?;
            run_kline(args, settings).await
        }
    }
}

async fn run_kline(args: KlineArgs, settings: Settings) -> Result<()> {
    let target = SubscriptionTarget::new(args.symbol, args.interval)
        .context("invalid subscription target")?;
    let ws = KlineWebSocket::with_config(StreamConfig {
        base_url: settings.base_url.clone(),
    });

    let session = ws
        .open(&target)
        .await
        .with_context(|| format!("open {target} stream"))?;

    let format = args.format.unwrap_or(settings.format);
    let mut sink = format.sink(io::stdout());

    let outcome = run_session(session, interrupt(), sink.as_mut())
        .await
        .with_context(|| format!("{target} stream"))?;
    info!(events = outcome.events, reason = ?outcome.reason, "done");

    Ok(())
}

/// Resolves on the first SIGINT. Never resolves if the handler cannot be installed.
async fn interrupt() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to install SIGINT handler");
        std::future::pending::<()>().await;
    }
    info!("received SIGINT");
}

/// Filter precedence: --log-level, RUST_LOG, --verbose (info), config file, warn
fn init_tracing(flag: Option<&str>, settings: &Settings, verbose: bool) -> Result<()> {
    let filter = match flag {
        Some(level) => EnvFilter::try_new(level).context("invalid log level")?,
        None => match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => {
                let level = if verbose {
                    "info"
                } else {
                    settings.log_level.as_deref().unwrap_or("warn")
                };
                EnvFilter::try_new(level).context("invalid log level")?
            }
        },
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}
