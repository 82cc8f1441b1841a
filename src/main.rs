use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use usagebar_core::config::{Config, Settings};
use usagebar_core::sinks::{spawn_bridge, NullNotificationSink};
use usagebar_core::{CycleOutcome, HttpUsageFetcher, Scheduler, SharedToken};

mod commands;
mod sinks;

use sinks::{LogNotifier, TerminalUi};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Config::parse_args();

    // Setup logging
    setup_logging(cli.debug);

    // Load settings
    let mut settings = Settings::load(cli.config.as_ref())?;
    settings.merge_cli(&cli);
    settings.validate();

    let token = SharedToken::new(settings.token.clone());
    if !token.is_set() {
        warn!("No access token configured; set `token` in config.toml, pass --token or type `t <token>`");
    }
    let fetcher = HttpUsageFetcher::new(settings.endpoint.clone(), settings.request_timeout());

    if cli.once {
        return run_once(fetcher, token).await;
    }

    let handle = Arc::new(
        Scheduler::new(fetcher, token.clone())
            .with_interval(settings.refresh_interval())
            .start(),
    );

    let bridge = if settings.notifications.enabled {
        spawn_bridge(&handle, TerminalUi::new(), LogNotifier)
    } else {
        spawn_bridge(&handle, TerminalUi::new(), NullNotificationSink)
    };

    let input = tokio::spawn(commands::run(Arc::clone(&handle), token));

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl-C")?;
            info!("Interrupted, shutting down");
        }
        _ = input => info!("Quit requested, shutting down"),
    }

    handle.stop().await;
    if let Err(e) = bridge.await {
        warn!(error = %e, "Sink bridge ended abnormally");
    }
    Ok(())
}

/// Run a single cycle and print the detail view
async fn run_once(fetcher: HttpUsageFetcher, token: SharedToken) -> Result<()> {
    let handle = Scheduler::new(fetcher, token).start();
    // Joins the immediate first tick instead of fetching twice
    let outcome = handle.force_refresh().await?;
    let state = handle.state();
    handle.stop().await;

    for line in state.detail_lines(Utc::now()) {
        println!("{}", line);
    }

    match outcome {
        CycleOutcome::Updated => Ok(()),
        CycleOutcome::SkippedNoToken => bail!("No access token configured"),
        CycleOutcome::Failed(e) => Err(e).context("Usage fetch failed"),
    }
}

fn setup_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("usagebar=debug,usagebar_core=debug")
    } else {
        EnvFilter::new("usagebar=info,usagebar_core=info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
