//! Interactive commands read from stdin while the monitor runs.

use std::sync::Arc;

use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use usagebar_core::{CycleOutcome, SchedulerHandle, SharedToken};

const HELP: &str = "commands: r = refresh now, d = details, t <token> = set token, q = quit";

/// Action parsed from one input line
#[derive(Debug, PartialEq, Eq)]
pub enum CommandAction {
    /// Blank line
    None,
    Refresh,
    Details,
    SetToken(String),
    Help,
    Quit,
    Unknown(String),
}

/// Parse one input line
pub fn parse_command(line: &str) -> CommandAction {
    let line = line.trim();
    let (cmd, arg) = match line.split_once(char::is_whitespace) {
        Some((cmd, arg)) => (cmd, arg.trim()),
        None => (line, ""),
    };

    match cmd {
        "" => CommandAction::None,
        "r" | "refresh" => CommandAction::Refresh,
        "d" | "details" => CommandAction::Details,
        "t" | "token" if !arg.is_empty() => CommandAction::SetToken(arg.to_string()),
        "h" | "help" | "?" => CommandAction::Help,
        "q" | "quit" | "exit" => CommandAction::Quit,
        other => CommandAction::Unknown(other.to_string()),
    }
}

/// Read commands until `quit`. On EOF (no terminal attached) this never
/// returns, leaving shutdown to Ctrl-C.
pub async fn run(handle: Arc<SchedulerHandle>, token: SharedToken) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", HELP);

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!("stdin closed; interactive commands disabled");
                std::future::pending::<()>().await;
                return;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read stdin");
                std::future::pending::<()>().await;
                return;
            }
        };

        match parse_command(&line) {
            CommandAction::None => {}
            CommandAction::Refresh => refresh(&handle).await,
            CommandAction::Details => {
                for line in handle.state().detail_lines(Utc::now()) {
                    println!("{}", line);
                }
            }
            CommandAction::SetToken(new_token) => {
                token.set(Some(new_token));
                info!("Access token updated");
                refresh(&handle).await;
            }
            CommandAction::Help => println!("{}", HELP),
            CommandAction::Quit => return,
            CommandAction::Unknown(cmd) => println!("unknown command '{}'; {}", cmd, HELP),
        }
    }
}

async fn refresh(handle: &SchedulerHandle) {
    match handle.force_refresh().await {
        Ok(CycleOutcome::Updated) => debug!("Manual refresh complete"),
        Ok(CycleOutcome::Failed(e)) => warn!(error = %e, "Manual refresh failed"),
        Ok(CycleOutcome::SkippedNoToken) => warn!("Manual refresh skipped: no access token"),
        Err(e) => warn!(error = %e, "Manual refresh unavailable"),
    }
}
