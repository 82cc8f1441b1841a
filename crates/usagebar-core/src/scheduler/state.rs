//! Published engine state, as seen by UI consumers.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use tokio::sync::watch;

use crate::indicator::RenderIntent;
use crate::usage::{format_reset_in, menu_line, NormalizedBucket, UsageWindow};

/// Sender for usage state updates
pub type UsageStateSender = watch::Sender<UsageState>;
/// Receiver for usage state updates
pub type UsageStateReceiver = watch::Receiver<UsageState>;

/// Create a watch channel for usage state
pub fn usage_channel() -> (UsageStateSender, UsageStateReceiver) {
    watch::channel(UsageState::default())
}

/// Connection status shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum EngineStatus {
    /// No cycle has completed yet
    Starting,
    /// No token available; fetches are skipped
    NoToken,
    /// Last cycle succeeded
    Connected,
    /// Last cycle failed with this message
    Error(String),
}

impl EngineStatus {
    /// Short status label
    pub fn label(&self) -> &'static str {
        match self {
            EngineStatus::Starting => "Starting",
            EngineStatus::NoToken => "No token",
            EngineStatus::Connected => "Connected",
            EngineStatus::Error(_) => "Error",
        }
    }
}

/// Whether a fetch is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum EnginePhase {
    #[default]
    Idle,
    Fetching,
}

/// Complete output of one pipeline run.
///
/// Replaced as a whole on every cycle; never patched field by field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageState {
    pub status: EngineStatus,
    pub intent: RenderIntent,
    pub five_hour: Option<NormalizedBucket>,
    pub seven_day: Option<NormalizedBucket>,
    /// Menu line for the 5-hour window
    pub menu_5h: String,
    /// Menu line for the 7-day window
    pub menu_7d: String,
    /// When the last fetch completed (successfully or not)
    pub last_updated: Option<DateTime<Utc>>,
}

impl Default for UsageState {
    fn default() -> Self {
        Self {
            status: EngineStatus::Starting,
            intent: RenderIntent::placeholder(),
            five_hour: None,
            seven_day: None,
            menu_5h: format!("{}: --", UsageWindow::FiveHour.short_label()),
            menu_7d: format!("{}: --", UsageWindow::SevenDay.short_label()),
            last_updated: None,
        }
    }
}

impl UsageState {
    /// Bucket for a window
    pub fn bucket(&self, window: UsageWindow) -> Option<&NormalizedBucket> {
        match window {
            UsageWindow::FiveHour => self.five_hour.as_ref(),
            UsageWindow::SevenDay => self.seven_day.as_ref(),
        }
    }

    /// Local wall-clock time of the last update, or "never"
    pub fn last_updated_text(&self) -> String {
        match self.last_updated {
            Some(at) => at.with_timezone(&Local).format("%H:%M:%S").to_string(),
            None => "never".to_string(),
        }
    }

    /// Plain-text breakdown for a detail view
    pub fn detail_lines(&self, now: DateTime<Utc>) -> Vec<String> {
        let mut lines = vec![format!("Claude Usage  ● {}", self.status.label())];

        match &self.status {
            EngineStatus::Connected => {
                for window in [UsageWindow::FiveHour, UsageWindow::SevenDay] {
                    let Some(bucket) = self.bucket(window) else {
                        continue;
                    };
                    lines.push(window.heading().to_string());
                    lines.push(format!(
                        "  {}%  (resets in {})",
                        bucket.percent(),
                        format_reset_in(bucket.resets_at, now)
                    ));
                }
            }
            EngineStatus::Error(message) => {
                lines.push("Unable to fetch usage data.".to_string());
                lines.push(format!("  {}", message));
                lines.push("Check token and connectivity.".to_string());
            }
            EngineStatus::NoToken => {
                lines.push("No access token configured.".to_string());
            }
            EngineStatus::Starting => {}
        }

        lines.push(format!("Updated: {}", self.last_updated_text()));
        lines
    }

    /// Rebuild menu lines from the buckets
    pub(crate) fn with_menu_lines(mut self, now: DateTime<Utc>) -> Self {
        self.menu_5h = menu_line(UsageWindow::FiveHour, self.five_hour.as_ref(), now);
        self.menu_7d = menu_line(UsageWindow::SevenDay, self.seven_day.as_ref(), now);
        self
    }
}
