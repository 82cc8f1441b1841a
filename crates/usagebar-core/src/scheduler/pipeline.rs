//! The synchronous part of a cycle: normalize, track, render, assemble.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::alerts::{NotificationEvent, ThresholdTracker};
use crate::indicator::{render, RenderIntent};
use crate::usage::{dominant_fraction, menu_error_line, normalize, FetchError, UsagePayload, UsageWindow};

use super::state::{EngineStatus, UsageState};

/// Output of one processed fetch result
#[derive(Debug, Clone)]
pub struct CycleResult {
    pub state: UsageState,
    pub event: Option<NotificationEvent>,
}

/// Owns the threshold tracker; lives inside the scheduler's worker task only.
#[derive(Debug, Default)]
pub struct Pipeline {
    tracker: ThresholdTracker,
    last_updated: Option<DateTime<Utc>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn a fetch result into a complete state and at most one alert.
    ///
    /// Failures never touch the tracker.
    pub fn process(
        &mut self,
        fetched: Result<UsagePayload, FetchError>,
        now: DateTime<Utc>,
    ) -> CycleResult {
        self.last_updated = Some(now);

        let payload = match fetched {
            Ok(payload) => payload,
            Err(err) => {
                return CycleResult {
                    state: UsageState {
                        status: EngineStatus::Error(err.to_string()),
                        intent: render(0.0, true),
                        five_hour: None,
                        seven_day: None,
                        menu_5h: menu_error_line(UsageWindow::FiveHour),
                        menu_7d: menu_error_line(UsageWindow::SevenDay),
                        last_updated: self.last_updated,
                    },
                    event: None,
                };
            }
        };

        let five_hour = normalize(payload.five_hour.as_ref());
        let seven_day = normalize(payload.seven_day.as_ref());
        let dominant = dominant_fraction(five_hour.as_ref(), seven_day.as_ref());
        let pct5 = five_hour.as_ref().map(|b| b.percent());
        let pct7 = seven_day.as_ref().map(|b| b.percent());

        debug!(?pct5, ?pct7, dominant, "Processed usage payload");

        let event = self.tracker.evaluate(dominant, pct5, pct7);
        let state = UsageState {
            status: EngineStatus::Connected,
            intent: render(dominant, false),
            five_hour,
            seven_day,
            menu_5h: String::new(),
            menu_7d: String::new(),
            last_updated: self.last_updated,
        }
        .with_menu_lines(now);

        CycleResult { state, event }
    }

    /// State published when a cycle is skipped for lack of a token
    pub fn no_token(&self) -> UsageState {
        UsageState {
            status: EngineStatus::NoToken,
            intent: RenderIntent::placeholder(),
            last_updated: self.last_updated,
            ..UsageState::default()
        }
    }

    #[cfg(test)]
    pub(crate) fn tracker(&self) -> &ThresholdTracker {
        &self.tracker
    }
}
