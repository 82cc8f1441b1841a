//! Usage data types returned by the usage endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single raw usage window as sent by the endpoint (e.g. `five_hour`)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Bucket {
    /// Utilization, either a fraction in [0, 1] or a percentage in (1, 100].
    /// Missing and `null` both read as `None`.
    #[serde(default)]
    pub utilization: Option<f64>,
    /// Reset time as an ISO-8601 string
    #[serde(default)]
    pub resets_at: Option<String>,
}

/// Raw response body of the usage endpoint.
///
/// Both windows are optional and may be `null`; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct UsagePayload {
    /// Rolling 5-hour window
    #[serde(default)]
    pub five_hour: Option<Bucket>,
    /// Rolling 7-day window
    #[serde(default)]
    pub seven_day: Option<Bucket>,
}

/// A usage window after normalization.
///
/// `fraction` is always within [0, 1]; the raw encoding is not retained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizedBucket {
    /// Utilization as a fraction in [0, 1]
    pub fraction: f64,
    /// Parsed reset time, if the endpoint sent a valid one
    pub resets_at: Option<DateTime<Utc>>,
}

impl NormalizedBucket {
    /// Whole percentage used (0-100)
    pub fn percent(&self) -> u8 {
        super::normalizer::display_percent(self.fraction)
    }
}

/// Which usage window a bucket belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UsageWindow {
    FiveHour,
    SevenDay,
}

impl UsageWindow {
    /// Compact label used in menu lines ("5h", "7d")
    pub fn short_label(&self) -> &'static str {
        match self {
            UsageWindow::FiveHour => "5h",
            UsageWindow::SevenDay => "7d",
        }
    }

    /// Section heading used in the detail view
    pub fn heading(&self) -> &'static str {
        match self {
            UsageWindow::FiveHour => "5-HOUR WINDOW",
            UsageWindow::SevenDay => "7-DAY WINDOW",
        }
    }
}
