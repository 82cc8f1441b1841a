//! Human-readable text for usage windows (menu lines, reset countdowns).

use chrono::{DateTime, Utc};

use super::types::{NormalizedBucket, UsageWindow};

/// Countdown until a window resets: "2h 13m", "45m", "any moment" or "unknown"
pub fn format_reset_in(resets_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(resets_at) = resets_at else {
        return "unknown".to_string();
    };
    let total_secs = (resets_at - now).num_seconds();
    if total_secs <= 0 {
        return "any moment".to_string();
    }
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Menu line for one window, e.g. "5h: 45%  (resets 2h 13m)"
pub fn menu_line(
    window: UsageWindow,
    bucket: Option<&NormalizedBucket>,
    now: DateTime<Utc>,
) -> String {
    match bucket {
        Some(b) => format!(
            "{}: {}%  (resets {})",
            window.short_label(),
            b.percent(),
            format_reset_in(b.resets_at, now)
        ),
        None => format!("{}: --", window.short_label()),
    }
}

/// Menu line shown for a window after a failed cycle
pub fn menu_error_line(window: UsageWindow) -> String {
    format!("{}: error", window.short_label())
}

/// Percentage text with a placeholder for absent windows
pub fn percent_text(pct: Option<u8>) -> String {
    match pct {
        Some(p) => format!("{}%", p),
        None => "--".to_string(),
    }
}
