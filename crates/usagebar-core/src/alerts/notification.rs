//! Text rendering of alert events for desktop notification sinks.

use serde::Serialize;

use super::tracker::{NotificationEvent, ThresholdLevel, Urgency};
use crate::usage::percent_text;

/// Ready-to-display notification: `(title, body, urgency, icon hint)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub urgency: Urgency,
    /// Freedesktop icon name suggestion
    pub icon_hint: &'static str,
}

impl Notification {
    /// Build the notification text for an event
    pub fn from_event(event: &NotificationEvent) -> Self {
        match *event {
            NotificationEvent::Started { pct5, pct7 } => Self {
                title: "✓ Claude Usage Widget Started".to_string(),
                body: format!("Current usage: {}", usage_summary(pct5, pct7)),
                urgency: Urgency::Normal,
                icon_hint: "dialog-information",
            },
            NotificationEvent::ThresholdCrossed { level, pct5, pct7 } => {
                let (prefix, advice, icon_hint) = match level {
                    ThresholdLevel::Pct100 => ("🛑", "Rate limit reached!", "dialog-error"),
                    ThresholdLevel::Pct90 => ("⚠️", "Close to rate limits!", "dialog-warning"),
                    _ => ("⚠️", "Approaching rate limits.", "dialog-warning"),
                };
                Self {
                    title: format!("{} Claude Usage: {}%", prefix, level.percent()),
                    body: format!("{}\n{}", usage_summary(pct5, pct7), advice),
                    urgency: level.urgency(),
                    icon_hint,
                }
            }
        }
    }
}

fn usage_summary(pct5: Option<u8>, pct7: Option<u8>) -> String {
    format!("5h: {}  |  7d: {}", percent_text(pct5), percent_text(pct7))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_started_notification() {
        let n = Notification::from_event(&NotificationEvent::Started {
            pct5: Some(12),
            pct7: Some(3),
        });
        assert_eq!(n.title, "✓ Claude Usage Widget Started");
        assert_eq!(n.body, "Current usage: 5h: 12%  |  7d: 3%");
        assert_eq!(n.urgency, Urgency::Normal);
        assert_eq!(n.icon_hint, "dialog-information");
    }

    #[test]
    fn test_threshold_notifications() {
        let warn = Notification::from_event(&NotificationEvent::ThresholdCrossed {
            level: ThresholdLevel::Pct75,
            pct5: Some(78),
            pct7: None,
        });
        assert_eq!(
            warn,
            Notification {
                title: "⚠️ Claude Usage: 75%".to_string(),
                body: "5h: 78%  |  7d: --\nApproaching rate limits.".to_string(),
                urgency: Urgency::Normal,
                icon_hint: "dialog-warning",
            }
        );

        let critical = Notification::from_event(&NotificationEvent::ThresholdCrossed {
            level: ThresholdLevel::Pct90,
            pct5: Some(91),
            pct7: Some(50),
        });
        assert_eq!(critical.urgency, Urgency::Critical);
        assert!(critical.body.ends_with("Close to rate limits!"));

        let limit = Notification::from_event(&NotificationEvent::ThresholdCrossed {
            level: ThresholdLevel::Pct100,
            pct5: Some(100),
            pct7: Some(60),
        });
        assert_eq!(limit.title, "🛑 Claude Usage: 100%");
        assert_eq!(limit.icon_hint, "dialog-error");
        assert_eq!(limit.urgency, Urgency::Critical);
    }
}
