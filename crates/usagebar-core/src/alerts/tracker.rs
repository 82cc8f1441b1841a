//! Threshold tracking: decides which alert (if any) a usage reading triggers.

use serde::Serialize;
use tracing::{debug, info};

/// Alert level reached by the dominant usage fraction.
///
/// Ordered: `Clear < Pct75 < Pct90 < Pct100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub enum ThresholdLevel {
    /// Below every alert threshold
    #[default]
    Clear,
    /// At or above 75%
    Pct75,
    /// At or above 90%
    Pct90,
    /// At or above 100%
    Pct100,
}

impl ThresholdLevel {
    /// Highest level not exceeding the given whole percentage
    pub fn from_percent(pct: u8) -> Self {
        match pct {
            p if p >= 100 => ThresholdLevel::Pct100,
            p if p >= 90 => ThresholdLevel::Pct90,
            p if p >= 75 => ThresholdLevel::Pct75,
            _ => ThresholdLevel::Clear,
        }
    }

    /// Threshold value in percent (0 for `Clear`)
    pub fn percent(&self) -> u8 {
        match self {
            ThresholdLevel::Clear => 0,
            ThresholdLevel::Pct75 => 75,
            ThresholdLevel::Pct90 => 90,
            ThresholdLevel::Pct100 => 100,
        }
    }

    /// Urgency the notification sink should use for this level
    pub fn urgency(&self) -> Urgency {
        match self {
            ThresholdLevel::Clear => Urgency::Low,
            ThresholdLevel::Pct75 => Urgency::Normal,
            ThresholdLevel::Pct90 | ThresholdLevel::Pct100 => Urgency::Critical,
        }
    }
}

/// Notification urgency understood by desktop notification daemons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Normal,
    Critical,
}

/// Alert decided by the tracker for one successful cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationEvent {
    /// First successful reading of the process lifetime
    Started { pct5: Option<u8>, pct7: Option<u8> },
    /// Usage reached a higher level than any previously alerted one
    ThresholdCrossed {
        level: ThresholdLevel,
        pct5: Option<u8>,
        pct7: Option<u8>,
    },
}

/// Tracks the highest alerted level for the lifetime of the process.
///
/// The level only ever rises; a drop in usage neither emits an event nor
/// lowers it, so each escalation is announced exactly once per run.
#[derive(Debug, Default)]
pub struct ThresholdTracker {
    last_crossed: ThresholdLevel,
    startup_event_sent: bool,
}

impl ThresholdTracker {
    /// Create a tracker with no alerts sent
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate one successful reading.
    ///
    /// The first call always yields `Started` and skips threshold comparison.
    pub fn evaluate(
        &mut self,
        dominant_fraction: f64,
        pct5: Option<u8>,
        pct7: Option<u8>,
    ) -> Option<NotificationEvent> {
        if !self.startup_event_sent {
            self.startup_event_sent = true;
            info!(?pct5, ?pct7, "First usage reading received");
            return Some(NotificationEvent::Started { pct5, pct7 });
        }

        let level = ThresholdLevel::from_percent(alert_percent(dominant_fraction));
        if level <= self.last_crossed {
            debug!(
                ?level,
                last_crossed = ?self.last_crossed,
                "No new threshold crossed"
            );
            return None;
        }

        info!(
            from = ?self.last_crossed,
            to = ?level,
            "Usage threshold crossed"
        );
        self.last_crossed = level;
        Some(NotificationEvent::ThresholdCrossed { level, pct5, pct7 })
    }

    /// Highest level alerted so far
    pub fn last_crossed(&self) -> ThresholdLevel {
        self.last_crossed
    }

    /// Whether the startup event has been emitted
    pub fn startup_event_sent(&self) -> bool {
        self.startup_event_sent
    }
}

/// Whole percentage compared against alert levels: a plain `floor(fraction * 100)`
fn alert_percent(fraction: f64) -> u8 {
    if fraction.is_nan() {
        return 0;
    }
    (fraction * 100.0).floor().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started_tracker() -> ThresholdTracker {
        let mut tracker = ThresholdTracker::new();
        tracker.evaluate(0.0, Some(0), Some(0));
        tracker
    }

    fn crossed_level(event: Option<NotificationEvent>) -> Option<ThresholdLevel> {
        match event {
            Some(NotificationEvent::ThresholdCrossed { level, .. }) => Some(level),
            _ => None,
        }
    }

    #[test]
    fn test_level_from_percent() {
        assert_eq!(ThresholdLevel::from_percent(0), ThresholdLevel::Clear);
        assert_eq!(ThresholdLevel::from_percent(74), ThresholdLevel::Clear);
        assert_eq!(ThresholdLevel::from_percent(75), ThresholdLevel::Pct75);
        assert_eq!(ThresholdLevel::from_percent(89), ThresholdLevel::Pct75);
        assert_eq!(ThresholdLevel::from_percent(90), ThresholdLevel::Pct90);
        assert_eq!(ThresholdLevel::from_percent(99), ThresholdLevel::Pct90);
        assert_eq!(ThresholdLevel::from_percent(100), ThresholdLevel::Pct100);
    }

    #[test]
    fn test_urgency_mapping() {
        assert_eq!(ThresholdLevel::Pct75.urgency(), Urgency::Normal);
        assert_eq!(ThresholdLevel::Pct90.urgency(), Urgency::Critical);
        assert_eq!(ThresholdLevel::Pct100.urgency(), Urgency::Critical);
    }

    #[test]
    fn test_level_uses_exact_floor() {
        let mut tracker = started_tracker();
        assert_eq!(tracker.evaluate(0.7499999999999, Some(75), None), None);
        assert_eq!(crate::usage::display_percent(0.7499999999999), 75);
        assert_eq!(tracker.last_crossed(), ThresholdLevel::Clear);
        assert_eq!(
            crossed_level(tracker.evaluate(0.75, Some(75), None)),
            Some(ThresholdLevel::Pct75)
        );
        assert_eq!(alert_percent(f64::NAN), 0);
        assert_eq!(alert_percent(1.0), 100);
    }

    #[test]
    fn test_first_evaluation_is_startup_even_when_high() {
        let mut tracker = ThresholdTracker::new();
        let event = tracker.evaluate(0.95, Some(95), Some(40));
        assert_eq!(
            event,
            Some(NotificationEvent::Started {
                pct5: Some(95),
                pct7: Some(40)
            })
        );
        // Startup cycle performs no threshold comparison
        assert_eq!(tracker.last_crossed(), ThresholdLevel::Clear);
        assert!(tracker.startup_event_sent());
    }

    #[test]
    fn test_started_emitted_exactly_once() {
        let mut tracker = ThresholdTracker::new();
        let mut started = 0;
        for fraction in [0.1, 0.2, 0.0, 0.3] {
            if let Some(NotificationEvent::Started { .. }) = tracker.evaluate(fraction, None, None)
            {
                started += 1;
            }
        }
        assert_eq!(started, 1);
    }

    #[test]
    fn test_below_threshold_after_startup_is_silent() {
        let mut tracker = started_tracker();
        assert_eq!(tracker.evaluate(0.45, Some(45), Some(10)), None);
        assert_eq!(tracker.last_crossed(), ThresholdLevel::Clear);
    }

    #[test]
    fn test_crossing_90_from_fraction_form() {
        let mut tracker = started_tracker();
        let event = tracker.evaluate(0.92, Some(92), Some(30));
        assert_eq!(
            event,
            Some(NotificationEvent::ThresholdCrossed {
                level: ThresholdLevel::Pct90,
                pct5: Some(92),
                pct7: Some(30)
            })
        );
    }

    #[test]
    fn test_drop_does_not_emit_or_reset() {
        let mut tracker = started_tracker();
        assert_eq!(
            crossed_level(tracker.evaluate(0.80, Some(80), None)),
            Some(ThresholdLevel::Pct75)
        );
        assert_eq!(tracker.evaluate(0.60, Some(60), None), None);
        assert_eq!(tracker.last_crossed(), ThresholdLevel::Pct75);
        // Returning to the same level stays silent
        assert_eq!(tracker.evaluate(0.80, Some(80), None), None);
    }

    #[test]
    fn test_emitted_levels_strictly_increase() {
        let mut tracker = started_tracker();
        let readings = [0.5, 0.76, 0.74, 0.91, 0.8, 0.95, 1.0, 0.2, 1.0, 0.99];
        let levels: Vec<ThresholdLevel> = readings
            .iter()
            .filter_map(|f| crossed_level(tracker.evaluate(*f, None, None)))
            .collect();

        assert_eq!(
            levels,
            vec![
                ThresholdLevel::Pct75,
                ThresholdLevel::Pct90,
                ThresholdLevel::Pct100
            ]
        );
        assert!(levels.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_jump_straight_to_limit_skips_lower_levels() {
        let mut tracker = started_tracker();
        assert_eq!(
            crossed_level(tracker.evaluate(1.0, Some(100), None)),
            Some(ThresholdLevel::Pct100)
        );
        assert_eq!(tracker.evaluate(0.9, Some(90), None), None);
    }
}
