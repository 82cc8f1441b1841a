//! Consumer-side sinks and the bridge task that feeds them.
//!
//! UI and notification surfaces never call into the scheduler. They receive
//! published state through [`spawn_bridge`], which subscribes to the
//! scheduler's channels and invokes the sinks on its own task.

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::alerts::Notification;
use crate::indicator::RenderIntent;
use crate::scheduler::{NotificationReceiver, SchedulerHandle, UsageState};

/// Everything a UI needs to redraw: `(label, intent, 5h line, 7d line, updated)`
#[derive(Debug, Clone, PartialEq)]
pub struct UiUpdate {
    pub label: String,
    pub intent: RenderIntent,
    pub menu_5h: String,
    pub menu_7d: String,
    pub last_updated: Option<DateTime<Utc>>,
}

impl From<&UsageState> for UiUpdate {
    fn from(state: &UsageState) -> Self {
        Self {
            label: state.intent.label.clone(),
            intent: state.intent.clone(),
            menu_5h: state.menu_5h.clone(),
            menu_7d: state.menu_7d.clone(),
            last_updated: state.last_updated,
        }
    }
}

/// Receives indicator/menu updates
pub trait UiSink: Send + 'static {
    fn update(&mut self, update: &UiUpdate);
}

/// Displays alert notifications
pub trait NotificationSink: Send + 'static {
    fn notify(&mut self, notification: &Notification);
}

/// Sink that discards notifications (alerts disabled)
#[derive(Debug, Default)]
pub struct NullNotificationSink;

impl NotificationSink for NullNotificationSink {
    fn notify(&mut self, _notification: &Notification) {}
}

/// Drive `ui` and `notifier` from a running scheduler.
///
/// The current state is pushed immediately. The task ends once the
/// scheduler has stopped and every pending notification was delivered.
pub fn spawn_bridge<U, N>(handle: &SchedulerHandle, mut ui: U, mut notifier: N) -> JoinHandle<()>
where
    U: UiSink,
    N: NotificationSink,
{
    let mut state_rx = handle.subscribe();
    let initial = UiUpdate::from(&*state_rx.borrow_and_update());
    let mut events = handle.take_notifications();
    if events.is_none() {
        debug!("Notification receiver already taken; bridge forwards UI updates only");
    }

    tokio::spawn(async move {
        ui.update(&initial);

        loop {
            tokio::select! {
                changed = state_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let update = UiUpdate::from(&*state_rx.borrow_and_update());
                    ui.update(&update);
                }
                Some(event) = next_event(&mut events) => {
                    notifier.notify(&Notification::from_event(&event));
                }
            }
        }

        if let Some(rx) = events.as_mut() {
            while let Ok(event) = rx.try_recv() {
                notifier.notify(&Notification::from_event(&event));
            }
        }
        debug!("Sink bridge finished");
    })
}

async fn next_event(
    events: &mut Option<NotificationReceiver>,
) -> Option<crate::alerts::NotificationEvent> {
    match events.as_mut() {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex;

    use crate::alerts::Urgency;
    use crate::scheduler::Scheduler;
    use crate::token::StaticToken;
    use crate::usage::{Bucket, FetchError, UsagePayload, UsageSource};

    struct FixedSource(f64);

    impl UsageSource for FixedSource {
        async fn fetch(&self, _token: &str) -> Result<UsagePayload, FetchError> {
            Ok(UsagePayload {
                five_hour: Some(Bucket {
                    utilization: Some(self.0),
                    resets_at: None,
                }),
                seven_day: None,
            })
        }
    }

    #[derive(Clone, Default)]
    struct Recorder {
        updates: Arc<Mutex<Vec<UiUpdate>>>,
        notifications: Arc<Mutex<Vec<Notification>>>,
    }

    impl UiSink for Recorder {
        fn update(&mut self, update: &UiUpdate) {
            self.updates.lock().push(update.clone());
        }
    }

    impl NotificationSink for Recorder {
        fn notify(&mut self, notification: &Notification) {
            self.notifications.lock().push(notification.clone());
        }
    }

    #[test]
    fn test_ui_update_from_state() {
        let state = UsageState::default();
        let update = UiUpdate::from(&state);
        assert_eq!(update.label, "--");
        assert_eq!(update.menu_5h, "5h: --");
        assert!(update.last_updated.is_none());
    }

    #[tokio::test]
    async fn test_bridge_delivers_state_and_notifications() {
        let handle = Scheduler::new(FixedSource(45.0), StaticToken::new(Some("t".into())))
            .with_interval(Duration::from_secs(3600))
            .start();
        let recorder = Recorder::default();
        let bridge = spawn_bridge(&handle, recorder.clone(), recorder.clone());

        tokio::time::timeout(Duration::from_secs(5), async {
            while recorder.notifications.lock().is_empty() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        handle.stop().await;
        drop(handle);
        tokio::time::timeout(Duration::from_secs(5), bridge)
            .await
            .unwrap()
            .unwrap();

        let notifications = recorder.notifications.lock();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].title, "✓ Claude Usage Widget Started");
        assert_eq!(notifications[0].urgency, Urgency::Normal);

        let updates = recorder.updates.lock();
        assert_eq!(updates.first().map(|u| u.label.as_str()), Some("--"));
        assert_eq!(updates.last().map(|u| u.label.as_str()), Some("45%"));
    }
}
