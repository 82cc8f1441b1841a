//! Threshold alerts: when to notify, and what the notification says.

pub mod notification;
pub mod tracker;

pub use notification::Notification;
pub use tracker::{NotificationEvent, ThresholdLevel, ThresholdTracker, Urgency};
