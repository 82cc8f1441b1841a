//! Core library for usagebar.
//!
//! Polls the subscription usage endpoint, normalizes the 5-hour and 7-day
//! windows, decides when to raise threshold alerts and derives the indicator
//! shown to the user.
//!
//! ```ignore
//! use usagebar_core::{HttpUsageFetcher, Scheduler, SharedToken};
//!
//! let handle = Scheduler::new(HttpUsageFetcher::default(), SharedToken::new(token))
//!     .with_interval(settings.refresh_interval())
//!     .start();
//! let bridge = usagebar_core::sinks::spawn_bridge(&handle, ui, notifier);
//! ```

pub mod alerts;
pub mod config;
pub mod indicator;
pub mod scheduler;
pub mod sinks;
pub mod token;
pub mod usage;

pub use alerts::{Notification, NotificationEvent, ThresholdLevel, ThresholdTracker, Urgency};
pub use indicator::{render, IndicatorColor, RenderIntent};
pub use scheduler::{
    CycleOutcome, EnginePhase, EngineStatus, Scheduler, SchedulerError, SchedulerHandle,
    UsageState,
};
pub use token::{SharedToken, StaticToken, TokenSource};
pub use usage::{FetchError, HttpUsageFetcher, UsagePayload, UsageSource};
