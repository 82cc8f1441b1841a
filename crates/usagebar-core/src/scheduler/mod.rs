//! Polling scheduler: runs fetch → normalize → track → render → publish.
//!
//! A single worker task owns the pipeline and executes every cycle, whether
//! triggered by the periodic tick or by [`SchedulerHandle::force_refresh`].
//! Because all cycles run on that one task, at most one request is ever in
//! flight. Refresh requests that arrive while a cycle is running are answered
//! with that cycle's outcome instead of starting another fetch.

pub mod pipeline;
pub mod state;

pub use pipeline::{CycleResult, Pipeline};
pub use state::{
    usage_channel, EnginePhase, EngineStatus, UsageState, UsageStateReceiver, UsageStateSender,
};

use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::alerts::NotificationEvent;
use crate::token::TokenSource;
use crate::usage::{FetchError, UsageSource};

/// Default polling interval
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(120);

/// Capacity of the manual refresh queue
const REFRESH_QUEUE_CAPACITY: usize = 16;

/// Capacity of the notification queue
const NOTIFICATION_QUEUE_CAPACITY: usize = 16;

/// Result of a cycle, reported to manual refresh callers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Fetch succeeded and the state was replaced
    Updated,
    /// Fetch failed; an error state was published
    Failed(FetchError),
    /// No token was available; nothing was fetched
    SkippedNoToken,
}

/// Errors returned by the scheduler handle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// The worker task is no longer running
    #[error("usage scheduler is stopped")]
    Stopped,
}

/// Receiver for alert events produced by the scheduler
pub type NotificationReceiver = mpsc::Receiver<NotificationEvent>;

struct RefreshRequest {
    reply: oneshot::Sender<CycleOutcome>,
}

/// Configured but not yet running scheduler
pub struct Scheduler<S, T> {
    source: S,
    token: T,
    interval: Duration,
}

impl<S, T> Scheduler<S, T>
where
    S: UsageSource + 'static,
    T: TokenSource + 'static,
{
    /// Create a scheduler polling `source` every [`DEFAULT_INTERVAL`]
    pub fn new(source: S, token: T) -> Self {
        Self {
            source,
            token,
            interval: DEFAULT_INTERVAL,
        }
    }

    /// Override the polling interval
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Spawn the worker task. The first cycle runs immediately.
    pub fn start(self) -> SchedulerHandle {
        let (state_tx, state_rx) = usage_channel();
        let (phase_tx, phase_rx) = watch::channel(EnginePhase::Idle);
        let (notification_tx, notification_rx) = mpsc::channel(NOTIFICATION_QUEUE_CAPACITY);
        let (refresh_tx, refresh_rx) = mpsc::channel(REFRESH_QUEUE_CAPACITY);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let worker = Worker {
            source: self.source,
            token: self.token,
            pipeline: Pipeline::new(),
            state_tx,
            phase_tx,
            notification_tx,
        };

        info!(
            interval_secs = self.interval.as_secs(),
            "Usage scheduler started"
        );
        let task = tokio::spawn(worker.run(self.interval, refresh_rx, shutdown_rx));

        SchedulerHandle {
            refresh_tx,
            shutdown_tx,
            state_rx,
            phase_rx,
            notifications: Mutex::new(Some(notification_rx)),
            task: Mutex::new(Some(task)),
        }
    }
}

/// Handle to a running scheduler.
///
/// Readers only see published [`UsageState`] snapshots; the threshold
/// tracker stays private to the worker task.
pub struct SchedulerHandle {
    refresh_tx: mpsc::Sender<RefreshRequest>,
    shutdown_tx: watch::Sender<bool>,
    state_rx: UsageStateReceiver,
    phase_rx: watch::Receiver<EnginePhase>,
    notifications: Mutex<Option<NotificationReceiver>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SchedulerHandle {
    /// Latest published state
    pub fn state(&self) -> UsageState {
        self.state_rx.borrow().clone()
    }

    /// Subscribe to state updates
    pub fn subscribe(&self) -> UsageStateReceiver {
        self.state_rx.clone()
    }

    /// Current engine phase
    pub fn phase(&self) -> EnginePhase {
        *self.phase_rx.borrow()
    }

    /// Subscribe to phase changes
    pub fn subscribe_phase(&self) -> watch::Receiver<EnginePhase> {
        self.phase_rx.clone()
    }

    /// Take the alert event receiver (only the first caller gets it)
    pub fn take_notifications(&self) -> Option<NotificationReceiver> {
        self.notifications.lock().take()
    }

    /// Run a cycle now, or join the one already running, and wait for it
    pub async fn force_refresh(&self) -> Result<CycleOutcome, SchedulerError> {
        let (reply, rx) = oneshot::channel();
        self.refresh_tx
            .send(RefreshRequest { reply })
            .await
            .map_err(|_| SchedulerError::Stopped)?;
        rx.await.map_err(|_| SchedulerError::Stopped)
    }

    /// Whether the worker task is still alive
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Stop ticking and wait for the worker to exit.
    ///
    /// A cycle already in progress runs to completion first.
    pub async fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
        let task = self.task.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(error = %e, "Usage scheduler task ended abnormally");
            }
        }
    }
}

struct Worker<S, T> {
    source: S,
    token: T,
    pipeline: Pipeline,
    state_tx: UsageStateSender,
    phase_tx: watch::Sender<EnginePhase>,
    notification_tx: mpsc::Sender<NotificationEvent>,
}

impl<S, T> Worker<S, T>
where
    S: UsageSource + 'static,
    T: TokenSource + 'static,
{
    async fn run(
        mut self,
        interval: Duration,
        mut refresh_rx: mpsc::Receiver<RefreshRequest>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            // Shutdown is only observed between cycles
            tokio::select! {
                biased;
                _ = shutdown_rx.changed() => break,
                _ = ticker.tick() => {
                    let outcome = self.run_cycle().await;
                    coalesce_pending(&mut refresh_rx, &outcome);
                }
                Some(request) = refresh_rx.recv() => {
                    debug!("Manual usage refresh requested");
                    let outcome = self.run_cycle().await;
                    let _ = request.reply.send(outcome.clone());
                    coalesce_pending(&mut refresh_rx, &outcome);
                }
            }
        }

        info!("Usage scheduler stopped");
    }

    async fn run_cycle(&mut self) -> CycleOutcome {
        let Some(token) = self.token.token() else {
            debug!("No token available, skipping usage fetch");
            self.state_tx.send_replace(self.pipeline.no_token());
            return CycleOutcome::SkippedNoToken;
        };

        self.phase_tx.send_replace(EnginePhase::Fetching);
        let fetched = self.source.fetch(&token).await;

        let outcome = match &fetched {
            Ok(_) => CycleOutcome::Updated,
            Err(e) => {
                warn!(error = %e, "Usage fetch failed");
                CycleOutcome::Failed(e.clone())
            }
        };

        let result = self.pipeline.process(fetched, Utc::now());
        self.state_tx.send_replace(result.state);
        self.phase_tx.send_replace(EnginePhase::Idle);
        if let Some(event) = result.event {
            if let Err(e) = self.notification_tx.try_send(event) {
                warn!(error = %e, "Dropping usage notification");
            }
        }

        outcome
    }
}

/// Answer refresh requests queued during the cycle that just finished
fn coalesce_pending(refresh_rx: &mut mpsc::Receiver<RefreshRequest>, outcome: &CycleOutcome) {
    let mut joined = 0usize;
    while let Ok(request) = refresh_rx.try_recv() {
        let _ = request.reply.send(outcome.clone());
        joined += 1;
    }
    if joined > 0 {
        debug!(joined, "Coalesced refresh requests into finished cycle");
    }
}
