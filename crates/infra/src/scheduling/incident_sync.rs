//! Incident sync engine.
//!
//! Drives [`IncidentSyncService`] passes from a single background task: one
//! immediate pass on start, then one pass per `sync_interval` tick, plus one
//! pass per accepted manual trigger. Only the background task runs passes, so
//! two passes never overlap.
//!
//! # Manual triggers
//!
//! [`IncidentSyncEngine::trigger_sync`] enqueues a request on a bounded
//! mailbox (`trigger_queue_capacity` slots). The background task serves the
//! mailbox between passes in arrival order: a trigger that arrives while a
//! pass is in flight waits for that pass to finish and then gets a pass of
//! its own. The caller receives the outcome of its pass. When every slot is
//! taken the trigger is rejected with [`SchedulerError::TriggerQueueFull`].
//!
//! # Shutdown
//!
//! Cancellation is cooperative. It is observed while waiting for the next
//! tick and during retry backoff; a fetch or sink call already in progress
//! runs to completion first. Once the loop exits the engine state becomes
//! [`EngineState::Stopped`] and every [`ShutdownSignal`] resolves.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use riskwatch_core::IncidentSyncService;
//! use riskwatch_domain::EngineConfig;
//! use riskwatch_infra::{IncidentSyncEngine, InMemoryRiskSink, JsonFileIncidentSource};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), riskwatch_infra::SchedulerError> {
//! let config = EngineConfig::default();
//! let source = Arc::new(JsonFileIncidentSource::new("incidents.json"));
//! let sink = Arc::new(InMemoryRiskSink::new());
//! let engine =
//!     IncidentSyncEngine::new(IncidentSyncService::from_config(source, sink, &config), config);
//!
//! let shutdown = CancellationToken::new();
//! let stopped = engine.start(&shutdown)?;
//!
//! let summary = engine.trigger_sync().await?;
//! println!("ingested {} risks", summary.ingested);
//!
//! shutdown.cancel();
//! stopped.wait().await;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use riskwatch_core::{IncidentSyncService, PassOutcome};
use riskwatch_domain::{EngineConfig, EngineState, PassSummary, SyncMetrics};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::observability::SyncMetricsRegister;
use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// A queued manual trigger is just the channel its outcome goes back on.
type TriggerReply = oneshot::Sender<SchedulerResult<PassSummary>>;

/// State shared between the engine handle and its background task.
struct EngineCore {
    service: IncidentSyncService,
    metrics: Arc<SyncMetricsRegister>,
    state: watch::Sender<EngineState>,
}

struct Running {
    cancel: CancellationToken,
    triggers: mpsc::Sender<TriggerReply>,
    handle: JoinHandle<()>,
}

impl Running {
    /// Cancelled from either side, or the loop is already gone.
    fn has_shut_down(&self) -> bool {
        self.cancel.is_cancelled() || self.handle.is_finished()
    }
}

enum Lifecycle {
    Ready,
    Running(Running),
    Finished,
}

/// Periodic incident synchronization with manual triggers and cooperative
/// shutdown.
pub struct IncidentSyncEngine {
    core: Arc<EngineCore>,
    config: EngineConfig,
    lifecycle: Mutex<Lifecycle>,
}

impl IncidentSyncEngine {
    /// Create an idle engine with zeroed metrics.
    pub fn new(service: IncidentSyncService, config: EngineConfig) -> Self {
        let (state, _) = watch::channel(EngineState::Idle);
        let core =
            EngineCore { service, metrics: Arc::new(SyncMetricsRegister::new()), state };

        Self { core: Arc::new(core), config, lifecycle: Mutex::new(Lifecycle::Ready) }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Start the background task.
    ///
    /// The first pass runs immediately; later passes follow every
    /// `sync_interval`. Cancelling `cancel` (or calling [`Self::stop`]) shuts
    /// the engine down. The returned signal resolves once it has.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`SchedulerError::InvalidConfig`] if the configuration fails
    ///   [`EngineConfig::validate`]
    /// - [`SchedulerError::AlreadyStarted`] if the engine is running
    /// - [`SchedulerError::Stopped`] if the engine has already shut down,
    ///   whether through [`Self::stop`] or through `cancel`
    #[instrument(skip_all)]
    pub fn start(&self, cancel: &CancellationToken) -> SchedulerResult<ShutdownSignal> {
        let mut lifecycle = self.lifecycle.lock();
        match &*lifecycle {
            Lifecycle::Ready => {}
            Lifecycle::Running(running) if running.has_shut_down() => {
                return Err(SchedulerError::Stopped);
            }
            Lifecycle::Running(_) => return Err(SchedulerError::AlreadyStarted),
            Lifecycle::Finished => return Err(SchedulerError::Stopped),
        }

        self.config.validate().map_err(SchedulerError::InvalidConfig)?;

        info!(
            interval_ms = duration_ms(self.config.sync_interval),
            max_retries = self.config.max_retries,
            trigger_queue_capacity = self.config.trigger_queue_capacity,
            "Starting incident sync engine"
        );

        let cancel = cancel.child_token();
        let (triggers, mailbox) = mpsc::channel(self.config.trigger_queue_capacity.max(1));
        let core = Arc::clone(&self.core);
        let interval = self.config.sync_interval;
        let loop_cancel = cancel.clone();

        let handle = tokio::spawn(async move {
            core.run(mailbox, interval, loop_cancel).await;
        });

        *lifecycle = Lifecycle::Running(Running { cancel, triggers, handle });

        Ok(ShutdownSignal { state: self.core.state.subscribe() })
    }

    /// Run one pass outside the tick cadence and return its outcome.
    ///
    /// The request queues behind any pass already in flight.
    ///
    /// # Errors
    ///
    /// - [`SchedulerError::NotRunning`] if the engine was never started
    /// - [`SchedulerError::Stopped`] if the engine shut down before the pass ran
    /// - [`SchedulerError::TriggerQueueFull`] if the mailbox has no free slot
    /// - [`SchedulerError::PassFailed`] if the pass exhausted its fetch retries
    /// - [`SchedulerError::PassCancelled`] if shutdown interrupted the pass
    #[instrument(skip(self))]
    pub async fn trigger_sync(&self) -> SchedulerResult<PassSummary> {
        let triggers = match &*self.lifecycle.lock() {
            Lifecycle::Ready => return Err(SchedulerError::NotRunning),
            Lifecycle::Finished => return Err(SchedulerError::Stopped),
            Lifecycle::Running(running) if running.has_shut_down() => {
                return Err(SchedulerError::Stopped);
            }
            Lifecycle::Running(running) => running.triggers.clone(),
        };

        let (reply, outcome) = oneshot::channel();
        triggers.try_send(reply).map_err(|err| match err {
            TrySendError::Full(_) => SchedulerError::TriggerQueueFull,
            TrySendError::Closed(_) => SchedulerError::Stopped,
        })?;
        debug!("Manual sync trigger queued");

        // A dropped reply means the loop exited with this request still queued.
        outcome.await.map_err(|_| SchedulerError::Stopped)?
    }

    /// Copy of the current synchronization metrics.
    pub fn get_metrics(&self) -> SyncMetrics {
        self.core.metrics.snapshot()
    }

    /// Shared handle to the metrics register.
    pub fn metrics(&self) -> Arc<SyncMetricsRegister> {
        Arc::clone(&self.core.metrics)
    }

    pub fn state(&self) -> EngineState {
        *self.core.state.borrow()
    }

    /// Receiver that observes every state transition.
    pub fn watch_state(&self) -> watch::Receiver<EngineState> {
        self.core.state.subscribe()
    }

    /// Whether the background task is alive.
    pub fn is_running(&self) -> bool {
        match &*self.lifecycle.lock() {
            Lifecycle::Running(running) => !running.handle.is_finished(),
            Lifecycle::Ready | Lifecycle::Finished => false,
        }
    }

    /// Cancel the background task and wait for it to finish.
    ///
    /// Waits at most `shutdown_timeout`. A pass that is mid-fetch finishes
    /// that step before the loop observes cancellation.
    ///
    /// # Errors
    ///
    /// - [`SchedulerError::NotRunning`] if the engine was never started
    /// - [`SchedulerError::Stopped`] if the engine was already stopped
    /// - [`SchedulerError::Timeout`] if the task outlived `shutdown_timeout`
    /// - [`SchedulerError::TaskJoinFailed`] if the task panicked
    #[instrument(skip(self))]
    pub async fn stop(&self) -> SchedulerResult<()> {
        let running = {
            let mut lifecycle = self.lifecycle.lock();
            match std::mem::replace(&mut *lifecycle, Lifecycle::Finished) {
                Lifecycle::Running(running) => running,
                Lifecycle::Ready => {
                    *lifecycle = Lifecycle::Ready;
                    return Err(SchedulerError::NotRunning);
                }
                Lifecycle::Finished => return Err(SchedulerError::Stopped),
            }
        };

        info!("Stopping incident sync engine");

        let Running { cancel, triggers, handle } = running;
        cancel.cancel();
        drop(triggers);

        let join_timeout = self.config.shutdown_timeout;
        tokio::time::timeout(join_timeout, handle)
            .await
            .map_err(|_| SchedulerError::Timeout { duration: join_timeout })??;

        info!("Incident sync engine stopped");
        Ok(())
    }
}

/// Ensure the background task is cancelled when the engine is dropped
impl Drop for IncidentSyncEngine {
    fn drop(&mut self) {
        if let Lifecycle::Running(running) = self.lifecycle.get_mut() {
            if !running.cancel.is_cancelled() {
                warn!("IncidentSyncEngine dropped while running; cancelling");
                running.cancel.cancel();
            }
        }
    }
}

impl EngineCore {
    async fn run(
        &self,
        mut mailbox: mpsc::Receiver<TriggerReply>,
        interval: Duration,
        cancel: CancellationToken,
    ) {
        let _stopped = MarkStoppedOnExit(&self.state);
        debug!("Incident sync loop started");

        if !cancel.is_cancelled() {
            // Outcomes of scheduled passes live in the metrics and the logs.
            let _ = self.execute_pass(&cancel, "startup").await;
        }

        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    debug!("Incident sync loop cancelled");
                    break;
                }
                Some(reply) = mailbox.recv() => {
                    let outcome = self.execute_pass(&cancel, "manual").await;
                    if reply.send(outcome).is_err() {
                        debug!("Manual trigger caller went away before its pass finished");
                    }
                }
                _ = ticker.tick() => {
                    let _ = self.execute_pass(&cancel, "scheduled").await;
                }
            }
        }

        drop(mailbox);
        info!(metrics = ?self.metrics.snapshot(), "Incident sync loop exited");
    }

    async fn execute_pass(
        &self,
        cancel: &CancellationToken,
        trigger: &'static str,
    ) -> SchedulerResult<PassSummary> {
        self.state.send_replace(EngineState::Syncing);
        let outcome = self.service.run_pass(cancel).await;
        self.state.send_replace(EngineState::Idle);

        match outcome {
            PassOutcome::Completed(summary) => {
                self.metrics.record_success(&summary);
                info!(
                    trigger,
                    attempts = summary.attempts,
                    fetched = summary.fetched,
                    ingested = summary.ingested,
                    duplicates = summary.duplicates,
                    ignored = summary.ignored,
                    sink_failures = summary.sink_failures,
                    duration_ms = duration_ms(summary.duration),
                    "Incident sync pass completed"
                );
                Ok(summary)
            }
            PassOutcome::Failed { attempts, error } => {
                self.metrics.record_failure(&error);
                error!(trigger, attempts, error = %error, "Incident sync failed after retries");
                Err(SchedulerError::PassFailed { attempts, error })
            }
            PassOutcome::Cancelled { attempts } => {
                info!(trigger, attempts, "Incident sync pass cancelled during retry backoff");
                Err(SchedulerError::PassCancelled { attempts })
            }
        }
    }
}

/// Publishes [`EngineState::Stopped`] when the loop exits, including by panic.
struct MarkStoppedOnExit<'a>(&'a watch::Sender<EngineState>);

impl Drop for MarkStoppedOnExit<'_> {
    fn drop(&mut self) {
        self.0.send_replace(EngineState::Stopped);
    }
}

/// Resolves once the engine has fully shut down.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    state: watch::Receiver<EngineState>,
}

impl ShutdownSignal {
    /// Wait until the background task has exited.
    pub async fn wait(mut self) {
        // An error means the engine itself is gone, which is also a shutdown.
        let _ = self.state.wait_for(|state| *state == EngineState::Stopped).await;
    }

    pub fn is_stopped(&self) -> bool {
        *self.state.borrow() == EngineState::Stopped
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
