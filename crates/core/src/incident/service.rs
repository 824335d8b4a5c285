//! Incident sync service - one fetch → classify → ingest pass

use std::sync::Arc;
use std::time::Duration;

use riskwatch_domain::{EngineConfig, Incident, PassSummary, RiskWatchError};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::classifier::{classify, IngestDecision};
use super::errors::FetchError;
use super::ports::{CreateOutcome, IncidentSource, RiskSink};
use super::retry::RetryCoordinator;

/// How a sync pass ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// Incidents were fetched and processed. Individual sink failures are
    /// counted in the summary and do not fail the pass.
    Completed(PassSummary),
    /// Every fetch attempt failed; no incidents were processed.
    Failed { attempts: u32, error: RiskWatchError },
    /// Cancellation interrupted the fetch retries.
    Cancelled { attempts: u32 },
}

/// Runs sync passes against a source and a sink.
pub struct IncidentSyncService {
    source: Arc<dyn IncidentSource>,
    sink: Arc<dyn RiskSink>,
    coordinator: RetryCoordinator,
    sink_timeout: Duration,
}

impl IncidentSyncService {
    pub fn new(
        source: Arc<dyn IncidentSource>,
        sink: Arc<dyn RiskSink>,
        coordinator: RetryCoordinator,
        sink_timeout: Duration,
    ) -> Self {
        Self { source, sink, coordinator, sink_timeout }
    }

    pub fn from_config(
        source: Arc<dyn IncidentSource>,
        sink: Arc<dyn RiskSink>,
        config: &EngineConfig,
    ) -> Self {
        Self::new(source, sink, RetryCoordinator::from_config(config), config.sink_timeout)
    }

    pub fn coordinator(&self) -> &RetryCoordinator {
        &self.coordinator
    }

    /// Run one complete pass.
    pub async fn run_pass(&self, cancel: &CancellationToken) -> PassOutcome {
        let started = Instant::now();

        let fetched = match self.coordinator.attempt_sync(self.source.as_ref(), cancel).await {
            Ok(fetched) => fetched,
            Err(FetchError::Cancelled { attempts }) => return PassOutcome::Cancelled { attempts },
            Err(FetchError::Exhausted { attempts, last_error }) => {
                return PassOutcome::Failed { attempts, error: last_error };
            }
        };

        let mut summary = self.ingest(&fetched.incidents).await;
        summary.attempts = fetched.attempts;
        summary.duration = started.elapsed();
        PassOutcome::Completed(summary)
    }

    /// Classify each incident and hand ingest decisions to the sink.
    ///
    /// A sink error or timeout for one incident is logged and counted; the
    /// remaining incidents are still processed.
    pub async fn ingest(&self, incidents: &[Incident]) -> PassSummary {
        let mut summary = PassSummary { fetched: incidents.len(), ..PassSummary::default() };

        for incident in incidents {
            let risk = match classify(incident) {
                IngestDecision::Ignore => {
                    debug!(
                        external_id = %incident.external_id,
                        severity = %incident.severity,
                        "Incident below ingestion threshold"
                    );
                    summary.ignored += 1;
                    continue;
                }
                IngestDecision::Ingest(risk) => risk,
            };

            match tokio::time::timeout(self.sink_timeout, self.sink.create_if_absent(&risk)).await {
                Ok(Ok(CreateOutcome::Created)) => {
                    debug!(external_id = %risk.external_id, source = %risk.source, "Risk created");
                    summary.ingested += 1;
                }
                Ok(Ok(CreateOutcome::AlreadyExists)) => {
                    debug!(
                        external_id = %risk.external_id,
                        source = %risk.source,
                        "Risk already exists"
                    );
                    summary.duplicates += 1;
                }
                Ok(Err(err)) => {
                    warn!(
                        external_id = %risk.external_id,
                        source = %risk.source,
                        error = %err,
                        "Failed to store risk for incident"
                    );
                    summary.sink_failures += 1;
                }
                Err(_) => {
                    warn!(
                        external_id = %risk.external_id,
                        source = %risk.source,
                        timeout_ms = self.sink_timeout.as_millis() as u64,
                        "Storing risk for incident timed out"
                    );
                    summary.sink_failures += 1;
                }
            }
        }

        summary
    }
}
