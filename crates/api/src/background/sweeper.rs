//! Periodic cleanup of process-local state.
//!
//! Purges expired cache entries, rate-limit windows that have ended and
//! finished jobs older than the retention period.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::state::AppState;

/// Counts removed by one sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub cache_entries: usize,
    pub rate_limit_windows: usize,
    pub jobs: usize,
}

/// Run one sweep over the shared state.
pub async fn sweep(state: &AppState, job_retention: Duration) -> SweepReport {
    SweepReport {
        cache_entries: state.directions.purge_expired(),
        rate_limit_windows: state.api_limiter.purge_stale() + state.generate_limiter.purge_stale(),
        jobs: state.jobs.purge_finished(job_retention).await,
    }
}

/// Run the sweeper loop until `cancel` is triggered.
pub async fn run(state: AppState, cancel: CancellationToken) {
    let interval_secs = state.config.sweep_interval_secs;
    let job_retention = Duration::from_secs(state.config.job_retention_secs);

    tracing::info!(
        interval_secs,
        job_retention_secs = job_retention.as_secs(),
        "Sweeper started"
    );

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Sweeper stopping");
                break;
            }
            _ = interval.tick() => {
                let report = sweep(&state, job_retention).await;
                if report == SweepReport::default() {
                    tracing::debug!("Sweeper: nothing to purge");
                } else {
                    tracing::info!(
                        cache_entries = report.cache_entries,
                        rate_limit_windows = report.rate_limit_windows,
                        jobs = report.jobs,
                        "Sweeper: purged stale state"
                    );
                }
            }
        }
    }
}
