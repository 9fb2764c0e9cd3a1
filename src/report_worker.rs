// Background worker: re-read the sample snapshot and rebuild the fleet report.
// Runs every reporting.interval_secs, or at each fire time of reporting.schedule (cron, local time).

use std::str::FromStr;
use std::time::Duration;

use tokio::sync::mpsc::error::TrySendError;
use tracing::{info, instrument, warn};

use crate::aggregation;
use crate::config::{AppConfig, ReportingConfig};
use crate::ingest;
use crate::models::{AgentStatus, FleetReport};

/// Spawns the report worker. Returns a join handle; exits when `shutdown_rx` fires.
pub fn spawn(
    config: AppConfig,
    shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        run(config, shutdown_rx).await;
    })
}

#[instrument(skip_all, fields(interval_secs = config.reporting.interval_secs))]
async fn run(config: AppConfig, mut shutdown_rx: tokio::sync::oneshot::Receiver<()>) {
    let cadence = match Cadence::from_config(&config.reporting) {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "invalid reporting cadence; reports will not run");
            return;
        }
    };
    let (tick_tx, mut tick_rx) = tokio::sync::mpsc::channel::<()>(1);
    let scheduler = tokio::spawn(report_scheduler(cadence, tick_tx));

    loop {
        tokio::select! {
            tick = tick_rx.recv() => {
                if tick.is_none() {
                    break;
                }
                if let Err(e) = run_one_tick(&config).await {
                    warn!(error = %e, "report tick failed");
                }
            }
            _ = &mut shutdown_rx => {
                tracing::debug!("Report worker shutting down");
                break;
            }
        }
    }
    scheduler.abort();
}

/// When reports fire: a fixed interval, or a cron schedule in local time.
enum Cadence {
    Every(tokio::time::Interval),
    Cron(cron::Schedule),
}

impl Cadence {
    fn from_config(reporting: &ReportingConfig) -> anyhow::Result<Self> {
        if let Some(expr) = &reporting.schedule {
            let schedule = cron::Schedule::from_str(expr)
                .map_err(|e| anyhow::anyhow!("reporting.schedule '{}': {}", expr, e))?;
            return Ok(Cadence::Cron(schedule));
        }
        let mut interval = tokio::time::interval(Duration::from_secs(reporting.interval_secs));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        Ok(Cadence::Every(interval))
    }

    async fn wait(&mut self) {
        match self {
            Cadence::Every(interval) => {
                interval.tick().await;
            }
            Cadence::Cron(schedule) => {
                let now = chrono::Local::now();
                let delay = match schedule.after(&now).next() {
                    Some(next) => (next - now).to_std().unwrap_or(Duration::from_secs(1)),
                    None => Duration::from_secs(3600),
                };
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Signals the worker at each fire time. A fire that lands while the previous
/// report is still pending is dropped, for both cadences.
async fn report_scheduler(mut cadence: Cadence, tx: tokio::sync::mpsc::Sender<()>) {
    loop {
        cadence.wait().await;
        match tx.try_send(()) {
            Ok(()) => {}
            Err(TrySendError::Full(())) => {
                tracing::debug!("report still pending; tick skipped");
            }
            Err(TrySendError::Closed(())) => break,
        }
    }
}

/// Runs one report pass: load samples, aggregate, log a summary, write output if configured.
/// Used by the worker loop and by `--once`.
pub async fn run_one_tick(config: &AppConfig) -> anyhow::Result<FleetReport> {
    let batch = ingest::load_batch(&config.input.samples_path).await?;
    let report = aggregation::build_report(
        &batch.samples,
        &config.fleet.agents,
        &config.pipeline(),
        chrono::Utc::now(),
    )?;

    info!(
        agents = report.rollups.len(),
        samples = report.sample_count(),
        rejected = batch.rejected.len(),
        trend_buckets = report.trend.len(),
        score = report.health.as_ref().map(|h| h.score),
        optimal = report.status_count(AgentStatus::Optimal),
        good = report.status_count(AgentStatus::Good),
        warning = report.status_count(AgentStatus::Warning),
        critical = report.status_count(AgentStatus::Critical),
        "fleet report"
    );

    if let Some(path) = &config.reporting.output_path {
        write_report(path, &report).await?;
    }
    Ok(report)
}

async fn write_report(path: &str, report: &FleetReport) -> anyhow::Result<()> {
    if let Some(parent) = std::path::Path::new(path).parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, serde_json::to_vec_pretty(report)?).await?;
    tracing::debug!(path, "report written");
    Ok(())
}
