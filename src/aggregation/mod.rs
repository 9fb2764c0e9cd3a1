// Pure aggregation pipeline: samples -> per-agent rollups, hourly trend, fleet health score.
// No I/O here; callers pass an explicit snapshot of samples and own caching.

mod rollup;
mod score;
mod trend;

pub use rollup::{classify, rollup};
pub use score::compose_score;
pub use trend::build_trend;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::models::{FleetReport, MetricSample};

/// Runs the full pipeline over `samples` as of `now`.
///
/// Samples older than the configured window are ignored. Every id in
/// `known_agents` gets a rollup even if it reported nothing (status critical).
/// `health` is `None` only when there is no agent at all.
#[instrument(skip_all, fields(samples = samples.len(), known_agents = known_agents.len()))]
pub fn build_report(
    samples: &[MetricSample],
    known_agents: &[String],
    config: &PipelineConfig,
    now: DateTime<Utc>,
) -> Result<FleetReport, PipelineError> {
    let window_start = now
        .checked_sub_signed(config.window())
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let windowed: Vec<&MetricSample> = samples
        .iter()
        .filter(|s| s.timestamp() >= window_start)
        .collect();
    let dropped = samples.len() - windowed.len();
    if dropped > 0 {
        debug!(dropped, %window_start, "samples outside query window ignored");
    }

    let mut by_agent: BTreeMap<&str, Vec<&MetricSample>> = BTreeMap::new();
    for id in known_agents {
        by_agent.entry(id.as_str()).or_default();
    }
    for s in windowed.iter().copied() {
        by_agent.entry(s.agent_id()).or_default().push(s);
    }

    let mut rollups = Vec::with_capacity(by_agent.len());
    for (agent_id, group) in by_agent {
        rollups.push(rollup(group, agent_id, &config.status)?);
    }

    let trend = build_trend(windowed.iter().copied(), config.trend.bucket())?;

    let health = if rollups.is_empty() {
        warn!("no agents in window; health score not computed");
        None
    } else {
        Some(compose_score(&rollups, &config.score)?)
    };

    Ok(FleetReport {
        generated_at: now,
        window_start,
        rollups,
        trend,
        health,
    })
}

/// Running sums over a group of samples (one agent or one bucket).
#[derive(Debug, Default)]
struct Totals {
    sample_count: u64,
    durations: Vec<f64>,
    files_processed: u64,
    alerts_generated: u64,
    cache_hits: u64,
    cache_misses: u64,
    errors: u64,
    last_seen: Option<DateTime<Utc>>,
}

impl Totals {
    fn add(&mut self, s: &MetricSample) {
        self.sample_count += 1;
        self.durations.push(s.scan_duration_ms());
        self.files_processed = self.files_processed.saturating_add(s.files_processed());
        self.alerts_generated = self.alerts_generated.saturating_add(s.alerts_generated());
        self.cache_hits = self.cache_hits.saturating_add(s.cache_hits());
        self.cache_misses = self.cache_misses.saturating_add(s.cache_misses());
        self.errors = self.errors.saturating_add(s.errors_count());
        self.last_seen = self.last_seen.max(Some(s.timestamp()));
    }

    fn avg_scan_duration_ms(&self) -> Option<f64> {
        if self.durations.is_empty() {
            return None;
        }
        // Summed in sorted order so the mean does not depend on input order.
        let mut sorted = self.durations.clone();
        sorted.sort_by(f64::total_cmp);
        Some(sorted.iter().sum::<f64>() / (sorted.len() as f64))
    }

    fn cache_hit_rate(&self) -> Option<f64> {
        let lookups = self.cache_hits.saturating_add(self.cache_misses);
        if lookups == 0 {
            return None;
        }
        Some(self.cache_hits as f64 / lookups as f64)
    }

    fn error_rate(&self) -> Option<f64> {
        if self.sample_count == 0 {
            return None;
        }
        Some(self.errors as f64 / self.sample_count as f64)
    }
}

/// Mean of the defined values; `None` when none are defined.
fn mean_defined(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0u64), |(sum, n), v| (sum + v, n + 1));
    if n == 0 { None } else { Some(sum / n as f64) }
}
