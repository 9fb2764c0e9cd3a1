// Shared test helpers

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use fleetpulse::models::{MetricSample, ScanCounters};

/// 2026-03-01T10:00:00Z plus the given minutes.
pub fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap() + chrono::TimeDelta::minutes(minutes)
}

pub fn sample(agent_id: &str, ts: DateTime<Utc>, duration_ms: f64) -> MetricSample {
    MetricSample::new(agent_id, ts, duration_ms, ScanCounters::default()).unwrap()
}

pub fn sample_with(
    agent_id: &str,
    ts: DateTime<Utc>,
    duration_ms: f64,
    counters: ScanCounters,
) -> MetricSample {
    MetricSample::new(agent_id, ts, duration_ms, counters).unwrap()
}

pub fn counters(files: u64, hits: u64, misses: u64, errors: u64) -> ScanCounters {
    ScanCounters {
        files_processed: files,
        alerts_generated: 0,
        cache_hits: hits,
        cache_misses: misses,
        errors_count: errors,
    }
}
