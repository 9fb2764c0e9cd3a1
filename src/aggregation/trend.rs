// Trend builder: bucket samples from all agents by truncated timestamp.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, TimeDelta, Utc};

use super::Totals;
use crate::error::PipelineError;
use crate::models::{MetricSample, TrendPoint};

/// One `TrendPoint` per bucket that received samples, ascending by `bucket_start`.
/// Empty buckets are not emitted; callers needing a fixed-width series pad themselves.
pub fn build_trend<'a>(
    samples: impl IntoIterator<Item = &'a MetricSample>,
    bucket: TimeDelta,
) -> Result<Vec<TrendPoint>, PipelineError> {
    let bucket_ms = bucket.num_milliseconds();
    if bucket_ms <= 0 {
        return Err(PipelineError::InvalidBucket(format!(
            "bucket size must be at least 1ms, got {}",
            bucket
        )));
    }

    let mut buckets: BTreeMap<DateTime<Utc>, (Totals, BTreeSet<&str>)> = BTreeMap::new();
    for s in samples {
        let start = bucket_start(s.timestamp(), bucket_ms);
        let (totals, agents) = buckets.entry(start).or_default();
        totals.add(s);
        agents.insert(s.agent_id());
    }

    Ok(buckets
        .into_iter()
        .map(|(bucket_start, (totals, agents))| TrendPoint {
            bucket_start,
            sample_count: totals.sample_count,
            agent_count: agents.len() as u64,
            avg_scan_duration_ms: totals.avg_scan_duration_ms().unwrap_or_default(),
            total_files_processed: totals.files_processed,
            total_alerts_generated: totals.alerts_generated,
            cache_hit_rate: totals.cache_hit_rate(),
            error_rate: totals.error_rate().unwrap_or_default(),
        })
        .collect())
}

/// Floors `ts` to a multiple of `bucket_ms` since the epoch. Whole milliseconds
/// cover every representable timestamp; a floor below the earliest instant
/// clamps to it.
fn bucket_start(ts: DateTime<Utc>, bucket_ms: i64) -> DateTime<Utc> {
    let floor_ms = ts.timestamp_millis().div_euclid(bucket_ms) * bucket_ms;
    DateTime::from_timestamp_millis(floor_ms).unwrap_or(DateTime::<Utc>::MIN_UTC)
}
