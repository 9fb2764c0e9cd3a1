// Trend point: one row per non-empty time bucket, across all agents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Start of the bucket (timestamp truncated to the bucket size).
    pub bucket_start: DateTime<Utc>,
    pub sample_count: u64,
    /// Distinct agents that reported in this bucket.
    pub agent_count: u64,
    pub avg_scan_duration_ms: f64,
    pub total_files_processed: u64,
    pub total_alerts_generated: u64,
    /// `None` when no sample in the bucket touched the cache.
    pub cache_hit_rate: Option<f64>,
    pub error_rate: f64,
}
