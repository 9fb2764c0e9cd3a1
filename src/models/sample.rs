// Raw per-scan measurement reported by a monitoring agent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Wire shape of one sample as returned by the agent inventory endpoint.
/// Numbers are decoded as f64; `TryFrom` checks counters are non-negative integers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMetricSample {
    pub agent_id: String,
    pub timestamp: DateTime<Utc>,
    pub scan_duration_ms: f64,
    pub files_processed: f64,
    pub alerts_generated: f64,
    #[serde(default)]
    pub cache_hits: f64,
    #[serde(default)]
    pub cache_misses: f64,
    #[serde(default)]
    pub errors_count: f64,
}

/// One validated observation for one agent at one instant. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMetricSample")]
pub struct MetricSample {
    agent_id: String,
    timestamp: DateTime<Utc>,
    scan_duration_ms: f64,
    files_processed: u64,
    alerts_generated: u64,
    cache_hits: u64,
    cache_misses: u64,
    errors_count: u64,
}

/// Per-scan counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanCounters {
    pub files_processed: u64,
    pub alerts_generated: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub errors_count: u64,
}

impl MetricSample {
    pub fn new(
        agent_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        scan_duration_ms: f64,
        counters: ScanCounters,
    ) -> Result<Self, PipelineError> {
        let agent_id = agent_id.into();
        if agent_id.trim().is_empty() {
            return Err(PipelineError::invalid(&agent_id, "agent_id", "must be non-empty"));
        }
        if !scan_duration_ms.is_finite() || scan_duration_ms < 0.0 {
            return Err(PipelineError::invalid(
                &agent_id,
                "scan_duration_ms",
                format!("must be a non-negative finite number, got {}", scan_duration_ms),
            ));
        }
        Ok(Self {
            agent_id,
            timestamp,
            scan_duration_ms,
            files_processed: counters.files_processed,
            alerts_generated: counters.alerts_generated,
            cache_hits: counters.cache_hits,
            cache_misses: counters.cache_misses,
            errors_count: counters.errors_count,
        })
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn scan_duration_ms(&self) -> f64 {
        self.scan_duration_ms
    }

    pub fn files_processed(&self) -> u64 {
        self.files_processed
    }

    pub fn alerts_generated(&self) -> u64 {
        self.alerts_generated
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits
    }

    pub fn cache_misses(&self) -> u64 {
        self.cache_misses
    }

    pub fn errors_count(&self) -> u64 {
        self.errors_count
    }
}

impl TryFrom<RawMetricSample> for MetricSample {
    type Error = PipelineError;

    fn try_from(raw: RawMetricSample) -> Result<Self, Self::Error> {
        let id = raw.agent_id.as_str();
        let counters = ScanCounters {
            files_processed: counter(id, "files_processed", raw.files_processed)?,
            alerts_generated: counter(id, "alerts_generated", raw.alerts_generated)?,
            cache_hits: counter(id, "cache_hits", raw.cache_hits)?,
            cache_misses: counter(id, "cache_misses", raw.cache_misses)?,
            errors_count: counter(id, "errors_count", raw.errors_count)?,
        };
        MetricSample::new(raw.agent_id, raw.timestamp, raw.scan_duration_ms, counters)
    }
}

/// Converts a wire number into a counter: finite, non-negative, integral.
fn counter(agent_id: &str, field: &'static str, value: f64) -> Result<u64, PipelineError> {
    if !value.is_finite() {
        return Err(PipelineError::invalid(agent_id, field, "must be finite"));
    }
    if value < 0.0 {
        return Err(PipelineError::invalid(
            agent_id,
            field,
            format!("must be non-negative, got {}", value),
        ));
    }
    if value.fract() != 0.0 {
        return Err(PipelineError::invalid(
            agent_id,
            field,
            format!("must be an integer, got {}", value),
        ));
    }
    if value >= u64::MAX as f64 {
        return Err(PipelineError::invalid(agent_id, field, "out of range"));
    }
    Ok(value as u64)
}
