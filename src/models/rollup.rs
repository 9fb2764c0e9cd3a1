// Per-agent rollup over one query window, plus its status classification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Agent status; serializes to lowercase JSON (e.g. "warning").
/// Variants are ordered from healthiest to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Optimal,
    Good,
    Warning,
    Critical,
}

impl AgentStatus {
    pub const ALL: [AgentStatus; 4] = [
        AgentStatus::Optimal,
        AgentStatus::Good,
        AgentStatus::Warning,
        AgentStatus::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Optimal => "optimal",
            AgentStatus::Good => "good",
            AgentStatus::Warning => "warning",
            AgentStatus::Critical => "critical",
        }
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One agent's summary. `None` fields are undefined (no samples, or no cache
/// lookups for `cache_hit_rate`) and must not be read as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRollup {
    pub agent_id: String,
    pub sample_count: u64,
    pub avg_scan_duration_ms: Option<f64>,
    pub total_files_processed: u64,
    pub total_alerts_generated: u64,
    pub total_cache_hits: u64,
    pub total_cache_misses: u64,
    pub total_errors: u64,
    /// hits / (hits + misses), in [0, 1].
    pub cache_hit_rate: Option<f64>,
    /// Errors per sample.
    pub error_rate: Option<f64>,
    pub last_seen: Option<DateTime<Utc>>,
    pub status: AgentStatus,
}

impl AgentRollup {
    /// True when the agent reported nothing in the window.
    pub fn is_silent(&self) -> bool {
        self.sample_count == 0
    }
}
