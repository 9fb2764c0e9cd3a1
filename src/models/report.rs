// Fleet-wide health score and the report object handed to the dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AgentRollup, AgentStatus, TrendPoint};

/// Composite fleet score with the figures that explain it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthScore {
    pub total_agents: u64,
    /// Agents with zero samples in the window (counted in `total_agents`).
    pub silent_agents: u64,
    pub avg_scan_duration_ms: Option<f64>,
    pub overall_cache_hit_rate: Option<f64>,
    pub overall_error_rate: Option<f64>,
    pub duration_score: Option<f64>,
    pub error_score: Option<f64>,
    pub cache_score: Option<f64>,
    /// 0 to 100.
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetReport {
    pub generated_at: DateTime<Utc>,
    pub window_start: DateTime<Utc>,
    pub rollups: Vec<AgentRollup>,
    pub trend: Vec<TrendPoint>,
    /// `None` when neither samples nor known agents exist.
    pub health: Option<HealthScore>,
}

impl FleetReport {
    pub fn status_count(&self, status: AgentStatus) -> usize {
        self.rollups.iter().filter(|r| r.status == status).count()
    }

    pub fn sample_count(&self) -> u64 {
        self.rollups.iter().map(|r| r.sample_count).sum()
    }
}
