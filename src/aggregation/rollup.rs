// Rollup engine: fold one agent's samples into an AgentRollup and classify it.

use tracing::debug;

use super::Totals;
use crate::config::StatusThresholds;
use crate::error::PipelineError;
use crate::models::{AgentRollup, AgentStatus, MetricSample};

/// Folds `samples` (all from `agent_id`) into a rollup.
///
/// An empty input yields `sample_count = 0`, undefined averages/rates and
/// status `Critical`: a silent agent is unhealthy. A sample from any other
/// agent fails with `MixedAgent`.
pub fn rollup<'a>(
    samples: impl IntoIterator<Item = &'a MetricSample>,
    agent_id: &str,
    thresholds: &StatusThresholds,
) -> Result<AgentRollup, PipelineError> {
    let mut totals = Totals::default();
    for s in samples {
        if s.agent_id() != agent_id {
            return Err(PipelineError::MixedAgent {
                expected: agent_id.to_string(),
                found: s.agent_id().to_string(),
            });
        }
        totals.add(s);
    }

    let avg_scan_duration_ms = totals.avg_scan_duration_ms();
    let error_rate = totals.error_rate();
    let status = classify(thresholds, avg_scan_duration_ms, error_rate);

    debug!(
        agent_id,
        sample_count = totals.sample_count,
        %status,
        "agent rollup"
    );

    Ok(AgentRollup {
        agent_id: agent_id.to_string(),
        sample_count: totals.sample_count,
        avg_scan_duration_ms,
        total_files_processed: totals.files_processed,
        total_alerts_generated: totals.alerts_generated,
        total_cache_hits: totals.cache_hits,
        total_cache_misses: totals.cache_misses,
        total_errors: totals.errors,
        cache_hit_rate: totals.cache_hit_rate(),
        error_rate,
        last_seen: totals.last_seen,
        status,
    })
}

/// First matching level wins, most severe first. Undefined inputs (no samples) are critical.
pub fn classify(
    thresholds: &StatusThresholds,
    avg_scan_duration_ms: Option<f64>,
    error_rate: Option<f64>,
) -> AgentStatus {
    let (Some(duration), Some(errors)) = (avg_scan_duration_ms, error_rate) else {
        return AgentStatus::Critical;
    };
    if thresholds.critical.exceeded_by(duration, errors) {
        AgentStatus::Critical
    } else if thresholds.warning.exceeded_by(duration, errors) {
        AgentStatus::Warning
    } else if thresholds.good.exceeded_by(duration, errors) {
        AgentStatus::Good
    } else {
        AgentStatus::Optimal
    }
}
