// Score composer: blend fleet-wide duration, error and cache figures into 0-100.

use tracing::debug;

use super::mean_defined;
use crate::config::ScoreConfig;
use crate::error::PipelineError;
use crate::models::{AgentRollup, HealthScore};

/// Composes the fleet health score from per-agent rollups.
///
/// Fleet figures are means over rollups where the figure is defined; silent
/// agents still count towards `total_agents`. A figure undefined for the whole
/// fleet drops its sub-score from the blend; with no sub-score left the score is 0.
pub fn compose_score(
    rollups: &[AgentRollup],
    config: &ScoreConfig,
) -> Result<HealthScore, PipelineError> {
    if rollups.is_empty() {
        return Err(PipelineError::NoAgents);
    }

    let avg_scan_duration_ms = mean_defined(rollups.iter().map(|r| r.avg_scan_duration_ms));
    let overall_cache_hit_rate = mean_defined(rollups.iter().map(|r| r.cache_hit_rate));
    let overall_error_rate = mean_defined(rollups.iter().map(|r| r.error_rate));

    let duration_score = avg_scan_duration_ms.map(|d| {
        clamp_score(100.0 - (d - config.duration_baseline_ms) / config.duration_ms_per_point)
    });
    let error_score =
        overall_error_rate.map(|e| clamp_score(100.0 - e * config.error_rate_penalty));
    let cache_score = overall_cache_hit_rate.map(|c| clamp_score(c * 100.0));

    let score = blend(&[
        (duration_score, config.duration_weight),
        (error_score, config.error_weight),
        (cache_score, config.cache_weight),
    ]);

    let silent_agents = rollups.iter().filter(|r| r.is_silent()).count() as u64;
    debug!(
        total_agents = rollups.len(),
        silent_agents, score, "health score composed"
    );

    Ok(HealthScore {
        total_agents: rollups.len() as u64,
        silent_agents,
        avg_scan_duration_ms,
        overall_cache_hit_rate,
        overall_error_rate,
        duration_score,
        error_score,
        cache_score,
        score,
    })
}

fn clamp_score(v: f64) -> f64 {
    v.clamp(0.0, 100.0)
}

/// Weighted mean over defined sub-scores.
fn blend(parts: &[(Option<f64>, f64)]) -> f64 {
    let (weighted, weight) = parts
        .iter()
        .filter_map(|&(s, w)| s.map(|s| (s * w, w)))
        .fold((0.0, 0.0), |(acc, total), (sw, w)| (acc + sw, total + w));
    if weight > 0.0 {
        clamp_score(weighted / weight)
    } else {
        0.0
    }
}
