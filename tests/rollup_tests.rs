// Rollup engine tests: averages, rates, status classification, mixed-agent rejection

mod common;

use common::{at, counters, sample, sample_with};
use fleetpulse::aggregation::{classify, rollup};
use fleetpulse::config::{StatusLevel, StatusThresholds};
use fleetpulse::error::PipelineError;
use fleetpulse::models::{AgentStatus, MetricSample};

#[test]
fn rollup_empty_is_critical_with_undefined_figures() {
    let empty: Vec<MetricSample> = vec![];
    let r = rollup(&empty, "agent-1", &StatusThresholds::default()).unwrap();
    assert_eq!(r.agent_id, "agent-1");
    assert_eq!(r.sample_count, 0);
    assert_eq!(r.avg_scan_duration_ms, None);
    assert_eq!(r.cache_hit_rate, None);
    assert_eq!(r.error_rate, None);
    assert_eq!(r.last_seen, None);
    assert_eq!(r.total_files_processed, 0);
    assert_eq!(r.status, AgentStatus::Critical);
    assert!(r.is_silent());
}

#[test]
fn rollup_computes_means_totals_and_rates() {
    let samples = vec![
        sample_with("a", at(0), 40.0, counters(10, 3, 1, 0)),
        sample_with("a", at(5), 60.0, counters(20, 5, 1, 1)),
        sample_with("a", at(2), 80.0, counters(30, 0, 0, 0)),
        sample_with("a", at(1), 20.0, counters(40, 0, 0, 0)),
    ];
    let r = rollup(&samples, "a", &StatusThresholds::default()).unwrap();
    assert_eq!(r.sample_count, 4);
    assert_eq!(r.avg_scan_duration_ms, Some(50.0));
    assert_eq!(r.total_files_processed, 100);
    assert_eq!(r.total_cache_hits, 8);
    assert_eq!(r.total_cache_misses, 2);
    assert_eq!(r.cache_hit_rate, Some(0.8));
    assert_eq!(r.total_errors, 1);
    assert_eq!(r.error_rate, Some(0.25));
    assert_eq!(r.last_seen, Some(at(5)));
}

#[test]
fn rollup_without_cache_activity_has_undefined_rate_not_zero() {
    let samples = vec![sample("a", at(0), 10.0), sample("a", at(1), 20.0)];
    let r = rollup(&samples, "a", &StatusThresholds::default()).unwrap();
    assert_eq!(r.cache_hit_rate, None);
    assert_eq!(r.error_rate, Some(0.0));
}

#[test]
fn rollup_all_misses_is_zero_rate() {
    let samples = vec![sample_with("a", at(0), 10.0, counters(1, 0, 7, 0))];
    let r = rollup(&samples, "a", &StatusThresholds::default()).unwrap();
    assert_eq!(r.cache_hit_rate, Some(0.0));
}

#[test]
fn rollup_cache_hit_rate_stays_in_unit_interval() {
    let mut samples = Vec::new();
    for i in 0..50u64 {
        samples.push(sample_with(
            "a",
            at(i as i64),
            (i * 7 % 300) as f64,
            counters(i, i * 13 % 17, i * 5 % 11, i % 2),
        ));
    }
    for n in 1..=samples.len() {
        let r = rollup(&samples[..n], "a", &StatusThresholds::default()).unwrap();
        if let Some(rate) = r.cache_hit_rate {
            assert!((0.0..=1.0).contains(&rate), "rate {} out of range", rate);
        }
    }
}

#[test]
fn rollup_is_permutation_invariant() {
    let samples = vec![
        sample_with("a", at(0), 12.3, counters(1, 2, 3, 0)),
        sample_with("a", at(9), 0.1, counters(4, 5, 6, 1)),
        sample_with("a", at(3), 187.77, counters(7, 8, 9, 0)),
        sample_with("a", at(7), 33.3333, counters(10, 11, 12, 2)),
        sample_with("a", at(1), 1e-3, counters(13, 14, 15, 0)),
    ];
    let thresholds = StatusThresholds::default();
    let expected = rollup(&samples, "a", &thresholds).unwrap();

    let mut reversed = samples.clone();
    reversed.reverse();
    assert_eq!(rollup(&reversed, "a", &thresholds).unwrap(), expected);

    for k in 1..samples.len() {
        let mut rotated = samples.clone();
        rotated.rotate_left(k);
        assert_eq!(rollup(&rotated, "a", &thresholds).unwrap(), expected);
    }
}

#[test]
fn rollup_rejects_mixed_agents() {
    let samples = vec![sample("a", at(0), 10.0), sample("b", at(1), 10.0)];
    let err = rollup(&samples, "a", &StatusThresholds::default()).unwrap_err();
    match err {
        PipelineError::MixedAgent { expected, found } => {
            assert_eq!(expected, "a");
            assert_eq!(found, "b");
        }
        other => panic!("expected MixedAgent, got {:?}", other),
    }
}

#[test]
fn rollup_rejects_samples_of_another_agent_entirely() {
    let samples = vec![sample("b", at(0), 10.0)];
    let err = rollup(&samples, "a", &StatusThresholds::default()).unwrap_err();
    assert!(matches!(err, PipelineError::MixedAgent { .. }));
}

#[test]
fn rollup_high_duration_and_error_rate_is_critical() {
    let samples = vec![
        sample_with("a", at(0), 250.0, counters(1, 0, 1, 0)),
        sample_with("a", at(1), 250.0, counters(1, 0, 1, 1)),
    ];
    let r = rollup(&samples, "a", &StatusThresholds::default()).unwrap();
    assert_eq!(r.status, AgentStatus::Critical);
}

#[test]
fn classify_walks_levels_most_severe_first() {
    let t = StatusThresholds::default();
    assert_eq!(classify(&t, Some(50.0), Some(0.0)), AgentStatus::Optimal);
    assert_eq!(classify(&t, Some(100.0), Some(0.02)), AgentStatus::Optimal);
    assert_eq!(classify(&t, Some(100.5), Some(0.0)), AgentStatus::Good);
    assert_eq!(classify(&t, Some(10.0), Some(0.03)), AgentStatus::Good);
    assert_eq!(classify(&t, Some(150.5), Some(0.0)), AgentStatus::Warning);
    assert_eq!(classify(&t, Some(10.0), Some(0.06)), AgentStatus::Warning);
    assert_eq!(classify(&t, Some(200.5), Some(0.0)), AgentStatus::Critical);
    assert_eq!(classify(&t, Some(10.0), Some(0.11)), AgentStatus::Critical);
    assert_eq!(classify(&t, None, None), AgentStatus::Critical);
}

#[test]
fn classify_uses_injected_thresholds() {
    let relaxed = StatusThresholds {
        critical: StatusLevel {
            scan_duration_ms: 1000.0,
            error_rate: 0.5,
        },
        warning: StatusLevel {
            scan_duration_ms: 800.0,
            error_rate: 0.4,
        },
        good: StatusLevel {
            scan_duration_ms: 500.0,
            error_rate: 0.3,
        },
    };
    assert_eq!(classify(&relaxed, Some(250.0), Some(0.15)), AgentStatus::Optimal);
    assert_eq!(classify(&relaxed, Some(900.0), Some(0.0)), AgentStatus::Warning);
}
