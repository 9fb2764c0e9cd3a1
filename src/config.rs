use chrono::TimeDelta;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub fleet: FleetConfig,
    #[serde(default)]
    pub status: StatusThresholds,
    #[serde(default)]
    pub score: ScoreConfig,
    #[serde(default)]
    pub trend: TrendConfig,
    #[serde(default)]
    pub reporting: ReportingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// JSON array of samples, as returned by the agent inventory endpoint.
    pub samples_path: String,
    /// Samples older than now - window_hours are ignored.
    #[serde(default = "default_window_hours")]
    pub window_hours: u32,
}

fn default_window_hours() -> u32 {
    24
}

/// Agents expected to report. Those absent from the window get an empty (critical) rollup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FleetConfig {
    #[serde(default)]
    pub agents: Vec<String>,
}

/// One status level: exceeded when the average scan duration or the error rate is above it.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct StatusLevel {
    pub scan_duration_ms: f64,
    pub error_rate: f64,
}

impl StatusLevel {
    pub fn exceeded_by(&self, avg_scan_duration_ms: f64, error_rate: f64) -> bool {
        avg_scan_duration_ms > self.scan_duration_ms || error_rate > self.error_rate
    }
}

/// Status SLA, evaluated most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct StatusThresholds {
    #[serde(default = "default_critical")]
    pub critical: StatusLevel,
    #[serde(default = "default_warning")]
    pub warning: StatusLevel,
    #[serde(default = "default_good")]
    pub good: StatusLevel,
}

fn default_critical() -> StatusLevel {
    StatusLevel {
        scan_duration_ms: 200.0,
        error_rate: 0.10,
    }
}

fn default_warning() -> StatusLevel {
    StatusLevel {
        scan_duration_ms: 150.0,
        error_rate: 0.05,
    }
}

fn default_good() -> StatusLevel {
    StatusLevel {
        scan_duration_ms: 100.0,
        error_rate: 0.02,
    }
}

impl Default for StatusThresholds {
    fn default() -> Self {
        Self {
            critical: default_critical(),
            warning: default_warning(),
            good: default_good(),
        }
    }
}

/// Health score blend. Sub-scores:
/// duration = 100 - (avg_ms - duration_baseline_ms) / duration_ms_per_point,
/// error = 100 - error_rate * error_rate_penalty,
/// cache = hit_rate * 100; each clamped to [0, 100] and blended by weight.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ScoreConfig {
    #[serde(default = "default_duration_baseline_ms")]
    pub duration_baseline_ms: f64,
    #[serde(default = "default_duration_ms_per_point")]
    pub duration_ms_per_point: f64,
    #[serde(default = "default_error_rate_penalty")]
    pub error_rate_penalty: f64,
    #[serde(default = "default_weight")]
    pub duration_weight: f64,
    #[serde(default = "default_weight")]
    pub error_weight: f64,
    #[serde(default = "default_weight")]
    pub cache_weight: f64,
}

fn default_duration_baseline_ms() -> f64 {
    50.0
}

fn default_duration_ms_per_point() -> f64 {
    2.0
}

fn default_error_rate_penalty() -> f64 {
    1000.0
}

fn default_weight() -> f64 {
    1.0
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            duration_baseline_ms: default_duration_baseline_ms(),
            duration_ms_per_point: default_duration_ms_per_point(),
            error_rate_penalty: default_error_rate_penalty(),
            duration_weight: default_weight(),
            error_weight: default_weight(),
            cache_weight: default_weight(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TrendConfig {
    #[serde(default = "default_bucket_secs")]
    pub bucket_secs: u64,
}

fn default_bucket_secs() -> u64 {
    3600
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            bucket_secs: default_bucket_secs(),
        }
    }
}

impl TrendConfig {
    pub fn bucket(&self) -> TimeDelta {
        i64::try_from(self.bucket_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportingConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Optional cron expression (e.g. "0 */5 * * * *"). Uses local time; replaces interval_secs.
    #[serde(default)]
    pub schedule: Option<String>,
    /// When set, each report is written there as pretty JSON.
    #[serde(default)]
    pub output_path: Option<String>,
}

fn default_interval_secs() -> u64 {
    60
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            schedule: None,
            output_path: None,
        }
    }
}

/// Everything the pure pipeline needs, detached from file/IO settings.
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    pub status: StatusThresholds,
    pub score: ScoreConfig,
    pub trend: TrendConfig,
    pub window_hours: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            status: StatusThresholds::default(),
            score: ScoreConfig::default(),
            trend: TrendConfig::default(),
            window_hours: default_window_hours(),
        }
    }
}

impl PipelineConfig {
    pub fn window(&self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.window_hours))
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            status: self.status,
            score: self.score,
            trend: self.trend,
            window_hours: self.input.window_hours,
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.input.samples_path.is_empty(),
            "input.samples_path must be non-empty"
        );
        anyhow::ensure!(
            self.input.window_hours > 0,
            "input.window_hours must be > 0, got {}",
            self.input.window_hours
        );
        anyhow::ensure!(
            self.fleet.agents.iter().all(|a| !a.trim().is_empty()),
            "fleet.agents must not contain empty ids"
        );

        for (name, level) in [
            ("critical", &self.status.critical),
            ("warning", &self.status.warning),
            ("good", &self.status.good),
        ] {
            anyhow::ensure!(
                level.scan_duration_ms.is_finite() && level.scan_duration_ms >= 0.0,
                "status.{}.scan_duration_ms must be >= 0, got {}",
                name,
                level.scan_duration_ms
            );
            anyhow::ensure!(
                level.error_rate.is_finite() && level.error_rate >= 0.0,
                "status.{}.error_rate must be >= 0, got {}",
                name,
                level.error_rate
            );
        }
        anyhow::ensure!(
            self.status.critical.scan_duration_ms >= self.status.warning.scan_duration_ms
                && self.status.warning.scan_duration_ms >= self.status.good.scan_duration_ms,
            "status scan_duration_ms thresholds must satisfy critical >= warning >= good"
        );
        anyhow::ensure!(
            self.status.critical.error_rate >= self.status.warning.error_rate
                && self.status.warning.error_rate >= self.status.good.error_rate,
            "status error_rate thresholds must satisfy critical >= warning >= good"
        );

        anyhow::ensure!(
            self.score.duration_baseline_ms.is_finite(),
            "score.duration_baseline_ms must be finite"
        );
        anyhow::ensure!(
            self.score.duration_ms_per_point.is_finite() && self.score.duration_ms_per_point > 0.0,
            "score.duration_ms_per_point must be > 0, got {}",
            self.score.duration_ms_per_point
        );
        anyhow::ensure!(
            self.score.error_rate_penalty.is_finite() && self.score.error_rate_penalty >= 0.0,
            "score.error_rate_penalty must be >= 0, got {}",
            self.score.error_rate_penalty
        );
        let weights = [
            self.score.duration_weight,
            self.score.error_weight,
            self.score.cache_weight,
        ];
        anyhow::ensure!(
            weights.iter().all(|w| w.is_finite() && *w >= 0.0),
            "score weights must be >= 0"
        );
        anyhow::ensure!(
            weights.iter().sum::<f64>() > 0.0,
            "score weights must not all be zero"
        );

        anyhow::ensure!(
            self.trend.bucket_secs > 0,
            "trend.bucket_secs must be > 0, got {}",
            self.trend.bucket_secs
        );
        anyhow::ensure!(
            self.reporting.interval_secs > 0,
            "reporting.interval_secs must be > 0, got {}",
            self.reporting.interval_secs
        );
        if let Some(schedule) = &self.reporting.schedule {
            anyhow::ensure!(
                schedule.parse::<cron::Schedule>().is_ok(),
                "reporting.schedule is not a valid cron expression: {}",
                schedule
            );
        }
        Ok(())
    }
}
