// Domain models: raw samples in, rollups / trend points / health score out.

mod report;
mod rollup;
mod sample;
mod trend;

pub use report::{FleetReport, HealthScore};
pub use rollup::{AgentRollup, AgentStatus};
pub use sample::{MetricSample, RawMetricSample, ScanCounters};
pub use trend::TrendPoint;
