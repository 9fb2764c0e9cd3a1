// Ingestion boundary: decode the agent inventory JSON array and validate each sample.
// Invalid samples are split out here and never reach aggregation.

use std::path::Path;

use tracing::{instrument, warn};

use crate::error::PipelineError;
use crate::models::{MetricSample, RawMetricSample};

/// A sample rejected at the boundary, with its position in the input array.
#[derive(Debug)]
pub struct RejectedSample {
    pub index: usize,
    pub error: PipelineError,
}

/// Result of decoding one batch: valid samples plus rejections.
#[derive(Debug, Default)]
pub struct IngestBatch {
    pub samples: Vec<MetricSample>,
    pub rejected: Vec<RejectedSample>,
}

/// Decodes a JSON array of samples. Malformed JSON fails the whole batch;
/// each element that fails validation is collected in `rejected`.
pub fn decode_batch(json: &str) -> Result<IngestBatch, PipelineError> {
    let raw: Vec<RawMetricSample> = serde_json::from_str(json)?;
    let mut batch = IngestBatch {
        samples: Vec::with_capacity(raw.len()),
        rejected: Vec::new(),
    };
    for (index, r) in raw.into_iter().enumerate() {
        match MetricSample::try_from(r) {
            Ok(sample) => batch.samples.push(sample),
            Err(error) => {
                warn!(index, error = %error, "sample rejected");
                batch.rejected.push(RejectedSample { index, error });
            }
        }
    }
    Ok(batch)
}

/// Like `decode_batch` but fails on the first invalid sample.
pub fn decode_strict(json: &str) -> Result<Vec<MetricSample>, PipelineError> {
    let raw: Vec<RawMetricSample> = serde_json::from_str(json)?;
    raw.into_iter().map(MetricSample::try_from).collect()
}

#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub async fn load_batch(path: impl AsRef<Path>) -> anyhow::Result<IngestBatch> {
    let json = tokio::fs::read_to_string(path.as_ref()).await?;
    Ok(decode_batch(&json)?)
}
