// Pipeline error taxonomy. All variants are input/caller errors detected at the call site.

/// Errors raised by ingestion and the aggregation pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A sample failed validation at construction; it never reaches aggregation.
    #[error("invalid sample from agent '{agent_id}': {field} {reason}")]
    InvalidSample {
        agent_id: String,
        field: &'static str,
        reason: String,
    },

    /// `rollup` was handed samples belonging to another agent.
    #[error("mixed agents in rollup: expected '{expected}', found '{found}'")]
    MixedAgent { expected: String, found: String },

    /// `compose_score` was handed an empty rollup set.
    #[error("cannot compose a health score without agents")]
    NoAgents,

    #[error("invalid trend bucket: {0}")]
    InvalidBucket(String),

    #[error("sample batch decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}

impl PipelineError {
    pub(crate) fn invalid(agent_id: &str, field: &'static str, reason: impl Into<String>) -> Self {
        PipelineError::InvalidSample {
            agent_id: agent_id.to_string(),
            field,
            reason: reason.into(),
        }
    }
}
