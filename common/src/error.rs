use std::time::Duration;

use thiserror::Error;

/// Why a single tool invocation produced no usable output.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("{tool} is not installed or could not be started")]
    Unavailable { tool: String },
    #[error("{tool} exited with {status}: {stderr}")]
    ExecutionFailed {
        tool: String,
        status: String,
        stderr: String,
    },
    #[error("{tool} did not finish within {}s", .after.as_secs())]
    TimedOut { tool: String, after: Duration },
    #[error("{tool} produced malformed output: {reason}")]
    MalformedOutput { tool: String, reason: String },
    #[error("{tool} was stopped by an interrupt")]
    Interrupted { tool: String },
    #[error("I/O error while running {tool}: {source}")]
    Io {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

/// Conditions that decide the overall verdict of a run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("missing required tools: {}", .0.join(", "))]
    MissingTools(Vec<String>),
    #[error("scan interrupted by user")]
    Interrupted,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not serialize summary: {0}")]
    Summary(#[from] serde_json::Error),
}
