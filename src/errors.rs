use std::io;

use thiserror::Error;

use crate::types::{SourceId, ToolName};

/// Error type for registry configuration, extraction, and sampling failures.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("invalid operation on source '{source_id}': {operation}")]
    InvalidOperation {
        source_id: SourceId,
        operation: String,
    },
    #[error("requested {requested} samples but only {available} entries are admitted")]
    SampleSize { requested: usize, available: usize },
    #[error("data source '{source_id}' is unavailable: {reason}")]
    SourceUnavailable { source_id: SourceId, reason: String },
    #[error("data source '{source_id}' returned inconsistent state: {details}")]
    SourceInconsistent {
        source_id: SourceId,
        details: String,
    },
    #[error("external tool '{tool}' failed: {status}")]
    ToolFailed { tool: ToolName, status: String },
    #[error(transparent)]
    Io(#[from] io::Error),
}
