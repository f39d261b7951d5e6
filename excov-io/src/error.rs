use std::io;
use thiserror::Error;

use excov_core::IntervalError;

/// Error type for excov-io operations.
#[derive(Error, Debug)]
pub enum BedError {
    /// IO error occurred during file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A row could not be turned into an interval.
    #[error("Line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A row parsed but describes an invalid interval.
    #[error("Line {line}: {source}")]
    Interval {
        line: usize,
        #[source]
        source: IntervalError,
    },

    /// The annotated file has no (or a malformed) `#` header naming the metric columns.
    #[error("Missing or malformed metric header: {0}")]
    Header(String),
}

impl BedError {
    pub(crate) fn parse<M: Into<String>>(line: usize, message: M) -> Self {
        BedError::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Result type alias for excov-io operations.
pub type Result<T> = std::result::Result<T, BedError>;
