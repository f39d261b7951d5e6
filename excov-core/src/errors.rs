use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum IntervalError {
    #[error("Interval start must be >= 1 (1-based coordinates), got {0}")]
    StartBelowOne(u32),

    #[error("Interval end ({end}) is before its start ({start})")]
    EndBeforeStart { start: u32, end: u32 },

    #[error("Invalid strand: '{0}'")]
    InvalidStrand(String),

    #[error("Invalid metric name: '{0}'")]
    InvalidMetric(String),

    #[error("Unknown element level: '{0}'")]
    InvalidLevel(String),
}

pub type Result<T> = std::result::Result<T, IntervalError>;
