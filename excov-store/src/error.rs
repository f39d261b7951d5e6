use excov_core::IntervalError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// A uniqueness or reference constraint failed, the transaction was rolled back.
    #[error("integrity error: {0}")]
    Integrity(String),

    #[error("no {kind} with id '{id}'")]
    NotFound { kind: &'static str, id: String },

    #[error("cannot link exon {exon}: {reason}")]
    Link { exon: String, reason: String },

    #[error(transparent)]
    Model(#[from] IntervalError),

    #[error("annotation failed: {0}")]
    Annotation(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    ///
    /// Map constraint violations to [`StoreError::Integrity`], pass everything else through.
    ///
    pub fn from_sqlite(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(e, message)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::Integrity(message.unwrap_or_else(|| e.to_string()))
            }
            other => StoreError::Sqlite(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
