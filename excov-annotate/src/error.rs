use excov_depth::DepthError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error(transparent)]
    Depth(#[from] DepthError),

    #[error("interval {name} ({start}-{end}) falls outside the depths read for its batch")]
    InvalidInterval { name: String, start: u32, end: u32 },

    #[error("interval {name} on {contig} was batched with intervals on {group_contig}, is the input sorted?")]
    UnsortedGroup {
        name: String,
        contig: String,
        group_contig: String,
    },

    #[error("could not open a depth reader for a worker: {0}")]
    ReaderInit(String),
}

pub type Result<T> = std::result::Result<T, AnnotateError>;
