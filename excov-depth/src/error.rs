use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DepthError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("no .bai or .csi index found next to {}", .0.display())]
    MissingIndex(PathBuf),

    #[error("contig '{0}' is not in the alignment header")]
    UnknownContig(String),

    #[error("invalid region {contig}:{start}-{end}")]
    InvalidRegion { contig: String, start: u32, end: u32 },
}

pub type Result<T> = std::result::Result<T, DepthError>;
