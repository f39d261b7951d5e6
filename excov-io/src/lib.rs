//! # Input/Output for excov.
//!
//! Small, line-oriented readers and writers around the excov data model:
//!
//! - [`bed`]: interval definitions (`contig start end name score strand transcripts genes`),
//!   converted from 0-based half-open BED coordinates to 1-based closed [`Interval`]s on read
//! - [`annotated`]: the same rows with coverage and completeness columns appended
//! - [`ccds`]: conversion of a CCDS dump into interval definitions
//!
//! [`Interval`]: excov_core::models::Interval
pub mod annotated;
pub mod bed;
pub mod ccds;
pub mod error;

// re-expose core functions
pub use annotated::*;
pub use bed::*;
pub use ccds::*;
pub use error::*;
