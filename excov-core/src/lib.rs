//! # Core models for excov
//!
//! This crate holds the types shared by every other excov crate: the 1-based closed
//! [`Interval`](models::Interval) that flows through the annotation pipeline, the
//! persisted genomic elements ([`Gene`](models::Gene), [`Transcript`](models::Transcript),
//! [`Exon`](models::Exon)), samples and metric rows.
//!
//! ```rust
//! use excov_core::models::{Interval, Span};
//!
//! let exon = Interval::new("chr1", 10, 20, "exon-1").unwrap();
//! assert_eq!(exon.length(), 11);
//!
//! // widening never moves the start below the first base
//! let widened = exon.extended(15);
//! assert_eq!((widened.start, widened.end), (1, 35));
//! ```
pub mod errors;
pub mod models;
pub mod utils;

pub use errors::*;
