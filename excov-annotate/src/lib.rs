//! # Coverage annotation of genomic intervals
//!
//! Turns a sorted stream of intervals into per-interval coverage and completeness,
//! reading depths in batches so neighbouring exons share one alignment scan.
//!
//! The pipeline is a chain of iterator adaptors:
//! [`extend_intervals`] → [`IntervalGroups`] → [`Annotate`].
//! [`par_annotate`] runs the same batches on the rayon thread pool.
pub mod annotator;
pub mod error;
pub mod grouper;
pub mod metrics;
pub mod parallel;

pub use self::annotator::{
    Annotate, AnnotatorOptions, DEFAULT_CUTOFF, Extended, annotate, annotate_group,
    extend_intervals,
};
pub use self::error::{AnnotateError, Result};
pub use self::grouper::{DEFAULT_BP_THRESHOLD, GroupIntervals, IntervalGroups, group_intervals};
pub use self::metrics::{calculate_metrics, completeness, completeness_levels, mean_coverage};
pub use self::parallel::par_annotate;
