use rayon::prelude::*;

use excov_core::models::{Annotation, Interval};
use excov_depth::{DepthError, DepthReader};

use crate::annotator::{AnnotatorOptions, annotate_group, extend_intervals};
use crate::error::{AnnotateError, Result};
use crate::grouper::group_intervals;

///
/// Annotate intervals on the rayon thread pool.
///
/// Batches are formed exactly like [`crate::annotate`] forms them, then read on worker
/// threads. Each worker opens its own reader with `make_reader`. Results keep the input
/// order, and the first error (in input order) is returned.
///
/// # Arguments
/// - intervals: intervals sorted by contig and start
/// - options: cutoff, extension, batch size and extra thresholds
/// - make_reader: opens a fresh depth reader, called once per worker split
///
pub fn par_annotate<F, R>(
    intervals: Vec<Interval>,
    options: &AnnotatorOptions,
    make_reader: F,
) -> Result<Vec<Annotation>>
where
    F: Fn() -> std::result::Result<R, DepthError> + Sync + Send,
    R: DepthReader,
{
    let groups: Vec<Vec<Interval>> = group_intervals(
        extend_intervals(intervals, options.extension),
        options.bp_threshold,
    )
    .collect();
    let levels = options.levels();
    log::info!(
        "annotating {} batches on {} threads",
        groups.len(),
        rayon::current_num_threads()
    );

    let batches: Vec<Result<Vec<Annotation>>> = groups
        .into_par_iter()
        .map_init(&make_reader, |reader, group| match reader {
            Ok(reader) => annotate_group(group, reader, &levels),
            Err(err) => Err(AnnotateError::ReaderInit(err.to_string())),
        })
        .collect();

    let mut annotations = Vec::new();
    for batch in batches {
        annotations.extend(batch?);
    }
    Ok(annotations)
}
