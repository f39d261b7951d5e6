use std::collections::VecDeque;

use excov_core::models::{Annotation, Interval};
use excov_depth::DepthReader;

use crate::error::{AnnotateError, Result};
use crate::grouper::{DEFAULT_BP_THRESHOLD, IntervalGroups};
use crate::metrics::{calculate_metrics, completeness_levels};

/// Completeness cutoff used when none is configured.
pub const DEFAULT_CUTOFF: u32 = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotatorOptions {
    /// threshold for [`Annotation::completeness`]
    pub cutoff: u32,
    /// bases added on both sides of every interval
    pub extension: u32,
    pub bp_threshold: u32,
    /// additional completeness thresholds
    pub thresholds: Vec<u32>,
}

impl Default for AnnotatorOptions {
    fn default() -> Self {
        AnnotatorOptions {
            cutoff: DEFAULT_CUTOFF,
            extension: 0,
            bp_threshold: DEFAULT_BP_THRESHOLD,
            thresholds: Vec::new(),
        }
    }
}

impl AnnotatorOptions {
    pub fn with_cutoff(mut self, cutoff: u32) -> Self {
        self.cutoff = cutoff;
        self
    }

    pub fn with_extension(mut self, extension: u32) -> Self {
        self.extension = extension;
        self
    }

    pub fn with_bp_threshold(mut self, bp_threshold: u32) -> Self {
        self.bp_threshold = bp_threshold;
        self
    }

    pub fn with_thresholds(mut self, thresholds: Vec<u32>) -> Self {
        self.thresholds = thresholds;
        self
    }

    ///
    /// Every completeness threshold to report: the cutoff first, then the extra
    /// thresholds in the order given, without repeats.
    ///
    pub fn levels(&self) -> Vec<u32> {
        let mut levels = vec![self.cutoff];
        for threshold in &self.thresholds {
            if !levels.contains(threshold) {
                levels.push(*threshold);
            }
        }
        levels
    }
}

///
/// Iterator adaptor widening every interval, see [`extend_intervals`].
///
pub struct Extended<I> {
    inner: I,
    extension: u32,
}

impl<I: Iterator<Item = Interval>> Iterator for Extended<I> {
    type Item = Interval;

    fn next(&mut self) -> Option<Self::Item> {
        let interval = self.inner.next()?;
        if self.extension == 0 {
            return Some(interval);
        }
        Some(interval.extended(self.extension))
    }
}

///
/// Widen every interval by `extension` bases on both sides (see [`Interval::extended`]).
///
pub fn extend_intervals<I>(intervals: I, extension: u32) -> Extended<I::IntoIter>
where
    I: IntoIterator<Item = Interval>,
{
    Extended {
        inner: intervals.into_iter(),
        extension,
    }
}

///
/// Annotate one batch of intervals with a single depth read.
///
/// The batch must lie on one contig. Depths are read for the batch envelope and sliced
/// per interval.
///
/// # Arguments
/// - group: intervals on one contig
/// - reader: depth source
/// - levels: completeness thresholds, the first one is reported as [`Annotation::completeness`]
///
pub fn annotate_group<R>(group: Vec<Interval>, reader: &mut R, levels: &[u32]) -> Result<Vec<Annotation>>
where
    R: DepthReader + ?Sized,
{
    let Some(first) = group.first() else {
        return Ok(Vec::new());
    };
    let contig = first.contig.clone();
    let overall_start = group.iter().map(|i| i.start).min().unwrap_or(first.start);
    let overall_end = group.iter().map(|i| i.end).max().unwrap_or(first.end);

    log::debug!(
        "reading {}:{}-{} for {} intervals",
        contig,
        overall_start,
        overall_end,
        group.len()
    );
    let depths = reader.read_depths(&contig, overall_start, overall_end)?;

    let mut annotations = Vec::with_capacity(group.len());
    for interval in group {
        if interval.contig != contig {
            return Err(AnnotateError::UnsortedGroup {
                name: interval.name,
                contig: interval.contig,
                group_contig: contig,
            });
        }

        let invalid = || AnnotateError::InvalidInterval {
            name: interval.name.clone(),
            start: interval.start,
            end: interval.end,
        };
        if interval.start > interval.end || interval.start < overall_start {
            return Err(invalid());
        }
        let from = (interval.start - overall_start) as usize;
        let to = (interval.end - overall_start) as usize;
        let slice = depths.get(from..=to).ok_or_else(invalid)?;

        let cutoff = levels.first().copied().unwrap_or(0);
        let (coverage, completeness) = calculate_metrics(slice, cutoff);
        let levels = completeness_levels(slice, levels);

        annotations.push(Annotation {
            interval,
            coverage,
            completeness,
            levels,
        });
    }

    Ok(annotations)
}

///
/// Lazy annotation of a sorted interval stream.
///
/// This struct is created by [`annotate`]. Annotations come out in input order. A depth
/// read error is yielded once, after which the iterator is exhausted.
///
pub struct Annotate<'r, I, R>
where
    I: Iterator<Item = Interval>,
    R: DepthReader + ?Sized,
{
    groups: IntervalGroups<Extended<I>>,
    reader: &'r mut R,
    levels: Vec<u32>,
    pending: VecDeque<Annotation>,
    failed: bool,
}

impl<'r, I, R> Iterator for Annotate<'r, I, R>
where
    I: Iterator<Item = Interval>,
    R: DepthReader + ?Sized,
{
    type Item = Result<Annotation>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(annotation) = self.pending.pop_front() {
                return Some(Ok(annotation));
            }
            if self.failed {
                return None;
            }

            let group = self.groups.next()?;
            match annotate_group(group, &mut *self.reader, &self.levels) {
                Ok(annotations) => self.pending.extend(annotations),
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

///
/// Annotate intervals with coverage and completeness.
///
/// Intervals are widened by the configured extension, batched (see
/// [`crate::grouper::IntervalGroups`]) and each batch is read once from `reader`.
///
/// # Arguments
/// - intervals: intervals sorted by contig and start
/// - reader: depth source
/// - options: cutoff, extension, batch size and extra thresholds
///
/// # Examples
/// ```
/// use excov_annotate::{annotate, AnnotatorOptions};
/// use excov_core::models::Interval;
/// use excov_depth::MemoryDepthReader;
///
/// let mut reader = MemoryDepthReader::new().with_contig("chr1", vec![2, 4, 5, 5, 5]);
/// let intervals = vec![Interval::new("chr1", 1, 5, "exon-1").unwrap()];
/// let options = AnnotatorOptions::default().with_cutoff(5);
///
/// let annotation = annotate(intervals, &mut reader, &options).next().unwrap().unwrap();
/// assert_eq!(annotation.coverage, 4.2);
/// assert_eq!(annotation.completeness, 0.6);
/// ```
pub fn annotate<'r, I, R>(
    intervals: I,
    reader: &'r mut R,
    options: &AnnotatorOptions,
) -> Annotate<'r, I::IntoIter, R>
where
    I: IntoIterator<Item = Interval>,
    R: DepthReader + ?Sized,
{
    Annotate {
        groups: IntervalGroups::new(
            extend_intervals(intervals, options.extension),
            options.bp_threshold,
        ),
        reader,
        levels: options.levels(),
        pending: VecDeque::new(),
        failed: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use excov_depth::{DepthError, MemoryDepthReader};
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn depths() -> Vec<u32> {
        let mut depths = vec![2, 4, 5, 5, 5, 5, 6];
        depths.extend(std::iter::repeat_n(7, 13));
        depths
    }

    #[fixture]
    fn reader(depths: Vec<u32>) -> MemoryDepthReader {
        MemoryDepthReader::new().with_contig("chr1", depths)
    }

    fn interval(start: u32, end: u32) -> Interval {
        Interval::new("chr1", start, end, format!("chr1-{}-{}", start, end)).unwrap()
    }

    #[rstest]
    fn test_two_intervals_one_batch(mut reader: MemoryDepthReader) {
        let options = AnnotatorOptions::default()
            .with_cutoff(5)
            .with_bp_threshold(100);
        let annotations: Vec<Annotation> =
            annotate(vec![interval(1, 5), interval(10, 20)], &mut reader, &options)
                .collect::<Result<_>>()
                .unwrap();

        assert_eq!(annotations.len(), 2);
        assert_eq!(annotations[0].coverage, 4.2);
        assert_eq!(annotations[0].completeness, 0.6);
        assert_eq!(annotations[1].coverage, 7.0);
        assert_eq!(annotations[1].completeness, 1.0);
        assert_eq!(reader.reads(), 1);
    }

    #[rstest]
    fn test_single_base_interval(mut reader: MemoryDepthReader) {
        let options = AnnotatorOptions::default()
            .with_cutoff(6)
            .with_thresholds(vec![7]);
        let annotation = annotate(vec![interval(7, 7)], &mut reader, &options)
            .next()
            .unwrap()
            .unwrap();

        assert_eq!(annotation.coverage, 6.0);
        assert_eq!(annotation.completeness, 1.0);
        assert_eq!(annotation.levels, vec![(6, 1.0), (7, 0.0)]);
    }

    #[rstest]
    fn test_batched_slices_match_direct_reads(depths: Vec<u32>) {
        let intervals = vec![interval(1, 3), interval(2, 9), interval(12, 12), interval(15, 20)];
        let options = AnnotatorOptions::default().with_cutoff(5);

        let mut batched_reader = MemoryDepthReader::new().with_contig("chr1", depths.clone());
        let batched: Vec<Annotation> = annotate(intervals.clone(), &mut batched_reader, &options)
            .collect::<Result<_>>()
            .unwrap();

        let mut direct_reader = MemoryDepthReader::new().with_contig("chr1", depths);
        for (interval, annotation) in intervals.iter().zip(&batched) {
            let direct = direct_reader
                .read_depths("chr1", interval.start, interval.end)
                .unwrap();
            assert_eq!(calculate_metrics(&direct, 5), (annotation.coverage, annotation.completeness));
        }
        assert_eq!(batched_reader.reads(), 1);
    }

    #[rstest]
    fn test_rerun_is_identical(depths: Vec<u32>) {
        let intervals = vec![interval(1, 5), interval(3, 12), interval(10, 20)];
        let options = AnnotatorOptions::default().with_bp_threshold(4);
        let run = || {
            let mut reader = MemoryDepthReader::new().with_contig("chr1", depths.clone());
            annotate(intervals.clone(), &mut reader, &options)
                .collect::<Result<Vec<_>>>()
                .unwrap()
        };
        assert_eq!(run(), run());
    }

    #[rstest]
    fn test_extension_is_clamped_at_one(mut reader: MemoryDepthReader) {
        let options = AnnotatorOptions::default().with_extension(3);
        let annotation = annotate(vec![interval(2, 4)], &mut reader, &options)
            .next()
            .unwrap()
            .unwrap();

        assert_eq!((annotation.interval.start, annotation.interval.end), (1, 7));
    }

    #[rstest]
    fn test_reads_past_the_end_are_zero(mut reader: MemoryDepthReader) {
        let annotation = annotate(vec![interval(19, 22)], &mut reader, &AnnotatorOptions::default())
            .next()
            .unwrap()
            .unwrap();
        assert_eq!(annotation.coverage, 3.5);
    }

    #[rstest]
    fn test_reader_error_is_yielded_once(mut reader: MemoryDepthReader) {
        let intervals = vec![
            interval(1, 5),
            Interval::new("chr2", 1, 5, "elsewhere").unwrap(),
            Interval::new("chr2", 10, 15, "elsewhere-2").unwrap(),
        ];
        let mut results = annotate(intervals, &mut reader, &AnnotatorOptions::default());

        assert!(results.next().unwrap().is_ok());
        assert!(matches!(
            results.next(),
            Some(Err(AnnotateError::Depth(DepthError::UnknownContig(_))))
        ));
        assert!(results.next().is_none());
    }

    #[rstest]
    fn test_mixed_contig_group_is_rejected(mut reader: MemoryDepthReader) {
        let group = vec![interval(1, 5), Interval::new("chr2", 1, 5, "other").unwrap()];
        let result = annotate_group(group, &mut reader, &[10]);
        assert!(matches!(result, Err(AnnotateError::UnsortedGroup { .. })));
    }

    #[rstest]
    fn test_levels_put_cutoff_first() {
        let options = AnnotatorOptions::default()
            .with_cutoff(15)
            .with_thresholds(vec![10, 15, 20]);
        assert_eq!(options.levels(), vec![15, 10, 20]);
    }
}
