use excov_core::models::Interval;

/// Target span of one batch in base pairs.
pub const DEFAULT_BP_THRESHOLD: u32 = 17000;

///
/// Groups a sorted interval stream into batches that can be served by a single depth read.
///
/// This struct is created by [`group_intervals`] or [`GroupIntervals::group_intervals`].
///
/// A new batch starts when the contig changes or when the running span of the batch
/// (from its first start to the largest end seen, including the incoming interval)
/// exceeds the threshold. An interval longer than the threshold ends up alone. Intervals
/// are never dropped, split or reordered, and empty batches are never yielded.
///
pub struct IntervalGroups<I> {
    inner: I,
    bp_threshold: u32,
    group: Vec<Interval>,
    group_start: u32,
    group_end: u32,
    last_contig: Option<String>,
}

impl<I> IntervalGroups<I>
where
    I: Iterator<Item = Interval>,
{
    pub fn new(inner: I, bp_threshold: u32) -> Self {
        IntervalGroups {
            inner,
            bp_threshold,
            group: Vec::new(),
            group_start: 0,
            group_end: 0,
            last_contig: None,
        }
    }
}

impl<I> Iterator for IntervalGroups<I>
where
    I: Iterator<Item = Interval>,
{
    type Item = Vec<Interval>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some(interval) = self.inner.next() else {
                if self.group.is_empty() {
                    return None;
                }
                return Some(std::mem::take(&mut self.group));
            };

            self.group_end = self.group_end.max(interval.end);
            let contig_changed = self.last_contig.as_deref() != Some(interval.contig.as_str());
            let too_wide = self.group_end.saturating_sub(self.group_start) > self.bp_threshold;

            if contig_changed || too_wide {
                if contig_changed {
                    self.last_contig = Some(interval.contig.clone());
                }
                self.group_start = interval.start;
                self.group_end = interval.end;
                let previous = std::mem::replace(&mut self.group, vec![interval]);
                if !previous.is_empty() {
                    return Some(previous);
                }
            } else {
                self.group.push(interval);
            }
        }
    }
}

///
/// Group a sorted interval stream into batches. See [`IntervalGroups`].
///
/// # Arguments
/// - intervals: intervals sorted by contig and start
/// - bp_threshold: target span of one batch
///
pub fn group_intervals<I>(intervals: I, bp_threshold: u32) -> IntervalGroups<I::IntoIter>
where
    I: IntoIterator<Item = Interval>,
{
    IntervalGroups::new(intervals.into_iter(), bp_threshold)
}

pub trait GroupIntervals: Iterator<Item = Interval> + Sized {
    fn group_intervals(self, bp_threshold: u32) -> IntervalGroups<Self> {
        IntervalGroups::new(self, bp_threshold)
    }
}

impl<I: Iterator<Item = Interval>> GroupIntervals for I {}
