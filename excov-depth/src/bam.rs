use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use noodles::bam;
use noodles::bgzf;
use noodles::core::{Position, Region};
use noodles::sam;
use noodles::sam::alignment::record::Flags;
use noodles::sam::alignment::record::cigar::op::Kind;
use noodles::sam::header::record::value::map::read_group::tag as read_group_tag;

use crate::error::{DepthError, Result};
use crate::{DepthReader, check_region};

/// Reads with any of these flags never count towards depth.
pub fn is_countable(flags: Flags) -> bool {
    !(flags.is_unmapped() || flags.is_secondary() || flags.is_qc_fail() || flags.is_duplicate())
}

/// `true` for CIGAR operations that put a read base (or a deletion) on the reference.
pub fn covers_reference(kind: Kind) -> bool {
    matches!(
        kind,
        Kind::Match | Kind::SequenceMatch | Kind::SequenceMismatch | Kind::Deletion
    )
}

/// `true` for CIGAR operations that advance along the reference.
pub fn consumes_reference(kind: Kind) -> bool {
    covers_reference(kind) || kind == Kind::Skip
}

///
/// Walk an alignment and call `on_block` with every reference block `[from, to]` it covers,
/// clipped to `[start, end]`.
///
fn for_each_covered_block<I, F>(alignment_start: usize, ops: I, start: usize, end: usize, mut on_block: F)
where
    I: IntoIterator<Item = (Kind, usize)>,
    F: FnMut(usize, usize),
{
    let mut ref_pos = alignment_start;
    for (kind, len) in ops {
        if len == 0 || !consumes_reference(kind) {
            continue;
        }
        let block_end = ref_pos + len - 1;
        if covers_reference(kind) {
            let from = ref_pos.max(start);
            let to = block_end.min(end);
            if from <= to {
                on_block(from, to);
            }
        }
        ref_pos += len;
        if ref_pos > end {
            break;
        }
    }
}

///
/// Per-base depth accumulator for one region, built from a difference array.
///
#[derive(Debug)]
pub struct DepthAccumulator {
    start: usize,
    end: usize,
    diff: Vec<i64>,
}

impl DepthAccumulator {
    pub fn new(start: u32, end: u32) -> Self {
        let len = (end - start) as usize + 1;
        DepthAccumulator {
            start: start as usize,
            end: end as usize,
            diff: vec![0; len + 1],
        }
    }

    /// Add one alignment given its 1-based start and CIGAR as `(kind, length)` pairs.
    pub fn add_alignment<I>(&mut self, alignment_start: usize, ops: I)
    where
        I: IntoIterator<Item = (Kind, usize)>,
    {
        let (start, end) = (self.start, self.end);
        let diff = &mut self.diff;
        for_each_covered_block(alignment_start, ops, start, end, |from, to| {
            diff[from - start] += 1;
            diff[to - start + 1] -= 1;
        });
    }

    pub fn into_depths(self) -> Vec<u32> {
        let len = self.diff.len() - 1;
        let mut running = 0i64;
        self.diff[..len]
            .iter()
            .map(|d| {
                running += d;
                running as u32
            })
            .collect()
    }
}

///
/// The sample name of an alignment: the `SM` value shared by every read group.
///
/// Returns `None` when there are no read groups, none carry `SM`, or they disagree.
///
pub fn sample_id_from_header(header: &sam::Header) -> Option<String> {
    let samples: BTreeSet<String> = header
        .read_groups()
        .values()
        .filter_map(|read_group| read_group.other_fields().get(&read_group_tag::SAMPLE))
        .map(|sample| sample.to_string())
        .collect();

    if samples.len() == 1 {
        samples.into_iter().next()
    } else {
        None
    }
}

fn ensure_contig(header: &sam::Header, contig: &str) -> Result<()> {
    header
        .reference_sequences()
        .get_index_of(contig.as_bytes())
        .map(|_| ())
        .ok_or_else(|| DepthError::UnknownContig(contig.to_string()))
}

fn has_index(path: &Path) -> bool {
    let mut candidates: Vec<PathBuf> = ["bai", "csi"]
        .iter()
        .map(|ext| {
            let mut name = path.as_os_str().to_owned();
            name.push(".");
            name.push(ext);
            PathBuf::from(name)
        })
        .collect();
    candidates.push(path.with_extension("bai"));
    candidates.iter().any(|candidate| candidate.exists())
}

fn region(contig: &str, start: u32, end: u32) -> Result<Region> {
    let invalid = || DepthError::InvalidRegion {
        contig: contig.to_string(),
        start,
        end,
    };
    let start = Position::try_from(start as usize).map_err(|_| invalid())?;
    let end = Position::try_from(end as usize).map_err(|_| invalid())?;
    Ok(Region::new(contig, start..=end))
}

///
/// Depth reader over a coordinate-sorted, indexed BAM file.
///
/// Unmapped, secondary, QC-failed and duplicate reads are ignored. Matches, mismatches
/// and deletions count towards depth, reference skips (`N`) do not.
///
pub struct BamDepthReader {
    path: PathBuf,
    reader: bam::io::IndexedReader<bgzf::Reader<File>>,
    header: sam::Header,
}

impl BamDepthReader {
    ///
    /// Open a BAM file and its index (`<path>.bai`, `<path>.csi` or `<stem>.bai`).
    ///
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DepthError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{}: no such file", path.display()),
            )));
        }
        if !has_index(path) {
            return Err(DepthError::MissingIndex(path.to_path_buf()));
        }

        let mut reader = bam::io::indexed_reader::Builder::default().build_from_path(path)?;
        let header = reader.read_header()?;
        log::debug!(
            "opened {} with {} reference sequences",
            path.display(),
            header.reference_sequences().len()
        );

        Ok(BamDepthReader {
            path: path.to_path_buf(),
            reader,
            header,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &sam::Header {
        &self.header
    }

    /// See [`sample_id_from_header`].
    pub fn sample_id(&self) -> Option<String> {
        sample_id_from_header(&self.header)
    }

    ///
    /// Feed every countable alignment overlapping the region to `visit`, as its start and
    /// CIGAR operations.
    ///
    fn visit_alignments<F>(&mut self, contig: &str, start: u32, end: u32, mut visit: F) -> Result<()>
    where
        F: FnMut(usize, Vec<(Kind, usize)>),
    {
        check_region(contig, start, end)?;
        ensure_contig(&self.header, contig)?;

        let region = region(contig, start, end)?;
        let query = self.reader.query(&self.header, &region)?;
        for result in query {
            let record = result?;
            if !is_countable(record.flags()) {
                continue;
            }
            let alignment_start = match record.alignment_start() {
                Some(position) => usize::from(position?),
                None => continue,
            };
            let ops = record
                .cigar()
                .iter()
                .map(|op| op.map(|op| (op.kind(), op.len())))
                .collect::<std::io::Result<Vec<_>>>()?;
            visit(alignment_start, ops);
        }
        Ok(())
    }
}

impl DepthReader for BamDepthReader {
    fn read_depths(&mut self, contig: &str, start: u32, end: u32) -> Result<Vec<u32>> {
        check_region(contig, start, end)?;
        let mut accumulator = DepthAccumulator::new(start, end);
        self.visit_alignments(contig, start, end, |alignment_start, ops| {
            accumulator.add_alignment(alignment_start, ops)
        })?;
        Ok(accumulator.into_depths())
    }

    ///
    /// Streams the region without materialising a per-base array, so whole chromosomes
    /// are cheap to summarise.
    ///
    fn mean_depth(&mut self, contig: &str, start: u32, end: u32) -> Result<f64> {
        let (from, to) = (start as usize, end as usize);
        let mut covered: u64 = 0;
        self.visit_alignments(contig, start, end, |alignment_start, ops| {
            for_each_covered_block(alignment_start, ops, from, to, |a, b| {
                covered += (b - a + 1) as u64;
            })
        })?;
        Ok(covered as f64 / (to - from + 1) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_accumulator_counts_matches_and_deletions() {
        let mut acc = DepthAccumulator::new(10, 19);
        // 3M 2D 2M starting at 9: covers 9..=15
        acc.add_alignment(9, vec![(Kind::Match, 3), (Kind::Deletion, 2), (Kind::Match, 2)]);
        // 2S 4M starting at 17: soft clip does not consume reference
        acc.add_alignment(17, vec![(Kind::SoftClip, 2), (Kind::Match, 4)]);

        assert_eq!(
            acc.into_depths(),
            vec![1, 1, 1, 1, 1, 1, 0, 1, 1, 1]
        );
    }

    #[rstest]
    fn test_accumulator_skips_introns_and_insertions() {
        let mut acc = DepthAccumulator::new(1, 10);
        // 2M 1I 2M 3N 2M starting at 1: 1,2 3,4 skip 5..7 then 8,9
        acc.add_alignment(
            1,
            vec![
                (Kind::Match, 2),
                (Kind::Insertion, 1),
                (Kind::SequenceMatch, 2),
                (Kind::Skip, 3),
                (Kind::SequenceMismatch, 2),
            ],
        );
        assert_eq!(acc.into_depths(), vec![1, 1, 1, 1, 0, 0, 0, 1, 1, 0]);
    }

    #[rstest]
    fn test_accumulator_ignores_reads_outside_region() {
        let mut acc = DepthAccumulator::new(100, 104);
        acc.add_alignment(1, vec![(Kind::Match, 50)]);
        acc.add_alignment(200, vec![(Kind::Match, 50)]);
        assert_eq!(acc.into_depths(), vec![0; 5]);
    }

    #[rstest]
    fn test_flag_filter() {
        assert!(is_countable(Flags::empty()));
        assert!(is_countable(Flags::REVERSE_COMPLEMENTED));
        assert!(!is_countable(Flags::UNMAPPED));
        assert!(!is_countable(Flags::SECONDARY));
        assert!(!is_countable(Flags::QC_FAIL));
        assert!(!is_countable(Flags::DUPLICATE));
    }

    #[rstest]
    #[case("@HD\tVN:1.6\n@RG\tID:rg1\tSM:NA12878\n@RG\tID:rg2\tSM:NA12878\n", Some("NA12878"))]
    #[case("@HD\tVN:1.6\n@RG\tID:rg1\tSM:NA12878\n@RG\tID:rg2\tSM:NA12891\n", None)]
    #[case("@HD\tVN:1.6\n@RG\tID:rg1\n", None)]
    #[case("@HD\tVN:1.6\n", None)]
    fn test_sample_id_from_header(#[case] text: &str, #[case] expected: Option<&str>) {
        let header: sam::Header = text.parse().unwrap();
        assert_eq!(sample_id_from_header(&header).as_deref(), expected);
    }

    #[rstest]
    fn test_ensure_contig() {
        let header: sam::Header = "@HD\tVN:1.6\n@SQ\tSN:chr1\tLN:1000\n".parse().unwrap();
        assert!(ensure_contig(&header, "chr1").is_ok());
        assert!(matches!(
            ensure_contig(&header, "chrM"),
            Err(DepthError::UnknownContig(_))
        ));
    }

    #[rstest]
    fn test_open_missing_file() {
        let result = BamDepthReader::open("/definitely/not/here.bam");
        assert!(matches!(result, Err(DepthError::Io(_))));
    }

    #[rstest]
    fn test_open_without_index() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("sample.bam");
        std::fs::write(&path, b"").unwrap();

        let result = BamDepthReader::open(&path);
        assert!(matches!(result, Err(DepthError::MissingIndex(p)) if p == path));
    }
}
