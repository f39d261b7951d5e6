//! # Read depth for excov
//!
//! Everything downstream of this crate only needs one thing from an alignment: the
//! number of reads covering each base of a region. [`DepthReader`] is that seam.
//! [`BamDepthReader`] implements it over an indexed BAM file and [`MemoryDepthReader`]
//! over in-memory arrays.
//!
//! ```
//! use excov_depth::{DepthReader, MemoryDepthReader};
//!
//! let mut reader = MemoryDepthReader::new().with_contig("chr1", vec![1, 2, 3, 4]);
//! assert_eq!(reader.read_depths("chr1", 2, 5).unwrap(), vec![2, 3, 4, 0]);
//! ```
pub mod bam;
pub mod error;
pub mod sex;

use std::collections::HashMap;

pub use self::bam::BamDepthReader;
pub use self::error::{DepthError, Result};
pub use self::sex::{Sex, SexPrediction, predict_sex, sex_from_reader};

pub(crate) fn check_region(contig: &str, start: u32, end: u32) -> Result<()> {
    if start < 1 || end < start {
        return Err(DepthError::InvalidRegion {
            contig: contig.to_string(),
            start,
            end,
        });
    }
    Ok(())
}

///
/// Source of per-base read depth.
///
pub trait DepthReader {
    ///
    /// Depth for every base of `contig:start-end` (1-based, closed).
    ///
    /// The result always has `end - start + 1` entries, bases without reads are 0.
    ///
    /// # Errors
    /// Unknown contigs and regions with `start < 1` or `end < start` are errors.
    ///
    fn read_depths(&mut self, contig: &str, start: u32, end: u32) -> Result<Vec<u32>>;

    ///
    /// Mean depth over `contig:start-end`.
    ///
    fn mean_depth(&mut self, contig: &str, start: u32, end: u32) -> Result<f64> {
        let depths = self.read_depths(contig, start, end)?;
        let total: u64 = depths.iter().map(|&d| d as u64).sum();
        Ok(total as f64 / depths.len() as f64)
    }
}

impl<T: DepthReader + ?Sized> DepthReader for Box<T> {
    fn read_depths(&mut self, contig: &str, start: u32, end: u32) -> Result<Vec<u32>> {
        (**self).read_depths(contig, start, end)
    }

    fn mean_depth(&mut self, contig: &str, start: u32, end: u32) -> Result<f64> {
        (**self).mean_depth(contig, start, end)
    }
}

///
/// Depth arrays held in memory, one per contig, starting at base 1.
///
/// Positions past the end of an array read as 0. Mostly useful for tests and for
/// depths computed elsewhere.
///
#[derive(Clone, Debug, Default)]
pub struct MemoryDepthReader {
    contigs: HashMap<String, Vec<u32>>,
    reads: usize,
}

impl MemoryDepthReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contig<C: Into<String>>(mut self, contig: C, depths: Vec<u32>) -> Self {
        self.contigs.insert(contig.into(), depths);
        self
    }

    /// Number of `read_depths` calls served so far.
    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl DepthReader for MemoryDepthReader {
    fn read_depths(&mut self, contig: &str, start: u32, end: u32) -> Result<Vec<u32>> {
        check_region(contig, start, end)?;
        let depths = self
            .contigs
            .get(contig)
            .ok_or_else(|| DepthError::UnknownContig(contig.to_string()))?;
        self.reads += 1;

        Ok((start..=end)
            .map(|pos| depths.get(pos as usize - 1).copied().unwrap_or(0))
            .collect())
    }

    fn mean_depth(&mut self, contig: &str, start: u32, end: u32) -> Result<f64> {
        check_region(contig, start, end)?;
        let depths = self
            .contigs
            .get(contig)
            .ok_or_else(|| DepthError::UnknownContig(contig.to_string()))?;
        self.reads += 1;

        let from = (start as usize - 1).min(depths.len());
        let to = (end as usize).min(depths.len());
        let total: u64 = depths[from..to].iter().map(|&d| d as u64).sum();
        Ok(total as f64 / (end - start + 1) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn reader() -> MemoryDepthReader {
        MemoryDepthReader::new().with_contig("chr1", vec![5, 5, 10, 10, 20])
    }

    #[rstest]
    fn test_memory_reader_slices(mut reader: MemoryDepthReader) {
        assert_eq!(reader.read_depths("chr1", 3, 5).unwrap(), vec![10, 10, 20]);
        assert_eq!(reader.read_depths("chr1", 4, 7).unwrap(), vec![10, 20, 0, 0]);
        assert_eq!(reader.reads(), 2);
    }

    #[rstest]
    fn test_default_mean_depth(mut reader: MemoryDepthReader) {
        assert_eq!(reader.mean_depth("chr1", 1, 5).unwrap(), 10.0);
    }

    #[rstest]
    fn test_unknown_contig(mut reader: MemoryDepthReader) {
        assert!(matches!(
            reader.read_depths("chr2", 1, 5),
            Err(DepthError::UnknownContig(c)) if c == "chr2"
        ));
    }

    #[rstest]
    #[case(0, 5)]
    #[case(5, 4)]
    fn test_invalid_region(mut reader: MemoryDepthReader, #[case] start: u32, #[case] end: u32) {
        assert!(matches!(
            reader.read_depths("chr1", start, end),
            Err(DepthError::InvalidRegion { .. })
        ));
    }

    #[rstest]
    fn test_boxed_reader_delegates(reader: MemoryDepthReader) {
        let mut boxed: Box<dyn DepthReader> = Box::new(reader);
        assert_eq!(boxed.read_depths("chr1", 1, 2).unwrap(), vec![5, 5]);
    }
}
