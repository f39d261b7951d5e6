use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::errors::{IntervalError, Result};

///
/// Anything with a 1-based, closed `[start, end]` footprint on a contig.
///
pub trait Span {
    fn start(&self) -> u32;
    fn end(&self) -> u32;

    /// Number of bases covered, both ends included.
    #[inline]
    fn length(&self) -> u64 {
        (self.end() as u64) - (self.start() as u64) + 1
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strand {
    #[cfg_attr(feature = "serde", serde(rename = "+"))]
    Forward,
    #[cfg_attr(feature = "serde", serde(rename = "-"))]
    Reverse,
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "."))]
    Unknown,
}

impl FromStr for Strand {
    type Err = IntervalError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            "" | "." => Ok(Strand::Unknown),
            other => Err(IntervalError::InvalidStrand(other.to_string())),
        }
    }
}

impl Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Strand::Forward => "+",
            Strand::Reverse => "-",
            Strand::Unknown => ".",
        };
        write!(f, "{}", symbol)
    }
}

///
/// A genomic interval (usually an exon) in 1-based, closed coordinates.
///
/// Conversion from BED-style 0-based half-open input happens at the parsing boundary;
/// everything downstream assumes `1 <= start <= end`.
///
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval {
    pub contig: String,
    pub start: u32,
    pub end: u32,
    pub name: String,
    pub score: Option<String>,
    pub strand: Strand,

    /// parent transcripts
    pub transcript_ids: Vec<String>,
    /// parent genes, paired with `transcript_ids` by position (or a single id for all)
    pub gene_ids: Vec<String>,
}

impl Interval {
    ///
    /// Create a new interval without any parent elements.
    ///
    /// # Errors
    /// Fails if `start` is 0 or `end < start`.
    ///
    pub fn new<C: Into<String>, N: Into<String>>(
        contig: C,
        start: u32,
        end: u32,
        name: N,
    ) -> Result<Self> {
        if start < 1 {
            return Err(IntervalError::StartBelowOne(start));
        }
        if end < start {
            return Err(IntervalError::EndBeforeStart { start, end });
        }
        Ok(Interval {
            contig: contig.into(),
            start,
            end,
            name: name.into(),
            score: None,
            strand: Strand::Unknown,
            transcript_ids: Vec::new(),
            gene_ids: Vec::new(),
        })
    }

    pub fn with_strand(mut self, strand: Strand) -> Self {
        self.strand = strand;
        self
    }

    pub fn with_score(mut self, score: Option<String>) -> Self {
        self.score = score;
        self
    }

    pub fn with_parents(mut self, transcript_ids: Vec<String>, gene_ids: Vec<String>) -> Self {
        self.transcript_ids = transcript_ids;
        self.gene_ids = gene_ids;
        self
    }

    ///
    /// Return a copy widened by `extension` bases on both sides.
    ///
    /// The start is clamped at base 1. The end is left as is, positions past the contig
    /// end simply carry no reads.
    ///
    pub fn extended(&self, extension: u32) -> Interval {
        Interval {
            start: self.start.saturating_sub(extension).max(1),
            end: self.end.saturating_add(extension),
            ..self.clone()
        }
    }

    /// Order by contig name, then start, then end.
    pub fn cmp_position(&self, other: &Interval) -> Ordering {
        self.contig
            .cmp(&other.contig)
            .then(self.start.cmp(&other.start))
            .then(self.end.cmp(&other.end))
    }

    ///
    /// Pair every parent transcript with its gene.
    ///
    /// Gene ids pair positionally with transcript ids; a single gene id is shared by all
    /// transcripts. Returns `None` if the two lists cannot be paired.
    ///
    pub fn parent_pairs(&self) -> Option<Vec<(&str, &str)>> {
        match (self.transcript_ids.len(), self.gene_ids.len()) {
            (_, 1) => Some(
                self.transcript_ids
                    .iter()
                    .map(|tx| (tx.as_str(), self.gene_ids[0].as_str()))
                    .collect(),
            ),
            (n, m) if n == m => Some(
                self.transcript_ids
                    .iter()
                    .zip(self.gene_ids.iter())
                    .map(|(tx, gene)| (tx.as_str(), gene.as_str()))
                    .collect(),
            ),
            _ => None,
        }
    }
}

impl Span for Interval {
    #[inline]
    fn start(&self) -> u32 {
        self.start
    }

    #[inline]
    fn end(&self) -> u32 {
        self.end
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{} ({})", self.contig, self.start, self.end, self.name)
    }
}
