use std::fmt::{self, Display};
use std::str::FromStr;

use crate::errors::IntervalError;
use crate::models::interval::{Span, Strand};
use crate::models::metric::MetricName;

/// Collection of transcripts; spans all of its exons.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gene {
    pub id: String,
    pub chromosome: String,
    pub start: u32,
    pub end: u32,
}

/// Set of exons belonging to exactly one gene.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transcript {
    pub id: String,
    pub chromosome: String,
    pub gene_id: String,
    pub start: u32,
    pub end: u32,
}

/// A continuous interval, shared between any number of transcripts.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Exon {
    pub id: String,
    pub chromosome: String,
    pub start: u32,
    pub end: u32,
    pub strand: Strand,
}

macro_rules! impl_span {
    ($($element:ty),*) => {
        $(
            impl Span for $element {
                #[inline]
                fn start(&self) -> u32 {
                    self.start
                }

                #[inline]
                fn end(&self) -> u32 {
                    self.end
                }
            }
        )*
    };
}

impl_span!(Gene, Transcript, Exon);

///
/// Metadata for one coverage run.
///
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sample {
    pub id: String,
    pub group_id: Option<String>,
    /// path of the alignment file the metrics came from
    pub source: Option<String>,
    pub cutoff: Option<u32>,
    pub extension: Option<u32>,
    /// set by the store on insert
    pub created_at: Option<String>,
}

impl Sample {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Sample {
            id: id.into(),
            ..Default::default()
        }
    }
}

///
/// Which tier of the exon -> transcript -> gene hierarchy a statistic belongs to.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Level {
    Exon,
    Transcript,
    Gene,
}

impl Level {
    /// The level whose rows are aggregated into this one.
    pub fn child(&self) -> Option<Level> {
        match self {
            Level::Exon => None,
            Level::Transcript => Some(Level::Exon),
            Level::Gene => Some(Level::Transcript),
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Exon => "exon",
            Level::Transcript => "transcript",
            Level::Gene => "gene",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Level {
    type Err = IntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exon" => Ok(Level::Exon),
            "transcript" => Ok(Level::Transcript),
            "gene" => Ok(Level::Gene),
            other => Err(IntervalError::InvalidLevel(other.to_string())),
        }
    }
}

///
/// One metric value for one element and one sample.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Statistic {
    pub metric: MetricName,
    pub value: f64,
    pub sample_id: String,
    /// exon, transcript or gene id, depending on the level it is stored at
    pub entity_id: String,
}

impl Statistic {
    pub fn new<S: Into<String>, E: Into<String>>(
        metric: MetricName,
        value: f64,
        sample_id: S,
        entity_id: E,
    ) -> Self {
        Statistic {
            metric,
            value,
            sample_id: sample_id.into(),
            entity_id: entity_id.into(),
        }
    }
}
