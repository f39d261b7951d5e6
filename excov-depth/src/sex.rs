use std::fmt::{self, Display};

use crate::DepthReader;
use crate::error::{DepthError, Result};

/// Region of chromosome X sampled for sex prediction (1-based, closed).
pub const X_REGION: (&str, u32, u32) = ("X", 1, 59373566);
/// Region of chromosome Y sampled for sex prediction, outside the pseudoautosomal region.
pub const Y_REGION: (&str, u32, u32) = ("Y", 69362, 11375310);

/// Above this X/Y coverage ratio the few reads on Y are treated as mapping artifacts.
pub const MALE_RATIO_LIMIT: f64 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
    Unknown,
}

impl Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Sex::Male => "male",
            Sex::Female => "female",
            Sex::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SexPrediction {
    pub x_coverage: f64,
    pub y_coverage: f64,
    pub sex: Sex,
}

///
/// Predict sex from the mean coverage on X and Y.
///
/// Without coverage on X there is nothing to compare against, so the answer is unknown.
///
pub fn predict_sex(x_coverage: f64, y_coverage: f64) -> Sex {
    if x_coverage == 0.0 {
        Sex::Unknown
    } else if y_coverage > 0.0 && x_coverage / y_coverage < MALE_RATIO_LIMIT {
        Sex::Male
    } else {
        Sex::Female
    }
}

///
/// Measure X and Y coverage with a depth reader and predict the sex.
///
/// # Arguments
/// - reader: depth source, usually a [`crate::BamDepthReader`]
/// - contig_prefix: prepended to `X` and `Y` (e.g. `chr`)
///
/// A contig missing from the alignment counts as zero coverage.
///
pub fn sex_from_reader<R: DepthReader + ?Sized>(
    reader: &mut R,
    contig_prefix: &str,
) -> Result<SexPrediction> {
    let mut coverage = |(contig, start, end): (&str, u32, u32)| {
        let contig = format!("{}{}", contig_prefix, contig);
        match reader.mean_depth(&contig, start, end) {
            Err(DepthError::UnknownContig(_)) => {
                log::warn!("no reads found on {}, using coverage 0", contig);
                Ok(0.0)
            }
            other => other,
        }
    };
    let x_coverage = coverage(X_REGION)?;
    let y_coverage = coverage(Y_REGION)?;
    let sex = predict_sex(x_coverage, y_coverage);
    log::info!(
        "X coverage {:.3}, Y coverage {:.3}: {}",
        x_coverage,
        y_coverage,
        sex
    );

    Ok(SexPrediction {
        x_coverage,
        y_coverage,
        sex,
    })
}
