use std::fmt::{self, Display};
use std::str::FromStr;

use crate::errors::IntervalError;

const MEAN_COVERAGE: &str = "mean_coverage";
const COMPLETENESS_PREFIX: &str = "completeness_";

///
/// Name of a stored metric: mean coverage, or completeness at a read-depth threshold.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricName {
    MeanCoverage,
    Completeness(u32),
}

impl MetricName {
    /// All metric names produced for a set of completeness thresholds.
    pub fn for_thresholds(thresholds: &[u32]) -> Vec<MetricName> {
        std::iter::once(MetricName::MeanCoverage)
            .chain(thresholds.iter().map(|t| MetricName::Completeness(*t)))
            .collect()
    }
}

impl Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricName::MeanCoverage => write!(f, "{}", MEAN_COVERAGE),
            MetricName::Completeness(threshold) => {
                write!(f, "{}{}", COMPLETENESS_PREFIX, threshold)
            }
        }
    }
}

impl FromStr for MetricName {
    type Err = IntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == MEAN_COVERAGE {
            return Ok(MetricName::MeanCoverage);
        }
        s.strip_prefix(COMPLETENESS_PREFIX)
            .and_then(|t| t.parse::<u32>().ok())
            .map(MetricName::Completeness)
            .ok_or_else(|| IntervalError::InvalidMetric(s.to_string()))
    }
}
