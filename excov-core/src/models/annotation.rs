use crate::models::elements::Statistic;
use crate::models::interval::Interval;
use crate::models::metric::MetricName;

///
/// Coverage metrics computed for a single interval.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    pub interval: Interval,
    /// mean read depth
    pub coverage: f64,
    /// fraction of bases at or above the run's cutoff
    pub completeness: f64,
    /// completeness at every requested threshold, the cutoff first
    pub levels: Vec<(u32, f64)>,
}

impl Annotation {
    ///
    /// Exon-level statistic rows for this annotation: `mean_coverage` plus one
    /// `completeness_<t>` per threshold level.
    ///
    pub fn statistics(&self, sample_id: &str) -> Vec<Statistic> {
        let mut stats = Vec::with_capacity(self.levels.len() + 1);
        stats.push(Statistic::new(
            MetricName::MeanCoverage,
            self.coverage,
            sample_id,
            self.interval.name.as_str(),
        ));
        for (threshold, value) in &self.levels {
            stats.push(Statistic::new(
                MetricName::Completeness(*threshold),
                *value,
                sample_id,
                self.interval.name.as_str(),
            ));
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_statistics_rows() {
        let annotation = Annotation {
            interval: Interval::new("chr1", 1, 5, "exon-1").unwrap(),
            coverage: 4.2,
            completeness: 0.8,
            levels: vec![(5, 0.8), (10, 0.0)],
        };
        let stats = annotation.statistics("sample-a");

        assert_eq!(stats.len(), 3);
        assert_eq!(stats[0].metric, MetricName::MeanCoverage);
        assert_eq!(stats[0].value, 4.2);
        assert_eq!(stats[1].metric, MetricName::Completeness(5));
        assert_eq!(stats[2].entity_id, "exon-1");
        assert!(stats.iter().all(|s| s.sample_id == "sample-a"));
    }
}
