/// Arithmetic mean of the depths.
pub fn mean_coverage(depths: &[u32]) -> f64 {
    let total: u64 = depths.iter().map(|&d| d as u64).sum();
    total as f64 / depths.len() as f64
}

/// Fraction of bases with depth at or above `threshold`.
pub fn completeness(depths: &[u32], threshold: u32) -> f64 {
    let passing = depths.iter().filter(|&&d| d >= threshold).count();
    passing as f64 / depths.len() as f64
}

///
/// Mean coverage and completeness at `threshold` for the depths of one interval.
///
/// # Panics
/// An interval always covers at least one base, so empty `depths` is a bug in the caller.
///
pub fn calculate_metrics(depths: &[u32], threshold: u32) -> (f64, f64) {
    assert!(
        !depths.is_empty(),
        "cannot compute metrics over an empty depth array"
    );
    (mean_coverage(depths), completeness(depths, threshold))
}

///
/// Completeness at every threshold, in the order given.
///
/// # Panics
/// On empty `depths`, like [`calculate_metrics`].
///
pub fn completeness_levels(depths: &[u32], thresholds: &[u32]) -> Vec<(u32, f64)> {
    assert!(
        !depths.is_empty(),
        "cannot compute metrics over an empty depth array"
    );
    thresholds
        .iter()
        .map(|&t| (t, completeness(depths, t)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(&[2, 4, 5, 5, 5], 5, 4.2, 0.6)]
    #[case(&[7; 11], 5, 7.0, 1.0)]
    #[case(&[6], 6, 6.0, 1.0)]
    #[case(&[6], 7, 6.0, 0.0)]
    #[case(&[0, 0, 0, 0], 0, 0.0, 1.0)]
    fn test_calculate_metrics(
        #[case] depths: &[u32],
        #[case] threshold: u32,
        #[case] coverage: f64,
        #[case] expected_completeness: f64,
    ) {
        assert_eq!(
            calculate_metrics(depths, threshold),
            (coverage, expected_completeness)
        );
    }

    #[rstest]
    fn test_completeness_is_inclusive() {
        assert_eq!(completeness(&[9, 10, 11], 10), 2.0 / 3.0);
    }

    #[rstest]
    fn test_completeness_bounds() {
        let depths = [0, 3, 8, 12, 30, 1, 0, 19];
        for threshold in 0..40 {
            let (coverage, value) = calculate_metrics(&depths, threshold);
            assert!(coverage >= 0.0);
            assert!((0.0..=1.0).contains(&value));
            let all_pass = depths.iter().all(|&d| d >= threshold);
            assert_eq!(value == 1.0, all_pass);
        }
    }

    #[rstest]
    fn test_levels_follow_threshold_order() {
        assert_eq!(
            completeness_levels(&[10, 20, 30, 40], &[25, 10, 50]),
            vec![(25, 0.5), (10, 1.0), (50, 0.0)]
        );
    }

    #[rstest]
    #[should_panic(expected = "empty depth array")]
    fn test_empty_depths_panics() {
        calculate_metrics(&[], 10);
    }
}
