use excov_core::models::{Annotation, Level, Sample};

use crate::error::{Result, StoreError};
use crate::store::Store;

///
/// Store a sample and the exon statistics of its annotations.
///
/// Loading is all or nothing. If any annotation is an error, or the write fails, no row
/// of the sample is stored.
///
/// # Arguments
/// - store: destination
/// - sample: the run metadata, `sample.id` becomes the `sample_id` of every row
/// - annotations: annotator output, in any order
/// - force: replace an existing sample with the same id, in the same transaction that
///   writes the new rows
///
/// # Errors
/// [`StoreError::Integrity`] if the sample already exists and `force` is not set.
///
pub fn load_sample<S, I, E>(store: &mut S, sample: Sample, annotations: I, force: bool) -> Result<usize>
where
    S: Store + ?Sized,
    I: IntoIterator<Item = std::result::Result<Annotation, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    let exists = store.sample(&sample.id)?.is_some();
    if exists && !force {
        return Err(StoreError::Integrity(format!(
            "sample {} is already loaded",
            sample.id
        )));
    }

    let mut rows = 0;
    let mut statistics = Vec::new();
    for annotation in annotations {
        match annotation {
            Ok(annotation) => {
                let stats = annotation.statistics(&sample.id);
                rows += stats.len();
                statistics.extend(stats);
            }
            Err(err) => {
                store.discard();
                return Err(StoreError::Annotation(Box::new(err)));
            }
        }
    }

    let sample_id = sample.id.clone();
    if exists {
        log::warn!("replacing existing sample {}", sample_id);
        store.replace_sample(sample);
    } else {
        store.add_sample(sample);
    }
    store.add(Level::Exon, statistics);
    store.save()?;
    log::info!("loaded {} exon statistics for sample {}", rows, sample_id);
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::convert::Infallible;

    use excov_core::models::{Interval, MetricName, Strand};
    use pretty_assertions::assert_eq;
    use rstest::*;

    use crate::link::link;
    use crate::store::SqliteStore;

    fn annotation(start: u32, end: u32, coverage: f64) -> Annotation {
        Annotation {
            interval: Interval::new("1", start, end, format!("1-{}-{}", start, end))
                .unwrap()
                .with_strand(Strand::Forward)
                .with_parents(vec!["TX1".into()], vec!["GENE1".into()]),
            coverage,
            completeness: 1.0,
            levels: vec![(10, 1.0), (20, 0.5)],
        }
    }

    #[fixture]
    fn store() -> SqliteStore {
        let mut store = SqliteStore::open_in_memory().unwrap();
        link(
            &mut store,
            vec![annotation(1, 10, 0.0).interval, annotation(21, 40, 0.0).interval],
        )
        .unwrap();
        store
    }

    fn ok(annotations: Vec<Annotation>) -> Vec<std::result::Result<Annotation, Infallible>> {
        annotations.into_iter().map(Ok).collect()
    }

    #[rstest]
    fn test_load_writes_sample_and_rows(mut store: SqliteStore) {
        let rows = load_sample(
            &mut store,
            Sample::new("s1"),
            ok(vec![annotation(1, 10, 5.0), annotation(21, 40, 8.0)]),
            false,
        )
        .unwrap();

        assert_eq!(rows, 6);
        let stats = store.statistics(Level::Exon, "s1").unwrap();
        assert_eq!(stats.len(), 6);
        assert!(stats.iter().any(|s| s.entity_id == "1-21-40"
            && s.metric == MetricName::MeanCoverage
            && s.value == 8.0));
    }

    #[rstest]
    fn test_existing_sample_needs_force(mut store: SqliteStore) {
        load_sample(&mut store, Sample::new("s1"), ok(vec![annotation(1, 10, 5.0)]), false)
            .unwrap();

        let again = load_sample(&mut store, Sample::new("s1"), ok(vec![annotation(1, 10, 6.0)]), false);
        assert!(matches!(again, Err(StoreError::Integrity(_))));

        load_sample(&mut store, Sample::new("s1"), ok(vec![annotation(1, 10, 6.0)]), true).unwrap();
        let stats = store.statistics(Level::Exon, "s1").unwrap();
        assert_eq!(stats.len(), 3);
        assert!(stats.iter().any(|s| s.value == 6.0));
    }

    #[rstest]
    fn test_failed_forced_reload_keeps_old_sample(mut store: SqliteStore) {
        load_sample(&mut store, Sample::new("s1"), ok(vec![annotation(1, 10, 5.0)]), false)
            .unwrap();

        let annotations = vec![
            Ok(annotation(1, 10, 6.0)),
            Err(std::io::Error::other("alignment went away")),
        ];
        let result = load_sample(&mut store, Sample::new("s1"), annotations, true);

        assert!(matches!(result, Err(StoreError::Annotation(_))));
        assert!(store.sample("s1").unwrap().is_some());
        let stats = store.statistics(Level::Exon, "s1").unwrap();
        assert_eq!(stats.len(), 3);
        assert!(stats.iter().all(|s| s.value != 6.0));
    }

    #[rstest]
    fn test_forced_reload_rejected_by_store_keeps_old_sample(mut store: SqliteStore) {
        load_sample(&mut store, Sample::new("s1"), ok(vec![annotation(1, 10, 5.0)]), false)
            .unwrap();

        // exon 1-50-60 was never linked
        let result = load_sample(
            &mut store,
            Sample::new("s1"),
            ok(vec![annotation(1, 10, 6.0), annotation(50, 60, 6.0)]),
            true,
        );

        assert!(matches!(result, Err(StoreError::Integrity(_))));
        let stats = store.statistics(Level::Exon, "s1").unwrap();
        assert_eq!(stats.len(), 3);
        assert!(stats.iter().any(|s| s.value == 5.0));
    }

    #[rstest]
    fn test_failed_annotation_leaves_nothing(mut store: SqliteStore) {
        let annotations = vec![
            Ok(annotation(1, 10, 5.0)),
            Err(std::io::Error::other("alignment went away")),
        ];
        let result = load_sample(&mut store, Sample::new("s1"), annotations, false);

        assert!(matches!(result, Err(StoreError::Annotation(_))));
        assert!(store.sample("s1").unwrap().is_none());
        assert!(store.statistics(Level::Exon, "s1").unwrap().is_empty());
    }
}
