use excov_annotate::{AnnotatorOptions, annotate, par_annotate};
use excov_core::models::{Interval, Level, MetricName, Sample, Statistic, Strand};
use excov_depth::MemoryDepthReader;
use excov_io::annotated::{AnnotationReader, AnnotationWriter};
use excov_store::{SqliteStore, Store, StoreError, aggregate_sample, link, load_sample};
use pretty_assertions::assert_eq;
use rstest::*;

fn exon(name: &str, start: u32, end: u32, transcripts: &[&str]) -> Interval {
    Interval::new("1", start, end, name)
        .unwrap()
        .with_strand(Strand::Forward)
        .with_parents(
            transcripts.iter().map(|t| t.to_string()).collect(),
            vec!["GENE1".to_string()],
        )
}

/// E1 (10 bases at depth 5) and E2 (20 bases at depth 8) in TX1, E2 alone in TX2.
#[fixture]
fn intervals() -> Vec<Interval> {
    vec![
        exon("E1", 1, 10, &["TX1"]),
        exon("E2", 21, 40, &["TX1", "TX2"]),
    ]
}

#[fixture]
fn reader() -> MemoryDepthReader {
    let mut depths = vec![5; 10];
    depths.extend([0; 10]);
    depths.extend([8; 20]);
    MemoryDepthReader::new().with_contig("1", depths)
}

fn value(stats: &[Statistic], entity_id: &str, metric: MetricName) -> Option<f64> {
    stats
        .iter()
        .find(|s| s.entity_id == entity_id && s.metric == metric)
        .map(|s| s.value)
}

#[rstest]
fn test_annotate_load_aggregate(intervals: Vec<Interval>, mut reader: MemoryDepthReader) {
    let mut store = SqliteStore::open_in_memory().unwrap();
    link(&mut store, intervals.clone()).unwrap();

    let options = AnnotatorOptions::default().with_cutoff(8);
    let annotations = annotate(intervals, &mut reader, &options);
    let rows = load_sample(&mut store, Sample::new("s1"), annotations, false).unwrap();
    assert_eq!(rows, 4);

    let summary = aggregate_sample(&mut store, "s1").unwrap();
    assert_eq!((summary.transcripts, summary.genes), (4, 2));

    let transcripts = store.statistics(Level::Transcript, "s1").unwrap();
    assert_eq!(value(&transcripts, "TX1", MetricName::MeanCoverage), Some(7.0));
    assert_eq!(value(&transcripts, "TX2", MetricName::MeanCoverage), Some(8.0));
    assert_eq!(
        value(&transcripts, "TX1", MetricName::Completeness(8)),
        Some(20.0 / 30.0)
    );

    let means = store.mean_metrics(&[]).unwrap();
    let mean_coverage = means
        .iter()
        .find(|m| m.metric == "mean_coverage")
        .map(|m| m.value);
    assert_eq!(mean_coverage, Some(7.5));

    let genes = store.gene_metrics(&["GENE1".to_string()], &[]).unwrap();
    assert_eq!(genes.len(), 2);
}

#[rstest]
fn test_parallel_and_sequential_load_the_same(intervals: Vec<Interval>, reader: MemoryDepthReader) {
    let options = AnnotatorOptions::default().with_thresholds(vec![5, 20]);

    let mut sequential = SqliteStore::open_in_memory().unwrap();
    link(&mut sequential, intervals.clone()).unwrap();
    let mut direct = reader.clone();
    load_sample(
        &mut sequential,
        Sample::new("s1"),
        annotate(intervals.clone(), &mut direct, &options),
        false,
    )
    .unwrap();

    let mut parallel = SqliteStore::open_in_memory().unwrap();
    link(&mut parallel, intervals.clone()).unwrap();
    let annotations = par_annotate(intervals, &options, || Ok(reader.clone())).unwrap();
    load_sample(
        &mut parallel,
        Sample::new("s1"),
        annotations.into_iter().map(Ok::<_, std::convert::Infallible>),
        false,
    )
    .unwrap();

    assert_eq!(
        sequential.statistics(Level::Exon, "s1").unwrap(),
        parallel.statistics(Level::Exon, "s1").unwrap()
    );
}

#[rstest]
fn test_load_from_annotated_bed(intervals: Vec<Interval>, mut reader: MemoryDepthReader) {
    let options = AnnotatorOptions::default();
    let mut writer = AnnotationWriter::new(Vec::new(), &options.levels());
    for annotation in annotate(intervals.clone(), &mut reader, &options) {
        writer.write(&annotation.unwrap()).unwrap();
    }
    let bed = writer.finish().unwrap();

    let mut store = SqliteStore::open_in_memory().unwrap();
    link(&mut store, intervals).unwrap();
    let annotations = AnnotationReader::new(bed.as_slice()).unwrap();
    load_sample(&mut store, Sample::new("s1"), annotations, false).unwrap();
    aggregate_sample(&mut store, "s1").unwrap();

    let genes = store.statistics(Level::Gene, "s1").unwrap();
    assert!(value(&genes, "GENE1", MetricName::MeanCoverage).is_some());
}

#[rstest]
fn test_failed_annotation_commits_nothing(intervals: Vec<Interval>) {
    let mut store = SqliteStore::open_in_memory().unwrap();
    link(&mut store, intervals.clone()).unwrap();

    // no depths for contig 1
    let mut reader = MemoryDepthReader::new().with_contig("2", vec![1; 10]);
    let annotations = annotate(intervals, &mut reader, &AnnotatorOptions::default());
    let result = load_sample(&mut store, Sample::new("s1"), annotations, false);

    assert!(matches!(result, Err(StoreError::Annotation(_))));
    assert!(store.sample("s1").unwrap().is_none());
}
