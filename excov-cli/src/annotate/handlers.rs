use std::convert::Infallible;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ArgMatches;
use indicatif::{ProgressBar, ProgressStyle};

use excov_annotate::{AnnotatorOptions, annotate, par_annotate};
use excov_core::models::{Annotation, Interval, Sample};
use excov_core::utils::get_dynamic_writer;
use excov_depth::BamDepthReader;
use excov_io::{AnnotationWriter, read_intervals};
use excov_store::{aggregate_sample, load_sample};

use crate::config::Config;

fn progress_bar(len: usize) -> Result<ProgressBar> {
    let bar = ProgressBar::new(len as u64);
    bar.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} intervals",
        )?
        .progress_chars("##-"),
    );
    Ok(bar)
}

///
/// The sample id from the command line, the BAM read groups, or the BAM file name.
///
fn resolve_sample_id(matches: &ArgMatches, reader: &BamDepthReader, bam: &Path) -> String {
    if let Some(sample) = matches.get_one::<String>("sample") {
        return sample.clone();
    }
    if let Some(sample) = reader.sample_id() {
        return sample;
    }
    let fallback = bam
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| bam.display().to_string());
    tracing::warn!(
        "no single SM tag in the read groups of {}, using '{}' as sample id",
        bam.display(),
        fallback
    );
    fallback
}

///
/// Annotate on a dedicated rayon pool, one BAM handle per worker.
///
fn annotate_parallel(
    bam: &Path,
    intervals: Vec<Interval>,
    options: &AnnotatorOptions,
    threads: usize,
) -> Result<Vec<Annotation>> {
    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
    let annotations = pool
        .install(|| par_annotate(intervals, options, || BamDepthReader::open(bam)))
        .context("Failed to annotate intervals")?;
    Ok(annotations)
}

pub fn run_annotate(matches: &ArgMatches, config: &Config) -> Result<()> {
    let bam = matches
        .get_one::<PathBuf>("bam")
        .context("A path to a BAM file is required.")?;
    let intervals_path = matches
        .get_one::<PathBuf>("intervals")
        .context("An interval definition file is required.")?;
    let prefix = config.contig_prefix(matches.get_one::<String>("prefix"));
    let options = config.annotator_options(
        matches.get_one::<u32>("cutoff").copied(),
        matches.get_one::<u32>("extension").copied(),
        matches.get_one::<u32>("bp-threshold").copied(),
        matches
            .get_many::<u32>("thresholds")
            .map(|thresholds| thresholds.copied().collect()),
    );
    let threads = matches.get_one::<usize>("threads").copied().unwrap_or(1);

    let intervals = read_intervals(intervals_path, &prefix).with_context(|| {
        format!("Failed to read intervals from {}", intervals_path.display())
    })?;
    let mut reader = BamDepthReader::open(bam)
        .with_context(|| format!("Failed to open {}", bam.display()))?;
    let sample_id = resolve_sample_id(matches, &reader, bam);
    tracing::info!(
        "annotating {} intervals of sample {} (cutoff {}, extension {})",
        intervals.len(),
        sample_id,
        options.cutoff,
        options.extension
    );

    let bar = progress_bar(intervals.len())?;

    if matches.get_flag("load") {
        let sample = Sample {
            id: sample_id.clone(),
            group_id: matches.get_one::<String>("group").cloned(),
            source: Some(bam.display().to_string()),
            cutoff: Some(options.cutoff),
            extension: Some(options.extension),
            created_at: None,
        };
        let force = matches.get_flag("force");
        let mut store = config.open_store()?;

        let rows = if threads > 1 {
            let annotations = annotate_parallel(bam, intervals, &options, threads)?;
            bar.inc(annotations.len() as u64);
            load_sample(
                &mut store,
                sample,
                annotations.into_iter().map(Ok::<_, Infallible>),
                force,
            )
        } else {
            let annotations =
                annotate(intervals, &mut reader, &options).inspect(|_| bar.inc(1));
            load_sample(&mut store, sample, annotations, force)
        }
        .with_context(|| format!("Failed to load sample {}", sample_id))?;
        bar.finish_and_clear();

        tracing::info!("stored {} exon statistics", rows);
        let summary = aggregate_sample(&mut store, &sample_id)
            .with_context(|| format!("Failed to aggregate sample {}", sample_id))?;
        println!("{}", serde_json::to_string(&summary)?);
        return Ok(());
    }

    let output = get_dynamic_writer(matches.get_one::<PathBuf>("output").map(PathBuf::as_path))?;
    let mut writer = AnnotationWriter::new(output, &options.levels());

    if threads > 1 {
        for annotation in annotate_parallel(bam, intervals, &options, threads)? {
            writer.write(&annotation)?;
            bar.inc(1);
        }
    } else {
        for annotation in annotate(intervals, &mut reader, &options) {
            let annotation = annotation.context("Failed to annotate intervals")?;
            writer.write(&annotation)?;
            bar.inc(1);
        }
    }

    writer.finish()?;
    bar.finish_and_clear();
    Ok(())
}
