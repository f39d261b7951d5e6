use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgMatches;

use excov_core::models::Sample;
use excov_io::AnnotationReader;
use excov_store::{aggregate_sample, load_sample};

use crate::config::Config;

pub fn run_load(matches: &ArgMatches, config: &Config) -> Result<()> {
    let path = matches
        .get_one::<PathBuf>("annotations")
        .context("An annotated BED file is required.")?;
    let sample_id = matches
        .get_one::<String>("sample")
        .context("A sample id is required.")?;

    let annotations = AnnotationReader::from_path(path)
        .with_context(|| format!("Failed to read annotations from {}", path.display()))?;
    let sample = Sample {
        id: sample_id.clone(),
        group_id: matches.get_one::<String>("group").cloned(),
        source: matches.get_one::<String>("source").cloned(),
        // the first completeness column holds the cutoff
        cutoff: annotations.thresholds().first().copied(),
        extension: None,
        created_at: None,
    };

    let mut store = config.open_store()?;
    let rows = load_sample(&mut store, sample, annotations, matches.get_flag("force"))
        .with_context(|| format!("Failed to load sample {}", sample_id))?;
    tracing::info!("stored {} exon statistics for {}", rows, sample_id);

    if matches.get_flag("aggregate") {
        let summary = aggregate_sample(&mut store, sample_id)
            .with_context(|| format!("Failed to aggregate sample {}", sample_id))?;
        println!("{}", serde_json::to_string(&summary)?);
    }
    Ok(())
}
