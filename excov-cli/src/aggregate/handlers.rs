use anyhow::{Context, Result};
use clap::ArgMatches;

use excov_store::Aggregator;

use crate::config::Config;

pub fn run_aggregate(matches: &ArgMatches, config: &Config) -> Result<()> {
    let samples: Vec<&String> = matches
        .get_many::<String>("samples")
        .context("At least one sample id is required.")?
        .collect();

    let mut store = config.open_store()?;
    let aggregator = Aggregator::from_store(&store).context("Failed to read the hierarchy")?;

    for sample_id in samples {
        let summary = aggregator
            .aggregate_sample(&mut store, sample_id)
            .with_context(|| format!("Failed to aggregate sample {}", sample_id))?;
        println!("{}", serde_json::to_string(&summary)?);
    }
    Ok(())
}
