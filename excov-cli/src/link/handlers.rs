use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgMatches;

use excov_io::read_intervals;
use excov_store::link;

use crate::config::Config;

pub fn run_link(matches: &ArgMatches, config: &Config) -> Result<()> {
    let path = matches
        .get_one::<PathBuf>("intervals")
        .context("An interval definition file is required.")?;
    let prefix = config.contig_prefix(matches.get_one::<String>("prefix"));

    let intervals = read_intervals(path, &prefix)
        .with_context(|| format!("Failed to read intervals from {}", path.display()))?;

    let mut store = config.open_store()?;
    let summary = link(&mut store, intervals).context("Failed to link intervals")?;

    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}
