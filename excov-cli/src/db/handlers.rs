use anyhow::{Result, bail};
use clap::ArgMatches;

use excov_store::Store;

use crate::config::Config;

pub fn run_setup(matches: &ArgMatches, config: &Config) -> Result<()> {
    // opening creates any missing table
    let mut store = config.open_store()?;
    if matches.get_flag("reset") {
        tracing::info!("tearing down {}", config.database_path().display());
        store.reset()?;
    }
    tracing::info!("database ready at {}", config.database_path().display());
    Ok(())
}

pub fn run_remove(matches: &ArgMatches, config: &Config) -> Result<()> {
    let mut store = config.open_store()?;

    if let Some(group) = matches.get_one::<String>("group") {
        let deleted = store.delete_group(group)?;
        if deleted == 0 {
            tracing::warn!("no samples in group {}", group);
        }
        return Ok(());
    }

    if let Some(sample_id) = matches.get_one::<String>("sample") {
        if !store.delete_sample(sample_id)? {
            bail!("sample {} not found in database", sample_id);
        }
        return Ok(());
    }

    unreachable!("db remove needs a sample or a group")
}
