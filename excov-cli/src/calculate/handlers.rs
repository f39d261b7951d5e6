use anyhow::Result;
use clap::ArgMatches;
use serde::Serialize;

use crate::calculate::cli::{CALCULATE_GENE, CALCULATE_MEAN, CALCULATE_SAMPLES};
use crate::config::Config;

fn dump_json<T: Serialize>(data: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(data)?
    } else {
        serde_json::to_string(data)?
    };
    Ok(json)
}

fn strings(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

pub fn run_calculate(matches: &ArgMatches, config: &Config) -> Result<()> {
    let store = config.open_store()?;

    match matches.subcommand() {
        Some((CALCULATE_MEAN, m)) => {
            // one JSON object per line
            for row in store.mean_metrics(&strings(m, "sample"))? {
                println!("{}", dump_json(&row, m.get_flag("pretty"))?);
            }
        }
        Some((CALCULATE_GENE, m)) => {
            let rows = store.gene_metrics(&strings(m, "genes"), &strings(m, "sample"))?;
            println!("{}", dump_json(&rows, m.get_flag("pretty"))?);
        }
        Some((CALCULATE_SAMPLES, m)) => {
            let samples = store.samples(m.get_one::<String>("group").map(String::as_str))?;
            println!("{}", dump_json(&samples, m.get_flag("pretty"))?);
        }
        _ => unreachable!("calculate subcommand not found"),
    }
    Ok(())
}
