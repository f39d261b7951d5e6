use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgMatches;

use excov_core::utils::{get_dynamic_writer, get_input_reader};
use excov_io::{BedWrite, convert_ccds};

pub fn run_convert(matches: &ArgMatches) -> Result<()> {
    let path = matches
        .get_one::<PathBuf>("ccds")
        .context("A CCDS file is required.")?;

    let reader = get_input_reader(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let intervals = convert_ccds(reader)
        .with_context(|| format!("Failed to convert {}", path.display()))?;

    let mut writer =
        get_dynamic_writer(matches.get_one::<PathBuf>("output").map(PathBuf::as_path))?;
    intervals.write_bed_to(&mut writer)?;
    writer.flush()?;
    Ok(())
}
