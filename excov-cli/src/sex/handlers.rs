use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgMatches;

use excov_depth::{BamDepthReader, sex_from_reader};

use crate::config::Config;

pub fn run_sex(matches: &ArgMatches, config: &Config) -> Result<()> {
    let bam = matches
        .get_one::<PathBuf>("bam")
        .context("A path to a BAM file is required.")?;
    let prefix = config.contig_prefix(matches.get_one::<String>("prefix"));

    let mut reader = BamDepthReader::open(bam)
        .with_context(|| format!("Failed to open {}", bam.display()))?;
    let prediction = sex_from_reader(&mut reader, &prefix)
        .with_context(|| format!("Failed to measure X/Y coverage of {}", bam.display()))?;

    // tab separated, for piping
    println!("#{0}X_coverage\t{0}Y_coverage\tsex", prefix);
    println!(
        "{}\t{}\t{}",
        prediction.x_coverage, prediction.y_coverage, prediction.sex
    );
    Ok(())
}
