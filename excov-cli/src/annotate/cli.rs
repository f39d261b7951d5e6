use std::path::PathBuf;

use clap::{Arg, ArgAction, Command, arg, value_parser};

pub const ANNOTATE_CMD: &str = "annotate";

pub fn create_annotate_cli() -> Command {
    Command::new(ANNOTATE_CMD)
        .about("Annotate intervals with coverage and completeness from a BAM file.")
        .arg(
            Arg::new("bam")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Indexed BAM file"),
        )
        .arg(
            Arg::new("intervals")
                .default_value("-")
                .value_parser(value_parser!(PathBuf))
                .help("Interval definition BED file (default: stdin)"),
        )
        .arg(arg!(-s --sample <SAMPLE> "Sample id (default: read group SM, else the file name)"))
        .arg(arg!(-g --group <GROUP> "Group id, e.g. to relate the samples of a trio"))
        .arg(
            arg!(-c --cutoff <CUTOFF> "Depth a base needs to count as complete")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            arg!(-e --extension <BASES> "Extend every interval by this many bases on both sides")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            arg!(-t --"bp-threshold" <BASES> "Widest span read in one batch")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("thresholds")
                .long("thresholds")
                .value_delimiter(',')
                .value_parser(value_parser!(u32))
                .help("Extra completeness thresholds, comma separated"),
        )
        .arg(arg!(-p --prefix <PREFIX> "Prefix added to every contig name"))
        .arg(
            arg!(-j --threads <THREADS> "Worker threads (1 reads sequentially)")
                .value_parser(value_parser!(usize))
                .default_value("1"),
        )
        .arg(
            arg!(-o --output <OUTPUT> "Annotated BED output (default: stdout)")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(--load "Store the results and aggregate them instead of writing BED")
                .action(ArgAction::SetTrue),
        )
        .arg(
            arg!(--force "Replace a sample that is already stored")
                .action(ArgAction::SetTrue)
                .requires("load"),
        )
}
