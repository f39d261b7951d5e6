use std::path::PathBuf;

use clap::{Arg, ArgAction, Command, arg, value_parser};

pub const LOAD_CMD: &str = "load";

pub fn create_load_cli() -> Command {
    Command::new(LOAD_CMD)
        .about("Store the exon statistics of an annotated BED file for one sample.")
        .arg(
            Arg::new("annotations")
                .default_value("-")
                .value_parser(value_parser!(PathBuf))
                .help("Annotated BED file written by `excov annotate` (default: stdin)"),
        )
        .arg(arg!(-s --sample <SAMPLE> "Sample id").required(true))
        .arg(arg!(-g --group <GROUP> "Group id, e.g. to relate the samples of a trio"))
        .arg(arg!(--source <SOURCE> "Alignment file the statistics were computed from"))
        .arg(
            arg!(--aggregate "Aggregate to transcripts and genes after loading")
                .action(ArgAction::SetTrue),
        )
        .arg(
            arg!(--force "Replace a sample that is already stored")
                .action(ArgAction::SetTrue),
        )
}
