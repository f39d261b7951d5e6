use std::path::PathBuf;

use clap::{Arg, Command, arg, value_parser};

pub const LINK_CMD: &str = "link";

pub fn create_link_cli() -> Command {
    Command::new(LINK_CMD)
        .about("Store genes, transcripts and exons from interval definitions.")
        .arg(
            Arg::new("intervals")
                .default_value("-")
                .value_parser(value_parser!(PathBuf))
                .help("Interval definition BED file (default: stdin)"),
        )
        .arg(arg!(-p --prefix <PREFIX> "Prefix added to every contig name"))
}
