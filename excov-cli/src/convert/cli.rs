use std::path::PathBuf;

use clap::{Arg, Command, arg, value_parser};

pub const CONVERT_CMD: &str = "convert";

pub fn create_convert_cli() -> Command {
    Command::new(CONVERT_CMD)
        .about("Convert a CCDS dump into interval definitions.")
        .arg(
            Arg::new("ccds")
                .default_value("-")
                .value_parser(value_parser!(PathBuf))
                .help("CCDS current file, optionally gzip'd (default: stdin)"),
        )
        .arg(
            arg!(-o --output <OUTPUT> "Interval definition BED output (default: stdout)")
                .value_parser(value_parser!(PathBuf)),
        )
}
