use std::path::PathBuf;

use clap::{Arg, Command, arg, value_parser};

pub const SEX_CMD: &str = "sex";

pub fn create_sex_cli() -> Command {
    Command::new(SEX_CMD)
        .about("Guess the sex of a sample from its X and Y coverage.")
        .arg(
            Arg::new("bam")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Indexed BAM file"),
        )
        .arg(arg!(-p --prefix <PREFIX> "Contig prefix, e.g. chr"))
}
