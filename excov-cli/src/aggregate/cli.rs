use clap::{Arg, ArgAction, Command};

pub const AGGREGATE_CMD: &str = "aggregate";

pub fn create_aggregate_cli() -> Command {
    Command::new(AGGREGATE_CMD)
        .about("Aggregate stored exon statistics to transcripts, then to genes.")
        .arg(
            Arg::new("samples")
                .required(true)
                .action(ArgAction::Append)
                .help("Ids of loaded samples"),
        )
}
