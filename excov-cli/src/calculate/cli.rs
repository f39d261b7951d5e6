use clap::{Arg, ArgAction, Command, arg};

pub const CALCULATE_CMD: &str = "calculate";
pub const CALCULATE_MEAN: &str = "mean";
pub const CALCULATE_GENE: &str = "gene";
pub const CALCULATE_SAMPLES: &str = "samples";

fn pretty() -> Arg {
    arg!(-p --pretty "Indent the JSON output").action(ArgAction::SetTrue)
}

fn sample_filter() -> Arg {
    arg!(-s --sample <SAMPLE> "Sample to limit the query to, repeatable").action(ArgAction::Append)
}

pub fn create_calculate_cli() -> Command {
    Command::new(CALCULATE_CMD)
        .about("Summary statistics across stored samples.")
        .subcommand_required(true)
        .subcommand(
            Command::new(CALCULATE_MEAN)
                .about("Mean of every transcript metric, per sample.")
                .arg(sample_filter())
                .arg(pretty()),
        )
        .subcommand(
            Command::new(CALCULATE_GENE)
                .about("Gene metrics, per sample.")
                .arg(
                    Arg::new("genes")
                        .action(ArgAction::Append)
                        .help("Gene ids (default: all genes)"),
                )
                .arg(sample_filter())
                .arg(pretty()),
        )
        .subcommand(
            Command::new(CALCULATE_SAMPLES)
                .about("List stored samples.")
                .arg(arg!(-g --group <GROUP> "Only samples of this group"))
                .arg(pretty()),
        )
}
