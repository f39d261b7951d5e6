use clap::{Arg, ArgAction, ArgGroup, Command, arg};

pub const DB_CMD: &str = "db";
pub const DB_SETUP: &str = "setup";
pub const DB_REMOVE: &str = "remove";

pub fn create_db_cli() -> Command {
    Command::new(DB_CMD)
        .about("Database maintenance.")
        .subcommand_required(true)
        .subcommand(
            Command::new(DB_SETUP)
                .about("Create the database tables.")
                .arg(
                    arg!(--reset "Drop every existing table, and all data, first")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new(DB_REMOVE)
                .about("Remove a sample, or a whole group of samples, with all statistics.")
                .arg(Arg::new("sample").help("Sample id"))
                .arg(arg!(-g --group <GROUP> "Remove every sample of this group"))
                .group(
                    ArgGroup::new("target")
                        .args(["sample", "group"])
                        .required(true),
                ),
        )
}
