mod aggregate;
mod annotate;
mod calculate;
mod config;
mod convert;
mod db;
mod link;
mod load;
mod sex;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "excov";
    pub const BIN_NAME: &str = "excov";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("Coverage and completeness of exons, aggregated to transcripts and genes.")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML config file (default: ./excov.toml if present)"),
        )
        .arg(
            Arg::new("database")
                .short('d')
                .long("database")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("SQLite database file"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log debug messages"),
        )
        .subcommand(link::cli::create_link_cli())
        .subcommand(annotate::cli::create_annotate_cli())
        .subcommand(load::cli::create_load_cli())
        .subcommand(aggregate::cli::create_aggregate_cli())
        .subcommand(calculate::cli::create_calculate_cli())
        .subcommand(db::cli::create_db_cli())
        .subcommand(sex::cli::create_sex_cli())
        .subcommand(convert::cli::create_convert_cli())
}

///
/// Log to stderr. `RUST_LOG` decides the level, `--verbose` raises the default to debug.
/// Records from the `log` facade used by the library crates are forwarded as well.
///
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}

fn load_config(matches: &ArgMatches) -> Result<Config> {
    let mut config = Config::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    if let Some(database) = matches.get_one::<PathBuf>("database") {
        config.database = Some(database.clone());
    }
    Ok(config)
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    init_logging(matches.get_flag("verbose"));
    let config = load_config(&matches)?;
    tracing::debug!("{} {} with {:?}", consts::PKG_NAME, consts::VERSION, config);

    match matches.subcommand() {
        Some((link::cli::LINK_CMD, matches)) => {
            link::handlers::run_link(matches, &config)?;
        }

        Some((annotate::cli::ANNOTATE_CMD, matches)) => {
            annotate::handlers::run_annotate(matches, &config)?;
        }

        Some((load::cli::LOAD_CMD, matches)) => {
            load::handlers::run_load(matches, &config)?;
        }

        Some((aggregate::cli::AGGREGATE_CMD, matches)) => {
            aggregate::handlers::run_aggregate(matches, &config)?;
        }

        //
        // QUERIES
        //
        Some((calculate::cli::CALCULATE_CMD, matches)) => {
            calculate::handlers::run_calculate(matches, &config)?;
        }

        //
        // MAINTENANCE
        //
        Some((db::cli::DB_CMD, matches)) => match matches.subcommand() {
            Some((db::cli::DB_SETUP, matches)) => {
                db::handlers::run_setup(matches, &config)?;
            }
            Some((db::cli::DB_REMOVE, matches)) => {
                db::handlers::run_remove(matches, &config)?;
            }
            _ => unreachable!("db subcommand not found"),
        },

        Some((sex::cli::SEX_CMD, matches)) => {
            sex::handlers::run_sex(matches, &config)?;
        }

        Some((convert::cli::CONVERT_CMD, matches)) => {
            convert::handlers::run_convert(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
