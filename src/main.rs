use anyhow::Context;
use clap::Parser;
use shopdash::cli::{Cli, Command, FilterArgs};
use shopdash::commands::query::QueryOptions;
use shopdash::commands::report::OutputFormat;
use shopdash::data::DataCache;
use shopdash::error::exit_code;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::from(exit_code::SUCCESS as u8),
        Err(e) => {
            eprintln!("Error: {e:#}");
            if let Some(err) = e.downcast_ref::<shopdash::Error>() {
                ExitCode::from(err.exit_code() as u8)
            } else {
                ExitCode::from(exit_code::GENERAL_ERROR as u8)
            }
        }
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Validate CLI arguments
    cli.validate()
        .map_err(shopdash::Error::InvalidArgument)
        .context("Invalid arguments")?;

    shopdash::logging::init(cli.log_file.as_deref(), cli.is_interactive())
        .context("Failed to set up logging")?;

    if let Some(Command::Completions { shell }) = cli.command {
        use clap::CommandFactory;
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "shopdash", &mut std::io::stdout());
        return Ok(());
    }

    // Loaded once per session; every render pass borrows it
    let paths = cli.data_paths();
    let mut cache = DataCache::new();
    let dataset = cache.get_or_load(&paths)?;

    match cli.command {
        Some(Command::View { filter }) => {
            shopdash::commands::view::run(dataset, filter.params(), filter.top)?;
        }
        Some(Command::Report {
            filter,
            page,
            json,
            csv,
        }) => {
            let format = if json {
                OutputFormat::Json
            } else if csv {
                OutputFormat::Csv
            } else {
                OutputFormat::Table
            };
            shopdash::commands::report::run(&dataset, &filter.params(), filter.top, page, format)?;
        }
        Some(Command::Segments) => {
            shopdash::commands::segments::run(&dataset)?;
        }
        Some(Command::Query {
            sql,
            precision,
            json,
        }) => {
            let options = QueryOptions { precision, json };
            shopdash::commands::query::run(&dataset, &sql, options)?;
        }
        Some(Command::Completions { .. }) => unreachable!("handled before loading data"),
        None => {
            let filter = FilterArgs::default();
            shopdash::commands::view::run(dataset, filter.params(), filter.top)?;
        }
    }

    Ok(())
}
