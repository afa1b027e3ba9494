use std::io::{Write, stdout};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tk_cli::commands::edit::EditArgs;
use tk_cli::commands::{edit, export, init, show, track, util};
use tk_cli::{Cli, Commands, Config, document};
use tk_core::timestamp::fixed_offset_hours;

/// Dispatches one command against the document at `path`.
///
/// Times are shown and read in `tz`.
fn run<W: Write, Tz>(
    writer: &mut W,
    command: &Commands,
    config: &Config,
    path: &Path,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<()>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let settings = &config.timekeep;
    let pretty = settings.format_copied_json;

    match command {
        Commands::Init => init::run(writer, path)?,
        Commands::Show => show::run(writer, &document::read(path)?, settings, now, tz)?,
        Commands::Total => show::total(writer, &document::read(path)?, settings, now)?,
        Commands::Start { name, parent } => {
            document::modify(path, pretty, |timekeep| {
                track::start(writer, timekeep, name, parent.as_deref(), now)
            })?;
        }
        Commands::Stop => {
            document::modify(path, pretty, |timekeep| track::stop(writer, timekeep, now))?;
        }
        Commands::Edit {
            id,
            name,
            start,
            end,
        } => {
            let args = EditArgs {
                id: id.as_str(),
                name: name.as_deref(),
                start: start.as_deref(),
                end: end.as_deref(),
            };
            document::modify(path, pretty, |timekeep| {
                edit::run(writer, timekeep, &args, settings, tz)
            })?;
        }
        Commands::Remove { id } => {
            document::modify(path, pretty, |timekeep| edit::remove(writer, timekeep, id))?;
        }
        Commands::Export { format } => {
            export::run(writer, &document::read(path)?, *format, settings, now, tz)?;
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let now = match &cli.now {
        Some(text) => util::parse_datetime(text, Utc::now())?,
        None => Utc::now(),
    };
    let path = cli.file.as_deref().unwrap_or(&config.document_path);

    let stdout = stdout();
    let mut writer = stdout.lock();
    match cli.utc_offset {
        Some(hours) => {
            let offset = fixed_offset_hours(hours)
                .with_context(|| format!("invalid UTC offset: {hours} hours"))?;
            run(&mut writer, command, &config, path, now, &offset)
        }
        None => run(&mut writer, command, &config, path, now, &Local),
    }
}
