use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use typikon::cache::DayCache;
use typikon::calendar::CalendarSystem;
use typikon::client::OrthoClient;
use typikon::config::Config;

/// Orthodox liturgical calendar: feasts, saints, fasting and readings.
#[derive(Parser, Debug)]
#[command(name = "typikon", version, about)]
struct Args {
    /// Day to show (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// julian (old) or gregorian (new). Overrides the config file.
    #[arg(long)]
    calendar: Option<CalendarSystem>,

    /// Print the day as plain text and exit.
    #[arg(long)]
    print: bool,

    /// Print the day as JSON and exit.
    #[arg(long, conflicts_with = "print")]
    json: bool,

    /// Config file to use instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env("TYPIKON_LOG").unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// The screen belongs to the TUI, so logs go to a file in the cache directory.
#[cfg(feature = "tui")]
fn init_file_logging() -> Result<()> {
    let Some(proj) = ProjectDirs::from("org", "typikon", "typikon") else {
        return Ok(());
    };
    let dir = proj.cache_dir();
    std::fs::create_dir_all(dir).context("creating cache directory")?;
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("typikon.log"))
        .context("opening log file")?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        use std::io::Write;
        let path = ProjectDirs::from("org", "typikon", "typikon")
            .map(|p| p.cache_dir().join("typikon_panic.log"))
            .unwrap_or_else(|| PathBuf::from("typikon_panic.log"));
        if let Ok(mut file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
        {
            let _ = writeln!(file, "PANIC: {:?}", info);
        }
        // The terminal may still be in raw mode.
        #[cfg(feature = "tui")]
        {
            let _ = crossterm::terminal::disable_raw_mode();
            let _ = crossterm::execute!(
                std::io::stdout(),
                crossterm::terminal::LeaveAlternateScreen,
                crossterm::event::DisableMouseCapture
            );
        }
        default_hook(info);
    }));
}

async fn print_day(config: &Config, calendar: CalendarSystem, date: NaiveDate, json: bool) -> Result<()> {
    let cache = if config.offline_cache {
        DayCache::default_location()
    } else {
        None
    };
    let client = OrthoClient::new(config)?.with_cache(cache);
    let loaded = client
        .load_day(calendar, date)
        .await
        .with_context(|| format!("loading {} ({} calendar)", date, calendar))?;

    if let Some(warning) = &loaded.warning {
        eprintln!("{}", warning);
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&loaded.view)?);
    } else {
        print!("{}", loaded.view.to_text());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    install_panic_hook();

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let calendar = args.calendar.unwrap_or(config.calendar);
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());

    if args.print || args.json {
        init_stderr_logging();
        return print_day(&config, calendar, date, args.json).await;
    }

    run_tui(config, calendar, date).await
}

#[cfg(feature = "tui")]
async fn run_tui(config: Config, calendar: CalendarSystem, date: NaiveDate) -> Result<()> {
    init_file_logging()?;
    tracing::info!("Starting on {} ({} calendar)", date, calendar);
    typikon::tui::run(config, calendar, date).await
}

#[cfg(not(feature = "tui"))]
async fn run_tui(config: Config, calendar: CalendarSystem, date: NaiveDate) -> Result<()> {
    init_stderr_logging();
    print_day(&config, calendar, date, false).await
}
