use chrono::{Local, NaiveDate};
use clap::Parser;
use coffee_match::config::{LoggingSettings, Settings};
use coffee_match::services::{FileRecordStore, SlackClient};
use coffee_match::{CoffeeError, Orchestrator, RunOutcome, Schedule};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Pair channel members for a coffee and announce today's matches
#[derive(Debug, Parser)]
#[command(name = "coffee-match", version, about)]
struct Cli {
    /// Configuration file, on top of the default locations
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run as if today were this date (YYYY-MM-DD)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Seed the random source for reproducible pairings
    #[arg(long)]
    seed: Option<u64>,
}

/// Event layout for every log destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Pretty,
    Compact,
}

impl LogFormat {
    /// Anything other than "pretty" falls back to the compact layout
    fn from_setting(format: &str) -> Self {
        if format.trim().eq_ignore_ascii_case("pretty") {
            LogFormat::Pretty
        } else {
            LogFormat::Compact
        }
    }
}

/// Initialize logging from the settings; RUST_LOG wins over the configured level
fn init_logging(settings: &LoggingSettings) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    let format = LogFormat::from_setting(&settings.format);
    match &settings.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            // No colour codes in the file
            let subscriber = subscriber
                .with_ansi(false)
                .with_writer(std::io::stdout.and(Mutex::new(file)));
            match format {
                LogFormat::Pretty => subscriber.pretty().init(),
                LogFormat::Compact => subscriber.compact().init(),
            }
        }
        None => match format {
            LogFormat::Pretty => subscriber.pretty().init(),
            LogFormat::Compact => subscriber.compact().init(),
        },
    }
    Ok(())
}

/// Exit status for configuration or collaborator failures
const FAILURE: u8 = 1;

/// Log how the run ended and return the process exit status
///
/// Off days and an empty queue are successful runs; any error is a failure.
fn report(result: &Result<RunOutcome, CoffeeError>) -> u8 {
    match result {
        Ok(outcome) => {
            match outcome {
                RunOutcome::OffDay => info!("Nothing to do on a day off"),
                RunOutcome::EmptyQueue => info!("Everyone already had a coffee this period"),
                RunOutcome::Alone { member } => info!("{} had nobody to meet", member),
                RunOutcome::Matched { couples, days_remaining } => info!(
                    "Announced {} matches, {} working days left in the period",
                    couples.len(),
                    days_remaining
                ),
            }
            0
        }
        Err(e) => {
            error!("{}", e);
            FAILURE
        }
    }
}

async fn run(cli: &Cli, settings: Settings) -> Result<RunOutcome, CoffeeError> {
    let templates = settings.templates()?;
    let messenger = SlackClient::new(settings.slack_options())?;
    let store = FileRecordStore::new(&settings.storage.match_record);

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let today = cli.date.unwrap_or_else(|| Local::now().date_naive());

    info!(
        "Matching channel {} for {} ({} templates)",
        settings.slack.channel,
        today,
        templates.len()
    );

    let mut orchestrator = Orchestrator::new(
        messenger,
        store,
        rng,
        Schedule::from(&settings.matching),
        templates,
    );

    Ok(orchestrator.run(today).await?)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            // Logging settings are unknown until the configuration loads
            if init_logging(&LoggingSettings::default()).is_ok() {
                error!("Failed to load configuration: {}", e);
            } else {
                eprintln!("Failed to load configuration: {}", e);
            }
            return ExitCode::from(FAILURE);
        }
    };

    if let Err(e) = init_logging(&settings.logging) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::from(FAILURE);
    }

    ExitCode::from(report(&run(&cli, settings).await))
}
