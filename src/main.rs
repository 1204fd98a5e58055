use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod advocate;
mod advocate_table;
mod controller;
mod directory;
mod domain;
mod feedback;
mod formatters;
mod inputter;
mod loader;
mod ui;

use advocate::{SortKey, SortOrder};
use controller::Controller;
use directory::{Directory, Status};
use domain::{AdvocatesError, AppConfig};

/// Browse an advocate directory in the terminal.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Advocate file (csv, parquet or arrow)
    path: String,

    /// Column the advocates are sorted by
    #[arg(long = "sort-by", value_enum, default_value_t = SortKey::FirstName)]
    sort_by: SortKey,

    /// Sort direction
    #[arg(long, value_enum, default_value_t = SortOrder::Asc)]
    order: SortOrder,

    /// Terminal event poll interval in milliseconds
    #[arg(long = "poll-ms", default_value_t = 100)]
    poll_ms: u64,

    /// Where log output is written
    #[arg(long = "log-file", default_value = "advocates.log")]
    log_file: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Err(e) => {
            ratatui::restore();
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
        Ok(_) => {
            ratatui::restore();
            ExitCode::SUCCESS
        }
    }
}

fn init_tracing(log_file: &Path) -> Result<(), AdvocatesError> {
    let file = File::create(log_file)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn run(args: Args) -> Result<(), AdvocatesError> {
    init_tracing(&args.log_file)?;

    let cfg = AppConfig::new(loader::expand_path(&args.path)?)
        .sort_key(args.sort_by)
        .sort_order(args.order)
        .event_poll_time(args.poll_ms);
    info!("Starting advocates with {:?}", cfg);

    let mut directory = Directory::init(&cfg);
    let controller = Controller::new(&cfg);
    let mut terminal = ratatui::init();

    while directory.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui::draw(&directory, f))?;

        // Handle events and map to a Message
        let message = controller.handle_event(&directory)?;
        directory.update(message)?;
    }

    info!("Bye!");
    Ok(())
}
