use clap::Parser;
use ratatui::DefaultTerminal;
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::{error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod controller;
mod domain;
mod format;
mod inputter;
mod loader;
mod model;
mod record;
mod sort;
mod style;
mod ui;

use controller::Controller;
use domain::{Message, TTConfig, TTError};
use model::{Model, Status};
use ui::TableUI;

/// Terminal viewer for trending token market data.
#[derive(Parser, Debug)]
#[command(name = "tokentable", version, about, long_about = None)]
struct Args {
    /// Token snapshot file (csv, parquet or arrow)
    path: String,

    /// Event poll interval in milliseconds
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,

    /// Maximum width of a text column
    #[arg(long, default_value_t = 24)]
    max_column_width: usize,

    /// Width of the trend column
    #[arg(long, default_value_t = 14)]
    sparkline_width: usize,

    /// Write logs to this file. Filter with RUST_LOG
    #[arg(long)]
    log_file: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = init_tracing(args.log_file.as_deref()) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Err(e) => {
            error!("Exiting with error: {e:?}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn expand_path(path: &str) -> Result<PathBuf, TTError> {
    shellexpand::full(path)
        .map(|p| PathBuf::from(p.as_ref()))
        .map_err(|e| TTError::PathExpansion(e.to_string()))
}

fn init_tracing(log_file: Option<&str>) -> Result<(), TTError> {
    // The terminal belongs to the UI, logs only go to a file
    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(expand_path(path)?)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(file_layer)
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

// Everything that can fail before the terminal is switched into raw mode
fn prepare(args: &Args) -> Result<(TTConfig, Model), TTError> {
    let path = expand_path(&args.path)?;
    let cfg = TTConfig::default()
        .event_poll_time(args.poll_ms)
        .max_column_width(args.max_column_width)
        .sparkline_width(args.sparkline_width);
    info!("Starting tokentable with {cfg:?}");

    let mut model = Model::init(&cfg, 0, 0);
    model.load_data_file(&path)?;
    Ok((cfg, model))
}

fn run(args: &Args) -> Result<(), TTError> {
    let (cfg, mut model) = prepare(args)?;

    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &cfg, &mut model);
    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    cfg: &TTConfig,
    model: &mut Model,
) -> Result<(), TTError> {
    let size = terminal.size()?;
    model.update(Some(Message::Resize(size.width as usize, size.height as usize)))?;

    let mut ui = TableUI::new(cfg);
    let controller = Controller::new(cfg);

    while model.status != Status::QUITTING {
        terminal.draw(|f| ui.draw(model, f))?;

        if let Some(message) = controller.handle_event(model)? {
            model.update(Some(message))?;
        };
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(path: &str) -> Args {
        Args::try_parse_from(["tokentable", path]).unwrap()
    }

    #[test]
    fn prepare_loads_fixture() {
        let (cfg, model) = prepare(&args("tests/fixtures/tokens.csv")).unwrap();
        assert_eq!(cfg.sparkline_width, 14);
        assert_eq!(model.get_uidata().name, "tokens.csv");
        assert_eq!(model.get_uidata().nrows, 10);
    }

    #[test]
    fn unreadable_files_fail_before_terminal_setup() {
        assert!(matches!(
            prepare(&args("tests/fixtures/missing.csv")),
            Err(TTError::FileNotFound)
        ));
        assert!(matches!(
            prepare(&args("tests/fixtures/tokens.txt")),
            Err(TTError::UnknownFileType)
        ));
    }

    #[test]
    fn cli_options_reach_config() {
        let args = Args::try_parse_from([
            "tokentable",
            "--max-column-width",
            "12",
            "tests/fixtures/tokens.csv",
        ])
        .unwrap();
        let (cfg, _) = prepare(&args).unwrap();
        assert_eq!(cfg.max_column_width, 12);
        assert_eq!(cfg.event_poll_time, 100);
    }
}
