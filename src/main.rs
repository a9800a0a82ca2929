mod cli;

use bigbutton::console::RawTerminal;
use bigbutton::pacing::{ShutdownFlag, ThreadPacer};
use bigbutton::session::{self, Outcome};
use bigbutton::standard::board::Board;
use bigbutton::ButtonError;
use clap::Parser;
use cli::{Args, Mode};
use std::io;
use std::process::ExitCode;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let config = match args.resolve_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = ShutdownFlag::new();
    let flag = shutdown.clone();
    if let Err(err) = ctrlc::set_handler(move || flag.raise()) {
        warn!(%err, "could not install Ctrl+C handler");
    }
    let mut pacer = ThreadPacer::new(shutdown.clone());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    session::console_line(
        &mut out,
        &format!(
            "Connecting to Big Internet Button on {} at {} baud...",
            config.device, config.baud_rate
        ),
    );

    let mut board = match Board::connect(&config, &mut pacer) {
        Ok(board) => board,
        Err(ButtonError::Interrupted) => {
            session::console_line(&mut out, "\n\nInterrupted by user");
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            error!(%err, "connection failed");
            eprint!("{}", session::connection_help(&config.device, &err));
            return ExitCode::from(1);
        }
    };

    let keys = || RawTerminal::new().with_shutdown(shutdown.clone());
    let result = match args.mode {
        Mode::Demo => session::demo(&mut board, &mut pacer, &mut out),
        Mode::Test { skip_self_test } => session::test_harness(
            &mut board,
            &mut keys(),
            &mut pacer,
            &mut out,
            !skip_self_test,
        )
        .map(drop),
        Mode::Interactive => {
            session::test_harness(&mut board, &mut keys(), &mut pacer, &mut out, false)
                .map(drop)
        }
        Mode::Send { command } => session::send_once(&mut board, command, &mut pacer, &mut out),
    };

    let outcome = session::conclude(&mut board, result, &mut out);
    if let Outcome::Failed(err) = &outcome {
        eprintln!("Error: {err}");
    }
    ExitCode::from(outcome.exit_code())
}
