//! Whole sessions: what runs between opening the port and closing it.
//!
//! Each entry point takes the board, pacer, key source and console output
//! as parameters, so a session can be replayed against an in-memory
//! transport. [`conclude`] is the single place a session ends; it closes the
//! board whatever happened before.
use crate::console::KeySource;
use crate::interactive::{self, Exit};
use crate::pacing::Pacer;
use crate::script;
use crate::standard::board::Board;
use crate::{ButtonError, Command, Result};
use std::io;
use tracing::{error, info, warn};

/// The stand-alone light and sound show.
/// # Errors
/// See [`Board::play`].
pub fn demo<T, P, W>(board: &mut Board<T>, pacer: &mut P, out: &mut W) -> Result<()>
where
    T: io::Write,
    P: Pacer,
    W: io::Write,
{
    info!(board = board.name(), "starting demo show");
    board.play(&script::demo_show(), pacer, out)
}

/// Self-test (unless skipped) followed by the interactive loop.
/// # Errors
/// See [`interactive::run`].
pub fn test_harness<T, K, P, W>(
    board: &mut Board<T>,
    keys: &mut K,
    pacer: &mut P,
    out: &mut W,
    self_test: bool,
) -> Result<Exit>
where
    T: io::Write,
    K: KeySource,
    P: Pacer,
    W: io::Write,
{
    if self_test {
        writeln!(out, "Connected! Running tests...\n")?;
        board.play(&script::self_test(), pacer, out)?;
    }
    interactive::print_banner(out)?;
    interactive::run(board, keys, pacer, out)
}

/// Fires a single command.
/// # Errors
/// See [`Board::play`].
pub fn send_once<T, P, W>(
    board: &mut Board<T>,
    command: Command,
    pacer: &mut P,
    out: &mut W,
) -> Result<()>
where
    T: io::Write,
    P: Pacer,
    W: io::Write,
{
    board.play(&script::single(command), pacer, out)
}

/// How a session ended, after the board has been closed.
#[derive(Debug)]
pub enum Outcome {
    Completed,
    Interrupted,
    Failed(ButtonError),
}

impl Outcome {
    /// Process exit status: only a failed session is non-zero.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Completed | Self::Interrupted => 0,
            Self::Failed(_) => 1,
        }
    }
}

/// Closes the board and classifies the result of the session.
pub fn conclude<T, R, W>(board: &mut Board<T>, result: Result<R>, out: &mut W) -> Outcome
where
    T: io::Write,
    W: io::Write,
{
    let outcome = match result {
        Ok(_) => Outcome::Completed,
        Err(ButtonError::Interrupted) => {
            warn!("session interrupted by user");
            console_line(out, "\n\nInterrupted by user");
            Outcome::Interrupted
        }
        Err(err) => {
            error!(%err, "session aborted");
            Outcome::Failed(err)
        }
    };
    let was_open = board.is_open();
    board.close();
    if was_open {
        console_line(out, "Serial connection closed.");
    }
    outcome
}

// Console trouble must not stop the close from happening.
/// Writes one line to the console, logging instead of failing when it cannot.
pub fn console_line<W: io::Write>(out: &mut W, line: &str) {
    if let Err(err) = writeln!(out, "{line}").and_then(|()| out.flush()) {
        warn!(%err, "console write failed");
    }
}

/// Troubleshooting text shown when the port cannot be opened.
#[must_use]
pub fn connection_help(path: &str, err: &ButtonError) -> String {
    let details = match err {
        ButtonError::Connection { source, .. } => source.to_string(),
        other => other.to_string(),
    };
    format!(
        "Error: Could not open serial port {path}\n\
         Details: {details}\n\
         \n\
         Troubleshooting:\n\
         1. Check that the button is plugged in and shows up at {path}\n\
         2. You may need to add your user to the dialout group:\n\
         \x20  sudo usermod -a -G dialout $USER\n\
         \x20  Then log out and back in\n\
         3. If the device enumerated elsewhere, pass it with --device <path>\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacing::RecordingPacer;

    #[test]
    fn conclude_closes_on_success() {
        let mut board = Board::new(Vec::new(), "memory");
        let mut out = Vec::new();
        let outcome = conclude(&mut board, Ok(()), &mut out);
        assert!(matches!(outcome, Outcome::Completed));
        assert_eq!(outcome.exit_code(), 0);
        assert!(!board.is_open());
        assert_eq!(String::from_utf8(out).unwrap(), "Serial connection closed.\n");
    }

    #[test]
    fn conclude_reports_interrupts_as_clean_exits() {
        let mut board = Board::new(Vec::new(), "memory");
        let mut out = Vec::new();
        let outcome = conclude::<_, (), _>(&mut board, Err(ButtonError::Interrupted), &mut out);
        assert!(matches!(outcome, Outcome::Interrupted));
        assert_eq!(outcome.exit_code(), 0);
        assert!(!board.is_open());
        assert!(String::from_utf8(out).unwrap().contains("Interrupted by user"));
    }

    #[test]
    fn conclude_fails_with_status_one_and_still_closes() {
        let mut board = Board::new(Vec::new(), "memory");
        let mut out = Vec::new();
        let outcome = conclude::<_, (), _>(&mut board, Err(ButtonError::Closed), &mut out);
        assert_eq!(outcome.exit_code(), 1);
        assert!(!board.is_open());
    }

    #[test]
    fn conclude_on_already_closed_board_stays_quiet() {
        let mut board = Board::new(Vec::new(), "memory");
        board.close();
        let mut out = Vec::new();
        conclude(&mut board, Ok(()), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn send_once_writes_exactly_one_byte() {
        let mut board = Board::new(Vec::new(), "memory");
        let mut pacer = RecordingPacer::new();
        let mut out = Vec::new();
        send_once(&mut board, Command::BeepHigh, &mut pacer, &mut out).unwrap();
        assert_eq!(board.connection().unwrap().as_slice(), b"3");
        assert!(pacer.pauses().is_empty());
    }

    struct BrokenConsole;

    impl io::Write for BrokenConsole {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::ErrorKind::BrokenPipe.into())
        }
    }

    #[test]
    fn console_line_survives_a_broken_console() {
        console_line(&mut BrokenConsole, "Interrupted by user");
        let mut out = Vec::new();
        console_line(&mut out, "Connecting...");
        assert_eq!(out, b"Connecting...\n");
    }

    #[test]
    fn connection_help_names_path_and_remedies() {
        let err = ButtonError::Config("nope".to_string());
        let text = connection_help("/dev/ttyACM7", &err);
        assert!(text.contains("/dev/ttyACM7"));
        assert!(text.contains("dialout"));
        assert!(text.contains("--device"));
    }
}
