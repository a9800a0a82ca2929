use crate::config::ButtonConfig;
use crate::pacing::Pacer;
use crate::script::Step;
use crate::{ButtonError, Command, Result};
use std::io;
use tokio_serial::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, info};

/// A connection to a Big Internet Button.
///
/// Owns the transport for the whole session. Writes are only possible while
/// the board is open; [`Board::close`] may be called any number of times and
/// dropping the board closes it as well.
#[derive(Debug)]
pub struct Board<T: io::Write> {
    connection: Option<T>,
    name: String,
}

impl Board<Box<dyn SerialPort>> {
    /// Opens the serial device at `path` with 8N1 framing.
    ///
    /// The firmware needs the settle period before it listens, see
    /// [`Board::connect`] for the variant that waits.
    /// # Errors
    /// Returns [`ButtonError::Connection`] if the port cannot be opened
    /// (device absent, missing permissions).
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        let port = tokio_serial::new(path, baud_rate)
            .data_bits(DataBits::Eight)
            .stop_bits(StopBits::One)
            .parity(Parity::None)
            .flow_control(FlowControl::None)
            .open()
            .map_err(|source| ButtonError::Connection {
                path: path.to_string(),
                source,
            })?;
        info!(path, baud_rate, "serial port opened");
        Ok(Self::new(port, path))
    }

    /// Opens the port named in `config` and waits out the settle period.
    /// # Errors
    /// [`ButtonError::Connection`] when opening fails, or whatever the pacer
    /// reports while waiting.
    pub fn connect<P: Pacer>(config: &ButtonConfig, pacer: &mut P) -> Result<Self> {
        let mut board = Self::open(&config.device, config.baud_rate)?;
        debug!(settle = ?config.settle(), "waiting for the board to settle");
        if let Err(err) = pacer.pause(config.settle()) {
            board.close();
            return Err(err);
        }
        Ok(board)
    }
}

impl<T: io::Write> Board<T> {
    /// Creates a new [`Board`] given an already open [`std::io::Write`].
    pub fn new(connection: T, name: impl Into<String>) -> Self {
        Self {
            connection: Some(connection),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.connection.is_some()
    }

    /// The underlying transport, `None` once closed.
    pub fn connection(&self) -> Option<&T> {
        self.connection.as_ref()
    }

    /// Writes one command byte. Nothing is read back.
    /// # Errors
    /// [`ButtonError::Closed`] after [`Board::close`], otherwise any io error
    /// from the transport.
    pub fn send(&mut self, command: Command) -> Result<()> {
        let connection = self.connection.as_mut().ok_or(ButtonError::Closed)?;
        debug!(%command, byte = command.to_u8(), "write");
        connection.write_all(&[command.to_u8()])?;
        connection.flush()?;
        Ok(())
    }

    pub fn led_on(&mut self) -> Result<()> {
        self.send(Command::LedOn)
    }

    pub fn led_off(&mut self) -> Result<()> {
        self.send(Command::LedOff)
    }

    pub fn beep_high(&mut self) -> Result<()> {
        self.send(Command::BeepHigh)
    }

    pub fn beep_low(&mut self) -> Result<()> {
        self.send(Command::BeepLow)
    }

    /// Runs a script step by step. `Say` lines go to `out`.
    /// # Errors
    /// Stops at the first failing write, pause or console write.
    pub fn play<P: Pacer, W: io::Write>(
        &mut self,
        steps: &[Step],
        pacer: &mut P,
        out: &mut W,
    ) -> Result<()> {
        for step in steps {
            match step {
                Step::Send(command) => self.send(*command)?,
                Step::Wait(duration) => pacer.pause(*duration)?,
                Step::Say(line) => {
                    writeln!(out, "{line}")?;
                    out.flush()?;
                }
            }
        }
        Ok(())
    }

    /// Releases the transport. Calling it again is a no-op.
    pub fn close(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            // Best effort; the port is dropped either way.
            if let Err(err) = connection.flush() {
                debug!(%err, "flush on close failed");
            }
            info!(name = %self.name, "serial connection closed");
        }
    }

    /// Closes the board and hands back the transport, if it was still open.
    pub fn into_inner(mut self) -> Option<T> {
        self.connection.take()
    }
}

impl<T: io::Write> Drop for Board<T> {
    fn drop(&mut self) {
        self.close();
    }
}
