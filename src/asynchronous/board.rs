use super::network::ButtonCodec;
use crate::config::ButtonConfig;
use crate::script::Step;
use crate::{ButtonError, Command, Result};
use futures::SinkExt;
use tokio::io::AsyncWrite;
use tokio_serial::{DataBits, FlowControl, Parity, SerialPortBuilderExt, SerialStream, StopBits};
use tokio_util::codec::FramedWrite;
use tracing::{debug, info};

/// The async twin of [`crate::standard::board::Board`].
///
/// Waits are `tokio::time::sleep`, so a show can run inside a runtime next
/// to other work and be raced against `tokio::signal::ctrl_c()`. Unlike the
/// blocking board this one cannot close itself on drop; call
/// [`Board::close`].
pub struct Board<W: AsyncWrite> {
    conn_write: Option<FramedWrite<W, ButtonCodec>>,
    name: String,
}

impl Board<SerialStream> {
    /// Opens the serial device and waits out the settle period.
    /// # Errors
    /// [`ButtonError::Connection`] if the device cannot be opened.
    pub async fn connect(config: &ButtonConfig) -> Result<Self> {
        let stream = tokio_serial::new(&config.device, config.baud_rate)
            .data_bits(DataBits::Eight)
            .stop_bits(StopBits::One)
            .parity(Parity::None)
            .flow_control(FlowControl::None)
            .open_native_async()
            .map_err(|source| ButtonError::Connection {
                path: config.device.clone(),
                source,
            })?;
        info!(path = %config.device, "serial stream opened");
        tokio::time::sleep(config.settle()).await;
        Ok(Self::create(stream, config.device.clone()))
    }
}

impl<W: AsyncWrite + Unpin> Board<W> {
    pub fn create(conn_write: W, name: impl Into<String>) -> Self {
        Self {
            conn_write: Some(FramedWrite::new(conn_write, ButtonCodec::default())),
            name: name.into(),
        }
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.conn_write.is_some()
    }

    pub fn connection(&self) -> Option<&W> {
        self.conn_write.as_ref().map(FramedWrite::get_ref)
    }

    /// # Errors
    /// [`ButtonError::Closed`] after [`Board::close`], or the write error.
    pub async fn send(&mut self, command: Command) -> Result<()> {
        let conn_write = self.conn_write.as_mut().ok_or(ButtonError::Closed)?;
        debug!(%command, "write");
        conn_write.send(command).await
    }

    /// Plays a script. `Say` lines are logged rather than printed.
    /// # Errors
    /// Stops at the first failing write.
    pub async fn play(&mut self, steps: &[Step]) -> Result<()> {
        for step in steps {
            match step {
                Step::Send(command) => self.send(*command).await?,
                Step::Wait(duration) => tokio::time::sleep(*duration).await,
                Step::Say(line) if line.is_empty() => {}
                Step::Say(line) => info!(board = %self.name, "{line}"),
            }
        }
        Ok(())
    }

    /// Flushes and shuts the writer down. A second call does nothing.
    /// # Errors
    /// Whatever the transport reports while flushing.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(mut conn_write) = self.conn_write.take() {
            conn_write.close().await?;
            info!(board = %self.name, "serial connection closed");
        }
        Ok(())
    }
}
