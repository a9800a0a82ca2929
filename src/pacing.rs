//! Blocking pauses between commands.
//!
//! The firmware acts on a byte as soon as it arrives, so the only thing that
//! keeps an LED flash from being stomped by the next command is the host
//! waiting. Every wait goes through a [`Pacer`] so tests can record them and
//! so a Ctrl+C can cut a show short.
use crate::{ButtonError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

const SLICE: Duration = Duration::from_millis(50);

pub trait Pacer {
    /// Blocks for `duration`.
    /// # Errors
    /// Implementations return [`ButtonError::Interrupted`] when the session
    /// should stop instead of continuing after the pause.
    fn pause(&mut self, duration: Duration) -> Result<()>;

    /// Checks for a pending interrupt without waiting.
    /// # Errors
    /// Same as [`Pacer::pause`].
    fn check(&mut self) -> Result<()> {
        self.pause(Duration::ZERO)
    }
}

/// Raised by a signal handler, observed by [`ThreadPacer`].
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Sleeps on the calling thread in short slices, bailing out once the
/// shutdown flag goes up.
#[derive(Debug, Clone)]
pub struct ThreadPacer {
    shutdown: ShutdownFlag,
}

impl ThreadPacer {
    #[must_use]
    pub const fn new(shutdown: ShutdownFlag) -> Self {
        Self { shutdown }
    }
}

impl Pacer for ThreadPacer {
    fn pause(&mut self, duration: Duration) -> Result<()> {
        let deadline = Instant::now() + duration;
        loop {
            if self.shutdown.is_raised() {
                warn!("pause cut short by shutdown request");
                return Err(ButtonError::Interrupted);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            std::thread::sleep(SLICE.min(deadline - now));
        }
    }
}

/// Keeps every requested pause instead of sleeping.
#[derive(Debug, Clone, Default)]
pub struct RecordingPacer {
    pauses: Vec<Duration>,
}

impl RecordingPacer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pauses(&self) -> &[Duration] {
        &self.pauses
    }

    #[must_use]
    pub fn total(&self) -> Duration {
        self.pauses.iter().sum()
    }
}

impl Pacer for RecordingPacer {
    fn pause(&mut self, duration: Duration) -> Result<()> {
        if !duration.is_zero() {
            self.pauses.push(duration);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_pacer_waits_at_least_the_duration() {
        let mut pacer = ThreadPacer::new(ShutdownFlag::new());
        let start = Instant::now();
        pacer.pause(Duration::from_millis(20)).unwrap();
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn raised_flag_interrupts_immediately() {
        let flag = ShutdownFlag::new();
        let mut pacer = ThreadPacer::new(flag.clone());
        flag.raise();
        let start = Instant::now();
        let err = pacer.pause(Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, ButtonError::Interrupted));
        assert!(start.elapsed() < Duration::from_secs(1));
        assert!(matches!(pacer.check(), Err(ButtonError::Interrupted)));
    }

    #[test]
    fn flag_raised_from_another_thread_ends_the_pause() {
        let flag = ShutdownFlag::new();
        let mut pacer = ThreadPacer::new(flag.clone());
        let raiser = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(30));
            flag.raise();
        });
        assert!(pacer.pause(Duration::from_secs(10)).is_err());
        raiser.join().unwrap();
    }

    #[test]
    fn recording_pacer_skips_zero_checks() {
        let mut pacer = RecordingPacer::new();
        pacer.check().unwrap();
        pacer.pause(Duration::from_millis(300)).unwrap();
        pacer.pause(Duration::from_millis(200)).unwrap();
        assert_eq!(pacer.pauses().len(), 2);
        assert_eq!(pacer.total(), Duration::from_millis(500));
    }
}
