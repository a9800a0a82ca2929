//! Single keystroke input.
//!
//! The interactive loop pulls one key at a time from a [`KeySource`]. On a
//! real terminal that means switching stdin to raw mode for the duration of
//! each read so no Enter is needed; tests feed a [`ScriptedKeys`] instead.
use crate::pacing::ShutdownFlag;
use crate::{ButtonError, Result};
use std::collections::VecDeque;
use std::io::{self, Read};
use tracing::debug;

pub trait KeySource {
    /// Blocks until a key is available. `None` means input is exhausted.
    /// # Errors
    /// Any failure reading the underlying input.
    fn next_key(&mut self) -> Result<Option<char>>;
}

/// Keys handed out in a fixed order.
#[derive(Debug, Clone, Default)]
pub struct ScriptedKeys {
    keys: VecDeque<char>,
}

impl ScriptedKeys {
    pub fn new(keys: &str) -> Self {
        Self {
            keys: keys.chars().collect(),
        }
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.keys.len()
    }
}

impl KeySource for ScriptedKeys {
    fn next_key(&mut self) -> Result<Option<char>> {
        Ok(self.keys.pop_front())
    }
}

/// Reads keystrokes from stdin.
///
/// When stdin is a terminal each read happens in raw mode, which also means
/// Ctrl+C arrives as a plain `0x03` byte instead of a signal. When stdin is a
/// pipe, keys are read as-is and line breaks are skipped.
///
/// On a pipe a Ctrl+C only takes effect once the blocked read returns: the
/// signal handler restarts the read, so the shutdown flag is seen on the next
/// byte, on end of input, or on a read that does report `Interrupted`.
#[derive(Debug)]
pub struct RawTerminal {
    #[cfg(unix)]
    saved: Option<nix::sys::termios::Termios>,
    shutdown: Option<ShutdownFlag>,
}

impl RawTerminal {
    #[cfg(unix)]
    #[must_use]
    pub fn new() -> Self {
        use std::os::unix::io::AsRawFd;
        let saved = match nix::sys::termios::tcgetattr(io::stdin().as_raw_fd()) {
            Ok(termios) => Some(termios),
            Err(err) => {
                debug!(%err, "stdin is not a terminal, reading keys without raw mode");
                None
            }
        };
        Self {
            saved,
            shutdown: None,
        }
    }

    #[cfg(not(unix))]
    #[must_use]
    pub fn new() -> Self {
        debug!("raw mode unsupported here, keys need Enter");
        Self { shutdown: None }
    }

    /// Stops reading with [`ButtonError::Interrupted`] once `shutdown` is raised.
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: ShutdownFlag) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    #[cfg(unix)]
    const fn is_tty(&self) -> bool {
        self.saved.is_some()
    }

    #[cfg(not(unix))]
    const fn is_tty(&self) -> bool {
        false
    }

    #[cfg(unix)]
    fn read_byte(&self) -> Result<Option<u8>> {
        let mut stdin = io::stdin().lock();
        match &self.saved {
            Some(saved) => {
                let _guard = raw::RawGuard::enter(saved)?;
                read_one(&mut stdin, self.shutdown.as_ref())
            }
            None => read_one(&mut stdin, self.shutdown.as_ref()),
        }
    }

    #[cfg(not(unix))]
    fn read_byte(&self) -> Result<Option<u8>> {
        read_one(&mut io::stdin().lock(), self.shutdown.as_ref())
    }
}

impl Default for RawTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl KeySource for RawTerminal {
    fn next_key(&mut self) -> Result<Option<char>> {
        let skip_line_breaks = !self.is_tty();
        let key = read_key(|| self.read_byte(), skip_line_breaks)?;
        if key.is_none() {
            if let Some(shutdown) = &self.shutdown {
                if shutdown.is_raised() {
                    return Err(ButtonError::Interrupted);
                }
            }
        }
        Ok(key)
    }
}

/// Pulls bytes until one whole UTF-8 character is assembled.
fn read_key<F>(mut next_byte: F, skip_line_breaks: bool) -> Result<Option<char>>
where
    F: FnMut() -> Result<Option<u8>>,
{
    let first = loop {
        match next_byte()? {
            None => return Ok(None),
            Some(b'\n' | b'\r') if skip_line_breaks => continue,
            Some(byte) => break byte,
        }
    };
    let width = match first {
        0x00..=0x7F => return Ok(Some(char::from(first))),
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => return Ok(Some(char::REPLACEMENT_CHARACTER)),
    };
    let mut buf = vec![first];
    while buf.len() < width {
        match next_byte()? {
            Some(byte) => buf.push(byte),
            None => break,
        }
    }
    Ok(Some(
        std::str::from_utf8(&buf)
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER),
    ))
}

fn read_one<R: Read>(reader: &mut R, shutdown: Option<&ShutdownFlag>) -> Result<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {
                if shutdown.map_or(false, ShutdownFlag::is_raised) {
                    return Err(ButtonError::Interrupted);
                }
            }
            Err(err) => return Err(err.into()),
        }
    }
}

#[cfg(unix)]
mod raw {
    use crate::{ButtonError, Result};
    use nix::sys::termios::{cfmakeraw, tcsetattr, SetArg, Termios};
    use std::io;
    use std::os::unix::io::{AsRawFd, RawFd};
    use tracing::warn;

    /// Raw mode on stdin until dropped.
    pub(super) struct RawGuard<'a> {
        fd: RawFd,
        saved: &'a Termios,
    }

    impl<'a> RawGuard<'a> {
        pub(super) fn enter(saved: &'a Termios) -> Result<Self> {
            let fd = io::stdin().as_raw_fd();
            let mut raw = saved.clone();
            cfmakeraw(&mut raw);
            tcsetattr(fd, SetArg::TCSANOW, &raw)
                .map_err(|e| ButtonError::Terminal(format!("entering raw mode: {e}")))?;
            Ok(Self { fd, saved })
        }
    }

    impl Drop for RawGuard<'_> {
        fn drop(&mut self) {
            if let Err(err) = tcsetattr(self.fd, SetArg::TCSANOW, self.saved) {
                warn!(%err, "could not restore terminal mode");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn scripted_keys_come_out_in_order_then_run_dry() {
        let mut keys = ScriptedKeys::new("2pq");
        assert_eq!(keys.next_key().unwrap(), Some('2'));
        assert_eq!(keys.next_key().unwrap(), Some('p'));
        assert_eq!(keys.remaining(), 1);
        assert_eq!(keys.next_key().unwrap(), Some('q'));
        assert_eq!(keys.next_key().unwrap(), None);
        assert_eq!(keys.next_key().unwrap(), None);
    }

    fn keys_from(input: &[u8], skip_line_breaks: bool) -> Vec<char> {
        let mut cursor = Cursor::new(input.to_vec());
        let mut keys = Vec::new();
        while let Some(key) = read_key(|| read_one(&mut cursor, None), skip_line_breaks).unwrap() {
            keys.push(key);
        }
        keys
    }

    #[test]
    fn ascii_and_ctrl_c_pass_through() {
        assert_eq!(keys_from(b"x\x03", false), ['x', '\u{3}']);
    }

    #[test]
    fn piped_input_skips_line_breaks() {
        assert_eq!(keys_from(b"2\n3\r\nq\n", true), ['2', '3', 'q']);
        assert_eq!(keys_from(b"2\n", false), ['2', '\n']);
    }

    #[test]
    fn end_of_input_is_none() {
        let mut cursor = Cursor::new(Vec::new());
        assert_eq!(read_key(|| read_one(&mut cursor, None), true).unwrap(), None);
        let mut cursor = Cursor::new(b"\n\r".to_vec());
        assert_eq!(read_key(|| read_one(&mut cursor, None), true).unwrap(), None);
    }

    #[test]
    fn multi_byte_keys_are_assembled() {
        assert_eq!(keys_from("é€q".as_bytes(), true), ['é', '€', 'q']);
    }

    #[test]
    fn truncated_or_stray_bytes_become_replacement() {
        assert_eq!(keys_from(&[0x80], true), [char::REPLACEMENT_CHARACTER]);
        assert_eq!(keys_from(&[0xE2, 0x82], true), [char::REPLACEMENT_CHARACTER]);
    }

    /// Reports `Interrupted` on every read, like a read cut short by a signal.
    struct Interrupting;

    impl Read for Interrupting {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::Interrupted))
        }
    }

    #[test]
    fn interrupted_read_stops_once_shutdown_is_raised() {
        let flag = ShutdownFlag::new();
        flag.raise();
        let err = read_one(&mut Interrupting, Some(&flag)).unwrap_err();
        assert!(matches!(err, ButtonError::Interrupted));
    }

    #[test]
    fn interrupted_read_retries_without_shutdown() {
        let mut attempts = 0;
        let mut flaky = InterruptOnce {
            inner: Cursor::new(b"4".to_vec()),
            attempts: &mut attempts,
        };
        assert_eq!(read_one(&mut flaky, Some(&ShutdownFlag::new())).unwrap(), Some(b'4'));
        assert_eq!(attempts, 2);
    }

    struct InterruptOnce<'a> {
        inner: Cursor<Vec<u8>>,
        attempts: &'a mut usize,
    }

    impl Read for InterruptOnce<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            *self.attempts += 1;
            if *self.attempts == 1 {
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            }
            self.inner.read(buf)
        }
    }
}
