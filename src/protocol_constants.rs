// These byte constants are understood by the Big Internet Button firmware.
// Each command is a single ASCII byte, no terminator, no reply.
use std::time::Duration;

// --- Command bytes ---
pub const WIRE_LED_OFF: u8 = b'1';
pub const WIRE_LED_ON: u8 = b'2';
pub const WIRE_BEEP_HIGH: u8 = b'3';
pub const WIRE_BEEP_LOW: u8 = b'4';

// --- Link parameters ---
// Framing is fixed at 8 data bits, 1 stop bit, no parity.
pub const DEFAULT_DEVICE_PATH: &str = "/dev/ttyACM0";
pub const BAUD_RATE: u32 = 9600;
/// The board resets when the host opens the port and ignores bytes until it is back up.
pub const SETTLE_PERIOD: Duration = Duration::from_secs(2);

// --- Console ---
/// Ctrl+C as delivered by a terminal in raw mode.
pub const INTERRUPT_KEY: char = '\u{3}';
