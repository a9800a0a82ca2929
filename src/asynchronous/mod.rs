//! Tokio driver for hosts that already run a runtime.
pub mod board;
pub mod network;
