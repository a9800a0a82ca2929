//! Blocking driver: one thread, `std::io::Write`, `std::thread::sleep`.
pub mod board;
