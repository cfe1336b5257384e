//! Scan, debounce, repeat and sleep logic for the Inkboard key matrix.
//!
//! This crate is `no_std` so the same state machine runs in the AVR firmware
//! and in host-side tests. Hardware access goes through the [`Board`] trait;
//! everything else is plain owned state.
//!
//! One call to [`Scanner::run_cycle`] performs a full pass:
//! - drive each row, sample its columns, debounce, encode
//! - fire key repeats for held ordinary keys
//! - check the panic gesture and the idle timer

#![cfg_attr(not(test), no_std)]

pub mod board;
pub mod config;
pub mod debounce;
pub mod encoder;
pub mod keymap;
pub mod power;
pub mod protocol;
pub mod scanner;

#[cfg(test)]
mod sim;

pub use board::{Board, Level};
pub use config::Timing;
pub use keymap::{Key, Role, COLS, ROWS};
pub use protocol::{Modifier, WireEvent};
pub use scanner::{Cycle, Scanner};
