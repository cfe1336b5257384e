//! Hardware capabilities the scanner consumes.
//!
//! Levels are logical: `Active` on a row means "selected for scanning" and
//! `Active` on a column means "a closed switch connects it to a selected row".
//! The implementation maps these to pin polarity (active-low on the Teensy).

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Level {
    Active,
    Inactive,
}

/// Everything the scan loop needs from the platform.
///
/// All operations are assumed to succeed. Only [`Board::suspend_until_wake`]
/// and [`Board::delay_ms`] block.
pub trait Board {
    fn drive_row(&mut self, row: usize, level: Level);

    fn read_column(&mut self, col: usize) -> Level;

    /// Monotonic milliseconds. Wraps; callers compare with `wrapping_sub`.
    fn now(&mut self) -> u32;

    /// Send one byte to the receiver, in order.
    fn emit(&mut self, byte: u8);

    fn delay_ms(&mut self, ms: u32);

    /// Block until any column goes active.
    ///
    /// Must not consume the waking edge: the switch that woke the board is
    /// still closed when this returns and shows up on the next scan.
    fn suspend_until_wake(&mut self);
}
