//! Scan timing.

/// Timing parameters for the scan loop, all in milliseconds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Timing {
    /// Pause after a row that produced an accepted transition.
    /// This is the whole debounce: the row is not sampled again until it passes.
    pub settle_delay_ms: u32,
    /// Hold time before the first repeat.
    pub initial_repeat_delay_ms: u32,
    /// Time between subsequent repeats.
    pub repeat_interval_ms: u32,
    /// Inactivity before the board is suspended.
    pub sleep_threshold_ms: u32,
}

impl Timing {
    pub const DEFAULT: Timing = Timing {
        settle_delay_ms: 5,
        initial_repeat_delay_ms: 470,
        repeat_interval_ms: 75,
        sleep_threshold_ms: 30_000,
    };
}

impl Default for Timing {
    fn default() -> Self {
        Self::DEFAULT
    }
}
