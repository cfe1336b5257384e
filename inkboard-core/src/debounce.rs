//! Per-key debounce and edge detection.
//!
//! There is no sample averaging. A raw reading that differs from the stable
//! state is accepted at once; the scanner then holds off re-sampling the row
//! for the settle delay, which is what keeps contact bounce from turning
//! into a second edge.

use crate::keymap::{COLS, ROWS};

/// An accepted press or release.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Edge {
    Press,
    Release,
}

/// Repeat bookkeeping of a held key, the only part of a cell the repeat
/// policy may move.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RepeatClock {
    /// Time of the last accepted transition, moved forward by each repeat
    /// while the key is held.
    pub last_transition: u32,
    /// Set once the first repeat of the current hold has fired.
    pub armed: bool,
}

/// Debounced state of one key. The pressed flag only changes in
/// [`Debouncer::update`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CellState {
    pressed: bool,
    clock: RepeatClock,
}

impl CellState {
    pub const fn new() -> Self {
        Self {
            pressed: false,
            clock: RepeatClock {
                last_transition: 0,
                armed: false,
            },
        }
    }

    pub fn pressed(&self) -> bool {
        self.pressed
    }

    pub fn last_transition(&self) -> u32 {
        self.clock.last_transition
    }

    pub fn repeat_armed(&self) -> bool {
        self.clock.armed
    }
}

pub struct Debouncer {
    cells: [[CellState; COLS]; ROWS],
    /// Time of the most recent accepted transition anywhere in the grid.
    last_activity: u32,
}

impl Debouncer {
    pub const fn new() -> Self {
        Self {
            cells: [[CellState::new(); COLS]; ROWS],
            last_activity: 0,
        }
    }

    /// Feed one raw sample. Returns the edge if the stable state flipped.
    pub fn update(&mut self, row: usize, col: usize, raw_pressed: bool, now: u32) -> Option<Edge> {
        let cell = &mut self.cells[row][col];
        if raw_pressed == cell.pressed {
            return None;
        }

        cell.pressed = raw_pressed;
        cell.clock = RepeatClock {
            last_transition: now,
            armed: false,
        };
        self.last_activity = now;

        Some(if raw_pressed { Edge::Press } else { Edge::Release })
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellState {
        &self.cells[row][col]
    }

    /// Repeat clock of a key that is currently held, `None` when released.
    pub fn held_clock_mut(&mut self, row: usize, col: usize) -> Option<&mut RepeatClock> {
        let cell = &mut self.cells[row][col];
        if cell.pressed {
            Some(&mut cell.clock)
        } else {
            None
        }
    }

    pub fn is_pressed(&self, row: usize, col: usize) -> bool {
        self.cells[row][col].pressed
    }

    pub fn last_activity(&self) -> u32 {
        self.last_activity
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new()
    }
}
