//! The per-cycle scan pipeline.
//!
//! Rows are scanned one at a time. Within a row every column is sampled
//! against the same row drive, then each sample goes through the debouncer
//! and the encoder before the next column. A row that produced an accepted
//! transition is followed by the settle delay before the next row starts.

use log::debug;

use crate::board::{Board, Level};
use crate::config::Timing;
use crate::debounce::{Debouncer, Edge};
use crate::encoder::{encode_edge, poll_repeat};
use crate::keymap::{COLS, KEYS, ROWS};
use crate::power::PowerController;

/// What a call to [`Scanner::run_cycle`] ended with.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Cycle {
    /// Normal pass.
    Scanned,
    /// The board was suspended and has woken up again.
    Slept,
    /// Output is permanently halted. Nothing more will be sent.
    Halted,
}

pub struct Scanner<B: Board> {
    board: B,
    timing: Timing,
    keys: Debouncer,
    power: PowerController,
}

impl<B: Board> Scanner<B> {
    pub fn new(mut board: B, timing: Timing) -> Self {
        for row in 0..ROWS {
            board.drive_row(row, Level::Inactive);
        }
        Self {
            board,
            timing,
            keys: Debouncer::new(),
            power: PowerController::new(),
        }
    }

    /// Run one full pass over the grid, then the panic and idle checks.
    pub fn run_cycle(&mut self) -> Cycle {
        if self.power.is_halted() {
            return Cycle::Halted;
        }

        for row in 0..ROWS {
            self.scan_row(row);
        }

        if self.power.check_panic(&self.keys) {
            return Cycle::Halted;
        }

        let now = self.board.now();
        if self.power.should_sleep(&self.keys, now, &self.timing) {
            self.power.suspend(&mut self.board);
            return Cycle::Slept;
        }

        Cycle::Scanned
    }

    fn scan_row(&mut self, row: usize) {
        self.board.drive_row(row, Level::Active);
        let now = self.board.now();
        let mut accepted = false;

        for col in 0..COLS {
            // Gaps have no switch and are never read.
            let Some(key) = KEYS[row][col] else {
                continue;
            };
            let raw_pressed = self.board.read_column(col) == Level::Active;

            let byte = match self.keys.update(row, col, raw_pressed, now) {
                Some(edge) => {
                    accepted = true;
                    match edge {
                        Edge::Press => debug!("press {} at ({}, {})", key.index, row, col),
                        Edge::Release => debug!("release {} at ({}, {})", key.index, row, col),
                    }
                    encode_edge(key, edge)
                }
                None => {
                    let repeat = self
                        .keys
                        .held_clock_mut(row, col)
                        .and_then(|clock| poll_repeat(key, clock, now, &self.timing));
                    if repeat.is_some() {
                        debug!("repeat {}", key.index);
                    }
                    repeat
                }
            };

            if let Some(byte) = byte {
                self.board.emit(byte);
            }
        }

        self.board.drive_row(row, Level::Inactive);

        if accepted {
            self.board.delay_ms(self.timing.settle_delay_ms);
        }
    }

    pub fn is_halted(&self) -> bool {
        self.power.is_halted()
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }
}
