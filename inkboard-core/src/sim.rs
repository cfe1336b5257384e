//! Simulated board for tests: scripted switch presses over simulated time.

use crate::board::{Board, Level};
use crate::keymap::ROWS;

/// A switch held closed for `from..until` simulated milliseconds.
#[derive(Copy, Clone, Debug)]
pub struct Hold {
    pub row: usize,
    pub col: usize,
    pub from: u32,
    pub until: u32,
}

pub struct SimBoard {
    pub time: u32,
    pub rows: [Level; ROWS],
    pub holds: Vec<Hold>,
    /// Bytes sent, stamped with the time they went out.
    pub emitted: Vec<(u32, u8)>,
    pub suspends: usize,
    pub rows_at_suspend: Option<[Level; ROWS]>,
    /// Every column read, as (time, row driven, col).
    pub reads: Vec<(u32, usize, usize)>,
}

impl SimBoard {
    pub fn new() -> Self {
        Self {
            time: 0,
            rows: [Level::Inactive; ROWS],
            holds: Vec::new(),
            emitted: Vec::new(),
            suspends: 0,
            rows_at_suspend: None,
            reads: Vec::new(),
        }
    }

    pub fn hold(&mut self, row: usize, col: usize, from: u32, until: u32) {
        self.holds.push(Hold {
            row,
            col,
            from,
            until,
        });
    }

    pub fn closed(&self, row: usize, col: usize) -> bool {
        self.holds
            .iter()
            .any(|h| h.row == row && h.col == col && h.from <= self.time && self.time < h.until)
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.emitted.iter().map(|&(_, b)| b).collect()
    }

    pub fn times_of(&self, byte: u8) -> Vec<u32> {
        self.emitted
            .iter()
            .filter(|&&(_, b)| b == byte)
            .map(|&(t, _)| t)
            .collect()
    }
}

impl Board for SimBoard {
    fn drive_row(&mut self, row: usize, level: Level) {
        self.rows[row] = level;
    }

    fn read_column(&mut self, col: usize) -> Level {
        let mut level = Level::Inactive;
        for row in 0..ROWS {
            if self.rows[row] == Level::Active {
                self.reads.push((self.time, row, col));
                if self.closed(row, col) {
                    level = Level::Active;
                }
            }
        }
        level
    }

    fn now(&mut self) -> u32 {
        self.time
    }

    fn emit(&mut self, byte: u8) {
        self.emitted.push((self.time, byte));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.time += ms;
    }

    /// Returns at once if a selected switch is already closed, otherwise
    /// jumps to the start of the next scripted press.
    fn suspend_until_wake(&mut self) {
        self.suspends += 1;
        self.rows_at_suspend = Some(self.rows);
        let now = self.time;
        let column_active = self
            .holds
            .iter()
            .any(|h| self.rows[h.row] == Level::Active && h.from <= now && now < h.until);
        if column_active {
            return;
        }
        let next = self
            .holds
            .iter()
            .map(|h| h.from)
            .filter(|&t| t > now)
            .min();
        if let Some(next) = next {
            self.time = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_reports_only_selected_rows() {
        let mut board = SimBoard::new();
        board.hold(1, 3, 0, 10);
        assert_eq!(board.read_column(3), Level::Inactive);
        board.drive_row(1, Level::Active);
        assert_eq!(board.read_column(3), Level::Active);
        assert_eq!(board.read_column(4), Level::Inactive);
    }

    #[test]
    fn closed_switch_on_selected_row_wakes_at_once() {
        let mut board = SimBoard::new();
        board.hold(2, 5, 0, 300);
        board.hold(0, 0, 1000, 1010);
        board.time = 150;
        board.drive_row(2, Level::Active);
        board.suspend_until_wake();
        assert_eq!(board.time, 150);

        board.drive_row(2, Level::Inactive);
        board.suspend_until_wake();
        assert_eq!(board.time, 1000);
        assert_eq!(board.suspends, 2);
    }
}
