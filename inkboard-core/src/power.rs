//! Idle suspend and the panic gesture.
//!
//! Both checks run once per full grid pass, after every row has been
//! debounced and encoded.

use log::{info, warn};

use crate::board::{Board, Level};
use crate::config::Timing;
use crate::debounce::Debouncer;
use crate::keymap::{COLS, KEYS, PANIC_GESTURE, ROWS};

pub struct PowerController {
    halted: bool,
}

impl PowerController {
    pub const fn new() -> Self {
        Self { halted: false }
    }

    /// True once the panic gesture has been seen. Never cleared.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Latch the halt if all five gesture keys are down. Returns the latch.
    pub fn check_panic(&mut self, keys: &Debouncer) -> bool {
        if !self.halted && panic_gesture_held(keys) {
            warn!("panic gesture held, output halted until power cycle");
            self.halted = true;
        }
        self.halted
    }

    /// Idle long enough and no modifier held.
    ///
    /// A held modifier keeps the board awake so the receiver never loses
    /// modifier context across a wake-up.
    pub fn should_sleep(&self, keys: &Debouncer, now: u32, timing: &Timing) -> bool {
        let idle = now.wrapping_sub(keys.last_activity());
        idle > timing.sleep_threshold_ms && !modifier_held(keys)
    }

    /// Park the rows, block until a key wakes the board, restore the rows.
    ///
    /// The waking key is not known here; the next scan pass finds it.
    pub fn suspend<B: Board>(&self, board: &mut B) {
        info!("idle, suspending");
        prepare_for_sleep(board);
        board.suspend_until_wake();
        restore_for_scan(board);
        info!("woke up");
    }
}

impl Default for PowerController {
    fn default() -> Self {
        Self::new()
    }
}

/// All five gesture cells are currently pressed.
pub fn panic_gesture_held(keys: &Debouncer) -> bool {
    PANIC_GESTURE
        .iter()
        .all(|&(row, col)| KEYS[row][col].is_some() && keys.is_pressed(row, col))
}

/// Any Shift/Ctrl/Alt/Meta cell is currently pressed. Gaps are skipped.
pub fn modifier_held(keys: &Debouncer) -> bool {
    for row in 0..ROWS {
        for col in 0..COLS {
            if let Some(key) = KEYS[row][col] {
                if key.role.is_modifier() && keys.is_pressed(row, col) {
                    return true;
                }
            }
        }
    }
    false
}

/// Select every row so that closing any switch drives its column active,
/// which is the wake source.
fn prepare_for_sleep<B: Board>(board: &mut B) {
    for row in 0..ROWS {
        board.drive_row(row, Level::Active);
    }
}

/// Deselect every row. Scanning selects one row at a time from here.
fn restore_for_scan<B: Board>(board: &mut B) {
    for row in 0..ROWS {
        board.drive_row(row, Level::Inactive);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimBoard;

    fn press_all(keys: &mut Debouncer, cells: &[(usize, usize)], now: u32) {
        for &(row, col) in cells {
            keys.update(row, col, true, now);
        }
    }

    #[test]
    fn panic_needs_all_five_keys() {
        let mut keys = Debouncer::new();
        let mut power = PowerController::new();
        press_all(&mut keys, &PANIC_GESTURE[..4], 0);
        assert!(!power.check_panic(&keys));

        press_all(&mut keys, &PANIC_GESTURE[4..], 1);
        assert!(power.check_panic(&keys));
    }

    #[test]
    fn panic_latch_survives_release() {
        let mut keys = Debouncer::new();
        let mut power = PowerController::new();
        press_all(&mut keys, &PANIC_GESTURE, 0);
        power.check_panic(&keys);
        for &(row, col) in PANIC_GESTURE.iter() {
            keys.update(row, col, false, 10);
        }
        assert!(power.check_panic(&keys));
        assert!(power.is_halted());
    }

    #[test]
    fn sleeps_only_after_threshold() {
        let keys = Debouncer::new();
        let power = PowerController::new();
        let t = Timing::DEFAULT;
        assert!(!power.should_sleep(&keys, t.sleep_threshold_ms, &t));
        assert!(power.should_sleep(&keys, t.sleep_threshold_ms + 1, &t));
    }

    #[test]
    fn activity_resets_idle_timer() {
        let mut keys = Debouncer::new();
        let power = PowerController::new();
        let t = Timing::DEFAULT;
        keys.update(1, 1, true, 20_000);
        keys.update(1, 1, false, 20_100);
        assert!(!power.should_sleep(&keys, 40_000, &t));
        assert!(power.should_sleep(&keys, 50_101, &t));
    }

    #[test]
    fn held_modifier_blocks_sleep() {
        let mut keys = Debouncer::new();
        let power = PowerController::new();
        let t = Timing::DEFAULT;
        // Left shift.
        keys.update(3, 0, true, 0);
        assert!(modifier_held(&keys));
        assert!(!power.should_sleep(&keys, 10_000_000, &t));
    }

    #[test]
    fn held_caps_lock_does_not_block_sleep() {
        let mut keys = Debouncer::new();
        let power = PowerController::new();
        let t = Timing::DEFAULT;
        keys.update(2, 0, true, 0);
        assert!(!modifier_held(&keys));
        assert!(power.should_sleep(&keys, 60_000, &t));
    }

    #[test]
    fn suspend_parks_and_restores_rows() {
        let mut board = SimBoard::new();
        PowerController::new().suspend(&mut board);
        assert_eq!(board.suspends, 1);
        assert_eq!(board.rows_at_suspend, Some([Level::Active; ROWS]));
        assert_eq!(board.rows, [Level::Inactive; ROWS]);
    }
}
