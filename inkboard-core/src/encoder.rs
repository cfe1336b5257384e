//! Edge-to-byte encoding and the key repeat policy.

use crate::config::Timing;
use crate::debounce::{Edge, RepeatClock};
use crate::keymap::{Key, Role};

/// Byte to send for an edge, if any.
///
/// Ordinary keys and Caps Lock send their index on press and nothing on
/// release; the protocol has no generic key-up. Modifiers send their
/// down/up signal.
pub fn encode_edge(key: Key, edge: Edge) -> Option<u8> {
    match (key.role, edge) {
        (Role::Ordinary | Role::CapsLock, Edge::Press) => Some(key.index),
        (Role::Ordinary | Role::CapsLock, Edge::Release) => None,
        (Role::Modifier(m), Edge::Press) => Some(m.down_byte()),
        (Role::Modifier(m), Edge::Release) => Some(m.up_byte()),
    }
}

/// Check a held key for a due repeat.
///
/// The first repeat waits `initial_repeat_delay_ms` from the press; later
/// ones wait `repeat_interval_ms` from the previous repeat. The clock of a
/// held key comes from [`Debouncer::held_clock_mut`]; its transition time is
/// the anchor and is moved forward on every repeat.
///
/// [`Debouncer::held_clock_mut`]: crate::debounce::Debouncer::held_clock_mut
pub fn poll_repeat(key: Key, clock: &mut RepeatClock, now: u32, timing: &Timing) -> Option<u8> {
    if !key.role.repeats() {
        return None;
    }

    let held = now.wrapping_sub(clock.last_transition);
    let due = if clock.armed {
        timing.repeat_interval_ms
    } else {
        timing.initial_repeat_delay_ms
    };
    if held < due {
        return None;
    }

    clock.last_transition = now;
    clock.armed = true;
    Some(key.index)
}
