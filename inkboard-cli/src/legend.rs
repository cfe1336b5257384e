//! Keycap legends by logical index, for display only. What a key actually
//! types is decided by the receiver.

use inkboard_core::keymap::MAX_INDEX;

static LEGENDS: [&str; MAX_INDEX as usize + 1] = [
    // row 0
    "Esc", "1", "2", "3", "4", "5", "6", "7", "8", "9", "0", "-", "=", "Bksp",
    // row 1
    "Tab", "Q", "W", "E", "R", "T", "Y", "U", "I", "O", "P", "[", "]", "\\",
    // row 2
    "Caps", "A", "S", "D", "F", "G", "H", "J", "K", "L", ";", "'", "Ent",
    // row 3
    "Shft", "Z", "X", "C", "V", "B", "N", "M", ",", ".", "/", "Shft",
    // row 4
    "Ctrl", "Meta", "Alt", "Spc", "\u{2190}", "\u{2193}", "\u{2191}", "\u{2192}",
];

pub fn legend(index: u8) -> &'static str {
    LEGENDS.get(index as usize).copied().unwrap_or("?")
}
