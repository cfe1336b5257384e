//! Grid-to-index table and key roles.
//!
//! The matrix is 5 rows × 14 columns. Every physical switch has a logical
//! index in `0..=60`; positions without a switch hold [`NO_KEY`]. The index
//! is what goes out on the wire for ordinary keys, so this table is the
//! contract with the receiver.

use crate::protocol::Modifier;

/// Number of rows in the matrix.
pub const ROWS: usize = 5;
/// Number of columns in the matrix.
pub const COLS: usize = 14;

/// Marks a grid position with no physical switch.
pub const NO_KEY: u8 = 255;
/// Highest logical index in use.
pub const MAX_INDEX: u8 = 60;

// Reserved logical indices that carry a role other than `Ordinary`.
const CAPS_LOCK: u8 = 28;
const LEFT_SHIFT: u8 = 41;
const RIGHT_SHIFT: u8 = 52;
const CTRL: u8 = 53;
const META: u8 = 54;
const ALT: u8 = 55;

const __: u8 = NO_KEY;

/// Logical index of each matrix position.
///
/// ```text
/// row 0: Esc 1 2 3 4 5 6 7 8 9 0 - = Bksp
/// row 1: Tab Q W E R T Y U I O P [ ] \
/// row 2: Caps A S D F G H J K L ; ' Enter
/// row 3: Shift Z X C V B N M , . / Shift
/// row 4: Ctrl Meta Alt       Space       Left Down Up Right
/// ```
pub static INDEX_TABLE: [[u8; COLS]; ROWS] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13],
    [14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27],
    [28, 29, 30, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40, __],
    [41, 42, 43, 44, 45, 46, 47, 48, 49, 50, 51, 52, __, __],
    [53, 54, 55, __, __, __, 56, __, __, __, 57, 58, 59, 60],
];

/// The five cells that make up the panic gesture: Esc plus the four arrows.
pub const PANIC_GESTURE: [(usize, usize); 5] = [(0, 0), (4, 10), (4, 11), (4, 12), (4, 13)];

/// What a key does when pressed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Role {
    /// Sends its index on press and repeats while held.
    Ordinary,
    /// Sends explicit down/up signal bytes, never repeats.
    Modifier(Modifier),
    /// Sends its index on press like an ordinary key, never repeats.
    CapsLock,
}

impl Role {
    /// Role reserved for a logical index.
    pub const fn for_index(index: u8) -> Role {
        match index {
            CAPS_LOCK => Role::CapsLock,
            LEFT_SHIFT | RIGHT_SHIFT => Role::Modifier(Modifier::Shift),
            CTRL => Role::Modifier(Modifier::Ctrl),
            ALT => Role::Modifier(Modifier::Alt),
            META => Role::Modifier(Modifier::Meta),
            _ => Role::Ordinary,
        }
    }

    pub fn is_modifier(self) -> bool {
        matches!(self, Role::Modifier(_))
    }

    /// Only ordinary keys take part in auto-repeat.
    pub fn repeats(self) -> bool {
        self == Role::Ordinary
    }
}

/// A physical switch: its wire index and its role.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Key {
    pub index: u8,
    pub role: Role,
}

/// Per-position key lookup, resolved once at compile time.
pub static KEYS: [[Option<Key>; COLS]; ROWS] = build_keys();

const fn build_keys() -> [[Option<Key>; COLS]; ROWS] {
    let mut keys = [[None; COLS]; ROWS];
    let mut row = 0;
    while row < ROWS {
        let mut col = 0;
        while col < COLS {
            let index = INDEX_TABLE[row][col];
            if index != NO_KEY {
                assert!(index <= MAX_INDEX, "logical index out of wire range");
                keys[row][col] = Some(Key {
                    index,
                    role: Role::for_index(index),
                });
            }
            col += 1;
        }
        row += 1;
    }
    keys
}

/// Key at a matrix position, or `None` for a gap.
#[inline]
pub fn key_at(row: usize, col: usize) -> Option<Key> {
    KEYS[row][col]
}
