//! The byte stream sent to the receiver.
//!
//! - `0..=60`: literal key index, sent on press and on every repeat
//! - `0x80..=0x87`: modifier down/up signals
//!
//! Ordinary keys have no release byte. The receiver sees a key once per
//! press or repeat and nothing when it is let go. There is no framing or
//! checksum; every byte stands alone.

use crate::keymap::MAX_INDEX;

pub const SHIFT_DOWN: u8 = 0x80;
pub const SHIFT_UP: u8 = 0x81;
pub const CTRL_DOWN: u8 = 0x82;
pub const CTRL_UP: u8 = 0x83;
pub const ALT_DOWN: u8 = 0x84;
pub const ALT_UP: u8 = 0x85;
pub const META_DOWN: u8 = 0x86;
pub const META_UP: u8 = 0x87;

/// Modifier keys, signalled with explicit down/up bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Modifier {
    Shift,
    Ctrl,
    Alt,
    Meta,
}

impl Modifier {
    pub const ALL: [Modifier; 4] = [
        Modifier::Shift,
        Modifier::Ctrl,
        Modifier::Alt,
        Modifier::Meta,
    ];

    pub const fn down_byte(self) -> u8 {
        match self {
            Modifier::Shift => SHIFT_DOWN,
            Modifier::Ctrl => CTRL_DOWN,
            Modifier::Alt => ALT_DOWN,
            Modifier::Meta => META_DOWN,
        }
    }

    pub const fn up_byte(self) -> u8 {
        match self {
            Modifier::Shift => SHIFT_UP,
            Modifier::Ctrl => CTRL_UP,
            Modifier::Alt => ALT_UP,
            Modifier::Meta => META_UP,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Modifier::Shift => "shift",
            Modifier::Ctrl => "ctrl",
            Modifier::Alt => "alt",
            Modifier::Meta => "meta",
        }
    }
}

/// One decoded byte of the stream.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WireEvent {
    Key(u8),
    ModifierDown(Modifier),
    ModifierUp(Modifier),
    /// Not part of the protocol; line noise or a baud mismatch.
    Unknown(u8),
}

impl WireEvent {
    pub fn decode(byte: u8) -> WireEvent {
        if byte <= MAX_INDEX {
            return WireEvent::Key(byte);
        }
        for m in Modifier::ALL {
            if byte == m.down_byte() {
                return WireEvent::ModifierDown(m);
            }
            if byte == m.up_byte() {
                return WireEvent::ModifierUp(m);
            }
        }
        WireEvent::Unknown(byte)
    }

    pub fn encode(self) -> u8 {
        match self {
            WireEvent::Key(index) => index,
            WireEvent::ModifierDown(m) => m.down_byte(),
            WireEvent::ModifierUp(m) => m.up_byte(),
            WireEvent::Unknown(byte) => byte,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::NO_KEY;

    #[test]
    fn signal_bytes_are_outside_key_range() {
        for m in Modifier::ALL {
            assert!(m.down_byte() > MAX_INDEX);
            assert!(m.up_byte() > MAX_INDEX);
            assert_ne!(m.down_byte(), m.up_byte());
        }
    }

    #[test]
    fn signal_bytes_are_distinct() {
        let mut bytes = Vec::new();
        for m in Modifier::ALL {
            bytes.push(m.down_byte());
            bytes.push(m.up_byte());
        }
        bytes.sort();
        bytes.dedup();
        assert_eq!(bytes.len(), 8);
    }

    #[test]
    fn decode_classifies_bytes() {
        assert_eq!(WireEvent::decode(0), WireEvent::Key(0));
        assert_eq!(WireEvent::decode(60), WireEvent::Key(60));
        assert_eq!(WireEvent::decode(0x80), WireEvent::ModifierDown(Modifier::Shift));
        assert_eq!(WireEvent::decode(0x87), WireEvent::ModifierUp(Modifier::Meta));
        assert_eq!(WireEvent::decode(61), WireEvent::Unknown(61));
        assert_eq!(WireEvent::decode(NO_KEY), WireEvent::Unknown(NO_KEY));
    }

    #[test]
    fn encode_inverts_decode_for_protocol_bytes() {
        for byte in (0..=MAX_INDEX).chain(SHIFT_DOWN..=META_UP) {
            assert_eq!(WireEvent::decode(byte).encode(), byte);
        }
    }
}
