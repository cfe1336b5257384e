//! Human-readable view of the keyboard's byte stream.

use anyhow::{Context, Result};
use inkboard_core::{Modifier, WireEvent};
use std::io::{Read, Write};

use crate::legend::legend;

/// Tracks which modifiers the receiver currently considers held.
#[derive(Default)]
pub struct Monitor {
    held: [bool; 4],
}

fn slot(m: Modifier) -> usize {
    match m {
        Modifier::Shift => 0,
        Modifier::Ctrl => 1,
        Modifier::Alt => 2,
        Modifier::Meta => 3,
    }
}

impl Monitor {
    /// Describe one byte and update modifier state.
    pub fn describe(&mut self, byte: u8) -> String {
        match WireEvent::decode(byte) {
            WireEvent::Key(index) => {
                let mut line = String::new();
                for m in Modifier::ALL {
                    if self.held[slot(m)] {
                        line.push_str(m.name());
                        line.push('+');
                    }
                }
                format!("key {:2} {}{}", index, line, legend(index))
            }
            WireEvent::ModifierDown(m) => {
                self.held[slot(m)] = true;
                format!("{} down", m.name())
            }
            WireEvent::ModifierUp(m) => {
                self.held[slot(m)] = false;
                format!("{} up", m.name())
            }
            WireEvent::Unknown(b) => format!("unknown byte 0x{:02X}", b),
        }
    }
}

/// Decode bytes from `input` until end of stream, one line per byte.
pub fn run(mut input: impl Read, mut output: impl Write, raw: bool) -> Result<()> {
    let mut monitor = Monitor::default();
    let mut buf = [0u8; 64];
    loop {
        let n = input.read(&mut buf).context("reading byte stream")?;
        if n == 0 {
            break;
        }
        for &byte in &buf[..n] {
            let text = monitor.describe(byte);
            if raw {
                writeln!(output, "{:02X}  {}", byte, text)?;
            } else {
                writeln!(output, "{}", text)?;
            }
        }
        output.flush()?;
    }
    Ok(())
}
