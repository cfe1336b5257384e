//! USART1 transmitter, the keyboard's only output.
//!
//! 9600 baud, 8N1, TX only on PD3. Bytes go out raw with no framing.

use avr_device::atmega32u4::Peripherals;

use crate::CPU_HZ;

pub const BAUD: u32 = 9600;

/// UBRR for normal-speed mode: F_CPU / (16 * baud) - 1.
const UBRR: u16 = (CPU_HZ / (16 * BAUD) - 1) as u16;

// UCSR1A
const UDRE1: u8 = 1 << 5;
const TXC1: u8 = 1 << 6;
// UCSR1B
const TXEN1: u8 = 1 << 3;
// UCSR1C: 8 data bits, no parity, 1 stop bit
const UCSZ_8N1: u8 = 0x06;

pub struct Usart {
    /// A byte was written and TXC1 has not been observed since.
    pending: bool,
}

impl Usart {
    pub const fn new() -> Self {
        Self { pending: false }
    }

    pub fn init(&mut self, dp: &Peripherals) {
        let usart = &dp.USART1;
        usart.ubrr1.write(|w| unsafe { w.bits(UBRR) });
        usart.ucsr1a.write(|w| unsafe { w.bits(0) });
        usart.ucsr1c.write(|w| unsafe { w.bits(UCSZ_8N1) });
        usart.ucsr1b.write(|w| unsafe { w.bits(TXEN1) });
        self.pending = false;
    }

    /// Queue one byte, waiting for room in the data register.
    pub fn write_byte(&mut self, dp: &Peripherals, byte: u8) {
        let usart = &dp.USART1;
        while usart.ucsr1a.read().bits() & UDRE1 == 0 {}
        // Writing a one clears TXC1 so `flush` sees only this byte finish.
        usart.ucsr1a.write(|w| unsafe { w.bits(TXC1) });
        usart.udr1.write(|w| unsafe { w.bits(byte) });
        self.pending = true;
    }

    /// Wait until the last byte has left the shift register.
    ///
    /// Power-down stops the USART clock, so this runs before sleeping.
    pub fn flush(&mut self, dp: &Peripherals) {
        if !self.pending {
            return;
        }
        while dp.USART1.ucsr1a.read().bits() & TXC1 == 0 {}
        self.pending = false;
    }
}
