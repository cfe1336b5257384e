//! Key matrix wiring on the Teensy 2.0 (ATmega32U4).
//!
//! Rows are driven outputs, active low. Columns are inputs with pull-ups;
//! a closed switch on a selected row pulls its column low.
//!
//!   Rows:    PF0, PF1, PF4, PF5, PF6
//!   Columns: PB0-PB7, PD0, PD1, PD4, PD5, PD7, PC6
//!
//! PD3 is USART1 TX and PD6 is the on-board LED, so neither is used here.

use avr_device::atmega32u4::Peripherals;

use inkboard_core::{COLS, ROWS};

/// PORTF bit for each row.
const ROW_BITS: [u8; ROWS] = [0x01, 0x02, 0x10, 0x20, 0x40];
const ROW_MASK: u8 = 0x73;

#[derive(Copy, Clone)]
enum Port {
    B,
    C,
    D,
}

/// Port and bit for each column.
const COL_PINS: [(Port, u8); COLS] = [
    (Port::B, 0x01),
    (Port::B, 0x02),
    (Port::B, 0x04),
    (Port::B, 0x08),
    (Port::B, 0x10),
    (Port::B, 0x20),
    (Port::B, 0x40),
    (Port::B, 0x80),
    (Port::D, 0x01),
    (Port::D, 0x02),
    (Port::D, 0x10),
    (Port::D, 0x20),
    (Port::D, 0x80),
    (Port::C, 0x40),
];
const COL_MASK_B: u8 = 0xFF;
const COL_MASK_C: u8 = 0x40;
const COL_MASK_D: u8 = 0xB3;

/// Configure row outputs (all deselected) and column inputs with pull-ups.
pub fn init_gpio(dp: &Peripherals) {
    // PF4-PF6 share pins with JTAG. JTD has to be written twice within
    // four cycles to release them.
    dp.CPU.mcucr.modify(|r, w| unsafe { w.bits(r.bits() | 0x80) });
    dp.CPU.mcucr.modify(|r, w| unsafe { w.bits(r.bits() | 0x80) });

    dp.PORTF.ddrf.modify(|r, w| unsafe { w.bits(r.bits() | ROW_MASK) });
    dp.PORTF.portf.modify(|r, w| unsafe { w.bits(r.bits() | ROW_MASK) });

    dp.PORTB.ddrb.modify(|r, w| unsafe { w.bits(r.bits() & !COL_MASK_B) });
    dp.PORTB.portb.modify(|r, w| unsafe { w.bits(r.bits() | COL_MASK_B) });
    dp.PORTC.ddrc.modify(|r, w| unsafe { w.bits(r.bits() & !COL_MASK_C) });
    dp.PORTC.portc.modify(|r, w| unsafe { w.bits(r.bits() | COL_MASK_C) });
    dp.PORTD.ddrd.modify(|r, w| unsafe { w.bits(r.bits() & !COL_MASK_D) });
    dp.PORTD.portd.modify(|r, w| unsafe { w.bits(r.bits() | COL_MASK_D) });
}

/// Select (drive low) or deselect (drive high) one row.
pub fn drive_row(dp: &Peripherals, row: usize, selected: bool) {
    let bit = ROW_BITS[row];
    if selected {
        dp.PORTF.portf.modify(|r, w| unsafe { w.bits(r.bits() & !bit) });
    } else {
        dp.PORTF.portf.modify(|r, w| unsafe { w.bits(r.bits() | bit) });
    }
    tiny_delay();
}

/// True if the column is pulled low by a closed switch.
pub fn column_active(dp: &Peripherals, col: usize) -> bool {
    let (port, bit) = COL_PINS[col];
    let pins = match port {
        Port::B => dp.PORTB.pinb.read().bits(),
        Port::C => dp.PORTC.pinc.read().bits(),
        Port::D => dp.PORTD.pind.read().bits(),
    };
    pins & bit == 0
}

pub fn any_column_active(dp: &Peripherals) -> bool {
    (0..COLS).any(|col| column_active(dp, col))
}

/// Short delay for pin settling (~5us at 16MHz).
#[inline(always)]
fn tiny_delay() {
    for _ in 0..20u8 {
        unsafe { core::arch::asm!("nop") };
    }
}
