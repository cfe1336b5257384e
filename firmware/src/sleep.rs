//! Power-down with watchdog-paced wake checks.
//!
//! Only PORTB has pin-change interrupts on the ATmega32U4, so a keypress on
//! the other columns cannot wake the chip by itself. Instead the watchdog
//! interrupt wakes it every 16ms; if no column is pulled low it goes
//! straight back to sleep. The switch stays closed, so the next scan still
//! sees it.

use avr_device::atmega32u4::Peripherals;

use crate::{clock, matrix};

/// Watchdog timeout with WDP = 0.
const WDT_PERIOD_MS: u32 = 16;

// WDTCSR
const WDIE: u8 = 1 << 6;
const WDCE: u8 = 1 << 4;
const WDE: u8 = 1 << 3;
// MCUSR
const WDRF: u8 = 1 << 3;
// SMCR: SM1 (power-down) | SE
const POWER_DOWN: u8 = 0x04;
const SE: u8 = 0x01;

#[avr_device::interrupt(atmega32u4)]
fn WDT() {
    clock::advance(WDT_PERIOD_MS);
}

/// Sleep until a column is pulled low. Rows must already be selected.
pub fn suspend_until_wake(dp: &Peripherals) {
    while !matrix::any_column_active(dp) {
        watchdog_interrupt(dp, true);
        power_down(dp);
    }
    watchdog_interrupt(dp, false);
}

/// Park the CPU for good. Nothing re-enables interrupts after this.
pub fn halt_forever(dp: &Peripherals) -> ! {
    avr_device::interrupt::disable();
    watchdog_interrupt(dp, false);
    dp.CPU.smcr.write(|w| unsafe { w.bits(POWER_DOWN | SE) });
    loop {
        avr_device::asm::sleep();
    }
}

fn power_down(dp: &Peripherals) {
    dp.CPU.smcr.write(|w| unsafe { w.bits(POWER_DOWN | SE) });
    avr_device::asm::sleep();
    dp.CPU.smcr.write(|w| unsafe { w.bits(0) });
}

/// Switch the watchdog between interrupt mode (16ms) and off.
///
/// WDTCSR changes need the timed WDCE sequence, so interrupts stay off
/// for its duration.
fn watchdog_interrupt(dp: &Peripherals, enabled: bool) {
    avr_device::interrupt::free(|_| {
        avr_device::asm::wdr();
        dp.CPU.mcusr.modify(|r, w| unsafe { w.bits(r.bits() & !WDRF) });
        dp.WDT.wdtcsr.write(|w| unsafe { w.bits(WDCE | WDE) });
        let value = if enabled { WDIE } else { 0 };
        dp.WDT.wdtcsr.write(|w| unsafe { w.bits(value) });
    });
}
