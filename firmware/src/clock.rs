//! Millisecond clock on Timer0.
//!
//! CTC mode, prescaler 64, OCR0A = 249: one compare match per millisecond
//! at 16MHz. Timer0 stops in power-down, so the watchdog handler credits
//! the time spent asleep through [`advance`].

use core::cell::Cell;

use avr_device::atmega32u4::Peripherals;
use avr_device::interrupt::Mutex;

static MILLIS: Mutex<Cell<u32>> = Mutex::new(Cell::new(0));

const TICKS_PER_MS: u8 = 250;
// TCCR0A: WGM01 (CTC)
const CTC: u8 = 0x02;
// TCCR0B: CS01 | CS00 (clk/64)
const PRESCALE_64: u8 = 0x03;
// TIMSK0: OCIE0A
const OCIE0A: u8 = 0x02;

pub fn init(dp: &Peripherals) {
    let tc0 = &dp.TC0;
    tc0.tccr0a.write(|w| unsafe { w.bits(CTC) });
    tc0.ocr0a.write(|w| unsafe { w.bits(TICKS_PER_MS - 1) });
    tc0.tccr0b.write(|w| unsafe { w.bits(PRESCALE_64) });
    tc0.timsk0.write(|w| unsafe { w.bits(OCIE0A) });
}

#[avr_device::interrupt(atmega32u4)]
fn TIMER0_COMPA() {
    advance(1);
}

pub fn now() -> u32 {
    avr_device::interrupt::free(|cs| MILLIS.borrow(cs).get())
}

pub fn advance(ms: u32) {
    avr_device::interrupt::free(|cs| {
        let millis = MILLIS.borrow(cs);
        millis.set(millis.get().wrapping_add(ms));
    });
}

/// Busy-wait. Needs interrupts enabled.
pub fn delay_ms(ms: u32) {
    let start = now();
    while now().wrapping_sub(start) < ms {}
}
