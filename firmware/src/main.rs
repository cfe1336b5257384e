//! Inkboard keyboard firmware for ATmega32U4 (Teensy 2.0).
//!
//! Scans a 5×14 matrix and sends each press, repeat and modifier change as
//! one raw byte over USART1. The scan state machine lives in
//! `inkboard-core`; this crate only brings up the chip and implements its
//! `Board` trait.

#![no_std]
#![no_main]
#![feature(abi_avr_interrupt)]
#![feature(asm_experimental_arch)]

mod board;
mod clock;
mod matrix;
mod serial;
mod sleep;

use avr_device::atmega32u4::Peripherals;

use inkboard_core::{Cycle, Scanner, Timing};

use board::Teensy;
use serial::Usart;

/// CPU clock after the prescaler is cleared.
pub const CPU_HZ: u32 = 16_000_000;

/// Pause between scan passes.
const SCAN_INTERVAL_MS: u32 = 1;

/// Panic handler — on AVR we just loop forever.
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {}
}

/// Main entry point.
#[no_mangle]
pub extern "C" fn main() -> ! {
    let dp = unsafe { Peripherals::steal() };

    // Disable clock prescaler (CLKPR) for the full 16MHz
    dp.CPU.clkpr.write(|w| w.clkpce().set_bit());
    dp.CPU.clkpr.write(|w| unsafe { w.bits(0) });

    shut_down_unused(&dp);

    // LED on PD6 for diagnostics
    dp.PORTD.ddrd.modify(|r, w| unsafe { w.bits(r.bits() | 0x40) });

    matrix::init_gpio(&dp);
    clock::init(&dp);

    let mut usart = Usart::new();
    usart.init(&dp);

    unsafe { avr_device::interrupt::enable() };

    let board = Teensy::new(dp, usart);
    board.set_led(true);

    let mut scanner = Scanner::new(board, Timing::DEFAULT);

    loop {
        match scanner.run_cycle() {
            Cycle::Scanned | Cycle::Slept => {}
            Cycle::Halted => {
                let board = scanner.board_mut();
                board.set_led(false);
                sleep::halt_forever(board.peripherals());
            }
        }

        clock::delay_ms(SCAN_INTERVAL_MS);
    }
}

/// Turn off everything the keyboard does not use: USB, ADC, analog
/// comparator, TWI, SPI and the spare timers. Timer0 and USART1 stay on.
fn shut_down_unused(dp: &Peripherals) {
    dp.USB_DEVICE.udcon.write(|w| w.detach().set_bit());
    dp.USB_DEVICE.usbcon.write(|w| w.frzclk().set_bit());
    dp.PLL.pllcsr.write(|w| unsafe { w.bits(0) });

    dp.ADC.adcsra.write(|w| unsafe { w.bits(0) });
    // ACD
    dp.AC.acsr.write(|w| unsafe { w.bits(0x80) });

    // PRR0: PRTWI | PRTIM1 | PRSPI | PRADC
    dp.CPU.prr0.write(|w| unsafe { w.bits(0x8D) });
    // PRR1: PRUSB | PRTIM4 | PRTIM3
    dp.CPU.prr1.write(|w| unsafe { w.bits(0x98) });
}
