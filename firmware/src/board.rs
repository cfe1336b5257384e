//! The Teensy side of [`inkboard_core::Board`].

use avr_device::atmega32u4::Peripherals;

use inkboard_core::{Board, Level};

use crate::serial::Usart;
use crate::{clock, matrix, sleep};

/// On-board LED, PD6.
const LED: u8 = 0x40;

pub struct Teensy {
    dp: Peripherals,
    usart: Usart,
}

impl Teensy {
    pub fn new(dp: Peripherals, usart: Usart) -> Self {
        Self { dp, usart }
    }

    pub fn peripherals(&self) -> &Peripherals {
        &self.dp
    }

    pub fn set_led(&self, on: bool) {
        let portd = &self.dp.PORTD.portd;
        if on {
            portd.modify(|r, w| unsafe { w.bits(r.bits() | LED) });
        } else {
            portd.modify(|r, w| unsafe { w.bits(r.bits() & !LED) });
        }
    }
}

impl Board for Teensy {
    fn drive_row(&mut self, row: usize, level: Level) {
        matrix::drive_row(&self.dp, row, level == Level::Active);
    }

    fn read_column(&mut self, col: usize) -> Level {
        if matrix::column_active(&self.dp, col) {
            Level::Active
        } else {
            Level::Inactive
        }
    }

    fn now(&mut self) -> u32 {
        clock::now()
    }

    fn emit(&mut self, byte: u8) {
        self.usart.write_byte(&self.dp, byte);
    }

    fn delay_ms(&mut self, ms: u32) {
        clock::delay_ms(ms);
    }

    fn suspend_until_wake(&mut self) {
        self.usart.flush(&self.dp);
        self.set_led(false);
        sleep::suspend_until_wake(&self.dp);
        self.set_led(true);
    }
}
