// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![allow(unused_unsafe)]

use crate::{
    hw::delay_us,
    ports::{LCD_E, LCD_RS, LCD_RW, Ports},
};
use dcrpm::hal::LcdBus;

/// Enable pulse width and data setup time.
const STROBE_US: u8 = 1;
/// Execution time of a data write and of most instructions.
const SETTLE_US: u8 = 40;
/// HD44780 busy flag.
const BUSY_FLAG: u8 = 0x80;

/// HD44780 on an 8 bit parallel bus.
pub struct Lcd<'a> {
    ports: &'a Ports,
}

impl<'a> Lcd<'a> {
    pub fn new(ports: &'a Ports) -> Self {
        Self { ports }
    }

    fn write(&mut self, rs: bool, byte: u8) {
        let p = self.ports;
        p.portd_set(LCD_RS, rs);
        p.portd_set(LCD_RW, false);
        p.portd_set(LCD_E, true);
        p.lcd_bus_write(byte);
        delay_us(STROBE_US);
        // Falling edge latches the byte.
        p.portd_set(LCD_E, false);
        delay_us(SETTLE_US);
    }
}

impl LcdBus for Lcd<'_> {
    fn write_command(&mut self, cmd: u8) {
        self.write(false, cmd);
    }

    fn write_data(&mut self, data: u8) {
        self.write(true, data);
    }

    fn is_ready(&self) -> bool {
        let p = self.ports;

        // Bus to input with pull-ups.
        // A missing display reads as busy.
        // SAFETY: All bit patterns are valid port values.
        p.PORTC.ddrc().write(|w| unsafe { w.bits(0x00) });
        p.PORTC.portc().write(|w| unsafe { w.bits(0xFF) });

        p.portd_set(LCD_RS, false);
        p.portd_set(LCD_RW, true);
        p.portd_set(LCD_E, true);
        delay_us(STROBE_US);
        let status = p.PORTC.pinc().read().bits();
        p.portd_set(LCD_E, false);
        p.portd_set(LCD_RW, false);

        // SAFETY: All bit patterns are valid port values.
        p.PORTC.portc().write(|w| unsafe { w.bits(0x00) });
        p.PORTC.ddrc().write(|w| unsafe { w.bits(0xFF) });

        status & BUSY_FLAG == 0
    }
}

// vim: ts=4 sw=4 expandtab
