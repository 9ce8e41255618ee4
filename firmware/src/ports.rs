// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![allow(unused_unsafe)]

use crate::hw::mcu;
use dcrpm::mutex::{LazyMainInit, MainCtx};

/// LCD register select (PORTD).
pub const LCD_RS: u8 = 2;
/// LCD read/write (PORTD).
pub const LCD_RW: u8 = 3;
/// LCD enable strobe (PORTD).
pub const LCD_E: u8 = 4;
/// Debug pin (PORTD).
pub const DEBUG: u8 = 6;
/// Status LED, active low (PORTD).
pub const LED: u8 = 7;

#[allow(non_snake_case)]
pub struct Ports {
    pub PORTA: mcu::PORTA,
    pub PORTB: mcu::PORTB,
    /// LCD data bus DB0..DB7.
    pub PORTC: mcu::PORTC,
    pub PORTD: mcu::PORTD,
}

// SAFETY: Is initialized when constructing the MainCtx.
pub static PORTS: LazyMainInit<Ports> = unsafe { LazyMainInit::uninit() };

fn pin_input(_bit: u8) -> u8 {
    0
}
fn pin_output(bit: u8) -> u8 {
    1 << bit
}
fn pin_low(_bit: u8) -> u8 {
    0
}
fn pin_high(bit: u8) -> u8 {
    1 << bit
}
fn pin_floating(_bit: u8) -> u8 {
    0
}

impl Ports {
    pub fn setup(&self, _m: &MainCtx) {
        // SAFETY: Called before interrupts are enabled.
        //         All bit patterns are valid port values.
        unsafe {
            self.PORTA.porta().write(|w| {
                w.bits(
                    pin_floating(0) | // setpoint, ADC0
                    pin_low(1) | pin_low(2) | pin_low(3) | // n/c
                    pin_low(4) | pin_low(5) | pin_low(6) | pin_low(7), // n/c
                )
            });
            self.PORTA.ddra().write(|w| {
                w.bits(
                    pin_input(0) | // setpoint, ADC0
                    pin_output(1) | pin_output(2) | pin_output(3) | // n/c
                    pin_output(4) | pin_output(5) | pin_output(6) | pin_output(7), // n/c
                )
            });

            self.PORTB.portb().write(|w| {
                w.bits(
                    pin_low(0) | // n/c
                    pin_floating(1) | // T1, motor pulses
                    pin_low(2) | // n/c
                    pin_low(3) | // OC0A, motor PWM
                    pin_low(4) | // n/c
                    pin_low(5) | // ISP MOSI
                    pin_low(6) | // ISP MISO
                    pin_low(7), // ISP SCK
                )
            });
            self.PORTB.ddrb().write(|w| {
                w.bits(
                    pin_output(0) | // n/c
                    pin_input(1) | // T1, motor pulses
                    pin_output(2) | // n/c
                    pin_output(3) | // OC0A, motor PWM
                    pin_output(4) | // n/c
                    pin_input(5) | // ISP MOSI
                    pin_input(6) | // ISP MISO
                    pin_input(7), // ISP SCK
                )
            });

            self.PORTC.portc().write(|w| w.bits(0));
            self.PORTC.ddrc().write(|w| w.bits(0xFF)); // LCD DB0..DB7

            self.PORTD.portd().write(|w| {
                w.bits(
                    pin_low(0) | pin_low(1) | // n/c
                    pin_low(LCD_RS) |
                    pin_low(LCD_RW) |
                    pin_low(LCD_E) |
                    pin_low(5) | // n/c
                    pin_low(DEBUG) |
                    pin_high(LED), // LED off
                )
            });
            self.PORTD.ddrd().write(|w| {
                w.bits(
                    pin_output(0) | pin_output(1) | // n/c
                    pin_output(LCD_RS) |
                    pin_output(LCD_RW) |
                    pin_output(LCD_E) |
                    pin_output(5) | // n/c
                    pin_output(DEBUG) |
                    pin_output(LED),
                )
            });
        }
    }

    #[inline(always)]
    pub fn portd_set(&self, bit: u8, value: bool) {
        self.PORTD.portd().modify(|r, w| {
            let bits = if value {
                r.bits() | (1 << bit)
            } else {
                r.bits() & !(1 << bit)
            };
            // SAFETY: All bit patterns are valid port values.
            unsafe { w.bits(bits) }
        });
    }

    #[inline(always)]
    pub fn portd_get(&self, bit: u8) -> bool {
        self.PORTD.portd().read().bits() & (1 << bit) != 0
    }

    #[inline(always)]
    pub fn lcd_bus_write(&self, data: u8) {
        // SAFETY: All bit patterns are valid port values.
        self.PORTC.portc().write(|w| unsafe { w.bits(data) });
    }

    /// Switch the status LED on or off.
    pub fn set_led(&self, on: bool) {
        self.portd_set(LED, !on);
    }
}

// vim: ts=4 sw=4 expandtab
