// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![allow(unused_unsafe)]

use crate::{
    SYSTEM,
    hw::{F_CPU, mcu},
    lcd::Lcd,
    motor::MOTOR,
    ports::{DEBUG, PORTS},
};
use dcrpm::mutex::{IrqCtx, LazyMainInit, MainCtx};

/// Tick timer prescaler.
const TICK_PRESCALER: u32 = 128;
/// Tick period.
pub const TICK_US: u32 = 1000;
/// CTC TOP value for one tick.
const TICK_TOP: u8 = (F_CPU / TICK_PRESCALER / (1_000_000 / TICK_US) - 1) as u8;

/// CTC mode.
const TCCR2A_CTC: u8 = 0x02;
/// CS2 = 0b101 -> clk/128.
const TCCR2B_DIV128: u8 = 0x05;
/// OCIE2A.
const TIMSK2_OCIE2A: u8 = 0x02;

#[allow(non_snake_case)]
pub struct Dp {
    pub TC2: mcu::TC2,
}

// SAFETY: Is initialized when constructing the MainCtx.
pub static DP: LazyMainInit<Dp> = unsafe { LazyMainInit::uninit() };

impl Dp {
    /// Start the 1 ms tick.
    /// The tick interrupt fires as soon as interrupts are enabled.
    pub fn setup(&self, _m: &MainCtx) {
        // SAFETY: Called before interrupts are enabled.
        //         The register values are valid configurations.
        unsafe {
            self.TC2.assr().write(|w| w.bits(0x00));
            self.TC2.tccr2a().write(|w| w.bits(TCCR2A_CTC));
            self.TC2.tcnt2().write(|w| w.bits(0));
            self.TC2.ocr2a().write(|w| w.bits(TICK_TOP));
            self.TC2.tifr2().write(|w| w.bits(0x07));
            self.TC2.timsk2().write(|w| w.bits(TIMSK2_OCIE2A));
            self.TC2.tccr2b().write(|w| w.bits(TCCR2B_DIV128));
        }
    }
}

pub fn irq_handler_timer2_compa(c: &IrqCtx) {
    let ports = PORTS.deref_irq(c);
    let motor = MOTOR.deref_irq(c);
    let mut lcd = Lcd::new(ports);

    let report = SYSTEM.tick(c, motor, &mut lcd);

    if report.lcd_ready {
        ports.set_led(true);
    }
    if cfg!(feature = "debug") && report.control.is_some() {
        ports.portd_set(DEBUG, !ports.portd_get(DEBUG));
    }
}

// vim: ts=4 sw=4 expandtab
