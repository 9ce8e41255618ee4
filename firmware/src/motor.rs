// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![allow(unused_unsafe)]

use crate::hw::mcu;
use dcrpm::{
    hal::SpeedIo,
    mutex::{CriticalSection, LazyMainInit, MainCtx},
};

/// AVcc reference, left adjusted result, ADC0.
const ADMUX_SETPOINT: u8 = 0x60;
/// ADEN, ADSC, ADATE (free running), prescaler 128.
const ADCSRA_RUN: u8 = 0xE7;
/// Fast PWM on OC0A, inverting: set on compare match, clear at BOTTOM.
/// A lower compare value gives a longer on-time.
const TCCR0A_PWM: u8 = 0xC3;
/// Prescaler 64 -> 976 Hz PWM.
const TCCR0B_PWM: u8 = 0x03;
/// External clock on T1, rising edge.
const TCCR1B_T1_RISING: u8 = 0x07;

/// Setpoint ADC, motor PWM (timer 0) and motor pulse counter (timer 1).
#[allow(non_snake_case)]
pub struct Motor {
    pub ADC: mcu::ADC,
    pub TC0: mcu::TC0,
    pub TC1: mcu::TC1,
}

// SAFETY: Is initialized when constructing the MainCtx.
pub static MOTOR: LazyMainInit<Motor> = unsafe { LazyMainInit::uninit() };

impl Motor {
    pub fn setup(&self, _m: &MainCtx) {
        // SAFETY: Called before interrupts are enabled.
        //         The register values are valid configurations.
        unsafe {
            // Setpoint input: free running conversion of ADC0.
            self.ADC.didr0().write(|w| w.bits(0x01));
            self.ADC.admux().write(|w| w.bits(ADMUX_SETPOINT));
            self.ADC.adcsrb().write(|w| w.bits(0x00));
            self.ADC.adcsra().write(|w| w.bits(ADCSRA_RUN));

            // Motor PWM. The duty register is set by the controller init.
            self.TC0.ocr0a().write(|w| w.bits(0xFF));
            self.TC0.tccr0a().write(|w| w.bits(TCCR0A_PWM));
            self.TC0.tccr0b().write(|w| w.bits(TCCR0B_PWM));

            // Pulse counter: stopped until the display is up.
            self.TC1.tccr1a().write(|w| w.bits(0x00));
            self.TC1.tccr1b().write(|w| w.bits(0x00));
            self.TC1.tccr1c().write(|w| w.bits(0x00));
            self.TC1.timsk1().write(|w| w.bits(0x00));
            self.TC1.tcnt1().write(|w| w.bits(0));
        }
    }
}

impl SpeedIo for Motor {
    fn read_analog_input(&self, _cs: CriticalSection<'_>) -> u16 {
        self.ADC.adc().read().bits()
    }

    fn read_pulse_counter(&self, _cs: CriticalSection<'_>) -> u16 {
        // 16 bit access through the TEMP register. Needs the cs.
        self.TC1.tcnt1().read().bits()
    }

    fn reset_pulse_counter(&self, _cs: CriticalSection<'_>) {
        // SAFETY: Any counter value is valid.
        self.TC1.tcnt1().write(|w| unsafe { w.bits(0) });
    }

    fn start_pulse_counter(&self, cs: CriticalSection<'_>) {
        self.reset_pulse_counter(cs);
        // SAFETY: Valid clock select configuration.
        self.TC1
            .tccr1b()
            .write(|w| unsafe { w.bits(TCCR1B_T1_RISING) });
    }

    fn duty_register(&self) -> u8 {
        self.TC0.ocr0a().read().bits()
    }

    fn set_duty_register(&self, duty: u8) {
        // SAFETY: Any compare value is valid.
        self.TC0.ocr0a().write(|w| unsafe { w.bits(duty) });
    }
}

// vim: ts=4 sw=4 expandtab
