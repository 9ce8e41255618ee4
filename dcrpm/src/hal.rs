// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hardware seams of the controller.
//!
//! Peripheral bring-up and the display bus protocol live in the firmware.
//! The controller only uses these operations.

use crate::mutex::CriticalSection;

/// Motor side peripherals: setpoint input, pulse counter and PWM.
pub trait SpeedIo {
    /// Latest conversion result of the setpoint analog input.
    fn read_analog_input(&self, cs: CriticalSection<'_>) -> u16;

    /// Current value of the motor pulse counter.
    ///
    /// The counter is wider than one byte and keeps counting in hardware,
    /// so it must only be read with interrupts disabled.
    fn read_pulse_counter(&self, cs: CriticalSection<'_>) -> u16;

    /// Reset the motor pulse counter to zero.
    fn reset_pulse_counter(&self, cs: CriticalSection<'_>);

    /// Switch the counter over to count motor pulses from now on.
    ///
    /// Called once, after the display initialization has finished.
    fn start_pulse_counter(&self, cs: CriticalSection<'_>);

    /// PWM compare threshold. Lower value means more motor power.
    fn duty_register(&self) -> u8;

    fn set_duty_register(&self, duty: u8);
}

/// Character display transport.
///
/// Both writes include the settle delay of the display.
pub trait LcdBus {
    fn write_command(&mut self, cmd: u8);

    fn write_data(&mut self, data: u8);

    /// The display is able to accept the next byte.
    ///
    /// A display that never becomes ready stalls the initialization forever.
    fn is_ready(&self) -> bool {
        true
    }
}


// vim: ts=4 sw=4 expandtab
