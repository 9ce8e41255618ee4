// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compile time configuration of the controller.
//!
//! There is no persistent configuration.
//! The firmware selects the variants with cargo features.

use crate::rpm::Rpm;

/// When the control loop runs.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ControlCadence {
    /// The gate counter is a free running 16 bit counter that is
    /// incremented on every fast tick and never reset.
    /// The loop runs whenever the counter equals `control_ticks`.
    /// That is once after `control_ticks` ticks and then again
    /// after every 16 bit wrap of the counter.
    ///
    /// This is most likely a latent bug. It is kept as the default
    /// until the repeating cadence is confirmed on the real machine.
    Once,
    /// Run every `control_ticks` ticks.
    Periodic,
}

/// How the duty register correction treats the 8 bit range.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum DutyOverflow {
    /// Native 8 bit wraparound.
    /// A correction beyond 0 or 0xFF wraps to the other end of the range.
    Wrap,
    /// Saturate at 0 and 0xFF.
    Saturate,
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Lowest commanded speed.
    pub min_rpm: Rpm,
    /// Highest commanded speed. Must be positive.
    pub max_rpm: Rpm,
    /// Analog input reading that corresponds to `max_rpm`. Must not be zero.
    pub adc_full_scale: u16,
    /// Pulses per sampling window that correspond to 60 RPM. Must not be zero.
    pub pulse_window_div: u32,
    /// Number of fast ticks per control loop run.
    pub control_ticks: u16,
    /// Number of fast ticks per display refresh step.
    pub refresh_ticks: u8,
    /// Power-on duty register value.
    pub duty_init: u8,
    pub cadence: ControlCadence,
    pub duty_overflow: DutyOverflow,
}

impl Config {
    /// The reference configuration:
    /// 250..1000 RPM, 500 ms sampling period, 10 ms display refresh step.
    pub const fn new() -> Self {
        Self {
            min_rpm: Rpm::new(250),
            max_rpm: Rpm::new(1000),
            adc_full_scale: 0xFFC0,
            pulse_window_div: 80,
            control_ticks: 500,
            refresh_ticks: 10,
            duty_init: 0xD0,
            cadence: ControlCadence::Once,
            duty_overflow: DutyOverflow::Wrap,
        }
    }

    pub const fn with_cadence(mut self, cadence: ControlCadence) -> Self {
        self.cadence = cadence;
        self
    }

    pub const fn with_duty_overflow(mut self, duty_overflow: DutyOverflow) -> Self {
        self.duty_overflow = duty_overflow;
        self
    }

    pub const fn with_adc_full_scale(mut self, adc_full_scale: u16) -> Self {
        assert!(adc_full_scale != 0, "adc_full_scale must not be zero");
        self.adc_full_scale = adc_full_scale;
        self
    }

    /// All divisors of the control loop are non-zero.
    pub const fn is_valid(&self) -> bool {
        self.max_rpm.get() > 0 && self.adc_full_scale != 0 && self.pulse_window_div != 0
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}


// vim: ts=4 sw=4 expandtab
