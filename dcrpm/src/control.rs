// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{
    config::{Config, ControlCadence, DutyOverflow},
    debug::Debug,
    frame::{FrameBuffer, render},
    hal::SpeedIo,
    mutex::{IrqCtx, MutexCell, interrupt},
    rpm::Rpm,
};

/// Seconds per minute.
const SEC_PER_MIN: u32 = 60;

/// Full scale of the proportional correction term.
const DUTY_SPAN: i32 = 255;

/// Where the raw setpoint landed relative to the allowed speed range.
///
/// Out of range inputs are clamped, never rejected.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum SetpointRange {
    InRange,
    BelowMin,
    AboveMax,
}

/// Convert the analog setpoint reading to the commanded speed.
pub fn setpoint_to_rpm(cfg: &Config, adc: u16) -> (Rpm, SetpointRange) {
    let raw = (adc as u32 * cfg.max_rpm.get() as u32) / cfg.adc_full_scale as u32;
    let raw = Rpm::new(raw as i32);
    if raw < cfg.min_rpm {
        (cfg.min_rpm, SetpointRange::BelowMin)
    } else if raw > cfg.max_rpm {
        (cfg.max_rpm, SetpointRange::AboveMax)
    } else {
        (raw, SetpointRange::InRange)
    }
}

/// Convert the pulses of one sampling window to speed.
pub fn pulses_to_rpm(cfg: &Config, pulses: u16) -> Rpm {
    Rpm::new(((pulses as u32 * SEC_PER_MIN) / cfg.pulse_window_div) as i32)
}

/// One step of the duty register correction.
///
/// This is a crude proportional nudge, not a PID.
/// Inside of the speed range the integer division quantizes the
/// proportional term to zero for every speed difference below `max_rpm`.
/// Outside of the range the duty is moved by one step.
pub fn correct_duty(cfg: &Config, duty: u8, target: Rpm, actual: Rpm) -> u8 {
    let step: i32 = if actual >= cfg.min_rpm && actual <= cfg.max_rpm {
        (target - actual).ratio(cfg.max_rpm) * DUTY_SPAN
    } else if actual <= cfg.min_rpm {
        // Too slow: Lower threshold, more power.
        1
    } else {
        // Too fast: Higher threshold, less power.
        -1
    };

    let duty = duty as i32 - step;
    match cfg.duty_overflow {
        DutyOverflow::Wrap => duty as u8,
        DutyOverflow::Saturate => duty.clamp(0, u8::MAX as i32) as u8,
    }
}

/// Result of one control loop run.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ControlSample {
    pub target: Rpm,
    pub actual: Rpm,
    pub pulses: u16,
    pub range: SetpointRange,
    pub duty: u8,
}

/// Sample, compare and correct.
pub struct SpeedControl {
    /// Fast tick gate counter.
    count: MutexCell<u16>,
    target: MutexCell<Rpm>,
    actual: MutexCell<Rpm>,
}

impl SpeedControl {
    pub const fn new() -> Self {
        Self {
            count: MutexCell::new(0),
            target: MutexCell::new(Rpm::zero()),
            actual: MutexCell::new(Rpm::zero()),
        }
    }

    pub fn target(&self, c: &IrqCtx<'_>) -> Rpm {
        self.target.get(c)
    }

    pub fn actual(&self, c: &IrqCtx<'_>) -> Rpm {
        self.actual.get(c)
    }

    /// Advance the fast tick gate counter.
    ///
    /// Returns true, if the control loop is due on this tick.
    pub fn gate(&self, c: &IrqCtx<'_>, cfg: &Config) -> bool {
        let count = self.count.get(c);
        let due = count == cfg.control_ticks;

        let next = match cfg.cadence {
            ControlCadence::Once => count.wrapping_add(1),
            ControlCadence::Periodic if due => 1,
            ControlCadence::Periodic => count.wrapping_add(1),
        };
        self.count.set(c, next);

        due
    }

    /// Fast tick handler.
    ///
    /// Runs the control loop, if the gate is open.
    pub fn tick(
        &self,
        c: &IrqCtx<'_>,
        cfg: &Config,
        io: &impl SpeedIo,
        frame: &FrameBuffer,
    ) -> Option<ControlSample> {
        if self.gate(c, cfg) {
            Some(self.run(c, cfg, io, frame))
        } else {
            None
        }
    }

    /// Run the control loop once.
    pub fn run(
        &self,
        c: &IrqCtx<'_>,
        cfg: &Config,
        io: &impl SpeedIo,
        frame: &FrameBuffer,
    ) -> ControlSample {
        // Commanded speed.
        let adc = interrupt::free(|cs| io.read_analog_input(cs));
        let (target, range) = setpoint_to_rpm(cfg, adc);
        self.target.set(c, target);

        // Measured speed.
        let pulses = interrupt::free(|cs| {
            let pulses = io.read_pulse_counter(cs);
            io.reset_pulse_counter(cs);
            pulses
        });
        let actual = pulses_to_rpm(cfg, pulses);
        self.actual.set(c, actual);

        frame.store(&render(target, actual));

        let duty = correct_duty(cfg, io.duty_register(), target, actual);
        io.set_duty_register(duty);

        Debug::TargetRpm.log_u16(target.to_u16_sat());
        Debug::ActualRpm.log_u16(actual.to_u16_sat());
        Debug::Pulses.log_u16(pulses);
        Debug::SetpointRange.log_u8(range as u8);
        Debug::Duty.log_u8(duty);
        Debug::ControlRuns.inc();

        ControlSample {
            target,
            actual,
            pulses,
            range,
            duty,
        }
    }
}

impl Default for SpeedControl {
    fn default() -> Self {
        Self::new()
    }
}


// vim: ts=4 sw=4 expandtab
