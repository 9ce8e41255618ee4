// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Debug value registry.
//!
//! The last value of every item is kept in RAM,
//! where it can be inspected with an on-chip debugger.

use crate::mutex::{CriticalSection, Mutex, interrupt};
use core::cell::Cell;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum Debug {
    /// Commanded speed in RPM.
    TargetRpm,
    /// Measured speed in RPM.
    ActualRpm,
    /// Raw pulse count of the last sampling window.
    Pulses,
    /// Duty register after the last correction.
    Duty,
    /// Last setpoint clamp result. See [crate::control::SetpointRange].
    SetpointRange,
    /// Number of fast ticks the display init sequence spent waiting
    /// for an unresponsive display.
    LcdInitStall,
    /// Number of control loop runs.
    ControlRuns,
    /// Number of control loop runs skipped, because the pulse counter
    /// was not running yet.
    ControlSkipped,
}
const NRVALUES: usize = 8;

static VALUES: Mutex<[Cell<u16>; NRVALUES]> = Mutex::new([
    Cell::new(0),
    Cell::new(0),
    Cell::new(0),
    Cell::new(0),
    Cell::new(0),
    Cell::new(0),
    Cell::new(0),
    Cell::new(0),
]);

impl Debug {
    pub fn log_u16_cs(&self, cs: CriticalSection<'_>, value: u16) {
        let id = *self as usize;
        let values = VALUES.borrow(cs);
        if id < values.len() {
            values[id].set(value);
        }
    }

    pub fn log_u16(&self, value: u16) {
        interrupt::free(|cs| self.log_u16_cs(cs, value));
    }

    pub fn log_u8(&self, value: u8) {
        self.log_u16(value.into())
    }

    pub fn inc(&self) {
        interrupt::free(|cs| {
            let value = self.get_cs(cs);
            self.log_u16_cs(cs, value.saturating_add(1));
        });
    }

    pub fn get_cs(&self, cs: CriticalSection<'_>) -> u16 {
        let id = *self as usize;
        VALUES.borrow(cs).get(id).map(|v| v.get()).unwrap_or(0xFFFF)
    }

    pub fn get(&self) -> u16 {
        interrupt::free(|cs| self.get_cs(cs))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_log_and_get() {
        // Hold the critical section, so parallel tests can't interfere.
        interrupt::free(|cs| {
            Debug::Pulses.log_u16_cs(cs, 0xBEEF);
            assert_eq!(Debug::Pulses.get_cs(cs), 0xBEEF);
            Debug::Pulses.log_u16_cs(cs, 0);
            assert_eq!(Debug::Pulses.get_cs(cs), 0);
        });
    }

    #[test]
    fn test_all_ids_fit() {
        assert!((Debug::ControlSkipped as usize) < NRVALUES);
    }
}

// vim: ts=4 sw=4 expandtab
