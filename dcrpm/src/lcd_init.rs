// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{
    debug::Debug,
    hal::LcdBus,
    lcd::LcdCmd,
    mutex::{IrqCtx, MutexCell},
};

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum LcdInitState {
    /// No tick has been seen yet.
    NotStarted,
    /// Milliseconds since the first tick.
    InProgress(u8),
    /// All commands sent. This state is sticky and final.
    Complete,
}

/// Result of one init tick.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum LcdInitEvent {
    /// Nothing happened that the caller needs to know about.
    Pending,
    /// The last command has just been sent.
    /// This is reported exactly once.
    Ready,
    /// Initialization was already complete before this tick.
    Idle,
}

struct InitStep {
    /// Millisecond after power-on at which the command is sent.
    at_ms: u8,
    cmd: LcdCmd,
    /// Wait for the busy flag before sending.
    /// The busy flag is not valid before the bus mode has been set.
    check_busy: bool,
}

/// HD44780 power-on sequence.
/// The function set must be repeated to get out of an unknown bus mode.
/// It is sent blind, on timing alone.
#[rustfmt::skip]
const SCHEDULE: [InitStep; 8] = [
    InitStep { at_ms: 5,  cmd: LcdCmd::FunctionSet,  check_busy: false },
    InitStep { at_ms: 10, cmd: LcdCmd::FunctionSet,  check_busy: false },
    InitStep { at_ms: 11, cmd: LcdCmd::FunctionSet,  check_busy: false },
    InitStep { at_ms: 12, cmd: LcdCmd::FunctionSet,  check_busy: false },
    InitStep { at_ms: 13, cmd: LcdCmd::DisplayOff,   check_busy: true },
    InitStep { at_ms: 14, cmd: LcdCmd::DisplayClear, check_busy: true },
    InitStep { at_ms: 16, cmd: LcdCmd::EntryModeSet, check_busy: true },
    InitStep { at_ms: 18, cmd: LcdCmd::DisplayOn,    check_busy: true },
];

/// Display power-on initialization, driven by the 1 ms tick.
pub struct LcdInit {
    state: MutexCell<LcdInitState>,
    /// Index of the next entry in [SCHEDULE].
    step: MutexCell<u8>,
}

impl LcdInit {
    pub const fn new() -> Self {
        Self {
            state: MutexCell::new(LcdInitState::NotStarted),
            step: MutexCell::new(0),
        }
    }

    pub fn state(&self, c: &IrqCtx<'_>) -> LcdInitState {
        self.state.get(c)
    }

    pub fn is_complete(&self, c: &IrqCtx<'_>) -> bool {
        self.state.get(c) == LcdInitState::Complete
    }

    pub fn run(&self, c: &IrqCtx<'_>, lcd: &mut impl LcdBus) -> LcdInitEvent {
        let ms = match self.state.get(c) {
            LcdInitState::NotStarted => 0,
            LcdInitState::InProgress(ms) => ms,
            LcdInitState::Complete => return LcdInitEvent::Idle,
        };

        let step = self.step.get(c);
        let Some(next) = SCHEDULE.get(step as usize) else {
            // Schedule exhausted, but the state was not set. Can't happen.
            self.state.set(c, LcdInitState::Complete);
            return LcdInitEvent::Ready;
        };

        let ms = ms.saturating_add(1);
        if ms < next.at_ms {
            self.state.set(c, LcdInitState::InProgress(ms));
            return LcdInitEvent::Pending;
        }

        if next.check_busy && !lcd.is_ready() {
            // Hold the clock. The step stays due until the display responds.
            // There is no timeout.
            Debug::LcdInitStall.inc();
            return LcdInitEvent::Pending;
        }

        lcd.write_command(next.cmd.byte());
        let step = step + 1;
        self.step.set(c, step);

        if step as usize >= SCHEDULE.len() {
            self.state.set(c, LcdInitState::Complete);
            LcdInitEvent::Ready
        } else {
            self.state.set(c, LcdInitState::InProgress(ms));
            LcdInitEvent::Pending
        }
    }
}

impl Default for LcdInit {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hal::mock::{LcdOp, MockLcd};
    use std::vec::Vec;

    #[test]
    fn test_schedule() {
        let c = unsafe { IrqCtx::new() };
        let init = LcdInit::new();
        let mut lcd = MockLcd::new();
        assert_eq!(init.state(&c), LcdInitState::NotStarted);

        let mut sent = Vec::new();
        for ms in 1..=18_u8 {
            let ev = init.run(&c, &mut lcd);
            for op in lcd.take() {
                sent.push((ms, op));
            }
            if ms < 18 {
                assert_eq!(ev, LcdInitEvent::Pending);
                assert_eq!(init.state(&c), LcdInitState::InProgress(ms));
            } else {
                assert_eq!(ev, LcdInitEvent::Ready);
                assert_eq!(init.state(&c), LcdInitState::Complete);
            }
        }
        assert_eq!(
            sent,
            [
                (5, LcdOp::Cmd(0x3F)),
                (10, LcdOp::Cmd(0x3F)),
                (11, LcdOp::Cmd(0x3F)),
                (12, LcdOp::Cmd(0x3F)),
                (13, LcdOp::Cmd(0x08)),
                (14, LcdOp::Cmd(0x01)),
                (16, LcdOp::Cmd(0x06)),
                (18, LcdOp::Cmd(0x0F)),
            ]
        );
    }

    #[test]
    fn test_complete_is_final() {
        let c = unsafe { IrqCtx::new() };
        let init = LcdInit::new();
        let mut lcd = MockLcd::new();
        let mut ready_count = 0;
        for _ in 0..1000 {
            if init.run(&c, &mut lcd) == LcdInitEvent::Ready {
                ready_count += 1;
            }
        }
        assert_eq!(ready_count, 1);
        assert!(init.is_complete(&c));
        assert_eq!(init.run(&c, &mut lcd), LcdInitEvent::Idle);
        assert_eq!(lcd.take().len(), 8);
    }

    #[test]
    fn test_stall() {
        let c = unsafe { IrqCtx::new() };
        let init = LcdInit::new();
        let mut lcd = MockLcd::new();
        lcd.ready = false;

        for _ in 0..1000 {
            assert_eq!(init.run(&c, &mut lcd), LcdInitEvent::Pending);
        }
        // The function set is sent without looking at the busy flag.
        // The clock stops right before the first busy checked command.
        assert_eq!(init.state(&c), LcdInitState::InProgress(12));
        assert_eq!(lcd.take(), [LcdOp::Cmd(0x3F); 4]);

        // The display comes alive: the sequence continues where it stopped.
        lcd.ready = true;
        assert_eq!(init.run(&c, &mut lcd), LcdInitEvent::Pending);
        assert_eq!(lcd.take(), [LcdOp::Cmd(0x08)]);
        assert_eq!(init.state(&c), LcdInitState::InProgress(13));
    }

    #[test]
    fn test_function_set_ignores_busy() {
        let c = unsafe { IrqCtx::new() };
        let init = LcdInit::new();
        let mut lcd = MockLcd::new();
        lcd.ready = false;

        let mut sent = Vec::new();
        for ms in 1..=12_u8 {
            init.run(&c, &mut lcd);
            for op in lcd.take() {
                sent.push((ms, op));
            }
        }
        assert_eq!(
            sent,
            [
                (5, LcdOp::Cmd(0x3F)),
                (10, LcdOp::Cmd(0x3F)),
                (11, LcdOp::Cmd(0x3F)),
                (12, LcdOp::Cmd(0x3F)),
            ]
        );
    }
}

// vim: ts=4 sw=4 expandtab
