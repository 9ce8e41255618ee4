// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{
    config::Config,
    control::{ControlSample, SpeedControl},
    debug::Debug,
    frame::{FrameBuffer, render},
    hal::{LcdBus, SpeedIo},
    lcd_init::{LcdInit, LcdInitEvent, LcdInitState},
    lcd_refresh::LcdRefresh,
    mutex::{IrqCtx, MainCtx, MutexCell, interrupt},
    rpm::Rpm,
};

/// What happened during one fast tick.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct TickReport {
    /// The display initialization finished and the pulse counter was started.
    pub lcd_ready: bool,
    /// A display refresh step was executed.
    pub refreshed: bool,
    /// The control loop was executed.
    pub control: Option<ControlSample>,
}

/// The whole controller.
///
/// All tasks are dispatched from one 1 ms tick in fixed priority order.
/// Every task runs to completion before the next one starts:
///
/// 1. Display initialization (every tick, until complete).
/// 2. Display refresh (every `refresh_ticks` ticks, after initialization).
/// 3. Speed control loop (gated by its own tick counter).
///    It only runs once the pulse counter has been started.
pub struct System {
    cfg: Config,
    frame: FrameBuffer,
    lcd_init: LcdInit,
    lcd_refresh: LcdRefresh,
    refresh_count: MutexCell<u8>,
    control: SpeedControl,
}

impl System {
    /// Panics on a configuration with a zero divisor.
    /// In a `static` initializer that is a compile time error.
    pub const fn new(cfg: Config) -> Self {
        assert!(cfg.is_valid(), "invalid controller configuration");
        Self {
            cfg,
            frame: FrameBuffer::new(),
            lcd_init: LcdInit::new(),
            lcd_refresh: LcdRefresh::new(),
            refresh_count: MutexCell::new(0),
            control: SpeedControl::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    /// Power-on initialization. Must run before interrupts are enabled.
    pub fn init(&self, _m: &MainCtx<'_>, io: &impl SpeedIo) {
        self.frame.store(&render(Rpm::zero(), Rpm::zero()));
        io.set_duty_register(self.cfg.duty_init);
    }

    pub fn lcd_init_state(&self, c: &IrqCtx<'_>) -> LcdInitState {
        self.lcd_init.state(c)
    }

    pub fn target(&self, c: &IrqCtx<'_>) -> Rpm {
        self.control.target(c)
    }

    pub fn actual(&self, c: &IrqCtx<'_>) -> Rpm {
        self.control.actual(c)
    }

    /// Fast tick. Called from the tick ISR once per millisecond.
    pub fn tick(&self, c: &IrqCtx<'_>, io: &impl SpeedIo, lcd: &mut impl LcdBus) -> TickReport {
        let mut report = TickReport::default();

        let counting = match self.lcd_init.run(c, lcd) {
            LcdInitEvent::Pending => false,
            LcdInitEvent::Ready => {
                // The display is up. From now on the motor pulses are counted.
                interrupt::free(|cs| io.start_pulse_counter(cs));
                report.lcd_ready = true;
                true
            }
            LcdInitEvent::Idle => {
                let count = self.refresh_count.get(c).wrapping_add(1);
                if count >= self.cfg.refresh_ticks {
                    self.refresh_count.set(c, 0);
                    self.lcd_refresh.run(c, &self.frame, lcd);
                    report.refreshed = true;
                } else {
                    self.refresh_count.set(c, count);
                }
                true
            }
        };

        // The gate keeps counting from power-on.
        // Without a running pulse counter there is no speed feedback,
        // so the duty register is left alone.
        if self.control.gate(c, &self.cfg) {
            if counting {
                report.control = Some(self.control.run(c, &self.cfg, io, &self.frame));
            } else {
                Debug::ControlSkipped.inc();
            }
        }

        report
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        config::ControlCadence,
        hal::mock::{LcdOp, MockIo, MockLcd},
    };

    #[test]
    fn test_boot() {
        let m = unsafe { MainCtx::new() };
        let c = unsafe { IrqCtx::new() };
        let sys = System::new(Config::new());
        let io = MockIo::new(0);
        let mut lcd = MockLcd::new();

        sys.init(&m, &io);
        assert_eq!(io.duty.get(), 0xD0);
        assert_eq!(&sys.frame().snapshot(), b"TARGET RPM- 0000ACTUAL RPM- 0000");

        let mut ready_tick = None;
        for tick in 1..=18 {
            let r = sys.tick(&c, &io, &mut lcd);
            assert!(!r.refreshed);
            assert!(r.control.is_none());
            if r.lcd_ready {
                ready_tick = Some(tick);
            }
        }
        assert_eq!(ready_tick, Some(18));
        assert_eq!(sys.lcd_init_state(&c), LcdInitState::Complete);
        assert_eq!(io.counter_started.get(), 1);
        assert_eq!(lcd.take().len(), 8);
    }

    #[test]
    fn test_refresh_cadence() {
        let c = unsafe { IrqCtx::new() };
        let sys = System::new(Config::new());
        let io = MockIo::new(0xD0);
        let mut lcd = MockLcd::new();

        for _ in 0..18 {
            sys.tick(&c, &io, &mut lcd);
        }
        lcd.take();

        let mut refresh_ticks = std::vec::Vec::new();
        for tick in 19..=60 {
            if sys.tick(&c, &io, &mut lcd).refreshed {
                refresh_ticks.push(tick);
            }
        }
        assert_eq!(refresh_ticks, [28, 38, 48, 58]);
        // Frame buffer is still blank: System::init was not called.
        assert_eq!(lcd.take(), [LcdOp::Data(b' '); 4]);
    }

    #[test]
    fn test_end_to_end() {
        let m = unsafe { MainCtx::new() };
        let c = unsafe { IrqCtx::new() };
        let sys = System::new(Config::new());
        let io = MockIo::new(0);
        let mut lcd = MockLcd::new();
        sys.init(&m, &io);

        io.analog.set(0);
        let mut sample = None;
        for tick in 1..=501 {
            // Pulses arrive after the counter has been started.
            if tick > 18 {
                io.pulses.set(io.pulses.get() + 1);
            }
            let r = sys.tick(&c, &io, &mut lcd);
            if let Some(s) = r.control {
                assert_eq!(tick, 501);
                sample = Some(s);
            }
        }
        let s = sample.unwrap();
        assert_eq!(s.target, Rpm::new(250));
        assert_eq!(sys.target(&c), Rpm::new(250));
        // 483 pulses * 60 / 80
        assert_eq!(s.pulses, 483);
        assert_eq!(s.actual, Rpm::new(362));
        assert_eq!(&sys.frame().snapshot(), b"TARGET RPM- 0250ACTUAL RPM- 0362");

        // The literal gate never fires again within the next second.
        for _ in 0..1000 {
            assert!(sys.tick(&c, &io, &mut lcd).control.is_none());
        }
    }

    #[test]
    fn test_end_to_end_full_scale() {
        let c = unsafe { IrqCtx::new() };
        let cfg = Config::new().with_cadence(ControlCadence::Periodic);
        let sys = System::new(cfg);
        let io = MockIo::new(0xD0);
        let mut lcd = MockLcd::new();

        io.analog.set(sys.config().adc_full_scale);
        let mut samples = std::vec::Vec::new();
        for _ in 0..1001 {
            if let Some(s) = sys.tick(&c, &io, &mut lcd).control {
                samples.push(s);
            }
        }
        assert_eq!(samples.len(), 2);
        for s in samples {
            assert_eq!(s.target, Rpm::new(1000));
            assert_eq!(s.actual, Rpm::new(0));
        }
        // Two nudges towards more power.
        assert_eq!(io.duty.get(), 0xCE);
    }

    #[test]
    #[should_panic]
    fn test_invalid_config() {
        let mut cfg = Config::new();
        cfg.pulse_window_div = 0;
        let _ = System::new(cfg);
    }

    #[test]
    fn test_stalled_display_leaves_motor_alone() {
        let m = unsafe { MainCtx::new() };
        let c = unsafe { IrqCtx::new() };
        let cfg = Config::new().with_cadence(ControlCadence::Periodic);
        let sys = System::new(cfg);
        let io = MockIo::new(0);
        let mut lcd = MockLcd::new();
        lcd.ready = false;
        sys.init(&m, &io);
        io.analog.set(sys.config().adc_full_scale);

        let skipped_before = Debug::ControlSkipped.get();
        for _ in 0..5000 {
            let r = sys.tick(&c, &io, &mut lcd);
            assert!(!r.lcd_ready);
            assert!(!r.refreshed);
            assert!(r.control.is_none());
        }
        assert_eq!(sys.lcd_init_state(&c), LcdInitState::InProgress(12));
        assert_eq!(io.counter_started.get(), 0);
        assert_eq!(io.pulse_resets.get(), 0);
        assert_eq!(io.duty.get(), 0xD0);
        assert_eq!(&sys.frame().snapshot(), b"TARGET RPM- 0000ACTUAL RPM- 0000");
        // Gates at 501, 1001, .. 4501.
        assert!(Debug::ControlSkipped.get() >= skipped_before.saturating_add(9));
        assert_eq!(lcd.take(), [LcdOp::Cmd(0x3F); 4]);

        // The display comes alive late. The gate at 5001 still finds the
        // init in progress. Control starts with the gate at 5501.
        lcd.ready = true;
        let mut samples = std::vec::Vec::new();
        for _ in 0..1000 {
            let r = sys.tick(&c, &io, &mut lcd);
            if let Some(s) = r.control {
                samples.push(s);
            }
        }
        assert_eq!(io.counter_started.get(), 1);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].target, Rpm::new(1000));
        assert_eq!(io.duty.get(), 0xCF);
    }
}

// vim: ts=4 sw=4 expandtab
