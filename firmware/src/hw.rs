// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

pub use atmega::{self as mcu, Peripherals};
pub use avr_device::atmega1284p as atmega;
pub use avr_device::interrupt;

use dcrpm::mutex::IrqCtx;

/// CPU clock.
pub const F_CPU: u32 = 16_000_000;

macro_rules! define_isr {
    ($name:ident, $handler:path) => {
        #[avr_device::interrupt(atmega1284p)]
        fn $name() {
            // SAFETY: We are inside of an interrupt handler.
            // Therefore, it is safe to construct an `IrqCtx`.
            let c = unsafe { IrqCtx::new() };
            $handler(&c);
        }
    };
}

define_isr!(TIMER2_COMPA, crate::timer::irq_handler_timer2_compa);

/// Busy wait for about `us` microseconds.
#[inline(never)]
pub fn delay_us(us: u8) {
    // 4 cycles per iteration at 16 MHz.
    const LOOPS_PER_US: u16 = (F_CPU / 1_000_000 / 4) as u16;
    for _ in 0..us {
        for _ in 0..LOOPS_PER_US {
            avr_device::asm::nop();
        }
    }
}

// vim: ts=4 sw=4 expandtab
