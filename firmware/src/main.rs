// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![no_std]
#![no_main]
#![feature(abi_avr_interrupt)]
#![feature(asm_experimental_arch)]

mod hw;
mod lcd;
mod motor;
mod ports;
mod timer;

use crate::{
    hw::{Peripherals, interrupt, mcu},
    motor::{MOTOR, Motor},
    ports::{PORTS, Ports},
    timer::{DP as TIMER_DP, Dp as TimerDp},
};
use dcrpm::{
    Config, ControlCadence, DutyOverflow, System,
    mutex::{MainCtx, MainInitCtx, reset_system, unwrap_option},
};

const CADENCE: ControlCadence = if cfg!(feature = "periodic-control") {
    ControlCadence::Periodic
} else {
    ControlCadence::Once
};

const DUTY_OVERFLOW: DutyOverflow = if cfg!(feature = "saturate-duty") {
    DutyOverflow::Saturate
} else {
    DutyOverflow::Wrap
};

const CONFIG: Config = Config::new()
    .with_cadence(CADENCE)
    .with_duty_overflow(DUTY_OVERFLOW);

static SYSTEM: System = System::new(CONFIG);

fn wdt_init() {
    // SAFETY: The asm code only accesses the WDT registers
    //         which are not accessed from anywhere else in the program.
    //         Interrupts are still disabled, so the timed sequence holds.
    unsafe {
        // Enable WDT with timeout 0.5 s
        core::arch::asm!(
            "ldi {tmp}, 0x18", // WDCE=1, WDE=1
            "sts {WDTCSR}, {tmp}",
            "ldi {tmp}, 0x0D", // WDE=1, WDP3=0, WDP2=1, WDP1=0, WDP0=1
            "sts {WDTCSR}, {tmp}",
            tmp = out(reg_upper) _,
            WDTCSR = const 0x60,
            options(nostack, preserves_flags)
        );
    }
}

fn wdt_poke(_wp: &mcu::WDT) {
    avr_device::asm::wdr();
}

#[avr_device::entry]
fn main() -> ! {
    wdt_init();

    let dp = unwrap_option(Peripherals::take());

    let ports = Ports {
        PORTA: dp.PORTA,
        PORTB: dp.PORTB,
        PORTC: dp.PORTC,
        PORTD: dp.PORTD,
    };

    let motor = Motor {
        ADC: dp.ADC,
        TC0: dp.TC0,
        TC1: dp.TC1,
    };

    let tp = TimerDp { TC2: dp.TC2 };

    let init_static_vars = |ctx: &MainInitCtx| {
        PORTS.init(ctx, ports);
        MOTOR.init(ctx, motor);
        TIMER_DP.init(ctx, tp);
    };

    // # SAFETY
    //
    // This is the context handle for the main() function.
    // Holding a reference to this object proves that the holder
    // is running in main() context.
    let m = unsafe { MainCtx::new_with_init(init_static_vars) };

    PORTS.deref(&m).setup(&m);
    MOTOR.deref(&m).setup(&m);
    SYSTEM.init(&m, MOTOR.deref(&m));
    TIMER_DP.deref(&m).setup(&m);

    // SAFETY: This must be after construction of MainCtx
    //         and after initialization of static MainInit variables.
    unsafe { interrupt::enable() };

    loop {
        wdt_poke(&dp.WDT);
    }
}

#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    reset_system();
}

// vim: ts=4 sw=4 expandtab
