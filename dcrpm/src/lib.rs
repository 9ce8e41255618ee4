// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DC motor RPM controller core.
//!
//! Three tick driven state machines share one periodic interrupt:
//!
//! - [lcd_init::LcdInit] brings up the HD44780 display after power-on.
//! - [lcd_refresh::LcdRefresh] writes the [frame::FrameBuffer] to the
//!   display, one character per step.
//! - [control::SpeedControl] samples setpoint and motor speed,
//!   renders the frame and corrects the PWM duty register.
//!
//! [system::System] dispatches them. The hardware is reached through
//! the traits in [hal].
//!
//! # Known single point of failure
//!
//! A display that never becomes ready stalls the display initialization
//! forever. The motor pulse counter is never started in that case
//! and the control loop never touches the duty register.
//! There is no timeout and no watchdog supervision of this condition.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod control;
pub mod debug;
pub mod frame;
pub mod hal;
pub mod lcd;
pub mod lcd_init;
pub mod lcd_refresh;
pub mod mutex;
pub mod rpm;
pub mod system;

pub use crate::{
    config::{Config, ControlCadence, DutyOverflow},
    rpm::Rpm,
    system::{System, TickReport},
};

// vim: ts=4 sw=4 expandtab
