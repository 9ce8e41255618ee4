// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{
    frame::{FRAME_LEN, FrameBuffer, LINE_LEN},
    hal::LcdBus,
    lcd::LcdCmd,
    mutex::{IrqCtx, MutexCell},
};

/// Cyclic display refresh.
///
/// Writes one character of the [FrameBuffer] per step.
/// The whole frame is written once every `FRAME_LEN + 1` steps.
pub struct LcdRefresh {
    cursor: MutexCell<u8>,
}

impl LcdRefresh {
    pub const fn new() -> Self {
        Self {
            cursor: MutexCell::new(0),
        }
    }

    pub fn cursor(&self, c: &IrqCtx<'_>) -> u8 {
        self.cursor.get(c)
    }

    /// Run one refresh step.
    ///
    /// Must only be called after the display initialization has finished.
    pub fn run(&self, c: &IrqCtx<'_>, frame: &FrameBuffer, lcd: &mut impl LcdBus) {
        let cursor = self.cursor.get(c);

        match cursor as usize {
            FRAME_LEN => {
                // End of frame. Go back to the first line.
                lcd.write_command(LcdCmd::ReturnHome.byte());
                self.cursor.set(c, 0);
                return;
            }
            LINE_LEN => {
                // The second line does not follow the first one in DDRAM.
                lcd.write_command(LcdCmd::SecondLine.byte());
            }
            _ => (),
        }

        lcd.write_data(frame.get(c.cs(), cursor as usize));
        self.cursor.set(c, cursor + 1);
    }
}

impl Default for LcdRefresh {
    fn default() -> Self {
        Self::new()
    }
}


// vim: ts=4 sw=4 expandtab
