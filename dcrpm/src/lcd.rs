// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// HD44780 instructions used by the controller.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum LcdCmd {
    /// 8 bit bus, 2 lines, 5x10 font.
    FunctionSet = 0x3F,
    /// Display, cursor and blink off.
    DisplayOff = 0x08,
    /// Clear DDRAM and return home.
    DisplayClear = 0x01,
    /// Increment address, no shift.
    EntryModeSet = 0x06,
    /// Display, cursor and blink on.
    DisplayOn = 0x0F,
    /// Cursor to the first character of the second line (DDRAM 0x40).
    SecondLine = 0xC0,
    /// Cursor to the first character of the first line.
    ReturnHome = 0x02,
}

impl LcdCmd {
    pub const fn byte(self) -> u8 {
        self as u8
    }
}

// vim: ts=4 sw=4 expandtab
