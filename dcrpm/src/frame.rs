// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{
    mutex::{CriticalSection, Mutex, interrupt},
    rpm::Rpm,
};
use core::cell::Cell;

/// Characters per display line.
pub const LINE_LEN: usize = 16;
/// Characters of the whole display.
pub const FRAME_LEN: usize = LINE_LEN * 2;

const LINE1: &[u8; LINE_LEN] = b"TARGET RPM- 0000";
const LINE2: &[u8; LINE_LEN] = b"ACTUAL RPM- 0000";

/// Position of the four digits within a line.
const DIGITS_POS: usize = 12;

/// Largest value that fits into the four digit field.
const DIGITS_MAX: i32 = 9999;

/// Four digit, zero padded decimal. Most significant digit first.
///
/// Negative values render as 0000 and values above 9999 as 9999.
pub fn fmt_4digit(value: Rpm) -> [u8; 4] {
    let v = value.get().clamp(0, DIGITS_MAX) as u16;
    [
        b'0' + (v / 1000) as u8,
        b'0' + ((v % 1000) / 100) as u8,
        b'0' + ((v % 100) / 10) as u8,
        b'0' + (v % 10) as u8,
    ]
}

/// Build the full display content.
pub fn render(target: Rpm, actual: Rpm) -> [u8; FRAME_LEN] {
    let mut frame = [0; FRAME_LEN];
    frame[..LINE_LEN].copy_from_slice(LINE1);
    frame[LINE_LEN..].copy_from_slice(LINE2);
    frame[DIGITS_POS..DIGITS_POS + 4].copy_from_slice(&fmt_4digit(target));
    frame[LINE_LEN + DIGITS_POS..LINE_LEN + DIGITS_POS + 4].copy_from_slice(&fmt_4digit(actual));
    frame
}

/// Display content shared between the control loop (writer)
/// and the display refresh (reader).
pub struct FrameBuffer {
    chars: Mutex<[Cell<u8>; FRAME_LEN]>,
}

impl FrameBuffer {
    pub const fn new() -> Self {
        Self {
            chars: Mutex::new([const { Cell::new(b' ') }; FRAME_LEN]),
        }
    }

    /// Replace the whole frame.
    ///
    /// All characters are replaced within one critical section,
    /// so a reader never sees a partially updated frame.
    pub fn store(&self, frame: &[u8; FRAME_LEN]) {
        interrupt::free(|cs| {
            let chars = self.chars.borrow(cs);
            for (c, f) in chars.iter().zip(frame.iter()) {
                c.set(*f);
            }
        });
    }

    /// Get one character.
    pub fn get(&self, cs: CriticalSection<'_>, index: usize) -> u8 {
        self.chars
            .borrow(cs)
            .get(index)
            .map(|c| c.get())
            .unwrap_or(b' ')
    }

    /// Copy of the whole frame.
    pub fn snapshot(&self) -> [u8; FRAME_LEN] {
        interrupt::free(|cs| {
            let mut frame = [0; FRAME_LEN];
            for (f, c) in frame.iter_mut().zip(self.chars.borrow(cs).iter()) {
                *f = c.get();
            }
            frame
        })
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fmt_4digit() {
        assert_eq!(&fmt_4digit(Rpm::new(250)), b"0250");
        assert_eq!(&fmt_4digit(Rpm::new(0)), b"0000");
        assert_eq!(&fmt_4digit(Rpm::new(1000)), b"1000");
        assert_eq!(&fmt_4digit(Rpm::new(9999)), b"9999");
        assert_eq!(&fmt_4digit(Rpm::new(7)), b"0007");
        assert_eq!(&fmt_4digit(Rpm::new(49151)), b"9999");
        assert_eq!(&fmt_4digit(Rpm::new(-5)), b"0000");
    }

    #[test]
    fn test_render() {
        let frame = render(Rpm::new(250), Rpm::new(637));
        assert_eq!(frame.len(), 32);
        assert_eq!(&frame, b"TARGET RPM- 0250ACTUAL RPM- 0637");
    }

    #[test]
    fn test_store() {
        let fb = FrameBuffer::new();
        assert_eq!(&fb.snapshot(), &[b' '; FRAME_LEN]);
        fb.store(&render(Rpm::new(1000), Rpm::new(12)));
        assert_eq!(&fb.snapshot(), b"TARGET RPM- 1000ACTUAL RPM- 0012");
        interrupt::free(|cs| {
            assert_eq!(fb.get(cs, 0), b'T');
            assert_eq!(fb.get(cs, 16), b'A');
            assert_eq!(fb.get(cs, 31), b'2');
            assert_eq!(fb.get(cs, 32), b' ');
        });
    }

    proptest::proptest! {
        #[test]
        fn prop_render_digits(target in 0_i32..=9999, actual in 0_i32..=9999) {
            let frame = render(Rpm::new(target), Rpm::new(actual));
            proptest::prop_assert_eq!(frame.len(), FRAME_LEN);
            let text = core::str::from_utf8(&frame).unwrap();
            proptest::prop_assert_eq!(&text[..12], "TARGET RPM- ");
            proptest::prop_assert_eq!(&text[16..28], "ACTUAL RPM- ");
            proptest::prop_assert_eq!(text[12..16].parse::<i32>().unwrap(), target);
            proptest::prop_assert_eq!(text[28..32].parse::<i32>().unwrap(), actual);
        }
    }
}

// vim: ts=4 sw=4 expandtab
