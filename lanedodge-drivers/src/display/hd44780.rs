//! HD44780 character LCD, 4-bit parallel mode
//!
//! Two display rows, one per lane. The eight CGRAM slots hold the custom
//! glyphs; only the low five bits of each glyph row are visible on a
//! 5x8 character cell, so uploads are masked.
//!
//! Timing follows the datasheet worst cases: the driver never reads the
//! busy flag (RW is tied low), it waits instead.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use lanedodge_core::traits::{BlinkPattern, DisplayAdapter, DisplayError, DISPLAY_ROWS};
use lanedodge_protocol::glyph::visible;
use lanedodge_protocol::Glyph;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE: u8 = 0x04;
const CMD_DISPLAY_CONTROL: u8 = 0x08;
const CMD_FUNCTION_SET: u8 = 0x20;
const CMD_SET_CGRAM: u8 = 0x40;
const CMD_SET_DDRAM: u8 = 0x80;

const ENTRY_INCREMENT: u8 = 0x02;
const DISPLAY_ON: u8 = 0x04;
const FUNCTION_TWO_LINES: u8 = 0x08;

/// DDRAM address of the first column of each row
const ROW_OFFSETS: [u8; 2] = [0x00, 0x40];

/// User-definable glyph slots
const CGRAM_SLOTS: u8 = 8;

/// Execution time of ordinary commands and data writes
const EXEC_US: u32 = 50;
/// Execution time of clear/home
const CLEAR_US: u32 = 2_000;

/// HD44780 driver over six output pins
///
/// All pins share one type, which is how chip HALs usually hand out
/// GPIO outputs.
pub struct Hd44780<P, D> {
    rs: P,
    en: P,
    data: [P; 4],
    delay: D,
    columns: u8,
    cursor: (u8, u8),
}

impl<P: OutputPin, D: DelayNs> Hd44780<P, D> {
    /// Initialize the controller and return a cleared display
    ///
    /// `data` is D4..D7 in order. `columns` is the visible row length.
    pub fn new(rs: P, en: P, data: [P; 4], delay: D, columns: u8) -> Result<Self, DisplayError> {
        let mut lcd = Self {
            rs,
            en,
            data,
            delay,
            columns,
            cursor: (0, 0),
        };
        lcd.init()?;
        Ok(lcd)
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        // Power-on wait, then the 8-bit reset dance before switching to 4-bit
        self.delay.delay_ms(50);
        self.rs.set_low().map_err(|_| DisplayError::Bus)?;
        self.write_nibble(0x03)?;
        self.delay.delay_us(4_100);
        self.write_nibble(0x03)?;
        self.delay.delay_us(100);
        self.write_nibble(0x03)?;
        self.delay.delay_us(100);
        self.write_nibble(0x02)?;
        self.delay.delay_us(EXEC_US);

        self.command(CMD_FUNCTION_SET | FUNCTION_TWO_LINES)?;
        self.command(CMD_DISPLAY_CONTROL | DISPLAY_ON)?;
        self.clear()?;
        self.command(CMD_ENTRY_MODE | ENTRY_INCREMENT)
    }

    /// Release the pins and delay
    pub fn release(self) -> (P, P, [P; 4], D) {
        (self.rs, self.en, self.data, self.delay)
    }

    fn write_nibble(&mut self, nibble: u8) -> Result<(), DisplayError> {
        for (bit, pin) in self.data.iter_mut().enumerate() {
            let res = if nibble & (1 << bit) != 0 {
                pin.set_high()
            } else {
                pin.set_low()
            };
            res.map_err(|_| DisplayError::Bus)?;
        }
        self.en.set_high().map_err(|_| DisplayError::Bus)?;
        self.delay.delay_us(1);
        self.en.set_low().map_err(|_| DisplayError::Bus)?;
        Ok(())
    }

    fn write_byte(&mut self, byte: u8, is_data: bool) -> Result<(), DisplayError> {
        let rs = if is_data {
            self.rs.set_high()
        } else {
            self.rs.set_low()
        };
        rs.map_err(|_| DisplayError::Bus)?;
        self.write_nibble(byte >> 4)?;
        self.write_nibble(byte & 0x0F)?;
        self.delay.delay_us(EXEC_US);
        Ok(())
    }

    fn command(&mut self, cmd: u8) -> Result<(), DisplayError> {
        self.write_byte(cmd, false)
    }

    fn move_to(&mut self, col: u8, row: u8) -> Result<(), DisplayError> {
        self.command(CMD_SET_DDRAM | (ROW_OFFSETS[row as usize] + col))
    }
}

impl<P: OutputPin, D: DelayNs> DisplayAdapter for Hd44780<P, D> {
    fn load_glyph(&mut self, slot: u8, glyph: &Glyph) -> Result<(), DisplayError> {
        if slot >= CGRAM_SLOTS {
            return Err(DisplayError::InvalidSlot);
        }
        self.command(CMD_SET_CGRAM | (slot << 3))?;
        for row in visible(glyph) {
            self.write_byte(row, true)?;
        }
        // CGRAM writes move the address counter; go back to the text cursor
        let (col, row) = self.cursor;
        self.move_to(col, row)
    }

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), DisplayError> {
        if col >= self.columns || row >= DISPLAY_ROWS {
            return Err(DisplayError::InvalidPosition);
        }
        self.move_to(col, row)?;
        self.cursor = (col, row);
        Ok(())
    }

    fn write_glyph(&mut self, code: u8) -> Result<(), DisplayError> {
        self.write_byte(code, true)?;
        self.cursor.0 = self.cursor.0.saturating_add(1);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.command(CMD_CLEAR)?;
        self.delay.delay_us(CLEAR_US);
        self.cursor = (0, 0);
        Ok(())
    }

    fn blink(&mut self, pattern: BlinkPattern) -> Result<(), DisplayError> {
        let half = pattern.period_ms as u32 / 2;
        for _ in 0..pattern.flashes {
            self.command(CMD_DISPLAY_CONTROL)?;
            self.delay.delay_ms(half);
            self.command(CMD_DISPLAY_CONTROL | DISPLAY_ON)?;
            self.delay.delay_ms(half);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use core::convert::Infallible;
    use std::rc::Rc;

    /// Bus levels and the nibbles latched on each enable falling edge
    #[derive(Default)]
    struct Bus {
        levels: [bool; 6],
        latched: Vec<(bool, u8)>,
    }

    const RS: usize = 0;
    const EN: usize = 1;

    struct FakePin {
        id: usize,
        bus: Rc<RefCell<Bus>>,
    }

    impl embedded_hal::digital::ErrorType for FakePin {
        type Error = Infallible;
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            let mut bus = self.bus.borrow_mut();
            if self.id == EN && bus.levels[EN] {
                let nibble = (0..4).fold(0u8, |acc, bit| acc | ((bus.levels[2 + bit] as u8) << bit));
                let rs = bus.levels[RS];
                bus.latched.push((rs, nibble));
            }
            bus.levels[self.id] = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.bus.borrow_mut().levels[self.id] = true;
            Ok(())
        }
    }

    /// Delay that only adds up the requested time
    #[derive(Default)]
    struct FakeDelay {
        total_ns: u64,
    }

    impl DelayNs for FakeDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += ns as u64;
        }
    }

    fn lcd() -> (Hd44780<FakePin, FakeDelay>, Rc<RefCell<Bus>>) {
        let bus = Rc::new(RefCell::new(Bus::default()));
        let pin = |id| FakePin {
            id,
            bus: bus.clone(),
        };
        let lcd = Hd44780::new(
            pin(RS),
            pin(EN),
            [pin(2), pin(3), pin(4), pin(5)],
            FakeDelay::default(),
            16,
        )
        .unwrap();
        (lcd, bus)
    }

    /// Bytes written after the nibble-mode reset, as (is_data, byte)
    fn bytes(bus: &Rc<RefCell<Bus>>) -> Vec<(bool, u8)> {
        let bus = bus.borrow();
        bus.latched[4..]
            .chunks(2)
            .map(|pair| (pair[0].0, (pair[0].1 << 4) | pair[1].1))
            .collect()
    }

    fn take_bytes(bus: &Rc<RefCell<Bus>>) -> Vec<(bool, u8)> {
        let out = bytes(bus);
        bus.borrow_mut().latched.truncate(4);
        out
    }

    #[test]
    fn test_init_sequence() {
        let (_lcd, bus) = lcd();
        let nibbles: Vec<u8> = bus.borrow().latched[..4].iter().map(|&(_, n)| n).collect();
        assert_eq!(nibbles, [0x3, 0x3, 0x3, 0x2]);
        assert_eq!(
            bytes(&bus),
            [(false, 0x28), (false, 0x0C), (false, 0x01), (false, 0x06)]
        );
    }

    #[test]
    fn test_cursor_addressing() {
        let (mut lcd, bus) = lcd();
        take_bytes(&bus);
        lcd.set_cursor(3, 1).unwrap();
        lcd.write_glyph(b'A').unwrap();
        assert_eq!(take_bytes(&bus), [(false, 0xC3), (true, b'A')]);
        assert_eq!(lcd.cursor, (4, 1));
    }

    #[test]
    fn test_invalid_position() {
        let (mut lcd, _bus) = lcd();
        assert_eq!(lcd.set_cursor(16, 0), Err(DisplayError::InvalidPosition));
        assert_eq!(lcd.set_cursor(0, 2), Err(DisplayError::InvalidPosition));
    }

    #[test]
    fn test_glyph_upload_masks_and_restores_cursor() {
        let (mut lcd, bus) = lcd();
        lcd.set_cursor(5, 0).unwrap();
        take_bytes(&bus);

        lcd.load_glyph(1, &[0xFF, 0x1F, 0xE0, 0, 0, 0, 0, 0x21]).unwrap();
        let written = take_bytes(&bus);
        assert_eq!(written[0], (false, 0x48));
        let rows: Vec<u8> = written[1..9].iter().map(|&(_, b)| b).collect();
        assert_eq!(rows, [0x1F, 0x1F, 0x00, 0, 0, 0, 0, 0x01]);
        assert_eq!(written[9], (false, 0x85));
    }

    #[test]
    fn test_invalid_slot() {
        let (mut lcd, _bus) = lcd();
        assert_eq!(lcd.load_glyph(8, &[0; 8]), Err(DisplayError::InvalidSlot));
    }

    #[test]
    fn test_blink_toggles_display() {
        let (mut lcd, bus) = lcd();
        take_bytes(&bus);
        let before = lcd.delay.total_ns;
        lcd.blink(BlinkPattern {
            flashes: 2,
            period_ms: 200,
        })
        .unwrap();
        assert_eq!(
            take_bytes(&bus),
            [(false, 0x08), (false, 0x0C), (false, 0x08), (false, 0x0C)]
        );
        assert!(lcd.delay.total_ns - before >= 400_000_000);
    }
}
