// Bus device, board address, timing
use std::ops::RangeInclusive;
use std::time::Duration;

// I2C bus the board is wired to (Raspberry Pi header pins 3/5)
pub const DEFAULT_I2C_BUS: &str = "/dev/i2c-1";

// Factory default board address
pub const DEFAULT_BOARD_ADDRESS: u8 = 0x10;

// Addresses a board can be assigned, and the range scanned by discovery
pub const BOARD_ADDRESS_RANGE: RangeInclusive<u8> = 1..=127;

// Time for the board to re-lock its PWM timer after a frequency change
pub const PWM_SETTLE_DELAY: Duration = Duration::from_millis(100);
