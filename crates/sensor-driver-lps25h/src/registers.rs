//! LPS25H register map.
//!
//! Addresses from the ST LPS25H datasheet. Only [`MEASUREMENT_TRIGGER_REG`]
//! is used by the read path today; pressure and temperature decoding from the
//! output registers is not implemented yet.

/// Default 7-bit device address (SA0 pulled high).
pub const DEFAULT_I2C_ADDR: u8 = 0x5c;

/// Highest valid 7-bit device address.
pub const MAX_I2C_ADDR: u8 = 0x7f;

/// Device identification register.
pub const WHO_AM_I: u8 = 0x0F;

/// Control register 1 (power down, output data rate, block data update).
pub const CTRL_REG1: u8 = 0x20;

/// Control register 2 (boot, FIFO, software reset, one-shot).
pub const CTRL_REG2: u8 = 0x21;

/// Pressure output, low byte of the 24-bit value.
pub const PRESS_OUT_XL: u8 = 0x28;

/// Pressure output, middle byte.
pub const PRESS_OUT_L: u8 = 0x29;

/// Pressure output, high byte.
pub const PRESS_OUT_H: u8 = 0x2A;

/// Temperature output, low byte.
pub const TEMP_OUT_L: u8 = 0x2B;

/// Temperature output, high byte.
pub const TEMP_OUT_H: u8 = 0x2C;

/// Soft-reset command byte. Not written yet: the correct reset register for
/// this part is unconfirmed.
pub const RESET_REG: u8 = 0xE0;

/// Byte written before each measurement read.
pub const MEASUREMENT_TRIGGER_REG: u8 = 0x5c;

/// Bytes read per measurement.
pub const MEASUREMENT_LEN: usize = 8;
