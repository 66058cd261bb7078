//! MMA7660 three-axis accelerometer over I²C.

use rppal::i2c::I2c;
use tracing::trace;

use vibewatch_traits::{Accelerometer, Axes};

use crate::error::{HwError, Result};

pub const ADDRESS: u16 = 0x4C;
const REG_XOUT: u8 = 0x00;
const REG_MODE: u8 = 0x07;
const MODE_ACTIVE: u8 = 0x01;
const MODE_STANDBY: u8 = 0x00;
/// Counts per g in the ±1.5 g range.
const COUNTS_PER_G: f32 = 21.33;
/// Set while the device is updating an output register.
const ALERT_BIT: u8 = 0x40;

pub struct Mma7660 {
    i2c: I2c,
}

impl Mma7660 {
    pub fn new(bus: u8) -> Result<Self> {
        let mut i2c = I2c::with_bus(bus).map_err(|e| HwError::I2c(e.to_string()))?;
        i2c.set_slave_address(ADDRESS)
            .map_err(|e| HwError::I2c(e.to_string()))?;
        let dev = Self { i2c };
        dev.write_reg(REG_MODE, MODE_STANDBY)?;
        dev.write_reg(REG_MODE, MODE_ACTIVE)?;
        Ok(dev)
    }

    fn write_reg(&self, reg: u8, value: u8) -> Result<()> {
        self.i2c
            .smbus_write_byte(reg, value)
            .map_err(|e| HwError::I2c(e.to_string()))
    }

    fn read_raw(&self) -> Result<[u8; 3]> {
        let mut buf = [0u8; 3];
        // Retry while any axis is mid-update.
        for _ in 0..4 {
            self.i2c
                .write_read(&[REG_XOUT], &mut buf)
                .map_err(|e| HwError::I2c(e.to_string()))?;
            if buf.iter().all(|b| b & ALERT_BIT == 0) {
                return Ok(buf);
            }
        }
        Err(HwError::I2c("output registers kept alerting".into()))
    }
}

/// 6-bit two's complement to counts.
fn sign_extend6(b: u8) -> i8 {
    let v = (b & 0x3F) as i8;
    if v & 0x20 != 0 { v - 0x40 } else { v }
}

impl Accelerometer for Mma7660 {
    fn read_axes(&mut self) -> std::result::Result<Axes, Box<dyn std::error::Error + Send + Sync>> {
        let raw = self.read_raw()?;
        let axes = raw.map(|b| f32::from(sign_extend6(b)) / COUNTS_PER_G);
        trace!(x = axes[0], y = axes[1], z = axes[2], "mma7660 read");
        Ok(axes)
    }

    fn probe(&mut self) -> bool {
        let mut mode = [0u8; 1];
        self.i2c.write_read(&[REG_MODE], &mut mode).is_ok() && mode[0] & MODE_ACTIVE != 0
    }
}

#[cfg(test)]
mod tests {
    use super::sign_extend6;

    #[test]
    fn six_bit_values_are_sign_extended() {
        assert_eq!(sign_extend6(0x00), 0);
        assert_eq!(sign_extend6(0x1F), 31);
        assert_eq!(sign_extend6(0x20), -32);
        assert_eq!(sign_extend6(0x3F), -1);
        assert_eq!(sign_extend6(0x7F), -1);
    }
}
