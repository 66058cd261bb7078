//! LM75B digital thermometer over I²C.

use rppal::i2c::I2c;

use vibewatch_traits::Thermometer;

use crate::error::{HwError, Result};

pub const ADDRESS: u16 = 0x48;
const REG_TEMP: u8 = 0x00;

pub struct Lm75b {
    i2c: I2c,
}

impl Lm75b {
    pub fn new(bus: u8) -> Result<Self> {
        let mut i2c = I2c::with_bus(bus).map_err(|e| HwError::I2c(e.to_string()))?;
        i2c.set_slave_address(ADDRESS)
            .map_err(|e| HwError::I2c(e.to_string()))?;
        Ok(Self { i2c })
    }
}

/// Temperature register to °C: 11-bit two's complement, 0.125 °C per LSB.
pub(crate) fn decode(msb: u8, lsb: u8) -> f32 {
    let raw = i16::from_be_bytes([msb, lsb]) >> 5;
    f32::from(raw) * 0.125
}

impl Thermometer for Lm75b {
    fn read_celsius(&mut self) -> std::result::Result<f32, Box<dyn std::error::Error + Send + Sync>> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(&[REG_TEMP], &mut buf)
            .map_err(|e| HwError::I2c(e.to_string()))?;
        let c = decode(buf[0], buf[1]);
        tracing::trace!(celsius = c, "lm75b read");
        Ok(c)
    }
}
