//! AHT21 humidity / temperature sensor.
//!
//! Measurement is two-phase: [`trigger`](ClimateSensor::trigger) starts a
//! conversion (~80 ms) and [`read`](ClimateSensor::read) fetches the result
//! on a later tick. The sensor reports 20-bit humidity and temperature; only
//! the upper 16 bits of each are used.

use embedded_hal::i2c::I2c;

use crate::config::AHT21_I2C_ADDR;
use crate::error::Error;
use crate::sensor::{Climate, ClimateSensor};

const CMD_TRIGGER: [u8; 3] = [0xAC, 0x33, 0x00];
const STATUS_BUSY: u8 = 0x80;

pub struct Aht21<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> Aht21<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c> ClimateSensor for Aht21<I2C> {
    fn trigger(&mut self) -> Result<(), Error> {
        self.i2c
            .write(AHT21_I2C_ADDR, &CMD_TRIGGER)
            .map_err(|_| Error::Sensor)
    }

    fn read(&mut self) -> Result<Climate, Error> {
        let mut buf = [0u8; 7];
        self.i2c
            .read(AHT21_I2C_ADDR, &mut buf)
            .map_err(|_| Error::Sensor)?;
        decode(&buf).ok_or(Error::Sensor)
    }
}

/// Convert a raw 7-byte frame; `None` while the busy bit is set.
///
/// Layout after the status byte: `HHHHHHHH HHHHHHHH HHHHTTTT TTTTTTTT
/// TTTTTTTT`, then a CRC byte.
pub fn decode(buf: &[u8; 7]) -> Option<Climate> {
    if buf[0] & STATUS_BUSY != 0 {
        return None;
    }

    let humidity_raw = u32::from(u16::from_be_bytes([buf[1], buf[2]]));
    let temperature_raw = (u32::from(buf[3] & 0x0F) << 12)
        | (u32::from(buf[4]) << 4)
        | u32::from(buf[5] >> 4);

    Some(Climate {
        temperature_tenths: ((temperature_raw * 2000) >> 16) as i16 - 500,
        humidity_tenths: ((humidity_raw * 1000) >> 16) as u16,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::mock::MockI2c;

    #[test]
    fn trigger_sends_measure_command() {
        let mut sensor = Aht21::new(MockI2c::default());
        sensor.trigger().unwrap();
        let bus = sensor.release();
        assert_eq!(bus.writes, vec![(0x38, vec![0xAC, 0x33, 0x00])]);
    }

    #[test]
    fn decodes_half_scale() {
        // humidity 0x8000 -> 50.0 %, temperature 0x8000 -> 50.0 °C
        let frame = [0x1C, 0x80, 0x00, 0x08, 0x00, 0x00, 0x00];
        assert_eq!(
            decode(&frame),
            Some(Climate {
                temperature_tenths: 500,
                humidity_tenths: 500,
            })
        );
    }

    #[test]
    fn decodes_below_zero() {
        // temperature raw 0x2000 -> 0.125 * 200 - 50 = -25.0 °C
        let frame = [0x1C, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00];
        let c = decode(&frame).unwrap();
        assert_eq!(c.temperature_tenths, -250);
        assert_eq!(c.humidity_tenths, 0);
    }

    #[test]
    fn busy_frame_is_an_error() {
        let bus = MockI2c {
            reads: vec![vec![0x80, 0, 0, 0, 0, 0, 0]],
            ..Default::default()
        };
        let mut sensor = Aht21::new(bus);
        assert_eq!(sensor.read(), Err(Error::Sensor));
    }

    #[test]
    fn bus_failure_is_an_error() {
        let bus = MockI2c {
            fail: true,
            ..Default::default()
        };
        let mut sensor = Aht21::new(bus);
        assert_eq!(sensor.trigger(), Err(Error::Sensor));
        assert_eq!(sensor.read(), Err(Error::Sensor));
    }
}
