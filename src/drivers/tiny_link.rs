//! I²C transport to the lighting co-processor.
//!
//! The co-processor drives a GPIO high while it cannot service the bus.
//! A pin read error counts as busy, so nothing is written blind.

use embedded_hal::digital::InputPin;
use embedded_hal::i2c::I2c;

use crate::config::TINY_I2C_ADDR;
use crate::error::Error;
use crate::peripheral::PeripheralLink;

pub struct I2cLink<I2C, BUSY> {
    i2c: I2C,
    busy: BUSY,
}

impl<I2C: I2c, BUSY: InputPin> I2cLink<I2C, BUSY> {
    pub fn new(i2c: I2C, busy: BUSY) -> Self {
        Self { i2c, busy }
    }

    pub fn release(self) -> (I2C, BUSY) {
        (self.i2c, self.busy)
    }
}

impl<I2C: I2c, BUSY: InputPin> PeripheralLink for I2cLink<I2C, BUSY> {
    fn is_busy(&mut self) -> bool {
        self.busy.is_high().unwrap_or(true)
    }

    fn transmit(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.i2c
            .write(TINY_I2C_ADDR, bytes)
            .map_err(|_| Error::Bus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::mock::MockI2c;
    use embedded_hal::digital::{ErrorKind, ErrorType};

    struct Pin(Option<bool>);

    impl ErrorType for Pin {
        type Error = ErrorKind;
    }

    impl InputPin for Pin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            self.0.ok_or(ErrorKind::Other)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            self.is_high().map(|h| !h)
        }
    }

    #[test]
    fn busy_follows_pin_level() {
        let mut link = I2cLink::new(MockI2c::default(), Pin(Some(true)));
        assert!(link.is_busy());
        let mut link = I2cLink::new(MockI2c::default(), Pin(Some(false)));
        assert!(!link.is_busy());
    }

    #[test]
    fn unreadable_pin_counts_as_busy() {
        let mut link = I2cLink::new(MockI2c::default(), Pin(None));
        assert!(link.is_busy());
    }

    #[test]
    fn transmit_writes_to_coprocessor_address() {
        let mut link = I2cLink::new(MockI2c::default(), Pin(Some(false)));
        link.transmit(&[3, 11]).unwrap();
        let (bus, _) = link.release();
        assert_eq!(bus.writes, vec![(0x5C, vec![3, 11])]);
    }

    #[test]
    fn bus_error_maps_to_bus() {
        let bus = MockI2c {
            fail: true,
            ..Default::default()
        };
        let mut link = I2cLink::new(bus, Pin(Some(false)));
        assert_eq!(link.transmit(&[50]), Err(Error::Bus));
    }
}
