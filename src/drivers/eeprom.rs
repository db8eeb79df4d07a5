//! 24C512 I²C EEPROM (64 KiB, 2-byte big-endian word address).

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::config::{EEPROM_I2C_ADDR, EEPROM_PAGE_SIZE, EEPROM_WRITE_TIME_MS};
use crate::error::Error;
use crate::storage::NvStore;

pub struct Eeprom24c512<I2C, D> {
    i2c: I2C,
    delay: D,
}

impl<I2C: I2c, D: DelayNs> Eeprom24c512<I2C, D> {
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self { i2c, delay }
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Sequential read starting at `addr`.
    pub fn read(&mut self, addr: u16, buf: &mut [u8]) -> Result<(), Error> {
        self.i2c
            .write_read(EEPROM_I2C_ADDR, &addr.to_be_bytes(), buf)
            .map_err(|_| Error::Storage)
    }

    /// Write `data` at `addr`, split on page boundaries. Each page write is
    /// followed by the self-timed write cycle.
    pub fn write(&mut self, addr: u16, data: &[u8]) -> Result<(), Error> {
        let mut packet = [0u8; 2 + EEPROM_PAGE_SIZE];
        let mut target = addr;
        let mut rest = data;

        while !rest.is_empty() {
            let room = EEPROM_PAGE_SIZE - usize::from(target) % EEPROM_PAGE_SIZE;
            let (chunk, tail) = rest.split_at(room.min(rest.len()));

            packet[..2].copy_from_slice(&target.to_be_bytes());
            packet[2..2 + chunk.len()].copy_from_slice(chunk);
            self.i2c
                .write(EEPROM_I2C_ADDR, &packet[..2 + chunk.len()])
                .map_err(|_| Error::Storage)?;
            self.delay.delay_ms(EEPROM_WRITE_TIME_MS);

            target = target.wrapping_add(chunk.len() as u16);
            rest = tail;
        }
        Ok(())
    }
}

impl<I2C: I2c, D: DelayNs> NvStore for Eeprom24c512<I2C, D> {
    fn read_byte(&mut self, addr: u16) -> Result<u8, Error> {
        let mut b = [0u8; 1];
        self.read(addr, &mut b)?;
        Ok(b[0])
    }

    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), Error> {
        self.write(addr, &[value])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::mock::MockI2c;

    #[derive(Default)]
    struct CountingDelay {
        ms: u32,
    }

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.ms += ns / 1_000_000;
        }
    }

    #[test]
    fn read_byte_sends_big_endian_address() {
        let bus = MockI2c {
            reads: vec![vec![0x42]],
            ..Default::default()
        };
        let mut rom = Eeprom24c512::new(bus, CountingDelay::default());
        assert_eq!(rom.read_byte(0x0106), Ok(0x42));
        let (bus, _) = rom.release();
        assert_eq!(bus.writes, vec![(0x57, vec![0x01, 0x06])]);
    }

    #[test]
    fn write_byte_waits_for_write_cycle() {
        let mut rom = Eeprom24c512::new(MockI2c::default(), CountingDelay::default());
        rom.write_byte(5, 0x06).unwrap();
        let (bus, delay) = rom.release();
        assert_eq!(bus.writes, vec![(0x57, vec![0x00, 0x05, 0x06])]);
        assert_eq!(delay.ms, EEPROM_WRITE_TIME_MS);
    }

    #[test]
    fn block_write_splits_on_page_boundary() {
        let mut rom = Eeprom24c512::new(MockI2c::default(), CountingDelay::default());
        rom.write(126, &[1, 2, 3, 4]).unwrap();
        let (bus, _) = rom.release();
        assert_eq!(
            bus.writes,
            vec![
                (0x57, vec![0x00, 126, 1, 2]),
                (0x57, vec![0x00, 128, 3, 4]),
            ]
        );
    }

    #[test]
    fn bus_error_maps_to_storage() {
        let bus = MockI2c {
            fail: true,
            ..Default::default()
        };
        let mut rom = Eeprom24c512::new(bus, CountingDelay::default());
        assert_eq!(rom.read_byte(0), Err(Error::Storage));
        assert_eq!(rom.write_byte(0, 1), Err(Error::Storage));
    }
}
