//! Drivers for the parts on the shared I²C bus.
//!
//! Each one is generic over `embedded_hal` traits so the firmware passes in
//! a bus device from `embedded-hal-bus` and the tests pass in a mock.

pub mod aht21;
pub mod eeprom;
pub mod tiny_link;

pub use aht21::Aht21;
pub use eeprom::Eeprom24c512;
pub use tiny_link::I2cLink;

#[cfg(test)]
pub(crate) mod mock {
    //! Scripted I²C bus shared by the driver tests.

    use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation};

    #[derive(Default)]
    pub struct MockI2c {
        /// (address, bytes) of every write, including the write half of
        /// write-read transactions.
        pub writes: Vec<(u8, Vec<u8>)>,
        /// Bytes handed out to reads, front first.
        pub reads: Vec<Vec<u8>>,
        pub fail: bool,
    }

    impl ErrorType for MockI2c {
        type Error = ErrorKind;
    }

    impl I2c for MockI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.fail {
                return Err(ErrorKind::Other);
            }
            for op in operations {
                match op {
                    Operation::Write(bytes) => self.writes.push((address, bytes.to_vec())),
                    Operation::Read(buf) => {
                        if self.reads.is_empty() {
                            return Err(ErrorKind::Other);
                        }
                        let data = self.reads.remove(0);
                        let n = buf.len().min(data.len());
                        buf[..n].copy_from_slice(&data[..n]);
                    }
                }
            }
            Ok(())
        }
    }
}
