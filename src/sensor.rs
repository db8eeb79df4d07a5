//! Climate sensor interface used by the dashboard.

use crate::error::Error;

/// One reading, in tenths of a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Climate {
    /// Temperature in 0.1 °C.
    pub temperature_tenths: i16,
    /// Relative humidity in 0.1 %.
    pub humidity_tenths: u16,
}

/// Two-phase sensor: start a measurement, read it back later.
pub trait ClimateSensor {
    fn trigger(&mut self) -> Result<(), Error>;
    fn read(&mut self) -> Result<Climate, Error>;
}
