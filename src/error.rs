//! Unified error type for keypanel.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging when the
//! `defmt` feature is enabled.

/// Top-level error type used across the application.
///
/// None of these are fatal: callers either retry on the next tick or fall
/// back to defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Peripheral link
    /// The lighting controller holds its busy line; the command was parked
    /// in the pending slot.
    PeripheralBusy,

    /// An I²C transaction to the lighting controller failed.
    Bus,

    // Storage
    /// EEPROM read/write failed.
    Storage,

    // Sensor
    /// The climate sensor did not answer or reported busy.
    Sensor,
}
