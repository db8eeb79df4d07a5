//! Persistent storage for the user configuration.
//!
//! The record lives in a byte-addressed non-volatile store (the external
//! 24C512 EEPROM on the real board) so it survives power cycles.
//!
//! Storage layout:
//!   - `MARKER_ADDR` holds a validity marker; the payload is trusted only
//!     when it equals `MARKER`.
//!   - `PAYLOAD_ADDR..` holds the `AppConfig::SIZE`-byte payload.
//!   - Saves only write bytes that changed, payload first and marker last,
//!     so an interrupted save never validates a half-written record.

use crate::config::{MARKER, MARKER_ADDR, PAYLOAD_ADDR};
use crate::error::Error;
use crate::power::AutoOffTier;
use crate::protocol::{
    RgbMode, SideLedMode, MAX_RGB_BRIGHTNESS, MAX_RGB_SPEED, MAX_SIDE_BRIGHTNESS, MAX_SIDE_SPEED,
};

/// Byte-level non-volatile storage.
pub trait NvStore {
    fn read_byte(&mut self, addr: u16) -> Result<u8, Error>;
    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), Error>;
}

/// Artwork shown on the right half of the dashboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum HomeArt {
    Logo = 0,
    BongoCat,
    Cube,
    Space,
}

impl HomeArt {
    pub const COUNT: u8 = 4;

    /// Out-of-range values fall back to the logo.
    pub fn from_index(index: u8) -> Self {
        match index {
            1 => Self::BongoCat,
            2 => Self::Cube,
            3 => Self::Space,
            _ => Self::Logo,
        }
    }

    /// Next artwork in either direction, wrapping.
    pub fn cycle(self, forward: bool) -> Self {
        let step = if forward { 1 } else { Self::COUNT - 1 };
        Self::from_index((self as u8 + step) % Self::COUNT)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OledConfig {
    pub brightness: u8,
    pub invert: bool,
    pub auto_off: AutoOffTier,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RgbConfig {
    pub mode: RgbMode,
    pub brightness: u8,
    pub saturation: u8,
    pub hue: u8,
    pub hue2: u8,
    /// User-facing speed, higher is faster.
    pub speed: u8,
    pub auto_off: AutoOffTier,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SideLedConfig {
    pub mode: SideLedMode,
    pub brightness: u8,
    pub speed: u8,
    pub auto_off: AutoOffTier,
}

/// Everything the user can change in the settings menus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppConfig {
    pub oled: OledConfig,
    pub rgb: RgbConfig,
    pub side: SideLedConfig,
    pub home_art: HomeArt,
}

impl Default for AppConfig {
    /// Factory defaults, written back on first boot.
    fn default() -> Self {
        Self {
            oled: OledConfig {
                brightness: 180,
                invert: false,
                auto_off: AutoOffTier::Never,
            },
            rgb: RgbConfig {
                mode: RgbMode::Ripple,
                brightness: MAX_RGB_BRIGHTNESS / 2,
                saturation: 0xFF,
                hue: 60,
                hue2: 200,
                speed: MAX_RGB_SPEED,
                auto_off: AutoOffTier::Never,
            },
            side: SideLedConfig {
                mode: SideLedMode::KeyFlash,
                brightness: MAX_SIDE_BRIGHTNESS,
                speed: MAX_SIDE_SPEED,
                auto_off: AutoOffTier::Never,
            },
            home_art: HomeArt::Logo,
        }
    }
}

impl AppConfig {
    /// Serialized payload size.
    pub const SIZE: usize = 15;

    /// Serialize to the on-storage byte order.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        [
            self.oled.brightness,
            self.oled.invert as u8,
            self.oled.auto_off.index(),
            self.rgb.mode as u8,
            self.rgb.brightness,
            self.rgb.saturation,
            self.rgb.hue,
            self.rgb.hue2,
            self.rgb.speed,
            self.rgb.auto_off.index(),
            self.side.mode as u8,
            self.side.brightness,
            self.side.speed,
            self.side.auto_off.index(),
            self.home_art as u8,
        ]
    }

    /// Deserialize, clamping every field into its valid range.
    pub fn from_bytes(b: &[u8; Self::SIZE]) -> Self {
        let defaults = Self::default();
        Self {
            oled: OledConfig {
                brightness: b[0],
                invert: b[1] & 1 != 0,
                auto_off: AutoOffTier::from_index(b[2]),
            },
            rgb: RgbConfig {
                mode: RgbMode::from_u8(b[3]).unwrap_or(defaults.rgb.mode),
                brightness: b[4].min(MAX_RGB_BRIGHTNESS),
                saturation: b[5],
                hue: b[6],
                hue2: b[7],
                speed: b[8].min(MAX_RGB_SPEED),
                auto_off: AutoOffTier::from_index(b[9]),
            },
            side: SideLedConfig {
                mode: SideLedMode::from_u8(b[10]).unwrap_or(defaults.side.mode),
                brightness: b[11].min(MAX_SIDE_BRIGHTNESS),
                speed: b[12].min(MAX_SIDE_SPEED),
                auto_off: AutoOffTier::from_index(b[13]),
            },
            home_art: HomeArt::from_index(b[14]),
        }
    }
}

/// Configuration record mirrored to a [`NvStore`].
pub struct ConfigStore<S> {
    store: S,
}

impl<S: NvStore> ConfigStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Read the record. `Ok(None)` when the marker does not match.
    pub fn load(&mut self) -> Result<Option<AppConfig>, Error> {
        if self.store.read_byte(MARKER_ADDR)? != MARKER {
            return Ok(None);
        }

        let mut buf = [0u8; AppConfig::SIZE];
        for (i, byte) in buf.iter_mut().enumerate() {
            *byte = self.store.read_byte(PAYLOAD_ADDR + i as u16)?;
        }
        Ok(Some(AppConfig::from_bytes(&buf)))
    }

    /// Persist the record. Returns the number of bytes actually written.
    pub fn save(&mut self, cfg: &AppConfig) -> Result<usize, Error> {
        let mut written = 0;
        for (i, byte) in cfg.to_bytes().iter().enumerate() {
            if self.update_byte(PAYLOAD_ADDR + i as u16, *byte)? {
                written += 1;
            }
        }
        if self.update_byte(MARKER_ADDR, MARKER)? {
            written += 1;
        }

        if written > 0 {
            debug!("Storage: saved config ({} bytes changed)", written);
        }
        Ok(written)
    }

    /// Load the record, or write back factory defaults when no valid record
    /// exists. Driver errors are treated as "no valid record".
    pub fn load_or_init(&mut self) -> AppConfig {
        match self.load() {
            Ok(Some(cfg)) => {
                info!("Storage: loaded config");
                return cfg;
            }
            Ok(None) => info!("Storage: no valid config, writing defaults"),
            Err(e) => error!("Storage: load failed: {:?}", e),
        }

        let cfg = AppConfig::default();
        if let Err(e) = self.save(&cfg) {
            error!("Storage: failed to write defaults: {:?}", e);
        }
        cfg
    }

    /// Write `value` only when it differs from the stored byte.
    fn update_byte(&mut self, addr: u16, value: u8) -> Result<bool, Error> {
        if self.store.read_byte(addr)? == value {
            return Ok(false);
        }
        self.store.write_byte(addr, value)?;
        Ok(true)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    struct Mem {
        bytes: [u8; 64],
        writes: usize,
        fail: bool,
    }

    impl Mem {
        fn blank() -> Self {
            Self {
                bytes: [0xFF; 64],
                writes: 0,
                fail: false,
            }
        }
    }

    impl NvStore for Mem {
        fn read_byte(&mut self, addr: u16) -> Result<u8, Error> {
            if self.fail {
                return Err(Error::Storage);
            }
            Ok(self.bytes[addr as usize])
        }

        fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), Error> {
            if self.fail {
                return Err(Error::Storage);
            }
            self.writes += 1;
            self.bytes[addr as usize] = value;
            Ok(())
        }
    }

    #[test]
    fn blank_store_has_no_record() {
        let mut store = ConfigStore::new(Mem::blank());
        assert_eq!(store.load(), Ok(None));
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut store = ConfigStore::new(Mem::blank());
        let mut cfg = AppConfig::default();
        cfg.rgb.hue = 7;
        cfg.oled.invert = true;
        cfg.side.auto_off = AutoOffTier::Secs600;
        cfg.home_art = HomeArt::Space;

        store.save(&cfg).unwrap();
        assert_eq!(store.load(), Ok(Some(cfg)));
    }

    #[test]
    fn marker_is_written_last() {
        let mut store = ConfigStore::new(Mem::blank());
        store.save(&AppConfig::default()).unwrap();
        assert_eq!(store.store().bytes[MARKER_ADDR as usize], MARKER);
        assert_eq!(store.store().bytes[PAYLOAD_ADDR as usize], 180);
    }

    #[test]
    fn unchanged_save_writes_nothing() {
        let mut store = ConfigStore::new(Mem::blank());
        let cfg = AppConfig::default();
        store.save(&cfg).unwrap();
        let before = store.store().writes;

        assert_eq!(store.save(&cfg), Ok(0));
        assert_eq!(store.store().writes, before);
    }

    #[test]
    fn single_field_change_writes_one_byte() {
        let mut store = ConfigStore::new(Mem::blank());
        let mut cfg = AppConfig::default();
        store.save(&cfg).unwrap();

        cfg.rgb.saturation = 12;
        assert_eq!(store.save(&cfg), Ok(1));
    }

    #[test]
    fn load_or_init_writes_defaults_on_bad_marker() {
        let mut store = ConfigStore::new(Mem::blank());
        store.store_mut().bytes[MARKER_ADDR as usize] = 0x05;

        let cfg = store.load_or_init();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(store.load(), Ok(Some(AppConfig::default())));
    }

    #[test]
    fn load_or_init_survives_driver_errors() {
        let mut mem = Mem::blank();
        mem.fail = true;
        let mut store = ConfigStore::new(mem);
        assert_eq!(store.load_or_init(), AppConfig::default());
    }

    #[test]
    fn out_of_range_fields_are_clamped() {
        let mut bytes = AppConfig::default().to_bytes();
        bytes[2] = 42; // oled tier
        bytes[3] = 99; // rgb mode
        bytes[4] = 200; // rgb brightness
        bytes[8] = 99; // rgb speed
        bytes[10] = 9; // side mode
        bytes[11] = 255; // side brightness
        bytes[12] = 11; // side speed
        bytes[14] = 17; // art

        let cfg = AppConfig::from_bytes(&bytes);
        assert_eq!(cfg.oled.auto_off, AutoOffTier::Never);
        assert_eq!(cfg.rgb.mode, RgbMode::Ripple);
        assert_eq!(cfg.rgb.brightness, MAX_RGB_BRIGHTNESS);
        assert_eq!(cfg.rgb.speed, MAX_RGB_SPEED);
        assert_eq!(cfg.side.mode, SideLedMode::KeyFlash);
        assert_eq!(cfg.side.brightness, MAX_SIDE_BRIGHTNESS);
        assert_eq!(cfg.side.speed, MAX_SIDE_SPEED);
        assert_eq!(cfg.home_art, HomeArt::Logo);
    }

    #[test]
    fn home_art_cycles_both_ways() {
        assert_eq!(HomeArt::Logo.cycle(true), HomeArt::BongoCat);
        assert_eq!(HomeArt::Space.cycle(true), HomeArt::Logo);
        assert_eq!(HomeArt::Logo.cycle(false), HomeArt::Space);
    }
}
