//! Application-wide constants and compile-time configuration.
//!
//! Screen geometry, timing parameters, storage layout and bus addresses
//! live here so they can be tuned in one place. Runtime settings are the
//! persisted [`AppConfig`](crate::storage::AppConfig) record.

// Screen

/// OLED panel width in pixels.
pub const SCREEN_WIDTH: u8 = 128;

/// OLED panel height in pixels.
pub const SCREEN_HEIGHT: u8 = 64;

/// Text pages (8 px rows) on the panel.
pub const SCREEN_LINES: u8 = 8;

/// Width of one character cell (5 px glyph + 1 px gap).
pub const CHAR_WIDTH: u8 = 6;

/// Character cells on one text line, also the slider bar length.
pub const BAR_CELLS: u8 = SCREEN_WIDTH / CHAR_WIDTH;

// Timing

/// Draw tick rate driven by the host.
pub const FRAME_RATE_HZ: u32 = 20;

/// Convert a duration to a number of draw ticks.
pub const fn frames(ms: u32) -> u32 {
    ms * FRAME_RATE_HZ / 1000
}

/// Two encoder detents closer than this count as fast rotation.
pub const FAST_ROTATION_WINDOW_MS: u32 = 200;

/// Settings root returns to the dashboard after this much inactivity.
pub const SETTINGS_AUTO_RETURN_SECS: u8 = 4;

/// Key-rate estimate starts decaying once no key arrived for this long.
pub const KEY_RATE_DECAY_MS: u32 = 500;

/// Auto-off thresholds selectable in the menus, index 0 = never.
pub const AUTO_OFF_TIERS_SECS: [u32; 7] = [0, 10, 60, 300, 600, 1800, 3600];

// Dashboard

/// Sensor cycle: trigger at frame 0, read at 2.5 s, show at 5 s,
/// restart at 55 s.
pub const SENSOR_READ_FRAME: u16 = frames(2_500) as u16;
pub const SENSOR_SHOW_FRAME: u16 = frames(5_000) as u16;
pub const SENSOR_CYCLE_FRAMES: u16 = frames(55_000) as u16;

/// Text on the bottom dashboard line.
pub const FIRMWARE_LABEL: &str = concat!("keypanel v", env!("CARGO_PKG_VERSION"));

// Pomodoro timer

pub const TOMATO_DEFAULT_MINUTES: u8 = 25;
pub const TOMATO_MIN_MINUTES: u8 = 1;
pub const TOMATO_MAX_MINUTES: u8 = 60;
pub const TOMATO_REST_MINUTES: u32 = 5;

/// Invert toggles whenever the flash frame counter has these bits set.
pub const FLASH_TOGGLE_MASK: u8 = 0x07;

/// Length of the end-of-work flash (3 s).
pub const FLASH_FRAMES: u8 = frames(3_000) as u8;

// Configuration storage (external EEPROM)

/// Address of the validity marker byte.
pub const MARKER_ADDR: u16 = 5;

/// Marker value; bump when the payload layout changes.
pub const MARKER: u8 = 0x06;

/// First payload byte.
pub const PAYLOAD_ADDR: u16 = 6;

// I²C bus
//
//   Lighting MCU → 0x5C, busy line on a GPIO (high = busy)
//   AHT21        → 0x38
//   24C512       → 0x57

/// 7-bit address of the lighting co-processor.
pub const TINY_I2C_ADDR: u8 = 0x5C;

/// 7-bit address of the AHT21 climate sensor.
pub const AHT21_I2C_ADDR: u8 = 0x38;

/// 7-bit address of the 24C512 EEPROM.
pub const EEPROM_I2C_ADDR: u8 = 0x57;

/// 24C512 page size in bytes.
pub const EEPROM_PAGE_SIZE: usize = 128;

/// 24C512 self-timed write cycle.
pub const EEPROM_WRITE_TIME_MS: u32 = 3;

// Keys

/// Matrix position of the encoder push switch.
pub const ACTIVATE_KEY: (u8, u8) = (0, 0);

/// Matrix position of the function key.
pub const FN_KEY: (u8, u8) = (4, 1);

/// Row whose keys make the bongo cat slap with both paws.
pub const BONGO_BOTH_ROW: u8 = 4;

/// Columns left of this use the left paw.
pub const BONGO_LEFT_COLS: u8 = 7;

/// HID usage: Escape.
pub const ESCAPE_KEYCODE: u16 = 0x29;

/// HID usage: Space.
pub const TIMER_START_KEYCODE: u16 = 0x2C;

/// Encoder push switch debounce time (ms).
pub const BUTTON_DEBOUNCE_MS: u64 = 20;
