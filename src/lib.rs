//! keypanel - OLED menu engine and peripheral coordination for a keyboard
//! with a rotary encoder, a lighting co-processor and an EEPROM.
//!
//! Everything in this crate except the `embedded` binary is plain logic over
//! `embedded-hal` traits and small collaborator traits, so it runs on the
//! host for `cargo test --lib` and `cargo test --test integration`.
//!
//! Note: The firmware binary lives in main.rs with #![no_std] and #![no_main]
//! and needs `--features embedded`.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod app;
pub mod clock;
pub mod config;
pub mod drivers;
pub mod encoder;
pub mod error;
pub mod key_rate;
pub mod peripheral;
pub mod power;
pub mod protocol;
pub mod sensor;
pub mod storage;
pub mod ui;

pub use app::{App, Context, Platform};
pub use error::Error;

// ═══════════════════════════════════════════════════════════════════════════
// Cross-module Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use crate::config;
    use crate::power::{tier_expired, AutoOffTier};
    use crate::protocol::{rgb_speed_wire, Opcode, PeripheralCommand, RgbMode};
    use crate::storage::AppConfig;

    // ════════════════════════════════════════════════════════════════════════
    // Configuration Constants
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn frame_counts_follow_frame_rate() {
        assert_eq!(config::FRAME_RATE_HZ, 20);
        assert_eq!(config::frames(1000), 20);
        assert_eq!(config::frames(3000), config::FLASH_FRAMES as u32);
    }

    #[test]
    fn auto_off_tier_table_matches_menu() {
        assert_eq!(config::AUTO_OFF_TIERS_SECS.len(), 7);
        for (i, secs) in config::AUTO_OFF_TIERS_SECS.iter().enumerate() {
            assert_eq!(AutoOffTier::from_index(i as u8).threshold_secs(), *secs);
        }
    }

    #[test]
    fn payload_fits_behind_marker() {
        assert!(config::PAYLOAD_ADDR > config::MARKER_ADDR);
        assert_eq!(AppConfig::default().to_bytes().len(), AppConfig::SIZE);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Wire Encoding
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn default_rgb_speed_goes_out_inverted() {
        let cfg = AppConfig::default();
        assert_eq!(rgb_speed_wire(cfg.rgb.speed), 10);
        let cmd = PeripheralCommand::with_byte(Opcode::RgbSpeed, rgb_speed_wire(0));
        assert_eq!(cmd.as_bytes(), &[8, 60]);
    }

    #[test]
    fn default_effect_is_ripple() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.rgb.mode, RgbMode::Ripple);
        assert_eq!(cfg.rgb.mode as u8, 11);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Auto-off Policy
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn tier_never_does_not_expire() {
        assert!(!tier_expired(AutoOffTier::Never, u32::MAX));
    }

    #[test]
    fn tier_expires_strictly_after_threshold() {
        assert!(!tier_expired(AutoOffTier::Secs10, 10));
        assert!(tier_expired(AutoOffTier::Secs10, 11));
        assert!(!tier_expired(AutoOffTier::Secs3600, 3600));
        assert!(tier_expired(AutoOffTier::Secs3600, 3601));
    }
}
