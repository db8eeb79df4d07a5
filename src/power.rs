//! Power management - idle tracking and auto-off of the display and lights.
//!
//! Implements:
//! - Per-subsystem auto-off after a configurable idle time
//! - Settings auto-return to the dashboard
//!
//! Subsystems (checked in this priority, one action per tick):
//! - Display: switched off directly through the driver
//! - Per-key RGB: "off" effect sent to the co-processor
//! - Side light: "off" effect sent to the co-processor
//!
//! Recovery is lazy: the next key press wakes whatever was switched off
//! (see `App::tick`).

use crate::clock::elapsed_ms;
use crate::config::AUTO_OFF_TIERS_SECS;
use crate::peripheral::{PeripheralChannel, PeripheralLink};
use crate::protocol::{Opcode, RgbMode, SideLedMode};
use crate::storage::AppConfig;
use crate::ui::Display;

/// Selectable idle thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AutoOffTier {
    Never = 0,
    Secs10,
    Secs60,
    Secs300,
    Secs600,
    Secs1800,
    Secs3600,
}

impl AutoOffTier {
    pub const COUNT: u8 = AUTO_OFF_TIERS_SECS.len() as u8;

    /// Out-of-range indices fall back to `Never`.
    pub fn from_index(index: u8) -> Self {
        match index {
            1 => Self::Secs10,
            2 => Self::Secs60,
            3 => Self::Secs300,
            4 => Self::Secs600,
            5 => Self::Secs1800,
            6 => Self::Secs3600,
            _ => Self::Never,
        }
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    /// Idle seconds after which the subsystem switches off, 0 for never.
    pub fn threshold_secs(self) -> u32 {
        AUTO_OFF_TIERS_SECS[self as usize]
    }
}

/// Decide whether a subsystem should be switched off after `idle_secs`.
pub fn tier_expired(tier: AutoOffTier, idle_secs: u32) -> bool {
    if tier == AutoOffTier::Never {
        return false;
    }

    idle_secs > tier.threshold_secs()
}

/// What `run_auto_off` did this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AutoOffAction {
    DisplayOff,
    RgbOff,
    SideOff,
}

/// Activity timestamp plus the engaged state of the light auto-offs.
#[derive(Clone, Copy, Debug)]
pub struct IdleTimers {
    last_activity: u32,
    pub rgb_off: bool,
    pub side_off: bool,
    auto_return: Option<u8>,
}

impl IdleTimers {
    pub fn new(now: u32) -> Self {
        Self {
            last_activity: now,
            rgb_off: false,
            side_off: false,
            auto_return: None,
        }
    }

    /// Record activity (key press, encoder turn).
    pub fn activity(&mut self, now: u32) {
        self.last_activity = now;
    }

    pub fn idle_ms(&self, now: u32) -> u32 {
        elapsed_ms(now, self.last_activity)
    }

    pub fn idle_secs(&self, now: u32) -> u32 {
        self.idle_ms(now) / 1000
    }

    /// Return to the dashboard after `secs` of inactivity; 0 disables.
    /// Arming counts as activity.
    pub fn arm_auto_return(&mut self, secs: u8, now: u32) {
        self.auto_return = (secs > 0).then_some(secs);
        self.last_activity = now;
    }

    pub fn disarm_auto_return(&mut self) {
        self.auto_return = None;
    }

    pub fn auto_return(&self) -> Option<u8> {
        self.auto_return
    }

    pub fn auto_return_due(&self, now: u32) -> bool {
        self.auto_return
            .is_some_and(|secs| self.idle_secs(now) > u32::from(secs))
    }
}

/// Apply at most one auto-off action, display first.
///
/// Light auto-offs are attempted only while the co-processor is idle and
/// are marked engaged only when the "off" command actually went out. Nothing
/// is parked in the pending slot, so a busy co-processor is simply asked
/// again next tick.
pub fn run_auto_off<D, L>(
    idle: &mut IdleTimers,
    now: u32,
    cfg: &AppConfig,
    display: &mut D,
    channel: &mut PeripheralChannel<L>,
) -> Option<AutoOffAction>
where
    D: Display,
    L: PeripheralLink,
{
    let idle_secs = idle.idle_secs(now);

    if display.is_on() && tier_expired(cfg.oled.auto_off, idle_secs) {
        info!("Power: display off after {=u32}s idle", idle_secs);
        display.off();
        return Some(AutoOffAction::DisplayOff);
    }

    if !idle.rgb_off
        && tier_expired(cfg.rgb.auto_off, idle_secs)
        && !channel.is_busy()
        && channel
            .send_byte(Opcode::RgbEffect, RgbMode::Off as u8)
            .is_ok()
    {
        info!("Power: RGB off after {=u32}s idle", idle_secs);
        idle.rgb_off = true;
        return Some(AutoOffAction::RgbOff);
    }

    if !idle.side_off
        && tier_expired(cfg.side.auto_off, idle_secs)
        && !channel.is_busy()
        && channel
            .send_byte(Opcode::SideEffect, SideLedMode::Off as u8)
            .is_ok()
    {
        info!("Power: side light off after {=u32}s idle", idle_secs);
        idle.side_off = true;
        return Some(AutoOffAction::SideOff);
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════
