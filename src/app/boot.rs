//! Staged replay of the stored lighting settings to the co-processor.
//!
//! The co-processor boots with its own defaults. After power-up the stored
//! values are pushed one command per tick, each only when its busy line is
//! low, so the replay never fills the pending slot.

use crate::app::{Context, Platform};
use crate::protocol::{rgb_speed_wire, Opcode, PeripheralCommand};
use crate::storage::AppConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootStep {
    RgbEffect,
    RgbSaturation,
    RgbBrightness,
    RgbHue,
    RgbHue2,
    RgbSpeed,
    SideEffect,
    SideBrightness,
    SideSpeed,
    Done,
}

impl BootStep {
    pub const FIRST: Self = BootStep::RgbEffect;

    pub fn is_done(self) -> bool {
        self == BootStep::Done
    }

    fn next(self) -> Self {
        match self {
            BootStep::RgbEffect => BootStep::RgbSaturation,
            BootStep::RgbSaturation => BootStep::RgbBrightness,
            BootStep::RgbBrightness => BootStep::RgbHue,
            BootStep::RgbHue => BootStep::RgbHue2,
            BootStep::RgbHue2 => BootStep::RgbSpeed,
            BootStep::RgbSpeed => BootStep::SideEffect,
            BootStep::SideEffect => BootStep::SideBrightness,
            BootStep::SideBrightness => BootStep::SideSpeed,
            BootStep::SideSpeed | BootStep::Done => BootStep::Done,
        }
    }

    /// Command replayed at this step.
    pub fn command(self, cfg: &AppConfig) -> Option<PeripheralCommand> {
        let (opcode, value) = match self {
            BootStep::RgbEffect => (Opcode::RgbEffect, cfg.rgb.mode as u8),
            BootStep::RgbSaturation => (Opcode::RgbSaturation, cfg.rgb.saturation),
            BootStep::RgbBrightness => (Opcode::RgbBrightness, cfg.rgb.brightness),
            BootStep::RgbHue => (Opcode::RgbHue, cfg.rgb.hue),
            BootStep::RgbHue2 => (Opcode::RgbHue2, cfg.rgb.hue2),
            BootStep::RgbSpeed => (Opcode::RgbSpeed, rgb_speed_wire(cfg.rgb.speed)),
            BootStep::SideEffect => (Opcode::SideEffect, cfg.side.mode as u8),
            BootStep::SideBrightness => (Opcode::SideBrightness, cfg.side.brightness),
            BootStep::SideSpeed => (Opcode::SideSpeed, cfg.side.speed),
            BootStep::Done => return None,
        };
        Some(PeripheralCommand::with_byte(opcode, value))
    }
}

/// Run one replay step. Waits (returns `step` unchanged) while the
/// co-processor is busy. A failed write is not retried; the replay moves on.
pub(crate) fn advance<P: Platform>(cx: &mut Context<P>, step: BootStep) -> BootStep {
    let Some(cmd) = step.command(&cx.config) else {
        return BootStep::Done;
    };
    if cx.channel.is_busy() {
        return step;
    }

    let _ = cx.channel.send(cmd);
    let next = step.next();
    if next.is_done() {
        info!("Boot: lighting settings replayed");
    }
    next
}
