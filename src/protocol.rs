//! Command protocol of the lighting co-processor.
//!
//! Every command is a single I²C write: one opcode byte followed by up to
//! four payload bytes. The co-processor never answers; it signals that it
//! cannot accept a write by raising its busy line.

/// Maximum payload bytes after the opcode.
pub const MAX_PAYLOAD: usize = 4;

/// Upper bound of the per-key RGB brightness.
pub const MAX_RGB_BRIGHTNESS: u8 = 50;

/// Upper bound of the user-facing RGB speed.
pub const MAX_RGB_SPEED: u8 = 50;

/// Upper bound of the side light brightness.
pub const MAX_SIDE_BRIGHTNESS: u8 = 127;

/// Upper bound of the side light speed.
pub const MAX_SIDE_SPEED: u8 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Opcode {
    RgbEffect = 3,
    RgbHue = 4,
    RgbHue2 = 5,
    RgbBrightness = 6,
    RgbSaturation = 7,
    RgbSpeed = 8,
    /// Payload: LED index of the key that was pressed.
    RgbKeypress = 9,
    SideEffect = 20,
    SideBrightness = 21,
    SideSpeed = 22,
    Ping = 50,
}

/// Per-key RGB effects, in wire order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum RgbMode {
    Off = 0,
    Solid,
    Breath,
    Rainbow,
    RainbowHorizontal,
    RainbowVertical,
    GradientHorizontal,
    GradientVertical,
    Raindrops,
    Track,
    TrackRgb,
    Ripple,
    RippleRgb,
    Noise,
    Test,
}

impl RgbMode {
    pub const COUNT: u8 = 15;

    /// Decode a wire/storage value, `None` when out of range.
    pub fn from_u8(value: u8) -> Option<Self> {
        use RgbMode::*;
        const ALL: [RgbMode; RgbMode::COUNT as usize] = [
            Off,
            Solid,
            Breath,
            Rainbow,
            RainbowHorizontal,
            RainbowVertical,
            GradientHorizontal,
            GradientVertical,
            Raindrops,
            Track,
            TrackRgb,
            Ripple,
            RippleRgb,
            Noise,
            Test,
        ];
        ALL.get(value as usize).copied()
    }
}

/// Side light effects, in wire order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SideLedMode {
    Off = 0,
    Breath,
    KeyFlash,
    Solid,
}

impl SideLedMode {
    pub const COUNT: u8 = 4;

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Off),
            1 => Some(Self::Breath),
            2 => Some(Self::KeyFlash),
            3 => Some(Self::Solid),
            _ => None,
        }
    }
}

/// The co-processor counts speed as a frame delay, so larger is slower.
/// The UI shows "higher is faster"; this maps one onto the other.
pub fn rgb_speed_wire(speed: u8) -> u8 {
    10 + MAX_RGB_SPEED - speed.min(MAX_RGB_SPEED)
}

/// One encoded command, ready for the bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeripheralCommand {
    bytes: [u8; 1 + MAX_PAYLOAD],
    len: u8,
}

impl PeripheralCommand {
    /// Build a command; payload beyond [`MAX_PAYLOAD`] bytes is dropped.
    pub fn new(opcode: Opcode, payload: &[u8]) -> Self {
        let n = payload.len().min(MAX_PAYLOAD);
        let mut bytes = [0u8; 1 + MAX_PAYLOAD];
        bytes[0] = opcode as u8;
        bytes[1..1 + n].copy_from_slice(&payload[..n]);
        Self {
            bytes,
            len: (1 + n) as u8,
        }
    }

    /// The common two-byte form: opcode + one value.
    pub fn with_byte(opcode: Opcode, value: u8) -> Self {
        Self::new(opcode, &[value])
    }

    pub fn opcode(&self) -> u8 {
        self.bytes[0]
    }

    /// Wire bytes, opcode first.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_carries_opcode_then_payload() {
        let cmd = PeripheralCommand::new(Opcode::SideEffect, &[2]);
        assert_eq!(cmd.as_bytes(), &[20, 2]);
        assert_eq!(cmd.opcode(), Opcode::SideEffect as u8);
    }

    #[test]
    fn command_payload_is_truncated() {
        let cmd = PeripheralCommand::new(Opcode::Ping, &[1, 2, 3, 4, 5, 6]);
        assert_eq!(cmd.as_bytes(), &[50, 1, 2, 3, 4]);
    }

    #[test]
    fn empty_payload_is_opcode_only() {
        let cmd = PeripheralCommand::new(Opcode::Ping, &[]);
        assert_eq!(cmd.as_bytes(), &[50]);
    }

    #[test]
    fn speed_is_inverted_on_the_wire() {
        assert_eq!(rgb_speed_wire(0), 60);
        assert_eq!(rgb_speed_wire(MAX_RGB_SPEED), 10);
        assert_eq!(rgb_speed_wire(200), 10);
    }

    #[test]
    fn mode_decoding_rejects_out_of_range() {
        assert_eq!(RgbMode::from_u8(0), Some(RgbMode::Off));
        assert_eq!(RgbMode::from_u8(14), Some(RgbMode::Test));
        assert_eq!(RgbMode::from_u8(15), None);
        assert_eq!(SideLedMode::from_u8(3), Some(SideLedMode::Solid));
        assert_eq!(SideLedMode::from_u8(4), None);
    }
}
