//! Rotary encoder acceleration.
//!
//! Screens that adjust wide ranges (brightness 0-255, hue) opt in with a
//! ceiling. While detents keep arriving faster than
//! [`FAST_ROTATION_WINDOW_MS`] apart, the step multiplier grows by two per
//! detent up to the ceiling; a slower detent drops it back to one.

use crate::clock::elapsed_ms;
use crate::config::FAST_ROTATION_WINDOW_MS;

#[derive(Clone, Copy, Debug, Default)]
pub struct RotaryAccel {
    ceiling: u8,
    multiplier: u8,
    last: Option<u32>,
}

impl RotaryAccel {
    pub const fn new() -> Self {
        Self {
            ceiling: 0,
            multiplier: 1,
            last: None,
        }
    }

    /// Allow up to `ceiling` steps per detent; 0 disables acceleration.
    pub fn enable(&mut self, ceiling: u8) {
        self.ceiling = ceiling;
    }

    /// Back to one step per detent, acceleration off.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn ceiling(&self) -> u8 {
        self.ceiling
    }

    /// Number of rotation callbacks for a detent arriving at `now`.
    pub fn steps(&mut self, now: u32) -> u8 {
        if self.ceiling == 0 {
            return 1;
        }

        let fast = self
            .last
            .is_some_and(|t| elapsed_ms(now, t) < FAST_ROTATION_WINDOW_MS);
        self.multiplier = if fast {
            self.multiplier.saturating_add(2).min(self.ceiling)
        } else {
            1
        };
        self.last = Some(now);
        self.multiplier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_is_always_one_step() {
        let mut acc = RotaryAccel::new();
        for t in [0, 10, 20, 30] {
            assert_eq!(acc.steps(t), 1);
        }
    }

    #[test]
    fn fast_detents_ramp_up_to_ceiling() {
        let mut acc = RotaryAccel::new();
        acc.enable(10);
        let steps: Vec<u8> = (0..7).map(|i| acc.steps(i * 50)).collect();
        assert_eq!(steps, vec![1, 3, 5, 7, 9, 10, 10]);
    }

    #[test]
    fn slow_detent_drops_back_to_one() {
        let mut acc = RotaryAccel::new();
        acc.enable(10);
        acc.steps(0);
        assert_eq!(acc.steps(50), 3);
        assert_eq!(acc.steps(350), 1);
        assert_eq!(acc.steps(549), 3);
        assert_eq!(acc.steps(749), 1);
    }

    #[test]
    fn small_ceiling_caps_first_ramp() {
        let mut acc = RotaryAccel::new();
        acc.enable(1);
        acc.steps(0);
        assert_eq!(acc.steps(10), 1);

        acc.enable(4);
        assert_eq!(acc.steps(20), 3);
        assert_eq!(acc.steps(30), 4);
    }

    #[test]
    fn reset_forgets_history() {
        let mut acc = RotaryAccel::new();
        acc.enable(10);
        acc.steps(0);
        acc.reset();
        acc.enable(10);
        assert_eq!(acc.steps(10), 1);
        assert_eq!(acc.ceiling(), 10);
    }
}
