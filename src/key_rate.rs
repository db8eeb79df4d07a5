//! Keys-per-minute estimator.
//!
//! Each press folds the instantaneous rate (60000 / ms since the previous
//! press) into an exponential average weighted 1:12. Between presses the
//! estimate decays by 12/13 every [`KEY_RATE_DECAY_MS`], so it drifts to
//! zero once typing stops.

use crate::clock::elapsed_ms;
use crate::config::KEY_RATE_DECAY_MS;

#[derive(Clone, Copy, Debug, Default)]
pub struct KeyRateCounter {
    total: u32,
    rate: u16,
    last: Option<u32>,
}

impl KeyRateCounter {
    pub const fn new() -> Self {
        Self {
            total: 0,
            rate: 0,
            last: None,
        }
    }

    pub fn record_press(&mut self, now: u32) {
        self.total = self.total.wrapping_add(1);
        if let Some(last) = self.last {
            let instant = 60_000 / elapsed_ms(now, last).max(1);
            let blended = (instant + 12 * u32::from(self.rate)) / 13;
            self.rate = blended.min(u32::from(u16::MAX)) as u16;
        }
        self.last = Some(now);
    }

    /// Called often from the scan loop; only acts after a quiet period.
    pub fn decay(&mut self, now: u32) {
        let Some(last) = self.last else {
            return;
        };
        if elapsed_ms(now, last) > KEY_RATE_DECAY_MS {
            self.rate = (u32::from(self.rate) * 12 / 13) as u16;
            self.last = Some(now);
        }
    }

    /// Current keys-per-minute estimate.
    pub fn rate(&self) -> u16 {
        self.rate
    }

    /// Presses since boot.
    pub fn total(&self) -> u32 {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_press_only_counts() {
        let mut k = KeyRateCounter::new();
        k.record_press(1_000);
        assert_eq!(k.total(), 1);
        assert_eq!(k.rate(), 0);
    }

    #[test]
    fn steady_typing_raises_rate() {
        let mut k = KeyRateCounter::new();
        k.record_press(0);
        k.record_press(100); // 600 kpm instant
        assert_eq!(k.rate(), 600 / 13);
        k.record_press(200);
        assert_eq!(k.rate(), ((600 + 12 * (600 / 13)) / 13) as u16);
    }

    #[test]
    fn same_millisecond_press_does_not_divide_by_zero() {
        let mut k = KeyRateCounter::new();
        k.record_press(5);
        k.record_press(5);
        assert_eq!(k.rate(), (60_000 / 13) as u16);
    }

    #[test]
    fn decay_waits_for_quiet_period() {
        let mut k = KeyRateCounter::new();
        k.record_press(0);
        k.record_press(100);
        let r = k.rate();
        k.decay(600);
        assert_eq!(k.rate(), r);
        k.decay(601);
        assert_eq!(k.rate(), (u32::from(r) * 12 / 13) as u16);
    }

    #[test]
    fn decay_reaches_zero_and_stays() {
        let mut k = KeyRateCounter::new();
        k.record_press(0);
        k.record_press(50);
        let mut now = 50;
        let mut prev = k.rate();
        while k.rate() > 0 {
            now += 501;
            k.decay(now);
            assert!(k.rate() < prev);
            prev = k.rate();
        }
        now += 501;
        k.decay(now);
        assert_eq!(k.rate(), 0);
    }

    #[test]
    fn decay_without_presses_is_noop() {
        let mut k = KeyRateCounter::new();
        k.decay(10_000);
        assert_eq!(k.rate(), 0);
    }
}
