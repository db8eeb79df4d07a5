//! Millisecond time source.
//!
//! The host supplies a free-running 32-bit millisecond counter. All elapsed
//! times are computed with wrapping arithmetic so the ~49-day rollover is
//! harmless.

/// Monotonic millisecond counter.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

/// Milliseconds from `since` to `now`, tolerant of counter wrap.
pub fn elapsed_ms(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

/// `true` once `now` is at or past `deadline`.
pub fn reached(now: u32, deadline: u32) -> bool {
    now.wrapping_sub(deadline) as i32 >= 0
}

/// `true` once `now` is strictly past `deadline`.
pub fn passed(now: u32, deadline: u32) -> bool {
    now.wrapping_sub(deadline) as i32 > 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_survives_wrap() {
        assert_eq!(elapsed_ms(5, u32::MAX - 4), 10);
        assert_eq!(elapsed_ms(1000, 400), 600);
    }

    #[test]
    fn deadline_comparisons() {
        assert!(!reached(99, 100));
        assert!(reached(100, 100));
        assert!(!passed(100, 100));
        assert!(passed(101, 100));
        // deadline just after the wrap point
        assert!(!reached(u32::MAX, 3));
        assert!(reached(3, u32::MAX));
    }
}
