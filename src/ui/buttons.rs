//! Rotary encoder input with async debouncing.
//!
//! Two tasks feed one channel consumed by the UI loop:
//!   - the QDEC peripheral reports detents as signed counts
//!   - the push switch (active-low with internal pull-up) reports press and
//!     release, debounced
//!
//! The push switch is wired as matrix key (0, 0) so it goes through the
//! same key path as the rest of the keyboard.

use crate::config::BUTTON_DEBOUNCE_MS;
use embassy_nrf::gpio::Input;
use embassy_nrf::peripherals;
use embassy_nrf::qdec::Qdec;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Sender;
use embassy_time::{Duration, Timer};

/// Encoder activity delivered to the UI loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum KnobEvent {
    Rotate { clockwise: bool },
    Switch { pressed: bool },
}

pub type KnobSender = Sender<'static, CriticalSectionRawMutex, KnobEvent, 8>;

/// Forward every detent reported by the quadrature decoder.
pub async fn encoder_task(mut qdec: Qdec<'static, peripherals::QDEC>, tx: KnobSender) -> ! {
    loop {
        let delta = qdec.read().await;
        let clockwise = delta > 0;
        for _ in 0..delta.unsigned_abs() {
            tx.send(KnobEvent::Rotate { clockwise }).await;
        }
    }
}

/// Push switch loop: wait for an edge, debounce, report, repeat for the
/// release.
pub async fn switch_task(mut btn: Input<'static>, tx: KnobSender) -> ! {
    loop {
        btn.wait_for_falling_edge().await;
        Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;

        if btn.is_low() {
            debug!("Knob: pressed");
            tx.send(KnobEvent::Switch { pressed: true }).await;

            btn.wait_for_rising_edge().await;
            Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;
            tx.send(KnobEvent::Switch { pressed: false }).await;
        }
    }
}
