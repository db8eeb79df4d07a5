//! Pomodoro ("tomato") timer.
//!
//! ```text
//! Idle ──▶ SetTime ──Space──▶ WorkTimer ──deadline──▶ Flash ──3 s──▶ RestTimer ──deadline──▶ Idle
//! ```
//!
//! The timer state lives in the app context rather than in the screen, so
//! a running countdown keeps going while the user is elsewhere and is
//! picked up again when the timer screen is reopened.

use core::fmt::Write;

use crate::app::{Context, Platform};
use crate::clock::{passed, reached};
use crate::config::{
    ESCAPE_KEYCODE, FLASH_FRAMES, FLASH_TOGGLE_MASK, TIMER_START_KEYCODE, TOMATO_DEFAULT_MINUTES,
    TOMATO_MAX_MINUTES, TOMATO_MIN_MINUTES, TOMATO_REST_MINUTES,
};
use crate::ui::{Bitmap, Display, InvertMode, KeyEvent, Reaction, Route};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TomatoState {
    #[default]
    Idle,
    SetTime,
    WorkTimer,
    Flash,
    RestTimer,
}

/// Display side effects of one timer tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TomatoFrame {
    pub toggle_invert: bool,
    pub restore_invert: bool,
    /// Phase changed in a way that needs a fresh screen.
    pub redraw: bool,
}

enum Step {
    /// Stable for this tick.
    Stay,
    /// Move on and evaluate the new state in the same tick.
    Now(TomatoState),
    /// Move on; the new state first runs on the next tick.
    NextTick(TomatoState),
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TomatoTimer {
    state: TomatoState,
    deadline: u32,
    /// Work length; 0 until first configured.
    minutes: u8,
    flash_frames: u8,
}

impl TomatoTimer {
    pub const fn new() -> Self {
        Self {
            state: TomatoState::Idle,
            deadline: 0,
            minutes: 0,
            flash_frames: 0,
        }
    }

    pub fn state(&self) -> TomatoState {
        self.state
    }

    pub fn minutes(&self) -> u8 {
        self.minutes
    }

    /// Run the state machine for one tick, following immediate transitions
    /// until a state is stable.
    pub fn advance(&mut self, now: u32) -> TomatoFrame {
        let mut frame = TomatoFrame::default();
        loop {
            match self.transition(now, &mut frame) {
                Step::Stay => return frame,
                Step::Now(next) => self.state = next,
                Step::NextTick(next) => {
                    self.state = next;
                    return frame;
                }
            }
        }
    }

    fn transition(&mut self, now: u32, frame: &mut TomatoFrame) -> Step {
        match self.state {
            TomatoState::Idle => {
                if self.minutes == 0 {
                    self.minutes = TOMATO_DEFAULT_MINUTES;
                }
                Step::Now(TomatoState::SetTime)
            }
            TomatoState::SetTime => Step::Stay,
            TomatoState::WorkTimer => {
                if passed(now, self.deadline) {
                    self.flash_frames = 0;
                    Step::NextTick(TomatoState::Flash)
                } else {
                    Step::Stay
                }
            }
            TomatoState::Flash => {
                self.flash_frames = self.flash_frames.saturating_add(1);
                if self.flash_frames & FLASH_TOGGLE_MASK == FLASH_TOGGLE_MASK {
                    frame.toggle_invert = true;
                }
                if self.flash_frames > FLASH_FRAMES {
                    frame.restore_invert = true;
                    frame.redraw = true;
                    self.deadline = rest_deadline(now);
                    Step::NextTick(TomatoState::RestTimer)
                } else {
                    Step::Stay
                }
            }
            TomatoState::RestTimer => {
                if reached(now, self.deadline) {
                    frame.redraw = true;
                    Step::NextTick(TomatoState::Idle)
                } else {
                    Step::Stay
                }
            }
        }
    }

    /// Clockwise shortens the work period. Only while setting the time.
    pub fn adjust(&mut self, clockwise: bool) -> bool {
        if self.state != TomatoState::SetTime {
            return false;
        }
        self.minutes = if clockwise {
            self.minutes.saturating_sub(1)
        } else {
            self.minutes.saturating_add(1)
        }
        .clamp(TOMATO_MIN_MINUTES, TOMATO_MAX_MINUTES);
        true
    }

    /// Start the work countdown. Only while setting the time.
    pub fn start(&mut self, now: u32) -> bool {
        if self.state != TomatoState::SetTime {
            return false;
        }
        self.deadline = now.wrapping_add(u32::from(self.minutes) * 60_000);
        self.state = TomatoState::WorkTimer;
        info!("Tomato: {=u8} min started", self.minutes);
        true
    }

    /// The timer screen is being left. A flash in progress is cut short and
    /// the rest period starts now. Returns `true` when the display invert
    /// has to be handed back.
    pub fn leave(&mut self, now: u32) -> bool {
        if self.state != TomatoState::Flash {
            return false;
        }
        self.deadline = rest_deadline(now);
        self.state = TomatoState::RestTimer;
        debug!("Tomato: flash cut short");
        true
    }

    /// Whole seconds left on the running countdown.
    pub fn remaining_secs(&self, now: u32) -> u32 {
        match self.state {
            TomatoState::WorkTimer | TomatoState::RestTimer if !reached(now, self.deadline) => {
                self.deadline.wrapping_sub(now) / 1000
            }
            TomatoState::SetTime => u32::from(self.minutes) * 60,
            _ => 0,
        }
    }
}

fn rest_deadline(now: u32) -> u32 {
    now.wrapping_add(TOMATO_REST_MINUTES * 60_000)
}

fn write_clock<D: Display + ?Sized>(display: &mut D, seconds: u32) {
    if seconds > 3600 {
        return;
    }
    let mut s: heapless::String<16> = heapless::String::new();
    let _ = write!(s, "{:2} : {:02}", seconds / 60, seconds % 60);
    display.write(&s, false);
}

/// One frame of the timer screen. Returns `true` to redraw from scratch on
/// the next tick.
pub fn draw<P: Platform>(cx: &mut Context<P>) -> bool {
    let now = cx.now();
    let first = cx.first_frame();
    let state_before = cx.tomato.state();

    if first {
        let d = &mut cx.display;
        d.clear();
        d.set_cursor(0, 2);
        d.draw_bitmap(Bitmap::Tomato);
        match state_before {
            TomatoState::WorkTimer => {
                d.set_cursor(42, 2);
                d.write("Tomato Timer", false);
            }
            TomatoState::RestTimer => {
                d.set_cursor(45, 2);
                d.write("Have a rest!", false);
                d.set_cursor(45, 7);
                d.write("Press: exit", false);
            }
            _ => {}
        }
    }

    let frame = cx.tomato.advance(now);
    let d = &mut cx.display;
    if frame.toggle_invert {
        d.invert(InvertMode::Toggle);
    }
    if frame.restore_invert {
        d.invert(InvertMode::from(cx.config.oled.invert));
    }

    match cx.tomato.state() {
        TomatoState::SetTime => {
            d.set_cursor(47, 1);
            d.write("Tomato Timer", false);
            d.set_cursor(45, 5);
            d.write("Space:start", false);
            d.set_cursor(45, 6);
            d.write("Rotate:adjust", false);
            d.set_cursor(45, 7);
            d.write("Press:exit", false);
            d.set_cursor(54, 3);
            write_clock(d, cx.tomato.remaining_secs(now));
        }
        TomatoState::WorkTimer | TomatoState::RestTimer if state_before == cx.tomato.state() => {
            d.set_cursor(54, 5);
            write_clock(d, cx.tomato.remaining_secs(now));
        }
        _ => {}
    }

    frame.redraw
}

/// Restore the configured invert if the timer is left mid-flash.
pub fn leave<P: Platform>(cx: &mut Context<P>) {
    if cx.tomato.leave(cx.now()) {
        cx.display.invert(InvertMode::from(cx.config.oled.invert));
    }
}

pub fn on_rotate<P: Platform>(cx: &mut Context<P>, clockwise: bool) -> Reaction {
    if cx.tomato.adjust(clockwise) {
        Reaction::STOP
    } else {
        Reaction::CONTINUE
    }
}

/// Escape leaves the timer (the key still reaches the host), Space starts
/// the countdown.
pub fn on_key<P: Platform>(cx: &mut Context<P>, event: KeyEvent) -> Reaction {
    if !event.pressed {
        return Reaction::CONTINUE;
    }

    if event.keycode == ESCAPE_KEYCODE {
        leave(cx);
        return Reaction {
            propagate: true,
            route: Some(Route::Dashboard),
            redraw: false,
        };
    }

    if event.keycode == TIMER_START_KEYCODE && cx.tomato.start(cx.now()) {
        return Reaction {
            propagate: false,
            route: None,
            redraw: true,
        };
    }

    Reaction::CONTINUE
}

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════
