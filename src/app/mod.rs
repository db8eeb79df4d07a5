//! Application state machine.
//!
//! [`App`] is the composition root. It owns the collaborators (through
//! [`Context`]) and exactly one active [`Screen`], and exposes the three
//! host entry points:
//!
//! ```text
//! 20 Hz ticker ──▶ tick()            auto-return, auto-off, key LED, boot/drain, draw
//! key matrix   ──▶ handle_key()      activate key, LED staging, key listener
//! encoder      ──▶ handle_rotate()   acceleration, screen rotation
//! ```
//!
//! Callbacks never switch screens themselves. They return a [`Reaction`]
//! and the app applies its [`Route`], rebuilding the target screen from
//! scratch.

pub mod boot;

use crate::clock::Clock;
use crate::config::ACTIVATE_KEY;
use crate::encoder::RotaryAccel;
use crate::key_rate::KeyRateCounter;
use crate::peripheral::{PeripheralChannel, PeripheralLink};
use crate::power::{run_auto_off, AutoOffAction, IdleTimers};
use crate::protocol::Opcode;
use crate::sensor::ClimateSensor;
use crate::storage::{AppConfig, ConfigStore, NvStore};
use crate::ui::tomato::TomatoTimer;
use crate::ui::{
    Dashboard, Display, InvertMode, KeyEvent, KeyListener, LockLeds, MenuState, Reaction, Route,
    Screen,
};

use boot::BootStep;

/// Hardware collaborators of one board.
pub trait Platform {
    type Display: Display;
    type Link: PeripheralLink;
    type Store: NvStore;
    type Sensor: ClimateSensor;
    type Clock: Clock;
}

/// Everything screens may touch: collaborators, the configuration record
/// and state that outlives a screen switch.
pub struct Context<P: Platform> {
    pub display: P::Display,
    pub channel: PeripheralChannel<P::Link>,
    pub store: ConfigStore<P::Store>,
    pub sensor: P::Sensor,
    pub clock: P::Clock,
    pub config: AppConfig,
    pub idle: IdleTimers,
    pub key_rate: KeyRateCounter,
    pub tomato: TomatoTimer,
    pub host_leds: LockLeds,
    /// Function key currently held (dashboard artwork selection).
    pub fn_held: bool,
    first_frame: bool,
}

impl<P: Platform> Context<P> {
    pub fn now(&self) -> u32 {
        self.clock.now_ms()
    }

    /// `true` on the first draw after a screen switch or redraw request.
    pub fn first_frame(&self) -> bool {
        self.first_frame
    }

    /// Write the configuration record. Failures are logged; the record stays
    /// in RAM and goes out with the next save.
    pub fn save_config(&mut self) {
        if let Err(e) = self.store.save(&self.config) {
            warn!("Config: save failed: {:?}", e);
        }
    }

    /// Send the configured RGB effect. A busy co-processor gets it later.
    pub fn apply_rgb_effect(&mut self) {
        let _ = self
            .channel
            .send_byte(Opcode::RgbEffect, self.config.rgb.mode as u8);
    }

    /// Send the configured side light mode.
    pub fn apply_side_effect(&mut self) {
        let _ = self
            .channel
            .send_byte(Opcode::SideEffect, self.config.side.mode as u8);
    }
}

pub struct App<P: Platform> {
    cx: Context<P>,
    screen: Screen,
    listener: Option<KeyListener>,
    accel: RotaryAccel,
    /// LED index of the last key press, not yet reported.
    key_led: Option<u8>,
    boot: BootStep,
}

impl<P: Platform> App<P> {
    /// Load the configuration (writing factory defaults on first boot),
    /// apply the display settings and open the dashboard. The lighting
    /// settings follow over the next ticks.
    pub fn new(
        mut display: P::Display,
        link: P::Link,
        store: P::Store,
        sensor: P::Sensor,
        clock: P::Clock,
    ) -> Self {
        let mut store = ConfigStore::new(store);
        let config = store.load_or_init();

        display.set_brightness(config.oled.brightness);
        display.invert(InvertMode::from(config.oled.invert));

        let now = clock.now_ms();
        let cx = Context {
            display,
            channel: PeripheralChannel::new(link),
            store,
            sensor,
            clock,
            config,
            idle: IdleTimers::new(now),
            key_rate: KeyRateCounter::new(),
            tomato: TomatoTimer::new(),
            host_leds: LockLeds::default(),
            fn_held: false,
            first_frame: true,
        };

        let mut app = Self {
            screen: Screen::Dashboard(Dashboard::new(config.home_art, now)),
            cx,
            listener: None,
            accel: RotaryAccel::new(),
            key_led: None,
            boot: BootStep::FIRST,
        };
        app.go(Route::Dashboard);
        info!("App: started");
        app
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Screen management
    // ═══════════════════════════════════════════════════════════════════════

    /// Build and enter the screen for `route`, with its listener, auto-return
    /// and acceleration settings.
    pub fn go(&mut self, route: Route) {
        debug!("App: -> {:?}", route);
        match route {
            Route::Dashboard => {
                let seed = self.cx.now() | 1;
                let dashboard = Dashboard::new(self.cx.config.home_art, seed);
                self.switch_screen(Screen::Dashboard(dashboard));
                self.set_keydown_listener(KeyListener::Dashboard);
            }
            Route::Menu(kind) => {
                if kind.flushes_on_entry() {
                    self.cx.save_config();
                }
                let menu = MenuState::load(kind.items(), kind.initial_cursor(&self.cx));
                self.switch_screen(Screen::Menu { kind, menu });
                self.set_auto_return(kind.auto_return_secs());
            }
            Route::Slider(kind) => {
                self.switch_screen(Screen::Slider(kind));
                self.enable_fast_rotation(kind.fast_rotation());
            }
            Route::Tomato => {
                self.switch_screen(Screen::Tomato);
                self.set_keydown_listener(KeyListener::Tomato);
            }
            Route::Help => self.switch_screen(Screen::Help),
        }
    }

    /// Replace the active screen. Resets the display, first-frame flag, key
    /// listener, acceleration and auto-return; pending commands and the
    /// configuration record are kept.
    pub fn switch_screen(&mut self, screen: Screen) {
        self.screen = screen;
        self.listener = None;
        self.cx.display.clear();
        self.cx.first_frame = true;
        self.accel.reset();
        self.cx.idle.disarm_auto_return();
    }

    /// Install a raw key listener. Must follow [`switch_screen`](Self::switch_screen),
    /// which clears it.
    pub fn set_keydown_listener(&mut self, listener: KeyListener) {
        self.listener = Some(listener);
    }

    /// Return to the dashboard after `secs` without input; 0 disables.
    pub fn set_auto_return(&mut self, secs: u8) {
        let now = self.cx.now();
        self.cx.idle.arm_auto_return(secs, now);
    }

    pub fn enable_fast_rotation(&mut self, ceiling: u8) {
        self.accel.enable(ceiling);
    }

    fn apply(&mut self, reaction: Reaction) -> bool {
        if reaction.redraw {
            self.cx.first_frame = true;
        }
        if let Some(route) = reaction.route {
            self.go(route);
        }
        reaction.propagate
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Host entry points
    // ═══════════════════════════════════════════════════════════════════════

    /// One display refresh.
    pub fn tick(&mut self) {
        let now = self.cx.now();

        if self.cx.idle.auto_return_due(now) {
            debug!("App: auto-return");
            self.go(Route::Dashboard);
            return;
        }

        let cx = &mut self.cx;
        if let Some(AutoOffAction::RgbOff | AutoOffAction::SideOff) =
            run_auto_off(&mut cx.idle, now, &cx.config, &mut cx.display, &mut cx.channel)
        {
            self.key_led = None;
        }

        self.notify_key_led();

        if self.boot.is_done() {
            self.cx.channel.drain_pending();
        } else {
            self.boot = boot::advance(&mut self.cx, self.boot);
        }

        self.cx.first_frame = self.screen.draw(&mut self.cx);
        self.cx.display.flush();
    }

    /// Report the last key press to the co-processor, waking whatever the
    /// idle timers switched off first. One bus command per tick.
    fn notify_key_led(&mut self) {
        let Some(index) = self.key_led else {
            return;
        };
        let cx = &mut self.cx;

        if !cx.display.is_on() {
            cx.display.on();
        }

        if cx.idle.rgb_off {
            info!("Power: RGB restored");
            cx.idle.rgb_off = false;
            cx.apply_rgb_effect();
        } else if cx.idle.side_off {
            info!("Power: side light restored");
            cx.idle.side_off = false;
            cx.apply_side_effect();
        } else if cx.channel.send_byte(Opcode::RgbKeypress, index).is_ok() {
            self.key_led = None;
        }
    }

    /// Matrix key event. Returns `true` when the key should still reach the
    /// host.
    pub fn handle_key(&mut self, keycode: u16, row: u8, col: u8, pressed: bool) -> bool {
        let now = self.cx.now();
        self.cx.idle.activity(now);
        if pressed {
            self.cx.key_rate.record_press(now);
        }

        if (row, col) == ACTIVATE_KEY {
            if !pressed {
                return true;
            }
            let reaction = self.screen.on_activate(&mut self.cx);
            return self.apply(reaction);
        }

        if pressed {
            self.key_led = led_index(row, col);
        }

        let Some(listener) = self.listener else {
            return true;
        };
        let event = KeyEvent {
            keycode,
            row,
            col,
            pressed,
        };
        let reaction = self.screen.on_key(listener, &mut self.cx, event);
        self.apply(reaction)
    }

    /// Encoder detent. Returns `true` when the rotation should still produce
    /// its fallback keystroke.
    pub fn handle_rotate(&mut self, clockwise: bool) -> bool {
        let now = self.cx.now();
        self.cx.idle.activity(now);

        let steps = self.accel.steps(now);
        let mut reaction = Reaction::CONTINUE;
        for _ in 0..steps {
            reaction = self.screen.on_rotate(&mut self.cx, clockwise);
            if reaction.route.is_some() {
                break;
            }
        }
        self.apply(reaction)
    }

    /// Housekeeping from the matrix scan loop.
    pub fn poll(&mut self) {
        let now = self.cx.now();
        self.cx.key_rate.decay(now);
    }

    pub fn set_host_leds(&mut self, leds: LockLeds) {
        self.cx.host_leds = leds;
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════════════════

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn context(&self) -> &Context<P> {
        &self.cx
    }

    pub fn context_mut(&mut self) -> &mut Context<P> {
        &mut self.cx
    }

    pub fn listener(&self) -> Option<KeyListener> {
        self.listener
    }

    /// LED index waiting to be reported.
    pub fn staged_key_led(&self) -> Option<u8> {
        self.key_led
    }

    pub fn is_booted(&self) -> bool {
        self.boot.is_done()
    }
}

/// Per-key LED index on the co-processor's serpentine chain. Column 0
/// belongs to the end of the previous row; even rows run right to left.
pub fn led_index(row: u8, col: u8) -> Option<u8> {
    if (row, col) == ACTIVATE_KEY {
        return None;
    }
    let row = if col == 0 { row.checked_sub(1)? } else { row };
    let base = row.checked_mul(16)?;
    let offset = if row % 2 == 0 {
        15u8.checked_sub(col)?
    } else {
        col
    };
    base.checked_add(offset)
}

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activate_key_has_no_led() {
        assert_eq!(led_index(0, 0), None);
    }

    #[test]
    fn even_rows_run_right_to_left() {
        assert_eq!(led_index(0, 1), Some(14));
        assert_eq!(led_index(0, 15), Some(0));
        assert_eq!(led_index(2, 3), Some(44));
    }

    #[test]
    fn odd_rows_run_left_to_right() {
        assert_eq!(led_index(1, 1), Some(17));
        assert_eq!(led_index(3, 10), Some(58));
    }

    #[test]
    fn column_zero_wraps_to_previous_row() {
        assert_eq!(led_index(1, 0), Some(15));
        assert_eq!(led_index(2, 0), Some(16));
        assert_eq!(led_index(5, 0), Some(79));
    }

    #[test]
    fn out_of_matrix_column_is_rejected() {
        assert_eq!(led_index(2, 16), None);
    }
}
