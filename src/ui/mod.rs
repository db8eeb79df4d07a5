//! User interface subsystem - OLED screens driven by one rotary encoder.
//!
//! The app keeps exactly one active [`Screen`]. Host events are dispatched
//! to it; callbacks answer with a [`Reaction`] that may carry a [`Route`]
//! to the next screen. The app applies the route and rebuilds the screen
//! from scratch, so screens never hold references to each other.
//!
//! ## Components
//!
//! - **Display**: 128×64 panel addressed in 6 px character cells and 8 px
//!   pages, plus pixel access
//! - **Menu**: scrolling list with a cursor and scrollbar
//! - **Screens**: dashboard, settings tree, sliders, Pomodoro timer, help

pub mod art;
#[cfg(feature = "embedded")]
pub mod buttons;
pub mod dashboard;
#[cfg(feature = "embedded")]
pub mod display;
pub mod menu;
pub mod settings;
pub mod tomato;

use crate::app::{Context, Platform};

pub use dashboard::Dashboard;
pub use menu::MenuState;
pub use settings::{MenuKind, SliderKind};

/// Glyph index of the degree sign in the panel font.
pub const GLYPH_DEGREE: u8 = 0;

/// Glyph index of the empty bar cell with a grid tick; `GLYPH_BAR + n`
/// is a cell with `n` of 6 pixel columns filled.
pub const GLYPH_BAR: u8 = 128;

/// Character/pixel sink. Text is written at a cursor measured in pixels
/// horizontally and in 8 px pages vertically; `'\n'` in `write` behaves
/// like [`advance_page(true)`](Display::advance_page).
pub trait Display {
    fn clear(&mut self);
    fn set_cursor(&mut self, x: u8, page: u8);
    fn write(&mut self, text: &str, inverted: bool);
    fn write_char(&mut self, c: u8, inverted: bool);
    /// Off-screen coordinates are ignored.
    fn write_pixel(&mut self, x: i16, y: i16, on: bool);
    /// Move to the start of the next page, optionally blanking the rest of
    /// the current one.
    fn advance_page(&mut self, clear: bool);
    /// Blank `width` pixels × `pages` pages from the cursor.
    fn clear_region(&mut self, width: u8, pages: u8);
    /// Draw a stored image with its top-left corner at the cursor.
    fn draw_bitmap(&mut self, bitmap: Bitmap);
    fn brightness(&self) -> u8;
    fn set_brightness(&mut self, level: u8);
    fn invert(&mut self, mode: InvertMode);
    fn is_on(&self) -> bool;
    fn on(&mut self);
    fn off(&mut self);
    /// Push the frame to the panel. Unbuffered displays need nothing here.
    fn flush(&mut self) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InvertMode {
    Off,
    On,
    Toggle,
}

impl From<bool> for InvertMode {
    fn from(on: bool) -> Self {
        if on {
            Self::On
        } else {
            Self::Off
        }
    }
}

/// Stored images.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bitmap {
    Logo,
    Tomato,
    BongoUp,
    BongoLeft,
    BongoRight,
    BongoBoth,
}

/// Host keyboard lock LEDs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LockLeds {
    pub num: bool,
    pub caps: bool,
    pub scroll: bool,
}

impl LockLeds {
    /// HID LED output report: bit 0 num, bit 1 caps, bit 2 scroll.
    pub fn from_bits(bits: u8) -> Self {
        Self {
            num: bits & 0x01 != 0,
            caps: bits & 0x02 != 0,
            scroll: bits & 0x04 != 0,
        }
    }
}

/// A matrix key event as seen by screen key listeners.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyEvent {
    pub keycode: u16,
    pub row: u8,
    pub col: u8,
    pub pressed: bool,
}

/// Screen to switch to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Route {
    Dashboard,
    Menu(MenuKind),
    Slider(SliderKind),
    Tomato,
    Help,
}

/// Outcome of an input callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reaction {
    /// Let the event continue to the host (key press, volume knob...).
    pub propagate: bool,
    pub route: Option<Route>,
    /// Redraw the current screen from scratch on the next tick.
    pub redraw: bool,
}

impl Reaction {
    pub const CONTINUE: Self = Self {
        propagate: true,
        route: None,
        redraw: false,
    };

    pub const STOP: Self = Self {
        propagate: false,
        route: None,
        redraw: false,
    };

    pub const fn go(route: Route) -> Self {
        Self {
            propagate: false,
            route: Some(route),
            redraw: false,
        }
    }
}

/// Raw key listeners a screen can install.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyListener {
    /// Function-key tracking and bongo cat paws.
    Dashboard,
    /// Escape to leave, Space to start.
    Tomato,
}

/// The active screen.
pub enum Screen {
    Dashboard(Dashboard),
    Menu { kind: MenuKind, menu: MenuState },
    Slider(SliderKind),
    Tomato,
    Help,
}

impl Screen {
    /// Draw one frame. Returns `true` to get a first-frame redraw next tick.
    pub fn draw<P: Platform>(&mut self, cx: &mut Context<P>) -> bool {
        match self {
            Screen::Dashboard(d) => {
                d.draw(cx);
                false
            }
            Screen::Menu { menu, .. } => {
                menu.render(&mut cx.display);
                false
            }
            Screen::Slider(kind) => {
                kind.draw(cx);
                false
            }
            Screen::Tomato => tomato::draw(cx),
            Screen::Help => {
                if cx.first_frame() {
                    cx.display
                        .write("-- Help --\n\nrotate: move\npress: select\n\n", false);
                    cx.display.write("keypanel\n", false);
                }
                false
            }
        }
    }

    pub fn on_rotate<P: Platform>(&mut self, cx: &mut Context<P>, clockwise: bool) -> Reaction {
        match self {
            Screen::Dashboard(d) => d.on_rotate(cx, clockwise),
            Screen::Menu { kind, menu } => kind.on_rotate(cx, menu, clockwise),
            Screen::Slider(kind) => kind.on_rotate(cx, clockwise),
            Screen::Tomato => tomato::on_rotate(cx, clockwise),
            Screen::Help => Reaction::CONTINUE,
        }
    }

    pub fn on_activate<P: Platform>(&mut self, cx: &mut Context<P>) -> Reaction {
        match self {
            Screen::Dashboard(_) => Reaction::go(Route::Menu(MenuKind::Settings)),
            Screen::Menu { kind, menu } => kind.on_activate(cx, menu),
            Screen::Slider(kind) => Reaction::go(Route::Menu(kind.parent())),
            Screen::Tomato => {
                tomato::leave(cx);
                Reaction::go(Route::Dashboard)
            }
            Screen::Help => Reaction::go(Route::Dashboard),
        }
    }

    /// Dispatch to an installed listener.
    pub fn on_key<P: Platform>(
        &mut self,
        listener: KeyListener,
        cx: &mut Context<P>,
        event: KeyEvent,
    ) -> Reaction {
        match (listener, self) {
            (KeyListener::Dashboard, Screen::Dashboard(d)) => d.on_key(cx, event),
            (KeyListener::Tomato, _) => tomato::on_key(cx, event),
            _ => Reaction::CONTINUE,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Shared Drawing Helpers
// ═══════════════════════════════════════════════════════════════════════════

/// Proportional bar over a full text line. Filled cells use the bar glyphs;
/// every fifth empty cell gets a grid tick.
pub fn draw_bar<D: Display + ?Sized>(display: &mut D, value: u16, max: u16) {
    use crate::config::{BAR_CELLS, CHAR_WIDTH, SCREEN_WIDTH};

    let max = max.max(1);
    let mut px = u32::from(SCREEN_WIDTH) * u32::from(value.min(max)) / u32::from(max);
    let step = u32::from(CHAR_WIDTH);
    let mut cells = 0u8;

    while px >= step {
        display.write_char(GLYPH_BAR + CHAR_WIDTH - 1, false);
        cells += 1;
        px -= step;
    }

    if px > 0 && cells < BAR_CELLS {
        display.write_char(GLYPH_BAR + px as u8, false);
        cells += 1;
    }

    while cells < BAR_CELLS {
        let c = if cells % 5 == 0 { GLYPH_BAR } else { b' ' };
        display.write_char(c, false);
        cells += 1;
    }
}

/// Decimal value on its own line followed by the bar.
pub fn draw_value_and_bar<D: Display + ?Sized>(display: &mut D, value: u8, max: u16) {
    use core::fmt::Write;

    let mut s: heapless::String<4> = heapless::String::new();
    let _ = write!(s, "{}", value);
    display.write(&s, false);
    display.advance_page(true);
    draw_bar(display, u16::from(value), max);
}

#[cfg(test)]
pub(crate) mod test_display {
    //! Character-cell recording display for unit tests.

    use super::*;

    pub struct TextDisplay {
        pub cells: [[u8; 22]; 8],
        pub pixels: Vec<(i16, i16, bool)>,
        pub bitmaps: Vec<(u8, u8, Bitmap)>,
        pub x: u8,
        pub page: u8,
        pub brightness: u8,
        pub inverted: bool,
        pub on: bool,
        pub clears: usize,
    }

    impl Default for TextDisplay {
        fn default() -> Self {
            Self {
                cells: [[b' '; 22]; 8],
                pixels: Vec::new(),
                bitmaps: Vec::new(),
                x: 0,
                page: 0,
                brightness: 0,
                inverted: false,
                on: true,
                clears: 0,
            }
        }
    }

    impl TextDisplay {
        pub fn line(&self, page: usize) -> String {
            self.cells[page]
                .iter()
                .map(|&c| if c.is_ascii_graphic() || c == b' ' { c as char } else { '#' })
                .collect::<String>()
                .trim_end()
                .to_string()
        }
    }

    impl Display for TextDisplay {
        fn clear(&mut self) {
            self.cells = [[b' '; 22]; 8];
            self.x = 0;
            self.page = 0;
            self.clears += 1;
        }
        fn set_cursor(&mut self, x: u8, page: u8) {
            self.x = x;
            self.page = page;
        }
        fn write(&mut self, text: &str, inverted: bool) {
            for b in text.bytes() {
                if b == b'\n' {
                    self.advance_page(true);
                } else {
                    self.write_char(b, inverted);
                }
            }
        }
        fn write_char(&mut self, c: u8, _inverted: bool) {
            let col = (self.x / 6) as usize;
            if col < 22 && (self.page as usize) < 8 {
                self.cells[self.page as usize][col] = c;
            }
            self.x = self.x.saturating_add(6);
        }
        fn write_pixel(&mut self, x: i16, y: i16, on: bool) {
            self.pixels.push((x, y, on));
        }
        fn advance_page(&mut self, clear: bool) {
            if clear {
                let from = (self.x / 6) as usize;
                if (self.page as usize) < 8 {
                    for c in self.cells[self.page as usize].iter_mut().skip(from) {
                        *c = b' ';
                    }
                }
            }
            self.x = 0;
            self.page = (self.page + 1) % 8;
        }
        fn clear_region(&mut self, _width: u8, _pages: u8) {}
        fn draw_bitmap(&mut self, bitmap: Bitmap) {
            self.bitmaps.push((self.x, self.page, bitmap));
        }
        fn brightness(&self) -> u8 {
            self.brightness
        }
        fn set_brightness(&mut self, level: u8) {
            self.brightness = level;
        }
        fn invert(&mut self, mode: InvertMode) {
            self.inverted = match mode {
                InvertMode::Off => false,
                InvertMode::On => true,
                InvertMode::Toggle => !self.inverted,
            };
        }
        fn is_on(&self) -> bool {
            self.on
        }
        fn on(&mut self) {
            self.on = true;
        }
        fn off(&mut self) {
            self.on = false;
        }
    }

    #[test]
    fn bar_is_always_one_full_line() {
        for (value, max) in [(0u16, 50u16), (25, 50), (50, 50), (80, 50), (1, 255)] {
            let mut d = TextDisplay::default();
            draw_bar(&mut d, value, max);
            assert_eq!(d.x, 21 * 6, "value {value} max {max}");
        }
    }

    #[test]
    fn bar_cells_match_fill() {
        let mut d = TextDisplay::default();
        draw_bar(&mut d, 25, 50); // 64 px -> 10 full cells + 4 px
        let row = d.cells[0];
        assert!(row[..10].iter().all(|&c| c == GLYPH_BAR + 5));
        assert_eq!(row[10], GLYPH_BAR + 4);
        assert_eq!(row[11], b' ');
        assert_eq!(row[15], GLYPH_BAR);
        assert_eq!(row[20], GLYPH_BAR);
    }

    #[test]
    fn empty_bar_shows_grid() {
        let mut d = TextDisplay::default();
        draw_bar(&mut d, 0, 10);
        let row = d.cells[0];
        assert_eq!(row[0], GLYPH_BAR);
        assert_eq!(row[1], b' ');
        assert_eq!(row[5], GLYPH_BAR);
    }

    #[test]
    fn value_line_precedes_bar() {
        let mut d = TextDisplay::default();
        draw_value_and_bar(&mut d, 42, 50);
        assert_eq!(d.line(0), "42");
        assert_eq!(d.page, 1);
    }

    #[test]
    fn lock_leds_from_report_bits() {
        let leds = LockLeds::from_bits(0b011);
        assert!(leds.num && leds.caps && !leds.scroll);
    }
}
