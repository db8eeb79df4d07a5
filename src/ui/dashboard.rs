//! Home screen: lock LEDs, typing stats, climate reading and artwork.
//!
//! ```text
//! page 0   CAPS  NUM          (inverted when lit)
//! page 3   123 KPM
//! page 4   4567 keys     <artwork on the right half>
//! page 6   23.4°C 45%
//! page 7   keypanel v0.1.0
//! ```

use core::fmt::Write;

use crate::app::{Context, Platform};
use crate::config::{
    FIRMWARE_LABEL, FN_KEY, SENSOR_CYCLE_FRAMES, SENSOR_READ_FRAME, SENSOR_SHOW_FRAME,
};
use crate::sensor::{Climate, ClimateSensor};
use crate::storage::HomeArt;
use crate::ui::art::{BongoCat, CubeSpin, StarField};
use crate::ui::{Bitmap, Display, KeyEvent, LockLeds, Reaction, Route, GLYPH_DEGREE};

const LOGO_X: u8 = 80;
const LOGO_PAGE: u8 = 2;

/// Animation shown next to the counters.
pub enum ArtState {
    Logo,
    Bongo(BongoCat),
    Cube(CubeSpin),
    Space(StarField),
}

impl ArtState {
    fn new(art: HomeArt, seed: u32) -> Self {
        match art {
            HomeArt::Logo => ArtState::Logo,
            HomeArt::BongoCat => ArtState::Bongo(BongoCat::default()),
            HomeArt::Cube => ArtState::Cube(CubeSpin::new()),
            HomeArt::Space => ArtState::Space(StarField::new(seed)),
        }
    }

    fn draw<D: Display + ?Sized>(&mut self, display: &mut D, first: bool) {
        match self {
            ArtState::Logo => {}
            ArtState::Bongo(cat) => cat.draw(display, first),
            ArtState::Cube(cube) => cube.draw(display, first),
            ArtState::Space(stars) => stars.draw(display, first),
        }
    }
}

pub struct Dashboard {
    sensor_frame: u16,
    climate: Option<Climate>,
    /// LEDs as last drawn; `None` forces a redraw.
    shown_leds: Option<LockLeds>,
    art: ArtState,
}

impl Dashboard {
    pub fn new(art: HomeArt, seed: u32) -> Self {
        Self {
            sensor_frame: 0,
            climate: None,
            shown_leds: None,
            art: ArtState::new(art, seed),
        }
    }

    pub fn art(&self) -> &ArtState {
        &self.art
    }

    pub fn climate(&self) -> Option<Climate> {
        self.climate
    }

    pub fn draw<P: Platform>(&mut self, cx: &mut Context<P>) {
        let first = cx.first_frame();

        if first {
            cx.display.clear();
            self.sensor_frame = 0;
            self.shown_leds = None;
        } else {
            self.draw_leds(cx);
            self.draw_counters(cx);
            self.poll_sensor(cx);
        }

        if first {
            let d = &mut cx.display;
            d.set_cursor(0, 7);
            d.write(FIRMWARE_LABEL, false);
            if matches!(self.art, ArtState::Logo | ArtState::Space(_)) {
                d.set_cursor(LOGO_X, LOGO_PAGE);
                d.draw_bitmap(Bitmap::Logo);
            }
        }

        self.art.draw(&mut cx.display, first);
    }

    fn draw_leds<P: Platform>(&mut self, cx: &mut Context<P>) {
        let leds = cx.host_leds;
        if self.shown_leds == Some(leds) {
            return;
        }
        self.shown_leds = Some(leds);

        let d = &mut cx.display;
        d.set_cursor(0, 0);
        if leds.caps {
            d.write(" CAPS ", true);
        }
        d.write(" ", false);
        if leds.num {
            d.write(" NUM ", true);
        }
        d.advance_page(true);
    }

    fn draw_counters<P: Platform>(&mut self, cx: &mut Context<P>) {
        let mut s: heapless::String<21> = heapless::String::new();
        let d = &mut cx.display;

        let _ = write!(s, "{} KPM   ", cx.key_rate.rate());
        d.set_cursor(0, 3);
        d.write(&s, false);

        s.clear();
        let _ = write!(s, "{} keys   ", cx.key_rate.total());
        d.set_cursor(0, 4);
        d.write(&s, false);
    }

    /// Trigger, read and show on fixed frames of a long cycle; the sensor
    /// needs time to convert between trigger and read.
    fn poll_sensor<P: Platform>(&mut self, cx: &mut Context<P>) {
        let frame = self.sensor_frame;

        if frame == 0 {
            if let Err(e) = cx.sensor.trigger() {
                warn!("Sensor trigger failed: {:?}", e);
            }
        } else if frame == SENSOR_READ_FRAME {
            match cx.sensor.read() {
                Ok(climate) => self.climate = Some(climate),
                Err(e) => {
                    warn!("Sensor read failed: {:?}", e);
                    self.climate = None;
                }
            }
        } else if frame == SENSOR_SHOW_FRAME {
            if let Some(climate) = self.climate {
                if cx.display.is_on() {
                    draw_climate(&mut cx.display, climate);
                }
            }
        }

        self.sensor_frame = if frame >= SENSOR_CYCLE_FRAMES {
            0
        } else {
            frame + 1
        };
    }

    /// With the function key held, rotation cycles the home artwork.
    pub fn on_rotate<P: Platform>(&mut self, cx: &mut Context<P>, clockwise: bool) -> Reaction {
        if !cx.fn_held {
            return Reaction::CONTINUE;
        }
        cx.config.home_art = cx.config.home_art.cycle(clockwise);
        debug!("Home art -> {=u8}", cx.config.home_art as u8);
        Reaction::go(Route::Dashboard)
    }

    pub fn on_key<P: Platform>(&mut self, cx: &mut Context<P>, event: KeyEvent) -> Reaction {
        if (event.row, event.col) == FN_KEY {
            cx.fn_held = event.pressed;
        }
        if let ArtState::Bongo(cat) = &mut self.art {
            cat.on_key(&mut cx.display, event);
        }
        Reaction::CONTINUE
    }
}

fn draw_climate<D: Display + ?Sized>(display: &mut D, climate: Climate) {
    let mut s: heapless::String<21> = heapless::String::new();
    let t = climate.temperature_tenths;
    let sign = if t < 0 { "-" } else { "" };
    let t = t.unsigned_abs();
    let _ = write!(s, "{}{}.{}", sign, t / 10, t % 10);

    display.set_cursor(0, 6);
    display.write(&s, false);
    display.write_char(GLYPH_DEGREE, false);

    s.clear();
    let _ = write!(s, "C {}% ", climate.humidity_tenths / 10);
    display.write(&s, false);
}

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::test_display::TextDisplay;

    #[test]
    fn climate_line_formats_tenths() {
        let mut d = TextDisplay::default();
        draw_climate(
            &mut d,
            Climate {
                temperature_tenths: 234,
                humidity_tenths: 456,
            },
        );
        assert_eq!(d.line(6), "23.4#C 45%");
    }

    #[test]
    fn climate_line_keeps_sign_below_one_degree() {
        let mut d = TextDisplay::default();
        draw_climate(
            &mut d,
            Climate {
                temperature_tenths: -5,
                humidity_tenths: 900,
            },
        );
        assert_eq!(d.line(6), "-0.5#C 90%");
    }

    #[test]
    fn art_state_follows_config() {
        assert!(matches!(Dashboard::new(HomeArt::Logo, 1).art(), ArtState::Logo));
        assert!(matches!(
            Dashboard::new(HomeArt::BongoCat, 1).art(),
            ArtState::Bongo(_)
        ));
        assert!(matches!(Dashboard::new(HomeArt::Cube, 1).art(), ArtState::Cube(_)));
        assert!(matches!(Dashboard::new(HomeArt::Space, 1).art(), ArtState::Space(_)));
    }
}
