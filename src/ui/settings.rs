//! Settings tree: list menus and value sliders.
//!
//! ```text
//! Settings ─┬─ RGB Lighting ─┬─ Effect (live)
//!           │                ├─ Speed / Bright / Color 1 / Color 2 / Saturation
//!           │                └─ Auto Off
//!           ├─ OLED Screen ──┬─ Bright
//!           │                ├─ Invert display (toggles in place)
//!           │                └─ Auto Off
//!           ├─ Side light ───┬─ Mode (live) / Bright / Speed
//!           │                └─ Auto Off
//!           ├─ Home Artwork
//!           ├─ Tomato timer
//!           └─ Help
//! ```
//!
//! Values change in RAM and are sent to the lighting co-processor as the
//! knob turns. The record is written to storage when the Settings root or
//! the RGB menu is (re)entered, and when an artwork is picked.

use crate::app::{Context, Platform};
use crate::power::AutoOffTier;
use crate::protocol::{
    rgb_speed_wire, Opcode, RgbMode, SideLedMode, MAX_RGB_BRIGHTNESS, MAX_RGB_SPEED,
    MAX_SIDE_BRIGHTNESS, MAX_SIDE_SPEED,
};
use crate::storage::HomeArt;
use crate::ui::{draw_bar, draw_value_and_bar, Display, InvertMode, MenuState, Reaction, Route};

const SETTINGS_ITEMS: &[&str] = &[
    "-- Settings --",
    "RGB Lighting",
    "OLED Screen",
    "Side light",
    "Home Artwork",
    "Tomato timer",
    "Help",
];

const RGB_ITEMS: &[&str] = &[
    "-- RGB Light --",
    "Effect",
    "Speed",
    "Bright",
    "Color 1",
    "Color 2",
    "Saturation",
    "Auto Off",
];

const RGB_EFFECT_ITEMS: &[&str] = &[
    "-- Effect --",
    "Off",
    "Solid",
    "Breath",
    "Rainbow",
    "Rainbow H.",
    "Rainbow V.",
    "Grad H.",
    "Grad V.",
    "Raindrops",
    "Track",
    "Track RGB",
    "Ripple",
    "Ripple RGB",
    "Noise",
    "Test",
];

const OLED_ITEMS: &[&str] = &["-- OLED Settings", "Bright", "Invert display", "Auto Off"];

const SIDE_ITEMS: &[&str] = &["-- Side Led --", "Mode", "Bright", "Speed", "Auto Off"];

const SIDE_EFFECT_ITEMS: &[&str] = &["-- side LED Mode", "Off", "Breath", "Flash on Type", "Static"];

const ARTWORK_ITEMS: &[&str] = &["-- Select Artwork", "Logo", "BongoCat", "Cube", "Logo in Space"];

const AUTO_OFF_ITEMS: &[&str] = &[
    "-- Auto-off Timer",
    "never",
    "10s",
    "60s",
    "300s",
    "600s",
    "1800s",
    "3600s",
];

/// List menus of the settings tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuKind {
    Settings,
    Rgb,
    RgbEffect,
    RgbAutoOff,
    Oled,
    OledAutoOff,
    Side,
    SideEffect,
    SideAutoOff,
    Artwork,
}

impl MenuKind {
    pub fn items(self) -> &'static [&'static str] {
        match self {
            MenuKind::Settings => SETTINGS_ITEMS,
            MenuKind::Rgb => RGB_ITEMS,
            MenuKind::RgbEffect => RGB_EFFECT_ITEMS,
            MenuKind::Oled => OLED_ITEMS,
            MenuKind::Side => SIDE_ITEMS,
            MenuKind::SideEffect => SIDE_EFFECT_ITEMS,
            MenuKind::Artwork => ARTWORK_ITEMS,
            MenuKind::RgbAutoOff | MenuKind::OledAutoOff | MenuKind::SideAutoOff => AUTO_OFF_ITEMS,
        }
    }

    /// Where the cursor starts: on the current value for choice lists, on
    /// the first entry otherwise.
    pub fn initial_cursor<P: Platform>(self, cx: &Context<P>) -> usize {
        let cfg = &cx.config;
        let selected = match self {
            MenuKind::Settings => return 0,
            MenuKind::Rgb | MenuKind::Oled | MenuKind::Side => return 1,
            MenuKind::RgbEffect => cfg.rgb.mode as u8,
            MenuKind::RgbAutoOff => cfg.rgb.auto_off.index(),
            MenuKind::OledAutoOff => cfg.oled.auto_off.index(),
            MenuKind::SideEffect => cfg.side.mode as u8,
            MenuKind::SideAutoOff => cfg.side.auto_off.index(),
            MenuKind::Artwork => cfg.home_art as u8,
        };
        1 + usize::from(selected)
    }

    /// Entering these writes the configuration to storage.
    pub fn flushes_on_entry(self) -> bool {
        matches!(self, MenuKind::Settings | MenuKind::Rgb)
    }

    /// Seconds of inactivity before falling back to the dashboard, 0 = stay.
    pub fn auto_return_secs(self) -> u8 {
        match self {
            MenuKind::Settings => crate::config::SETTINGS_AUTO_RETURN_SECS,
            _ => 0,
        }
    }

    pub fn on_rotate<P: Platform>(
        self,
        cx: &mut Context<P>,
        menu: &mut MenuState,
        clockwise: bool,
    ) -> Reaction {
        menu.navigate(clockwise);

        // Effect lists preview the highlighted effect immediately.
        let Some(index) = menu.cursor().checked_sub(1) else {
            return Reaction::STOP;
        };
        match self {
            MenuKind::RgbEffect => {
                if let Some(mode) = RgbMode::from_u8(index as u8) {
                    cx.config.rgb.mode = mode;
                    cx.apply_rgb_effect();
                }
            }
            MenuKind::SideEffect => {
                if let Some(mode) = SideLedMode::from_u8(index as u8) {
                    cx.config.side.mode = mode;
                    cx.apply_side_effect();
                }
            }
            _ => {}
        }
        Reaction::STOP
    }

    pub fn on_activate<P: Platform>(self, cx: &mut Context<P>, menu: &MenuState) -> Reaction {
        let cursor = menu.cursor();
        let route = match self {
            MenuKind::Settings => match cursor {
                1 => Route::Menu(MenuKind::Rgb),
                2 => Route::Menu(MenuKind::Oled),
                3 => Route::Menu(MenuKind::Side),
                4 => Route::Menu(MenuKind::Artwork),
                5 => Route::Tomato,
                6 => Route::Help,
                _ => Route::Dashboard,
            },
            MenuKind::Rgb => match cursor {
                1 => Route::Menu(MenuKind::RgbEffect),
                2 => Route::Slider(SliderKind::RgbSpeed),
                3 => Route::Slider(SliderKind::RgbBrightness),
                4 => Route::Slider(SliderKind::RgbHue1),
                5 => Route::Slider(SliderKind::RgbHue2),
                6 => Route::Slider(SliderKind::RgbSaturation),
                7 => Route::Menu(MenuKind::RgbAutoOff),
                _ => Route::Dashboard,
            },
            MenuKind::Oled => match cursor {
                1 => Route::Slider(SliderKind::OledBrightness),
                2 => {
                    cx.config.oled.invert = !cx.config.oled.invert;
                    cx.display.invert(InvertMode::from(cx.config.oled.invert));
                    return Reaction::STOP;
                }
                3 => Route::Menu(MenuKind::OledAutoOff),
                _ => Route::Menu(MenuKind::Settings),
            },
            MenuKind::Side => match cursor {
                1 => Route::Menu(MenuKind::SideEffect),
                2 => Route::Slider(SliderKind::SideBrightness),
                3 => Route::Slider(SliderKind::SideSpeed),
                4 => Route::Menu(MenuKind::SideAutoOff),
                _ => Route::Menu(MenuKind::Settings),
            },
            MenuKind::RgbEffect => Route::Menu(MenuKind::Rgb),
            MenuKind::SideEffect => Route::Menu(MenuKind::Side),
            MenuKind::RgbAutoOff | MenuKind::OledAutoOff | MenuKind::SideAutoOff => {
                if cursor > 0 {
                    let tier = AutoOffTier::from_index(cursor as u8 - 1);
                    match self {
                        MenuKind::RgbAutoOff => cx.config.rgb.auto_off = tier,
                        MenuKind::OledAutoOff => cx.config.oled.auto_off = tier,
                        _ => cx.config.side.auto_off = tier,
                    }
                }
                Route::Menu(self.parent())
            }
            MenuKind::Artwork => {
                if cursor > 0 {
                    cx.config.home_art = HomeArt::from_index(cursor as u8 - 1);
                    cx.save_config();
                }
                Route::Dashboard
            }
        };
        Reaction::go(route)
    }

    /// Menu that activating the title row returns to.
    pub fn parent(self) -> MenuKind {
        match self {
            MenuKind::RgbEffect | MenuKind::RgbAutoOff => MenuKind::Rgb,
            MenuKind::OledAutoOff => MenuKind::Oled,
            MenuKind::SideEffect | MenuKind::SideAutoOff => MenuKind::Side,
            _ => MenuKind::Settings,
        }
    }
}

/// Single-value adjustment screens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SliderKind {
    RgbSpeed,
    RgbBrightness,
    RgbHue1,
    RgbHue2,
    RgbSaturation,
    OledBrightness,
    SideBrightness,
    SideSpeed,
}

impl SliderKind {
    pub fn parent(self) -> MenuKind {
        match self {
            SliderKind::OledBrightness => MenuKind::Oled,
            SliderKind::SideBrightness | SliderKind::SideSpeed => MenuKind::Side,
            _ => MenuKind::Rgb,
        }
    }

    /// Encoder acceleration ceiling, 0 for one step per detent.
    pub fn fast_rotation(self) -> u8 {
        match self {
            SliderKind::RgbSpeed => 1,
            SliderKind::RgbHue1 | SliderKind::RgbHue2 => 4,
            SliderKind::RgbSaturation
            | SliderKind::OledBrightness
            | SliderKind::SideBrightness => 10,
            SliderKind::RgbBrightness | SliderKind::SideSpeed => 0,
        }
    }

    fn title(self) -> &'static str {
        match self {
            SliderKind::RgbSpeed | SliderKind::SideSpeed => "Speed",
            SliderKind::RgbBrightness | SliderKind::SideBrightness => "Bright",
            SliderKind::RgbHue1 | SliderKind::RgbHue2 => "Color",
            SliderKind::RgbSaturation => "Saturation",
            SliderKind::OledBrightness => "OLED Bright",
        }
    }

    /// Current value and its maximum.
    pub fn value<P: Platform>(self, cx: &Context<P>) -> (u8, u8) {
        let cfg = &cx.config;
        match self {
            SliderKind::RgbSpeed => (cfg.rgb.speed, MAX_RGB_SPEED),
            SliderKind::RgbBrightness => (cfg.rgb.brightness, MAX_RGB_BRIGHTNESS),
            SliderKind::RgbHue1 => (cfg.rgb.hue, u8::MAX),
            SliderKind::RgbHue2 => (cfg.rgb.hue2, u8::MAX),
            SliderKind::RgbSaturation => (cfg.rgb.saturation, u8::MAX),
            SliderKind::OledBrightness => (cfg.oled.brightness, u8::MAX),
            SliderKind::SideBrightness => (cfg.side.brightness, MAX_SIDE_BRIGHTNESS),
            SliderKind::SideSpeed => (cfg.side.speed, MAX_SIDE_SPEED),
        }
    }

    pub fn draw<P: Platform>(self, cx: &mut Context<P>) {
        let (value, max) = self.value(cx);
        let d = &mut cx.display;
        d.set_cursor(0, 0);
        d.write(self.title(), false);
        d.advance_page(true);
        d.advance_page(true);

        // Hue wraps around the color wheel, a number means little there.
        if matches!(self, SliderKind::RgbHue1 | SliderKind::RgbHue2) {
            draw_bar(d, u16::from(value), u16::from(max));
        } else {
            draw_value_and_bar(d, value, u16::from(max));
        }
    }

    /// Clockwise increases. Saturates at the range ends, except hue which
    /// wraps.
    pub fn on_rotate<P: Platform>(self, cx: &mut Context<P>, clockwise: bool) -> Reaction {
        let step = |v: u8, max: u8| -> u8 {
            if clockwise {
                v.saturating_add(1).min(max)
            } else {
                v.saturating_sub(1)
            }
        };
        let wrap = |v: u8| -> u8 {
            if clockwise {
                v.wrapping_add(1)
            } else {
                v.wrapping_sub(1)
            }
        };

        let cfg = &mut cx.config;
        let cmd = match self {
            SliderKind::RgbSpeed => {
                cfg.rgb.speed = step(cfg.rgb.speed, MAX_RGB_SPEED);
                Some((Opcode::RgbSpeed, rgb_speed_wire(cfg.rgb.speed)))
            }
            SliderKind::RgbBrightness => {
                cfg.rgb.brightness = step(cfg.rgb.brightness, MAX_RGB_BRIGHTNESS);
                Some((Opcode::RgbBrightness, cfg.rgb.brightness))
            }
            SliderKind::RgbHue1 => {
                cfg.rgb.hue = wrap(cfg.rgb.hue);
                Some((Opcode::RgbHue, cfg.rgb.hue))
            }
            SliderKind::RgbHue2 => {
                cfg.rgb.hue2 = wrap(cfg.rgb.hue2);
                Some((Opcode::RgbHue2, cfg.rgb.hue2))
            }
            SliderKind::RgbSaturation => {
                cfg.rgb.saturation = step(cfg.rgb.saturation, u8::MAX);
                Some((Opcode::RgbSaturation, cfg.rgb.saturation))
            }
            SliderKind::OledBrightness => {
                cfg.oled.brightness = step(cfg.oled.brightness, u8::MAX);
                None
            }
            SliderKind::SideBrightness => {
                cfg.side.brightness = step(cfg.side.brightness, MAX_SIDE_BRIGHTNESS);
                Some((Opcode::SideBrightness, cfg.side.brightness))
            }
            SliderKind::SideSpeed => {
                cfg.side.speed = step(cfg.side.speed, MAX_SIDE_SPEED);
                Some((Opcode::SideSpeed, cfg.side.speed))
            }
        };

        match cmd {
            // Busy is fine: the channel keeps the latest value for later.
            Some((opcode, value)) => {
                let _ = cx.channel.send_byte(opcode, value);
            }
            None => cx.display.set_brightness(cx.config.oled.brightness),
        }
        Reaction::STOP
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════
