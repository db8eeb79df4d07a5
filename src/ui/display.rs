//! SSD1306 OLED panel behind the [`Display`] trait.
//!
//! Text goes into 6×8 cells (5×8 font plus one spacing column) on 8 px
//! pages, the same grid the screens are laid out on. The bar and degree
//! glyphs and the stored images are drawn with embedded-graphics
//! primitives. Everything lands in the driver's frame buffer; [`flush`]
//! pushes it once per tick.
//!
//! [`flush`]: Display::flush

use embedded_graphics::mono_font::ascii::FONT_5X8;
use embedded_graphics::mono_font::{MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{
    Circle, Line, PrimitiveStyle, Rectangle, RoundedRectangle, Triangle,
};
use embedded_graphics::text::{Baseline, Text};
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::I2CDisplayInterface;
use ssd1306::Ssd1306;

use crate::config::{CHAR_WIDTH, SCREEN_LINES, SCREEN_WIDTH};
use crate::ui::{Bitmap, Display, InvertMode, GLYPH_BAR, GLYPH_DEGREE};

/// Concrete driver type, generic over the HAL's I²C peripheral.
pub type Driver<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

const PAGE_HEIGHT: u32 = 8;

pub struct Panel<I2C> {
    driver: Driver<I2C>,
    x: u8,
    page: u8,
    brightness: u8,
    inverted: bool,
    on: bool,
}

impl<I2C> Panel<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    /// Initialise the controller and clear the screen.
    pub fn new(i2c: I2C) -> Self {
        let interface = I2CDisplayInterface::new(i2c);
        let mut driver = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        if driver.init().is_err() {
            error!("Panel: init failed");
        }
        driver.clear_buffer();
        let _ = driver.flush();

        Self {
            driver,
            x: 0,
            page: 0,
            brightness: u8::MAX,
            inverted: false,
            on: true,
        }
    }

    fn origin(&self) -> Point {
        Point::new(i32::from(self.x), i32::from(self.page) * PAGE_HEIGHT as i32)
    }

    fn fill(&mut self, area: Rectangle, on: bool) {
        let color = BinaryColor::from(on);
        let _ = area
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(&mut self.driver);
    }

    fn text_style(inverted: bool) -> MonoTextStyle<'static, BinaryColor> {
        let (fg, bg) = if inverted {
            (BinaryColor::Off, BinaryColor::On)
        } else {
            (BinaryColor::On, BinaryColor::Off)
        };
        MonoTextStyleBuilder::new()
            .font(&FONT_5X8)
            .text_color(fg)
            .background_color(bg)
            .build()
    }

    /// Draw one cell at the cursor; no cursor movement.
    fn draw_cell(&mut self, c: u8, inverted: bool) {
        let origin = self.origin();
        let cell = Rectangle::new(origin, Size::new(u32::from(CHAR_WIDTH), PAGE_HEIGHT));
        self.fill(cell, inverted);
        let ink = BinaryColor::from(!inverted);

        match c {
            GLYPH_DEGREE => {
                let _ = Circle::new(origin + Point::new(1, 0), 4)
                    .into_styled(PrimitiveStyle::with_stroke(ink, 1))
                    .draw(&mut self.driver);
            }
            GLYPH_BAR => {
                // grid tick
                let _ = Line::new(origin + Point::new(0, 5), origin + Point::new(0, 7))
                    .into_styled(PrimitiveStyle::with_stroke(ink, 1))
                    .draw(&mut self.driver);
            }
            c if c > GLYPH_BAR && c < GLYPH_BAR + CHAR_WIDTH => {
                let filled = u32::from(c - GLYPH_BAR);
                let bar = Rectangle::new(origin + Point::new(0, 1), Size::new(filled, 6));
                self.fill(bar, !inverted);
            }
            c if c.is_ascii() && !c.is_ascii_control() => {
                let buf = [c];
                if let Ok(s) = core::str::from_utf8(&buf) {
                    let _ = Text::with_baseline(s, origin, Self::text_style(inverted), Baseline::Top)
                        .draw(&mut self.driver);
                }
            }
            _ => {}
        }
    }

    fn draw_image(&mut self, bitmap: Bitmap) {
        let o = self.origin();
        let stroke = PrimitiveStyle::with_stroke(BinaryColor::On, 1);
        let solid = PrimitiveStyle::with_fill(BinaryColor::On);
        let d = &mut self.driver;

        match bitmap {
            Bitmap::Logo => {
                let frame = Rectangle::new(o, Size::new(40, 40));
                let _ = RoundedRectangle::with_equal_corners(frame, Size::new(8, 8))
                    .into_styled(stroke)
                    .draw(d);
                let style = Self::text_style(false);
                let _ = Text::with_baseline("key", o + Point::new(11, 10), style, Baseline::Top)
                    .draw(d);
                let _ = Text::with_baseline("panel", o + Point::new(6, 22), style, Baseline::Top)
                    .draw(d);
            }
            Bitmap::Tomato => {
                let _ = Circle::new(o + Point::new(2, 8), 36).into_styled(solid).draw(d);
                let _ = Triangle::new(
                    o + Point::new(14, 2),
                    o + Point::new(26, 2),
                    o + Point::new(20, 10),
                )
                .into_styled(stroke)
                .draw(d);
            }
            Bitmap::BongoUp => {
                // erase old paws, then body, ears and table
                let _ = Rectangle::new(o, Size::new(48, 48))
                    .into_styled(PrimitiveStyle::with_fill(BinaryColor::Off))
                    .draw(d);
                let body = Rectangle::new(o + Point::new(8, 12), Size::new(30, 22));
                let _ = RoundedRectangle::with_equal_corners(body, Size::new(6, 6))
                    .into_styled(stroke)
                    .draw(d);
                for ear in [8, 28] {
                    let _ = Triangle::new(
                        o + Point::new(ear, 13),
                        o + Point::new(ear + 5, 6),
                        o + Point::new(ear + 10, 13),
                    )
                    .into_styled(stroke)
                    .draw(d);
                }
                let _ = Line::new(o + Point::new(0, 38), o + Point::new(47, 38))
                    .into_styled(stroke)
                    .draw(d);
            }
            Bitmap::BongoLeft | Bitmap::BongoRight => {
                let _ = Circle::new(o + Point::new(0, 22), 7).into_styled(solid).draw(d);
            }
            Bitmap::BongoBoth => {
                for dx in [-10, 11] {
                    let _ = Circle::new(o + Point::new(dx, 22), 7).into_styled(solid).draw(d);
                }
            }
        }
    }
}

impl<I2C> Display for Panel<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    fn clear(&mut self) {
        self.driver.clear_buffer();
        self.x = 0;
        self.page = 0;
    }

    fn set_cursor(&mut self, x: u8, page: u8) {
        self.x = x;
        self.page = page % SCREEN_LINES;
    }

    fn write(&mut self, text: &str, inverted: bool) {
        for c in text.bytes() {
            if c == b'\n' {
                self.advance_page(true);
            } else {
                self.write_char(c, inverted);
            }
        }
    }

    fn write_char(&mut self, c: u8, inverted: bool) {
        if self.x > SCREEN_WIDTH - CHAR_WIDTH {
            self.advance_page(false);
        }
        self.draw_cell(c, inverted);
        self.x += CHAR_WIDTH;
    }

    fn write_pixel(&mut self, x: i16, y: i16, on: bool) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x < u32::from(SCREEN_WIDTH) && y < u32::from(SCREEN_LINES) * PAGE_HEIGHT {
            self.driver.set_pixel(x, y, on);
        }
    }

    fn advance_page(&mut self, clear: bool) {
        if clear && self.x < SCREEN_WIDTH {
            let rest = Rectangle::new(
                self.origin(),
                Size::new(u32::from(SCREEN_WIDTH - self.x), PAGE_HEIGHT),
            );
            self.fill(rest, false);
        }
        self.x = 0;
        self.page = (self.page + 1) % SCREEN_LINES;
    }

    fn clear_region(&mut self, width: u8, pages: u8) {
        let area = Rectangle::new(
            self.origin(),
            Size::new(u32::from(width), u32::from(pages) * PAGE_HEIGHT),
        );
        self.fill(area, false);
    }

    fn draw_bitmap(&mut self, bitmap: Bitmap) {
        self.draw_image(bitmap);
    }

    fn brightness(&self) -> u8 {
        self.brightness
    }

    fn set_brightness(&mut self, level: u8) {
        self.brightness = level;
        if self.driver.set_brightness(Brightness::custom(2, level)).is_err() {
            warn!("Panel: brightness write failed");
        }
    }

    fn invert(&mut self, mode: InvertMode) {
        self.inverted = match mode {
            InvertMode::Off => false,
            InvertMode::On => true,
            InvertMode::Toggle => !self.inverted,
        };
        let _ = self.driver.set_invert(self.inverted);
    }

    fn is_on(&self) -> bool {
        self.on
    }

    fn on(&mut self) {
        self.on = true;
        let _ = self.driver.set_display_on(true);
    }

    fn off(&mut self) {
        self.on = false;
        let _ = self.driver.set_display_on(false);
    }

    fn flush(&mut self) {
        if self.on && self.driver.flush().is_err() {
            warn!("Panel: flush failed");
        }
    }
}
