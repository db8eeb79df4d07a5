//! Scrolling list menu.
//!
//! Item 0 is the title row. It is drawn and can be selected like any other
//! row; what activating it means is up to the owning screen (usually "go
//! up one level").

use crate::config::{SCREEN_HEIGHT, SCREEN_LINES, SCREEN_WIDTH};
use crate::ui::Display;

const ROWS: usize = SCREEN_LINES as usize;

#[derive(Clone, Copy, Debug)]
pub struct MenuState {
    items: &'static [&'static str],
    cursor: usize,
    offset: usize,
}

impl MenuState {
    /// Open a list with the cursor on `cursor` (0 when out of range). Long
    /// lists opened deep down are scrolled so the cursor sits on row 3.
    pub fn load(items: &'static [&'static str], cursor: usize) -> Self {
        let count = items.len();
        let cursor = if cursor >= count { 0 } else { cursor };

        let offset = if count > ROWS && cursor >= ROWS {
            (cursor - 3).min(count - ROWS)
        } else {
            0
        };

        Self {
            items,
            cursor,
            offset,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &'static [&'static str] {
        self.items
    }

    /// Move the cursor one row, scrolling to keep it visible. Stops at both
    /// ends.
    pub fn navigate(&mut self, forward: bool) {
        if forward {
            if self.cursor + 1 < self.count() {
                self.cursor += 1;
            }
            if self.cursor >= self.offset + ROWS {
                self.offset += 1;
            }
        } else {
            self.cursor = self.cursor.saturating_sub(1);
            if self.cursor < self.offset {
                self.offset -= 1;
            }
        }
    }

    pub fn render<D: Display + ?Sized>(&self, display: &mut D) {
        display.set_cursor(0, 0);
        for (i, item) in self.items.iter().enumerate().skip(self.offset).take(ROWS) {
            let marker = if i == self.cursor { b'>' } else { b' ' };
            display.write_char(marker, false);
            display.write_char(b' ', false);
            display.write(item, false);
            display.advance_page(true);
        }
        self.render_scrollbar(display);
    }

    /// Two-pixel bar at the right edge, only for lists longer than a screen.
    fn render_scrollbar<D: Display + ?Sized>(&self, display: &mut D) {
        let count = self.count();
        if count <= ROWS {
            return;
        }

        let height = usize::from(SCREEN_HEIGHT);
        let len = (height * ROWS / count).max(4);
        let top = height * self.offset / count;
        let bottom = (top + len).min(height);

        for c in 1..=2i16 {
            let x = i16::from(SCREEN_WIDTH) - c;
            for y in 0..height {
                display.write_pixel(x, y as i16, (top..bottom).contains(&y));
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════
