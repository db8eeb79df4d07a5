//! Dashboard artwork: bongo cat, spinning wireframe cube, star field.
//!
//! All three draw into the right half of the panel and keep their own
//! animation state; the dashboard owns exactly one of them.

use micromath::F32;

use crate::config::{BONGO_BOTH_ROW, BONGO_LEFT_COLS, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::ui::{Bitmap, Display, KeyEvent};

// ═══════════════════════════════════════════════════════════════════════════
// Bongo Cat
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pose {
    Up,
    Left,
    Right,
    Both,
}

impl Pose {
    /// Paw bitmap and its offset (pixels, pages) inside the cat image.
    fn paw(self) -> Option<(u8, u8, Bitmap)> {
        match self {
            Pose::Up => None,
            Pose::Left => Some((4, 0, Bitmap::BongoLeft)),
            Pose::Right => Some((25, 1, Bitmap::BongoRight)),
            Pose::Both => Some((14, 1, Bitmap::BongoBoth)),
        }
    }

    /// Which paw slaps for a key at (`row`, `col`).
    pub fn for_key(row: u8, col: u8) -> Self {
        if row == BONGO_BOTH_ROW {
            Pose::Both
        } else if col < BONGO_LEFT_COLS {
            Pose::Left
        } else {
            Pose::Right
        }
    }
}

/// Cat origin on the panel.
const BONGO_X: u8 = SCREEN_WIDTH / 2;
const BONGO_PAGE: u8 = 2;

#[derive(Clone, Copy, Debug, Default)]
pub struct BongoCat {
    /// `None` until the first frame draws the cat.
    shown: Option<Pose>,
}

impl BongoCat {
    pub fn draw<D: Display + ?Sized>(&mut self, display: &mut D, first: bool) {
        if first {
            self.shown = None;
            self.show(display, Pose::Up);
        }
    }

    pub fn on_key<D: Display + ?Sized>(&mut self, display: &mut D, event: KeyEvent) {
        let pose = if event.pressed {
            Pose::for_key(event.row, event.col)
        } else {
            Pose::Up
        };
        self.show(display, pose);
    }

    pub fn shown(&self) -> Option<Pose> {
        self.shown
    }

    /// Paw bitmaps overlay the idle cat, so switching between two slapping
    /// poses goes through the idle image first.
    fn show<D: Display + ?Sized>(&mut self, display: &mut D, pose: Pose) {
        if self.shown == Some(pose) {
            return;
        }

        if pose == Pose::Up || self.shown != Some(Pose::Up) {
            display.set_cursor(BONGO_X, BONGO_PAGE);
            display.draw_bitmap(Bitmap::BongoUp);
            self.shown = Some(Pose::Up);
        }

        if let Some((dx, dpage, bitmap)) = pose.paw() {
            display.set_cursor(BONGO_X + dx, BONGO_PAGE + dpage);
            display.draw_bitmap(bitmap);
            self.shown = Some(pose);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Wireframe Cube
// ═══════════════════════════════════════════════════════════════════════════

const CUBE_SIZE: f32 = 10.0;
const CUBE_CENTER: (i16, i16) = (SCREEN_WIDTH as i16 * 3 / 4, SCREEN_HEIGHT as i16 / 2);

/// Area wiped before each cube frame.
const CUBE_AREA_X: u8 = 80;
const CUBE_AREA_PAGE: u8 = 2;
const CUBE_AREA_WIDTH: u8 = SCREEN_WIDTH / 4 + 1;
const CUBE_AREA_PAGES: u8 = 5;

const NODES: [[f32; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, 1.0, 1.0],
    [1.0, -1.0, -1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, -1.0],
    [1.0, 1.0, 1.0],
];

const EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 3),
    (3, 2),
    (2, 0),
    (4, 5),
    (5, 7),
    (7, 6),
    (6, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CubeSpin {
    /// Rotation about X, Y, Z in degrees.
    pub angles: [u16; 3],
}

impl Default for CubeSpin {
    fn default() -> Self {
        Self::new()
    }
}

impl CubeSpin {
    const START: [u16; 3] = [50, 18, 77];
    const SPEED: [u16; 3] = [4, 3, 1];

    pub const fn new() -> Self {
        Self {
            angles: Self::START,
        }
    }

    /// The first frame only resets the angles; drawing starts next tick.
    pub fn draw<D: Display + ?Sized>(&mut self, display: &mut D, first: bool) {
        if first {
            self.angles = Self::START;
            return;
        }

        for (angle, speed) in self.angles.iter_mut().zip(Self::SPEED) {
            *angle += speed;
            if *angle > 359 {
                *angle = 0;
            }
        }

        display.set_cursor(CUBE_AREA_X, CUBE_AREA_PAGE);
        display.clear_region(CUBE_AREA_WIDTH, CUBE_AREA_PAGES);

        let nodes = project(self.angles);
        for (a, b) in EDGES {
            draw_line(display, nodes[a], nodes[b]);
        }
    }
}

fn sin_cos(degrees: u16) -> (f32, f32) {
    let rad = F32(f32::from(degrees) * core::f32::consts::PI / 180.0);
    (rad.sin().0, rad.cos().0)
}

/// Rotate the cube (Y, then X, then Z) and map it to screen coordinates.
fn project(angles: [u16; 3]) -> [(i16, i16); 8] {
    let (sx, cx) = sin_cos(angles[0]);
    let (sy, cy) = sin_cos(angles[1]);
    let (sz, cz) = sin_cos(angles[2]);

    let mut out = [(0i16, 0i16); 8];
    for (node, slot) in NODES.iter().zip(out.iter_mut()) {
        let [x, y, z] = node.map(|v| v * CUBE_SIZE);

        let rz = z * cy - x * sy;
        let rx = z * sy + x * cy;

        let ry = y * cx - rz * sx;

        let px = rx * cz - ry * sz;
        let py = rx * sz + ry * cz;

        // truncate like the integer node buffer would
        *slot = (px as i16 + CUBE_CENTER.0, py as i16 + CUBE_CENTER.1);
    }
    out
}

/// Bresenham line, both endpoints included.
pub fn draw_line<D: Display + ?Sized>(display: &mut D, from: (i16, i16), to: (i16, i16)) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        display.write_pixel(x, y, true);
        if x == to.0 && y == to.1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Star Field
// ═══════════════════════════════════════════════════════════════════════════

const STAR_COUNT: usize = 8;
const FIELD_CENTER: (i16, i16) = (SCREEN_WIDTH as i16 / 2, SCREEN_HEIGHT as i16 / 2);

/// Stars further out than this are drawn as 5-pixel crosses.
const NEAR_X: i16 = 16;
const NEAR_Y: i16 = 10;

/// A star leaves the field past these distances from the center.
const FAR_X: i16 = 61;
const FAR_Y: i16 = 29;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Star {
    speed: u8,
    /// Offset from the panel center.
    dx: i8,
    dy: i8,
    /// Point on the top/right edge the star heads for: 1..64 along the
    /// top, 64..95 down the side.
    edge: u8,
}

impl Star {
    fn position(&self) -> (i16, i16) {
        (
            FIELD_CENTER.0 + i16::from(self.dx),
            FIELD_CENTER.1 + i16::from(self.dy),
        )
    }

    fn is_near(&self) -> bool {
        i16::from(self.dx).abs() <= NEAR_X && i16::from(self.dy).abs() <= NEAR_Y
    }
}

#[derive(Clone, Copy, Debug)]
pub struct StarField {
    stars: [Star; STAR_COUNT],
    rng: u32,
}

impl StarField {
    pub fn new(seed: u32) -> Self {
        Self {
            stars: [Star::default(); STAR_COUNT],
            rng: seed | 1,
        }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn draw<D: Display + ?Sized>(&mut self, display: &mut D, first: bool) {
        if first {
            for i in 0..STAR_COUNT {
                self.stars[i] = self.random_star();
            }
        } else {
            for star in &self.stars {
                plot_star(display, star, false);
            }
        }

        for i in 0..STAR_COUNT {
            self.advance(i);
            plot_star(display, &self.stars[i], true);
        }
    }

    /// Move a star outwards along its line, respawning it near the center
    /// once it leaves the field.
    fn advance(&mut self, i: usize) {
        let star = self.stars[i];
        let x = i16::from(star.dx).abs() + i16::from(star.speed);
        let edge = i16::from(star.edge);
        let y = if edge < 64 {
            32 * x / edge
        } else {
            x * (95 - edge) / 64
        };

        if x > FAR_X || y > FAR_Y {
            self.stars[i] = self.random_star();
            return;
        }

        let s = &mut self.stars[i];
        s.dx = (if star.dx < 0 { -x } else { x }) as i8;
        s.dy = (if star.dy < 0 { -y } else { y }) as i8;
    }

    fn random_star(&mut self) -> Star {
        let speed = (self.next() & 0x03).max(1) as u8;

        let mut bits = self.next();
        let mut dy = (bits & 0x0F) as i8;
        bits >>= 4;
        let mut dx = (bits & 0x1F) as i8;
        bits >>= 5;
        if bits & 1 != 0 {
            dx = -dx;
        }
        if bits & 2 != 0 {
            dy = -dy;
        }

        let edge = ((self.next() % 95) as u8).max(1);
        Star {
            speed,
            dx,
            dy,
            edge,
        }
    }

    /// xorshift32, low 16 bits.
    fn next(&mut self) -> u16 {
        let mut x = self.rng;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng = x;
        x as u16
    }
}

fn plot_star<D: Display + ?Sized>(display: &mut D, star: &Star, on: bool) {
    let (x, y) = star.position();
    if star.is_near() {
        display.write_pixel(x, y, on);
    } else {
        for i in -1..=1 {
            display.write_pixel(x + i, y, on);
        }
        display.write_pixel(x, y - 1, on);
        display.write_pixel(x, y + 1, on);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════
