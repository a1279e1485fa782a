//! Pixel-level drawing primitives over the raw BGR frame buffer.
//!
//! Every draw call is a whole-sprite no-op when the target would exceed the
//! screen, and never reads or writes outside the buffer. Primitives on the
//! entity path take `protect_ui` and skip pixels inside the UI-protected
//! rectangles; the dedicated UI redraw routines are the only writers there.

use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};
use bytemuck::{cast_slice, cast_slice_mut, Pod, Zeroable};

/// A source pixel whose channel sum is below this is treated as transparent.
/// Applied uniformly to every color-keyed draw.
pub const TRANSPARENT_SUM_MAX: u16 = 30;

/// The currency banner. Only [`super::Renderer::draw_sun_bank`] may write here.
pub const SUN_BANK_RECT: Rect = Rect::new(10, 10, 63, 70);
/// The card tray. Only [`super::Renderer::draw_seed_bank`] may write here.
pub const SEED_BANK_RECT: Rect = Rect::new(220, 5, 357, 70);

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct Bgr {
    pub b: u8,
    pub g: u8,
    pub r: u8,
}

impl Bgr {
    pub const BLACK: Bgr = Bgr { b: 0, g: 0, r: 0 };

    pub const fn new(b: u8, g: u8, r: u8) -> Self {
        Bgr { b, g, r }
    }

    pub fn is_transparent(self) -> bool {
        (self.b as u16 + self.g as u16 + self.r as u16) < TRANSPARENT_SUM_MAX
    }

    pub fn darkened(self) -> Bgr {
        Bgr {
            b: self.b / 2,
            g: self.g / 2,
            r: self.r / 2,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Rect { x, y, w, h }
    }

    pub const fn right(&self) -> i32 {
        self.x + self.w
    }

    pub const fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub const fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn expanded(&self, margin: i32) -> Rect {
        Rect {
            x: self.x - margin,
            y: self.y - margin,
            w: self.w + 2 * margin,
            h: self.h + 2 * margin,
        }
    }

    pub fn clipped_to_screen(&self) -> Rect {
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = self.right().min(SCREEN_WIDTH as i32);
        let y1 = self.bottom().min(SCREEN_HEIGHT as i32);
        Rect {
            x: x0,
            y: y0,
            w: (x1 - x0).max(0),
            h: (y1 - y0).max(0),
        }
    }
}

/// A raw BGR pixel array, row-major, no padding.
#[derive(Copy, Clone, Debug)]
pub struct Sprite<'a> {
    pub data: &'a [u8],
    pub w: i32,
    pub h: i32,
}

impl Sprite<'_> {
    pub fn pixel(&self, x: i32, y: i32) -> Bgr {
        cast_slice::<u8, Bgr>(self.data)[(y * self.w + x) as usize]
    }
}

/// An N×M grid of equal square frames in one pixel array, addressed by a
/// linear frame index (`row = index / cols`, `col = index % cols`).
#[derive(Copy, Clone, Debug)]
pub struct SpriteSheet<'a> {
    pub data: &'a [u8],
    /// Width of the whole sheet in pixels (sheets are square).
    pub sheet_size: i32,
    pub frame_size: i32,
    pub cols: i32,
}

impl SpriteSheet<'_> {
    pub fn frame_origin(&self, index: usize) -> (i32, i32) {
        let row = index as i32 / self.cols;
        let col = index as i32 % self.cols;
        (col * self.frame_size, row * self.frame_size)
    }

    pub fn pixel(&self, x: i32, y: i32) -> Bgr {
        cast_slice::<u8, Bgr>(self.data)[(y * self.sheet_size + x) as usize]
    }
}

fn pixels(fb: &mut [u8]) -> &mut [Bgr] {
    cast_slice_mut(fb)
}

fn in_protected_ui(x: i32, y: i32) -> bool {
    SUN_BANK_RECT.contains(x, y) || SEED_BANK_RECT.contains(x, y)
}

fn fits_on_screen(x: i32, y: i32, w: i32, h: i32) -> bool {
    x >= 0 && y >= 0 && x + w <= SCREEN_WIDTH as i32 && y + h <= SCREEN_HEIGHT as i32
}

/// Opaque blit at original size. UI-unaware; used by the UI redraw routines
/// and the full-redraw path only.
pub fn blit(fb: &mut [u8], sprite: &Sprite, x: i32, y: i32) {
    if !fits_on_screen(x, y, sprite.w, sprite.h) {
        return;
    }
    let px = pixels(fb);
    for i in 0..sprite.h {
        for j in 0..sprite.w {
            px[((y + i) as usize) * SCREEN_WIDTH + (x + j) as usize] = sprite.pixel(j, i);
        }
    }
}

/// Color-keyed blit at original size.
pub fn blit_transparent(fb: &mut [u8], sprite: &Sprite, x: i32, y: i32, protect_ui: bool) {
    if !fits_on_screen(x, y, sprite.w, sprite.h) {
        return;
    }
    let px = pixels(fb);
    for i in 0..sprite.h {
        for j in 0..sprite.w {
            let c = sprite.pixel(j, i);
            if c.is_transparent() {
                continue;
            }
            let (dx, dy) = (x + j, y + i);
            if protect_ui && in_protected_ui(dx, dy) {
                continue;
            }
            px[(dy as usize) * SCREEN_WIDTH + dx as usize] = c;
        }
    }
}

/// Nearest-neighbor scaled blit, opaque. Degenerate destinations are
/// clamped to one pixel per axis before any index arithmetic.
pub fn blit_scaled(fb: &mut [u8], sprite: &Sprite, dst: Rect) {
    let (dw, dh) = (dst.w.max(1), dst.h.max(1));
    if !fits_on_screen(dst.x, dst.y, dw, dh) {
        return;
    }
    let px = pixels(fb);
    for i in 0..dh {
        for j in 0..dw {
            let sx = (j * sprite.w) / dw;
            let sy = (i * sprite.h) / dh;
            px[((dst.y + i) as usize) * SCREEN_WIDTH + (dst.x + j) as usize] =
                sprite.pixel(sx, sy);
        }
    }
}

/// Nearest-neighbor scaled blit with color keying.
pub fn blit_scaled_transparent(fb: &mut [u8], sprite: &Sprite, dst: Rect, protect_ui: bool) {
    let (dw, dh) = (dst.w.max(1), dst.h.max(1));
    if !fits_on_screen(dst.x, dst.y, dw, dh) {
        return;
    }
    let px = pixels(fb);
    for i in 0..dh {
        for j in 0..dw {
            let sx = (j * sprite.w) / dw;
            let sy = (i * sprite.h) / dh;
            let c = sprite.pixel(sx, sy);
            if c.is_transparent() {
                continue;
            }
            let (dx, dy) = (dst.x + j, dst.y + i);
            if protect_ui && in_protected_ui(dx, dy) {
                continue;
            }
            px[(dy as usize) * SCREEN_WIDTH + dx as usize] = c;
        }
    }
}

/// Scaled, color-keyed blit of one sheet frame.
pub fn blit_sheet_frame(
    fb: &mut [u8],
    sheet: &SpriteSheet,
    index: usize,
    dst: Rect,
    protect_ui: bool,
) {
    let (dw, dh) = (dst.w.max(1), dst.h.max(1));
    if !fits_on_screen(dst.x, dst.y, dw, dh) {
        return;
    }
    let (ox, oy) = sheet.frame_origin(index);
    let px = pixels(fb);
    for i in 0..dh {
        for j in 0..dw {
            let sx = ox + (j * sheet.frame_size) / dw;
            let sy = oy + (i * sheet.frame_size) / dh;
            let c = sheet.pixel(sx, sy);
            if c.is_transparent() {
                continue;
            }
            let (dx, dy) = (dst.x + j, dst.y + i);
            if protect_ui && in_protected_ui(dx, dy) {
                continue;
            }
            px[(dy as usize) * SCREEN_WIDTH + dx as usize] = c;
        }
    }
}

pub fn fill_rect(fb: &mut [u8], rect: Rect, color: Bgr) {
    let r = rect.clipped_to_screen();
    if r.is_empty() {
        return;
    }
    let px = pixels(fb);
    for y in r.y..r.bottom() {
        for x in r.x..r.right() {
            px[(y as usize) * SCREEN_WIDTH + x as usize] = color;
        }
    }
}

/// Halve every channel in `rect`; used for the selected-card highlight.
pub fn darken_rect(fb: &mut [u8], rect: Rect) {
    let r = rect.clipped_to_screen();
    if r.is_empty() {
        return;
    }
    let px = pixels(fb);
    for y in r.y..r.bottom() {
        for x in r.x..r.right() {
            let i = (y as usize) * SCREEN_WIDTH + x as usize;
            px[i] = px[i].darkened();
        }
    }
}

/// Restore background pixels inside `rect`, skipping the UI-protected
/// rectangles. This is the erase half of the dirty-rect protocol and the
/// only background writer on the incremental path.
pub fn restore_background(fb: &mut [u8], background: &Sprite, rect: Rect) {
    let r = rect.clipped_to_screen();
    if r.is_empty() {
        return;
    }
    let px = pixels(fb);
    for y in r.y..r.bottom() {
        for x in r.x..r.right() {
            if in_protected_ui(x, y) {
                continue;
            }
            px[(y as usize) * SCREEN_WIDTH + x as usize] = background.pixel(x, y);
        }
    }
}

/// 7-segment style digits, 10x16, one bit per column in the high 8 bits.
const DIGIT_PATTERNS: [[u8; 16]; 10] = [
    [
        0x3C, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x3C,
        0x00,
    ],
    [
        0x18, 0x38, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x7E,
        0x00,
    ],
    [
        0x3C, 0x66, 0x66, 0x06, 0x06, 0x0C, 0x18, 0x30, 0x60, 0x60, 0x60, 0x60, 0x66, 0x66, 0x7E,
        0x00,
    ],
    [
        0x3C, 0x66, 0x66, 0x06, 0x06, 0x0C, 0x1C, 0x06, 0x06, 0x06, 0x06, 0x06, 0x66, 0x66, 0x3C,
        0x00,
    ],
    [
        0x0C, 0x1C, 0x1C, 0x2C, 0x2C, 0x4C, 0x4C, 0x7E, 0x0C, 0x0C, 0x0C, 0x0C, 0x0C, 0x0C, 0x0C,
        0x00,
    ],
    [
        0x7E, 0x60, 0x60, 0x60, 0x60, 0x7C, 0x06, 0x06, 0x06, 0x06, 0x06, 0x06, 0x66, 0x66, 0x3C,
        0x00,
    ],
    [
        0x3C, 0x66, 0x60, 0x60, 0x60, 0x7C, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x3C,
        0x00,
    ],
    [
        0x7E, 0x66, 0x06, 0x06, 0x0C, 0x0C, 0x18, 0x18, 0x18, 0x18, 0x30, 0x30, 0x30, 0x30, 0x30,
        0x00,
    ],
    [
        0x3C, 0x66, 0x66, 0x66, 0x66, 0x3C, 0x3C, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x3C,
        0x00,
    ],
    [
        0x3C, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x3E, 0x06, 0x06, 0x06, 0x06, 0x66, 0x3C,
        0x00,
    ],
];

const DIGIT_ADVANCE: i32 = 12;

/// Draw `value` in black digits, most significant first. Pixels are
/// bounds-checked individually, matching the original banner renderer.
pub fn draw_number(fb: &mut [u8], x: i32, y: i32, value: u32) {
    let mut digits = [0u8; 10];
    let mut n = value;
    let mut len = 0;
    loop {
        digits[len] = (n % 10) as u8;
        n /= 10;
        len += 1;
        if n == 0 {
            break;
        }
    }
    let px = pixels(fb);
    for i in 0..len {
        let pattern = &DIGIT_PATTERNS[digits[len - 1 - i] as usize];
        for (row, bits) in pattern.iter().enumerate() {
            for bit in 0..8 {
                if bits & (1 << (7 - bit)) == 0 {
                    continue;
                }
                let cx = x + (i as i32) * DIGIT_ADVANCE + bit;
                let cy = y + row as i32;
                if cx >= 0 && cx < SCREEN_WIDTH as i32 && cy >= 0 && cy < SCREEN_HEIGHT as i32 {
                    px[(cy as usize) * SCREEN_WIDTH + cx as usize] = Bgr::BLACK;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FRAME_BYTES;

    fn solid_sprite(w: i32, h: i32, c: Bgr) -> Vec<u8> {
        let mut v = Vec::new();
        for _ in 0..(w * h) {
            v.extend_from_slice(&[c.b, c.g, c.r]);
        }
        v
    }

    fn pixel_at(fb: &[u8], x: usize, y: usize) -> Bgr {
        let i = (y * SCREEN_WIDTH + x) * 3;
        Bgr::new(fb[i], fb[i + 1], fb[i + 2])
    }

    #[test]
    fn out_of_bounds_blit_is_a_no_op() {
        let mut fb = vec![0u8; FRAME_BYTES];
        let data = solid_sprite(10, 10, Bgr::new(1, 2, 3));
        let sprite = Sprite {
            data: &data,
            w: 10,
            h: 10,
        };
        blit(&mut fb, &sprite, 795, 0);
        blit(&mut fb, &sprite, 0, 475);
        blit(&mut fb, &sprite, -1, 0);
        assert!(fb.iter().all(|&b| b == 0));
    }

    #[test]
    fn transparency_threshold_is_channel_sum() {
        let mut fb = vec![0xAAu8; FRAME_BYTES];
        // one pixel just under the threshold, one just at it
        let data = [9u8, 10, 10, 10, 10, 10];
        let sprite = Sprite {
            data: &data,
            w: 2,
            h: 1,
        };
        blit_transparent(&mut fb, &sprite, 0, 200, false);
        assert_eq!(pixel_at(&fb, 0, 200), Bgr::new(0xAA, 0xAA, 0xAA));
        assert_eq!(pixel_at(&fb, 1, 200), Bgr::new(10, 10, 10));
    }

    #[test]
    fn guarded_draw_never_touches_ui_rects() {
        let mut fb = vec![0u8; FRAME_BYTES];
        let data = solid_sprite(100, 100, Bgr::new(200, 200, 200));
        let sprite = Sprite {
            data: &data,
            w: 100,
            h: 100,
        };
        // overlaps the sun bank at (10,10)
        blit_transparent(&mut fb, &sprite, 0, 0, true);
        assert_eq!(pixel_at(&fb, 20, 20), Bgr::BLACK);
        assert_eq!(pixel_at(&fb, 5, 5), Bgr::new(200, 200, 200));
    }

    #[test]
    fn degenerate_scale_clamps_to_one_pixel() {
        let mut fb = vec![0u8; FRAME_BYTES];
        let data = solid_sprite(8, 8, Bgr::new(7, 7, 7));
        let sprite = Sprite {
            data: &data,
            w: 8,
            h: 8,
        };
        blit_scaled(
            &mut fb,
            &sprite,
            Rect::new(400, 240, 0, 0),
        );
        assert_eq!(pixel_at(&fb, 400, 240), Bgr::new(7, 7, 7));
        assert_eq!(pixel_at(&fb, 401, 240), Bgr::BLACK);
    }

    #[test]
    fn restore_background_skips_protected_ui() {
        let bg_data = solid_sprite(SCREEN_WIDTH as i32, SCREEN_HEIGHT as i32, Bgr::new(3, 3, 3));
        let bg = Sprite {
            data: &bg_data,
            w: SCREEN_WIDTH as i32,
            h: SCREEN_HEIGHT as i32,
        };
        let mut fb = vec![0x55u8; FRAME_BYTES];
        restore_background(&mut fb, &bg, Rect::new(0, 0, 300, 100));
        assert_eq!(pixel_at(&fb, 5, 5), Bgr::new(3, 3, 3));
        // inside the sun bank
        assert_eq!(pixel_at(&fb, 15, 15), Bgr::new(0x55, 0x55, 0x55));
        // inside the seed bank
        assert_eq!(pixel_at(&fb, 250, 50), Bgr::new(0x55, 0x55, 0x55));
    }

    #[test]
    fn sheet_frames_address_by_linear_index() {
        let sheet = SpriteSheet {
            data: &[],
            sheet_size: 400,
            frame_size: 80,
            cols: 5,
        };
        assert_eq!(sheet.frame_origin(0), (0, 0));
        assert_eq!(sheet.frame_origin(4), (320, 0));
        assert_eq!(sheet.frame_origin(5), (0, 80));
        assert_eq!(sheet.frame_origin(24), (320, 320));
    }

    #[test]
    fn draw_number_marks_digit_pixels_black() {
        let mut fb = vec![0xFFu8; FRAME_BYTES];
        draw_number(&mut fb, 100, 100, 150);
        // top row of '1' has bits 0x18 -> columns 3 and 4 of the glyph
        assert_eq!(pixel_at(&fb, 103, 100), Bgr::BLACK);
        assert_eq!(pixel_at(&fb, 100, 100), Bgr::new(0xFF, 0xFF, 0xFF));
    }
}
