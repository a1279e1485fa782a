//! Procedurally generated stand-in art, sized exactly like the shipped
//! assets. Pixels are raw BGR; near-black counts as transparent on the
//! keyed paths, so sprite backgrounds stay at (0,0,0).

use lawn_core::entities::{
    CELL_H, CELL_W, GRID_COLS, GRID_ROWS, GRID_START_X, GRID_START_Y,
};
use lawn_core::render::blit::{Sprite, SpriteSheet};
use lawn_core::render::Assets;
use lawn_core::{SCREEN_HEIGHT, SCREEN_WIDTH};
use std::f32::consts::TAU;

type Bgr = [u8; 3];

const LAWN_A: Bgr = [44, 148, 62];
const LAWN_B: Bgr = [38, 132, 52];
const DIRT: Bgr = [40, 84, 110];
const PANEL: Bgr = [150, 185, 195];
const WOOD: Bgr = [36, 78, 128];
const PACKET: Bgr = [110, 150, 170];
const SUN_CORE: Bgr = [90, 235, 255];
const SUN_RIM: Bgr = [40, 200, 245];
const PETAL: Bgr = [50, 210, 250];
const FLOWER_FACE: Bgr = [28, 70, 110];
const STEM: Bgr = [40, 120, 45];
const PEA_GREEN: Bgr = [58, 168, 64];
const PEA_DARK: Bgr = [46, 130, 50];
const ZOMBIE_SKIN: Bgr = [120, 150, 135];
const ZOMBIE_SUIT: Bgr = [90, 95, 100];
const STONE: Bgr = [140, 140, 140];
const BLOOD: Bgr = [36, 36, 160];

struct Canvas {
    data: Vec<u8>,
    w: i32,
    h: i32,
}

impl Canvas {
    fn new(w: i32, h: i32, fill: Bgr) -> Self {
        let mut data = Vec::with_capacity((w * h * 3) as usize);
        for _ in 0..(w * h) {
            data.extend_from_slice(&fill);
        }
        Canvas { data, w, h }
    }

    fn set(&mut self, x: i32, y: i32, c: Bgr) {
        if x < 0 || y < 0 || x >= self.w || y >= self.h {
            return;
        }
        let i = ((y * self.w + x) * 3) as usize;
        self.data[i..i + 3].copy_from_slice(&c);
    }

    fn rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Bgr) {
        for yy in y..y + h {
            for xx in x..x + w {
                self.set(xx, yy, c);
            }
        }
    }

    fn disc(&mut self, cx: i32, cy: i32, r: i32, c: Bgr) {
        for yy in cy - r..=cy + r {
            for xx in cx - r..=cx + r {
                let dx = xx - cx;
                let dy = yy - cy;
                if dx * dx + dy * dy <= r * r {
                    self.set(xx, yy, c);
                }
            }
        }
    }
}

fn background() -> Canvas {
    let mut c = Canvas::new(SCREEN_WIDTH as i32, SCREEN_HEIGHT as i32, DIRT);
    for row in 0..GRID_ROWS as i32 {
        for col in 0..GRID_COLS as i32 {
            let shade = if (row + col) % 2 == 0 { LAWN_A } else { LAWN_B };
            c.rect(
                GRID_START_X + col * CELL_W,
                GRID_START_Y + row * CELL_H,
                CELL_W,
                CELL_H,
                shade,
            );
        }
    }
    c
}

fn sun_bank() -> Canvas {
    let mut c = Canvas::new(63, 70, PANEL);
    c.rect(0, 0, 63, 2, WOOD);
    c.rect(0, 68, 63, 2, WOOD);
    c.disc(31, 22, 14, SUN_RIM);
    c.disc(31, 22, 9, SUN_CORE);
    c
}

fn seed_bank() -> Canvas {
    let mut c = Canvas::new(357, 70, WOOD);
    c.rect(2, 2, 353, 66, [52, 102, 150]);
    c
}

fn seed_packet() -> Canvas {
    let mut c = Canvas::new(45, 63, PACKET);
    c.rect(0, 0, 45, 1, WOOD);
    c.rect(0, 62, 45, 1, WOOD);
    c.rect(0, 0, 1, 63, WOOD);
    c.rect(44, 0, 1, 63, WOOD);
    c
}

fn sunflower_icon() -> Canvas {
    let mut c = Canvas::new(90, 90, [0, 0, 0]);
    c.disc(45, 45, 38, PETAL);
    c.disc(45, 45, 20, FLOWER_FACE);
    c
}

fn peashooter_icon() -> Canvas {
    let mut c = Canvas::new(90, 90, [0, 0, 0]);
    c.disc(40, 45, 32, PEA_GREEN);
    c.rect(62, 34, 26, 22, PEA_GREEN);
    c.disc(40, 45, 12, PEA_DARK);
    c
}

/// 5x5 grid of 80 px frames; `draw` paints one frame with its top-left at
/// the given origin.
fn sheet(mut draw: impl FnMut(&mut Canvas, i32, i32, usize)) -> Canvas {
    let mut c = Canvas::new(400, 400, [0, 0, 0]);
    for frame in 0..25 {
        let ox = (frame as i32 % 5) * 80;
        let oy = (frame as i32 / 5) * 80;
        draw(&mut c, ox, oy, frame);
    }
    c
}

fn sunflower_sheet() -> Canvas {
    sheet(|c, ox, oy, frame| {
        let sway = ((frame as f32 / 25.0) * TAU).sin();
        let dx = (sway * 5.0) as i32;
        c.rect(ox + 37, oy + 40, 6, 38, STEM);
        c.disc(ox + 40 + dx, oy + 30, 24, PETAL);
        c.disc(ox + 40 + dx, oy + 30, 13, FLOWER_FACE);
    })
}

fn peashooter_sheet() -> Canvas {
    sheet(|c, ox, oy, frame| {
        let bob = (((frame as f32 / 25.0) * TAU).sin() * 3.0) as i32;
        c.rect(ox + 34, oy + 44, 6, 34, STEM);
        c.disc(ox + 34, oy + 34 + bob, 22, PEA_GREEN);
        c.rect(ox + 52, oy + 26 + bob, 26, 16, PEA_GREEN);
        c.disc(ox + 34, oy + 34 + bob, 9, PEA_DARK);
    })
}

fn zombie_sheet() -> Canvas {
    sheet(|c, ox, oy, frame| {
        // frames 0..16 walk, 16..25 bite
        if frame < 16 {
            let lean = (((frame as f32 / 16.0) * TAU).sin() * 4.0) as i32;
            c.rect(ox + 28, oy + 34, 24, 44, ZOMBIE_SUIT);
            c.disc(ox + 40 + lean, oy + 22, 14, ZOMBIE_SKIN);
            c.rect(ox + 16, oy + 40 + lean, 14, 8, ZOMBIE_SKIN);
        } else {
            let chomp = ((frame - 16) % 4) as i32 * 3;
            c.rect(ox + 30, oy + 34, 24, 44, ZOMBIE_SUIT);
            c.disc(ox + 36, oy + 22, 14, ZOMBIE_SKIN);
            c.rect(ox + 8 + chomp, oy + 36, 22, 8, ZOMBIE_SKIN);
            c.set(ox + 34, oy + 18, BLOOD);
        }
    })
}

fn sun() -> Canvas {
    let mut c = Canvas::new(40, 40, [0, 0, 0]);
    c.disc(20, 20, 18, SUN_RIM);
    c.disc(20, 20, 12, SUN_CORE);
    c
}

fn pea() -> Canvas {
    let mut c = Canvas::new(16, 16, [0, 0, 0]);
    c.disc(8, 8, 7, PEA_GREEN);
    c.disc(6, 6, 3, PEA_DARK);
    c
}

fn defeat() -> Canvas {
    let mut c = Canvas::new(300, 150, [0, 0, 0]);
    // tombstone on a blood-red plinth
    c.rect(0, 130, 300, 20, BLOOD);
    c.rect(90, 40, 120, 95, STONE);
    c.disc(150, 45, 60, STONE);
    c.rect(140, 60, 20, 50, [60, 60, 60]);
    c.rect(125, 72, 50, 14, [60, 60, 60]);
    c
}

/// Owns every generated pixel array for the lifetime of the program.
pub struct GeneratedAssets {
    background: Canvas,
    sun_bank: Canvas,
    seed_bank: Canvas,
    seed_packet: Canvas,
    sunflower_icon: Canvas,
    peashooter_icon: Canvas,
    sunflower_sheet: Canvas,
    peashooter_sheet: Canvas,
    zombie_sheet: Canvas,
    sun: Canvas,
    pea: Canvas,
    defeat: Canvas,
}

impl GeneratedAssets {
    pub fn new() -> Self {
        GeneratedAssets {
            background: background(),
            sun_bank: sun_bank(),
            seed_bank: seed_bank(),
            seed_packet: seed_packet(),
            sunflower_icon: sunflower_icon(),
            peashooter_icon: peashooter_icon(),
            sunflower_sheet: sunflower_sheet(),
            peashooter_sheet: peashooter_sheet(),
            zombie_sheet: zombie_sheet(),
            sun: sun(),
            pea: pea(),
            defeat: defeat(),
        }
    }

    pub fn assets(&self) -> Assets<'_> {
        fn sprite(c: &Canvas) -> Sprite<'_> {
            Sprite {
                data: &c.data,
                w: c.w,
                h: c.h,
            }
        }
        fn sheet(c: &Canvas) -> SpriteSheet<'_> {
            SpriteSheet {
                data: &c.data,
                sheet_size: 400,
                frame_size: 80,
                cols: 5,
            }
        }
        Assets {
            background: sprite(&self.background),
            sun_bank: sprite(&self.sun_bank),
            seed_bank: sprite(&self.seed_bank),
            seed_packet: sprite(&self.seed_packet),
            sunflower_icon: sprite(&self.sunflower_icon),
            peashooter_icon: sprite(&self.peashooter_icon),
            sunflower_sheet: sheet(&self.sunflower_sheet),
            peashooter_sheet: sheet(&self.peashooter_sheet),
            zombie_sheet: sheet(&self.zombie_sheet),
            sun: sprite(&self.sun),
            pea: sprite(&self.pea),
            defeat: sprite(&self.defeat),
        }
    }
}
