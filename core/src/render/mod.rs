//! Scene rendering: full redraws, the dirty-rect incremental path, and the
//! defeat screen.
//!
//! The incremental path runs in two phases. Phase one erases every mobile's
//! last drawn rectangle back to background (UI pixels are skipped at the
//! primitive level) and repairs any plant the erase touched. Phase two draws
//! every active mobile at its current position and records that position for
//! the next frame's erase. A slot that went inactive is erased in phase one
//! and then cleared, so nothing lingers on screen.

pub mod blit;

use crate::entities::*;
use crate::game::{card_rect, plant_rect, GameState, NUM_CARDS, PLANT_ICON_SIZE};
use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};
use blit::*;

/// Erase rectangles grow by this margin on every side, covering the edge
/// pixels a scaled draw can leave behind.
pub const ERASE_MARGIN: i32 = 2;

/// Borrowed views of the decoded art. The core never owns pixel data; the
/// board support code (or the test harness) keeps the arrays alive.
#[derive(Copy, Clone)]
pub struct Assets<'a> {
    /// Full-screen lawn backdrop.
    pub background: Sprite<'a>,
    pub sun_bank: Sprite<'a>,
    pub seed_bank: Sprite<'a>,
    /// Blank card face; the plant icon is drawn over it.
    pub seed_packet: Sprite<'a>,
    pub sunflower_icon: Sprite<'a>,
    pub peashooter_icon: Sprite<'a>,
    pub sunflower_sheet: SpriteSheet<'a>,
    pub peashooter_sheet: SpriteSheet<'a>,
    pub zombie_sheet: SpriteSheet<'a>,
    pub sun: Sprite<'a>,
    pub pea: Sprite<'a>,
    pub defeat: Sprite<'a>,
}

pub struct Renderer<'a> {
    assets: Assets<'a>,
}

impl<'a> Renderer<'a> {
    pub fn new(assets: Assets<'a>) -> Self {
        Renderer { assets }
    }

    // ---- UI ------------------------------------------------------------

    pub fn draw_sun_bank(&self, fb: &mut [u8], game: &GameState) {
        blit(fb, &self.assets.sun_bank, SUN_BANK_RECT.x, SUN_BANK_RECT.y);
        draw_number(
            fb,
            SUN_BANK_RECT.x + 10,
            SUN_BANK_RECT.y + 45,
            game.sun_count,
        );
    }

    pub fn draw_seed_bank(&self, fb: &mut [u8], game: &GameState) {
        blit(fb, &self.assets.seed_bank, SEED_BANK_RECT.x, SEED_BANK_RECT.y);
        for i in 0..NUM_CARDS {
            let card = card_rect(i);
            blit(fb, &self.assets.seed_packet, card.x, card.y);
            let icon = match game.cards[i].kind {
                PlantKind::Sunflower => &self.assets.sunflower_icon,
                PlantKind::Peashooter => &self.assets.peashooter_icon,
                PlantKind::None => continue,
            };
            let dst = Rect::new(
                card.x + (card.w - PLANT_ICON_SIZE) / 2,
                card.y + 5,
                PLANT_ICON_SIZE,
                PLANT_ICON_SIZE,
            );
            blit_scaled_transparent(fb, icon, dst, false);
            if game.cards[i].selected {
                darken_rect(fb, card);
            }
        }
    }

    // ---- plants ----------------------------------------------------------

    fn plant_sheet(&self, kind: PlantKind) -> Option<&SpriteSheet<'a>> {
        match kind {
            PlantKind::Sunflower => Some(&self.assets.sunflower_sheet),
            PlantKind::Peashooter => Some(&self.assets.peashooter_sheet),
            PlantKind::None => None,
        }
    }

    fn draw_plant_cell(&self, fb: &mut [u8], game: &GameState, row: usize, col: usize) {
        let cell = &game.grid[row][col];
        if let Some(sheet) = self.plant_sheet(cell.plant) {
            blit_sheet_frame(fb, sheet, cell.anim_frame, plant_rect(row, col), true);
        }
    }

    /// Restore background under `rect` and repair any plant the restore
    /// overlapped. UI pixels are immune to both steps.
    fn erase_rect(&self, fb: &mut [u8], game: &GameState, rect: Rect) {
        let r = rect.expanded(ERASE_MARGIN);
        restore_background(fb, &self.assets.background, r);
        for row in 0..GRID_ROWS {
            for col in 0..GRID_COLS {
                if game.grid[row][col].plant != PlantKind::None
                    && plant_rect(row, col).intersects(&r)
                {
                    self.draw_plant_cell(fb, game, row, col);
                }
            }
        }
    }

    // ---- frame paths -----------------------------------------------------

    /// Dirty-rect update of a frame that already holds the previous scene.
    pub fn draw_incremental(&self, fb: &mut [u8], game: &mut GameState, anim_changed: bool) {
        // phase one: erase stale mobiles
        for i in 0..SUN_POOL {
            if let Some((px, py)) = game.suns[i].prev {
                self.erase_rect(fb, game, Rect::new(px, py, SUN_SIZE, SUN_SIZE));
            }
        }
        for i in 0..PEA_POOL {
            if let Some((px, py)) = game.peas[i].prev {
                self.erase_rect(fb, game, Rect::new(px, py, PEA_SIZE, PEA_SIZE));
            }
        }
        for i in 0..ZOMBIE_POOL {
            if let Some((px, py)) = game.zombies[i].prev {
                self.erase_rect(fb, game, Rect::new(px, py, ZOMBIE_SIZE, ZOMBIE_SIZE));
            }
        }

        // plant frames flipped: erase and redraw every planted cell so the
        // old frame's pixels cannot show through the new frame's key
        if anim_changed {
            for row in 0..GRID_ROWS {
                for col in 0..GRID_COLS {
                    if game.grid[row][col].plant != PlantKind::None {
                        restore_background(fb, &self.assets.background, plant_rect(row, col));
                        self.draw_plant_cell(fb, game, row, col);
                    }
                }
            }
        }

        // phase two: draw live mobiles at their new positions
        self.draw_mobiles(fb, game);
    }

    /// Repaint the scene from scratch: background, UI, plants, mobiles.
    pub fn draw_full(&self, fb: &mut [u8], game: &mut GameState) {
        fb.copy_from_slice(self.assets.background.data);
        self.draw_sun_bank(fb, game);
        self.draw_seed_bank(fb, game);
        for row in 0..GRID_ROWS {
            for col in 0..GRID_COLS {
                self.draw_plant_cell(fb, game, row, col);
            }
        }
        self.draw_mobiles(fb, game);
    }

    /// The defeat screen: black field with the defeat image zooming in.
    pub fn draw_defeat(&self, fb: &mut [u8], game: &GameState) {
        fill_rect(
            fb,
            Rect::new(0, 0, SCREEN_WIDTH as i32, SCREEN_HEIGHT as i32),
            Bgr::BLACK,
        );
        let img = &self.assets.defeat;
        let w = ((img.w as f32 * game.defeat_scale) as i32).max(1);
        let h = ((img.h as f32 * game.defeat_scale) as i32).max(1);
        let dst = Rect::new(
            (SCREEN_WIDTH as i32 - w) / 2,
            (SCREEN_HEIGHT as i32 - h) / 2,
            w,
            h,
        );
        blit_scaled_transparent(fb, img, dst, false);
    }

    fn draw_mobiles(&self, fb: &mut [u8], game: &mut GameState) {
        for pea in game.peas.iter_mut() {
            if pea.active {
                let (x, y) = pea.screen_pos();
                blit_transparent(fb, &self.assets.pea, x, y, true);
                pea.prev = Some((x, y));
            } else {
                pea.prev = None;
            }
        }
        for zombie in game.zombies.iter_mut() {
            if zombie.active {
                let (x, y) = zombie.screen_pos();
                blit_sheet_frame(
                    fb,
                    &self.assets.zombie_sheet,
                    zombie.sheet_frame(),
                    Rect::new(x, y, ZOMBIE_SIZE, ZOMBIE_SIZE),
                    true,
                );
                zombie.prev = Some((x, y));
            } else {
                zombie.prev = None;
            }
        }
        // suns draw last so a collectible is never hidden
        for sun in game.suns.iter_mut() {
            if sun.active {
                let (x, y) = sun.screen_pos();
                blit_transparent(fb, &self.assets.sun, x, y, true);
                sun.prev = Some((x, y));
            } else {
                sun.prev = None;
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_assets {
    use super::blit::{Sprite, SpriteSheet};
    use super::Assets;
    use crate::{FRAME_BYTES, SCREEN_HEIGHT, SCREEN_WIDTH};

    /// Heap-backed pixel data for hosted tests; `assets()` borrows it in the
    /// shape the renderer wants.
    pub struct OwnedAssets {
        background: Vec<u8>,
        sun_bank: Vec<u8>,
        seed_bank: Vec<u8>,
        seed_packet: Vec<u8>,
        icon: Vec<u8>,
        plant_sheet: Vec<u8>,
        zombie_sheet: Vec<u8>,
        sun: Vec<u8>,
        pea: Vec<u8>,
        defeat: Vec<u8>,
    }

    fn solid(w: usize, h: usize, bgr: [u8; 3]) -> Vec<u8> {
        let mut v = Vec::with_capacity(w * h * 3);
        for _ in 0..(w * h) {
            v.extend_from_slice(&bgr);
        }
        v
    }

    pub const BG: [u8; 3] = [40, 120, 40];

    impl OwnedAssets {
        pub fn new() -> Self {
            OwnedAssets {
                background: solid(SCREEN_WIDTH, SCREEN_HEIGHT, BG),
                sun_bank: solid(63, 70, [200, 200, 200]),
                seed_bank: solid(357, 70, [90, 60, 60]),
                seed_packet: solid(45, 63, [120, 140, 150]),
                icon: solid(90, 90, [60, 200, 60]),
                plant_sheet: solid(400, 400, [50, 180, 70]),
                zombie_sheet: solid(400, 400, [130, 130, 90]),
                sun: solid(40, 40, [60, 220, 240]),
                pea: solid(16, 16, [70, 190, 80]),
                defeat: solid(300, 150, [40, 40, 200]),
            }
        }

        pub fn assets(&self) -> Assets<'_> {
            fn sprite(data: &Vec<u8>, w: i32, h: i32) -> Sprite<'_> {
                Sprite {
                    data: data.as_slice(),
                    w,
                    h,
                }
            }
            Assets {
                background: sprite(&self.background, SCREEN_WIDTH as i32, SCREEN_HEIGHT as i32),
                sun_bank: sprite(&self.sun_bank, 63, 70),
                seed_bank: sprite(&self.seed_bank, 357, 70),
                seed_packet: sprite(&self.seed_packet, 45, 63),
                sunflower_icon: sprite(&self.icon, 90, 90),
                peashooter_icon: sprite(&self.icon, 90, 90),
                sunflower_sheet: SpriteSheet {
                    data: &self.plant_sheet,
                    sheet_size: 400,
                    frame_size: 80,
                    cols: 5,
                },
                peashooter_sheet: SpriteSheet {
                    data: &self.plant_sheet,
                    sheet_size: 400,
                    frame_size: 80,
                    cols: 5,
                },
                zombie_sheet: SpriteSheet {
                    data: &self.zombie_sheet,
                    sheet_size: 400,
                    frame_size: 80,
                    cols: 5,
                },
                sun: sprite(&self.sun, 40, 40),
                pea: sprite(&self.pea, 16, 16),
                defeat: sprite(&self.defeat, 300, 150),
            }
        }

        pub fn frame(&self) -> Vec<u8> {
            vec![0u8; FRAME_BYTES]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_assets::{OwnedAssets, BG};
    use super::*;
    use crate::FRAME_STRIDE;

    fn ui_bytes(fb: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        for rect in [SUN_BANK_RECT, SEED_BANK_RECT] {
            for y in rect.y..rect.bottom() {
                let start = y as usize * FRAME_STRIDE + rect.x as usize * 3;
                out.extend_from_slice(&fb[start..start + rect.w as usize * 3]);
            }
        }
        out
    }

    fn pixel_at(fb: &[u8], x: usize, y: usize) -> [u8; 3] {
        let i = y * FRAME_STRIDE + x * 3;
        [fb[i], fb[i + 1], fb[i + 2]]
    }

    #[test]
    fn incremental_frames_never_touch_the_ui() {
        let owned = OwnedAssets::new();
        let renderer = Renderer::new(owned.assets());
        let mut game = GameState::new();
        let mut fb = owned.frame();
        renderer.draw_full(&mut fb, &mut game);
        let before = ui_bytes(&fb);

        // a sun arcing right through the banner region
        game.spawn_sun(5.0, 5.0, 400.0);
        game.spawn_zombie(0);
        for _ in 0..40 {
            game.step();
            renderer.draw_incremental(&mut fb, &mut game, true);
        }
        assert_eq!(ui_bytes(&fb), before);
    }

    #[test]
    fn erased_mobile_leaves_background_behind() {
        let owned = OwnedAssets::new();
        let renderer = Renderer::new(owned.assets());
        let mut game = GameState::new();
        let mut fb = owned.frame();
        renderer.draw_full(&mut fb, &mut game);

        game.spawn_sun(400.0, 300.0, 300.0);
        game.suns[0].vy = 0.0;
        game.suns[0].landed = true;
        renderer.draw_incremental(&mut fb, &mut game, false);
        assert_eq!(pixel_at(&fb, 405, 305), [60, 220, 240]);

        game.suns[0].active = false;
        renderer.draw_incremental(&mut fb, &mut game, false);
        assert_eq!(pixel_at(&fb, 405, 305), BG);
        assert_eq!(game.suns[0].prev, None);
    }

    #[test]
    fn moving_pea_erases_its_old_position() {
        let owned = OwnedAssets::new();
        let renderer = Renderer::new(owned.assets());
        let mut game = GameState::new();
        let mut fb = owned.frame();
        renderer.draw_full(&mut fb, &mut game);

        game.grid[0][0].plant = PlantKind::Peashooter;
        game.grid[0][0].timer = crate::entities::PEA_FIRE_INTERVAL - 1;
        game.step();
        renderer.draw_incremental(&mut fb, &mut game, false);
        let (x0, y0) = game.peas[0].prev.unwrap();
        for _ in 0..10 {
            game.step();
        }
        renderer.draw_incremental(&mut fb, &mut game, false);
        // old spot (just right of the shooter's own cell) is lawn again,
        // new spot is pea
        assert_eq!(pixel_at(&fb, x0 as usize + 10, y0 as usize + 2), BG);
        let (x1, y1) = game.peas[0].prev.unwrap();
        assert_eq!(pixel_at(&fb, x1 as usize + 2, y1 as usize + 2), [70, 190, 80]);
    }

    #[test]
    fn erase_repairs_overlapped_plants() {
        let owned = OwnedAssets::new();
        let renderer = Renderer::new(owned.assets());
        let mut game = GameState::new();
        let mut fb = owned.frame();
        game.grid[2][4].plant = PlantKind::Sunflower;
        renderer.draw_full(&mut fb, &mut game);

        let p = crate::game::plant_rect(2, 4);
        // park a zombie right on top of the plant, draw it, then remove it
        game.spawn_zombie(2);
        game.zombies[0].x = p.x as f32;
        renderer.draw_incremental(&mut fb, &mut game, false);
        game.zombies[0].active = false;
        renderer.draw_incremental(&mut fb, &mut game, false);
        let center = pixel_at(
            &fb,
            (p.x + p.w / 2) as usize,
            (p.y + p.h / 2) as usize,
        );
        assert_eq!(center, [50, 180, 70]);
    }

    #[test]
    fn defeat_screen_scales_around_the_center() {
        let owned = OwnedAssets::new();
        let renderer = Renderer::new(owned.assets());
        let mut game = GameState::new();
        let mut fb = owned.frame();

        game.defeat_scale = 0.5;
        renderer.draw_defeat(&mut fb, &game);
        assert_eq!(pixel_at(&fb, 400, 240), [40, 40, 200]);
        assert_eq!(pixel_at(&fb, 10, 10), [0, 0, 0]);

        game.defeat_scale = 0.0;
        renderer.draw_defeat(&mut fb, &game);
        // clamps to a single pixel rather than vanishing or panicking
        assert_eq!(pixel_at(&fb, 400, 240), [40, 40, 200]);
    }

    #[test]
    fn full_redraw_reflects_selection_and_currency() {
        let owned = OwnedAssets::new();
        let renderer = Renderer::new(owned.assets());
        let mut game = GameState::new();
        let mut fb = owned.frame();
        renderer.draw_full(&mut fb, &mut game);
        let plain = ui_bytes(&fb);

        game.cards[0].selected = true;
        game.sun_count = 75;
        renderer.draw_full(&mut fb, &mut game);
        assert_ne!(ui_bytes(&fb), plain);
        let card = card_rect(0);
        // darkened card face: half of the packet color
        assert_eq!(
            pixel_at(&fb, card.x as usize + 2, (card.bottom() - 2) as usize),
            [60, 70, 75]
        );
    }
}
