//! Aggregate game state and the fixed-timestep simulation.
//!
//! `step` advances the world by exactly one 10 ms tick. Given the same
//! sequence of ticks and touch events, two runs produce identical state:
//! the only randomness is the zombie row spawner, whose generator lives in
//! the state and is seeded from a constant.

use crate::entities::*;
use crate::render::blit::{Rect, SEED_BANK_RECT};
use crate::touch::TouchEvent;
use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_core::RngCore;

pub const NUM_CARDS: usize = 2;
pub const CARD_W: i32 = 45;
pub const CARD_H: i32 = 63;
pub const CARD_SPACING: i32 = 2;
pub const PLANT_ICON_SIZE: i32 = 35;

pub const SUNFLOWER_COST: u32 = 50;
pub const PEASHOOTER_COST: u32 = 100;
pub const STARTING_SUN: u32 = 150;

/// Plant sprite sheets hold 25 frames; one animation advance per
/// `FRAMES_PER_UPDATE` ticks gives roughly 12 fps at the 100 Hz tick rate.
pub const ANIMATION_FRAMES: usize = 25;
pub const FRAMES_PER_UPDATE: u32 = 8;

pub const FADE_TICKS: u32 = 200;
pub const DEFEAT_ZOOM_TICKS: u32 = 150;
pub const RESTART_DWELL_TICKS: u32 = 300;
pub const DEFEAT_MIN_SCALE: f32 = 0.1;

/// A zombie whose left edge reaches this (its right edge touching the first
/// lawn column) has reached the house: game over.
pub const DEFEAT_X: f32 = (GRID_START_X - ZOMBIE_SIZE) as f32;

const RNG_SEED: u64 = 0x6C61_776E;

pub fn grid_rect() -> Rect {
    Rect::new(
        GRID_START_X,
        GRID_START_Y,
        GRID_COLS as i32 * CELL_W,
        GRID_ROWS as i32 * CELL_H,
    )
}

pub fn cell_rect(row: usize, col: usize) -> Rect {
    Rect::new(
        GRID_START_X + col as i32 * CELL_W,
        GRID_START_Y + row as i32 * CELL_H,
        CELL_W,
        CELL_H,
    )
}

/// Plant sprite box, centered in its cell.
pub fn plant_rect(row: usize, col: usize) -> Rect {
    let c = cell_rect(row, col);
    Rect::new(
        c.x + (CELL_W - PLANT_SIZE) / 2,
        c.y + (CELL_H - PLANT_SIZE) / 2,
        PLANT_SIZE,
        PLANT_SIZE,
    )
}

pub fn card_rect(index: usize) -> Rect {
    Rect::new(
        SEED_BANK_RECT.x + 10 + index as i32 * (CARD_W + CARD_SPACING),
        SEED_BANK_RECT.y + 5,
        CARD_W,
        CARD_H,
    )
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Playing,
    FadingToBlack,
    ShowingDefeat,
    Restarting,
}

pub struct GameState {
    pub sun_count: u32,
    pub cards: [Card; NUM_CARDS],
    pub selected_card: Option<usize>,
    pub grid: [[Cell; GRID_COLS]; GRID_ROWS],
    pub suns: [Sun; SUN_POOL],
    pub peas: [Pea; PEA_POOL],
    pub zombies: [Zombie; ZOMBIE_POOL],

    pub phase: Phase,
    pub phase_timer: u32,
    /// 0..=1 through the fade-to-black.
    pub fade_progress: f32,
    /// Current scale of the defeat image, `DEFEAT_MIN_SCALE..=1`.
    pub defeat_scale: f32,

    anim_counter: u32,
    zombie_spawn_timer: u32,

    /// Currency, selection or phase changed: the next frame needs a full
    /// redraw, not a dirty-rect patch.
    ui_dirty: bool,
    /// A plant or zombie animation frame flipped.
    anim_dirty: bool,

    rng: SmallRng,
}

// Manual impl: the RNG carries no observable state of its own (it is a pure
// function of the seed and the spawn history, which the compared fields
// already pin down).
impl PartialEq for GameState {
    fn eq(&self, other: &Self) -> bool {
        self.sun_count == other.sun_count
            && self.cards == other.cards
            && self.selected_card == other.selected_card
            && self.grid == other.grid
            && self.suns == other.suns
            && self.peas == other.peas
            && self.zombies == other.zombies
            && self.phase == other.phase
            && self.phase_timer == other.phase_timer
            && self.fade_progress == other.fade_progress
            && self.defeat_scale == other.defeat_scale
            && self.anim_counter == other.anim_counter
            && self.zombie_spawn_timer == other.zombie_spawn_timer
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        info!("game initialized: sun={}", STARTING_SUN);
        GameState {
            sun_count: STARTING_SUN,
            cards: [
                Card {
                    kind: PlantKind::Sunflower,
                    cost: SUNFLOWER_COST,
                    selected: false,
                },
                Card {
                    kind: PlantKind::Peashooter,
                    cost: PEASHOOTER_COST,
                    selected: false,
                },
            ],
            selected_card: None,
            grid: [[Cell::default(); GRID_COLS]; GRID_ROWS],
            suns: [Sun::default(); SUN_POOL],
            peas: [Pea::default(); PEA_POOL],
            zombies: [Zombie::default(); ZOMBIE_POOL],
            phase: Phase::Playing,
            phase_timer: 0,
            fade_progress: 0.0,
            defeat_scale: 0.0,
            anim_counter: 0,
            zombie_spawn_timer: 0,
            ui_dirty: true,
            anim_dirty: false,
            rng: SmallRng::seed_from_u64(RNG_SEED),
        }
    }

    /// Full reset: pools cleared, grid cleared, currency and lifecycle back
    /// to initial values. Performed exactly once per defeat cycle.
    pub fn reset(&mut self) {
        info!("game reset");
        *self = GameState::new();
    }

    pub fn take_ui_dirty(&mut self) -> bool {
        core::mem::replace(&mut self.ui_dirty, false)
    }

    pub fn take_anim_dirty(&mut self) -> bool {
        core::mem::replace(&mut self.anim_dirty, false)
    }

    /// Any mobile slot that needs drawing or erasing this frame.
    pub fn mobiles_dirty(&self) -> bool {
        self.suns.iter().any(|s| s.active || s.prev.is_some())
            || self.peas.iter().any(|p| p.active || p.prev.is_some())
            || self.zombies.iter().any(|z| z.active || z.prev.is_some())
    }

    // ---- spawning ------------------------------------------------------

    /// Spawn a sun that falls to `land_y`. Also the entry point for
    /// sky-spawned suns. Silently dropped when the pool is full.
    pub fn spawn_sun(&mut self, x: f32, y: f32, land_y: f32) {
        match self.suns.iter_mut().find(|s| !s.active) {
            Some(slot) => {
                // keep the pending erase of the slot's previous occupant
                let prev = slot.prev;
                *slot = Sun {
                    active: true,
                    x,
                    y,
                    vx: 0.0,
                    vy: SUN_POP_VY,
                    land_y,
                    landed: false,
                    life: SUN_LIFETIME,
                    prev,
                };
            }
            None => debug!("sun pool exhausted, spawn dropped"),
        }
    }

    fn spawn_pea(&mut self, x: f32, y: f32, row: usize) {
        match self.peas.iter_mut().find(|p| !p.active) {
            Some(slot) => {
                let prev = slot.prev;
                *slot = Pea {
                    active: true,
                    x,
                    y,
                    row,
                    prev,
                };
            }
            None => debug!("pea pool exhausted, spawn dropped"),
        }
    }

    pub fn spawn_zombie(&mut self, row: usize) {
        match self.zombies.iter_mut().find(|z| !z.active) {
            Some(slot) => {
                let prev = slot.prev;
                *slot = Zombie {
                    active: true,
                    x: (crate::SCREEN_WIDTH as i32 - ZOMBIE_SIZE) as f32,
                    row,
                    health: ZOMBIE_HEALTH,
                    anim_frame: 0,
                    state: ZombieState::Walking,
                    prev,
                };
                debug!("zombie spawned in row {}", row);
            }
            None => debug!("zombie pool exhausted, spawn dropped"),
        }
    }

    // ---- simulation ----------------------------------------------------

    /// Advance the world by one tick.
    pub fn step(&mut self) {
        if self.phase != Phase::Playing {
            self.step_lifecycle();
            // zombies keep chewing through the fade
            self.advance_animation(false);
            return;
        }
        self.advance_animation(true);
        self.step_plants();
        self.step_peas();
        self.step_suns();
        self.step_zombies();
        self.check_defeat();
    }

    fn advance_animation(&mut self, include_plants: bool) {
        self.anim_counter += 1;
        if self.anim_counter < FRAMES_PER_UPDATE {
            return;
        }
        self.anim_counter = 0;
        if include_plants {
            for row in self.grid.iter_mut() {
                for cell in row.iter_mut() {
                    if cell.plant != PlantKind::None {
                        cell.anim_frame = (cell.anim_frame + 1) % ANIMATION_FRAMES;
                        self.anim_dirty = true;
                    }
                }
            }
        }
        for z in self.zombies.iter_mut().filter(|z| z.active) {
            let cycle = match z.state {
                ZombieState::Walking => ZOMBIE_WALK_FRAMES,
                ZombieState::Biting { .. } => ZOMBIE_BITE_FRAMES,
            };
            z.anim_frame = (z.anim_frame + 1) % cycle;
            self.anim_dirty = true;
        }
    }

    /// Per-cell production counters: sunflowers drop a sun, peashooters
    /// fire a pea.
    fn step_plants(&mut self) {
        for row in 0..GRID_ROWS {
            for col in 0..GRID_COLS {
                let kind = self.grid[row][col].plant;
                if kind == PlantKind::None {
                    continue;
                }
                self.grid[row][col].timer += 1;
                let r = plant_rect(row, col);
                match kind {
                    PlantKind::Sunflower
                        if self.grid[row][col].timer >= SUN_PRODUCE_INTERVAL =>
                    {
                        self.grid[row][col].timer = 0;
                        let x = (r.x + (PLANT_SIZE - SUN_SIZE) / 2) as f32;
                        let y = r.y as f32;
                        self.spawn_sun(x, y, y + 20.0);
                    }
                    PlantKind::Peashooter
                        if self.grid[row][col].timer >= PEA_FIRE_INTERVAL =>
                    {
                        self.grid[row][col].timer = 0;
                        self.spawn_pea(
                            (r.right() - PEA_SIZE / 2) as f32,
                            (r.y + 12) as f32,
                            row,
                        );
                    }
                    _ => {}
                }
            }
        }
    }

    fn step_peas(&mut self) {
        for pea in self.peas.iter_mut().filter(|p| p.active) {
            pea.x += PEA_SPEED;
            if pea.x as i32 >= crate::SCREEN_WIDTH as i32 {
                pea.active = false;
            }
        }
        // same-row rectangle overlap; a hit consumes the pea
        for pi in 0..PEA_POOL {
            if !self.peas[pi].active {
                continue;
            }
            for zi in 0..ZOMBIE_POOL {
                let z = &self.zombies[zi];
                if !z.active || z.row != self.peas[pi].row {
                    continue;
                }
                if self.peas[pi].bounds().intersects(&z.bounds()) {
                    self.peas[pi].active = false;
                    self.zombies[zi].health -= PEA_DAMAGE;
                    if self.zombies[zi].health <= 0 {
                        self.zombies[zi].active = false;
                        debug!("zombie {} down", zi);
                    }
                    break;
                }
            }
        }
    }

    fn step_suns(&mut self) {
        for sun in self.suns.iter_mut().filter(|s| s.active) {
            if !sun.landed {
                sun.vy += SUN_GRAVITY;
                sun.x += sun.vx;
                sun.y += sun.vy;
                if sun.vy > 0.0 && sun.y >= sun.land_y {
                    sun.y = sun.land_y;
                    sun.vx = 0.0;
                    sun.vy = 0.0;
                    sun.landed = true;
                }
            }
            // lifetime runs regardless of landing
            sun.life -= 1;
            if sun.life == 0 {
                sun.active = false;
            }
        }
    }

    fn step_zombies(&mut self) {
        self.zombie_spawn_timer += 1;
        if self.zombie_spawn_timer >= ZOMBIE_SPAWN_INTERVAL {
            self.zombie_spawn_timer = 0;
            let row = (self.rng.next_u32() as usize) % GRID_ROWS;
            self.spawn_zombie(row);
        }

        for i in 0..ZOMBIE_POOL {
            if !self.zombies[i].active {
                continue;
            }
            match self.zombies[i].state {
                ZombieState::Walking => {
                    self.zombies[i].x -= ZOMBIE_SPEED;
                    let row = self.zombies[i].row;
                    let center = self.zombies[i].center_x();
                    // closed interval on both edges, leftmost cell wins;
                    // biting latches, so the test holds at most once per cell
                    for col in 0..GRID_COLS {
                        if self.grid[row][col].plant == PlantKind::None {
                            continue;
                        }
                        let left = (GRID_START_X + col as i32 * CELL_W) as f32;
                        let right = left + CELL_W as f32;
                        if center >= left && center <= right {
                            self.zombies[i].state = ZombieState::Biting {
                                target_col: col,
                                timer: ZOMBIE_BITE_TICKS,
                            };
                            self.zombies[i].anim_frame = 0;
                            debug!("zombie {} bites ({}, {})", i, row, col);
                            break;
                        }
                    }
                }
                ZombieState::Biting { target_col, timer } => {
                    let row = self.zombies[i].row;
                    if self.grid[row][target_col].plant == PlantKind::None {
                        // plant got destroyed out from under us
                        self.zombies[i].state = ZombieState::Walking;
                        self.zombies[i].anim_frame = 0;
                    } else if timer <= 1 {
                        self.destroy_plant(row, target_col);
                    } else {
                        self.zombies[i].state = ZombieState::Biting {
                            target_col,
                            timer: timer - 1,
                        };
                    }
                }
            }
        }
    }

    /// A bite finished: clear the cell and put every zombie chewing on it
    /// back on the march.
    fn destroy_plant(&mut self, row: usize, col: usize) {
        debug!("plant at ({}, {}) eaten", row, col);
        self.grid[row][col] = Cell::default();
        // a vanished plant can leave pixels anywhere in its cell
        self.ui_dirty = true;
        for z in self.zombies.iter_mut().filter(|z| z.active) {
            if z.row == row {
                if let ZombieState::Biting { target_col, .. } = z.state {
                    if target_col == col {
                        z.state = ZombieState::Walking;
                        z.anim_frame = 0;
                    }
                }
            }
        }
    }

    fn check_defeat(&mut self) {
        if self.phase != Phase::Playing {
            return;
        }
        let breached = self
            .zombies
            .iter()
            .any(|z| z.active && z.x <= DEFEAT_X);
        if !breached {
            return;
        }
        warn!("zombie reached the house, game over");
        self.phase = Phase::FadingToBlack;
        self.phase_timer = 0;
        self.fade_progress = 0.0;
        self.ui_dirty = true;
        for z in self.zombies.iter_mut().filter(|z| z.active) {
            if z.x <= DEFEAT_X {
                z.x = DEFEAT_X;
                z.state = ZombieState::Biting {
                    target_col: 0,
                    timer: ZOMBIE_BITE_TICKS,
                };
                z.anim_frame = 0;
            }
        }
    }

    fn step_lifecycle(&mut self) {
        self.phase_timer += 1;
        match self.phase {
            Phase::Playing => {}
            Phase::FadingToBlack => {
                self.fade_progress = self.phase_timer as f32 / FADE_TICKS as f32;
                if self.phase_timer >= FADE_TICKS {
                    info!("fade complete, showing defeat");
                    self.phase = Phase::ShowingDefeat;
                    self.phase_timer = 0;
                    self.defeat_scale = DEFEAT_MIN_SCALE;
                    self.ui_dirty = true;
                }
            }
            Phase::ShowingDefeat => {
                let t = self.phase_timer as f32 / DEFEAT_ZOOM_TICKS as f32;
                self.defeat_scale = DEFEAT_MIN_SCALE + (1.0 - DEFEAT_MIN_SCALE) * t.min(1.0);
                if self.phase_timer >= DEFEAT_ZOOM_TICKS {
                    self.phase = Phase::Restarting;
                    self.phase_timer = 0;
                    self.ui_dirty = true;
                }
            }
            Phase::Restarting => {
                if self.phase_timer >= RESTART_DWELL_TICKS {
                    self.reset();
                }
            }
        }
    }

    // ---- touch dispatch --------------------------------------------------

    pub fn handle_touch(&mut self, ev: TouchEvent) {
        if self.phase != Phase::Playing {
            return;
        }
        let (x, y) = (ev.x as i32, ev.y as i32);
        if ev.is_down {
            self.touch_press(x, y);
        } else {
            self.collect_suns(x, y);
        }
    }

    fn touch_press(&mut self, x: i32, y: i32) {
        // card tray first
        for i in 0..NUM_CARDS {
            if !card_rect(i).contains(x, y) {
                continue;
            }
            if self.sun_count >= self.cards[i].cost {
                for card in self.cards.iter_mut() {
                    card.selected = false;
                }
                self.cards[i].selected = true;
                self.selected_card = Some(i);
                self.ui_dirty = true;
                debug!("card {} selected", i);
            } else {
                debug!(
                    "not enough sun: need {}, have {}",
                    self.cards[i].cost, self.sun_count
                );
            }
            return;
        }

        // then the lawn; out-of-range touches are ignored
        let Some(card) = self.selected_card else {
            return;
        };
        if !grid_rect().contains(x, y) {
            return;
        }
        let col = ((x - GRID_START_X) / CELL_W) as usize;
        let row = ((y - GRID_START_Y) / CELL_H) as usize;
        if self.grid[row][col].plant != PlantKind::None {
            debug!("cell ({}, {}) already planted", row, col);
            return;
        }
        self.grid[row][col] = Cell {
            plant: self.cards[card].kind,
            anim_frame: 0,
            timer: 0,
        };
        self.sun_count -= self.cards[card].cost;
        self.cards[card].selected = false;
        self.selected_card = None;
        self.ui_dirty = true;
        debug!(
            "planted at ({}, {}), sun left {}",
            row, col, self.sun_count
        );
    }

    fn collect_suns(&mut self, x: i32, y: i32) {
        for sun in self.suns.iter_mut().filter(|s| s.active) {
            if sun.bounds().contains(x, y) {
                sun.active = false;
                self.sun_count += SUN_VALUE;
                self.ui_dirty = true;
                debug!("sun collected, total {}", self.sun_count);
            }
        }
    }
}
