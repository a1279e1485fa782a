//! Pooled entity model: plant grid cells, collectible suns, pea projectiles
//! and zombies. Pools are fixed-size arrays reused via the `active` flag;
//! nothing is heap-allocated and slot reuse is O(1), which keeps the
//! real-time bounds of the step loop honest.

use crate::render::blit::Rect;

pub const GRID_ROWS: usize = 5;
pub const GRID_COLS: usize = 9;
pub const GRID_START_X: i32 = 146;
pub const GRID_START_Y: i32 = 63;
pub const CELL_W: i32 = 65;
pub const CELL_H: i32 = 79;
pub const PLANT_SIZE: i32 = 58;

pub const SUN_POOL: usize = 8;
pub const PEA_POOL: usize = 24;
pub const ZOMBIE_POOL: usize = 10;

pub const SUN_SIZE: i32 = 40;
pub const SUN_VALUE: u32 = 25;
/// Ticks a sun stays on screen, landed or not.
pub const SUN_LIFETIME: u32 = 800;
pub const SUN_GRAVITY: f32 = 0.12;
/// Initial upward pop when a sunflower produces.
pub const SUN_POP_VY: f32 = -1.8;
pub const SUN_PRODUCE_INTERVAL: u32 = 700;

pub const PEA_SIZE: i32 = 16;
pub const PEA_SPEED: f32 = 3.0;
pub const PEA_DAMAGE: i32 = 1;
pub const PEA_FIRE_INTERVAL: u32 = 160;

pub const ZOMBIE_SIZE: i32 = 70;
pub const ZOMBIE_SPEED: f32 = 0.4;
pub const ZOMBIE_HEALTH: i32 = 10;
pub const ZOMBIE_SPAWN_INTERVAL: u32 = 600;
/// Ticks of biting needed to destroy a plant.
pub const ZOMBIE_BITE_TICKS: u32 = 250;

/// Walk cycle uses sheet frames `0..ZOMBIE_WALK_FRAMES`; the bite cycle the
/// next `ZOMBIE_BITE_FRAMES` frames.
pub const ZOMBIE_WALK_FRAMES: usize = 16;
pub const ZOMBIE_BITE_FRAMES: usize = 9;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlantKind {
    #[default]
    None,
    Sunflower,
    Peashooter,
}

/// One lawn tile.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    pub plant: PlantKind,
    pub anim_frame: usize,
    /// Per-cell production/fire counter, reset when it triggers.
    pub timer: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Card {
    pub kind: PlantKind,
    pub cost: u32,
    pub selected: bool,
}

/// A collectible sun. Pops up, falls under gravity to `land_y`, then sits
/// until its lifetime runs out or a touch release collects it.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Sun {
    pub active: bool,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub land_y: f32,
    pub landed: bool,
    pub life: u32,
    /// Screen position drawn last frame; `None` once erased.
    pub prev: Option<(i32, i32)>,
}

impl Sun {
    /// Positions truncate toward zero at draw time; this truncation (not
    /// rounding) is what the renderer and record/replay both see.
    pub fn screen_pos(&self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }

    pub fn bounds(&self) -> Rect {
        let (x, y) = self.screen_pos();
        Rect::new(x, y, SUN_SIZE, SUN_SIZE)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Pea {
    pub active: bool,
    pub x: f32,
    pub y: f32,
    pub row: usize,
    pub prev: Option<(i32, i32)>,
}

impl Pea {
    pub fn screen_pos(&self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }

    pub fn bounds(&self) -> Rect {
        let (x, y) = self.screen_pos();
        Rect::new(x, y, PEA_SIZE, PEA_SIZE)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ZombieState {
    #[default]
    Walking,
    Biting {
        target_col: usize,
        timer: u32,
    },
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Zombie {
    pub active: bool,
    /// Left edge of the sprite.
    pub x: f32,
    pub row: usize,
    pub health: i32,
    pub anim_frame: usize,
    pub state: ZombieState,
    pub prev: Option<(i32, i32)>,
}

impl Zombie {
    pub fn y(&self) -> i32 {
        GRID_START_Y + self.row as i32 * CELL_H + (CELL_H - ZOMBIE_SIZE) / 2
    }

    pub fn screen_pos(&self) -> (i32, i32) {
        (self.x as i32, self.y())
    }

    pub fn center_x(&self) -> f32 {
        self.x + ZOMBIE_SIZE as f32 / 2.0
    }

    pub fn bounds(&self) -> Rect {
        let (x, y) = self.screen_pos();
        Rect::new(x, y, ZOMBIE_SIZE, ZOMBIE_SIZE)
    }

    pub fn is_biting(&self) -> bool {
        matches!(self.state, ZombieState::Biting { .. })
    }

    /// Linear sheet frame for the current state.
    pub fn sheet_frame(&self) -> usize {
        match self.state {
            ZombieState::Walking => self.anim_frame % ZOMBIE_WALK_FRAMES,
            ZombieState::Biting { .. } => {
                ZOMBIE_WALK_FRAMES + self.anim_frame % ZOMBIE_BITE_FRAMES
            }
        }
    }
}
