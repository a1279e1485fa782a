#![cfg_attr(not(test), no_std)]

pub mod engine;
pub mod entities;
pub mod game;
pub mod hal;
pub mod present;
pub mod render;
pub mod scheduler;
pub mod touch;

pub const SCREEN_WIDTH: usize = 800;
pub const SCREEN_HEIGHT: usize = 480;

/// BGR, no padding.
pub const BYTES_PER_PIXEL: usize = 3;
pub const FRAME_STRIDE: usize = SCREEN_WIDTH * BYTES_PER_PIXEL;
pub const FRAME_BYTES: usize = FRAME_STRIDE * SCREEN_HEIGHT;

/// Simulation tick rate; the hardware timer fires at this frequency.
pub const TICK_HZ: u32 = 100;
