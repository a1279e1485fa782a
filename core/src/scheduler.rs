//! Fixed-timestep plumbing between the timer interrupt and the main loop.
//!
//! The interrupt only increments a counter; all game logic runs in the main
//! loop, which drains the counter once per iteration and steps the
//! simulation a bounded number of times.

use core::sync::atomic::{AtomicU32, Ordering};

/// Upper bound on simulation steps per loop iteration. Ticks beyond the cap
/// stay queued in the accumulator, so the simulation may lag real time under
/// load but the per-frame cost stays bounded.
pub const MAX_STEPS_PER_LOOP: u32 = 3;

/// Tick counter shared between the timer interrupt and the main loop.
#[derive(Debug, Default)]
pub struct TickCounter(AtomicU32);

impl TickCounter {
    pub const fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    /// Interrupt side: record that a tick happened. Nothing else runs in
    /// the handler.
    pub fn on_tick(&self) {
        self.0.fetch_add(1, Ordering::Release);
    }

    /// Main-loop side: atomic read-and-clear.
    pub fn drain(&self) -> u32 {
        self.0.swap(0, Ordering::AcqRel)
    }
}

/// Accumulates drained ticks and hands them out in capped batches.
#[derive(Debug, Default)]
pub struct TickAccumulator {
    pending: u32,
}

impl TickAccumulator {
    pub const fn new() -> Self {
        Self { pending: 0 }
    }

    pub fn add(&mut self, ticks: u32) {
        self.pending = self.pending.saturating_add(ticks);
    }

    /// Number of steps to run this iteration, at most
    /// [`MAX_STEPS_PER_LOOP`]. The remainder carries over.
    pub fn take_steps(&mut self) -> u32 {
        let steps = self.pending.min(MAX_STEPS_PER_LOOP);
        self.pending -= steps;
        steps
    }

    pub fn pending(&self) -> u32 {
        self.pending
    }
}
