//! Host-side stand-ins for the board peripherals: a pair of in-memory
//! frame buffers with a 60 Hz scan clock, and a backlight that just
//! remembers its duty for the painter to apply.

use lawn_core::hal::{Backlight, DisplayLink};
use lawn_core::FRAME_BYTES;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const SCAN_PERIOD: Duration = Duration::from_micros(16_667);

pub struct HostDisplay {
    buffers: [Vec<u8>; 2],
    next_scan: Instant,
}

impl HostDisplay {
    pub fn new() -> Self {
        HostDisplay {
            buffers: [vec![0u8; FRAME_BYTES], vec![0u8; FRAME_BYTES]],
            next_scan: Instant::now() + SCAN_PERIOD,
        }
    }
}

impl DisplayLink for HostDisplay {
    fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    fn buffer(&self, slot: usize) -> &[u8] {
        &self.buffers[slot]
    }

    fn buffer_mut(&mut self, slot: usize) -> &mut [u8] {
        &mut self.buffers[slot]
    }

    fn copy_buffer(&mut self, src: usize, dst: usize) {
        if src == dst {
            return;
        }
        let (a, b) = self.buffers.split_at_mut(1);
        if src == 0 {
            b[0].copy_from_slice(&a[0]);
        } else {
            a[0].copy_from_slice(&b[0]);
        }
    }

    fn present_at_next_scan(&mut self, _slot: usize) {}

    /// Models the scan-complete interrupt by sleeping out the rest of the
    /// current 60 Hz scan period.
    fn take_scan_complete(&mut self) -> bool {
        let now = Instant::now();
        if now < self.next_scan {
            thread::sleep(self.next_scan - now);
        }
        self.next_scan += SCAN_PERIOD;
        // a long stall should not cause a burst of instant scans
        let now = Instant::now();
        if self.next_scan < now {
            self.next_scan = now + SCAN_PERIOD;
        }
        true
    }
}

/// The painter darkens its output by the stored duty, which is how the
/// defeat fade shows up in a terminal.
#[derive(Clone)]
pub struct HostBacklight {
    duty: Arc<AtomicU32>,
}

impl HostBacklight {
    pub fn new() -> Self {
        HostBacklight {
            duty: Arc::new(AtomicU32::new(1.0f32.to_bits())),
        }
    }

    pub fn duty(&self) -> f32 {
        f32::from_bits(self.duty.load(Ordering::Relaxed))
    }
}

impl Backlight for HostBacklight {
    fn set_duty(&mut self, duty: f32) {
        self.duty.store(duty.to_bits(), Ordering::Relaxed);
    }
}
