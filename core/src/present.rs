//! Tear-free presentation over the [`DisplayLink`] buffer pair.
//!
//! The presenter owns the slot bookkeeping: one slot is on screen, the
//! other is the render target. A flip waits for the scan-complete signal
//! before retargeting the scan-out engine, so the hardware never switches
//! buffers mid-frame.

use crate::hal::DisplayLink;

pub struct Presenter {
    displayed: usize,
    next_render: usize,
    count: usize,
}

impl Presenter {
    pub fn new(display: &impl DisplayLink) -> Self {
        let count = display.buffer_count();
        assert!(count >= 2, "double buffering needs at least two slots");
        Presenter {
            displayed: 0,
            next_render: 1,
            count,
        }
    }

    /// Slot currently being scanned out.
    pub fn displayed(&self) -> usize {
        self.displayed
    }

    /// Slot to render the next frame into.
    pub fn back(&self) -> usize {
        self.next_render
    }

    /// Bring the back buffer up to date with the screen before an
    /// incremental redraw patches it.
    pub fn prepare_incremental(&self, display: &mut impl DisplayLink) {
        display.copy_buffer(self.displayed, self.next_render);
    }

    /// Publish the back buffer: flush CPU writes, wait out the current
    /// scan, then flip. Blocks until the scan boundary.
    pub fn present(&mut self, display: &mut impl DisplayLink) {
        display.flush(self.next_render);
        while !display.take_scan_complete() {
            core::hint::spin_loop();
        }
        display.present_at_next_scan(self.next_render);
        self.displayed = self.next_render;
        self.next_render = (self.next_render + 1) % self.count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FRAME_BYTES;

    #[derive(Debug, PartialEq)]
    enum Call {
        Flush(usize),
        ScanPolled,
        Present(usize),
        Copy(usize, usize),
    }

    struct MockDisplay {
        buffers: Vec<Vec<u8>>,
        calls: Vec<Call>,
        /// Polls of the scan signal needed before it reads as set.
        scan_wait: u32,
    }

    impl MockDisplay {
        fn new() -> Self {
            MockDisplay {
                buffers: vec![vec![0u8; FRAME_BYTES]; 2],
                calls: Vec::new(),
                scan_wait: 0,
            }
        }
    }

    impl DisplayLink for MockDisplay {
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
            self.calls.push(Call::Copy(src, dst));
            let from = self.buffers[src].clone();
            self.buffers[dst].copy_from_slice(&from);
        }

        fn flush(&mut self, slot: usize) {
            self.calls.push(Call::Flush(slot));
        }

        fn present_at_next_scan(&mut self, slot: usize) {
            self.calls.push(Call::Present(slot));
        }

        fn take_scan_complete(&mut self) -> bool {
            self.calls.push(Call::ScanPolled);
            if self.scan_wait > 0 {
                self.scan_wait -= 1;
                false
            } else {
                true
            }
        }
    }

    #[test]
    fn slots_alternate_across_presents() {
        let mut display = MockDisplay::new();
        let mut p = Presenter::new(&display);
        assert_eq!((p.displayed(), p.back()), (0, 1));
        p.present(&mut display);
        assert_eq!((p.displayed(), p.back()), (1, 0));
        p.present(&mut display);
        assert_eq!((p.displayed(), p.back()), (0, 1));
    }

    #[test]
    fn flip_happens_only_after_the_scan_completes() {
        let mut display = MockDisplay::new();
        display.scan_wait = 3;
        let mut p = Presenter::new(&display);
        p.present(&mut display);
        assert_eq!(
            display.calls,
            vec![
                Call::Flush(1),
                Call::ScanPolled,
                Call::ScanPolled,
                Call::ScanPolled,
                Call::ScanPolled,
                Call::Present(1),
            ]
        );
    }

    #[test]
    fn incremental_prepare_copies_screen_into_back_buffer() {
        let mut display = MockDisplay::new();
        display.buffers[0][100] = 0xAB;
        let p = Presenter::new(&display);
        p.prepare_incremental(&mut display);
        assert_eq!(display.calls, vec![Call::Copy(0, 1)]);
        assert_eq!(display.buffers[1][100], 0xAB);
    }
}
