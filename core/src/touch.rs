//! Touch input: the raw sample decoder and the lock-free queue that moves
//! events from the touch interrupt into the main loop.

use bit_field::BitField;
use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicUsize, Ordering};
use log::debug;

/// Queue depth used by the reference system. One slot is reserved to
/// distinguish full from empty, so 16 slots hold 15 events.
pub const TQ_CAPACITY: usize = 16;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TouchEvent {
    pub x: u16,
    pub y: u16,
    pub is_down: bool,
}

impl TouchEvent {
    const EMPTY: TouchEvent = TouchEvent {
        x: 0,
        y: 0,
        is_down: false,
    };
}

/// Decode an FT5426-style register image into an event.
///
/// Byte 3 carries the event flags in bits 6..8 (0b00 = press, 0b01 =
/// release) and the x high bits in bits 0..6; byte 4 is x low, bytes 5/6
/// the same for y. Anything other than a press or release (move, gesture,
/// no contact) yields `None`.
pub fn decode_sample(buf: &[u8]) -> Option<TouchEvent> {
    if buf.len() < 7 {
        return None;
    }
    let is_down = match buf[3].get_bits(6..8) {
        0b00 => true,
        0b01 => false,
        _ => return None,
    };
    let x = ((buf[3].get_bits(0..6) as u16) << 8) | buf[4] as u16;
    let y = ((buf[5].get_bits(0..6) as u16) << 8) | buf[6] as u16;
    Some(TouchEvent { x, y, is_down })
}

/// Single-producer single-consumer ring buffer.
///
/// The producer side is the touch interrupt, the consumer side the main
/// loop; neither ever blocks. The write index is advanced only by the
/// producer and the read index only by the consumer. A release store on an
/// index publishes the element written before it; the matching acquire
/// load on the other side guarantees a consumer never observes a partially
/// written element.
///
/// `split` must be called once. Adding a second producer or consumer
/// violates the discipline the orderings rely on and needs a different
/// queue design.
pub struct TouchQueue<const N: usize> {
    slots: UnsafeCell<[TouchEvent; N]>,
    write: AtomicUsize,
    read: AtomicUsize,
}

// Safety: the producer writes a slot strictly before publishing it via the
// write index, and the consumer reads it strictly before retiring it via
// the read index; no slot is ever accessed from both sides at once.
unsafe impl<const N: usize> Sync for TouchQueue<N> {}

impl<const N: usize> TouchQueue<N> {
    /// `const` so the queue can live in a `static` shared with the
    /// interrupt handler.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two() && N >= 2);
        Self {
            slots: UnsafeCell::new([TouchEvent::EMPTY; N]),
            write: AtomicUsize::new(0),
            read: AtomicUsize::new(0),
        }
    }

    pub fn split(&self) -> (Producer<'_, N>, Consumer<'_, N>) {
        (Producer { queue: self }, Consumer { queue: self })
    }

    fn push(&self, ev: TouchEvent) -> bool {
        let w = self.write.load(Ordering::Relaxed);
        let next = (w + 1) & (N - 1);
        if next == self.read.load(Ordering::Acquire) {
            // full: drop the event rather than stall the interrupt
            return false;
        }
        unsafe {
            (*self.slots.get())[w] = ev;
        }
        self.write.store(next, Ordering::Release);
        true
    }

    fn pop(&self) -> Option<TouchEvent> {
        let r = self.read.load(Ordering::Relaxed);
        if r == self.write.load(Ordering::Acquire) {
            return None;
        }
        let ev = unsafe { (*self.slots.get())[r] };
        self.read.store((r + 1) & (N - 1), Ordering::Release);
        Some(ev)
    }
}

/// Interrupt-side handle.
pub struct Producer<'a, const N: usize> {
    queue: &'a TouchQueue<N>,
}

unsafe impl<const N: usize> Send for Producer<'_, N> {}

impl<const N: usize> Producer<'_, N> {
    /// Returns whether the event was accepted. Never blocks.
    pub fn push(&mut self, x: u16, y: u16, is_down: bool) -> bool {
        let accepted = self.queue.push(TouchEvent { x, y, is_down });
        if !accepted {
            debug!("touch queue full, event dropped");
        }
        accepted
    }
}

/// Main-loop-side handle.
pub struct Consumer<'a, const N: usize> {
    queue: &'a TouchQueue<N>,
}

unsafe impl<const N: usize> Send for Consumer<'_, N> {}

impl<const N: usize> Consumer<'_, N> {
    pub fn pop(&mut self) -> Option<TouchEvent> {
        self.queue.pop()
    }
}
