//! Interfaces presented by the board support code. The core never programs
//! the VDMA engine, the interrupt controller or the PWM block directly; it
//! only talks to these traits.

/// The display scan-out engine and its frame buffers.
///
/// The hardware scans out of one buffer slot while the core renders into
/// another. There is no read-back of which slot is live beyond the
/// scan-complete signal; the caller tracks the pair of indices itself
/// (see [`crate::present::Presenter`]).
pub trait DisplayLink {
    fn buffer_count(&self) -> usize;

    /// Scan-out view of a buffer slot.
    fn buffer(&self, slot: usize) -> &[u8];

    /// Render target view of a buffer slot.
    fn buffer_mut(&mut self, slot: usize) -> &mut [u8];

    /// Copy one full buffer into another. Needed before an incremental
    /// redraw: the back buffer is one-or-more frames stale relative to
    /// what is on screen.
    fn copy_buffer(&mut self, src: usize, dst: usize);

    /// Publish CPU writes to the hardware's view of `slot`. Models the
    /// data-cache flush on the reference board; a no-op where the buffers
    /// are coherent.
    fn flush(&mut self, _slot: usize) {}

    /// Switch scan-out to `slot`, effective at the next scan boundary.
    fn present_at_next_scan(&mut self, slot: usize);

    /// Read-and-clear the "scan just completed" signal. Set by the display
    /// interrupt, cleared by this call. May park the processor in a
    /// low-power wait instead of returning `false` immediately.
    fn take_scan_complete(&mut self) -> bool;
}

/// PWM backlight. Duty is a fraction in `0.0..=1.0`; the defeat fade ramps
/// it down to black.
pub trait Backlight {
    fn set_duty(&mut self, duty: f32);
}
