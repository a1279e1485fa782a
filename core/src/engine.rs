//! Main-loop glue: ticks in, touches in, frames out.
//!
//! `run_frame` is one iteration of the board's main loop. It banks freshly
//! drained timer ticks, steps the simulation a bounded number of times,
//! dispatches queued touch events, adjusts the backlight for the defeat
//! fade, and renders only when something changed.

use crate::game::{GameState, Phase};
use crate::hal::{Backlight, DisplayLink};
use crate::present::Presenter;
use crate::render::{Assets, Renderer};
use crate::scheduler::TickAccumulator;
use crate::touch::{Consumer, TouchEvent, TQ_CAPACITY};
use log::trace;

/// What one loop iteration did; the frontend uses it for pacing and the
/// tests for assertions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub steps: u32,
    pub touches: usize,
    pub presented: bool,
}

enum RenderMode {
    Skip,
    Incremental,
    Full,
    Defeat,
}

pub struct Engine<'a, D: DisplayLink, B: Backlight> {
    game: GameState,
    renderer: Renderer<'a>,
    presenter: Presenter,
    accumulator: TickAccumulator,
    display: D,
    backlight: B,
    base_duty: f32,
    last_duty: f32,
}

impl<'a, D: DisplayLink, B: Backlight> Engine<'a, D, B> {
    pub fn new(display: D, mut backlight: B, assets: Assets<'a>, base_duty: f32) -> Self {
        let presenter = Presenter::new(&display);
        backlight.set_duty(base_duty);
        Engine {
            game: GameState::new(),
            renderer: Renderer::new(assets),
            presenter,
            accumulator: TickAccumulator::new(),
            display,
            backlight,
            base_duty,
            last_duty: base_duty,
        }
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut GameState {
        &mut self.game
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn displayed_slot(&self) -> usize {
        self.presenter.displayed()
    }

    /// One main-loop iteration. `new_ticks` is whatever the caller just
    /// drained from the tick counter.
    pub fn run_frame(
        &mut self,
        new_ticks: u32,
        touch: &mut Consumer<'_, TQ_CAPACITY>,
    ) -> FrameReport {
        self.accumulator.add(new_ticks);
        let steps = self.accumulator.take_steps();
        for _ in 0..steps {
            self.game.step();
        }

        // drain is bounded by the queue depth so a chattering controller
        // cannot pin the loop here
        let mut events: heapless::Vec<TouchEvent, TQ_CAPACITY> = heapless::Vec::new();
        while events.len() < events.capacity() {
            match touch.pop() {
                Some(ev) => {
                    // push cannot fail under the len guard above
                    let _ = events.push(ev);
                }
                None => break,
            }
        }
        let touches = events.len();
        for ev in &events {
            self.game.handle_touch(*ev);
        }

        self.update_backlight();

        let ui_dirty = self.game.take_ui_dirty();
        let anim_dirty = self.game.take_anim_dirty();
        let mode = match self.game.phase {
            Phase::ShowingDefeat if steps > 0 || ui_dirty => RenderMode::Defeat,
            Phase::Restarting if ui_dirty => RenderMode::Defeat,
            _ if ui_dirty => RenderMode::Full,
            _ if anim_dirty || (steps > 0 && self.game.mobiles_dirty()) => {
                RenderMode::Incremental
            }
            _ => RenderMode::Skip,
        };

        let presented = match mode {
            RenderMode::Skip => false,
            RenderMode::Incremental => {
                self.presenter.prepare_incremental(&mut self.display);
                let fb = self.display.buffer_mut(self.presenter.back());
                self.renderer.draw_incremental(fb, &mut self.game, anim_dirty);
                self.presenter.present(&mut self.display);
                true
            }
            RenderMode::Full => {
                let fb = self.display.buffer_mut(self.presenter.back());
                self.renderer.draw_full(fb, &mut self.game);
                self.presenter.present(&mut self.display);
                true
            }
            RenderMode::Defeat => {
                let fb = self.display.buffer_mut(self.presenter.back());
                self.renderer.draw_defeat(fb, &self.game);
                self.presenter.present(&mut self.display);
                true
            }
        };

        trace!(
            "frame: steps={} touches={} presented={}",
            steps,
            touches,
            presented
        );
        FrameReport {
            steps,
            touches,
            presented,
        }
    }

    /// The fade-to-black dims the panel itself; everything else runs at the
    /// configured brightness. Redundant PWM writes are skipped.
    fn update_backlight(&mut self) {
        let duty = match self.game.phase {
            Phase::FadingToBlack => self.base_duty * (1.0 - self.game.fade_progress).max(0.0),
            _ => self.base_duty,
        };
        if duty != self.last_duty {
            self.backlight.set_duty(duty);
            self.last_duty = duty;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{card_rect, DEFEAT_X, FADE_TICKS};
    use crate::render::test_assets::OwnedAssets;
    use crate::touch::TouchQueue;
    use crate::FRAME_BYTES;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct TestDisplay {
        buffers: Vec<Vec<u8>>,
        scanned_out: Option<usize>,
    }

    impl TestDisplay {
        fn new() -> Self {
            TestDisplay {
                buffers: vec![vec![0u8; FRAME_BYTES]; 2],
                scanned_out: None,
            }
        }
    }

    impl DisplayLink for TestDisplay {
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
            let from = self.buffers[src].clone();
            self.buffers[dst].copy_from_slice(&from);
        }

        fn present_at_next_scan(&mut self, slot: usize) {
            self.scanned_out = Some(slot);
        }

        fn take_scan_complete(&mut self) -> bool {
            true
        }
    }

    #[derive(Clone)]
    struct TestBacklight {
        duties: Rc<RefCell<Vec<f32>>>,
    }

    impl TestBacklight {
        fn new() -> Self {
            TestBacklight {
                duties: Rc::new(RefCell::new(Vec::new())),
            }
        }
    }

    impl Backlight for TestBacklight {
        fn set_duty(&mut self, duty: f32) {
            self.duties.borrow_mut().push(duty);
        }
    }

    fn engine(assets: &OwnedAssets) -> Engine<'_, TestDisplay, TestBacklight> {
        Engine::new(TestDisplay::new(), TestBacklight::new(), assets.assets(), 0.8)
    }

    #[test]
    fn first_frame_presents_a_full_redraw() {
        let assets = OwnedAssets::new();
        let queue: TouchQueue<TQ_CAPACITY> = TouchQueue::new();
        let (_tx, mut rx) = queue.split();
        let mut e = engine(&assets);
        let report = e.run_frame(0, &mut rx);
        assert!(report.presented);
        assert_eq!(e.displayed_slot(), 1);
        // nothing changed since: no present
        let report = e.run_frame(0, &mut rx);
        assert!(!report.presented);
        assert_eq!(e.displayed_slot(), 1);
    }

    #[test]
    fn steps_are_capped_per_frame_and_backlog_drains() {
        let assets = OwnedAssets::new();
        let queue: TouchQueue<TQ_CAPACITY> = TouchQueue::new();
        let (_tx, mut rx) = queue.split();
        let mut e = engine(&assets);
        assert_eq!(e.run_frame(8, &mut rx).steps, 3);
        assert_eq!(e.run_frame(0, &mut rx).steps, 3);
        assert_eq!(e.run_frame(0, &mut rx).steps, 2);
        assert_eq!(e.run_frame(0, &mut rx).steps, 0);
    }

    #[test]
    fn queued_touches_reach_the_game() {
        let assets = OwnedAssets::new();
        let queue: TouchQueue<TQ_CAPACITY> = TouchQueue::new();
        let (mut tx, mut rx) = queue.split();
        let mut e = engine(&assets);
        let card = card_rect(1);
        tx.push(
            (card.x + 5) as u16,
            (card.y + 5) as u16,
            true,
        );
        let report = e.run_frame(0, &mut rx);
        assert_eq!(report.touches, 1);
        assert_eq!(e.game().selected_card, Some(1));
        // the selection change forces a present
        assert!(report.presented);
    }

    #[test]
    fn backlight_ramps_down_through_the_fade() {
        let assets = OwnedAssets::new();
        let queue: TouchQueue<TQ_CAPACITY> = TouchQueue::new();
        let (_tx, mut rx) = queue.split();
        let mut e = engine(&assets);
        let duties = e.backlight.duties.clone();
        e.game_mut().spawn_zombie(0);
        e.game_mut().zombies[0].x = DEFEAT_X;
        // trigger the defeat, then run half the fade
        for _ in 0..(FADE_TICKS / 2) {
            e.run_frame(1, &mut rx);
        }
        let log = duties.borrow();
        // initial duty plus a strictly decreasing ramp
        assert_eq!(log[0], 0.8);
        assert!(log.len() > 3);
        for pair in log[1..].windows(2) {
            assert!(pair[1] < pair[0]);
        }
        assert!(*log.last().unwrap() < 0.8);
    }

    #[test]
    fn identical_frames_drive_identical_engines() {
        let assets = OwnedAssets::new();
        let qa: TouchQueue<TQ_CAPACITY> = TouchQueue::new();
        let qb: TouchQueue<TQ_CAPACITY> = TouchQueue::new();
        let (mut txa, mut rxa) = qa.split();
        let (mut txb, mut rxb) = qb.split();
        let mut a = engine(&assets);
        let mut b = engine(&assets);

        let card = card_rect(0);
        for (tx, rx, e) in [
            (&mut txa, &mut rxa, &mut a),
            (&mut txb, &mut rxb, &mut b),
        ] {
            tx.push((card.x + 2) as u16, (card.y + 2) as u16, true);
            for i in 0..800u32 {
                e.run_frame(if i % 3 == 0 { 2 } else { 1 }, rx);
            }
        }
        assert!(a.game() == b.game());
    }

    #[test]
    fn defeat_screen_is_presented_during_the_zoom() {
        let assets = OwnedAssets::new();
        let queue: TouchQueue<TQ_CAPACITY> = TouchQueue::new();
        let (_tx, mut rx) = queue.split();
        let mut e = engine(&assets);
        e.game_mut().spawn_zombie(0);
        e.game_mut().zombies[0].x = DEFEAT_X;
        for _ in 0..(FADE_TICKS + 2) {
            e.run_frame(1, &mut rx);
        }
        assert_eq!(e.game().phase, Phase::ShowingDefeat);
        let report = e.run_frame(1, &mut rx);
        assert!(report.presented);
        // the displayed buffer is the black defeat field at its corner
        let fb = e.display().buffer(e.displayed_slot());
        assert_eq!(&fb[0..3], &[0, 0, 0]);
    }
}
