//! Terminal simulator for the lawn defense core. A background thread plays
//! the hardware timer, the mouse plays the touch panel, and the frame
//! buffers are painted with half blocks.
//!
//! Left-click selects cards and plants; releasing over a sun collects it.
//! `q` or `Esc` quits.

mod host;
mod sprites;
mod term;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};
use lawn_core::engine::Engine;
use lawn_core::hal::DisplayLink;
use lawn_core::scheduler::TickCounter;
use lawn_core::touch::{TouchQueue, TQ_CAPACITY};
use lawn_core::TICK_HZ;
use log::info;
use std::thread;
use std::time::Duration;

static TICKS: TickCounter = TickCounter::new();
static TOUCHES: TouchQueue<TQ_CAPACITY> = TouchQueue::new();

fn main() -> Result<()> {
    env_logger::init();

    let (mut touch_tx, mut touch_rx) = TOUCHES.split();

    // the 100 Hz timer interrupt
    thread::spawn(|| {
        let period = Duration::from_micros(1_000_000 / TICK_HZ as u64);
        loop {
            thread::sleep(period);
            TICKS.on_tick();
        }
    });

    let art = sprites::GeneratedAssets::new();
    let backlight = host::HostBacklight::new();
    let duty = backlight.clone();
    let mut engine = Engine::new(host::HostDisplay::new(), backlight, art.assets(), 1.0);
    let mut canvas = term::TermCanvas::new()?;
    info!("simulator up, {} Hz tick", TICK_HZ);

    'main: loop {
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break 'main,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        break 'main;
                    }
                    _ => {}
                },
                Event::Mouse(mouse) => {
                    let edge = match mouse.kind {
                        MouseEventKind::Down(MouseButton::Left) => Some(true),
                        MouseEventKind::Up(MouseButton::Left) => Some(false),
                        _ => None,
                    };
                    if let Some(is_down) = edge {
                        if let Some((x, y)) = canvas.map_cell(mouse.column, mouse.row) {
                            touch_tx.push(x, y, is_down);
                        }
                    }
                }
                Event::Resize(cols, rows) => canvas.resize(cols, rows),
                _ => {}
            }
        }

        let report = engine.run_frame(TICKS.drain(), &mut touch_rx);
        if report.presented {
            let fb = engine.display().buffer(engine.displayed_slot());
            canvas.paint(fb, duty.duty())?;
        } else {
            thread::sleep(Duration::from_millis(2));
        }
    }

    Ok(())
}
