//! Paints the 800x480 frame buffer into the terminal with half-block
//! characters, two pixels per cell, and maps mouse cells back to panel
//! coordinates for the touch path.

use anyhow::Result;
use crossterm::style::{Color, Colors, Print, SetColors};
use crossterm::{cursor, event, execute, queue, terminal};
use lawn_core::{FRAME_STRIDE, SCREEN_HEIGHT, SCREEN_WIDTH};
use std::io::{stdout, Stdout, Write};

const HALF_BLOCK: &str = "\u{2580}";

pub struct TermCanvas {
    out: Stdout,
    cols: u16,
    rows: u16,
    /// Last painted (top, bottom) color per cell; `None` forces a repaint.
    cache: Vec<Option<(Color, Color)>>,
}

impl TermCanvas {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        execute!(
            out,
            terminal::EnterAlternateScreen,
            event::EnableMouseCapture,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All),
        )?;
        let (cols, rows) = terminal::size()?;
        Ok(TermCanvas {
            out,
            cols,
            rows,
            cache: vec![None; cols as usize * rows as usize],
        })
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.cache = vec![None; cols as usize * rows as usize];
    }

    /// Panel pixel under a terminal cell, for mouse-to-touch mapping.
    pub fn map_cell(&self, col: u16, row: u16) -> Option<(u16, u16)> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        let x = (col as usize * SCREEN_WIDTH) / self.cols as usize;
        let y = (row as usize * 2 * SCREEN_HEIGHT) / (self.rows as usize * 2);
        Some((x as u16, y as u16))
    }

    fn sample(fb: &[u8], x: usize, y: usize, duty: f32) -> Color {
        let i = y * FRAME_STRIDE + x * 3;
        let scale = |c: u8| (c as f32 * duty) as u8;
        Color::Rgb {
            r: scale(fb[i + 2]),
            g: scale(fb[i + 1]),
            b: scale(fb[i]),
        }
    }

    /// Nearest-neighbor downsample of the frame into the cell grid, painting
    /// only the cells whose colors changed since last time.
    pub fn paint(&mut self, fb: &[u8], duty: f32) -> Result<()> {
        let px_rows = self.rows as usize * 2;
        for row in 0..self.rows {
            for col in 0..self.cols {
                let x = (col as usize * SCREEN_WIDTH) / self.cols as usize;
                let y_top = (row as usize * 2 * SCREEN_HEIGHT) / px_rows;
                let y_bot = ((row as usize * 2 + 1) * SCREEN_HEIGHT) / px_rows;
                let top = Self::sample(fb, x, y_top, duty);
                let bottom = Self::sample(fb, x, y_bot.min(SCREEN_HEIGHT - 1), duty);

                let idx = row as usize * self.cols as usize + col as usize;
                if self.cache[idx] == Some((top, bottom)) {
                    continue;
                }
                self.cache[idx] = Some((top, bottom));
                queue!(
                    self.out,
                    cursor::MoveTo(col, row),
                    SetColors(Colors::new(top, bottom)),
                    Print(HALF_BLOCK),
                )?;
            }
        }
        self.out.flush()?;
        Ok(())
    }
}

impl Drop for TermCanvas {
    fn drop(&mut self) {
        let _ = execute!(
            self.out,
            cursor::Show,
            event::DisableMouseCapture,
            terminal::LeaveAlternateScreen,
        );
        let _ = terminal::disable_raw_mode();
    }
}
