use std::io::{stdout, Error, ErrorKind, Stdout, Write};
use std::time::Duration;

use crossterm::event::{poll, read, Event, KeyEvent};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue};

use crate::engine::{GameEngine, RunState};
use crate::{Cell, GridInt};

// Two terminal columns per grid cell, so cells come out roughly square.
const CELL_COLS: u16 = 2;

// Reference palette: light background, green snake with the head in a
// deeper tone, red food.
const FIELD_COLOR: Color = Color::White;
const BODY_COLOR: Color = Color::Green;
const HEAD_COLOR: Color = Color::DarkGreen;
const FOOD_COLOR: Color = Color::Red;

/// Paints engine snapshots onto the alternate screen: border, playfield
/// background, one flat-color block per snake segment and for the food,
/// and a status line with the score and the start/pause control label.
pub struct TermRenderer {
    stdout: Stdout,
    grid: u16,
}

impl TermRenderer {
    pub fn new(grid_count: GridInt) -> Self {
        TermRenderer { stdout: stdout(), grid: grid_count as u16 }
    }

    pub fn setup(&mut self) -> crossterm::Result<()> {
        let (cols, rows) = terminal::size()?;
        if cols < self.frame_width() || rows < self.frame_height() + 1 {
            return Err(Error::new(
                ErrorKind::Other,
                format!(
                    "terminal too small: need {}x{} cells",
                    self.frame_width(),
                    self.frame_height() + 1
                ),
            )
            .into());
        }

        execute!(self.stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(self.stdout, cursor::Hide, Clear(ClearType::All))
    }

    pub fn restore(&mut self) -> crossterm::Result<()> {
        terminal::disable_raw_mode()?;
        execute!(self.stdout, cursor::Show, LeaveAlternateScreen)
    }

    /// Repaint the whole frame from the engine snapshot.
    pub fn draw_frame(&mut self, engine: &GameEngine) -> crossterm::Result<()> {
        queue!(self.stdout, ResetColor)?;
        self.draw_border()?;

        let blank = " ".repeat(self.grid as usize * CELL_COLS as usize);
        queue!(self.stdout, SetBackgroundColor(FIELD_COLOR))?;
        for y in 0..self.grid {
            queue!(self.stdout, cursor::MoveTo(1, 1 + y), Print(&blank))?;
        }

        for (i, cell) in engine.snake().segments().enumerate() {
            let color = if i == 0 { HEAD_COLOR } else { BODY_COLOR };
            self.fill_cell(cell, color)?;
        }
        self.fill_cell(engine.food(), FOOD_COLOR)?;
        queue!(self.stdout, ResetColor)?;

        self.draw_status(engine)?;
        Ok(self.stdout.flush()?)
    }

    /// Centered modal box over the playfield. Dismissed by the next
    /// `draw_frame`, which repaints everything underneath.
    pub fn show_message(&mut self, lines: &[&str]) -> crossterm::Result<()> {
        let width = lines.iter().map(|l| l.len()).max().unwrap_or(0) as u16 + 4;
        let height = lines.len() as u16 + 2;
        let left = self.frame_width().saturating_sub(width) / 2;
        let top = self.frame_height().saturating_sub(height) / 2;

        queue!(
            self.stdout,
            SetBackgroundColor(Color::Grey),
            SetForegroundColor(Color::Black)
        )?;
        for dy in 0..height {
            queue!(
                self.stdout,
                cursor::MoveTo(left, top + dy),
                Print(" ".repeat(width as usize))
            )?;
        }
        for (i, line) in lines.iter().enumerate() {
            let padded = format!("{line: ^width$}", line = line, width = width as usize);
            queue!(self.stdout, cursor::MoveTo(left, top + 1 + i as u16), Print(padded))?;
        }
        queue!(self.stdout, ResetColor)?;
        Ok(self.stdout.flush()?)
    }

    /// Wait up to `timeout` for a key. `Ok(None)` on timeout or when a
    /// non-key event was consumed.
    pub fn poll_key(&mut self, timeout: Duration) -> crossterm::Result<Option<KeyEvent>> {
        if poll(timeout)? {
            if let Event::Key(ev) = read()? {
                return Ok(Some(ev));
            }
        }
        Ok(None)
    }

    pub fn read_key_blocking(&mut self) -> crossterm::Result<KeyEvent> {
        loop {
            if let Event::Key(ev) = read()? {
                return Ok(ev);
            }
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    fn frame_width(&self) -> u16 {
        self.grid * CELL_COLS + 2
    }

    fn frame_height(&self) -> u16 {
        self.grid + 2
    }

    fn draw_border(&mut self) -> crossterm::Result<()> {
        let end_x = self.frame_width() - 1;
        let end_y = self.frame_height() - 1;

        for x in 0..=end_x {
            let ch = if x == 0 || x == end_x { '+' } else { '-' };
            queue!(
                self.stdout,
                cursor::MoveTo(x, 0),
                Print(ch),
                cursor::MoveTo(x, end_y),
                Print(ch)
            )?;
        }
        for y in 1..end_y {
            queue!(
                self.stdout,
                cursor::MoveTo(0, y),
                Print('|'),
                cursor::MoveTo(end_x, y),
                Print('|')
            )?;
        }
        Ok(())
    }

    fn fill_cell(&mut self, cell: Cell, color: Color) -> crossterm::Result<()> {
        let col = 1 + cell.0 as u16 * CELL_COLS;
        let row = 1 + cell.1 as u16;
        queue!(
            self.stdout,
            cursor::MoveTo(col, row),
            SetBackgroundColor(color),
            Print("  "),
            SetBackgroundColor(FIELD_COLOR)
        )
    }

    fn draw_status(&mut self, engine: &GameEngine) -> crossterm::Result<()> {
        let label = match engine.run_state() {
            RunState::Idle => "Start",
            RunState::Running => "Pause",
            RunState::GameOver => "Restart",
        };
        let line = format!("Score: {:<6} [Space] {:<8} [Q] Quit", engine.score(), label);
        let status_row = self.frame_height();
        queue!(
            self.stdout,
            cursor::MoveTo(0, status_row),
            Clear(ClearType::UntilNewLine),
            Print(line)
        )
    }
}
