// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor, event,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal::{self, WindowSize},
    ExecutableCommand, QueueableCommand,
};

use crate::cell::Cell;
use crate::frame::Frame;

/// Never equal to a real cell, so a fresh screen repaints everything.
const UNPAINTED: Cell = Cell {
    ch: '\0',
    fg: None,
    bg: None,
    bold: false,
};

#[derive(Default)]
struct Pen {
    fg: Option<Option<Color>>,
    bg: Option<Option<Color>>,
    bold: Option<bool>,
    pos: Option<(u16, u16)>,
}

/// Horizontal stretch of changed cells sharing one style.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Run {
    y: u16,
    start: u16,
    end: u16,
}

/// Collects the runs of `frame` that differ from `shown` and marks them as
/// shown.
fn changed_runs(shown: &mut [Cell], frame: &Frame, runs: &mut Vec<Run>) {
    runs.clear();
    let width = frame.width as usize;
    for y in 0..frame.height {
        let row = frame.row(y);
        let shown_row = &mut shown[y as usize * width..][..row.len()];
        let mut x = 0usize;
        while x < row.len() {
            if shown_row[x] == row[x] {
                x += 1;
                continue;
            }
            let start = x;
            let style = row[x];
            while x < row.len() && shown_row[x] != row[x] && row[x].same_style(&style) {
                shown_row[x] = row[x];
                x += 1;
            }
            runs.push(Run {
                y,
                start: start as u16,
                end: x as u16,
            });
        }
    }
}

/// The visible display: raw mode, alternate screen, hidden cursor and
/// mouse capture for as long as the value lives.
pub struct Terminal {
    stdout: Stdout,
    shown_size: Option<(u16, u16)>,
    shown: Vec<Cell>,
    runs: Vec<Run>,
    run_buf: String,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            out.execute(event::EnableMouseCapture)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore(&mut out);
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            shown_size: None,
            shown: Vec::new(),
            runs: Vec::new(),
            run_buf: String::with_capacity(64),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn window_size(&self) -> Result<WindowSize> {
        terminal::window_size()
    }

    pub fn poll_event(timeout: Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    /// Copies the back buffer to the screen, writing only cells that differ
    /// from what is already shown. Returns the number of cells written.
    pub fn present(&mut self, frame: &Frame) -> Result<usize> {
        let size = (frame.width, frame.height);
        if self.shown_size != Some(size) {
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
            self.shown_size = Some(size);
            self.shown = vec![UNPAINTED; frame.cells().len()];
        }

        changed_runs(&mut self.shown, frame, &mut self.runs);

        let mut pen = Pen::default();
        let mut written = 0usize;
        for i in 0..self.runs.len() {
            let run = self.runs[i];
            let cells = &frame.row(run.y)[run.start as usize..run.end as usize];
            self.run_buf.clear();
            self.run_buf.extend(cells.iter().map(|c| c.ch));
            self.emit_run(&mut pen, &run, &cells[0])?;
            written += cells.len();
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        Ok(written)
    }

    fn emit_run(&mut self, pen: &mut Pen, run: &Run, style: &Cell) -> Result<()> {
        if pen.pos != Some((run.start, run.y)) {
            self.stdout.queue(cursor::MoveTo(run.start, run.y))?;
        }
        if pen.fg != Some(style.fg) {
            self.stdout
                .queue(SetForegroundColor(style.fg.unwrap_or(Color::Reset)))?;
            pen.fg = Some(style.fg);
        }
        if pen.bg != Some(style.bg) {
            self.stdout
                .queue(SetBackgroundColor(style.bg.unwrap_or(Color::Reset)))?;
            pen.bg = Some(style.bg);
        }
        if pen.bold != Some(style.bold) {
            self.stdout.queue(SetAttribute(if style.bold {
                Attribute::Bold
            } else {
                Attribute::NormalIntensity
            }))?;
            pen.bold = Some(style.bold);
        }
        self.stdout.queue(Print(self.run_buf.as_str()))?;
        pen.pos = Some((run.end, run.y));
        Ok(())
    }
}

fn restore(out: &mut Stdout) {
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(event::DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}

impl Drop for Terminal {
    fn drop(&mut self) {
        restore(&mut self.stdout);
    }
}

pub fn restore_terminal_best_effort() {
    restore(&mut stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(ch: char, fg: Color) -> Cell {
        Cell {
            ch,
            fg: Some(fg),
            bg: Some(Color::Black),
            bold: true,
        }
    }

    #[test]
    fn first_present_paints_every_cell() {
        let frame = Frame::new(3, 2, Some(Color::Black));
        let mut shown = vec![UNPAINTED; 6];
        let mut runs = Vec::new();
        changed_runs(&mut shown, &frame, &mut runs);
        assert_eq!(
            runs,
            vec![Run { y: 0, start: 0, end: 3 }, Run { y: 1, start: 0, end: 3 }]
        );
        assert!(shown.iter().all(|c| *c == Cell::blank_with_bg(Some(Color::Black))));
    }

    #[test]
    fn unchanged_frame_writes_nothing() {
        let mut frame = Frame::new(4, 1, None);
        frame.set(1, 0, glyph('a', Color::Green));
        let mut shown = vec![UNPAINTED; 4];
        let mut runs = Vec::new();
        changed_runs(&mut shown, &frame, &mut runs);
        changed_runs(&mut shown, &frame, &mut runs);
        assert!(runs.is_empty());
    }

    #[test]
    fn runs_split_on_style_and_unchanged_cells() {
        let mut frame = Frame::new(6, 1, None);
        let mut shown = vec![UNPAINTED; 6];
        let mut runs = Vec::new();
        changed_runs(&mut shown, &frame, &mut runs);

        frame.set(0, 0, glyph('a', Color::Green));
        frame.set(1, 0, glyph('b', Color::Green));
        frame.set(2, 0, glyph('c', Color::White));
        frame.set(4, 0, glyph('d', Color::White));
        changed_runs(&mut shown, &frame, &mut runs);
        assert_eq!(
            runs,
            vec![
                Run { y: 0, start: 0, end: 2 },
                Run { y: 0, start: 2, end: 3 },
                Run { y: 0, start: 4, end: 5 },
            ]
        );
    }
}
