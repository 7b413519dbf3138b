// Copyright (c) 2026 rezky_nightky

use crossterm::terminal::WindowSize;

use crate::cell::Cell;
use crate::frame::Frame;
use crate::palette::Rgb;
use crate::runtime::ColorMode;

/// Size of one glyph cell in virtual pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellMetrics {
    pub width: i32,
    pub height: i32,
}

impl CellMetrics {
    pub const DEFAULT: CellMetrics = CellMetrics {
        width: 22,
        height: 22,
    };

    /// Cell size derived from the terminal's reported pixel size. Tiny or
    /// missing measurements are ignored.
    pub fn measured(ws: &WindowSize) -> Option<Self> {
        if ws.columns == 0 || ws.rows == 0 {
            return None;
        }
        let width = (ws.width / ws.columns) as i32;
        let height = (ws.height / ws.rows) as i32;
        (width > 4 && height > 4).then_some(Self { width, height })
    }
}

/// Pixel size of a drawing surface and the glyph cell laid over it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    pub width: i32,
    pub height: i32,
    pub cell: CellMetrics,
}

impl Geometry {
    pub fn for_grid(cols: u16, rows: u16, cell: CellMetrics) -> Self {
        Self {
            width: cols as i32 * cell.width,
            height: rows as i32 * cell.height,
            cell,
        }
    }
}

/// Off-screen drawing target for one frame.
pub trait Surface {
    fn clear(&mut self, color: Rgb);
    fn set_text_color(&mut self, color: Rgb);
    fn draw_glyph(&mut self, x: i32, y: i32, ch: char);
}

/// Surface over a terminal cell grid. Pixel coordinates are floored onto
/// cells; glyphs landing outside the grid are dropped.
pub struct Backbuffer {
    frame: Frame,
    cell: CellMetrics,
    color_mode: ColorMode,
    bold: bool,
    pen: Rgb,
    bg: Rgb,
}

impl Backbuffer {
    pub fn new(cols: u16, rows: u16, cell: CellMetrics, color_mode: ColorMode, bold: bool) -> Self {
        Self {
            frame: Frame::new(cols, rows, Rgb::BLACK.to_color(color_mode)),
            cell,
            color_mode,
            bold,
            pen: Rgb::WHITE,
            bg: Rgb::BLACK,
        }
    }

    pub fn geometry(&self) -> Geometry {
        Geometry::for_grid(self.frame.width, self.frame.height, self.cell)
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    fn to_cell(&self, x: i32, y: i32) -> Option<(u16, u16)> {
        if self.cell.width <= 0 || self.cell.height <= 0 {
            return None;
        }
        let col = x.div_euclid(self.cell.width);
        let row = y.div_euclid(self.cell.height);
        let col = u16::try_from(col).ok()?;
        let row = u16::try_from(row).ok()?;
        (col < self.frame.width && row < self.frame.height).then_some((col, row))
    }
}

impl Surface for Backbuffer {
    fn clear(&mut self, color: Rgb) {
        self.bg = color;
        self.frame.fill(color.to_color(self.color_mode));
    }

    fn set_text_color(&mut self, color: Rgb) {
        self.pen = color;
    }

    fn draw_glyph(&mut self, x: i32, y: i32, ch: char) {
        let Some((col, row)) = self.to_cell(x, y) else {
            return;
        };
        self.frame.set(
            col,
            row,
            Cell {
                ch,
                fg: self.pen.to_color(self.color_mode),
                bg: self.bg.to_color(self.color_mode),
                bold: self.bold,
            },
        );
    }
}
