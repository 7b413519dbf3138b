// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::runtime::ColorMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const PALE_GREEN: Rgb = Rgb(180, 255, 180);

    pub fn gray(v: u8) -> Self {
        Rgb(v, v, v)
    }

    /// Maps the colour onto what the terminal can show. Mono terminals keep
    /// their default colours.
    pub fn to_color(self, mode: ColorMode) -> Option<Color> {
        let Rgb(r, g, b) = self;
        match mode {
            ColorMode::Mono => None,
            ColorMode::TrueColor => Some(Color::Rgb { r, g, b }),
            ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(r, g, b))),
            ColorMode::Color16 => Some(rgb_to_color16(r, g, b)),
        }
    }
}

fn dist2(a: (u8, u8, u8), b: (u8, u8, u8)) -> i32 {
    let dr = (a.0 as i32) - (b.0 as i32);
    let dg = (a.1 as i32) - (b.1 as i32);
    let db = (a.2 as i32) - (b.2 as i32);
    (dr * dr) + (dg * dg) + (db * db)
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let level = |v: u8| ((v as u16 * 5 + 127) / 255) as u8;
    let (r6, g6, b6) = (level(r), level(g), level(b));
    let cube = (
        CUBE_LEVELS[r6 as usize],
        CUBE_LEVELS[g6 as usize],
        CUBE_LEVELS[b6 as usize],
    );
    let cube_idx = 16 + 36 * r6 + 6 * g6 + b6;

    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    let (gray_idx, gray) = match avg {
        0..=7 => (16, 0),
        239..=255 => (231, 255),
        _ => {
            let step = (avg - 8) / 10;
            (232 + step, 8 + 10 * step)
        }
    };

    if dist2((r, g, b), (gray, gray, gray)) < dist2((r, g, b), cube) {
        gray_idx
    } else {
        cube_idx
    }
}

fn rgb_to_color16(r: u8, g: u8, b: u8) -> Color {
    const TABLE: [(Color, (u8, u8, u8)); 16] = [
        (Color::Black, (0, 0, 0)),
        (Color::DarkGrey, (128, 128, 128)),
        (Color::Grey, (192, 192, 192)),
        (Color::White, (255, 255, 255)),
        (Color::DarkRed, (128, 0, 0)),
        (Color::Red, (255, 0, 0)),
        (Color::DarkGreen, (0, 128, 0)),
        (Color::Green, (0, 255, 0)),
        (Color::DarkBlue, (0, 0, 128)),
        (Color::Blue, (0, 0, 255)),
        (Color::DarkCyan, (0, 128, 128)),
        (Color::Cyan, (0, 255, 255)),
        (Color::DarkMagenta, (128, 0, 128)),
        (Color::Magenta, (255, 0, 255)),
        (Color::DarkYellow, (128, 128, 0)),
        (Color::Yellow, (255, 255, 0)),
    ];

    TABLE
        .iter()
        .min_by_key(|(_, rgb)| dist2((r, g, b), *rgb))
        .map(|(c, _)| *c)
        .unwrap_or(Color::White)
}
