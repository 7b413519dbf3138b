// Copyright (c) 2026 rezky_nightky

use std::io;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("failed to apply {name} {value} (min {min} max {max})")]
    OutOfRange {
        name: &'static str,
        value: String,
        min: String,
        max: String,
    },

    #[error("failed to apply {name} {value} (must be a finite number)")]
    NotFinite { name: &'static str, value: String },

    #[error("{name}: trail maximum {max} exceeds the glyph buffer capacity {capacity}")]
    TrailExceedsCapacity {
        name: &'static str,
        max: u16,
        capacity: usize,
    },

    #[error("invalid --colormode: {0} (allowed: 0,16,8/256,24/32)")]
    UnknownColorMode(u16),

    #[error("invalid cell size '{0}' (expected: WIDTHxHEIGHT, e.g. 22x22)")]
    InvalidCellSize(String),

    #[error("--chars: no printable glyphs given")]
    EmptyCharset,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("failed to set up logging: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, Error>;
