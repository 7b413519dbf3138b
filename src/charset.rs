// Copyright (c) 2026 rezky_nightky

use crate::error::ConfigError;

const CLASSIC_PUNCTUATION: &str = "!@#$%^&*()-_=+[]{};:,.<>/?";

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharsetPreset {
    /// Digits, letters and the classic punctuation set
    Classic,
    /// Letters, digits and half-width katakana
    Matrix,
    /// Every printable ASCII glyph
    Ascii,
    /// 0 and 1
    Binary,
    /// 0-9 and A-F
    Hex,
    /// Half-width katakana
    Katakana,
    /// 0-9
    Digits,
}

fn push_range(out: &mut Vec<char>, start: u32, end: u32) {
    out.extend((start..=end).filter_map(char::from_u32));
}

fn push_alnum(out: &mut Vec<char>) {
    push_range(out, 0x30, 0x39);
    push_range(out, 0x41, 0x5A);
    push_range(out, 0x61, 0x7A);
}

pub fn preset_chars(preset: CharsetPreset) -> Vec<char> {
    let mut out = Vec::new();
    match preset {
        CharsetPreset::Classic => {
            push_alnum(&mut out);
            out.extend(CLASSIC_PUNCTUATION.chars());
        }
        CharsetPreset::Matrix => {
            push_alnum(&mut out);
            push_range(&mut out, 0xFF66, 0xFF9D);
        }
        CharsetPreset::Ascii => push_range(&mut out, 0x21, 0x7E),
        CharsetPreset::Binary => push_range(&mut out, 0x30, 0x31),
        CharsetPreset::Hex => {
            push_range(&mut out, 0x30, 0x39);
            push_range(&mut out, 0x41, 0x46);
        }
        CharsetPreset::Katakana => push_range(&mut out, 0xFF66, 0xFF9D),
        CharsetPreset::Digits => push_range(&mut out, 0x30, 0x39),
    }
    out
}

/// Glyphs from a user string; whitespace and control characters are skipped.
pub fn custom_chars(text: &str) -> Result<Vec<char>, ConfigError> {
    let out: Vec<char> = text
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();
    if out.is_empty() {
        return Err(ConfigError::EmptyCharset);
    }
    Ok(out)
}

pub fn build_chars(preset: CharsetPreset, custom: Option<&str>) -> Result<Vec<char>, ConfigError> {
    match custom {
        Some(text) => custom_chars(text),
        None => Ok(preset_chars(preset)),
    }
}
