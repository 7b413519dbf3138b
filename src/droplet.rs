// Copyright (c) 2026 rezky_nightky

use rand::{seq::IndexedRandom, Rng};

use crate::config::RainSettings;
use crate::palette::Rgb;
use crate::surface::Geometry;

/// Fixed-capacity glyph sequence for one column. Only the first `len`
/// glyphs belong to the visible trail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphTrail {
    glyphs: [char; GlyphTrail::CAPACITY],
    len: usize,
}

#[allow(clippy::len_without_is_empty)]
impl GlyphTrail {
    pub const CAPACITY: usize = 64;

    pub fn new(len: usize) -> Self {
        Self {
            glyphs: ['0'; Self::CAPACITY],
            len: len.clamp(1, Self::CAPACITY),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn set_len(&mut self, len: usize) {
        self.len = len.clamp(1, Self::CAPACITY);
    }

    #[cfg(test)]
    pub fn get(&self, j: usize) -> Option<char> {
        self.glyphs[..self.len].get(j).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.glyphs[..self.len].iter().copied()
    }

    /// Re-rolls the whole buffer, including slots past the logical length.
    pub fn fill_random<R: Rng + ?Sized>(&mut self, chars: &[char], rng: &mut R) {
        for g in &mut self.glyphs {
            *g = random_glyph(chars, rng);
        }
    }

    /// Re-rolls the visible trail only.
    pub fn refresh<R: Rng + ?Sized>(&mut self, chars: &[char], rng: &mut R) {
        for g in &mut self.glyphs[..self.len] {
            *g = random_glyph(chars, rng);
        }
    }
}

fn random_glyph<R: Rng + ?Sized>(chars: &[char], rng: &mut R) -> char {
    chars.choose(rng).copied().unwrap_or('0')
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shade {
    Normal,
    Burst,
}

impl Shade {
    /// Burst with a 1-in-`chance` probability.
    pub fn roll<R: Rng + ?Sized>(chance: u32, rng: &mut R) -> Self {
        if rng.random_range(0..chance.max(1)) == 0 {
            Shade::Burst
        } else {
            Shade::Normal
        }
    }

    pub fn head(self) -> Rgb {
        match self {
            Shade::Normal => Rgb::PALE_GREEN,
            Shade::Burst => Rgb::WHITE,
        }
    }

    pub fn trail(self, brightness: u8) -> Rgb {
        match self {
            Shade::Normal => Rgb(0, brightness / 2, 0),
            Shade::Burst => Rgb::gray(brightness),
        }
    }

    /// Colour of trail cell `j`; the head always gets the highlight.
    pub fn glyph_color(self, j: usize, trail_len: usize) -> Rgb {
        if j == 0 {
            self.head()
        } else {
            self.trail(brightness(j, trail_len))
        }
    }
}

/// Linear fade from 255 at the head towards 0 at the tail.
pub fn brightness(j: usize, trail_len: usize) -> u8 {
    let t = trail_len.max(1);
    (255 * t.saturating_sub(j) / t) as u8
}

/// Faster columns get a shorter glyph refresh period.
pub fn refresh_period(fall_speed: u16, settings: &RainSettings) -> u32 {
    let smin = settings.fall_speed.low as f32;
    let smax = settings.fall_speed.high as f32;
    let cmin = settings.cycle.low as f32;
    let cmax = settings.cycle.high as f32;

    let t = if smax > smin {
        ((fall_speed as f32 - smin) / (smax - smin)).clamp(0.0, 1.0)
    } else {
        0.0
    };
    ((cmax - t * (cmax - cmin)) as u32).max(1)
}

#[derive(Clone, Debug)]
pub struct Droplet {
    pub position: f32,
    pub slot: i32,
    pub fall_speed: f32,
    pub trail: GlyphTrail,
    pub refresh_period: u32,
    pub refresh_countdown: u32,
    pub shade: Shade,
    pub resets: u32,
}

impl Droplet {
    pub fn spawn<R: Rng + ?Sized>(
        index: usize,
        geometry: &Geometry,
        settings: &RainSettings,
        chars: &[char],
        rng: &mut R,
    ) -> Self {
        let h = geometry.height.max(0);
        let speed = rng.random_range(settings.fall_speed.low..=settings.fall_speed.high);
        let period = refresh_period(speed, settings);

        let mut trail = GlyphTrail::new(settings.random_trail_len(rng));
        trail.fill_random(chars, rng);

        Self {
            position: rng.random_range(-2 * h..=2 * h) as f32,
            slot: (index as i32).saturating_mul(geometry.cell.width),
            fall_speed: speed as f32,
            trail,
            refresh_period: period,
            refresh_countdown: rng.random_range(0..=period),
            shade: Shade::roll(settings.burst_chance, rng),
            resets: 0,
        }
    }

    /// Restarts the column just above the top edge with a new trail shape.
    /// Speed, refresh period and slot stay as they are.
    pub fn reset<R: Rng + ?Sized>(&mut self, height: i32, settings: &RainSettings, rng: &mut R) {
        let h = height.max(0);
        self.position = rng.random_range(-(h / 4)..=0) as f32;
        self.trail.set_len(settings.random_trail_len(rng));
        self.shade = Shade::roll(settings.burst_chance, rng);
        self.resets = self.resets.saturating_add(1);
    }

    /// Counts down to the next glyph refresh. Returns true when the trail
    /// was re-rolled this tick.
    pub fn tick_glyphs<R: Rng + ?Sized>(&mut self, chars: &[char], rng: &mut R) -> bool {
        self.refresh_countdown = self.refresh_countdown.saturating_sub(1);
        if self.refresh_countdown > 0 {
            return false;
        }
        self.trail.refresh(chars, rng);
        self.refresh_countdown = self.refresh_period;
        true
    }

    /// Vertical pixel coordinate of trail cell `j`.
    pub fn cell_y(&self, j: usize, cell_height: i32) -> i32 {
        (self.position - (j as f32) * (cell_height as f32)) as i32
    }

    pub fn advance(&mut self) {
        self.position += self.fall_speed;
    }

    /// True once the tail has scrolled past the bottom edge.
    pub fn past_bottom(&self, cell_height: i32, height: i32) -> bool {
        self.position - (self.trail.len() as f32) * (cell_height as f32) > height as f32
    }
}
