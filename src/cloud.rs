// Copyright (c) 2026 rezky_nightky

use rand::rngs::StdRng;

use crate::config::{RainSettings, MAX_COLUMNS};
use crate::droplet::Droplet;
use crate::surface::Geometry;

/// Split borrows of the store handed to the renderer for one frame.
pub struct FrameCtx<'a> {
    pub droplets: &'a mut [Droplet],
    pub rng: &'a mut StdRng,
    pub chars: &'a [char],
    pub settings: &'a RainSettings,
    pub geometry: Geometry,
}

/// Per-surface animation state: one droplet per column.
pub struct Cloud {
    geometry: Geometry,
    settings: RainSettings,
    chars: Vec<char>,
    droplets: Vec<Droplet>,
    rng: StdRng,
}

impl Cloud {
    pub fn new(geometry: Geometry, settings: RainSettings, chars: Vec<char>, rng: StdRng) -> Self {
        let mut chars = chars;
        if chars.is_empty() {
            chars.extend(['0', '1']);
        }

        let mut cloud = Self {
            geometry,
            settings,
            chars,
            droplets: Vec::new(),
            rng,
        };
        cloud.populate();
        cloud
    }

    /// `ceil(width / cell_width)` clamped to `[1, MAX_COLUMNS]`.
    pub fn column_count(width: i32, cell_width: i32) -> usize {
        if width <= 0 || cell_width <= 0 {
            return 1;
        }
        let w = width as i64;
        let cw = cell_width as i64;
        (((w + cw - 1) / cw) as usize).clamp(1, MAX_COLUMNS)
    }

    fn populate(&mut self) {
        let n = Self::column_count(self.geometry.width, self.geometry.cell.width);
        self.droplets.clear();
        for i in 0..n {
            let d = Droplet::spawn(
                i,
                &self.geometry,
                &self.settings,
                &self.chars,
                &mut self.rng,
            );
            self.droplets.push(d);
        }
        tracing::debug!(
            columns = n,
            width = self.geometry.width,
            height = self.geometry.height,
            cell_width = self.geometry.cell.width,
            cell_height = self.geometry.cell.height,
            "columns initialized"
        );
    }

    /// Starts over on a new surface size.
    pub fn resize(&mut self, geometry: Geometry) {
        self.geometry = geometry;
        self.populate();
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn droplets(&self) -> &[Droplet] {
        &self.droplets
    }

    #[cfg(test)]
    pub fn droplets_mut(&mut self) -> &mut [Droplet] {
        &mut self.droplets
    }

    pub fn ctx(&mut self) -> FrameCtx<'_> {
        FrameCtx {
            droplets: &mut self.droplets,
            rng: &mut self.rng,
            chars: &self.chars,
            settings: &self.settings,
            geometry: self.geometry,
        }
    }
}
