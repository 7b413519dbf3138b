// Copyright (c) 2026 rezky_nightky

use crate::cloud::{Cloud, FrameCtx};
use crate::palette::Rgb;
use crate::surface::Surface;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub glyphs_drawn: usize,
    pub refreshed: usize,
    pub resets: usize,
}

/// One tick: clears the surface, then updates and draws every column.
pub fn render_frame<S: Surface + ?Sized>(surface: &mut S, cloud: &mut Cloud) -> FrameStats {
    let FrameCtx {
        droplets,
        rng,
        chars,
        settings,
        geometry,
    } = cloud.ctx();
    let cell_h = geometry.cell.height;
    let mut stats = FrameStats::default();

    surface.clear(Rgb::BLACK);

    for d in droplets.iter_mut() {
        if d.tick_glyphs(chars, rng) {
            stats.refreshed += 1;
        }

        let len = d.trail.len();
        for (j, ch) in d.trail.iter().enumerate() {
            let y = d.cell_y(j, cell_h);
            if y < -cell_h || y >= geometry.height {
                continue;
            }
            surface.set_text_color(d.shade.glyph_color(j, len));
            surface.draw_glyph(d.slot, y, ch);
            stats.glyphs_drawn += 1;
        }

        d.advance();

        if d.past_bottom(cell_h, geometry.height) {
            d.reset(geometry.height, settings, rng);
            stats.resets += 1;
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::config::RainSettings;
    use crate::droplet::{brightness, GlyphTrail, Shade};
    use crate::surface::{CellMetrics, Geometry};

    #[derive(Clone, Debug, PartialEq)]
    enum Op {
        Clear(Rgb),
        Glyph { x: i32, y: i32, ch: char, color: Rgb },
    }

    #[derive(Default)]
    struct Recorder {
        pen: Option<Rgb>,
        ops: Vec<Op>,
    }

    impl Surface for Recorder {
        fn clear(&mut self, color: Rgb) {
            self.ops.push(Op::Clear(color));
        }

        fn set_text_color(&mut self, color: Rgb) {
            self.pen = Some(color);
        }

        fn draw_glyph(&mut self, x: i32, y: i32, ch: char) {
            let color = self.pen.expect("text color set before drawing");
            self.ops.push(Op::Glyph { x, y, ch, color });
        }
    }

    impl Recorder {
        fn glyphs(&self) -> Vec<(i32, i32, Rgb)> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Glyph { x, y, color, .. } => Some((*x, *y, *color)),
                    Op::Clear(_) => None,
                })
                .collect()
        }
    }

    fn cloud(width: i32, height: i32, seed: u64) -> Cloud {
        Cloud::new(
            Geometry {
                width,
                height,
                cell: CellMetrics::DEFAULT,
            },
            RainSettings::default(),
            "0123456789".chars().collect(),
            StdRng::seed_from_u64(seed),
        )
    }

    /// Single visible column with a known shape; the others are parked far
    /// above the surface.
    fn staged(shade: Shade, trail: usize, position: f32) -> Cloud {
        let mut c = cloud(66, 2200, 3);
        for d in c.droplets_mut() {
            d.position = -100_000.0;
            d.fall_speed = 0.0;
        }
        let d = &mut c.droplets_mut()[1];
        d.shade = shade;
        d.trail.set_len(trail);
        d.position = position;
        d.fall_speed = 5.0;
        c
    }

    #[test]
    fn frame_starts_with_a_black_clear() {
        let mut c = cloud(220, 300, 1);
        let mut s = Recorder::default();
        render_frame(&mut s, &mut c);
        assert_eq!(s.ops.first(), Some(&Op::Clear(Rgb::BLACK)));
        assert!(s.ops[1..].iter().all(|op| match op {
            Op::Glyph { ch, .. } => ch.is_ascii_digit(),
            Op::Clear(_) => false,
        }));
    }

    #[test]
    fn head_gets_the_highlight_and_trail_fades() {
        for (shade, head) in [(Shade::Normal, Rgb::PALE_GREEN), (Shade::Burst, Rgb::WHITE)] {
            let mut c = staged(shade, 20, 1000.0);
            let mut s = Recorder::default();
            render_frame(&mut s, &mut c);

            let glyphs = s.glyphs();
            assert_eq!(glyphs.len(), 20);
            assert_eq!(glyphs[0], (22, 1000, head));

            let levels: Vec<u8> = glyphs[1..]
                .iter()
                .map(|&(_, _, Rgb(r, g, _))| r.max(g))
                .collect();
            assert!(levels.windows(2).all(|w| w[0] >= w[1]));
            assert_eq!(glyphs[10].2, shade.trail(brightness(10, 20)));
        }
    }

    #[test]
    fn pre_override_brightness_never_increases() {
        for t in 1..=GlyphTrail::CAPACITY {
            let v: Vec<u8> = (0..t).map(|j| brightness(j, t)).collect();
            assert_eq!(v[0], 255);
            assert!(v.windows(2).all(|w| w[0] >= w[1]), "trail {t}: {v:?}");
        }
    }

    #[test]
    fn cells_outside_the_surface_are_skipped() {
        // head at y=44: cells at 44, 22, 0, -22 are drawn, -44 and above are not
        let mut c = staged(Shade::Normal, 10, 44.0);
        let mut s = Recorder::default();
        render_frame(&mut s, &mut c);
        let ys: Vec<i32> = s.glyphs().iter().map(|g| g.1).collect();
        assert_eq!(ys, vec![44, 22, 0, -22]);

        // head below the bottom edge: nothing of the head row is drawn
        let mut c = staged(Shade::Normal, 3, 2200.0);
        let mut s = Recorder::default();
        render_frame(&mut s, &mut c);
        let ys: Vec<i32> = s.glyphs().iter().map(|g| g.1).collect();
        assert_eq!(ys, vec![2178, 2156]);
    }

    #[test]
    fn reset_fires_only_past_the_threshold() {
        let threshold = 2200.0 + 10.0 * 22.0;

        let mut c = staged(Shade::Normal, 10, threshold - 5.0);
        let stats = render_frame(&mut Recorder::default(), &mut c);
        assert_eq!(stats.resets, 0);
        assert_eq!(c.droplets()[1].position, threshold);

        let mut c = staged(Shade::Normal, 10, threshold - 4.5);
        let stats = render_frame(&mut Recorder::default(), &mut c);
        assert_eq!(stats.resets, 1);
        let d = &c.droplets()[1];
        assert_eq!(d.resets, 1);
        assert!((-550.0..=0.0).contains(&d.position));
        assert_eq!(d.fall_speed, 5.0);
    }

    #[test]
    fn thousand_ticks_keep_every_column_in_bounds() {
        let height = 100;
        let mut c = cloud(220, height, 2024);
        assert_eq!(c.droplets().len(), 10);

        for _ in 0..1000 {
            let mut s = Recorder::default();
            render_frame(&mut s, &mut c);

            let mut per_column: HashMap<i32, usize> = HashMap::new();
            for (x, _, _) in s.glyphs() {
                *per_column.entry(x).or_default() += 1;
            }
            for (i, d) in c.droplets().iter().enumerate() {
                assert!(d.trail.len() >= 1 && d.trail.len() <= GlyphTrail::CAPACITY);
                let drawn = per_column.get(&(i as i32 * 22)).copied().unwrap_or(0);
                assert!(drawn <= GlyphTrail::CAPACITY);
                assert!(d.refresh_countdown <= d.refresh_period);
            }
        }

        let cell_h = 22.0;
        for d in c.droplets() {
            let travel = d.fall_speed * 1000.0;
            if travel > height as f32 + GlyphTrail::CAPACITY as f32 * cell_h {
                assert!(d.resets >= 1, "column at {} never reset", d.slot);
            }
        }
    }

    #[test]
    fn glyphs_refresh_on_schedule() {
        let mut c = cloud(22, 400, 8);
        let period = c.droplets()[0].refresh_period as usize;
        let mut refreshed = 0;
        for _ in 0..(period * 4) {
            refreshed += render_frame(&mut Recorder::default(), &mut c).refreshed;
        }
        assert!((4..=5).contains(&refreshed));
    }
}
