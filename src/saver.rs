// Copyright (c) 2026 rezky_nightky

use crossterm::event::Event;
use rand::rngs::StdRng;

use crate::cloud::Cloud;
use crate::config::Settings;
use crate::frame::Frame;
use crate::input::{CloseReason, InputPolicy};
use crate::render::{render_frame, FrameStats};
use crate::surface::{Backbuffer, CellMetrics};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Running,
    Closing(CloseReason),
}

/// Everything one display owns: animation state, its off-screen surface
/// and the input policy that decides when to quit.
pub struct Saver {
    cloud: Cloud,
    backbuffer: Backbuffer,
    input: InputPolicy,
    lifecycle: Lifecycle,
    frames: u64,
    settings: Settings,
    cell: CellMetrics,
}

impl Saver {
    pub fn new(
        cols: u16,
        rows: u16,
        cell: CellMetrics,
        settings: &Settings,
        chars: Vec<char>,
        rng: StdRng,
    ) -> Self {
        let backbuffer = Backbuffer::new(cols, rows, cell, settings.color_mode, settings.bold);
        let cloud = Cloud::new(backbuffer.geometry(), settings.rain.clone(), chars, rng);
        Self {
            cloud,
            backbuffer,
            input: InputPolicy::new(cell, settings.jitter_px, settings.exit_on_input),
            lifecycle: Lifecycle::Running,
            frames: 0,
            settings: settings.clone(),
            cell,
        }
    }

    pub fn tick(&mut self) -> FrameStats {
        let stats = render_frame(&mut self.backbuffer, &mut self.cloud);
        self.frames += 1;
        tracing::trace!(
            frame = self.frames,
            glyphs = stats.glyphs_drawn,
            refreshed = stats.refreshed,
            resets = stats.resets,
            "frame rendered"
        );
        stats
    }

    pub fn frame(&self) -> &Frame {
        self.backbuffer.frame()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn columns(&self) -> usize {
        self.cloud.droplets().len()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    /// Feeds one input event. A close request is only recorded here; the
    /// caller tears the display down on its next loop iteration.
    pub fn handle_event(&mut self, ev: &Event) -> Lifecycle {
        if let Event::Resize(cols, rows) = *ev {
            self.resize(cols, rows);
            return self.lifecycle;
        }
        if self.lifecycle != Lifecycle::Running {
            return self.lifecycle;
        }
        if let Some(reason) = self.input.observe(ev) {
            tracing::info!(reason = reason.as_str(), "close requested");
            self.lifecycle = Lifecycle::Closing(reason);
        }
        self.lifecycle
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.backbuffer = Backbuffer::new(
            cols,
            rows,
            self.cell,
            self.settings.color_mode,
            self.settings.bold,
        );
        self.cloud.resize(self.backbuffer.geometry());
        let geometry = self.cloud.geometry();
        tracing::debug!(
            cols,
            rows,
            width = geometry.width,
            height = geometry.height,
            columns = self.columns(),
            "surface resized"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use rand::SeedableRng;

    use super::*;
    use crate::config::RainSettings;
    use crate::runtime::ColorMode;

    fn settings() -> Settings {
        Settings {
            rain: RainSettings::default(),
            frame_interval: Duration::from_millis(20),
            cell_override: None,
            color_mode: ColorMode::TrueColor,
            bold: true,
            jitter_px: 3,
            exit_on_input: true,
            duration: None,
        }
    }

    fn saver(cols: u16, rows: u16) -> Saver {
        Saver::new(
            cols,
            rows,
            CellMetrics::DEFAULT,
            &settings(),
            "ab".chars().collect(),
            StdRng::seed_from_u64(77),
        )
    }

    #[test]
    fn one_column_per_terminal_column() {
        let s = saver(10, 20);
        assert_eq!(s.columns(), 10);
        assert!(s.is_running());
    }

    #[test]
    fn ticks_paint_glyphs_into_the_backbuffer() {
        let mut s = saver(10, 20);
        let mut drawn = 0;
        for _ in 0..200 {
            drawn += s.tick().glyphs_drawn;
        }
        assert!(drawn > 0);
        assert_eq!(s.frames(), 200);
        assert!(s.frame().cells().iter().any(|c| c.ch == 'a' || c.ch == 'b'));
    }

    #[test]
    fn key_press_queues_a_close_without_tearing_down() {
        let mut s = saver(10, 20);
        let ev = Event::Key(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE));
        assert_eq!(
            s.handle_event(&ev),
            Lifecycle::Closing(CloseReason::KeyPressed)
        );
        assert!(!s.is_running());
        s.tick();
        assert_eq!(s.frame().width, 10);
        assert_eq!(s.lifecycle(), Lifecycle::Closing(CloseReason::KeyPressed));
    }

    #[test]
    fn resize_rebuilds_surface_and_columns() {
        let mut s = saver(10, 20);
        assert_eq!(s.handle_event(&Event::Resize(30, 5)), Lifecycle::Running);
        assert_eq!(s.columns(), 30);
        assert_eq!((s.frame().width, s.frame().height), (30, 5));
        s.tick();
    }

    #[test]
    fn zero_sized_terminal_keeps_running() {
        let mut s = saver(0, 0);
        assert_eq!(s.columns(), 1);
        s.tick();
        assert!(s.frame().cells().is_empty());
    }
}
