// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

impl ColorMode {
    pub fn label(self) -> &'static str {
        match self {
            ColorMode::TrueColor => "24-bit truecolor",
            ColorMode::Color256 => "8-bit (256-color)",
            ColorMode::Color16 => "16-color",
            ColorMode::Mono => "mono",
        }
    }
}

/// Fixed-interval timing source for the render pass.
///
/// A late frame re-anchors the next deadline at `now` instead of queuing
/// catch-up ticks.
#[derive(Clone, Debug)]
pub struct Ticker {
    period: Duration,
    next: Instant,
}

impl Ticker {
    pub fn new(period: Duration, now: Instant) -> Self {
        Self { period, next: now }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next
    }

    /// Time left until the next tick; zero once it is due.
    pub fn timeout(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }

    pub fn advance(&mut self, now: Instant) {
        self.next += self.period;
        if now > self.next {
            self.next = now;
        }
    }
}
