// Copyright (c) 2026 rezky_nightky

use std::env;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use rand::Rng;

use crate::charset::CharsetPreset;
use crate::droplet::GlyphTrail;
use crate::error::ConfigError;
use crate::runtime::ColorMode;
use crate::surface::CellMetrics;

pub const MAX_COLUMNS: usize = 1024;

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  glyphfall --interval 20 --speed 4,10 --trail 15,25 --cycle 5,10 --burst-chance 50 --jitter 3 --charset classic";

pub fn color_enabled_stdout() -> bool {
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

/// Heading in bold cyan, the example command line in yellow.
fn colorize_usage(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 32);
    for (i, line) in text.lines().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let style = if line.starts_with(' ') {
            "\x1b[33m"
        } else {
            "\x1b[1;36m"
        };
        out.push_str(style);
        out.push_str(line);
        out.push_str("\x1b[0m");
    }
    out
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        colorize_usage(DEFAULT_PARAMS_USAGE)
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct U16Range {
    pub low: u16,
    pub high: u16,
}

impl U16Range {
    pub fn check(self, name: &'static str, min: u16, max: u16) -> Result<Self, ConfigError> {
        for v in [self.low, self.high] {
            if v < min || v > max {
                return Err(ConfigError::OutOfRange {
                    name,
                    value: v.to_string(),
                    min: min.to_string(),
                    max: max.to_string(),
                });
            }
        }
        Ok(self)
    }
}

impl FromStr for U16Range {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (a, b) = s
            .split_once(',')
            .ok_or_else(|| "expected: NUM1,NUM2".to_string())?;
        let low: u16 = a
            .trim()
            .parse()
            .map_err(|_| "invalid low value".to_string())?;
        let high: u16 = b
            .trim()
            .parse()
            .map_err(|_| "invalid high value".to_string())?;
        if low == 0 || high == 0 || low > high {
            return Err("range must be >0 and low <= high".to_string());
        }
        Ok(Self { low, high })
    }
}

impl FromStr for CellMetrics {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ConfigError::InvalidCellSize(s.to_string());
        let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(bad)?;
        let width: i32 = w.trim().parse().map_err(|_| bad())?;
        let height: i32 = h.trim().parse().map_err(|_| bad())?;
        if !(1..=512).contains(&width) || !(1..=512).contains(&height) {
            return Err(bad());
        }
        Ok(CellMetrics { width, height })
    }
}

/// Animation constants. Defaults are the classic screensaver values.
#[derive(Clone, Debug, PartialEq)]
pub struct RainSettings {
    /// Pixels advanced per tick.
    pub fall_speed: U16Range,
    /// Glyphs behind the head.
    pub trail: U16Range,
    /// Ticks between glyph refreshes, slowest column first.
    pub cycle: U16Range,
    /// One column in `burst_chance` renders grayscale.
    pub burst_chance: u32,
}

impl Default for RainSettings {
    fn default() -> Self {
        Self {
            fall_speed: U16Range { low: 4, high: 10 },
            trail: U16Range { low: 15, high: 25 },
            cycle: U16Range { low: 5, high: 10 },
            burst_chance: 50,
        }
    }
}

impl RainSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fall_speed.check("--speed", 1, 200)?;
        self.cycle.check("--cycle", 1, 1000)?;
        if self.trail.high as usize > GlyphTrail::CAPACITY {
            return Err(ConfigError::TrailExceedsCapacity {
                name: "--trail",
                max: self.trail.high,
                capacity: GlyphTrail::CAPACITY,
            });
        }
        self.trail.check("--trail", 1, GlyphTrail::CAPACITY as u16)?;
        require_range("--burst-chance", self.burst_chance, 1, 100_000)?;
        Ok(())
    }

    pub fn random_trail_len<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        rng.random_range(self.trail.low..=self.trail.high) as usize
    }
}

fn require_range<T>(name: &'static str, v: T, min: T, max: T) -> Result<T, ConfigError>
where
    T: PartialOrd + ToString,
{
    if v < min || v > max {
        return Err(ConfigError::OutOfRange {
            name,
            value: v.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(v)
}

#[derive(Parser, Debug, Clone)]
#[command(name = "glyphfall", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        short = 'i',
        long = "interval",
        default_value_t = 20,
        help_heading = "ANIMATION",
        help = "Frame interval in ms (min 5 max 1000)"
    )]
    pub interval_ms: u64,

    #[arg(
        long = "speed",
        default_value = "4,10",
        help_heading = "ANIMATION",
        help = "Fall speed range in pixels per frame: MIN,MAX (min 1 max 200)"
    )]
    pub speed: U16Range,

    #[arg(
        long = "trail",
        default_value = "15,25",
        help_heading = "ANIMATION",
        help = "Trail length range in glyphs: MIN,MAX (min 1 max 64)"
    )]
    pub trail: U16Range,

    #[arg(
        long = "cycle",
        default_value = "5,10",
        help_heading = "ANIMATION",
        help = "Glyph refresh period range in frames: MIN,MAX (min 1 max 1000)"
    )]
    pub cycle: U16Range,

    #[arg(
        long = "burst-chance",
        default_value_t = 50,
        help_heading = "ANIMATION",
        help = "One column in N renders white instead of green (min 1 max 100000)"
    )]
    pub burst_chance: u32,

    #[arg(
        long = "seed",
        help_heading = "ANIMATION",
        help = "Random seed (default: derived from the clock)"
    )]
    pub seed: Option<u64>,

    #[arg(
        long = "cell-size",
        help_heading = "APPEARANCE",
        help = "Glyph cell size in pixels: WIDTHxHEIGHT (default: measured, else 22x22)"
    )]
    pub cell_size: Option<String>,

    #[arg(
        long = "charset",
        default_value_t = CharsetPreset::Classic,
        value_enum,
        help_heading = "APPEARANCE",
        help = "Glyph set"
    )]
    pub charset: CharsetPreset,

    #[arg(
        long = "chars",
        help_heading = "APPEARANCE",
        help = "Custom glyphs, overrides --charset"
    )]
    pub chars: Option<String>,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: detected from COLORTERM/TERM"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "thin",
        help_heading = "APPEARANCE",
        help = "Draw glyphs without bold"
    )]
    pub thin: bool,

    #[arg(
        long = "jitter",
        default_value_t = 3,
        help_heading = "SCREENSAVER",
        help = "Pointer movement in pixels tolerated before exiting (min 0 max 1000)"
    )]
    pub jitter: u32,

    #[arg(
        long = "no-exit-on-input",
        help_heading = "SCREENSAVER",
        help = "Preview mode: only q, Esc or Ctrl-C exit"
    )]
    pub no_exit_on_input: bool,

    #[arg(
        long = "duration",
        help_heading = "SCREENSAVER",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        long = "log-file",
        help_heading = "DIAGNOSTICS",
        help = "Write logs to this file (filter: GLYPHFALL_LOG, default info)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "check-bitcolor",
        help_heading = "HELP",
        help = "Print detected terminal color capability and exit"
    )]
    pub check_bitcolor: bool,

    #[arg(
        long = "info",
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

/// Validated runtime configuration.
#[derive(Clone, Debug)]
pub struct Settings {
    pub rain: RainSettings,
    pub frame_interval: Duration,
    pub cell_override: Option<CellMetrics>,
    pub color_mode: ColorMode,
    pub bold: bool,
    pub jitter_px: i32,
    pub exit_on_input: bool,
    pub duration: Option<Duration>,
}

impl Settings {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let rain = RainSettings {
            fall_speed: args.speed,
            trail: args.trail,
            cycle: args.cycle,
            burst_chance: args.burst_chance,
        };
        rain.validate()?;

        let interval = require_range("--interval", args.interval_ms, 5, 1000)?;
        let jitter = require_range("--jitter", args.jitter, 0, 1000)?;

        let duration = match args.duration {
            Some(s) if !s.is_finite() => {
                return Err(ConfigError::NotFinite {
                    name: "--duration",
                    value: s.to_string(),
                })
            }
            Some(s) if s > 0.0 => Some(Duration::from_secs_f64(require_range(
                "--duration",
                s,
                0.1,
                86400.0,
            )?)),
            _ => None,
        };

        let cell_override = args
            .cell_size
            .as_deref()
            .map(CellMetrics::from_str)
            .transpose()?;

        Ok(Self {
            rain,
            frame_interval: Duration::from_millis(interval),
            cell_override,
            color_mode: detect_color_mode(args.colormode)?,
            bold: !args.thin,
            jitter_px: jitter as i32,
            exit_on_input: !args.no_exit_on_input,
            duration,
        })
    }
}

pub fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    if term.contains("256color") {
        return ColorMode::Color256;
    }
    ColorMode::Color16
}

pub fn detect_color_mode(forced: Option<u16>) -> Result<ColorMode, ConfigError> {
    match forced {
        None => Ok(detect_color_mode_auto()),
        Some(0) => Ok(ColorMode::Mono),
        Some(16) => Ok(ColorMode::Color16),
        Some(8 | 256) => Ok(ColorMode::Color256),
        Some(24 | 32) => Ok(ColorMode::TrueColor),
        Some(other) => Err(ConfigError::UnknownColorMode(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        let mut full = vec!["glyphfall"];
        full.extend_from_slice(argv);
        Args::try_parse_from(full).unwrap()
    }

    #[test]
    fn defaults_match_the_classic_constants() {
        let s = Settings::from_args(&parse(&["--colormode", "24"])).unwrap();
        assert_eq!(s.rain, RainSettings::default());
        assert_eq!(s.frame_interval, Duration::from_millis(20));
        assert_eq!(s.jitter_px, 3);
        assert!(s.exit_on_input);
        assert!(s.bold);
        assert_eq!(s.cell_override, None);
        assert_eq!(s.duration, None);
    }

    #[test]
    fn u16_range_rejects_inverted_and_zero() {
        assert!("10,4".parse::<U16Range>().is_err());
        assert!("0,4".parse::<U16Range>().is_err());
        assert_eq!(
            " 3 , 9".parse::<U16Range>(),
            Ok(U16Range { low: 3, high: 9 })
        );
    }

    #[test]
    fn trail_above_capacity_is_rejected() {
        let args = parse(&["--trail", "10,65", "--colormode", "0"]);
        assert!(matches!(
            Settings::from_args(&args),
            Err(ConfigError::TrailExceedsCapacity { max: 65, .. })
        ));
    }

    #[test]
    fn interval_out_of_range_is_rejected() {
        let args = parse(&["--interval", "2", "--colormode", "0"]);
        assert!(matches!(
            Settings::from_args(&args),
            Err(ConfigError::OutOfRange { name: "--interval", .. })
        ));
    }

    #[test]
    fn non_positive_duration_disables_the_timer() {
        let args = parse(&["--duration", "0", "--colormode", "0"]);
        assert_eq!(Settings::from_args(&args).unwrap().duration, None);
        let args = parse(&["--duration", "2.5", "--colormode", "0"]);
        assert_eq!(
            Settings::from_args(&args).unwrap().duration,
            Some(Duration::from_millis(2500))
        );
    }

    #[test]
    fn cell_size_parses_width_by_height() {
        assert_eq!(
            "10x20".parse::<CellMetrics>(),
            Ok(CellMetrics {
                width: 10,
                height: 20
            })
        );
        assert!("10".parse::<CellMetrics>().is_err());
        assert!("0x20".parse::<CellMetrics>().is_err());
    }

    #[test]
    fn usage_colorizing_keeps_the_text() {
        let colored = colorize_usage(DEFAULT_PARAMS_USAGE);
        let plain = colored
            .replace("\x1b[1;36m", "")
            .replace("\x1b[33m", "")
            .replace("\x1b[0m", "");
        assert_eq!(plain, DEFAULT_PARAMS_USAGE);
    }

    #[test]
    fn forced_color_modes() {
        assert_eq!(detect_color_mode(Some(8)), Ok(ColorMode::Color256));
        assert_eq!(detect_color_mode(Some(32)), Ok(ColorMode::TrueColor));
        assert_eq!(
            detect_color_mode(Some(7)),
            Err(ConfigError::UnknownColorMode(7))
        );
    }
}
