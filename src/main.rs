// Copyright (c) 2026 rezky_nightky

mod cell;
mod charset;
mod cloud;
mod config;
mod droplet;
mod error;
mod frame;
mod input;
mod logging;
mod palette;
mod render;
mod runtime;
mod saver;
mod surface;
mod terminal;

use std::env;
use std::process::ExitCode;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::charset::build_chars;
use crate::config::{
    color_enabled_stdout, default_params_usage_for_help, detect_color_mode,
    detect_color_mode_auto, Args, Settings,
};
use crate::runtime::Ticker;
use crate::saver::{Lifecycle, Saver};
use crate::surface::CellMetrics;
use crate::terminal::{restore_terminal_best_effort, Terminal};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn install_signal_handlers() {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }
}

fn parse_args() -> Args {
    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();

    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }
    cmd.build();

    let matches = cmd.get_matches();
    Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

fn print_bitcolor_check(args: &Args) -> error::Result<()> {
    let colorterm = env::var("COLORTERM").unwrap_or_default();
    let term = env::var("TERM").unwrap_or_default();
    let auto = detect_color_mode_auto();
    let effective = detect_color_mode(args.colormode)?;
    let or_unset = |v: &str| {
        if v.is_empty() {
            "(unset)".to_string()
        } else {
            v.to_string()
        }
    };

    println!("BITCOLOR CHECK:");
    println!("  COLORTERM: {}", or_unset(&colorterm));
    println!("  TERM: {}", or_unset(&term));
    println!("  auto_detected: {}", auto.label());
    if args.colormode.is_some() {
        println!("  forced: {}", effective.label());
    }
    println!("  effective: {}", effective.label());
    Ok(())
}

fn print_info() {
    println!("Version: v{}", env!("CARGO_PKG_VERSION"));
    println!("Build: {}", env!("GLYPHFALL_BUILD"));
    println!("Commit: {}", env!("GLYPHFALL_GIT_SHA"));
    println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
    println!("License: {}", env!("CARGO_PKG_LICENSE"));
    println!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn run(args: Args) -> error::Result<()> {
    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    if args.info {
        print_info();
        return Ok(());
    }
    if args.check_bitcolor {
        return print_bitcolor_check(&args);
    }

    let settings = Settings::from_args(&args)?;
    let chars = build_chars(args.charset, args.chars.as_deref())?;
    logging::init(args.log_file.as_deref())?;

    let seed = args.seed.unwrap_or_else(clock_seed);
    tracing::info!(
        seed,
        color_mode = settings.color_mode.label(),
        interval_ms = settings.frame_interval.as_millis() as u64,
        glyphs = chars.len(),
        "starting"
    );

    let mut term = Terminal::new()?;
    let (cols, rows) = term.size()?;
    let cell = settings
        .cell_override
        .or_else(|| {
            term.window_size()
                .ok()
                .and_then(|ws| CellMetrics::measured(&ws))
        })
        .unwrap_or(CellMetrics::DEFAULT);
    tracing::debug!(
        cols,
        rows,
        cell_width = cell.width,
        cell_height = cell.height,
        "surface acquired"
    );

    let mut saver = Saver::new(
        cols,
        rows,
        cell,
        &settings,
        chars,
        StdRng::seed_from_u64(seed),
    );

    let start_time = Instant::now();
    let end_time = settings.duration.map(|d| start_time + d);
    let mut ticker = Ticker::new(settings.frame_interval, start_time);

    while saver.is_running() {
        let now = Instant::now();
        if end_time.is_some_and(|end| now >= end) {
            tracing::info!("duration elapsed");
            break;
        }

        let mut timeout = ticker.timeout(now);
        if let Some(end) = end_time {
            timeout = timeout.min(end.saturating_duration_since(now));
        }
        if Terminal::poll_event(timeout)? {
            loop {
                let ev = Terminal::read_event()?;
                saver.handle_event(&ev);
                if !Terminal::poll_event(Duration::ZERO)? {
                    break;
                }
            }
        }

        // a queued close is honored before another frame goes out
        if !saver.is_running() {
            break;
        }

        let now = Instant::now();
        if ticker.is_due(now) {
            saver.tick();
            term.present(saver.frame())?;
            ticker.advance(Instant::now());
        }
    }

    drop(term);
    let reason = match saver.lifecycle() {
        Lifecycle::Closing(r) => r.as_str(),
        Lifecycle::Running => "timer",
    };
    tracing::info!(
        frames = saver.frames(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        reason,
        "surface released"
    );
    Ok(())
}

fn main() -> ExitCode {
    install_signal_handlers();
    let args = parse_args();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "exiting with error");
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
