//! Diagnostics for `pnote`.
//!
//! Command output (paths, tables, JSON, `watch` notifications) goes to
//! stdout. Everything logged through `tracing` goes to stderr and, when
//! `[logging] file` is set, is appended to that file so a long `watch`
//! session keeps one history across runs.

use std::fs::OpenOptions;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use perinote_core::config::types::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Crates whose events follow the configured level. Everything else
/// (the filesystem watcher in particular) only reports warnings.
const OWN_TARGETS: [&str; 2] = ["perinote_core", "pnote"];

const LEVELS: [LevelFilter; 6] = [
    LevelFilter::OFF,
    LevelFilter::ERROR,
    LevelFilter::WARN,
    LevelFilter::INFO,
    LevelFilter::DEBUG,
    LevelFilter::TRACE,
];

/// Levels after applying `-v`/`-q` on top of the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub stderr: LevelFilter,
    pub file: Option<(PathBuf, LevelFilter)>,
}

impl LogSettings {
    /// `verbosity` is the number of `-v` flags minus the number of `-q` flags.
    pub fn resolve(cfg: &LoggingConfig, verbosity: i8) -> Self {
        let base = parse_level(&cfg.level).unwrap_or(LevelFilter::INFO);
        let stderr = shift(base, verbosity);

        let file = cfg.file.clone().map(|path| {
            let level = cfg
                .file_level
                .as_deref()
                .and_then(parse_level)
                .unwrap_or_else(|| base.max(LevelFilter::DEBUG));
            (path, level)
        });

        Self { stderr, file }
    }
}

/// Flushes the log file when dropped; hold it until the command finishes.
#[must_use]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

pub fn init(settings: &LogSettings) -> Result<LogGuard, io::Error> {
    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .with_filter(filter_for(settings.stderr));

    let registry = tracing_subscriber::registry().with(stderr_layer);

    let Some((path, level)) = &settings.file else {
        registry.init();
        return Ok(LogGuard { _file: None });
    };

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_filter(filter_for(*level));
    registry.with(file_layer).init();

    Ok(LogGuard { _file: Some(guard) })
}

/// `RUST_LOG` wins over the configured level when it is set.
fn filter_for(level: LevelFilter) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(level)))
}

fn directives(level: LevelFilter) -> String {
    let level = level.to_string().to_lowercase();
    let own: Vec<String> = OWN_TARGETS.iter().map(|target| format!("{target}={level}")).collect();
    format!("warn,{}", own.join(","))
}

fn shift(level: LevelFilter, by: i8) -> LevelFilter {
    let pos = LEVELS.iter().position(|l| *l == level).unwrap_or(3) as i32;
    let shifted = (pos + i32::from(by)).clamp(0, LEVELS.len() as i32 - 1);
    LEVELS[shifted as usize]
}

fn parse_level(s: &str) -> Option<LevelFilter> {
    s.trim().parse().ok()
}
