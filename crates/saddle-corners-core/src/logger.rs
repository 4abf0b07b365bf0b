//! Minimal logging setup.
//!
//! `init_with_level` installs a plain stderr logger that prefixes each
//! record with the time since startup and the record target. The optional
//! `tracing` feature offers a `tracing-subscriber` pipeline instead.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

struct StderrLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        eprintln!(
            "{:>9.3}s {:<5} [{}] {}",
            self.started.elapsed().as_secs_f64(),
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Install the stderr logger with the provided level filter.
///
/// Only the first call installs anything; later calls are no-ops.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| StderrLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Install a `tracing` subscriber honoring `RUST_LOG` (default `info`).
///
/// With `json` the output is line-delimited JSON for log collectors;
/// otherwise a compact human-readable format with span-close events.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        let _ = fmt()
            .with_env_filter(filter)
            .json()
            .flatten_event(true)
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .compact()
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn level_filter_gates_records() {
        let logger = StderrLogger {
            level: LevelFilter::Info,
            started: Instant::now(),
        };
        let info = Metadata::builder().level(Level::Info).target("t").build();
        let debug = Metadata::builder().level(Level::Debug).target("t").build();
        assert!(logger.enabled(&info));
        assert!(!logger.enabled(&debug));
    }
}
