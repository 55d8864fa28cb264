//! Tracing setup.
//!
//! Usage:
//!   kotoba --debug ...                    # Debug logging
//!   RUST_LOG=kotoba=trace kotoba query x  # Fine-grained log control
//!   KOTOBA_LOG_FILE=/tmp/kotoba.log kotoba
//!
//! Logs go to stderr unless `KOTOBA_LOG_FILE` names a file. While the
//! terminal UI owns the screen, stderr output is dropped.

use std::fs::OpenOptions;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_ENV: &str = "KOTOBA_LOG_FILE";

static CONSOLE_SUSPENDED: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    /// Debug level unless RUST_LOG is explicitly set
    pub debug: bool,
    /// Append logs here instead of stderr
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    pub fn from_env(debug: bool) -> Self {
        Self {
            debug,
            file: std::env::var_os(LOG_FILE_ENV)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from),
        }
    }
}

pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = if config.debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.debug)
        .compact();

    match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|err| anyhow!(err))
        }
        None => builder
            .with_ansi(io::stderr().is_terminal())
            .with_writer(ConsoleWriter)
            .try_init()
            .map_err(|err| anyhow!(err)),
    }
}

/// Silence stderr logging while the alternate screen is active. Dropping
/// the guard restores it.
pub fn suspend_console() -> ConsoleGuard {
    CONSOLE_SUSPENDED.store(true, Ordering::SeqCst);
    ConsoleGuard { _private: () }
}

pub struct ConsoleGuard {
    _private: (),
}

impl Drop for ConsoleGuard {
    fn drop(&mut self) {
        CONSOLE_SUSPENDED.store(false, Ordering::SeqCst);
    }
}

struct ConsoleWriter;

impl<'a> MakeWriter<'a> for ConsoleWriter {
    type Writer = Box<dyn Write + 'a>;

    fn make_writer(&'a self) -> Self::Writer {
        if CONSOLE_SUSPENDED.load(Ordering::SeqCst) {
            Box::new(io::sink())
        } else {
            Box::new(io::stderr())
        }
    }
}
