//! Subscriber setup for applications embedding tack.
//!
//! Only available with the `logging` feature. Library code emits `tracing`
//! events and never installs a subscriber itself; binaries call [`install`]
//! or one of the `init_logging` helpers once at startup.
//!
//! Levels are scoped to the tack crates so dependency chatter stays out of
//! build output. Output goes to stderr, leaving stdout free for generated
//! modules.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub use tracing_subscriber::EnvFilter;

/// Crate targets a [`LogLevel`] applies to.
pub const TACK_TARGETS: [&str; 4] = ["tack", "tack_assembly", "tack_config", "tack_cli"];

/// How much the tack crates report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Silent,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Silent => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }

    /// Filter directives applying this level to every tack target.
    pub fn directives(&self) -> String {
        TACK_TARGETS
            .iter()
            .map(|target| format!("{target}={}", self.as_str()))
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn filter(&self) -> EnvFilter {
        match self {
            LogLevel::Silent => EnvFilter::new("off"),
            _ => EnvFilter::new(self.directives()),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "off" => Ok(LogLevel::Silent),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            other => Err(format!("Invalid log level: {other}")),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `RUST_LOG` when set and valid, otherwise `fallback` scoped to tack targets.
pub fn env_or(fallback: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.filter())
}

/// Install a compact stderr subscriber with `filter`.
///
/// Returns `false` when a global subscriber was already installed, in which
/// case the existing one keeps receiving events.
pub fn install(filter: EnvFilter, ansi: bool) -> bool {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(ansi)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .is_ok()
}

/// Install logging at `level`.
///
/// ```rust,no_run
/// use tack_assembly::logging::{LogLevel, init_logging};
///
/// init_logging(LogLevel::Debug);
/// ```
pub fn init_logging(level: LogLevel) {
    install(level.filter(), true);
}

/// Install logging from `RUST_LOG`, falling back to info.
pub fn init_logging_from_env() {
    install(env_or(LogLevel::Info), true);
}
