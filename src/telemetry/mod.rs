//! Logging setup.
//!
//! Builds an explicit [`Dispatch`] instead of installing a global
//! subscriber. Startup code runs inside it with
//! [`tracing::dispatcher::with_default`] or
//! [`WithSubscriber`](tracing::instrument::WithSubscriber), and the
//! recovery middleware scopes every request to it.

use tracing::Dispatch;
use tracing_subscriber::EnvFilter;

/// Output format selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl LogFormat {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" | "console" => LogFormat::Pretty,
            _ => LogFormat::Compact,
        }
    }
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level.trim()).unwrap_or_else(|_| EnvFilter::new("info"))
}

pub fn build_dispatch(level: &str, format: &str) -> Dispatch {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_target(false);

    match LogFormat::parse(format) {
        LogFormat::Json => Dispatch::new(builder.json().finish()),
        LogFormat::Pretty => Dispatch::new(builder.pretty().finish()),
        LogFormat::Compact => Dispatch::new(builder.compact().finish()),
    }
}

/// Used only while settings are being read.
pub fn bootstrap_dispatch() -> Dispatch {
    build_dispatch("info", "pretty")
}
