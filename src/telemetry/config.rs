use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Shape of the log lines on stderr. stdout is reserved for the run report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    pub fn from_env() -> Self {
        Self::parse(std::env::var("FEEDPOST_LOG_FORMAT").ok().as_deref())
    }

    fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

pub fn logs_are_json() -> bool {
    LogFormat::from_env() == LogFormat::Json
}

/// Install the global subscriber. `RUST_LOG` filters, `info` when unset.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter);

    // a subscriber installed earlier (tests) stays in place
    let _ = match LogFormat::from_env() {
        LogFormat::Json => registry.with(layer.json().flatten_event(true)).try_init(),
        LogFormat::Compact => registry.with(layer.compact()).try_init(),
    };
}
