use std::io;
use tracing_subscriber::{fmt, EnvFilter};

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    /// Read `LOG_FORMAT` (`json` or `compact`), falling back to `default`.
    pub fn from_env_or(default: LogFormat) -> Self {
        match std::env::var("LOG_FORMAT").ok().as_deref().map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(v) if v.eq_ignore_ascii_case("compact") => LogFormat::Compact,
            _ => default,
        }
    }
}

/// Initialize the global subscriber.
/// - Respects `RUST_LOG` if set, otherwise uses `default_filter`
/// - Writes to stdout so container logs pick it up
/// - Safe to call twice; the second call is a no-op
pub fn init_logging(format: LogFormat, default_filter: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    let builder = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stdout);
    let _ = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

/// Compact text logs; default filter `info,tower_http=info,axum=info`.
pub fn init_logging_default() {
    init_logging(LogFormat::from_env_or(LogFormat::Compact), "info,tower_http=info,axum=info");
}

/// JSON structured logs for the test client.
pub fn init_logging_json() {
    // 上游转发细节在 client::proxy 下使用 debug，可通过 RUST_LOG 覆盖
    init_logging(LogFormat::from_env_or(LogFormat::Json), "info,client::proxy=debug");
}
