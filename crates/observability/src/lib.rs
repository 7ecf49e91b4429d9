//! Tracing and logging setup shared by both services.

/// Initialize process-wide tracing/logging, choosing the output format from
/// `LOG_FORMAT` (`json` by default, `pretty` for local development).
///
/// An unrecognised `LOG_FORMAT` falls back to JSON and is reported as a warning
/// once the subscriber is installed. Safe to call multiple times; subsequent
/// calls become no-ops.
pub fn init() {
    let (format, rejected) = resolve_format(std::env::var("LOG_FORMAT").ok().as_deref());
    self::tracing::init(format);
    if let Some(err) = rejected {
        ::tracing::warn!(error = %err, "ignoring LOG_FORMAT; using json");
    }
}

/// Format for a raw `LOG_FORMAT` value, plus the parse error when it was rejected.
fn resolve_format(raw: Option<&str>) -> (LogFormat, Option<String>) {
    match raw.map(str::parse::<LogFormat>) {
        None => (LogFormat::default(), None),
        Some(Ok(format)) => (format, None),
        Some(Err(err)) => (LogFormat::default(), Some(err)),
    }
}

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use self::tracing::LogFormat;
