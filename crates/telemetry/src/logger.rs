use chrono::Local;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TelemetryError {
	#[error("invalid log level: {0}")]
	InvalidLogLevel(String),

	#[error("failed to install logger: {0}")]
	InitFailed(String),
}

/// Local time with microseconds, e.g. `[2024-05-01 12:00:00.000123]`.
struct LocalMicros;

impl FormatTime for LocalMicros {
	fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
		write!(w, "{}", Local::now().format("[%Y-%m-%d %H:%M:%S%.6f]"))
	}
}

/// Install a console logger for the process.
///
/// `RUST_LOG` wins over `level` when it is set. Records from the `log`
/// facade, which `hiredis` logs through, are picked up as well.
///
/// ```no_run
/// telemetry::init("debug").unwrap();
/// tracing::info!("Reader ready");
/// ```
pub fn init(level: &str) -> Result<(), TelemetryError> {
	let level = parse_level(level)?;
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_timer(LocalMicros)
		.with_target(true)
		.try_init()
		.map_err(|e| TelemetryError::InitFailed(e.to_string()))?;

	tracing::debug!("Logger installed at {}", level);
	Ok(())
}

/// Map a case-insensitive level name onto its canonical spelling.
fn parse_level(level: &str) -> Result<&'static str, TelemetryError> {
	LEVELS
		.into_iter()
		.find(|known| known.eq_ignore_ascii_case(level))
		.ok_or_else(|| TelemetryError::InvalidLogLevel(level.to_string()))
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case("trace", "trace")]
	#[case("INFO", "info")]
	#[case("Warn", "warn")]
	fn test_level_names(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(parse_level(input), Ok(expected));
	}

	#[rstest]
	#[case("")]
	#[case("warning")]
	#[case("verbose")]
	fn test_unknown_level_rejected(#[case] input: &str) {
		assert_eq!(
			init(input),
			Err(TelemetryError::InvalidLogLevel(input.to_string()))
		);
	}
}
