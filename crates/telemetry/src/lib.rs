//! Console logging for programs built on `hiredis`.

mod logger;

pub use logger::TelemetryError;
pub use logger::init;
