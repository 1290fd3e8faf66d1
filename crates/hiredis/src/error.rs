//! Error types for reply parsing, configuration and connections.

use thiserror::Error;

/// Violations of the RESP grammar.
///
/// Any of these is fatal to the [`Reader`](crate::Reader) that produced it:
/// the byte framing cannot be recovered, so the reader refuses to parse
/// anything afterwards.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
	/// First byte of a reply is not one of `+ - : $ *`
	#[error("Protocol error, got \"{}\" as reply type byte", type_byte(.0))]
	InvalidTypeByte(u8),

	/// Integer reply or length field is not a decimal integer
	#[error("Protocol error, invalid integer: {0:?}")]
	InvalidInteger(String),

	/// Negative bulk length other than -1
	#[error("Protocol error, invalid bulk length: {0}")]
	InvalidBulkLength(i64),

	/// Negative multi-bulk count other than -1
	#[error("Protocol error, invalid multi-bulk length: {0}")]
	InvalidArrayLength(i64),

	/// Bulk length above the configured limit
	#[error("Protocol error, bulk length {len} exceeds limit {max}")]
	BulkTooLarge { len: i64, max: usize },

	/// Multi-bulk count above the configured limit
	#[error("Protocol error, multi-bulk length {len} exceeds limit {max}")]
	ArrayTooLarge { len: i64, max: usize },

	/// Multi-bulk nesting deeper than the configured limit
	#[error("Protocol error, multi-bulk nesting depth {depth} exceeds limit {max}")]
	NestingTooDeep { depth: usize, max: usize },

	/// Bulk payload not terminated by CRLF
	#[error("Protocol error, bulk payload not terminated by CRLF")]
	MissingCrlf,
}

/// Renders a type byte the way it appears in error messages.
fn type_byte(byte: &u8) -> String {
	if byte.is_ascii_graphic() || *byte == b' ' {
		(*byte as char).to_string()
	} else {
		format!("\\x{:02x}", byte)
	}
}

/// Rejected [`ReaderConfig`](crate::ReaderConfig).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
	#[error("{0} must be greater than zero")]
	ZeroLimit(&'static str),
}

/// Errors surfaced by the async codec and connection.
#[derive(Error, Debug)]
pub enum Error {
	#[error(transparent)]
	Protocol(#[from] ProtocolError),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// Stream ended in the middle of a reply
	#[error("connection closed with an incomplete reply buffered")]
	ConnectionClosed,

	/// A previous protocol error made the connection unusable
	#[error("connection discarded after a protocol error")]
	Poisoned,
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case(b'?', "Protocol error, got \"?\" as reply type byte")]
	#[case(b'x', "Protocol error, got \"x\" as reply type byte")]
	#[case(b'\r', "Protocol error, got \"\\x0d\" as reply type byte")]
	#[case(0x80, "Protocol error, got \"\\x80\" as reply type byte")]
	fn test_type_byte_message(#[case] byte: u8, #[case] expected: &str) {
		assert_eq!(ProtocolError::InvalidTypeByte(byte).to_string(), expected);
	}

	#[test]
	fn test_protocol_error_into_error() {
		let err: Error = ProtocolError::MissingCrlf.into();
		assert!(matches!(err, Error::Protocol(ProtocolError::MissingCrlf)));
		assert_eq!(
			err.to_string(),
			"Protocol error, bulk payload not terminated by CRLF"
		);
	}
}
