//! Wire constants and line helpers shared by the reader and writers.

use bytes::BufMut;
use bytes::BytesMut;
use memchr::memmem;

use crate::error::ProtocolError;

/// CRLF line ending
pub const CRLF: &[u8] = b"\r\n";

/// Type markers
pub const SIMPLE_STRING: u8 = b'+';
pub const ERROR: u8 = b'-';
pub const INTEGER: u8 = b':';
pub const BULK_STRING: u8 = b'$';
pub const ARRAY: u8 = b'*';

/// Find the position of CRLF in a byte slice
#[inline]
pub fn find_crlf(buf: &[u8]) -> Option<usize> {
	memmem::find(buf, CRLF)
}

/// Parse a strict decimal integer: optional leading `-`, digits only.
#[inline]
pub fn parse_integer(buf: &[u8]) -> Result<i64, ProtocolError> {
	let invalid = || ProtocolError::InvalidInteger(String::from_utf8_lossy(buf).into_owned());

	let digits = buf.strip_prefix(b"-").unwrap_or(buf);
	if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
		return Err(invalid());
	}

	// Only ASCII digits and '-' remain, so the str conversion cannot fail;
	// parse still rejects overflow.
	std::str::from_utf8(buf)
		.ok()
		.and_then(|s| s.parse::<i64>().ok())
		.ok_or_else(invalid)
}

/// Append `marker`, a decimal number and CRLF.
#[inline]
pub fn put_line_number(buf: &mut BytesMut, marker: u8, n: i64) {
	buf.put_u8(marker);
	buf.put_slice(n.to_string().as_bytes());
	buf.put_slice(CRLF);
}

/// Append a `*<n>` or `$<n>` header line.
#[inline]
pub fn put_length(buf: &mut BytesMut, marker: u8, length: usize) {
	buf.put_u8(marker);
	buf.put_slice(length.to_string().as_bytes());
	buf.put_slice(CRLF);
}
