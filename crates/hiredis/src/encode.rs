//! Reply encoding, the inverse of [`Reader`](crate::Reader).
//!
//! Used to produce server-side replies and canned wire data. Status and
//! error lines cannot carry CR or LF on the wire; both are written as spaces.

use bytes::BufMut;
use bytes::Bytes;
use bytes::BytesMut;
use memchr::memchr2;

use crate::types::ReplyValue;
use crate::utils::*;

impl ReplyValue {
	/// Append the wire form of this reply to `buf`.
	pub fn encode_to(&self, buf: &mut BytesMut) {
		// Nested arrays are walked with an explicit stack so arbitrarily deep
		// replies cannot exhaust the call stack.
		let mut pending: Vec<&ReplyValue> = vec![self];
		while let Some(value) = pending.pop() {
			match value {
				ReplyValue::SimpleString(s) => encode_line(buf, SIMPLE_STRING, s.as_bytes()),
				ReplyValue::Error(e) => encode_line(buf, ERROR, e.as_bytes()),
				ReplyValue::Integer(i) => put_line_number(buf, INTEGER, *i),
				ReplyValue::BulkString(None) => put_line_number(buf, BULK_STRING, -1),
				ReplyValue::BulkString(Some(s)) => encode_bulk_string(buf, s.as_bytes()),
				ReplyValue::Array(None) => put_line_number(buf, ARRAY, -1),
				ReplyValue::Array(Some(elements)) => {
					put_length(buf, ARRAY, elements.len());
					pending.extend(elements.iter().rev());
				}
			}
		}
	}

	pub fn encode(&self) -> Bytes {
		let mut buf = BytesMut::new();
		self.encode_to(&mut buf);
		buf.freeze()
	}
}

#[inline]
fn encode_line(buf: &mut BytesMut, marker: u8, line: &[u8]) {
	buf.put_u8(marker);
	if memchr2(b'\r', b'\n', line).is_some() {
		buf.extend(line.iter().map(|&b| match b {
			b'\r' | b'\n' => b' ',
			other => other,
		}));
	} else {
		buf.put_slice(line);
	}
	buf.put_slice(CRLF);
}

#[inline]
fn encode_bulk_string(buf: &mut BytesMut, s: &[u8]) {
	put_length(buf, BULK_STRING, s.len());
	buf.put_slice(s);
	buf.put_slice(CRLF);
}
