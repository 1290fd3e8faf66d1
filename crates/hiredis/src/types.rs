//! Reply value representation.

use std::borrow::Cow;

use bytes::Bytes;

/// Payload of a status or bulk reply.
///
/// Which variant the [`Reader`](crate::Reader) produces is fixed by
/// [`ReaderConfig::return_buffers`](crate::ReaderConfig::return_buffers).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StringValue {
	/// Payload decoded as UTF-8 text (invalid sequences replaced by U+FFFD).
	Text(String),
	/// Payload exactly as received.
	Raw(Bytes),
}

impl StringValue {
	/// Decode a payload according to the output mode.
	pub(crate) fn decode(payload: &[u8], return_buffers: bool) -> Self {
		if return_buffers {
			StringValue::Raw(Bytes::copy_from_slice(payload))
		} else {
			StringValue::Text(String::from_utf8_lossy(payload).into_owned())
		}
	}

	pub fn as_bytes(&self) -> &[u8] {
		match self {
			StringValue::Text(s) => s.as_bytes(),
			StringValue::Raw(b) => b,
		}
	}

	/// Text view of the payload; `None` for raw payloads that are not UTF-8.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			StringValue::Text(s) => Some(s),
			StringValue::Raw(b) => std::str::from_utf8(b).ok(),
		}
	}

	pub fn to_string_lossy(&self) -> Cow<'_, str> {
		match self {
			StringValue::Text(s) => Cow::Borrowed(s),
			StringValue::Raw(b) => String::from_utf8_lossy(b),
		}
	}

	pub fn into_bytes(self) -> Bytes {
		match self {
			StringValue::Text(s) => Bytes::from(s),
			StringValue::Raw(b) => b,
		}
	}

	pub fn len(&self) -> usize {
		self.as_bytes().len()
	}

	pub fn is_empty(&self) -> bool {
		self.as_bytes().is_empty()
	}

	pub fn is_raw(&self) -> bool {
		matches!(self, StringValue::Raw(_))
	}
}

impl From<&str> for StringValue {
	fn from(s: &str) -> Self {
		StringValue::Text(s.to_string())
	}
}

impl From<String> for StringValue {
	fn from(s: String) -> Self {
		StringValue::Text(s)
	}
}

impl From<Bytes> for StringValue {
	fn from(b: Bytes) -> Self {
		StringValue::Raw(b)
	}
}

impl From<Vec<u8>> for StringValue {
	fn from(v: Vec<u8>) -> Self {
		StringValue::Raw(Bytes::from(v))
	}
}

impl From<&[u8]> for StringValue {
	fn from(b: &[u8]) -> Self {
		StringValue::Raw(Bytes::copy_from_slice(b))
	}
}

/// A fully decoded RESP reply.
///
/// Nil and empty are different values: `$-1` is `BulkString(None)` while
/// `$0` is `BulkString(Some(..))` with an empty payload, and likewise for
/// arrays.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReplyValue {
	/// Status reply: `+OK\r\n`
	SimpleString(StringValue),

	/// Error reply: `-ERR message\r\n`
	Error(String),

	/// Integer reply: `:1000\r\n`
	Integer(i64),

	/// Bulk reply: `$6\r\nfoobar\r\n`, or `$-1\r\n` for nil
	BulkString(Option<StringValue>),

	/// Multi-bulk reply: `*2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n`, or `*-1\r\n` for nil
	Array(Option<Vec<ReplyValue>>),
}

impl ReplyValue {
	/// Check if the value is an error reply
	pub fn is_error(&self) -> bool {
		matches!(self, ReplyValue::Error(_))
	}

	/// Check if the value is a nil bulk or nil array
	pub fn is_nil(&self) -> bool {
		matches!(self, ReplyValue::BulkString(None) | ReplyValue::Array(None))
	}

	/// Text of a status, bulk or error reply
	pub fn as_str(&self) -> Option<&str> {
		match self {
			ReplyValue::SimpleString(s) | ReplyValue::BulkString(Some(s)) => s.as_str(),
			ReplyValue::Error(e) => Some(e),
			_ => None,
		}
	}

	/// Payload bytes of a status or bulk reply
	pub fn as_bytes(&self) -> Option<&[u8]> {
		match self {
			ReplyValue::SimpleString(s) | ReplyValue::BulkString(Some(s)) => Some(s.as_bytes()),
			_ => None,
		}
	}

	pub fn as_integer(&self) -> Option<i64> {
		match self {
			ReplyValue::Integer(i) => Some(*i),
			_ => None,
		}
	}

	/// Elements of a non-nil array
	pub fn as_array(&self) -> Option<&[ReplyValue]> {
		match self {
			ReplyValue::Array(Some(a)) => Some(a),
			_ => None,
		}
	}

	pub fn into_array(self) -> Option<Vec<ReplyValue>> {
		match self {
			ReplyValue::Array(a) => a,
			_ => None,
		}
	}

	// Convenience constructors

	pub fn simple(s: impl Into<StringValue>) -> Self {
		ReplyValue::SimpleString(s.into())
	}

	pub fn error(e: impl Into<String>) -> Self {
		ReplyValue::Error(e.into())
	}

	pub fn integer(i: i64) -> Self {
		ReplyValue::Integer(i)
	}

	pub fn bulk(s: impl Into<StringValue>) -> Self {
		ReplyValue::BulkString(Some(s.into()))
	}

	pub fn nil_bulk() -> Self {
		ReplyValue::BulkString(None)
	}

	pub fn array(items: impl IntoIterator<Item = ReplyValue>) -> Self {
		ReplyValue::Array(Some(items.into_iter().collect()))
	}

	pub fn nil_array() -> Self {
		ReplyValue::Array(None)
	}
}

impl From<&str> for ReplyValue {
	fn from(s: &str) -> Self {
		ReplyValue::bulk(s)
	}
}

impl From<String> for ReplyValue {
	fn from(s: String) -> Self {
		ReplyValue::bulk(s)
	}
}

impl From<Bytes> for ReplyValue {
	fn from(b: Bytes) -> Self {
		ReplyValue::bulk(b)
	}
}

impl From<i64> for ReplyValue {
	fn from(i: i64) -> Self {
		ReplyValue::Integer(i)
	}
}

impl<T: Into<ReplyValue>> From<Vec<T>> for ReplyValue {
	fn from(v: Vec<T>) -> Self {
		ReplyValue::array(v.into_iter().map(Into::into))
	}
}

impl<T: Into<ReplyValue>> From<Option<T>> for ReplyValue {
	fn from(o: Option<T>) -> Self {
		match o {
			Some(v) => v.into(),
			None => ReplyValue::BulkString(None),
		}
	}
}
