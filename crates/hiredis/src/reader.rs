//! Incremental reply reader.
//!
//! Bytes are appended with [`Reader::feed`] in whatever chunks the transport
//! delivers, and complete replies are pulled out with [`Reader::get`].
//! Progress inside a partially received multi-bulk reply lives on an explicit
//! frame stack, so a reply split across any number of chunks is parsed exactly
//! once.

use bytes::Buf;
use bytes::BytesMut;
use log::debug;
use log::trace;
use log::warn;

use crate::config::ReaderConfig;
use crate::error::ConfigError;
use crate::error::ProtocolError;
use crate::types::ReplyValue;
use crate::types::StringValue;
use crate::utils::*;

/// Upper bound on the element capacity reserved up front for a multi-bulk
/// reply; larger arrays grow as elements arrive.
const MAX_PREALLOC_ELEMENTS: usize = 1024;

/// A stateful, streaming RESP reply parser.
///
/// ```rust
/// use hiredis::Reader;
/// use hiredis::ReplyValue;
///
/// let mut reader = Reader::new();
/// reader.feed("$3\r\nfoo");
/// assert_eq!(reader.get().unwrap(), None);
///
/// reader.feed("\r\n");
/// assert_eq!(reader.get().unwrap(), Some(ReplyValue::bulk("foo")));
/// ```
#[derive(Debug)]
pub struct Reader {
	/// Bytes not yet consumed by a completed top-level reply.
	buf: BytesMut,
	/// Next unparsed byte in `buf`.
	pos: usize,
	/// Offset in `buf` where the CRLF search for the pending line at `pos`
	/// resumes. Everything before it is known not to hold a CRLF.
	line_scan: usize,
	/// Multi-bulk replies under construction, innermost last.
	frames: Vec<Frame>,
	config: ReaderConfig,
	/// Set once a protocol error is hit; the reader never recovers.
	failed: Option<ProtocolError>,
}

#[derive(Debug)]
struct Frame {
	expected: usize,
	elements: Vec<ReplyValue>,
}

enum ParsedItem {
	Value(ReplyValue),
	FramePushed,
}

impl Default for Reader {
	fn default() -> Self {
		Self::new()
	}
}

impl Reader {
	/// Create a reader that decodes payloads as text.
	pub fn new() -> Self {
		Self::from_valid_config(ReaderConfig::default())
	}

	/// Create a reader with explicit options.
	pub fn with_config(config: ReaderConfig) -> Result<Self, ConfigError> {
		config.validate()?;
		Ok(Self::from_valid_config(config))
	}

	fn from_valid_config(config: ReaderConfig) -> Self {
		Self {
			buf: BytesMut::new(),
			pos: 0,
			line_scan: 0,
			frames: Vec::new(),
			config,
			failed: None,
		}
	}

	pub fn config(&self) -> &ReaderConfig {
		&self.config
	}

	/// Whether a protocol error has made this reader unusable.
	pub fn is_failed(&self) -> bool {
		self.failed.is_some()
	}

	/// Number of bytes held that no completed reply has consumed yet.
	pub fn buffered_len(&self) -> usize {
		self.buf.len()
	}

	/// Append protocol bytes. Nothing is parsed until [`get`](Self::get).
	///
	/// Data fed to a failed reader is dropped.
	pub fn feed(&mut self, data: impl AsRef<[u8]>) {
		let data = data.as_ref();
		if self.failed.is_some() {
			debug!("Dropping {} bytes fed to a failed reader", data.len());
			return;
		}
		trace!("Fed {} bytes ({} buffered)", data.len(), self.buf.len());
		self.buf.extend_from_slice(data);
	}

	/// Pop one complete reply.
	///
	/// Returns `Ok(None)` while the buffered bytes do not yet hold a complete
	/// reply; calling again without feeding more data keeps returning
	/// `Ok(None)`. After an `Err`, every later call returns the same error.
	pub fn get(&mut self) -> Result<Option<ReplyValue>, ProtocolError> {
		if let Some(err) = &self.failed {
			return Err(err.clone());
		}

		loop {
			match self.parse_step() {
				Ok(Some(ParsedItem::FramePushed)) => continue,
				Ok(Some(ParsedItem::Value(value))) => {
					if let Some(reply) = self.absorb(value) {
						self.compact();
						return Ok(Some(reply));
					}
				}
				Ok(None) => {
					trace!(
						"Incomplete reply: {} of {} bytes parsed, depth {}",
						self.pos,
						self.buf.len(),
						self.frames.len()
					);
					return Ok(None);
				}
				Err(e) => return Err(self.fail(e)),
			}
		}
	}

	/// Drain every complete reply currently buffered.
	pub fn replies(&mut self) -> Replies<'_> {
		Replies {
			reader: self,
			done: false,
		}
	}

	/// Hand a finished value to the innermost open frame, closing every
	/// frame it completes. Returns the top-level reply once the stack is
	/// empty.
	fn absorb(&mut self, mut value: ReplyValue) -> Option<ReplyValue> {
		loop {
			let frame = match self.frames.last_mut() {
				Some(frame) => frame,
				None => return Some(value),
			};
			frame.elements.push(value);
			if frame.elements.len() < frame.expected {
				return None;
			}
			let elements = std::mem::take(&mut frame.elements);
			self.frames.pop();
			value = ReplyValue::Array(Some(elements));
		}
	}

	/// Discard the bytes of the reply just returned.
	fn compact(&mut self) {
		trace!("Consumed reply of {} bytes", self.pos);
		self.buf.advance(self.pos);
		self.pos = 0;
		self.line_scan = 0;

		if self.buf.is_empty() && self.buf.capacity() > self.config.max_idle_buffer {
			debug!(
				"Releasing idle read buffer of {} bytes",
				self.buf.capacity()
			);
			self.buf = BytesMut::new();
		}
	}

	fn fail(&mut self, err: ProtocolError) -> ProtocolError {
		warn!("Reader failed: {}", err);
		self.buf = BytesMut::new();
		self.pos = 0;
		self.line_scan = 0;
		self.frames.clear();
		self.failed = Some(err.clone());
		err
	}

	/// Parse the token at the cursor.
	/// A primitive (or nil/empty collection) yields `Value`, a non-empty
	/// multi-bulk header pushes a frame, and missing bytes yield `None`
	/// without moving the cursor.
	fn parse_step(&mut self) -> Result<Option<ParsedItem>, ProtocolError> {
		let Some(&type_marker) = self.buf.get(self.pos) else {
			return Ok(None);
		};

		match type_marker {
			SIMPLE_STRING | ERROR | INTEGER => self.parse_line(type_marker),
			BULK_STRING => self.parse_bulk_string(),
			ARRAY => self.start_array(),
			other => Err(ProtocolError::InvalidTypeByte(other)),
		}
	}

	/// Locate the line following the type byte at `pos`.
	///
	/// Returns the line's bounds in `buf` (CRLF excluded). When no CRLF has
	/// arrived yet, the scanned prefix is remembered so the next call only
	/// searches the newly fed bytes.
	fn scan_line(&mut self) -> Option<(usize, usize)> {
		let line_start = self.pos + 1;
		let from = self.line_scan.max(line_start);

		match find_crlf(&self.buf[from..]) {
			Some(offset) => {
				self.line_scan = 0;
				Some((line_start, from + offset))
			}
			None => {
				// A trailing '\r' may still be completed by the next feed.
				self.line_scan = self.buf.len().saturating_sub(1).max(line_start);
				None
			}
		}
	}

	/// Parse the decimal header of a `$` or `*` reply and return it with the
	/// offset just past its CRLF.
	fn scan_length(&mut self) -> Result<Option<(i64, usize)>, ProtocolError> {
		let Some((start, end)) = self.scan_line() else {
			return Ok(None);
		};
		let length = parse_integer(&self.buf[start..end])?;
		Ok(Some((length, end + CRLF.len())))
	}

	fn parse_line(&mut self, type_marker: u8) -> Result<Option<ParsedItem>, ProtocolError> {
		let Some((start, end)) = self.scan_line() else {
			return Ok(None);
		};
		let line = &self.buf[start..end];

		let value = match type_marker {
			SIMPLE_STRING => {
				ReplyValue::SimpleString(StringValue::decode(line, self.config.return_buffers))
			}
			ERROR => ReplyValue::Error(String::from_utf8_lossy(line).into_owned()),
			_ => ReplyValue::Integer(parse_integer(line)?),
		};
		self.pos = end + CRLF.len();
		Ok(Some(ParsedItem::Value(value)))
	}

	fn parse_bulk_string(&mut self) -> Result<Option<ParsedItem>, ProtocolError> {
		// $6\r\nfoobar\r\n
		let Some((length, start)) = self.scan_length()? else {
			return Ok(None);
		};

		if length == -1 {
			self.pos = start;
			return Ok(Some(ParsedItem::Value(ReplyValue::BulkString(None))));
		}
		if length < -1 {
			return Err(ProtocolError::InvalidBulkLength(length));
		}
		if length as u64 > self.config.max_bulk_len as u64 {
			return Err(ProtocolError::BulkTooLarge {
				len: length,
				max: self.config.max_bulk_len,
			});
		}

		let end = start + length as usize;
		if self.buf.len() < end + CRLF.len() {
			return Ok(None);
		}
		if &self.buf[end..end + CRLF.len()] != CRLF {
			return Err(ProtocolError::MissingCrlf);
		}

		let value = StringValue::decode(&self.buf[start..end], self.config.return_buffers);
		self.pos = end + CRLF.len();
		Ok(Some(ParsedItem::Value(ReplyValue::BulkString(Some(value)))))
	}

	fn start_array(&mut self) -> Result<Option<ParsedItem>, ProtocolError> {
		let Some((length, next)) = self.scan_length()? else {
			return Ok(None);
		};

		if length < -1 {
			return Err(ProtocolError::InvalidArrayLength(length));
		}
		if length > 0 && length as u64 > self.config.max_array_len as u64 {
			return Err(ProtocolError::ArrayTooLarge {
				len: length,
				max: self.config.max_array_len,
			});
		}
		if length > 0 && self.frames.len() >= self.config.max_depth {
			return Err(ProtocolError::NestingTooDeep {
				depth: self.frames.len() + 1,
				max: self.config.max_depth,
			});
		}
		self.pos = next;

		match length {
			-1 => Ok(Some(ParsedItem::Value(ReplyValue::Array(None)))),
			0 => Ok(Some(ParsedItem::Value(ReplyValue::Array(Some(Vec::new()))))),
			_ => {
				let expected = length as usize;
				self.frames.push(Frame {
					expected,
					elements: Vec::with_capacity(expected.min(MAX_PREALLOC_ELEMENTS)),
				});
				Ok(Some(ParsedItem::FramePushed))
			}
		}
	}
}

/// Iterator over the replies currently buffered in a [`Reader`].
///
/// Ends when the reader reports an incomplete reply, or right after yielding
/// a protocol error.
pub struct Replies<'a> {
	reader: &'a mut Reader,
	done: bool,
}

impl Iterator for Replies<'_> {
	type Item = Result<ReplyValue, ProtocolError>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.done {
			return None;
		}
		match self.reader.get() {
			Ok(Some(value)) => Some(Ok(value)),
			Ok(None) => {
				self.done = true;
				None
			}
			Err(e) => {
				self.done = true;
				Some(Err(e))
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_get_on_empty_reader() {
		let mut reader = Reader::new();
		assert_eq!(reader.get(), Ok(None));
		assert_eq!(reader.get(), Ok(None));
		assert_eq!(reader.buffered_len(), 0);
	}

	#[test]
	fn test_partial_array_keeps_bytes_and_frames() {
		let mut reader = Reader::new();
		reader.feed("*2\r\n$3\r\nfoo\r\n$3\r\nba");

		assert_eq!(reader.get(), Ok(None));
		// Nothing is discarded until the top-level reply completes.
		assert_eq!(reader.buffered_len(), 19);
		assert_eq!(reader.frames.len(), 1);
		assert_eq!(reader.frames[0].elements, vec![ReplyValue::bulk("foo")]);

		// A second call resumes from the cursor without re-parsing "foo".
		assert_eq!(reader.get(), Ok(None));
		assert_eq!(reader.frames[0].elements.len(), 1);

		reader.feed("r\r\n");
		assert_eq!(
			reader.get(),
			Ok(Some(ReplyValue::array(vec!["foo".into(), "bar".into()])))
		);
		assert!(reader.frames.is_empty());
		assert_eq!(reader.buffered_len(), 0);
	}

	#[test]
	fn test_compaction_keeps_trailing_bytes() {
		let mut reader = Reader::new();
		reader.feed("+OK\r\n:12");
		assert_eq!(reader.get(), Ok(Some(ReplyValue::simple("OK"))));
		assert_eq!(reader.buffered_len(), 3);
		assert_eq!(reader.pos, 0);
	}

	#[test]
	fn test_idle_buffer_released() {
		let config = ReaderConfig::default().max_idle_buffer(0);
		let mut reader = Reader::with_config(config).unwrap();
		reader.feed("+OK\r\n");
		assert!(reader.get().unwrap().is_some());
		assert_eq!(reader.buf.capacity(), 0);
	}

	#[test]
	fn test_failure_is_terminal() {
		let mut reader = Reader::new();
		reader.feed("?\r\n");
		let err = reader.get().unwrap_err();
		assert_eq!(err, ProtocolError::InvalidTypeByte(b'?'));
		assert!(reader.is_failed());

		reader.feed("+OK\r\n");
		assert_eq!(reader.buffered_len(), 0);
		assert_eq!(reader.get(), Err(err));
	}

	#[test]
	fn test_failure_inside_array_clears_frames() {
		let mut reader = Reader::new();
		reader.feed("*2\r\n:1\r\n:x\r\n");
		assert!(matches!(
			reader.get(),
			Err(ProtocolError::InvalidInteger(_))
		));
		assert!(reader.frames.is_empty());
	}

	#[test]
	fn test_replies_iterator() {
		let mut reader = Reader::new();
		reader.feed("+A\r\n+B\r\n+C");
		let replies: Vec<_> = reader.replies().collect();
		assert_eq!(
			replies,
			vec![Ok(ReplyValue::simple("A")), Ok(ReplyValue::simple("B"))]
		);

		reader.feed("\r\n!");
		let replies: Vec<_> = reader.replies().collect();
		assert_eq!(
			replies,
			vec![
				Ok(ReplyValue::simple("C")),
				Err(ProtocolError::InvalidTypeByte(b'!')),
			]
		);
	}

	#[test]
	fn test_deep_nesting() {
		let depth = 1_000;
		let mut reader = Reader::with_config(ReaderConfig::default().max_depth(depth)).unwrap();
		reader.feed("*1\r\n".repeat(depth));
		assert_eq!(reader.get(), Ok(None));
		reader.feed(":7\r\n");

		let mut value = reader.get().unwrap().unwrap();
		for _ in 0..depth {
			value = value.into_array().unwrap().remove(0);
		}
		assert_eq!(value, ReplyValue::integer(7));
	}

	#[test]
	fn test_nesting_beyond_limit_fails() {
		let mut reader = Reader::new();
		reader.feed("*1\r\n".repeat(200_000));
		reader.feed(":7\r\n");
		assert_eq!(
			reader.get(),
			Err(ProtocolError::NestingTooDeep {
				depth: crate::config::DEFAULT_MAX_DEPTH + 1,
				max: crate::config::DEFAULT_MAX_DEPTH,
			})
		);
		assert!(reader.frames.is_empty());
		assert!(reader.is_failed());
	}

	#[test]
	fn test_nesting_at_limit() {
		let config = ReaderConfig::default().max_depth(2);
		let mut reader = Reader::with_config(config).unwrap();
		// Nil and empty arrays do not open a level.
		reader.feed("*2\r\n*2\r\n*0\r\n*-1\r\n:1\r\n");
		assert_eq!(
			reader.get(),
			Ok(Some(ReplyValue::array(vec![
				ReplyValue::array(vec![ReplyValue::array(vec![]), ReplyValue::nil_array()]),
				ReplyValue::integer(1),
			])))
		);

		reader.feed("*1\r\n*1\r\n*1\r\n:1\r\n");
		assert_eq!(
			reader.get(),
			Err(ProtocolError::NestingTooDeep { depth: 3, max: 2 })
		);
	}

	#[test]
	fn test_line_scan_resumes_after_searched_bytes() {
		let mut reader = Reader::new();
		reader.feed("+abc");
		assert_eq!(reader.get(), Ok(None));
		assert_eq!(reader.line_scan, 3);

		reader.feed("def\r");
		assert_eq!(reader.get(), Ok(None));
		// The trailing '\r' is searched again once more bytes arrive.
		assert_eq!(reader.line_scan, 7);

		reader.feed("\n+x\r\n");
		assert_eq!(reader.get(), Ok(Some(ReplyValue::simple("abcdef"))));
		assert_eq!(reader.line_scan, 0);
		assert_eq!(reader.get(), Ok(Some(ReplyValue::simple("x"))));
	}

	#[test]
	fn test_long_line_in_small_chunks() {
		let line = "x".repeat(64 * 1024);
		let encoded = ReplyValue::error(line.clone()).encode();
		let mut reader = Reader::new();
		for chunk in encoded.chunks(16) {
			reader.feed(chunk);
			if let Some(reply) = reader.get().unwrap() {
				assert_eq!(reply, ReplyValue::error(line.clone()));
				assert_eq!(reader.buffered_len(), 0);
				return;
			}
			assert!(reader.line_scan + 1 >= reader.buffered_len());
		}
		panic!("reply never completed");
	}

	#[test]
	fn test_line_scan_inside_array() {
		let mut reader = Reader::new();
		reader.feed("*2\r\n:1\r\n$1");
		assert_eq!(reader.get(), Ok(None));
		reader.feed("0\r\n0123456789\r\n");
		assert_eq!(
			reader.get(),
			Ok(Some(ReplyValue::array(vec![
				ReplyValue::integer(1),
				ReplyValue::bulk("0123456789"),
			])))
		);
	}
}
