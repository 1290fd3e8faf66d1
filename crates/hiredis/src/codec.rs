//! `tokio_util` codec driving a [`Reader`] from an async byte stream.

use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tokio_util::codec::Encoder;

use crate::config::ReaderConfig;
use crate::error::ConfigError;
use crate::error::Error;
use crate::reader::Reader;
use crate::types::ReplyValue;
use crate::writer::Command;

/// Decodes replies and encodes [`Command`]s.
///
/// Every byte handed to the decoder is moved into the inner [`Reader`], which
/// owns buffering and resumption; the framed buffer is always left empty.
#[derive(Debug, Default)]
pub struct ReplyCodec {
	reader: Reader,
}

impl ReplyCodec {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_config(config: ReaderConfig) -> Result<Self, ConfigError> {
		Ok(Self {
			reader: Reader::with_config(config)?,
		})
	}

	pub fn reader(&self) -> &Reader {
		&self.reader
	}
}

impl Decoder for ReplyCodec {
	type Item = ReplyValue;
	type Error = Error;

	fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
		if !src.is_empty() {
			self.reader.feed(&src[..]);
			src.clear();
		}
		Ok(self.reader.get()?)
	}

	fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
		match self.decode(src)? {
			Some(reply) => Ok(Some(reply)),
			None if self.reader.buffered_len() == 0 => Ok(None),
			None => Err(Error::ConnectionClosed),
		}
	}
}

impl Encoder<Command> for ReplyCodec {
	type Error = Error;

	fn encode(&mut self, item: Command, dst: &mut BytesMut) -> Result<(), Self::Error> {
		item.write_to(dst);
		Ok(())
	}
}

impl Encoder<&Command> for ReplyCodec {
	type Error = Error;

	fn encode(&mut self, item: &Command, dst: &mut BytesMut) -> Result<(), Self::Error> {
		item.write_to(dst);
		Ok(())
	}
}
