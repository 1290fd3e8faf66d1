//! A minimal request/reply connection over any async byte stream.

use futures::SinkExt;
use futures::StreamExt;
use log::debug;
use log::warn;
use tokio::io::AsyncRead;
use tokio::io::AsyncWrite;
use tokio::net::TcpStream;
use tokio::net::ToSocketAddrs;
use tokio_util::codec::Framed;

use crate::codec::ReplyCodec;
use crate::config::ReaderConfig;
use crate::error::ConfigError;
use crate::error::Error;
use crate::error::Result;
use crate::types::ReplyValue;
use crate::writer::Command;

/// Address used when no explicit server is given.
pub const DEFAULT_ADDR: &str = "127.0.0.1:6379";

/// Writes commands to a stream and yields the replies read back from it.
///
/// Replies come back in the order the server sends them; the connection does
/// not pair them with commands. Any error makes the connection unusable and
/// every later call returns [`Error::Poisoned`].
pub struct Connection<S> {
	framed: Framed<S, ReplyCodec>,
	poisoned: bool,
}

impl Connection<TcpStream> {
	pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
		let stream = TcpStream::connect(addr).await?;
		stream.set_nodelay(true)?;
		debug!("Connected to {}", stream.peer_addr()?);
		Ok(Self::new(stream))
	}
}

impl<S> Connection<S>
where
	S: AsyncRead + AsyncWrite + Unpin,
{
	pub fn new(stream: S) -> Self {
		Self::with_codec(stream, ReplyCodec::new())
	}

	pub fn with_config(stream: S, config: ReaderConfig) -> std::result::Result<Self, ConfigError> {
		Ok(Self::with_codec(stream, ReplyCodec::with_config(config)?))
	}

	fn with_codec(stream: S, codec: ReplyCodec) -> Self {
		Self {
			framed: Framed::new(stream, codec),
			poisoned: false,
		}
	}

	pub fn is_poisoned(&self) -> bool {
		self.poisoned
	}

	pub fn get_ref(&self) -> &S {
		self.framed.get_ref()
	}

	pub fn into_inner(self) -> S {
		self.framed.into_inner()
	}

	/// Write one command and flush it.
	pub async fn send(&mut self, command: Command) -> Result<()> {
		self.ensure_usable()?;
		match self.framed.send(command).await {
			Ok(()) => Ok(()),
			Err(e) => Err(self.poison(e)),
		}
	}

	/// Wait for the next reply. `None` means the peer closed the stream
	/// cleanly between replies.
	pub async fn next_reply(&mut self) -> Result<Option<ReplyValue>> {
		self.ensure_usable()?;
		match self.framed.next().await {
			Some(Ok(reply)) => Ok(Some(reply)),
			Some(Err(e)) => Err(self.poison(e)),
			None => Ok(None),
		}
	}

	/// Send a command and wait for one reply.
	pub async fn request(&mut self, command: Command) -> Result<ReplyValue> {
		self.send(command).await?;
		match self.next_reply().await? {
			Some(reply) => Ok(reply),
			None => Err(self.poison(Error::ConnectionClosed)),
		}
	}

	fn ensure_usable(&self) -> Result<()> {
		if self.poisoned {
			return Err(Error::Poisoned);
		}
		Ok(())
	}

	fn poison(&mut self, err: Error) -> Error {
		warn!("Discarding connection: {}", err);
		self.poisoned = true;
		err
	}
}
