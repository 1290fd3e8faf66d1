//! # hiredis - streaming RESP reply reader and command writer
//!
//! A [`Reader`] accepts Redis protocol bytes in arbitrarily fragmented chunks
//! and hands back complete replies one at a time; [`write_command`] turns a
//! list of arguments into a multi-bulk request.
//!
//! ## Example
//!
//! ```rust
//! use hiredis::Reader;
//! use hiredis::ReplyValue;
//!
//! let mut reader = Reader::new();
//! reader.feed(hiredis::write_command(["hello", "world"]));
//!
//! let reply = reader.get().unwrap();
//! assert_eq!(reply, Some(ReplyValue::array(vec!["hello".into(), "world".into()])));
//! assert_eq!(reader.get().unwrap(), None);
//! ```
//!
//! With the `tokio` feature (on by default), [`ReplyCodec`] plugs the reader
//! into `tokio_util::codec::Framed` and [`Connection`] wraps a stream for
//! simple request/reply use.

mod config;
mod encode;
mod error;
mod reader;
mod types;
mod utils;
mod writer;

#[cfg(feature = "tokio")]
mod codec;
#[cfg(feature = "tokio")]
mod connection;

#[cfg(feature = "tokio")]
pub use codec::ReplyCodec;
pub use config::DEFAULT_MAX_ARRAY_LEN;
pub use config::DEFAULT_MAX_BULK_LEN;
pub use config::DEFAULT_MAX_DEPTH;
pub use config::DEFAULT_MAX_IDLE_BUFFER;
pub use config::ReaderConfig;
#[cfg(feature = "tokio")]
pub use connection::Connection;
#[cfg(feature = "tokio")]
pub use connection::DEFAULT_ADDR;
pub use error::ConfigError;
pub use error::Error;
pub use error::ProtocolError;
pub use error::Result;
pub use reader::Reader;
pub use reader::Replies;
pub use types::ReplyValue;
pub use types::StringValue;
pub use writer::Command;
pub use writer::ToArg;
pub use writer::write_command;
pub use writer::write_command_to;
