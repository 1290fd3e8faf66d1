//! Request serialization: commands go out as RESP multi-bulk requests.
//!
//! ```text
//! *<N>\r\n
//! $<len(arg0)>\r\n<arg0>\r\n
//! ...
//! ```
//!
//! Lengths always count bytes of the encoded argument, never characters.

use std::borrow::Cow;

use bytes::BufMut;
use bytes::Bytes;
use bytes::BytesMut;

use crate::utils::ARRAY;
use crate::utils::BULK_STRING;
use crate::utils::CRLF;
use crate::utils::put_length;

/// A value that can be sent as a command argument.
///
/// Text is sent as its UTF-8 bytes, byte strings verbatim, and numbers as
/// their decimal text.
pub trait ToArg {
	fn to_arg(&self) -> Cow<'_, [u8]>;
}

impl ToArg for str {
	fn to_arg(&self) -> Cow<'_, [u8]> {
		Cow::Borrowed(self.as_bytes())
	}
}

impl ToArg for String {
	fn to_arg(&self) -> Cow<'_, [u8]> {
		Cow::Borrowed(self.as_bytes())
	}
}

impl ToArg for [u8] {
	fn to_arg(&self) -> Cow<'_, [u8]> {
		Cow::Borrowed(self)
	}
}

impl<const N: usize> ToArg for [u8; N] {
	fn to_arg(&self) -> Cow<'_, [u8]> {
		Cow::Borrowed(self)
	}
}

impl ToArg for Vec<u8> {
	fn to_arg(&self) -> Cow<'_, [u8]> {
		Cow::Borrowed(self)
	}
}

impl ToArg for Bytes {
	fn to_arg(&self) -> Cow<'_, [u8]> {
		Cow::Borrowed(self)
	}
}

impl ToArg for Cow<'_, str> {
	fn to_arg(&self) -> Cow<'_, [u8]> {
		Cow::Borrowed(self.as_bytes())
	}
}

impl<T: ToArg + ?Sized> ToArg for &T {
	fn to_arg(&self) -> Cow<'_, [u8]> {
		(**self).to_arg()
	}
}

macro_rules! decimal_to_arg {
	($($t:ty),* $(,)?) => {
		$(
			impl ToArg for $t {
				fn to_arg(&self) -> Cow<'_, [u8]> {
					Cow::Owned(self.to_string().into_bytes())
				}
			}
		)*
	};
}

decimal_to_arg!(
	i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64
);

/// Encode `args` as one multi-bulk request.
///
/// ```rust
/// let bytes = hiredis::write_command(["SET", "key", "value"]);
/// assert_eq!(&bytes[..], b"*3\r\n$3\r\nSET\r\n$3\r\nkey\r\n$5\r\nvalue\r\n");
/// ```
pub fn write_command<I>(args: I) -> Bytes
where
	I: IntoIterator,
	I::Item: ToArg,
{
	let mut buf = BytesMut::new();
	write_command_to(&mut buf, args);
	buf.freeze()
}

/// Append the multi-bulk encoding of `args` to `buf`.
pub fn write_command_to<I>(buf: &mut BytesMut, args: I)
where
	I: IntoIterator,
	I::Item: ToArg,
{
	let args: Vec<I::Item> = args.into_iter().collect();
	let encoded: Vec<Cow<'_, [u8]>> = args.iter().map(|arg| arg.to_arg()).collect();
	write_encoded(buf, &encoded);
}

fn write_encoded<A: AsRef<[u8]>>(buf: &mut BytesMut, args: &[A]) {
	let payload: usize = args.iter().map(|a| a.as_ref().len() + 16).sum();
	buf.reserve(16 + payload);

	put_length(buf, ARRAY, args.len());
	for arg in args {
		let arg = arg.as_ref();
		put_length(buf, BULK_STRING, arg.len());
		buf.put_slice(arg);
		buf.put_slice(CRLF);
	}
}

/// An owned command with heterogeneous arguments.
///
/// ```rust
/// use hiredis::Command;
///
/// let cmd = Command::new("LPUSH").arg("mylist").arg(42);
/// assert_eq!(cmd.len(), 3);
/// assert_eq!(&cmd.to_bytes()[..], b"*3\r\n$5\r\nLPUSH\r\n$6\r\nmylist\r\n$2\r\n42\r\n");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
	args: Vec<Bytes>,
}

impl Command {
	/// Start a command with its name as the first argument.
	pub fn new(name: impl ToArg) -> Self {
		Self::default().arg(name)
	}

	pub fn arg(mut self, arg: impl ToArg) -> Self {
		self.push_arg(arg);
		self
	}

	pub fn push_arg(&mut self, arg: impl ToArg) {
		let bytes = match arg.to_arg() {
			Cow::Borrowed(b) => Bytes::copy_from_slice(b),
			Cow::Owned(v) => Bytes::from(v),
		};
		self.args.push(bytes);
	}

	pub fn args(&self) -> &[Bytes] {
		&self.args
	}

	pub fn len(&self) -> usize {
		self.args.len()
	}

	pub fn is_empty(&self) -> bool {
		self.args.is_empty()
	}

	/// Append the multi-bulk encoding to `buf`.
	pub fn write_to(&self, buf: &mut BytesMut) {
		write_encoded(buf, &self.args);
	}

	pub fn to_bytes(&self) -> Bytes {
		let mut buf = BytesMut::new();
		self.write_to(&mut buf);
		buf.freeze()
	}
}

/// Build a [`Command`] from heterogeneous arguments.
///
/// ```rust
/// let cmd = hiredis::cmd!["SET", "counter", 10];
/// assert_eq!(cmd.len(), 3);
/// ```
#[macro_export]
macro_rules! cmd {
	() => {
		$crate::Command::default()
	};
	($($arg:expr),+ $(,)?) => {{
		let mut command = $crate::Command::default();
		$(command.push_arg($arg);)+
		command
	}};
}
