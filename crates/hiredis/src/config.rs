//! Reader configuration.

use crate::error::ConfigError;

/// Largest bulk payload accepted by default (Redis' `proto-max-bulk-len`).
pub const DEFAULT_MAX_BULK_LEN: usize = 512 * 1024 * 1024;

/// Largest multi-bulk element count accepted by default.
pub const DEFAULT_MAX_ARRAY_LEN: usize = u32::MAX as usize;

/// Deepest multi-bulk nesting accepted by default. Reply values are
/// recursive, so dropping or comparing one costs a stack frame per level.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Capacity above which an emptied read buffer gives its allocation back.
pub const DEFAULT_MAX_IDLE_BUFFER: usize = 16 * 1024;

/// Options fixed when a [`Reader`](crate::Reader) is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
	/// Hand out status and bulk payloads as raw bytes instead of text.
	pub return_buffers: bool,
	/// Declared bulk lengths above this are protocol errors.
	pub max_bulk_len: usize,
	/// Declared multi-bulk counts above this are protocol errors.
	pub max_array_len: usize,
	/// Multi-bulk replies nested deeper than this are protocol errors.
	pub max_depth: usize,
	/// An empty buffer whose capacity exceeds this is reallocated.
	pub max_idle_buffer: usize,
}

impl Default for ReaderConfig {
	fn default() -> Self {
		Self {
			return_buffers: false,
			max_bulk_len: DEFAULT_MAX_BULK_LEN,
			max_array_len: DEFAULT_MAX_ARRAY_LEN,
			max_depth: DEFAULT_MAX_DEPTH,
			max_idle_buffer: DEFAULT_MAX_IDLE_BUFFER,
		}
	}
}

impl ReaderConfig {
	pub fn return_buffers(mut self, enabled: bool) -> Self {
		self.return_buffers = enabled;
		self
	}

	pub fn max_bulk_len(mut self, len: usize) -> Self {
		self.max_bulk_len = len;
		self
	}

	pub fn max_array_len(mut self, len: usize) -> Self {
		self.max_array_len = len;
		self
	}

	pub fn max_depth(mut self, depth: usize) -> Self {
		self.max_depth = depth;
		self
	}

	pub fn max_idle_buffer(mut self, capacity: usize) -> Self {
		self.max_idle_buffer = capacity;
		self
	}

	pub(crate) fn validate(&self) -> Result<(), ConfigError> {
		if self.max_bulk_len == 0 {
			return Err(ConfigError::ZeroLimit("max_bulk_len"));
		}
		if self.max_array_len == 0 {
			return Err(ConfigError::ZeroLimit("max_array_len"));
		}
		if self.max_depth == 0 {
			return Err(ConfigError::ZeroLimit("max_depth"));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_is_valid() {
		let config = ReaderConfig::default();
		assert!(!config.return_buffers);
		assert!(config.validate().is_ok());
	}

	#[test]
	fn test_builder() {
		let config = ReaderConfig::default()
			.return_buffers(true)
			.max_bulk_len(16)
			.max_array_len(4)
			.max_depth(3)
			.max_idle_buffer(0);
		assert!(config.return_buffers);
		assert_eq!(config.max_bulk_len, 16);
		assert_eq!(config.max_array_len, 4);
		assert_eq!(config.max_depth, 3);
		assert_eq!(config.max_idle_buffer, 0);
	}

	#[test]
	fn test_zero_limits_rejected() {
		assert_eq!(
			ReaderConfig::default().max_bulk_len(0).validate(),
			Err(ConfigError::ZeroLimit("max_bulk_len"))
		);
		assert_eq!(
			ReaderConfig::default().max_array_len(0).validate(),
			Err(ConfigError::ZeroLimit("max_array_len"))
		);
		assert_eq!(
			ReaderConfig::default().max_depth(0).validate(),
			Err(ConfigError::ZeroLimit("max_depth"))
		);
	}
}
