//! Builder for [`CoordCursor`] instances

use super::CoordCursor;
use crate::{ConfigError, CursorConfig, TileStore};

/// Collects the store handle and settings of a cursor and validates them in [`build`](Self::build).
///
/// # Examples
///
/// ```
/// use zxystream_core::{CoordCursor, MockTileStore};
///
/// let cursor = CoordCursor::builder()
///     .store(MockTileStore::empty())
///     .batch_size(250)
///     .build()
///     .unwrap();
/// assert_eq!(cursor.batch_size(), 250);
/// ```
pub struct CoordCursorBuilder<S: TileStore> {
	store: Option<S>,
	config: CursorConfig,
}

impl<S: TileStore> CoordCursorBuilder<S> {
	pub fn new() -> Self {
		Self {
			store: None,
			config: CursorConfig::default(),
		}
	}

	/// Set the store to scan. Required.
	pub fn store(mut self, store: S) -> Self {
		self.store = Some(store);
		self
	}

	/// Set the maximum number of coordinates per chunk (default 1000).
	pub fn batch_size(mut self, batch_size: usize) -> Self {
		self.config.batch_size = batch_size;
		self
	}

	pub fn config(mut self, config: CursorConfig) -> Self {
		self.config = config;
		self
	}

	/// Build the cursor. No store call is made here.
	///
	/// # Errors
	/// [`ConfigError::MissingStore`] without a store, [`ConfigError::InvalidBatchSize`] for a
	/// batch size of zero.
	pub fn build(self) -> Result<CoordCursor<S>, ConfigError> {
		let store = self.store.ok_or(ConfigError::MissingStore)?;
		if self.config.batch_size == 0 {
			return Err(ConfigError::InvalidBatchSize(self.config.batch_size));
		}
		Ok(CoordCursor::from_parts(store, self.config.batch_size))
	}
}

impl<S: TileStore> Default for CoordCursorBuilder<S> {
	fn default() -> Self {
		Self::new()
	}
}
