//! Error types shared by the cursor and the store adapters.

use thiserror::Error;

/// Failure reported by a [`TileStore`](crate::TileStore) or its row iterator.
///
/// Adapters classify their native errors into these variants at the failing call, so the
/// cursor only ever matches on the variant.
#[derive(Debug, Error)]
pub enum StoreError {
	/// The queried table does not exist. The cursor treats this as an empty source.
	#[error("no such table: {0}")]
	TableNotFound(String),

	/// A row whose values do not form a valid tile coordinate.
	#[error("invalid tile row: zoom_level {zoom}, tile_column {column}, tile_row {row}")]
	InvalidRow { zoom: i64, column: i64, row: i64 },

	/// A blocking store task or worker went away before it answered.
	#[error("store task interrupted: {0}")]
	Interrupted(String),

	/// Any other failure of the underlying store.
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl StoreError {
	/// Returns `true` for the missing-table condition.
	#[must_use]
	pub fn is_table_not_found(&self) -> bool {
		matches!(self, StoreError::TableNotFound(_))
	}
}

/// Invalid arguments when building a [`CoordCursor`](crate::CoordCursor).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
	#[error("a tile store is required")]
	MissingStore,

	#[error("batch size must be a positive integer, got {0}")]
	InvalidBatchSize(usize),
}
