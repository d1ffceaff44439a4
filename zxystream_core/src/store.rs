//! The store interface the cursor drives.
//!
//! Both traits are synchronous: implementations may block on disk or database I/O. The cursor
//! never calls them on an async worker thread, it moves the owned value into
//! `tokio::task::spawn_blocking` and takes it back when the call returns.

use crate::{ScanQuery, StoreError, TileRow};

/// A handle to a tile store that can describe its schema and scan its tile index.
pub trait TileStore: Send + 'static {
	/// Forward-only iterator over the rows of one scan.
	type Rows: TileRows;

	/// Number of indices defined on the `map` table (0 when there is no such table).
	fn count_map_indices(&mut self) -> Result<u64, StoreError>;

	/// Prepare `query` and open a row iteration over it.
	///
	/// Must return [`StoreError::TableNotFound`] when the scanned table does not exist.
	fn scan(&mut self, query: &ScanQuery) -> Result<Self::Rows, StoreError>;
}

/// Rows of an open scan, read one at a time.
///
/// Dropping the iterator releases whatever the store holds for it (statement, connection).
pub trait TileRows: Send + 'static {
	/// The next row, or `Ok(None)` once the scan is exhausted.
	fn next_row(&mut self) -> Result<Option<TileRow>, StoreError>;
}

impl<R: TileRows + ?Sized> TileRows for Box<R> {
	fn next_row(&mut self) -> Result<Option<TileRow>, StoreError> {
		(**self).next_row()
	}
}
