//! Pull-based cursor over the tile coordinates of a store
//!
//! [`CoordCursor`] turns the tile index of a [`TileStore`] into chunks of `z/x/y` lines. Nothing
//! happens until the first [`pull`](CoordCursor::pull): that call detects the schema variant,
//! prepares the scan and returns the first chunk in one go. Every following pull reads at most
//! `batch_size` rows and returns them as one chunk, so the consumer decides the pace and memory
//! stays bounded by the batch.
//!
//! Store calls block; each one runs on tokio's blocking pool with the store handle or row
//! iterator moved into the task and handed back afterwards. The running task is kept in the
//! cursor until it finished, so a pull future that is dropped early (a timeout, `select!`) leaves
//! the cursor suspended and the next pull picks the task up again.
//!
//! # Examples
//!
//! ```
//! use zxystream_core::{CoordCursor, MockTileStore, TileRow};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let store = MockTileStore::plain(vec![TileRow::new(1, 0, 0), TileRow::new(1, 1, 0)]);
//! let mut cursor = CoordCursor::builder().store(store).build().unwrap();
//!
//! assert_eq!(cursor.pull().await.unwrap().unwrap(), "1/0/1\n1/1/1\n");
//! assert!(cursor.pull().await.is_none());
//! # }
//! ```

mod batch;
mod builder;
mod state;
#[cfg(test)]
mod tests;

pub use builder::*;
pub use state::*;

use crate::{CoordStream, CursorConfig, ScanQuery, SchemaVariant, StoreError, TileStore};
use batch::{Batch, BatchEnd, read_batch};
use tokio::task::{JoinHandle, spawn_blocking};

/// Lazily scans a store and emits its tile coordinates as newline-terminated `z/x/y` lines.
pub struct CoordCursor<S: TileStore> {
	store: Option<S>,
	rows: Option<S::Rows>,
	detecting: Option<JoinHandle<(S, Result<u64, StoreError>)>>,
	preparing: Option<JoinHandle<(S, Result<S::Rows, StoreError>)>>,
	reading: Option<JoinHandle<(S::Rows, Batch)>>,
	variant: Option<SchemaVariant>,
	batch_size: usize,
	state: CursorState,
}

impl<S: TileStore> CoordCursor<S> {
	pub fn builder() -> CoordCursorBuilder<S> {
		CoordCursorBuilder::new()
	}

	/// Cursor over `store` with the default batch size.
	pub fn new(store: S) -> Self {
		Self::from_parts(store, CursorConfig::default().batch_size)
	}

	fn from_parts(store: S, batch_size: usize) -> Self {
		CoordCursor {
			store: Some(store),
			rows: None,
			detecting: None,
			preparing: None,
			reading: None,
			variant: None,
			batch_size,
			state: CursorState::Unstarted,
		}
	}

	pub fn state(&self) -> CursorState {
		self.state
	}

	/// The detected schema variant, `None` before detection finished.
	pub fn schema_variant(&self) -> Option<SchemaVariant> {
		self.variant
	}

	pub fn batch_size(&self) -> usize {
		self.batch_size
	}

	/// Produce the next chunk.
	///
	/// - `Some(Ok(chunk))`: one or more complete `z/x/y\n` lines.
	/// - `None`: the sequence is complete, also for every pull after that.
	/// - `Some(Err(err))`: the store failed. Reported once, every later pull returns `None`.
	///
	/// A missing table is not a failure; it ends the sequence like an empty table.
	///
	/// Dropping the returned future before it completes is safe: the store call keeps running and
	/// its result is used by the next pull.
	pub async fn pull(&mut self) -> Option<Result<String, StoreError>> {
		while !self.state.is_terminal() {
			match self.state {
				CursorState::Unstarted => {
					log::debug!("start scanning tile coordinates, batch size {}", self.batch_size);
					if let Err(err) = self.start_detection() {
						return Some(Err(self.fail(err)));
					}
					self.state = CursorState::Detecting;
				}
				CursorState::Detecting => match self.detect().await {
					Ok((store, variant)) => {
						self.variant = Some(variant);
						self.start_scan(store, variant);
						self.state = CursorState::Preparing;
					}
					Err(err) => return Some(Err(self.fail(err))),
				},
				CursorState::Preparing => match self.prepare().await {
					Ok(rows) => {
						self.rows = Some(rows);
						self.state = CursorState::Iterating;
					}
					Err(StoreError::TableNotFound(table)) => {
						log::warn!("table '{table}' does not exist, no tiles to scan");
						self.close();
					}
					Err(err) => return Some(Err(self.fail(err))),
				},
				CursorState::Iterating => return self.emit_batch().await,
				CursorState::Draining => self.close(),
				CursorState::Closed | CursorState::Failed => break,
			}
		}
		None
	}

	/// Adapt the cursor into a [`CoordStream`].
	pub fn into_stream(self) -> CoordStream<'static> {
		CoordStream::from_cursor(self)
	}

	/// Consume the cursor and count the coordinates it emits.
	///
	/// # Errors
	/// Returns the first store error.
	pub async fn count(self) -> Result<u64, StoreError> {
		self.into_stream().count_lines().await
	}

	fn start_detection(&mut self) -> Result<(), StoreError> {
		let mut store = self.take_store()?;
		self.detecting = Some(spawn_blocking(move || {
			let count = store.count_map_indices();
			(store, count)
		}));
		Ok(())
	}

	async fn detect(&mut self) -> Result<(S, SchemaVariant), StoreError> {
		let (store, count) = join(&mut self.detecting).await?;
		let count = count?;
		let variant = SchemaVariant::from_index_count(count);
		log::debug!("found {count} indices on table 'map', schema is {variant}");
		Ok((store, variant))
	}

	fn start_scan(&mut self, mut store: S, variant: SchemaVariant) {
		let query = ScanQuery::new(variant, self.batch_size);
		log::trace!("SQL: {}", query.sql());
		self.preparing = Some(spawn_blocking(move || {
			let rows = store.scan(&query);
			(store, rows)
		}));
	}

	async fn prepare(&mut self) -> Result<S::Rows, StoreError> {
		let (store, rows) = join(&mut self.preparing).await?;
		self.store = Some(store);
		rows
	}

	async fn emit_batch(&mut self) -> Option<Result<String, StoreError>> {
		if self.reading.is_none() {
			let Some(mut rows) = self.rows.take() else {
				return Some(Err(self.fail(StoreError::Interrupted("row iteration is gone".to_string()))));
			};
			let batch_size = self.batch_size;
			self.reading = Some(spawn_blocking(move || {
				let batch = read_batch(&mut rows, batch_size);
				(rows, batch)
			}));
		}

		let (rows, batch) = match join(&mut self.reading).await {
			Ok(result) => result,
			Err(err) => return Some(Err(self.fail(err))),
		};
		log::trace!("read {} rows", batch.count);

		match batch.end {
			BatchEnd::Full => {
				self.rows = Some(rows);
				Some(Ok(batch.lines))
			}
			BatchEnd::Exhausted => {
				drop(rows);
				self.finish(batch.lines)
			}
			BatchEnd::Failed(StoreError::TableNotFound(table)) => {
				log::warn!("table '{table}' disappeared while scanning, ending early");
				drop(rows);
				self.finish(batch.lines)
			}
			BatchEnd::Failed(err) => {
				drop(rows);
				Some(Err(self.fail(err)))
			}
		}
	}

	/// The iteration ended cleanly: emit the last partial chunk, if any, then close.
	fn finish(&mut self, lines: String) -> Option<Result<String, StoreError>> {
		self.release();
		if lines.is_empty() {
			self.state = CursorState::Closed;
			None
		} else {
			self.state = CursorState::Draining;
			Some(Ok(lines))
		}
	}

	fn close(&mut self) {
		self.release();
		self.state = CursorState::Closed;
		log::debug!("coordinate cursor closed");
	}

	fn fail(&mut self, err: StoreError) -> StoreError {
		self.release();
		self.state = CursorState::Failed;
		log::debug!("coordinate cursor failed: {err}");
		err
	}

	/// Drop the row iteration, the store handle and any store task still running.
	fn release(&mut self) {
		self.rows = None;
		self.store = None;
		self.detecting = None;
		self.preparing = None;
		self.reading = None;
	}

	fn take_store(&mut self) -> Result<S, StoreError> {
		self.store
			.take()
			.ok_or_else(|| StoreError::Interrupted("store handle is gone".to_string()))
	}
}

impl<S: TileStore> std::fmt::Debug for CoordCursor<S> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CoordCursor")
			.field("state", &self.state)
			.field("variant", &self.variant)
			.field("batch_size", &self.batch_size)
			.finish()
	}
}

/// Wait for the store task in `slot`.
///
/// The handle stays in `slot` while waiting and is cleared only once the task finished.
async fn join<T>(slot: &mut Option<JoinHandle<T>>) -> Result<T, StoreError> {
	let Some(handle) = slot.as_mut() else {
		return Err(StoreError::Interrupted("no store task is running".to_string()));
	};
	let joined = handle.await;
	*slot = None;
	joined.map_err(|err| StoreError::Interrupted(err.to_string()))
}
