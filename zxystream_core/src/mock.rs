//! In-memory tile store for tests and examples.
//!
//! [`MockTileStore`] emulates the two MBTiles layouts, can be told to fail at any phase, and
//! records what the cursor asked of it in a shared [`MockCallLog`].

use crate::{ScanQuery, SchemaVariant, StoreError, TileRow, TileRows, TileStore};
use anyhow::anyhow;
use parking_lot::Mutex;
use std::{
	collections::VecDeque,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	thread,
	time::Duration,
};

/// A failure the mock reproduces on demand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MockFailure {
	TableNotFound,
	Other(String),
}

impl MockFailure {
	fn to_error(&self, table: &str) -> StoreError {
		match self {
			MockFailure::TableNotFound => StoreError::TableNotFound(table.to_string()),
			MockFailure::Other(message) => StoreError::Other(anyhow!("{message}")),
		}
	}
}

/// Shared record of the calls made against a [`MockTileStore`].
#[derive(Clone, Debug, Default)]
pub struct MockCallLog {
	calls: Arc<Mutex<Vec<String>>>,
	rows_read: Arc<AtomicUsize>,
	released: Arc<AtomicUsize>,
}

impl MockCallLog {
	/// Store calls in order: `count_map_indices` and `scan: <sql>`.
	pub fn calls(&self) -> Vec<String> {
		self.calls.lock().clone()
	}

	/// Number of rows handed out by all row iterators so far.
	pub fn rows_read(&self) -> usize {
		self.rows_read.load(Ordering::SeqCst)
	}

	/// Number of row iterators that have been dropped.
	pub fn released(&self) -> usize {
		self.released.load(Ordering::SeqCst)
	}

	fn push(&self, call: String) {
		self.calls.lock().push(call);
	}
}

/// An in-memory store with an optional `map` table and an optional `tiles` table.
#[derive(Clone, Debug, Default)]
pub struct MockTileStore {
	map: Option<Vec<(TileRow, Option<i64>)>>,
	map_index: bool,
	tiles: Option<Vec<TileRow>>,
	detect_failure: Option<MockFailure>,
	scan_failure: Option<MockFailure>,
	row_failure: Option<(usize, MockFailure)>,
	latency: Option<Duration>,
	log: MockCallLog,
}

impl MockTileStore {
	/// A store without any tables.
	pub fn empty() -> Self {
		Self::default()
	}

	/// A store with a flat `tiles` table holding `rows` and no `map` table.
	pub fn plain(rows: Vec<TileRow>) -> Self {
		Self {
			tiles: Some(rows),
			..Self::default()
		}
	}

	/// A store with an indexed `map` table. Each row carries its `tile_id`, `None` for NULL.
	pub fn indexed(rows: Vec<(TileRow, Option<i64>)>) -> Self {
		Self {
			map: Some(rows),
			map_index: true,
			..Self::default()
		}
	}

	/// Add or remove the index on the `map` table.
	pub fn with_map_index(mut self, map_index: bool) -> Self {
		self.map_index = map_index;
		self
	}

	/// Add a flat `tiles` table next to whatever else exists.
	pub fn with_tiles(mut self, rows: Vec<TileRow>) -> Self {
		self.tiles = Some(rows);
		self
	}

	/// Let the index introspection fail.
	pub fn failing_detection(mut self, failure: MockFailure) -> Self {
		self.detect_failure = Some(failure);
		self
	}

	/// Let preparing the scan fail.
	pub fn failing_scan(mut self, failure: MockFailure) -> Self {
		self.scan_failure = Some(failure);
		self
	}

	/// Let the row iterator fail after handing out `rows` rows.
	pub fn failing_after(mut self, rows: usize, failure: MockFailure) -> Self {
		self.row_failure = Some((rows, failure));
		self
	}

	/// Block for `latency` in every store call and every row read.
	pub fn with_latency(mut self, latency: Duration) -> Self {
		self.latency = Some(latency);
		self
	}

	pub fn call_log(&self) -> MockCallLog {
		self.log.clone()
	}
}

impl TileStore for MockTileStore {
	type Rows = MockRows;

	fn count_map_indices(&mut self) -> Result<u64, StoreError> {
		self.log.push("count_map_indices".to_string());
		sleep(self.latency);
		if let Some(failure) = &self.detect_failure {
			return Err(failure.to_error("sqlite_master"));
		}
		Ok(u64::from(self.map.is_some() && self.map_index))
	}

	fn scan(&mut self, query: &ScanQuery) -> Result<MockRows, StoreError> {
		self.log.push(format!("scan: {}", query.sql()));
		sleep(self.latency);
		let table = query.table_name();
		if let Some(failure) = &self.scan_failure {
			return Err(failure.to_error(table));
		}

		let rows: VecDeque<TileRow> = match query.variant {
			SchemaVariant::Indexed => self
				.map
				.as_ref()
				.ok_or_else(|| StoreError::TableNotFound(table.to_string()))?
				.iter()
				.filter(|(_, tile_id)| tile_id.is_some())
				.map(|(row, _)| *row)
				.collect(),
			SchemaVariant::Plain => self
				.tiles
				.as_ref()
				.ok_or_else(|| StoreError::TableNotFound(table.to_string()))?
				.iter()
				.copied()
				.collect(),
		};

		Ok(MockRows {
			table,
			rows,
			handed_out: 0,
			failure: self.row_failure.clone(),
			latency: self.latency,
			log: self.log.clone(),
		})
	}
}

fn sleep(latency: Option<Duration>) {
	if let Some(latency) = latency {
		thread::sleep(latency);
	}
}

/// Row iterator of a [`MockTileStore`] scan.
#[derive(Debug)]
pub struct MockRows {
	table: &'static str,
	rows: VecDeque<TileRow>,
	handed_out: usize,
	failure: Option<(usize, MockFailure)>,
	latency: Option<Duration>,
	log: MockCallLog,
}

impl TileRows for MockRows {
	fn next_row(&mut self) -> Result<Option<TileRow>, StoreError> {
		sleep(self.latency);
		if let Some((after, failure)) = &self.failure {
			if self.handed_out >= *after {
				return Err(failure.to_error(self.table));
			}
		}
		let row = self.rows.pop_front();
		if row.is_some() {
			self.handed_out += 1;
			self.log.rows_read.fetch_add(1, Ordering::SeqCst);
		}
		Ok(row)
	}
}

impl Drop for MockRows {
	fn drop(&mut self) {
		self.log.released.fetch_add(1, Ordering::SeqCst);
	}
}
