//! Read the tile index of an MBTiles (SQLite) database.
//!
//! [`MBTilesStore`] opens the database read-only through an `r2d2` pool and implements
//! [`TileStore`], so a [`CoordCursor`](zxystream_core::CoordCursor) can stream its tile
//! coordinates. Both MBTiles layouts are supported: the flat `tiles` table and the deduplicated
//! layout with an indexed `map` table.
//!
//! ## Usage
//! ```rust,no_run
//! use zxystream_core::CoordCursor;
//! use zxystream_mbtiles::MBTilesStore;
//! use anyhow::Result;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let store = MBTilesStore::open_path(Path::new("berlin.mbtiles"))?;
//!     let mut cursor = CoordCursor::builder().store(store).batch_size(500).build()?;
//!     while let Some(chunk) = cursor.pull().await {
//!         print!("{}", chunk?);
//!     }
//!     Ok(())
//! }
//! ```

use crate::{MBTilesRows, classify, pool_error};
use anyhow::{Context, Result, ensure};
use r2d2::{ManageConnection, Pool};
use r2d2_sqlite::{SqliteConnectionManager, rusqlite::OpenFlags};
use std::path::Path;
use zxystream_core::{MAP_INDEX_QUERY, ScanQuery, StoreError, TileStore};

const SCHEMA_QUERY: &str = "SELECT COUNT(*) FROM sqlite_master";

/// Default number of pooled connections.
pub const DEFAULT_POOL_SIZE: u32 = 4;

/// Read-only tile store backed by an MBTiles file.
pub struct MBTilesStore {
	name: String,
	pool: Pool<SqliteConnectionManager>,
}

impl MBTilesStore {
	/// Open an MBTiles database read-only.
	///
	/// # Errors
	/// Returns an error if the file does not exist or SQLite cannot open it.
	pub fn open_path(path: &Path) -> Result<MBTilesStore> {
		MBTilesStore::open_path_with_pool_size(path, DEFAULT_POOL_SIZE)
	}

	/// Open an MBTiles database read-only with at most `pool_size` connections.
	///
	/// The file is checked with one query on a separate connection before the pool is built, so a
	/// file that is not an SQLite database fails here.
	///
	/// # Errors
	/// Returns an error if `pool_size` is zero, the file does not exist or is not an SQLite
	/// database.
	pub fn open_path_with_pool_size(path: &Path, pool_size: u32) -> Result<MBTilesStore> {
		log::debug!("open {path:?}");

		ensure!(pool_size > 0, "pool size must be positive");
		ensure!(path.exists(), "file {path:?} does not exist");
		ensure!(path.is_file(), "path {path:?} is not a file");

		let manager = SqliteConnectionManager::file(path)
			.with_flags(OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX);

		let conn = manager
			.connect()
			.with_context(|| format!("opening MBTiles at {path:?}"))?;
		conn.query_row(SCHEMA_QUERY, [], |row| row.get::<_, i64>(0))
			.map_err(classify)
			.with_context(|| format!("file {path:?} is not a readable SQLite database"))?;
		drop(conn);

		let pool = Pool::builder()
			.max_size(pool_size)
			.build(manager)
			.with_context(|| format!("opening MBTiles at {path:?}"))?;

		Ok(MBTilesStore::from_pool(path.to_string_lossy(), pool))
	}

	/// Wrap an existing connection pool.
	pub fn from_pool(name: impl Into<String>, pool: Pool<SqliteConnectionManager>) -> MBTilesStore {
		MBTilesStore {
			name: name.into(),
			pool,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn pool(&self) -> &Pool<SqliteConnectionManager> {
		&self.pool
	}
}

impl TileStore for MBTilesStore {
	type Rows = MBTilesRows;

	fn count_map_indices(&mut self) -> Result<u64, StoreError> {
		let conn = self.pool.get().map_err(pool_error)?;
		let count: i64 = conn
			.query_row(MAP_INDEX_QUERY, [], |row| row.get("count"))
			.map_err(classify)?;
		Ok(u64::try_from(count).unwrap_or_default())
	}

	fn scan(&mut self, query: &ScanQuery) -> Result<MBTilesRows, StoreError> {
		log::debug!("scan table '{}' of {}", query.table_name(), self.name);
		let conn = self.pool.get().map_err(pool_error)?;
		MBTilesRows::spawn(conn, query)
	}
}

impl std::fmt::Debug for MBTilesStore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MBTilesStore")
			.field("name", &self.name)
			.field("pool_size", &self.pool.max_size())
			.finish()
	}
}
