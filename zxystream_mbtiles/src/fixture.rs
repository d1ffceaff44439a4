//! Temporary MBTiles files for tests.

use crate::MBTilesStore;
use anyhow::{Context, Result};
use r2d2_sqlite::rusqlite::{Connection, params};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const METADATA_SCHEMA: &str = "CREATE TABLE metadata (name TEXT, value TEXT, UNIQUE (name));
	INSERT INTO metadata (name, value) VALUES ('name', 'fixture'), ('format', 'pbf');";

const PLAIN_SCHEMA: &str = "CREATE TABLE tiles (zoom_level INTEGER, tile_column INTEGER, tile_row INTEGER, tile_data BLOB, UNIQUE (zoom_level, tile_column, tile_row));
	CREATE UNIQUE INDEX tile_index on tiles (zoom_level, tile_column, tile_row);";

const INDEXED_SCHEMA: &str = "CREATE TABLE map (zoom_level INTEGER, tile_column INTEGER, tile_row INTEGER, tile_id TEXT);
	CREATE UNIQUE INDEX map_index ON map (zoom_level, tile_column, tile_row);
	CREATE TABLE images (tile_data BLOB, tile_id TEXT);
	CREATE UNIQUE INDEX images_id ON images (tile_id);
	CREATE VIEW tiles AS SELECT map.zoom_level AS zoom_level, map.tile_column AS tile_column, map.tile_row AS tile_row, images.tile_data AS tile_data FROM map JOIN images ON images.tile_id = map.tile_id;";

/// An MBTiles file in its own temporary directory, deleted on drop.
///
/// Rows are given in TMS layout, as they are stored: `(zoom_level, tile_column, tile_row)`.
pub struct MBTilesFixture {
	path: PathBuf,
	_dir: TempDir,
}

impl MBTilesFixture {
	/// A flat `tiles` table holding `rows`.
	pub fn plain(rows: &[(i64, i64, i64)]) -> Result<MBTilesFixture> {
		let fixture = MBTilesFixture::create(&[METADATA_SCHEMA, PLAIN_SCHEMA])?;
		let mut conn = fixture.connect()?;
		let transaction = conn.transaction()?;
		for (z, x, y) in rows {
			transaction.execute(
				"INSERT INTO tiles (zoom_level, tile_column, tile_row, tile_data) VALUES (?1, ?2, ?3, ?4)",
				params![z, x, y, b"tile".as_slice()],
			)?;
		}
		transaction.commit()?;
		Ok(fixture)
	}

	/// An indexed `map` table holding `rows` with their `tile_id`, an `images` table with one
	/// blob per distinct id and a `tiles` view joining both.
	pub fn indexed(rows: &[(i64, i64, i64, Option<&str>)]) -> Result<MBTilesFixture> {
		let fixture = MBTilesFixture::create(&[METADATA_SCHEMA, INDEXED_SCHEMA])?;
		let mut conn = fixture.connect()?;
		let transaction = conn.transaction()?;
		for (z, x, y, tile_id) in rows {
			transaction.execute(
				"INSERT INTO map (zoom_level, tile_column, tile_row, tile_id) VALUES (?1, ?2, ?3, ?4)",
				params![z, x, y, tile_id],
			)?;
			if let Some(tile_id) = tile_id {
				transaction.execute(
					"INSERT OR IGNORE INTO images (tile_data, tile_id) VALUES (?1, ?2)",
					params![tile_id.as_bytes(), tile_id],
				)?;
			}
		}
		transaction.commit()?;
		Ok(fixture)
	}

	/// A database with a `metadata` table only.
	pub fn without_tiles() -> Result<MBTilesFixture> {
		MBTilesFixture::create(&[METADATA_SCHEMA])
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Open the fixture as a read-only store.
	pub fn store(&self) -> Result<MBTilesStore> {
		MBTilesStore::open_path(&self.path)
	}

	/// Run `sql` on a writable connection.
	pub fn execute(&self, sql: &str) -> Result<()> {
		self.connect()?
			.execute_batch(sql)
			.with_context(|| format!("executing '{sql}'"))
	}

	fn create(schema: &[&str]) -> Result<MBTilesFixture> {
		let dir = TempDir::new()?;
		let fixture = MBTilesFixture {
			path: dir.path().join("fixture.mbtiles"),
			_dir: dir,
		};
		let conn = fixture.connect()?;
		for sql in schema {
			conn.execute_batch(sql)?;
		}
		Ok(fixture)
	}

	fn connect(&self) -> Result<Connection> {
		Connection::open(&self.path).with_context(|| format!("opening {:?}", self.path))
	}
}

impl std::fmt::Debug for MBTilesFixture {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MBTilesFixture").field("path", &self.path).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn count(fixture: &MBTilesFixture, sql: &str) -> i64 {
		Connection::open(fixture.path())
			.unwrap()
			.query_row(sql, [], |row| row.get(0))
			.unwrap()
	}

	#[test]
	fn plain_layout() {
		let fixture = MBTilesFixture::plain(&[(0, 0, 0), (1, 1, 0)]).unwrap();
		assert_eq!(count(&fixture, "SELECT COUNT(*) FROM tiles"), 2);
		assert_eq!(count(&fixture, "SELECT COUNT(*) FROM metadata"), 2);
	}

	#[test]
	fn indexed_layout() {
		let fixture = MBTilesFixture::indexed(&[(0, 0, 0, Some("a")), (1, 0, 0, Some("a")), (1, 1, 1, None)]).unwrap();
		assert_eq!(count(&fixture, "SELECT COUNT(*) FROM map"), 3);
		assert_eq!(count(&fixture, "SELECT COUNT(*) FROM images"), 1);
		assert_eq!(count(&fixture, "SELECT COUNT(*) FROM tiles"), 2);
	}

	#[test]
	fn removed_on_drop() {
		let fixture = MBTilesFixture::without_tiles().unwrap();
		let path = fixture.path().to_path_buf();
		assert!(path.exists());
		drop(fixture);
		assert!(!path.exists());
	}
}
