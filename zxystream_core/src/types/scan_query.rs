//! The coordinate scan handed to a store.

use crate::SchemaVariant;

/// SQL that asks whether the `map` table carries an index.
pub const MAP_INDEX_QUERY: &str = "SELECT COUNT(1) AS count FROM sqlite_master WHERE type = 'index' AND tbl_name = 'map'";

/// A read-only, parameterless scan over the tile index of one [`SchemaVariant`].
///
/// The selected columns are aliased `z`, `x` and `y`, in that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanQuery {
	pub variant: SchemaVariant,
	/// How many rows a store should read ahead per request. Set to the cursor's batch size.
	pub fetch_size: usize,
}

impl ScanQuery {
	#[must_use]
	pub fn new(variant: SchemaVariant, fetch_size: usize) -> ScanQuery {
		ScanQuery { variant, fetch_size }
	}

	/// Name of the scanned table.
	#[must_use]
	pub fn table_name(&self) -> &'static str {
		self.variant.table_name()
	}

	/// The SQL text of the scan.
	#[must_use]
	pub fn sql(&self) -> String {
		let mut sql = format!(
			"SELECT zoom_level AS z, tile_column AS x, tile_row AS y FROM {}",
			self.table_name()
		);
		if self.variant == SchemaVariant::Indexed {
			sql.push_str(" WHERE tile_id IS NOT NULL");
		}
		sql
	}
}
