//! The two MBTiles layouts a tile index can live in.

use std::fmt::Display;

/// Where the tile index of an MBTiles database lives.
///
/// Deduplicating writers store tiles in a `map` table (coordinates plus `tile_id`) joined with an
/// `images` table, and create an index on `map`. Simple writers use a flat `tiles` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaVariant {
	/// Coordinates come from the indexed `map` table, rows without `tile_id` are skipped.
	Indexed,
	/// Coordinates come from the flat `tiles` table (or view).
	Plain,
}

impl SchemaVariant {
	/// Pick the variant from the number of indices found on the `map` table.
	#[must_use]
	pub fn from_index_count(count: u64) -> SchemaVariant {
		if count >= 1 {
			SchemaVariant::Indexed
		} else {
			SchemaVariant::Plain
		}
	}

	/// Name of the table holding the coordinates.
	#[must_use]
	pub fn table_name(&self) -> &'static str {
		match self {
			SchemaVariant::Indexed => "map",
			SchemaVariant::Plain => "tiles",
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			SchemaVariant::Indexed => "indexed",
			SchemaVariant::Plain => "plain",
		}
	}
}

impl Display for SchemaVariant {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
