//! Raw tile index rows as stored in MBTiles.

use crate::{MAX_LEVEL, StoreError, TileCoord};

/// One row of the tile index, exactly as the store returned it.
///
/// MBTiles rows use TMS numbering, so `row` counts from the bottom of the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRow {
	pub zoom: i64,
	pub column: i64,
	pub row: i64,
}

impl TileRow {
	#[must_use]
	pub fn new(zoom: i64, column: i64, row: i64) -> TileRow {
		TileRow { zoom, column, row }
	}

	/// Convert to an XYZ [`TileCoord`], flipping the row: `y = 2^zoom - 1 - row`.
	///
	/// # Errors
	/// Returns [`StoreError::InvalidRow`] if the zoom is outside `0..=31`, the row lies outside
	/// `0..2^zoom` or the column is negative or does not fit in `u32`. The column is not checked
	/// against the zoom: it passes through unchanged.
	pub fn to_coord(&self) -> Result<TileCoord, StoreError> {
		let invalid = || StoreError::InvalidRow {
			zoom: self.zoom,
			column: self.column,
			row: self.row,
		};

		let level = u8::try_from(self.zoom).map_err(|_| invalid())?;
		if level > MAX_LEVEL {
			return Err(invalid());
		}
		let x = u32::try_from(self.column).map_err(|_| invalid())?;
		let y = u32::try_from(self.row).map_err(|_| invalid())?;

		if u64::from(y) >= 1u64 << level {
			return Err(invalid());
		}

		Ok(TileCoord { level, x, y }.flipped_y())
	}
}
