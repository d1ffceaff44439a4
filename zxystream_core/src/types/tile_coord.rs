//! Tile coordinates in the XYZ convention
//!
//! A [`TileCoord`] addresses one tile of a Web Mercator pyramid by zoom level and column/row
//! index. Rows count from the top of the map (XYZ). MBTiles stores rows counting from the
//! bottom (TMS); [`TileCoord::flip_y`] converts between the two.
//!
//! # Examples
//!
//! ```
//! use zxystream_core::TileCoord;
//!
//! let mut coord = TileCoord::new(3, 1, 2).unwrap();
//! coord.flip_y();
//! assert_eq!(coord.y, 5);
//! assert_eq!(coord.to_string(), "3/1/5");
//! ```

use anyhow::{Result, ensure};
use std::fmt::{self, Debug, Display};

/// Highest zoom level a coordinate may carry.
pub const MAX_LEVEL: u8 = 31;

/// A tile coordinate with zoom level, x (column) and y (row) index.
#[derive(Eq, PartialEq, Clone, Hash, Copy)]
pub struct TileCoord {
	/// The zoom level of the tile.
	pub level: u8,
	/// The x index of the tile.
	pub x: u32,
	/// The y index of the tile.
	pub y: u32,
}

impl TileCoord {
	/// Create a new `TileCoord` at the given zoom `level` and tile indices `x`, `y`.
	///
	/// # Errors
	/// Returns an error if `level` > 31 or if `x`/`y` lie outside `0..2^level`.
	pub fn new(level: u8, x: u32, y: u32) -> Result<TileCoord> {
		ensure!(level <= MAX_LEVEL, "level ({level}) must be <= {MAX_LEVEL}");
		let max = 1u64 << level;
		ensure!(u64::from(x) < max, "x ({x}) out of bounds for level {level}");
		ensure!(u64::from(y) < max, "y ({y}) out of bounds for level {level}");
		Ok(TileCoord { level, x, y })
	}

	/// Get the maximum valid x or y index for this tile's zoom level, `2^level - 1`.
	///
	/// ```
	/// use zxystream_core::TileCoord;
	///
	/// assert_eq!(TileCoord::new(5, 10, 15).unwrap().max_value(), 31);
	/// assert_eq!(TileCoord::new(0, 0, 0).unwrap().max_value(), 0);
	/// ```
	#[must_use]
	pub fn max_value(&self) -> u32 {
		((1u64 << self.level) - 1) as u32
	}

	/// Flip the y index vertically within the tile grid (TMS <-> XYZ).
	///
	/// Applying it twice restores the original coordinate.
	pub fn flip_y(&mut self) {
		self.y = self.max_value() - self.y;
	}

	/// Return a copy with the y index flipped.
	#[must_use]
	pub fn flipped_y(mut self) -> TileCoord {
		self.flip_y();
		self
	}
}

/// Formats as `z/x/y`, the line format of the coordinate stream.
impl Display for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}/{}", self.level, self.x, self.y)
	}
}

impl Debug for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_fmt(format_args!("TileCoord({}, [{}, {}])", &self.level, &self.x, &self.y))
	}
}
