//! MBTiles (SQLite) backend for `zxystream_core`.
//!
//! [`MBTilesStore`] opens an MBTiles file read-only and implements
//! [`TileStore`](zxystream_core::TileStore); [`MBTilesRows`] streams the rows of a scan from a
//! worker thread. [`classify`] maps SQLite errors onto
//! [`StoreError`](zxystream_core::StoreError).

mod classify;
pub use classify::*;

#[cfg(any(test, feature = "test"))]
mod fixture;
#[cfg(any(test, feature = "test"))]
pub use fixture::*;

mod rows;
pub use rows::*;

mod store;
pub use store::*;
