//! Streams the tile coordinates of an MBTiles tile index as `z/x/y` lines.
//!
//! The pieces:
//! - [`TileStore`] / [`TileRows`]: what a store has to offer (index introspection and a row scan),
//! - [`CoordCursor`]: the lazy, batch-wise, pull-driven state machine over a store,
//! - [`CoordStream`]: a `futures` stream over the cursor plus consumers,
//! - [`TileCoord`], [`TileRow`], [`SchemaVariant`], [`ScanQuery`]: the data model,
//! - [`MockTileStore`]: an in-memory store for tests and examples.

mod config;
pub use config::*;

mod cursor;
pub use cursor::*;

mod error;
pub use error::*;

mod mock;
pub use mock::*;

mod store;
pub use store::*;

mod stream;
pub use stream::*;

pub mod types;
pub use types::*;
