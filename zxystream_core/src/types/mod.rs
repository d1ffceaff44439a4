//! Contains coordinates, raw rows, schema variants and the scan query.

mod scan_query;
pub use scan_query::*;

mod schema_variant;
pub use schema_variant::*;

mod tile_coord;
pub use tile_coord::*;

mod tile_row;
pub use tile_row::*;
