//! Map SQLite errors onto [`StoreError`].

use anyhow::anyhow;
use r2d2_sqlite::rusqlite::{self, ErrorCode};
use zxystream_core::StoreError;

const NO_SUCH_TABLE: &str = "no such table: ";

/// Classify a SQLite error.
///
/// A generic `SQLITE_ERROR` whose message reads `no such table: <name>` becomes
/// [`StoreError::TableNotFound`]; everything else is passed on as [`StoreError::Other`].
pub fn classify(err: rusqlite::Error) -> StoreError {
	if err.sqlite_error_code() == Some(ErrorCode::Unknown) {
		let message = err.to_string();
		if let Some(start) = message.find(NO_SUCH_TABLE) {
			let table = message[start + NO_SUCH_TABLE.len()..]
				.split_whitespace()
				.next()
				.unwrap_or_default();
			return StoreError::TableNotFound(table.to_string());
		}
	}
	StoreError::Other(err.into())
}

/// Wrap a connection pool failure, keeping the pool's message.
pub fn pool_error(err: r2d2::Error) -> StoreError {
	StoreError::Other(anyhow!("failed to get a SQLite connection from the pool: {err}"))
}
