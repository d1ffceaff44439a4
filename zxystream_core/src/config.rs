/// Number of coordinates emitted per chunk unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Construction-time settings of a [`CoordCursor`](crate::CoordCursor).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CursorConfig {
	/// Maximum number of rows read and emitted per pull.
	pub batch_size: usize,
}

impl CursorConfig {
	pub fn with_batch_size(batch_size: usize) -> Self {
		Self { batch_size }
	}
}

impl Default for CursorConfig {
	fn default() -> Self {
		Self {
			batch_size: DEFAULT_BATCH_SIZE,
		}
	}
}
