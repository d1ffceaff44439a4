use std::fmt::Display;

/// Phase of a [`CoordCursor`](super::CoordCursor).
///
/// ```text
/// Unstarted -> Detecting -> Preparing -> Iterating -> (Draining) -> Closed
///                  \             \            \
///                   `-> Failed    `-> Failed   `-> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorState {
	/// Constructed, nothing asked of the store yet.
	Unstarted,
	/// Asking the store whether the `map` table is indexed.
	Detecting,
	/// Preparing the scan and opening the row iteration.
	Preparing,
	/// Emitting one chunk per pull.
	Iterating,
	/// The last chunk was emitted, the end of the sequence is pending.
	Draining,
	Closed,
	Failed,
}

impl CursorState {
	/// `Closed` and `Failed` are final; pulling in them has no effect.
	#[must_use]
	pub fn is_terminal(&self) -> bool {
		matches!(self, CursorState::Closed | CursorState::Failed)
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			CursorState::Unstarted => "unstarted",
			CursorState::Detecting => "detecting",
			CursorState::Preparing => "preparing",
			CursorState::Iterating => "iterating",
			CursorState::Draining => "draining",
			CursorState::Closed => "closed",
			CursorState::Failed => "failed",
		}
	}
}

impl Display for CursorState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
