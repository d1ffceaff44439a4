use crate::{StoreError, TileRows};

/// How a batch read stopped.
#[derive(Debug)]
pub(super) enum BatchEnd {
	/// `batch_size` rows were read, more may follow.
	Full,
	/// The iteration ran out of rows.
	Exhausted,
	/// Reading or converting a row failed. `lines` holds the rows before the failure.
	Failed(StoreError),
}

#[derive(Debug)]
pub(super) struct Batch {
	pub lines: String,
	pub count: usize,
	pub end: BatchEnd,
}

/// Read up to `batch_size` rows and render each as a `z/x/y` line with the row flipped to XYZ.
///
/// A line is only appended once its row converted cleanly.
pub(super) fn read_batch<R: TileRows>(rows: &mut R, batch_size: usize) -> Batch {
	let mut lines = String::new();
	let mut count = 0;

	while count < batch_size {
		let coord = match rows.next_row() {
			Ok(Some(row)) => row.to_coord(),
			Ok(None) => {
				return Batch {
					lines,
					count,
					end: BatchEnd::Exhausted,
				};
			}
			Err(err) => Err(err),
		};

		match coord {
			Ok(coord) => {
				lines.push_str(&format!("{coord}\n"));
				count += 1;
			}
			Err(err) => {
				return Batch {
					lines,
					count,
					end: BatchEnd::Failed(err),
				};
			}
		}
	}

	Batch {
		lines,
		count,
		end: BatchEnd::Full,
	}
}
