//! Row iteration over an MBTiles scan.
//!
//! A rusqlite statement borrows its connection and its rows borrow the statement, so an open
//! scan cannot be handed around as an owned value. [`MBTilesRows`] keeps all three on a
//! dedicated worker thread instead and talks to it over bounded channels: the worker prepares
//! the statement, reports whether that worked, and then reads only when asked, `fetch_size`
//! rows at a time. Dropping [`MBTilesRows`] disconnects the channels, which ends the worker and
//! returns the connection to the pool.

use crate::classify;
use r2d2::PooledConnection;
use r2d2_sqlite::{
	SqliteConnectionManager,
	rusqlite::{self, Connection, Row, Rows},
};
use std::{
	collections::VecDeque,
	sync::mpsc::{self, Receiver, SyncSender},
	thread,
};
use zxystream_core::{ScanQuery, StoreError, TileRow, TileRows};

/// Rows read by the worker for one request, and how the scan ended if it did.
struct Fetched {
	rows: Vec<TileRow>,
	end: Option<Result<(), StoreError>>,
}

/// Forward-only iterator over the rows of one MBTiles scan.
pub struct MBTilesRows {
	requests: SyncSender<usize>,
	replies: Receiver<Fetched>,
	buffer: VecDeque<TileRow>,
	end: Option<Result<(), StoreError>>,
	finished: bool,
	fetch_size: usize,
}

impl MBTilesRows {
	/// Start a scan worker for `query` on `conn`.
	///
	/// Returns once the statement is prepared, so a missing table surfaces here as
	/// [`StoreError::TableNotFound`].
	pub(crate) fn spawn(
		conn: PooledConnection<SqliteConnectionManager>,
		query: &ScanQuery,
	) -> Result<MBTilesRows, StoreError> {
		let sql = query.sql();
		let fetch_size = query.fetch_size.max(1);

		let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<(), StoreError>>(1);
		let (request_tx, request_rx) = mpsc::sync_channel::<usize>(1);
		let (reply_tx, reply_rx) = mpsc::sync_channel::<Fetched>(1);

		thread::Builder::new()
			.name(format!("mbtiles-scan-{}", query.table_name()))
			.spawn(move || scan_worker(&conn, &sql, &ready_tx, &request_rx, &reply_tx))
			.map_err(|err| StoreError::Other(anyhow::Error::new(err).context("failed to spawn scan worker")))?;

		ready_rx
			.recv()
			.map_err(|_| StoreError::Interrupted("scan worker exited before preparing the query".to_string()))??;

		Ok(MBTilesRows {
			requests: request_tx,
			replies: reply_rx,
			buffer: VecDeque::with_capacity(fetch_size),
			end: None,
			finished: false,
			fetch_size,
		})
	}

	fn request(&mut self) -> Result<(), StoreError> {
		let interrupted = || StoreError::Interrupted("scan worker stopped".to_string());
		self.requests.send(self.fetch_size).map_err(|_| interrupted())?;
		let fetched = self.replies.recv().map_err(|_| interrupted())?;
		log::trace!("fetched {} rows", fetched.rows.len());
		self.buffer.extend(fetched.rows);
		self.end = fetched.end;
		Ok(())
	}
}

impl TileRows for MBTilesRows {
	fn next_row(&mut self) -> Result<Option<TileRow>, StoreError> {
		loop {
			if let Some(row) = self.buffer.pop_front() {
				return Ok(Some(row));
			}
			if self.finished {
				return Ok(None);
			}
			if let Some(end) = self.end.take() {
				self.finished = true;
				return end.map(|()| None);
			}
			if let Err(err) = self.request() {
				self.finished = true;
				return Err(err);
			}
		}
	}
}

impl std::fmt::Debug for MBTilesRows {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MBTilesRows")
			.field("buffered", &self.buffer.len())
			.field("finished", &self.finished)
			.field("fetch_size", &self.fetch_size)
			.finish()
	}
}

fn scan_worker(
	conn: &Connection,
	sql: &str,
	ready: &SyncSender<Result<(), StoreError>>,
	requests: &Receiver<usize>,
	replies: &SyncSender<Fetched>,
) {
	log::trace!("SQL: {sql}");

	let mut stmt = match conn.prepare(sql) {
		Ok(stmt) => stmt,
		Err(err) => {
			let _ = ready.send(Err(classify::classify(err)));
			return;
		}
	};
	let mut rows = match stmt.query([]) {
		Ok(rows) => rows,
		Err(err) => {
			let _ = ready.send(Err(classify::classify(err)));
			return;
		}
	};
	if ready.send(Ok(())).is_err() {
		return;
	}

	for fetch_size in requests {
		let fetched = fetch(&mut rows, fetch_size);
		let done = fetched.end.is_some();
		if replies.send(fetched).is_err() || done {
			return;
		}
	}
}

fn fetch(rows: &mut Rows<'_>, fetch_size: usize) -> Fetched {
	let mut fetched = Fetched {
		rows: Vec::with_capacity(fetch_size),
		end: None,
	};

	while fetched.rows.len() < fetch_size {
		match rows.next().and_then(|row| row.map(read_row).transpose()) {
			Ok(Some(row)) => fetched.rows.push(row),
			Ok(None) => {
				fetched.end = Some(Ok(()));
				break;
			}
			Err(err) => {
				fetched.end = Some(Err(classify::classify(err)));
				break;
			}
		}
	}

	fetched
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<TileRow> {
	Ok(TileRow::new(row.get("z")?, row.get("x")?, row.get("y")?))
}
