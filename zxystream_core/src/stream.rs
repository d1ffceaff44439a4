//! Stream adapter and consumers for coordinate chunks
//!
//! [`CoordStream`] wraps a [`CoordCursor`] into a `futures` stream. Each poll drives exactly one
//! [`pull`](CoordCursor::pull), so a consumer that stops polling stops the scan.

use crate::{CoordCursor, StoreError, TileStore};
use anyhow::Result;
use futures::{
	Stream, StreamExt,
	stream::{self, BoxStream},
};
use std::{
	pin::Pin,
	task::{Context, Poll},
};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// A stream of `z/x/y` line chunks, ending after the first error.
pub struct CoordStream<'a> {
	pub inner: BoxStream<'a, Result<String, StoreError>>,
}

impl CoordStream<'static> {
	pub fn from_cursor<S: TileStore>(cursor: CoordCursor<S>) -> Self {
		let inner = stream::unfold(cursor, |mut cursor| async move {
			let item = cursor.pull().await?;
			Some((item, cursor))
		});
		CoordStream { inner: inner.boxed() }
	}
}

impl CoordStream<'_> {
	/// Concatenate all chunks.
	///
	/// # Errors
	/// Returns the first store error.
	pub async fn into_string(mut self) -> Result<String, StoreError> {
		let mut text = String::new();
		while let Some(chunk) = self.inner.next().await {
			text.push_str(&chunk?);
		}
		Ok(text)
	}

	/// Count the lines of all chunks without keeping them.
	///
	/// # Errors
	/// Returns the first store error.
	pub async fn count_lines(mut self) -> Result<u64, StoreError> {
		let mut count = 0u64;
		while let Some(chunk) = self.inner.next().await {
			count += chunk?.bytes().filter(|b| *b == b'\n').count() as u64;
		}
		Ok(count)
	}

	/// Write every chunk to `writer` as soon as the previous one was accepted, then flush.
	///
	/// Returns the number of lines written.
	///
	/// # Errors
	/// Returns the first store error or any write error. Chunks before the failure have
	/// already been written.
	pub async fn write_to<W: AsyncWrite + Unpin>(mut self, writer: &mut W) -> Result<u64> {
		let mut count = 0u64;
		while let Some(chunk) = self.inner.next().await {
			let chunk = chunk?;
			count += chunk.bytes().filter(|b| *b == b'\n').count() as u64;
			writer.write_all(chunk.as_bytes()).await?;
		}
		writer.flush().await?;
		log::debug!("wrote {count} coordinates");
		Ok(count)
	}
}

impl Stream for CoordStream<'_> {
	type Item = Result<String, StoreError>;

	fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
		self.inner.poll_next_unpin(cx)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{MockFailure, MockTileStore, TileRow};

	fn fixture() -> MockTileStore {
		MockTileStore::plain(vec![
			TileRow::new(0, 0, 0),
			TileRow::new(1, 0, 0),
			TileRow::new(1, 1, 0),
		])
	}

	fn cursor(store: MockTileStore, batch_size: usize) -> CoordCursor<MockTileStore> {
		CoordCursor::builder()
			.store(store)
			.batch_size(batch_size)
			.build()
			.unwrap()
	}

	#[tokio::test]
	async fn yields_one_chunk_per_batch() {
		let chunks: Vec<String> = cursor(fixture(), 2)
			.into_stream()
			.map(|chunk| chunk.unwrap())
			.collect()
			.await;
		assert_eq!(chunks, ["0/0/0\n1/0/1\n", "1/1/1\n"]);
	}

	#[tokio::test]
	async fn into_string_and_count_lines() {
		assert_eq!(
			cursor(fixture(), 1).into_stream().into_string().await.unwrap(),
			"0/0/0\n1/0/1\n1/1/1\n"
		);
		assert_eq!(cursor(fixture(), 1).into_stream().count_lines().await.unwrap(), 3);
	}

	#[tokio::test]
	async fn ends_after_error() {
		let store = fixture().failing_after(2, MockFailure::Other("disk I/O error".into()));
		let items: Vec<_> = cursor(store, 1).into_stream().collect().await;
		assert_eq!(items.len(), 3);
		assert!(items[0].is_ok());
		assert!(items[1].is_ok());
		assert_eq!(items[2].as_ref().unwrap_err().to_string(), "disk I/O error");
	}

	#[tokio::test]
	async fn write_to_counts_lines() {
		let mut output: Vec<u8> = Vec::new();
		let count = cursor(fixture(), 2).into_stream().write_to(&mut output).await.unwrap();
		assert_eq!(count, 3);
		assert_eq!(String::from_utf8(output).unwrap(), "0/0/0\n1/0/1\n1/1/1\n");
	}

	#[tokio::test]
	async fn write_to_keeps_chunks_before_failure() {
		let store = fixture().failing_after(1, MockFailure::Other("disk I/O error".into()));
		let stream = cursor(store, 1).into_stream();
		let mut output: Vec<u8> = Vec::new();
		let err = stream.write_to(&mut output).await.unwrap_err();
		assert_eq!(err.to_string(), "disk I/O error");
		assert_eq!(output, b"0/0/0\n");
	}
}
