use super::*;
use crate::{MockFailure, MockTileStore, TileRow};
use futures::FutureExt;
use pretty_assertions::assert_eq;
use regex::Regex;
use rstest::rstest;
use std::time::Duration;

const PLAIN_SQL: &str = "scan: SELECT zoom_level AS z, tile_column AS x, tile_row AS y FROM tiles";
const INDEXED_SQL: &str =
	"scan: SELECT zoom_level AS z, tile_column AS x, tile_row AS y FROM map WHERE tile_id IS NOT NULL";

fn five_rows() -> Vec<TileRow> {
	vec![
		TileRow::new(0, 0, 0),
		TileRow::new(1, 0, 0),
		TileRow::new(1, 1, 1),
		TileRow::new(3, 2, 5),
		TileRow::new(14, 8803, 11007),
	]
}

fn cursor(store: MockTileStore, batch_size: usize) -> CoordCursor<MockTileStore> {
	CoordCursor::builder()
		.store(store)
		.batch_size(batch_size)
		.build()
		.unwrap()
}

/// Pull until the end, collecting chunks and the failure, if any.
async fn drain(cursor: &mut CoordCursor<MockTileStore>) -> (Vec<String>, Option<StoreError>) {
	let mut chunks = Vec::new();
	while let Some(item) = cursor.pull().await {
		match item {
			Ok(chunk) => chunks.push(chunk),
			Err(err) => {
				assert!(cursor.pull().await.is_none(), "failure must be the last signal");
				return (chunks, Some(err));
			}
		}
	}
	(chunks, None)
}

#[tokio::test]
async fn scenario_flat_table_single_chunk() {
	let store = MockTileStore::plain(vec![TileRow::new(1, 0, 0), TileRow::new(1, 1, 0)]);
	let mut cursor = cursor(store, 1000);

	assert_eq!(cursor.pull().await.unwrap().unwrap(), "1/0/1\n1/1/1\n");
	assert_eq!(cursor.state(), CursorState::Draining);
	assert!(cursor.pull().await.is_none());
	assert_eq!(cursor.state(), CursorState::Closed);
}

#[tokio::test]
async fn lines_are_well_formed() {
	let (chunks, err) = drain(&mut cursor(MockTileStore::plain(five_rows()), 2)).await;
	assert!(err.is_none());

	let line = Regex::new(r"^\d+/\d+/\d+\n$").unwrap();
	for chunk in &chunks {
		for l in chunk.split_inclusive('\n') {
			assert!(line.is_match(l), "malformed line {l:?}");
		}
	}
}

#[tokio::test]
async fn keeps_order_across_chunks() {
	let (chunks, _) = drain(&mut cursor(MockTileStore::plain(five_rows()), 2)).await;
	assert_eq!(chunks, ["0/0/0\n1/0/1\n", "1/1/0\n3/2/2\n", "14/8803/5376\n"]);
}

#[rstest]
#[case(1, 5)]
#[case(2, 3)]
#[case(1000, 1)]
#[case(100_000, 1)]
#[tokio::test]
async fn batch_size_only_changes_segmentation(#[case] batch_size: usize, #[case] expected_chunks: usize) {
	let (chunks, err) = drain(&mut cursor(MockTileStore::plain(five_rows()), batch_size)).await;
	assert!(err.is_none());
	assert_eq!(chunks.len(), expected_chunks);
	assert_eq!(chunks.concat(), "0/0/0\n1/0/1\n1/1/0\n3/2/2\n14/8803/5376\n");
	for chunk in &chunks {
		assert!(chunk.lines().count() <= batch_size);
	}
}

#[tokio::test]
async fn exact_multiple_of_batch_size_ends_without_empty_chunk() {
	let rows = five_rows()[..4].to_vec();
	let (chunks, err) = drain(&mut cursor(MockTileStore::plain(rows), 2)).await;
	assert!(err.is_none());
	assert_eq!(chunks, ["0/0/0\n1/0/1\n", "1/1/0\n3/2/2\n"]);
}

#[tokio::test]
async fn empty_table_completes_without_chunks() {
	let mut cursor = cursor(MockTileStore::plain(vec![]), 10);
	assert!(cursor.pull().await.is_none());
	assert_eq!(cursor.state(), CursorState::Closed);
	assert_eq!(cursor.schema_variant(), Some(SchemaVariant::Plain));
}

#[tokio::test]
async fn missing_table_completes_without_chunks() {
	let store = MockTileStore::empty();
	let log = store.call_log();
	let mut cursor = cursor(store, 10);

	assert!(cursor.pull().await.is_none());
	assert_eq!(cursor.state(), CursorState::Closed);
	assert_eq!(log.calls(), ["count_map_indices", PLAIN_SQL]);
}

#[tokio::test]
async fn missing_map_table_of_indexed_store_completes() {
	let store = MockTileStore::indexed(vec![]).failing_scan(MockFailure::TableNotFound);
	let (chunks, err) = drain(&mut cursor(store, 10)).await;
	assert!(chunks.is_empty());
	assert!(err.is_none());
}

#[tokio::test]
async fn indexed_store_scans_map_with_predicate() {
	let store = MockTileStore::indexed(vec![(TileRow::new(2, 1, 1), None)]);
	let log = store.call_log();
	let mut cursor = cursor(store, 10);

	assert!(cursor.pull().await.is_none());
	assert_eq!(cursor.schema_variant(), Some(SchemaVariant::Indexed));
	assert_eq!(log.calls(), ["count_map_indices", INDEXED_SQL]);
}

#[tokio::test]
async fn indexed_store_emits_rows_with_tile_id() {
	let store = MockTileStore::indexed(vec![
		(TileRow::new(2, 1, 1), None),
		(TileRow::new(2, 3, 0), Some(1)),
		(TileRow::new(0, 0, 0), Some(2)),
	])
	.with_tiles(vec![TileRow::new(5, 5, 5)]);
	let (chunks, _) = drain(&mut cursor(store, 10)).await;
	assert_eq!(chunks, ["2/3/3\n0/0/0\n"]);
}

#[tokio::test]
async fn unindexed_map_table_falls_back_to_tiles() {
	let store = MockTileStore::indexed(vec![(TileRow::new(2, 3, 0), Some(1))])
		.with_map_index(false)
		.with_tiles(vec![TileRow::new(1, 1, 1)]);
	let log = store.call_log();
	let (chunks, _) = drain(&mut cursor(store, 10)).await;
	assert_eq!(chunks, ["1/1/0\n"]);
	assert_eq!(log.calls(), ["count_map_indices", PLAIN_SQL]);
}

#[tokio::test]
async fn detection_failure_fails_cursor() {
	let store = MockTileStore::plain(five_rows()).failing_detection(MockFailure::Other("database is locked".into()));
	let log = store.call_log();
	let mut cursor = cursor(store, 10);

	let err = cursor.pull().await.unwrap().unwrap_err();
	assert_eq!(err.to_string(), "database is locked");
	assert_eq!(cursor.state(), CursorState::Failed);
	assert!(cursor.pull().await.is_none());
	assert_eq!(log.calls(), ["count_map_indices"]);
}

#[tokio::test]
async fn scan_failure_fails_cursor() {
	let store = MockTileStore::plain(five_rows()).failing_scan(MockFailure::Other("malformed database schema".into()));
	let (chunks, err) = drain(&mut cursor(store, 10)).await;
	assert!(chunks.is_empty());
	assert_eq!(err.unwrap().to_string(), "malformed database schema");
}

#[tokio::test]
async fn missing_table_mid_scan_flushes_partial_chunk() {
	let store = MockTileStore::plain(five_rows()).failing_after(3, MockFailure::TableNotFound);
	let log = store.call_log();
	let mut cursor = cursor(store, 2);

	let (chunks, err) = drain(&mut cursor).await;
	assert!(err.is_none());
	assert_eq!(chunks, ["0/0/0\n1/0/1\n", "1/1/0\n"]);
	assert_eq!(cursor.state(), CursorState::Closed);
	assert_eq!(log.released(), 1);
}

#[tokio::test]
async fn failure_mid_scan_keeps_earlier_chunks() {
	let store = MockTileStore::plain(five_rows()).failing_after(3, MockFailure::Other("disk I/O error".into()));
	let log = store.call_log();
	let mut cursor = cursor(store, 2);

	let (chunks, err) = drain(&mut cursor).await;
	assert_eq!(chunks, ["0/0/0\n1/0/1\n"]);
	assert_eq!(err.unwrap().to_string(), "disk I/O error");
	assert_eq!(cursor.state(), CursorState::Failed);
	assert_eq!(log.released(), 1);
}

#[tokio::test]
async fn invalid_row_fails_cursor() {
	let store = MockTileStore::plain(vec![TileRow::new(1, 0, 0), TileRow::new(1, 0, 2)]);
	let (chunks, err) = drain(&mut cursor(store, 10)).await;
	assert!(chunks.is_empty());
	assert!(matches!(err, Some(StoreError::InvalidRow { zoom: 1, column: 0, row: 2 })));
}

#[tokio::test]
async fn column_is_not_bounded_by_zoom() {
	let store = MockTileStore::plain(vec![TileRow::new(1, 5, 0)]);
	let (chunks, err) = drain(&mut cursor(store, 10)).await;
	assert!(err.is_none());
	assert_eq!(chunks, ["1/5/1\n"]);
}

#[tokio::test]
async fn abandoned_pull_is_resumed() {
	let store = MockTileStore::plain(five_rows()).with_latency(Duration::from_millis(20));
	let log = store.call_log();
	let mut cursor = cursor(store, 2);

	assert!(cursor.pull().now_or_never().is_none());
	assert_eq!(cursor.state(), CursorState::Detecting);
	assert_eq!(cursor.pull().await.unwrap().unwrap(), "0/0/0\n1/0/1\n");

	assert!(cursor.pull().now_or_never().is_none());
	assert_eq!(cursor.state(), CursorState::Iterating);

	let (chunks, err) = drain(&mut cursor).await;
	assert!(err.is_none());
	assert_eq!(chunks, ["1/1/0\n3/2/2\n", "14/8803/5376\n"]);
	assert_eq!(log.calls(), ["count_map_indices", PLAIN_SQL]);
	assert_eq!(log.rows_read(), 5);
}

#[tokio::test]
async fn abandoned_pull_keeps_detected_variant() {
	let store = MockTileStore::indexed(vec![(TileRow::new(1, 1, 0), Some(1))]).with_latency(Duration::from_millis(50));
	let log = store.call_log();
	let mut cursor = cursor(store, 10);

	assert!(cursor.pull().now_or_never().is_none());
	std::thread::sleep(Duration::from_millis(500));
	assert!(cursor.pull().now_or_never().is_none());
	assert_eq!(cursor.state(), CursorState::Preparing);
	assert_eq!(cursor.schema_variant(), Some(SchemaVariant::Indexed));

	let (chunks, err) = drain(&mut cursor).await;
	assert!(err.is_none());
	assert_eq!(chunks, ["1/1/1\n"]);
	assert_eq!(log.calls(), ["count_map_indices", INDEXED_SQL]);
}

#[tokio::test]
async fn reads_only_what_was_pulled() {
	let store = MockTileStore::plain(five_rows());
	let log = store.call_log();
	let mut cursor = cursor(store, 2);

	assert_eq!(log.rows_read(), 0);
	cursor.pull().await.unwrap().unwrap();
	assert_eq!(log.rows_read(), 2);
	assert_eq!(cursor.state(), CursorState::Iterating);
	cursor.pull().await.unwrap().unwrap();
	assert_eq!(log.rows_read(), 4);
	assert_eq!(log.calls(), ["count_map_indices", PLAIN_SQL]);
}

#[tokio::test]
async fn releases_rows_on_close_and_on_drop() {
	let store = MockTileStore::plain(five_rows());
	let log = store.call_log();
	let mut closed = cursor(store.clone(), 100);
	drain(&mut closed).await;
	assert_eq!(log.released(), 1);

	let mut abandoned = cursor(store, 1);
	abandoned.pull().await.unwrap().unwrap();
	assert_eq!(log.released(), 1);
	drop(abandoned);
	assert_eq!(log.released(), 2);
}

#[tokio::test]
async fn terminal_states_stay_terminal() {
	let mut cursor = cursor(MockTileStore::plain(vec![TileRow::new(0, 0, 0)]), 10);
	drain(&mut cursor).await;
	for _ in 0..3 {
		assert!(cursor.pull().await.is_none());
		assert!(cursor.state().is_terminal());
	}
}

#[test]
fn debug_format() {
	let cursor = cursor(MockTileStore::empty(), 3);
	assert_eq!(
		format!("{cursor:?}"),
		"CoordCursor { state: Unstarted, variant: None, batch_size: 3 }"
	);
}

#[tokio::test]
async fn count_consumes_the_cursor() {
	assert_eq!(cursor(MockTileStore::plain(five_rows()), 2).count().await.unwrap(), 5);
	assert_eq!(cursor(MockTileStore::empty(), 2).count().await.unwrap(), 0);
}
