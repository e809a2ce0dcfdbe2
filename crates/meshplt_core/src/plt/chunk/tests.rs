use meshplt_testkit::ChunkBuilder;

use crate::plt::{ChunkReader, ChunkStatus};
use crate::{Error, ErrorKind};

fn nested(depth: u32) -> Vec<u8> {
	let mut out = ChunkBuilder::new();
	for id in 1..=depth {
		out.begin(id);
	}
	out.u32(0xDEAD_BEEF);
	for _ in 0..depth {
		out.end();
	}
	out.finish()
}

#[test]
fn nested_chunks_open_once_each_before_end() {
	let bytes = nested(5);
	let mut reader = ChunkReader::new(&bytes);

	let mut ids = Vec::new();
	for _ in 0..5 {
		match reader.open_chunk().expect("chunk opens") {
			ChunkStatus::Open(id) => ids.push(id),
			ChunkStatus::End => panic!("stream ended early"),
		}
	}
	assert_eq!(ids, vec![1, 2, 3, 4, 5]);
	assert_eq!(reader.opened(), 5);
	assert_eq!(reader.read_u32().expect("payload reads"), 0xDEAD_BEEF);
	assert_eq!(reader.open_chunk().expect("end reported"), ChunkStatus::End);

	for _ in 0..5 {
		reader.close_chunk().expect("chunk closes");
	}
	assert_eq!(reader.depth(), 0);
	assert_eq!(reader.open_chunk().expect("top-level end"), ChunkStatus::End);
	reader.finish().expect("balanced");
}

#[test]
fn forgotten_close_is_detected() {
	let bytes = nested(3);
	let mut reader = ChunkReader::new(&bytes);
	for _ in 0..3 {
		reader.open_chunk().expect("chunk opens");
	}
	reader.close_chunk().expect("inner closes");
	reader.close_chunk().expect("middle closes");

	let err = reader.finish().expect_err("outer chunk still open");
	assert!(matches!(err, Error::UnbalancedChunks { depth: 1 }));
}

#[test]
fn close_without_open_fails() {
	let mut reader = ChunkReader::new(&[]);
	assert_eq!(reader.open_chunk().expect("empty stream ends"), ChunkStatus::End);
	assert!(matches!(reader.close_chunk(), Err(Error::UnbalancedChunks { depth: 0 })));
}

#[test]
fn siblings_are_visited_in_order_and_unread_payload_is_skipped() {
	let mut out = ChunkBuilder::new();
	out.begin(10);
	out.leaf_u32(11, 7);
	out.leaf_f32s(12, &[1.0, 2.0, 3.0]);
	out.leaf_i32(13, -4);
	out.end();
	let bytes = out.finish();

	let mut reader = ChunkReader::new(&bytes);
	assert_eq!(reader.open_chunk().expect("parent"), ChunkStatus::Open(10));
	let mut seen = Vec::new();
	while let ChunkStatus::Open(id) = reader.open_chunk().expect("child") {
		seen.push(id);
		if id == 13 {
			assert_eq!(reader.read_i32().expect("value"), -4);
		}
		reader.close_chunk().expect("child closes");
	}
	reader.close_chunk().expect("parent closes");
	assert_eq!(seen, vec![11, 12, 13]);
	reader.finish().expect("balanced");
}

#[test]
fn reads_are_bounded_by_the_current_chunk() {
	let mut out = ChunkBuilder::new();
	out.leaf_u32(1, 5);
	out.leaf_u32(2, 6);
	let bytes = out.finish();

	let mut reader = ChunkReader::new(&bytes);
	reader.open_chunk().expect("first opens");
	assert_eq!(reader.read_u32().expect("value"), 5);
	let err = reader.read_u32().expect_err("second value belongs to the sibling");
	assert!(matches!(err, Error::ChunkUnderflow { id: 1, .. }));
	assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn chunk_past_end_of_stream_is_truncation() {
	let mut out = ChunkBuilder::new();
	out.leaf_f32s(1, &[1.0, 2.0, 3.0, 4.0]);
	let mut bytes = out.finish();
	bytes.truncate(bytes.len() - 6);

	let mut reader = ChunkReader::new(&bytes);
	let err = reader.open_chunk().expect_err("declared size exceeds stream");
	assert!(matches!(err, Error::ChunkTruncated { id: 1, size: 16, rem: 10, .. }));
	assert!(err.is_truncation());
}

#[test]
fn partial_header_at_stream_end_is_truncation() {
	let mut out = ChunkBuilder::new();
	out.leaf_u32(1, 1);
	let mut bytes = out.finish();
	bytes.extend_from_slice(&[2, 0, 0]);

	let mut reader = ChunkReader::new(&bytes);
	reader.open_chunk().expect("first opens");
	reader.close_chunk().expect("first closes");
	let err = reader.open_chunk().expect_err("header is cut short");
	assert!(err.is_truncation());
}

#[test]
fn child_overrunning_parent_is_format_error() {
	let mut bytes = Vec::new();
	bytes.extend_from_slice(&1_u32.to_le_bytes());
	bytes.extend_from_slice(&12_u32.to_le_bytes());
	bytes.extend_from_slice(&2_u32.to_le_bytes());
	bytes.extend_from_slice(&8_u32.to_le_bytes());
	bytes.extend_from_slice(&[0; 8]);

	let mut reader = ChunkReader::new(&bytes);
	reader.open_chunk().expect("parent opens");
	let err = reader.open_chunk().expect_err("child overruns parent");
	assert!(matches!(err, Error::ChunkOutOfBounds { id: 2, over: 4, .. }));
	assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn names_stop_at_the_first_nul() {
	let mut out = ChunkBuilder::new();
	out.leaf_name(1, "stress");
	let bytes = out.finish();

	let mut reader = ChunkReader::new(&bytes);
	reader.open_chunk().expect("opens");
	assert_eq!(reader.read_name().expect("name"), "stress");
	assert_eq!(reader.remaining(), 0);
}

#[test]
fn close_to_unwinds_to_requested_depth() {
	let bytes = nested(4);
	let mut reader = ChunkReader::new(&bytes);
	reader.open_chunk().expect("outer opens");
	let depth = reader.depth();
	for _ in 0..3 {
		reader.open_chunk().expect("inner opens");
	}
	reader.close_to(depth).expect("unwinds");
	assert_eq!(reader.depth(), 1);
	reader.close_chunk().expect("outer closes");
	assert_eq!(reader.open_chunk().expect("stream ends"), ChunkStatus::End);
	reader.finish().expect("balanced");
}

#[test]
fn payload_is_taken_whole_and_chunk_still_closes() {
	let mut out = ChunkBuilder::new();
	out.begin(7).u32(1).u32(2).end().leaf_u32(8, 3);
	let bytes = out.finish();
	let mut reader = ChunkReader::new(&bytes);

	assert_eq!(reader.open_chunk().expect("chunk opens"), ChunkStatus::Open(7));
	assert_eq!(reader.read_u32().expect("first word"), 1);
	assert_eq!(reader.read_payload().expect("rest of payload"), &2_u32.to_le_bytes());
	assert_eq!(reader.remaining(), 0);
	reader.close_chunk().expect("chunk closes");
	assert_eq!(reader.open_chunk().expect("next chunk"), ChunkStatus::Open(8));
}
