use std::borrow::Cow;

use crate::Error;
use crate::plt::compression::{Compression, SectionDecoder};

#[test]
fn header_codes_map_to_modes() {
	assert_eq!(Compression::from_code(0).expect("known"), Compression::None);
	assert_eq!(Compression::from_code(1).expect("known"), Compression::Zstd);
	assert_eq!(Compression::Zstd.code(), 1);
	assert!(matches!(Compression::from_code(7), Err(Error::UnsupportedCompression { code: 7 })));
}

#[test]
fn raw_sections_are_borrowed() {
	let payload = [1_u8, 2, 3, 4];
	let mut decoder = SectionDecoder::new(Compression::None, 2);
	let bytes = decoder.decode(0x10, &payload).expect("raw payload");
	assert!(matches!(bytes, Cow::Borrowed(_)));
	assert_eq!(&*bytes, &payload);
	assert_eq!(decoder.decoded_bytes(), 0);
}

#[test]
fn zstd_sections_are_inflated() {
	let body: Vec<u8> = (0..200).map(|i| (i % 7) as u8).collect();
	let frame = zstd::encode_all(body.as_slice(), 3).expect("zstd encodes");
	let mut decoder = SectionDecoder::new(Compression::Zstd, 1024);
	assert_eq!(&*decoder.decode(0x10, &frame).expect("frame decodes"), body.as_slice());
	assert_eq!(decoder.decoded_bytes(), 200);
}

#[test]
fn decoded_budget_spans_sections() {
	let body = vec![9_u8; 300];
	let frame = zstd::encode_all(body.as_slice(), 3).expect("zstd encodes");
	let mut decoder = SectionDecoder::new(Compression::Zstd, 500);
	decoder.decode(0x10, &frame).expect("first section fits");
	assert!(matches!(decoder.decode(0x20, &frame), Err(Error::DecompressedTooLarge { limit: 500 })));
}

#[test]
fn uncompressed_payload_in_compressed_archive_is_rejected() {
	let mut decoder = SectionDecoder::new(Compression::Zstd, 1024);
	assert!(matches!(decoder.decode(0x20, &[0, 0, 0, 0]), Err(Error::NotZstdSection { id: 0x20 })));
}

#[test]
fn cut_frame_is_a_decode_error() {
	let body: Vec<u8> = (0..4096_u32).flat_map(|i| i.to_le_bytes()).collect();
	let frame = zstd::encode_all(body.as_slice(), 3).expect("zstd encodes");
	let mut decoder = SectionDecoder::new(Compression::Zstd, usize::MAX);
	let err = decoder.decode(0x20, &frame[..frame.len() / 2]).expect_err("frame is incomplete");
	assert!(matches!(err, Error::SectionDecode { id: 0x20, .. }));
}
