//! Shared test helpers for workspace crates.

use std::path::{Path, PathBuf};

/// Archive fixtures.
pub mod plt;

/// Resolve the workspace root path.
pub fn workspace_root() -> PathBuf {
	let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
	manifest_dir
		.join("..")
		.join("..")
		.canonicalize()
		.unwrap_or_else(|_| manifest_dir.join("..").join(".."))
}

/// Resolve the workspace target directory.
pub fn target_dir() -> PathBuf {
	std::env::var_os("CARGO_TARGET_DIR")
		.map(PathBuf::from)
		.unwrap_or_else(|| workspace_root().join("target"))
}

/// Resolve a scratch path under `<target>/meshplt-test/<name>`, creating the parent directory.
pub fn scratch_path(name: &str) -> PathBuf {
	let dir = target_dir().join("meshplt-test");
	std::fs::create_dir_all(&dir).expect("scratch dir is creatable");
	dir.join(name)
}

/// Little-endian writer for nested `id, size, payload` chunks.
///
/// Sizes are back-patched when a chunk is closed, so callers only have to keep
/// `begin`/`end` balanced.
#[derive(Debug, Default)]
pub struct ChunkBuilder {
	bytes: Vec<u8>,
	open: Vec<usize>,
}

impl ChunkBuilder {
	/// Start an empty stream.
	pub fn new() -> Self {
		Self::default()
	}

	/// Start a stream with a leading 4-byte file magic.
	pub fn with_magic(magic: u32) -> Self {
		let mut out = Self::new();
		out.bytes.extend_from_slice(&magic.to_le_bytes());
		out
	}

	/// Open a chunk with `id`.
	pub fn begin(&mut self, id: u32) -> &mut Self {
		self.bytes.extend_from_slice(&id.to_le_bytes());
		self.open.push(self.bytes.len());
		self.bytes.extend_from_slice(&0_u32.to_le_bytes());
		self
	}

	/// Close the innermost open chunk and patch its size.
	pub fn end(&mut self) -> &mut Self {
		let at = self.open.pop().expect("end() without matching begin()");
		let size = (self.bytes.len() - at - 4) as u32;
		self.bytes[at..at + 4].copy_from_slice(&size.to_le_bytes());
		self
	}

	/// Write a leaf chunk holding one `u32`.
	pub fn leaf_u32(&mut self, id: u32, value: u32) -> &mut Self {
		self.begin(id).u32(value).end()
	}

	/// Write a leaf chunk holding one `i32`.
	pub fn leaf_i32(&mut self, id: u32, value: i32) -> &mut Self {
		self.begin(id).i32(value).end()
	}

	/// Write a leaf chunk holding one `f32`.
	pub fn leaf_f32(&mut self, id: u32, value: f32) -> &mut Self {
		self.begin(id).f32(value).end()
	}

	/// Write a leaf chunk holding a fixed-width 64-byte name.
	pub fn leaf_name(&mut self, id: u32, name: &str) -> &mut Self {
		self.begin(id).name(name).end()
	}

	/// Write a leaf chunk holding a run of `f32` values.
	pub fn leaf_f32s(&mut self, id: u32, values: &[f32]) -> &mut Self {
		self.begin(id).f32s(values).end()
	}

	/// Write a leaf chunk holding a run of `i32` values.
	pub fn leaf_i32s(&mut self, id: u32, values: &[i32]) -> &mut Self {
		self.begin(id).i32s(values).end()
	}

	/// Append raw bytes.
	pub fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
		self.bytes.extend_from_slice(bytes);
		self
	}

	/// Append a raw `u32`.
	pub fn u32(&mut self, value: u32) -> &mut Self {
		self.bytes.extend_from_slice(&value.to_le_bytes());
		self
	}

	/// Append a raw `i32`.
	pub fn i32(&mut self, value: i32) -> &mut Self {
		self.bytes.extend_from_slice(&value.to_le_bytes());
		self
	}

	/// Append a raw `f32`.
	pub fn f32(&mut self, value: f32) -> &mut Self {
		self.bytes.extend_from_slice(&value.to_le_bytes());
		self
	}

	/// Append raw `f32` values.
	pub fn f32s(&mut self, values: &[f32]) -> &mut Self {
		for value in values {
			self.f32(*value);
		}
		self
	}

	/// Append raw `i32` values.
	pub fn i32s(&mut self, values: &[i32]) -> &mut Self {
		for value in values {
			self.i32(*value);
		}
		self
	}

	/// Append a zero-padded 64-byte name.
	pub fn name(&mut self, name: &str) -> &mut Self {
		let mut buf = [0_u8; 64];
		let take = name.len().min(63);
		buf[..take].copy_from_slice(&name.as_bytes()[..take]);
		self.bytes.extend_from_slice(&buf);
		self
	}

	/// Number of chunks still open.
	pub fn depth(&self) -> usize {
		self.open.len()
	}

	/// Current stream length in bytes.
	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	/// Whether nothing has been written yet.
	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}

	/// Finish the stream; all chunks must be closed.
	pub fn finish(&self) -> Vec<u8> {
		assert!(self.open.is_empty(), "{} chunk(s) left open", self.open.len());
		self.bytes.clone()
	}
}
