use crate::plt::tags::NAME_SIZE;
use crate::{Error, Result};

/// Simple bounded cursor over an immutable little-endian byte slice.
pub struct Cursor<'a> {
	bytes: &'a [u8],
	pos: usize,
}

impl<'a> Cursor<'a> {
	/// Create a cursor at position 0.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self { bytes, pos: 0 }
	}

	/// Return current byte offset.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Offset one past the last byte.
	pub fn end(&self) -> usize {
		self.bytes.len()
	}

	/// Return remaining unread bytes.
	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.pos)
	}

	/// Move to `pos`, clamped to the end of the slice.
	pub fn seek(&mut self, pos: usize) {
		self.pos = pos.min(self.bytes.len());
	}

	/// Read exactly `n` bytes and advance cursor.
	pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
		if n > self.remaining() {
			return Err(Error::UnexpectedEof {
				at: self.pos,
				need: n,
				rem: self.remaining(),
			});
		}

		let start = self.pos;
		self.pos += n;
		Ok(&self.bytes[start..self.pos])
	}

	/// Read a little-endian `u32`.
	pub fn read_u32_le(&mut self) -> Result<u32> {
		let raw = self.read_exact(4)?;
		let mut buf = [0_u8; 4];
		buf.copy_from_slice(raw);
		Ok(u32::from_le_bytes(buf))
	}

	/// Read a little-endian `i32`.
	pub fn read_i32_le(&mut self) -> Result<i32> {
		let raw = self.read_exact(4)?;
		let mut buf = [0_u8; 4];
		buf.copy_from_slice(raw);
		Ok(i32::from_le_bytes(buf))
	}

	/// Read a little-endian `f32`.
	pub fn read_f32_le(&mut self) -> Result<f32> {
		let raw = self.read_exact(4)?;
		let mut buf = [0_u8; 4];
		buf.copy_from_slice(raw);
		Ok(f32::from_le_bytes(buf))
	}

	/// Read a zero-padded fixed-width name, trimming at the first NUL.
	pub fn read_name(&mut self) -> Result<String> {
		let raw = self.read_exact(NAME_SIZE)?;
		let end = raw.iter().position(|byte| *byte == 0).unwrap_or(raw.len());
		Ok(String::from_utf8_lossy(&raw[..end]).into_owned())
	}
}
