use crate::plt::bytes::Cursor;
use crate::{Error, Result};

const CHUNK_HEADER_SIZE: usize = 8;

/// Result of asking for the next child chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStatus {
	/// A child chunk with this id is now open.
	Open(u32),
	/// The enclosing chunk, or the stream at top level, has no more children.
	End,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
	id: u32,
	end: usize,
}

/// Reader for nested `id, size, payload` chunks.
///
/// Every [`ChunkStatus::Open`] must be paired with one [`ChunkReader::close_chunk`]. Typed reads
/// are bounded by the innermost open chunk.
pub struct ChunkReader<'a> {
	cursor: Cursor<'a>,
	frames: Vec<Frame>,
	opened: usize,
}

impl<'a> ChunkReader<'a> {
	/// Read chunks from `bytes`, which must start at a chunk header.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self {
			cursor: Cursor::new(bytes),
			frames: Vec::new(),
			opened: 0,
		}
	}

	/// Open the next child of the current chunk.
	pub fn open_chunk(&mut self) -> Result<ChunkStatus> {
		let limit = self.limit();
		let at = self.cursor.pos();
		if at >= limit {
			return Ok(ChunkStatus::End);
		}

		if limit - at < CHUNK_HEADER_SIZE {
			if limit == self.cursor.end() {
				return Err(Error::UnexpectedEof {
					at,
					need: CHUNK_HEADER_SIZE,
					rem: limit - at,
				});
			}
			let id = self.frames.last().map(|frame| frame.id).unwrap_or_default();
			return Err(Error::ChunkOutOfBounds {
				id,
				at,
				over: CHUNK_HEADER_SIZE - (limit - at),
			});
		}

		let id = self.cursor.read_u32_le()?;
		let size = self.cursor.read_u32_le()? as usize;
		let start = self.cursor.pos();
		let rem = self.cursor.remaining();
		if size > rem {
			return Err(Error::ChunkTruncated { id, at, size, rem });
		}
		let end = start + size;
		if end > limit {
			return Err(Error::ChunkOutOfBounds { id, at, over: end - limit });
		}

		self.frames.push(Frame { id, end });
		self.opened += 1;
		Ok(ChunkStatus::Open(id))
	}

	/// Id of the innermost open chunk.
	pub fn chunk_id(&self) -> Option<u32> {
		self.frames.last().map(|frame| frame.id)
	}

	/// Close the innermost chunk, skipping any unread payload.
	pub fn close_chunk(&mut self) -> Result<()> {
		let frame = self.frames.pop().ok_or(Error::UnbalancedChunks { depth: 0 })?;
		self.cursor.seek(frame.end);
		Ok(())
	}

	/// Close chunks until only `depth` remain open.
	pub fn close_to(&mut self, depth: usize) -> Result<()> {
		while self.frames.len() > depth {
			self.close_chunk()?;
		}
		Ok(())
	}

	/// Number of chunks currently open.
	pub fn depth(&self) -> usize {
		self.frames.len()
	}

	/// Number of chunks opened since creation.
	pub fn opened(&self) -> usize {
		self.opened
	}

	/// Check that every opened chunk was closed.
	pub fn finish(&self) -> Result<()> {
		if self.frames.is_empty() {
			Ok(())
		} else {
			Err(Error::UnbalancedChunks { depth: self.frames.len() })
		}
	}

	/// Take the unread payload of the current chunk as raw bytes.
	pub fn read_payload(&mut self) -> Result<&'a [u8]> {
		let len = self.remaining();
		self.cursor.read_exact(len)
	}

	/// Unread payload bytes of the current chunk.
	pub fn remaining(&self) -> usize {
		self.limit().saturating_sub(self.cursor.pos())
	}

	/// Read a `u32`.
	pub fn read_u32(&mut self) -> Result<u32> {
		self.ensure(4)?;
		self.cursor.read_u32_le()
	}

	/// Read an `i32`.
	pub fn read_i32(&mut self) -> Result<i32> {
		self.ensure(4)?;
		self.cursor.read_i32_le()
	}

	/// Read an `f32`.
	pub fn read_f32(&mut self) -> Result<f32> {
		self.ensure(4)?;
		self.cursor.read_f32_le()
	}

	/// Read a fixed-width name.
	pub fn read_name(&mut self) -> Result<String> {
		self.ensure(crate::plt::tags::NAME_SIZE)?;
		self.cursor.read_name()
	}

	/// Read `count` `i32` values.
	pub fn read_i32s(&mut self, count: usize) -> Result<Vec<i32>> {
		self.ensure(count.saturating_mul(4))?;
		let mut out = Vec::new();
		out.try_reserve_exact(count)?;
		for _ in 0..count {
			out.push(self.cursor.read_i32_le()?);
		}
		Ok(out)
	}

	/// Read `count` `u32` values.
	pub fn read_u32s(&mut self, count: usize) -> Result<Vec<u32>> {
		self.ensure(count.saturating_mul(4))?;
		let mut out = Vec::new();
		out.try_reserve_exact(count)?;
		for _ in 0..count {
			out.push(self.cursor.read_u32_le()?);
		}
		Ok(out)
	}

	/// Read `count` `f32` values.
	pub fn read_f32s(&mut self, count: usize) -> Result<Vec<f32>> {
		self.ensure(count.saturating_mul(4))?;
		let mut out = Vec::new();
		out.try_reserve_exact(count)?;
		for _ in 0..count {
			out.push(self.cursor.read_f32_le()?);
		}
		Ok(out)
	}

	/// Read the rest of the current chunk as `f32` values.
	pub fn read_f32_block(&mut self) -> Result<Vec<f32>> {
		self.read_f32s(self.remaining() / 4)
	}

	fn limit(&self) -> usize {
		self.frames.last().map_or(self.cursor.end(), |frame| frame.end)
	}

	fn ensure(&self, need: usize) -> Result<()> {
		if need > self.remaining() {
			let at = self.cursor.pos();
			return match self.frames.last() {
				Some(frame) => Err(Error::ChunkUnderflow { id: frame.id, at, need }),
				None => Err(Error::UnexpectedEof {
					at,
					need,
					rem: self.remaining(),
				}),
			};
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests;
