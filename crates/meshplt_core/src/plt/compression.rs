use std::borrow::Cow;
use std::io::Read;

use crate::{Error, Result};

/// Default ceiling on decompressed section bytes per load.
pub const MAX_DECOMPRESSED_BYTES: usize = 1024 * 1024 * 1024;
/// zstd frame magic every compressed section payload starts with.
pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Compression of mesh and state sections, as declared by the archive header.
///
/// The root section is always raw so the header can be read before anything is decoded. Each
/// later section payload is compressed on its own, which keeps a cut-off file readable up to the
/// last whole section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
	/// Section payloads are stored as is.
	#[default]
	None,
	/// Each section payload is one zstd frame.
	Zstd,
}

impl Compression {
	/// Parse the header's compression code.
	pub fn from_code(code: u32) -> Result<Self> {
		match code {
			0 => Ok(Self::None),
			1 => Ok(Self::Zstd),
			_ => Err(Error::UnsupportedCompression { code }),
		}
	}

	/// Header code of this mode.
	pub fn code(self) -> u32 {
		match self {
			Self::None => 0,
			Self::Zstd => 1,
		}
	}

	/// Render compression mode as a stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::None => "none",
			Self::Zstd => "zstd",
		}
	}
}

/// Turns top-level section payloads back into chunk streams.
///
/// Decoded output is counted across the whole load against one byte ceiling.
#[derive(Debug, Clone)]
pub struct SectionDecoder {
	compression: Compression,
	limit: usize,
	used: usize,
}

impl SectionDecoder {
	/// Decoder for sections stored with `compression`, allowed `limit` decoded bytes in total.
	pub fn new(compression: Compression, limit: usize) -> Self {
		Self {
			compression,
			limit,
			used: 0,
		}
	}

	/// Mode this decoder applies.
	pub fn compression(&self) -> Compression {
		self.compression
	}

	/// Bytes inflated so far.
	pub fn decoded_bytes(&self) -> usize {
		self.used
	}

	/// Chunk bytes of section `id`; raw payloads are borrowed unchanged.
	pub fn decode<'a>(&mut self, id: u32, payload: &'a [u8]) -> Result<Cow<'a, [u8]>> {
		match self.compression {
			Compression::None => Ok(Cow::Borrowed(payload)),
			Compression::Zstd => {
				if !payload.starts_with(&ZSTD_MAGIC) {
					return Err(Error::NotZstdSection { id });
				}
				let out = inflate(id, payload, self.limit.saturating_sub(self.used), self.limit)?;
				self.used += out.len();
				Ok(Cow::Owned(out))
			}
		}
	}
}

fn inflate(id: u32, payload: &[u8], budget: usize, limit: usize) -> Result<Vec<u8>> {
	let mut decoder = zstd::stream::read::Decoder::new(payload)?;
	let mut out = Vec::new();
	let mut buf = [0_u8; 8192];

	loop {
		let read = decoder.read(&mut buf).map_err(|source| Error::SectionDecode { id, source })?;
		if read == 0 {
			break;
		}

		if out.len() + read > budget {
			return Err(Error::DecompressedTooLarge { limit });
		}

		out.try_reserve(read)?;
		out.extend_from_slice(&buf[..read]);
	}

	Ok(out)
}

#[cfg(test)]
mod tests;
