use crate::plt::chunk::{ChunkReader, ChunkStatus};
use crate::plt::compression::Compression;
use crate::plt::tags;
use crate::{Error, Result};

/// Parsed archive header fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PltHeader {
	/// Archive format version.
	pub version: u32,
	/// Name of the writing software, when recorded.
	pub software: Option<String>,
	/// Compression of the sections after the root.
	pub compression: Compression,
}

impl PltHeader {
	/// Parse the children of an open header chunk.
	///
	/// Unknown header records are skipped.
	pub fn read(reader: &mut ChunkReader<'_>) -> Result<Self> {
		let mut header = Self::default();
		while let ChunkStatus::Open(id) = reader.open_chunk()? {
			match id {
				tags::HDR_VERSION => header.version = reader.read_u32()?,
				tags::HDR_COMPRESSION => header.compression = Compression::from_code(reader.read_u32()?)?,
				tags::HDR_SOFTWARE => {
					let name = reader.read_name()?;
					header.software = (!name.is_empty()).then_some(name);
				}
				_ => {}
			}
			reader.close_chunk()?;
		}

		if header.version > tags::PLT_VERSION {
			return Err(Error::UnsupportedVersion { version: header.version });
		}
		Ok(header)
	}
}
