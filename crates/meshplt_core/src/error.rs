use std::collections::TryReserveError;

use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse error classes used by callers to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	/// Filesystem or stream failure.
	Io,
	/// Malformed or unexpected archive content.
	Format,
	/// Archive ended before a chunk or value was complete.
	Truncated,
	/// Inconsistent multi-block topology.
	Topology,
	/// State storage could not be allocated.
	Allocation,
}

/// Errors produced while building multi-block meshes and reading plot archives.
#[derive(Debug, Error)]
pub enum Error {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Unknown leading file magic.
	#[error("not a plot archive (magic={magic:?})")]
	UnknownMagic {
		/// First up-to-4 bytes of the stream.
		magic: [u8; 4],
	},
	/// Header declares a compression code this reader does not know.
	#[error("unsupported section compression code {code}")]
	UnsupportedCompression {
		/// Parsed code.
		code: u32,
	},
	/// Compressed archive holds a section that is not a zstd frame.
	#[error("section {id:#x} is not a zstd frame")]
	NotZstdSection {
		/// Section chunk id.
		id: u32,
	},
	/// Compressed section payload could not be inflated.
	#[error("section {id:#x} failed to decompress: {source}")]
	SectionDecode {
		/// Section chunk id.
		id: u32,
		/// Decoder failure.
		#[source]
		source: std::io::Error,
	},
	/// Decompression output exceeded configured safety limit.
	#[error("decompressed output exceeded limit {limit} bytes")]
	DecompressedTooLarge {
		/// Maximum allowed output bytes.
		limit: usize,
	},
	/// Archive version is newer than this reader understands.
	#[error("unsupported archive version {version:#x}")]
	UnsupportedVersion {
		/// Parsed version word.
		version: u32,
	},
	/// Not enough bytes remained for a requested read.
	#[error("unexpected eof at offset {at}, need {need} bytes, remaining {rem}")]
	UnexpectedEof {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// Chunk payload runs past the end of the file.
	#[error("chunk {id:#010x} at offset {at} declares {size} bytes but only {rem} remain")]
	ChunkTruncated {
		/// Chunk id.
		id: u32,
		/// Chunk header offset.
		at: usize,
		/// Declared payload size.
		size: usize,
		/// Bytes left in the file.
		rem: usize,
	},
	/// Chunk payload runs past the end of its parent chunk.
	#[error("chunk {id:#010x} at offset {at} overruns its parent by {over} bytes")]
	ChunkOutOfBounds {
		/// Chunk id.
		id: u32,
		/// Chunk header offset.
		at: usize,
		/// Number of bytes past the parent end.
		over: usize,
	},
	/// Value read would cross the end of the current chunk.
	#[error("read of {need} bytes at offset {at} crosses the end of chunk {id:#010x}")]
	ChunkUnderflow {
		/// Chunk id being read.
		id: u32,
		/// Byte offset of the read.
		at: usize,
		/// Requested bytes.
		need: usize,
	},
	/// `close_chunk` was called with no open chunk, or chunks were left open.
	#[error("unbalanced chunk nesting (depth={depth})")]
	UnbalancedChunks {
		/// Open chunk depth at the time of the check.
		depth: usize,
	},
	/// A chunk id was not valid in the section being read.
	#[error("unexpected chunk {id:#010x} in {section}")]
	UnexpectedChunk {
		/// Section being parsed.
		section: &'static str,
		/// Offending chunk id.
		id: u32,
	},
	/// A required chunk was not present.
	#[error("missing {what} in {section}")]
	MissingChunk {
		/// Section being parsed.
		section: &'static str,
		/// Description of the missing piece.
		what: &'static str,
	},
	/// Unknown element type code in a domain header.
	#[error("unknown element type code {code}")]
	UnknownElementType {
		/// Raw type code.
		code: u32,
	},
	/// Unknown dictionary data type code.
	#[error("unknown data type code {code}")]
	UnknownDataType {
		/// Raw type code.
		code: u32,
	},
	/// Unknown dictionary storage format code.
	#[error("unknown storage format code {code}")]
	UnknownDataFormat {
		/// Raw format code.
		code: u32,
	},
	/// Dictionary item combines a type and format that has no storage.
	#[error("field {name}: type {ty} cannot be stored as {format}")]
	UnsupportedFieldLayout {
		/// Field name.
		name: String,
		/// Data type label.
		ty: &'static str,
		/// Storage format label.
		format: &'static str,
	},
	/// State variable id does not name a dictionary item.
	#[error("{category} variable index {index} out of range (dictionary has {len})")]
	DictIndexOutOfRange {
		/// Dictionary category.
		category: &'static str,
		/// 1-based id read from the file.
		index: i64,
		/// Items in the category.
		len: usize,
	},
	/// Domain or surface sub-chunk tag is out of range.
	#[error("{kind} index {index} out of range (have {len})")]
	RegionIndexOutOfRange {
		/// `domain` or `surface`.
		kind: &'static str,
		/// 1-based tag read from the file.
		index: i64,
		/// Number of regions available.
		len: usize,
	},
	/// Node index out of range of the node table.
	#[error("node index {node} out of range ({nodes} nodes)")]
	NodeIndexOutOfRange {
		/// Offending node index.
		node: i64,
		/// Node count.
		nodes: usize,
	},
	/// Node section header missing or zero-sized.
	#[error("missing or invalid node header")]
	InvalidNodeHeader,
	/// A section lists a different number of records than its header declares.
	#[error("{what} {index} declares {declared} records but lists {listed}")]
	CountMismatch {
		/// `domain` or `surface`.
		what: &'static str,
		/// Zero-based section index.
		index: usize,
		/// Count from the header.
		declared: usize,
		/// Records actually listed.
		listed: usize,
	},
	/// Facet record has more nodes than the surface allows.
	#[error("surface face with {nodes} nodes exceeds limit {max}")]
	InvalidFaceRecord {
		/// Node count from the record.
		nodes: i64,
		/// Surface max facet nodes.
		max: usize,
	},
	/// Face record could not be matched to a mesh face.
	#[error("surface {surface} face {face} does not match any mesh face")]
	UnresolvedFace {
		/// Surface index.
		surface: usize,
		/// Face record index within the surface.
		face: usize,
	},
	/// State data arrived before any mesh section.
	#[error("state section without a preceding mesh section")]
	NoMesh,
	/// Raw data array has the wrong size for its target.
	#[error("field {field}: expected {expected} values, got {got}")]
	DataSizeMismatch {
		/// Field name.
		field: String,
		/// Expected float count.
		expected: usize,
		/// Float count present.
		got: usize,
	},
	/// State storage allocation failed.
	#[error("state allocation failed: {0}")]
	Allocation(#[from] TryReserveError),
	/// Multi-block corner index out of range.
	#[error("block {block} references corner node {node} but only {nodes} exist")]
	CornerOutOfRange {
		/// Block index.
		block: usize,
		/// Offending node index.
		node: usize,
		/// Node count.
		nodes: usize,
	},
	/// Multi-block block repeats a corner node.
	#[error("block {block} repeats corner node {node}")]
	DegenerateBlock {
		/// Block index.
		block: usize,
		/// Repeated node index.
		node: usize,
	},
	/// Corner node is not used by any block.
	#[error("corner node {node} is not used by any block")]
	DanglingNode {
		/// Node index.
		node: usize,
	},
	/// More than two blocks share one face.
	#[error("face {nodes:?} of block {block} is already shared by blocks {first} and {second}")]
	FaceOverclaimed {
		/// Block trying to claim the face.
		block: usize,
		/// Face corner nodes.
		nodes: [usize; 4],
		/// First owner.
		first: usize,
		/// Second owner.
		second: usize,
	},
	/// A shared face cannot be aligned with its owning face record.
	#[error("block {block} face {face} is not aligned with its shared face")]
	FaceOrientation {
		/// Block index.
		block: usize,
		/// Local face slot.
		face: usize,
	},
	/// Two entities sharing a boundary disagree on subdivisions.
	#[error("{what} {index}: subdivision mismatch ({expected} vs {got})")]
	ZoningMismatch {
		/// `face` or `edge`.
		what: &'static str,
		/// Entity index.
		index: usize,
		/// Count already recorded.
		expected: usize,
		/// Conflicting count.
		got: usize,
	},
	/// Block zoning is unusable.
	#[error("block {block}: invalid zoning on axis {axis} (n={n}, ratio={ratio})")]
	InvalidZoning {
		/// Block index.
		block: usize,
		/// Axis index 0..3.
		axis: usize,
		/// Subdivisions.
		n: usize,
		/// Grading ratio.
		ratio: f64,
	},
	/// Mesh requested while topology edits are pending.
	#[error("multi-block topology is stale; call update() first")]
	StaleTopology,
}

impl Error {
	/// Classify this error.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Io(_) => ErrorKind::Io,
			Self::UnexpectedEof { .. } | Self::ChunkTruncated { .. } => ErrorKind::Truncated,
			Self::Allocation(_) => ErrorKind::Allocation,
			Self::CornerOutOfRange { .. }
			| Self::DegenerateBlock { .. }
			| Self::DanglingNode { .. }
			| Self::FaceOverclaimed { .. }
			| Self::FaceOrientation { .. }
			| Self::ZoningMismatch { .. }
			| Self::InvalidZoning { .. }
			| Self::StaleTopology => ErrorKind::Topology,
			_ => ErrorKind::Format,
		}
	}

	/// Whether the error means the stream simply ran out.
	pub fn is_truncation(&self) -> bool {
		self.kind() == ErrorKind::Truncated
	}
}
