//! Chunked plot archive reading.
//!
//! An archive is a magic word followed by nested `id, size, payload` chunks: a raw root section
//! with the header and field dictionary, then any sequence of mesh and state sections whose
//! payloads may each be zstd-compressed. [`PltReader`]
//! loads one into a [`PostModel`].

mod bytes;
mod chunk;
mod compression;
mod derived;
mod dictionary;
mod field;
mod header;
mod mesh_build;
mod model;
mod reader;
mod state;
/// Chunk ids and code tables shared with archive writers.
pub mod tags;
mod xmesh;

/// Bounds-checked chunk traversal.
pub use chunk::{ChunkReader, ChunkStatus};
/// Section compression.
pub use compression::{Compression, MAX_DECOMPRESSED_BYTES, SectionDecoder, ZSTD_MAGIC};
/// Derived field evaluation.
pub use derived::{evaluate, field_value};
/// Field descriptors.
pub use dictionary::{DataFormat, DataType, DerivedFlags, DictCategory, DictItem, Dictionary};
/// Field catalog and per-state storage.
pub use field::{Derived, FieldCatalog, FieldClass, FieldData, FieldInfo, FieldValues, ItemValues};
/// Archive header.
pub use header::PltHeader;
/// Loaded archive contents.
pub use model::PostModel;
/// Loading entry points and options.
pub use reader::{LoadOutcome, LoadReport, PltReader, ReadOptions, StateSelection, UnresolvedFacePolicy};
/// Per-state results.
pub use state::{ElementState, State};
