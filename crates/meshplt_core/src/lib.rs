//! Structured hexahedral mesh generation and chunked plot archive reading.

/// Finite element mesh container shared by the generator and the archive reader.
pub mod mesh;
/// Multi-block topology and graded hex mesh generation.
pub mod multiblock;
/// Plot archive parsing, state loading, and field materialization.
pub mod plt;

mod error;

/// Error and result aliases.
pub use error::{Error, ErrorKind, Result};
