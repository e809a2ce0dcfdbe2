use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use crate::mesh::Mesh;
use crate::plt::chunk::{ChunkReader, ChunkStatus};
use crate::plt::compression::{MAX_DECOMPRESSED_BYTES, SectionDecoder};
use crate::plt::dictionary::{DictCategory, Dictionary};
use crate::plt::field::{FieldCatalog, FieldClass};
use crate::plt::header::PltHeader;
use crate::plt::mesh_build::{build_mesh, merge_materials};
use crate::plt::model::PostModel;
use crate::plt::state::State;
use crate::plt::tags;
use crate::plt::xmesh::XMesh;
use crate::{Error, ErrorKind, Result};

/// Which states a load keeps.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StateSelection {
	/// Every state.
	#[default]
	All,
	/// Only the final complete state.
	Last,
	/// Zero-based state indices, counted over every state in the file.
	List(Vec<usize>),
}

impl StateSelection {
	fn wants(&self, index: usize) -> bool {
		match self {
			Self::All | Self::Last => true,
			Self::List(indices) => indices.contains(&index),
		}
	}
}

/// Handling of surface face records that match no mesh face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnresolvedFacePolicy {
	/// Log and drop the record.
	#[default]
	Skip,
	/// Fail the mesh section.
	Fail,
}

/// Options controlling how an archive is loaded.
#[derive(Debug, Clone)]
pub struct ReadOptions {
	/// States to keep.
	pub states: StateSelection,
	/// Handling of unmatched surface face records.
	pub unresolved_faces: UnresolvedFacePolicy,
	/// Element field copied into each element's shell thickness cache.
	pub shell_thickness_field: String,
	/// Ceiling on decompressed section bytes per load.
	pub max_decompressed_bytes: usize,
	/// Set to request a stop before the next state.
	pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for ReadOptions {
	fn default() -> Self {
		Self {
			states: StateSelection::All,
			unresolved_faces: UnresolvedFacePolicy::Skip,
			shell_thickness_field: "shell thickness".to_owned(),
			max_decompressed_bytes: MAX_DECOMPRESSED_BYTES,
			cancel: None,
		}
	}
}

impl ReadOptions {
	/// Preset that keeps only the final state.
	pub fn last_state() -> Self {
		Self {
			states: StateSelection::Last,
			..Self::default()
		}
	}

	/// Preset that fails on any surface record that matches no mesh face.
	pub fn strict() -> Self {
		Self {
			unresolved_faces: UnresolvedFacePolicy::Fail,
			..Self::default()
		}
	}

	fn cancelled(&self) -> bool {
		self.cancel.as_ref().is_some_and(|flag| flag.load(Ordering::Relaxed))
	}
}

/// How a load ended.
#[derive(Debug)]
pub enum LoadOutcome {
	/// The whole archive was read.
	Complete,
	/// Reading stopped at a state-phase error; committed states are intact.
	Partial {
		/// Error that stopped the load.
		error: Error,
	},
	/// The cancel flag was raised between states.
	Cancelled,
}

/// Summary of one load.
#[derive(Debug)]
pub struct LoadReport {
	/// How the load ended.
	pub outcome: LoadOutcome,
	/// State sections encountered, including skipped and failed ones.
	pub states_seen: usize,
	/// States committed to the model.
	pub states_committed: usize,
	/// States abandoned because their storage could not be allocated.
	pub states_dropped: usize,
	/// Mesh sections read.
	pub meshes: usize,
}

impl LoadReport {
	/// Whether the whole archive was read.
	pub fn is_complete(&self) -> bool {
		matches!(self.outcome, LoadOutcome::Complete)
	}

	/// Error that stopped a partial load.
	pub fn error(&self) -> Option<&Error> {
		match &self.outcome {
			LoadOutcome::Partial { error } => Some(error),
			_ => None,
		}
	}
}

/// Loader for chunked plot archives.
#[derive(Debug, Clone, Default)]
pub struct PltReader {
	options: ReadOptions,
}

impl PltReader {
	/// Create a reader with `options`.
	pub fn new(options: ReadOptions) -> Self {
		Self { options }
	}

	/// Options in effect.
	pub fn options(&self) -> &ReadOptions {
		&self.options
	}

	/// Load the archive at `path` into `model`.
	pub fn load_file(&self, path: impl AsRef<Path>, model: &mut PostModel) -> Result<LoadReport> {
		let raw = fs::read(path)?;
		self.load_bytes(raw, model)
	}

	/// Load archive bytes into `model`.
	///
	/// Mesh and state sections are inflated one at a time when the header declares compression.
	/// Errors before the first mesh is built are returned as `Err` and leave no states. Errors
	/// after that stop the load with [`LoadOutcome::Partial`], keeping every committed state and
	/// discarding the one being read.
	pub fn load_bytes(&self, raw: Vec<u8>, model: &mut PostModel) -> Result<LoadReport> {
		let magic = tags::PLT_MAGIC.to_le_bytes();
		if !raw.starts_with(&magic) {
			return Err(Error::UnknownMagic { magic: first4(&raw) });
		}
		let mut reader = ChunkReader::new(&raw[magic.len()..]);

		let (header, dictionary) = read_root(&mut reader)?;
		let catalog = FieldCatalog::from_dictionary(&dictionary)?;
		let compression = header.compression;
		model.reset_for_load();
		model.header = header;
		model.dictionary = dictionary;
		model.catalog = catalog;
		model.compression = Some(compression);

		let mut load = Load {
			options: &self.options,
			sections: SectionDecoder::new(compression, self.options.max_decompressed_bytes),
			staged: None,
			states_seen: 0,
			states_dropped: 0,
		};
		let outcome = load.run(&mut reader, model)?;

		if let LoadOutcome::Partial { error } = &outcome {
			warn!(error = %error, committed = model.states.len(), "archive load stopped early");
		}
		info!(
			compression = compression.as_str(),
			decoded = load.sections.decoded_bytes(),
			meshes = model.meshes.len(),
			states = model.states.len(),
			fields = model.catalog.len(),
			"loaded plot archive"
		);

		Ok(LoadReport {
			outcome,
			states_seen: load.states_seen,
			states_committed: model.states.len(),
			states_dropped: load.states_dropped,
			meshes: model.meshes.len(),
		})
	}
}

fn first4(bytes: &[u8]) -> [u8; 4] {
	let mut magic = [0_u8; 4];
	let take = bytes.len().min(4);
	magic[..take].copy_from_slice(&bytes[..take]);
	magic
}

fn read_root(reader: &mut ChunkReader<'_>) -> Result<(PltHeader, Dictionary)> {
	match reader.open_chunk()? {
		ChunkStatus::Open(tags::ROOT) => {}
		ChunkStatus::Open(id) => return Err(Error::UnexpectedChunk { section: "archive", id }),
		ChunkStatus::End => {
			return Err(Error::MissingChunk {
				section: "archive",
				what: "root",
			});
		}
	}

	let mut header = None;
	let mut dictionary = None;
	while let ChunkStatus::Open(id) = reader.open_chunk()? {
		match id {
			tags::HEADER => header = Some(PltHeader::read(reader)?),
			tags::DICTIONARY => dictionary = Some(Dictionary::read(reader)?),
			_ => return Err(Error::UnexpectedChunk { section: "root", id }),
		}
		reader.close_chunk()?;
	}
	reader.close_chunk()?;

	let header = header.ok_or(Error::MissingChunk {
		section: "root",
		what: "header",
	})?;
	let dictionary = dictionary.ok_or(Error::MissingChunk {
		section: "root",
		what: "dictionary",
	})?;
	Ok((header, dictionary))
}

/// Per-load progress across the top-level sections.
struct Load<'o> {
	options: &'o ReadOptions,
	sections: SectionDecoder,
	/// Staged records of the current mesh; surface resolution and domain ranges live here.
	staged: Option<XMesh>,
	states_seen: usize,
	states_dropped: usize,
}

impl Load<'_> {
	fn run(&mut self, reader: &mut ChunkReader<'_>, model: &mut PostModel) -> Result<LoadOutcome> {
		loop {
			if self.options.cancelled() {
				debug!(committed = model.states.len(), "archive load cancelled");
				return Ok(LoadOutcome::Cancelled);
			}

			let step = match reader.open_chunk() {
				Ok(ChunkStatus::End) => return Ok(LoadOutcome::Complete),
				Ok(ChunkStatus::Open(id)) => self.section(reader, model, id),
				Err(error) => Err(error),
			};

			if let Err(error) = step {
				if model.meshes.is_empty() {
					return Err(error);
				}
				return Ok(LoadOutcome::Partial { error });
			}
		}
	}

	fn section(&mut self, reader: &mut ChunkReader<'_>, model: &mut PostModel, id: u32) -> Result<()> {
		if id != tags::MESH && id != tags::STATE {
			return Err(Error::UnexpectedChunk { section: "archive", id });
		}
		let payload = reader.read_payload()?;
		let bytes = self.sections.decode(id, payload)?;
		let mut section = ChunkReader::new(&bytes);
		if id == tags::MESH {
			self.read_mesh(&mut section, model)?;
		} else {
			self.read_state(&mut section, model)?;
		}
		section.finish()?;
		reader.close_chunk()
	}

	fn read_mesh(&mut self, reader: &mut ChunkReader<'_>, model: &mut PostModel) -> Result<()> {
		let mut xmesh = XMesh::read(reader)?;
		if let Some(names) = &xmesh.parts {
			model.materials = merge_materials(&model.materials, names);
		}
		let mesh = build_mesh(&mut xmesh, &model.materials, self.options.unresolved_faces)?;
		info!(
			index = model.meshes.len(),
			nodes = mesh.node_count(),
			elements = mesh.element_count(),
			faces = mesh.face_count(),
			"mesh section loaded"
		);
		model.meshes.push(mesh);
		self.staged = Some(xmesh);
		Ok(())
	}

	fn read_state(&mut self, reader: &mut ChunkReader<'_>, model: &mut PostModel) -> Result<()> {
		let Some(xmesh) = self.staged.as_ref() else {
			return Err(Error::NoMesh);
		};
		let index = self.states_seen;
		self.states_seen += 1;
		if !self.options.states.wants(index) {
			debug!(state = index, "skipping state");
			return Ok(());
		}

		let mesh_index = model.meshes.len() - 1;
		let depth = reader.depth();
		let context = StateContext {
			options: self.options,
			dictionary: &model.dictionary,
			catalog: &model.catalog,
			mesh: &model.meshes[mesh_index],
			xmesh,
		};
		let state = match context.read(reader, mesh_index) {
			Ok(state) => state,
			Err(error) if error.kind() == ErrorKind::Allocation => {
				warn!(state = index, error = %error, "dropping state that could not be allocated");
				self.states_dropped += 1;
				return reader.close_to(depth);
			}
			Err(error) => return Err(error),
		};

		debug!(state = index, time = state.time, "state committed");
		if self.options.states == StateSelection::Last {
			model.states.clear();
		}
		model.states.push(state);
		Ok(())
	}
}

/// Borrowed inputs for reading one state section.
struct StateContext<'a> {
	options: &'a ReadOptions,
	dictionary: &'a Dictionary,
	catalog: &'a FieldCatalog,
	mesh: &'a Mesh,
	xmesh: &'a XMesh,
}

impl StateContext<'_> {
	fn read(&self, reader: &mut ChunkReader<'_>, mesh_index: usize) -> Result<State> {
		let mut state = State::new(mesh_index, self.mesh, self.catalog.len(), self.dictionary.global.len())?;
		while let ChunkStatus::Open(id) = reader.open_chunk()? {
			match id {
				tags::STATE_HEADER => self.read_header(reader, &mut state)?,
				tags::STATE_DATA => {
					self.read_data(reader, &mut state)?;
					self.assign_shell_thickness(&mut state);
				}
				tags::MESH_STATE => self.read_mesh_state(reader, &mut state)?,
				_ => return Err(Error::UnexpectedChunk { section: "state", id }),
			}
			reader.close_chunk()?;
		}
		Ok(state)
	}

	fn read_header(&self, reader: &mut ChunkReader<'_>, state: &mut State) -> Result<()> {
		while let ChunkStatus::Open(id) = reader.open_chunk()? {
			if id == tags::STATE_HDR_TIME {
				state.time = reader.read_f32()?;
			}
			reader.close_chunk()?;
		}
		Ok(())
	}

	fn read_data(&self, reader: &mut ChunkReader<'_>, state: &mut State) -> Result<()> {
		while let ChunkStatus::Open(id) = reader.open_chunk()? {
			let category = match id {
				tags::GLOBAL_DATA => DictCategory::Global,
				tags::NODE_DATA => DictCategory::Nodal,
				tags::ELEMENT_DATA => DictCategory::Domain,
				tags::FACE_DATA => DictCategory::Surface,
				_ => return Err(Error::UnexpectedChunk { section: "state data", id }),
			};
			while let ChunkStatus::Open(id) = reader.open_chunk()? {
				if id != tags::STATE_VARIABLE {
					return Err(Error::UnexpectedChunk {
						section: category.as_str(),
						id,
					});
				}
				self.read_variable(reader, state, category)?;
				reader.close_chunk()?;
			}
			reader.close_chunk()?;
		}
		Ok(())
	}

	fn read_variable(&self, reader: &mut ChunkReader<'_>, state: &mut State, category: DictCategory) -> Result<()> {
		let mut variable = None;
		while let ChunkStatus::Open(id) = reader.open_chunk()? {
			match id {
				tags::STATE_VAR_ID => variable = Some(reader.read_u32()?),
				tags::STATE_VAR_DATA => {
					let id = variable.ok_or(Error::MissingChunk {
						section: "state variable",
						what: "variable id",
					})?;
					self.read_variable_data(reader, state, category, i64::from(id))?;
				}
				_ => {
					return Err(Error::UnexpectedChunk {
						section: "state variable",
						id,
					});
				}
			}
			reader.close_chunk()?;
		}
		Ok(())
	}

	fn read_variable_data(&self, reader: &mut ChunkReader<'_>, state: &mut State, category: DictCategory, id: i64) -> Result<()> {
		let (index, item) = self.dictionary.item(category, id)?;
		let field = self.catalog.field_for(category, index);

		while let ChunkStatus::Open(tag) = reader.open_chunk()? {
			let raw = reader.read_f32_block()?;
			match (category, field) {
				(DictCategory::Nodal, Some(field)) => {
					if tag != 0 {
						return Err(Error::RegionIndexOutOfRange {
							kind: "node data",
							index: i64::from(tag),
							len: 0,
						});
					}
					let info = &self.catalog.fields()[field];
					state.field_mut(field, info, self.mesh)?.scatter_nodal(&info.name, &raw)?;
				}
				(DictCategory::Domain, Some(field)) => {
					let domain = region(&self.xmesh.domains, "domain", tag)?;
					let info = &self.catalog.fields()[field];
					state
						.field_mut(field, info, self.mesh)?
						.scatter_element_block(&info.name, domain, self.mesh.node_count(), &raw)?;
				}
				(DictCategory::Surface, Some(field)) => {
					let surface = region(&self.xmesh.surfaces, "surface", tag)?;
					let info = &self.catalog.fields()[field];
					let duplicates = state.field_mut(field, info, self.mesh)?.scatter_face_block(&info.name, self.mesh, surface, &raw)?;
					if duplicates > 0 {
						warn!(field = %info.name, surface = tag, duplicates, "face data written more than once");
					}
				}
				_ => {
					if raw.len() != item.components() {
						return Err(Error::DataSizeMismatch {
							field: item.name.clone(),
							expected: item.components(),
							got: raw.len(),
						});
					}
					state.set_global(index, raw);
				}
			}
			reader.close_chunk()?;
		}
		Ok(())
	}

	fn read_mesh_state(&self, reader: &mut ChunkReader<'_>, state: &mut State) -> Result<()> {
		while let ChunkStatus::Open(id) = reader.open_chunk()? {
			if id == tags::ELEMENT_STATE {
				let flags = reader.read_u32s(reader.remaining() / 4)?;
				if flags.len() != self.mesh.element_count() {
					return Err(Error::DataSizeMismatch {
						field: "element state".to_owned(),
						expected: self.mesh.element_count(),
						got: flags.len(),
					});
				}
				state.set_visibility(&flags);
			}
			reader.close_chunk()?;
		}
		Ok(())
	}

	fn assign_shell_thickness(&self, state: &mut State) {
		let name = self.options.shell_thickness_field.as_str();
		let Some(index) = self.catalog.find(name) else {
			return;
		};
		let info = &self.catalog.fields()[index];
		if info.class != FieldClass::Element || info.derived.is_some() || !state.assign_shell_thickness(index, info) {
			warn!(
				field = name,
				ty = info.ty.as_str(),
				format = info.format.as_str(),
				"shell thickness field is not a per-node float element field; skipping"
			);
		}
	}
}

/// Resolve a 1-based domain or surface tag.
fn region<'a, T>(items: &'a [T], kind: &'static str, tag: u32) -> Result<&'a T> {
	(tag as usize)
		.checked_sub(1)
		.and_then(|index| items.get(index))
		.ok_or(Error::RegionIndexOutOfRange {
			kind,
			index: i64::from(tag),
			len: items.len(),
		})
}

#[cfg(test)]
mod tests;
