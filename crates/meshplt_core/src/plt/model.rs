use crate::mesh::{Material, MaterialRegistry, Mesh};
use crate::plt::compression::Compression;
use crate::plt::derived::field_value;
use crate::plt::dictionary::Dictionary;
use crate::plt::field::FieldCatalog;
use crate::plt::header::PltHeader;
use crate::plt::state::State;

/// Everything loaded from one archive.
///
/// Materials survive reloads so user visibility choices carry over to the next load.
#[derive(Debug, Clone, Default)]
pub struct PostModel {
	/// Archive header.
	pub header: PltHeader,
	/// Field descriptors as read.
	pub dictionary: Dictionary,
	/// Stored and derived fields every state exposes.
	pub catalog: FieldCatalog,
	/// Compression of the last loaded file.
	pub compression: Option<Compression>,
	/// Materials named by the parts section.
	pub materials: Vec<Material>,
	/// Meshes in file order; states refer to them by index.
	pub meshes: Vec<Mesh>,
	/// Committed states in file order.
	pub states: Vec<State>,
}

impl PostModel {
	/// Create an empty model.
	pub fn new() -> Self {
		Self::default()
	}

	/// Mesh `state` refers to.
	pub fn state_mesh(&self, state: &State) -> Option<&Mesh> {
		self.meshes.get(state.mesh)
	}

	/// Value of the field named `name` at `item` of state `state`.
	///
	/// `item` is a node, element, or face index depending on the field's class.
	pub fn field_value(&self, state: usize, name: &str, item: usize) -> Option<Vec<f32>> {
		let state = self.states.get(state)?;
		let mesh = self.state_mesh(state)?;
		let field = self.catalog.find(name)?;
		field_value(&self.catalog, mesh, state, field, item)
	}

	/// Enable or disable material `index`; returns `false` when it does not exist.
	pub fn set_material_enabled(&mut self, index: usize, enabled: bool) -> bool {
		match self.materials.get_mut(index) {
			Some(material) => {
				material.enabled = enabled;
				true
			}
			None => false,
		}
	}

	pub(crate) fn reset_for_load(&mut self) {
		self.meshes.clear();
		self.states.clear();
	}
}

impl MaterialRegistry for PostModel {
	fn material_count(&self) -> usize {
		self.materials.len()
	}

	fn is_enabled(&self, index: usize) -> bool {
		self.materials.is_enabled(index)
	}
}
