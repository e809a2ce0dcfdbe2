use smallvec::SmallVec;

use crate::mesh::Mesh;
use crate::plt::dictionary::{DataFormat, DataType};
use crate::plt::field::{FieldData, FieldInfo, FieldValues};
use crate::Result;

/// Per-element state flags and caches.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementState {
	/// Whether the element is shown in this state.
	pub visible: bool,
	/// Shell thickness per element node, empty when not recorded.
	pub shell_thickness: SmallVec<[f32; 9]>,
}

impl Default for ElementState {
	fn default() -> Self {
		Self {
			visible: true,
			shell_thickness: SmallVec::new(),
		}
	}
}

/// One time step of results.
///
/// Field storage is allocated the first time a state carries data for a field; fields the state
/// never mentions stay `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
	/// Simulation time.
	pub time: f32,
	/// Index of the mesh in [`crate::plt::PostModel::meshes`] this state refers to.
	pub mesh: usize,
	fields: Vec<Option<FieldData>>,
	globals: Vec<Option<Vec<f32>>>,
	elements: Vec<ElementState>,
}

impl State {
	pub(crate) fn new(mesh_index: usize, mesh: &Mesh, fields: usize, globals: usize) -> Result<Self> {
		let mut elements = Vec::new();
		elements.try_reserve_exact(mesh.element_count())?;
		elements.resize_with(mesh.element_count(), ElementState::default);
		Ok(Self {
			time: 0.0,
			mesh: mesh_index,
			fields: vec![None; fields],
			globals: vec![None; globals],
			elements,
		})
	}

	/// Stored data of catalog field `index`, if this state carries it.
	pub fn field(&self, index: usize) -> Option<&FieldData> {
		self.fields.get(index).and_then(Option::as_ref)
	}

	/// Stored data of every catalog field, in catalog order.
	pub fn fields(&self) -> &[Option<FieldData>] {
		&self.fields
	}

	/// Value of global dictionary item `index`.
	pub fn global(&self, index: usize) -> Option<&[f32]> {
		self.globals.get(index).and_then(Option::as_deref)
	}

	/// Per-element flags.
	pub fn element_states(&self) -> &[ElementState] {
		&self.elements
	}

	/// Flags of element `index`.
	pub fn element_state(&self, index: usize) -> Option<&ElementState> {
		self.elements.get(index)
	}

	pub(crate) fn field_mut(&mut self, index: usize, info: &FieldInfo, mesh: &Mesh) -> Result<&mut FieldData> {
		let slot = &mut self.fields[index];
		let data = match slot.take() {
			Some(data) => data,
			None => FieldData::allocate(info, mesh)?,
		};
		Ok(slot.insert(data))
	}

	pub(crate) fn set_global(&mut self, index: usize, values: Vec<f32>) {
		if let Some(slot) = self.globals.get_mut(index) {
			*slot = Some(values);
		}
	}

	/// Apply one visibility word per element; `1` means visible.
	pub(crate) fn set_visibility(&mut self, flags: &[u32]) {
		for (element, flag) in self.elements.iter_mut().zip(flags) {
			element.visible = *flag == 1;
		}
	}

	/// Copy a multi-slot scalar field into the per-element thickness cache.
	///
	/// Returns `false` without touching the cache when the field has another layout.
	pub(crate) fn assign_shell_thickness(&mut self, index: usize, info: &FieldInfo) -> bool {
		if info.ty != DataType::Float || info.format != DataFormat::Mult {
			return false;
		}
		let Some(Some(data)) = self.fields.get(index) else {
			return true;
		};
		let FieldValues::Slots { .. } = data.values() else {
			return false;
		};
		for (element, state) in self.elements.iter_mut().enumerate() {
			if let Some(slots) = data.slots(element) {
				state.shell_thickness = SmallVec::from_slice(slots);
			}
		}
		true
	}
}
