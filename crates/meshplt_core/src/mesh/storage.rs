use smallvec::SmallVec;

use crate::mesh::ElementType;

/// Element connectivity layout chosen for a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
	/// Every element is a tet4.
	Tet4,
	/// Every element is a hex8.
	Hex8,
	/// Every element is in the linear family (at most 8 nodes).
	Linear,
	/// Anything else.
	Mixed,
}

impl StorageKind {
	/// Pick the tightest layout that can hold every listed type.
	pub fn select(types: impl IntoIterator<Item = ElementType>) -> Self {
		let mut uniform: Option<ElementType> = None;
		let mut mixed = false;
		let mut linear = true;
		for ty in types {
			match uniform {
				None => uniform = Some(ty),
				Some(first) if first != ty => mixed = true,
				Some(_) => {}
			}
			linear &= ty.is_linear();
		}

		match (uniform, mixed) {
			(Some(ElementType::Tet4), false) => Self::Tet4,
			(Some(ElementType::Hex8), false) => Self::Hex8,
			(None, _) => Self::Hex8,
			_ if linear => Self::Linear,
			_ => Self::Mixed,
		}
	}

	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Tet4 => "tet4",
			Self::Hex8 => "hex8",
			Self::Linear => "linear",
			Self::Mixed => "mixed",
		}
	}

	fn accepts(self, ty: ElementType) -> bool {
		match self {
			Self::Tet4 => ty == ElementType::Tet4,
			Self::Hex8 => ty == ElementType::Hex8,
			Self::Linear => ty.is_linear(),
			Self::Mixed => true,
		}
	}
}

/// One element of the linear layout.
#[derive(Debug, Clone, Copy)]
pub struct LinearCell {
	/// Element type, always from the linear family.
	pub ty: ElementType,
	/// Node slots; only the first `ty.node_count()` are meaningful.
	pub nodes: [usize; 8],
}

/// One element of the general layout.
#[derive(Debug, Clone)]
pub struct MixedCell {
	/// Element type.
	pub ty: ElementType,
	/// Element nodes.
	pub nodes: SmallVec<[usize; 8]>,
}

/// Element connectivity in one of four specializations.
///
/// The homogeneous layouts avoid per-element type dispatch; every layout answers
/// [`ElementStore::nodes`] identically for equivalent input.
#[derive(Debug, Clone)]
pub enum ElementStore {
	/// Homogeneous tet4 connectivity.
	Tet4(Vec<[usize; 4]>),
	/// Homogeneous hex8 connectivity.
	Hex8(Vec<[usize; 8]>),
	/// Linear family connectivity.
	Linear(Vec<LinearCell>),
	/// General connectivity.
	Mixed(Vec<MixedCell>),
}

impl ElementStore {
	/// Create an empty store of the given layout.
	pub fn with_capacity(kind: StorageKind, capacity: usize) -> Self {
		match kind {
			StorageKind::Tet4 => Self::Tet4(Vec::with_capacity(capacity)),
			StorageKind::Hex8 => Self::Hex8(Vec::with_capacity(capacity)),
			StorageKind::Linear => Self::Linear(Vec::with_capacity(capacity)),
			StorageKind::Mixed => Self::Mixed(Vec::with_capacity(capacity)),
		}
	}

	/// Layout of this store.
	pub fn kind(&self) -> StorageKind {
		match self {
			Self::Tet4(_) => StorageKind::Tet4,
			Self::Hex8(_) => StorageKind::Hex8,
			Self::Linear(_) => StorageKind::Linear,
			Self::Mixed(_) => StorageKind::Mixed,
		}
	}

	/// Number of stored elements.
	pub fn len(&self) -> usize {
		match self {
			Self::Tet4(items) => items.len(),
			Self::Hex8(items) => items.len(),
			Self::Linear(items) => items.len(),
			Self::Mixed(items) => items.len(),
		}
	}

	/// Whether the store is empty.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Type of element `index`.
	pub fn element_type(&self, index: usize) -> ElementType {
		match self {
			Self::Tet4(_) => ElementType::Tet4,
			Self::Hex8(_) => ElementType::Hex8,
			Self::Linear(items) => items[index].ty,
			Self::Mixed(items) => items[index].ty,
		}
	}

	/// Node list of element `index`.
	pub fn nodes(&self, index: usize) -> &[usize] {
		match self {
			Self::Tet4(items) => &items[index],
			Self::Hex8(items) => &items[index],
			Self::Linear(items) => {
				let cell = &items[index];
				&cell.nodes[..cell.ty.node_count()]
			}
			Self::Mixed(items) => &items[index].nodes,
		}
	}

	/// Append an element. `nodes` must hold at least `ty.node_count()` entries.
	///
	/// A type the current layout cannot hold promotes the store to the general layout.
	pub fn push(&mut self, ty: ElementType, nodes: &[usize]) {
		if !self.kind().accepts(ty) {
			self.promote_to_mixed();
		}

		let nodes = &nodes[..ty.node_count()];
		match self {
			Self::Tet4(items) => {
				let mut cell = [0_usize; 4];
				cell.copy_from_slice(nodes);
				items.push(cell);
			}
			Self::Hex8(items) => {
				let mut cell = [0_usize; 8];
				cell.copy_from_slice(nodes);
				items.push(cell);
			}
			Self::Linear(items) => {
				let mut cell = LinearCell { ty, nodes: [0; 8] };
				cell.nodes[..nodes.len()].copy_from_slice(nodes);
				items.push(cell);
			}
			Self::Mixed(items) => items.push(MixedCell {
				ty,
				nodes: SmallVec::from_slice(nodes),
			}),
		}
	}

	fn promote_to_mixed(&mut self) {
		if let Self::Mixed(_) = self {
			return;
		}

		let mut cells = Vec::with_capacity(self.len());
		for index in 0..self.len() {
			cells.push(MixedCell {
				ty: self.element_type(index),
				nodes: SmallVec::from_slice(self.nodes(index)),
			});
		}
		*self = Self::Mixed(cells);
	}
}
