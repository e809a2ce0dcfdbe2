use crate::mesh::Mesh;
use crate::plt::dictionary::{DataFormat, DataType, DictCategory, DictItem, Dictionary};
use crate::plt::xmesh::{XDomain, XSurface};
use crate::{Error, Result};

/// Mesh entity a field's values are attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldClass {
	/// One value per mesh node.
	Node,
	/// Values per element.
	Element,
	/// Values per face.
	Face,
}

impl FieldClass {
	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Node => "node",
			Self::Element => "element",
			Self::Face => "face",
		}
	}
}

/// Quantity computed on demand from stored fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Derived {
	/// Green-Lagrange strain at the element center, from nodal displacement.
	LagrangeStrain,
	/// Current node position.
	Position,
	/// Reference node position.
	InitialPosition,
	/// Hydrostatic pressure from element stress.
	Pressure,
	/// Element stress with the fluid pressure added back.
	SolidStress,
	/// Pressure per element node from nodal stress.
	NodalPressure,
}

impl Derived {
	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::LagrangeStrain => "lagrange_strain",
			Self::Position => "position",
			Self::InitialPosition => "initial_position",
			Self::Pressure => "pressure",
			Self::SolidStress => "solid_stress",
			Self::NodalPressure => "nodal_pressure",
		}
	}
}

/// Catalog entry describing one field of every state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
	/// Field name.
	pub name: String,
	/// Entity the values are attached to.
	pub class: FieldClass,
	/// Value type.
	pub ty: DataType,
	/// Storage format.
	pub format: DataFormat,
	/// Component count of array types.
	pub array_size: usize,
	/// Component names of array types.
	pub array_names: Vec<String>,
	/// Set for fields computed from other fields instead of read.
	pub derived: Option<Derived>,
}

impl FieldInfo {
	/// Floats per value.
	pub fn components(&self) -> usize {
		self.ty.components(self.array_size)
	}

	fn stored(item: &DictItem, class: FieldClass, format: DataFormat) -> Result<Self> {
		let array_ok = match (class, format) {
			(FieldClass::Node, _) => item.ty != DataType::ArrayVec3f,
			(FieldClass::Element, DataFormat::Node) => item.ty != DataType::ArrayVec3f,
			(FieldClass::Element, DataFormat::Item) => true,
			_ => !item.ty.is_array(),
		};
		if !array_ok || (item.ty.is_array() && item.array_size == 0) {
			return Err(Error::UnsupportedFieldLayout {
				name: item.name.clone(),
				ty: item.ty.as_str(),
				format: format.as_str(),
			});
		}

		Ok(Self {
			name: item.name.clone(),
			class,
			ty: item.ty,
			format,
			array_size: item.array_size,
			array_names: item.array_names.clone(),
			derived: None,
		})
	}

	fn derived(name: &str, derived: Derived, class: FieldClass, ty: DataType, format: DataFormat) -> Self {
		Self {
			name: name.to_owned(),
			class,
			ty,
			format,
			array_size: 0,
			array_names: Vec::new(),
			derived: Some(derived),
		}
	}
}

/// Ordered list of the fields every state carries.
///
/// Nodal fields come first, then element fields, face fields, and derived fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldCatalog {
	fields: Vec<FieldInfo>,
	nodal: Vec<usize>,
	domain: Vec<usize>,
	surface: Vec<usize>,
}

impl FieldCatalog {
	/// Build the catalog for a dictionary, rejecting layouts that have no storage.
	pub fn from_dictionary(dictionary: &Dictionary) -> Result<Self> {
		let mut catalog = Self::default();
		for item in &dictionary.nodal {
			catalog.nodal.push(catalog.fields.len());
			catalog.fields.push(FieldInfo::stored(item, FieldClass::Node, DataFormat::Item)?);
		}
		for item in &dictionary.domain {
			catalog.domain.push(catalog.fields.len());
			catalog.fields.push(FieldInfo::stored(item, FieldClass::Element, item.format)?);
		}
		for item in &dictionary.surface {
			catalog.surface.push(catalog.fields.len());
			catalog.fields.push(FieldInfo::stored(item, FieldClass::Face, item.format)?);
		}

		let flags = dictionary.flags;
		if flags.displacement {
			catalog.fields.extend([
				FieldInfo::derived(
					"Lagrange strain",
					Derived::LagrangeStrain,
					FieldClass::Element,
					DataType::Mat3fs,
					DataFormat::Item,
				),
				FieldInfo::derived("position", Derived::Position, FieldClass::Node, DataType::Vec3f, DataFormat::Item),
				FieldInfo::derived(
					"initial position",
					Derived::InitialPosition,
					FieldClass::Node,
					DataType::Vec3f,
					DataFormat::Item,
				),
			]);
		}
		if flags.stress {
			catalog.fields.push(FieldInfo::derived(
				"pressure",
				Derived::Pressure,
				FieldClass::Element,
				DataType::Float,
				DataFormat::Item,
			));
			if flags.fluid_pressure {
				catalog.fields.push(FieldInfo::derived(
					"solid stress",
					Derived::SolidStress,
					FieldClass::Element,
					DataType::Mat3fs,
					DataFormat::Item,
				));
			}
		}
		if flags.nodal_stress {
			catalog.fields.push(FieldInfo::derived(
				"nodal pressure",
				Derived::NodalPressure,
				FieldClass::Element,
				DataType::Float,
				DataFormat::Node,
			));
		}
		Ok(catalog)
	}

	/// All fields in catalog order.
	pub fn fields(&self) -> &[FieldInfo] {
		&self.fields
	}

	/// Number of fields.
	pub fn len(&self) -> usize {
		self.fields.len()
	}

	/// Whether the catalog has no fields.
	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}

	/// Field at `index`.
	pub fn get(&self, index: usize) -> Option<&FieldInfo> {
		self.fields.get(index)
	}

	/// Index of the first field named `name`.
	pub fn find(&self, name: &str) -> Option<usize> {
		self.fields.iter().position(|field| field.name == name)
	}

	/// Catalog index of the dictionary item `index` in `category`.
	///
	/// Global items have no catalog entry.
	pub fn field_for(&self, category: DictCategory, index: usize) -> Option<usize> {
		match category {
			DictCategory::Global => None,
			DictCategory::Nodal => self.nodal.get(index).copied(),
			DictCategory::Domain => self.domain.get(index).copied(),
			DictCategory::Surface => self.surface.get(index).copied(),
		}
	}
}

/// Values stored per node, element, or face, with an active flag per entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemValues {
	/// `stride` floats per entry.
	pub values: Vec<f32>,
	/// Whether the entry received data in this state.
	pub active: Vec<bool>,
}

impl ItemValues {
	fn zeroed(items: usize, stride: usize) -> Result<Self> {
		Ok(Self {
			values: zeroed(items.saturating_mul(stride))?,
			active: falses(items)?,
		})
	}

	fn set(&mut self, item: usize, stride: usize, value: &[f32]) -> bool {
		let seen = self.active[item];
		self.values[item * stride..(item + 1) * stride].copy_from_slice(value);
		self.active[item] = true;
		seen
	}

	fn get(&self, item: usize, stride: usize) -> Option<&[f32]> {
		match self.active.get(item) {
			Some(true) => Some(&self.values[item * stride..(item + 1) * stride]),
			_ => None,
		}
	}
}

/// Layout of a field's values in one state.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValues {
	/// One value per item.
	Items(ItemValues),
	/// One value per node slot of each item.
	Slots {
		/// First slot of each item; `offsets[item + 1] - offsets[item]` slots per item.
		offsets: Vec<usize>,
		/// Per-slot values, `stride` floats each, with one active flag per item.
		slots: ItemValues,
		/// Last-written value per mesh node, kept for node-format fields.
		nodal: Option<ItemValues>,
	},
}

/// Materialized values of one field in one state.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldData {
	class: FieldClass,
	format: DataFormat,
	stride: usize,
	values: FieldValues,
}

impl FieldData {
	/// Allocate zeroed storage for `info` over `mesh`.
	pub fn allocate(info: &FieldInfo, mesh: &Mesh) -> Result<Self> {
		let stride = info.components();
		let values = match (info.class, info.format) {
			(FieldClass::Node, _) => FieldValues::Items(ItemValues::zeroed(mesh.node_count(), stride)?),
			(FieldClass::Element, DataFormat::Item | DataFormat::Region) => {
				FieldValues::Items(ItemValues::zeroed(mesh.element_count(), stride)?)
			}
			(FieldClass::Face, DataFormat::Item | DataFormat::Region) => FieldValues::Items(ItemValues::zeroed(mesh.face_count(), stride)?),
			(FieldClass::Element, format) => {
				let counts = (0..mesh.element_count()).map(|element| mesh.element_nodes(element).len());
				slot_values(counts, mesh.element_count(), mesh.node_count(), stride, format)?
			}
			(FieldClass::Face, format) => {
				let counts = mesh.faces().iter().map(|face| face.nodes.len());
				slot_values(counts, mesh.face_count(), mesh.node_count(), stride, format)?
			}
		};

		Ok(Self {
			class: info.class,
			format: info.format,
			stride,
			values,
		})
	}

	/// Entity class of the values.
	pub fn class(&self) -> FieldClass {
		self.class
	}

	/// Storage format.
	pub fn format(&self) -> DataFormat {
		self.format
	}

	/// Floats per value.
	pub fn stride(&self) -> usize {
		self.stride
	}

	/// Raw storage.
	pub fn values(&self) -> &FieldValues {
		&self.values
	}

	/// Whether `item` received data.
	pub fn is_active(&self, item: usize) -> bool {
		let active = match &self.values {
			FieldValues::Items(items) => &items.active,
			FieldValues::Slots { slots, .. } => &slots.active,
		};
		active.get(item).copied().unwrap_or(false)
	}

	/// Value of a per-item field.
	pub fn item(&self, item: usize) -> Option<&[f32]> {
		match &self.values {
			FieldValues::Items(items) => items.get(item, self.stride),
			FieldValues::Slots { .. } => None,
		}
	}

	/// All slot values of `item`, `stride` floats per slot.
	pub fn slots(&self, item: usize) -> Option<&[f32]> {
		match &self.values {
			FieldValues::Slots { offsets, slots, .. } if slots.active.get(item) == Some(&true) => {
				Some(&slots.values[offsets[item] * self.stride..offsets[item + 1] * self.stride])
			}
			_ => None,
		}
	}

	/// Value at mesh node `node`, for nodal fields and node-format fields.
	pub fn node_value(&self, node: usize) -> Option<&[f32]> {
		match (&self.values, self.class) {
			(FieldValues::Items(items), FieldClass::Node) => items.get(node, self.stride),
			(FieldValues::Slots { nodal: Some(nodal), .. }, _) => nodal.get(node, self.stride),
			_ => None,
		}
	}

	/// Value of element or face `item`, averaging multi-slot storage.
	///
	/// For nodal fields `item` is an element and the value is the mean over its nodes.
	pub fn element_value(&self, mesh: &Mesh, item: usize) -> Option<Vec<f32>> {
		match (&self.values, self.class) {
			(FieldValues::Items(_), FieldClass::Node) => {
				if item >= mesh.element_count() {
					return None;
				}
				let nodes = mesh.element_nodes(item);
				let values: Option<Vec<&[f32]>> = nodes.iter().map(|&node| self.node_value(node)).collect();
				Some(average(values?.into_iter(), self.stride))
			}
			(FieldValues::Items(_), _) => self.item(item).map(<[f32]>::to_vec),
			(FieldValues::Slots { .. }, _) => {
				let slots = self.slots(item)?;
				Some(average(slots.chunks_exact(self.stride), self.stride))
			}
		}
	}

	/// Store one value per mesh node.
	pub fn scatter_nodal(&mut self, field: &str, raw: &[f32]) -> Result<()> {
		let stride = self.stride;
		let FieldValues::Items(items) = &mut self.values else {
			return Err(layout_mismatch(field, 0, raw.len()));
		};
		let nodes = items.active.len();
		expect_len(field, nodes * stride, raw.len())?;
		items.values.copy_from_slice(raw);
		items.active.fill(true);
		Ok(())
	}

	/// Store one domain's block of element values.
	pub(crate) fn scatter_element_block(&mut self, field: &str, domain: &XDomain, node_count: usize, raw: &[f32]) -> Result<()> {
		let stride = self.stride;
		match (self.format, &mut self.values) {
			(DataFormat::Item, FieldValues::Items(items)) => {
				expect_len(field, domain.len() * stride, raw.len())?;
				for (value, element) in raw.chunks_exact(stride).zip(domain.elements()) {
					items.set(element, stride, value);
				}
			}
			(DataFormat::Region, FieldValues::Items(items)) => {
				expect_len(field, stride, raw.len())?;
				for element in domain.elements() {
					items.set(element, stride, raw);
				}
			}
			(DataFormat::Node, FieldValues::Slots { offsets, slots, nodal }) => {
				let (local, count) = first_seen_numbering(domain.nodes.iter().copied(), node_count)?;
				expect_len(field, count * stride, raw.len())?;
				for (index, element) in domain.elements().enumerate() {
					for (slot, &node) in domain.element_nodes(index).iter().enumerate() {
						let value = &raw[local[node] * stride..(local[node] + 1) * stride];
						write_slot(slots, offsets[element] + slot, stride, value);
						if let Some(nodal) = nodal.as_mut() {
							nodal.set(node, stride, value);
						}
					}
					slots.active[element] = true;
				}
			}
			(DataFormat::Mult, FieldValues::Slots { offsets, slots, .. }) => {
				let per_element = domain.ty.node_count() * stride;
				expect_len(field, domain.len() * per_element, raw.len())?;
				for (block, element) in raw.chunks_exact(per_element).zip(domain.elements()) {
					let start = offsets[element] * stride;
					slots.values[start..start + per_element].copy_from_slice(block);
					slots.active[element] = true;
				}
			}
			_ => return Err(layout_mismatch(field, 0, raw.len())),
		}
		Ok(())
	}

	/// Store one surface's block of face values.
	///
	/// Multi-slot values are reordered from the record's node order into the mesh face's node
	/// order before they are stored. Returns how many faces were written more than once.
	pub(crate) fn scatter_face_block(&mut self, field: &str, mesh: &Mesh, surface: &XSurface, raw: &[f32]) -> Result<usize> {
		let stride = self.stride;
		let records = surface.records.len();
		let mut duplicates = 0;

		match (self.format, &mut self.values) {
			(DataFormat::Item, FieldValues::Items(items)) => {
				expect_len(field, records * stride, raw.len())?;
				for (value, face) in raw.chunks_exact(stride).zip(&surface.resolved) {
					if let Some(face) = *face {
						duplicates += usize::from(items.set(face, stride, value));
					}
				}
			}
			(DataFormat::Region, FieldValues::Items(items)) => {
				expect_len(field, stride, raw.len())?;
				for face in surface.resolved.iter().flatten() {
					duplicates += usize::from(items.set(*face, stride, raw));
				}
			}
			(DataFormat::Node, FieldValues::Slots { offsets, slots, nodal }) => {
				let nodes = surface.records.iter().flat_map(|record| record.nodes.iter().copied());
				let (local, count) = first_seen_numbering(nodes, mesh.node_count())?;
				expect_len(field, count * stride, raw.len())?;
				for face in surface.resolved.iter().flatten().copied() {
					duplicates += usize::from(slots.active[face]);
					for (slot, &node) in mesh.face(face).nodes.iter().enumerate() {
						if local[node] == usize::MAX {
							continue;
						}
						let value = &raw[local[node] * stride..(local[node] + 1) * stride];
						write_slot(slots, offsets[face] + slot, stride, value);
						if let Some(nodal) = nodal.as_mut() {
							nodal.set(node, stride, value);
						}
					}
					slots.active[face] = true;
				}
			}
			(DataFormat::Mult, FieldValues::Slots { offsets, slots, .. }) => {
				let per_record = surface.max_nodes * stride;
				expect_len(field, records * per_record, raw.len())?;
				for (index, (record, face)) in surface.records.iter().zip(&surface.resolved).enumerate() {
					let Some(face) = *face else {
						continue;
					};
					duplicates += usize::from(slots.active[face]);
					let block = &raw[index * per_record..(index + 1) * per_record];
					for (slot, node) in mesh.face(face).nodes.iter().enumerate() {
						let Some(source) = record.nodes.iter().position(|candidate| candidate == node) else {
							continue;
						};
						write_slot(slots, offsets[face] + slot, stride, &block[source * stride..(source + 1) * stride]);
					}
					slots.active[face] = true;
				}
			}
			_ => return Err(layout_mismatch(field, 0, raw.len())),
		}
		Ok(duplicates)
	}
}

fn slot_values(
	counts: impl Iterator<Item = usize>,
	items: usize,
	nodes: usize,
	stride: usize,
	format: DataFormat,
) -> Result<FieldValues> {
	let mut offsets = Vec::new();
	offsets.try_reserve_exact(items + 1)?;
	offsets.push(0);
	for count in counts {
		offsets.push(offsets[offsets.len() - 1] + count);
	}
	let total = offsets[offsets.len() - 1];

	let slots = ItemValues {
		values: zeroed(total.saturating_mul(stride))?,
		active: falses(items)?,
	};
	let nodal = match format {
		DataFormat::Node => Some(ItemValues::zeroed(nodes, stride)?),
		_ => None,
	};
	Ok(FieldValues::Slots { offsets, slots, nodal })
}

fn write_slot(slots: &mut ItemValues, slot: usize, stride: usize, value: &[f32]) {
	slots.values[slot * stride..(slot + 1) * stride].copy_from_slice(value);
}

/// Number nodes by first appearance; unseen nodes map to `usize::MAX`.
fn first_seen_numbering(nodes: impl Iterator<Item = usize>, node_count: usize) -> Result<(Vec<usize>, usize)> {
	let mut local = Vec::new();
	local.try_reserve_exact(node_count)?;
	local.resize(node_count, usize::MAX);
	let mut count = 0;
	for node in nodes {
		if local[node] == usize::MAX {
			local[node] = count;
			count += 1;
		}
	}
	Ok((local, count))
}

fn average<'a>(values: impl Iterator<Item = &'a [f32]>, stride: usize) -> Vec<f32> {
	let mut sum = vec![0.0_f32; stride];
	let mut count = 0;
	for value in values {
		for (acc, component) in sum.iter_mut().zip(value) {
			*acc += component;
		}
		count += 1;
	}
	if count > 0 {
		for acc in &mut sum {
			*acc /= count as f32;
		}
	}
	sum
}

fn zeroed(len: usize) -> Result<Vec<f32>> {
	let mut out = Vec::new();
	out.try_reserve_exact(len)?;
	out.resize(len, 0.0);
	Ok(out)
}

fn falses(len: usize) -> Result<Vec<bool>> {
	let mut out = Vec::new();
	out.try_reserve_exact(len)?;
	out.resize(len, false);
	Ok(out)
}

fn expect_len(field: &str, expected: usize, got: usize) -> Result<()> {
	if expected == got {
		Ok(())
	} else {
		Err(Error::DataSizeMismatch {
			field: field.to_owned(),
			expected,
			got,
		})
	}
}

fn layout_mismatch(field: &str, expected: usize, got: usize) -> Error {
	Error::DataSizeMismatch {
		field: field.to_owned(),
		expected,
		got,
	}
}

#[cfg(test)]
mod tests;
