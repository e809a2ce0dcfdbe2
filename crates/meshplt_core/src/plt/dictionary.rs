use tracing::debug;

use crate::plt::chunk::{ChunkReader, ChunkStatus};
use crate::plt::tags;
use crate::{Error, Result};

/// Value type of a result field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
	/// Scalar.
	Float,
	/// 3-vector.
	Vec3f,
	/// Symmetric 3x3 tensor: xx, yy, zz, xy, yz, xz.
	Mat3fs,
	/// Diagonal 3x3 tensor.
	Mat3fd,
	/// Fourth-order tensor with major and minor symmetry.
	Tens4fs,
	/// Full 3x3 tensor, row major.
	Mat3f,
	/// Array of scalars.
	Array,
	/// Array of 3-vectors.
	ArrayVec3f,
}

impl DataType {
	/// Resolve an on-disk type code.
	pub fn from_code(code: u32) -> Result<Self> {
		Ok(match code {
			0 => Self::Float,
			1 => Self::Vec3f,
			2 => Self::Mat3fs,
			3 => Self::Mat3fd,
			4 => Self::Tens4fs,
			5 => Self::Mat3f,
			6 => Self::Array,
			7 => Self::ArrayVec3f,
			_ => return Err(Error::UnknownDataType { code }),
		})
	}

	/// On-disk type code.
	pub fn code(self) -> u32 {
		match self {
			Self::Float => 0,
			Self::Vec3f => 1,
			Self::Mat3fs => 2,
			Self::Mat3fd => 3,
			Self::Tens4fs => 4,
			Self::Mat3f => 5,
			Self::Array => 6,
			Self::ArrayVec3f => 7,
		}
	}

	/// Floats per value; `array_size` only matters for array types.
	pub fn components(self, array_size: usize) -> usize {
		match self {
			Self::Float => 1,
			Self::Vec3f => 3,
			Self::Mat3fs => 6,
			Self::Mat3fd => 3,
			Self::Tens4fs => 21,
			Self::Mat3f => 9,
			Self::Array => array_size,
			Self::ArrayVec3f => 3 * array_size,
		}
	}

	/// Whether the type carries an array size.
	pub fn is_array(self) -> bool {
		matches!(self, Self::Array | Self::ArrayVec3f)
	}

	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Float => "float",
			Self::Vec3f => "vec3f",
			Self::Mat3fs => "mat3fs",
			Self::Mat3fd => "mat3fd",
			Self::Tens4fs => "tens4fs",
			Self::Mat3f => "mat3f",
			Self::Array => "array",
			Self::ArrayVec3f => "array_vec3f",
		}
	}
}

/// Storage granularity of a result field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataFormat {
	/// One value per node of the element or face.
	Node,
	/// One value per element or face.
	Item,
	/// One value per node slot of each element or face, stored independently.
	Mult,
	/// One value for the whole domain or surface.
	Region,
}

impl DataFormat {
	/// Resolve an on-disk format code.
	pub fn from_code(code: u32) -> Result<Self> {
		Ok(match code {
			0 => Self::Node,
			1 => Self::Item,
			2 => Self::Mult,
			3 => Self::Region,
			_ => return Err(Error::UnknownDataFormat { code }),
		})
	}

	/// On-disk format code.
	pub fn code(self) -> u32 {
		match self {
			Self::Node => 0,
			Self::Item => 1,
			Self::Mult => 2,
			Self::Region => 3,
		}
	}

	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Node => "node",
			Self::Item => "item",
			Self::Mult => "mult",
			Self::Region => "region",
		}
	}
}

/// Dictionary section an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DictCategory {
	/// Model-wide values.
	Global,
	/// Per-node values.
	Nodal,
	/// Per-element values, written per domain.
	Domain,
	/// Per-face values, written per surface.
	Surface,
}

impl DictCategory {
	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Global => "global",
			Self::Nodal => "nodal",
			Self::Domain => "domain",
			Self::Surface => "surface",
		}
	}
}

/// Descriptor of one result field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictItem {
	/// Value type.
	pub ty: DataType,
	/// Storage format.
	pub format: DataFormat,
	/// Field name, with any `prefix=` removed.
	pub name: String,
	/// Component count of array types, zero otherwise.
	pub array_size: usize,
	/// Component names of array types.
	pub array_names: Vec<String>,
}

impl DictItem {
	/// Floats per value.
	pub fn components(&self) -> usize {
		self.ty.components(self.array_size)
	}

	fn read(reader: &mut ChunkReader<'_>) -> Result<Self> {
		let mut ty = None;
		let mut format = None;
		let mut name = String::new();
		let mut array_size = 0;
		let mut array_names = Vec::new();

		while let ChunkStatus::Open(id) = reader.open_chunk()? {
			match id {
				tags::DIC_ITEM_TYPE => ty = Some(DataType::from_code(reader.read_u32()?)?),
				tags::DIC_ITEM_FMT => format = Some(DataFormat::from_code(reader.read_u32()?)?),
				tags::DIC_ITEM_ARRAYSIZE => array_size = reader.read_u32()? as usize,
				tags::DIC_ITEM_ARRAYNAME => array_names.push(reader.read_name()?),
				tags::DIC_ITEM_NAME => {
					let raw = reader.read_name()?;
					name = match raw.split_once('=') {
						Some((_, field)) => field.to_owned(),
						None => raw,
					};
				}
				_ => return Err(Error::UnexpectedChunk { section: "dictionary item", id }),
			}
			reader.close_chunk()?;
		}

		Ok(Self {
			ty: ty.ok_or(Error::MissingChunk {
				section: "dictionary item",
				what: "type",
			})?,
			format: format.ok_or(Error::MissingChunk {
				section: "dictionary item",
				what: "format",
			})?,
			name,
			array_size,
			array_names,
		})
	}
}

/// Presence of the fields that trigger derived fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DerivedFlags {
	/// Nodal `displacement`.
	pub displacement: bool,
	/// Element `stress`.
	pub stress: bool,
	/// Element `nodal stress`.
	pub nodal_stress: bool,
	/// Element `shell thickness`.
	pub shell_thickness: bool,
	/// Element `fluid pressure`.
	pub fluid_pressure: bool,
	/// Element `elasticity`.
	pub elasticity: bool,
}

/// Field descriptors grouped by category.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dictionary {
	/// Global items.
	pub global: Vec<DictItem>,
	/// Nodal items.
	pub nodal: Vec<DictItem>,
	/// Element items.
	pub domain: Vec<DictItem>,
	/// Face items.
	pub surface: Vec<DictItem>,
	/// Derived-field triggers found by exact name match.
	pub flags: DerivedFlags,
}

impl Dictionary {
	/// Parse the children of an open dictionary chunk.
	pub fn read(reader: &mut ChunkReader<'_>) -> Result<Self> {
		let mut dictionary = Self::default();
		while let ChunkStatus::Open(id) = reader.open_chunk()? {
			let category = match id {
				tags::DIC_GLOBAL => DictCategory::Global,
				tags::DIC_NODAL => DictCategory::Nodal,
				tags::DIC_DOMAIN => DictCategory::Domain,
				tags::DIC_SURFACE => DictCategory::Surface,
				_ => return Err(Error::UnexpectedChunk { section: "dictionary", id }),
			};
			dictionary.read_items(reader, category)?;
			reader.close_chunk()?;
		}

		debug!(
			global = dictionary.global.len(),
			nodal = dictionary.nodal.len(),
			domain = dictionary.domain.len(),
			surface = dictionary.surface.len(),
			"read dictionary"
		);
		Ok(dictionary)
	}

	/// Items of one category.
	pub fn items(&self, category: DictCategory) -> &[DictItem] {
		match category {
			DictCategory::Global => &self.global,
			DictCategory::Nodal => &self.nodal,
			DictCategory::Domain => &self.domain,
			DictCategory::Surface => &self.surface,
		}
	}

	/// Look up the item a 1-based state variable id refers to.
	pub fn item(&self, category: DictCategory, id: i64) -> Result<(usize, &DictItem)> {
		let items = self.items(category);
		usize::try_from(id - 1)
			.ok()
			.and_then(|index| items.get(index).map(|item| (index, item)))
			.ok_or(Error::DictIndexOutOfRange {
				category: category.as_str(),
				index: id,
				len: items.len(),
			})
	}

	/// Append an item, updating the derived-field flags.
	pub fn push(&mut self, category: DictCategory, item: DictItem) {
		let flags = &mut self.flags;
		match category {
			DictCategory::Nodal => flags.displacement |= item.name == "displacement",
			DictCategory::Domain => match item.name.as_str() {
				"stress" => flags.stress = true,
				"nodal stress" => flags.nodal_stress = true,
				"shell thickness" => flags.shell_thickness = true,
				"fluid pressure" => flags.fluid_pressure = true,
				"elasticity" => flags.elasticity = true,
				_ => {}
			},
			_ => {}
		}

		match category {
			DictCategory::Global => self.global.push(item),
			DictCategory::Nodal => self.nodal.push(item),
			DictCategory::Domain => self.domain.push(item),
			DictCategory::Surface => self.surface.push(item),
		}
	}

	fn read_items(&mut self, reader: &mut ChunkReader<'_>, category: DictCategory) -> Result<()> {
		while let ChunkStatus::Open(id) = reader.open_chunk()? {
			if id != tags::DIC_ITEM {
				return Err(Error::UnexpectedChunk {
					section: category.as_str(),
					id,
				});
			}
			let item = DictItem::read(reader)?;
			self.push(category, item);
			reader.close_chunk()?;
		}
		Ok(())
	}
}
