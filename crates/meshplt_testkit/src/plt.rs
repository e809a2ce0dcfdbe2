//! Archive fixtures written with [`ChunkBuilder`].

use meshplt::plt::{Compression, tags};

use crate::ChunkBuilder;

/// Dictionary item to write into the root section.
#[derive(Debug, Clone)]
pub struct DictEntry {
	/// Category chunk id, one of the `tags::DIC_*` category ids.
	pub category: u32,
	/// Field name.
	pub name: String,
	/// Data type code.
	pub ty: u32,
	/// Storage format code.
	pub format: u32,
	/// Array size for array types.
	pub array_size: Option<u32>,
}

impl DictEntry {
	/// Nodal item.
	pub fn nodal(name: &str, ty: u32) -> Self {
		Self::new(tags::DIC_NODAL, name, ty, FMT_ITEM)
	}

	/// Element item.
	pub fn domain(name: &str, ty: u32, format: u32) -> Self {
		Self::new(tags::DIC_DOMAIN, name, ty, format)
	}

	/// Face item.
	pub fn surface(name: &str, ty: u32, format: u32) -> Self {
		Self::new(tags::DIC_SURFACE, name, ty, format)
	}

	/// Global item.
	pub fn global(name: &str, ty: u32) -> Self {
		Self::new(tags::DIC_GLOBAL, name, ty, FMT_ITEM)
	}

	/// Set the array size.
	pub fn with_array_size(mut self, size: u32) -> Self {
		self.array_size = Some(size);
		self
	}

	fn new(category: u32, name: &str, ty: u32, format: u32) -> Self {
		Self {
			category,
			name: name.to_owned(),
			ty,
			format,
			array_size: None,
		}
	}
}

/// Scalar type code.
pub const TYPE_FLOAT: u32 = 0;
/// 3-vector type code.
pub const TYPE_VEC3F: u32 = 1;
/// Symmetric tensor type code.
pub const TYPE_MAT3FS: u32 = 2;
/// Scalar array type code.
pub const TYPE_ARRAY: u32 = 6;
/// Vector array type code.
pub const TYPE_ARRAY_VEC3F: u32 = 7;
/// Per element node format code.
pub const FMT_NODE: u32 = 0;
/// Per item format code.
pub const FMT_ITEM: u32 = 1;
/// Per slot format code.
pub const FMT_MULT: u32 = 2;
/// Per region format code.
pub const FMT_REGION: u32 = 3;

/// Element domain to write into a mesh section.
#[derive(Debug, Clone)]
pub struct DomainFixture {
	/// Element type code.
	pub ty: u32,
	/// 1-based part id.
	pub part: i32,
	/// Zero-based node indices per element.
	pub elements: Vec<Vec<i32>>,
}

/// Surface to write into a mesh section.
#[derive(Debug, Clone)]
pub struct SurfaceFixture {
	/// Largest facet node count.
	pub max_nodes: u32,
	/// Zero-based node indices per face record.
	pub faces: Vec<Vec<i32>>,
}

/// Mesh section contents.
#[derive(Debug, Clone, Default)]
pub struct MeshFixture {
	/// Node coordinates.
	pub nodes: Vec<[f32; 3]>,
	/// Element domains.
	pub domains: Vec<DomainFixture>,
	/// Surfaces.
	pub surfaces: Vec<SurfaceFixture>,
	/// Node sets as zero-based node indices.
	pub node_sets: Vec<Vec<i32>>,
	/// Part names; no parts section is written when empty.
	pub parts: Vec<String>,
}

impl MeshFixture {
	/// Two unit hex8 elements side by side along x, sharing the face at `x = 1`.
	///
	/// Nodes `0..6` lie on `z = 0` and `6..12` on `z = 1`, each layer ordered by row
	/// `(0,0) (1,0) (2,0) (0,1) (1,1) (2,1)`.
	pub fn two_hexes() -> Self {
		let mut nodes = Vec::new();
		for z in 0..2 {
			for y in 0..2 {
				for x in 0..3 {
					nodes.push([x as f32, y as f32, z as f32]);
				}
			}
		}
		Self {
			nodes,
			domains: vec![DomainFixture {
				ty: 0,
				part: 1,
				elements: vec![vec![0, 1, 4, 3, 6, 7, 10, 9], vec![1, 2, 5, 4, 7, 8, 11, 10]],
			}],
			surfaces: vec![SurfaceFixture {
				max_nodes: 4,
				faces: vec![vec![0, 1, 4, 3], vec![1, 2, 5, 4]],
			}],
			node_sets: vec![vec![0, 3, 6, 9]],
			parts: vec!["solid".to_owned()],
		}
	}
}

/// One state variable with its per-region blocks.
#[derive(Debug, Clone)]
pub struct VariableFixture {
	/// Data category chunk id, one of `tags::*_DATA`.
	pub category: u32,
	/// 1-based dictionary index within the category.
	pub id: u32,
	/// `(region tag, values)` blocks.
	pub blocks: Vec<(u32, Vec<f32>)>,
}

impl VariableFixture {
	/// Nodal variable covering the whole mesh.
	pub fn nodal(id: u32, values: Vec<f32>) -> Self {
		Self {
			category: tags::NODE_DATA,
			id,
			blocks: vec![(0, values)],
		}
	}

	/// Element variable with one block per domain tag.
	pub fn domain(id: u32, blocks: Vec<(u32, Vec<f32>)>) -> Self {
		Self {
			category: tags::ELEMENT_DATA,
			id,
			blocks,
		}
	}

	/// Face variable with one block per surface tag.
	pub fn surface(id: u32, blocks: Vec<(u32, Vec<f32>)>) -> Self {
		Self {
			category: tags::FACE_DATA,
			id,
			blocks,
		}
	}

	/// Global variable.
	pub fn global(id: u32, values: Vec<f32>) -> Self {
		Self {
			category: tags::GLOBAL_DATA,
			id,
			blocks: vec![(0, values)],
		}
	}
}

/// State section contents.
#[derive(Debug, Clone, Default)]
pub struct StateFixture {
	/// Simulation time.
	pub time: f32,
	/// Variables in write order.
	pub variables: Vec<VariableFixture>,
	/// Element visibility words.
	pub element_state: Option<Vec<u32>>,
}

impl StateFixture {
	/// State at `time` with the given variables.
	pub fn at(time: f32, variables: Vec<VariableFixture>) -> Self {
		Self {
			time,
			variables,
			element_state: None,
		}
	}
}

/// Writer for complete archives.
#[derive(Debug)]
pub struct ArchiveBuilder {
	out: ChunkBuilder,
	ends: Vec<usize>,
	compression: Compression,
}

impl ArchiveBuilder {
	/// Start an archive with the magic word and a root section holding `dictionary`.
	pub fn new(dictionary: &[DictEntry]) -> Self {
		Self::with_compression(dictionary, Compression::None)
	}

	/// Start an archive whose mesh and state sections are each written as one zstd frame.
	pub fn compressed(dictionary: &[DictEntry]) -> Self {
		Self::with_compression(dictionary, Compression::Zstd)
	}

	fn with_compression(dictionary: &[DictEntry], compression: Compression) -> Self {
		let mut out = ChunkBuilder::with_magic(tags::PLT_MAGIC);
		out.begin(tags::ROOT);
		out.begin(tags::HEADER)
			.leaf_u32(tags::HDR_VERSION, tags::PLT_VERSION)
			.leaf_u32(tags::HDR_COMPRESSION, compression.code())
			.leaf_name(tags::HDR_SOFTWARE, "meshplt fixture")
			.end();
		out.begin(tags::DICTIONARY);
		for category in [tags::DIC_GLOBAL, tags::DIC_NODAL, tags::DIC_DOMAIN, tags::DIC_SURFACE] {
			out.begin(category);
			for entry in dictionary.iter().filter(|entry| entry.category == category) {
				out.begin(tags::DIC_ITEM)
					.leaf_u32(tags::DIC_ITEM_TYPE, entry.ty)
					.leaf_u32(tags::DIC_ITEM_FMT, entry.format);
				if let Some(size) = entry.array_size {
					out.leaf_u32(tags::DIC_ITEM_ARRAYSIZE, size);
				}
				out.leaf_name(tags::DIC_ITEM_NAME, &entry.name).end();
			}
			out.end();
		}
		out.end().end();
		let ends = vec![out.len()];
		Self { out, ends, compression }
	}

	/// Append a mesh section.
	pub fn mesh(&mut self, mesh: &MeshFixture) -> &mut Self {
		let mut out = ChunkBuilder::new();

		out.begin(tags::NODE_SECTION);
		out.begin(tags::NODE_HEADER)
			.leaf_u32(tags::NODE_SIZE, mesh.nodes.len() as u32)
			.leaf_u32(tags::NODE_DIM, 3)
			.end();
		out.begin(tags::NODE_COORDS);
		for (index, node) in mesh.nodes.iter().enumerate() {
			out.i32(index as i32 + 1).f32s(node);
		}
		out.end().end();

		out.begin(tags::DOMAIN_SECTION);
		let mut next_id = 1;
		for domain in &mesh.domains {
			out.begin(tags::DOMAIN);
			out.begin(tags::DOMAIN_HDR)
				.leaf_u32(tags::DOM_ELEM_TYPE, domain.ty)
				.leaf_i32(tags::DOM_PART_ID, domain.part)
				.leaf_u32(tags::DOM_ELEMS, domain.elements.len() as u32)
				.end();
			out.begin(tags::DOM_ELEM_LIST);
			for element in &domain.elements {
				out.begin(tags::ELEMENT).i32(next_id).i32s(element).end();
				next_id += 1;
			}
			out.end().end();
		}
		out.end();

		if !mesh.surfaces.is_empty() {
			out.begin(tags::SURFACE_SECTION);
			for (index, surface) in mesh.surfaces.iter().enumerate() {
				out.begin(tags::SURFACE);
				out.begin(tags::SURFACE_HDR)
					.leaf_i32(tags::SURFACE_ID, index as i32 + 1)
					.leaf_u32(tags::SURFACE_FACES, surface.faces.len() as u32)
					.leaf_u32(tags::SURFACE_MAX_FACET_NODES, surface.max_nodes)
					.end();
				out.begin(tags::FACE_LIST);
				for (face, nodes) in surface.faces.iter().enumerate() {
					out.begin(tags::FACE).i32(face as i32 + 1).i32(nodes.len() as i32).i32s(nodes);
					for _ in nodes.len()..surface.max_nodes as usize {
						out.i32(-1);
					}
					out.end();
				}
				out.end().end();
			}
			out.end();
		}

		if !mesh.node_sets.is_empty() {
			out.begin(tags::NODESET_SECTION);
			for (index, nodes) in mesh.node_sets.iter().enumerate() {
				out.begin(tags::NODESET);
				out.begin(tags::NODESET_HDR)
					.leaf_i32(tags::NODESET_ID, index as i32 + 1)
					.leaf_u32(tags::NODESET_SIZE, nodes.len() as u32)
					.end();
				out.leaf_i32s(tags::NODESET_LIST, nodes).end();
			}
			out.end();
		}

		if !mesh.parts.is_empty() {
			out.begin(tags::PARTS_SECTION);
			for (index, name) in mesh.parts.iter().enumerate() {
				out.begin(tags::PART)
					.leaf_u32(tags::PART_ID, index as u32 + 1)
					.leaf_name(tags::PART_NAME, name)
					.end();
			}
			out.end();
		}

		self.push_section(tags::MESH, &out)
	}

	/// Append a state section.
	pub fn state(&mut self, state: &StateFixture) -> &mut Self {
		let mut out = ChunkBuilder::new();
		out.begin(tags::STATE_HEADER).leaf_f32(tags::STATE_HDR_TIME, state.time).end();

		out.begin(tags::STATE_DATA);
		for category in [tags::GLOBAL_DATA, tags::NODE_DATA, tags::ELEMENT_DATA, tags::FACE_DATA] {
			let variables: Vec<_> = state.variables.iter().filter(|variable| variable.category == category).collect();
			if variables.is_empty() {
				continue;
			}
			out.begin(category);
			for variable in variables {
				out.begin(tags::STATE_VARIABLE).leaf_u32(tags::STATE_VAR_ID, variable.id);
				out.begin(tags::STATE_VAR_DATA);
				for (tag, values) in &variable.blocks {
					out.leaf_f32s(*tag, values);
				}
				out.end().end();
			}
			out.end();
		}
		out.end();

		if let Some(flags) = &state.element_state {
			out.begin(tags::MESH_STATE).begin(tags::ELEMENT_STATE);
			for flag in flags {
				out.u32(*flag);
			}
			out.end().end();
		}

		self.push_section(tags::STATE, &out)
	}

	fn push_section(&mut self, id: u32, section: &ChunkBuilder) -> &mut Self {
		let body = section.finish();
		let payload = match self.compression {
			Compression::None => body,
			Compression::Zstd => zstd::encode_all(body.as_slice(), 3).expect("zstd encodes"),
		};
		self.out.begin(id).bytes(&payload).end();
		self.ends.push(self.out.len());
		self
	}

	/// Byte offsets just past the root and each appended section, in order.
	pub fn section_ends(&self) -> &[usize] {
		&self.ends
	}

	/// Finished archive bytes.
	pub fn finish(&self) -> Vec<u8> {
		self.out.finish()
	}
}
