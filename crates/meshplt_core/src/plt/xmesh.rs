use smallvec::SmallVec;
use tracing::debug;

use crate::mesh::ElementType;
use crate::plt::chunk::{ChunkReader, ChunkStatus};
use crate::plt::tags;
use crate::{Error, Result};

/// Largest face record the surface section may declare.
const MAX_FACET_NODES: usize = 10;

/// Staged node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct XNode {
	pub id: i32,
	pub position: [f32; 3],
}

/// Staged element domain.
///
/// Elements of a domain occupy the dense index range `first..first + len()`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct XDomain {
	pub ty: ElementType,
	pub part: i32,
	pub name: Option<String>,
	pub first: usize,
	pub ids: Vec<i32>,
	pub nodes: Vec<usize>,
}

impl XDomain {
	pub fn len(&self) -> usize {
		self.ids.len()
	}

	pub fn element_nodes(&self, local: usize) -> &[usize] {
		let stride = self.ty.node_count();
		&self.nodes[local * stride..(local + 1) * stride]
	}

	/// Dense element indices of this domain.
	pub fn elements(&self) -> std::ops::Range<usize> {
		self.first..self.first + self.len()
	}
}

/// Staged surface face record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FaceRecord {
	pub id: i32,
	pub nodes: SmallVec<[usize; 9]>,
}

/// Staged surface with its mesh face resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct XSurface {
	pub id: i32,
	pub name: Option<String>,
	pub max_nodes: usize,
	pub records: Vec<FaceRecord>,
	/// Mesh face per record, filled when the mesh is built.
	pub resolved: Vec<Option<usize>>,
}

/// Staged node set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct XNodeSet {
	pub id: i32,
	pub name: Option<String>,
	pub nodes: Vec<usize>,
}

/// Raw mesh section contents before the mesh is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct XMesh {
	pub nodes: Vec<XNode>,
	pub domains: Vec<XDomain>,
	pub surfaces: Vec<XSurface>,
	pub node_sets: Vec<XNodeSet>,
	/// Part names in part order, when the section is present.
	pub parts: Option<Vec<String>>,
}

impl XMesh {
	/// Parse the children of an open mesh chunk.
	pub fn read(reader: &mut ChunkReader<'_>) -> Result<Self> {
		let mut mesh = Self::default();
		while let ChunkStatus::Open(id) = reader.open_chunk()? {
			match id {
				tags::NODE_SECTION => mesh.read_node_section(reader)?,
				tags::DOMAIN_SECTION => mesh.read_domain_section(reader)?,
				tags::SURFACE_SECTION => mesh.read_surface_section(reader)?,
				tags::NODESET_SECTION => mesh.read_node_set_section(reader)?,
				tags::PARTS_SECTION => mesh.read_parts_section(reader)?,
				_ => return Err(Error::UnexpectedChunk { section: "mesh", id }),
			}
			reader.close_chunk()?;
		}

		debug!(
			nodes = mesh.nodes.len(),
			domains = mesh.domains.len(),
			surfaces = mesh.surfaces.len(),
			node_sets = mesh.node_sets.len(),
			"read mesh section"
		);
		Ok(mesh)
	}

	/// Total element count over all domains.
	pub fn element_count(&self) -> usize {
		self.domains.iter().map(XDomain::len).sum()
	}

	fn read_node_section(&mut self, reader: &mut ChunkReader<'_>) -> Result<()> {
		let mut count = 0_usize;
		let mut dim = 0_usize;
		while let ChunkStatus::Open(id) = reader.open_chunk()? {
			match id {
				tags::NODE_HEADER => {
					while let ChunkStatus::Open(field) = reader.open_chunk()? {
						match field {
							tags::NODE_SIZE => count = reader.read_u32()? as usize,
							tags::NODE_DIM => dim = reader.read_u32()? as usize,
							_ => {}
						}
						reader.close_chunk()?;
					}
				}
				tags::NODE_COORDS => {
					if count == 0 || !(1..=3).contains(&dim) {
						return Err(Error::InvalidNodeHeader);
					}
					self.nodes.try_reserve_exact(count)?;
					for _ in 0..count {
						let id = reader.read_i32()?;
						let mut position = [0.0_f32; 3];
						for value in position.iter_mut().take(dim) {
							*value = reader.read_f32()?;
						}
						self.nodes.push(XNode { id, position });
					}
				}
				_ => return Err(Error::UnexpectedChunk { section: "node section", id }),
			}
			reader.close_chunk()?;
		}
		Ok(())
	}

	fn read_domain_section(&mut self, reader: &mut ChunkReader<'_>) -> Result<()> {
		while let ChunkStatus::Open(id) = reader.open_chunk()? {
			if id != tags::DOMAIN {
				return Err(Error::UnexpectedChunk { section: "domain section", id });
			}
			let domain = self.read_domain(reader)?;
			self.domains.push(domain);
			reader.close_chunk()?;
		}
		Ok(())
	}

	fn read_domain(&self, reader: &mut ChunkReader<'_>) -> Result<XDomain> {
		let mut ty = None;
		let mut part = 0;
		let mut declared = 0_usize;
		let mut name = None;
		let mut ids = Vec::new();
		let mut nodes = Vec::new();

		while let ChunkStatus::Open(id) = reader.open_chunk()? {
			match id {
				tags::DOMAIN_HDR => {
					while let ChunkStatus::Open(field) = reader.open_chunk()? {
						match field {
							tags::DOM_ELEM_TYPE => ty = Some(tags::element_type(reader.read_u32()?)?),
							tags::DOM_PART_ID => part = reader.read_i32()?,
							tags::DOM_ELEMS => declared = reader.read_u32()? as usize,
							tags::DOM_NAME => name = Some(reader.read_name()?).filter(|name| !name.is_empty()),
							_ => return Err(Error::UnexpectedChunk { section: "domain header", id: field }),
						}
						reader.close_chunk()?;
					}
				}
				tags::DOM_ELEM_LIST => {
					let ty = ty.ok_or(Error::MissingChunk {
						section: "domain",
						what: "element type",
					})?;
					let stride = ty.node_count();
					ids.try_reserve_exact(declared)?;
					nodes.try_reserve_exact(declared.saturating_mul(stride))?;
					while let ChunkStatus::Open(element) = reader.open_chunk()? {
						if element != tags::ELEMENT {
							return Err(Error::UnexpectedChunk {
								section: "element list",
								id: element,
							});
						}
						let record = reader.read_i32s(stride + 1)?;
						ids.push(record[0]);
						for &node in &record[1..] {
							nodes.push(self.node_index(node)?);
						}
						reader.close_chunk()?;
					}
				}
				_ => return Err(Error::UnexpectedChunk { section: "domain", id }),
			}
			reader.close_chunk()?;
		}

		let ty = ty.ok_or(Error::MissingChunk {
			section: "domain",
			what: "element type",
		})?;
		if ids.len() != declared {
			return Err(Error::CountMismatch {
				what: "domain",
				index: self.domains.len(),
				declared,
				listed: ids.len(),
			});
		}

		Ok(XDomain {
			ty,
			part,
			name,
			first: self.element_count(),
			ids,
			nodes,
		})
	}

	fn read_surface_section(&mut self, reader: &mut ChunkReader<'_>) -> Result<()> {
		while let ChunkStatus::Open(id) = reader.open_chunk()? {
			if id != tags::SURFACE {
				return Err(Error::UnexpectedChunk { section: "surface section", id });
			}
			let surface = self.read_surface(reader)?;
			self.surfaces.push(surface);
			reader.close_chunk()?;
		}
		Ok(())
	}

	fn read_surface(&self, reader: &mut ChunkReader<'_>) -> Result<XSurface> {
		let mut surface = XSurface {
			id: 0,
			name: None,
			max_nodes: 4,
			records: Vec::new(),
			resolved: Vec::new(),
		};
		let mut declared = 0_usize;

		while let ChunkStatus::Open(id) = reader.open_chunk()? {
			match id {
				tags::SURFACE_HDR => {
					while let ChunkStatus::Open(field) = reader.open_chunk()? {
						match field {
							tags::SURFACE_ID => surface.id = reader.read_i32()?,
							tags::SURFACE_FACES => declared = reader.read_u32()? as usize,
							tags::SURFACE_NAME => surface.name = Some(reader.read_name()?).filter(|name| !name.is_empty()),
							tags::SURFACE_MAX_FACET_NODES => surface.max_nodes = reader.read_u32()? as usize,
							_ => return Err(Error::UnexpectedChunk { section: "surface header", id: field }),
						}
						reader.close_chunk()?;
					}
				}
				tags::FACE_LIST => {
					if surface.max_nodes == 0 || surface.max_nodes > MAX_FACET_NODES {
						return Err(Error::InvalidFaceRecord {
							nodes: surface.max_nodes as i64,
							max: MAX_FACET_NODES,
						});
					}
					surface.records.try_reserve_exact(declared)?;
					while let ChunkStatus::Open(face) = reader.open_chunk()? {
						if face != tags::FACE {
							return Err(Error::UnexpectedChunk { section: "face list", id: face });
						}
						let record = reader.read_i32s(surface.max_nodes + 2)?;
						let count = record[1];
						let limit = surface.max_nodes.min(9);
						let Some(count) = usize::try_from(count).ok().filter(|count| (1..=limit).contains(count)) else {
							return Err(Error::InvalidFaceRecord {
								nodes: i64::from(count),
								max: limit,
							});
						};
						let mut nodes = SmallVec::new();
						for &node in &record[2..2 + count] {
							nodes.push(self.node_index(node)?);
						}
						surface.records.push(FaceRecord { id: record[0], nodes });
						reader.close_chunk()?;
					}
				}
				_ => return Err(Error::UnexpectedChunk { section: "surface", id }),
			}
			reader.close_chunk()?;
		}

		if surface.records.len() != declared {
			return Err(Error::CountMismatch {
				what: "surface",
				index: self.surfaces.len(),
				declared,
				listed: surface.records.len(),
			});
		}
		Ok(surface)
	}

	fn read_node_set_section(&mut self, reader: &mut ChunkReader<'_>) -> Result<()> {
		while let ChunkStatus::Open(id) = reader.open_chunk()? {
			if id != tags::NODESET {
				return Err(Error::UnexpectedChunk { section: "node set section", id });
			}

			let mut set = XNodeSet {
				id: 0,
				name: None,
				nodes: Vec::new(),
			};
			let mut size = 0_usize;
			while let ChunkStatus::Open(child) = reader.open_chunk()? {
				match child {
					tags::NODESET_HDR => {
						while let ChunkStatus::Open(field) = reader.open_chunk()? {
							match field {
								tags::NODESET_ID => set.id = reader.read_i32()?,
								tags::NODESET_SIZE => size = reader.read_u32()? as usize,
								tags::NODESET_NAME => set.name = Some(reader.read_name()?).filter(|name| !name.is_empty()),
								_ => return Err(Error::UnexpectedChunk { section: "node set header", id: field }),
							}
							reader.close_chunk()?;
						}
					}
					tags::NODESET_LIST => {
						let raw = reader.read_i32s(size)?;
						set.nodes.try_reserve_exact(raw.len())?;
						for node in raw {
							set.nodes.push(self.node_index(node)?);
						}
					}
					_ => return Err(Error::UnexpectedChunk { section: "node set", id: child }),
				}
				reader.close_chunk()?;
			}
			self.node_sets.push(set);
			reader.close_chunk()?;
		}
		Ok(())
	}

	fn read_parts_section(&mut self, reader: &mut ChunkReader<'_>) -> Result<()> {
		let mut parts = Vec::new();
		while let ChunkStatus::Open(id) = reader.open_chunk()? {
			if id != tags::PART {
				return Err(Error::UnexpectedChunk { section: "parts section", id });
			}
			let mut name = String::new();
			while let ChunkStatus::Open(field) = reader.open_chunk()? {
				if field == tags::PART_NAME {
					name = reader.read_name()?;
				}
				reader.close_chunk()?;
			}
			parts.push(name);
			reader.close_chunk()?;
		}
		self.parts = Some(parts);
		Ok(())
	}

	fn node_index(&self, node: i32) -> Result<usize> {
		usize::try_from(node)
			.ok()
			.filter(|&index| index < self.nodes.len())
			.ok_or(Error::NodeIndexOutOfRange {
				node: i64::from(node),
				nodes: self.nodes.len(),
			})
	}
}
