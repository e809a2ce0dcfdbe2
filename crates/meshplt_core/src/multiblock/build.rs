use nalgebra::Point3;
use tracing::info;

use crate::mesh::{Edge, ElementInfo, ElementType, Face, Mesh, Node, StorageKind};
use crate::multiblock::{MultiBlock, grading};
use crate::{Error, Result};

/// Affine map from a block face slot's lattice onto its face record's lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct FaceMap {
	origin: [i64; 2],
	u: [i64; 2],
	v: [i64; 2],
}

impl FaceMap {
	pub(super) const IDENTITY: Self = Self {
		origin: [0, 0],
		u: [1, 0],
		v: [0, 1],
	};

	/// Build the map for a slot whose corner `k` is record corner `(start + step * k) % 4`.
	pub(super) fn new(start: usize, step: usize, nx: usize, ny: usize) -> Self {
		let (nx, ny) = (nx as i64, ny as i64);
		let corner = |k: usize| match k % 4 {
			0 => [0, 0],
			1 => [nx, 0],
			2 => [nx, ny],
			_ => [0, ny],
		};
		let origin = corner(start);
		let unit = |to: [i64; 2]| [(to[0] - origin[0]).signum(), (to[1] - origin[1]).signum()];
		Self {
			origin,
			u: unit(corner(start + step)),
			v: unit(corner(start + 3 * step)),
		}
	}

	fn apply(self, i: usize, j: usize) -> (usize, usize) {
		let (i, j) = (i as i64, j as i64);
		let x = self.origin[0] + i * self.u[0] + j * self.v[0];
		let y = self.origin[1] + i * self.u[1] + j * self.v[1];
		(x as usize, y as usize)
	}
}

/// First global node index of every entity's interior range.
///
/// Corners keep their own index; edge, face, and block interiors follow in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct NodeOffsets {
	pub(super) edges: Vec<usize>,
	pub(super) faces: Vec<usize>,
	pub(super) blocks: Vec<usize>,
	pub(super) total: usize,
}

impl NodeOffsets {
	pub(super) fn assign(mb: &MultiBlock) -> Self {
		let mut next = mb.corners.len();
		let mut take = |count: usize| {
			let at = next;
			next += count;
			at
		};

		let edges = mb.edges.iter().map(|edge| take(edge.zoning.n - 1)).collect();
		let faces = mb.faces.iter().map(|face| take((face.zoning[0].n - 1) * (face.zoning[1].n - 1))).collect();
		let blocks = mb
			.blocks
			.iter()
			.map(|block| {
				let [x, y, z] = block.zoning;
				take((x.n - 1) * (y.n - 1) * (z.n - 1))
			})
			.collect();

		Self {
			edges,
			faces,
			blocks,
			total: next,
		}
	}
}

/// Position of a lattice coordinate along an axis with `n` subdivisions.
enum Side {
	Start,
	End,
	Inner(usize),
}

fn side(i: usize, n: usize) -> Side {
	if i == 0 {
		Side::Start
	} else if i == n {
		Side::End
	} else {
		Side::Inner(i - 1)
	}
}

impl MultiBlock {
	/// Global node index of lattice point `(i, j, k)` of `block`.
	///
	/// Points on the block boundary resolve through the shared face, edge, and corner records, so
	/// adjacent blocks agree on every node they share.
	pub fn block_node_index(&self, block: usize, i: usize, j: usize, k: usize) -> Result<usize> {
		self.ensure_current()?;
		Ok(self.block_node(block, i, j, k))
	}

	/// Global node index of lattice point `(i, j)` of face record `face`.
	pub fn face_node_index(&self, face: usize, i: usize, j: usize) -> Result<usize> {
		self.ensure_current()?;
		Ok(self.face_node(face, i, j))
	}

	/// Global node index of lattice point `i` of edge record `edge`.
	pub fn edge_node_index(&self, edge: usize, i: usize) -> Result<usize> {
		self.ensure_current()?;
		Ok(self.edge_node(edge, i))
	}

	/// Node count from inclusion-exclusion over blocks, internal faces, internal edges, and
	/// internal corners.
	pub fn closed_form_node_count(&self) -> Result<usize> {
		self.ensure_current()?;

		let mut count: i64 = 0;
		for block in &self.blocks {
			count += block.zoning.iter().map(|zoning| zoning.n as i64 + 1).product::<i64>();
		}
		for face in self.faces.iter().filter(|face| !face.external) {
			count -= face.zoning.iter().map(|zoning| zoning.n as i64 + 1).product::<i64>();
		}
		for edge in self.edges.iter().filter(|edge| !edge.external) {
			count += edge.zoning.n as i64 + 1;
		}
		count -= self.corners.iter().filter(|corner| !corner.external).count() as i64;
		Ok(count.max(0) as usize)
	}

	/// Generate the hex8 mesh of the current topology.
	///
	/// Nodes are written corners first, then edge, face, and block interiors. Faces and edges
	/// with a region id are emitted as quad4 faces and line segments; nothing else is, so a
	/// topology without face regions yields a mesh without faces.
	pub fn build_mesh(&self) -> Result<Mesh> {
		self.ensure_current()?;

		let element_count = self.blocks.iter().map(|block| block.zoning.iter().map(|zoning| zoning.n).product::<usize>()).sum();
		let mut mesh = Mesh::with_capacity(StorageKind::Hex8, self.offsets.total, element_count);
		self.build_nodes(&mut mesh);
		self.build_elements(&mut mesh)?;
		self.build_faces_into(&mut mesh);
		self.build_edges_into(&mut mesh);
		mesh.link_faces();

		info!(
			nodes = mesh.node_count(),
			elements = mesh.element_count(),
			faces = mesh.face_count(),
			edges = mesh.edge_count(),
			"built multi-block mesh"
		);
		Ok(mesh)
	}

	fn ensure_current(&self) -> Result<()> {
		if self.stale {
			return Err(Error::StaleTopology);
		}
		Ok(())
	}

	fn build_nodes(&self, mesh: &mut Mesh) {
		let push = |mesh: &mut Mesh, position: Point3<f64>, region: Option<u32>| {
			let id = mesh.node_count() as i32 + 1;
			let mut node = Node::new(position, id);
			node.region = region;
			mesh.add_node(node);
		};

		for corner in &self.corners {
			push(mesh, corner.position, corner.region);
		}

		for edge in &self.edges {
			let r1 = self.corners[edge.nodes[0]].position.coords;
			let r2 = self.corners[edge.nodes[1]].position.coords;
			let rs = grading::positions(edge.zoning);
			for &r in &rs[1..edge.zoning.n] {
				push(mesh, Point3::from(r1 * (1.0 - r) + r2 * r), None);
			}
		}

		for face in &self.faces {
			let [r1, r2, r3, r4] = face.nodes.map(|node| self.corners[node].position.coords);
			let rs = grading::positions(face.zoning[0]);
			let ss = grading::positions(face.zoning[1]);
			for &s in &ss[1..face.zoning[1].n] {
				for &r in &rs[1..face.zoning[0].n] {
					let p = r1 * ((1.0 - r) * (1.0 - s)) + r2 * (r * (1.0 - s)) + r3 * (r * s) + r4 * ((1.0 - r) * s);
					push(mesh, Point3::from(p), None);
				}
			}
		}

		for block in &self.blocks {
			let c = block.nodes.map(|node| self.corners[node].position.coords);
			let [x, y, z] = block.zoning;
			let (rs, ss, ts) = (grading::positions(x), grading::positions(y), grading::positions(z));
			for &t in &ts[1..z.n] {
				for &s in &ss[1..y.n] {
					for &r in &rs[1..x.n] {
						let bottom = c[0] * ((1.0 - r) * (1.0 - s)) + c[1] * (r * (1.0 - s)) + c[2] * (r * s) + c[3] * ((1.0 - r) * s);
						let top = c[4] * ((1.0 - r) * (1.0 - s)) + c[5] * (r * (1.0 - s)) + c[6] * (r * s) + c[7] * ((1.0 - r) * s);
						push(mesh, Point3::from(bottom * (1.0 - t) + top * t), None);
					}
				}
			}
		}
	}

	fn build_elements(&self, mesh: &mut Mesh) -> Result<()> {
		let mut id = 0;
		for (index, block) in self.blocks.iter().enumerate() {
			let [x, y, z] = block.zoning;
			for k in 0..z.n {
				for j in 0..y.n {
					for i in 0..x.n {
						let nodes = [
							self.block_node(index, i, j, k),
							self.block_node(index, i + 1, j, k),
							self.block_node(index, i + 1, j + 1, k),
							self.block_node(index, i, j + 1, k),
							self.block_node(index, i, j, k + 1),
							self.block_node(index, i + 1, j, k + 1),
							self.block_node(index, i + 1, j + 1, k + 1),
							self.block_node(index, i, j + 1, k + 1),
						];
						id += 1;
						mesh.add_element(ElementType::Hex8, &nodes, ElementInfo::new(id, None, block.region))?;
					}
				}
			}
		}
		Ok(())
	}

	fn build_faces_into(&self, mesh: &mut Mesh) {
		for (index, face) in self.faces.iter().enumerate() {
			let Some(region) = face.region else {
				continue;
			};
			for i in 0..face.zoning[0].n {
				for j in 0..face.zoning[1].n {
					let nodes = [
						self.face_node(index, i, j),
						self.face_node(index, i + 1, j),
						self.face_node(index, i + 1, j + 1),
						self.face_node(index, i, j + 1),
					];
					if let Some(quad) = Face::new(&nodes, Some(region)) {
						mesh.add_face(quad);
					}
				}
			}
		}
	}

	fn build_edges_into(&self, mesh: &mut Mesh) {
		for (index, edge) in self.edges.iter().enumerate() {
			if edge.region.is_none() {
				continue;
			}
			for i in 0..edge.zoning.n {
				mesh.add_edge(Edge {
					nodes: [self.edge_node(index, i), self.edge_node(index, i + 1)],
					region: edge.region,
				});
			}
		}
	}

	fn block_node(&self, block: usize, i: usize, j: usize, k: usize) -> usize {
		let [x, y, z] = self.blocks[block].zoning;
		let (nx, ny) = (x.n, y.n);
		match (side(i, nx), side(j, ny), side(k, z.n)) {
			(Side::Start, _, _) => self.block_face_node(block, 3, ny - j, k),
			(Side::End, _, _) => self.block_face_node(block, 1, j, k),
			(_, Side::Start, _) => self.block_face_node(block, 0, i, k),
			(_, Side::End, _) => self.block_face_node(block, 2, nx - i, k),
			(_, _, Side::Start) => self.block_face_node(block, 4, i, ny - j),
			(_, _, Side::End) => self.block_face_node(block, 5, i, j),
			(Side::Inner(a), Side::Inner(b), Side::Inner(c)) => self.offsets.blocks[block] + a + b * (nx - 1) + c * (nx - 1) * (ny - 1),
		}
	}

	fn block_face_node(&self, block: usize, slot: usize, i: usize, j: usize) -> usize {
		let (fi, fj) = self.face_maps[block][slot].apply(i, j);
		self.face_node(self.blocks[block].faces[slot], fi, fj)
	}

	fn face_node(&self, face: usize, i: usize, j: usize) -> usize {
		let record = &self.faces[face];
		let (nx, ny) = (record.zoning[0].n, record.zoning[1].n);
		match (side(i, nx), side(j, ny)) {
			(Side::Start, _) => self.face_edge_node(face, 3, ny - j),
			(Side::End, _) => self.face_edge_node(face, 1, j),
			(_, Side::Start) => self.face_edge_node(face, 0, i),
			(_, Side::End) => self.face_edge_node(face, 2, nx - i),
			(Side::Inner(a), Side::Inner(b)) => self.offsets.faces[face] + a + b * (nx - 1),
		}
	}

	fn face_edge_node(&self, face: usize, slot: usize, t: usize) -> usize {
		let record = &self.faces[face];
		let edge = record.edges[slot];
		let t = if record.edge_flipped[slot] { self.edges[edge].zoning.n - t } else { t };
		self.edge_node(edge, t)
	}

	fn edge_node(&self, edge: usize, i: usize) -> usize {
		let record = &self.edges[edge];
		match side(i, record.zoning.n) {
			Side::Start => record.nodes[0],
			Side::End => record.nodes[1],
			Side::Inner(a) => self.offsets.edges[edge] + a,
		}
	}
}
