use tracing::debug;

use crate::multiblock::build::{FaceMap, NodeOffsets};
use crate::multiblock::{MbEdge, MbFace, MultiBlock};
use crate::{Error, Result};

impl MultiBlock {
	/// Bring the derived topology in line with the current nodes and blocks.
	///
	/// Runs the block neighbour search, face deduplication, face neighbour search, and edge
	/// deduplication in that order, then precomputes face orientations and node offsets. Every
	/// edit marks the topology stale; the whole sequence reruns each time.
	pub fn update(&mut self) -> Result<()> {
		self.stale = true;
		self.validate()?;

		let partners = self.find_block_neighbours()?;
		self.build_faces(&partners);
		self.find_face_neighbours();
		self.build_edges()?;
		self.mark_external_corners();
		self.face_maps = self.orient_faces()?;
		self.offsets = NodeOffsets::assign(self);

		self.stale = false;
		debug!(
			blocks = self.blocks.len(),
			faces = self.faces.len(),
			edges = self.edges.len(),
			nodes = self.offsets.total,
			"multi-block topology updated"
		);
		Ok(())
	}

	fn validate(&self) -> Result<()> {
		let mut used = vec![false; self.corners.len()];
		for (index, block) in self.blocks.iter().enumerate() {
			for (slot, &node) in block.nodes.iter().enumerate() {
				if node >= self.corners.len() {
					return Err(Error::CornerOutOfRange {
						block: index,
						node,
						nodes: self.corners.len(),
					});
				}
				if block.nodes[..slot].contains(&node) {
					return Err(Error::DegenerateBlock { block: index, node });
				}
				used[node] = true;
			}

			for (axis, zoning) in block.zoning.iter().enumerate() {
				if zoning.n == 0 || !(zoning.ratio > 0.0 && zoning.ratio.is_finite()) {
					return Err(Error::InvalidZoning {
						block: index,
						axis,
						n: zoning.n,
						ratio: zoning.ratio,
					});
				}
			}
		}

		if let Some(node) = used.iter().position(|used| !used) {
			return Err(Error::DanglingNode { node });
		}
		Ok(())
	}

	/// Link blocks sharing a face. Returns, per block and slot, the partner's matching slot.
	fn find_block_neighbours(&mut self) -> Result<Vec<[Option<usize>; 6]>> {
		let node_blocks = incidence(self.corners.len(), self.blocks.iter().map(|block| block.nodes.as_slice()));
		let mut partners = vec![[None; 6]; self.blocks.len()];
		for block in &mut self.blocks {
			block.neighbours = [None; 6];
		}

		for index in 0..self.blocks.len() {
			for slot in 0..6 {
				if self.blocks[index].neighbours[slot].is_some() {
					continue;
				}

				let face = self.blocks[index].face_nodes(slot);
				let mut matches = node_blocks[face[0]].iter().filter(|&&other| other != index).filter_map(|&other| {
					(0..6)
						.find(|&candidate| same_face(&self.blocks[other].face_nodes(candidate), &face))
						.map(|candidate| (other, candidate))
				});

				let Some((other, other_slot)) = matches.next() else {
					continue;
				};
				if let Some((second, _)) = matches.next() {
					return Err(Error::FaceOverclaimed {
						block: index,
						nodes: face,
						first: other,
						second,
					});
				}
				if let Some(owner) = self.blocks[other].neighbours[other_slot] {
					return Err(Error::FaceOverclaimed {
						block: index,
						nodes: face,
						first: other,
						second: owner,
					});
				}

				self.blocks[index].neighbours[slot] = Some(other);
				self.blocks[other].neighbours[other_slot] = Some(index);
				partners[index][slot] = Some(other_slot);
				partners[other][other_slot] = Some(slot);
			}
		}

		for block in &mut self.blocks {
			block.external = block.neighbours.iter().any(Option::is_none);
		}
		Ok(partners)
	}

	/// Create one face record per open slot and one per shared pair of slots.
	fn build_faces(&mut self, partners: &[[Option<usize>; 6]]) {
		self.faces.clear();
		let mut closed = vec![false; self.blocks.len()];

		for index in 0..self.blocks.len() {
			for slot in 0..6 {
				let block = &self.blocks[index];
				let neighbour = block.neighbours[slot];
				let reuse = match (neighbour, partners[index][slot]) {
					(Some(other), Some(other_slot)) if closed[other] => Some(self.blocks[other].faces[other_slot]),
					_ => None,
				};

				if let Some(face) = reuse {
					if self.faces[face].region.is_none() {
						self.faces[face].region = block.face_regions[slot];
					}
					self.blocks[index].faces[slot] = face;
					continue;
				}

				let face = MbFace {
					nodes: block.face_nodes(slot),
					block: index,
					other: neighbour,
					zoning: block.face_zoning(slot),
					edges: [0; 4],
					edge_flipped: [false; 4],
					neighbours: [None; 4],
					region: block.face_regions[slot],
					external: neighbour.is_none(),
				};
				self.faces.push(face);
				self.blocks[index].faces[slot] = self.faces.len() - 1;
			}
			closed[index] = true;
		}
	}

	/// Link external faces that share a side.
	fn find_face_neighbours(&mut self) {
		let node_faces = incidence(self.corners.len(), self.faces.iter().map(|face| face.nodes.as_slice()));
		for face in &mut self.faces {
			face.neighbours = [None; 4];
		}

		for index in 0..self.faces.len() {
			if !self.faces[index].external {
				continue;
			}
			for side in 0..4 {
				if self.faces[index].neighbours[side].is_some() {
					continue;
				}
				let a = self.faces[index].nodes[side];
				let b = self.faces[index].nodes[(side + 1) % 4];
				let found = node_faces[a]
					.iter()
					.copied()
					.filter(|&other| other != index && self.faces[other].external)
					.find_map(|other| side_index(&self.faces[other].nodes, a, b).map(|other_side| (other, other_side)));

				if let Some((other, other_side)) = found {
					self.faces[index].neighbours[side] = Some(other);
					self.faces[other].neighbours[other_side] = Some(index);
				}
			}
		}
	}

	/// Create one edge record per distinct corner pair.
	fn build_edges(&mut self) -> Result<()> {
		self.edges.clear();

		for index in 0..self.faces.len() {
			for side in 0..4 {
				let face = &self.faces[index];
				let a = face.nodes[side];
				let b = face.nodes[(side + 1) % 4];
				let axis = face.zoning[side % 2];
				let external = face.external;

				let edge = match self.edges.iter().position(|edge| edge.joins(a, b)) {
					Some(edge) => {
						let existing = &mut self.edges[edge];
						if existing.zoning.n != axis.n {
							return Err(Error::ZoningMismatch {
								what: "edge",
								index: edge,
								expected: existing.zoning.n,
								got: axis.n,
							});
						}
						if external {
							match existing.faces {
								[None, _] => existing.faces[0] = Some(index),
								_ => existing.faces[1] = Some(index),
							}
						}
						edge
					}
					None => {
						let zoning = if side < 2 { axis } else { axis.reversed() };
						self.edges.push(MbEdge {
							nodes: [a, b],
							zoning,
							faces: [external.then_some(index), None],
							region: self.edge_regions.get(&edge_key(a, b)).copied(),
							external: false,
						});
						self.edges.len() - 1
					}
				};

				let flipped = self.edges[edge].nodes[0] != a;
				let face = &mut self.faces[index];
				face.edges[side] = edge;
				face.edge_flipped[side] = flipped;
			}
		}

		for face in &self.faces {
			if face.external {
				for &edge in &face.edges {
					self.edges[edge].external = true;
				}
			}
		}
		Ok(())
	}

	/// Flag corners touched by an external face.
	///
	/// Membership in an external block is not enough: the centre corner of a 2x2x2 grid sits only
	/// in external blocks yet is interior, and the closed-form node count subtracts it as such.
	fn mark_external_corners(&mut self) {
		for corner in &mut self.corners {
			corner.external = false;
		}
		for face in &self.faces {
			if face.external {
				for &node in &face.nodes {
					self.corners[node].external = true;
				}
			}
		}
	}

	/// Map every block face slot onto the lattice of its shared face record.
	fn orient_faces(&self) -> Result<Vec<[FaceMap; 6]>> {
		let mut maps = Vec::with_capacity(self.blocks.len());
		for (index, block) in self.blocks.iter().enumerate() {
			let mut block_maps = [FaceMap::IDENTITY; 6];
			for (slot, map) in block_maps.iter_mut().enumerate() {
				let record = block.faces[slot];
				let face = &self.faces[record];
				let local = block.face_nodes(slot);
				let Some((start, step)) = alignment(&face.nodes, &local) else {
					return Err(Error::FaceOrientation { block: index, face: slot });
				};

				let local_zoning = block.face_zoning(slot);
				let along_x = (start % 2 == 0 && step == 1) || (start % 2 == 1 && step == 3);
				let expected = if along_x {
					[face.zoning[0].n, face.zoning[1].n]
				} else {
					[face.zoning[1].n, face.zoning[0].n]
				};
				for (axis, zoning) in local_zoning.iter().enumerate() {
					if zoning.n != expected[axis] {
						return Err(Error::ZoningMismatch {
							what: "face",
							index: record,
							expected: expected[axis],
							got: zoning.n,
						});
					}
				}

				*map = FaceMap::new(start, step, face.zoning[0].n, face.zoning[1].n);
			}
			maps.push(block_maps);
		}
		Ok(maps)
	}
}

/// Entity lists per corner node.
fn incidence<'a>(nodes: usize, items: impl Iterator<Item = &'a [usize]>) -> Vec<Vec<usize>> {
	let mut table = vec![Vec::new(); nodes];
	for (index, item) in items.enumerate() {
		for &node in item {
			table[node].push(index);
		}
	}
	table
}

/// Whether two corner loops describe the same quad, in either winding.
pub(super) fn same_face(a: &[usize; 4], b: &[usize; 4]) -> bool {
	alignment(a, b).is_some()
}

/// Find `(start, step)` so that `b[k] == a[(start + step * k) % 4]`, with `step` 1 or 3.
pub(super) fn alignment(a: &[usize; 4], b: &[usize; 4]) -> Option<(usize, usize)> {
	let start = a.iter().position(|&node| node == b[0])?;
	[1, 3].into_iter().find(|&step| (1..4).all(|k| a[(start + step * k) % 4] == b[k])).map(|step| (start, step))
}

fn side_index(nodes: &[usize; 4], a: usize, b: usize) -> Option<usize> {
	(0..4).find(|&side| {
		let (m, n) = (nodes[side], nodes[(side + 1) % 4]);
		(m == a && n == b) || (m == b && n == a)
	})
}

pub(super) fn edge_key(a: usize, b: usize) -> (usize, usize) {
	if a < b { (a, b) } else { (b, a) }
}
