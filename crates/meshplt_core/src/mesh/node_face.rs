use crate::mesh::Mesh;

/// Faces incident to each node, in face index order.
#[derive(Debug, Clone, Default)]
pub struct NodeFaceTable {
	offsets: Vec<usize>,
	faces: Vec<usize>,
}

impl NodeFaceTable {
	/// Build the table from the mesh's current face list.
	pub fn build(mesh: &Mesh) -> Self {
		let mut counts = vec![0_usize; mesh.node_count() + 1];
		for face in mesh.faces() {
			for &node in &face.nodes {
				counts[node + 1] += 1;
			}
		}
		for i in 1..counts.len() {
			counts[i] += counts[i - 1];
		}

		let offsets = counts.clone();
		let mut cursor = counts;
		let mut faces = vec![0_usize; offsets[mesh.node_count()]];
		for (index, face) in mesh.faces().iter().enumerate() {
			for &node in &face.nodes {
				faces[cursor[node]] = index;
				cursor[node] += 1;
			}
		}

		Self { offsets, faces }
	}

	/// Faces touching `node`.
	pub fn faces_at(&self, node: usize) -> &[usize] {
		match (self.offsets.get(node), self.offsets.get(node + 1)) {
			(Some(&start), Some(&end)) => &self.faces[start..end],
			_ => &[],
		}
	}

	/// Find the face whose node set equals `nodes`, searching the faces touching `nodes[0]`.
	pub fn find_face(&self, mesh: &Mesh, nodes: &[usize]) -> Option<usize> {
		let first = *nodes.first()?;
		self.faces_at(first).iter().copied().find(|&index| {
			let face = &mesh.face(index).nodes;
			face.len() == nodes.len() && nodes.iter().all(|node| face.contains(node))
		})
	}
}
