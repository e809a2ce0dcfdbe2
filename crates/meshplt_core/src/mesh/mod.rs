use std::collections::HashMap;

use nalgebra::Point3;
use smallvec::SmallVec;
use tracing::debug;

use crate::{Error, Result};

mod element;
mod node_face;
mod storage;

/// Element shape catalog and facet tables.
pub use element::{ElementType, FaceType, MAX_ELEMENT_NODES};
/// Node to face incidence lookup.
pub use node_face::NodeFaceTable;
/// Element connectivity layouts.
pub use storage::{ElementStore, LinearCell, MixedCell, StorageKind};

/// Mesh node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
	/// Node coordinates.
	pub position: Point3<f64>,
	/// File-assigned id, or `index + 1` for generated meshes.
	pub id: i32,
	/// Region id, `None` when the node is not tagged.
	pub region: Option<u32>,
	/// Whether the node is referenced by an enabled element.
	pub enabled: bool,
}

impl Node {
	/// Create an enabled, untagged node.
	pub fn new(position: Point3<f64>, id: i32) -> Self {
		Self {
			position,
			id,
			region: None,
			enabled: true,
		}
	}
}

/// Per-element attributes stored next to connectivity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementInfo {
	/// File-assigned id, or `index + 1` for generated meshes.
	pub id: i32,
	/// Zero-based material index, `None` for unassigned.
	pub material: Option<usize>,
	/// Region (block or domain) id.
	pub region: u32,
	/// Visibility derived from the material registry.
	pub enabled: bool,
}

impl ElementInfo {
	/// Create an enabled element record.
	pub fn new(id: i32, material: Option<usize>, region: u32) -> Self {
		Self {
			id,
			material,
			region,
			enabled: true,
		}
	}
}

/// Mesh facet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face {
	/// Facet shape.
	pub ty: FaceType,
	/// Facet nodes in canonical order.
	pub nodes: SmallVec<[usize; 9]>,
	/// Region id; derived faces inherit the owning element's region.
	pub region: Option<u32>,
	/// Owning element and its local face slot, once linked.
	pub element: Option<(usize, usize)>,
}

impl Face {
	/// Create an unlinked face, inferring its shape from the node count.
	pub fn new(nodes: &[usize], region: Option<u32>) -> Option<Self> {
		let ty = FaceType::from_node_count(nodes.len())?;
		Some(Self {
			ty,
			nodes: SmallVec::from_slice(nodes),
			region,
			element: None,
		})
	}
}

/// Mesh line segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
	/// End nodes.
	pub nodes: [usize; 2],
	/// Region id.
	pub region: Option<u32>,
}

/// Named node group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSet {
	/// File-assigned id.
	pub id: i32,
	/// Display name.
	pub name: String,
	/// Zero-based node indices.
	pub nodes: Vec<usize>,
}

/// Named face group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
	/// File-assigned id.
	pub id: i32,
	/// Display name.
	pub name: String,
	/// Zero-based mesh face indices.
	pub faces: Vec<usize>,
}

/// Named element group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
	/// File-assigned id.
	pub id: i32,
	/// Display name.
	pub name: String,
	/// Zero-based element indices.
	pub elements: Vec<usize>,
}

/// Named material with a visibility toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Material {
	/// Display name.
	pub name: String,
	/// Whether elements of this material are shown.
	pub enabled: bool,
}

impl Material {
	/// Create an enabled material.
	pub fn new(name: impl Into<String>) -> Self {
		Self { name: name.into(), enabled: true }
	}
}

/// Source of material visibility used by the enable pass.
pub trait MaterialRegistry {
	/// Number of registered materials.
	fn material_count(&self) -> usize;
	/// Whether material `index` is enabled; unknown indices count as enabled.
	fn is_enabled(&self, index: usize) -> bool;
}

impl MaterialRegistry for [Material] {
	fn material_count(&self) -> usize {
		self.len()
	}

	fn is_enabled(&self, index: usize) -> bool {
		self.get(index).is_none_or(|material| material.enabled)
	}
}

impl MaterialRegistry for Vec<Material> {
	fn material_count(&self) -> usize {
		self.as_slice().material_count()
	}

	fn is_enabled(&self, index: usize) -> bool {
		self.as_slice().is_enabled(index)
	}
}

/// Finite element mesh: nodes, elements, facets, edges, and named groups.
#[derive(Debug, Clone)]
pub struct Mesh {
	nodes: Vec<Node>,
	store: ElementStore,
	elements: Vec<ElementInfo>,
	faces: Vec<Face>,
	edges: Vec<Edge>,
	node_sets: Vec<NodeSet>,
	surfaces: Vec<Surface>,
	parts: Vec<Part>,
}

impl Mesh {
	/// Create an empty mesh with the given element layout.
	pub fn new(kind: StorageKind) -> Self {
		Self::with_capacity(kind, 0, 0)
	}

	/// Create an empty mesh with reserved node and element slots.
	pub fn with_capacity(kind: StorageKind, nodes: usize, elements: usize) -> Self {
		Self {
			nodes: Vec::with_capacity(nodes),
			store: ElementStore::with_capacity(kind, elements),
			elements: Vec::with_capacity(elements),
			faces: Vec::new(),
			edges: Vec::new(),
			node_sets: Vec::new(),
			surfaces: Vec::new(),
			parts: Vec::new(),
		}
	}

	/// Layout currently used for connectivity.
	pub fn storage_kind(&self) -> StorageKind {
		self.store.kind()
	}

	/// Append a node and return its index.
	pub fn add_node(&mut self, node: Node) -> usize {
		self.nodes.push(node);
		self.nodes.len() - 1
	}

	/// Append an element and return its index.
	///
	/// Every node index must already exist.
	pub fn add_element(&mut self, ty: ElementType, nodes: &[usize], info: ElementInfo) -> Result<usize> {
		if nodes.len() < ty.node_count() {
			return Err(Error::DataSizeMismatch {
				field: format!("{} connectivity", ty.as_str()),
				expected: ty.node_count(),
				got: nodes.len(),
			});
		}
		if let Some(&node) = nodes[..ty.node_count()].iter().find(|&&node| node >= self.nodes.len()) {
			return Err(Error::NodeIndexOutOfRange {
				node: node as i64,
				nodes: self.nodes.len(),
			});
		}

		self.store.push(ty, nodes);
		self.elements.push(info);
		Ok(self.elements.len() - 1)
	}

	/// Append a face and return its index.
	pub fn add_face(&mut self, face: Face) -> usize {
		self.faces.push(face);
		self.faces.len() - 1
	}

	/// Append an edge and return its index.
	pub fn add_edge(&mut self, edge: Edge) -> usize {
		self.edges.push(edge);
		self.edges.len() - 1
	}

	/// Register a node set.
	pub fn add_node_set(&mut self, set: NodeSet) {
		self.node_sets.push(set);
	}

	/// Register a surface.
	pub fn add_surface(&mut self, surface: Surface) {
		self.surfaces.push(surface);
	}

	/// Register a part.
	pub fn add_part(&mut self, part: Part) {
		self.parts.push(part);
	}

	/// Number of nodes.
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	/// Number of elements.
	pub fn element_count(&self) -> usize {
		self.elements.len()
	}

	/// Number of faces.
	pub fn face_count(&self) -> usize {
		self.faces.len()
	}

	/// Number of edges.
	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	/// Node `index`.
	pub fn node(&self, index: usize) -> &Node {
		&self.nodes[index]
	}

	/// Mutable node `index`.
	pub fn node_mut(&mut self, index: usize) -> &mut Node {
		&mut self.nodes[index]
	}

	/// All nodes.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Attributes of element `index`.
	pub fn element(&self, index: usize) -> &ElementInfo {
		&self.elements[index]
	}

	/// Mutable attributes of element `index`.
	pub fn element_mut(&mut self, index: usize) -> &mut ElementInfo {
		&mut self.elements[index]
	}

	/// Attributes of all elements.
	pub fn elements(&self) -> &[ElementInfo] {
		&self.elements
	}

	/// Type of element `index`.
	pub fn element_type(&self, index: usize) -> ElementType {
		self.store.element_type(index)
	}

	/// Node list of element `index`.
	pub fn element_nodes(&self, index: usize) -> &[usize] {
		self.store.nodes(index)
	}

	/// Face `index`.
	pub fn face(&self, index: usize) -> &Face {
		&self.faces[index]
	}

	/// All faces.
	pub fn faces(&self) -> &[Face] {
		&self.faces
	}

	/// Edge `index`.
	pub fn edge(&self, index: usize) -> &Edge {
		&self.edges[index]
	}

	/// All edges.
	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// Registered node sets.
	pub fn node_sets(&self) -> &[NodeSet] {
		&self.node_sets
	}

	/// Registered surfaces.
	pub fn surfaces(&self) -> &[Surface] {
		&self.surfaces
	}

	/// Registered parts.
	pub fn parts(&self) -> &[Part] {
		&self.parts
	}

	/// Arithmetic mean of the element's node positions.
	pub fn element_center(&self, index: usize) -> Point3<f64> {
		let nodes = self.element_nodes(index);
		let mut sum = Point3::origin().coords;
		for &node in nodes {
			sum += self.nodes[node].position.coords;
		}
		Point3::from(sum / nodes.len().max(1) as f64)
	}

	/// Derive element and node visibility from `materials`.
	///
	/// Elements with no material, or a material the registry does not know, stay enabled.
	/// Nodes are enabled iff an enabled element references them.
	pub fn apply_material_visibility<R: MaterialRegistry + ?Sized>(&mut self, materials: &R) {
		for info in &mut self.elements {
			info.enabled = info.material.is_none_or(|material| materials.is_enabled(material));
		}

		for node in &mut self.nodes {
			node.enabled = false;
		}
		for element in 0..self.elements.len() {
			if !self.elements[element].enabled {
				continue;
			}
			for &node in self.store.nodes(element) {
				self.nodes[node].enabled = true;
			}
		}
	}

	/// Finalize derived topology.
	///
	/// Derives the exterior faces of enabled elements when no faces were supplied, then links
	/// every face to the element that owns it.
	pub fn update(&mut self) {
		if self.faces.is_empty() {
			self.build_faces();
		}
		self.link_faces();
	}

	/// Rebuild the exterior face list from the enabled elements.
	///
	/// A facet is exterior when exactly one enabled element contributes it. Faces are emitted in
	/// element order, each in the owning element's canonical node order.
	pub fn build_faces(&mut self) {
		let mut seen: HashMap<FaceKey, (usize, usize, usize)> = HashMap::new();
		let mut order = Vec::new();

		for element in 0..self.elements.len() {
			if !self.elements[element].enabled {
				continue;
			}
			let nodes = self.store.nodes(element);
			for (local, facet) in self.store.element_type(element).faces().iter().enumerate() {
				let key = face_key(facet.iter().map(|&slot| nodes[slot]));
				let entry = seen.entry(key.clone()).or_insert_with(|| {
					order.push(key);
					(0, element, local)
				});
				entry.0 += 1;
			}
		}

		self.faces.clear();
		for key in order {
			let Some(&(count, element, local)) = seen.get(&key) else {
				continue;
			};
			if count != 1 {
				continue;
			}

			let nodes = self.store.nodes(element);
			let facet = self.store.element_type(element).faces()[local];
			let face_nodes: SmallVec<[usize; 9]> = facet.iter().map(|&slot| nodes[slot]).collect();
			if let Some(mut face) = Face::new(&face_nodes, Some(self.elements[element].region)) {
				face.element = Some((element, local));
				self.faces.push(face);
			}
		}
		debug!(faces = self.faces.len(), "derived exterior faces");
	}

	/// Attach every unowned face to the element facet with the same node set.
	pub(crate) fn link_faces(&mut self) {
		if self.faces.iter().all(|face| face.element.is_some()) {
			return;
		}

		let mut owners: HashMap<FaceKey, (usize, usize)> = HashMap::new();
		for element in 0..self.elements.len() {
			let nodes = self.store.nodes(element);
			for (local, facet) in self.store.element_type(element).faces().iter().enumerate() {
				owners.entry(face_key(facet.iter().map(|&slot| nodes[slot]))).or_insert((element, local));
			}
		}

		for face in &mut self.faces {
			if face.element.is_none() {
				face.element = owners.get(&face_key(face.nodes.iter().copied())).copied();
			}
		}
	}
}

type FaceKey = SmallVec<[usize; 9]>;

fn face_key(nodes: impl Iterator<Item = usize>) -> FaceKey {
	let mut key: FaceKey = nodes.collect();
	key.sort_unstable();
	key
}

#[cfg(test)]
mod tests;
