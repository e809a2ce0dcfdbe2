use nalgebra::Point3;
use tracing::{debug, warn};

use crate::mesh::{ElementInfo, Material, MaterialRegistry, Mesh, Node, NodeFaceTable, NodeSet, Part, StorageKind, Surface};
use crate::plt::reader::UnresolvedFacePolicy;
use crate::plt::xmesh::XMesh;
use crate::{Error, Result};

/// Turn staged mesh records into a finished mesh.
///
/// Runs the material enable pass before faces are derived, then resolves surface records
/// through the node to face table and records the resolution on the staged surfaces.
pub(crate) fn build_mesh<R>(xmesh: &mut XMesh, materials: &R, policy: UnresolvedFacePolicy) -> Result<Mesh>
where
	R: MaterialRegistry + ?Sized,
{
	let kind = StorageKind::select(xmesh.domains.iter().map(|domain| domain.ty));
	let mut mesh = Mesh::with_capacity(kind, xmesh.nodes.len(), xmesh.element_count());

	for node in &xmesh.nodes {
		let [x, y, z] = node.position;
		mesh.add_node(Node::new(Point3::new(f64::from(x), f64::from(y), f64::from(z)), node.id));
	}

	for (index, domain) in xmesh.domains.iter().enumerate() {
		let material = domain.part.checked_sub(1).and_then(|part| usize::try_from(part).ok());
		for local in 0..domain.len() {
			let info = ElementInfo::new(domain.ids[local], material, index as u32);
			mesh.add_element(domain.ty, domain.element_nodes(local), info)?;
		}
	}

	mesh.apply_material_visibility(materials);
	mesh.update();

	let table = NodeFaceTable::build(&mesh);
	for (index, surface) in xmesh.surfaces.iter_mut().enumerate() {
		surface.resolved = surface.records.iter().map(|record| table.find_face(&mesh, &record.nodes)).collect();
		let unresolved = surface.resolved.iter().filter(|face| face.is_none()).count();
		if unresolved == 0 {
			continue;
		}
		match policy {
			UnresolvedFacePolicy::Skip => {
				warn!(surface = index, unresolved, "surface faces do not match any mesh face; skipping them");
			}
			UnresolvedFacePolicy::Fail => {
				let face = surface.resolved.iter().position(Option::is_none).unwrap_or_default();
				return Err(Error::UnresolvedFace { surface: index, face });
			}
		}
	}

	for (index, set) in xmesh.node_sets.iter().enumerate() {
		mesh.add_node_set(NodeSet {
			id: set.id,
			name: set.name.clone().unwrap_or_else(|| format!("nodeset{:02}", index + 1)),
			nodes: set.nodes.clone(),
		});
	}

	for (index, surface) in xmesh.surfaces.iter().enumerate() {
		mesh.add_surface(Surface {
			id: surface.id,
			name: surface.name.clone().unwrap_or_else(|| format!("surface{:02}", index + 1)),
			faces: surface.resolved.iter().flatten().copied().collect(),
		});
	}

	for (index, domain) in xmesh.domains.iter().enumerate() {
		mesh.add_part(Part {
			id: index as i32 + 1,
			name: domain.name.clone().unwrap_or_else(|| format!("part{:02}", index + 1)),
			elements: domain.elements().collect(),
		});
	}

	debug!(
		storage = kind.as_str(),
		nodes = mesh.node_count(),
		elements = mesh.element_count(),
		faces = mesh.face_count(),
		"built archive mesh"
	);
	Ok(mesh)
}

/// Rebuild the material list from a parts section, keeping the enabled flag of known names.
pub(crate) fn merge_materials(previous: &[Material], names: &[String]) -> Vec<Material> {
	names
		.iter()
		.map(|name| Material {
			name: name.clone(),
			enabled: previous.iter().find(|material| material.name == *name).is_none_or(|material| material.enabled),
		})
		.collect()
}
