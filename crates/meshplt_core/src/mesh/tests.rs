use nalgebra::Point3;

use crate::Error;
use crate::mesh::{ElementInfo, ElementStore, ElementType, Face, Material, Mesh, Node, NodeFaceTable, StorageKind};

fn unit_cube(kind: StorageKind) -> Mesh {
	let mut mesh = Mesh::new(kind);
	let corners = [[0., 0., 0.], [1., 0., 0.], [1., 1., 0.], [0., 1., 0.], [0., 0., 1.], [1., 0., 1.], [1., 1., 1.], [0., 1., 1.]];
	for (i, [x, y, z]) in corners.into_iter().enumerate() {
		mesh.add_node(Node::new(Point3::new(x, y, z), i as i32 + 1));
	}
	mesh.add_element(ElementType::Hex8, &[0, 1, 2, 3, 4, 5, 6, 7], ElementInfo::new(1, Some(0), 0))
		.expect("hex8 is valid");
	mesh
}

#[test]
fn storage_selection_follows_type_mix() {
	assert_eq!(StorageKind::select([ElementType::Tet4, ElementType::Tet4]), StorageKind::Tet4);
	assert_eq!(StorageKind::select([ElementType::Hex8]), StorageKind::Hex8);
	assert_eq!(StorageKind::select([ElementType::Hex8, ElementType::Penta6, ElementType::Quad4]), StorageKind::Linear);
	assert_eq!(StorageKind::select([ElementType::Hex8, ElementType::Hex20]), StorageKind::Mixed);
	assert_eq!(StorageKind::select([ElementType::Tet10]), StorageKind::Mixed);
}

#[test]
fn every_layout_reports_the_same_connectivity() {
	let tet = [3_usize, 1, 4, 0];
	let hex = [0_usize, 1, 2, 3, 4, 5, 6, 7];
	for kind in [StorageKind::Linear, StorageKind::Mixed] {
		let mut store = ElementStore::with_capacity(kind, 2);
		store.push(ElementType::Tet4, &tet);
		store.push(ElementType::Hex8, &hex);
		assert_eq!(store.nodes(0), &tet);
		assert_eq!(store.nodes(1), &hex);
		assert_eq!(store.element_type(0), ElementType::Tet4);
	}

	let mut homogeneous = ElementStore::with_capacity(StorageKind::Tet4, 1);
	homogeneous.push(ElementType::Tet4, &tet);
	assert_eq!(homogeneous.nodes(0), &tet);
}

#[test]
fn push_of_foreign_type_promotes_store() {
	let mut store = ElementStore::with_capacity(StorageKind::Hex8, 2);
	store.push(ElementType::Hex8, &[0, 1, 2, 3, 4, 5, 6, 7]);
	store.push(ElementType::Tri3, &[0, 1, 2]);
	assert_eq!(store.kind(), StorageKind::Mixed);
	assert_eq!(store.nodes(0).len(), 8);
	assert_eq!(store.nodes(1), &[0, 1, 2]);
}

#[test]
fn add_element_rejects_unknown_node() {
	let mut mesh = unit_cube(StorageKind::Hex8);
	let err = mesh
		.add_element(ElementType::Tet4, &[0, 1, 2, 9], ElementInfo::new(2, None, 0))
		.expect_err("node 9 does not exist");
	assert!(matches!(err, Error::NodeIndexOutOfRange { node: 9, nodes: 8 }));
}

#[test]
fn update_derives_six_cube_faces() {
	let mut mesh = unit_cube(StorageKind::Hex8);
	mesh.update();
	assert_eq!(mesh.face_count(), 6);
	assert!(mesh.faces().iter().all(|face| face.element.is_some()));
	assert_eq!(mesh.face(4).nodes.as_slice(), &[3, 2, 1, 0]);
}

#[test]
fn shared_faces_are_not_exterior() {
	let mut mesh = unit_cube(StorageKind::Hex8);
	for (i, [x, y, z]) in [[2., 0., 0.], [2., 1., 0.], [2., 0., 1.], [2., 1., 1.]].into_iter().enumerate() {
		mesh.add_node(Node::new(Point3::new(x, y, z), 9 + i as i32));
	}
	mesh.add_element(ElementType::Hex8, &[1, 8, 9, 2, 5, 10, 11, 6], ElementInfo::new(2, Some(0), 0))
		.expect("second hex is valid");
	mesh.update();
	assert_eq!(mesh.face_count(), 10);
}

#[test]
fn disabled_material_hides_elements_and_orphaned_nodes() {
	let mut mesh = unit_cube(StorageKind::Linear);
	mesh.add_node(Node::new(Point3::new(5., 5., 5.), 9));
	mesh.add_element(ElementType::Tri3, &[4, 5, 8], ElementInfo::new(2, Some(1), 1))
		.expect("tri3 is valid");

	let materials = vec![Material::new("steel"), Material { name: "skin".into(), enabled: false }];
	mesh.apply_material_visibility(&materials);
	assert!(mesh.element(0).enabled);
	assert!(!mesh.element(1).enabled);
	assert!(mesh.node(4).enabled, "node 4 is still used by the hex");
	assert!(!mesh.node(8).enabled, "node 8 only belongs to the hidden shell");

	mesh.update();
	assert_eq!(mesh.face_count(), 6, "hidden shell contributes no face");
}

#[test]
fn missing_material_keeps_element_enabled() {
	let mut mesh = unit_cube(StorageKind::Hex8);
	mesh.element_mut(0).material = Some(7);
	mesh.apply_material_visibility(&Vec::<Material>::new());
	assert!(mesh.element(0).enabled);
}

#[test]
fn node_face_table_matches_rotated_records() {
	let mut mesh = unit_cube(StorageKind::Hex8);
	mesh.update();
	let table = NodeFaceTable::build(&mesh);
	assert_eq!(table.faces_at(0).len(), 3);

	let top = table.find_face(&mesh, &[6, 7, 4, 5]).expect("top face resolves");
	assert_eq!(mesh.face(top).nodes.as_slice(), &[4, 5, 6, 7]);
	assert_eq!(table.find_face(&mesh, &[0, 1, 6, 7]), None);
	assert_eq!(table.find_face(&mesh, &[0, 1, 2]), None);
}

#[test]
fn supplied_faces_are_linked_to_owners() {
	let mut mesh = unit_cube(StorageKind::Hex8);
	mesh.add_face(Face::new(&[1, 2, 6, 5], Some(3)).expect("quad face"));
	mesh.update();
	assert_eq!(mesh.face_count(), 1);
	assert_eq!(mesh.face(0).element, Some((0, 1)));
}

#[test]
fn element_center_averages_nodes() {
	let mesh = unit_cube(StorageKind::Hex8);
	assert_eq!(mesh.element_center(0), Point3::new(0.5, 0.5, 0.5));
}
