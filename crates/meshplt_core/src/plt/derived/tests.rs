use nalgebra::Point3;

use crate::mesh::{ElementInfo, ElementType, Mesh, Node, StorageKind};
use crate::plt::state::State;
use crate::plt::xmesh::XDomain;
use crate::plt::{DataFormat, DataType, Derived, DictCategory, DictItem, Dictionary, FieldCatalog, evaluate, field_value};

fn unit_cube() -> (Mesh, XDomain) {
	let mut mesh = Mesh::new(StorageKind::Hex8);
	let corners = [[0., 0., 0.], [1., 0., 0.], [1., 1., 0.], [0., 1., 0.], [0., 0., 1.], [1., 0., 1.], [1., 1., 1.], [0., 1., 1.]];
	for (i, [x, y, z]) in corners.into_iter().enumerate() {
		mesh.add_node(Node::new(Point3::new(x, y, z), i as i32 + 1));
	}
	let nodes = [0, 1, 2, 3, 4, 5, 6, 7];
	mesh.add_element(ElementType::Hex8, &nodes, ElementInfo::new(1, Some(0), 0))
		.expect("hex8 is valid");
	mesh.update();
	let domain = XDomain {
		ty: ElementType::Hex8,
		part: 1,
		name: None,
		first: 0,
		ids: vec![1],
		nodes: nodes.to_vec(),
	};
	(mesh, domain)
}

fn catalog() -> FieldCatalog {
	let mut dictionary = Dictionary::default();
	let entries = [
		(DictCategory::Nodal, "displacement", DataType::Vec3f, DataFormat::Item),
		(DictCategory::Domain, "stress", DataType::Mat3fs, DataFormat::Item),
		(DictCategory::Domain, "fluid pressure", DataType::Float, DataFormat::Item),
		(DictCategory::Domain, "nodal stress", DataType::Mat3fs, DataFormat::Node),
	];
	for (category, name, ty, format) in entries {
		dictionary.push(
			category,
			DictItem {
				ty,
				format,
				name: name.to_owned(),
				array_size: 0,
				array_names: Vec::new(),
			},
		);
	}
	FieldCatalog::from_dictionary(&dictionary).expect("catalog builds")
}

fn loaded_state(catalog: &FieldCatalog, mesh: &Mesh, domain: &XDomain, displacement: &dyn Fn([f64; 3]) -> [f32; 3]) -> State {
	let mut state = State::new(0, mesh, catalog.len(), 0).expect("state allocates");

	let raw: Vec<f32> = mesh
		.nodes()
		.iter()
		.flat_map(|node| displacement([node.position.x, node.position.y, node.position.z]))
		.collect();
	let info = &catalog.fields()[0];
	state.field_mut(0, info, mesh).expect("allocates").scatter_nodal(&info.name, &raw).expect("fits");

	let info = &catalog.fields()[1];
	state
		.field_mut(1, info, mesh)
		.expect("allocates")
		.scatter_element_block(&info.name, domain, mesh.node_count(), &[-3.0, -6.0, -9.0, 1.0, 0.0, 0.0])
		.expect("fits");

	let info = &catalog.fields()[2];
	state
		.field_mut(2, info, mesh)
		.expect("allocates")
		.scatter_element_block(&info.name, domain, mesh.node_count(), &[2.0])
		.expect("fits");

	let info = &catalog.fields()[3];
	let nodal: Vec<f32> = (0..8).flat_map(|node| [-(node as f32) * 3.0, 0.0, 0.0, 0.0, 0.0, 0.0]).collect();
	state
		.field_mut(3, info, mesh)
		.expect("allocates")
		.scatter_element_block(&info.name, domain, mesh.node_count(), &nodal)
		.expect("fits");
	state
}

fn close(actual: &[f32], expected: &[f32]) -> bool {
	actual.len() == expected.len() && actual.iter().zip(expected).all(|(a, b)| (a - b).abs() < 1e-5)
}

#[test]
fn uniform_stretch_gives_green_lagrange_strain() {
	let (mesh, domain) = unit_cube();
	let catalog = catalog();
	let state = loaded_state(&catalog, &mesh, &domain, &|[x, _, _]| [0.1 * x as f32, 0.0, 0.0]);

	let strain = evaluate(Derived::LagrangeStrain, &catalog, &mesh, &state, 0).expect("hex8 strain");
	assert!(close(&strain, &[0.105, 0.0, 0.0, 0.0, 0.0, 0.0]), "{strain:?}");
}

#[test]
fn rigid_translation_has_no_strain() {
	let (mesh, domain) = unit_cube();
	let catalog = catalog();
	let state = loaded_state(&catalog, &mesh, &domain, &|_| [0.5, -2.0, 3.0]);

	let strain = field_value(&catalog, &mesh, &state, catalog.find("Lagrange strain").expect("derived"), 0)
		.expect("hex8 strain");
	assert!(close(&strain, &[0.0; 6]), "{strain:?}");
}

#[test]
fn simple_shear_strain_has_off_diagonal_term() {
	let (mesh, domain) = unit_cube();
	let catalog = catalog();
	let state = loaded_state(&catalog, &mesh, &domain, &|[_, y, _]| [0.2 * y as f32, 0.0, 0.0]);

	let strain = evaluate(Derived::LagrangeStrain, &catalog, &mesh, &state, 0).expect("hex8 strain");
	assert!(close(&strain, &[0.0, 0.02, 0.0, 0.1, 0.0, 0.0]), "{strain:?}");
}

#[test]
fn positions_add_displacement_to_reference_coordinates() {
	let (mesh, domain) = unit_cube();
	let catalog = catalog();
	let state = loaded_state(&catalog, &mesh, &domain, &|_| [0.5, 0.0, -1.0]);

	let initial = evaluate(Derived::InitialPosition, &catalog, &mesh, &state, 6).expect("node exists");
	let current = evaluate(Derived::Position, &catalog, &mesh, &state, 6).expect("node exists");
	assert_eq!(initial, vec![1.0, 1.0, 1.0]);
	assert_eq!(current, vec![1.5, 1.0, 0.0]);
	assert!(evaluate(Derived::Position, &catalog, &mesh, &state, 8).is_none());
}

#[test]
fn pressure_and_solid_stress_follow_the_stress_tensor() {
	let (mesh, domain) = unit_cube();
	let catalog = catalog();
	let state = loaded_state(&catalog, &mesh, &domain, &|_| [0.0; 3]);

	let pressure = evaluate(Derived::Pressure, &catalog, &mesh, &state, 0).expect("stress stored");
	assert_eq!(pressure, vec![6.0]);

	let solid = evaluate(Derived::SolidStress, &catalog, &mesh, &state, 0).expect("stress stored");
	assert_eq!(solid, vec![-1.0, -4.0, -7.0, 1.0, 0.0, 0.0]);
}

#[test]
fn nodal_pressure_is_reported_per_element_node() {
	let (mesh, domain) = unit_cube();
	let catalog = catalog();
	let state = loaded_state(&catalog, &mesh, &domain, &|_| [0.0; 3]);

	let pressure = evaluate(Derived::NodalPressure, &catalog, &mesh, &state, 0).expect("nodal stress stored");
	assert_eq!(pressure, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
}

#[test]
fn strain_is_not_defined_for_other_shapes() {
	let mut mesh = Mesh::new(StorageKind::Linear);
	for (i, [x, y, z]) in [[0., 0., 0.], [1., 0., 0.], [0., 1., 0.], [0., 0., 1.]].into_iter().enumerate() {
		mesh.add_node(Node::new(Point3::new(x, y, z), i as i32 + 1));
	}
	mesh.add_element(ElementType::Tri3, &[0, 1, 2], ElementInfo::new(1, None, 0)).expect("tri3 is valid");
	mesh.add_element(ElementType::Tet4, &[0, 1, 2, 3], ElementInfo::new(2, None, 0)).expect("tet4 is valid");
	mesh.update();

	let catalog = catalog();
	let mut state = State::new(0, &mesh, catalog.len(), 0).expect("state allocates");
	let info = &catalog.fields()[0];
	let raw: Vec<f32> = mesh
		.nodes()
		.iter()
		.flat_map(|node| [0.0, 0.0, 0.3 * node.position.z as f32])
		.collect();
	state.field_mut(0, info, &mesh).expect("allocates").scatter_nodal(&info.name, &raw).expect("fits");

	assert!(evaluate(Derived::LagrangeStrain, &catalog, &mesh, &state, 0).is_none());
	let strain = evaluate(Derived::LagrangeStrain, &catalog, &mesh, &state, 1).expect("tet4 strain");
	assert!(close(&strain, &[0.0, 0.0, 0.345, 0.0, 0.0, 0.0]), "{strain:?}");
}
