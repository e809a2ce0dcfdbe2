use nalgebra::Point3;
use smallvec::SmallVec;

use crate::Error;
use crate::mesh::{ElementInfo, ElementType, Mesh, Node, NodeFaceTable, StorageKind};
use crate::plt::xmesh::{FaceRecord, XDomain, XSurface};
use crate::plt::{DataFormat, DataType, DictCategory, DictItem, Dictionary, FieldCatalog, FieldClass, FieldData, FieldInfo};

const HEXES: [[usize; 8]; 2] = [[0, 1, 4, 3, 6, 7, 10, 9], [1, 2, 5, 4, 7, 8, 11, 10]];

fn two_hexes() -> (Mesh, XDomain) {
	let mut mesh = Mesh::new(StorageKind::Hex8);
	for z in 0..2 {
		for y in 0..2 {
			for x in 0..3 {
				let id = mesh.node_count() as i32 + 1;
				mesh.add_node(Node::new(Point3::new(f64::from(x), f64::from(y), f64::from(z)), id));
			}
		}
	}
	for (index, nodes) in HEXES.iter().enumerate() {
		mesh.add_element(ElementType::Hex8, nodes, ElementInfo::new(index as i32 + 1, Some(0), 0))
			.expect("hex8 is valid");
	}
	mesh.update();

	let domain = XDomain {
		ty: ElementType::Hex8,
		part: 1,
		name: None,
		first: 0,
		ids: vec![1, 2],
		nodes: HEXES.concat(),
	};
	(mesh, domain)
}

fn item(name: &str, ty: DataType, format: DataFormat) -> DictItem {
	DictItem {
		ty,
		format,
		name: name.to_owned(),
		array_size: 0,
		array_names: Vec::new(),
	}
}

fn element_field(name: &str, ty: DataType, format: DataFormat) -> FieldInfo {
	let mut dictionary = Dictionary::default();
	dictionary.push(DictCategory::Domain, item(name, ty, format));
	let catalog = FieldCatalog::from_dictionary(&dictionary).expect("layout is supported");
	catalog.fields()[0].clone()
}

#[test]
fn catalog_lists_stored_fields_then_derived_fields() {
	let mut dictionary = Dictionary::default();
	dictionary.push(DictCategory::Global, item("time step", DataType::Float, DataFormat::Item));
	dictionary.push(DictCategory::Nodal, item("displacement", DataType::Vec3f, DataFormat::Item));
	dictionary.push(DictCategory::Domain, item("stress", DataType::Mat3fs, DataFormat::Item));
	dictionary.push(DictCategory::Domain, item("fluid pressure", DataType::Float, DataFormat::Item));
	dictionary.push(DictCategory::Domain, item("nodal stress", DataType::Mat3fs, DataFormat::Node));
	dictionary.push(DictCategory::Surface, item("contact pressure", DataType::Float, DataFormat::Item));

	let catalog = FieldCatalog::from_dictionary(&dictionary).expect("catalog builds");
	let names: Vec<&str> = catalog.fields().iter().map(|field| field.name.as_str()).collect();
	assert_eq!(
		names,
		vec![
			"displacement",
			"stress",
			"fluid pressure",
			"nodal stress",
			"contact pressure",
			"Lagrange strain",
			"position",
			"initial position",
			"pressure",
			"solid stress",
			"nodal pressure",
		]
	);
	assert_eq!(catalog.field_for(DictCategory::Domain, 2), Some(3));
	assert_eq!(catalog.field_for(DictCategory::Surface, 0), Some(4));
	assert_eq!(catalog.field_for(DictCategory::Global, 0), None);
	assert_eq!(catalog.get(0).map(|field| field.class), Some(FieldClass::Node));
	assert!(catalog.get(5).and_then(|field| field.derived).is_some());
}

#[test]
fn solid_stress_requires_fluid_pressure() {
	let mut dictionary = Dictionary::default();
	dictionary.push(DictCategory::Domain, item("stress", DataType::Mat3fs, DataFormat::Item));
	let catalog = FieldCatalog::from_dictionary(&dictionary).expect("catalog builds");
	assert!(catalog.find("pressure").is_some());
	assert!(catalog.find("solid stress").is_none());
	assert!(catalog.find("position").is_none());
}

#[test]
fn array_layouts_without_storage_are_rejected() {
	let cases = [
		(DictCategory::Nodal, DataType::ArrayVec3f, DataFormat::Item),
		(DictCategory::Domain, DataType::Array, DataFormat::Mult),
		(DictCategory::Domain, DataType::ArrayVec3f, DataFormat::Node),
		(DictCategory::Domain, DataType::Array, DataFormat::Region),
		(DictCategory::Surface, DataType::Array, DataFormat::Item),
	];
	for (category, ty, format) in cases {
		let mut dictionary = Dictionary::default();
		let mut entry = item("bad", ty, format);
		entry.array_size = 2;
		dictionary.push(category, entry);
		let err = FieldCatalog::from_dictionary(&dictionary).expect_err("layout has no storage");
		assert!(matches!(err, Error::UnsupportedFieldLayout { .. }), "{category:?} {ty:?} {format:?}");
	}

	let mut dictionary = Dictionary::default();
	let mut entry = item("fibers", DataType::ArrayVec3f, DataFormat::Item);
	entry.array_size = 2;
	dictionary.push(DictCategory::Domain, entry);
	let catalog = FieldCatalog::from_dictionary(&dictionary).expect("element item arrays are stored");
	assert_eq!(catalog.fields()[0].components(), 6);
}

#[test]
fn node_and_item_formats_decode_a_constant_field_identically() {
	let (mesh, domain) = two_hexes();

	let info = element_field("temperature", DataType::Float, DataFormat::Item);
	let mut by_item = FieldData::allocate(&info, &mesh).expect("allocates");
	by_item
		.scatter_element_block(&info.name, &domain, mesh.node_count(), &[37.5, 37.5])
		.expect("item data fits");

	let info = element_field("temperature", DataType::Float, DataFormat::Node);
	let mut by_node = FieldData::allocate(&info, &mesh).expect("allocates");
	by_node
		.scatter_element_block(&info.name, &domain, mesh.node_count(), &[37.5; 12])
		.expect("node data fits");

	for element in 0..2 {
		assert_eq!(by_item.element_value(&mesh, element), by_node.element_value(&mesh, element));
		assert_eq!(by_node.element_value(&mesh, element), Some(vec![37.5]));
	}
}

#[test]
fn node_format_numbers_nodes_by_first_appearance() {
	let (mesh, domain) = two_hexes();
	let info = element_field("level", DataType::Float, DataFormat::Node);
	let mut data = FieldData::allocate(&info, &mesh).expect("allocates");

	let raw: Vec<f32> = (0..12).map(|local| local as f32).collect();
	data.scatter_element_block(&info.name, &domain, mesh.node_count(), &raw)
		.expect("node data fits");

	assert_eq!(data.slots(0), Some(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0][..]));
	assert_eq!(data.slots(1), Some(&[1.0, 8.0, 9.0, 2.0, 5.0, 10.0, 11.0, 6.0][..]));
	assert_eq!(data.node_value(4), Some(&[2.0][..]));
	assert_eq!(data.node_value(8), Some(&[10.0][..]));
}

#[test]
fn mult_format_keeps_each_slot_and_averages_per_element() {
	let (mesh, domain) = two_hexes();
	let info = element_field("shell thickness", DataType::Float, DataFormat::Mult);
	let mut data = FieldData::allocate(&info, &mesh).expect("allocates");

	let mut raw = vec![1.0_f32; 8];
	raw.extend([2.0, 2.0, 2.0, 2.0, 4.0, 4.0, 4.0, 4.0]);
	data.scatter_element_block(&info.name, &domain, mesh.node_count(), &raw)
		.expect("mult data fits");

	assert_eq!(data.slots(1).map(<[f32]>::len), Some(8));
	assert_eq!(data.element_value(&mesh, 0), Some(vec![1.0]));
	assert_eq!(data.element_value(&mesh, 1), Some(vec![3.0]));
	assert_eq!(data.node_value(0), None);
}

#[test]
fn region_format_broadcasts_to_the_domain() {
	let (mesh, domain) = two_hexes();
	let info = element_field("velocity", DataType::Vec3f, DataFormat::Region);
	let mut data = FieldData::allocate(&info, &mesh).expect("allocates");
	data.scatter_element_block(&info.name, &domain, mesh.node_count(), &[1.0, 2.0, 3.0])
		.expect("one value");

	assert_eq!(data.item(0), Some(&[1.0, 2.0, 3.0][..]));
	assert_eq!(data.item(1), Some(&[1.0, 2.0, 3.0][..]));
}

#[test]
fn wrong_block_size_is_reported() {
	let (mesh, domain) = two_hexes();
	let info = element_field("stress", DataType::Mat3fs, DataFormat::Item);
	let mut data = FieldData::allocate(&info, &mesh).expect("allocates");
	let err = data
		.scatter_element_block(&info.name, &domain, mesh.node_count(), &[0.0; 6])
		.expect_err("one element short");
	assert!(matches!(err, Error::DataSizeMismatch { expected: 12, got: 6, .. }));
	assert!(!data.is_active(0));
}

#[test]
fn face_mult_values_follow_mesh_face_node_order() {
	let (mesh, _) = two_hexes();
	let table = NodeFaceTable::build(&mesh);
	let records = vec![
		FaceRecord {
			id: 1,
			nodes: SmallVec::from_slice(&[0, 1, 4, 3]),
		},
		FaceRecord {
			id: 2,
			nodes: SmallVec::from_slice(&[1, 2, 5, 4]),
		},
	];
	let resolved: Vec<Option<usize>> = records.iter().map(|record| table.find_face(&mesh, &record.nodes)).collect();
	assert!(resolved.iter().all(Option::is_some));
	let surface = XSurface {
		id: 1,
		name: None,
		max_nodes: 4,
		records,
		resolved,
	};

	let mut dictionary = Dictionary::default();
	dictionary.push(DictCategory::Surface, item("contact gap", DataType::Float, DataFormat::Mult));
	let catalog = FieldCatalog::from_dictionary(&dictionary).expect("catalog builds");
	let info = &catalog.fields()[0];
	let mut data = FieldData::allocate(info, &mesh).expect("allocates");

	let raw: Vec<f32> = surface
		.records
		.iter()
		.flat_map(|record| record.nodes.iter().map(|&node| 100.0 + node as f32))
		.collect();
	let duplicates = data.scatter_face_block(&info.name, &mesh, &surface, &raw).expect("face data fits");
	assert_eq!(duplicates, 0);

	for face in surface.resolved.iter().flatten().copied() {
		let slots = data.slots(face).expect("face has data");
		let expected: Vec<f32> = mesh.face(face).nodes.iter().map(|&node| 100.0 + node as f32).collect();
		assert_eq!(slots, expected.as_slice());
	}
	assert_ne!(mesh.face(surface.resolved[0].expect("resolved")).nodes.as_slice(), &[0, 1, 4, 3]);
}

#[test]
fn face_item_written_twice_counts_duplicates() {
	let (mesh, _) = two_hexes();
	let table = NodeFaceTable::build(&mesh);
	let record = FaceRecord {
		id: 1,
		nodes: SmallVec::from_slice(&[0, 1, 4, 3]),
	};
	let face = table.find_face(&mesh, &record.nodes);
	let surface = XSurface {
		id: 1,
		name: None,
		max_nodes: 4,
		records: vec![record.clone(), record],
		resolved: vec![face, face],
	};

	let mut dictionary = Dictionary::default();
	dictionary.push(DictCategory::Surface, item("contact pressure", DataType::Float, DataFormat::Item));
	let catalog = FieldCatalog::from_dictionary(&dictionary).expect("catalog builds");
	let info = &catalog.fields()[0];
	let mut data = FieldData::allocate(info, &mesh).expect("allocates");
	let duplicates = data
		.scatter_face_block(&info.name, &mesh, &surface, &[1.0, 2.0])
		.expect("face data fits");
	assert_eq!(duplicates, 1);
	assert_eq!(data.item(face.expect("resolved")), Some(&[2.0][..]));
}

#[test]
fn nodal_field_averages_over_element_nodes() {
	let (mesh, _) = two_hexes();
	let mut dictionary = Dictionary::default();
	dictionary.push(DictCategory::Nodal, item("temperature", DataType::Float, DataFormat::Item));
	let catalog = FieldCatalog::from_dictionary(&dictionary).expect("catalog builds");
	let info = &catalog.fields()[0];
	let mut data = FieldData::allocate(info, &mesh).expect("allocates");

	let raw: Vec<f32> = mesh.nodes().iter().map(|node| node.position.x as f32).collect();
	data.scatter_nodal(&info.name, &raw).expect("one value per node");
	assert_eq!(data.node_value(2), Some(&[2.0][..]));
	assert_eq!(data.element_value(&mesh, 1), Some(vec![1.5]));

	let err = data.scatter_nodal(&info.name, &raw[..5]).expect_err("too few values");
	assert!(matches!(err, Error::DataSizeMismatch { expected: 12, got: 5, .. }));
}
