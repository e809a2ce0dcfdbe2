use nalgebra::{Matrix3, Vector3};

use crate::mesh::{ElementType, Mesh};
use crate::plt::field::{Derived, FieldCatalog, FieldClass};
use crate::plt::state::State;

/// Natural-coordinate shape function gradients of hex8 at its center.
const HEX8_CENTER_GRADIENTS: [[f64; 3]; 8] = [
	[-0.125, -0.125, -0.125],
	[0.125, -0.125, -0.125],
	[0.125, 0.125, -0.125],
	[-0.125, 0.125, -0.125],
	[-0.125, -0.125, 0.125],
	[0.125, -0.125, 0.125],
	[0.125, 0.125, 0.125],
	[-0.125, 0.125, 0.125],
];

/// Shape function gradients of tet4, constant over the element.
const TET4_GRADIENTS: [[f64; 3]; 4] = [[-1.0, -1.0, -1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Value of catalog field `field` at `item` in `state`.
///
/// `item` is a node for nodal fields, an element for element fields, and a face for face fields.
/// Stored element and face values are averaged over their slots; derived fields are computed.
/// `nodal pressure` yields one value per element node.
pub fn field_value(catalog: &FieldCatalog, mesh: &Mesh, state: &State, field: usize, item: usize) -> Option<Vec<f32>> {
	let info = catalog.get(field)?;
	if let Some(derived) = info.derived {
		return evaluate(derived, catalog, mesh, state, item);
	}
	let data = state.field(field)?;
	match info.class {
		FieldClass::Node => data.node_value(item).map(<[f32]>::to_vec),
		FieldClass::Element | FieldClass::Face => data.element_value(mesh, item),
	}
}

/// Compute a derived quantity at `item`.
pub fn evaluate(derived: Derived, catalog: &FieldCatalog, mesh: &Mesh, state: &State, item: usize) -> Option<Vec<f32>> {
	match derived {
		Derived::InitialPosition => initial_position(mesh, item).map(|p| p.iter().map(|&c| c as f32).collect()),
		Derived::Position => {
			let mut position = initial_position(mesh, item)?;
			if let Some(displacement) = nodal_vector(catalog, state, "displacement", item) {
				position += displacement;
			}
			Some(position.iter().map(|&c| c as f32).collect())
		}
		Derived::Pressure => {
			let stress = stored_element(catalog, mesh, state, "stress", item)?;
			Some(vec![pressure(&stress)?])
		}
		Derived::SolidStress => {
			let mut stress = stored_element(catalog, mesh, state, "stress", item)?;
			let fluid = stored_element(catalog, mesh, state, "fluid pressure", item)?;
			let p = *fluid.first()?;
			for component in stress.iter_mut().take(3) {
				*component += p;
			}
			Some(stress)
		}
		Derived::NodalPressure => {
			let data = state.field(catalog.find("nodal stress")?)?;
			match data.slots(item) {
				Some(slots) => slots.chunks_exact(data.stride()).map(pressure).collect(),
				None => Some(vec![pressure(&data.element_value(mesh, item)?)?]),
			}
		}
		Derived::LagrangeStrain => lagrange_strain(catalog, mesh, state, item),
	}
}

fn initial_position(mesh: &Mesh, node: usize) -> Option<Vector3<f64>> {
	(node < mesh.node_count()).then(|| mesh.node(node).position.coords)
}

fn nodal_vector(catalog: &FieldCatalog, state: &State, name: &str, node: usize) -> Option<Vector3<f64>> {
	let value = state.field(catalog.find(name)?)?.node_value(node)?;
	match value {
		[x, y, z, ..] => Some(Vector3::new(f64::from(*x), f64::from(*y), f64::from(*z))),
		_ => None,
	}
}

fn stored_element(catalog: &FieldCatalog, mesh: &Mesh, state: &State, name: &str, element: usize) -> Option<Vec<f32>> {
	state.field(catalog.find(name)?)?.element_value(mesh, element)
}

/// Negative mean normal stress of a symmetric tensor stored as xx, yy, zz, xy, yz, xz.
fn pressure(stress: &[f32]) -> Option<f32> {
	match stress {
		[xx, yy, zz, ..] => Some(-(xx + yy + zz) / 3.0),
		_ => None,
	}
}

/// Green-Lagrange strain `E = (F^T F - I) / 2` at the element center.
fn lagrange_strain(catalog: &FieldCatalog, mesh: &Mesh, state: &State, element: usize) -> Option<Vec<f32>> {
	if element >= mesh.element_count() {
		return None;
	}
	let gradients: &[[f64; 3]] = match mesh.element_type(element) {
		ElementType::Hex8 => &HEX8_CENTER_GRADIENTS,
		ElementType::Tet4 => &TET4_GRADIENTS,
		_ => return None,
	};

	let mut reference = Matrix3::<f64>::zeros();
	let mut current = Matrix3::<f64>::zeros();
	for (&node, gradient) in mesh.element_nodes(element).iter().zip(gradients) {
		let gradient = Vector3::from(*gradient);
		let x = mesh.node(node).position.coords;
		let u = nodal_vector(catalog, state, "displacement", node)?;
		reference += x * gradient.transpose();
		current += (x + u) * gradient.transpose();
	}

	let f = current * reference.try_inverse()?;
	let e = (f.transpose() * f - Matrix3::identity()) * 0.5;
	Some(
		[e[(0, 0)], e[(1, 1)], e[(2, 2)], e[(0, 1)], e[(1, 2)], e[(0, 2)]]
			.iter()
			.map(|&c| c as f32)
			.collect(),
	)
}

#[cfg(test)]
mod tests;
