/// Finite element shapes understood by the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
	/// 8-node hexahedron.
	Hex8,
	/// 6-node pentahedron (wedge).
	Penta6,
	/// 15-node quadratic pentahedron.
	Penta15,
	/// 4-node tetrahedron.
	Tet4,
	/// 5-node tetrahedron with a bubble node.
	Tet5,
	/// 4-node quadrilateral shell.
	Quad4,
	/// 3-node triangular shell.
	Tri3,
	/// 2-node truss / beam.
	Truss2,
	/// 20-node serendipity hexahedron.
	Hex20,
	/// 27-node Lagrange hexahedron.
	Hex27,
	/// 10-node quadratic tetrahedron.
	Tet10,
	/// 15-node tetrahedron.
	Tet15,
	/// 20-node cubic tetrahedron.
	Tet20,
	/// 6-node quadratic triangle shell.
	Tri6,
	/// 8-node serendipity quadrilateral shell.
	Quad8,
	/// 9-node Lagrange quadrilateral shell.
	Quad9,
	/// 5-node pyramid.
	Pyra5,
}

/// Largest node count of any supported element.
pub const MAX_ELEMENT_NODES: usize = 27;

const HEX8_FACES: &[&[usize]] = &[&[0, 1, 5, 4], &[1, 2, 6, 5], &[2, 3, 7, 6], &[3, 0, 4, 7], &[3, 2, 1, 0], &[4, 5, 6, 7]];
const HEX20_FACES: &[&[usize]] = &[
	&[0, 1, 5, 4, 8, 17, 12, 16],
	&[1, 2, 6, 5, 9, 18, 13, 17],
	&[2, 3, 7, 6, 10, 19, 14, 18],
	&[3, 0, 4, 7, 11, 16, 15, 19],
	&[3, 2, 1, 0, 10, 9, 8, 11],
	&[4, 5, 6, 7, 12, 13, 14, 15],
];
// face i of a hex27 carries its center node at 20 + i
const HEX27_FACES: &[&[usize]] = &[
	&[0, 1, 5, 4, 8, 17, 12, 16, 20],
	&[1, 2, 6, 5, 9, 18, 13, 17, 21],
	&[2, 3, 7, 6, 10, 19, 14, 18, 22],
	&[3, 0, 4, 7, 11, 16, 15, 19, 23],
	&[3, 2, 1, 0, 10, 9, 8, 11, 24],
	&[4, 5, 6, 7, 12, 13, 14, 15, 25],
];
const PENTA6_FACES: &[&[usize]] = &[&[0, 1, 4, 3], &[1, 2, 5, 4], &[2, 0, 3, 5], &[2, 1, 0], &[3, 4, 5]];
const PENTA15_FACES: &[&[usize]] = &[
	&[0, 1, 4, 3, 6, 13, 9, 12],
	&[1, 2, 5, 4, 7, 14, 10, 13],
	&[2, 0, 3, 5, 8, 12, 11, 14],
	&[2, 1, 0, 7, 6, 8],
	&[3, 4, 5, 9, 10, 11],
];
const TET4_FACES: &[&[usize]] = &[&[0, 1, 3], &[1, 2, 3], &[2, 0, 3], &[2, 1, 0]];
const TET10_FACES: &[&[usize]] = &[&[0, 1, 3, 4, 8, 7], &[1, 2, 3, 5, 9, 8], &[2, 0, 3, 6, 7, 9], &[2, 1, 0, 5, 4, 6]];
const PYRA5_FACES: &[&[usize]] = &[&[0, 1, 4], &[1, 2, 4], &[2, 3, 4], &[3, 0, 4], &[3, 2, 1, 0]];
const QUAD4_FACES: &[&[usize]] = &[&[0, 1, 2, 3]];
const QUAD8_FACES: &[&[usize]] = &[&[0, 1, 2, 3, 4, 5, 6, 7]];
const QUAD9_FACES: &[&[usize]] = &[&[0, 1, 2, 3, 4, 5, 6, 7, 8]];
const TRI3_FACES: &[&[usize]] = &[&[0, 1, 2]];
const TRI6_FACES: &[&[usize]] = &[&[0, 1, 2, 3, 4, 5]];

impl ElementType {
	/// Number of nodes of this element.
	pub fn node_count(self) -> usize {
		match self {
			Self::Hex8 => 8,
			Self::Penta6 => 6,
			Self::Penta15 => 15,
			Self::Tet4 => 4,
			Self::Tet5 => 5,
			Self::Quad4 => 4,
			Self::Tri3 => 3,
			Self::Truss2 => 2,
			Self::Hex20 => 20,
			Self::Hex27 => 27,
			Self::Tet10 => 10,
			Self::Tet15 => 15,
			Self::Tet20 => 20,
			Self::Tri6 => 6,
			Self::Quad8 => 8,
			Self::Quad9 => 9,
			Self::Pyra5 => 5,
		}
	}

	/// Whether this type belongs to the linear element family.
	pub fn is_linear(self) -> bool {
		matches!(self, Self::Hex8 | Self::Penta6 | Self::Tet4 | Self::Quad4 | Self::Tri3 | Self::Truss2 | Self::Pyra5)
	}

	/// Whether this is a surface (shell) element.
	pub fn is_shell(self) -> bool {
		matches!(self, Self::Quad4 | Self::Quad8 | Self::Quad9 | Self::Tri3 | Self::Tri6)
	}

	/// Whether this is a volume element.
	pub fn is_solid(self) -> bool {
		!self.is_shell() && self != Self::Truss2
	}

	/// Local node lists of the element's facets, in canonical outward order.
	///
	/// Shell elements are their own single facet. Tet15 facets keep the tet10 nodes and tet20
	/// facets keep the corners only.
	pub fn faces(self) -> &'static [&'static [usize]] {
		match self {
			Self::Hex8 => HEX8_FACES,
			Self::Hex20 => HEX20_FACES,
			Self::Hex27 => HEX27_FACES,
			Self::Penta6 => PENTA6_FACES,
			Self::Penta15 => PENTA15_FACES,
			Self::Tet4 | Self::Tet5 | Self::Tet20 => TET4_FACES,
			Self::Tet10 | Self::Tet15 => TET10_FACES,
			Self::Pyra5 => PYRA5_FACES,
			Self::Quad4 => QUAD4_FACES,
			Self::Quad8 => QUAD8_FACES,
			Self::Quad9 => QUAD9_FACES,
			Self::Tri3 => TRI3_FACES,
			Self::Tri6 => TRI6_FACES,
			Self::Truss2 => &[],
		}
	}

	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Hex8 => "hex8",
			Self::Penta6 => "penta6",
			Self::Penta15 => "penta15",
			Self::Tet4 => "tet4",
			Self::Tet5 => "tet5",
			Self::Quad4 => "quad4",
			Self::Tri3 => "tri3",
			Self::Truss2 => "truss2",
			Self::Hex20 => "hex20",
			Self::Hex27 => "hex27",
			Self::Tet10 => "tet10",
			Self::Tet15 => "tet15",
			Self::Tet20 => "tet20",
			Self::Tri6 => "tri6",
			Self::Quad8 => "quad8",
			Self::Quad9 => "quad9",
			Self::Pyra5 => "pyra5",
		}
	}
}

/// Facet shapes produced from element faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceType {
	/// 3-node triangle.
	Tri3,
	/// 6-node triangle.
	Tri6,
	/// 4-node quadrilateral.
	Quad4,
	/// 8-node quadrilateral.
	Quad8,
	/// 9-node quadrilateral.
	Quad9,
}

impl FaceType {
	/// Infer the facet shape from a node count.
	pub fn from_node_count(count: usize) -> Option<Self> {
		match count {
			3 => Some(Self::Tri3),
			4 => Some(Self::Quad4),
			6 => Some(Self::Tri6),
			8 => Some(Self::Quad8),
			9 => Some(Self::Quad9),
			_ => None,
		}
	}

	/// Number of nodes of the facet.
	pub fn node_count(self) -> usize {
		match self {
			Self::Tri3 => 3,
			Self::Tri6 => 6,
			Self::Quad4 => 4,
			Self::Quad8 => 8,
			Self::Quad9 => 9,
		}
	}

	/// Number of corner nodes.
	pub fn corners(self) -> usize {
		match self {
			Self::Tri3 | Self::Tri6 => 3,
			Self::Quad4 | Self::Quad8 | Self::Quad9 => 4,
		}
	}
}
