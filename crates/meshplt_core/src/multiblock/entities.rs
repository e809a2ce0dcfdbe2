use nalgebra::Point3;

/// Subdivision of one parametric axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zoning {
	/// Number of subdivisions.
	pub n: usize,
	/// Geometric ratio between consecutive steps.
	pub ratio: f64,
	/// Mirror the grading about the midpoint.
	pub symmetric: bool,
}

impl Zoning {
	/// Uniform zoning with `n` subdivisions.
	pub fn uniform(n: usize) -> Self {
		Self {
			n,
			ratio: 1.0,
			symmetric: false,
		}
	}

	/// Same zoning traversed from the other end.
	///
	/// A symmetric grading reads the same both ways; a one-sided grading inverts its ratio.
	pub fn reversed(self) -> Self {
		if self.symmetric {
			self
		} else {
			Self {
				ratio: 1.0 / self.ratio,
				..self
			}
		}
	}
}

impl Default for Zoning {
	fn default() -> Self {
		Self::uniform(1)
	}
}

/// Corner node of the block topology.
#[derive(Debug, Clone, PartialEq)]
pub struct Corner {
	/// Position.
	pub position: Point3<f64>,
	/// Region id carried onto the generated node.
	pub region: Option<u32>,
	/// Whether the corner lies on an external face.
	pub external: bool,
}

/// Hexahedral block of the topology.
///
/// Corners follow the hex8 convention: `0..4` is the bottom loop, `4..8` the top loop.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
	/// Corner node indices.
	pub nodes: [usize; 8],
	/// Zoning along x, y, z.
	pub zoning: [Zoning; 3],
	/// Region id given to the generated elements.
	pub region: u32,
	/// Region ids requested for the six faces.
	pub face_regions: [Option<u32>; 6],
	/// Neighbouring block per face slot, `None` for an open boundary.
	pub neighbours: [Option<usize>; 6],
	/// Index of the shared face record per face slot.
	pub faces: [usize; 6],
	/// Whether any face slot is open.
	pub external: bool,
}

impl Block {
	/// Create a block with one subdivision per axis and no grading.
	pub fn new(nodes: [usize; 8]) -> Self {
		Self {
			nodes,
			zoning: [Zoning::default(); 3],
			region: 0,
			face_regions: [None; 6],
			neighbours: [None; 6],
			faces: [0; 6],
			external: true,
		}
	}

	/// Set subdivision counts along x, y, z.
	pub fn with_divisions(mut self, nx: usize, ny: usize, nz: usize) -> Self {
		self.zoning[0].n = nx;
		self.zoning[1].n = ny;
		self.zoning[2].n = nz;
		self
	}

	/// Set grading ratios along x, y, z.
	pub fn with_grading(mut self, gx: f64, gy: f64, gz: f64) -> Self {
		self.zoning[0].ratio = gx;
		self.zoning[1].ratio = gy;
		self.zoning[2].ratio = gz;
		self
	}

	/// Set symmetric bias flags along x, y, z.
	pub fn with_symmetric(mut self, bx: bool, by: bool, bz: bool) -> Self {
		self.zoning[0].symmetric = bx;
		self.zoning[1].symmetric = by;
		self.zoning[2].symmetric = bz;
		self
	}

	/// Set the element region id.
	pub fn with_region(mut self, region: u32) -> Self {
		self.region = region;
		self
	}

	/// Request region ids for the six faces.
	pub fn with_face_regions(mut self, regions: [Option<u32>; 6]) -> Self {
		self.face_regions = regions;
		self
	}

	/// Corner nodes of face slot `slot`, ordered so the face's local x axis runs from corner 0 to
	/// corner 1 and its local y axis from corner 0 to corner 3.
	pub fn face_nodes(&self, slot: usize) -> [usize; 4] {
		let n = &self.nodes;
		match slot {
			0 => [n[0], n[1], n[5], n[4]],
			1 => [n[1], n[2], n[6], n[5]],
			2 => [n[2], n[3], n[7], n[6]],
			3 => [n[3], n[0], n[4], n[7]],
			4 => [n[3], n[2], n[1], n[0]],
			_ => [n[4], n[5], n[6], n[7]],
		}
	}

	/// Zoning of face slot `slot` along its local x and y axes.
	pub fn face_zoning(&self, slot: usize) -> [Zoning; 2] {
		let [x, y, z] = self.zoning;
		match slot {
			0 => [x, z],
			1 => [y, z],
			2 => [x.reversed(), z],
			3 => [y.reversed(), z],
			4 => [x, y.reversed()],
			_ => [x, y],
		}
	}
}

/// Face record shared by at most two blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct MbFace {
	/// Corner node indices.
	pub nodes: [usize; 4],
	/// Block that created the face.
	pub block: usize,
	/// Second block sharing the face, `None` on the boundary.
	pub other: Option<usize>,
	/// Zoning along the local x and y axes.
	pub zoning: [Zoning; 2],
	/// Edge record per side; side `j` runs from corner `j` to corner `j + 1`.
	pub edges: [usize; 4],
	/// Whether the edge record on side `j` runs against the face's corner order.
	pub edge_flipped: [bool; 4],
	/// Adjacent external face across each side; only set on external faces.
	pub neighbours: [Option<usize>; 4],
	/// Region id; `None` keeps the face out of the generated mesh.
	pub region: Option<u32>,
	/// Whether only one block owns the face.
	pub external: bool,
}

/// Edge record shared by every face that contains its corner pair.
#[derive(Debug, Clone, PartialEq)]
pub struct MbEdge {
	/// Corner node indices.
	pub nodes: [usize; 2],
	/// Zoning along the edge, from `nodes[0]` to `nodes[1]`.
	pub zoning: Zoning,
	/// External faces containing the edge.
	pub faces: [Option<usize>; 2],
	/// Region id; `None` keeps the edge out of the generated mesh.
	pub region: Option<u32>,
	/// Whether the edge lies on an external face.
	pub external: bool,
}

impl MbEdge {
	/// Whether the edge joins `a` and `b`, in either direction.
	pub fn joins(&self, a: usize, b: usize) -> bool {
		(self.nodes[0] == a && self.nodes[1] == b) || (self.nodes[0] == b && self.nodes[1] == a)
	}
}
