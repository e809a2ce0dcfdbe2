//! Structured hexahedral meshing from a coarse block topology.
//!
//! A [`MultiBlock`] holds corner nodes and hexahedral blocks. [`MultiBlock::update`] derives the
//! shared face and edge records and [`MultiBlock::build_mesh`] instantiates a graded hex8 mesh in
//! which every node on a shared boundary exists exactly once.

use std::collections::HashMap;

use nalgebra::Point3;

use crate::{Error, Result};

mod build;
mod entities;
/// Graded lattice positions along one axis.
pub mod grading;
mod topology;

/// Topology records.
pub use entities::{Block, Corner, MbEdge, MbFace, Zoning};

use build::{FaceMap, NodeOffsets};

/// Block topology and graded mesh generator.
#[derive(Debug, Clone)]
pub struct MultiBlock {
	corners: Vec<Corner>,
	blocks: Vec<Block>,
	faces: Vec<MbFace>,
	edges: Vec<MbEdge>,
	edge_regions: HashMap<(usize, usize), u32>,
	face_maps: Vec<[FaceMap; 6]>,
	offsets: NodeOffsets,
	stale: bool,
}

impl Default for MultiBlock {
	fn default() -> Self {
		Self::new()
	}
}

impl MultiBlock {
	/// Create an empty topology.
	pub fn new() -> Self {
		Self {
			corners: Vec::new(),
			blocks: Vec::new(),
			faces: Vec::new(),
			edges: Vec::new(),
			edge_regions: HashMap::new(),
			face_maps: Vec::new(),
			offsets: NodeOffsets::default(),
			stale: true,
		}
	}

	/// Add a corner node and return its index.
	pub fn add_node(&mut self, position: Point3<f64>) -> usize {
		self.corners.push(Corner {
			position,
			region: None,
			external: true,
		});
		self.stale = true;
		self.corners.len() - 1
	}

	/// Add a block and return its index.
	pub fn add_block(&mut self, block: Block) -> usize {
		self.blocks.push(block);
		self.stale = true;
		self.blocks.len() - 1
	}

	/// Set the region carried by corner `node` onto its generated node.
	pub fn set_node_region(&mut self, node: usize, region: Option<u32>) -> Result<()> {
		let nodes = self.corners.len();
		let corner = self.corners.get_mut(node).ok_or(Error::NodeIndexOutOfRange { node: node as i64, nodes })?;
		corner.region = region;
		Ok(())
	}

	/// Request region ids for the six faces of `block`.
	///
	/// A shared face keeps the region of the first block that names one.
	pub fn set_block_face_regions(&mut self, block: usize, regions: [Option<u32>; 6]) -> Result<()> {
		let blocks = self.blocks.len();
		let target = self.blocks.get_mut(block).ok_or(Error::RegionIndexOutOfRange {
			kind: "block",
			index: block as i64,
			len: blocks,
		})?;
		target.face_regions = regions;
		self.stale = true;
		Ok(())
	}

	/// Set the region of the edge joining corners `a` and `b`.
	pub fn set_edge_region(&mut self, a: usize, b: usize, region: Option<u32>) {
		let key = topology::edge_key(a, b);
		match region {
			Some(region) => self.edge_regions.insert(key, region),
			None => self.edge_regions.remove(&key),
		};
		for edge in self.edges.iter_mut().filter(|edge| edge.joins(a, b)) {
			edge.region = region;
		}
	}

	/// Set the regions of the four edges of face record `face`.
	pub fn set_face_edge_regions(&mut self, face: usize, regions: [Option<u32>; 4]) -> Result<()> {
		self.ensure_face(face)?;
		let nodes = self.faces[face].nodes;
		for (side, region) in regions.into_iter().enumerate() {
			self.set_edge_region(nodes[side], nodes[(side + 1) % 4], region);
		}
		Ok(())
	}

	/// Set the region of face record `face` directly.
	///
	/// The next [`MultiBlock::update`] rebuilds face records from the block face regions.
	pub fn set_face_region(&mut self, face: usize, region: Option<u32>) -> Result<()> {
		self.ensure_face(face)?;
		self.faces[face].region = region;
		Ok(())
	}

	/// Corner nodes.
	pub fn nodes(&self) -> &[Corner] {
		&self.corners
	}

	/// Blocks.
	pub fn blocks(&self) -> &[Block] {
		&self.blocks
	}

	/// Face records from the last update.
	pub fn faces(&self) -> &[MbFace] {
		&self.faces
	}

	/// Edge records from the last update.
	pub fn edges(&self) -> &[MbEdge] {
		&self.edges
	}

	/// Whether edits are pending since the last update.
	pub fn is_stale(&self) -> bool {
		self.stale
	}

	/// Node count of the generated mesh.
	pub fn node_count(&self) -> Result<usize> {
		if self.stale {
			return Err(Error::StaleTopology);
		}
		Ok(self.offsets.total)
	}

	fn ensure_face(&self, face: usize) -> Result<()> {
		if self.stale {
			return Err(Error::StaleTopology);
		}
		if face >= self.faces.len() {
			return Err(Error::RegionIndexOutOfRange {
				kind: "face",
				index: face as i64,
				len: self.faces.len(),
			});
		}
		Ok(())
	}
}
