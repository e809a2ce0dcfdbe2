use std::path::{Path, PathBuf};

use meshplt::mesh::Mesh;
use meshplt::multiblock::{Block, MultiBlock};
use nalgebra::Point3;

use crate::cmd::util::emit_json;
use crate::error::{CliError, Result};

#[derive(clap::Args)]
pub struct Args {
	/// JSON file with corner positions and blocks.
	pub problem: PathBuf,
	#[arg(long)]
	pub json: bool,
}

/// Block description read from JSON.
#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Problem {
	nodes: Vec<[f64; 3]>,
	blocks: Vec<BlockSpec>,
	#[serde(default)]
	node_regions: Vec<NodeRegion>,
	#[serde(default)]
	edge_regions: Vec<EdgeRegion>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct BlockSpec {
	nodes: [usize; 8],
	#[serde(default = "unit_divisions")]
	divisions: [usize; 3],
	#[serde(default = "unit_grading")]
	grading: [f64; 3],
	#[serde(default)]
	symmetric: [bool; 3],
	#[serde(default)]
	region: u32,
	#[serde(default)]
	face_regions: [Option<u32>; 6],
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct NodeRegion {
	node: usize,
	region: u32,
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct EdgeRegion {
	nodes: [usize; 2],
	region: u32,
}

fn unit_divisions() -> [usize; 3] {
	[1; 3]
}

fn unit_grading() -> [f64; 3] {
	[1.0; 3]
}

impl Problem {
	/// Parse a problem file.
	pub(crate) fn read(path: &Path) -> Result<Self> {
		let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
			path: path.to_owned(),
			source,
		})?;
		serde_json::from_str(&text).map_err(|source| CliError::Problem {
			path: path.to_owned(),
			source,
		})
	}

	/// Topology with every block, region, and corner registered and resolved.
	pub(crate) fn topology(&self) -> Result<MultiBlock> {
		let mut mb = MultiBlock::new();
		for &[x, y, z] in &self.nodes {
			mb.add_node(Point3::new(x, y, z));
		}
		for spec in &self.blocks {
			let [nx, ny, nz] = spec.divisions;
			let [gx, gy, gz] = spec.grading;
			let [bx, by, bz] = spec.symmetric;
			mb.add_block(
				Block::new(spec.nodes)
					.with_divisions(nx, ny, nz)
					.with_grading(gx, gy, gz)
					.with_symmetric(bx, by, bz)
					.with_region(spec.region)
					.with_face_regions(spec.face_regions),
			);
		}
		for item in &self.node_regions {
			mb.set_node_region(item.node, Some(item.region))?;
		}
		for item in &self.edge_regions {
			mb.set_edge_region(item.nodes[0], item.nodes[1], Some(item.region));
		}
		mb.update()?;
		Ok(mb)
	}
}

/// Build the graded hex mesh of a block description and print its statistics.
pub fn run(args: Args) -> Result<()> {
	let Args { problem: path, json } = args;

	let mb = Problem::read(&path)?.topology()?;
	let mesh = mb.build_mesh()?;
	let payload = MbMeshJson {
		path: path.display().to_string(),
		corners: mb.nodes().len(),
		blocks: mb.blocks().len(),
		block_faces: mb.faces().len(),
		block_edges: mb.edges().len(),
		expected_nodes: mb.closed_form_node_count()?,
		nodes: mesh.node_count(),
		elements: mesh.element_count(),
		faces: mesh.face_count(),
		edges: mesh.edge_count(),
		bounds: bounds(&mesh),
	};

	if json {
		emit_json(&payload);
		return Ok(());
	}

	println!("path: {}", payload.path);
	println!("corners: {}", payload.corners);
	println!("blocks: {}", payload.blocks);
	println!("block_faces: {}", payload.block_faces);
	println!("block_edges: {}", payload.block_edges);
	println!("expected_nodes: {}", payload.expected_nodes);
	println!("nodes: {}", payload.nodes);
	println!("elements: {}", payload.elements);
	println!("faces: {}", payload.faces);
	println!("edges: {}", payload.edges);
	if let Some([min, max]) = payload.bounds {
		println!("bounds: [{}, {}, {}] .. [{}, {}, {}]", min[0], min[1], min[2], max[0], max[1], max[2]);
	}

	Ok(())
}

fn bounds(mesh: &Mesh) -> Option<[[f64; 3]; 2]> {
	let mut nodes = mesh.nodes().iter().map(|node| node.position);
	let first = nodes.next()?;
	let (min, max) = nodes.fold((first, first), |(min, max), p| (min.inf(&p), max.sup(&p)));
	Some([[min.x, min.y, min.z], [max.x, max.y, max.z]])
}

#[derive(serde::Serialize)]
struct MbMeshJson {
	path: String,
	corners: usize,
	blocks: usize,
	block_faces: usize,
	block_edges: usize,
	expected_nodes: usize,
	nodes: usize,
	elements: usize,
	faces: usize,
	edges: usize,
	bounds: Option<[[f64; 3]; 2]>,
}

#[cfg(test)]
mod tests;
