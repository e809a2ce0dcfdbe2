use std::path::PathBuf;

use meshplt::mesh::Mesh;
use meshplt::plt::Compression;

use crate::cmd::util::{LoadArgs, emit_json, load_archive, outcome_label};
use crate::error::Result;

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[command(flatten)]
	pub load: LoadArgs,
	#[arg(long)]
	pub json: bool,
}

/// Print header, load outcome, and mesh statistics of an archive.
pub fn run(args: Args) -> Result<()> {
	let Args { path, load, json } = args;

	let (model, report) = load_archive(&path, load.options())?;
	let compression = model.compression.map(Compression::as_str).unwrap_or("none");
	let time_range = match (model.states.first(), model.states.last()) {
		(Some(first), Some(last)) => Some([first.time, last.time]),
		_ => None,
	};

	if json {
		let payload = InfoJson {
			path: path.display().to_string(),
			compression,
			version: model.header.version,
			software: model.header.software.clone(),
			outcome: outcome_label(&report.outcome),
			error: report.error().map(ToString::to_string),
			meshes: report.meshes,
			states_seen: report.states_seen,
			states_committed: report.states_committed,
			states_dropped: report.states_dropped,
			time_range,
			fields: model.catalog.len(),
			mesh: model.meshes.last().map(MeshJson::from_mesh),
			materials: model
				.materials
				.iter()
				.map(|material| MaterialJson {
					name: material.name.clone(),
					enabled: material.enabled,
				})
				.collect(),
		};
		emit_json(&payload);
		return Ok(());
	}

	println!("path: {}", path.display());
	println!("compression: {compression}");
	println!("version: {:#x}", model.header.version);
	println!("software: {}", model.header.software.as_deref().unwrap_or("-"));
	println!("outcome: {}", outcome_label(&report.outcome));
	if let Some(err) = report.error() {
		println!("error: {err}");
	}
	println!("meshes: {}", report.meshes);
	println!("states_seen: {}", report.states_seen);
	println!("states_committed: {}", report.states_committed);
	println!("states_dropped: {}", report.states_dropped);
	if let Some([first, last]) = time_range {
		println!("time_range: {first} .. {last}");
	}
	println!("fields: {}", model.catalog.len());
	if let Some(mesh) = model.meshes.last() {
		let stats = MeshJson::from_mesh(mesh);
		println!("nodes: {}", stats.nodes);
		println!("elements: {}", stats.elements);
		println!("faces: {}", stats.faces);
		println!("node_sets: {}", stats.node_sets);
		println!("surfaces: {}", stats.surfaces);
		println!("parts: {}", stats.parts);
	}
	println!("materials:");
	for material in &model.materials {
		let state = if material.enabled { "enabled" } else { "disabled" };
		println!("  {}: {state}", material.name);
	}

	Ok(())
}

#[derive(serde::Serialize)]
struct InfoJson {
	path: String,
	compression: &'static str,
	version: u32,
	software: Option<String>,
	outcome: &'static str,
	error: Option<String>,
	meshes: usize,
	states_seen: usize,
	states_committed: usize,
	states_dropped: usize,
	time_range: Option<[f32; 2]>,
	fields: usize,
	mesh: Option<MeshJson>,
	materials: Vec<MaterialJson>,
}

#[derive(serde::Serialize)]
struct MeshJson {
	nodes: usize,
	elements: usize,
	faces: usize,
	node_sets: usize,
	surfaces: usize,
	parts: usize,
}

impl MeshJson {
	fn from_mesh(mesh: &Mesh) -> Self {
		Self {
			nodes: mesh.node_count(),
			elements: mesh.element_count(),
			faces: mesh.face_count(),
			node_sets: mesh.node_sets().len(),
			surfaces: mesh.surfaces().len(),
			parts: mesh.parts().len(),
		}
	}
}

#[derive(serde::Serialize)]
struct MaterialJson {
	name: String,
	enabled: bool,
}

#[cfg(test)]
mod tests;
