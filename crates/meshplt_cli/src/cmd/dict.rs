use std::path::PathBuf;

use meshplt::plt::{ReadOptions, StateSelection};

use crate::cmd::util::{emit_json, load_archive};
use crate::error::Result;

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
}

/// Print global variables and the field catalog, including derived fields.
pub fn run(args: Args) -> Result<()> {
	let Args { path, json } = args;

	let options = ReadOptions {
		states: StateSelection::List(Vec::new()),
		..ReadOptions::default()
	};
	let (model, _) = load_archive(&path, options)?;

	let globals: Vec<GlobalJson> = model
		.dictionary
		.global
		.iter()
		.map(|item| GlobalJson {
			name: item.name.clone(),
			ty: item.ty.as_str(),
			components: item.components(),
		})
		.collect();
	let fields: Vec<FieldJson> = model
		.catalog
		.fields()
		.iter()
		.map(|info| FieldJson {
			name: info.name.clone(),
			class: info.class.as_str(),
			ty: info.ty.as_str(),
			format: info.format.as_str(),
			components: info.components(),
			derived: info.derived.map(|derived| derived.as_str()),
		})
		.collect();

	if json {
		emit_json(&DictJson {
			path: path.display().to_string(),
			globals,
			fields,
		});
		return Ok(());
	}

	println!("path: {}", path.display());
	println!("globals: {}", globals.len());
	for item in &globals {
		println!("  {} {}", item.ty, item.name);
	}
	println!("fields: {}", fields.len());
	for (index, item) in fields.iter().enumerate() {
		let origin = item.derived.unwrap_or("stored");
		println!("  [{index}] {} {} {}/{} ({origin})", item.class, item.ty, item.name, item.format);
	}

	Ok(())
}

#[derive(serde::Serialize)]
struct DictJson {
	path: String,
	globals: Vec<GlobalJson>,
	fields: Vec<FieldJson>,
}

#[derive(serde::Serialize)]
struct GlobalJson {
	name: String,
	#[serde(rename = "type")]
	ty: &'static str,
	components: usize,
}

#[derive(serde::Serialize)]
struct FieldJson {
	name: String,
	class: &'static str,
	#[serde(rename = "type")]
	ty: &'static str,
	format: &'static str,
	components: usize,
	derived: Option<&'static str>,
}
