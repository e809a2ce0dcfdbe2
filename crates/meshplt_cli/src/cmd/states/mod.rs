use std::path::PathBuf;

use crate::cmd::util::{LoadArgs, emit_json, load_archive, render_values};
use crate::error::{CliError, Result};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[command(flatten)]
	pub load: LoadArgs,
	/// Field to sample in every state.
	#[arg(long)]
	pub field: Option<String>,
	/// Node, element, or face index the field is sampled at.
	#[arg(long, default_value_t = 0)]
	pub item: usize,
	#[arg(long)]
	pub json: bool,
}

/// Print time, visibility, and global values of each committed state.
pub fn run(args: Args) -> Result<()> {
	let Args {
		path,
		load,
		field,
		item,
		json,
	} = args;

	let (model, _) = load_archive(&path, load.options())?;
	if let Some(name) = field.as_deref().filter(|name| model.catalog.find(name).is_none()) {
		return Err(CliError::FieldNotFound { name: name.to_owned() });
	}

	let rows: Vec<StateJson> = model
		.states
		.iter()
		.enumerate()
		.map(|(index, state)| StateJson {
			index,
			time: state.time,
			mesh: state.mesh,
			visible_elements: state.element_states().iter().filter(|element| element.visible).count(),
			globals: model
				.dictionary
				.global
				.iter()
				.enumerate()
				.filter_map(|(slot, global)| {
					state.global(slot).map(|values| GlobalJson {
						name: global.name.clone(),
						values: values.to_vec(),
					})
				})
				.collect(),
			value: field.as_deref().and_then(|name| model.field_value(index, name, item)),
		})
		.collect();

	if json {
		emit_json(&StatesJson {
			path: path.display().to_string(),
			field,
			item,
			states: rows,
		});
		return Ok(());
	}

	println!("path: {}", path.display());
	println!("states: {}", rows.len());
	for row in &rows {
		println!("  [{}] time={} mesh={} visible={}", row.index, row.time, row.mesh, row.visible_elements);
		for global in &row.globals {
			println!("    {}: {}", global.name, render_values(&global.values));
		}
		if let Some(name) = &field {
			match &row.value {
				Some(values) => println!("    {name}[{item}]: {}", render_values(values)),
				None => println!("    {name}[{item}]: -"),
			}
		}
	}

	Ok(())
}

#[derive(serde::Serialize)]
struct StatesJson {
	path: String,
	field: Option<String>,
	item: usize,
	states: Vec<StateJson>,
}

#[derive(serde::Serialize)]
struct StateJson {
	index: usize,
	time: f32,
	mesh: usize,
	visible_elements: usize,
	globals: Vec<GlobalJson>,
	value: Option<Vec<f32>>,
}

#[derive(serde::Serialize)]
struct GlobalJson {
	name: String,
	values: Vec<f32>,
}

#[cfg(test)]
mod tests;
