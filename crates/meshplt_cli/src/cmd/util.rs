use std::path::Path;

use meshplt::plt::{LoadOutcome, LoadReport, PltReader, PostModel, ReadOptions, StateSelection};

use crate::error::Result;

/// Archive loading flags shared by the inspection commands.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct LoadArgs {
	/// Keep only the last state.
	#[arg(long, conflicts_with = "state")]
	pub last: bool,
	/// Keep only the listed state positions (0-based, repeatable).
	#[arg(long)]
	pub state: Vec<usize>,
	/// Fail when a surface record matches no mesh face.
	#[arg(long)]
	pub strict: bool,
	/// Domain field copied into per-element shell thickness.
	#[arg(long = "shell-thickness")]
	pub shell_thickness: Option<String>,
}

impl LoadArgs {
	/// Reader options these flags select.
	pub fn options(&self) -> ReadOptions {
		let mut options = if self.strict { ReadOptions::strict() } else { ReadOptions::default() };
		if self.last {
			options.states = StateSelection::Last;
		} else if !self.state.is_empty() {
			options.states = StateSelection::List(self.state.clone());
		}
		if let Some(name) = &self.shell_thickness {
			options.shell_thickness_field = name.clone();
		}
		options
	}
}

/// Load `path` into a fresh model.
pub(crate) fn load_archive(path: &Path, options: ReadOptions) -> Result<(PostModel, LoadReport)> {
	let mut model = PostModel::new();
	let report = PltReader::new(options).load_file(path, &mut model)?;
	Ok((model, report))
}

pub(crate) fn outcome_label(outcome: &LoadOutcome) -> &'static str {
	match outcome {
		LoadOutcome::Complete => "complete",
		LoadOutcome::Partial { .. } => "partial",
		LoadOutcome::Cancelled => "cancelled",
	}
}

/// Print a serializable payload as pretty JSON on stdout.
pub(crate) fn emit_json<T: serde::Serialize>(payload: &T) {
	match serde_json::to_string_pretty(payload) {
		Ok(text) => println!("{text}"),
		Err(err) => eprintln!("error: failed to encode json: {err}"),
	}
}

/// Render float components as a space separated list.
pub(crate) fn render_values(values: &[f32]) -> String {
	values.iter().map(|value| value.to_string()).collect::<Vec<_>>().join(" ")
}
