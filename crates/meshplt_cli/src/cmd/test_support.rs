use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::OnceLock;

use meshplt_testkit::plt::{
	ArchiveBuilder, DictEntry, FMT_ITEM, MeshFixture, StateFixture, TYPE_FLOAT, TYPE_MAT3FS, TYPE_VEC3F, VariableFixture,
};
use meshplt_testkit::{scratch_path, target_dir as workspace_target_dir};

static MESHPLT_BIN: OnceLock<PathBuf> = OnceLock::new();

pub(crate) fn run_meshplt(args: &[&str]) -> Output {
	Command::new(meshplt_bin()).args(args).output().expect("meshplt command executes")
}

pub(crate) fn run_meshplt_json(args: &[&str]) -> serde_json::Value {
	let output = run_meshplt(args);
	assert!(
		output.status.success(),
		"meshplt command failed with status={}: {}",
		output.status,
		String::from_utf8_lossy(&output.stderr)
	);
	serde_json::from_slice(&output.stdout).expect("stdout should be valid json")
}

/// Write a two-hex archive with `states` states to a scratch file and return its path.
pub(crate) fn write_archive(name: &str, states: usize) -> String {
	let mut archive = ArchiveBuilder::new(&[
		DictEntry::global("kinetic energy", TYPE_FLOAT),
		DictEntry::nodal("displacement", TYPE_VEC3F),
		DictEntry::domain("stress", TYPE_MAT3FS, FMT_ITEM),
		DictEntry::domain("heat", TYPE_FLOAT, FMT_ITEM),
	]);
	archive.mesh(&MeshFixture::two_hexes());
	for index in 0..states {
		let time = index as f32 + 1.0;
		archive.state(&StateFixture::at(
			time,
			vec![
				VariableFixture::global(1, vec![10.0 * time]),
				VariableFixture::nodal(1, (0..12).flat_map(|_| [time, 0.0, 0.0]).collect()),
				VariableFixture::domain(1, vec![(1, vec![-time, -time, -time, 0.0, 0.0, 0.0, -time, -time, -time, 0.0, 0.0, 0.0])]),
				VariableFixture::domain(2, vec![(1, vec![time, 2.0 * time])]),
			],
		));
	}
	write_scratch(name, &archive.finish())
}

pub(crate) fn write_scratch(name: &str, bytes: &[u8]) -> String {
	let path = scratch_path(name);
	std::fs::write(&path, bytes).expect("scratch file is writable");
	path.to_string_lossy().into_owned()
}

fn meshplt_bin() -> &'static PathBuf {
	MESHPLT_BIN.get_or_init(resolve_meshplt_bin)
}

fn resolve_meshplt_bin() -> PathBuf {
	if let Ok(path) = std::env::var("CARGO_BIN_EXE_meshplt") {
		return PathBuf::from(path);
	}

	let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
	let target_dir = workspace_target_dir();

	let mut bin = target_dir.join("debug");
	bin.push(if cfg!(windows) { "meshplt.exe" } else { "meshplt" });

	let status = Command::new("cargo")
		.current_dir(&manifest_dir)
		.args(["build", "--quiet", "--bin", "meshplt"])
		.status()
		.expect("cargo build executes");
	assert!(status.success(), "failed to build meshplt binary at {}", bin.display());

	bin
}
