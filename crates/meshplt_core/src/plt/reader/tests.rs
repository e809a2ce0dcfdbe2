use meshplt_testkit::ChunkBuilder;
use meshplt_testkit::plt::{ArchiveBuilder, DictEntry, MeshFixture, StateFixture, TYPE_FLOAT};

use crate::Error;
use crate::plt::reader::region;
use crate::plt::{PltReader, PostModel, ReadOptions, StateSelection, UnresolvedFacePolicy, tags};

#[test]
fn default_options_keep_everything() {
	let options = ReadOptions::default();
	assert_eq!(options.states, StateSelection::All);
	assert_eq!(options.unresolved_faces, UnresolvedFacePolicy::Skip);
	assert_eq!(options.shell_thickness_field, "shell thickness");
	assert!(options.cancel.is_none());

	assert_eq!(ReadOptions::last_state().states, StateSelection::Last);
	assert_eq!(ReadOptions::strict().unresolved_faces, UnresolvedFacePolicy::Fail);
}

#[test]
fn state_list_selects_by_position() {
	let selection = StateSelection::List(vec![0, 2]);
	assert!(selection.wants(0));
	assert!(!selection.wants(1));
	assert!(selection.wants(2));
	assert!(StateSelection::Last.wants(5));
}

#[test]
fn region_tags_are_one_based() {
	let items = ["a", "b"];
	assert_eq!(region(&items, "domain", 2).copied().expect("second"), "b");
	assert!(matches!(
		region(&items, "domain", 0),
		Err(Error::RegionIndexOutOfRange { index: 0, len: 2, .. })
	));
	assert!(matches!(region(&items, "surface", 3), Err(Error::RegionIndexOutOfRange { index: 3, .. })));
}

#[test]
fn archive_without_dictionary_is_rejected() {
	let mut out = ChunkBuilder::with_magic(tags::PLT_MAGIC);
	out.begin(tags::ROOT)
		.begin(tags::HEADER)
		.leaf_u32(tags::HDR_VERSION, tags::PLT_VERSION)
		.end()
		.end();

	let mut model = PostModel::new();
	let err = PltReader::default()
		.load_bytes(out.finish(), &mut model)
		.expect_err("dictionary is required");
	assert!(matches!(err, Error::MissingChunk { what: "dictionary", .. }));
}

#[test]
fn newer_archive_version_is_rejected() {
	let mut out = ChunkBuilder::with_magic(tags::PLT_MAGIC);
	out.begin(tags::ROOT)
		.begin(tags::HEADER)
		.leaf_u32(tags::HDR_VERSION, tags::PLT_VERSION + 1)
		.end()
		.begin(tags::DICTIONARY)
		.end()
		.end();

	let err = PltReader::default()
		.load_bytes(out.finish(), &mut PostModel::new())
		.expect_err("version is too new");
	assert!(matches!(err, Error::UnsupportedVersion { .. }));
}

#[test]
fn state_before_mesh_is_fatal() {
	let mut archive = ArchiveBuilder::new(&[DictEntry::nodal("temperature", TYPE_FLOAT)]);
	archive.state(&StateFixture::at(0.0, Vec::new()));
	let err = PltReader::default()
		.load_bytes(archive.finish(), &mut PostModel::new())
		.expect_err("no mesh yet");
	assert!(matches!(err, Error::NoMesh));
}

#[test]
fn unknown_top_level_chunk_after_mesh_stops_partially() {
	let mut archive = ArchiveBuilder::new(&[]);
	archive.mesh(&MeshFixture::two_hexes());
	let mut bytes = archive.finish();
	let mut tail = ChunkBuilder::new();
	tail.leaf_u32(0x0999_0000, 1);
	bytes.extend(tail.finish());

	let mut model = PostModel::new();
	let report = PltReader::default().load_bytes(bytes, &mut model).expect("mesh was read");
	assert!(matches!(report.error(), Some(Error::UnexpectedChunk { id: 0x0999_0000, .. })));
	assert_eq!(report.meshes, 1);
}
