use crate::cmd::test_support::{run_meshplt, run_meshplt_json, write_archive, write_scratch};

#[test]
fn info_json_reports_complete_load() {
	let path = write_archive("info-complete.plt", 3);
	let json = run_meshplt_json(&["info", &path, "--json"]);

	assert_eq!(json["compression"], "none");
	assert_eq!(json["outcome"], "complete");
	assert!(json["error"].is_null());
	assert_eq!(json["states_committed"], 3);
	assert_eq!(json["time_range"][1], 3.0);
	assert_eq!(json["mesh"]["nodes"], 12);
	assert_eq!(json["mesh"]["elements"], 2);
	assert_eq!(json["mesh"]["faces"], 10);
	assert_eq!(json["materials"][0]["name"], "solid");
	assert_eq!(json["materials"][0]["enabled"], true);
}

#[test]
fn info_json_reports_truncated_archive_as_partial() {
	let full = std::fs::read(write_archive("info-full.plt", 3)).expect("archive was written");
	let path = write_scratch("info-truncated.plt", &full[..full.len() - 5]);
	let json = run_meshplt_json(&["info", &path, "--json"]);

	assert_eq!(json["outcome"], "partial");
	assert_eq!(json["states_committed"], 2);
	assert!(json["error"].as_str().is_some_and(|text| !text.is_empty()));
}

#[test]
fn info_last_flag_keeps_one_state() {
	let path = write_archive("info-last.plt", 4);
	let json = run_meshplt_json(&["info", &path, "--last", "--json"]);

	assert_eq!(json["states_seen"], 4);
	assert_eq!(json["states_committed"], 1);
	assert_eq!(json["time_range"][0], 4.0);
	assert_eq!(json["time_range"][1], 4.0);
}

#[test]
fn info_rejects_unknown_files() {
	let path = write_scratch("info-garbage.plt", b"not an archive");
	let output = run_meshplt(&["info", &path]);

	assert!(!output.status.success());
	assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));
}
