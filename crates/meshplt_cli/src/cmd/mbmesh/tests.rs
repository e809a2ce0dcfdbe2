use crate::cmd::test_support::{run_meshplt, run_meshplt_json, write_scratch};

const UNIT_CUBE: &str = r#"[0, 0, 0], [1, 0, 0], [1, 1, 0], [0, 1, 0], [0, 0, 1], [1, 0, 1], [1, 1, 1], [0, 1, 1]"#;

#[test]
fn single_subdivided_block_builds_full_lattice() {
	let problem = format!(r#"{{ "nodes": [{UNIT_CUBE}], "blocks": [{{ "nodes": [0, 1, 2, 3, 4, 5, 6, 7], "divisions": [2, 2, 2], "face_regions": [1, 1, 1, 1, 2, 2] }}] }}"#);
	let path = write_scratch("mbmesh-single.json", problem.as_bytes());
	let json = run_meshplt_json(&["mbmesh", &path, "--json"]);

	assert_eq!(json["nodes"], 27);
	assert_eq!(json["expected_nodes"], 27);
	assert_eq!(json["elements"], 8);
	assert_eq!(json["faces"], 24);
	assert_eq!(json["bounds"][1][0], 1.0);
}

#[test]
fn neighbouring_blocks_share_their_face_nodes() {
	let problem = r#"{
		"nodes": [
			[0, 0, 0], [1, 0, 0], [2, 0, 0], [0, 1, 0], [1, 1, 0], [2, 1, 0],
			[0, 0, 1], [1, 0, 1], [2, 0, 1], [0, 1, 1], [1, 1, 1], [2, 1, 1]
		],
		"blocks": [
			{ "nodes": [0, 1, 4, 3, 6, 7, 10, 9] },
			{ "nodes": [1, 2, 5, 4, 7, 8, 11, 10] }
		]
	}"#;
	let path = write_scratch("mbmesh-pair.json", problem.as_bytes());
	let json = run_meshplt_json(&["mbmesh", &path, "--json"]);

	assert_eq!(json["blocks"], 2);
	assert_eq!(json["block_faces"], 11);
	assert_eq!(json["nodes"], 12);
	assert_eq!(json["elements"], 2);
	assert_eq!(json["faces"], 0);
}

#[test]
fn malformed_description_is_reported() {
	let path = write_scratch("mbmesh-bad.json", br#"{ "nodes": [], "blocks": [{ "corners": [] }] }"#);
	let output = run_meshplt(&["mbmesh", &path]);

	assert!(!output.status.success());
	assert!(String::from_utf8_lossy(&output.stderr).contains("invalid block description"));
}

#[test]
fn missing_corner_is_reported() {
	let path = write_scratch("mbmesh-dangling.json", br#"{ "nodes": [[0, 0, 0]], "blocks": [{ "nodes": [0, 1, 2, 3, 4, 5, 6, 7] }] }"#);
	let output = run_meshplt(&["mbmesh", &path]);

	assert!(!output.status.success());
	assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));
}
