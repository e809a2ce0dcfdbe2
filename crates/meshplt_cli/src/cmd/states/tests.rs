use crate::cmd::test_support::{run_meshplt, run_meshplt_json, write_archive};

#[test]
fn states_json_lists_times_and_globals() {
	let path = write_archive("states-all.plt", 3);
	let json = run_meshplt_json(&["states", &path, "--json"]);

	let states = json["states"].as_array().expect("states array");
	assert_eq!(states.len(), 3);
	assert_eq!(states[2]["time"], 3.0);
	assert_eq!(states[2]["visible_elements"], 2);
	assert_eq!(states[2]["globals"][0]["name"], "kinetic energy");
	assert_eq!(states[2]["globals"][0]["values"][0], 30.0);
}

#[test]
fn states_json_samples_stored_and_derived_fields() {
	let path = write_archive("states-field.plt", 2);

	let json = run_meshplt_json(&["states", &path, "--field", "heat", "--item", "1", "--json"]);
	assert_eq!(json["states"][0]["value"][0], 2.0);
	assert_eq!(json["states"][1]["value"][0], 4.0);

	let json = run_meshplt_json(&["states", &path, "--field", "pressure", "--item", "0", "--json"]);
	assert_eq!(json["states"][1]["value"][0], 2.0);
}

#[test]
fn states_selection_flags_filter_committed_states() {
	let path = write_archive("states-select.plt", 4);
	let json = run_meshplt_json(&["states", &path, "--state", "0", "--state", "2", "--json"]);

	let times: Vec<f64> = json["states"]
		.as_array()
		.expect("states array")
		.iter()
		.map(|state| state["time"].as_f64().expect("time"))
		.collect();
	assert_eq!(times, vec![1.0, 3.0]);
}

#[test]
fn states_rejects_unknown_field() {
	let path = write_archive("states-unknown.plt", 1);
	let output = run_meshplt(&["states", &path, "--field", "velocity"]);

	assert!(!output.status.success());
	assert!(String::from_utf8_lossy(&output.stderr).contains("field not found: velocity"));
}
