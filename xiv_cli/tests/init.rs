mod common;

use xiv_core::AnyEmptyResult;

#[test]
fn can_init() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::xiv_cmd()
		.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Created main.xiv"))
		.stdout(predicates::str::contains("Created xiv.toml"));

	let main = std::fs::read_to_string(tmp.path().join("main.xiv"))?;
	assert!(main.contains("<xiv type=\"main\">"));
	assert!(main.contains("x-name=\"card\""));

	let card = std::fs::read_to_string(tmp.path().join("templates/card.xiv"))?;
	assert!(card.contains("<xiv type=\"template\">"));
	assert!(card.contains("<x-slot/>"));

	let config = std::fs::read_to_string(tmp.path().join("xiv.toml"))?;
	assert!(config.contains("[templates]"));
	assert!(config.contains("[output]"));

	Ok(())
}

#[test]
fn init_does_not_overwrite() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let main_path = tmp.path().join("main.xiv");
	std::fs::write(&main_path, "existing content")?;

	common::xiv_cmd()
		.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Already exists: main.xiv"));

	assert_eq!(std::fs::read_to_string(&main_path)?, "existing content");
	assert!(tmp.path().join("templates/card.xiv").exists());

	Ok(())
}

#[test]
fn init_output_compiles() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::xiv_cmd()
		.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	common::xiv_cmd()
		.arg("compile")
		.arg("main.xiv")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	let html = std::fs::read_to_string(tmp.path().join("index.html"))?;
	assert!(html.starts_with("<!DOCTYPE html>\n<html>\n"));
	assert!(html.contains("<h1>Hello from xiv</h1>"));
	assert!(html.contains("<div class=\"x-card\">"));
	assert!(html.contains("<h2>Getting started</h2>"));
	assert!(!html.contains("x-slot"));

	Ok(())
}
