mod common;

use std::path::Path;

use xiv_core::AnyEmptyResult;
use xiv_core::MISSING_RUNTIME_SCRIPT;

fn write(root: &Path, relative: &str, content: &str) -> AnyEmptyResult {
	let path = root.join(relative);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}
	std::fs::write(path, content)?;

	Ok(())
}

fn card_project(root: &Path) -> AnyEmptyResult {
	write(
		root,
		"templates/card.xiv",
		"<xiv type=\"template\"><h2>{{title}}</h2></xiv>",
	)?;
	write(
		root,
		"main.xiv",
		"<xiv type=\"main\"><x-temp x-name=\"card\" t-title=\"Hi\"></x-temp></xiv>",
	)
}

#[test]
fn compile_writes_document() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	card_project(tmp.path())?;

	common::xiv_cmd()
		.arg("compile")
		.arg("main.xiv")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Compiled main.xiv -> index.html"));

	let html = std::fs::read_to_string(tmp.path().join("index.html"))?;
	assert_eq!(
		html,
		format!(
			"<!DOCTYPE html>\n<html>\n<div class=\"x-card\"><h2>Hi</h2></div><script>{MISSING_RUNTIME_SCRIPT}</script>\n</html>\n"
		)
	);

	Ok(())
}

#[test]
fn compile_to_stdout() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	card_project(tmp.path())?;

	common::xiv_cmd()
		.arg("compile")
		.arg("main.xiv")
		.arg("--stdout")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("<div class=\"x-card\"><h2>Hi</h2></div>"));

	assert!(!tmp.path().join("index.html").exists());

	Ok(())
}

#[test]
fn compile_uses_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write(
		tmp.path(),
		"xiv.toml",
		"[templates]\npath = \"parts\"\n\n[output]\npath = \"dist/page.html\"\nruntime = \
		 \"runtime.js\"\n",
	)?;
	write(tmp.path(), "runtime.js", "console.log('hi');")?;
	write(tmp.path(), "parts/note.xiv", "<b>note</b>")?;
	write(tmp.path(), "main.xiv", "<x-temp x-name=\"note\"></x-temp>")?;

	common::xiv_cmd()
		.arg("compile")
		.arg("main.xiv")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	let html = std::fs::read_to_string(tmp.path().join("dist/page.html"))?;
	assert!(html.contains("<div class=\"x-note\"><b>note</b></div>"));
	assert!(html.contains("<script>console.log('hi');</script>"));

	Ok(())
}

#[test]
fn flags_override_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write(tmp.path(), "xiv.toml", "[templates]\npath = \"missing\"\n")?;
	write(tmp.path(), "other/note.xiv", "<b>note</b>")?;
	write(tmp.path(), "main.xiv", "<x-temp x-name=\"note\"></x-temp>")?;

	common::xiv_cmd()
		.arg("compile")
		.arg("main.xiv")
		.arg("--templates")
		.arg("other")
		.arg("--output")
		.arg("out.html")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	let html = std::fs::read_to_string(tmp.path().join("out.html"))?;
	assert!(html.contains("<div class=\"x-note\"><b>note</b></div>"));

	Ok(())
}

#[test]
fn circular_reference_fails_without_output() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write(tmp.path(), "templates/a.xiv", "<x-temp x-name=\"b\"></x-temp>")?;
	write(tmp.path(), "templates/b.xiv", "<x-temp x-name=\"a\"></x-temp>")?;
	write(tmp.path(), "main.xiv", "<x-temp x-name=\"a\"></x-temp>")?;

	common::xiv_cmd()
		.arg("compile")
		.arg("main.xiv")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("xiv::circular_reference"));

	assert!(!tmp.path().join("index.html").exists());

	Ok(())
}

#[test]
fn traversal_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::create_dir_all(tmp.path().join("templates"))?;
	write(tmp.path(), "secret.xiv", "<p>secret</p>")?;
	write(tmp.path(), "main.xiv", "<x-temp x-name=\"../secret\"></x-temp>")?;

	common::xiv_cmd()
		.arg("compile")
		.arg("main.xiv")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("xiv::invalid_path"));

	assert!(!tmp.path().join("index.html").exists());

	Ok(())
}

#[test]
fn missing_main_template_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::create_dir_all(tmp.path().join("templates"))?;

	common::xiv_cmd()
		.arg("compile")
		.arg("nope.xiv")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("xiv::invalid_input"));

	Ok(())
}

#[test]
fn missing_subcommand_fails() {
	common::xiv_cmd().assert().code(1);
}

#[test]
fn verbose_logs_resolved_settings() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	card_project(tmp.path())?;

	common::xiv_cmd()
		.arg("compile")
		.arg("main.xiv")
		.arg("--verbose")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stderr(predicates::str::contains("resolved compile settings"))
		.stderr(predicates::str::contains("expanding fragment"));

	Ok(())
}
