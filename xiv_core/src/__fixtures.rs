use std::path::Path;
use std::path::PathBuf;

use tempfile::TempDir;

use crate::CompileOptions;
use crate::Compiler;
use crate::XivResult;
use crate::to_html;

/// A temporary project with a `templates` directory.
pub struct TemplateProject {
	dir: TempDir,
}

impl TemplateProject {
	pub fn new() -> Self {
		let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
		std::fs::create_dir(dir.path().join("templates")).unwrap_or_else(|e| panic!("mkdir: {e}"));

		Self { dir }
	}

	pub fn path(&self) -> &Path {
		self.dir.path()
	}

	pub fn templates(&self) -> PathBuf {
		self.dir.path().join("templates")
	}

	/// Write `<templates>/<name>.xiv`, wrapped in a template marker.
	#[must_use]
	pub fn fragment(self, name: &str, body: &str) -> Self {
		self.raw_fragment(name, &format!("<xiv type=\"template\">{body}</xiv>"))
	}

	/// Write `<templates>/<name>.xiv` verbatim.
	#[must_use]
	pub fn raw_fragment(self, name: &str, source: &str) -> Self {
		let path = self.templates().join(format!("{name}.xiv"));
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("mkdir: {e}"));
		}
		std::fs::write(path, source).unwrap_or_else(|e| panic!("write: {e}"));
		self
	}

	/// Write a file relative to the project root.
	#[must_use]
	pub fn file(self, relative: &str, content: &str) -> Self {
		let path = self.path().join(relative);
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("mkdir: {e}"));
		}
		std::fs::write(path, content).unwrap_or_else(|e| panic!("write: {e}"));
		self
	}

	pub fn compiler(&self) -> Compiler {
		Compiler::new(self.templates()).unwrap_or_else(|e| panic!("compiler: {e}"))
	}

	pub fn compiler_with(&self, options: CompileOptions) -> Compiler {
		Compiler::with_options(self.templates(), options)
			.unwrap_or_else(|e| panic!("compiler: {e}"))
	}

	/// Compile `source` and serialize the result.
	pub fn compile(&self, source: &str) -> XivResult<String> {
		self.compiler().compile(source).map(|nodes| to_html(&nodes))
	}
}
