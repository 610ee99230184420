use std::path::Path;

use crate::ArgumentContext;
use crate::MAIN_LABEL;
use crate::Node;
use crate::TemplateStore;
use crate::XivError;
use crate::XivResult;
use crate::engine::Session;
use crate::parser::parse;

/// Limits applied to a compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
	/// Maximum number of nested fragment inclusions. `None` means cycle
	/// detection is the only bound.
	pub max_depth: Option<usize>,
}

/// Compiles template source against a template root.
///
/// A compiler holds no per-run state, so one instance can compile any number
/// of documents in sequence.
#[derive(Debug, Clone)]
pub struct Compiler {
	store: TemplateStore,
	options: CompileOptions,
}

impl Compiler {
	/// Create a compiler for the fragments below `template_root`.
	pub fn new(template_root: impl AsRef<Path>) -> XivResult<Self> {
		Self::with_options(template_root, CompileOptions::default())
	}

	pub fn with_options(template_root: impl AsRef<Path>, options: CompileOptions) -> XivResult<Self> {
		Ok(Self {
			store: TemplateStore::open(template_root)?,
			options,
		})
	}

	pub fn store(&self) -> &TemplateStore {
		&self.store
	}

	pub fn options(&self) -> &CompileOptions {
		&self.options
	}

	/// Compile `source` with an empty argument context.
	pub fn compile(&self, source: &str) -> XivResult<Vec<Node>> {
		self.compile_with(source, &ArgumentContext::new())
	}

	/// Compile `source` with `context` as the variables of the top-level
	/// document.
	pub fn compile_with(&self, source: &str, context: &ArgumentContext<'_>) -> XivResult<Vec<Node>> {
		let mut session = Session::new(&self.store, &self.options);
		session.process(parse(source), context, MAIN_LABEL)
	}

	/// Read and compile the main document at `path`.
	pub fn compile_file(&self, path: impl AsRef<Path>) -> XivResult<Vec<Node>> {
		let path = path.as_ref();

		if !path.is_file() {
			let reason = if path.exists() {
				"main template is not a file"
			} else {
				"main template does not exist"
			};

			return Err(XivError::InvalidInput {
				path: path.display().to_string(),
				reason: reason.to_string(),
			});
		}

		tracing::debug!(path = %path.display(), "compiling");
		let source = std::fs::read_to_string(path)?;
		self.compile(&source)
	}
}
