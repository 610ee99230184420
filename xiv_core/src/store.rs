use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::MARKER_TAG;
use crate::Node;
use crate::XivError;
use crate::XivResult;
use crate::parser::parse;
use crate::tree::replace_first_element;

/// File extension of fragment files.
pub const FRAGMENT_EXTENSION: &str = "xiv";
/// `type` of the marker wrapping a fragment body.
pub const TEMPLATE_MARKER_TYPE: &str = "template";
/// `type` of the marker wrapping the body of the main document.
pub const MAIN_MARKER_TYPE: &str = "main";

/// Fragments on disk, below a single trusted root directory.
///
/// Nothing is cached: every inclusion reads its file again.
#[derive(Debug, Clone)]
pub struct TemplateStore {
	root: PathBuf,
}

impl TemplateStore {
	/// Open the store rooted at `root`, which must be an existing directory.
	pub fn open(root: impl AsRef<Path>) -> XivResult<Self> {
		let root = root.as_ref();

		if !root.is_dir() {
			let reason = if root.exists() {
				"template root is not a directory"
			} else {
				"template root does not exist"
			};

			return Err(XivError::InvalidInput {
				path: root.display().to_string(),
				reason: reason.to_string(),
			});
		}

		Ok(Self {
			root: root.canonicalize()?,
		})
	}

	/// The canonical template root.
	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Resolve a fragment name to the path of its file.
	///
	/// The result is guaranteed to lie inside the root. When the file exists
	/// the path is canonical, so symlinks are followed before the containment
	/// check. A missing file is not an error here; [`TemplateStore::load`]
	/// reports it.
	pub fn resolve(&self, name: &str) -> XivResult<PathBuf> {
		let invalid = || {
			XivError::InvalidPath {
				name: name.to_string(),
			}
		};

		let candidate =
			normalize_lexically(&self.root.join(format!("{name}.{FRAGMENT_EXTENSION}")));
		if !is_contained(&self.root, &candidate) {
			return Err(invalid());
		}

		if !candidate.exists() {
			return Ok(candidate);
		}

		let canonical = candidate.canonicalize()?;
		if !is_contained(&self.root, &canonical) {
			return Err(invalid());
		}

		Ok(canonical)
	}

	/// Read and parse the fragment at `path`, returning the children of its
	/// `<xiv type="template">` marker or the whole document when the marker
	/// is missing.
	pub fn load(&self, path: &Path) -> XivResult<Vec<Node>> {
		if !path.is_file() {
			return Err(XivError::FragmentNotFound {
				path: path.display().to_string(),
			});
		}

		let source = std::fs::read_to_string(path)?;
		Ok(extract_marker_body(parse(source), TEMPLATE_MARKER_TYPE))
	}
}

/// Return the children of the first `<xiv type="{kind}">` element, or all
/// `nodes` when there is none.
pub fn extract_marker_body(mut nodes: Vec<Node>, kind: &str) -> Vec<Node> {
	let mut body = None;
	let is_marker = |element: &crate::Element| {
		element.is(MARKER_TAG) && element.attribute("type") == Some(kind)
	};

	let found = replace_first_element(&mut nodes, &is_marker, |element| {
		body = Some(element.children);
		Vec::new()
	})
	.is_ok();

	match body {
		Some(body) if found => body,
		_ => nodes,
	}
}

/// Resolve `.` and `..` components without touching the filesystem. `..` at
/// the filesystem root stays at the root.
pub fn normalize_lexically(path: &Path) -> PathBuf {
	let mut normalized = PathBuf::new();

	for component in path.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => {
				match normalized.components().next_back() {
					Some(Component::Normal(_)) => {
						normalized.pop();
					}
					Some(Component::RootDir | Component::Prefix(_)) => {}
					_ => normalized.push(component),
				}
			}
			other => normalized.push(other),
		}
	}

	normalized
}

/// Whether `path` is `root` itself or lies below it. Compares whole path
/// components, so `/templates-evil` is not inside `/templates`.
pub fn is_contained(root: &Path, path: &Path) -> bool {
	path == root || path.starts_with(root)
}
