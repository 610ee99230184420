use std::path::Path;

use crate::Element;
use crate::MAIN_MARKER_TYPE;
use crate::MARKER_TAG;
use crate::Node;
use crate::tree::replace_first_element;
use crate::tree::to_html;

/// Script body used when no runtime script is available.
pub const MISSING_RUNTIME_SCRIPT: &str =
	"// xiv runtime not found. Interactive features are disabled.";

/// Render compiled nodes as a complete HTML document.
///
/// The runtime script is appended as the last child of the
/// `<xiv type="main">` marker, which is then unwrapped in place. Without a
/// marker the script goes at the end of the document. Whitespace-only lines
/// are dropped from the output.
pub fn render_document(mut nodes: Vec<Node>, runtime_script: Option<&str>) -> String {
	let script = Element::new("script").with_child(Node::text(
		runtime_script.unwrap_or(MISSING_RUNTIME_SCRIPT),
	));

	let is_main = |element: &Element| {
		element.is(MARKER_TAG) && element.attribute("type") == Some(MAIN_MARKER_TYPE)
	};

	let mut script = Some(script);
	let unwrapped = replace_first_element(&mut nodes, &is_main, |marker| {
		let mut children = marker.children;
		children.extend(script.take().map(Node::Element));
		children
	})
	.is_ok();

	if !unwrapped {
		nodes.extend(script.map(Node::Element));
	}

	let document = format!("<!DOCTYPE html>\n<html>\n{}\n</html>", to_html(&nodes));
	let mut output = String::with_capacity(document.len());

	for line in document.lines().filter(|line| !line.trim().is_empty()) {
		output.push_str(line);
		output.push('\n');
	}

	output
}

/// Read the runtime script at `path`. Returns `None` when no path is given
/// or the file cannot be read, logging a warning in the latter case.
pub fn read_runtime_script(path: Option<&Path>) -> Option<String> {
	let path = path?;

	match std::fs::read_to_string(path) {
		Ok(script) => Some(script),
		Err(error) => {
			tracing::warn!(path = %path.display(), %error, "runtime script not found");
			None
		}
	}
}
