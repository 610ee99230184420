use std::borrow::Cow;

use html_escape::encode_quoted_attribute;

use crate::ArgumentContext;
use crate::Node;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// A parsed `{{ path }}` or `{{ path | default }}` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder<'s> {
	/// The trimmed dotted path.
	pub path: &'s str,
	/// The trimmed default, when a `|` is present.
	pub default: Option<&'s str>,
}

impl Placeholder<'_> {
	/// Resolve against `context`: the textual form of the bound value, else
	/// the default, else an empty string.
	pub fn resolve(&self, context: &ArgumentContext<'_>) -> String {
		if let Some(value) = context.get(self.path) {
			return value.to_string();
		}

		tracing::trace!(path = self.path, "placeholder falls back to its default");
		self.default.unwrap_or_default().to_string()
	}
}

/// Parse the placeholder that follows an opening `{{`. Returns it together
/// with the number of bytes consumed, including the closing `}}`.
fn parse_placeholder(rest: &str) -> Option<(Placeholder<'_>, usize)> {
	let end = rest.find('}')?;
	if !rest[end..].starts_with(CLOSE) {
		return None;
	}

	let body = &rest[..end];
	let (path, default) = match body.split_once('|') {
		Some((path, default)) => (path, Some(default.trim())),
		None => (body, None),
	};

	if path.is_empty() {
		return None;
	}

	let placeholder = Placeholder {
		path: path.trim(),
		default,
	};

	Some((placeholder, end + CLOSE.len()))
}

/// Replace every placeholder in `text` with the output of `replace`. Text
/// without a complete placeholder is returned unchanged. An unterminated
/// `{{` is kept as written.
pub fn substitute<'t, F>(text: &'t str, mut replace: F) -> Cow<'t, str>
where
	F: FnMut(Placeholder<'_>) -> String,
{
	let mut output = String::new();
	let mut copied = 0;
	let mut cursor = 0;

	while let Some(offset) = text[cursor..].find(OPEN) {
		let start = cursor + offset;
		let body_start = start + OPEN.len();

		match parse_placeholder(&text[body_start..]) {
			Some((placeholder, consumed)) => {
				output.push_str(&text[copied..start]);
				output.push_str(&replace(placeholder));
				cursor = body_start + consumed;
				copied = cursor;
			}
			None => cursor = start + 1,
		}
	}

	if copied == 0 {
		return Cow::Borrowed(text);
	}

	output.push_str(&text[copied..]);
	Cow::Owned(output)
}

/// Substitute placeholders in a string without escaping. Used for argument
/// values and attribute values, which are escaped when serialized.
pub fn resolve_raw<'t>(text: &'t str, context: &ArgumentContext<'_>) -> Cow<'t, str> {
	substitute(text, |placeholder| placeholder.resolve(context))
}

/// Substitute placeholders in a raw text node. Inserted values are escaped.
pub fn resolve_text<'t>(text: &'t str, context: &ArgumentContext<'_>) -> Cow<'t, str> {
	substitute(text, |placeholder| {
		encode_quoted_attribute(&placeholder.resolve(context)).into_owned()
	})
}

/// Substitute placeholders in all text nodes and attribute values of
/// `nodes`. Sealed elements are the output of a finished expansion and are
/// left untouched, as are comments.
pub fn substitute_tree(nodes: &mut [Node], context: &ArgumentContext<'_>) {
	for node in nodes {
		match node {
			Node::Text(text) => {
				if let Some(resolved) = owned(resolve_text(text, context)) {
					*text = resolved;
				}
			}
			Node::Element(element) if !element.is_sealed() => {
				for attribute in &mut element.attributes {
					if let Some(resolved) = owned(resolve_raw(&attribute.value, context)) {
						attribute.value = resolved;
					}
				}
				substitute_tree(&mut element.children, context);
			}
			Node::Element(_) | Node::Comment(_) | Node::Declaration(_) => {}
		}
	}
}

fn owned(text: Cow<'_, str>) -> Option<String> {
	match text {
		Cow::Owned(text) => Some(text),
		Cow::Borrowed(_) => None,
	}
}
