use std::fmt::Display;

use html_escape::encode_double_quoted_attribute;

use crate::directive::DirectiveKind;

/// Elements that never have children or a closing tag.
pub const VOID_ELEMENTS: [&str; 14] = [
	"area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
	"track", "wbr",
];

/// A single `name="value"` pair. The value is stored entity-decoded and
/// encoded again when serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
	pub name: String,
	pub value: String,
}

impl Attribute {
	pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			value: value.into(),
		}
	}
}

impl Display for Attribute {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if self.value.is_empty() {
			write!(f, " {}", self.name)
		} else {
			write!(
				f,
				" {}=\"{}\"",
				self.name,
				encode_double_quoted_attribute(&self.value)
			)
		}
	}
}

/// An element of the markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
	/// The lowercase tag name.
	pub name: String,
	/// Attributes in source order.
	pub attributes: Vec<Attribute>,
	/// Child nodes in source order.
	pub children: Vec<Node>,
	/// Set on the output of a finished expansion (loop copies and fragment
	/// wrappers). Later passes of the enclosing level leave sealed elements
	/// alone.
	pub(crate) sealed: bool,
}

impl Element {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			attributes: Vec::new(),
			children: Vec::new(),
			sealed: false,
		}
	}

	#[must_use]
	pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.set_attribute(name, value);
		self
	}

	#[must_use]
	pub fn with_child(mut self, child: Node) -> Self {
		self.children.push(child);
		self
	}

	/// Whether this element has the given tag name.
	pub fn is(&self, name: &str) -> bool {
		self.name == name
	}

	pub fn is_void(&self) -> bool {
		VOID_ELEMENTS.contains(&self.name.as_str())
	}

	pub fn is_sealed(&self) -> bool {
		self.sealed
	}

	#[must_use]
	pub(crate) fn sealed(mut self) -> Self {
		self.sealed = true;
		self
	}

	pub fn attribute(&self, name: &str) -> Option<&str> {
		self.attributes
			.iter()
			.find(|attribute| attribute.name == name)
			.map(|attribute| attribute.value.as_str())
	}

	/// Set an attribute, replacing the value of an existing one.
	pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
		let name = name.into();
		let value = value.into();

		match self
			.attributes
			.iter_mut()
			.find(|attribute| attribute.name == name)
		{
			Some(attribute) => attribute.value = value,
			None => self.attributes.push(Attribute { name, value }),
		}
	}

	/// Remove the first attribute carrying a directive of `kind` and return
	/// its value.
	pub fn take_directive(&mut self, kind: DirectiveKind) -> Option<String> {
		let index = self
			.attributes
			.iter()
			.position(|attribute| DirectiveKind::of(&attribute.name) == Some(kind))?;
		Some(self.attributes.remove(index).value)
	}

	/// The concatenated raw text of all descendant text nodes.
	pub fn text_content(&self) -> String {
		text_content(&self.children)
	}
}

impl Display for Element {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "<{}", self.name)?;
		for attribute in &self.attributes {
			write!(f, "{attribute}")?;
		}
		write!(f, ">")?;

		if self.is_void() {
			return Ok(());
		}

		for child in &self.children {
			write!(f, "{child}")?;
		}
		write!(f, "</{}>", self.name)
	}
}

/// A node of the markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
	Element(Element),
	/// Raw text. Entities are kept as written in the source.
	Text(String),
	/// The body of an HTML comment.
	Comment(String),
	/// A `<!DOCTYPE>` or processing instruction, kept verbatim.
	Declaration(String),
}

impl Node {
	pub fn text(text: impl Into<String>) -> Self {
		Self::Text(text.into())
	}

	pub fn as_element(&self) -> Option<&Element> {
		match self {
			Self::Element(element) => Some(element),
			_ => None,
		}
	}

	/// Whether this is a text node containing only whitespace.
	pub fn is_whitespace(&self) -> bool {
		matches!(self, Self::Text(text) if text.trim().is_empty())
	}

	#[must_use]
	pub(crate) fn sealed(self) -> Self {
		match self {
			Self::Element(element) => Self::Element(element.sealed()),
			other => other,
		}
	}
}

impl From<Element> for Node {
	fn from(element: Element) -> Self {
		Self::Element(element)
	}
}

impl Display for Node {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Element(element) => write!(f, "{element}"),
			Self::Text(text) => write!(f, "{text}"),
			Self::Comment(body) => write!(f, "<!--{body}-->"),
			Self::Declaration(raw) => write!(f, "{raw}"),
		}
	}
}

/// Serialize a list of nodes back to markup.
pub fn to_html(nodes: &[Node]) -> String {
	nodes.iter().map(ToString::to_string).collect()
}

/// The concatenated raw text of all text nodes, in document order.
pub fn text_content(nodes: &[Node]) -> String {
	let mut content = String::new();
	for node in nodes {
		match node {
			Node::Text(text) => content.push_str(text),
			Node::Element(element) => content.push_str(&element.text_content()),
			Node::Comment(_) | Node::Declaration(_) => {}
		}
	}
	content
}

/// Find the first element matching `predicate`, depth-first in document
/// order.
pub fn find_element<'a, P>(nodes: &'a [Node], predicate: &P) -> Option<&'a Element>
where
	P: Fn(&Element) -> bool,
{
	for node in nodes {
		let Node::Element(element) = node else {
			continue;
		};

		if predicate(element) {
			return Some(element);
		}

		if let Some(found) = find_element(&element.children, predicate) {
			return Some(found);
		}
	}

	None
}

/// Collect every element matching `predicate`, depth-first in document order.
pub fn find_elements<'a, P>(nodes: &'a [Node], predicate: &P) -> Vec<&'a Element>
where
	P: Fn(&Element) -> bool,
{
	let mut found = Vec::new();
	for node in nodes {
		if let Node::Element(element) = node {
			if predicate(element) {
				found.push(element);
			}
			found.extend(find_elements(&element.children, predicate));
		}
	}
	found
}

/// Replace the first element matching `predicate` (depth-first, including
/// sealed subtrees) with the nodes returned by `replace`. Hands `replace`
/// back when nothing matched.
pub fn replace_first_element<P, R>(nodes: &mut Vec<Node>, predicate: &P, replace: R) -> Result<(), R>
where
	P: Fn(&Element) -> bool,
	R: FnOnce(Element) -> Vec<Node>,
{
	let mut replace = replace;

	for index in 0..nodes.len() {
		let Node::Element(element) = &mut nodes[index] else {
			continue;
		};

		if predicate(element) {
			let matched = std::mem::replace(element, Element::new(""));
			nodes.splice(index..=index, replace(matched));
			return Ok(());
		}

		match replace_first_element(&mut element.children, predicate, replace) {
			Ok(()) => return Ok(()),
			Err(returned) => replace = returned,
		}
	}

	Err(replace)
}

/// Drop whitespace-only text nodes from both ends of the list.
pub fn trim_whitespace(mut nodes: Vec<Node>) -> Vec<Node> {
	while nodes.last().is_some_and(Node::is_whitespace) {
		nodes.pop();
	}
	let leading = nodes
		.iter()
		.take_while(|node| node.is_whitespace())
		.count();
	nodes.drain(..leading);
	nodes
}
