use crate::lexer::tokenize;
use crate::tokens::Token;
use crate::tree::Element;
use crate::tree::Node;

/// Parse template source into a markup tree.
///
/// Parsing is lenient in the way HTML parsers are: stray end tags are
/// dropped, unclosed elements are closed at the end of the input and void
/// elements never receive children. Unlike HTML, an explicit `/>` closes any
/// element, so `<x-temp x-name="card" />` has no children.
pub fn parse(source: impl AsRef<str>) -> Vec<Node> {
	build_tree(tokenize(source.as_ref()))
}

/// Build a tree from already-tokenized markup.
pub fn build_tree(tokens: Vec<Token>) -> Vec<Node> {
	let mut root: Vec<Node> = Vec::new();
	let mut open: Vec<Element> = Vec::new();

	for token in tokens {
		match token {
			Token::StartTag {
				name,
				attributes,
				self_closing,
			} => {
				let mut element = Element::new(name);
				element.attributes = attributes;

				if self_closing || element.is_void() {
					append(&mut root, &mut open, Node::Element(element));
				} else {
					open.push(element);
				}
			}
			Token::EndTag(name) => {
				let Some(position) = open.iter().rposition(|element| element.name == name) else {
					continue;
				};

				while open.len() > position {
					if let Some(element) = open.pop() {
						append(&mut root, &mut open, Node::Element(element));
					}
				}
			}
			Token::Text(text) => append(&mut root, &mut open, Node::Text(text)),
			Token::Comment(body) => append(&mut root, &mut open, Node::Comment(body)),
			Token::Declaration(raw) => append(&mut root, &mut open, Node::Declaration(raw)),
		}
	}

	while let Some(element) = open.pop() {
		append(&mut root, &mut open, Node::Element(element));
	}

	root
}

fn append(root: &mut Vec<Node>, open: &mut [Element], node: Node) {
	match open.last_mut() {
		Some(parent) => parent.children.push(node),
		None => root.push(node),
	}
}
