use std::path::Path;
use std::path::PathBuf;

use derive_more::Deref;
use derive_more::DerefMut;

use crate::ArgumentContext;
use crate::CompileOptions;
use crate::DirectiveKind;
use crate::Element;
use crate::INCLUDE_TAG;
use crate::InclusionCall;
use crate::IterationSource;
use crate::LoopHeader;
use crate::Node;
use crate::SLOT_TAG;
use crate::TEMPLATE_COMMENT_PREFIX;
use crate::TemplateStore;
use crate::XivError;
use crate::XivResult;
use crate::placeholder::resolve_raw;
use crate::placeholder::substitute_tree;
use crate::tree::replace_first_element;
use crate::tree::trim_whitespace;

/// Label used in errors for the top-level document.
pub const MAIN_LABEL: &str = "<main>";

/// Canonical paths of the fragments currently being expanded, outermost
/// first.
#[derive(Debug, Default, Deref, DerefMut)]
pub(crate) struct VisitationStack(
	#[deref]
	#[deref_mut]
	Vec<PathBuf>,
);

impl VisitationStack {
	fn contains_path(&self, path: &Path) -> bool {
		self.iter().any(|entry| entry == path)
	}
}

/// The state of a single compilation.
///
/// Every pass walks the tree of the current level. Elements produced by a
/// completed recursion are sealed and skipped by the passes of the level
/// that produced them.
pub(crate) struct Session<'c> {
	store: &'c TemplateStore,
	options: &'c CompileOptions,
	stack: VisitationStack,
}

impl<'c> Session<'c> {
	pub(crate) fn new(store: &'c TemplateStore, options: &'c CompileOptions) -> Self {
		Self {
			store,
			options,
			stack: VisitationStack::default(),
		}
	}

	#[cfg(test)]
	pub(crate) fn depth(&self) -> usize {
		self.stack.len()
	}

	/// Apply iteration, conditionals, inclusion and placeholder substitution,
	/// in that order, to `nodes`.
	pub(crate) fn process(
		&mut self,
		nodes: Vec<Node>,
		context: &ArgumentContext<'_>,
		label: &str,
	) -> XivResult<Vec<Node>> {
		let nodes = self.expand_iterations(nodes, context, label)?;
		let nodes = prune_nodes(nodes, context);
		let mut nodes = self.expand_inclusions(nodes, context, label)?;
		substitute_tree(&mut nodes, context);

		Ok(nodes)
	}

	fn expand_iterations(
		&mut self,
		nodes: Vec<Node>,
		context: &ArgumentContext<'_>,
		label: &str,
	) -> XivResult<Vec<Node>> {
		let mut expanded = Vec::with_capacity(nodes.len());

		for node in nodes {
			let mut element = match node {
				Node::Element(element) if !element.is_sealed() => element,
				other => {
					expanded.push(other);
					continue;
				}
			};

			match element.take_directive(DirectiveKind::Iterate) {
				Some(expression) => {
					expanded.extend(self.iterate(element, &expression, context, label)?);
				}
				None => {
					let children = std::mem::take(&mut element.children);
					element.children = self.expand_iterations(children, context, label)?;
					expanded.push(Node::Element(element));
				}
			}
		}

		Ok(expanded)
	}

	/// Render one copy of `element` per item of the loop source.
	fn iterate(
		&mut self,
		element: Element,
		expression: &str,
		context: &ArgumentContext<'_>,
		label: &str,
	) -> XivResult<Vec<Node>> {
		let header =
			LoopHeader::parse(expression).ok_or_else(|| {
				XivError::InvalidIterationExpression {
					expression: expression.to_string(),
					fragment: label.to_string(),
				}
			})?;

		let items = IterationSource::classify(context.get(header.source))
			.into_items()
			.map_err(|reason| {
				XivError::InvalidIterationSource {
					path: header.source.to_string(),
					reason,
					fragment: label.to_string(),
				}
			})?;

		tracing::debug!(
			source = header.source,
			items = items.len(),
			fragment = label,
			"expanding loop"
		);

		let mut copies = Vec::new();
		for item in items {
			let scope = context.derive(header.variable, item);
			let processed = self.process(vec![Node::Element(element.clone())], &scope, label)?;
			copies.extend(processed.into_iter().map(Node::sealed));
		}

		Ok(copies)
	}

	fn expand_inclusions(
		&mut self,
		nodes: Vec<Node>,
		context: &ArgumentContext<'_>,
		label: &str,
	) -> XivResult<Vec<Node>> {
		let mut expanded = Vec::with_capacity(nodes.len());

		for node in nodes {
			match node {
				Node::Element(element) if element.is(INCLUDE_TAG) && !element.is_sealed() => {
					expanded.push(self.include(element, context, label)?);
				}
				Node::Element(mut element) if !element.is_sealed() => {
					let children = std::mem::take(&mut element.children);
					element.children = self.expand_inclusions(children, context, label)?;
					expanded.push(Node::Element(element));
				}
				other => expanded.push(other),
			}
		}

		Ok(expanded)
	}

	/// Expand a single `<x-temp>` element into its fragment wrapper.
	fn include(
		&mut self,
		element: Element,
		context: &ArgumentContext<'_>,
		label: &str,
	) -> XivResult<Node> {
		let call = InclusionCall::scan(&element);
		let slot = self.process(element.children, context, label)?;

		let Some(name) = call.name else {
			return Err(XivError::MissingFragmentName {
				fragment: label.to_string(),
			});
		};

		let path = self.store.resolve(&name)?;
		if self.stack.contains_path(&path) {
			return Err(XivError::CircularReference {
				from: label.to_string(),
				to: path.display().to_string(),
			});
		}

		if let Some(limit) = self.options.max_depth {
			if self.stack.len() >= limit {
				return Err(XivError::NestingTooDeep {
					limit,
					fragment: label.to_string(),
				});
			}
		}

		let body = self.store.load(&path)?;
		let arguments: ArgumentContext<'_> = call
			.arguments
			.iter()
			.map(|(key, value)| (key.as_str(), resolve_raw(value, context).into_owned()))
			.collect();

		tracing::debug!(fragment = %name, depth = self.stack.len(), "expanding fragment");

		let fragment_label = path.display().to_string();
		self.stack.push(path);
		let result = self.process(body, &arguments, &fragment_label);
		self.stack.pop();
		let mut body = result?;

		if replace_first_element(&mut body, &|candidate: &Element| candidate.is(SLOT_TAG), |_| slot)
			.is_err()
		{
			tracing::trace!(fragment = %name, "fragment has no slot");
		}

		Ok(wrap_fragment(&name, body))
	}
}

/// Apply `x-if` conditionals and drop template comments.
fn prune_nodes(nodes: Vec<Node>, context: &ArgumentContext<'_>) -> Vec<Node> {
	let mut kept = Vec::with_capacity(nodes.len());

	for node in nodes {
		match node {
			Node::Comment(body) if body.trim_start().starts_with(TEMPLATE_COMMENT_PREFIX) => {}
			Node::Element(mut element) if !element.is_sealed() => {
				if let Some(condition) = element.take_directive(DirectiveKind::Condition) {
					if !context.evaluate(&condition) {
						tracing::debug!(condition = %condition, tag = %element.name, "removing element");
						continue;
					}
				}

				let children = std::mem::take(&mut element.children);
				element.children = prune_nodes(children, context);
				kept.push(Node::Element(element));
			}
			other => kept.push(other),
		}
	}

	kept
}

/// Wrap a resolved fragment body in `<div class="x-{name}">`.
fn wrap_fragment(name: &str, body: Vec<Node>) -> Node {
	let class = format!("x-{}", sanitize_class_name(name));
	let mut wrapper = Element::new("div").with_attribute("class", class);
	wrapper.children = trim_whitespace(body);

	Node::Element(wrapper.sealed())
}

/// Keep only `[A-Za-z0-9_-]`, so `cards/item` becomes `carditem`.
pub fn sanitize_class_name(name: &str) -> String {
	name.chars()
		.filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
		.collect()
}
