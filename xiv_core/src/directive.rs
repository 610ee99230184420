use std::collections::BTreeMap;

use crate::Element;
use crate::Value;

/// Repeats the element once per item of a list: `x-for="item in items"`.
pub const ITERATE_ATTRIBUTE: &str = "x-for";
/// Keeps the element only when the condition holds: `x-if="[not ]path"`.
pub const CONDITION_ATTRIBUTE: &str = "x-if";
/// Names the fragment an inclusion element expands to.
pub const FRAGMENT_NAME_ATTRIBUTE: &str = "x-name";
/// Prefix of the attributes passed to an included fragment as arguments.
pub const ARGUMENT_PREFIX: &str = "t-";
/// Tag of the elements that include a fragment.
pub const INCLUDE_TAG: &str = "x-temp";
/// Tag of the slot placeholder inside a fragment body.
pub const SLOT_TAG: &str = "x-slot";
/// Tag of the document and fragment markers.
pub const MARKER_TAG: &str = "xiv";
/// Prefix of comments that are removed from the output.
pub const TEMPLATE_COMMENT_PREFIX: &str = "xiv-comment";

/// The kinds of directive attribute, resolved once from the attribute name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
	Iterate,
	Condition,
	FragmentName,
	Argument,
}

impl DirectiveKind {
	/// Classify an attribute name. Returns `None` for ordinary attributes.
	pub fn of(name: &str) -> Option<Self> {
		match name {
			ITERATE_ATTRIBUTE => Some(Self::Iterate),
			CONDITION_ATTRIBUTE => Some(Self::Condition),
			FRAGMENT_NAME_ATTRIBUTE => Some(Self::FragmentName),
			_ if is_argument_name(name) => Some(Self::Argument),
			_ => None,
		}
	}
}

fn is_argument_name(name: &str) -> bool {
	name.len() > ARGUMENT_PREFIX.len() && name.starts_with(ARGUMENT_PREFIX)
}

/// A directive attribute with its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive<'a> {
	Iterate(&'a str),
	Condition(&'a str),
	FragmentName(&'a str),
	Argument { key: &'a str, value: &'a str },
}

impl<'a> Directive<'a> {
	pub fn from_attribute(name: &'a str, value: &'a str) -> Option<Self> {
		let directive = match DirectiveKind::of(name)? {
			DirectiveKind::Iterate => Self::Iterate(value),
			DirectiveKind::Condition => Self::Condition(value),
			DirectiveKind::FragmentName => Self::FragmentName(value),
			DirectiveKind::Argument => {
				Self::Argument {
					key: &name[ARGUMENT_PREFIX.len()..],
					value,
				}
			}
		};

		Some(directive)
	}
}

/// The parsed value of an `x-for` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopHeader<'a> {
	/// The name each item is bound to.
	pub variable: &'a str,
	/// Dotted path of the list in the enclosing context.
	pub source: &'a str,
}

impl<'a> LoopHeader<'a> {
	/// Parse `<identifier> in <dotted.path>`. Surrounding whitespace and any
	/// run of whitespace between the parts is accepted.
	pub fn parse(expression: &'a str) -> Option<Self> {
		let mut parts = expression.split_whitespace();
		let (Some(variable), Some("in"), Some(source), None) =
			(parts.next(), parts.next(), parts.next(), parts.next())
		else {
			return None;
		};

		let is_word = |c: char| c.is_alphanumeric() || c == '_';
		if !variable.chars().all(is_word) || !source.chars().all(|c| is_word(c) || c == '.') {
			return None;
		}

		Some(Self { variable, source })
	}
}

/// What a loop path resolved to, before any decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IterationSource<'v> {
	/// Nothing is bound at the path. Renders zero items.
	Absent,
	/// A list held directly in the context.
	List(&'v [Value]),
	/// A string that must hold a JSON array.
	Encoded(&'v str),
	/// Anything else.
	Invalid(&'v Value),
}

impl<'v> IterationSource<'v> {
	pub fn classify(value: Option<&'v Value>) -> Self {
		match value {
			None | Some(Value::Null) => Self::Absent,
			Some(Value::List(items)) => Self::List(items),
			Some(Value::String(encoded)) => Self::Encoded(encoded),
			Some(other) => Self::Invalid(other),
		}
	}

	/// Decode the source into its items. The error is a human readable
	/// reason.
	pub fn into_items(self) -> Result<Vec<Value>, String> {
		match self {
			Self::Absent => Ok(Vec::new()),
			Self::List(items) => Ok(items.to_vec()),
			Self::Encoded(encoded) => {
				let decoded: serde_json::Value = serde_json::from_str(encoded)
					.map_err(|error| format!("string is not valid JSON: {error}"))?;

				match decoded {
					serde_json::Value::Array(items) => Ok(items.into_iter().map(Value::from).collect()),
					other => {
						Err(format!(
							"expected a JSON array but found {}",
							Value::from(other).kind()
						))
					}
				}
			}
			Self::Invalid(value) => Err(format!("expected a list but found {}", value.kind())),
		}
	}
}

/// The directives carried by an inclusion element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InclusionCall {
	/// The value of `x-name`. `None` when it is missing or empty.
	pub name: Option<String>,
	/// Arguments keyed without their `t-` prefix.
	pub arguments: BTreeMap<String, String>,
}

impl InclusionCall {
	pub fn scan(element: &Element) -> Self {
		let mut call = Self::default();

		for attribute in &element.attributes {
			match Directive::from_attribute(&attribute.name, &attribute.value) {
				Some(Directive::FragmentName(name)) => {
					let name = name.trim();
					if !name.is_empty() {
						call.name = Some(name.to_string());
					}
				}
				Some(Directive::Argument { key, value }) => {
					call.arguments
						.entry(key.to_string())
						.or_insert_with(|| value.to_string());
				}
				Some(Directive::Iterate(_) | Directive::Condition(_)) | None => {}
			}
		}

		call
	}
}
