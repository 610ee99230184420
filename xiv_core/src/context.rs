use std::collections::BTreeMap;
use std::fmt::Display;

use serde::Serialize;

/// A value bound in an [`ArgumentContext`].
///
/// JSON numbers are kept as their textual form since the template language
/// only ever compares or prints them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
	Null,
	Bool(bool),
	String(String),
	List(Vec<Value>),
	Map(BTreeMap<String, Value>),
}

impl Value {
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	/// A short name for the kind of value, used in error messages.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Bool(_) => "a boolean",
			Self::String(_) => "a string",
			Self::List(_) => "a list",
			Self::Map(_) => "a mapping",
		}
	}

	/// Truthiness as used by `x-if`.
	///
	/// Booleans are themselves. Any other value is false when its textual
	/// form is `false`, `0` or empty (ignoring case) and true otherwise.
	pub fn is_truthy(&self) -> bool {
		match self {
			Self::Null => false,
			Self::Bool(value) => *value,
			other => {
				let text = other.to_string().to_lowercase();
				!matches!(text.as_str(), "false" | "0" | "")
			}
		}
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Null => Ok(()),
			Self::Bool(value) => write!(f, "{value}"),
			Self::String(value) => write!(f, "{value}"),
			Self::List(_) | Self::Map(_) => {
				let json = serde_json::to_string(self).map_err(|_| std::fmt::Error)?;
				write!(f, "{json}")
			}
		}
	}
}

impl From<serde_json::Value> for Value {
	fn from(value: serde_json::Value) -> Self {
		match value {
			serde_json::Value::Null => Self::Null,
			serde_json::Value::Bool(value) => Self::Bool(value),
			serde_json::Value::Number(number) => Self::String(number.to_string()),
			serde_json::Value::String(value) => Self::String(value),
			serde_json::Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
			serde_json::Value::Object(entries) => {
				Self::Map(
					entries
						.into_iter()
						.map(|(key, value)| (key, Self::from(value)))
						.collect(),
				)
			}
		}
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::String(value.to_string())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl<V: Into<Value>> From<Vec<V>> for Value {
	fn from(items: Vec<V>) -> Self {
		Self::List(items.into_iter().map(Into::into).collect())
	}
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
	fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
		Self::Map(
			iter.into_iter()
				.map(|(key, value)| (key.into(), value.into()))
				.collect(),
		)
	}
}

/// The variables visible at one point of the tree.
///
/// A fragment call starts a fresh context holding only its arguments. A loop
/// iteration derives a child context that adds the loop variable on top of
/// its parent, so the enclosing variables stay visible.
#[derive(Debug, Clone, Default)]
pub struct ArgumentContext<'p> {
	bindings: BTreeMap<String, Value>,
	parent: Option<&'p ArgumentContext<'p>>,
}

impl<'p> ArgumentContext<'p> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Bind `key` in this context, replacing any previous binding.
	#[must_use]
	pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.bindings.insert(key.into(), value.into());
		self
	}

	/// Create a child context that sees every binding of `self` plus `key`.
	pub fn derive(&self, key: impl Into<String>, value: Value) -> ArgumentContext<'_> {
		let mut bindings = BTreeMap::new();
		bindings.insert(key.into(), value);

		ArgumentContext {
			bindings,
			parent: Some(self),
		}
	}

	/// Look up a dotted path such as `user.name`. Returns `None` when a key is
	/// missing, an intermediate value is not a mapping, or the value is null.
	pub fn get(&self, path: &str) -> Option<&Value> {
		let mut segments = path.split('.');
		let mut value = self.lookup(segments.next()?)?;

		for segment in segments {
			let Value::Map(entries) = value else {
				return None;
			};
			value = entries.get(segment)?;
		}

		(!value.is_null()).then_some(value)
	}

	fn lookup(&self, key: &str) -> Option<&Value> {
		self.bindings
			.get(key)
			.or_else(|| self.parent.and_then(|parent| parent.lookup(key)))
	}

	/// Evaluate an `x-if` expression: a dotted path optionally preceded by
	/// exactly one `not `.
	pub fn evaluate(&self, expression: &str) -> bool {
		let (negated, path) = match expression.strip_prefix("not ") {
			Some(rest) => (true, rest.trim()),
			None => (false, expression.trim()),
		};

		let truthy = self.get(path).is_some_and(Value::is_truthy);
		truthy != negated
	}
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ArgumentContext<'_> {
	fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
		Self {
			bindings: iter
				.into_iter()
				.map(|(key, value)| (key.into(), value.into()))
				.collect(),
			parent: None,
		}
	}
}
