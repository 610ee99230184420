use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum XivError {
	#[error(transparent)]
	#[diagnostic(code(xiv::io_error))]
	Io(#[from] std::io::Error),

	#[error("invalid input `{path}`: {reason}")]
	#[diagnostic(code(xiv::invalid_input))]
	InvalidInput { path: String, reason: String },

	#[error("invalid fragment path `{name}`: directory traversal is not allowed")]
	#[diagnostic(
		code(xiv::invalid_path),
		help("fragment names must resolve to a file inside the template directory")
	)]
	InvalidPath { name: String },

	#[error("fragment file not found: `{path}`")]
	#[diagnostic(
		code(xiv::fragment_not_found),
		help("create the file or fix the `x-name` attribute of the `<x-temp>` tag")
	)]
	FragmentNotFound { path: String },

	#[error("`<x-temp>` tag in `{fragment}` is missing the required `x-name` attribute")]
	#[diagnostic(
		code(xiv::missing_fragment_name),
		help("add `x-name=\"<fragment>\"` to select the fragment to include")
	)]
	MissingFragmentName { fragment: String },

	#[error("circular reference detected: `{from}` -> `{to}`")]
	#[diagnostic(
		code(xiv::circular_reference),
		help("a fragment cannot include itself, directly or through other fragments")
	)]
	CircularReference { from: String, to: String },

	#[error("invalid `x-for` expression `{expression}` in `{fragment}`")]
	#[diagnostic(
		code(xiv::invalid_iteration_expression),
		help("use the form `x-for=\"item in items\"`")
	)]
	InvalidIterationExpression { expression: String, fragment: String },

	#[error("invalid data for `{path}` in `x-for` in `{fragment}`: {reason}")]
	#[diagnostic(
		code(xiv::invalid_iteration_source),
		help("loop sources must be a list or a JSON array string")
	)]
	InvalidIterationSource {
		path: String,
		reason: String,
		fragment: String,
	},

	#[error("fragment nesting exceeds the limit of {limit} in `{fragment}`")]
	#[diagnostic(
		code(xiv::nesting_too_deep),
		help("increase `templates.max_depth` in xiv.toml or flatten the fragment chain")
	)]
	NestingTooDeep { limit: usize, fragment: String },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(xiv::config_parse),
		help("check that xiv.toml is valid TOML with [templates] and/or [output] sections")
	)]
	ConfigParse(String),
}

pub type XivResult<T> = Result<T, XivError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
