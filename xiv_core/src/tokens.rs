use crate::tree::Attribute;

/// Elements whose content is raw text and never parsed as markup.
pub const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

/// Flat markup tokens produced by the lexer. The parser turns these into a
/// tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
	/// `<name attr="value">` or `<name />`
	StartTag {
		name: String,
		attributes: Vec<Attribute>,
		self_closing: bool,
	},
	/// `</name>`
	EndTag(String),
	/// Raw text between tags, entities untouched.
	Text(String),
	/// The body of `<!-- ... -->`
	Comment(String),
	/// `<!DOCTYPE html>` or `<?xml ...?>`, kept verbatim.
	Declaration(String),
}
