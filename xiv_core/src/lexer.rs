use html_escape::decode_html_entities;
use logos::Lexer;
use logos::Logos;

use crate::tokens::RAW_TEXT_ELEMENTS;
use crate::tokens::Token;
use crate::tree::Attribute;

/// Raw tokens for the content between tags.
#[derive(Logos, Debug, PartialEq)]
enum RawToken {
	#[token("<!--", comment_body)]
	Comment(String),
	#[regex(r"<![A-Za-z][^>]*>", |lex| lex.slice().to_string())]
	#[regex(r"<\?[^>]*>", |lex| lex.slice().to_string())]
	Declaration(String),
	#[regex(r"<[A-Za-z][A-Za-z0-9_:.\-]*", |lex| lex.slice()[1..].to_ascii_lowercase())]
	StartTagOpen(String),
	#[regex(r"</[A-Za-z][A-Za-z0-9_:.\-]*[ \t\r\n\f]*>", end_tag_name)]
	EndTag(String),
	#[token("<")]
	LessThan,
	#[regex(r"[^<]+")]
	Text,
}

/// Raw tokens for the inside of a start tag, after its name.
#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum TagToken {
	#[regex(r#"[^ \t\r\n\f"'>/=]+"#)]
	Name,
	#[token("=")]
	Equals,
	#[regex(r#""[^"]*""#)]
	DoubleQuoted,
	#[regex(r"'[^']*'")]
	SingleQuoted,
	#[token("/>")]
	SelfClose,
	#[token(">")]
	Close,
	#[token("/")]
	Slash,
}

/// Consume everything up to and including the closing `-->`. An unterminated
/// comment runs to the end of the input.
fn comment_body(lex: &mut Lexer<'_, RawToken>) -> String {
	let remainder = lex.remainder();
	let (body, consumed) = match remainder.find("-->") {
		Some(end) => (&remainder[..end], end + 3),
		None => (remainder, remainder.len()),
	};
	let body = body.to_string();
	lex.bump(consumed);
	body
}

fn end_tag_name(lex: &mut Lexer<'_, RawToken>) -> String {
	lex.slice()[2..]
		.trim_end_matches('>')
		.trim_end()
		.to_ascii_lowercase()
}

fn is_markup_whitespace(c: char) -> bool {
	matches!(c, ' ' | '\t' | '\r' | '\n' | '\x0c')
}

/// Tokenize template source into a flat list of markup tokens. Tokenizing
/// never fails: anything that is not recognizable markup is kept as text.
pub fn tokenize(source: &str) -> Vec<Token> {
	let mut tokens = Vec::new();
	let mut lexer = RawToken::lexer(source);

	while let Some(result) = lexer.next() {
		match result {
			Ok(RawToken::Comment(body)) => tokens.push(Token::Comment(body)),
			Ok(RawToken::Declaration(raw)) => tokens.push(Token::Declaration(raw)),
			Ok(RawToken::EndTag(name)) => tokens.push(Token::EndTag(name)),
			Ok(RawToken::StartTagOpen(name)) => {
				let mut tag_lexer = lexer.morph::<TagToken>();
				let (attributes, self_closing) = read_attributes(&mut tag_lexer);
				lexer = tag_lexer.morph();

				let raw_text = !self_closing && RAW_TEXT_ELEMENTS.contains(&name.as_str());
				tokens.push(Token::StartTag {
					name: name.clone(),
					attributes,
					self_closing,
				});

				if raw_text {
					read_raw_text(&mut lexer, &name, &mut tokens);
				}
			}
			Ok(RawToken::LessThan | RawToken::Text) | Err(()) => {
				push_text(&mut tokens, lexer.slice());
			}
		}
	}

	tokens
}

/// Append text, merging it with a directly preceding text token.
fn push_text(tokens: &mut Vec<Token>, text: &str) {
	if text.is_empty() {
		return;
	}

	if let Some(Token::Text(previous)) = tokens.last_mut() {
		previous.push_str(text);
	} else {
		tokens.push(Token::Text(text.to_string()));
	}
}

/// Read attributes until the end of the start tag. Returns the attributes and
/// whether the tag was explicitly self-closed with `/>`. When an attribute is
/// repeated, the first occurrence wins.
fn read_attributes(lexer: &mut Lexer<'_, TagToken>) -> (Vec<Attribute>, bool) {
	let mut attributes: Vec<Attribute> = Vec::new();
	let mut awaiting_value = false;
	let mut self_closing = false;

	while let Some(result) = lexer.next() {
		match result {
			Ok(TagToken::Close) => break,
			Ok(TagToken::SelfClose) => {
				self_closing = true;
				break;
			}
			Ok(TagToken::Name) => {
				attributes.push(Attribute::new(
					lexer.slice().to_ascii_lowercase(),
					String::new(),
				));
				awaiting_value = true;
			}
			Ok(TagToken::Equals) => {
				let value = read_attribute_value(lexer);
				if awaiting_value {
					if let Some(attribute) = attributes.last_mut() {
						attribute.value = value;
					}
				}
				awaiting_value = false;
			}
			Ok(TagToken::DoubleQuoted | TagToken::SingleQuoted | TagToken::Slash) | Err(()) => {
				awaiting_value = false;
			}
		}
	}

	let mut seen = std::collections::HashSet::new();
	attributes.retain(|attribute| seen.insert(attribute.name.clone()));

	(attributes, self_closing)
}

/// Read the value following an `=`: double quoted, single quoted or
/// unquoted. The value is entity-decoded.
fn read_attribute_value(lexer: &mut Lexer<'_, TagToken>) -> String {
	let remainder = lexer.remainder();
	let trimmed = remainder.trim_start_matches(is_markup_whitespace);
	let skipped = remainder.len() - trimmed.len();

	let (raw, consumed) = match trimmed.chars().next() {
		Some(quote @ ('"' | '\'')) => {
			let inner = &trimmed[1..];
			match inner.find(quote) {
				Some(end) => (&inner[..end], skipped + end + 2),
				None => (inner, remainder.len()),
			}
		}
		Some('>') | None => ("", skipped),
		Some(_) => {
			let mut end = trimmed
				.find(|c: char| is_markup_whitespace(c) || c == '>')
				.unwrap_or(trimmed.len());
			// Leave a trailing `/>` for the lexer so `x=y/>` still self-closes.
			if trimmed[..end].ends_with('/') && trimmed[end..].starts_with('>') {
				end -= 1;
			}
			(&trimmed[..end], skipped + end)
		}
	};

	let value = decode_html_entities(raw).into_owned();
	lexer.bump(consumed);
	value
}

/// Read the raw content of a `<script>` or `<style>` element up to its end
/// tag.
fn read_raw_text(lexer: &mut Lexer<'_, RawToken>, name: &str, tokens: &mut Vec<Token>) {
	let remainder = lexer.remainder();
	let end = remainder
		.to_ascii_lowercase()
		.find(&format!("</{name}"))
		.unwrap_or(remainder.len());

	let text = remainder[..end].to_string();
	lexer.bump(end);
	push_text(tokens, &text);
}
