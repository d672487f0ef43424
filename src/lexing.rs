use decoded_char::DecodedChar;
use locspan::{ErrAt, Meta, Span};
use std::{collections::VecDeque, fmt, iter::Peekable};

/// Fallible tokens iterator with lookahead.
pub trait Tokens {
	type Error;

	#[allow(clippy::type_complexity)]
	fn peek(&mut self) -> Result<Meta<Option<&Token>, Span>, Meta<Self::Error, Span>>;

	#[allow(clippy::type_complexity)]
	fn next(&mut self) -> Result<Meta<Option<Token>, Span>, Meta<Self::Error, Span>>;

	/// Checks if the last token returned by `next` is the first of its line.
	fn starts_line(&self) -> bool;

	/// Puts back the last token returned by `next`, so that it is returned
	/// again before any other.
	fn push_back(&mut self, token: Meta<Token, Span>);

	/// Drops any pending token and discards the input up to the next line.
	///
	/// Used to resume parsing after a malformed statement.
	fn skip_line(&mut self) -> Result<(), Meta<Self::Error, Span>>;
}

/// Lexing error.
#[derive(Debug)]
pub enum Error<E = std::convert::Infallible> {
	InvalidLangTag,
	InvalidCodepoint(u32),
	Unexpected(Option<char>),
	Stream(E),
}

impl<E: fmt::Display> fmt::Display for Error<E> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::InvalidLangTag => write!(f, "invalid language tag"),
			Self::InvalidCodepoint(c) => write!(f, "invalid character code point {c:x}"),
			Self::Unexpected(None) => write!(f, "unexpected end of file"),
			Self::Unexpected(Some(c)) => write!(f, "unexpected character `{c}`"),
			Self::Stream(e) => e.fmt(f),
		}
	}
}

impl<E: 'static + std::error::Error> std::error::Error for Error<E> {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Stream(e) => Some(e),
			_ => None,
		}
	}
}

/// Token.
///
/// IRIs, string literals and language tags are kept as written, without
/// their delimiters. Escape sequences are checked but not decoded.
#[derive(Debug)]
pub enum Token {
	LangTag(String),
	Iri(String),
	StringLiteral(String),
	BlankNodeLabel(String),
	Dot,
	Carets,
}

impl fmt::Display for Token {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::LangTag(tag) => write!(f, "language tag `{tag}`"),
			Self::Iri(iri) => write!(f, "IRI <{iri}>"),
			Self::StringLiteral(string) => write!(f, "string literal \"{string}\""),
			Self::BlankNodeLabel(label) => write!(f, "blank node label `{label}`"),
			Self::Dot => write!(f, "dot `.`"),
			Self::Carets => write!(f, "carets `^^`"),
		}
	}
}

/// Wraps an infallible `char` iterator into a decoded character stream
/// suitable for [`Lexer::new`].
pub fn decode_str(
	input: &str,
) -> impl Iterator<Item = Result<DecodedChar, std::convert::Infallible>> + '_ {
	input.chars().map(|c| Ok(DecodedChar::new(c, c.len_utf8())))
}

/// Characters iterator.
struct Chars<C: Iterator>(Peekable<C>);

impl<E, C: Iterator<Item = Result<DecodedChar, E>>> Chars<C> {
	fn peek(&mut self) -> Result<Option<DecodedChar>, Error<E>> {
		match self.0.peek() {
			None => Ok(None),
			Some(Ok(c)) => Ok(Some(*c)),
			Some(Err(_)) => self.next(),
		}
	}

	fn next(&mut self) -> Result<Option<DecodedChar>, Error<E>> {
		self.0.next().transpose().map_err(Error::Stream)
	}
}

/// Lexer position.
#[derive(Default)]
struct Position {
	span: Span,
	last_span: Span,
	last_char: Option<char>,

	/// A line break was skipped before the last lexed token.
	line_break: bool,
}

impl Position {
	fn current(&self) -> Span {
		self.span
	}

	fn end(&self) -> Span {
		self.span.end().into()
	}

	fn last(&self) -> Span {
		self.last_span
	}
}

/// Lexer.
///
/// Changes a decoded character stream into a stream of `Token`s.
pub struct Lexer<C: Iterator<Item = Result<DecodedChar, E>>, E> {
	chars: Chars<C>,
	pos: Position,

	/// Tokens read ahead, with whether they start a line.
	lookahead: VecDeque<(Meta<Token, Span>, bool)>,

	/// The last token returned by `next` starts a line.
	starts_line: bool,

	/// Token already read while lexing the previous one.
	///
	/// A blank node label directly followed by the statement terminator
	/// (`_:b0.`) reads the dot as part of the label first.
	deferred: Option<Meta<Token, Span>>,
}

impl<C: Iterator<Item = Result<DecodedChar, E>>, E> Lexer<C, E> {
	pub fn new(chars: C) -> Self {
		Self {
			chars: Chars(chars.peekable()),
			pos: Position::default(),
			lookahead: VecDeque::new(),
			starts_line: false,
			deferred: None,
		}
	}
}

impl<E, C: Iterator<Item = Result<DecodedChar, E>>> Lexer<C, E> {
	fn peek_decoded_char(&mut self) -> Result<Option<DecodedChar>, Meta<Error<E>, Span>> {
		self.chars.peek().err_at(|| self.pos.end())
	}

	fn peek_char(&mut self) -> Result<Option<char>, Meta<Error<E>, Span>> {
		self.peek_decoded_char()
			.map(|c| c.map(DecodedChar::into_char))
	}

	fn next_char(&mut self) -> Result<Option<char>, Meta<Error<E>, Span>> {
		match self.chars.next().err_at(|| self.pos.end())? {
			Some(c) => {
				self.pos.span.push(c.len());
				self.pos.last_span.clear();
				self.pos.last_span.push(c.len());
				self.pos.last_char = Some(*c);
				Ok(Some(*c))
			}
			None => Ok(None),
		}
	}

	fn expect_char(&mut self) -> Result<char, Meta<Error<E>, Span>> {
		self.next_char()?
			.ok_or_else(|| Meta(Error::Unexpected(None), self.pos.end()))
	}

	fn skip_whitespaces(&mut self) -> Result<(), Meta<Error<E>, Span>> {
		self.pos.line_break = false;
		while let Some(c) = self.peek_char()? {
			if c.is_whitespace() {
				self.next_char()?;
			} else if c == '#' {
				self.next_comment()?;
			} else {
				break;
			}

			if self.pos.last_char == Some('\n') {
				self.pos.line_break = true;
			}
		}

		self.pos.span.clear();
		Ok(())
	}

	/// Parses the rest of a comment, after the first `#` character.
	///
	/// Comments in N-Quads take the form of `#`,
	/// outside an IRIREF or STRING_LITERAL_QUOTE,
	/// and continue to the end of line (EOL) or end of file
	/// if there is no end of line after the comment marker.
	fn next_comment(&mut self) -> Result<(), Meta<Error<E>, Span>> {
		loop {
			if matches!(self.next_char()?, None | Some('\n')) {
				break Ok(());
			}
		}
	}

	/// Parses the rest of a lang tag, after the first `@` character.
	///
	/// `LANGTAG ::= '@' [a-zA-Z]+ ('-' [a-zA-Z0-9]+)*`
	fn next_langtag(&mut self) -> Result<Meta<String, Span>, Meta<Error<E>, Span>> {
		let mut tag = String::new();

		while let Some(c) = self.peek_char()? {
			if c.is_ascii_alphabetic() {
				tag.push(self.expect_char()?);
			} else {
				break;
			}
		}

		if tag.is_empty() {
			return Err(Meta(Error::InvalidLangTag, self.pos.current()));
		}

		while let Some('-') = self.peek_char()? {
			tag.push(self.expect_char()?);

			let mut empty_subtag = true;
			while let Some(c) = self.peek_char()? {
				if c.is_ascii_alphanumeric() {
					empty_subtag = false;
					tag.push(self.expect_char()?);
				} else {
					break;
				}
			}

			if empty_subtag {
				return Err(Meta(Error::InvalidLangTag, self.pos.current()));
			}
		}

		Ok(Meta(tag, self.pos.current()))
	}

	/// Reads the body of an IRIREF or STRING_LITERAL_QUOTE up to `delimiter`.
	///
	/// Escape sequences are checked and kept as written. Only UCHAR escapes
	/// are allowed in IRIs. `forbidden` rejects raw characters that must be
	/// escaped.
	fn next_delimited(
		&mut self,
		delimiter: char,
		echar: bool,
		forbidden: fn(char) -> bool,
	) -> Result<String, Meta<Error<E>, Span>> {
		let mut value = String::new();

		loop {
			match self.next_char()? {
				Some(c) if c == delimiter => break Ok(value),
				Some('\\') => {
					let span = self.pos.last();
					value.push('\\');
					match self.next_char()? {
						Some('u') => {
							value.push('u');
							self.next_uchar(span, 4, &mut value)?
						}
						Some('U') => {
							value.push('U');
							self.next_uchar(span, 8, &mut value)?
						}
						Some(c) if echar && is_echar(c) => value.push(c),
						unexpected => {
							return Err(Meta(Error::Unexpected(unexpected), self.pos.last()))
						}
					}
				}
				Some(c) if forbidden(c) => {
					return Err(Meta(Error::Unexpected(Some(c)), self.pos.last()))
				}
				Some(c) => value.push(c),
				None => return Err(Meta(Error::Unexpected(None), self.pos.end())),
			}
		}
	}

	/// Parses an IRI reference, starting after the first `<` until the closing `>`.
	fn next_iri(&mut self) -> Result<Meta<String, Span>, Meta<Error<E>, Span>> {
		let iri = self.next_delimited('>', false, |c| {
			matches!(
				c,
				'\u{00}'..='\u{20}' | '<' | '"' | '{' | '}' | '|' | '^' | '`'
			)
		})?;

		Ok(Meta(iri, self.pos.current()))
	}

	/// Reads the hex digits of a `\u` (`len` is 4) or `\U` (`len` is 8)
	/// escape into `value`, after the `u`. `span` is the span of the backslash.
	///
	/// The digits must encode a Unicode scalar value.
	fn next_uchar(
		&mut self,
		mut span: Span,
		len: u8,
		value: &mut String,
	) -> Result<(), Meta<Error<E>, Span>> {
		let mut codepoint = 0u32;

		for _ in 0..len {
			let c = self.expect_char()?;
			match c.to_digit(16) {
				Some(d) => codepoint = codepoint << 4 | d,
				None => return Err(Meta(Error::Unexpected(Some(c)), self.pos.last())),
			}
			value.push(c);
		}

		span.set_end(self.pos.current().end());
		match char::try_from(codepoint) {
			Ok(_) => Ok(()),
			Err(_) => Err(Meta(Error::InvalidCodepoint(codepoint), span)),
		}
	}

	/// Parses a string literal, starting after the first `"` until the closing `"`.
	fn next_string_literal(&mut self) -> Result<Meta<String, Span>, Meta<Error<E>, Span>> {
		let string = self.next_delimited('"', true, |c| matches!(c, '\n' | '\r'))?;
		Ok(Meta(string, self.pos.current()))
	}

	/// Parses a blank node label, starting after the first `_`.
	///
	/// The returned label keeps its `_:` prefix.
	fn next_blank_node_label(&mut self) -> Result<Meta<String, Span>, Meta<Error<E>, Span>> {
		match self.next_char()? {
			Some(':') => {
				let mut label = String::new();
				label.push('_');
				label.push(':');
				match self.next_char()? {
					Some(c) if c.is_ascii_digit() || is_pn_chars_u(c) => {
						label.push(c);
						let mut trailing_dots = 0usize;
						loop {
							match self.peek_char()? {
								Some(c) if is_pn_chars(c) => {
									label.push(self.expect_char()?);
									trailing_dots = 0
								}
								Some('.') => {
									label.push(self.expect_char()?);
									trailing_dots += 1
								}
								_ => break,
							}
						}

						let mut span = self.pos.current();
						match trailing_dots {
							0 => (),
							1 => {
								// The label cannot end with a dot: it is the terminator.
								label.pop();
								let end = span.end();
								span.set_end(end - 1);
								self.deferred = Some(Meta(Token::Dot, Span::new(end - 1, end)));
							}
							_ => return Err(Meta(Error::Unexpected(Some('.')), self.pos.last())),
						}

						Ok(Meta(label, span))
					}
					unexpected => Err(Meta(Error::Unexpected(unexpected), self.pos.last())),
				}
			}
			unexpected => Err(Meta(Error::Unexpected(unexpected), self.pos.last())),
		}
	}

	pub fn consume(&mut self) -> Result<Meta<Option<Token>, Span>, Meta<Error<E>, Span>> {
		if let Some(Meta(token, span)) = self.deferred.take() {
			self.pos.line_break = false;
			return Ok(Meta(Some(token), span));
		}

		self.skip_whitespaces()?;
		match self.next_char()? {
			Some('@') => Ok(self.next_langtag()?.map(|t| Some(Token::LangTag(t)))),
			Some('<') => Ok(self.next_iri()?.map(|t| Some(Token::Iri(t)))),
			Some('"') => Ok(self
				.next_string_literal()?
				.map(|t| Some(Token::StringLiteral(t)))),
			Some('_') => Ok(self
				.next_blank_node_label()?
				.map(|t| Some(Token::BlankNodeLabel(t)))),
			Some('.') => Ok(Meta(Some(Token::Dot), self.pos.current())),
			Some('^') => match self.next_char()? {
				Some('^') => Ok(Meta(Some(Token::Carets), self.pos.current())),
				unexpected => Err(Meta(Error::Unexpected(unexpected), self.pos.last())),
			},
			None => Ok(Meta(None, self.pos.end())),
			unexpected => Err(Meta(Error::Unexpected(unexpected), self.pos.last())),
		}
	}

	#[allow(clippy::type_complexity)]
	pub fn peek(&mut self) -> Result<Meta<Option<&Token>, Span>, Meta<Error<E>, Span>> {
		if self.lookahead.is_empty() {
			if let Meta(Some(token), span) = self.consume()? {
				self.lookahead
					.push_back((Meta::new(token, span), self.pos.line_break));
			}
		}

		match self.lookahead.front() {
			Some((Meta(token, span), _)) => Ok(Meta::new(Some(token), *span)),
			None => Ok(Meta::new(None, self.pos.end())),
		}
	}

	#[allow(clippy::type_complexity, clippy::should_implement_trait)]
	pub fn next(&mut self) -> Result<Meta<Option<Token>, Span>, Meta<Error<E>, Span>> {
		match self.lookahead.pop_front() {
			Some((Meta(token, span), starts_line)) => {
				self.starts_line = starts_line;
				Ok(Meta::new(Some(token), span))
			}
			None => {
				let token = self.consume()?;
				self.starts_line = self.pos.line_break;
				Ok(token)
			}
		}
	}

	pub fn starts_line(&self) -> bool {
		self.starts_line
	}

	pub fn push_back(&mut self, token: Meta<Token, Span>) {
		self.lookahead.push_front((token, self.starts_line))
	}

	/// Discards pending tokens and the rest of the current line.
	///
	/// Nothing more is discarded if the last consumed character already
	/// ended a line.
	pub fn skip_line(&mut self) -> Result<(), Meta<Error<E>, Span>> {
		self.lookahead.clear();
		self.deferred = None;

		if !matches!(self.pos.last_char, None | Some('\n')) {
			self.next_comment()?;
		}

		self.pos.span.clear();
		Ok(())
	}
}

impl<E, C: Iterator<Item = Result<DecodedChar, E>>> Tokens for Lexer<C, E> {
	type Error = Error<E>;

	fn peek(&mut self) -> Result<Meta<Option<&Token>, Span>, Meta<Error<E>, Span>> {
		self.peek()
	}

	fn next(&mut self) -> Result<Meta<Option<Token>, Span>, Meta<Error<E>, Span>> {
		self.next()
	}

	fn starts_line(&self) -> bool {
		self.starts_line()
	}

	fn push_back(&mut self, token: Meta<Token, Span>) {
		self.push_back(token)
	}

	fn skip_line(&mut self) -> Result<(), Meta<Error<E>, Span>> {
		self.skip_line()
	}
}

/// Checks if `c`, following a backslash, forms an ECHAR escape.
fn is_echar(c: char) -> bool {
	matches!(c, 't' | 'b' | 'n' | 'r' | 'f' | '\'' | '"' | '\\')
}

fn is_pn_chars_base(c: char) -> bool {
	matches!(c, 'A'..='Z' | 'a'..='z' | '\u{00c0}'..='\u{00d6}' | '\u{00d8}'..='\u{00f6}' | '\u{00f8}'..='\u{02ff}' | '\u{0370}'..='\u{037d}' | '\u{037f}'..='\u{1fff}' | '\u{200c}'..='\u{200d}' | '\u{2070}'..='\u{218f}' | '\u{2c00}'..='\u{2fef}' | '\u{3001}'..='\u{d7ff}' | '\u{f900}'..='\u{fdcf}' | '\u{fdf0}'..='\u{fffd}' | '\u{10000}'..='\u{effff}')
}

/// `PN_CHARS_U`, with `:` allowed as in the N-Quads blank node label.
fn is_pn_chars_u(c: char) -> bool {
	is_pn_chars_base(c) || matches!(c, '_' | ':')
}

fn is_pn_chars(c: char) -> bool {
	is_pn_chars_u(c)
		|| matches!(c, '-' | '0'..='9' | '\u{00b7}' | '\u{0300}'..='\u{036f}' | '\u{203f}'..='\u{2040}')
}
