use crate::{
	error,
	lexing::{self, decode_str, Lexer, Token, Tokens},
	Dataset, Literal, Node, Quad, Subject,
};
use locspan::{Meta, Span};
use std::fmt;

#[derive(Debug)]
pub enum Error<E> {
	Lexer(E),
	Unexpected(Option<Token>),
}

pub type BoxedError<E> = Box<Meta<Error<E>, Span>>;

impl<E> Error<E> {
	fn from_lexer(Meta(e, span): Meta<E, Span>) -> BoxedError<E> {
		Box::new(Meta(Self::Lexer(e), span))
	}

	fn unexpected(Meta(token, span): Meta<Option<Token>, Span>) -> BoxedError<E> {
		Box::new(Meta(Self::Unexpected(token), span))
	}
}

impl<E: fmt::Display> fmt::Display for Error<E> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Unexpected(None) => write!(f, "unexpected end of file"),
			Self::Unexpected(Some(token)) => write!(f, "unexpected {}", token),
			Self::Lexer(e) => e.fmt(f),
		}
	}
}

impl<E: 'static + std::error::Error> std::error::Error for Error<E> {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Lexer(e) => Some(e),
			_ => None,
		}
	}
}

pub trait Parse: Sized {
	#[allow(clippy::type_complexity)]
	fn parse<L: Tokens>(lexer: &mut L) -> Result<Meta<Self, Span>, BoxedError<L::Error>>;

	/// Parses a value from the beginning of `input`.
	fn parse_str(input: &str) -> Result<Meta<Self, Span>, BoxedError<lexing::Error>> {
		let mut lexer = Lexer::new(decode_str(input));
		Self::parse(&mut lexer)
	}
}

/// Parses an IRI reference, as used for predicates and datatypes.
fn parse_iri<L: Tokens>(lexer: &mut L) -> Result<Meta<String, Span>, BoxedError<L::Error>> {
	match lexer.next().map_err(Error::from_lexer)? {
		Meta(Some(Token::Iri(iri)), span) => Ok(Meta(iri, span)),
		unexpected => Err(Error::unexpected(unexpected)),
	}
}

impl Parse for Subject {
	fn parse<L: Tokens>(lexer: &mut L) -> Result<Meta<Self, Span>, BoxedError<L::Error>> {
		match lexer.next().map_err(Error::from_lexer)? {
			Meta(Some(Token::Iri(iri)), span) => Ok(Meta(Self::Iri(iri), span)),
			Meta(Some(Token::BlankNodeLabel(label)), span) => Ok(Meta(Self::Blank(label), span)),
			unexpected => Err(Error::unexpected(unexpected)),
		}
	}
}

/// Parses the optional annotation following a string literal.
///
/// A language tag is looked for first, then a datatype.
#[allow(clippy::type_complexity)]
fn parse_literal<L: Tokens>(
	lexer: &mut L,
	string: String,
	string_span: Span,
) -> Result<Meta<Literal, Span>, BoxedError<L::Error>> {
	match lexer.peek().map_err(Error::from_lexer)? {
		Meta(Some(Token::LangTag(_)), _) => match lexer.next().map_err(Error::from_lexer)? {
			Meta(Some(Token::LangTag(tag)), tag_span) => Ok(Meta(
				Literal::LangString(string, tag),
				Span::new(string_span.start(), tag_span.end()),
			)),
			unexpected => Err(Error::unexpected(unexpected)),
		},
		Meta(Some(Token::Carets), _) => {
			lexer.next().map_err(Error::from_lexer)?;
			let Meta(iri, iri_span) = parse_iri(lexer)?;
			Ok(Meta(
				Literal::Typed(string, iri),
				Span::new(string_span.start(), iri_span.end()),
			))
		}
		_ => Ok(Meta(Literal::String(string), string_span)),
	}
}

impl Parse for Literal {
	fn parse<L: Tokens>(lexer: &mut L) -> Result<Meta<Self, Span>, BoxedError<L::Error>> {
		match lexer.next().map_err(Error::from_lexer)? {
			Meta(Some(Token::StringLiteral(string)), string_span) => {
				parse_literal(lexer, string, string_span)
			}
			unexpected => Err(Error::unexpected(unexpected)),
		}
	}
}

impl Parse for Node {
	fn parse<L: Tokens>(lexer: &mut L) -> Result<Meta<Self, Span>, BoxedError<L::Error>> {
		match lexer.next().map_err(Error::from_lexer)? {
			Meta(Some(Token::Iri(iri)), span) => Ok(Meta(Self::Iri(iri), span)),
			Meta(Some(Token::BlankNodeLabel(label)), span) => Ok(Meta(Self::Blank(label), span)),
			Meta(Some(Token::StringLiteral(string)), string_span) => {
				let Meta(lit, span) = parse_literal(lexer, string, string_span)?;
				Ok(Meta(Self::Literal(lit), span))
			}
			unexpected => Err(Error::unexpected(unexpected)),
		}
	}
}

/// Expects the statement terminator and returns its end position.
fn expect_dot<L: Tokens>(lexer: &mut L) -> Result<usize, BoxedError<L::Error>> {
	match lexer.next().map_err(Error::from_lexer)? {
		Meta(Some(Token::Dot), span) => Ok(span.end()),
		unexpected => Err(Error::unexpected(unexpected)),
	}
}

impl Parse for Quad {
	fn parse<L: Tokens>(lexer: &mut L) -> Result<Meta<Self, Span>, BoxedError<L::Error>> {
		let Meta(subject, subject_span) = Subject::parse(lexer)?;
		let Meta(predicate, _) = parse_iri(lexer)?;
		let Meta(object, _) = Node::parse(lexer)?;
		let Meta(token, span) = lexer.next().map_err(Error::from_lexer)?;

		// A label opening a new line must be followed by `.`, otherwise it
		// starts the next statement.
		if matches!(token, Some(Token::Iri(_) | Token::BlankNodeLabel(_)))
			&& lexer.starts_line()
			&& !matches!(
				lexer.peek().map_err(Error::from_lexer)?,
				Meta(Some(Token::Dot), _)
			) {
			return Err(Error::unexpected(Meta(token, span)));
		}

		let (graph, end) = match token {
			Some(Token::Dot) => (None, span.end()),
			Some(Token::Iri(label) | Token::BlankNodeLabel(label)) => {
				(Some(label), expect_dot(lexer)?)
			}
			unexpected => return Err(Error::unexpected(Meta(unexpected, span))),
		};

		Ok(Meta(
			Quad::new(subject, predicate, object, graph),
			Span::new(subject_span.start(), end),
		))
	}
}

/// N-Quads document parser.
///
/// By default statements that do not match the grammar are skipped
/// (up to the end of their line) and parsing continues with the next one.
/// A statement missing its terminator ends where the next line starts with
/// a token it cannot use, and that line is parsed as the next statement.
/// In strict mode the first such statement fails the whole parse.
///
/// A `Parser` holds no state besides its options and can be shared between
/// threads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[must_use]
pub struct Parser {
	strict: bool,
}

impl Parser {
	/// Builds a new lenient [`Parser`].
	pub fn new() -> Self {
		Self::default()
	}

	/// Fails on the first malformed statement instead of skipping it.
	pub fn strict(mut self) -> Self {
		self.strict = true;
		self
	}

	pub fn is_strict(&self) -> bool {
		self.strict
	}

	/// Parses a document from raw bytes.
	///
	/// Fails with [`error::Error::InvalidInputKind`] before anything is parsed
	/// if `input` is not UTF-8 text.
	pub fn parse(&self, input: impl AsRef<[u8]>) -> Result<Dataset, error::Error> {
		let input = std::str::from_utf8(input.as_ref())?;
		self.parse_str(input)
	}

	pub fn parse_str(&self, input: &str) -> Result<Dataset, error::Error> {
		let mut lexer = Lexer::new(decode_str(input));
		Ok(self.parse_tokens(&mut lexer)?)
	}

	/// Parses every statement produced by `lexer` into a new dataset.
	pub fn parse_tokens<L: Tokens>(&self, lexer: &mut L) -> Result<Dataset, BoxedError<L::Error>>
	where
		L::Error: fmt::Display,
	{
		let mut dataset = Dataset::new();
		let mut skipped = 0usize;

		loop {
			let (start, result) = match lexer
				.peek()
				.map(|Meta(token, span)| token.map(|_| span.start()))
			{
				Ok(None) => break,
				Ok(Some(start)) => (Some(start), Quad::parse(lexer)),
				Err(e) => (None, Err(Error::from_lexer(e))),
			};

			match result {
				Ok(Meta(quad, span)) => {
					log::trace!("quad at {}..{}: {quad:?}", span.start(), span.end());
					if !dataset.insert(quad) {
						log::debug!("duplicate quad at {}..{} dropped", span.start(), span.end());
					}
				}
				Err(e) => {
					if self.strict {
						return Err(e);
					}

					let Meta(e, span) = *e;
					log::warn!(
						"skipping malformed statement at {}..{}: {e}",
						span.start(),
						span.end()
					);
					skipped += 1;
					match e {
						Error::Unexpected(Some(token))
							if lexer.starts_line() && start != Some(span.start()) =>
						{
							lexer.push_back(Meta(token, span))
						}
						_ => lexer.skip_line().map_err(Error::from_lexer)?,
					}
				}
			}
		}

		log::debug!(
			"parsed {} quads in {} graphs ({skipped} statements skipped)",
			dataset.len(),
			dataset.graph_count()
		);
		Ok(dataset)
	}
}
