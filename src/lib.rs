//! RDF 1.1 [N-Quads](https://www.w3.org/TR/n-quads/) parser producing a
//! graph-partitioned [`Dataset`].
//!
//! ```
//! use nquads_dataset::{Literal, Node, DEFAULT_GRAPH};
//!
//! let dataset = nquads_dataset::parse_str(
//! 	r#"<http://ex/s> <http://ex/p> "hello" .
//! 	_:b0 <http://ex/p> <http://ex/o> <http://ex/g> ."#,
//! )?;
//!
//! let quad = &dataset.default_graph().unwrap().as_slice()[0];
//! assert_eq!(quad.object, Node::Literal(Literal::String("hello".to_string())));
//! assert_eq!(dataset.graph_names().collect::<Vec<_>>(), [DEFAULT_GRAPH, "http://ex/g"]);
//! # Ok::<_, nquads_dataset::Error>(())
//! ```
pub mod dataset;
pub mod error;
pub mod lexing;
pub mod parsing;

pub use dataset::{Dataset, Graph, DEFAULT_GRAPH};
pub use error::Error;
pub use parsing::{Parse, Parser};

/// Subject.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Subject {
	Iri(String),

	/// Blank node label, including its `_:` prefix.
	Blank(String),
}

/// Object term.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Node {
	Iri(String),

	/// Blank node label, including its `_:` prefix.
	Blank(String),
	Literal(Literal),
}

impl Node {
	pub fn as_literal(&self) -> Option<&Literal> {
		match self {
			Self::Literal(l) => Some(l),
			_ => None,
		}
	}
}

impl From<Subject> for Node {
	fn from(s: Subject) -> Self {
		match s {
			Subject::Iri(iri) => Self::Iri(iri),
			Subject::Blank(label) => Self::Blank(label),
		}
	}
}

impl From<Literal> for Node {
	fn from(l: Literal) -> Self {
		Self::Literal(l)
	}
}

/// RDF Literal.
///
/// A literal carries either a datatype or a language tag, never both.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Literal {
	/// Plain string, with the implicit `xsd:string` datatype.
	String(String),

	/// String with an explicit datatype IRI.
	Typed(String, String),

	/// Language-tagged string.
	LangString(String, String),
}

impl Literal {
	/// Lexical value of the literal, as written between the quotes.
	///
	/// Escape sequences are not decoded: `"a\"b"` has the value `a\"b`.
	pub fn value(&self) -> &str {
		match self {
			Self::String(value) | Self::Typed(value, _) | Self::LangString(value, _) => value,
		}
	}

	/// Explicit datatype IRI, if any.
	pub fn datatype(&self) -> Option<&str> {
		match self {
			Self::Typed(_, ty) => Some(ty),
			_ => None,
		}
	}

	/// Language tag, if any.
	pub fn language(&self) -> Option<&str> {
		match self {
			Self::LangString(_, tag) => Some(tag),
			_ => None,
		}
	}
}

/// RDF Quad.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Quad {
	pub subject: Subject,
	pub predicate: String,
	pub object: Node,

	/// Graph name, [`DEFAULT_GRAPH`] when the statement has no graph label.
	pub graph: String,
}

impl Quad {
	/// Builds a quad, in the default graph if `graph` is `None`.
	pub fn new(
		subject: Subject,
		predicate: impl Into<String>,
		object: impl Into<Node>,
		graph: Option<String>,
	) -> Self {
		Self {
			subject,
			predicate: predicate.into(),
			object: object.into(),
			graph: graph.unwrap_or_else(|| DEFAULT_GRAPH.to_string()),
		}
	}

	/// Checks if the quad belongs to the [`DEFAULT_GRAPH`].
	pub fn is_in_default_graph(&self) -> bool {
		self.graph == DEFAULT_GRAPH
	}
}

/// Parses an N-Quads document with the default (lenient) [`Parser`].
///
/// Fails with [`Error::InvalidInputKind`] if `input` is not UTF-8 text.
pub fn parse(input: impl AsRef<[u8]>) -> Result<Dataset, Error> {
	Parser::new().parse(input)
}

/// Parses an N-Quads document with the default (lenient) [`Parser`].
pub fn parse_str(input: &str) -> Result<Dataset, Error> {
	Parser::new().parse_str(input)
}
