use crate::{lexing, parsing};
use locspan::{Meta, Span};
use std::{fmt, str::Utf8Error};

/// Document parsing error.
#[derive(Debug)]
pub enum Error {
	/// The input is not text.
	InvalidInputKind(Utf8Error),

	/// A statement does not match the N-Quads grammar (strict mode only).
	Syntax(parsing::BoxedError<lexing::Error>),
}

impl Error {
	/// Location of the error in the input, in bytes.
	pub fn span(&self) -> Span {
		match self {
			Self::InvalidInputKind(e) => {
				let start = e.valid_up_to();
				Span::new(start, start + e.error_len().unwrap_or(0))
			}
			Self::Syntax(e) => e.1,
		}
	}
}

impl From<Utf8Error> for Error {
	fn from(e: Utf8Error) -> Self {
		Self::InvalidInputKind(e)
	}
}

impl From<parsing::BoxedError<lexing::Error>> for Error {
	fn from(e: parsing::BoxedError<lexing::Error>) -> Self {
		Self::Syntax(e)
	}
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::InvalidInputKind(e) => write!(f, "input must be text: {e}"),
			Self::Syntax(e) => {
				let Meta(e, span) = e.as_ref();
				write!(f, "syntax error at {}..{}: {e}", span.start(), span.end())
			}
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::InvalidInputKind(e) => Some(e),
			Self::Syntax(e) => Some(&e.0),
		}
	}
}
