use codespan_reporting::{
	diagnostic::{Diagnostic, Label},
	files::SimpleFiles,
	term::{self, termcolor::NoColor},
};
use nquads_dataset::{
	lexing,
	parsing::{self, Parse},
	Error, Node, Parser, Quad, Subject,
};

fn strict_error(input: &str) -> Error {
	stderrlog::new().init().ok();
	match Parser::new().strict().parse_str(input) {
		Ok(dataset) => panic!("expected a syntax error, got {dataset:?}"),
		Err(e) => {
			log::info!("expected error: {e}");
			e
		}
	}
}

#[test]
fn literal_subject() {
	let e = strict_error(r#""s" <p> <o> ."#);
	assert!(matches!(
		&e,
		Error::Syntax(e) if matches!(&e.0, parsing::Error::Unexpected(Some(lexing::Token::StringLiteral(_))))
	));
	assert_eq!((e.span().start(), e.span().end()), (0, 3));
}

#[test]
fn blank_predicate() {
	let e = strict_error("<s> _:p <o> .");
	assert!(matches!(
		&e,
		Error::Syntax(e) if matches!(&e.0, parsing::Error::Unexpected(Some(lexing::Token::BlankNodeLabel(_))))
	));
	assert_eq!((e.span().start(), e.span().end()), (4, 7));
}

#[test]
fn literal_predicate() {
	strict_error(r#"<s> "p" <o> ."#);
}

#[test]
fn missing_terminator() {
	let e = strict_error("<s> <p> <o>");
	assert!(matches!(
		&e,
		Error::Syntax(e) if matches!(&e.0, parsing::Error::Unexpected(None))
	));
}

#[test]
fn literal_graph_label() {
	strict_error(r#"<s> <p> <o> "g" ."#);
}

#[test]
fn unterminated_string() {
	let e = strict_error("<s> <p> \"o .\n");
	assert!(matches!(
		&e,
		Error::Syntax(e) if matches!(&e.0, parsing::Error::Lexer(lexing::Error::Unexpected(Some('\n'))))
	));
}

#[test]
fn invalid_iri_characters() {
	strict_error("<s> <p> <o o> .");
}

#[test]
fn invalid_escape() {
	strict_error(r#"<s> <p> "\q" ."#);
	strict_error(r#"<s> <p> "\u00zz" ."#);
}

#[test]
fn invalid_codepoint() {
	let e = strict_error(r#"<s> <p> "\UFFFFFFFF" ."#);
	assert!(matches!(
		&e,
		Error::Syntax(e) if matches!(&e.0, parsing::Error::Lexer(lexing::Error::InvalidCodepoint(0xffffffff)))
	));
}

#[test]
fn empty_language_tag() {
	let e = strict_error(r#"<s> <p> "o"@ ."#);
	assert!(matches!(
		&e,
		Error::Syntax(e) if matches!(&e.0, parsing::Error::Lexer(lexing::Error::InvalidLangTag))
	));
}

#[test]
fn blank_label_ending_with_dots() {
	strict_error("_:a.. <p> <o> .");
}

#[test]
fn lenient_skips_malformed_statements() {
	stderrlog::new().init().ok();
	let input = "<s> <p> <o1> .\n\
		\"bad\" <p> <o> .\n\
		<s> <p> <o2> <g> <extra> .\n\
		<s> _:p <o> .\n\
		<s> <p> <o3> .\n";

	let dataset = Parser::new().parse_str(input).unwrap();
	let objects: Vec<_> = dataset
		.default_graph()
		.unwrap()
		.iter()
		.map(|quad| quad.object.clone())
		.collect();
	assert_eq!(
		objects,
		[Node::Iri("o1".into()), Node::Iri("o3".into())]
	);
	assert!(dataset.graph("g").is_none());
}

#[test]
fn lenient_resumes_after_missing_terminator() {
	stderrlog::new().init().ok();
	let dataset = Parser::new()
		.parse_str("<s> <p> <o>\n<s2> <p> <o2> .\n<s3> <p> <o3> .\n")
		.unwrap();
	let subjects: Vec<_> = dataset.quads().map(|quad| quad.subject.clone()).collect();
	assert_eq!(
		subjects,
		[Subject::Iri("s2".into()), Subject::Iri("s3".into())]
	);

	let dataset = Parser::new()
		.parse_str("<s> <p> \"lit\"\n_:b <p> <o> .\n<s> <p> <o>\n\"bad\" <p> <o> .\n<s3> <p> <o3> .")
		.unwrap();
	let subjects: Vec<_> = dataset.quads().map(|quad| quad.subject.clone()).collect();
	assert_eq!(
		subjects,
		[Subject::Blank("_:b".into()), Subject::Iri("s3".into())]
	);

	let dataset = Parser::new()
		.parse_str("<s> <p> <o>\n<g> .\n")
		.unwrap();
	assert_eq!(dataset.graph_names().collect::<Vec<_>>(), ["g"]);
}

#[test]
fn missing_terminator_reported_on_next_line() {
	let e = strict_error("<s> <p> <o>\n<s2> <p> <o2> .");
	assert!(matches!(
		&e,
		Error::Syntax(e) if matches!(&e.0, parsing::Error::Unexpected(Some(lexing::Token::Iri(_))))
	));
	assert_eq!((e.span().start(), e.span().end()), (12, 16));
}

#[test]
fn lenient_recovers_after_unterminated_string() {
	let dataset = Parser::new()
		.parse_str("<s> <p> \"open\n<s> <p> <o> .\n<s> <p> \"never closed")
		.unwrap();
	assert_eq!(dataset.len(), 1);
}

#[test]
fn lenient_keeps_nothing_from_garbage() {
	let dataset = nquads_dataset::parse_str("this is not N-Quads\n@@@\n^^\n.").unwrap();
	assert!(dataset.is_empty());
}

#[test]
fn strict_returns_no_partial_result() {
	assert!(Parser::new().strict().is_strict());
	assert!(!Parser::new().is_strict());

	let input = "<s> <p> <o> .\n<s> <p> .\n";
	assert!(Parser::new().strict().parse_str(input).is_err());
	assert_eq!(Parser::new().parse_str(input).unwrap().len(), 1);
}

#[test]
fn parse_single_terms() {
	assert_eq!(
		Subject::parse_str("_:b0 trailing").unwrap().0,
		Subject::Blank("_:b0".into())
	);
	assert!(Subject::parse_str("\"literal\"").is_err());

	let quad = Quad::parse_str("<s> <p> <o> <g> .").unwrap().0;
	assert_eq!(quad.graph, "g");
}

#[test]
fn report_syntax_error() {
	let source = "<http://ex/s> <http://ex/p> <http://ex/o> .\n<http://ex/s> \"p\" <http://ex/o> .\n";
	let e = strict_error(source);
	let span = e.span();
	assert_eq!(&source[span.start()..span.end()], "\"p\"");

	let mut files = SimpleFiles::new();
	let file_id = files.add("input.nq", source);
	let diagnostic = Diagnostic::error()
		.with_message(format!("parse error: {e}"))
		.with_labels(vec![Label::primary(file_id, span.start()..span.end())]);

	let mut writer = NoColor::new(Vec::new());
	term::emit(&mut writer, &term::Config::default(), &files, &diagnostic).unwrap();

	let report = String::from_utf8(writer.into_inner()).unwrap();
	assert!(report.contains("input.nq:2:15"));
	assert!(report.contains("unexpected string literal"));
}
