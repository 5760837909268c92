//! Golden master tests for diagnostic output.
//!
//! These tests capture the exact plain rendering of scanner and parser
//! failures, and check that miette reports carry codes and labels.

mod common;

use jftt::diagnostics::{self, format_plain, SourceContext};
use jftt::syntax::parse;
use miette::Diagnostic;

fn invalid(name: &str) -> String {
    std::fs::read_to_string(common::invalid_dir().join(name)).unwrap()
}

#[test]
fn test_syntax_error_plain_rendering() {
    let source = invalid("chained.imp");
    let error = parse(&source).unwrap_err();

    let expected = "Error at line 2, column 14:
unexpected '+'; expected ';'

  x := a + b + c;
             ^
";
    assert_eq!(format_plain(&error, &source), expected);
}

#[test]
fn test_lexical_error_plain_rendering() {
    let source = invalid("bad_char.imp");
    let error = parse(&source).unwrap_err();

    let expected = "Error at line 2, column 10:
unexpected character '@'

  x := a @ b;
         ^
";
    assert_eq!(format_plain(&error, &source), expected);
}

#[test]
fn test_carets_cover_the_whole_token() {
    let source = "PROGRAM IS BEGIN\n  WRITE 1;\n  ENDWHILE\nEND";
    let error = parse(source).unwrap_err();
    let rendered = format_plain(&error, source);
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines[0], "Error at line 3, column 3:");
    assert_eq!(lines[3], "  ENDWHILE");
    assert_eq!(lines[4], "  ^^^^^^^^");
}

#[test]
fn test_end_of_input_gets_a_single_caret() {
    let source = "PROGRAM IS BEGIN READ x;";
    let error = parse(source).unwrap_err();
    let rendered = format_plain(&error, source);
    assert!(rendered.starts_with("Error at line 1, column 25:\nunexpected end of input;"));
    assert!(rendered.ends_with(&format!("{}^\n", " ".repeat(24))));
}

#[test]
fn test_message_has_no_location() {
    let error = parse("PROGRAM IS BEGIN x := 1; Q END").unwrap_err();
    assert_eq!(diagnostics::message(&error), "unexpected character 'Q'");
    assert_eq!(error.to_string(), "unexpected character 'Q' at 1:26");
}

#[test]
fn test_miette_report_names_source_and_code() {
    let source = invalid("chained.imp");
    let error = parse(&source).unwrap_err();
    assert_eq!(error.code().map(|c| c.to_string()).as_deref(), Some("jftt::syntax"));

    let label = error.labels().and_then(|mut l| l.next()).unwrap();
    assert_eq!(label.offset(), error.span().start);
    assert_eq!(label.len(), 1);

    let report = diagnostics::report(error, &SourceContext::new("chained.imp", source));
    let rendered = format!("{report:?}");
    assert!(rendered.contains("jftt::syntax"));
}

#[test]
fn test_uppercase_identifier_gets_a_hint() {
    let error = parse("PROGRAM IS BEGIN READ Xy; END").unwrap_err();
    let help = error.help().map(|h| h.to_string()).unwrap_or_default();
    assert!(help.contains("lowercase"));
}
