use vecalc::error::{CompileError, ErrorKind, Interrupt};
use vecalc::parser::parse_source;

fn compile_error(source: &str) -> CompileError {
    match parse_source(source) {
        Err(Interrupt::Compile(e)) => e,
        other => panic!("expected compile error for {source:?}, got {other:?}"),
    }
}

#[test]
fn unclosed_vector_reports_expected_close() {
    let err = compile_error("[1 2");
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(err.message(), "Expected ]");

    let err = compile_error("vec(1 2");
    assert_eq!(err.message(), "Expected )");
}

#[test]
fn unclosed_abs_reports_expected_pipe() {
    let err = compile_error("|1 - 2");
    assert_eq!(err.message(), "Expected |");
}

#[test]
fn vec_keyword_requires_paren() {
    let err = compile_error("vec 1");
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(err.message(), "Expected (");
}

#[test]
fn only_first_error_is_reported() {
    let err = compile_error("1 $ 2 @");
    assert_eq!(err.kind(), ErrorKind::Character);
    assert_eq!(err.message(), "invalid character '$'");
}

#[test]
fn error_points_at_offending_column() {
    let err = compile_error("1 + )");
    let CompileError::Syntax { span, .. } = err else {
        panic!("expected syntax error");
    };
    assert_eq!(span.offset(), 4);
}

#[test]
fn compile_errors_render_with_source() {
    let err = compile_error("(1 + 2");
    let rendered = format!("{:?}", miette::Report::new(err));
    assert!(rendered.contains("(1 + 2"), "rendered: {rendered}");
    assert!(rendered.contains("Expected )"), "rendered: {rendered}");
}

#[test]
fn trailing_tokens_are_rejected() {
    let err = compile_error("1 2");
    assert_eq!(err.message(), "Expected expression");
}
