use rstest::rstest;
use vecalc::interpreter::Interpreter;
use vecalc::repl;
use vecalc::{ErrorKind, Interrupt, Signal, Value};

fn run_fixture(source: &str) -> (Vec<String>, usize) {
    let mut interp = Interpreter::new();
    let mut out = Vec::new();
    let failures = repl::run_script(&mut interp, source, &mut out).expect("write to Vec");
    let text = String::from_utf8(out).expect("output should be utf-8");
    (text.lines().map(String::from).collect(), failures)
}

fn value(interp: &mut Interpreter, line: &str) -> Value {
    interp
        .interpret_line(line)
        .unwrap_or_else(|e| panic!("{line}: {e}"))
        .unwrap_or_else(|| panic!("{line} should produce a value"))
}

#[rstest]
#[case::arithmetic(
    include_str!("../fixtures/arithmetic.calc"),
    include_str!("../fixtures/arithmetic.expected"),
    0
)]
#[case::vectors(
    include_str!("../fixtures/vectors.calc"),
    include_str!("../fixtures/vectors.expected"),
    0
)]
#[case::variables(
    include_str!("../fixtures/variables.calc"),
    include_str!("../fixtures/variables.expected"),
    0
)]
#[case::errors(
    include_str!("../fixtures/errors.calc"),
    include_str!("../fixtures/errors.expected"),
    14
)]
#[case::session_control(
    include_str!("../fixtures/session_control.calc"),
    include_str!("../fixtures/session_control.expected"),
    0
)]
fn fixture(#[case] source: &str, #[case] expected: &str, #[case] failures: usize) {
    let (output, failed) = run_fixture(source);
    let expected_lines: Vec<&str> = expected.lines().collect();
    assert_eq!(output, expected_lines);
    assert_eq!(failed, failures);
}

#[test]
fn decimal_comma_and_point_are_equivalent() {
    let mut interp = Interpreter::new();
    assert_eq!(value(&mut interp, "3,25"), value(&mut interp, "3.25"));
}

#[test]
fn elided_elements_become_zero() {
    let mut interp = Interpreter::new();
    assert_eq!(
        value(&mut interp, "[1;;3]"),
        Value::Vector(vec![1.0, 0.0, 3.0])
    );
    assert_eq!(value(&mut interp, "[1 2] + [1 2 3]"), value(&mut interp, "[2 4 3]"));
}

#[test]
fn self_reassignment_terminates_with_prior_value() {
    let mut interp = Interpreter::new();
    value_or_none(&mut interp, "x = 5");
    value_or_none(&mut interp, "x = x + 1");
    assert_eq!(value(&mut interp, "x"), Value::Number(6.0));
}

fn value_or_none(interp: &mut Interpreter, line: &str) -> Option<Value> {
    interp
        .interpret_line(line)
        .unwrap_or_else(|e| panic!("{line}: {e}"))
}

#[test]
fn failed_assignment_does_not_mutate_bindings() {
    let mut interp = Interpreter::new();
    value_or_none(&mut interp, "x = 1");
    let err = interp.interpret_line("x = [1 2] + 1").unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Runtime));
    assert_eq!(value(&mut interp, "x"), Value::Number(1.0));
}

#[test]
fn division_by_zero_is_a_runtime_error() {
    let mut interp = Interpreter::new();
    for line in ["5/0", "[1 2]/0"] {
        let err = interp.interpret_line(line).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Runtime), "{line}");
    }
}

#[rstest]
#[case("quit", Signal::Exit)]
#[case("end", Signal::Exit)]
#[case("exit", Signal::Exit)]
#[case("close", Signal::Exit)]
#[case("help", Signal::Help)]
#[case("clear", Signal::Clear)]
#[case("cls", Signal::Clear)]
fn keywords_raise_signals(#[case] line: &str, #[case] expected: Signal) {
    let mut interp = Interpreter::new();
    match interp.interpret_line(line) {
        Err(Interrupt::Signal(signal)) => assert_eq!(signal, expected),
        other => panic!("expected signal for {line}, got {other:?}"),
    }
}

#[test]
fn run_leaves_ans_alone() {
    let mut interp = Interpreter::new();
    value(&mut interp, "10");
    interp.run("99").expect("run should succeed");
    assert_eq!(value(&mut interp, "ans"), Value::Number(10.0));
}

#[test]
fn ans_before_any_result_is_undefined() {
    let mut interp = Interpreter::new();
    let err = interp.interpret_line("ans").unwrap_err();
    assert!(err.to_string().contains("`ans` is not defined"));
}

#[test]
fn error_kinds_by_stage() {
    let mut interp = Interpreter::new();
    let cases = [
        ("1 # 2", ErrorKind::Character),
        ("(1 + 2", ErrorKind::Syntax),
        ("save", ErrorKind::Implement),
        ("q + 1", ErrorKind::Runtime),
        ("[1] ^ 2", ErrorKind::Implement),
    ];
    for (line, kind) in cases {
        let err = interp.interpret_line(line).unwrap_err();
        assert_eq!(err.kind(), Some(kind), "{line}: {err}");
    }
}
