//! End-to-end behavior of the language through the public API.

use ether::{
    parse, Env, EtherError, Evaluator, Interpreter, Lexer, RuntimeError, RuntimeErrorKind,
    TokenKind, Value,
};
use pretty_assertions::assert_eq;

fn run(input: &str) -> Result<Value, EtherError> {
    let mut out: Vec<u8> = Vec::new();
    let mut interp = Interpreter::new(&mut out);
    interp.eval(input)
}

fn ints(ns: &[i64]) -> Value {
    Value::from(ns.iter().map(|n| Value::Integer(*n)).collect::<Vec<_>>())
}

#[test]
fn every_fixed_token_on_line_one() {
    let tokens: Vec<(TokenKind, u32)> = Lexer::new("=+-*/!<>(){}[]|,;")
        .map(|t| (t.kind, t.line))
        .collect();
    let kinds: Vec<TokenKind> = tokens.iter().map(|(k, _)| *k).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Assign,
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Bang,
            TokenKind::Less,
            TokenKind::Greater,
            TokenKind::LeftParen,
            TokenKind::RightParen,
            TokenKind::LeftCurly,
            TokenKind::RightCurly,
            TokenKind::LeftBracket,
            TokenKind::RightBracket,
            TokenKind::Bar,
            TokenKind::Comma,
            TokenKind::Semicolon,
        ]
    );
    assert!(tokens.iter().all(|(_, line)| *line == 1));

    let mut lexer = Lexer::new("=+-*/!<>(){}[]|,;");
    for _ in 0..17 {
        lexer.next_token();
    }
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
}

#[test]
fn lines_advance_at_each_newline() {
    let lines: Vec<u32> = Lexer::new("a\nb\n\nc d\n").map(|t| t.line).collect();
    assert_eq!(lines, vec![1, 2, 4, 4]);
}

#[test]
fn rendered_arithmetic_reparses_to_same_result() -> Result<(), EtherError> {
    for input in [
        "1 + 2 * 3",
        "(1 + 2) * 3",
        "10 - 4 - 3",
        "100 / 10 / 5",
        "-(2 + 3) * -4",
        "((7))",
        "1 * 2 - 3 / 4 + 5",
    ] {
        let rendered = parse(input)?.to_string();
        assert_eq!(parse(&rendered)?.to_string(), rendered, "{}", input);
        assert_eq!(run(&rendered)?, run(input)?, "{}", input);
    }
    assert_eq!(parse("1 + 2 * 3")?.to_string(), "(1 + (2 * 3));");
    Ok(())
}

#[test]
fn arithmetic() -> Result<(), EtherError> {
    assert_eq!(run("1 + 2 * 3")?, Value::Integer(7));
    assert_eq!(run("(1 + 2) * 3")?, Value::Integer(9));
    assert_eq!(run("var a = 42; a / 2;")?, Value::Integer(21));
    Ok(())
}

#[test]
fn calls_and_pipes() -> Result<(), EtherError> {
    assert_eq!(run("|x, y| { x + y; }(7, 8);")?, Value::Integer(15));
    assert_eq!(
        run("var add = |x, y| { x + y; }; 7 -> add(8);")?,
        Value::Integer(15)
    );
    assert_eq!(
        run("var add = |x, y| { x + y; }; var double = |x| { 2 * x; }; 7 -> double() -> add(1);")?,
        Value::Integer(15)
    );
    Ok(())
}

#[test]
fn pipe_target_must_be_a_call() {
    match run("var f = |x| { x; }; 1 -> f;") {
        Err(EtherError::Parse(e)) => assert!(e.to_string().contains("'->'"), "{}", e),
        r => panic!("unexpected output: {:?}", r),
    }
}

#[test]
fn index_out_of_range() {
    for (input, expected) in [("[1, 2, 3][5]", 5), ("[1,2,3][-1]", -1)] {
        match run(input) {
            Err(EtherError::Runtime(RuntimeError {
                kind: RuntimeErrorKind::IndexOutOfRange { index, length, .. },
                ..
            })) => assert_eq!((index, length), (expected, 3)),
            r => panic!("unexpected output: {:?}", r),
        }
    }
}

#[test]
fn closure_ignores_sibling_shadowing() -> Result<(), EtherError> {
    let prg = r#"
        var c = 1;
        var read_c = || { c; };
        var sibling = || { var c = 99; c; };
        [sibling(), read_c()];
    "#;
    assert_eq!(run(prg)?, ints(&[99, 1]));
    Ok(())
}

#[test]
fn return_skips_rest_of_block() -> Result<(), EtherError> {
    assert_eq!(
        run("var five = || { 4; return 5; 4; }; five();")?,
        Value::Integer(5)
    );
    Ok(())
}

#[test]
fn builtins() -> Result<(), EtherError> {
    assert_eq!(run("len([1,2,3])")?, Value::Integer(3));
    assert_eq!(run("map([1,2,3], |x| { 2 * x })")?, ints(&[2, 4, 6]));
    assert_eq!(run("[1, 2] -> map(|x| { x + 1 }) -> len()")?, Value::Integer(2));
    Ok(())
}

#[test]
fn integers_are_always_truthy() -> Result<(), EtherError> {
    assert_eq!(run("!42")?, Value::Boolean(false));
    assert_eq!(run("!!42")?, Value::Boolean(true));
    assert_eq!(run("if (0) { 1; } else { 2; }")?, Value::Integer(1));
    Ok(())
}

#[test]
fn evaluator_over_shared_environment() -> Result<(), RuntimeError> {
    let env = Env::new();
    let mut out: Vec<u8> = Vec::new();
    let mut evaluator = Evaluator::new(&mut out);
    let define = parse("var counter = |n| { |m| { n + m; }; };").expect("parse error");
    evaluator.eval_program(&define, &env)?;
    let call = parse("counter(40)(2);").expect("parse error");
    assert_eq!(evaluator.eval_program(&call, &env)?, Value::Integer(42));
    Ok(())
}
