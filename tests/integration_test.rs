// Integration tests for the Start/end parser

use startlang::parser::ast::{Expr, Program, SourceLocation, Stmt, TypeName};
use startlang::parser::diagnostics::DiagnosticKind;
use startlang::parser::grammar::{Grammar, Rule, Symbol};
use startlang::parser::lexer::Lexer;
use startlang::parser::parse::Parser;
use startlang::parser::{parse_source, Error};
use startlang::trace::TraceRecorder;

fn parse(source: &str) -> Program {
    parse_source(source).expect("Parsing failed")
}

fn assigned(program: &Program, index: usize) -> &Expr {
    match &program.statements[index] {
        Stmt::Assign { value, .. } => value,
        other => panic!("Expected assignment, got {:?}", other),
    }
}

/// Exercises every production at least once
const CORPUS: &str = r#"Start
    var a: int;
    var b: float;
    var c: string;
    var d: bool;

    function f(x: int, y: bool): int begin
        return x;
    end

    function g(): bool begin
        return true;
    end

    a := f(1, false);;
    if a = 1 or b <> 2 and not d then
        c := "s";
    else
        a := -1;
    end
    if a < 2 then end
    while a > 0 do
        a := a - 1 * 2 / +3;
        g();
    end
    b := (2.5 + a);
end"#;

#[test]
fn test_statement_counts() {
    assert!(parse("Start end").statements.is_empty());

    let program = parse("Start var x: int; x := 1; print(x); end");
    assert_eq!(program.statements.len(), 3);
    assert!(matches!(
        program.statements[0],
        Stmt::VarDecl {
            declared_type: TypeName::Int,
            ..
        }
    ));
    assert!(matches!(program.statements[2], Stmt::Call(ref call) if call.name == "print"));

    assert_eq!(parse(CORPUS).statements.len(), 11);
}

#[test]
fn test_precedence_and_associativity() {
    let program = parse("Start x := 1 + 2 * 3; y := 10 - 3 - 2; z := not a or b and c; end");

    assert_eq!(assigned(&program, 0).to_string(), "Add(1, Mul(2, 3))");
    assert_eq!(assigned(&program, 1).to_string(), "Sub(Sub(10, 3), 2)");
    assert_eq!(assigned(&program, 2).to_string(), "Or(Not(a), And(b, c))");
}

#[test]
fn test_optional_else() {
    let program = parse("Start if a then x := 1; end if a then x := 1; else x := 2; y := 3; end end");

    match &program.statements[0] {
        Stmt::If {
            then_branch,
            else_branch,
            ..
        } => {
            assert_eq!(then_branch.len(), 1);
            assert!(else_branch.is_none());
        }
        other => panic!("Expected if, got {:?}", other),
    }

    match &program.statements[1] {
        Stmt::If { else_branch, .. } => {
            assert_eq!(else_branch.as_ref().map(Vec::len), Some(2));
        }
        other => panic!("Expected if, got {:?}", other),
    }
}

#[test]
fn test_empty_params_and_args() {
    let program = parse("Start function f(): int begin return g();; end end");

    match &program.statements[0] {
        Stmt::FuncDecl {
            name,
            params,
            return_type,
            body,
            ..
        } => {
            assert_eq!(name, "f");
            assert!(params.is_empty());
            assert_eq!(*return_type, TypeName::Int);
            match &body[0] {
                Stmt::Return {
                    value: Expr::Call(call),
                    ..
                } => {
                    assert_eq!(call.name, "g");
                    assert!(call.args.is_empty());
                }
                other => panic!("Expected return of a call, got {:?}", other),
            }
        }
        other => panic!("Expected function, got {:?}", other),
    }
}

#[test]
fn test_params_keep_order() {
    let program = parse("Start function f(a: int, b: string, c: bool): float begin end end");

    match &program.statements[0] {
        Stmt::FuncDecl { params, body, .. } => {
            let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
            assert_eq!(names, vec!["a", "b", "c"]);
            assert_eq!(params[1].param_type, TypeName::String);
            assert!(body.is_empty());
        }
        other => panic!("Expected function, got {:?}", other),
    }
}

#[test]
fn test_missing_then_reports_one_parse_error() {
    let grammar = Grammar::standard().unwrap();
    let diagnostics = Parser::from_source(grammar, "Start if true x := 1; end end")
        .parse()
        .unwrap_err();

    assert_eq!(diagnostics.len(), 1);
    let diagnostic = &diagnostics[0];
    assert_eq!(diagnostic.kind, DiagnosticKind::ParseError);
    assert_eq!(diagnostic.location, SourceLocation::new(1, 15));
    assert!(diagnostic.expected.contains(&Symbol::Then));
    assert!(diagnostic.expected.contains(&Symbol::Or));
    assert!(diagnostic
        .to_string()
        .starts_with("Parse error at line 1, column 15"));
}

#[test]
fn test_token_error_halts_once() {
    let grammar = Grammar::standard().unwrap();
    let diagnostics = Parser::from_source(grammar, "Start x := 1 @ 2; y := 3 $; end")
        .parse()
        .unwrap_err();

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::TokenError);
    assert_eq!(diagnostics[0].location, SourceLocation::new(1, 14));
}

#[test]
fn test_unterminated_string_is_token_error() {
    let grammar = Grammar::standard().unwrap();
    let diagnostics = Parser::from_source(grammar, "Start x := \"open; end")
        .parse()
        .unwrap_err();

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::TokenError);
}

#[test]
fn test_nesting_limit_at_default_depth() {
    let source = format!("Start x := {}1; end", "- ".repeat(250));
    let grammar = Grammar::standard().unwrap();
    let diagnostics = Parser::from_source(grammar, &source).parse().unwrap_err();

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::NestingLimit);

    let within = format!("Start x := {}1; end", "- ".repeat(100));
    assert!(Parser::from_source(grammar, &within).parse().is_ok());
}

#[test]
fn test_parse_is_repeatable() {
    let grammar = Grammar::standard().unwrap();
    let mut parser = Parser::from_source(grammar, CORPUS);

    let first = parser.parse().unwrap();
    let second = parser.parse().unwrap();
    assert_eq!(first, second);

    let mut failing = Parser::from_source(grammar, "Start x := ; end");
    assert_eq!(failing.parse().unwrap_err(), failing.parse().unwrap_err());
}

#[test]
fn test_corpus_fires_every_rule() {
    let grammar = Grammar::standard().unwrap();
    let mut parser = Parser::from_source(grammar, CORPUS).with_trace(TraceRecorder::new(10_000));
    parser.parse().unwrap();

    let trace = parser.trace().unwrap();
    assert!(!trace.is_truncated());

    let fired = trace.rules_fired();
    let missing: Vec<Rule> = Rule::all().filter(|rule| !fired.contains(rule)).collect();
    assert!(missing.is_empty(), "Rules never reduced: {:?}", missing);
}

#[test]
fn test_shared_grammar_across_threads() {
    let grammar = Grammar::standard().unwrap();
    let tokens = Lexer::new(CORPUS).tokenize();
    let expected = Parser::new(grammar, tokens.clone()).parse().unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let tokens = tokens.clone();
                scope.spawn(move || Parser::new(grammar, tokens).parse())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), expected);
        }
    });
}

#[test]
fn test_parse_source_error() {
    match parse_source("Start x := ; end") {
        Err(Error::Syntax(diagnostics)) => {
            assert_eq!(diagnostics.len(), 1);
            assert_eq!(diagnostics[0].kind, DiagnosticKind::ParseError);
        }
        other => panic!("Expected syntax error, got {:?}", other),
    }

    let err = parse_source("Start").unwrap_err();
    assert_eq!(err.to_string(), "parsing failed with 1 diagnostic(s)");
}

#[test]
fn test_program_serializes_to_json() {
    let program = parse("Start var x: int; x := 1 + 2; end");
    let json = serde_json::to_value(&program).unwrap();

    let statements = json["statements"].as_array().unwrap();
    assert_eq!(statements.len(), 2);
    assert_eq!(json["location"]["line"], 1);
}
