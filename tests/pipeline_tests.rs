use lsd::codegen::IrGenerator;
use lsd::config::FrontendConfig;
use lsd::frontend::Frontend;
use lsd::interpreter::engine::{run_program, Interpreter};
use lsd::lexer::keywords::KeywordMatch;
use lsd::lexer::Category;
use lsd::parser::ast::{Expression, PrintValue, SourceLocation, Statement};
use lsd::semantic::{self, Type};
use std::fs;
use std::path::Path;

fn demo(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos").join(name);
    fs::read_to_string(path).expect("Failed to read demo file")
}

#[test]
fn test_media_program_runs() {
    let source = demo("media.lsd");
    let outcome = Frontend::default().parse(&source).expect("tokenizer failed");
    assert!(!outcome.has_errors(), "{:?}", outcome);
    assert_eq!(outcome.program.statements.len(), 13);

    let analysis = semantic::analyze(&outcome.program);
    assert!(analysis.is_ok(), "{:?}", analysis.errors);
    assert_eq!(analysis.symbols["media"], Type::Decimal);
    assert_eq!(analysis.symbols["valores"], Type::List);

    let output = run_program(&outcome.program).expect("Execution failed");
    let media = 24.5 / 3.0;
    let expected = vec![
        "Aprovado".to_string(),
        format!("{}", media),
        "Resultado final".to_string(),
        format!("{}", 49.0 / 3.0),
        format!("{}", (24.5 + media) / 4.0),
        format!("{}", 24.5 + media),
    ];
    assert_eq!(output, expected);
}

#[test]
fn test_media_program_compiles() {
    let source = demo("media.lsd");
    let outcome = Frontend::default().parse(&source).unwrap();
    // the list assignment has no IR lowering
    let err = IrGenerator::new("x86_64-pc-linux-gnu")
        .generate(&outcome.program)
        .unwrap_err();
    assert_eq!(err.to_string(), "Codegen error at line 13, column 11: lists can only be passed directly to CalculateMean or CalculateSum");

    let numeric = "a = 2\nb = a * 3.5\nIf b > a\nPrint \"greater\"\nEnd\nPrint b";
    let outcome = Frontend::default().parse(numeric).unwrap();
    let module = IrGenerator::new("x86_64-pc-linux-gnu")
        .generate(&outcome.program)
        .unwrap();
    assert!(module.contains("%a.addr = alloca double"));
    assert!(module.contains("%b.addr = alloca double"));
    assert_eq!(module.matches("call i32 (i8*, ...) @printf").count(), 2);
}

#[test]
fn test_errors_are_collected_not_fatal() {
    let source = demo("errors.lsd");
    let outcome = Frontend::default().parse(&source).unwrap();

    assert_eq!(outcome.lex_errors.len(), 1);
    assert_eq!(outcome.lex_errors[0].text, "@");
    assert_eq!(outcome.lex_errors[0].location, SourceLocation::new(1, 8));

    // `y = * 2` inside the If body, then the missing End
    assert_eq!(outcome.parse_errors.len(), 2, "{:?}", outcome.parse_errors);
    assert_eq!(outcome.parse_errors[0].location, SourceLocation::new(4, 5));
    assert!(outcome.parse_errors[1].token.is_none());
    assert!(outcome.parse_errors[1].message.contains("Expected 'End'"));

    assert_eq!(outcome.program.statements.len(), 1);
    assert!(matches!(
        outcome.program.statements[0],
        Statement::Assignment { .. }
    ));
}

#[test]
fn test_scenarios() {
    let frontend = Frontend::default();

    let stream = frontend.tokenize("Data").unwrap();
    assert_eq!(stream.tokens.len(), 1);
    assert_eq!(stream.tokens[0].category, Category::Identifier);

    let stream = frontend.tokenize("1.23e-4").unwrap();
    assert_eq!(stream.tokens.len(), 1);
    assert_eq!(stream.tokens[0].category, Category::Scientific);

    let outcome = frontend.parse("x = 10\nIf x > 5\nPrint x\nEnd").unwrap();
    assert!(!outcome.has_errors());
    match &outcome.program.statements[..] {
        [Statement::Assignment { .. }, Statement::Conditional { body, .. }] => {
            assert!(matches!(
                &body[..],
                [Statement::Print {
                    value: PrintValue::Expression(Expression::Identifier(..)),
                    ..
                }]
            ));
        }
        other => panic!("unexpected statements: {:?}", other),
    }

    let outcome = frontend.parse("If x Print x").unwrap();
    assert_eq!(outcome.parse_errors.len(), 1);
    assert!(outcome.parse_errors[0].token.is_none());
}

#[test]
fn test_case_insensitive_keywords() {
    let config = FrontendConfig {
        keyword_match: KeywordMatch::CaseInsensitive,
        ..FrontendConfig::default()
    };
    let frontend = Frontend::new(&config);
    let outcome = frontend.parse("x = 3\nif x > 1\nprint \"yes\"\nend").unwrap();
    assert!(!outcome.has_errors(), "{:?}", outcome);

    let mut interpreter = Interpreter::new();
    interpreter.run(&outcome.program).unwrap();
    assert_eq!(interpreter.output(), ["yes"]);
}

#[test]
fn test_custom_keyword_list() {
    let config = FrontendConfig::from_json(r#"{ "keywords": ["If", "Print", "End"] }"#).unwrap();
    let frontend = Frontend::new(&config);
    let stream = frontend.tokenize("CalculateMean").unwrap();
    assert_eq!(stream.tokens[0].category, Category::Identifier);

    // still callable as a plain identifier
    let outcome = frontend.parse("Print CalculateMean([2, 4])").unwrap();
    assert!(!outcome.has_errors());
    assert_eq!(run_program(&outcome.program).unwrap(), vec!["3.0"]);
}

#[test]
fn test_comment_at_end_of_input() {
    let outcome = Frontend::default().parse("Print 1 // done").unwrap();
    assert!(!outcome.has_errors());
    assert_eq!(run_program(&outcome.program).unwrap(), vec!["1"]);
}
