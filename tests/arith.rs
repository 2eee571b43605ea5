use rendel::{
	arith::{fold, Expr, Number},
	diagnostic::{Diagnostic, DiagnosticKind},
	parse::parse,
	text::Interner,
};

fn fold_str(intern: &mut Interner, source: &str) -> Result<Expr, Diagnostic> {
	let tokens = parse(intern, source, "expr").unwrap();
	assert_eq!(tokens.len(), 1, "expected a single expression in `{}`", source);
	fold(&tokens[0], intern)
}

fn folds_to(source: &str, expected: Number) {
	let mut intern = Interner::new();
	match fold_str(&mut intern, source).unwrap() {
		Expr::Number(n) => assert_eq!(n, expected, "folding `{}`", source),
		other => panic!("`{}` did not fold to a literal: {}", source, other.render(&intern)),
	}
}

fn residual(source: &str) -> String {
	let mut intern = Interner::new();
	let expr = fold_str(&mut intern, source).unwrap();
	assert!(expr.literal().is_none(), "`{}` folded completely", source);
	expr.render(&intern)
}

fn fails(source: &str) -> Diagnostic {
	let mut intern = Interner::new();
	let err = fold_str(&mut intern, source).unwrap_err();
	assert!(err.is(DiagnosticKind::Arithmetic), "unexpected error kind for `{}`: {}", source, err);
	err
}

#[test]
fn literals() {
	folds_to("(sub 10 2 3)", Number::Int(5));
	folds_to("(add 1 2.5)", Number::Float(3.5));
	folds_to("(mul 2 3 4)", Number::Int(24));
	folds_to("(min 4 -2 9)", Number::Int(-2));
	folds_to("(max 4 -2 9.5)", Number::Float(9.5));
	folds_to("(div 1 2)", Number::Float(0.5));
	folds_to("(div 100 2 5)", Number::Float(10.0));
	folds_to("(sin 0)", Number::Float(0.0));
	folds_to("(cos 0)", Number::Float(1.0));
	folds_to("(mul pi 2)", Number::Float(std::f64::consts::PI * 2.0));
	folds_to("(add (mul 2 3) (sub 10 4))", Number::Int(12));
	folds_to("7", Number::Int(7));
}

#[test]
fn integer_overflow_becomes_float() {
	folds_to("(mul 9223372036854775807 2)", Number::Float(9223372036854775807.0 * 2.0));
}

#[test]
fn partial_folding() {
	assert_eq!(residual("(mul 2 3 x 4 5)"), "(mul 6 x 20)");
	assert_eq!(residual("(add x 1 2)"), "(add x 3)");
	assert_eq!(residual("(sub x 2 3)"), "(sub x 5)");
	assert_eq!(residual("(sub 10 x 2 3)"), "(sub 10 (add x 5))");
	assert_eq!(residual("(sub 10 2 x)"), "(sub 8 x)");
	assert_eq!(residual("(sub x 2)"), "(sub x 2)");
	assert_eq!(residual("(min 3 x 1)"), "(min 3 x 1)");
	assert_eq!(residual("(sin x)"), "(sin x)");
	assert_eq!(residual("ScreenWidth"), "ScreenWidth");
}

#[test]
fn mad() {
	folds_to("(mad 2 3 4)", Number::Int(10));
	folds_to("(mad 2 3 4 5 6)", Number::Int(32));
	assert_eq!(residual("(mad 2 3 x 4 5)"), "(add 6 (mul x 4) 5)");
}

#[test]
fn div() {
	assert_eq!(residual("(div 8 x 2)"), "(div 8 (mul x 2))");
	assert_eq!(residual("(div x 2 4)"), "(div x 8)");
	assert_eq!(residual("(div 100 2 x)"), "(div 50.0 x)");
}

#[test]
fn idempotent() {
	for source in [
		"(mul 2 3 x 4 5)",
		"(mad 2 3 x 4 5)",
		"(div 8 x 2)",
		"(sub 10 x 2 3)",
		"(max 1 ScreenWidth 2)",
	] {
		let once = residual(source);
		let twice = residual(&once);
		assert_eq!(once, twice, "refolding `{}`", source);
	}
}

#[test]
fn errors() {
	assert_eq!(fails("(pow 2 3)").message, "unknown arithmetic operation `pow`");
	assert_eq!(fails("(div 1 0)").message, "division by zero");
	assert_eq!(fails("(sin 1 2)").message, "`sin` expects exactly 1 argument, got 2");
	assert_eq!(fails("(add 1)").message, "`add` expects at least 2 arguments, got 1");
	assert_eq!(
		fails("(mad 1 2)").message,
		"`mad` expects an odd number of at least 3 arguments, got 2"
	);
	assert_eq!(fails("()").message, "empty arithmetic expression");
	fails("((add 1 2) 3)");
	fails("(add \"one\" 2)");
}
