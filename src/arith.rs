//! Partial constant folding of the arithmetic sublanguage.
//!
//! Expressions are prefix lists such as `(mul 2 ScreenWidth 0.5)`. Some
//! variables are only known at run time, so folding collapses whatever it can
//! and leaves a residual expression for the rest.

use std::{
	f64::consts::PI,
	fmt::{Display, Formatter},
	str::FromStr,
};

use strum::{EnumIter, EnumString, IntoStaticStr};

use crate::{
	ast::Ident,
	diagnostic::{Diagnostic, Span},
	parse::{Token, TokenKind},
	text::Interner,
};

#[derive(Copy, Clone, Debug)]
pub enum Number {
	Int(i64),
	Float(f64),
}

impl Number {
	pub fn as_f64(self) -> f64 {
		match self {
			Number::Int(i) => i as f64,
			Number::Float(f) => f,
		}
	}

	pub fn as_int(self) -> Option<i64> {
		match self {
			Number::Int(i) => Some(i),
			Number::Float(_) => None,
		}
	}

	fn int_op(self, other: Number, int: fn(i64, i64) -> Option<i64>, float: fn(f64, f64) -> f64) -> Number {
		if let (Number::Int(a), Number::Int(b)) = (self, other) {
			if let Some(x) = int(a, b) {
				return Number::Int(x);
			}
		}
		Number::Float(float(self.as_f64(), other.as_f64()))
	}
}

impl PartialEq for Number {
	fn eq(&self, other: &Self) -> bool {
		match (*self, *other) {
			(Number::Int(a), Number::Int(b)) => a == b,
			(a, b) => a.as_f64() == b.as_f64(),
		}
	}
}

impl Display for Number {
	fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
		match self {
			Number::Int(i) => write!(f, "{}", i),
			Number::Float(x) if x.fract() == 0.0 && x.is_finite() => write!(f, "{:.1}", x),
			Number::Float(x) => write!(f, "{}", x),
		}
	}
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Op {
	Add,
	Sub,
	Mul,
	Div,
	Min,
	Max,
	Mad,
	Sin,
	Cos,
	Tan,
}

impl Op {
	fn is_variadic(self) -> bool { !matches!(self, Op::Sin | Op::Cos | Op::Tan) }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Call {
	pub op: Op,
	pub args: Vec<Expr>,
	pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
	Number(Number),
	Var(Ident),
	Call(Call),
}

impl Expr {
	pub fn literal(&self) -> Option<Number> {
		match self {
			Expr::Number(n) => Some(*n),
			_ => None,
		}
	}

	/// Calls `f` with every variable the residual expression still refers to.
	pub fn visit_vars(&self, f: &mut impl FnMut(Ident)) {
		match self {
			Expr::Number(_) => {},
			Expr::Var(ident) => f(*ident),
			Expr::Call(call) => call.args.iter().for_each(|arg| arg.visit_vars(f)),
		}
	}

	pub fn render(&self, intern: &Interner) -> String {
		match self {
			Expr::Number(n) => n.to_string(),
			Expr::Var(ident) => intern.resolve(ident.name).to_string(),
			Expr::Call(call) => {
				let op: &'static str = call.op.into();
				let mut out = format!("({}", op);
				for arg in call.args.iter() {
					out.push(' ');
					out.push_str(&arg.render(intern));
				}
				out.push(')');
				out
			},
		}
	}
}

/// Fold an arithmetic token into a literal, or into a residual expression
/// when it depends on variables.
pub fn fold(token: &Token, intern: &Interner) -> Result<Expr, Diagnostic> {
	match &token.kind {
		TokenKind::Number(n) => Ok(Expr::Number(*n)),
		TokenKind::Word(w) => {
			if intern.resolve(*w) == "pi" {
				Ok(Expr::Number(Number::Float(PI)))
			} else {
				Ok(Expr::Var(Ident {
					name: *w,
					span: token.span,
				}))
			}
		},
		TokenKind::Str(_) => Err(token.span.arithmetic_error("strings are not allowed in arithmetic") + token.span.marker()),
		TokenKind::List(items) => {
			let (cmd, rest) = match items.split_first() {
				Some(x) => x,
				None => return Err(token.span.arithmetic_error("empty arithmetic expression") + token.span.marker()),
			};
			let name = match cmd.word() {
				Some(w) => intern.resolve(w),
				None => {
					return Err(cmd.span.arithmetic_error(format!(
						"expected an arithmetic operation, found a {}",
						cmd.kind.describe()
					)) + cmd.span.marker())
				},
			};
			let op = Op::from_str(name).map_err(|_| {
				cmd.span.arithmetic_error(format!("unknown arithmetic operation `{}`", name)) + cmd.span.marker()
			})?;

			let args = rest.iter().map(|t| fold(t, intern)).collect::<Result<Vec<_>, _>>()?;
			fold_call(Call {
				op,
				args,
				span: token.span,
			})
		},
	}
}

fn fold_call(call: Call) -> Result<Expr, Diagnostic> {
	let call = desugar(call)?;
	if call.op.is_variadic() {
		fold_variadic(call)
	} else {
		fold_fixed(call)
	}
}

/// Rewrite `mad` and long `div`s and `sub`s into shapes that fold further.
fn desugar(mut call: Call) -> Result<Call, Diagnostic> {
	match call.op {
		Op::Mad => {
			let count = call.args.len();
			if count < 3 || count % 2 == 0 {
				return Err(call.span.arithmetic_error(format!(
					"`mad` expects an odd number of at least 3 arguments, got {}",
					count
				)) + call.span.marker());
			}

			let mut args = std::mem::take(&mut call.args);
			let last = args.pop();
			let mut pairs = Vec::with_capacity(count / 2 + 1);
			let mut iter = args.into_iter();
			while let (Some(a), Some(b)) = (iter.next(), iter.next()) {
				pairs.push(fold_call(Call {
					op: Op::Mul,
					args: vec![a, b],
					span: call.span,
				})?);
			}
			pairs.extend(last);

			call.op = Op::Add;
			call.args = pairs;
		},
		Op::Div | Op::Sub if call.args.len() > 2 => {
			// `a / b / c` is `a / (b * c)` and `a - b - c` is `a - (b + c)`.
			let combine = if call.op == Op::Div { Op::Mul } else { Op::Add };
			let pivot = call.args.iter().take_while(|a| a.literal().is_some()).count().max(1);
			let rest = call.args.split_off(pivot);
			// All-literal runs are left as they are and fold left to right.
			if rest.len() <= 1 {
				call.args.extend(rest);
			} else {
				call.args.push(fold_call(Call {
					op: combine,
					args: rest,
					span: call.span,
				})?);
			}
		},
		_ => {},
	}

	Ok(call)
}

fn fold_variadic(call: Call) -> Result<Expr, Diagnostic> {
	if call.args.len() < 2 {
		let op: &'static str = call.op.into();
		return Err(call.span.arithmetic_error(format!(
			"`{}` expects at least 2 arguments, got {}",
			op,
			call.args.len()
		)) + call.span.marker());
	}

	let mut args = Vec::with_capacity(call.args.len());
	let mut acc: Option<Number> = None;
	for arg in call.args {
		match arg {
			Expr::Number(n) => {
				acc = Some(match acc {
					Some(a) => apply(call.op, a, n, call.span)?,
					None => n,
				});
			},
			other => {
				args.extend(acc.take().map(Expr::Number));
				args.push(other);
			},
		}
	}

	match acc {
		Some(n) if args.is_empty() => return Ok(Expr::Number(n)),
		Some(n) => args.push(Expr::Number(n)),
		None => {},
	}

	Ok(Expr::Call(Call {
		op: call.op,
		args,
		span: call.span,
	}))
}

fn fold_fixed(call: Call) -> Result<Expr, Diagnostic> {
	let op: &'static str = call.op.into();
	if call.args.len() != 1 {
		return Err(call.span.arithmetic_error(format!(
			"`{}` expects exactly 1 argument, got {}",
			op,
			call.args.len()
		)) + call.span.marker());
	}

	let x = match call.args[0].literal() {
		Some(x) => x.as_f64(),
		None => return Ok(Expr::Call(call)),
	};
	let value = match call.op {
		Op::Sin => x.sin(),
		Op::Cos => x.cos(),
		Op::Tan => x.tan(),
		_ => unreachable!("`{}` is variadic", op),
	};

	Ok(Expr::Number(Number::Float(value)))
}

fn apply(op: Op, a: Number, b: Number, span: Span) -> Result<Number, Diagnostic> {
	Ok(match op {
		Op::Add => a.int_op(b, i64::checked_add, |a, b| a + b),
		Op::Sub => a.int_op(b, i64::checked_sub, |a, b| a - b),
		Op::Mul => a.int_op(b, i64::checked_mul, |a, b| a * b),
		Op::Div => {
			if b.as_f64() == 0.0 {
				return Err(span.arithmetic_error("division by zero") + span.marker());
			}
			Number::Float(a.as_f64() / b.as_f64())
		},
		Op::Min => {
			if b.as_f64() < a.as_f64() {
				b
			} else {
				a
			}
		},
		Op::Max => {
			if b.as_f64() > a.as_f64() {
				b
			} else {
				a
			}
		},
		_ => unreachable!("fixed-arity operations never accumulate"),
	})
}
