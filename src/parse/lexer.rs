use logos::{Lexer, Logos};

#[derive(Logos, Clone, Debug, PartialEq)]
pub enum Lexeme<'a> {
	#[token("(")]
	LParen,
	#[token(")")]
	RParen,
	#[regex(r#""([^"\\]|\\.)*""#, unquote)]
	#[regex(r#"'([^'\\]|\\.)*'"#, unquote)]
	Str(String),
	#[regex(r"-?[0-9]+", |lex| lex.slice().parse().ok(), priority = 3)]
	Int(i64),
	#[regex(r"-?[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().parse().ok(), priority = 3)]
	#[regex(r"-?[0-9]+[eE][+-]?[0-9]+", |lex| lex.slice().parse().ok(), priority = 3)]
	Float(f64),
	#[regex(r"-?0[xX][0-9a-fA-F]+", hex_int, priority = 4)]
	HexInt(i64),
	#[regex(r"-?0[xX][0-9a-fA-F]*(\.[0-9a-fA-F]*)?[pP][+-]?[0-9]+", hex_float, priority = 4)]
	HexFloat(f64),
	#[regex(r#"[^ \t\r\n\f()"';]+"#, priority = 1)]
	Word(&'a str),
	#[error]
	#[regex(r"[ \t\r\n\f]+", logos::skip)]
	#[regex(r";[^\n]*", logos::skip)]
	Error,
}

fn split_sign(s: &str) -> (bool, &str) {
	match s.strip_prefix('-') {
		Some(rest) => (true, rest),
		None => (false, s),
	}
}

fn hex_int<'a>(lex: &mut Lexer<'a, Lexeme<'a>>) -> Option<i64> {
	let (negative, s) = split_sign(lex.slice());
	let value = i64::from_str_radix(&s[2..], 16).ok()?;
	Some(if negative { -value } else { value })
}

fn hex_float<'a>(lex: &mut Lexer<'a, Lexeme<'a>>) -> Option<f64> {
	let (negative, s) = split_sign(lex.slice());
	let value = hexf_parse::parse_hexf64(s, false).ok()?;
	Some(if negative { -value } else { value })
}

fn unquote<'a>(lex: &mut Lexer<'a, Lexeme<'a>>) -> Option<String> {
	let slice = lex.slice();
	let inner = &slice[1..slice.len() - 1];

	let mut out = String::with_capacity(inner.len());
	let mut chars = inner.chars();
	while let Some(c) = chars.next() {
		if c != '\\' {
			out.push(c);
			continue;
		}

		out.push(match chars.next()? {
			'n' => '\n',
			't' => '\t',
			'r' => '\r',
			'0' => '\0',
			c @ ('\\' | '"' | '\'') => c,
			_ => return None,
		});
	}

	Some(out)
}
