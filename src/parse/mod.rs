//! Source text to token tree.
//!
//! The tree is the only thing the grammar looks at: nested lists of words,
//! strings and numbers, each carrying its span.

use chumsky::{error::SimpleReason, prelude::*, Stream};
use logos::Logos;

use crate::{
	arith::Number,
	diagnostic::{Diagnostic, Span},
	parse::lexer::Lexeme,
	text::{Interner, Text},
};

mod lexer;

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
	pub kind: TokenKind,
	pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
	Word(Text),
	Str(Text),
	Number(Number),
	List(Vec<Token>),
}

impl Token {
	pub fn word(&self) -> Option<Text> {
		match self.kind {
			TokenKind::Word(w) => Some(w),
			_ => None,
		}
	}

	pub fn list(&self) -> Option<&[Token]> {
		match &self.kind {
			TokenKind::List(items) => Some(items),
			_ => None,
		}
	}

	pub fn is_list(&self) -> bool { matches!(self.kind, TokenKind::List(_)) }
}

impl TokenKind {
	pub fn describe(&self) -> &'static str {
		match self {
			TokenKind::Word(_) => "word",
			TokenKind::Str(_) => "string",
			TokenKind::Number(_) => "number",
			TokenKind::List(_) => "list",
		}
	}
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
enum Tok {
	LParen,
	RParen,
	Word(Text),
	Str(Text),
	Int(i64),
	Float(u64),
}

impl std::fmt::Display for Tok {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Tok::LParen => write!(f, "`(`"),
			Tok::RParen => write!(f, "`)`"),
			Tok::Word(_) => write!(f, "word"),
			Tok::Str(_) => write!(f, "string"),
			Tok::Int(_) | Tok::Float(_) => write!(f, "number"),
		}
	}
}

/// Lex and build the token tree of a whole source file.
pub fn parse(intern: &mut Interner, source: &str, file: &str) -> Result<Vec<Token>, Diagnostic> {
	let file = intern.get(file);
	let toks = lex(intern, source, file)?;
	log::debug!("lexed {} tokens from `{}`", toks.len(), intern.resolve(file));

	let eoi = source.len() as u32;
	let stream = Stream::from_iter(
		Span {
			start: eoi,
			end: eoi,
			file,
		},
		toks.into_iter(),
	);

	tree().repeated().then_ignore(end()).parse(stream).map_err(|errors| {
		let err = match errors.into_iter().next() {
			Some(err) => err,
			None => {
				let span = Span {
					start: 0,
					end: eoi,
					file,
				};
				return span.syntax_error("malformed source") + span.marker();
			},
		};
		let span = err.span();
		let message = match err.reason() {
			SimpleReason::Unclosed { .. } => "unclosed list".to_string(),
			SimpleReason::Custom(message) => message.clone(),
			SimpleReason::Unexpected => match err.found() {
				Some(found) => format!("unexpected {}", found),
				None => "unexpected end of input".to_string(),
			},
		};
		let mut diag = span.syntax_error(message) + span.marker();
		if let SimpleReason::Unclosed { span, .. } = err.reason() {
			diag = diag + span.label("list opened here");
		}
		diag
	})
}

fn lex(intern: &mut Interner, source: &str, file: Text) -> Result<Vec<(Tok, Span)>, Diagnostic> {
	let mut lexer = Lexeme::lexer(source);
	let mut toks = Vec::new();

	while let Some(lexeme) = lexer.next() {
		let range = lexer.span();
		let span = Span {
			start: range.start as u32,
			end: range.end as u32,
			file,
		};

		let tok = match lexeme {
			Lexeme::LParen => Tok::LParen,
			Lexeme::RParen => Tok::RParen,
			Lexeme::Str(s) => Tok::Str(intern.get(&s)),
			Lexeme::Int(i) | Lexeme::HexInt(i) => Tok::Int(i),
			Lexeme::Float(f) | Lexeme::HexFloat(f) => Tok::Float(f.to_bits()),
			Lexeme::Word(w) => Tok::Word(intern.get(w)),
			Lexeme::Error => return Err(span.syntax_error("unrecognized token") + span.marker()),
		};
		toks.push((tok, span));
	}

	Ok(toks)
}

fn tree() -> impl Parser<Tok, Token, Error = Simple<Tok, Span>> {
	recursive(|tree| {
		let atom = filter_map(|span: Span, tok| {
			let kind = match tok {
				Tok::Word(w) => TokenKind::Word(w),
				Tok::Str(s) => TokenKind::Str(s),
				Tok::Int(i) => TokenKind::Number(Number::Int(i)),
				Tok::Float(f) => TokenKind::Number(Number::Float(f64::from_bits(f))),
				_ => return Err(Simple::expected_input_found(span, [Some(Tok::LParen)], Some(tok))),
			};
			Ok(Token { kind, span })
		});

		let list = tree
			.repeated()
			.delimited_by(just(Tok::LParen), just(Tok::RParen))
			.map_with_span(|items, span| Token {
				kind: TokenKind::List(items),
				span,
			});

		list.or(atom)
	})
}
