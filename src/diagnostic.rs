use std::{
	fmt::{Display, Formatter},
	ops::{Add, Range},
};

use thiserror::Error;

use crate::text::Text;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DiagnosticKind {
	/// The source text could not be split into a token tree.
	Syntax,
	/// A token list matched no grammar production.
	Grammar,
	/// Well-formed, but semantically wrong.
	Validation,
	/// Misuse of the arithmetic sublanguage.
	Arithmetic,
}

impl Display for DiagnosticKind {
	fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
		match self {
			DiagnosticKind::Syntax => write!(f, "syntax error"),
			DiagnosticKind::Grammar => write!(f, "grammar error"),
			DiagnosticKind::Validation => write!(f, "validation error"),
			DiagnosticKind::Arithmetic => write!(f, "arithmetic error"),
		}
	}
}

/// The single error a compilation stops at.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Error)]
#[error("{kind}: {message}")]
pub struct Diagnostic {
	pub kind: DiagnosticKind,
	pub message: String,
	pub span: Span,
	pub labels: Vec<Label>,
	pub notes: Vec<String>,
}

impl Diagnostic {
	pub fn is(&self, kind: DiagnosticKind) -> bool { self.kind == kind }
}

impl Add<Label> for Diagnostic {
	type Output = Diagnostic;

	fn add(mut self, other: Label) -> Self::Output {
		self.labels.push(other);
		self
	}
}

impl Add<&str> for Diagnostic {
	type Output = Diagnostic;

	fn add(mut self, other: &str) -> Self::Output {
		self.notes.push(other.to_string());
		self
	}
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
	pub message: String,
	pub span: Span,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Span {
	pub start: u32,
	pub end: u32,
	pub file: Text,
}

impl Add for Span {
	type Output = Span;

	fn add(self, other: Span) -> Self::Output {
		debug_assert_eq!(self.file, other.file);
		Span {
			start: self.start.min(other.start),
			end: self.end.max(other.end),
			file: self.file,
		}
	}
}

impl chumsky::Span for Span {
	type Context = Text;
	type Offset = u32;

	fn new(context: Self::Context, range: Range<Self::Offset>) -> Self {
		Self {
			start: range.start,
			end: range.end,
			file: context,
		}
	}

	fn context(&self) -> Self::Context { self.file }

	fn start(&self) -> Self::Offset { self.start }

	fn end(&self) -> Self::Offset { self.end }
}

impl Span {
	pub fn range(&self) -> Range<usize> { self.start as usize..self.end as usize }

	fn diagnostic(&self, kind: DiagnosticKind, message: impl Into<String>) -> Diagnostic {
		Diagnostic {
			kind,
			message: message.into(),
			span: *self,
			labels: Vec::new(),
			notes: Vec::new(),
		}
	}

	pub fn syntax_error(&self, message: impl Into<String>) -> Diagnostic {
		self.diagnostic(DiagnosticKind::Syntax, message)
	}

	pub fn grammar_error(&self, message: impl Into<String>) -> Diagnostic {
		self.diagnostic(DiagnosticKind::Grammar, message)
	}

	pub fn error(&self, message: impl Into<String>) -> Diagnostic {
		self.diagnostic(DiagnosticKind::Validation, message)
	}

	pub fn arithmetic_error(&self, message: impl Into<String>) -> Diagnostic {
		self.diagnostic(DiagnosticKind::Arithmetic, message)
	}

	pub fn label(&self, message: impl Into<String>) -> Label {
		Label {
			message: message.into(),
			span: *self,
		}
	}

	pub fn marker(&self) -> Label {
		Label {
			message: String::new(),
			span: *self,
		}
	}
}
