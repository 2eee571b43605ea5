//! Syntax-directed matching of token lists against the grammar tables.
//!
//! Every top-level form is dispatched on its leading keyword, then validated
//! position by position through the chosen production only. The first
//! mismatch is reported; there is no recovery and no backtracking.

use crate::{
	arith::{self, Expr, Number},
	ast::*,
	diagnostic::{Diagnostic, Span},
	parse::{Token, TokenKind},
	resolve::inbuilt::ShaderStage,
	text::Interner,
};

pub mod rules;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum AtomKind {
	Word,
	Str,
	Number,
}

impl AtomKind {
	fn name(self) -> &'static str {
		match self {
			AtomKind::Word => "word",
			AtomKind::Str => "string",
			AtomKind::Number => "number",
		}
	}
}

#[derive(Copy, Clone, Debug)]
pub enum Rule {
	/// A single leaf of the given kind. The string names it in errors.
	Atom(AtomKind, &'static str),
	/// A word with exactly this text.
	Exactly(&'static str),
	/// Any token, folded as an arithmetic expression.
	Arithmetic(&'static str),
	List(&'static ListRule),
	/// The first alternative whose leading rule matches is chosen.
	Match(&'static [ListRule]),
}

/// The node a [`ListRule`] builds once it has matched.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Construct {
	UserVar,
	Struct,
	Member,
	ArrayMember,
	Buffer,
	Format,
	Sampler,
	MinFilter,
	MagFilter,
	Texture,
	TextureSrc,
	TextureClear,
	Width,
	Height,
	Depth,
	Pipeline,
	Shader(ShaderStage),
	Use,
	Enable,
	Disable,
	Copy,
	Input,
	Output,
	Sideput,
	Renderer,
	Update,
	Draw,
	Dispatch,
	Next,
}

#[derive(Copy, Clone, Debug)]
pub struct ListRule {
	pub construct: Construct,
	pub rules: &'static [Rule],
	pub tail: Option<&'static Rule>,
}

/// What a single rule produced. Keywords produce nothing.
#[derive(Clone, Debug)]
pub enum Matched {
	Word(Ident),
	Str(Ident),
	Number(Number, Span),
	Expr(Expr),
	Node(Node),
}

/// Nodes below the top level, consumed by their parent's constructor.
#[derive(Clone, Debug)]
pub enum Node {
	Decl(Decl),
	Member(StructMember),
	Filter(Construct, Ident),
	TextureSrc(Ident),
	TextureClear([Number; 4]),
	Dimension(Construct, Expr),
	PipelineItem(PipelineItem),
	RendererItem(RendererItem),
}

impl Rule {
	/// A shallow check used to pick between alternatives.
	fn matches(&self, token: &Token, intern: &Interner) -> bool {
		match self {
			Rule::Atom(..) => !token.is_list(),
			Rule::Exactly(kw) => token.word().map_or(false, |w| intern.resolve(w) == *kw),
			Rule::Arithmetic(_) => true,
			Rule::List(_) | Rule::Match(_) => token.is_list(),
		}
	}

	fn validate(&self, token: &Token, intern: &Interner) -> Result<Option<Matched>, Diagnostic> {
		match *self {
			Rule::Atom(kind, hint) => {
				let span = token.span;
				let matched = match (&token.kind, kind) {
					(&TokenKind::Word(name), AtomKind::Word) => Matched::Word(Ident { name, span }),
					(&TokenKind::Str(name), AtomKind::Str) => Matched::Str(Ident { name, span }),
					(&TokenKind::Number(n), AtomKind::Number) => Matched::Number(n, span),
					(found, _) => {
						return Err(span.grammar_error(format!(
							"expected {} to be a {}, found a {}",
							hint,
							kind.name(),
							found.describe()
						)) + span.marker())
					},
				};
				Ok(Some(matched))
			},
			Rule::Exactly(kw) => match token.word() {
				Some(w) if intern.resolve(w) == kw => Ok(None),
				_ => Err(token.span.grammar_error(format!("expected `{}`", kw)) + token.span.marker()),
			},
			Rule::Arithmetic(_) => arith::fold(token, intern).map(|e| Some(Matched::Expr(e))),
			Rule::List(rule) => rule.validate(token, intern).map(|n| Some(Matched::Node(n))),
			Rule::Match(alternatives) => match_alternatives(alternatives, token, intern).map(|n| Some(Matched::Node(n))),
		}
	}
}

impl ListRule {
	fn matches(&self, items: &[Token], intern: &Interner) -> bool {
		match (self.rules.first(), items.first()) {
			(Some(rule), Some(token)) => rule.matches(token, intern),
			_ => false,
		}
	}

	fn validate(&self, token: &Token, intern: &Interner) -> Result<Node, Diagnostic> {
		let items = token.list().ok_or_else(|| {
			token.span.grammar_error(format!("expected a list, found a {}", token.kind.describe())) + token.span.marker()
		})?;

		let expected = self.rules.len();
		match self.tail {
			Some(_) if items.len() <= expected => {
				return Err(token.span.grammar_error(format!(
					"expected more than {} list items, got {}",
					expected,
					items.len()
				)) + token.span.marker())
			},
			None if items.len() != expected => {
				return Err(token.span.grammar_error(format!(
					"expected exactly {} list items, got {}",
					expected,
					items.len()
				)) + token.span.marker())
			},
			_ => {},
		}

		let mut children = Vec::with_capacity(items.len());
		for (rule, item) in self.rules.iter().zip(items.iter()) {
			children.extend(rule.validate(item, intern)?);
		}
		if let Some(tail) = self.tail {
			for item in items[expected..].iter() {
				children.extend(tail.validate(item, intern)?);
			}
		}

		Ok(construct(self.construct, token.span, children))
	}
}

fn match_alternatives(alternatives: &[ListRule], token: &Token, intern: &Interner) -> Result<Node, Diagnostic> {
	let items = token.list().ok_or_else(|| {
		token.span.grammar_error(format!("expected a list, found a {}", token.kind.describe())) + token.span.marker()
	})?;
	if items.is_empty() {
		return Err(token.span.grammar_error("expected a non-empty list") + token.span.marker());
	}

	match alternatives.iter().find(|rule| rule.matches(items, intern)) {
		Some(rule) => rule.validate(token, intern),
		None => Err(token.span.grammar_error("unknown expression") + items[0].span.label("unrecognized form")),
	}
}

/// Match every top-level form against the grammar.
pub fn decls(tokens: &[Token], intern: &Interner) -> Result<Vec<Decl>, Diagnostic> {
	let mut decls = Vec::with_capacity(tokens.len());
	for token in tokens {
		match match_alternatives(rules::GRAMMAR, token, intern)? {
			Node::Decl(decl) => decls.push(decl),
			other => unreachable!("top-level production built {:?}", other),
		}
	}
	Ok(decls)
}

/// Pops typed children in order. A mismatch means the rule tables and the
/// constructors disagree, which is a bug in the tables rather than bad input.
struct Children(std::vec::IntoIter<Matched>);

impl Children {
	fn next(&mut self) -> Matched {
		match self.0.next() {
			Some(m) => m,
			None => panic!("grammar table defect: production has too few children"),
		}
	}

	fn word(&mut self) -> Ident {
		match self.next() {
			Matched::Word(i) => i,
			other => panic!("grammar table defect: expected a word, built {:?}", other),
		}
	}

	fn str(&mut self) -> Ident {
		match self.next() {
			Matched::Str(i) => i,
			other => panic!("grammar table defect: expected a string, built {:?}", other),
		}
	}

	fn number(&mut self) -> (Number, Span) {
		match self.next() {
			Matched::Number(n, span) => (n, span),
			other => panic!("grammar table defect: expected a number, built {:?}", other),
		}
	}

	fn expr(&mut self) -> Expr {
		match self.next() {
			Matched::Expr(e) => e,
			other => panic!("grammar table defect: expected an expression, built {:?}", other),
		}
	}

	fn nodes(self) -> impl Iterator<Item = Node> {
		self.0.map(|m| match m {
			Matched::Node(n) => n,
			other => panic!("grammar table defect: expected a node, built {:?}", other),
		})
	}
}

fn construct(construct: Construct, span: Span, children: Vec<Matched>) -> Node {
	let mut c = Children(children.into_iter());

	match construct {
		Construct::UserVar => {
			let ctype = c.word();
			let name = c.word();
			let value = c.expr();
			Node::Decl(Decl::UserVar(UserVar {
				ctype,
				name,
				value,
				span,
			}))
		},
		Construct::Struct => {
			let name = c.word();
			let members = c
				.nodes()
				.map(|n| match n {
					Node::Member(m) => m,
					other => panic!("grammar table defect: struct built {:?}", other),
				})
				.collect();
			Node::Decl(Decl::Struct(Struct { name, members, span }))
		},
		Construct::Member => {
			let ty = c.word();
			let name = c.word();
			Node::Member(StructMember {
				ty,
				name,
				array: None,
				span,
			})
		},
		Construct::ArrayMember => {
			let ty = c.word();
			let name = c.word();
			let (value, size_span) = c.number();
			Node::Member(StructMember {
				ty,
				name,
				array: Some(ArraySize { value, span: size_span }),
				span,
			})
		},
		Construct::Buffer => {
			let name = c.word();
			let ty = c.word();
			Node::Decl(Decl::Buffer(Buffer { name, ty, span }))
		},
		Construct::Format => {
			let name = c.word();
			let target = c.word();
			let format = c.word();
			let sampler = c.word();
			Node::Decl(Decl::Format(Format {
				name,
				target,
				format,
				sampler,
				span,
			}))
		},
		Construct::Sampler => {
			let name = c.word();
			let mut sampler = Sampler {
				name,
				min: None,
				mag: None,
				span,
			};
			for node in c.nodes() {
				match node {
					Node::Filter(Construct::MinFilter, f) => sampler.min = Some(f),
					Node::Filter(Construct::MagFilter, f) => sampler.mag = Some(f),
					other => panic!("grammar table defect: sampler built {:?}", other),
				}
			}
			Node::Decl(Decl::Sampler(sampler))
		},
		Construct::MinFilter | Construct::MagFilter => Node::Filter(construct, c.word()),
		Construct::Texture => {
			let name = c.word();
			let format = c.word();
			let mut texture = Texture {
				name,
				format,
				src: None,
				clear: None,
				width: None,
				height: None,
				depth: None,
				shadow: None,
				shadow_of: None,
				span,
			};
			for node in c.nodes() {
				match node {
					Node::TextureSrc(src) => texture.src = Some(src),
					Node::TextureClear(color) => texture.clear = Some(color),
					Node::Dimension(Construct::Width, e) => texture.width = Some(e),
					Node::Dimension(Construct::Height, e) => texture.height = Some(e),
					Node::Dimension(Construct::Depth, e) => texture.depth = Some(e),
					other => panic!("grammar table defect: texture built {:?}", other),
				}
			}
			Node::Decl(Decl::Texture(texture))
		},
		Construct::TextureSrc => Node::TextureSrc(c.str()),
		Construct::TextureClear => {
			let color = [c.number().0, c.number().0, c.number().0, c.number().0];
			Node::TextureClear(color)
		},
		Construct::Width | Construct::Height | Construct::Depth => Node::Dimension(construct, c.expr()),
		Construct::Pipeline => {
			let name = c.word();
			let items = c
				.nodes()
				.map(|n| match n {
					Node::PipelineItem(item) => item,
					other => panic!("grammar table defect: pipeline built {:?}", other),
				})
				.collect();
			Node::Decl(Decl::Pipeline(Pipeline::new(name, items, span)))
		},
		Construct::Shader(stage) => Node::PipelineItem(PipelineItem::Shader(stage, c.str())),
		Construct::Use => Node::PipelineItem(PipelineItem::Use(c.word())),
		Construct::Enable | Construct::Disable => Node::PipelineItem(PipelineItem::Flag(Flag {
			capability: c.word(),
			enabled: construct == Construct::Enable,
		})),
		Construct::Copy => Node::PipelineItem(PipelineItem::Copy(c.word())),
		Construct::Input => Node::PipelineItem(PipelineItem::Input(c.word())),
		Construct::Output => Node::PipelineItem(PipelineItem::Output(c.word())),
		Construct::Sideput => Node::PipelineItem(PipelineItem::Sideput(c.word())),
		Construct::Renderer => {
			let name = c.word();
			let items = c
				.nodes()
				.map(|n| match n {
					Node::RendererItem(item) => item,
					other => panic!("grammar table defect: renderer built {:?}", other),
				})
				.collect();
			Node::Decl(Decl::Renderer(Renderer::new(name, items, span)))
		},
		Construct::Update => Node::RendererItem(RendererItem::Event(RendererEvent::Update(c.word()))),
		Construct::Draw => Node::RendererItem(RendererItem::Event(RendererEvent::Draw(c.word()))),
		Construct::Dispatch => {
			let pipeline = c.word();
			let size = [c.expr(), c.expr(), c.expr()];
			Node::RendererItem(RendererItem::Event(RendererEvent::Dispatch { pipeline, size }))
		},
		Construct::Next => Node::RendererItem(RendererItem::Next(c.word())),
	}
}
