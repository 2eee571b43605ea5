//! std140-style layout of uniform structs.
//!
//! Sizes and offsets are counted in 4-byte words:
//! - scalars align to 1 and take 1 word.
//! - `vecN` aligns to `N` rounded up to 2 and takes `N` words.
//! - arrays and matrices (arrays of column vectors) step through elements
//!   with a stride rounded up to 4 words, and align to 4.
//! - structs align to their largest member alignment rounded up to 4, lay
//!   out members in declared order and round their size up to 4.

use rustc_hash::FxHashSet;

use crate::{
	ast::{FxIndexMap, Program, StructMember},
	diagnostic::{Diagnostic, Span},
	resolve::{
		cycle::{cycle_error, StackList},
		inbuilt::{BuiltinType, Matcher, TypeShape},
	},
	text::{Interner, Text},
};

pub fn align(n: u32, to: u32) -> u32 { (n + to - 1) / to * to }

/// The largest struct the solver lays out, in words (64 KiB).
pub const MAX_STRUCT_WORDS: u32 = 16384;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum MemberType {
	Builtin(BuiltinType),
	Struct(Text),
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct MemberLayout {
	pub name: Text,
	pub ty: MemberType,
	pub array: Option<u32>,
	/// In words from the start of the struct.
	pub offset: u32,
	pub alignment: u32,
	pub words: u32,
}

/// One host-to-GPU copy of a scalar, vector or matrix column.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ReflowCopy {
	pub ty: BuiltinType,
	/// In bytes.
	pub offset: u32,
	/// Path from the struct, such as `lights[1].color` or `view[2]`.
	pub field: String,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct StructLayout {
	pub name: Text,
	pub alignment: u32,
	pub words: u32,
	pub members: Vec<MemberLayout>,
	pub reflow: Vec<ReflowCopy>,
}

impl StructLayout {
	pub fn bytes(&self) -> u32 { self.words * 4 }

	pub fn member(&self, name: Text) -> Option<&MemberLayout> { self.members.iter().find(|m| m.name == name) }
}

#[derive(Copy, Clone, Debug)]
struct TypeLayout {
	alignment: u32,
	words: u32,
}

fn builtin_layout(ty: BuiltinType) -> TypeLayout {
	match ty.shape() {
		TypeShape::Scalar => TypeLayout { alignment: 1, words: 1 },
		TypeShape::Vector(n) => TypeLayout {
			alignment: align(n, 2),
			words: n,
		},
		// One column vector per array element.
		TypeShape::Matrix(n) => TypeLayout {
			alignment: 4,
			words: 4 * n,
		},
	}
}

fn array_layout(element: TypeLayout, count: u32) -> Option<TypeLayout> {
	Some(TypeLayout {
		alignment: 4,
		words: align(element.words, 4).checked_mul(count)?,
	})
}

/// Lay out every struct in the program.
///
/// Member types must already be validated. A struct that contains itself
/// through a chain of other structs is rejected.
pub fn solve(program: &Program, intern: &mut Interner) -> Result<FxIndexMap<Text, StructLayout>, Diagnostic> {
	let mut solver = Solver {
		program,
		builtin: Matcher::new(intern),
		intern,
		solved: FxIndexMap::default(),
		in_progress: FxHashSet::default(),
	};

	for name in program.structs.keys() {
		solver.solve_struct(*name, &StackList::empty())?;
	}

	log::debug!("solved {} struct layouts", solver.solved.len());
	Ok(solver.solved)
}

struct Solver<'a> {
	program: &'a Program,
	intern: &'a Interner,
	builtin: Matcher<BuiltinType>,
	solved: FxIndexMap<Text, StructLayout>,
	in_progress: FxHashSet<Text>,
}

impl Solver<'_> {
	fn solve_struct(&mut self, name: Text, ctx: &StackList<(Text, Span)>) -> Result<TypeLayout, Diagnostic> {
		if let Some(layout) = self.solved.get(&name) {
			return Ok(TypeLayout {
				alignment: layout.alignment,
				words: layout.words,
			});
		}

		let program = self.program;
		let s = &program.structs[&name];
		if !self.in_progress.insert(name) {
			let message = format!("struct `{}` contains itself", self.intern.resolve(name));
			return Err(cycle_error(message, name, s.name.span, ctx));
		}

		let mut members = Vec::with_capacity(s.members.len());
		let mut alignment = 0;
		let mut offset = 0;
		for member in s.members.iter() {
			let (ty, element) = self.member_type(member, &ctx.with((name, member.ty.span)))?;
			let array = member.array.and_then(|a| a.value.as_int()).and_then(|n| u32::try_from(n).ok());
			let layout = match array {
				Some(count) => array_layout(element, count),
				None => Some(element),
			};

			// Offsets never exceed `MAX_STRUCT_WORDS`, so aligning them can't overflow.
			let placed = layout.and_then(|layout| {
				let start = align(offset, layout.alignment);
				let end = start.checked_add(layout.words).filter(|&end| end <= MAX_STRUCT_WORDS)?;
				Some((layout, start, end))
			});
			let (layout, start, end) = match placed {
				Some(x) => x,
				None => {
					return Err(s.name.span.error(format!("struct `{}` is too large", self.intern.resolve(name)))
						+ member.span.label("exceeds the size limit")
						+ format!("structs can be at most {} bytes", MAX_STRUCT_WORDS * 4).as_str())
				},
			};

			alignment = alignment.max(layout.alignment);
			members.push(MemberLayout {
				name: member.name.name,
				ty,
				array,
				offset: start,
				alignment: layout.alignment,
				words: layout.words,
			});
			offset = end;
		}

		let mut layout = StructLayout {
			name,
			alignment: align(alignment.max(1), 4),
			words: align(offset, 4),
			members,
			reflow: Vec::new(),
		};
		layout.reflow = self.reflow(&layout, 0, "");

		log::trace!(
			"struct `{}`: {} words, aligned to {}",
			self.intern.resolve(name),
			layout.words,
			layout.alignment
		);

		self.in_progress.remove(&name);
		let result = TypeLayout {
			alignment: layout.alignment,
			words: layout.words,
		};
		self.solved.insert(name, layout);
		Ok(result)
	}

	fn member_type(
		&mut self, member: &StructMember, ctx: &StackList<(Text, Span)>,
	) -> Result<(MemberType, TypeLayout), Diagnostic> {
		if let Some(builtin) = self.builtin.get(member.ty.name) {
			return Ok((MemberType::Builtin(builtin), builtin_layout(builtin)));
		}

		if self.program.structs.contains_key(&member.ty.name) {
			let layout = self.solve_struct(member.ty.name, ctx)?;
			return Ok((MemberType::Struct(member.ty.name), layout));
		}

		Err(member.ty.span.error(format!("undefined type `{}`", self.intern.resolve(member.ty.name))) + member.ty.span.marker())
	}

	/// Flatten a solved struct into per-primitive copies, starting at `base` words.
	fn reflow(&self, layout: &StructLayout, base: u32, prefix: &str) -> Vec<ReflowCopy> {
		let mut copies = Vec::new();

		for member in layout.members.iter() {
			let field = format!("{}{}", prefix, self.intern.resolve(member.name));
			let offset = base + member.offset;

			match member.array {
				Some(count) => {
					let stride = member.words / count.max(1);
					for i in 0..count {
						self.reflow_value(member.ty, offset + i * stride, &format!("{}[{}]", field, i), &mut copies);
					}
				},
				None => self.reflow_value(member.ty, offset, &field, &mut copies),
			}
		}

		copies
	}

	fn reflow_value(&self, ty: MemberType, offset: u32, field: &str, copies: &mut Vec<ReflowCopy>) {
		match ty {
			MemberType::Builtin(builtin) => match builtin.column() {
				Some(column) => {
					let columns = match builtin.shape() {
						TypeShape::Matrix(n) => n,
						_ => 1,
					};
					for i in 0..columns {
						copies.push(ReflowCopy {
							ty: column,
							offset: (offset + i * 4) * 4,
							field: format!("{}[{}]", field, i),
						});
					}
				},
				None => copies.push(ReflowCopy {
					ty: builtin,
					offset: offset * 4,
					field: field.to_string(),
				}),
			},
			MemberType::Struct(name) => {
				// Nested structs are always solved before their parents.
				if let Some(nested) = self.solved.get(&name) {
					copies.extend(self.reflow(nested, offset, &format!("{}.", field)));
				}
			},
		}
	}
}
