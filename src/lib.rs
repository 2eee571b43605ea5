//! A compiler for a small s-expression language describing GPU render setups:
//! uniform structs, textures, pipelines and the renderers that sequence them.
//!
//! [`compile_str`] runs the whole front end. [`shader::link`] then expands and
//! deduplicates the pipelines' shaders against the compiled program.

use crate::{
	ast::Program,
	diagnostic::Diagnostic,
	resolve::options::CompileOptions,
	text::Interner,
};

pub mod arith;
pub mod ast;
pub mod diagnostic;
pub mod grammar;
pub mod layout;
pub mod parse;
pub mod resolve;
pub mod shader;
pub mod text;

pub fn compile_str(intern: &mut Interner, source: &str, file: &str, options: &CompileOptions) -> Result<Program, Diagnostic> {
	let tokens = parse::parse(intern, source, file)?;
	resolve::compile(&tokens, intern, options)
}
