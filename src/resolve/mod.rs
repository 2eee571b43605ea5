//! Turn parsed token trees into a validated, laid out [`Program`].

use crate::{
	ast::Program,
	diagnostic::Diagnostic,
	grammar,
	layout,
	parse::Token,
	resolve::{options::CompileOptions, validate::Tables},
	text::Interner,
};

pub mod copy;
pub(crate) mod cycle;
pub mod feedback;
pub mod inbuilt;
mod index;
pub mod options;
pub mod validate;

/// Match, index, rewrite, validate and lay out a parsed source file.
///
/// Rewriting runs before validation, so validation sees copied pipeline
/// items and synthesized shadow textures.
pub fn compile(tokens: &[Token], intern: &mut Interner, options: &CompileOptions) -> Result<Program, Diagnostic> {
	let decls = grammar::decls(tokens, intern)?;
	log::debug!("matched {} declarations", decls.len());

	let mut program = index::populate(decls)?;
	rewrite(&mut program, intern)?;

	let tables = Tables::new(intern);
	validate::validate(&program, intern, &tables, options)?;

	program.layouts = layout::solve(&program, intern)?;
	Ok(program)
}

/// The structural rewrites: copy splicing, then shadow textures, then
/// implicit renderer steps.
fn rewrite(program: &mut Program, intern: &mut Interner) -> Result<(), Diagnostic> {
	copy::splice_copies(program, intern)?;
	feedback::synthesize_shadows(program, intern);
	feedback::insert_implicit_steps(program);

	log::debug!(
		"rewrote program: {} textures after shadowing",
		program.textures.len()
	);
	Ok(())
}
