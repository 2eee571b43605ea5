use crate::{
	ast::*,
	diagnostic::{Diagnostic, Span},
	text::Text,
};

fn insert<T>(map: &mut FxIndexMap<Text, T>, name: Ident, value: T, span: Span, spans: impl Fn(&T) -> Span) -> Result<(), Diagnostic> {
	if let Some(prev) = map.get(&name.name) {
		return Err(span.error("duplicate declaration") + name.span.marker() + spans(prev).label("previously declared here"));
	}
	map.insert(name.name, value);
	Ok(())
}

/// Sort the top-level forms into the program's collections, rejecting duplicate names.
pub fn populate(decls: Vec<Decl>) -> Result<Program, Diagnostic> {
	let mut program = Program::default();

	for decl in decls {
		let name = decl.name();
		let span = decl.span();

		match decl {
			Decl::UserVar(x) => insert(&mut program.user_vars, name, x, span, |x| x.span)?,
			Decl::Struct(x) => insert(&mut program.structs, name, x, span, |x| x.span)?,
			Decl::Buffer(x) => insert(&mut program.buffers, name, x, span, |x| x.span)?,
			Decl::Format(x) => insert(&mut program.formats, name, x, span, |x| x.span)?,
			Decl::Sampler(x) => insert(&mut program.samplers, name, x, span, |x| x.span)?,
			Decl::Texture(x) => insert(&mut program.textures, name, x, span, |x| x.span)?,
			Decl::Pipeline(x) => insert(&mut program.pipelines, name, x, span, |x| x.span)?,
			Decl::Renderer(x) => {
				if let Some(prev) = program.renderer(name.name) {
					return Err(span.error("duplicate declaration") + name.span.marker() + prev.span.label("previously declared here"));
				}
				program.renderers.push(x);
			},
		}
	}

	log::debug!(
		"indexed {} structs, {} textures, {} pipelines, {} renderers",
		program.structs.len(),
		program.textures.len(),
		program.pipelines.len(),
		program.renderers.len()
	);

	Ok(program)
}
