use rendel::{
	ast::{Decl, Program},
	compile_str,
	diagnostic::{Diagnostic, DiagnosticKind},
	grammar::decls,
	parse::parse,
	resolve::{inbuilt::ShaderStage, options::CompileOptions},
	text::Interner,
};

const SHADERS: &str = r#"
(sampler s (min GL_LINEAR) (mag GL_LINEAR))
(format f GL_TEXTURE_2D GL_RGBA8 s)
"#;

fn compile(intern: &mut Interner, source: &str) -> Result<Program, Diagnostic> {
	compile_str(intern, source, "test", &CompileOptions::default())
}

fn fails(source: &str, kind: DiagnosticKind) -> Diagnostic {
	let mut intern = Interner::new();
	let err = compile(&mut intern, source).unwrap_err();
	assert!(err.is(kind), "expected a {} for:\n{}\ngot: {}", kind, source, err);
	err
}

#[test]
fn struct_members() {
	let mut intern = Interner::new();
	let tokens = parse(&mut intern, "(struct Foo (vec3 a) (array float b 4))", "test").unwrap();
	let decls = decls(&tokens, &intern).unwrap();

	assert_eq!(decls.len(), 1);
	match &decls[0] {
		Decl::Struct(s) => {
			assert_eq!(intern.resolve(s.name.name), "Foo");
			assert_eq!(s.members.len(), 2);
			assert_eq!(intern.resolve(s.members[0].ty.name), "vec3");
			assert!(s.members[0].array.is_none());
			assert_eq!(intern.resolve(s.members[1].name.name), "b");
			assert_eq!(s.members[1].array.unwrap().value.as_int(), Some(4));
		},
		other => panic!("expected a struct, got {:?}", other),
	}
}

#[test]
fn grammar_errors() {
	let err = fails("(struct Foo)", DiagnosticKind::Grammar);
	assert_eq!(err.message, "expected more than 2 list items, got 2");

	let err = fails("(buffer b)", DiagnosticKind::Grammar);
	assert_eq!(err.message, "expected exactly 3 list items, got 2");

	let err = fails("(frobnicate x)", DiagnosticKind::Grammar);
	assert_eq!(err.message, "unknown expression");

	let err = fails("(struct Foo (vec3))", DiagnosticKind::Grammar);
	assert_eq!(err.message, "expected exactly 2 list items, got 1");

	let err = fails("(texture t f (src 5))", DiagnosticKind::Grammar);
	assert_eq!(err.message, "expected image path to be a string, found a number");

	let err = fails("(pipeline p (vs shader.vert))", DiagnosticKind::Grammar);
	assert_eq!(err.message, "expected shader path to be a string, found a word");

	let err = fails("(renderer r (draw))", DiagnosticKind::Grammar);
	assert_eq!(err.message, "expected exactly 2 list items, got 1");

	fails("(struct Foo ())", DiagnosticKind::Grammar);
	fails("word", DiagnosticKind::Grammar);
}

#[test]
fn arithmetic_errors_surface() {
	let err = fails("(uservar float X (pow 2 2))", DiagnosticKind::Arithmetic);
	assert_eq!(err.message, "unknown arithmetic operation `pow`");
}

#[test]
fn duplicate_declaration() {
	let err = fails("(struct A (float x))\n(struct A (float y))", DiagnosticKind::Validation);
	assert_eq!(err.message, "duplicate declaration");
	assert!(err.labels.iter().any(|l| l.message == "previously declared here"));

	let err = fails("(renderer r (next r))\n(renderer r (next r))", DiagnosticKind::Validation);
	assert_eq!(err.message, "duplicate declaration");
}

#[test]
fn undefined_references() {
	let err = fails("(buffer b Missing)", DiagnosticKind::Validation);
	assert_eq!(err.message, "undefined struct `Missing`");

	let err = fails("(struct A (Missing m))", DiagnosticKind::Validation);
	assert_eq!(err.message, "undefined type `Missing`");

	let err = fails("(uservar float X (mul Foo 2))", DiagnosticKind::Validation);
	assert_eq!(err.message, "unknown variable `Foo`");

	let err = fails(
		&format!("{}(texture t missing (width 4) (height 4))", SHADERS),
		DiagnosticKind::Validation,
	);
	assert_eq!(err.message, "unknown format `missing`");

	let err = fails("(pipeline p (vs \"a\") (fs \"b\") (use Nope))", DiagnosticKind::Validation);
	assert_eq!(err.message, "undefined struct `Nope`");

	let err = fails("(renderer r (draw nothing))", DiagnosticKind::Validation);
	assert_eq!(err.message, "unknown pipeline `nothing`");
}

#[test]
fn runtime_variables() {
	let source = "(uservar float X (mul Time 2))";

	let mut intern = Interner::new();
	let options = CompileOptions::default().with_runtime_var("Time");
	compile_str(&mut intern, source, "test", &options).unwrap();

	fails(source, DiagnosticKind::Validation);

	let mut intern = Interner::new();
	compile(&mut intern, "(uservar int Half (div ScreenWidth 2))\n(uservar float Y (mul Half 3))").unwrap();
}

#[test]
fn identifiers() {
	let err = fails("(uservar float uniform 1)", DiagnosticKind::Validation);
	assert_eq!(err.message, "usage of reserved identifier `uniform`");

	let err = fails("(struct vec3 (float x))", DiagnosticKind::Validation);
	assert_eq!(err.message, "struct cannot be named after built in type `vec3`");

	let err = fails("(uservar long X 1)", DiagnosticKind::Validation);
	assert_eq!(err.message, "invalid scalar ctype `long`");

	// Names that merely start with a reserved word are fine.
	let mut intern = Interner::new();
	compile(&mut intern, "(struct Inputs (float inner) (int intensity))").unwrap();
}

#[test]
fn structs() {
	let err = fails("(struct A (float x) (vec2 x))", DiagnosticKind::Validation);
	assert_eq!(err.message, "struct `A` contains more than one member named `x`");

	let err = fails("(struct A (A inner))", DiagnosticKind::Validation);
	assert_eq!(err.message, "struct members can't use the type of the struct they belong to");

	let err = fails("(struct A (array float x 0))", DiagnosticKind::Validation);
	assert_eq!(err.message, "array size can't be less than 1");

	let err = fails("(struct A (array vec4 x 1073741824))", DiagnosticKind::Validation);
	assert_eq!(err.message, "array size can't be more than 65536");

	let err = fails("(struct A (array float x 2.5))", DiagnosticKind::Validation);
	assert_eq!(err.message, "array size must be an integer");
}

#[test]
fn samplers_and_formats() {
	let err = fails("(sampler s (min GL_LINEAR))", DiagnosticKind::Validation);
	assert_eq!(err.message, "sampler `s` must specify its `mag` filter");

	let err = fails("(sampler s (min GL_LINEAR) (mag GL_LINEAR_MIPMAP_LINEAR))", DiagnosticKind::Validation);
	assert_eq!(err.message, "magnification filters can't use mipmaps");

	let err = fails("(sampler s (min GL_FANCY) (mag GL_LINEAR))", DiagnosticKind::Validation);
	assert_eq!(err.message, "unsupported sampler filter `GL_FANCY`");

	let err = fails(
		"(sampler s (min GL_LINEAR) (mag GL_LINEAR))\n(format f GL_TEXTURE_2D GL_R32UI s)",
		DiagnosticKind::Validation,
	);
	assert_eq!(err.message, "integer format `GL_R32UI` can only be sampled with `GL_NEAREST`");

	let err = fails(
		"(sampler s (min GL_LINEAR) (mag GL_LINEAR))\n(format f GL_TEXTURE_3D GL_DEPTH_COMPONENT24 s)",
		DiagnosticKind::Validation,
	);
	assert_eq!(err.message, "depth format `GL_DEPTH_COMPONENT24` requires a 2D or cube map target");

	let err = fails("(format f GL_TEXTURE_2D GL_RGBA8 nope)", DiagnosticKind::Validation);
	assert_eq!(err.message, "unknown sampler `nope`");

	let err = fails(
		"(sampler s (min GL_LINEAR) (mag GL_LINEAR))\n(format f GL_TEXTURE_4D GL_RGBA8 s)",
		DiagnosticKind::Validation,
	);
	assert_eq!(err.message, "unsupported texture target `GL_TEXTURE_4D`");
}

#[test]
fn textures() {
	let err = fails(
		&format!("{}(texture t f (src \"a.png\") (width 4))", SHADERS),
		DiagnosticKind::Validation,
	);
	assert_eq!(err.message, "texture `t` can't have both an image source and explicit dimensions");

	let err = fails(&format!("{}(texture t f (width 4))", SHADERS), DiagnosticKind::Validation);
	assert_eq!(err.message, "texture `t` is missing its height");

	let err = fails(
		&format!("{}(texture t f (width 4) (height 4) (depth 4))", SHADERS),
		DiagnosticKind::Validation,
	);
	assert_eq!(err.message, "GL_TEXTURE_2D textures can't have a depth");

	let err = fails(
		"(sampler s (min GL_LINEAR) (mag GL_LINEAR))\n(format f GL_TEXTURE_2D GL_RGBA16F s)\n(texture t f (src \"a.png\"))",
		DiagnosticKind::Validation,
	);
	assert_eq!(err.message, "images can't be loaded into format `GL_RGBA16F`");

	let err = fails(&format!("{}(texture s f (width 4) (height 4))", SHADERS), DiagnosticKind::Validation);
	assert_eq!(err.message, "texture `s` has the same name as a sampler");
}

#[test]
fn pipelines() {
	let err = fails("(pipeline p (vs \"a\"))", DiagnosticKind::Validation);
	assert_eq!(err.message, "pipeline `p` is missing a `fs` shader");

	let err = fails("(pipeline p (enable GL_BLEND))", DiagnosticKind::Validation);
	assert_eq!(err.message, "pipeline `p` has no shaders");

	let err = fails("(pipeline p (cs \"a\") (vs \"b\"))", DiagnosticKind::Validation);
	assert_eq!(err.message, "compute pipelines can't use non-compute shaders");

	let err = fails("(pipeline p (vs \"a\") (fs \"b\") (enable GL_WIREFRAME))", DiagnosticKind::Validation);
	assert_eq!(err.message, "unsupported capability `GL_WIREFRAME`");

	let err = fails("(pipeline p (vs \"a\") (fs \"b\") (in nothing))", DiagnosticKind::Validation);
	assert_eq!(
		err.message,
		"unable to determine input type for resource `nothing` on pipeline `p`"
	);

	let err = fails(
		"(sampler s (min GL_NEAREST) (mag GL_NEAREST))\n\
		 (format d GL_TEXTURE_2D GL_DEPTH_COMPONENT24 s)\n\
		 (texture a d (width 4) (height 4))\n\
		 (texture b d (width 4) (height 4))\n\
		 (pipeline p (vs \"a\") (fs \"b\") (out a) (out b))",
		DiagnosticKind::Validation,
	);
	assert_eq!(err.message, "pipeline `p` has more than one depth output");

	let err = fails(
		"(sampler s (min GL_NEAREST) (mag GL_NEAREST))\n\
		 (format d GL_TEXTURE_2D GL_DEPTH_COMPONENT24 s)\n\
		 (texture a d (width 4) (height 4))\n\
		 (pipeline p (vs \"a\") (fs \"b\") (side a))",
		DiagnosticKind::Validation,
	);
	assert_eq!(err.message, "texture `a` does not have a format which can be bound as an image");

	let err = fails(
		"(pipeline c (cs \"a\"))\n(renderer r (draw c))",
		DiagnosticKind::Validation,
	);
	assert_eq!(err.message, "can't draw compute pipeline `c`");

	let err = fails(
		"(pipeline p (vs \"a\") (fs \"b\"))\n(renderer r (dispatch p 1 1 1))",
		DiagnosticKind::Validation,
	);
	assert_eq!(err.message, "can't dispatch raster pipeline `p`");

	let err = fails("(renderer r (next elsewhere))", DiagnosticKind::Validation);
	assert_eq!(err.message, "unknown renderer `elsewhere`");
}

#[test]
fn copies() {
	let err = fails("(pipeline p (vs \"a\") (fs \"b\") (copy p))", DiagnosticKind::Validation);
	assert_eq!(err.message, "a pipeline can't copy itself");

	let err = fails(
		"(pipeline a (vs \"a\") (fs \"b\") (copy b))\n(pipeline b (copy c))\n(pipeline c (copy a))",
		DiagnosticKind::Validation,
	);
	assert_eq!(err.message, "cyclic pipeline copies are not allowed");
	assert!(err.labels.iter().any(|l| l.message == "completing the cycle"));

	let err = fails("(pipeline a (vs \"a\") (fs \"b\") (copy ghost))", DiagnosticKind::Validation);
	assert_eq!(err.message, "unknown pipeline copy target `ghost`");
}

#[test]
fn copy_order() {
	let mut intern = Interner::new();
	let program = compile(
		&mut intern,
		"(pipeline child (copy parent) (fs \"child.frag\") (disable GL_BLEND))\n\
		 (pipeline parent (copy root) (enable GL_BLEND))\n\
		 (pipeline root (vs \"root.vert\") (fs \"root.frag\"))",
	)
	.unwrap();

	let child = &program.pipelines[&intern.get("child")];
	assert_eq!(intern.resolve(child.shaders[&ShaderStage::Vertex].name), "root.vert");
	assert_eq!(intern.resolve(child.shaders[&ShaderStage::Fragment].name), "child.frag");
	assert!(!child.flags[&intern.get("GL_BLEND")].enabled);

	let parent = &program.pipelines[&intern.get("parent")];
	assert_eq!(intern.resolve(parent.shaders[&ShaderStage::Fragment].name), "root.frag");
	assert!(parent.flags[&intern.get("GL_BLEND")].enabled);
}
