use rendel::{
	ast::{Program, RendererEvent},
	compile_str,
	resolve::options::CompileOptions,
	text::Interner,
};

const RESOURCES: &str = r#"
(sampler linear (min GL_LINEAR) (mag GL_LINEAR))
(format color GL_TEXTURE_2D GL_RGBA16F linear)
(texture accum color (width ScreenWidth) (height ScreenHeight))
(texture scene color (width ScreenWidth) (height ScreenHeight))
"#;

fn compile(intern: &mut Interner, source: &str) -> Program {
	let source = format!("{}{}", RESOURCES, source);
	compile_str(intern, &source, "feedback", &CompileOptions::default()).unwrap()
}

/// Events as `(kind, subject)` pairs.
fn events(program: &Program, intern: &mut Interner, renderer: &str) -> Vec<(&'static str, String)> {
	let renderer = program.renderer(intern.get(renderer)).unwrap();
	renderer
		.events
		.iter()
		.map(|event| match event {
			RendererEvent::Update(r) => ("update", intern.resolve(r.name).to_string()),
			RendererEvent::Draw(p) => ("draw", intern.resolve(p.name).to_string()),
			RendererEvent::Dispatch { pipeline, .. } => ("dispatch", intern.resolve(pipeline.name).to_string()),
			RendererEvent::RegenFramebuffer(p) => ("regen", intern.resolve(p.name).to_string()),
			RendererEvent::SwapTextures { texture, shadow, .. } => (
				"swap",
				format!("{} {}", intern.resolve(*texture), intern.resolve(*shadow)),
			),
		})
		.collect()
}

#[test]
fn shadow_texture() {
	let mut intern = Interner::new();
	let program = compile(
		&mut intern,
		r#"(pipeline accumulate (vs "a.vert") (fs "a.frag") (in scene) (in accum) (out accum))"#,
	);

	let accum = intern.get("accum");
	let shadow = intern.get("accumTarget");
	assert_eq!(program.textures[&accum].shadow, Some(shadow));
	assert_eq!(program.textures[&shadow].shadow_of, Some(accum));
	assert!(program.textures[&shadow].is_synthetic());
	assert_eq!(program.textures[&shadow].format.name, intern.get("color"));

	let pipeline = &program.pipelines[&intern.get("accumulate")];
	assert_eq!(pipeline.requires_flip, vec![accum]);

	// Only the texture that is both read and written is shadowed.
	assert!(program.textures[&intern.get("scene")].shadow.is_none());
	assert_eq!(program.textures.len(), 3);
}

#[test]
fn shadow_name_collision() {
	let mut intern = Interner::new();
	let program = compile(
		&mut intern,
		r#"
		(texture accumTarget color (width 4) (height 4))
		(pipeline accumulate (vs "a.vert") (fs "a.frag") (in accum) (out accum))
		"#,
	);

	let accum = intern.get("accum");
	let shadow = intern.get("accumTarget1");
	assert_eq!(program.textures[&accum].shadow, Some(shadow));
	assert!(!program.textures[&intern.get("accumTarget")].is_synthetic());
}

#[test]
fn one_shadow_per_texture() {
	let mut intern = Interner::new();
	let program = compile(
		&mut intern,
		r#"
		(pipeline first (vs "a.vert") (fs "a.frag") (in accum) (out accum))
		(pipeline second (copy first))
		"#,
	);

	let accum = intern.get("accum");
	assert_eq!(program.textures.len(), 3);
	assert_eq!(program.pipelines[&intern.get("first")].requires_flip, vec![accum]);
	assert_eq!(program.pipelines[&intern.get("second")].requires_flip, vec![accum]);
}

#[test]
fn implicit_steps() {
	let mut intern = Interner::new();
	let program = compile(
		&mut intern,
		r#"
		(pipeline geometry (vs "g.vert") (fs "g.frag") (out scene))
		(pipeline accumulate (vs "a.vert") (fs "a.frag") (in scene) (in accum) (out accum))
		(pipeline clear (vs "c.vert") (fs "c.frag") (out accum))
		(pipeline present (vs "p.vert") (fs "p.frag") (in accum))
		(renderer main
			(draw geometry)
			(draw accumulate)
			(draw clear)
			(draw present))
		"#,
	);

	assert_eq!(
		events(&program, &mut intern, "main"),
		vec![
			("draw", "geometry".to_string()),
			("regen", "accumulate".to_string()),
			("draw", "accumulate".to_string()),
			("swap", "accum accumTarget".to_string()),
			("regen", "clear".to_string()),
			("draw", "clear".to_string()),
			("draw", "present".to_string()),
		]
	);
}

#[test]
fn no_feedback_no_steps() {
	let mut intern = Interner::new();
	let program = compile(
		&mut intern,
		r#"
		(pipeline geometry (vs "g.vert") (fs "g.frag") (out scene))
		(renderer main (update accum) (draw geometry))
		"#,
	);

	assert_eq!(program.textures.len(), 2);
	assert_eq!(
		events(&program, &mut intern, "main"),
		vec![("update", "accum".to_string()), ("draw", "geometry".to_string())]
	);
}

#[test]
fn end_to_end() {
	let source = r#"
		(sampler linear (min GL_LINEAR) (mag GL_LINEAR))
		(format color GL_TEXTURE_2D GL_RGBA8 linear)
		(texture history color (width 640) (height 480))
		(struct Frame (float time) (vec2 jitter))
		(buffer frame Frame)
		(pipeline blend (vs "blend.vert") (fs "blend.frag") (in frame) (in history) (out history))
		(renderer main (draw blend))
	"#;

	let mut intern = Interner::new();
	let program = compile_str(&mut intern, source, "feedback", &CompileOptions::default()).unwrap();

	let history = intern.get("history");
	let shadow = intern.get("historyTarget");
	assert_eq!(program.textures.len(), 2);
	assert_eq!(program.textures[&history].shadow, Some(shadow));
	assert_eq!(program.textures[&shadow].shadow_of, Some(history));

	let blend = &program.pipelines[&intern.get("blend")];
	assert_eq!(blend.uniforms(&program).count(), 1);
	assert_eq!(blend.requires_flip, vec![history]);
	assert!(program.layout(intern.get("Frame")).is_some());

	assert_eq!(program.renderers.len(), 1);
	assert_eq!(
		events(&program, &mut intern, "main"),
		vec![
			("regen", "blend".to_string()),
			("draw", "blend".to_string()),
			("swap", "history historyTarget".to_string()),
		]
	);
}
