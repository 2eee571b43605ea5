use rendel::{
	ast::Program,
	compile_str,
	diagnostic::DiagnosticKind,
	layout::{MemberType, ReflowCopy, StructLayout},
	resolve::{inbuilt::BuiltinType, options::CompileOptions},
	text::Interner,
};

fn compile(intern: &mut Interner, source: &str) -> Program {
	compile_str(intern, source, "layout", &CompileOptions::default()).unwrap()
}

fn layout<'a>(program: &'a Program, intern: &mut Interner, name: &str) -> &'a StructLayout {
	program.layout(intern.get(name)).unwrap()
}

fn reflow(layout: &StructLayout) -> Vec<(&str, u32)> { layout.reflow.iter().map(|c| (c.field.as_str(), c.offset)).collect() }

#[test]
fn vector_then_scalar() {
	let mut intern = Interner::new();
	let program = compile(&mut intern, "(struct S (vec3 a) (float b))");
	let s = layout(&program, &mut intern, "S");

	let b = s.member(intern.get("b")).unwrap();
	assert_eq!(b.offset, 3);
	assert_eq!(s.words, 4);
	assert_eq!(s.bytes(), 16);
	assert_eq!(s.alignment, 4);
}

#[test]
fn scalar_then_vector() {
	let mut intern = Interner::new();
	let program = compile(&mut intern, "(struct S (float a) (vec2 b) (float c) (vec4 d))");
	let s = layout(&program, &mut intern, "S");

	let offsets: Vec<u32> = s.members.iter().map(|m| m.offset).collect();
	assert_eq!(offsets, vec![0, 2, 4, 8]);
	assert_eq!(s.bytes(), 48);
}

#[test]
fn nested_struct() {
	let mut intern = Interner::new();
	let program = compile(
		&mut intern,
		"(struct Outer (float a) (Inner inner) (float b))\n(struct Inner (float x))",
	);
	let outer = layout(&program, &mut intern, "Outer");

	let inner = outer.member(intern.get("inner")).unwrap();
	assert_eq!(inner.ty, MemberType::Struct(intern.get("Inner")));
	assert_eq!(inner.offset, 4);
	assert_eq!(inner.words, 4);
	assert_eq!(outer.member(intern.get("b")).unwrap().offset, 8);
	assert_eq!(outer.bytes(), 48);

	assert_eq!(reflow(outer), vec![("a", 0), ("inner.x", 16), ("b", 32)]);
}

#[test]
fn arrays() {
	let mut intern = Interner::new();
	let program = compile(&mut intern, "(struct A (float f) (array vec2 v 3))");
	let a = layout(&program, &mut intern, "A");

	let v = a.member(intern.get("v")).unwrap();
	assert_eq!(v.array, Some(3));
	assert_eq!(v.offset, 4);
	assert_eq!(v.words, 12);
	assert_eq!(a.bytes(), 64);

	assert_eq!(reflow(a), vec![("f", 0), ("v[0]", 16), ("v[1]", 32), ("v[2]", 48)]);
}

#[test]
fn arrays_of_structs() {
	let mut intern = Interner::new();
	let program = compile(
		&mut intern,
		"(struct Light (vec3 color) (float power))\n(struct Lights (int count) (array Light items 2))",
	);
	let lights = layout(&program, &mut intern, "Lights");

	assert_eq!(lights.bytes(), 48);
	assert_eq!(
		reflow(lights),
		vec![
			("count", 0),
			("items[0].color", 16),
			("items[0].power", 28),
			("items[1].color", 32),
			("items[1].power", 44),
		]
	);
}

#[test]
fn matrices() {
	let mut intern = Interner::new();
	let program = compile(&mut intern, "(struct M (float scale) (mat3 m))");
	let m = layout(&program, &mut intern, "M");

	let member = m.member(intern.get("m")).unwrap();
	assert_eq!(member.ty, MemberType::Builtin(BuiltinType::Mat3));
	assert_eq!(member.offset, 4);
	assert_eq!(member.words, 12);
	assert_eq!(m.bytes(), 64);

	let columns: Vec<&ReflowCopy> = m.reflow.iter().skip(1).collect();
	assert_eq!(columns.len(), 3);
	for (i, column) in columns.iter().enumerate() {
		assert_eq!(column.ty, BuiltinType::Vec3);
		assert_eq!(column.field, format!("m[{}]", i));
		assert_eq!(column.offset, 16 + 16 * i as u32);
	}
}

#[test]
fn every_struct_is_laid_out() {
	let mut intern = Interner::new();
	let program = compile(&mut intern, "(struct A (float x))\n(struct B (A a) (mat4 m))");
	assert_eq!(program.layouts.len(), 2);

	let b = layout(&program, &mut intern, "B");
	assert_eq!(b.words, 4 + 16);
}

#[test]
fn size_limit() {
	let mut intern = Interner::new();
	let program = compile(&mut intern, "(struct S (array vec4 a 4096))");
	assert_eq!(layout(&program, &mut intern, "S").bytes(), 65536);

	for source in [
		"(struct S (array vec4 a 4096) (float b))",
		"(struct Big (array vec4 a 4096))\n(struct S (array Big items 65536))",
	] {
		let mut intern = Interner::new();
		let err = compile_str(&mut intern, source, "layout", &CompileOptions::default()).unwrap_err();
		assert!(err.is(DiagnosticKind::Validation));
		assert_eq!(err.message, "struct `S` is too large");
		assert_eq!(err.notes, vec!["structs can be at most 65536 bytes".to_string()]);
	}
}

#[test]
fn containment_cycle() {
	let mut intern = Interner::new();
	let err = compile_str(
		&mut intern,
		"(struct A (B b))\n(struct B (A a))",
		"layout",
		&CompileOptions::default(),
	)
	.unwrap_err();

	assert!(err.is(DiagnosticKind::Validation));
	assert_eq!(err.message, "struct `A` contains itself");
	assert!(err.labels.iter().any(|l| l.message == "completing the cycle"));
}
