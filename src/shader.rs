//! Shader expansion, deduplication and linking.
//!
//! Every stage of every pipeline is expanded against that pipeline's
//! interface. Stages with identical expanded text are compiled once, and each
//! pipeline links the shared entries by index.

use std::{
	collections::HashMap,
	fmt::Write,
	hash::BuildHasher,
};

use aho_corasick::AhoCorasick;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
	ast::{Pipeline, Program},
	diagnostic::Diagnostic,
	layout::MemberType,
	resolve::inbuilt::ShaderStage,
	text::{Interner, Text},
};

/// Where shader text comes from. The compiler itself does no file I/O.
pub trait ShaderSource {
	fn load(&self, path: &str) -> Option<String>;
}

impl<S: BuildHasher> ShaderSource for HashMap<String, String, S> {
	fn load(&self, path: &str) -> Option<String> { self.get(path).cloned() }
}

/// Adapts a closure into a [`ShaderSource`].
pub struct FnSource<F>(pub F);

impl<F: Fn(&str) -> Option<String>> ShaderSource for FnSource<F> {
	fn load(&self, path: &str) -> Option<String> { (self.0)(path) }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ExpandedShader {
	pub stage: ShaderStage,
	pub source: String,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct LinkedProgram {
	pub pipeline: Text,
	/// Indices into [`ShaderLinks::shaders`].
	pub shaders: Vec<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct ShaderLinks {
	pub shaders: Vec<ExpandedShader>,
	pub programs: Vec<LinkedProgram>,
}

impl ShaderLinks {
	pub fn program(&self, pipeline: Text) -> Option<&LinkedProgram> { self.programs.iter().find(|p| p.pipeline == pipeline) }
}

const PLACEHOLDERS: [&str; 5] = ["「structs」", "「uniforms」", "「textures」", "「images」", "「targets」"];

/// Expand, deduplicate and link the shaders of every pipeline.
pub fn link(program: &Program, intern: &Interner, source: &dyn ShaderSource) -> Result<ShaderLinks, Diagnostic> {
	let placeholders = AhoCorasick::new(PLACEHOLDERS);
	let mut links = ShaderLinks::default();
	let mut seen: FxHashMap<ExpandedShader, usize> = FxHashMap::default();

	for pipeline in program.pipelines.values() {
		let interface = Interface::new(program, intern, pipeline);
		let mut shaders = Vec::with_capacity(pipeline.shaders.len());

		for (&stage, path) in pipeline.shaders.iter() {
			let text = source.load(intern.resolve(path.name)).ok_or_else(|| {
				path.span.error(format!("can't find shader `{}`", intern.resolve(path.name))) + path.span.marker()
			})?;
			let shader = ExpandedShader {
				stage,
				source: interface.expand(&placeholders, stage, &text),
			};

			let index = match seen.get(&shader) {
				Some(&index) => {
					log::trace!("`{}` reuses shader {}", intern.resolve(pipeline.name.name), index);
					index
				},
				None => {
					let index = links.shaders.len();
					seen.insert(shader.clone(), index);
					links.shaders.push(shader);
					index
				},
			};
			shaders.push(index);
		}

		links.programs.push(LinkedProgram {
			pipeline: pipeline.name.name,
			shaders,
		});
	}

	log::debug!(
		"linked {} programs from {} unique shaders",
		links.programs.len(),
		links.shaders.len()
	);
	Ok(links)
}

/// The declarations a pipeline's shaders see.
struct Interface {
	structs: String,
	uniforms: String,
	textures: String,
	images: String,
	targets: String,
}

impl Interface {
	fn new(program: &Program, intern: &Interner, pipeline: &Pipeline) -> Self {
		let mut structs = String::new();
		let mut declared = FxHashSet::default();
		let mut roots: Vec<Text> = pipeline.uses.iter().map(|s| s.name).collect();
		for uniform in pipeline.uniforms(program) {
			let buffer = &program.buffers[&uniform.name];
			if let Some(layout) = program.layout(buffer.ty.name) {
				roots.extend(layout.members.iter().filter_map(|m| match m.ty {
					MemberType::Struct(s) => Some(s),
					MemberType::Builtin(_) => None,
				}));
			}
		}
		for root in roots {
			declare_struct(program, intern, root, &mut declared, &mut structs);
		}

		let mut uniforms = String::new();
		for (binding, uniform) in pipeline.uniforms(program).enumerate() {
			let buffer = &program.buffers[&uniform.name];
			let _ = writeln!(
				uniforms,
				"layout(std140, binding = {})\nuniform {}\n{{\n{}}};",
				binding,
				intern.resolve(buffer.name.name),
				members(program, intern, buffer.ty.name)
			);
		}

		let mut textures = String::new();
		for (binding, input) in pipeline.textures(program).enumerate() {
			let texture = &program.textures[&input.name];
			let (prefix, suffix) = match texture.format(program) {
				Some(format) => (
					format.pixel_format(intern).map_or("", |f| f.glsl_prefix()),
					format.target(intern).map_or("2D", |t| t.glsl_suffix()),
				),
				None => ("", "2D"),
			};
			let _ = writeln!(
				textures,
				"layout(binding = {})\nuniform {}sampler{} {};",
				binding,
				prefix,
				suffix,
				intern.resolve(input.name)
			);
		}

		let mut images = String::new();
		for (unit, side) in pipeline.sideputs.iter().enumerate() {
			let format = program.textures.get(&side.name).and_then(|t| t.format(program));
			let pixel = format.and_then(|f| f.pixel_format(intern));
			let _ = writeln!(
				images,
				"layout({}, binding = {})\nuniform {}image{} {};",
				pixel.and_then(|p| p.image_qualifier()).unwrap_or("rgba8"),
				unit,
				pixel.map_or("", |p| p.glsl_prefix()),
				format.and_then(|f| f.target(intern)).map_or("2D", |t| t.glsl_suffix()),
				intern.resolve(side.name)
			);
		}

		let mut targets = String::new();
		if pipeline.uses_backbuffer(program, intern) {
			targets.push_str("layout(location = 0)\n out vec4 OutColor;\n");
		} else {
			for (location, output) in pipeline.color_targets(program, intern).enumerate() {
				let texture = &program.textures[&output.name];
				let name = texture.shadow.unwrap_or(output.name);
				let _ = writeln!(targets, "layout(location = {})\n out vec4 {};", location, intern.resolve(name));
			}
		}

		Self {
			structs,
			uniforms,
			textures,
			images,
			targets,
		}
	}

	fn expand(&self, placeholders: &AhoCorasick, stage: ShaderStage, text: &str) -> String {
		let targets = if stage == ShaderStage::Fragment { self.targets.as_str() } else { "" };

		if placeholders.is_match(text) {
			let with = [
				self.structs.as_str(),
				self.uniforms.as_str(),
				self.textures.as_str(),
				self.images.as_str(),
				targets,
			];
			return placeholders.replace_all(text, &with);
		}

		let block: String = [
			self.structs.as_str(),
			self.uniforms.as_str(),
			self.textures.as_str(),
			self.images.as_str(),
			targets,
		]
		.into_iter()
		.filter(|s| !s.is_empty())
		.collect::<Vec<_>>()
		.join("\n");

		// The interface goes after `#version`, which has to come first.
		match text.find("#version") {
			Some(start) => {
				let end = text[start..].find('\n').map_or(text.len(), |n| start + n + 1);
				let mut out = String::with_capacity(text.len() + block.len() + 1);
				out.push_str(&text[..end]);
				if !text[..end].ends_with('\n') {
					out.push('\n');
				}
				out.push_str(&block);
				out.push_str(&text[end..]);
				out
			},
			None => format!("{}{}", block, text),
		}
	}
}

fn members(program: &Program, intern: &Interner, name: Text) -> String {
	let mut out = String::new();
	if let Some(s) = program.structs.get(&name) {
		for member in s.members.iter() {
			let _ = write!(out, "\t{} {}", intern.resolve(member.ty.name), intern.resolve(member.name.name));
			if let Some(count) = member.array.and_then(|a| a.value.as_int()) {
				let _ = write!(out, "[{}]", count);
			}
			out.push_str(";\n");
		}
	}
	out
}

/// Declare `name` after every struct it contains.
fn declare_struct(program: &Program, intern: &Interner, name: Text, declared: &mut FxHashSet<Text>, out: &mut String) {
	if !declared.insert(name) {
		return;
	}

	if let Some(layout) = program.layout(name) {
		for member in layout.members.iter() {
			if let MemberType::Struct(nested) = member.ty {
				declare_struct(program, intern, nested, declared, out);
			}
		}
	}

	let _ = writeln!(out, "struct {}\n{{\n{}}};", intern.resolve(name), members(program, intern, name));
}
