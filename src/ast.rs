//! The typed program graph.
//!
//! Every entity is owned by [`Program`] in a declaration-ordered map, and
//! refers to other entities only by name. Anything that needs to follow a
//! reference takes the `Program` explicitly.

use std::hash::BuildHasherDefault;

use indexmap::IndexMap;
use rustc_hash::FxHasher;

use crate::{
	arith::{Expr, Number},
	diagnostic::Span,
	layout::StructLayout,
	resolve::inbuilt::{PixelFormat, ShaderStage, TextureTarget},
	text::{Interner, Text},
};

pub type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Ident {
	pub name: Text,
	pub span: Span,
}

/// A top-level form, as produced by the grammar.
#[derive(Clone, Debug)]
pub enum Decl {
	UserVar(UserVar),
	Struct(Struct),
	Buffer(Buffer),
	Format(Format),
	Sampler(Sampler),
	Texture(Texture),
	Pipeline(Pipeline),
	Renderer(Renderer),
}

impl Decl {
	pub fn name(&self) -> Ident {
		match self {
			Decl::UserVar(x) => x.name,
			Decl::Struct(x) => x.name,
			Decl::Buffer(x) => x.name,
			Decl::Format(x) => x.name,
			Decl::Sampler(x) => x.name,
			Decl::Texture(x) => x.name,
			Decl::Pipeline(x) => x.name,
			Decl::Renderer(x) => x.name,
		}
	}

	pub fn span(&self) -> Span {
		match self {
			Decl::UserVar(x) => x.span,
			Decl::Struct(x) => x.span,
			Decl::Buffer(x) => x.span,
			Decl::Format(x) => x.span,
			Decl::Sampler(x) => x.span,
			Decl::Texture(x) => x.span,
			Decl::Pipeline(x) => x.span,
			Decl::Renderer(x) => x.span,
		}
	}
}

/// A run-time adjustable scalar usable in expressions.
#[derive(Clone, Debug)]
pub struct UserVar {
	pub ctype: Ident,
	pub name: Ident,
	pub value: Expr,
	pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Struct {
	pub name: Ident,
	pub members: Vec<StructMember>,
	pub span: Span,
}

#[derive(Clone, Debug)]
pub struct StructMember {
	pub ty: Ident,
	pub name: Ident,
	pub array: Option<ArraySize>,
	pub span: Span,
}

#[derive(Copy, Clone, Debug)]
pub struct ArraySize {
	pub value: Number,
	pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Buffer {
	pub name: Ident,
	pub ty: Ident,
	pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Format {
	pub name: Ident,
	pub target: Ident,
	pub format: Ident,
	pub sampler: Ident,
	pub span: Span,
}

impl Format {
	pub fn sampler<'a>(&self, program: &'a Program) -> Option<&'a Sampler> { program.samplers.get(&self.sampler.name) }

	pub fn target(&self, intern: &Interner) -> Option<TextureTarget> {
		intern.resolve(self.target.name).parse().ok()
	}

	pub fn pixel_format(&self, intern: &Interner) -> Option<PixelFormat> {
		intern.resolve(self.format.name).parse().ok()
	}
}

#[derive(Clone, Debug)]
pub struct Sampler {
	pub name: Ident,
	pub min: Option<Ident>,
	pub mag: Option<Ident>,
	pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Texture {
	pub name: Ident,
	pub format: Ident,
	pub src: Option<Ident>,
	pub clear: Option<[Number; 4]>,
	pub width: Option<Expr>,
	pub height: Option<Expr>,
	pub depth: Option<Expr>,
	/// The synthesized texture this one swaps storage with after a feedback draw.
	pub shadow: Option<Text>,
	/// Set on synthesized textures: the texture they shadow.
	pub shadow_of: Option<Text>,
	pub span: Span,
}

impl Texture {
	pub fn format<'a>(&self, program: &'a Program) -> Option<&'a Format> { program.formats.get(&self.format.name) }

	pub fn is_synthetic(&self) -> bool { self.shadow_of.is_some() }

	pub fn has_dimensions(&self) -> bool { self.width.is_some() || self.height.is_some() || self.depth.is_some() }
}

#[derive(Clone, Debug)]
pub enum PipelineItem {
	Shader(ShaderStage, Ident),
	Use(Ident),
	Flag(Flag),
	Copy(Ident),
	Input(Ident),
	Output(Ident),
	Sideput(Ident),
}

#[derive(Copy, Clone, Debug)]
pub struct Flag {
	pub capability: Ident,
	pub enabled: bool,
}

#[derive(Clone, Debug)]
pub struct Pipeline {
	pub name: Ident,
	/// Declared items, in order. After rewrite, items spliced in by `copy`
	/// come before the pipeline's own.
	pub items: Vec<PipelineItem>,
	pub span: Span,

	pub shaders: FxIndexMap<ShaderStage, Ident>,
	pub uses: Vec<Ident>,
	pub flags: FxIndexMap<Text, Flag>,
	pub copies: Vec<Ident>,
	pub inputs: Vec<Ident>,
	pub outputs: Vec<Ident>,
	pub sideputs: Vec<Ident>,
	/// Outputs that are also read by this pipeline, and swap with their shadow after each draw.
	pub requires_flip: Vec<Text>,
}

impl Pipeline {
	pub fn new(name: Ident, items: Vec<PipelineItem>, span: Span) -> Self {
		let mut this = Self {
			name,
			items,
			span,
			shaders: FxIndexMap::default(),
			uses: Vec::new(),
			flags: FxIndexMap::default(),
			copies: Vec::new(),
			inputs: Vec::new(),
			outputs: Vec::new(),
			sideputs: Vec::new(),
			requires_flip: Vec::new(),
		};
		this.populate();
		this
	}

	/// Sort `items` into the typed slots. The last item of a keyed kind wins.
	pub fn populate(&mut self) {
		self.shaders.clear();
		self.uses.clear();
		self.flags.clear();
		self.copies.clear();
		self.inputs.clear();
		self.outputs.clear();
		self.sideputs.clear();

		for item in self.items.iter() {
			match *item {
				PipelineItem::Shader(stage, path) => {
					self.shaders.insert(stage, path);
				},
				PipelineItem::Use(s) => self.uses.push(s),
				PipelineItem::Flag(flag) => {
					self.flags.insert(flag.capability.name, flag);
				},
				PipelineItem::Copy(p) => self.copies.push(p),
				PipelineItem::Input(r) => self.inputs.push(r),
				PipelineItem::Output(r) => self.outputs.push(r),
				PipelineItem::Sideput(r) => self.sideputs.push(r),
			}
		}
	}

	pub fn is_compute(&self) -> bool { self.shaders.contains_key(&ShaderStage::Compute) }

	/// Inputs backed by a buffer, in binding order.
	pub fn uniforms<'a>(&'a self, program: &'a Program) -> impl Iterator<Item = Ident> + 'a {
		self.inputs
			.iter()
			.copied()
			.filter(|i| program.buffers.contains_key(&i.name))
	}

	/// Inputs backed by a texture, in binding order.
	pub fn textures<'a>(&'a self, program: &'a Program) -> impl Iterator<Item = Ident> + 'a {
		self.inputs
			.iter()
			.copied()
			.filter(|i| program.textures.contains_key(&i.name))
	}

	pub fn color_targets<'a>(&'a self, program: &'a Program, intern: &'a Interner) -> impl Iterator<Item = Ident> + 'a {
		self.outputs
			.iter()
			.copied()
			.filter(|o| program.output_format(o.name, intern).map_or(false, |f| f.is_color()))
	}

	pub fn depth_targets<'a>(&'a self, program: &'a Program, intern: &'a Interner) -> impl Iterator<Item = Ident> + 'a {
		self.outputs
			.iter()
			.copied()
			.filter(|o| program.output_format(o.name, intern).map_or(false, |f| f.is_depth()))
	}

	pub fn depth_target(&self, program: &Program, intern: &Interner) -> Option<Ident> {
		let mut targets = self.depth_targets(program, intern);
		match (targets.next(), targets.next()) {
			(Some(t), None) => Some(t),
			_ => None,
		}
	}

	pub fn uses_backbuffer(&self, program: &Program, intern: &Interner) -> bool {
		self.depth_target(program, intern).is_none() && self.color_targets(program, intern).next().is_none()
	}

	pub fn any_output_double_buffered(&self, program: &Program) -> bool {
		self.outputs.iter().any(|o| {
			program
				.textures
				.get(&o.name)
				.map_or(false, |t| t.shadow.is_some())
		})
	}

	/// Every texture this pipeline may render into, shadows included.
	pub fn all_target_textures(&self, program: &Program) -> Vec<Text> {
		let explicit = self.outputs.iter().map(|o| o.name);
		let shadows = self
			.outputs
			.iter()
			.filter_map(|o| program.textures.get(&o.name).and_then(|t| t.shadow));
		explicit.chain(shadows).collect()
	}
}

#[derive(Clone, Debug)]
pub enum RendererItem {
	Event(RendererEvent),
	Next(Ident),
}

#[derive(Clone, Debug)]
pub enum RendererEvent {
	Update(Ident),
	Draw(Ident),
	Dispatch { pipeline: Ident, size: [Expr; 3] },
	/// Refresh the framebuffer attachments of the pipeline before it draws.
	RegenFramebuffer(Ident),
	/// Exchange which storage `texture` and `shadow` refer to.
	SwapTextures { texture: Text, shadow: Text, span: Span },
}

#[derive(Clone, Debug)]
pub struct Renderer {
	pub name: Ident,
	pub events: Vec<RendererEvent>,
	pub next: Option<Ident>,
	pub span: Span,
}

impl Renderer {
	pub fn new(name: Ident, items: Vec<RendererItem>, span: Span) -> Self {
		let mut events = Vec::new();
		let mut next = None;
		for item in items {
			match item {
				RendererItem::Event(e) => events.push(e),
				RendererItem::Next(n) => next = Some(n),
			}
		}

		Self {
			name,
			events,
			next,
			span,
		}
	}
}

/// The root of the program graph.
#[derive(Clone, Debug, Default)]
pub struct Program {
	pub user_vars: FxIndexMap<Text, UserVar>,
	pub structs: FxIndexMap<Text, Struct>,
	pub buffers: FxIndexMap<Text, Buffer>,
	pub formats: FxIndexMap<Text, Format>,
	pub samplers: FxIndexMap<Text, Sampler>,
	pub textures: FxIndexMap<Text, Texture>,
	pub pipelines: FxIndexMap<Text, Pipeline>,
	pub renderers: Vec<Renderer>,
	/// Layouts of every struct, filled in after validation.
	pub layouts: FxIndexMap<Text, StructLayout>,
}

impl Program {
	pub fn struct_handle(&self, name: Text) -> Option<usize> { self.structs.get_index_of(&name) }

	pub fn buffer_handle(&self, name: Text) -> Option<usize> { self.buffers.get_index_of(&name) }

	pub fn format_handle(&self, name: Text) -> Option<usize> { self.formats.get_index_of(&name) }

	pub fn sampler_handle(&self, name: Text) -> Option<usize> { self.samplers.get_index_of(&name) }

	pub fn texture_handle(&self, name: Text) -> Option<usize> { self.textures.get_index_of(&name) }

	pub fn pipeline_handle(&self, name: Text) -> Option<usize> { self.pipelines.get_index_of(&name) }

	pub fn renderer(&self, name: Text) -> Option<&Renderer> { self.renderers.iter().find(|r| r.name.name == name) }

	pub fn layout(&self, name: Text) -> Option<&StructLayout> { self.layouts.get(&name) }

	/// The pixel format of the texture `name`, if both exist and the format is known.
	pub fn output_format(&self, name: Text, intern: &Interner) -> Option<PixelFormat> {
		self.textures
			.get(&name)?
			.format(self)?
			.pixel_format(intern)
	}

	/// Textures rendered to by any pipeline that doesn't draw to the back buffer.
	pub fn all_target_textures(&self, intern: &Interner) -> Vec<Text> {
		let mut names: Vec<_> = self
			.pipelines
			.values()
			.filter(|p| !p.uses_backbuffer(self, intern))
			.flat_map(|p| p.all_target_textures(self))
			.collect();
		names.sort_by_key(|&t| self.texture_handle(t));
		names.dedup();
		names
	}
}
