//! Referential and domain checks over the rewritten program.
//!
//! Nothing here mutates the program. The first violation is returned.

use aho_corasick::AhoCorasick;
use rustc_hash::FxHashSet;

use crate::{
	arith::Expr,
	ast::*,
	diagnostic::Diagnostic,
	resolve::{
		inbuilt::{reserved_matcher, BuiltinType, CType, Capability, Filter, Matcher, PixelFormat, ShaderStage, TextureTarget},
		options::CompileOptions,
	},
	text::{Interner, Text},
};

type Result = std::result::Result<(), Diagnostic>;

const MAX_ARRAY_SIZE: i64 = 65536;

/// The closed tables, keyed by interned name.
pub struct Tables {
	pub builtin: Matcher<BuiltinType>,
	pub ctype: Matcher<CType>,
	pub target: Matcher<TextureTarget>,
	pub format: Matcher<PixelFormat>,
	pub filter: Matcher<Filter>,
	pub capability: Matcher<Capability>,
	reserved: AhoCorasick,
}

impl Tables {
	pub fn new(intern: &mut Interner) -> Self {
		Self {
			builtin: Matcher::new(intern),
			ctype: Matcher::new(intern),
			target: Matcher::new(intern),
			format: Matcher::new(intern),
			filter: Matcher::new(intern),
			capability: Matcher::new(intern),
			reserved: reserved_matcher(),
		}
	}
}

pub fn validate(program: &Program, intern: &Interner, tables: &Tables, options: &CompileOptions) -> Result {
	let validator = Validator {
		program,
		intern,
		tables,
		options,
	};

	for var in program.user_vars.values() {
		validator.user_var(var)?;
	}
	for s in program.structs.values() {
		validator.struct_(s)?;
	}
	for sampler in program.samplers.values() {
		validator.sampler(sampler)?;
	}
	for format in program.formats.values() {
		validator.format(format)?;
	}
	for texture in program.textures.values() {
		validator.texture(texture)?;
	}
	for buffer in program.buffers.values() {
		validator.buffer(buffer)?;
	}
	for pipeline in program.pipelines.values() {
		validator.pipeline(pipeline)?;
	}
	for renderer in program.renderers.iter() {
		validator.renderer(renderer)?;
	}

	log::debug!("validated program");
	Ok(())
}

struct Validator<'a> {
	program: &'a Program,
	intern: &'a Interner,
	tables: &'a Tables,
	options: &'a CompileOptions,
}

impl Validator<'_> {
	fn name(&self, text: Text) -> &str { self.intern.resolve(text) }

	fn verify_ident(&self, ident: Ident) -> Result {
		let text = self.name(ident.name);
		if let Some(m) = self.tables.reserved.find(text) {
			if m.end() == text.len() {
				return Err(ident.span.error(format!("usage of reserved identifier `{}`", text)) + ident.span.marker());
			}
		}
		Ok(())
	}

	/// Residual expressions may only refer to run-time and user variables.
	fn expr(&self, expr: &Expr) -> Result {
		let mut unknown = None;
		expr.visit_vars(&mut |var| {
			if unknown.is_none()
				&& !self.program.user_vars.contains_key(&var.name)
				&& !self.options.is_runtime_var(self.name(var.name))
			{
				unknown = Some(var);
			}
		});

		match unknown {
			Some(var) => Err(var.span.error(format!("unknown variable `{}`", self.name(var.name))) + var.span.marker()),
			None => Ok(()),
		}
	}

	fn user_var(&self, var: &UserVar) -> Result {
		self.verify_ident(var.name)?;
		if self.tables.ctype.get(var.ctype.name).is_none() {
			return Err(var.ctype.span.error(format!("invalid scalar ctype `{}`", self.name(var.ctype.name)))
				+ var.ctype.span.marker()
				+ "expected one of `float`, `double`, `int` or `bool`");
		}
		self.expr(&var.value)
	}

	fn struct_(&self, s: &Struct) -> Result {
		let name = self.name(s.name.name);
		if self.tables.builtin.get(s.name.name).is_some() {
			return Err(s.name.span.error(format!("struct cannot be named after built in type `{}`", name))
				+ s.name.span.marker());
		}
		self.verify_ident(s.name)?;

		let mut seen: FxHashSet<Text> = FxHashSet::default();
		for member in s.members.iter() {
			self.verify_ident(member.name)?;
			if !seen.insert(member.name.name) {
				return Err(member.name.span.error(format!(
					"struct `{}` contains more than one member named `{}`",
					name,
					self.name(member.name.name)
				)) + member.name.span.marker());
			}

			if member.ty.name == s.name.name {
				return Err(member.ty.span.error("struct members can't use the type of the struct they belong to")
					+ member.ty.span.marker()
					+ s.name.span.label("struct declared here"));
			}
			if self.tables.builtin.get(member.ty.name).is_none() && !self.program.structs.contains_key(&member.ty.name)
			{
				return Err(member.ty.span.error(format!("undefined type `{}`", self.name(member.ty.name)))
					+ member.ty.span.marker());
			}

			if let Some(size) = member.array {
				match size.value.as_int() {
					Some(n) if n > MAX_ARRAY_SIZE => {
						return Err(size.span.error(format!("array size can't be more than {}", MAX_ARRAY_SIZE))
							+ size.span.marker());
					},
					Some(n) if n >= 1 => {},
					Some(_) => {
						return Err(size.span.error("array size can't be less than 1") + size.span.marker());
					},
					None => return Err(size.span.error("array size must be an integer") + size.span.marker()),
				}
			}
		}

		Ok(())
	}

	fn filter(&self, filter: Ident) -> std::result::Result<Filter, Diagnostic> {
		self.tables.filter.get(filter.name).ok_or_else(|| {
			filter
				.span
				.error(format!("unsupported sampler filter `{}`", self.name(filter.name)))
				+ filter.span.marker()
		})
	}

	fn sampler(&self, sampler: &Sampler) -> Result {
		let name = self.name(sampler.name.name);
		let min = sampler.min.ok_or_else(|| {
			sampler.span.error(format!("sampler `{}` must specify its `min` filter", name)) + sampler.name.span.marker()
		})?;
		let mag = sampler.mag.ok_or_else(|| {
			sampler.span.error(format!("sampler `{}` must specify its `mag` filter", name)) + sampler.name.span.marker()
		})?;

		self.filter(min)?;
		if self.filter(mag)?.is_mipmap() {
			return Err(mag.span.error("magnification filters can't use mipmaps")
				+ mag.span.marker()
				+ "use `GL_NEAREST` or `GL_LINEAR`");
		}

		Ok(())
	}

	fn format(&self, format: &Format) -> Result {
		if let Some(s) = self.program.structs.get(&format.name.name) {
			return Err(format.name.span.error(format!(
				"there cannot be a format named `{}`, because there is already a struct of the same name",
				self.name(format.name.name)
			)) + s.name.span.label("struct declared here"));
		}

		let target = self.tables.target.get(format.target.name).ok_or_else(|| {
			format
				.target
				.span
				.error(format!("unsupported texture target `{}`", self.name(format.target.name)))
				+ format.target.span.marker()
		})?;
		let pixel = self.tables.format.get(format.format.name).ok_or_else(|| {
			format
				.format
				.span
				.error(format!("unsupported texture format `{}`", self.name(format.format.name)))
				+ format.format.span.marker()
		})?;
		let sampler = format.sampler(self.program).ok_or_else(|| {
			format
				.sampler
				.span
				.error(format!("unknown sampler `{}`", self.name(format.sampler.name)))
				+ format.sampler.span.marker()
		})?;

		if pixel.is_depth() && !matches!(target, TextureTarget::Texture2D | TextureTarget::CubeMap) {
			return Err(format.target.span.error(format!("depth format `{}` requires a 2D or cube map target", pixel))
				+ format.target.span.marker()
				+ format.format.span.label("depth format"));
		}

		if pixel.is_integer() {
			let filters = sampler.min.iter().chain(sampler.mag.iter());
			for filter in filters {
				if self.tables.filter.get(filter.name) != Some(Filter::Nearest) {
					return Err(format.sampler.span.error(format!("integer format `{}` can only be sampled with `GL_NEAREST`", pixel))
						+ format.sampler.span.marker()
						+ filter.span.label("filter declared here"));
				}
			}
		}

		Ok(())
	}

	fn texture(&self, texture: &Texture) -> Result {
		let name = self.name(texture.name.name);
		if let Some(sampler) = self.program.samplers.get(&texture.name.name) {
			return Err(texture.name.span.error(format!("texture `{}` has the same name as a sampler", name))
				+ texture.name.span.marker()
				+ sampler.name.span.label("sampler declared here"));
		}
		if let Some(buffer) = self.program.buffers.get(&texture.name.name) {
			return Err(texture.name.span.error(format!("texture `{}` has the same name as a buffer", name))
				+ texture.name.span.marker()
				+ buffer.name.span.label("buffer declared here"));
		}
		if !texture.is_synthetic() {
			self.verify_ident(texture.name)?;
		}

		let format = texture.format(self.program).ok_or_else(|| {
			texture
				.format
				.span
				.error(format!("unknown format `{}`", self.name(texture.format.name)))
				+ texture.format.span.marker()
		})?;
		// The format itself is already validated.
		let target = self.tables.target.get(format.target.name);
		let pixel = self.tables.format.get(format.format.name);

		if let Some(src) = texture.src {
			if texture.has_dimensions() {
				return Err(texture.span.error(format!(
					"texture `{}` can't have both an image source and explicit dimensions",
					name
				)) + src.span.label("image source"));
			}
			if target == Some(TextureTarget::Texture3D) {
				return Err(src.span.error("3D textures can't be loaded from an image") + src.span.marker());
			}
			if let Some(pixel) = pixel {
				if !pixel.loadable() {
					return Err(src.span.error(format!("images can't be loaded into format `{}`", pixel))
						+ src.span.marker()
						+ "use `GL_RGBA8` or `GL_SRGB8_ALPHA8`");
				}
			}
			return Ok(());
		}

		let missing = |what: &str| -> Result {
			Err(texture.span.error(format!("texture `{}` is missing its {}", name, what)) + texture.name.span.marker())
		};
		let unexpected = |what: &str, expr: &Expr| -> Result {
			let span = match expr {
				Expr::Call(call) => call.span,
				Expr::Var(v) => v.span,
				Expr::Number(_) => texture.span,
			};
			Err(span.error(format!("{} textures can't have a {}", self.name(format.target.name), what)) + span.marker())
		};

		match target {
			Some(TextureTarget::Texture1D) => {
				if texture.width.is_none() {
					return missing("width");
				}
				if let Some(h) = &texture.height {
					return unexpected("height", h);
				}
				if let Some(d) = &texture.depth {
					return unexpected("depth", d);
				}
			},
			Some(TextureTarget::Texture2D) | Some(TextureTarget::CubeMap) => {
				if texture.width.is_none() {
					return missing("width");
				}
				if texture.height.is_none() {
					return missing("height");
				}
				if let Some(d) = &texture.depth {
					return unexpected("depth", d);
				}
			},
			Some(TextureTarget::Texture3D) => {
				if texture.width.is_none() {
					return missing("width");
				}
				if texture.height.is_none() {
					return missing("height");
				}
				if texture.depth.is_none() {
					return missing("depth");
				}
			},
			None => {},
		}

		for expr in [&texture.width, &texture.height, &texture.depth].into_iter().flatten() {
			self.expr(expr)?;
		}

		Ok(())
	}

	fn buffer(&self, buffer: &Buffer) -> Result {
		if let Some(sampler) = self.program.samplers.get(&buffer.name.name) {
			return Err(buffer.name.span.error(format!(
				"buffer `{}` has the same name as a sampler",
				self.name(buffer.name.name)
			)) + buffer.name.span.marker()
				+ sampler.name.span.label("sampler declared here"));
		}
		self.verify_ident(buffer.name)?;

		if !self.program.structs.contains_key(&buffer.ty.name) {
			return Err(buffer.ty.span.error(format!("undefined struct `{}`", self.name(buffer.ty.name)))
				+ buffer.ty.span.marker());
		}

		Ok(())
	}

	fn pipeline(&self, pipeline: &Pipeline) -> Result {
		let name = self.name(pipeline.name.name);

		for copy in pipeline.copies.iter() {
			if !self.program.pipelines.contains_key(&copy.name) {
				return Err(copy.span.error(format!("unknown pipeline copy target `{}`", self.name(copy.name)))
					+ copy.span.marker());
			}
		}

		for s in pipeline.uses.iter() {
			if !self.program.structs.contains_key(&s.name) {
				return Err(s.span.error(format!("undefined struct `{}`", self.name(s.name))) + s.span.marker());
			}
		}

		if let Some(cs) = pipeline.shaders.get(&ShaderStage::Compute) {
			if let Some((_, other)) = pipeline.shaders.iter().find(|&(&stage, _)| stage != ShaderStage::Compute) {
				return Err(other.span.error("compute pipelines can't use non-compute shaders")
					+ other.span.marker()
					+ cs.span.label("compute shader declared here"));
			}
			if let Some(output) = pipeline.outputs.first() {
				return Err(output.span.error("compute pipelines can't output to render targets")
					+ output.span.marker()
					+ cs.span.label("compute shader declared here"));
			}
		} else if pipeline.shaders.is_empty() {
			return Err(pipeline.name.span.error(format!("pipeline `{}` has no shaders", name)) + pipeline.name.span.marker());
		} else {
			for stage in [ShaderStage::Vertex, ShaderStage::Fragment] {
				if !pipeline.shaders.contains_key(&stage) {
					return Err(pipeline.name.span.error(format!("pipeline `{}` is missing a `{}` shader", name, stage))
						+ pipeline.name.span.marker());
				}
			}
		}

		for input in pipeline.inputs.iter() {
			if !self.program.textures.contains_key(&input.name) && !self.program.buffers.contains_key(&input.name) {
				return Err(input.span.error(format!(
					"unable to determine input type for resource `{}` on pipeline `{}`",
					self.name(input.name),
					name
				)) + input.span.marker()
					+ "inputs must name a texture or a buffer");
			}
		}

		let mut depth = None;
		for output in pipeline.outputs.iter() {
			if !self.program.textures.contains_key(&output.name) {
				return Err(output.span.error(format!("can't find texture `{}`", self.name(output.name))) + output.span.marker());
			}
			let pixel = self.program.output_format(output.name, self.intern).ok_or_else(|| {
				output.span.error(format!(
					"output texture `{}` does not have a format which is valid for use as a render target",
					self.name(output.name)
				)) + output.span.marker()
			})?;
			if pixel.is_depth() {
				if let Some(prev) = depth.replace(*output) {
					return Err(output.span.error(format!("pipeline `{}` has more than one depth output", name))
						+ output.span.marker()
						+ prev.span.label("first depth output")
						+ "pipelines can have only one depth output");
				}
			}
		}

		for side in pipeline.sideputs.iter() {
			if !self.program.textures.contains_key(&side.name) {
				return Err(side.span.error(format!("can't find texture `{}`", self.name(side.name))) + side.span.marker());
			}
			let pixel = self.program.output_format(side.name, self.intern);
			if pixel.and_then(|p| p.image_qualifier()).is_none() {
				return Err(side.span.error(format!(
					"texture `{}` does not have a format which can be bound as an image",
					self.name(side.name)
				)) + side.span.marker());
			}
		}

		for flag in pipeline.flags.values() {
			if self.tables.capability.get(flag.capability.name).is_none() {
				return Err(flag.capability.span.error(format!(
					"unsupported capability `{}`",
					self.name(flag.capability.name)
				)) + flag.capability.span.marker());
			}
		}

		Ok(())
	}

	fn renderer(&self, renderer: &Renderer) -> Result {
		for event in renderer.events.iter() {
			match event {
				RendererEvent::Update(resource) => {
					if !self.program.textures.contains_key(&resource.name) && !self.program.buffers.contains_key(&resource.name)
					{
						return Err(resource.span.error(format!(
							"can't update `{}`, which is neither a texture nor a buffer",
							self.name(resource.name)
						)) + resource.span.marker());
					}
				},
				RendererEvent::Draw(p) => {
					let pipeline = self.find_pipeline(*p)?;
					if pipeline.is_compute() {
						return Err(p.span.error(format!("can't draw compute pipeline `{}`", self.name(p.name)))
							+ p.span.marker()
							+ "use `dispatch` instead");
					}
				},
				RendererEvent::Dispatch { pipeline: p, size } => {
					let pipeline = self.find_pipeline(*p)?;
					if !pipeline.is_compute() {
						return Err(p.span.error(format!("can't dispatch raster pipeline `{}`", self.name(p.name)))
							+ p.span.marker()
							+ "use `draw` instead");
					}
					for expr in size.iter() {
						self.expr(expr)?;
					}
				},
				RendererEvent::RegenFramebuffer(_) | RendererEvent::SwapTextures { .. } => {},
			}
		}

		if let Some(next) = renderer.next {
			if self.program.renderer(next.name).is_none() {
				return Err(next.span.error(format!("unknown renderer `{}`", self.name(next.name))) + next.span.marker());
			}
		}

		Ok(())
	}

	fn find_pipeline(&self, ident: Ident) -> std::result::Result<&Pipeline, Diagnostic> {
		self.program.pipelines.get(&ident.name).ok_or_else(|| {
			ident.span.error(format!("unknown pipeline `{}`", self.name(ident.name))) + ident.span.marker()
		})
	}
}
