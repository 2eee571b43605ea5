use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use rustc_hash::FxHashMap;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::text::{Interner, Text};

/// Maps interned words onto one of the closed tables below.
pub struct Matcher<T> {
	map: FxHashMap<Text, T>,
}

impl<T: Copy + IntoEnumIterator + Into<&'static str>> Matcher<T> {
	pub fn new(intern: &mut Interner) -> Self {
		let mut map = FxHashMap::default();

		for variant in T::iter() {
			map.insert(intern.get_static(variant.into()), variant);
		}

		Self { map }
	}

	pub fn get(&self, text: Text) -> Option<T> { self.map.get(&text).copied() }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display, EnumString, EnumIter, IntoStaticStr)]
pub enum ShaderStage {
	#[strum(serialize = "vs")]
	Vertex,
	#[strum(serialize = "fs")]
	Fragment,
	#[strum(serialize = "cs")]
	Compute,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display, EnumString, EnumIter, IntoStaticStr)]
pub enum TextureTarget {
	#[strum(serialize = "GL_TEXTURE_1D")]
	Texture1D,
	#[strum(serialize = "GL_TEXTURE_2D")]
	Texture2D,
	#[strum(serialize = "GL_TEXTURE_3D")]
	Texture3D,
	#[strum(serialize = "GL_TEXTURE_CUBE_MAP")]
	CubeMap,
}

impl TextureTarget {
	/// The suffix of the GLSL sampler and image types for this target.
	pub fn glsl_suffix(self) -> &'static str {
		match self {
			TextureTarget::Texture1D => "1D",
			TextureTarget::Texture2D => "2D",
			TextureTarget::Texture3D => "3D",
			TextureTarget::CubeMap => "Cube",
		}
	}
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display, EnumString, EnumIter, IntoStaticStr)]
pub enum PixelFormat {
	#[strum(serialize = "GL_RGBA8")]
	Rgba8,
	#[strum(serialize = "GL_SRGB8_ALPHA8")]
	Srgb8Alpha8,
	#[strum(serialize = "GL_RGBA8_SNORM")]
	Rgba8Snorm,
	#[strum(serialize = "GL_RGBA16F")]
	Rgba16f,
	#[strum(serialize = "GL_RGBA32F")]
	Rgba32f,
	#[strum(serialize = "GL_RGB10_A2")]
	Rgb10A2,
	#[strum(serialize = "GL_R11F_G11F_B10F")]
	R11fG11fB10f,
	#[strum(serialize = "GL_R8")]
	R8,
	#[strum(serialize = "GL_RG8")]
	Rg8,
	#[strum(serialize = "GL_R16F")]
	R16f,
	#[strum(serialize = "GL_RG16F")]
	Rg16f,
	#[strum(serialize = "GL_R32F")]
	R32f,
	#[strum(serialize = "GL_RG32F")]
	Rg32f,
	#[strum(serialize = "GL_R32UI")]
	R32ui,
	#[strum(serialize = "GL_R32I")]
	R32i,
	#[strum(serialize = "GL_RGBA8UI")]
	Rgba8ui,
	#[strum(serialize = "GL_RGBA32UI")]
	Rgba32ui,
	#[strum(serialize = "GL_DEPTH_COMPONENT16")]
	Depth16,
	#[strum(serialize = "GL_DEPTH_COMPONENT24")]
	Depth24,
	#[strum(serialize = "GL_DEPTH_COMPONENT32F")]
	Depth32f,
}

impl PixelFormat {
	pub fn is_depth(self) -> bool { matches!(self, PixelFormat::Depth16 | PixelFormat::Depth24 | PixelFormat::Depth32f) }

	pub fn is_color(self) -> bool { !self.is_depth() }

	pub fn is_unsigned(self) -> bool { matches!(self, PixelFormat::R32ui | PixelFormat::Rgba8ui | PixelFormat::Rgba32ui) }

	pub fn is_signed(self) -> bool { matches!(self, PixelFormat::R32i) }

	/// Integer formats can't be filtered.
	pub fn is_integer(self) -> bool { self.is_unsigned() || self.is_signed() }

	/// Formats an image file can be decoded into.
	pub fn loadable(self) -> bool { matches!(self, PixelFormat::Rgba8 | PixelFormat::Srgb8Alpha8) }

	/// The `layout()` qualifier for image bindings, if the format can be bound as one.
	pub fn image_qualifier(self) -> Option<&'static str> {
		Some(match self {
			PixelFormat::Rgba8 => "rgba8",
			PixelFormat::Rgba8Snorm => "rgba8_snorm",
			PixelFormat::Rgba16f => "rgba16f",
			PixelFormat::Rgba32f => "rgba32f",
			PixelFormat::Rgb10A2 => "rgb10_a2",
			PixelFormat::R11fG11fB10f => "r11f_g11f_b10f",
			PixelFormat::R8 => "r8",
			PixelFormat::Rg8 => "rg8",
			PixelFormat::R16f => "r16f",
			PixelFormat::Rg16f => "rg16f",
			PixelFormat::R32f => "r32f",
			PixelFormat::Rg32f => "rg32f",
			PixelFormat::R32ui => "r32ui",
			PixelFormat::R32i => "r32i",
			PixelFormat::Rgba8ui => "rgba8ui",
			PixelFormat::Rgba32ui => "rgba32ui",
			PixelFormat::Srgb8Alpha8 | PixelFormat::Depth16 | PixelFormat::Depth24 | PixelFormat::Depth32f => {
				return None
			},
		})
	}

	/// `u` or `i` for integer formats, which GLSL samples through typed samplers.
	pub fn glsl_prefix(self) -> &'static str {
		if self.is_unsigned() {
			"u"
		} else if self.is_signed() {
			"i"
		} else {
			""
		}
	}
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display, EnumString, EnumIter, IntoStaticStr)]
pub enum Filter {
	#[strum(serialize = "GL_NEAREST")]
	Nearest,
	#[strum(serialize = "GL_LINEAR")]
	Linear,
	#[strum(serialize = "GL_NEAREST_MIPMAP_NEAREST")]
	NearestMipmapNearest,
	#[strum(serialize = "GL_LINEAR_MIPMAP_NEAREST")]
	LinearMipmapNearest,
	#[strum(serialize = "GL_NEAREST_MIPMAP_LINEAR")]
	NearestMipmapLinear,
	#[strum(serialize = "GL_LINEAR_MIPMAP_LINEAR")]
	LinearMipmapLinear,
}

impl Filter {
	pub fn is_mipmap(self) -> bool { !matches!(self, Filter::Nearest | Filter::Linear) }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display, EnumString, EnumIter, IntoStaticStr)]
pub enum Capability {
	#[strum(serialize = "GL_DEPTH_TEST")]
	DepthTest,
	#[strum(serialize = "GL_CULL_FACE")]
	CullFace,
	#[strum(serialize = "GL_BLEND")]
	Blend,
	#[strum(serialize = "GL_STENCIL_TEST")]
	StencilTest,
	#[strum(serialize = "GL_SCISSOR_TEST")]
	ScissorTest,
	#[strum(serialize = "GL_MULTISAMPLE")]
	Multisample,
	#[strum(serialize = "GL_FRAMEBUFFER_SRGB")]
	FramebufferSrgb,
	#[strum(serialize = "GL_PROGRAM_POINT_SIZE")]
	ProgramPointSize,
	#[strum(serialize = "GL_DEPTH_CLAMP")]
	DepthClamp,
}

/// Scalar types a user variable can have on the host.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum CType {
	Float,
	Double,
	Int,
	Bool,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeShape {
	Scalar,
	Vector(u32),
	/// `N` columns of `vecN`.
	Matrix(u32),
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum BuiltinType {
	Bool,
	Int,
	Uint,
	Float,
	Bvec2,
	Bvec3,
	Bvec4,
	Ivec2,
	Ivec3,
	Ivec4,
	Uvec2,
	Uvec3,
	Uvec4,
	Vec2,
	Vec3,
	Vec4,
	Mat2,
	Mat3,
	Mat4,
}

impl BuiltinType {
	pub fn shape(self) -> TypeShape {
		use BuiltinType::*;

		match self {
			Bool | Int | Uint | Float => TypeShape::Scalar,
			Bvec2 | Ivec2 | Uvec2 | Vec2 => TypeShape::Vector(2),
			Bvec3 | Ivec3 | Uvec3 | Vec3 => TypeShape::Vector(3),
			Bvec4 | Ivec4 | Uvec4 | Vec4 => TypeShape::Vector(4),
			Mat2 => TypeShape::Matrix(2),
			Mat3 => TypeShape::Matrix(3),
			Mat4 => TypeShape::Matrix(4),
		}
	}

	/// The type of one matrix column.
	pub fn column(self) -> Option<BuiltinType> {
		match self {
			BuiltinType::Mat2 => Some(BuiltinType::Vec2),
			BuiltinType::Mat3 => Some(BuiltinType::Vec3),
			BuiltinType::Mat4 => Some(BuiltinType::Vec4),
			_ => None,
		}
	}
}

pub fn reserved_words() -> impl IntoIterator<Item = &'static str> {
	[
		// GLSL keywords
		"attribute",
		"break",
		"buffer",
		"case",
		"centroid",
		"coherent",
		"const",
		"continue",
		"default",
		"discard",
		"do",
		"double",
		"dvec2",
		"dvec3",
		"dvec4",
		"else",
		"false",
		"flat",
		"for",
		"highp",
		"if",
		"in",
		"inout",
		"invariant",
		"layout",
		"lowp",
		"mediump",
		"noperspective",
		"out",
		"patch",
		"precise",
		"precision",
		"readonly",
		"restrict",
		"return",
		"sample",
		"shared",
		"smooth",
		"struct",
		"subroutine",
		"switch",
		"true",
		"uniform",
		"varying",
		"void",
		"volatile",
		"while",
		"writeonly",
		// Opaque types
		"sampler1D",
		"sampler2D",
		"sampler3D",
		"samplerCube",
		"image1D",
		"image2D",
		"image3D",
		"imageCube",
		// Reserved for future use
		"active",
		"asm",
		"cast",
		"class",
		"common",
		"enum",
		"extern",
		"external",
		"filter",
		"fixed",
		"goto",
		"half",
		"inline",
		"input",
		"interface",
		"long",
		"namespace",
		"noinline",
		"output",
		"partition",
		"public",
		"resource",
		"short",
		"sizeof",
		"static",
		"superp",
		"template",
		"this",
		"typedef",
		"union",
		"unsigned",
		"using",
	]
	.into_iter()
	.chain(BuiltinType::iter().map(|ty| -> &'static str { ty.into() }))
}

/// Matches reserved words at the start of a name. Callers check the match spans the whole name.
pub fn reserved_matcher() -> AhoCorasick {
	AhoCorasickBuilder::new()
		.anchored(true)
		.match_kind(MatchKind::LeftmostLongest)
		.build(reserved_words())
}

/// Variables known only at run time, always available to expressions.
pub const COMMON_VARS: &[&str] = &["ScreenWidth", "ScreenHeight", "ScreenScaleX", "ScreenScaleY"];
