use crate::{
	grammar::{AtomKind::*, Construct, ListRule, Rule, Rule::*},
	resolve::inbuilt::ShaderStage,
};

macro_rules! list {
	($construct:expr, $rules:expr $(,)?) => {
		ListRule {
			construct: $construct,
			rules: $rules,
			tail: None,
		}
	};
	($construct:expr, $rules:expr, $tail:expr $(,)?) => {
		ListRule {
			construct: $construct,
			rules: $rules,
			tail: Some($tail),
		}
	};
}

const USERVAR: ListRule = list!(
	Construct::UserVar,
	&[Exactly("uservar"), Atom(Word, "ctype"), Atom(Word, "variable name"), Arithmetic("value")],
);

const STRUCT_MEMBER: Rule = Match(&[
	list!(
		Construct::ArrayMember,
		&[Exactly("array"), Atom(Word, "member type"), Atom(Word, "member name"), Atom(Number, "array size")],
	),
	list!(Construct::Member, &[Atom(Word, "member type"), Atom(Word, "member name")]),
]);

const STRUCT: ListRule = list!(Construct::Struct, &[Exactly("struct"), Atom(Word, "struct name")], &STRUCT_MEMBER);

const BUFFER: ListRule = list!(
	Construct::Buffer,
	&[Exactly("buffer"), Atom(Word, "buffer name"), Atom(Word, "buffer type")],
);

const FORMAT: ListRule = list!(
	Construct::Format,
	&[
		Exactly("format"),
		Atom(Word, "format name"),
		Atom(Word, "texture target"),
		Atom(Word, "texture format"),
		Atom(Word, "sampler name"),
	],
);

const SAMPLER_FILTER: Rule = Match(&[
	list!(Construct::MinFilter, &[Exactly("min"), Atom(Word, "filter")]),
	list!(Construct::MagFilter, &[Exactly("mag"), Atom(Word, "filter")]),
]);

const SAMPLER: ListRule = list!(
	Construct::Sampler,
	&[Exactly("sampler"), Atom(Word, "sampler name")],
	&SAMPLER_FILTER,
);

const TEXTURE_ITEM: Rule = Match(&[
	list!(Construct::TextureSrc, &[Exactly("src"), Atom(Str, "image path")]),
	list!(
		Construct::TextureClear,
		&[Exactly("clear"), Atom(Number, "red"), Atom(Number, "green"), Atom(Number, "blue"), Atom(Number, "alpha")],
	),
	list!(Construct::Width, &[Exactly("width"), Arithmetic("width")]),
	list!(Construct::Height, &[Exactly("height"), Arithmetic("height")]),
	list!(Construct::Depth, &[Exactly("depth"), Arithmetic("depth")]),
]);

const TEXTURE: ListRule = list!(
	Construct::Texture,
	&[Exactly("texture"), Atom(Word, "texture name"), Atom(Word, "format name")],
	&TEXTURE_ITEM,
);

const PIPELINE_ITEM: Rule = Match(&[
	list!(Construct::Shader(ShaderStage::Vertex), &[Exactly("vs"), Atom(Str, "shader path")]),
	list!(Construct::Shader(ShaderStage::Fragment), &[Exactly("fs"), Atom(Str, "shader path")]),
	list!(Construct::Shader(ShaderStage::Compute), &[Exactly("cs"), Atom(Str, "shader path")]),
	list!(Construct::Use, &[Exactly("use"), Atom(Word, "struct name")]),
	list!(Construct::Enable, &[Exactly("enable"), Atom(Word, "capability")]),
	list!(Construct::Disable, &[Exactly("disable"), Atom(Word, "capability")]),
	list!(Construct::Copy, &[Exactly("copy"), Atom(Word, "pipeline name")]),
	list!(Construct::Input, &[Exactly("in"), Atom(Word, "resource name")]),
	list!(Construct::Output, &[Exactly("out"), Atom(Word, "resource name")]),
	list!(Construct::Sideput, &[Exactly("side"), Atom(Word, "resource name")]),
]);

const PIPELINE: ListRule = list!(
	Construct::Pipeline,
	&[Exactly("pipeline"), Atom(Word, "pipeline name")],
	&PIPELINE_ITEM,
);

const RENDERER_ITEM: Rule = Match(&[
	list!(Construct::Update, &[Exactly("update"), Atom(Word, "resource name")]),
	list!(Construct::Draw, &[Exactly("draw"), Atom(Word, "pipeline name")]),
	list!(
		Construct::Dispatch,
		&[Exactly("dispatch"), Atom(Word, "pipeline name"), Arithmetic("x"), Arithmetic("y"), Arithmetic("z")],
	),
	list!(Construct::Next, &[Exactly("next"), Atom(Word, "renderer name")]),
]);

const RENDERER: ListRule = list!(
	Construct::Renderer,
	&[Exactly("renderer"), Atom(Word, "renderer name")],
	&RENDERER_ITEM,
);

/// Top-level forms.
pub const GRAMMAR: &[ListRule] = &[USERVAR, STRUCT, BUFFER, FORMAT, SAMPLER, TEXTURE, PIPELINE, RENDERER];
