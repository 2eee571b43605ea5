//! Feedback hazards: a pipeline rendering into a texture it also samples.
//!
//! Each such texture gets a shadow twin. The pipeline keeps writing to the
//! original name, and the renderer swaps which storage the two names refer to
//! after every draw, so the next read sees this frame's result.

use rustc_hash::FxHashSet;

use crate::{
	ast::{Program, RendererEvent},
	text::{Interner, Text},
};

/// Give every texture a pipeline both reads and writes a shadow, and record
/// it in that pipeline's `requires_flip`. Must run once.
pub fn synthesize_shadows(program: &mut Program, intern: &mut Interner) {
	for id in 0..program.pipelines.len() {
		let pipeline = &program.pipelines[id];
		let inputs: FxHashSet<Text> = pipeline.textures(program).map(|i| i.name).collect();
		let mut hazards: Vec<Text> = Vec::new();
		for output in pipeline.outputs.iter() {
			if inputs.contains(&output.name) && !hazards.contains(&output.name) {
				hazards.push(output.name);
			}
		}

		for texture in hazards {
			create_shadow(program, intern, texture);
			program.pipelines[id].requires_flip.push(texture);
		}
	}
}

fn create_shadow(program: &mut Program, intern: &mut Interner, texture: Text) -> Text {
	if let Some(shadow) = program.textures[&texture].shadow {
		return shadow;
	}

	let name = shadow_name(program, intern, texture);
	let mut shadow = program.textures[&texture].clone();
	shadow.name.name = name;
	shadow.shadow = None;
	shadow.shadow_of = Some(texture);

	program.textures[&texture].shadow = Some(name);
	program.textures.insert(name, shadow);
	log::trace!("created shadow texture `{}` for `{}`", intern.resolve(name), intern.resolve(texture));

	name
}

/// `<name>Target`, or `<name>Target1`, `<name>Target2`, ... if that is taken.
fn shadow_name(program: &Program, intern: &mut Interner, texture: Text) -> Text {
	let base = format!("{}Target", intern.resolve(texture));
	let taken = |name: &str, intern: &Interner| {
		intern.lookup(name).map_or(false, |t| {
			program.textures.contains_key(&t) || program.samplers.contains_key(&t) || program.buffers.contains_key(&t)
		})
	};

	let mut name = base.clone();
	let mut attempt = 1;
	while taken(&name, intern) {
		name = format!("{}{}", base, attempt);
		attempt += 1;
	}

	intern.get(&name)
}

/// Regenerate the framebuffer before, and swap shadows after, every draw of a
/// pipeline with a double-buffered output.
pub fn insert_implicit_steps(program: &mut Program) {
	let mut renderers = std::mem::take(&mut program.renderers);

	for renderer in renderers.iter_mut() {
		let mut events = Vec::with_capacity(renderer.events.len());

		for event in renderer.events.drain(..) {
			let draw = match event {
				RendererEvent::Draw(pipeline) => pipeline,
				other => {
					events.push(other);
					continue;
				},
			};

			let pipeline = match program.pipelines.get(&draw.name) {
				Some(p) => p,
				None => {
					events.push(RendererEvent::Draw(draw));
					continue;
				},
			};

			if pipeline.any_output_double_buffered(program) {
				events.push(RendererEvent::RegenFramebuffer(draw));
			}
			events.push(RendererEvent::Draw(draw));
			for &texture in pipeline.requires_flip.iter() {
				if let Some(shadow) = program.textures.get(&texture).and_then(|t| t.shadow) {
					events.push(RendererEvent::SwapTextures {
						texture,
						shadow,
						span: draw.span,
					});
				}
			}
		}

		log::trace!(
			"renderer has {} events after inserting implicit steps",
			events.len()
		);
		renderer.events = events;
	}

	program.renderers = renderers;
}
