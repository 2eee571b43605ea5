use crate::{
	ast::{PipelineItem, Program},
	diagnostic::{Diagnostic, Span},
	resolve::cycle::{cycle_error, StackList, Visit, Visits},
	text::Interner,
};

/// Splice the items of every `(copy X)` target in front of the copying
/// pipeline's own items, so its own declarations win.
///
/// Copies are resolved depth first, so a pipeline always copies fully
/// resolved items regardless of declaration order.
pub fn splice_copies(program: &mut Program, intern: &Interner) -> Result<(), Diagnostic> {
	let mut visits = Visits::new(program.pipelines.len());

	for id in 0..program.pipelines.len() {
		splice(id, StackList::empty(), program, intern, &mut visits)?;
	}

	Ok(())
}

fn splice(
	id: usize, ctx: StackList<(usize, Span)>, program: &mut Program, intern: &Interner, visits: &mut Visits,
) -> Result<(), Diagnostic> {
	let pipeline = &program.pipelines[id];
	match visits.enter(id) {
		Visit::Done => return Ok(()),
		Visit::Cycle => {
			return Err(cycle_error("cyclic pipeline copies are not allowed", id, pipeline.name.span, &ctx))
		},
		Visit::Fresh => {},
	}

	let name = pipeline.name;
	let copies = pipeline.copies.clone();
	if copies.is_empty() {
		visits.finish(id);
		return Ok(());
	}

	for copy in copies.iter() {
		if copy.name == name.name {
			return Err(copy.span.error("a pipeline can't copy itself") + copy.span.marker());
		}
		// Unknown targets are reported by validation.
		if let Some(target) = program.pipeline_handle(copy.name) {
			splice(target, ctx.with((id, copy.span)), program, intern, visits)?;
		}
	}

	let mut items = Vec::new();
	for copy in copies.iter() {
		if let Some(source) = program.pipelines.get(&copy.name) {
			log::trace!(
				"pipeline `{}` copies {} items from `{}`",
				intern.resolve(name.name),
				source.items.len(),
				intern.resolve(copy.name)
			);
			items.extend(
				source
					.items
					.iter()
					.filter(|item| !matches!(item, PipelineItem::Copy(_)))
					.cloned(),
			);
		}
	}

	let pipeline = &mut program.pipelines[id];
	items.append(&mut pipeline.items);
	pipeline.items = items;
	pipeline.populate();

	visits.finish(id);
	Ok(())
}
