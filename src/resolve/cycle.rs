use crate::diagnostic::{Diagnostic, Span};

/// The chain of references that led to the current node, kept on the call stack.
pub struct StackList<'a, T> {
	prev: Option<&'a StackList<'a, T>>,
	value: Option<T>,
}

impl<'a, T> StackList<'a, T> {
	pub fn empty() -> Self {
		Self {
			prev: None,
			value: None,
		}
	}

	pub fn with(&'a self, value: T) -> Self {
		Self {
			prev: Some(self),
			value: Some(value),
		}
	}
}

/// Depth-first visit state for detecting cycles among `len` nodes.
pub struct Visits {
	visited: Vec<bool>,
	temp_visited: Vec<bool>,
}

pub enum Visit {
	/// Already finished.
	Done,
	/// On the current path: this reference closes a cycle.
	Cycle,
	/// First time here. Call [`Visits::finish`] after the node's dependencies.
	Fresh,
}

impl Visits {
	pub fn new(len: usize) -> Self {
		Self {
			visited: vec![false; len],
			temp_visited: vec![false; len],
		}
	}

	pub fn enter(&mut self, id: usize) -> Visit {
		if self.visited[id] {
			Visit::Done
		} else if self.temp_visited[id] {
			Visit::Cycle
		} else {
			self.temp_visited[id] = true;
			Visit::Fresh
		}
	}

	pub fn finish(&mut self, id: usize) {
		self.temp_visited[id] = false;
		self.visited[id] = true;
	}
}

/// Report a cycle through `id`, labelling every reference along the way.
pub fn cycle_error<T: Copy + PartialEq>(
	message: impl Into<String>, id: T, span: Span, ctx: &StackList<(T, Span)>,
) -> Diagnostic {
	let mut error = span.error(message) + span.label("cycle in this declaration");

	let mut ctx = ctx;
	while let Some((i, span)) = ctx.value {
		if i == id {
			error = error + span.label("completing the cycle");
			break;
		} else {
			error = error + span.label("which depends on");
		}

		if let Some(prev) = ctx.prev {
			ctx = prev;
		} else {
			break;
		}
	}

	error
}
