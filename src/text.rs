use lasso::{Rodeo, Spur};

/// An interned string.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Debug)]
pub struct Text(Spur);

pub struct Interner {
	rodeo: Rodeo,
}

impl Interner {
	pub fn new() -> Self { Self { rodeo: Rodeo::new() } }

	pub fn get(&mut self, text: &str) -> Text { Text(self.rodeo.get_or_intern(text)) }

	pub fn get_static(&mut self, text: &'static str) -> Text { Text(self.rodeo.get_or_intern_static(text)) }

	/// Look up a string without interning it.
	pub fn lookup(&self, text: &str) -> Option<Text> { self.rodeo.get(text).map(Text) }

	pub fn resolve(&self, text: Text) -> &str { self.rodeo.resolve(&text.0) }
}

impl Default for Interner {
	fn default() -> Self { Self::new() }
}
