use crate::resolve::inbuilt::COMMON_VARS;

/// Settings that apply to a whole compilation.
#[derive(Clone, Debug)]
pub struct CompileOptions {
	/// Variables supplied by the host at run time, which expressions may refer to.
	pub runtime_vars: Vec<String>,
}

impl Default for CompileOptions {
	fn default() -> Self {
		Self {
			runtime_vars: COMMON_VARS.iter().map(|v| v.to_string()).collect(),
		}
	}
}

impl CompileOptions {
	pub fn with_runtime_var(mut self, name: impl Into<String>) -> Self {
		self.runtime_vars.push(name.into());
		self
	}

	pub fn is_runtime_var(&self, name: &str) -> bool { self.runtime_vars.iter().any(|v| v == name) }
}
