//! In-process [`JobHost`] that records every side effect for tests and dry runs.

// self
use crate::{
	_prelude::*,
	host::{HostError, JobHost, LogLevel, input_variable},
};

/// Side effects captured by a [`MemoryHost`].
#[derive(Clone, Debug, Default)]
pub struct MemoryHostState {
	/// Log lines in emission order.
	pub logs: Vec<(LogLevel, String)>,
	/// Values registered for masking.
	pub masks: Vec<String>,
	/// Exported environment variables in emission order.
	pub exports: Vec<(String, String)>,
	/// Published outputs in emission order.
	pub outputs: Vec<(String, String)>,
	/// Failure message, once the step has been marked failed.
	pub failure: Option<String>,
}

/// Thread-safe host backed by a fixed environment map.
#[derive(Debug, Default)]
pub struct MemoryHost {
	env: HashMap<String, String>,
	state: Mutex<MemoryHostState>,
}
impl MemoryHost {
	/// Seeds an environment variable.
	pub fn with_env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.env.insert(name.into(), value.into());

		self
	}

	/// Seeds a step input using the runner's `INPUT_*` naming.
	pub fn with_input(self, name: &str, value: impl Into<String>) -> Self {
		self.with_env(input_variable(name), value)
	}

	/// Returns a snapshot of everything recorded so far.
	pub fn snapshot(&self) -> MemoryHostState {
		self.state.lock().clone()
	}

	/// Returns the messages logged at `level`.
	pub fn lines(&self, level: LogLevel) -> Vec<String> {
		self.state
			.lock()
			.logs
			.iter()
			.filter(|(lvl, _)| *lvl == level)
			.map(|(_, line)| line.clone())
			.collect()
	}

	/// Returns every log line joined by newlines, regardless of level.
	pub fn transcript(&self) -> String {
		self.state.lock().logs.iter().map(|(_, line)| line.as_str()).collect::<Vec<_>>().join("\n")
	}

	/// Looks up a published output by name.
	pub fn output(&self, name: &str) -> Option<String> {
		self.state.lock().outputs.iter().find(|(key, _)| key == name).map(|(_, v)| v.clone())
	}

	/// Looks up an exported variable by name.
	pub fn exported(&self, name: &str) -> Option<String> {
		self.state.lock().exports.iter().find(|(key, _)| key == name).map(|(_, v)| v.clone())
	}

	/// Failure message recorded through [`JobHost::set_failed`].
	pub fn failure(&self) -> Option<String> {
		self.state.lock().failure.clone()
	}
}
impl JobHost for MemoryHost {
	fn env(&self, name: &str) -> Option<String> {
		self.env.get(name).filter(|value| !value.is_empty()).cloned()
	}

	fn log(&self, level: LogLevel, message: &str) {
		self.state.lock().logs.push((level, message.to_owned()));
	}

	fn mask(&self, value: &str) {
		self.state.lock().masks.push(value.to_owned());
	}

	fn export_variable(&self, name: &str, value: &str) -> Result<(), HostError> {
		self.state.lock().exports.push((name.to_owned(), value.to_owned()));

		Ok(())
	}

	fn set_output(&self, name: &str, value: &str) -> Result<(), HostError> {
		self.state.lock().outputs.push((name.to_owned(), value.to_owned()));

		Ok(())
	}

	fn set_failed(&self, message: &str) {
		let mut state = self.state.lock();

		state.logs.push((LogLevel::Error, message.to_owned()));
		state.failure = Some(message.to_owned());
	}
}
