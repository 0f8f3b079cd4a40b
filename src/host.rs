//! CI host contracts: job identity lookup, log sinks, and credential publishing.
//!
//! The broker never touches the process environment or stdout directly. Everything it reads
//! from, or hands back to, the CI job goes through a [`JobHost`], so the same flow runs
//! against GitHub Actions in production and against [`MemoryHost`] in tests.

pub mod github;
pub mod memory;

pub use github::GithubActionsHost;
pub use memory::MemoryHost;

// std
use std::{io, path::PathBuf};
// self
use crate::_prelude::*;

/// Severity of a user-facing log line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogLevel {
	/// Verbose diagnostics, hidden unless step debugging is enabled.
	Debug,
	/// Regular progress output.
	Info,
	/// Advisory that does not fail the run.
	Warning,
	/// Failure description.
	Error,
}

/// Errors raised while publishing values into the CI environment.
#[derive(Debug, ThisError)]
pub enum HostError {
	/// Appending to a file command failed.
	#[error("Unable to write to the {} command file.", .path.display())]
	Io {
		/// Path of the command file.
		path: PathBuf,
		/// Underlying I/O failure.
		#[source]
		source: io::Error,
	},
	/// The name or value collides with the generated heredoc delimiter.
	#[error("Unexpected input: {name} must not contain the delimiter {delimiter}.")]
	DelimiterCollision {
		/// Variable or output name being written.
		name: String,
		/// Delimiter that was generated for the write.
		delimiter: String,
	},
}

/// Everything the broker needs from the CI job it runs inside.
pub trait JobHost
where
	Self: Send + Sync,
{
	/// Reads an environment variable; empty values are reported as absent.
	fn env(&self, name: &str) -> Option<String>;

	/// Reads a step input; surrounding whitespace is trimmed and empty values are absent.
	fn input(&self, name: &str) -> Option<String> {
		self.env(&input_variable(name))
			.map(|value| value.trim().to_owned())
			.filter(|value| !value.is_empty())
	}

	/// Emits a user-facing log line.
	fn log(&self, level: LogLevel, message: &str);

	/// Registers a value that must be masked in every subsequent log line.
	fn mask(&self, value: &str);

	/// Exports an environment variable to the remaining steps of the job.
	fn export_variable(&self, name: &str, value: &str) -> Result<(), HostError>;

	/// Publishes a named output for steps that depend on this one.
	fn set_output(&self, name: &str, value: &str) -> Result<(), HostError>;

	/// Marks the step as failed with the provided message.
	fn set_failed(&self, message: &str);

	/// Shorthand for [`LogLevel::Debug`].
	fn debug(&self, message: &str) {
		self.log(LogLevel::Debug, message);
	}

	/// Shorthand for [`LogLevel::Info`].
	fn info(&self, message: &str) {
		self.log(LogLevel::Info, message);
	}

	/// Shorthand for [`LogLevel::Warning`].
	fn warning(&self, message: &str) {
		self.log(LogLevel::Warning, message);
	}

	/// Shorthand for [`LogLevel::Error`].
	fn error(&self, message: &str) {
		self.log(LogLevel::Error, message);
	}
}

/// Environment variable GitHub Actions uses to pass the named input.
pub fn input_variable(name: &str) -> String {
	format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn input_variables_follow_runner_convention() {
		assert_eq!(input_variable("role"), "INPUT_ROLE");
		assert_eq!(input_variable("configOwner"), "INPUT_CONFIGOWNER");
		assert_eq!(input_variable("my input"), "INPUT_MY_INPUT");
	}

	#[test]
	fn inputs_are_trimmed_and_empty_means_absent() {
		let host = MemoryHost::default()
			.with_input("role", "  arn:aws:iam::123:role/Y \n")
			.with_input("provider", "   ");

		assert_eq!(host.input("role").as_deref(), Some("arn:aws:iam::123:role/Y"));
		assert_eq!(host.input("provider"), None);
		assert_eq!(host.input("region"), None);
	}
}
