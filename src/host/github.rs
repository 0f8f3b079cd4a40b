//! GitHub Actions [`JobHost`] speaking the runner's workflow-command protocol.
//!
//! Log lines and masks are written to stdout as `::command::data` lines. Exports and outputs
//! are appended to the files named by `GITHUB_ENV` and `GITHUB_OUTPUT` using the heredoc form;
//! when a file variable is unset the legacy `::set-env` / `::set-output` commands are issued
//! instead.

// std
use std::{
	env,
	fs::OpenOptions,
	io::{self, Write},
	path::PathBuf,
};
// self
use crate::{
	_prelude::*,
	host::{HostError, JobHost, LogLevel},
};

type SharedWriter = Mutex<Box<dyn Write + Send>>;

/// Host bound to the real runner environment.
pub struct GithubActionsHost {
	stdout: SharedWriter,
	env_file: Option<PathBuf>,
	output_file: Option<PathBuf>,
	failed: Mutex<bool>,
}
impl GithubActionsHost {
	/// Builds a host from the current process, writing commands to stdout.
	pub fn from_env() -> Self {
		let file = |name: &str| env::var_os(name).filter(|value| !value.is_empty()).map(PathBuf::from);

		Self::with_writer(Box::new(io::stdout()), file("GITHUB_ENV"), file("GITHUB_OUTPUT"))
	}

	/// Builds a host that writes commands to `stdout` and the given command files.
	pub fn with_writer(
		stdout: Box<dyn Write + Send>,
		env_file: Option<PathBuf>,
		output_file: Option<PathBuf>,
	) -> Self {
		Self { stdout: Mutex::new(stdout), env_file, output_file, failed: Mutex::new(false) }
	}

	/// Returns `true` once [`JobHost::set_failed`] has been called.
	pub fn has_failed(&self) -> bool {
		*self.failed.lock()
	}

	fn issue(&self, command: &str, properties: &[(&str, &str)], data: &str) {
		let line = format_command(command, properties, data);
		let mut out = self.stdout.lock();

		// The runner owns stdout; a closed pipe leaves nothing better to do than drop the line.
		let _ = writeln!(out, "{line}");
		let _ = out.flush();
	}

	fn issue_file_command(
		&self,
		file: &Option<PathBuf>,
		legacy: &str,
		name: &str,
		value: &str,
	) -> Result<(), HostError> {
		let Some(path) = file else {
			self.issue(legacy, &[("name", name)], value);

			return Ok(());
		};
		let message = key_value_message(name, value, &generate_delimiter())?;
		let io_err = |source: io::Error| HostError::Io { path: path.clone(), source };
		let mut file = OpenOptions::new().create(true).append(true).open(path).map_err(io_err)?;

		writeln!(file, "{message}").map_err(io_err)
	}
}
impl Debug for GithubActionsHost {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("GithubActionsHost")
			.field("env_file", &self.env_file)
			.field("output_file", &self.output_file)
			.finish()
	}
}
impl JobHost for GithubActionsHost {
	fn env(&self, name: &str) -> Option<String> {
		env::var(name).ok().filter(|value| !value.is_empty())
	}

	fn log(&self, level: LogLevel, message: &str) {
		match level {
			LogLevel::Debug => self.issue("debug", &[], message),
			LogLevel::Info => {
				let mut out = self.stdout.lock();
				let _ = writeln!(out, "{message}");
				let _ = out.flush();
			},
			LogLevel::Warning => self.issue("warning", &[], message),
			LogLevel::Error => self.issue("error", &[], message),
		}
	}

	fn mask(&self, value: &str) {
		if !value.is_empty() {
			self.issue("add-mask", &[], value);
		}
	}

	fn export_variable(&self, name: &str, value: &str) -> Result<(), HostError> {
		self.issue_file_command(&self.env_file, "set-env", name, value)
	}

	fn set_output(&self, name: &str, value: &str) -> Result<(), HostError> {
		self.issue_file_command(&self.output_file, "set-output", name, value)
	}

	fn set_failed(&self, message: &str) {
		*self.failed.lock() = true;

		self.issue("error", &[], message);
	}
}

/// Renders a workflow command line: `::command k=v,k=v::data`.
pub fn format_command(command: &str, properties: &[(&str, &str)], data: &str) -> String {
	let mut line = format!("::{command}");

	for (idx, (key, value)) in properties.iter().enumerate() {
		line.push(if idx == 0 { ' ' } else { ',' });
		line.push_str(key);
		line.push('=');
		line.push_str(&escape_property(value));
	}

	line.push_str("::");
	line.push_str(&escape_data(data));

	line
}

/// Renders a heredoc-style file command entry.
pub fn key_value_message(name: &str, value: &str, delimiter: &str) -> Result<String, HostError> {
	if name.contains(delimiter) || value.contains(delimiter) {
		return Err(HostError::DelimiterCollision {
			name: name.to_owned(),
			delimiter: delimiter.to_owned(),
		});
	}

	Ok(format!("{name}<<{delimiter}\n{value}\n{delimiter}"))
}

fn generate_delimiter() -> String {
	format!("ghadelimiter_{:032x}", rand::random::<u128>())
}

fn escape_data(value: &str) -> String {
	value.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

fn escape_property(value: &str) -> String {
	escape_data(value).replace(':', "%3A").replace(',', "%2C")
}
