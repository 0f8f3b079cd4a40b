//! Broker-level error taxonomy and the propagation policy derived from it.

// self
use crate::{_prelude::*, host::HostError};

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical broker error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Required input or environment is missing or malformed.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The SAML issuing service rejected or could not serve the assertion request.
	#[error(transparent)]
	Upstream(#[from] UpstreamRequestError),
	/// The CI host refused a published value.
	#[error(transparent)]
	Host(#[from] HostError),

	/// The federation endpoint rejected the exchange because of trust-anchor, role, or metadata
	/// misconfiguration.
	#[error("{reason}\n\n{remediation}")]
	TrustConfiguration {
		/// Trust anchor involved in the exchange, when known.
		principal_arn: Option<String>,
		/// Target role of the exchange.
		role_arn: String,
		/// One-line summary of what the endpoint reported.
		reason: String,
		/// Multi-point checklist the user should walk through.
		remediation: String,
	},
	/// The federation endpoint rejected the assertion itself.
	#[error("{reason}\n\n{remediation}")]
	AssertionValidation {
		/// Metadata source URL advertised by the issuing service.
		issuer: String,
		/// One-line summary of what was rejected.
		reason: String,
		/// Guidance pointing at the provider metadata.
		remediation: String,
	},
	/// The federation endpoint returned a bundle missing required fields.
	#[error("Federation endpoint returned incomplete credentials (missing: {}).", .missing.join(", "))]
	IncompleteCredentials {
		/// Names of the absent or empty fields.
		missing: Vec<&'static str>,
	},
}
impl Error {
	/// Returns the taxonomy bucket this error belongs to.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Config(_) => ErrorKind::Configuration,
			Self::Upstream(_) => ErrorKind::UpstreamRequest,
			Self::Host(_) => ErrorKind::Host,
			Self::TrustConfiguration { .. } => ErrorKind::TrustConfiguration,
			Self::AssertionValidation { .. } => ErrorKind::AssertionValidation,
			Self::IncompleteCredentials { .. } => ErrorKind::IncompleteCredentials,
		}
	}

	/// Decides whether the failure terminates the process with a non-zero status.
	///
	/// A missing job credential is a pure configuration problem: the step is marked failed and
	/// the process exits cleanly. Every other failure is fatal.
	pub fn disposition(&self) -> Disposition {
		match self {
			Self::Config(ConfigError::MissingJobCredential) => Disposition::Graceful,
			_ => Disposition::Fatal,
		}
	}
}

/// Stable labels for the error taxonomy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	/// [`Error::Config`].
	Configuration,
	/// [`Error::Upstream`].
	UpstreamRequest,
	/// [`Error::Host`].
	Host,
	/// [`Error::TrustConfiguration`].
	TrustConfiguration,
	/// [`Error::AssertionValidation`].
	AssertionValidation,
	/// [`Error::IncompleteCredentials`].
	IncompleteCredentials,
}
impl ErrorKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ErrorKind::Configuration => "configuration",
			ErrorKind::UpstreamRequest => "upstream_request",
			ErrorKind::Host => "host",
			ErrorKind::TrustConfiguration => "trust_configuration",
			ErrorKind::AssertionValidation => "assertion_validation",
			ErrorKind::IncompleteCredentials => "incomplete_credentials",
		}
	}
}
impl Display for ErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// How the process should terminate after a classified failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
	/// Mark the step failed and exit with status 0.
	Graceful,
	/// Mark the step failed and exit with a non-zero status.
	Fatal,
}

/// Configuration and validation failures raised before any remote exchange succeeds.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// No job credential was supplied through the `token` input or `GITHUB_TOKEN`.
	#[error("Missing GITHUB_TOKEN environment variable")]
	MissingJobCredential,
	/// `GITHUB_REPOSITORY` is not set.
	#[error("Missing GITHUB_REPOSITORY environment variable")]
	MissingRepository,
	/// `GITHUB_REPOSITORY` is not in `owner/name` form.
	#[error(
		"Unable to parse owner and repo from GITHUB_REPOSITORY environment variable: {slug}"
	)]
	MalformedRepository {
		/// Raw slug read from the environment.
		slug: String,
	},
	/// A required step input is empty or absent.
	#[error("Input required and not supplied: {name}")]
	MissingInput {
		/// Input name as declared by the step.
		name: &'static str,
	},
	/// The issuing service response carried no (or incomplete) federation parameters.
	#[error("Missing sdk options from saml response")]
	MissingFederationParameters,
	/// A configured URL cannot be parsed or uses an unsupported scheme.
	#[error("Configured {name} URL is invalid: {value}.")]
	InvalidUrl {
		/// Which URL failed validation.
		name: &'static str,
		/// Offending value.
		value: String,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures reported by (or while talking to) the SAML issuing service.
#[derive(Debug, ThisError)]
pub enum UpstreamRequestError {
	/// The request failed; `message` is the richest detail available.
	#[error("Error: {message}")]
	Rejected {
		/// HTTP status code, when a response was received.
		status: Option<u16>,
		/// Resolved failure message.
		message: String,
		/// Set when the configuration lives in another repository.
		managed_elsewhere: Option<crate::issuer::ConfigLocation>,
	},
	/// A successful response body could not be decoded.
	#[error("Issuing service returned a malformed SAML response container.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
}
impl UpstreamRequestError {
	/// HTTP status code attached to the failure, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Rejected { status, .. } => *status,
			Self::MalformedResponse { status, .. } => Some(*status),
		}
	}
}
