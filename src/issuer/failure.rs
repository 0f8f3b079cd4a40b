//! Classification of failed assertion requests.
//!
//! A failed request is either a transport error (no response) or a non-2xx response with an
//! optional structured body. [`resolve_failure_message`] picks the richest message available;
//! [`foreign_config_location`] detects configuration that is managed in another repository.

// self
use crate::{
	_prelude::*,
	issuer::{ConfigLocation, ErrorBody},
};

const CENTRAL_CONFIG_DOCS: &str =
	"https://docs.saml.to/usage/github-actions/assume-aws-role-action#centrally-managed-configuration";

/// Union of the ways an assertion request can fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IssuerFailure {
	/// No response was received.
	Transport {
		/// Transport error text.
		message: String,
	},
	/// The service answered with a non-2xx status.
	Status {
		/// HTTP status code.
		status: u16,
		/// Structured body, when the payload matched the expected shape.
		body: Option<ErrorBody>,
	},
}
impl IssuerFailure {
	/// HTTP status code, when a response was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Transport { .. } => None,
			Self::Status { status, .. } => Some(*status),
		}
	}

	/// Structured body, when one was received and parsed.
	pub fn body(&self) -> Option<&ErrorBody> {
		match self {
			Self::Transport { .. } => None,
			Self::Status { body, .. } => body.as_ref(),
		}
	}

	/// Generic message describing the failure without consulting the body.
	pub fn transport_message(&self) -> String {
		match self {
			Self::Transport { message } => message.clone(),
			Self::Status { status, .. } => format!("Request failed with status code {status}"),
		}
	}
}

/// Resolves the message reported for a failed request.
///
/// Candidates in priority order:
/// 1. the non-empty `message` field of the structured body,
/// 2. the transport-level message.
pub fn resolve_failure_message(failure: &IssuerFailure) -> String {
	let candidates = [
		failure.body().and_then(|body| body.message.clone()).filter(|m| !m.trim().is_empty()),
		Some(failure.transport_message()),
	];

	candidates.into_iter().flatten().next().unwrap_or_default()
}

/// Returns the configuration location when a 403 says the configuration for this organization
/// lives in a different repository than the current one.
pub fn foreign_config_location(failure: &IssuerFailure, current_repo: &str) -> Option<ConfigLocation> {
	if failure.status() != Some(403) {
		return None;
	}

	failure
		.body()
		.and_then(|body| body.context.as_ref())
		.and_then(|context| context.location())
		.filter(|location| location.repo != current_repo)
}

/// Advisory pointing the user at the centrally managed configuration.
pub fn managed_elsewhere_advisory(organization: &str, location: &ConfigLocation) -> String {
	format!(
		"The SAML.to configuration for `{organization}` is managed in a separate repository:
  User/Org: {}
  Repo: {}
  File: {}

Provider configuration and role permissions must be made there.

For more information on configuration files managed in a separate repository, visit:
{CENTRAL_CONFIG_DOCS}
",
		location.org, location.repo, location.config_file,
	)
}
