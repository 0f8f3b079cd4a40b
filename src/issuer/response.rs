//! Wire models exchanged with the SAML issuing service.

// self
use crate::{_prelude::*, auth::Secret};

/// SAML response produced for a single assume-role request.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamlResponseContainer {
	/// Identity provider that issued the assertion.
	pub provider: String,
	/// Endpoint the assertion targets.
	pub recipient: String,
	/// Metadata source URL of the issuer.
	pub issuer: String,
	/// Base64 SAML response blob.
	pub saml_response: Secret,
	/// Parameters for the federation exchange.
	#[serde(default)]
	pub sdk_options: Option<FederationParameters>,
	/// SAML attributes asserted for the session.
	#[serde(default)]
	pub attributes: Option<BTreeMap<String, String>>,
}
impl SamlResponseContainer {
	/// Iterates over the asserted attributes in key order.
	pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
		self.attributes.iter().flatten().map(|(key, value)| (key.as_str(), value.as_str()))
	}
}

/// Federation parameters embedded in the SAML response container.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FederationParameters {
	/// Trust anchor (SAML provider) ARN.
	pub principal_arn: String,
	/// Target role ARN.
	pub role_arn: String,
	/// Requested session duration.
	#[serde(default)]
	pub duration_seconds: Option<i32>,
}
impl FederationParameters {
	/// Returns `true` when both ARNs are present.
	pub fn is_complete(&self) -> bool {
		!self.principal_arn.trim().is_empty() && !self.role_arn.trim().is_empty()
	}
}

/// Structured error body returned alongside non-2xx statuses.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
	/// Human-readable failure message.
	#[serde(default)]
	pub message: Option<String>,
	/// Where the governing configuration lives.
	#[serde(default)]
	pub context: Option<ErrorContext>,
}
impl ErrorBody {
	/// Parses a body leniently; anything that is not the expected JSON shape yields `None`.
	pub fn parse(body: &[u8]) -> Option<Self> {
		serde_json::from_slice(body).ok()
	}
}

/// Configuration context attached to ownership errors.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorContext {
	/// Owner of the configuration.
	#[serde(default)]
	pub org: Option<String>,
	/// Repository holding the configuration.
	#[serde(default)]
	pub repo: Option<String>,
	/// Configuration file name.
	#[serde(default)]
	pub config_file: Option<String>,
}
impl ErrorContext {
	/// Returns the location when every component is present.
	pub fn location(&self) -> Option<ConfigLocation> {
		match (&self.org, &self.repo, &self.config_file) {
			(Some(org), Some(repo), Some(config_file))
				if !org.is_empty() && !repo.is_empty() && !config_file.is_empty() =>
				Some(ConfigLocation {
					org: org.clone(),
					repo: repo.clone(),
					config_file: config_file.clone(),
				}),
			_ => None,
		}
	}
}

/// Fully specified configuration location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigLocation {
	/// Owner of the configuration.
	pub org: String,
	/// Repository holding the configuration.
	pub repo: String,
	/// Configuration file name.
	pub config_file: String,
}
