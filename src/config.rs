//! Broker configuration: issuing-service endpoints, API credentials, and regional defaults.

// self
use crate::{_prelude::*, auth::Secret, error::ConfigError, host::JobHost};

/// Region used when the step does not request one.
pub const DEFAULT_REGION: &str = "us-east-1";
/// Production issuing service.
pub const LIVE_ISSUER_URL: &str = "https://sso.saml.to/github";
/// Pre-production issuing service selected by `SAML_TO_NONLIVE`.
pub const NONLIVE_ISSUER_URL: &str = "https://sso-nonlive.saml.to/github";
/// Base of the per-organization identity-provider metadata download.
pub const METADATA_BASE_URL: &str = "https://saml.to/metadata/github";

/// Validated broker configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrokerConfig {
	/// Base URL of the SAML issuing service API.
	pub issuer_base: Url,
	/// Optional API key sent as `x-api-key`.
	pub api_key: Option<Secret>,
	/// Region used when the step does not request one.
	pub default_region: String,
	/// Base URL of the identity-provider metadata download.
	pub metadata_base: Url,
}
impl BrokerConfig {
	/// Creates a builder seeded with the production defaults.
	pub fn builder() -> BrokerConfigBuilder {
		BrokerConfigBuilder::default()
	}

	/// Reads the configuration from the host environment.
	///
	/// `SAML_TO_API_URL` overrides the issuing service outright; otherwise `SAML_TO_NONLIVE`
	/// selects the pre-production service. `SAML_TO_API_KEY` is attached when present.
	pub fn from_host(host: &dyn JobHost) -> Result<Self, ConfigError> {
		let mut builder = Self::builder();

		if let Some(url) = host.env("SAML_TO_API_URL") {
			builder = builder.issuer_base(url);
		} else if host.env("SAML_TO_NONLIVE").is_some() {
			builder = builder.issuer_base(NONLIVE_ISSUER_URL);
		}
		if let Some(key) = host.env("SAML_TO_API_KEY") {
			builder = builder.api_key(key);
		}

		builder.build()
	}

	/// URL where the organization's identity-provider metadata can be downloaded.
	pub fn metadata_url(&self, organization: &str) -> String {
		format!("{}/{organization}", self.metadata_base.as_str().trim_end_matches('/'))
	}
}

/// Builder for [`BrokerConfig`] values.
#[derive(Debug)]
pub struct BrokerConfigBuilder {
	/// Raw issuing service URL.
	pub issuer_base: String,
	/// Optional API key.
	pub api_key: Option<Secret>,
	/// Region used when the step does not request one.
	pub default_region: String,
	/// Raw metadata base URL.
	pub metadata_base: String,
}
impl Default for BrokerConfigBuilder {
	fn default() -> Self {
		Self {
			issuer_base: LIVE_ISSUER_URL.into(),
			api_key: None,
			default_region: DEFAULT_REGION.into(),
			metadata_base: METADATA_BASE_URL.into(),
		}
	}
}
impl BrokerConfigBuilder {
	/// Overrides the issuing service base URL.
	pub fn issuer_base(mut self, url: impl Into<String>) -> Self {
		self.issuer_base = url.into();

		self
	}

	/// Sets the API key.
	pub fn api_key(mut self, key: impl Into<Secret>) -> Self {
		self.api_key = Some(key.into());

		self
	}

	/// Overrides the default region.
	pub fn default_region(mut self, region: impl Into<String>) -> Self {
		self.default_region = region.into();

		self
	}

	/// Overrides the metadata base URL.
	pub fn metadata_base(mut self, url: impl Into<String>) -> Self {
		self.metadata_base = url.into();

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<BrokerConfig, ConfigError> {
		let issuer_base = parse_http_url("issuer", &self.issuer_base)?;
		let metadata_base = parse_http_url("metadata", &self.metadata_base)?;

		if self.default_region.trim().is_empty() {
			return Err(ConfigError::MissingInput { name: "region" });
		}

		Ok(BrokerConfig {
			issuer_base,
			api_key: self.api_key.filter(|key| !key.is_empty()),
			default_region: self.default_region,
			metadata_base,
		})
	}
}

fn parse_http_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
	let invalid = || ConfigError::InvalidUrl { name, value: raw.to_owned() };
	let url = Url::parse(raw).map_err(|_| invalid())?;

	match url.scheme() {
		"http" | "https" if url.has_host() => Ok(url),
		_ => Err(invalid()),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::host::MemoryHost;

	#[test]
	fn defaults_target_the_live_service() {
		let config = BrokerConfig::builder().build().expect("Defaults should validate.");

		assert_eq!(config.issuer_base.as_str(), "https://sso.saml.to/github");
		assert_eq!(config.default_region, "us-east-1");
		assert_eq!(config.metadata_url("saml-to"), "https://saml.to/metadata/github/saml-to");
		assert!(config.api_key.is_none());
	}

	#[test]
	fn host_environment_selects_nonlive_and_api_key() {
		let host =
			MemoryHost::default().with_env("SAML_TO_NONLIVE", "true").with_env("SAML_TO_API_KEY", "k");
		let config = BrokerConfig::from_host(&host).expect("Nonlive configuration should validate.");

		assert_eq!(config.issuer_base.as_str(), "https://sso-nonlive.saml.to/github");
		assert_eq!(config.api_key.as_ref().map(Secret::expose), Some("k"));

		let host = MemoryHost::default()
			.with_env("SAML_TO_NONLIVE", "true")
			.with_env("SAML_TO_API_URL", "http://127.0.0.1:9000/github");
		let config = BrokerConfig::from_host(&host).expect("Override should validate.");

		assert_eq!(config.issuer_base.as_str(), "http://127.0.0.1:9000/github");
	}

	#[test]
	fn rejects_unusable_urls() {
		for raw in ["not a url", "ftp://example.com", "mailto:someone@example.com"] {
			let err = BrokerConfig::builder()
				.issuer_base(raw)
				.build()
				.expect_err("Unusable URLs should be rejected.");

			assert!(matches!(err, ConfigError::InvalidUrl { name: "issuer", .. }));
		}
	}
}
