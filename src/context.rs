//! Job-identity resolution from the CI host.

// self
use crate::{
	_prelude::*,
	auth::{Organization, RepositoryName, RepositorySlug, Secret},
	config::BrokerConfig,
	error::ConfigError,
	host::JobHost,
};

/// Immutable identity of the job requesting credentials.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobContext {
	/// Owner of the repository running the job.
	pub organization: Organization,
	/// Repository running the job.
	pub repository_name: RepositoryName,
	/// Bearer token for the issuing service; never logged.
	pub job_credential: Secret,
	/// Target role identifier.
	pub requested_role: String,
	/// Explicitly requested identity provider, if any.
	pub requested_provider: Option<String>,
	/// Region the credentials are minted for.
	pub region: String,
	/// Commit the job runs against.
	pub commit_ref: Option<String>,
	/// Owner of the configuration file; defaults to the organization.
	pub config_owner: String,
}
impl JobContext {
	/// Resolves the context from step inputs and environment facts.
	///
	/// Nothing here touches the network. The job credential is checked first so a missing
	/// token is reported even when the rest of the environment is also incomplete.
	pub fn resolve(host: &dyn JobHost, config: &BrokerConfig) -> Result<Self> {
		let job_credential = host
			.input("token")
			.or_else(|| host.env("GITHUB_TOKEN"))
			.map(Secret::new)
			.ok_or(ConfigError::MissingJobCredential)?;
		let slug = host.env("GITHUB_REPOSITORY").ok_or(ConfigError::MissingRepository)?;
		let RepositorySlug { owner, name } = RepositorySlug::parse(&slug)?;
		let requested_role = host.input("role").ok_or(ConfigError::MissingInput { name: "role" })?;
		let requested_provider = host.input("provider");
		let region = host.input("region").unwrap_or_else(|| config.default_region.clone());
		let config_owner = host.input("configOwner").unwrap_or_else(|| owner.to_string());
		let context = Self {
			organization: owner,
			repository_name: name,
			job_credential,
			requested_role,
			requested_provider,
			region,
			commit_ref: host.env("GITHUB_SHA"),
			config_owner,
		};

		host.info(&context.announcement());

		Ok(context)
	}

	/// Line announcing which role is about to be assumed.
	pub fn announcement(&self) -> String {
		match &self.requested_provider {
			Some(provider) =>
				format!("Assuming {provider} Role: {} in {}", self.requested_role, self.region),
			None => format!("Assuming Role: {} in {}", self.requested_role, self.region),
		}
	}
}
