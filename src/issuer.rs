//! Assertion requests against the SAML issuing service.

pub mod failure;
pub mod response;

pub use failure::*;
pub use response::*;

// crates.io
use reqwest::header::ACCEPT;
// self
use crate::{
	_prelude::*,
	auth::Secret,
	config::BrokerConfig,
	context::JobContext,
	error::{ConfigError, UpstreamRequestError},
	host::JobHost,
	http::ReqwestHttpClient,
};

/// Client for the issuing service's assume-role endpoint.
#[derive(Clone, Debug)]
pub struct IssuerClient {
	http: ReqwestHttpClient,
	base: Url,
	api_key: Option<Secret>,
}
impl IssuerClient {
	/// Creates a client for the configured issuing service.
	pub fn new(config: &BrokerConfig, http: ReqwestHttpClient) -> Self {
		Self { http, base: config.issuer_base.clone(), api_key: config.api_key.clone() }
	}

	/// Builds `{base}/api/v1/idp/{org}/{repo}/assume/{role}` with the optional query parameters.
	pub fn assume_url(&self, context: &JobContext) -> Result<Url, ConfigError> {
		let mut url = self.base.clone();

		url.path_segments_mut()
			.map_err(|_| ConfigError::InvalidUrl { name: "issuer", value: self.base.to_string() })?
			.pop_if_empty()
			.extend([
				"api",
				"v1",
				"idp",
				context.organization.as_ref(),
				context.repository_name.as_ref(),
				"assume",
				context.requested_role.as_str(),
			]);

		{
			let mut query = url.query_pairs_mut();

			if let Some(provider) = &context.requested_provider {
				query.append_pair("provider", provider);
			}
			if let Some(commit) = &context.commit_ref {
				query.append_pair("commitSha", commit);
			}

			query.append_pair("configOwner", &context.config_owner);
		}

		Ok(url)
	}

	/// Requests a SAML response for the job's role.
	///
	/// Exactly one request is made. On success the provider, recipient, and SAML attributes are
	/// logged; on failure the error is classified, and a 403 for configuration managed in another
	/// repository additionally logs an advisory before the error is returned.
	pub async fn request_assertion(
		&self,
		host: &dyn JobHost,
		context: &JobContext,
	) -> Result<SamlResponseContainer> {
		let container = match self.send(context).await? {
			Ok(container) => container,
			Err(failure) => return Err(classify_failure(host, context, &failure).into()),
		};

		host.info(&format!(
			"SAML Response generated for login to {} via {}",
			container.provider, container.recipient
		));

		if container.attributes().next().is_some() {
			host.info("\nSAML Attributes:");

			for (key, value) in container.attributes() {
				host.info(&format!(" - {key}: {value}"));
			}
		}

		Ok(container)
	}

	async fn send(
		&self,
		context: &JobContext,
	) -> Result<Result<SamlResponseContainer, IssuerFailure>> {
		let url = self.assume_url(context)?;
		let mut request = self
			.http
			.post(url)
			.bearer_auth(context.job_credential.expose())
			.header(ACCEPT, "application/json");

		if let Some(key) = &self.api_key {
			request = request.header("x-api-key", key.expose());
		}

		let response = match request.send().await {
			Ok(response) => response,
			Err(e) => return Ok(Err(IssuerFailure::Transport { message: e.to_string() })),
		};
		let status = response.status();
		let body = match response.bytes().await {
			Ok(body) => body,
			Err(e) => return Ok(Err(IssuerFailure::Transport { message: e.to_string() })),
		};

		if !status.is_success() {
			return Ok(Err(IssuerFailure::Status {
				status: status.as_u16(),
				body: ErrorBody::parse(&body),
			}));
		}

		let mut deserializer = serde_json::Deserializer::from_slice(&body);
		let container = serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
			UpstreamRequestError::MalformedResponse { source, status: status.as_u16() }
		})?;

		Ok(Ok(container))
	}
}

/// Turns a failed request into an [`UpstreamRequestError`], logging the ownership advisory
/// when it applies.
pub fn classify_failure(
	host: &dyn JobHost,
	context: &JobContext,
	failure: &IssuerFailure,
) -> UpstreamRequestError {
	let managed_elsewhere = foreign_config_location(failure, context.repository_name.as_ref());

	if let Some(location) = &managed_elsewhere {
		host.warning(&managed_elsewhere_advisory(context.organization.as_ref(), location));
	}

	UpstreamRequestError::Rejected {
		status: failure.status(),
		message: resolve_failure_message(failure),
		managed_elsewhere,
	}
}
