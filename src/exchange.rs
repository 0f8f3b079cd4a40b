//! Credential exchange: assertion → temporary credentials → confirmed identity → published.

// crates.io
use time::format_description::well_known::Rfc3339;
// self
use crate::{
	_prelude::*,
	auth::{CallerIdentity, CredentialBundle},
	config::BrokerConfig,
	context::JobContext,
	error::ConfigError,
	federation::{FaultContext, FederationEndpoint, FederationRequest, classify_fault},
	host::JobHost,
	issuer::SamlResponseContainer,
};

/// Environment variables exported for the remaining steps of the job.
pub const EXPORTED_VARIABLES: [&str; 4] =
	["AWS_DEFAULT_REGION", "AWS_ACCESS_KEY_ID", "AWS_SECRET_ACCESS_KEY", "AWS_SESSION_TOKEN"];
/// Outputs published for dependent steps.
pub const OUTPUTS: [&str; 8] = [
	"region",
	"accountId",
	"userId",
	"roleArn",
	"assumedRoleArn",
	"accessKeyId",
	"secretAccessKey",
	"sessionToken",
];

/// Credentials minted for the target role together with the identity they resolve to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExchangedCredentials {
	/// Target role from the federation parameters.
	pub role_arn: String,
	/// Validated credential bundle.
	pub bundle: CredentialBundle,
	/// Identity confirmed by the reflection call.
	pub identity: CallerIdentity,
}

/// Record of what was handed to the CI host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishedCredentials {
	/// Region the credentials were minted for.
	pub region: String,
	/// Exchanged credentials and identity.
	pub credentials: ExchangedCredentials,
	/// Names of the exported environment variables.
	pub exported: Vec<&'static str>,
	/// Names of the published outputs.
	pub outputs: Vec<&'static str>,
}

/// Presents the assertion to the federation endpoint and verifies the resulting identity.
///
/// The assertion is forwarded as received; judging it is left to the endpoint. Nothing is
/// published here, so a failure at any point leaves the host untouched.
pub async fn exchange(
	federation: &dyn FederationEndpoint,
	config: &BrokerConfig,
	context: &JobContext,
	container: &SamlResponseContainer,
) -> Result<ExchangedCredentials> {
	let parameters = container
		.sdk_options
		.as_ref()
		.filter(|options| options.is_complete())
		.ok_or(ConfigError::MissingFederationParameters)?;
	let metadata_url = config.metadata_url(context.organization.as_ref());
	let fault_context = FaultContext {
		requested_role: &context.requested_role,
		requested_provider: context.requested_provider.as_deref(),
		parameters,
		issuer: &container.issuer,
		metadata_url: &metadata_url,
	};
	let request = FederationRequest {
		region: context.region.clone(),
		parameters: parameters.clone(),
		saml_assertion: container.saml_response.clone(),
	};
	let raw = federation
		.assume_role_with_saml(&request)
		.await
		.map_err(|fault| classify_fault(&fault, &fault_context))?;
	let bundle = CredentialBundle::from_raw(raw)?;
	let identity = federation
		.caller_identity(&bundle, &context.region)
		.await
		.map_err(|fault| classify_fault(&fault, &fault_context))?;

	Ok(ExchangedCredentials { role_arn: parameters.role_arn.clone(), bundle, identity })
}

/// Exports the credentials and outputs, then logs a confirmation line free of secrets.
pub fn publish(
	host: &dyn JobHost,
	region: &str,
	credentials: ExchangedCredentials,
) -> Result<PublishedCredentials> {
	let ExchangedCredentials { role_arn, bundle, identity } = &credentials;
	let secret_access_key = bundle.secret_access_key.expose();
	let session_token = bundle.session_token.expose();

	host.mask(secret_access_key);
	host.mask(session_token);

	let exports: [&str; 4] = [region, &bundle.access_key_id, secret_access_key, session_token];

	for (name, value) in EXPORTED_VARIABLES.into_iter().zip(exports) {
		host.export_variable(name, value)?;
	}

	let outputs: [&str; 8] = [
		region,
		&identity.account,
		&identity.user_id,
		role_arn,
		&identity.arn,
		&bundle.access_key_id,
		secret_access_key,
		session_token,
	];

	for (name, value) in OUTPUTS.into_iter().zip(outputs) {
		host.set_output(name, value)?;
	}

	let expiration =
		bundle.expiration.format(&Rfc3339).unwrap_or_else(|_| bundle.expiration.to_string());

	host.info(&format!(
		"\nAssumed {role_arn}: {} (Credential expiration at {expiration})",
		identity.arn
	));

	Ok(PublishedCredentials {
		region: region.to_owned(),
		credentials,
		exported: EXPORTED_VARIABLES.to_vec(),
		outputs: OUTPUTS.to_vec(),
	})
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;
	use crate::{
		auth::{Organization, RawCredentials, RepositoryName, Secret},
		federation::{FederationFault, FederationFuture},
		host::{LogLevel, MemoryHost},
		issuer::FederationParameters,
	};

	#[derive(Default)]
	struct RecordingEndpoint {
		assertions: Mutex<Vec<String>>,
	}
	impl FederationEndpoint for RecordingEndpoint {
		fn assume_role_with_saml<'a>(
			&'a self,
			request: &'a FederationRequest,
		) -> FederationFuture<'a, RawCredentials> {
			Box::pin(async move {
				self.assertions.lock().push(request.saml_assertion.expose().to_owned());

				Ok(RawCredentials {
					access_key_id: Some("ASIAEXAMPLE".into()),
					secret_access_key: Some(Secret::new("secret-key")),
					session_token: Some(Secret::new("session-token")),
					expiration: Some(datetime!(2030-01-01 12:00 UTC)),
				})
			})
		}

		fn caller_identity<'a>(
			&'a self,
			_: &'a CredentialBundle,
			_: &'a str,
		) -> FederationFuture<'a, CallerIdentity> {
			Box::pin(async { Err(FederationFault::coded("InvalidIdentityToken", "not trusted")) })
		}
	}

	fn context() -> JobContext {
		JobContext {
			organization: Organization::new("acme").expect("Fixture org should be valid."),
			repository_name: RepositoryName::new("app").expect("Fixture repo should be valid."),
			job_credential: Secret::new("ghs_job"),
			requested_role: "arn:aws:iam::123:role/Y".into(),
			requested_provider: None,
			region: "us-east-1".into(),
			commit_ref: None,
			config_owner: "acme".into(),
		}
	}

	fn container(saml_response: &str) -> SamlResponseContainer {
		SamlResponseContainer {
			provider: "aws".into(),
			recipient: "https://signin.aws.amazon.com/saml".into(),
			issuer: "https://saml.to/metadata/github/acme".into(),
			saml_response: Secret::new(saml_response),
			sdk_options: Some(FederationParameters {
				principal_arn: "arn:aws:iam::123:saml-provider/X".into(),
				role_arn: "arn:aws:iam::123:role/Y".into(),
				duration_seconds: None,
			}),
			attributes: None,
		}
	}

	#[tokio::test]
	async fn line_wrapped_assertion_is_forwarded_untouched() {
		let endpoint = RecordingEndpoint::default();
		let config = BrokerConfig::builder().build().expect("Default config should build.");
		let wrapped = "PHNhbWxwOlJl\r\nc3BvbnNlLz4=";
		let err = exchange(&endpoint, &config, &context(), &container(wrapped))
			.await
			.expect_err("Identity reflection should fail.");

		assert_eq!(*endpoint.assertions.lock(), vec![wrapped.to_owned()]);
		assert!(matches!(err, Error::TrustConfiguration { .. }));
	}

	fn exchanged() -> ExchangedCredentials {
		ExchangedCredentials {
			role_arn: "arn:aws:iam::123:role/Y".into(),
			bundle: CredentialBundle {
				access_key_id: "ASIAEXAMPLE".into(),
				secret_access_key: Secret::new("secret-key"),
				session_token: Secret::new("session-token"),
				expiration: datetime!(2030-01-01 12:00 UTC),
			},
			identity: CallerIdentity {
				account: "123".into(),
				user_id: "AROAEXAMPLE:octocat".into(),
				arn: "arn:aws:sts::123:assumed-role/Y/octocat".into(),
			},
		}
	}

	#[test]
	fn publishes_four_exports_and_eight_outputs() {
		let host = MemoryHost::default();
		let published = publish(&host, "eu-west-1", exchanged()).expect("Publish should succeed.");
		let state = host.snapshot();

		assert_eq!(state.exports.len(), 4);
		assert_eq!(state.outputs.len(), 8);
		assert_eq!(published.exported.len(), 4);
		assert_eq!(published.outputs.len(), 8);
		assert_eq!(host.exported("AWS_DEFAULT_REGION").as_deref(), Some("eu-west-1"));
		assert_eq!(host.exported("AWS_SECRET_ACCESS_KEY").as_deref(), Some("secret-key"));
		assert_eq!(host.output("accountId").as_deref(), Some("123"));
		assert_eq!(host.output("userId").as_deref(), Some("AROAEXAMPLE:octocat"));
		assert_eq!(host.output("roleArn").as_deref(), Some("arn:aws:iam::123:role/Y"));
		assert_eq!(
			host.output("assumedRoleArn").as_deref(),
			Some("arn:aws:sts::123:assumed-role/Y/octocat")
		);
		assert_eq!(host.output("sessionToken").as_deref(), Some("session-token"));
		assert_eq!(state.masks, vec!["secret-key".to_owned(), "session-token".to_owned()]);
	}

	#[test]
	fn confirmation_line_omits_secrets() {
		let host = MemoryHost::default();

		publish(&host, "us-east-1", exchanged()).expect("Publish should succeed.");

		let info = host.lines(LogLevel::Info);

		assert_eq!(
			info,
			vec![
				"\nAssumed arn:aws:iam::123:role/Y: arn:aws:sts::123:assumed-role/Y/octocat (Credential expiration at 2030-01-01T12:00:00Z)"
					.to_owned()
			]
		);

		let transcript = host.transcript();

		assert!(!transcript.contains("secret-key"));
		assert!(!transcript.contains("session-token"));
	}
}
