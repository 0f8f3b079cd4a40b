//! AWS STS implementation of [`FederationEndpoint`].

// std
use std::time::SystemTime;
// crates.io
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_sts::{
	Client as StsClient,
	config::{Builder as StsConfigBuilder, Credentials as StsCredentials},
	error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
	primitives::DateTime,
};
// self
use crate::{
	_prelude::*,
	auth::{CallerIdentity, CredentialBundle, RawCredentials, Secret},
	federation::{FederationEndpoint, FederationFault, FederationFuture, FederationRequest},
};

const PROVIDER_NAME: &str = "saml-role-broker";

/// Federation endpoint backed by the AWS SDK.
///
/// `AssumeRoleWithSAML` is an unsigned call, so the shared configuration is loaded without a
/// credentials provider. Identity reflection signs with the freshly minted credentials only.
#[derive(Clone, Debug)]
pub struct StsFederation {
	sdk_config: SdkConfig,
}
impl StsFederation {
	/// Loads the shared SDK configuration (endpoint overrides, retry and timeout defaults) from
	/// the environment, deliberately without ambient credentials.
	pub async fn load() -> Self {
		let sdk_config = aws_config::defaults(BehaviorVersion::latest()).no_credentials().load().await;

		Self { sdk_config }
	}

	/// Wraps an existing SDK configuration.
	pub fn with_config(sdk_config: SdkConfig) -> Self {
		Self { sdk_config }
	}

	fn client(&self, region: &str, credentials: Option<StsCredentials>) -> StsClient {
		let mut builder =
			StsConfigBuilder::from(&self.sdk_config).region(Region::new(region.to_owned()));

		if let Some(credentials) = credentials {
			builder = builder.credentials_provider(credentials);
		}

		StsClient::from_conf(builder.build())
	}
}
impl FederationEndpoint for StsFederation {
	fn assume_role_with_saml<'a>(
		&'a self,
		request: &'a FederationRequest,
	) -> FederationFuture<'a, RawCredentials> {
		Box::pin(async move {
			let client = self.client(&request.region, None);
			let output = client
				.assume_role_with_saml()
				.principal_arn(&request.parameters.principal_arn)
				.role_arn(&request.parameters.role_arn)
				.saml_assertion(request.saml_assertion.expose())
				.set_duration_seconds(request.parameters.duration_seconds)
				.send()
				.await
				.map_err(map_sdk_error)?;
			let Some(credentials) = output.credentials() else {
				return Ok(RawCredentials::default());
			};

			Ok(RawCredentials {
				access_key_id: Some(credentials.access_key_id().to_owned()),
				secret_access_key: Some(Secret::new(credentials.secret_access_key())),
				session_token: Some(Secret::new(credentials.session_token())),
				expiration: to_offset_date_time(credentials.expiration()),
			})
		})
	}

	fn caller_identity<'a>(
		&'a self,
		credentials: &'a CredentialBundle,
		region: &'a str,
	) -> FederationFuture<'a, CallerIdentity> {
		Box::pin(async move {
			let signing = StsCredentials::new(
				credentials.access_key_id.clone(),
				credentials.secret_access_key.expose().to_owned(),
				Some(credentials.session_token.expose().to_owned()),
				Some(SystemTime::from(credentials.expiration)),
				PROVIDER_NAME,
			);
			let output = self
				.client(region, Some(signing))
				.get_caller_identity()
				.send()
				.await
				.map_err(map_sdk_error)?;

			Ok(CallerIdentity {
				account: reflected("Account", output.account())?,
				user_id: reflected("UserId", output.user_id())?,
				arn: reflected("Arn", output.arn())?,
			})
		})
	}
}

fn map_sdk_error<E, R>(err: SdkError<E, R>) -> FederationFault
where
	E: 'static + StdError + ProvideErrorMetadata,
	R: Debug,
{
	match err.code() {
		Some(code) => {
			let message = err.message().map(str::to_owned);
			let code = code.to_owned();

			FederationFault::coded(
				code,
				message.unwrap_or_else(|| DisplayErrorContext(&err).to_string()),
			)
		},
		None => FederationFault::uncoded(DisplayErrorContext(&err).to_string()),
	}
}

fn reflected(field: &'static str, value: Option<&str>) -> Result<String, FederationFault> {
	value
		.filter(|value| !value.is_empty())
		.map(str::to_owned)
		.ok_or_else(|| FederationFault::uncoded(format!("GetCallerIdentity returned no {field}.")))
}

fn to_offset_date_time(value: &DateTime) -> Option<OffsetDateTime> {
	OffsetDateTime::from_unix_timestamp_nanos(value.as_nanos()).ok()
}
