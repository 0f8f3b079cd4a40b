#![allow(dead_code)]

// std
use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};
// crates.io
use httpmock::prelude::*;
use serde_json::json;
use time::{Duration, OffsetDateTime};
// self
use saml_role_broker::{
	auth::{CallerIdentity, CredentialBundle, RawCredentials, Secret},
	config::BrokerConfig,
	federation::{FederationEndpoint, FederationFault, FederationFuture, FederationRequest},
	flow::Broker,
	host::MemoryHost,
	http::ReqwestHttpClient,
};

pub const JOB_TOKEN: &str = "ghs_job_token";
pub const ROLE_ARN: &str = "arn:aws:iam::123456789012:role/deploy";
pub const PRINCIPAL_ARN: &str = "arn:aws:iam::123456789012:saml-provider/saml.to";
pub const ISSUER: &str = "https://saml.to/metadata/github/acme";
pub const ASSUMED_ARN: &str = "arn:aws:sts::123456789012:assumed-role/deploy/octocat";
// "<samlp:Response/>"
pub const SAML_RESPONSE: &str = "PHNhbWxwOlJlc3BvbnNlLz4=";

/// What the mock endpoint does on `AssumeRoleWithSAML`.
pub enum Exchange {
	Mint,
	Partial(RawCredentials),
	Fault(FederationFault),
}

/// Stateless federation endpoint that mints a fresh bundle per call.
pub struct MockFederation {
	exchange: Exchange,
	reflection_fault: Option<FederationFault>,
	exchanges: AtomicUsize,
	reflections: AtomicUsize,
}
impl MockFederation {
	pub fn minting() -> Arc<Self> {
		Self::with(Exchange::Mint)
	}

	pub fn with(exchange: Exchange) -> Arc<Self> {
		Arc::new(Self {
			exchange,
			reflection_fault: None,
			exchanges: AtomicUsize::new(0),
			reflections: AtomicUsize::new(0),
		})
	}

	/// Mints credentials but fails the identity reflection.
	pub fn failing_reflection(fault: FederationFault) -> Arc<Self> {
		Arc::new(Self {
			exchange: Exchange::Mint,
			reflection_fault: Some(fault),
			exchanges: AtomicUsize::new(0),
			reflections: AtomicUsize::new(0),
		})
	}

	pub fn exchanges(&self) -> usize {
		self.exchanges.load(Ordering::SeqCst)
	}

	pub fn reflections(&self) -> usize {
		self.reflections.load(Ordering::SeqCst)
	}
}
impl FederationEndpoint for MockFederation {
	fn assume_role_with_saml<'a>(
		&'a self,
		request: &'a FederationRequest,
	) -> FederationFuture<'a, RawCredentials> {
		Box::pin(async move {
			let n = self.exchanges.fetch_add(1, Ordering::SeqCst) + 1;

			assert_eq!(request.saml_assertion.expose(), SAML_RESPONSE);
			assert_eq!(request.parameters.principal_arn, PRINCIPAL_ARN);

			match &self.exchange {
				Exchange::Mint => Ok(RawCredentials {
					access_key_id: Some(format!("ASIAMOCK{n:04}")),
					secret_access_key: Some(Secret::new(format!("mock-secret-{n}"))),
					session_token: Some(Secret::new(format!("mock-session-{n}"))),
					expiration: Some(OffsetDateTime::now_utc() + Duration::hours(1)),
				}),
				Exchange::Partial(raw) => Ok(raw.clone()),
				Exchange::Fault(fault) => Err(fault.clone()),
			}
		})
	}

	fn caller_identity<'a>(
		&'a self,
		credentials: &'a CredentialBundle,
		_: &'a str,
	) -> FederationFuture<'a, CallerIdentity> {
		Box::pin(async move {
			self.reflections.fetch_add(1, Ordering::SeqCst);

			if let Some(fault) = &self.reflection_fault {
				return Err(fault.clone());
			}

			Ok(CallerIdentity {
				account: "123456789012".into(),
				user_id: format!("AROAMOCK:{}", credentials.access_key_id),
				arn: ASSUMED_ARN.into(),
			})
		})
	}
}

pub fn host(repository: &str) -> MemoryHost {
	MemoryHost::default()
		.with_env("GITHUB_TOKEN", JOB_TOKEN)
		.with_env("GITHUB_REPOSITORY", repository)
		.with_env("GITHUB_SHA", "0123abcd")
		.with_input("role", ROLE_ARN)
		.with_input("region", "eu-west-1")
}

pub fn broker(server: &MockServer, federation: Arc<dyn FederationEndpoint>) -> Broker {
	let config = BrokerConfig::builder()
		.issuer_base(server.url("/github"))
		.build()
		.expect("Broker config should build against the mock server.");
	let http = ReqwestHttpClient::new().expect("HTTP client should build.");

	Broker::new(config, http, federation)
}

pub fn container_body() -> String {
	json!({
		"provider": "aws",
		"recipient": "https://signin.aws.amazon.com/saml",
		"issuer": ISSUER,
		"samlResponse": SAML_RESPONSE,
		"sdkOptions": { "PrincipalArn": PRINCIPAL_ARN, "RoleArn": ROLE_ARN, "DurationSeconds": 3600 },
		"attributes": { "https://aws.amazon.com/SAML/Attributes/RoleSessionName": "octocat" }
	})
	.to_string()
}

pub async fn issuer_ok(server: &MockServer) -> httpmock::Mock<'_> {
	server
		.mock_async(|when, then| {
			when.method(POST).header("authorization", format!("Bearer {JOB_TOKEN}"));
			then.status(200).header("content-type", "application/json").body(container_body());
		})
		.await
}
