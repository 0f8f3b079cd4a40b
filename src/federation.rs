//! Federation endpoint contracts and fault classification.
//!
//! The broker talks to the cloud federation endpoint only through [`FederationEndpoint`], so
//! the exchange logic stays independent of any SDK. [`StsFederation`] is the AWS-backed
//! implementation; tests supply their own.

pub mod classify;
pub mod sts;

pub use classify::*;
pub use sts::StsFederation;

// self
use crate::{
	_prelude::*,
	auth::{CallerIdentity, CredentialBundle, RawCredentials, Secret},
	issuer::FederationParameters,
};

/// Boxed future returned by [`FederationEndpoint`] calls.
pub type FederationFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, FederationFault>> + 'a + Send>>;

/// Cloud federation endpoint able to exchange assertions and reflect identities.
pub trait FederationEndpoint
where
	Self: Send + Sync,
{
	/// Exchanges a SAML assertion for temporary credentials.
	fn assume_role_with_saml<'a>(
		&'a self,
		request: &'a FederationRequest,
	) -> FederationFuture<'a, RawCredentials>;

	/// Reports the identity the provided credentials resolve to.
	fn caller_identity<'a>(
		&'a self,
		credentials: &'a CredentialBundle,
		region: &'a str,
	) -> FederationFuture<'a, CallerIdentity>;
}

/// Everything the endpoint needs for a single exchange.
#[derive(Clone, Debug)]
pub struct FederationRequest {
	/// Region the call is made in.
	pub region: String,
	/// Trust anchor and target role.
	pub parameters: FederationParameters,
	/// Base64 SAML response.
	pub saml_assertion: Secret,
}

/// Error reported by the federation endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FederationFault {
	/// Service error code, when the endpoint returned one.
	pub code: Option<String>,
	/// Service or transport message.
	pub message: String,
}
impl FederationFault {
	/// Creates a fault carrying a service error code.
	pub fn coded(code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { code: Some(code.into()), message: message.into() }
	}

	/// Creates a fault without a service error code (transport, dispatch, timeouts).
	pub fn uncoded(message: impl Into<String>) -> Self {
		Self { code: None, message: message.into() }
	}

	/// Recognized meaning of the error code.
	pub fn kind(&self) -> FaultKind {
		FaultKind::from_code(self.code.as_deref())
	}
}
impl Display for FederationFault {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match &self.code {
			Some(code) => write!(f, "{code}: {}", self.message),
			None => f.write_str(&self.message),
		}
	}
}
impl StdError for FederationFault {}

/// Federation error codes the broker knows how to explain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaultKind {
	/// The trust anchor (SAML provider) is unknown to the account or cannot validate the token.
	UnrecognizedPrincipal,
	/// The assertion itself was rejected.
	InvalidAssertion,
	/// Anything else.
	Other,
}
impl FaultKind {
	/// Maps an endpoint error code onto a recognized kind.
	pub fn from_code(code: Option<&str>) -> Self {
		match code {
			Some("InvalidIdentityToken" | "InvalidIdentityTokenException") =>
				Self::UnrecognizedPrincipal,
			Some(
				"IDPRejectedClaim"
				| "IDPRejectedClaimException"
				| "ExpiredToken"
				| "ExpiredTokenException",
			) => Self::InvalidAssertion,
			_ => Self::Other,
		}
	}
}
