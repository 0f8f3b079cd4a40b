//! Temporary credential bundles minted by the federation endpoint.

// self
use crate::{_prelude::*, auth::Secret};

/// Credentials exactly as the federation endpoint returned them; nothing is guaranteed present.
#[derive(Clone, Debug, Default)]
pub struct RawCredentials {
	/// Access key identifier.
	pub access_key_id: Option<String>,
	/// Secret access key.
	pub secret_access_key: Option<Secret>,
	/// Session token bound to the temporary credentials.
	pub session_token: Option<Secret>,
	/// Instant after which the credentials stop working.
	pub expiration: Option<OffsetDateTime>,
}

/// Validated temporary credentials. Every field is present and non-empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CredentialBundle {
	/// Access key identifier.
	pub access_key_id: String,
	/// Secret access key; never logged.
	pub secret_access_key: Secret,
	/// Session token; never logged.
	pub session_token: Secret,
	/// Instant after which the credentials stop working.
	pub expiration: OffsetDateTime,
}
impl CredentialBundle {
	/// Validates a raw bundle, rejecting it as a whole when any field is absent or empty.
	pub fn from_raw(raw: RawCredentials) -> Result<Self> {
		let mut missing = Vec::new();
		let access_key_id = raw.access_key_id.filter(|value| !value.is_empty());
		let secret_access_key = raw.secret_access_key.filter(|value| !value.is_empty());
		let session_token = raw.session_token.filter(|value| !value.is_empty());

		if access_key_id.is_none() {
			missing.push("accessKeyId");
		}
		if secret_access_key.is_none() {
			missing.push("secretAccessKey");
		}
		if session_token.is_none() {
			missing.push("sessionToken");
		}
		if raw.expiration.is_none() {
			missing.push("expiration");
		}

		match (access_key_id, secret_access_key, session_token, raw.expiration) {
			(Some(access_key_id), Some(secret_access_key), Some(session_token), Some(expiration)) =>
				Ok(Self { access_key_id, secret_access_key, session_token, expiration }),
			_ => Err(Error::IncompleteCredentials { missing }),
		}
	}
}
impl TryFrom<RawCredentials> for CredentialBundle {
	type Error = Error;

	fn try_from(raw: RawCredentials) -> Result<Self> {
		Self::from_raw(raw)
	}
}

/// Identity confirmed by the federation endpoint's reflection call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallerIdentity {
	/// Account the assumed role lives in.
	pub account: String,
	/// Unique identifier of the assumed session.
	pub user_id: String,
	/// Full assumed-role ARN.
	pub arn: String,
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	fn complete() -> RawCredentials {
		RawCredentials {
			access_key_id: Some("ASIAEXAMPLE".into()),
			secret_access_key: Some(Secret::new("secret-key")),
			session_token: Some(Secret::new("session-token")),
			expiration: Some(datetime!(2030-01-01 00:00 UTC)),
		}
	}

	#[test]
	fn complete_bundle_validates() {
		let bundle = CredentialBundle::from_raw(complete()).expect("Complete bundle should pass.");

		assert_eq!(bundle.access_key_id, "ASIAEXAMPLE");
		assert_eq!(bundle.secret_access_key.expose(), "secret-key");
		assert_eq!(bundle.expiration, datetime!(2030-01-01 00:00 UTC));
	}

	#[test]
	fn any_missing_field_invalidates_bundle() {
		let cases: [(fn(&mut RawCredentials), &str); 6] = [
			(|raw| raw.access_key_id = None, "accessKeyId"),
			(|raw| raw.access_key_id = Some(String::new()), "accessKeyId"),
			(|raw| raw.secret_access_key = None, "secretAccessKey"),
			(|raw| raw.session_token = Some(Secret::new("")), "sessionToken"),
			(|raw| raw.session_token = None, "sessionToken"),
			(|raw| raw.expiration = None, "expiration"),
		];

		for (strip, field) in cases {
			let mut raw = complete();

			strip(&mut raw);

			let err = CredentialBundle::try_from(raw).expect_err("Incomplete bundle must fail.");

			assert!(
				matches!(&err, Error::IncompleteCredentials { missing } if missing == &vec![field]),
				"Unexpected error for {field}: {err:?}"
			);
		}
	}

	#[test]
	fn debug_output_redacts_secrets() {
		let bundle = CredentialBundle::from_raw(complete()).expect("Complete bundle should pass.");
		let rendered = format!("{bundle:?}");

		assert!(!rendered.contains("secret-key"));
		assert!(!rendered.contains("session-token"));
		assert!(rendered.contains("ASIAEXAMPLE"));
	}
}
