//! Remediation-bearing classification of federation faults.

// self
use crate::{
	_prelude::*,
	federation::{FaultKind, FederationFault},
	issuer::FederationParameters,
};

const SAML_AUDIENCE: &str = "https://signin.aws.amazon.com/saml";
const CONFIGURATION_DOCS: &str =
	"https://github.com/saml-to/assume-aws-role-action/blob/main/README.md#configuration";

/// Facts about the exchange that remediation messages refer to.
#[derive(Clone, Copy, Debug)]
pub struct FaultContext<'a> {
	/// Role the step asked for.
	pub requested_role: &'a str,
	/// Explicit provider the step asked for, if any.
	pub requested_provider: Option<&'a str>,
	/// Federation parameters used for the exchange.
	pub parameters: &'a FederationParameters,
	/// Issuer URL advertised in the SAML response.
	pub issuer: &'a str,
	/// Download URL of the organization's identity-provider metadata.
	pub metadata_url: &'a str,
}

/// Classifies a federation fault into the broker taxonomy.
pub fn classify_fault(fault: &FederationFault, ctx: &FaultContext) -> Error {
	match fault.kind() {
		FaultKind::UnrecognizedPrincipal => unrecognized_principal(fault, ctx),
		FaultKind::InvalidAssertion => invalid_assertion(fault, ctx),
		FaultKind::Other => generic_trust_failure(fault, ctx),
	}
}

/// Trust policy the target role must carry for the exchange to succeed.
pub fn trust_policy(principal_arn: &str) -> String {
	let policy = serde_json::json!({
		"Version": "2012-10-17",
		"Statement": [
			{
				"Effect": "Allow",
				"Principal": { "Federated": principal_arn },
				"Action": "sts:AssumeRoleWithSAML",
				"Condition": { "StringEquals": { "SAML:aud": SAML_AUDIENCE } }
			}
		]
	});

	serde_json::to_string_pretty(&policy).unwrap_or_default()
}

fn unrecognized_principal(fault: &FederationFault, ctx: &FaultContext) -> Error {
	let principal = &ctx.parameters.principal_arn;

	Error::TrustConfiguration {
		principal_arn: Some(principal.clone()),
		role_arn: ctx.parameters.role_arn.clone(),
		reason: format!("AWS did not recognize the SAML provider `{principal}` ({fault})."),
		remediation: format!(
			"Please ensure all of the following:
 1) the SAML Provider ARN ({principal}) is correct in the `saml-to.yml` configuration file, and in the format of `arn:aws:iam::ACCOUNT_ID:saml-provider/PROVIDER_NAME`
 2) the SAML Provider Metadata ({principal}) in AWS IAM is correct. It can be obtained by downloading it from: {}",
			ctx.metadata_url
		),
	}
}

fn invalid_assertion(fault: &FederationFault, ctx: &FaultContext) -> Error {
	let issuer = ctx.issuer;

	Error::AssertionValidation {
		issuer: issuer.to_owned(),
		reason: format!("AWS rejected the SAML assertion issued by {issuer} ({fault})."),
		remediation: format!(
			"Please ensure the SAML Provider Metadata ({}) in AWS IAM matches the identity provider metadata published at {issuer}. Download it again from {issuer} and update the provider in AWS IAM if it has changed.",
			ctx.parameters.principal_arn
		),
	}
}

fn generic_trust_failure(fault: &FederationFault, ctx: &FaultContext) -> Error {
	let role = ctx.requested_role;
	let principal = &ctx.parameters.principal_arn;
	let provider_note = ctx
		.requested_provider
		.map(|provider| format!(" (with explicitly specified provider: {provider})"))
		.unwrap_or_default();
	let policy = trust_policy(principal)
		.lines()
		.map(|line| format!("      {line}"))
		.collect::<Vec<_>>()
		.join("\n");

	Error::TrustConfiguration {
		principal_arn: Some(principal.clone()),
		role_arn: ctx.parameters.role_arn.clone(),
		reason: format!(
			"Unable to assume the role with an ARN of `{role}`{provider_note} ({fault})."
		),
		remediation: format!(
			"Please ensure all of the following:
 1) the SAML Provider Metadata ({principal}) in AWS IAM is correct. It can be obtained by downloading it from: {metadata_url}
 2) the SAML Provider ARN ({principal}) is correct in the `saml-to.yml` configuration file, and in the format of `arn:aws:iam::ACCOUNT_ID:saml-provider/PROVIDER_NAME`
 3) the Role ARN ({role}) is correct in the `saml-to.yml` configuration file, and in the format of `arn:aws:iam::ACCOUNT_ID:role/ROLE_NAME`
 4) the Role ({role}) has the correct Trust Relationship with {principal}, which can be found by opening the Role in AWS IAM, choosing the Trust Relationship tab, editing it to ensure it's in the following format:
{policy}

If a provider or role hasn't been created or configured yet, please follow the configuration instructions: {CONFIGURATION_DOCS}",
			metadata_url = ctx.metadata_url,
		),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const PRINCIPAL: &str = "arn:aws:iam::123:saml-provider/X";
	const ROLE: &str = "arn:aws:iam::123:role/Y";
	const ISSUER: &str = "https://saml.to/metadata/github/octo-org";

	fn parameters() -> FederationParameters {
		FederationParameters {
			principal_arn: PRINCIPAL.into(),
			role_arn: ROLE.into(),
			duration_seconds: None,
		}
	}

	fn classify(fault: FederationFault) -> Error {
		let parameters = parameters();
		let ctx = FaultContext {
			requested_role: ROLE,
			requested_provider: None,
			parameters: &parameters,
			issuer: ISSUER,
			metadata_url: "https://saml.to/metadata/github/octo-org",
		};

		classify_fault(&fault, &ctx)
	}

	#[test]
	fn unrecognized_principal_names_the_trust_anchor() {
		let err = classify(FederationFault::coded("InvalidIdentityToken", "No provider"));

		assert!(matches!(&err, Error::TrustConfiguration { principal_arn: Some(p), .. } if p == PRINCIPAL));

		let text = err.to_string();

		assert!(text.contains(PRINCIPAL));
		assert!(text.contains("saml-provider/PROVIDER_NAME"));
		assert!(text.contains("https://saml.to/metadata/github/octo-org"));
	}

	#[test]
	fn invalid_assertion_names_the_issuer() {
		let err = classify(FederationFault::coded("IDPRejectedClaim", "Bad signature"));

		assert!(matches!(&err, Error::AssertionValidation { issuer, .. } if issuer == ISSUER));
		assert!(err.to_string().contains(ISSUER));
	}

	#[test]
	fn other_faults_carry_the_full_checklist() {
		let err = classify(FederationFault::uncoded("dispatch failure"));
		let text = err.to_string();

		assert!(matches!(err, Error::TrustConfiguration { .. }));

		for needle in [" 1) ", " 2) ", " 3) ", " 4) ", "\"Federated\": \"arn:aws:iam::123:saml-provider/X\"", "sts:AssumeRoleWithSAML", SAML_AUDIENCE, "dispatch failure"] {
			assert!(text.contains(needle), "Missing {needle:?} in:\n{text}");
		}
	}

	#[test]
	fn trust_policy_is_valid_json() {
		let policy: serde_json::Value =
			serde_json::from_str(&trust_policy(PRINCIPAL)).expect("Policy should be valid JSON.");

		assert_eq!(policy["Statement"][0]["Principal"]["Federated"], PRINCIPAL);
		assert_eq!(policy["Statement"][0]["Condition"]["StringEquals"]["SAML:aud"], SAML_AUDIENCE);
	}
}
