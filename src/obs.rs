//! Optional observability helpers for broker runs.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `saml_role_broker.stage` with the `stage`
//!   field, and to install a stderr subscriber through [`init_tracing`].
//! - Enable `metrics` to increment the `saml_role_broker_stage_total` counter for every
//!   attempt/success/failure, labeled by `stage` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Stages of a single broker run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageKind {
	/// Reading inputs and environment facts.
	ResolveContext,
	/// Requesting the SAML assertion from the issuing service.
	RequestAssertion,
	/// Exchanging the assertion for credentials and confirming the identity.
	ExchangeCredentials,
	/// Handing credentials to the CI host.
	Publish,
}
impl StageKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			StageKind::ResolveContext => "resolve_context",
			StageKind::RequestAssertion => "request_assertion",
			StageKind::ExchangeCredentials => "exchange_credentials",
			StageKind::Publish => "publish",
		}
	}
}
impl Display for StageKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageOutcome {
	/// Entry to a stage.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl StageOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			StageOutcome::Attempt => "attempt",
			StageOutcome::Success => "success",
			StageOutcome::Failure => "failure",
		}
	}
}
impl Display for StageOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
