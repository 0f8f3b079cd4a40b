//! Run loop composing context resolution, assertion request, exchange, and publication.
//!
//! A [`Broker`] holds only immutable configuration and clients. Every call to [`Broker::run`]
//! walks the same forward-only state machine and keeps nothing between runs, so two runs
//! against the same services produce two independent credential bundles.

// self
use crate::{
	_prelude::*,
	config::BrokerConfig,
	context::JobContext,
	error::ErrorKind,
	exchange::{self, PublishedCredentials},
	federation::FederationEndpoint,
	host::JobHost,
	http::ReqwestHttpClient,
	issuer::IssuerClient,
	obs::{self, StageKind, StageOutcome, StageSpan},
};

/// Position of a run in the forward-only state machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunState {
	/// Nothing has happened yet.
	Start,
	/// Inputs and environment facts were resolved.
	ContextResolved,
	/// The issuing service returned a SAML response.
	AssertionObtained,
	/// The federation endpoint minted credentials and the identity was confirmed.
	CredentialsExchanged,
	/// Credentials were handed to the host.
	Published,
	/// Run finished successfully.
	Done,
	/// Run aborted.
	Failed {
		/// Taxonomy bucket of the failure.
		kind: ErrorKind,
		/// Full diagnostic message.
		message: String,
	},
}
impl RunState {
	/// Returns a stable label suitable for log lines or span fields.
	pub const fn as_str(&self) -> &'static str {
		match self {
			RunState::Start => "start",
			RunState::ContextResolved => "context_resolved",
			RunState::AssertionObtained => "assertion_obtained",
			RunState::CredentialsExchanged => "credentials_exchanged",
			RunState::Published => "published",
			RunState::Done => "done",
			RunState::Failed { .. } => "failed",
		}
	}
}

/// Failure of a run together with the last state it reached.
#[derive(Debug, ThisError)]
#[error("{error}")]
pub struct RunFailure {
	/// Last successful state before the failure.
	pub reached: RunState,
	/// Classified failure.
	#[source]
	pub error: Error,
}
impl RunFailure {
	/// Terminal state of the failed run.
	pub fn state(&self) -> RunState {
		RunState::Failed { kind: self.error.kind(), message: self.error.to_string() }
	}
}

/// Stateless orchestrator for a single federation target.
#[derive(Clone)]
pub struct Broker {
	/// Resolved broker configuration.
	pub config: BrokerConfig,
	/// Client for the SAML issuing service.
	pub issuer: IssuerClient,
	/// Federation endpoint credentials are minted from.
	pub federation: Arc<dyn FederationEndpoint>,
}
impl Broker {
	/// Creates a broker from its parts.
	pub fn new(
		config: BrokerConfig,
		http: ReqwestHttpClient,
		federation: Arc<dyn FederationEndpoint>,
	) -> Self {
		let issuer = IssuerClient::new(&config, http);

		Self { config, issuer, federation }
	}

	/// Runs resolve → request → exchange → publish once.
	///
	/// Every transition is reported as a debug line. On failure the returned [`RunFailure`]
	/// carries the last state reached.
	pub async fn run(&self, host: &dyn JobHost) -> Result<PublishedCredentials, RunFailure> {
		let mut reached = RunState::Start;

		match self.drive(host, &mut reached).await {
			Ok(published) => Ok(published),
			Err(error) => Err(RunFailure { reached, error }),
		}
	}

	async fn drive(
		&self,
		host: &dyn JobHost,
		reached: &mut RunState,
	) -> Result<PublishedCredentials> {
		let context = stage(StageKind::ResolveContext, async {
			JobContext::resolve(host, &self.config)
		})
		.await?;

		advance(host, reached, RunState::ContextResolved);

		let container = stage(StageKind::RequestAssertion, async {
			self.issuer.request_assertion(host, &context).await
		})
		.await?;

		advance(host, reached, RunState::AssertionObtained);

		let credentials = stage(StageKind::ExchangeCredentials, async {
			exchange::exchange(self.federation.as_ref(), &self.config, &context, &container).await
		})
		.await?;

		advance(host, reached, RunState::CredentialsExchanged);

		let published = stage(StageKind::Publish, async {
			exchange::publish(host, &context.region, credentials)
		})
		.await?;

		advance(host, reached, RunState::Published);
		advance(host, reached, RunState::Done);

		Ok(published)
	}
}
impl Debug for Broker {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Broker")
			.field("config", &self.config)
			.field("issuer", &self.issuer)
			.finish_non_exhaustive()
	}
}

fn advance(host: &dyn JobHost, reached: &mut RunState, next: RunState) {
	#[cfg(feature = "tracing")]
	tracing::debug!(state = next.as_str(), "run advanced");

	host.debug(&format!("Run state: {}", next.as_str()));

	*reached = next;
}

async fn stage<T, Fut>(kind: StageKind, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = StageSpan::new(kind);

	obs::record_stage_outcome(kind, StageOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => obs::record_stage_outcome(kind, StageOutcome::Success),
		Err(_) => obs::record_stage_outcome(kind, StageOutcome::Failure),
	}

	result
}
