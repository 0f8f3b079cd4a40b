//! Process entry point for the `assume-aws-role` step.

// std
use std::process::ExitCode;
// self
use crate::{
	_prelude::*,
	config::BrokerConfig,
	error::Disposition,
	exchange::PublishedCredentials,
	federation::StsFederation,
	flow::Broker,
	host::{GithubActionsHost, JobHost},
	http::ReqwestHttpClient,
	obs,
};

/// Runs the step against the real runner environment and AWS STS.
pub fn main() -> ExitCode {
	obs::init_tracing();

	let host = GithubActionsHost::from_env();
	let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
		Ok(runtime) => runtime,
		Err(e) => {
			host.set_failed(&format!("Unable to start the async runtime: {e}"));

			return ExitCode::FAILURE;
		},
	};
	let result = runtime.block_on(run(&host));

	finish(&host, result)
}

/// Builds the broker from the host environment and runs it once.
pub async fn run(host: &dyn JobHost) -> Result<PublishedCredentials> {
	let config = BrokerConfig::from_host(host)?;
	let http = ReqwestHttpClient::new()?;
	let federation = StsFederation::load().await;
	let broker = Broker::new(config, http, Arc::new(federation));

	broker.run(host).await.map_err(|failure| failure.error)
}

/// Reports the outcome to the host and maps it onto a process exit code.
///
/// Every failure marks the step failed with its full message. Only graceful failures exit 0.
pub fn finish(host: &dyn JobHost, result: Result<PublishedCredentials>) -> ExitCode {
	let Err(e) = result else {
		return ExitCode::SUCCESS;
	};

	host.set_failed(&e.to_string());

	match e.disposition() {
		Disposition::Graceful => ExitCode::SUCCESS,
		Disposition::Fatal => ExitCode::FAILURE,
	}
}
