// self
use crate::{_prelude::*, obs::StageKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedStage<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedStage<F> = F;

/// Span wrapping one stage of a broker run.
#[derive(Clone, Debug)]
pub struct StageSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl StageSpan {
	/// Creates a new span tagged with the provided stage.
	pub fn new(kind: StageKind) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("saml_role_broker.stage", stage = kind.as_str());

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = kind;

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedStage<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Installs a stderr subscriber filtered by `RUST_LOG` (default `warn`).
///
/// Stdout belongs to the workflow-command protocol, so diagnostics never go there. Calling this
/// more than once is harmless.
pub fn init_tracing() {
	#[cfg(feature = "tracing")]
	{
		use tracing_subscriber::EnvFilter;

		let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
		let _ = tracing_subscriber::fmt()
			.with_env_filter(filter)
			.with_writer(std::io::stderr)
			.try_init();
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn init_tracing_is_repeatable() {
		init_tracing();
		init_tracing();
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = StageSpan::new(StageKind::RequestAssertion);
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
