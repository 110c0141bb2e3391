// self
use crate::{_prelude::*, obs::FlowKind, sca::FundingAttempt};

/// `sca_funding.flow` span; a zero-sized no-op when the `tracing` feature is off.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Opens a span for `kind` at `stage`. Transfer fields start empty.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			Self {
				span: tracing::info_span!(
					"sca_funding.flow",
					flow = kind.as_str(),
					stage,
					profile = tracing::field::Empty,
					transfer = tracing::field::Empty,
				),
			}
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Tags the span with the transfer being funded.
	pub fn for_attempt(self, attempt: &FundingAttempt) -> Self {
		#[cfg(feature = "tracing")]
		{
			self.span.record("profile", tracing::field::display(&attempt.profile_id));
			self.span.record("transfer", tracing::field::display(&attempt.transfer_id));
		}
		#[cfg(not(feature = "tracing"))]
		let _ = attempt;

		self
	}

	/// Awaits `fut` inside the span.
	pub async fn run<F>(&self, fut: F) -> F::Output
	where
		F: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone()).await
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut.await
		}
	}
}
