// self
use crate::{
	_prelude::*,
	obs::{FlowKind, FlowOutcome},
};

/// Counts entry into a flow.
pub fn record_flow_start(kind: FlowKind) {
	bump_flow(kind, FlowOutcome::Attempt);
}

/// Counts how a flow ended; failures are also counted by [`FailureReason`].
pub fn record_flow_end<T>(kind: FlowKind, result: &Result<T>) {
	let reason = match result {
		Ok(_) => return bump_flow(kind, FlowOutcome::Success),
		Err(err) => err.reason(),
	};

	bump_flow(kind, FlowOutcome::Failure);

	#[cfg(feature = "metrics")]
	metrics::counter!(
		"sca_funding_failure_total",
		"flow" => kind.as_str(),
		"reason" => reason.as_str()
	)
	.increment(1);

	#[cfg(feature = "tracing")]
	tracing::warn!(flow = kind.as_str(), reason = reason.as_str(), "flow failed");

	#[cfg(not(any(feature = "metrics", feature = "tracing")))]
	let _ = reason;
}

fn bump_flow(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(
		"sca_funding_flow_total",
		"flow" => kind.as_str(),
		"outcome" => outcome.as_str()
	)
	.increment(1);

	#[cfg(not(feature = "metrics"))]
	let _ = (kind, outcome);
}
