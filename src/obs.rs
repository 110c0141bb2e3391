//! Optional observability helpers for funding flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `sca_funding.flow` with `flow`, `stage`,
//!   `profile`, and `transfer` fields, plus a warn event whenever a flow fails.
//! - Enable `metrics` to increment the `sca_funding_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`, and `sca_funding_failure_total`
//!   labeled by `flow` + `reason`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Flow kinds observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Whole funding orchestration.
	FundTransfer,
	/// Challenge clearing for one step-up token.
	ClearChallenges,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::FundTransfer => "fund_transfer",
			FlowKind::ClearChallenges => "clear_challenges",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a flow.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
