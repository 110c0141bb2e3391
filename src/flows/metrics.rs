//! Per-orchestrator funding counters.

// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for funding orchestrations.
#[derive(Debug, Default)]
pub struct FundingMetrics {
	attempts: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
	step_ups: AtomicU64,
	challenge_cycles: AtomicU64,
	funding_calls: AtomicU64,
}
impl FundingMetrics {
	/// Returns the number of `fund_transfer` invocations.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of orchestrations that funded the transfer.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of orchestrations that ended in an error.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	/// Returns the number of step-up replies received.
	pub fn step_ups(&self) -> u64 {
		self.step_ups.load(Ordering::Relaxed)
	}

	/// Returns the number of trigger/verify cycles started.
	pub fn challenge_cycles(&self) -> u64 {
		self.challenge_cycles.load(Ordering::Relaxed)
	}

	/// Returns the number of funding calls issued, retries included.
	pub fn funding_calls(&self) -> u64 {
		self.funding_calls.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.success.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failure.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_step_up(&self) {
		self.step_ups.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_challenge_cycle(&self) {
		self.challenge_cycles.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_funding_call(&self) {
		self.funding_calls.fetch_add(1, Ordering::Relaxed);
	}
}
