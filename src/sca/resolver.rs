//! Bounded challenge clearing for a step-up token.
//!
//! Each cycle queries the token status, triggers SMS delivery for every outstanding SMS
//! challenge, waits for a code, and verifies it. A verify reply with no outstanding
//! challenges ends the loop without another status call. Kinds other than SMS fail fast
//! before anything is dispatched, and the cycle budget caps a provider that never reports
//! the token as cleared.

// crates.io
use tokio_util::sync::CancellationToken;
// self
use crate::{
	_prelude::*,
	endpoint::ProviderClient,
	flows::{FundingMetrics, common},
	http::HttpTransport,
	obs::{self, FlowKind, FlowSpan},
	sca::{ChallengeDescriptor, CodeProvider, OneTimeCode, StepUpChallenge},
};

/// Limits applied while clearing challenges.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolverConfig {
	/// Maximum number of trigger/verify cycles.
	pub max_cycles: u32,
	/// Pause between a verify that left challenges outstanding and the next status query.
	pub poll_interval: StdDuration,
	/// Maximum wait for the code provider.
	pub code_timeout: StdDuration,
}
impl ResolverConfig {
	/// Default cycle budget.
	pub const DEFAULT_MAX_CYCLES: u32 = 5;
	/// Default pause between cycles.
	pub const DEFAULT_POLL_INTERVAL: StdDuration = StdDuration::from_secs(1);
	/// Default code wait.
	pub const DEFAULT_CODE_TIMEOUT: StdDuration = StdDuration::from_secs(300);

	/// Overrides the cycle budget (at least one cycle).
	pub fn with_max_cycles(mut self, max_cycles: u32) -> Self {
		self.max_cycles = max_cycles.max(1);

		self
	}

	/// Overrides the pause between cycles.
	pub fn with_poll_interval(mut self, interval: StdDuration) -> Self {
		self.poll_interval = interval;

		self
	}

	/// Overrides the code wait.
	pub fn with_code_timeout(mut self, timeout: StdDuration) -> Self {
		self.code_timeout = timeout;

		self
	}
}
impl Default for ResolverConfig {
	fn default() -> Self {
		Self {
			max_cycles: Self::DEFAULT_MAX_CYCLES,
			poll_interval: Self::DEFAULT_POLL_INTERVAL,
			code_timeout: Self::DEFAULT_CODE_TIMEOUT,
		}
	}
}

/// Drives a [`StepUpChallenge`] to an empty outstanding list.
#[derive(Debug)]
pub struct ChallengeResolver<'c, C>
where
	C: ?Sized + HttpTransport,
{
	client: &'c ProviderClient<C>,
	config: &'c ResolverConfig,
	metrics: &'c FundingMetrics,
}
impl<'c, C> ChallengeResolver<'c, C>
where
	C: ?Sized + HttpTransport,
{
	/// Borrows the shared client, limits, and counters.
	pub fn new(
		client: &'c ProviderClient<C>,
		config: &'c ResolverConfig,
		metrics: &'c FundingMetrics,
	) -> Self {
		Self { client, config, metrics }
	}

	/// Clears every outstanding challenge on `challenge`.
	///
	/// On success the challenge's outstanding list is empty and its token may be presented as
	/// proof. Endpoint failures are returned as-is; nothing is retried here beyond the bounded
	/// cycle loop.
	pub async fn resolve(
		&self,
		challenge: &mut StepUpChallenge,
		codes: &dyn CodeProvider,
		cancel: &CancellationToken,
	) -> Result<()> {
		const KIND: FlowKind = FlowKind::ClearChallenges;

		let span = FlowSpan::new(KIND, "resolve");

		obs::record_flow_start(KIND);

		let result = span.run(self.run(challenge, codes, cancel)).await;

		obs::record_flow_end(KIND, &result);

		result
	}

	async fn run(
		&self,
		challenge: &mut StepUpChallenge,
		codes: &dyn CodeProvider,
		cancel: &CancellationToken,
	) -> Result<()> {
		let mut cycles = 0_u32;

		loop {
			common::ensure_active(cancel)?;
			challenge.apply(self.client.challenge_status(&challenge.token).await?);

			if challenge.is_cleared() {
				return Ok(());
			}

			reject_unsupported(challenge)?;

			if cycles >= self.config.max_cycles {
				#[cfg(feature = "tracing")]
				tracing::warn!(cycles, "challenges still outstanding after cycle budget");

				return Err(Error::ChallengeLoopExceeded { cycles });
			}

			cycles += 1;
			self.metrics.record_challenge_cycle();

			let pending = challenge.outstanding.clone();

			for descriptor in pending {
				common::ensure_active(cancel)?;

				let delivery = self.client.trigger_sms(&challenge.token).await?;
				let descriptor = match delivery.obfuscated_phone_no {
					Some(target) => descriptor.with_delivery_target(target),
					None => descriptor,
				};
				let code = self.await_code(codes, &descriptor, cancel).await?;

				common::ensure_active(cancel)?;
				challenge.apply(self.client.verify_sms(&challenge.token, &code).await?);

				if challenge.is_cleared() {
					return Ok(());
				}

				reject_unsupported(challenge)?;
			}

			common::pause(self.config.poll_interval, cancel).await?;
		}
	}

	async fn await_code(
		&self,
		codes: &dyn CodeProvider,
		descriptor: &ChallengeDescriptor,
		cancel: &CancellationToken,
	) -> Result<OneTimeCode> {
		let after = self.config.code_timeout;
		let wait = tokio::time::timeout(after, codes.supply_code(descriptor));

		tokio::select! {
			biased;
			_ = cancel.cancelled() => Err(Error::Cancelled),
			supplied = wait => match supplied {
				Ok(code) => Ok(code?),
				Err(_) => Err(Error::CodeTimeout { after }),
			},
		}
	}
}

fn reject_unsupported(challenge: &StepUpChallenge) -> Result<()> {
	match challenge.first_unsupported() {
		Some(unsupported) => {
			#[cfg(feature = "tracing")]
			tracing::warn!(kind = %unsupported.kind, "challenge kind cannot be cleared");

			Err(Error::UnsupportedChallengeKind { kind: unsupported.kind.to_string() })
		},
		None => Ok(()),
	}
}
