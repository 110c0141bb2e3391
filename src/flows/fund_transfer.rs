//! Transfer funding with strong customer authentication.
//!
//! [`FundingOrchestrator::fund_transfer`] submits the funding call once without proof. A
//! 403 step-up reply either carries an `APPROVED` verdict, in which case the token is
//! presented straight away, or hands the token to the
//! [`ChallengeResolver`](crate::sca::ChallengeResolver) first. After resolution the funding
//! call is retried exactly once with the token; a second step-up signal, a refusal, or a lost
//! reply is reported as [`Error::RetryRejected`] rather than resolved or retried again.

// crates.io
use tokio_util::sync::CancellationToken;
// self
use crate::{
	_prelude::*,
	flows::{FundingOrchestrator, common},
	http::HttpTransport,
	obs::{self, FlowKind, FlowSpan},
	sca::{
		AttemptOutcome, ChallengeResolver, CodeProvider, FundingAttempt, FundingExecutor,
		FundingResult, StepUpChallenge,
	},
};

impl<C> FundingOrchestrator<C>
where
	C: ?Sized + HttpTransport,
{
	/// Funds `attempt`, clearing step-up challenges with codes from `codes`.
	///
	/// `cancel` is checked before every network call and raced against the code wait;
	/// a fired token yields [`Error::Cancelled`]. A concurrent call for the same transfer on
	/// this orchestrator fails with [`Error::TransferInFlight`] before touching the network.
	pub async fn fund_transfer(
		&self,
		attempt: FundingAttempt,
		codes: &dyn CodeProvider,
		cancel: &CancellationToken,
	) -> Result<FundingResult> {
		const KIND: FlowKind = FlowKind::FundTransfer;

		let span = FlowSpan::new(KIND, "fund_transfer").for_attempt(&attempt);

		obs::record_flow_start(KIND);
		self.metrics.record_attempt();

		let key = (attempt.profile_id.clone(), attempt.transfer_id.clone());
		let result = match common::InFlightLease::claim(&self.flow_guards, key) {
			Some(_lease) => span.run(self.run_funding(&attempt, codes, cancel)).await,
			None => Err(Error::TransferInFlight {
				profile: attempt.profile_id.to_string(),
				transfer: attempt.transfer_id.to_string(),
			}),
		};

		if result.is_ok() {
			self.metrics.record_success();
		} else {
			self.metrics.record_failure();
		}

		obs::record_flow_end(KIND, &result);

		result
	}

	async fn run_funding(
		&self,
		attempt: &FundingAttempt,
		codes: &dyn CodeProvider,
		cancel: &CancellationToken,
	) -> Result<FundingResult> {
		let executor = FundingExecutor::new(&self.client);

		common::ensure_active(cancel)?;
		self.metrics.record_funding_call();

		let mut challenge = match executor.execute(attempt, None).await? {
			AttemptOutcome::Success(result) => return Ok(result),
			AttemptOutcome::StepUpRequired(challenge) => challenge,
			AttemptOutcome::Rejected { status, trace_id } => {
				#[cfg(feature = "tracing")]
				tracing::warn!(status, ?trace_id, "funding refused without a step-up challenge");

				return Err(Error::NoChallengeSupport { status, trace_id });
			},
			AttemptOutcome::TransientError(err) => return Err(err.into()),
		};

		self.metrics.record_step_up();

		#[cfg(feature = "tracing")]
		tracing::info!(approval = ?challenge.approval_result, "funding requires step-up");

		if !challenge.is_pre_approved() {
			ChallengeResolver::new(&self.client, &self.resolver_config, &self.metrics)
				.resolve(&mut challenge, codes, cancel)
				.await?;
		}

		self.retry_with_proof(&executor, attempt, &challenge, cancel).await
	}

	async fn retry_with_proof(
		&self,
		executor: &FundingExecutor<'_, C>,
		attempt: &FundingAttempt,
		challenge: &StepUpChallenge,
		cancel: &CancellationToken,
	) -> Result<FundingResult> {
		common::ensure_active(cancel)?;
		self.metrics.record_funding_call();

		match executor.execute(attempt, Some(&challenge.token)).await {
			Ok(AttemptOutcome::Success(result)) => Ok(result),
			Ok(outcome) => {
				Err(Error::RetryRejected { status: outcome.status(), detail: outcome.describe() })
			},
			// The proof was sent; whether the payment went through is unknown.
			Err(Error::Transport(err)) => {
				Err(Error::RetryRejected { status: None, detail: format!("no reply to retry: {err}") })
			},
			Err(err) => Err(err),
		}
	}
}
