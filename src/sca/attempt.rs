//! Single funding call and reply classification.

// self
use crate::{
	_prelude::*,
	auth::{OneTimeToken, ProfileId, TransferId},
	endpoint::{self, ProviderClient},
	error::TransientError,
	http::{HttpTransport, ProviderReply},
	provider::ProviderQuirks,
	sca::{ApprovalResult, StepUpChallenge},
};

/// Funding source for a transfer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum FundingMethod {
	#[default]
	/// Multi-currency balance (`BALANCE`).
	Balance,
	/// Any other provider funding type, sent verbatim.
	Other(String),
}
impl FundingMethod {
	/// Wire value for the funding body's `type` field.
	pub fn as_str(&self) -> &str {
		match self {
			Self::Balance => "BALANCE",
			Self::Other(raw) => raw,
		}
	}
}

/// Immutable description of one funding request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FundingAttempt {
	/// Profile that owns the transfer.
	pub profile_id: ProfileId,
	/// Transfer to fund.
	pub transfer_id: TransferId,
	/// Funding source.
	pub funding_method: FundingMethod,
}
impl FundingAttempt {
	/// Creates a balance-funded attempt.
	pub fn new(profile_id: ProfileId, transfer_id: TransferId) -> Self {
		Self { profile_id, transfer_id, funding_method: FundingMethod::Balance }
	}

	/// Overrides the funding method.
	pub fn with_funding_method(mut self, method: FundingMethod) -> Self {
		self.funding_method = method;

		self
	}
}

/// Funding outcome returned to the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingResult {
	/// Provider payment status (e.g. `COMPLETED`, `REJECTED`).
	pub status: String,
	/// Provider error code, when the payment was not completed.
	#[serde(default)]
	pub error_code: Option<String>,
	/// Provider error message.
	#[serde(default)]
	pub error_message: Option<String>,
	/// Balance transaction created by the payment.
	#[serde(default)]
	pub balance_transaction_id: Option<u64>,
	/// Echoed funding type.
	#[serde(default, rename = "type")]
	pub kind: Option<String>,
}

/// Classified result of one funding call.
#[derive(Debug)]
pub enum AttemptOutcome {
	/// Funding accepted.
	Success(FundingResult),
	/// Step-up authentication is required before funding can proceed.
	StepUpRequired(StepUpChallenge),
	/// Refused with 403 and no challenge token: this authentication mode cannot step up.
	Rejected {
		/// HTTP status.
		status: u16,
		/// Provider trace identifier, when supplied.
		trace_id: Option<String>,
	},
	/// Any other failure status or an unreadable success body.
	TransientError(TransientError),
}
impl AttemptOutcome {
	/// Short label for logs and retry diagnostics.
	pub fn describe(&self) -> String {
		match self {
			Self::Success(result) => format!("funded with status {}", result.status),
			Self::StepUpRequired(_) => "step-up requested again".into(),
			Self::Rejected { status, .. } => format!("refused with HTTP {status} and no challenge"),
			Self::TransientError(err) => err.to_string(),
		}
	}

	/// HTTP status behind the outcome, when one is known.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Rejected { status, .. } => Some(*status),
			Self::TransientError(err) => Some(err.status()),
			Self::Success(_) | Self::StepUpRequired(_) => None,
		}
	}
}

/// Performs one funding call and classifies the reply. Holds no state of its own.
#[derive(Debug)]
pub struct FundingExecutor<'c, C>
where
	C: ?Sized + HttpTransport,
{
	client: &'c ProviderClient<C>,
}
impl<'c, C> FundingExecutor<'c, C>
where
	C: ?Sized + HttpTransport,
{
	/// Borrows the shared provider client.
	pub fn new(client: &'c ProviderClient<C>) -> Self {
		Self { client }
	}

	/// Submits `attempt`, presenting `proof` when given.
	///
	/// Only transport failures are returned as `Err`; every HTTP answer is classified.
	pub async fn execute(
		&self,
		attempt: &FundingAttempt,
		proof: Option<&OneTimeToken>,
	) -> Result<AttemptOutcome> {
		let reply = self.client.submit_funding(attempt, proof).await?;

		Ok(classify(self.client, &reply))
	}
}

fn classify<C>(client: &ProviderClient<C>, reply: &ProviderReply) -> AttemptOutcome
where
	C: ?Sized + HttpTransport,
{
	let quirks = &client.descriptor.quirks;

	if reply.is_success() {
		return match endpoint::decode_json::<FundingResult>("funding", reply) {
			Ok(result) => AttemptOutcome::Success(result),
			Err(err) => AttemptOutcome::TransientError(err),
		};
	}
	if reply.status == 403 {
		return classify_forbidden(quirks, reply);
	}

	AttemptOutcome::TransientError(client.unexpected_status("funding", reply))
}

fn classify_forbidden(quirks: &ProviderQuirks, reply: &ProviderReply) -> AttemptOutcome {
	match reply.header(&quirks.approval_token_header) {
		Some(token) => AttemptOutcome::StepUpRequired(StepUpChallenge::new(
			OneTimeToken::new(token),
			ApprovalResult::from_header(reply.header(&quirks.approval_result_header)),
		)),
		None => AttemptOutcome::Rejected {
			status: reply.status,
			trace_id: reply.header(&quirks.trace_id_header).map(str::to_owned),
		},
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		auth::ProviderId,
		http::{ProviderRequest, TransportFuture},
		provider::ProviderDescriptor,
	};

	struct NoTransport;
	impl HttpTransport for NoTransport {
		type TransportError = std::io::Error;

		fn execute(&self, _request: ProviderRequest) -> TransportFuture<'_, Self::TransportError> {
			Box::pin(async { Err(std::io::Error::other("unused")) })
		}
	}

	fn client() -> ProviderClient<NoTransport> {
		let descriptor = ProviderDescriptor::builder(
			ProviderId::new("wise").expect("Provider identifier fixture should be valid."),
		)
		.build()
		.expect("Descriptor fixture should build.");

		ProviderClient::new(descriptor, NoTransport)
	}

	#[test]
	fn success_parses_funding_result() {
		let reply = ProviderReply::new(201).with_body(
			r#"{"type":"BALANCE","status":"COMPLETED","errorCode":null,"balanceTransactionId":42}"#,
		);

		match classify(&client(), &reply) {
			AttemptOutcome::Success(result) => {
				assert_eq!(result.status, "COMPLETED");
				assert_eq!(result.balance_transaction_id, Some(42));
				assert_eq!(result.kind.as_deref(), Some("BALANCE"));
			},
			other => panic!("Unexpected outcome: {other:?}."),
		}
	}

	#[test]
	fn malformed_success_body_is_transient() {
		let reply = ProviderReply::new(200).with_body("{\"state\":1}");

		assert!(matches!(
			classify(&client(), &reply),
			AttemptOutcome::TransientError(TransientError::ResponseParse { status: 200, .. })
		));
	}

	#[test]
	fn forbidden_with_token_requests_step_up() {
		let reply = ProviderReply::new(403)
			.with_header("x-2fa-approval", "ott-1")
			.with_header("x-2fa-approval-result", "NEEDS_APPROVAL");

		match classify(&client(), &reply) {
			AttemptOutcome::StepUpRequired(challenge) => {
				assert_eq!(challenge.token.expose(), "ott-1");
				assert_eq!(challenge.approval_result, ApprovalResult::None);
				assert!(challenge.outstanding.is_empty());
			},
			other => panic!("Unexpected outcome: {other:?}."),
		}
	}

	#[test]
	fn forbidden_without_token_is_rejected() {
		let reply = ProviderReply::new(403).with_header("x-trace-id", "trace-1");
		let outcome = classify(&client(), &reply);

		assert!(matches!(
			&outcome,
			AttemptOutcome::Rejected { status: 403, trace_id: Some(trace) } if trace == "trace-1"
		));
		assert_eq!(outcome.status(), Some(403));
	}

	#[test]
	fn other_statuses_are_transient() {
		let reply = ProviderReply::new(422).with_body("{\"errors\":[]}");

		match classify(&client(), &reply) {
			AttemptOutcome::TransientError(TransientError::Endpoint {
				endpoint, status, body, ..
			}) => {
				assert_eq!(endpoint, "funding");
				assert_eq!(status, 422);
				assert_eq!(body, "{\"errors\":[]}");
			},
			other => panic!("Unexpected outcome: {other:?}."),
		}
	}
}
