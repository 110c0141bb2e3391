//! Step-up challenge models reported by the one-time-token API.

// self
use crate::{_prelude::*, auth::OneTimeToken};

/// Approval verdict attached to a step-up response.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ApprovalResult {
	#[default]
	/// No verdict yet (header absent or not recognized, e.g. `NEEDS_APPROVAL`).
	None,
	/// The provider already cleared the user out of band.
	Approved,
	/// The provider rejected the pending approval.
	Rejected,
}
impl ApprovalResult {
	/// Parses the approval-result header value.
	pub fn from_header(value: Option<&str>) -> Self {
		match value.map(str::trim) {
			Some(v) if v.eq_ignore_ascii_case("APPROVED") => Self::Approved,
			Some(v) if v.eq_ignore_ascii_case("REJECTED") => Self::Rejected,
			_ => Self::None,
		}
	}
}

/// Challenge kinds the resolver distinguishes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChallengeKind {
	/// One-time code delivered by SMS.
	Sms,
	/// Any other kind (PIN, device fingerprint, ...), kept verbatim for diagnostics.
	Other(String),
}
impl ChallengeKind {
	/// Maps the provider's `type` field.
	pub fn from_wire(raw: &str) -> Self {
		if raw.trim().eq_ignore_ascii_case("SMS") { Self::Sms } else { Self::Other(raw.to_owned()) }
	}

	/// Whether the resolver can clear this kind.
	pub fn is_supported(&self) -> bool {
		matches!(self, Self::Sms)
	}
}
impl Display for ChallengeKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Sms => f.write_str("SMS"),
			Self::Other(raw) => f.write_str(raw),
		}
	}
}

/// One outstanding challenge on a token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChallengeDescriptor {
	/// Challenge kind.
	pub kind: ChallengeKind,
	/// Where the code was sent (e.g. a masked phone number), once known.
	pub delivery_target: Option<String>,
}
impl ChallengeDescriptor {
	/// Creates a descriptor with no known delivery target.
	pub fn new(kind: ChallengeKind) -> Self {
		Self { kind, delivery_target: None }
	}

	/// Records the delivery target.
	pub fn with_delivery_target(mut self, target: impl Into<String>) -> Self {
		self.delivery_target = Some(target.into());

		self
	}
}

/// Challenge list and token validity as last reported by the provider.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChallengeState {
	/// Outstanding challenges in provider order.
	pub outstanding: Vec<ChallengeDescriptor>,
	/// Remaining token lifetime, when reported.
	pub validity: Option<Duration>,
}

/// Confirmation returned by the SMS trigger endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsDelivery {
	/// Masked phone number the code was sent to.
	#[serde(default)]
	pub obfuscated_phone_no: Option<String>,
}

/// Pending step-up authentication for one funding attempt.
///
/// Created from a 403 step-up reply; the token is only valid for the attempt that produced
/// it. The resolver refreshes [`outstanding`](Self::outstanding) as it clears challenges.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepUpChallenge {
	/// Provider-issued one-time token.
	pub token: OneTimeToken,
	/// Verdict carried by the step-up reply.
	pub approval_result: ApprovalResult,
	/// Outstanding challenges; empty until first queried.
	pub outstanding: Vec<ChallengeDescriptor>,
	/// Remaining token lifetime, when reported.
	pub validity: Option<Duration>,
}
impl StepUpChallenge {
	/// Creates a challenge for a freshly issued token.
	pub fn new(token: OneTimeToken, approval_result: ApprovalResult) -> Self {
		Self { token, approval_result, outstanding: Vec::new(), validity: None }
	}

	/// Whether the provider already approved the attempt out of band.
	pub fn is_pre_approved(&self) -> bool {
		self.approval_result == ApprovalResult::Approved
	}

	/// Whether no challenge is outstanding.
	pub fn is_cleared(&self) -> bool {
		self.outstanding.is_empty()
	}

	/// First outstanding challenge the resolver cannot clear.
	pub fn first_unsupported(&self) -> Option<&ChallengeDescriptor> {
		self.outstanding.iter().find(|c| !c.kind.is_supported())
	}

	/// Replaces the outstanding list with a refreshed provider view.
	pub fn apply(&mut self, state: ChallengeState) {
		self.outstanding = state.outstanding;

		if state.validity.is_some() {
			self.validity = state.validity;
		}
	}
}
