//! JSON shapes exchanged with the funding and one-time-token endpoints.

// self
use crate::{
	_prelude::*,
	sca::{ChallengeDescriptor, ChallengeKind, ChallengeState},
};

#[derive(Serialize)]
pub(crate) struct FundingBody<'a> {
	#[serde(rename = "type")]
	pub kind: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VerifyBody<'a> {
	pub otp_code: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OttEnvelope {
	pub one_time_token_properties: OttProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OttProperties {
	#[serde(default)]
	pub challenges: Vec<OttChallenge>,
	/// Remaining token lifetime in seconds.
	#[serde(default)]
	pub validity: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OttChallenge {
	#[serde(rename = "type")]
	pub kind: String,
}

impl From<OttEnvelope> for ChallengeState {
	fn from(envelope: OttEnvelope) -> Self {
		let props = envelope.one_time_token_properties;

		Self {
			outstanding: props
				.challenges
				.into_iter()
				.map(|c| ChallengeDescriptor::new(ChallengeKind::from_wire(&c.kind)))
				.collect(),
			validity: props.validity.map(Duration::seconds),
		}
	}
}
