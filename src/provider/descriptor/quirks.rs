// self
use crate::_prelude::*;

/// Header names the provider uses to signal and prove step-up authentication.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderQuirks {
	/// Response header carrying the one-time token on a 403 step-up.
	pub approval_token_header: String,
	/// Response header carrying the approval result (`APPROVED`, `REJECTED`, ...).
	pub approval_result_header: String,
	/// Request header used to present a one-time token.
	pub one_time_token_header: String,
	/// Response header carrying the provider trace identifier.
	pub trace_id_header: String,
}
impl ProviderQuirks {
	pub(crate) fn header_names(&self) -> [(&'static str, &str); 4] {
		[
			("approval_token_header", &self.approval_token_header),
			("approval_result_header", &self.approval_result_header),
			("one_time_token_header", &self.one_time_token_header),
			("trace_id_header", &self.trace_id_header),
		]
	}
}
impl Default for ProviderQuirks {
	fn default() -> Self {
		Self {
			approval_token_header: "x-2fa-approval".into(),
			approval_result_header: "x-2fa-approval-result".into(),
			one_time_token_header: "One-Time-Token".into(),
			trace_id_header: "x-trace-id".into(),
		}
	}
}
