//! Provider descriptor data structures and endpoint helpers shared by all flows.
//!
//! The module exposes validated metadata, the supporting builder, and the header
//! quirks so endpoint adapters can address the provider in a transport-agnostic way.

/// Builder API for assembling provider descriptors.
pub mod builder;
/// Provider-specific header toggles.
pub mod quirks;

pub use builder::*;
pub use quirks::*;

// self
use crate::{
	_prelude::*,
	auth::{ProfileId, ProviderId, TransferId},
	error::ConfigError,
};

const OTT_STATUS_PATH: &str = "v1/one-time-token/status";
const OTT_SMS_TRIGGER_PATH: &str = "v1/one-time-token/sms/trigger";
const OTT_SMS_VERIFY_PATH: &str = "v1/one-time-token/sms/verify";

/// Deployment the descriptor targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderEnvironment {
	#[default]
	/// Sandbox API; one-time codes are fixed.
	Sandbox,
	/// Production API; one-time codes reach a real device.
	Live,
}
impl ProviderEnvironment {
	/// Base URL used when the descriptor does not override it.
	pub const fn default_base_url(self) -> &'static str {
		match self {
			Self::Sandbox => "https://api.sandbox.transferwise.tech/",
			Self::Live => "https://api.transferwise.com/",
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Sandbox => "sandbox",
			Self::Live => "live",
		}
	}
}

/// Immutable provider descriptor consumed by endpoint adapters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Descriptor identifier.
	pub id: ProviderId,
	/// Targeted deployment.
	pub environment: ProviderEnvironment,
	/// Base URL every endpoint path is joined onto; always ends with `/`.
	pub base_url: Url,
	/// Provider-specific header names.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: ProviderId) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(id)
	}

	/// Funding endpoint for a transfer owned by `profile`.
	pub fn funding_url(&self, profile: &ProfileId, transfer: &TransferId) -> Result<Url> {
		self.endpoint(&format!("v3/profiles/{profile}/transfers/{transfer}/payments"))
	}

	/// One-time-token status endpoint.
	pub fn ott_status_url(&self) -> Result<Url> {
		self.endpoint(OTT_STATUS_PATH)
	}

	/// SMS delivery trigger endpoint.
	pub fn sms_trigger_url(&self) -> Result<Url> {
		self.endpoint(OTT_SMS_TRIGGER_PATH)
	}

	/// SMS code verification endpoint.
	pub fn sms_verify_url(&self) -> Result<Url> {
		self.endpoint(OTT_SMS_VERIFY_PATH)
	}

	fn endpoint(&self, path: &str) -> Result<Url> {
		self.base_url.join(path).map_err(|source| {
			ConfigError::InvalidEndpoint { path: path.to_owned(), source }.into()
		})
	}
}
