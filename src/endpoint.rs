//! Endpoint adapters for the funding and one-time-token APIs.
//!
//! [`ProviderClient`] is the explicit client object the flows share: it owns the transport,
//! the descriptor, and the bearer credential, and turns each provider call into a
//! [`ProviderRequest`]. Funding replies are handed back raw so the executor can classify
//! them; challenge replies are decoded here because every non-2xx answer from those
//! endpoints is fatal to the clearing loop.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{ApiToken, OneTimeToken},
	error::{ConfigError, TransientError, TransportError},
	http::{HttpTransport, ProviderReply, ProviderRequest},
	provider::ProviderDescriptor,
	sca::{ChallengeState, FundingAttempt, OneTimeCode, SmsDelivery, wire},
};

/// Shared client for every provider endpoint the flows touch.
pub struct ProviderClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Transport used for every outbound provider request.
	pub http_client: Arc<C>,
	/// Descriptor that defines the base URL and header quirks.
	pub descriptor: ProviderDescriptor,
	api_token: Option<ApiToken>,
}
impl<C> ProviderClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates a client without credentials.
	pub fn new(descriptor: ProviderDescriptor, http_client: impl Into<Arc<C>>) -> Self {
		Self { http_client: http_client.into(), descriptor, api_token: None }
	}

	/// Sets or replaces the bearer credential attached to every request.
	pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
		self.api_token = Some(ApiToken::new(token));

		self
	}

	/// Whether a bearer credential is configured.
	pub fn has_api_token(&self) -> bool {
		self.api_token.is_some()
	}

	/// Submits one funding call, optionally presenting a cleared one-time token.
	pub async fn submit_funding(
		&self,
		attempt: &FundingAttempt,
		proof: Option<&OneTimeToken>,
	) -> Result<ProviderReply> {
		let url = self.descriptor.funding_url(&attempt.profile_id, &attempt.transfer_id)?;
		let mut request = ProviderRequest::post(url)
			.json(&wire::FundingBody { kind: attempt.funding_method.as_str() })
			.map_err(ConfigError::from)?;

		if let Some(token) = proof {
			request = self.with_one_time_token(request, token);
		}

		self.send(request).await
	}

	/// Fetches the outstanding challenges for `token`.
	pub async fn challenge_status(&self, token: &OneTimeToken) -> Result<ChallengeState> {
		let request =
			self.with_one_time_token(ProviderRequest::get(self.descriptor.ott_status_url()?), token);
		let reply = self.send(request).await?;
		let envelope: wire::OttEnvelope = self.decode("challenge_status", &reply)?;

		Ok(envelope.into())
	}

	/// Asks the provider to deliver an SMS code for `token`.
	pub async fn trigger_sms(&self, token: &OneTimeToken) -> Result<SmsDelivery> {
		let request = self
			.with_one_time_token(ProviderRequest::post(self.descriptor.sms_trigger_url()?), token);
		let reply = self.send(request).await?;

		if reply.is_success() && reply.body.iter().all(u8::is_ascii_whitespace) {
			return Ok(SmsDelivery::default());
		}

		self.decode("sms_trigger", &reply)
	}

	/// Submits `code` for `token` and returns the refreshed challenge state.
	pub async fn verify_sms(
		&self,
		token: &OneTimeToken,
		code: &OneTimeCode,
	) -> Result<ChallengeState> {
		let request = ProviderRequest::post(self.descriptor.sms_verify_url()?)
			.json(&wire::VerifyBody { otp_code: code.expose() })
			.map_err(ConfigError::from)?;
		let reply = self.send(self.with_one_time_token(request, token)).await?;
		let envelope: wire::OttEnvelope = self.decode("sms_verify", &reply)?;

		Ok(envelope.into())
	}

	/// Builds the error reported for a non-2xx reply from `endpoint`.
	pub fn unexpected_status(&self, endpoint: &'static str, reply: &ProviderReply) -> TransientError {
		let meta = reply.metadata(&self.descriptor.quirks.trace_id_header);

		TransientError::Endpoint {
			endpoint,
			status: meta.status,
			body: reply.body_preview(),
			trace_id: meta.trace_id,
			retry_after: meta.retry_after,
		}
	}

	/// Decodes a 2xx JSON body, mapping failures into [`TransientError`].
	pub(crate) fn decode<T>(&self, endpoint: &'static str, reply: &ProviderReply) -> Result<T>
	where
		T: DeserializeOwned,
	{
		if !reply.is_success() {
			return Err(self.unexpected_status(endpoint, reply).into());
		}

		decode_json(endpoint, reply).map_err(Error::from)
	}

	fn with_one_time_token(&self, request: ProviderRequest, token: &OneTimeToken) -> ProviderRequest {
		request.header(self.descriptor.quirks.one_time_token_header.as_str(), token.expose())
	}

	async fn send(&self, mut request: ProviderRequest) -> Result<ProviderReply> {
		if let Some(token) = self.api_token.as_ref() {
			request = request.header("Authorization", format!("Bearer {}", token.expose()));
		}

		self.http_client.execute(request).await.map_err(|e| TransportError::network(e).into())
	}
}
impl<C> Clone for ProviderClient<C>
where
	C: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			descriptor: self.descriptor.clone(),
			api_token: self.api_token.clone(),
		}
	}
}
impl<C> Debug for ProviderClient<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProviderClient")
			.field("descriptor", &self.descriptor)
			.field("api_token_set", &self.api_token.is_some())
			.finish()
	}
}

/// Decodes `reply.body` as JSON, keeping the failing field path.
pub(crate) fn decode_json<T>(endpoint: &'static str, reply: &ProviderReply) -> Result<T, TransientError>
where
	T: DeserializeOwned,
{
	let mut de = serde_json::Deserializer::from_slice(&reply.body);

	serde_path_to_error::deserialize(&mut de).map_err(|source| TransientError::ResponseParse {
		endpoint,
		source,
		status: reply.status,
	})
}
