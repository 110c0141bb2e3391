//! Transport primitives for provider calls.
//!
//! The module exposes [`HttpTransport`] alongside the crate-owned [`ProviderRequest`] and
//! [`ProviderReply`] types so downstream crates can plug in custom HTTP clients (or scripted
//! fakes in tests) without the flows ever touching reqwest types. Transports report every
//! HTTP response, error statuses included, as a [`ProviderReply`]; only failures that prevent
//! a response from being read surface as `Err`.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
use time::format_description::well_known::Rfc2822;
// self
use crate::_prelude::*;

/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a, E> =
	Pin<Box<dyn Future<Output = Result<ProviderReply, E>> + 'a + Send>>;

const BODY_PREVIEW_LIMIT: usize = 512;

/// Abstraction over HTTP transports capable of executing provider requests.
///
/// The trait is the crate's only dependency on an HTTP stack. Implementations must be
/// `Send + Sync + 'static` so one transport can be shared behind an `Arc` by every flow,
/// and the futures they return must be `Send`. An implementation must never follow the
/// request with a retry of its own: funding calls move money and the orchestrator decides
/// when a call is repeated.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Sends `request` and resolves once the full response body has been read.
	fn execute(&self, request: ProviderRequest) -> TransportFuture<'_, Self::TransportError>;
}

/// HTTP methods used by the provider endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
	/// `GET`.
	Get,
	/// `POST`.
	Post,
}
impl HttpMethod {
	/// Returns the canonical method token.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Get => "GET",
			Self::Post => "POST",
		}
	}
}
impl Display for HttpMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Transport-agnostic request description.
#[derive(Clone, Debug)]
pub struct ProviderRequest {
	/// Request method.
	pub method: HttpMethod,
	/// Absolute request URL.
	pub url: Url,
	/// Extra request headers in insertion order.
	pub headers: Vec<(String, String)>,
	/// JSON body, when present.
	pub body: Option<Vec<u8>>,
}
impl ProviderRequest {
	/// Creates a `GET` request.
	pub fn get(url: Url) -> Self {
		Self { method: HttpMethod::Get, url, headers: Vec::new(), body: None }
	}

	/// Creates a `POST` request.
	pub fn post(url: Url) -> Self {
		Self { method: HttpMethod::Post, url, headers: Vec::new(), body: None }
	}

	/// Appends a header.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));

		self
	}

	/// Serializes `value` as the JSON body and sets the content type.
	pub fn json<T>(mut self, value: &T) -> Result<Self, serde_json::Error>
	where
		T: ?Sized + Serialize,
	{
		self.body = Some(serde_json::to_vec(value)?);

		Ok(self.header("Content-Type", "application/json"))
	}

	/// Looks up a request header by case-insensitive name.
	pub fn header_value(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}

/// Transport-agnostic response returned by [`HttpTransport`] implementations.
#[derive(Clone, Debug, Default)]
pub struct ProviderReply {
	/// HTTP status code.
	pub status: u16,
	/// Response headers keyed by lowercase name.
	pub headers: BTreeMap<String, String>,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ProviderReply {
	/// Creates a reply with the given status and an empty body.
	pub fn new(status: u16) -> Self {
		Self { status, ..Default::default() }
	}

	/// Adds a header, normalizing the name to lowercase.
	pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
		self.headers.insert(name.to_ascii_lowercase(), value.into());

		self
	}

	/// Replaces the body.
	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = body.into();

		self
	}

	/// Whether the status is in the 2xx range.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Looks up a header by case-insensitive name, ignoring blank values.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.get(&name.to_ascii_lowercase())
			.map(|value| value.trim())
			.filter(|value| !value.is_empty())
	}

	/// Lossy UTF-8 preview of the body, truncated for error messages.
	pub fn body_preview(&self) -> String {
		let text = String::from_utf8_lossy(&self.body);

		match text.char_indices().nth(BODY_PREVIEW_LIMIT) {
			Some((idx, _)) => format!("{}...", &text[..idx]),
			None => text.into_owned(),
		}
	}

	/// Extracts status, trace identifier, and retry hint.
	pub fn metadata(&self, trace_header: &str) -> ResponseMetadata {
		ResponseMetadata {
			status: self.status,
			trace_id: self.header(trace_header).map(str::to_owned),
			retry_after: parse_retry_after(self),
		}
	}
}

/// Metadata captured from a provider response for error reporting.
///
/// Additional metadata fields may be added in future releases, so downstream code
/// should construct values using field names instead of struct update syntax.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
	/// HTTP status code.
	pub status: u16,
	/// Provider trace identifier, if available.
	pub trace_id: Option<String>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
/// Funding calls should not follow redirects; configure any custom [`ReqwestClient`]
/// accordingly before wrapping it.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client that never follows redirects.
	pub fn new() -> Result<Self> {
		let client = ReqwestClient::builder()
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.map_err(crate::error::ConfigError::from)?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn execute(&self, request: ProviderRequest) -> TransportFuture<'_, Self::TransportError> {
		Box::pin(async move {
			let method = match request.method {
				HttpMethod::Get => reqwest::Method::GET,
				HttpMethod::Post => reqwest::Method::POST,
			};
			let mut builder = self.0.request(method, request.url);

			for (name, value) in &request.headers {
				builder = builder.header(name.as_str(), value.as_str());
			}
			if let Some(body) = request.body {
				builder = builder.body(body);
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let headers = response
				.headers()
				.iter()
				.filter_map(|(name, value)| {
					Some((name.as_str().to_owned(), value.to_str().ok()?.to_owned()))
				})
				.collect();
			let body = response.bytes().await?.to_vec();

			Ok(ProviderReply { status, headers, body })
		})
	}
}

fn parse_retry_after(reply: &ProviderReply) -> Option<Duration> {
	let raw = reply.header("retry-after")?;

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn reply_headers_are_case_insensitive_and_skip_blanks() {
		let reply = ProviderReply::new(403)
			.with_header("X-2FA-Approval", "ott-1")
			.with_header("x-2fa-approval-result", "  ");

		assert_eq!(reply.header("x-2fa-approval"), Some("ott-1"));
		assert_eq!(reply.header("X-2fa-Approval-Result"), None);
		assert!(!reply.is_success());
	}

	#[test]
	fn metadata_reads_trace_and_retry_after() {
		let reply = ProviderReply::new(503)
			.with_header("x-trace-id", "trace-9")
			.with_header("Retry-After", "7");
		let meta = reply.metadata("X-Trace-Id");

		assert_eq!(meta.status, 503);
		assert_eq!(meta.trace_id.as_deref(), Some("trace-9"));
		assert_eq!(meta.retry_after, Some(Duration::seconds(7)));
	}

	#[test]
	fn body_preview_truncates_long_bodies() {
		let reply = ProviderReply::new(500).with_body("e".repeat(BODY_PREVIEW_LIMIT + 10));
		let preview = reply.body_preview();

		assert!(preview.ends_with("..."));
		assert_eq!(preview.len(), BODY_PREVIEW_LIMIT + 3);
	}

	#[test]
	fn json_requests_set_content_type() {
		let url = Url::parse("https://example.com/pay").expect("Fixture URL should parse.");
		let request = ProviderRequest::post(url)
			.json(&serde_json::json!({ "type": "BALANCE" }))
			.expect("Fixture body should serialize.");

		assert_eq!(request.header_value("content-type"), Some("application/json"));
		assert_eq!(request.body.as_deref(), Some(br#"{"type":"BALANCE"}"#.as_slice()));
	}
}
