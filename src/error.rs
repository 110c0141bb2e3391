//! Crate-level error types shared across endpoints, challenge clearing, and flows.

// self
use crate::{_prelude::*, sca::CodeProviderError};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Every terminal failure of a funding orchestration lands here; use [`Error::reason`] to branch
/// on the coarse failure tag instead of matching every variant.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Upstream answered with an unexpected status or body; the caller may retry.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Funding was refused with 403 but no challenge token was offered.
	#[error("Funding was refused without a step-up challenge (HTTP {status}).")]
	NoChallengeSupport {
		/// HTTP status returned by the funding endpoint.
		status: u16,
		/// Provider trace identifier, when supplied.
		trace_id: Option<String>,
	},
	/// An outstanding challenge requires a capability this crate does not implement.
	#[error("Challenge kind `{kind}` is not supported.")]
	UnsupportedChallengeKind {
		/// Raw challenge type reported by the provider.
		kind: String,
	},
	/// The provider kept reporting outstanding challenges after the configured cycle budget.
	#[error("Challenges were still outstanding after {cycles} clearing cycles.")]
	ChallengeLoopExceeded {
		/// Number of completed trigger/verify cycles.
		cycles: u32,
	},
	/// Funding retried with proof was still refused.
	#[error("Funding retry with a cleared one-time token was refused: {detail}.")]
	RetryRejected {
		/// HTTP status of the refused retry, when one was received.
		status: Option<u16>,
		/// Short description of the refusal.
		detail: String,
	},
	/// The caller cancelled the orchestration.
	#[error("Funding orchestration was cancelled.")]
	Cancelled,
	/// The code provider did not produce a code in time.
	#[error("No one-time code was supplied within {after:?}.")]
	CodeTimeout {
		/// Configured wait budget.
		after: StdDuration,
	},
	/// The code provider failed to produce a code.
	#[error("One-time code could not be obtained.")]
	CodeUnavailable(#[from] CodeProviderError),
	/// Another orchestration is already funding the same transfer.
	#[error("Transfer `{transfer}` of profile `{profile}` is already being funded.")]
	TransferInFlight {
		/// Profile identifier string.
		profile: String,
		/// Transfer identifier string.
		transfer: String,
	},
}
impl Error {
	/// Returns the coarse failure tag for this error.
	pub fn reason(&self) -> FailureReason {
		match self {
			Self::Config(_) => FailureReason::Config,
			Self::Transient(_) | Self::Transport(_) => FailureReason::TransportError,
			Self::NoChallengeSupport { .. } => FailureReason::NoChallengeSupport,
			Self::UnsupportedChallengeKind { .. } => FailureReason::UnsupportedChallengeKind,
			Self::ChallengeLoopExceeded { .. } => FailureReason::ChallengeLoopExceeded,
			Self::RetryRejected { .. } => FailureReason::RetryRejected,
			Self::Cancelled => FailureReason::Cancelled,
			Self::CodeTimeout { .. } => FailureReason::CodeTimeout,
			Self::CodeUnavailable(_) => FailureReason::CodeUnavailable,
			Self::TransferInFlight { .. } => FailureReason::InFlight,
		}
	}

	/// Whether the caller may retry the whole orchestration later.
	pub fn is_retryable(&self) -> bool {
		matches!(self.reason(), FailureReason::TransportError | FailureReason::InFlight)
	}
}

/// Coarse failure tags surfaced by [`Error::reason`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureReason {
	/// Network or HTTP-layer failure.
	TransportError,
	/// Provider refused funding without offering a challenge.
	NoChallengeSupport,
	/// A challenge kind cannot be cleared by this crate.
	UnsupportedChallengeKind,
	/// Challenge clearing hit its cycle bound.
	ChallengeLoopExceeded,
	/// Funding was refused after challenge clearing.
	RetryRejected,
	/// The caller cancelled the flow.
	Cancelled,
	/// The code wait timed out.
	CodeTimeout,
	/// The code provider failed.
	CodeUnavailable,
	/// Another orchestration owns the transfer.
	InFlight,
	/// Local configuration problem.
	Config,
}
impl FailureReason {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::TransportError => "transport_error",
			Self::NoChallengeSupport => "no_challenge_support",
			Self::UnsupportedChallengeKind => "unsupported_challenge_kind",
			Self::ChallengeLoopExceeded => "challenge_loop_exceeded",
			Self::RetryRejected => "retry_rejected",
			Self::Cancelled => "cancelled",
			Self::CodeTimeout => "code_timeout",
			Self::CodeUnavailable => "code_unavailable",
			Self::InFlight => "in_flight",
			Self::Config => "config",
		}
	}
}
impl Display for FailureReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Endpoint URL could not be derived from the descriptor base URL.
	#[error("Endpoint URL `{path}` is invalid.")]
	InvalidEndpoint {
		/// Relative path that failed to join.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Provider descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] crate::provider::ProviderDescriptorError),
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	RequestBody(#[from] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Temporary failure variants (safe to retry at the caller's discretion).
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Provider returned an unexpected status.
	#[error("The {endpoint} endpoint returned HTTP {status}.")]
	Endpoint {
		/// Logical endpoint label (`funding`, `challenge_status`, ...).
		endpoint: &'static str,
		/// HTTP status code.
		status: u16,
		/// Response body preview.
		body: String,
		/// Provider trace identifier, when supplied.
		trace_id: Option<String>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Provider responded with JSON that could not be parsed.
	#[error("The {endpoint} endpoint returned malformed JSON.")]
	ResponseParse {
		/// Logical endpoint label.
		endpoint: &'static str,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code.
		status: u16,
	},
}
impl TransientError {
	/// HTTP status associated with the failure.
	pub fn status(&self) -> u16 {
		match self {
			Self::Endpoint { status, .. } | Self::ResponseParse { status, .. } => *status,
		}
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
