//! High-level funding orchestration.

pub(crate) mod common;

mod fund_transfer;
mod metrics;

pub use metrics::FundingMetrics;

// self
use crate::{
	_prelude::*,
	auth::{ProfileId, TransferId},
	endpoint::ProviderClient,
	http::HttpTransport,
	provider::ProviderDescriptor,
	sca::ResolverConfig,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Orchestrator specialized for the crate's default reqwest transport.
pub type ReqwestFundingOrchestrator = FundingOrchestrator<ReqwestHttpClient>;

pub(crate) type FlowKey = (ProfileId, TransferId);
pub(crate) type FlowGuards = HashMap<FlowKey, Arc<AsyncMutex<()>>>;

/// Funds transfers, clearing strong customer authentication challenges on the way.
///
/// The orchestrator owns the provider client (transport, descriptor, credential), the
/// challenge-clearing limits, and shared counters, so callers never touch process-wide
/// state. Clones share the transport, counters, and in-flight guards.
pub struct FundingOrchestrator<C>
where
	C: ?Sized + HttpTransport,
{
	/// Client used for every funding and challenge call.
	pub client: ProviderClient<C>,
	/// Limits applied while clearing challenges.
	pub resolver_config: ResolverConfig,
	/// Shared counters for funding outcomes.
	pub metrics: Arc<FundingMetrics>,
	flow_guards: Arc<Mutex<FlowGuards>>,
}
impl<C> FundingOrchestrator<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates an orchestrator that reuses the caller-provided transport.
	pub fn with_http_client(descriptor: ProviderDescriptor, http_client: impl Into<Arc<C>>) -> Self {
		Self {
			client: ProviderClient::new(descriptor, http_client),
			resolver_config: ResolverConfig::default(),
			metrics: Default::default(),
			flow_guards: Default::default(),
		}
	}

	/// Sets or replaces the bearer credential.
	pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
		self.client = self.client.with_api_token(token);

		self
	}

	/// Replaces every challenge-clearing limit at once.
	pub fn with_resolver_config(mut self, config: ResolverConfig) -> Self {
		self.resolver_config = config;

		self
	}

	/// Overrides the challenge cycle budget.
	pub fn with_max_challenge_cycles(mut self, max_cycles: u32) -> Self {
		self.resolver_config = self.resolver_config.with_max_cycles(max_cycles);

		self
	}

	/// Overrides the code wait.
	pub fn with_code_timeout(mut self, timeout: StdDuration) -> Self {
		self.resolver_config = self.resolver_config.with_code_timeout(timeout);

		self
	}

	/// Overrides the pause between challenge cycles.
	pub fn with_poll_interval(mut self, interval: StdDuration) -> Self {
		self.resolver_config = self.resolver_config.with_poll_interval(interval);

		self
	}

	/// Descriptor the orchestrator talks to.
	pub fn descriptor(&self) -> &ProviderDescriptor {
		&self.client.descriptor
	}

	/// Number of transfers currently being funded through this orchestrator or its clones.
	pub fn in_flight(&self) -> usize {
		self.flow_guards.lock().len()
	}
}
#[cfg(feature = "reqwest")]
impl FundingOrchestrator<ReqwestHttpClient> {
	/// Creates an orchestrator with its own redirect-free reqwest transport.
	pub fn new(descriptor: ProviderDescriptor) -> Result<Self> {
		Ok(Self::with_http_client(descriptor, ReqwestHttpClient::new()?))
	}
}
impl<C> Clone for FundingOrchestrator<C>
where
	C: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			client: self.client.clone(),
			resolver_config: self.resolver_config.clone(),
			metrics: self.metrics.clone(),
			flow_guards: self.flow_guards.clone(),
		}
	}
}
impl<C> Debug for FundingOrchestrator<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("FundingOrchestrator")
			.field("client", &self.client)
			.field("resolver_config", &self.resolver_config)
			.finish()
	}
}
