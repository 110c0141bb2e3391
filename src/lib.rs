//! Strong customer authentication for transfer funding: fund a pending transfer, clear the
//! provider's one-time-token challenges, and retry with proof in one bounded async flow.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod endpoint;
pub mod error;
pub mod flows;
pub mod http;
pub mod obs;
pub mod provider;
pub mod sca;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature. The reqwest client built here skips certificate checks.

	pub use tokio_util::sync::CancellationToken;

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::ProviderId,
		flows::FundingOrchestrator,
		http::ReqwestHttpClient,
		provider::{ProviderDescriptor, ProviderEnvironment},
		sca::ResolverConfig,
	};

	/// Orchestrator type alias used by reqwest-backed integration tests.
	pub type ReqwestTestOrchestrator = FundingOrchestrator<ReqwestHttpClient>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Builds a sandbox descriptor pointing at a mock server base URL.
	pub fn test_descriptor(base_url: &str) -> ProviderDescriptor {
		let id = ProviderId::new("mock-provider").expect("Mock provider identifier should be valid.");

		ProviderDescriptor::builder(id)
			.environment(ProviderEnvironment::Sandbox)
			.base_url(Url::parse(base_url).expect("Mock base URL should parse successfully."))
			.build()
			.expect("Mock provider descriptor should build successfully.")
	}

	/// Constructs a [`FundingOrchestrator`] backed by the reqwest transport used across
	/// integration tests, with a zero poll interval so challenge loops run back to back.
	pub fn build_reqwest_test_orchestrator(base_url: &str) -> ReqwestTestOrchestrator {
		FundingOrchestrator::with_http_client(test_descriptor(base_url), test_reqwest_http_client())
			.with_api_token("test-api-token")
			.with_resolver_config(ResolverConfig::default().with_poll_interval(StdDuration::ZERO))
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration as StdDuration,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, FailureReason, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use tokio_util;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
