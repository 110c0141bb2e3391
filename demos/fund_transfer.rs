//! Demonstrates funding a transfer against a mocked sandbox that asks for one SMS challenge
//! before accepting the payment.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
use url::Url;
// self
use sca_funding::{
	auth::{ProfileId, ProviderId, TransferId},
	flows::FundingOrchestrator,
	http::ReqwestHttpClient,
	provider::{ProviderDescriptor, ProviderEnvironment},
	reqwest::Client,
	sca::{FundingAttempt, default_code_provider},
	tokio_util::sync::CancellationToken,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let _step_up = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/v3/profiles/16/transfers/5012/payments")
				.header_missing("One-Time-Token");
			then.status(403).header("x-2fa-approval", "demo-ott");
		})
		.await;
	let _status = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/one-time-token/status");
			then.status(200).json_body(json!({
				"oneTimeTokenProperties": { "challenges": [{ "type": "SMS" }], "validity": 600 }
			}));
		})
		.await;
	let _trigger = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/one-time-token/sms/trigger");
			then.status(200).json_body(json!({ "obfuscatedPhoneNo": "*******0042" }));
		})
		.await;
	let _verify = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/v1/one-time-token/sms/verify")
				.json_body(json!({ "otpCode": "111111" }));
			then.status(200).json_body(json!({ "oneTimeTokenProperties": { "challenges": [] } }));
		})
		.await;
	let funded = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/v3/profiles/16/transfers/5012/payments")
				.header("One-Time-Token", "demo-ott");
			then.status(201).json_body(
				json!({ "type": "BALANCE", "status": "COMPLETED", "balanceTransactionId": 9001 }),
			);
		})
		.await;
	let descriptor = ProviderDescriptor::builder(ProviderId::new("wise-sandbox")?)
		.environment(ProviderEnvironment::Sandbox)
		.base_url(Url::parse(&server.base_url())?)
		.build()?;
	let http_client = ReqwestHttpClient::with_client(
		Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.redirect(sca_funding::reqwest::redirect::Policy::none())
			.build()?,
	);
	let codes = default_code_provider(descriptor.environment);
	let orchestrator =
		<FundingOrchestrator<ReqwestHttpClient>>::with_http_client(descriptor, http_client)
			.with_api_token("demo-api-token");
	let attempt = FundingAttempt::new(ProfileId::from(16), TransferId::from(5012));
	let result =
		orchestrator.fund_transfer(attempt, codes.as_ref(), &CancellationToken::new()).await?;

	println!("Transfer funded with status {}.", result.status);

	funded.assert_async().await;

	Ok(())
}
