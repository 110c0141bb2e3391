// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use sca_funding::{
	_preludet::*,
	auth::{ProfileId, TransferId},
	error::TransientError,
	sca::{FixedCodeProvider, FundingAttempt, FundingMethod, OneTimeCode},
};

const FUNDING_PATH: &str = "/v3/profiles/p1/transfers/t1/payments";
const STATUS_PATH: &str = "/v1/one-time-token/status";
const TRIGGER_PATH: &str = "/v1/one-time-token/sms/trigger";
const VERIFY_PATH: &str = "/v1/one-time-token/sms/verify";

fn attempt() -> FundingAttempt {
	FundingAttempt::new(
		ProfileId::new("p1").expect("Profile identifier should be valid for funding tests."),
		TransferId::new("t1").expect("Transfer identifier should be valid for funding tests."),
	)
}

fn ott_body(challenges: serde_json::Value) -> serde_json::Value {
	json!({
		"oneTimeTokenProperties": {
			"oneTimeToken": "ott-1",
			"challenges": challenges,
			"validity": 3600
		}
	})
}

#[tokio::test]
async fn first_attempt_success_issues_single_call() {
	let server = MockServer::start_async().await;
	let orchestrator = build_reqwest_test_orchestrator(&server.base_url());
	let funding = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(FUNDING_PATH)
				.header("Authorization", "Bearer test-api-token")
				.header_missing("One-Time-Token")
				.json_body(json!({ "type": "BALANCE" }));
			then.status(201)
				.header("content-type", "application/json")
				.json_body(json!({ "type": "BALANCE", "status": "COMPLETED", "balanceTransactionId": 7 }));
		})
		.await;
	let status = server
		.mock_async(|when, then| {
			when.method(GET).path(STATUS_PATH);
			then.status(200).json_body(ott_body(json!([])));
		})
		.await;
	let result = orchestrator
		.fund_transfer(attempt(), &FixedCodeProvider::sandbox(), &CancellationToken::new())
		.await
		.expect("First-attempt funding should succeed.");

	assert_eq!(result.status, "COMPLETED");
	assert_eq!(result.balance_transaction_id, Some(7));

	funding.assert_calls_async(1).await;
	status.assert_calls_async(0).await;

	assert_eq!(orchestrator.metrics.funding_calls(), 1);
	assert_eq!(orchestrator.metrics.successes(), 1);
}

#[tokio::test]
async fn approved_step_up_skips_resolution_and_retries_once() {
	let server = MockServer::start_async().await;
	let orchestrator = build_reqwest_test_orchestrator(&server.base_url());
	let first = server
		.mock_async(|when, then| {
			when.method(POST).path(FUNDING_PATH).header_missing("One-Time-Token");
			then.status(403)
				.header("x-2fa-approval", "ott-approved")
				.header("x-2fa-approval-result", "APPROVED");
		})
		.await;
	let retry = server
		.mock_async(|when, then| {
			when.method(POST).path(FUNDING_PATH).header("One-Time-Token", "ott-approved");
			then.status(200).json_body(json!({ "status": "COMPLETED" }));
		})
		.await;
	let status = server
		.mock_async(|when, then| {
			when.method(GET).path(STATUS_PATH);
			then.status(200).json_body(ott_body(json!([{ "type": "SMS" }])));
		})
		.await;
	let result = orchestrator
		.fund_transfer(attempt(), &FixedCodeProvider::sandbox(), &CancellationToken::new())
		.await
		.expect("Pre-approved step-up should fund after one retry.");

	assert_eq!(result.status, "COMPLETED");

	first.assert_calls_async(1).await;
	retry.assert_calls_async(1).await;
	status.assert_calls_async(0).await;

	assert_eq!(orchestrator.metrics.step_ups(), 1);
	assert_eq!(orchestrator.metrics.challenge_cycles(), 0);
}

#[tokio::test]
async fn sms_challenge_is_cleared_before_retry() {
	let server = MockServer::start_async().await;
	let orchestrator = build_reqwest_test_orchestrator(&server.base_url());
	let first = server
		.mock_async(|when, then| {
			when.method(POST).path(FUNDING_PATH).header_missing("One-Time-Token");
			then.status(403)
				.header("x-2fa-approval", "ott-1")
				.header("x-2fa-approval-result", "NEEDS_APPROVAL")
				.header("x-trace-id", "trace-1");
		})
		.await;
	let status = server
		.mock_async(|when, then| {
			when.method(GET).path(STATUS_PATH).header("One-Time-Token", "ott-1");
			then.status(200).json_body(ott_body(json!([{ "type": "SMS" }])));
		})
		.await;
	let trigger = server
		.mock_async(|when, then| {
			when.method(POST).path(TRIGGER_PATH).header("One-Time-Token", "ott-1");
			then.status(200).json_body(json!({ "obfuscatedPhoneNo": "*******1234" }));
		})
		.await;
	let verify = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(VERIFY_PATH)
				.header("One-Time-Token", "ott-1")
				.json_body(json!({ "otpCode": "111111" }));
			then.status(200).json_body(ott_body(json!([])));
		})
		.await;
	let retry = server
		.mock_async(|when, then| {
			when.method(POST).path(FUNDING_PATH).header("One-Time-Token", "ott-1");
			then.status(200).json_body(json!({ "status": "COMPLETED" }));
		})
		.await;
	let result = orchestrator
		.fund_transfer(attempt(), &FixedCodeProvider::sandbox(), &CancellationToken::new())
		.await
		.expect("Cleared SMS challenge should allow funding.");

	assert_eq!(result.status, "COMPLETED");

	first.assert_calls_async(1).await;
	status.assert_calls_async(1).await;
	trigger.assert_calls_async(1).await;
	verify.assert_calls_async(1).await;
	retry.assert_calls_async(1).await;

	assert_eq!(orchestrator.metrics.challenge_cycles(), 1);
}

#[tokio::test]
async fn never_clearing_challenge_stops_at_cycle_bound() {
	let server = MockServer::start_async().await;
	let orchestrator = build_reqwest_test_orchestrator(&server.base_url());
	let first = server
		.mock_async(|when, then| {
			when.method(POST).path(FUNDING_PATH).header_missing("One-Time-Token");
			then.status(403).header("x-2fa-approval", "ott-1");
		})
		.await;
	let status = server
		.mock_async(|when, then| {
			when.method(GET).path(STATUS_PATH);
			then.status(200).json_body(ott_body(json!([{ "type": "SMS" }])));
		})
		.await;
	let trigger = server
		.mock_async(|when, then| {
			when.method(POST).path(TRIGGER_PATH);
			then.status(200);
		})
		.await;
	let verify = server
		.mock_async(|when, then| {
			when.method(POST).path(VERIFY_PATH);
			then.status(200).json_body(ott_body(json!([{ "type": "SMS" }])));
		})
		.await;
	let retry = server
		.mock_async(|when, then| {
			when.method(POST).path(FUNDING_PATH).header_exists("One-Time-Token");
			then.status(200).json_body(json!({ "status": "COMPLETED" }));
		})
		.await;
	let err = orchestrator
		.fund_transfer(attempt(), &FixedCodeProvider::sandbox(), &CancellationToken::new())
		.await
		.expect_err("A challenge that never clears must exhaust the cycle budget.");

	assert!(matches!(err, Error::ChallengeLoopExceeded { cycles: 5 }));
	assert_eq!(err.reason(), FailureReason::ChallengeLoopExceeded);

	first.assert_calls_async(1).await;
	status.assert_calls_async(6).await;
	trigger.assert_calls_async(5).await;
	verify.assert_calls_async(5).await;
	retry.assert_calls_async(0).await;

	assert_eq!(orchestrator.metrics.challenge_cycles(), 5);
	assert_eq!(orchestrator.metrics.failures(), 1);
}

#[tokio::test]
async fn unsupported_kind_fails_without_dispatch() {
	let server = MockServer::start_async().await;
	let orchestrator = build_reqwest_test_orchestrator(&server.base_url());
	let _first = server
		.mock_async(|when, then| {
			when.method(POST).path(FUNDING_PATH);
			then.status(403).header("x-2fa-approval", "ott-1");
		})
		.await;
	let _status = server
		.mock_async(|when, then| {
			when.method(GET).path(STATUS_PATH);
			then.status(200).json_body(ott_body(json!([{ "type": "SMS" }, { "type": "PIN" }])));
		})
		.await;
	let trigger = server
		.mock_async(|when, then| {
			when.method(POST).path(TRIGGER_PATH);
			then.status(200);
		})
		.await;
	let err = orchestrator
		.fund_transfer(attempt(), &FixedCodeProvider::sandbox(), &CancellationToken::new())
		.await
		.expect_err("PIN challenges cannot be cleared.");

	match err {
		Error::UnsupportedChallengeKind { kind } => assert_eq!(kind, "PIN"),
		other => panic!("Unexpected error variant: {other:?}."),
	}

	trigger.assert_calls_async(0).await;
}

#[tokio::test]
async fn forbidden_without_token_reports_no_challenge_support() {
	let server = MockServer::start_async().await;
	let orchestrator = build_reqwest_test_orchestrator(&server.base_url());
	let funding = server
		.mock_async(|when, then| {
			when.method(POST).path(FUNDING_PATH);
			then.status(403).header("x-trace-id", "trace-403").body("{\"error\":\"forbidden\"}");
		})
		.await;
	let err = orchestrator
		.fund_transfer(attempt(), &FixedCodeProvider::sandbox(), &CancellationToken::new())
		.await
		.expect_err("403 without a challenge token must be fatal.");

	match err {
		Error::NoChallengeSupport { status, trace_id } => {
			assert_eq!(status, 403);
			assert_eq!(trace_id.as_deref(), Some("trace-403"));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	funding.assert_calls_async(1).await;

	assert_eq!(orchestrator.metrics.funding_calls(), 1);
}

#[tokio::test]
async fn second_step_up_after_resolution_is_retry_rejected() {
	let server = MockServer::start_async().await;
	let orchestrator = build_reqwest_test_orchestrator(&server.base_url());
	let funding = server
		.mock_async(|when, then| {
			when.method(POST).path(FUNDING_PATH);
			then.status(403).header("x-2fa-approval", "ott-1");
		})
		.await;
	let status = server
		.mock_async(|when, then| {
			when.method(GET).path(STATUS_PATH);
			then.status(200).json_body(ott_body(json!([])));
		})
		.await;
	let err = orchestrator
		.fund_transfer(attempt(), &FixedCodeProvider::sandbox(), &CancellationToken::new())
		.await
		.expect_err("A repeated step-up after resolution must not loop.");

	assert!(matches!(err, Error::RetryRejected { status: None, .. }));

	funding.assert_calls_async(2).await;
	status.assert_calls_async(1).await;
}

#[tokio::test]
async fn refused_retry_carries_status() {
	let server = MockServer::start_async().await;
	let orchestrator = build_reqwest_test_orchestrator(&server.base_url());
	let _first = server
		.mock_async(|when, then| {
			when.method(POST).path(FUNDING_PATH).header_missing("One-Time-Token");
			then.status(403)
				.header("x-2fa-approval", "ott-1")
				.header("x-2fa-approval-result", "APPROVED");
		})
		.await;
	let _retry = server
		.mock_async(|when, then| {
			when.method(POST).path(FUNDING_PATH).header("One-Time-Token", "ott-1");
			then.status(422).body("{\"errors\":[{\"code\":\"transfer.insufficient_funds\"}]}");
		})
		.await;
	let err = orchestrator
		.fund_transfer(attempt(), &FixedCodeProvider::sandbox(), &CancellationToken::new())
		.await
		.expect_err("A refused retry must surface to the caller.");

	assert!(matches!(err, Error::RetryRejected { status: Some(422), .. }));
	assert_eq!(err.reason(), FailureReason::RetryRejected);
}

#[tokio::test]
async fn first_attempt_server_error_is_transient() {
	let server = MockServer::start_async().await;
	let orchestrator = build_reqwest_test_orchestrator(&server.base_url());
	let funding = server
		.mock_async(|when, then| {
			when.method(POST).path(FUNDING_PATH);
			then.status(503).header("Retry-After", "30").body("maintenance");
		})
		.await;
	let err = orchestrator
		.fund_transfer(attempt(), &FixedCodeProvider::sandbox(), &CancellationToken::new())
		.await
		.expect_err("5xx responses should surface as transient failures.");

	match err {
		Error::Transient(TransientError::Endpoint { endpoint, status, body, retry_after, .. }) => {
			assert_eq!(endpoint, "funding");
			assert_eq!(status, 503);
			assert_eq!(body, "maintenance");
			assert_eq!(retry_after, Some(Duration::seconds(30)));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	funding.assert_calls_async(1).await;
}

#[tokio::test]
async fn custom_funding_method_and_code_are_sent() {
	let server = MockServer::start_async().await;
	let orchestrator = build_reqwest_test_orchestrator(&server.base_url());
	let _first = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(FUNDING_PATH)
				.header_missing("One-Time-Token")
				.json_body(json!({ "type": "TRUSTED_PRE_FUND_BULK" }));
			then.status(403).header("x-2fa-approval", "ott-1");
		})
		.await;
	let _status = server
		.mock_async(|when, then| {
			when.method(GET).path(STATUS_PATH);
			then.status(200).json_body(ott_body(json!([{ "type": "SMS" }])));
		})
		.await;
	let _trigger = server
		.mock_async(|when, then| {
			when.method(POST).path(TRIGGER_PATH);
			then.status(200).json_body(json!({}));
		})
		.await;
	let verify = server
		.mock_async(|when, then| {
			when.method(POST).path(VERIFY_PATH).json_body(json!({ "otpCode": "654321" }));
			then.status(200).json_body(ott_body(json!([])));
		})
		.await;
	let _retry = server
		.mock_async(|when, then| {
			when.method(POST).path(FUNDING_PATH).header("One-Time-Token", "ott-1");
			then.status(200).json_body(json!({ "status": "COMPLETED" }));
		})
		.await;
	let codes = FixedCodeProvider::new(
		OneTimeCode::new("654321").expect("Code fixture should be valid."),
	);
	let attempt =
		attempt().with_funding_method(FundingMethod::Other("TRUSTED_PRE_FUND_BULK".into()));
	let result = orchestrator
		.fund_transfer(attempt, &codes, &CancellationToken::new())
		.await
		.expect("Funding with a custom method should succeed.");

	assert_eq!(result.status, "COMPLETED");

	verify.assert_calls_async(1).await;
}
