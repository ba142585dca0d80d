#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use berbix::{
	_preludet::*,
	auth::{SharedTokens, TokenSecret, Tokens},
	error::Error,
	model::{
		ApiOnlyOptions, CreateApiOnlyTransactionRequest, CreateHostedTransactionRequest,
		CreateTransactionRequest, HostedOptions, ImageData, ImageFormat, ImageSubject, Issue,
		NextStep, UploadImagesRequest,
	},
};

const API_SECRET: &str = "secret-create";
// base64("secret-create:")
const BASIC_AUTH: &str = "Basic c2VjcmV0LWNyZWF0ZTo=";

#[tokio::test]
async fn create_transaction_mints_credential_pair() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(&server.base_url(), API_SECRET);
	let body = token_response_body("access-1", "client-1", "refresh-1", 501, 7200);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/v0/transactions")
				.header("authorization", BASIC_AUTH)
				.header("content-type", "application/json")
				.json_body(json!({
					"customer_uid": "customer-1",
					"template_key": "tpl_live",
					"email": "ada@example.com",
					"consents_to_automated_facial_recognition": true,
				}));
			then.status(200).header("content-type", "application/json").body(body.clone());
		})
		.await;
	let before = OffsetDateTime::now_utc();
	let response = client
		.create_transaction(
			&CreateTransactionRequest::new("customer-1", "tpl_live")
				.with_email("ada@example.com")
				.with_facial_recognition_consent(true),
		)
		.await
		.expect("Transaction creation should succeed.");

	mock.assert_async().await;

	let tokens = response.tokens;

	assert_eq!(tokens.access_token.as_ref().map(TokenSecret::expose), Some("access-1"));
	assert_eq!(tokens.client_token.as_ref().map(TokenSecret::expose), Some("client-1"));
	assert_eq!(tokens.refresh_token.expose(), "refresh-1");
	assert_eq!(tokens.transaction_id, Some(501));
	assert_eq!(tokens.response_json.as_deref(), Some(body.as_str()));
	assert!(tokens.expires_at.is_some_and(|expires_at| {
		expires_at >= before + Duration::seconds(7200)
			&& expires_at <= OffsetDateTime::now_utc() + Duration::seconds(7200)
	}));
	assert!(!tokens.is_stale());
}

#[tokio::test]
async fn hosted_and_api_only_creation_carry_their_options() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(&server.base_url(), API_SECRET);
	let hosted_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v0/transactions").json_body(json!({
				"customer_uid": "customer-hosted",
				"template_key": "tpl_hosted",
				"consents_to_automated_facial_recognition": false,
				"hosted_options": {
					"completion_email": "ops@example.com",
					"redirect_url": "https://example.com/done",
				},
			}));
			then.status(200).header("content-type", "application/json").json_body(json!({
				"access_token": "access-hosted",
				"refresh_token": "refresh-hosted",
				"transaction_id": 9,
				"expires_in": 3600,
				"hosted_url": "https://verify.berbix.com/t/abc",
			}));
		})
		.await;
	let api_only_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v0/transactions").json_body(json!({
				"customer_uid": "customer-api",
				"template_key": "tpl_api",
				"consents_to_automated_facial_recognition": false,
				"api_only_options": { "id_country": "US", "id_type": "DL" },
			}));
			then.status(200).header("content-type", "application/json").body(token_response_body(
				"access-api",
				"client-api",
				"refresh-api",
				10,
				3600,
			));
		})
		.await;
	let hosted = client
		.create_hosted_transaction(&CreateHostedTransactionRequest {
			transaction: CreateTransactionRequest::new("customer-hosted", "tpl_hosted"),
			hosted_options: HostedOptions {
				completion_email: Some("ops@example.com".into()),
				redirect_url: Some("https://example.com/done".into()),
			},
		})
		.await
		.expect("Hosted creation should succeed.");

	assert_eq!(hosted.hosted_url.as_deref(), Some("https://verify.berbix.com/t/abc"));
	assert_eq!(hosted.tokens.client_token, None);
	assert_eq!(hosted.tokens.transaction_id, Some(9));

	let api_only = client
		.create_api_only_transaction(&CreateApiOnlyTransactionRequest {
			transaction: CreateTransactionRequest::new("customer-api", "tpl_api"),
			api_only_options: ApiOnlyOptions {
				id_country: Some("US".into()),
				id_type: Some("DL".into()),
			},
		})
		.await
		.expect("API-only creation should succeed.");

	assert_eq!(api_only.client_token().map(TokenSecret::expose), Some("client-api"));

	hosted_mock.assert_async().await;
	api_only_mock.assert_async().await;
}

#[tokio::test]
async fn malformed_token_response_is_a_decode_error() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(&server.base_url(), API_SECRET);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v0/transactions");
			then.status(200).header("content-type", "application/json").body("{\"access_token\":1}");
		})
		.await;
	let err = client
		.create_transaction(&CreateTransactionRequest::new("customer-1", "tpl_live"))
		.await
		.expect_err("Mistyped token responses should fail.");

	mock.assert_async().await;

	assert!(matches!(err, Error::Decode(_)));
	assert_eq!(err.status(), Some(200));
}

#[tokio::test]
async fn explicit_refresh_returns_new_pair_without_touching_input() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(&server.base_url(), API_SECRET);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/v0/tokens")
				.header("authorization", BASIC_AUTH)
				.json_body(json!({ "refresh_token": "refresh-keep", "grant_type": "refresh_token" }));
			then.status(200).header("content-type", "application/json").body(token_response_body(
				"access-explicit",
				"client-explicit",
				"refresh-keep",
				12,
				900,
			));
		})
		.await;
	let stored = Tokens::from_refresh_token("refresh-keep");
	let fresh = client.refresh_tokens(&stored).await.expect("Explicit refresh should succeed.");

	mock.assert_async().await;

	assert!(stored.access_token.is_none());
	assert_eq!(fresh.access_token.as_ref().map(TokenSecret::expose), Some("access-explicit"));
	assert_eq!(fresh.transaction_id, Some(12));
	assert!(!fresh.is_stale());
}

#[tokio::test]
async fn upload_uses_client_token_and_decodes_next_step() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(&server.base_url(), API_SECRET);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/v0/images/upload")
				.header("authorization", "Bearer client-upload")
				.json_body(json!({
					"images": [{
						"data": "aW1hZ2U=",
						"image_subject": "document_front",
						"format": "image/jpeg",
					}],
				}));
			then.status(200).header("content-type", "application/json").json_body(json!({
				"issues": ["text_unreadable"],
				"next_step": "upload_document_back",
			}));
		})
		.await;
	let request = UploadImagesRequest::new([ImageData::from_bytes(
		b"image",
		ImageSubject::DocumentFront,
		ImageFormat::Jpeg,
	)]);
	let response = client
		.upload_images(&TokenSecret::new("client-upload"), &request)
		.await
		.expect("Upload should succeed.");

	mock.assert_async().await;

	assert_eq!(response.issues, vec![Issue::TextUnreadable]);
	assert_eq!(response.next_step, Some(NextStep::UploadDocumentBack));
	assert!(!response.is_done());
}

#[tokio::test]
async fn upload_with_shared_pair_refreshes_client_token() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(&server.base_url(), API_SECRET);
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v0/tokens");
			then.status(200).header("content-type", "application/json").body(token_response_body(
				"access-up",
				"client-up",
				"refresh-up",
				13,
				900,
			));
		})
		.await;
	let upload_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v0/images/upload").header("authorization", "Bearer client-up");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "issues": [], "next_step": "done" }));
		})
		.await;
	let tokens = SharedTokens::new(Tokens::from_refresh_token("refresh-up"));
	let request = UploadImagesRequest::new([ImageData::from_bytes(
		b"selfie",
		ImageSubject::SelfieFront,
		ImageFormat::Png,
	)]);
	let response =
		client.upload_images_with(&tokens, &request).await.expect("Upload should succeed.");

	refresh_mock.assert_async().await;
	upload_mock.assert_async().await;

	assert!(response.is_done());
}

#[tokio::test]
async fn empty_upload_is_rejected_locally() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(&server.base_url(), API_SECRET);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v0/images/upload");
			then.status(200).body("{}");
		})
		.await;
	let err = client
		.upload_images(&TokenSecret::new("client-empty"), &UploadImagesRequest::default())
		.await
		.expect_err("Empty uploads should be rejected.");

	mock.assert_calls_async(0).await;

	assert!(matches!(err, Error::InvalidRequest { .. }));
}
