//! Demonstrates an API-only verification against a mock Berbix host: create the transaction,
//! upload the document front with the client token, then let the client refresh the expired
//! access token transparently before fetching the result.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
use url::Url;
// self
use berbix::{
	auth::SharedTokens,
	client::BerbixClient,
	config::ClientConfig,
	model::{
		ApiOnlyOptions, CreateApiOnlyTransactionRequest, CreateTransactionRequest, ImageData,
		ImageFormat, ImageSubject, UploadImagesRequest,
	},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let create_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v0/transactions");
			// An already-expired access token forces a refresh on the first authenticated call.
			then.status(200).header("content-type", "application/json").json_body(json!({
				"access_token": "demo-access",
				"client_token": "demo-client",
				"refresh_token": "demo-refresh",
				"transaction_id": 4242,
				"expires_in": 0,
			}));
		})
		.await;
	let upload_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v0/images/upload").header("authorization", "Bearer demo-client");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "issues": [], "next_step": "done" }));
		})
		.await;
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v0/tokens");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"access_token": "demo-access-2",
				"client_token": "demo-client-2",
				"refresh_token": "demo-refresh",
				"transaction_id": 4242,
				"expires_in": 3600,
			}));
		})
		.await;
	let fetch_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v0/transactions").header("authorization", "Bearer demo-access-2");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "id": 4242, "action": "accept", "flags": [] }));
		})
		.await;
	let config = ClientConfig::builder("demo-secret")
		.api_host(Url::parse(&server.base_url())?)
		.build()?;
	let client = BerbixClient::new(config)?;
	let created = client
		.create_api_only_transaction(&CreateApiOnlyTransactionRequest {
			transaction: CreateTransactionRequest::new("customer-demo", "tpl_demo")
				.with_facial_recognition_consent(true),
			api_only_options: ApiOnlyOptions {
				id_country: Some("US".into()),
				id_type: Some("DL".into()),
			},
		})
		.await?;
	let client_token =
		created.client_token().cloned().ok_or_else(|| color_eyre::eyre::eyre!("no client token"))?;
	let upload = client
		.upload_images(
			&client_token,
			&UploadImagesRequest::new([ImageData::from_bytes(
				b"demo document front",
				ImageSubject::DocumentFront,
				ImageFormat::Jpeg,
			)]),
		)
		.await?;

	println!("upload finished: {}", upload.is_done());

	let tokens = SharedTokens::new(created.tokens);
	let transaction = client.fetch_transaction(&tokens).await?;

	println!("transaction {:?} resolved to {:?}", transaction.id, transaction.action);
	println!("refreshes performed: {}", client.refresh_metrics.successes());

	create_mock.assert_async().await;
	upload_mock.assert_async().await;
	refresh_mock.assert_async().await;
	fetch_mock.assert_async().await;

	Ok(())
}
