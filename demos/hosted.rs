//! Demonstrates the hosted flow against a mock Berbix host: create a hosted transaction, persist
//! its refresh token, and later rebuild the pair from storage to check the verification result.
//! Finishes by validating a webhook delivery the way a receiver would.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
use time::OffsetDateTime;
use url::Url;
// self
use berbix::{
	auth::{SharedTokens, Tokens},
	client::BerbixClient,
	config::ClientConfig,
	model::{CreateHostedTransactionRequest, CreateTransactionRequest, HostedOptions},
	webhook,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let create_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v0/transactions");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"access_token": "hosted-access",
				"refresh_token": "hosted-refresh",
				"transaction_id": 7,
				"expires_in": 3600,
				"hosted_url": "https://verify.berbix.com/t/demo",
			}));
		})
		.await;
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v0/tokens");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"access_token": "hosted-access-2",
				"refresh_token": "hosted-refresh",
				"transaction_id": 7,
				"expires_in": 3600,
			}));
		})
		.await;
	let fetch_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v0/transactions");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "id": 7, "action": "review" }));
		})
		.await;
	let config = ClientConfig::builder("demo-secret")
		.api_host(Url::parse(&server.base_url())?)
		.build()?;
	let client = BerbixClient::new(config)?;
	let created = client
		.create_hosted_transaction(&CreateHostedTransactionRequest {
			transaction: CreateTransactionRequest::new("customer-hosted", "tpl_hosted")
				.with_email("ada@example.com"),
			hosted_options: HostedOptions {
				completion_email: Some("ops@example.com".into()),
				redirect_url: None,
			},
		})
		.await?;

	println!("send the end user to {:?}", created.hosted_url);

	// Only the refresh token needs to be stored between sessions.
	let stored = created.tokens.refresh_token.expose().to_owned();
	let tokens = SharedTokens::new(Tokens::from_refresh_token(stored));
	let transaction = client.fetch_transaction(&tokens).await?;

	println!("transaction {:?} is at {:?}", transaction.id, transaction.action);

	let body = "{\"transaction_id\":7,\"action\":\"review\"}";
	let timestamp = OffsetDateTime::now_utc().unix_timestamp();
	let header =
		format!("v0,{timestamp},{}", webhook::compute_signature("whsec_demo", body, timestamp));

	println!("webhook verified: {}", client.validate_signature("whsec_demo", body, &header)?);

	create_mock.assert_async().await;
	refresh_mock.assert_async().await;
	fetch_mock.assert_async().await;

	Ok(())
}
