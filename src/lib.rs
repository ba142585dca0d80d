//! Async client for the Berbix identity-verification API, with single-flight access-token
//! renewal and replay-resistant webhook signature checks.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod obs;
pub mod webhook;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		api::ReqwestTransportErrorMapper, client::BerbixClient, config::ClientConfig,
		http::ReqwestHttpClient,
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = BerbixClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

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

	/// Constructs a [`BerbixClient`] pointed at `api_host` with the insecure test transport.
	pub fn build_reqwest_test_client(api_host: &str, api_secret: &str) -> ReqwestTestClient {
		let api_host = Url::parse(api_host).expect("Mock API host should parse successfully.");
		let config = ClientConfig::builder(api_secret)
			.api_host(api_host)
			.build()
			.expect("Client configuration should build for the mock API host.");

		BerbixClient::with_http_client(
			config,
			test_reqwest_http_client(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}

	/// Renders a token endpoint response body.
	pub fn token_response_body(
		access_token: &str,
		client_token: &str,
		refresh_token: &str,
		transaction_id: u64,
		expires_in: i64,
	) -> String {
		serde_json::json!({
			"access_token": access_token,
			"client_token": client_token,
			"refresh_token": refresh_token,
			"transaction_id": transaction_id,
			"expires_in": expires_in,
			"token_type": "bearer",
		})
		.to_string()
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration as StdDuration,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
