//! Berbix API client that owns the transport, configuration, and refresh bookkeeping.

pub mod refresh;

mod dispatch;
mod images;
mod transactions;

pub use refresh::*;

// crates.io
use oauth2::http::Method;
// self
use crate::{
	_prelude::*,
	api::{self, ApiRequest, ResponseShape, TransportErrorMapper},
	auth::{Tokens, tokens::TokenResponse},
	config::ClientConfig,
	error::DecodeError,
	http::ApiHttpClient,
	obs::OperationKind,
	webhook::{SignatureError, SignatureVerifier},
};
#[cfg(feature = "reqwest")]
use crate::{api::ReqwestTransportErrorMapper, http::ReqwestHttpClient};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport stack.
pub type ReqwestBerbixClient = BerbixClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Issues Berbix API calls over a pluggable transport.
///
/// The client is immutable once built and cheap to clone; the only state it mutates lives in
/// the [`SharedTokens`](crate::auth::SharedTokens) handles callers pass in, which is where
/// single-flight refreshes are coordinated.
pub struct BerbixClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Validated client configuration.
	pub config: ClientConfig,
	/// Shared counters for token refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	/// Verifier used by [`BerbixClient::validate_signature`].
	pub signature_verifier: SignatureVerifier,
}
impl<C, M> BerbixClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client that reuses the caller-provided transport + mapper pair.
	///
	/// The transport owns its timeout policy: [`ClientConfig::request_timeout`] is only applied
	/// by the reqwest constructors ([`BerbixClient::new`] and
	/// [`BerbixClient::with_reqwest_client`]).
	pub fn with_http_client(
		config: ClientConfig,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			config,
			refresh_metrics: Default::default(),
			signature_verifier: SignatureVerifier::default(),
		}
	}

	/// Overrides the webhook signature verifier (e.g. to change the clock drift tolerance).
	pub fn with_signature_verifier(mut self, verifier: SignatureVerifier) -> Self {
		self.signature_verifier = verifier;

		self
	}

	/// Checks a webhook delivery against `secret` using the configured verifier.
	pub fn validate_signature(
		&self,
		secret: &str,
		body: impl AsRef<[u8]>,
		header: &str,
	) -> Result<bool, SignatureError> {
		self.signature_verifier.verify(secret, body, header)
	}

	/// Mints a credential pair from a secret-authenticated endpoint.
	///
	/// Returns the pair along with the hosted flow URL when the endpoint issued one.
	pub(crate) async fn fetch_tokens<P>(
		&self,
		operation: OperationKind,
		path: &'static str,
		payload: &P,
	) -> Result<(Tokens, Option<String>)>
	where
		P: ?Sized + Serialize,
	{
		let fetched_at = OffsetDateTime::now_utc();
		let request = ApiRequest::new(Method::POST, path)
			.basic(&self.config)
			.json(payload)?
			.into_http_request(&self.config)?;
		let response =
			api::send(self.http_client.as_ref(), self.transport_mapper.as_ref(), operation, request)
				.await?;
		let MintedTokens { response, raw } = api::interpret(response)?;
		let hosted_url = response.hosted_url.clone();
		let tokens = Tokens::from_response(response, raw, fetched_at)?;

		Ok((tokens, hosted_url))
	}
}
#[cfg(feature = "reqwest")]
impl BerbixClient<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Builds a client backed by a dedicated reqwest transport honoring the configured timeout.
	pub fn new(config: ClientConfig) -> Result<Self> {
		let http_client = ReqwestHttpClient::build(config.request_timeout)?;

		Ok(Self::with_http_client(config, http_client, ReqwestTransportErrorMapper))
	}

	/// Wraps a caller-configured reqwest client (proxies, custom roots), stamping the configured
	/// request timeout onto every call.
	pub fn with_reqwest_client(config: ClientConfig, client: ReqwestClient) -> Self {
		let http_client = ReqwestHttpClient::with_client(client).with_timeout(config.request_timeout);

		Self::with_http_client(config, http_client, ReqwestTransportErrorMapper)
	}
}
impl<C, M> Clone for BerbixClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			http_client: Arc::clone(&self.http_client),
			transport_mapper: Arc::clone(&self.transport_mapper),
			config: self.config.clone(),
			refresh_metrics: Arc::clone(&self.refresh_metrics),
			signature_verifier: self.signature_verifier,
		}
	}
}
impl<C, M> Debug for BerbixClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BerbixClient")
			.field("config", &self.config)
			.field("refresh_metrics", &self.refresh_metrics)
			.field("signature_verifier", &self.signature_verifier)
			.finish_non_exhaustive()
	}
}

/// Token endpoint payload paired with the raw body it was decoded from.
struct MintedTokens {
	response: TokenResponse,
	raw: String,
}
impl ResponseShape for MintedTokens {
	fn decode(status: u16, body: &[u8]) -> Result<Self, DecodeError> {
		let response = api::decode_json(status, body)?;

		Ok(Self { response, raw: String::from_utf8_lossy(body).into_owned() })
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;
	use crate::webhook;

	#[test]
	fn new_builds_with_configured_timeout() {
		let config = ClientConfig::builder("secret")
			.request_timeout(StdDuration::from_secs(7))
			.build()
			.expect("Config should build.");
		let client = BerbixClient::new(config).expect("Client should build.");

		assert_eq!(client.http_client.timeout(), StdDuration::from_secs(7));
		assert_eq!(client.refresh_metrics.attempts(), 0);
	}

	#[test]
	fn caller_supplied_reqwest_client_honors_configured_timeout() {
		let config = ClientConfig::builder("secret")
			.request_timeout(StdDuration::from_secs(3))
			.build()
			.expect("Config should build.");
		let client = BerbixClient::with_reqwest_client(config, ReqwestClient::new());

		assert_eq!(client.http_client.timeout(), StdDuration::from_secs(3));
		assert_eq!(client.config.request_timeout, StdDuration::from_secs(3));
	}

	#[test]
	fn validate_signature_uses_configured_verifier() {
		let config = ClientConfig::builder("secret").build().expect("Config should build.");
		let client = BerbixClient::new(config)
			.expect("Client should build.")
			.with_signature_verifier(SignatureVerifier::default().with_clock_drift(Duration::ZERO));
		let timestamp = OffsetDateTime::now_utc().unix_timestamp() - 5;
		let signature = webhook::compute_signature("hook-secret", "{}", timestamp);
		let header = format!("v0,{timestamp},{signature}");

		assert!(
			!client
				.validate_signature("hook-secret", "{}", &header)
				.expect("Well-formed headers should not error.")
		);

		let client = client.with_signature_verifier(SignatureVerifier::default());

		assert!(
			client
				.validate_signature("hook-secret", "{}", &header)
				.expect("Well-formed headers should not error.")
		);
	}
}
