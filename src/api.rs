//! Request assembly, transport-error mapping, and response interpretation for API calls.

// crates.io
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
	http::{
		Method, Request, StatusCode,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT},
	},
};
use serde::de::{DeserializeOwned, IgnoredAny};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	config::ClientConfig,
	error::{ConfigError, DecodeError, TransportError},
	http::ApiHttpClient,
	model::{Finished, Transaction, UploadImagesResponse},
	obs::OperationKind,
};

pub(crate) const TRANSACTIONS_PATH: &str = "/v0/transactions";
pub(crate) const OVERRIDE_PATH: &str = "/v0/transactions/override";
pub(crate) const TOKENS_PATH: &str = "/v0/tokens";
pub(crate) const IMAGES_UPLOAD_PATH: &str = "/v0/images/upload";

const JSON: &str = "application/json";

/// Maps HTTP transport failures into client [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a client error.
	fn map_transport_error(&self, operation: OperationKind, error: HttpClientError<E>) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		operation: OperationKind,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(operation, *inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) =>
				TransportError::network(TransportMessage { operation, message }).into(),
			_ => TransportError::network(TransportMessage {
				operation,
				message: "unrecognized transport failure".into(),
			})
			.into(),
		}
	}
}

/// Free-form transport failure reported without a typed error.
#[derive(Debug, ThisError)]
#[error("HTTP client error during {operation}: {message}")]
pub struct TransportMessage {
	/// Operation that was in flight.
	pub operation: OperationKind,
	/// Message reported by the transport.
	pub message: String,
}

/// Outbound call before it is rendered into an [`HttpRequest`].
#[derive(Clone)]
pub(crate) struct ApiRequest {
	method: Method,
	path: &'static str,
	authorization: Option<String>,
	body: Option<Vec<u8>>,
}
impl ApiRequest {
	pub(crate) fn new(method: Method, path: &'static str) -> Self {
		Self { method, path, authorization: None, body: None }
	}

	/// Authenticates with HTTP Basic using the API secret.
	pub(crate) fn basic(mut self, config: &ClientConfig) -> Self {
		self.authorization = Some(config.basic_authorization());

		self
	}

	/// Authenticates with a bearer token.
	pub(crate) fn bearer(mut self, token: &TokenSecret) -> Self {
		self.authorization = Some(format!("Bearer {}", token.expose()));

		self
	}

	/// Attaches a JSON payload; dropped for methods that carry no body.
	pub(crate) fn json<P>(mut self, payload: &P) -> Result<Self>
	where
		P: ?Sized + Serialize,
	{
		self.body = Some(serde_json::to_vec(payload).map_err(ConfigError::from)?);

		Ok(self)
	}

	pub(crate) fn into_http_request(self, config: &ClientConfig) -> Result<HttpRequest> {
		let url = config.endpoint(self.path)?;
		let body = if carries_body(&self.method) { self.body.unwrap_or_default() } else { Vec::new() };
		let mut builder = Request::builder()
			.method(self.method)
			.uri(url.as_str())
			.header(CONTENT_TYPE, JSON)
			.header(ACCEPT, JSON)
			.header(USER_AGENT, config.user_agent.as_str());

		if let Some(authorization) = self.authorization {
			builder = builder.header(AUTHORIZATION, authorization);
		}

		builder.body(body).map_err(|e| ConfigError::from(e).into())
	}
}
impl Debug for ApiRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiRequest")
			.field("method", &self.method)
			.field("path", &self.path)
			.field("authorization_set", &self.authorization.is_some())
			.field("body_len", &self.body.as_ref().map(Vec::len))
			.finish()
	}
}

/// Response types the dispatcher knows how to produce from a successful status.
pub(crate) trait ResponseShape
where
	Self: Sized,
{
	/// Value produced by `204 No Content`, when the shape has one.
	fn from_no_content() -> Option<Self> {
		None
	}

	/// Decodes a 2xx body.
	fn decode(status: u16, body: &[u8]) -> Result<Self, DecodeError>;
}
impl ResponseShape for Finished {
	fn from_no_content() -> Option<Self> {
		Some(Finished)
	}

	fn decode(status: u16, body: &[u8]) -> Result<Self, DecodeError> {
		if body.iter().all(u8::is_ascii_whitespace) {
			return Ok(Finished);
		}

		decode_json::<IgnoredAny>(status, body).map(|_| Finished)
	}
}

macro_rules! impl_json_shape {
	($($ty:ty),+ $(,)?) => {
		$(
			impl ResponseShape for $ty {
				fn decode(status: u16, body: &[u8]) -> Result<Self, DecodeError> {
					decode_json(status, body)
				}
			}
		)+
	};
}
impl_json_shape!(Transaction, UploadImagesResponse);

/// Executes `request` on a fresh transport handle, mapping transport failures.
pub(crate) async fn send<C, M>(
	http_client: &C,
	mapper: &M,
	operation: OperationKind,
	request: HttpRequest,
) -> Result<HttpResponse>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let handle = http_client.handle();

	handle.call(request).await.map_err(|err| mapper.map_transport_error(operation, err))
}

/// Turns a response into the expected shape.
///
/// Non-2xx statuses become [`Error::Api`] carrying the raw body; the body is never decoded as
/// the success shape.
pub(crate) fn interpret<T>(response: HttpResponse) -> Result<T>
where
	T: ResponseShape,
{
	let status = response.status();

	if !status.is_success() {
		return Err(Error::Api {
			status: status.as_u16(),
			body: String::from_utf8_lossy(response.body()).into_owned(),
		});
	}
	if status == StatusCode::NO_CONTENT
		&& let Some(value) = T::from_no_content()
	{
		return Ok(value);
	}

	Ok(T::decode(status.as_u16(), response.body())?)
}

pub(crate) fn decode_json<T>(status: u16, body: &[u8]) -> Result<T, DecodeError>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| DecodeError::Json { source, status })
}

fn carries_body(method: &Method) -> bool {
	matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(operation: OperationKind, err: ReqwestError) -> Error {
	// Operation is reserved for mappers that classify per call.
	let _ = operation;

	if err.is_builder() {
		return ConfigError::from(err).into();
	}

	TransportError::from(err).into()
}
