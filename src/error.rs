//! Client-level error types shared across transports, token handling, and API calls.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout). Never retried by the client.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body could not be decoded into the expected shape.
	#[error(transparent)]
	Decode(#[from] DecodeError),

	/// API answered with a non-success status.
	#[error("Berbix API responded with HTTP {status}: {body}")]
	Api {
		/// HTTP status code returned by the API.
		status: u16,
		/// Raw response body, kept verbatim for diagnostics.
		body: String,
	},
	/// Refresh token could not be exchanged for a new credential pair.
	#[error("Token exchange failed.")]
	TokenExchange {
		/// Failure raised while talking to the token endpoint.
		#[source]
		source: Box<Error>,
	},
	/// Request was rejected locally before reaching the network.
	#[error("Request is invalid: {reason}.")]
	InvalidRequest {
		/// Human-readable validation failure.
		reason: String,
	},
}
impl Error {
	/// Wraps a refresh failure inside [`Error::TokenExchange`].
	pub fn token_exchange(source: Error) -> Self {
		Self::TokenExchange { source: Box::new(source) }
	}

	/// Returns the HTTP status attached to this error (or to the wrapped exchange failure).
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Api { status, .. } => Some(*status),
			Self::Decode(DecodeError::Json { status, .. }) => Some(*status),
			Self::TokenExchange { source } => source.status(),
			_ => None,
		}
	}
}

/// Configuration and request-construction failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Request payload could not be encoded as JSON.
	#[error("Request payload could not be encoded as JSON.")]
	PayloadEncode(#[from] serde_json::Error),

	/// API secret is empty.
	#[error("API secret must not be empty.")]
	MissingApiSecret,
	/// API host cannot be combined with endpoint paths.
	#[error("API host `{url}` is not a valid base URL.")]
	InvalidApiHost {
		/// Host that failed validation.
		url: String,
	},
	/// API host must use HTTPS outside loopback development hosts.
	#[error("API host must use HTTPS: {url}.")]
	InsecureApiHost {
		/// Host that failed validation.
		url: String,
	},
	/// Endpoint URL assembled from the host and path does not parse.
	#[error("Endpoint `{path}` does not form a valid URL.")]
	InvalidEndpoint {
		/// API path that was being joined.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures raised while turning a successful response into a typed value.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Body is not valid JSON or does not match the expected shape.
	#[error("Response body does not match the expected shape.")]
	Json {
		/// Structured parsing failure, including the offending JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the decoded response.
		status: u16,
	},
	/// Token endpoint returned an `expires_in` that cannot be represented as an instant.
	#[error("The expires_in value {expires_in} exceeds the supported range.")]
	ExpiresInOutOfRange {
		/// Raw value returned by the token endpoint.
		expires_in: i64,
	},
}

/// Transport-level failures (network, timeout, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the Berbix API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request exceeded the configured timeout.
	#[error("Request to the Berbix API timed out.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the Berbix API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::network(e) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn status_reaches_through_token_exchange() {
		let err = Error::token_exchange(Error::Api { status: 401, body: "denied".into() });

		assert_eq!(err.status(), Some(401));
		assert_eq!(err.to_string(), "Token exchange failed.");

		let source = StdError::source(&err).expect("Token exchange errors should carry a source.");

		assert_eq!(source.to_string(), "Berbix API responded with HTTP 401: denied");
	}

	#[test]
	fn transport_errors_have_no_status() {
		let err = Error::from(TransportError::Io(std::io::Error::other("reset")));

		assert_eq!(err.status(), None);
	}
}
