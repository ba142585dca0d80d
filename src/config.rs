//! Client configuration and its validating builder.

// std
use std::net::IpAddr;
// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
use url::Host;
// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// Production API host.
pub const DEFAULT_API_HOST: &str = "https://api.berbix.com";
/// Version reported in the `User-Agent` header.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");
/// Timeout applied to every outbound request.
pub const DEFAULT_REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// Validated settings shared by every call a client makes.
#[derive(Clone, Debug)]
pub struct ClientConfig {
	/// API secret used for HTTP Basic authentication on token-minting endpoints.
	pub api_secret: TokenSecret,
	/// Base host every endpoint path is appended to.
	pub api_host: Url,
	/// Value sent in the `User-Agent` header.
	pub user_agent: String,
	/// Per-request timeout applied by the reqwest transports; custom transports passed to
	/// [`BerbixClient::with_http_client`](crate::client::BerbixClient::with_http_client) enforce
	/// their own.
	pub request_timeout: StdDuration,
}
impl ClientConfig {
	/// Creates a builder seeded with the API secret.
	pub fn builder(api_secret: impl Into<String>) -> ClientConfigBuilder {
		ClientConfigBuilder::new(api_secret)
	}

	/// Appends an API path (e.g. `/v0/transactions`) to the configured host.
	pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		let host = self.api_host.as_str().trim_end_matches('/');

		Url::parse(&format!("{host}{path}"))
			.map_err(|source| ConfigError::InvalidEndpoint { path: path.to_owned(), source })
	}

	/// Renders the `Authorization` value for secret-authenticated endpoints.
	pub fn basic_authorization(&self) -> String {
		format!("Basic {}", STANDARD.encode(format!("{}:", self.api_secret.expose())))
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	api_secret: TokenSecret,
	api_host: Option<Url>,
	user_agent: Option<String>,
	request_timeout: StdDuration,
}
impl ClientConfigBuilder {
	fn new(api_secret: impl Into<String>) -> Self {
		Self {
			api_secret: TokenSecret::new(api_secret),
			api_host: None,
			user_agent: None,
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
		}
	}

	/// Overrides the API host (defaults to [`DEFAULT_API_HOST`]).
	pub fn api_host(mut self, url: Url) -> Self {
		self.api_host = Some(url);

		self
	}

	/// Overrides the `User-Agent` header (defaults to `BerbixRust/<version>`).
	pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = Some(user_agent.into());

		self
	}

	/// Overrides the per-request timeout (defaults to 30 seconds).
	pub fn request_timeout(mut self, timeout: StdDuration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		if self.api_secret.expose().trim().is_empty() {
			return Err(ConfigError::MissingApiSecret);
		}

		let api_host = match self.api_host {
			Some(url) => url,
			None => Url::parse(DEFAULT_API_HOST)
				.map_err(|_| ConfigError::InvalidApiHost { url: DEFAULT_API_HOST.into() })?,
		};

		validate_api_host(&api_host)?;

		Ok(ClientConfig {
			api_secret: self.api_secret,
			api_host,
			user_agent: self.user_agent.unwrap_or_else(|| format!("BerbixRust/{SDK_VERSION}")),
			request_timeout: self.request_timeout,
		})
	}
}

fn validate_api_host(url: &Url) -> Result<(), ConfigError> {
	if url.cannot_be_a_base() || url.host().is_none() {
		return Err(ConfigError::InvalidApiHost { url: url.to_string() });
	}

	match url.scheme() {
		"https" => Ok(()),
		"http" if is_loopback(url) => Ok(()),
		_ => Err(ConfigError::InsecureApiHost { url: url.to_string() }),
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(Host::Ipv4(ip)) => IpAddr::V4(ip).is_loopback(),
		Some(Host::Ipv6(ip)) => IpAddr::V6(ip).is_loopback(),
		None => false,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse test URL.")
	}

	#[test]
	fn defaults_target_production_host() {
		let config = ClientConfig::builder("secret").build().expect("Default config should build.");

		assert_eq!(config.api_host.as_str(), "https://api.berbix.com/");
		assert_eq!(config.user_agent, format!("BerbixRust/{SDK_VERSION}"));
		assert_eq!(config.request_timeout, StdDuration::from_secs(30));
		assert_eq!(
			config.endpoint("/v0/transactions").expect("Endpoint should join.").as_str(),
			"https://api.berbix.com/v0/transactions"
		);
	}

	#[test]
	fn endpoint_keeps_host_path_prefix() {
		let config = ClientConfig::builder("secret")
			.api_host(url("https://gateway.example.com/berbix/"))
			.build()
			.expect("Prefixed host should build.");

		assert_eq!(
			config.endpoint("/v0/tokens").expect("Endpoint should join.").as_str(),
			"https://gateway.example.com/berbix/v0/tokens"
		);
	}

	#[test]
	fn basic_authorization_encodes_secret_with_empty_password() {
		let config = ClientConfig::builder("secret").build().expect("Default config should build.");

		// base64("secret:")
		assert_eq!(config.basic_authorization(), "Basic c2VjcmV0Og==");
	}

	#[test]
	fn rejects_empty_secret_and_insecure_hosts() {
		let err = ClientConfig::builder("  ").build().expect_err("Blank secrets should fail.");

		assert!(matches!(err, ConfigError::MissingApiSecret));

		let err = ClientConfig::builder("secret")
			.api_host(url("http://api.example.com"))
			.build()
			.expect_err("Plain HTTP hosts should fail.");

		assert!(matches!(err, ConfigError::InsecureApiHost { .. }));

		let err = ClientConfig::builder("secret")
			.api_host(url("mailto:ops@example.com"))
			.build()
			.expect_err("Non-base URLs should fail.");

		assert!(matches!(err, ConfigError::InvalidApiHost { .. }));
	}

	#[test]
	fn allows_plain_http_on_loopback() {
		for host in ["http://127.0.0.1:8080", "http://localhost:3000", "http://[::1]:9000"] {
			ClientConfig::builder("secret")
				.api_host(url(host))
				.build()
				.expect("Loopback hosts should accept plain HTTP.");
		}
	}
}
