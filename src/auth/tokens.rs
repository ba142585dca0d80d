//! Per-transaction credential pair and the token endpoint payload it is minted from.

// self
use crate::{_prelude::*, auth::TokenSecret, error::DecodeError};

/// Credentials authorizing API calls for a single transaction.
///
/// The pair is minted when a transaction is created and renewed in place whenever the access
/// token goes stale. Callers own persistence: the struct serializes with `serde`, and
/// [`Tokens::from_refresh_token`] rebuilds a usable pair from a stored refresh token alone.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokens {
	/// Short-lived bearer credential for transaction calls.
	#[serde(default)]
	pub access_token: Option<TokenSecret>,
	/// Credential for image uploads; scoped separately from the access token.
	#[serde(default)]
	pub client_token: Option<TokenSecret>,
	/// Long-lived credential exchanged for new access tokens. Never rotated by the client.
	pub refresh_token: TokenSecret,
	/// Transaction identifier reported by the token endpoint.
	#[serde(default)]
	pub transaction_id: Option<u64>,
	/// Instant the access token stops being accepted.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub expires_at: Option<OffsetDateTime>,
	/// Raw body of the token response this pair was minted from.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub response_json: Option<String>,
}
impl Tokens {
	/// Rebuilds a pair from a persisted refresh token; the first use triggers a refresh.
	pub fn from_refresh_token(refresh_token: impl Into<TokenSecret>) -> Self {
		Self {
			access_token: None,
			client_token: None,
			refresh_token: refresh_token.into(),
			transaction_id: None,
			expires_at: None,
			response_json: None,
		}
	}

	/// Returns `true` when the access token is missing an expiry or expires at/before `now`.
	pub fn is_stale_at(&self, now: OffsetDateTime) -> bool {
		self.expires_at.is_none_or(|expires_at| expires_at <= now)
	}

	/// Checks staleness against the current UTC instant.
	pub fn is_stale(&self) -> bool {
		self.is_stale_at(OffsetDateTime::now_utc())
	}

	/// Merges a freshly exchanged pair into `self`.
	///
	/// Access token, client token, transaction id, and expiry are replaced. The refresh token
	/// and the raw response snapshot are kept as they were.
	pub fn apply_refresh(&mut self, fresh: Tokens) {
		self.access_token = fresh.access_token;
		self.client_token = fresh.client_token;
		self.transaction_id = fresh.transaction_id;
		self.expires_at = fresh.expires_at;
	}

	pub(crate) fn from_response(
		response: TokenResponse,
		raw: String,
		fetched_at: OffsetDateTime,
	) -> Result<Self, DecodeError> {
		let expires_at = fetched_at
			.checked_add(Duration::seconds(response.expires_in))
			.ok_or(DecodeError::ExpiresInOutOfRange { expires_in: response.expires_in })?;

		Ok(Self {
			access_token: Some(response.access_token),
			client_token: response.client_token,
			refresh_token: response.refresh_token,
			transaction_id: response.transaction_id,
			expires_at: Some(expires_at),
			response_json: Some(raw),
		})
	}
}
impl Debug for Tokens {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Tokens")
			.field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
			.field("client_token", &self.client_token.as_ref().map(|_| "<redacted>"))
			.field("refresh_token", &"<redacted>")
			.field("transaction_id", &self.transaction_id)
			.field("expires_at", &self.expires_at)
			.field("response_json", &self.response_json.as_ref().map(|raw| raw.len()))
			.finish()
	}
}

/// Body returned by the token-minting endpoints (transaction creation and refresh).
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct TokenResponse {
	pub(crate) access_token: TokenSecret,
	#[serde(default)]
	pub(crate) client_token: Option<TokenSecret>,
	pub(crate) refresh_token: TokenSecret,
	#[serde(default)]
	pub(crate) transaction_id: Option<u64>,
	pub(crate) expires_in: i64,
	#[serde(default)]
	pub(crate) hosted_url: Option<String>,
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	fn minted(access: &str, refresh: &str, expires_at: OffsetDateTime) -> Tokens {
		Tokens {
			access_token: Some(TokenSecret::new(access)),
			client_token: Some(TokenSecret::new(format!("client-{access}"))),
			refresh_token: TokenSecret::new(refresh),
			transaction_id: Some(42),
			expires_at: Some(expires_at),
			response_json: Some(format!("{{\"access_token\":\"{access}\"}}")),
		}
	}

	#[test]
	fn staleness_requires_strictly_future_expiry() {
		let now = datetime!(2026-03-01 12:00 UTC);
		let mut tokens = Tokens::from_refresh_token("refresh");

		assert!(tokens.is_stale_at(now));

		tokens.expires_at = Some(now - Duration::seconds(1));

		assert!(tokens.is_stale_at(now));

		tokens.expires_at = Some(now);

		assert!(tokens.is_stale_at(now));

		tokens.expires_at = Some(now + Duration::seconds(1));

		assert!(!tokens.is_stale_at(now));
	}

	#[test]
	fn apply_refresh_keeps_refresh_token_and_snapshot() {
		let now = datetime!(2026-03-01 12:00 UTC);
		let mut current = minted("a1", "r1", now - Duration::minutes(1));
		let original_snapshot = current.response_json.clone();
		let mut fresh = minted("a2", "r2", now + Duration::minutes(15));

		fresh.transaction_id = Some(43);
		current.apply_refresh(fresh);

		assert_eq!(current.refresh_token.expose(), "r1");
		assert_eq!(current.response_json, original_snapshot);
		assert_eq!(current.access_token.as_ref().map(TokenSecret::expose), Some("a2"));
		assert_eq!(current.client_token.as_ref().map(TokenSecret::expose), Some("client-a2"));
		assert_eq!(current.transaction_id, Some(43));
		assert_eq!(current.expires_at, Some(now + Duration::minutes(15)));
		assert!(!current.is_stale_at(now));
	}

	#[test]
	fn apply_refresh_fills_previously_unset_fields() {
		let now = datetime!(2026-03-01 12:00 UTC);
		let mut current = Tokens::from_refresh_token("r1");

		current.apply_refresh(minted("a1", "ignored", now + Duration::hours(1)));

		assert_eq!(current.refresh_token.expose(), "r1");
		assert_eq!(current.access_token.as_ref().map(TokenSecret::expose), Some("a1"));
		assert_eq!(current.response_json, None);
		assert!(!current.is_stale_at(now));
	}

	#[test]
	fn from_response_adds_expires_in_to_fetch_time() {
		let fetched_at = datetime!(2026-03-01 12:00 UTC);
		let raw = "{\"access_token\":\"a\",\"refresh_token\":\"r\",\"expires_in\":900}";
		let response: TokenResponse =
			serde_json::from_str(raw).expect("Token response fixture should deserialize.");
		let tokens = Tokens::from_response(response, raw.into(), fetched_at)
			.expect("Token response should convert into a credential pair.");

		assert_eq!(tokens.expires_at, Some(datetime!(2026-03-01 12:15 UTC)));
		assert_eq!(tokens.client_token, None);
		assert_eq!(tokens.response_json.as_deref(), Some(raw));
	}

	#[test]
	fn from_response_rejects_unrepresentable_expiry() {
		let response: TokenResponse = serde_json::from_str(&format!(
			"{{\"access_token\":\"a\",\"refresh_token\":\"r\",\"expires_in\":{}}}",
			i64::MAX
		))
		.expect("Token response fixture should deserialize.");
		let err = Tokens::from_response(response, String::new(), OffsetDateTime::now_utc())
			.expect_err("Overflowing expiries should be rejected.");

		assert!(matches!(err, DecodeError::ExpiresInOutOfRange { expires_in: i64::MAX }));
	}

	#[test]
	fn persisted_pair_restores_expiry() {
		let tokens = minted("a1", "r1", datetime!(2026-03-01 12:30 UTC));
		let json = serde_json::to_string(&tokens).expect("Tokens should serialize.");
		let restored: Tokens = serde_json::from_str(&json).expect("Tokens should deserialize.");

		assert_eq!(restored, tokens);

		let bare: Tokens = serde_json::from_str("{\"refresh_token\":\"r9\"}")
			.expect("A bare refresh token should deserialize.");

		assert_eq!(bare, Tokens::from_refresh_token("r9"));
	}

	#[test]
	fn debug_redacts_secrets_and_raw_body() {
		let rendered = format!("{:?}", minted("a1", "r1", datetime!(2026-03-01 12:30 UTC)));

		assert!(!rendered.contains("a1"));
		assert!(!rendered.contains("r1"));
		assert!(rendered.contains("<redacted>"));
	}
}
