//! Webhook signature verification.
//!
//! Berbix signs each webhook delivery with a header of the form
//! `<version>,<unix-timestamp>,<hex-hmac>`, where the HMAC-SHA256 is keyed by the webhook secret
//! and computed over `"<timestamp>,<secret>,<body>"`. The version field is accepted without being
//! checked so newer schemes do not break existing receivers.

// std
use std::num::ParseIntError;
// crates.io
use hmac::{Hmac, Mac};
use sha2::Sha256;
// self
use crate::_prelude::*;

type HmacSha256 = Hmac<Sha256>;

/// Default tolerance for delivery timestamps, in seconds.
pub const DEFAULT_CLOCK_DRIFT: Duration = Duration::seconds(300);

/// Failures that are reported instead of folding into a `false` verdict.
#[derive(Debug, ThisError)]
pub enum SignatureError {
	/// Timestamp field of the header is not an integer.
	#[error("Webhook signature timestamp `{timestamp}` is not an integer.")]
	InvalidTimestamp {
		/// Raw timestamp field.
		timestamp: String,
		/// Underlying parsing failure.
		#[source]
		source: ParseIntError,
	},
}

/// Replay-resistant webhook signature check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignatureVerifier {
	clock_drift: Duration,
}
impl SignatureVerifier {
	/// Overrides how old a delivery timestamp may be before it is rejected.
	pub fn with_clock_drift(mut self, clock_drift: Duration) -> Self {
		self.clock_drift = clock_drift;

		self
	}

	/// Returns the configured timestamp tolerance.
	pub fn clock_drift(&self) -> Duration {
		self.clock_drift
	}

	/// Verifies `header` for the raw delivery `body` against the current UTC instant.
	pub fn verify(
		&self,
		secret: &str,
		body: impl AsRef<[u8]>,
		header: &str,
	) -> Result<bool, SignatureError> {
		self.verify_at(secret, body, header, OffsetDateTime::now_utc())
	}

	/// Verifies `header` for the raw delivery `body` as of `now`.
	///
	/// The body is hashed byte for byte, so pass it exactly as received rather than a re-encoded
	/// copy.
	///
	/// Returns `Ok(false)` for every verification failure (wrong part count, stale timestamp,
	/// mismatched or non-hex signature). Only a non-integer timestamp is reported as an error.
	/// Timestamps ahead of `now` are accepted.
	pub fn verify_at(
		&self,
		secret: &str,
		body: impl AsRef<[u8]>,
		header: &str,
		now: OffsetDateTime,
	) -> Result<bool, SignatureError> {
		let mut parts = header.split(',');
		let (Some(_version), Some(timestamp), Some(signature), None) =
			(parts.next(), parts.next(), parts.next(), parts.next())
		else {
			return Ok(false);
		};
		let issued_at = timestamp.parse::<i64>().map_err(|source| {
			SignatureError::InvalidTimestamp { timestamp: timestamp.to_owned(), source }
		})?;

		if issued_at < now.unix_timestamp().saturating_sub(self.clock_drift.whole_seconds()) {
			return Ok(false);
		}

		let Some(mac) = keyed_mac(secret, timestamp, body.as_ref()) else {
			return Ok(false);
		};
		let Ok(expected) = hex::decode(signature) else {
			return Ok(false);
		};

		Ok(mac.verify_slice(&expected).is_ok())
	}
}
impl Default for SignatureVerifier {
	fn default() -> Self {
		Self { clock_drift: DEFAULT_CLOCK_DRIFT }
	}
}

/// Verifies a webhook delivery with the default clock drift tolerance.
pub fn verify_signature(
	secret: &str,
	body: impl AsRef<[u8]>,
	header: &str,
) -> Result<bool, SignatureError> {
	SignatureVerifier::default().verify(secret, body, header)
}

/// Computes the lowercase hex signature Berbix sends for `body` at `timestamp`.
///
/// Useful for signing fixtures and for local webhook relays.
pub fn compute_signature(secret: &str, body: impl AsRef<[u8]>, timestamp: i64) -> String {
	keyed_mac(secret, &timestamp.to_string(), body.as_ref())
		.map(|mac| hex::encode(mac.finalize().into_bytes()))
		.unwrap_or_default()
}

fn keyed_mac(secret: &str, timestamp: &str, body: &[u8]) -> Option<HmacSha256> {
	let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;

	mac.update(timestamp.as_bytes());
	mac.update(b",");
	mac.update(secret.as_bytes());
	mac.update(b",");
	mac.update(body);

	Some(mac)
}
