//! Cloneable handle that lets concurrent requests share one credential pair.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	auth::{TokenSecret, Tokens},
};

/// Shared, internally synchronized [`Tokens`] handle.
///
/// Clones point at the same pair. Reads and merges go through a short-lived lock, while the
/// async refresh guard keeps at most one token exchange in flight per pair. Every merge or
/// replacement bumps a generation counter, so callers that queued on the guard behind a finished
/// exchange reuse its result instead of starting another one, even when the server hands out
/// tokens that are already expired.
#[derive(Clone)]
pub struct SharedTokens(Arc<SharedTokensInner>);
impl SharedTokens {
	/// Wraps a credential pair for shared use.
	pub fn new(tokens: Tokens) -> Self {
		Self(Arc::new(SharedTokensInner {
			tokens: RwLock::new(tokens),
			refresh_guard: AsyncMutex::new(()),
			generation: AtomicU64::new(0),
		}))
	}

	/// Unwraps the pair, cloning it when other handles are still alive.
	pub fn into_tokens(self) -> Tokens {
		Arc::try_unwrap(self.0)
			.map(|inner| inner.tokens.into_inner())
			.unwrap_or_else(|shared| shared.tokens.read().clone())
	}

	/// Returns a copy of the current pair, suitable for persistence.
	pub fn snapshot(&self) -> Tokens {
		self.0.tokens.read().clone()
	}

	/// Replaces the whole pair, e.g. after an explicit refresh performed by the caller.
	pub fn replace(&self, tokens: Tokens) {
		*self.0.tokens.write() = tokens;
		self.0.generation.fetch_add(1, Ordering::AcqRel);
	}

	/// Checks staleness against the current UTC instant.
	pub fn is_stale(&self) -> bool {
		self.is_stale_at(OffsetDateTime::now_utc())
	}

	/// Checks staleness against the provided instant.
	pub fn is_stale_at(&self, now: OffsetDateTime) -> bool {
		self.0.tokens.read().is_stale_at(now)
	}

	/// Returns the current access token, if one has been issued.
	pub fn access_token(&self) -> Option<TokenSecret> {
		self.0.tokens.read().access_token.clone()
	}

	/// Returns the current client token, if one has been issued.
	pub fn client_token(&self) -> Option<TokenSecret> {
		self.0.tokens.read().client_token.clone()
	}

	/// Returns the refresh token backing this pair.
	pub fn refresh_token(&self) -> TokenSecret {
		self.0.tokens.read().refresh_token.clone()
	}

	/// Returns the transaction identifier, if known.
	pub fn transaction_id(&self) -> Option<u64> {
		self.0.tokens.read().transaction_id
	}

	/// Returns `true` when both handles share the same underlying pair.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}

	pub(crate) fn apply_refresh(&self, fresh: Tokens) {
		self.0.tokens.write().apply_refresh(fresh);
		self.0.generation.fetch_add(1, Ordering::AcqRel);
	}

	/// Number of merges and replacements applied so far.
	pub(crate) fn generation(&self) -> u64 {
		self.0.generation.load(Ordering::Acquire)
	}

	pub(crate) fn refresh_guard(&self) -> &AsyncMutex<()> {
		&self.0.refresh_guard
	}
}
impl From<Tokens> for SharedTokens {
	fn from(tokens: Tokens) -> Self {
		Self::new(tokens)
	}
}
impl Debug for SharedTokens {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("SharedTokens").field(&*self.0.tokens.read()).finish()
	}
}

struct SharedTokensInner {
	tokens: RwLock<Tokens>,
	refresh_guard: AsyncMutex<()>,
	generation: AtomicU64,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn clones_observe_merged_refresh() {
		let shared = SharedTokens::new(Tokens::from_refresh_token("r1"));
		let clone = shared.clone();
		let mut fresh = Tokens::from_refresh_token("r2");

		fresh.access_token = Some(TokenSecret::new("a1"));
		fresh.expires_at = Some(OffsetDateTime::now_utc() + Duration::minutes(10));

		assert!(clone.is_stale());

		shared.apply_refresh(fresh);

		assert!(shared.ptr_eq(&clone));
		assert!(!clone.is_stale());
		assert_eq!(clone.access_token().as_ref().map(TokenSecret::expose), Some("a1"));
		assert_eq!(clone.refresh_token().expose(), "r1");
	}

	#[test]
	fn replace_swaps_the_whole_pair() {
		let shared = SharedTokens::from(Tokens::from_refresh_token("r1"));

		shared.replace(Tokens::from_refresh_token("r2"));

		assert_eq!(shared.snapshot().refresh_token.expose(), "r2");
	}

	#[test]
	fn merges_and_replacements_bump_generation() {
		let shared = SharedTokens::new(Tokens::from_refresh_token("r1"));

		assert_eq!(shared.generation(), 0);

		shared.apply_refresh(Tokens::from_refresh_token("r2"));
		shared.clone().replace(Tokens::from_refresh_token("r3"));

		assert_eq!(shared.generation(), 2);
	}

	#[test]
	fn into_tokens_unwraps_last_handle_and_copies_otherwise() {
		let mut tokens = Tokens::from_refresh_token("r1");

		tokens.transaction_id = Some(7);

		let shared = SharedTokens::new(tokens);
		let clone = shared.clone();
		let copied = shared.into_tokens();

		assert_eq!(copied.refresh_token.expose(), "r1");
		assert_eq!(copied.transaction_id, Some(7));

		clone.replace(Tokens::from_refresh_token("r2"));

		let owned = clone.into_tokens();

		assert_eq!(owned.refresh_token.expose(), "r2");
		assert_eq!(owned.transaction_id, None);
	}
}
