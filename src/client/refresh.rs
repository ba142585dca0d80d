//! Access-token renewal with a single-flight guard per credential pair.
//!
//! [`BerbixClient::refresh_tokens`] is the explicit, side-effect-free exchange: it returns a new
//! pair and leaves the caller's state alone. Transaction calls go through
//! [`BerbixClient::ensure_fresh`] instead, which merges the exchanged pair into a
//! [`SharedTokens`] handle so concurrent callers that observed the same stale token trigger one
//! exchange between them.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	api::{TOKENS_PATH, TransportErrorMapper},
	auth::{SharedTokens, TokenSecret, Tokens},
	client::BerbixClient,
	http::ApiHttpClient,
	obs::{self, OperationKind},
};

impl<C, M> BerbixClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges the pair's refresh token for a freshly minted pair.
	///
	/// The input is not modified. Any failure is wrapped in [`Error::TokenExchange`].
	pub async fn refresh_tokens(&self, tokens: &Tokens) -> Result<Tokens> {
		obs::observe(
			OperationKind::RefreshTokens,
			"refresh_tokens",
			tokens.transaction_id,
			self.exchange_refresh_token(&tokens.refresh_token),
		)
		.await
	}

	/// Makes sure `tokens` holds a usable access token, refreshing at most once per generation no
	/// matter how many callers race here.
	pub(crate) async fn ensure_fresh(&self, tokens: &SharedTokens) -> Result<()> {
		let observed = tokens.generation();

		if !tokens.is_stale() {
			return Ok(());
		}

		let _singleflight = tokens.refresh_guard().lock().await;

		// Another caller merged a pair while this one queued on the guard. Its result is reused
		// even if the server issued it already expired.
		if tokens.generation() != observed {
			self.refresh_metrics.record_coalesced();
			obs::record_refresh_coalesced(OperationKind::RefreshTokens);

			#[cfg(feature = "tracing")]
			tracing::debug!(
				transaction_id = tokens.transaction_id(),
				"reusing access token refreshed by a concurrent call"
			);

			return Ok(());
		}

		#[cfg(feature = "tracing")]
		tracing::debug!(transaction_id = tokens.transaction_id(), "access token is stale; refreshing");

		let refresh_token = tokens.refresh_token();
		let fresh = obs::observe(
			OperationKind::RefreshTokens,
			"ensure_fresh",
			tokens.transaction_id(),
			self.exchange_refresh_token(&refresh_token),
		)
		.await?;

		tokens.apply_refresh(fresh);

		Ok(())
	}

	async fn exchange_refresh_token(&self, refresh_token: &TokenSecret) -> Result<Tokens> {
		let payload =
			RefreshTokenRequest { refresh_token: refresh_token.expose(), grant_type: "refresh_token" };

		self.refresh_metrics.record_attempt();

		match self.fetch_tokens(OperationKind::RefreshTokens, TOKENS_PATH, &payload).await {
			Ok((fresh, _)) => {
				self.refresh_metrics.record_success();

				Ok(fresh)
			},
			Err(err) => {
				self.refresh_metrics.record_failure();

				Err(Error::token_exchange(err))
			},
		}
	}
}

#[derive(Serialize)]
struct RefreshTokenRequest<'a> {
	refresh_token: &'a str,
	grant_type: &'static str,
}
