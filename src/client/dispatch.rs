//! Bearer-authenticated request path shared by every transaction call.

// self
use crate::{
	_prelude::*,
	api::{self, ApiRequest, ResponseShape, TransportErrorMapper},
	auth::SharedTokens,
	client::BerbixClient,
	http::ApiHttpClient,
	obs::OperationKind,
};

impl<C, M> BerbixClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Refreshes `tokens` when stale, then issues `request` with the access token as bearer.
	pub(crate) async fn authenticated<T>(
		&self,
		operation: OperationKind,
		tokens: &SharedTokens,
		request: ApiRequest,
	) -> Result<T>
	where
		T: ResponseShape,
	{
		self.ensure_fresh(tokens).await?;

		let access_token = tokens.access_token().ok_or_else(|| Error::InvalidRequest {
			reason: "refreshed credential pair carries no access token".into(),
		})?;
		let request = request.bearer(&access_token).into_http_request(&self.config)?;
		let response =
			api::send(self.http_client.as_ref(), self.transport_mapper.as_ref(), operation, request)
				.await?;

		api::interpret(response)
	}
}
