//! Evidence uploads authorized by a transaction's client token.

// crates.io
use oauth2::http::Method;
// self
use crate::{
	_prelude::*,
	api::{self, ApiRequest, IMAGES_UPLOAD_PATH, TransportErrorMapper},
	auth::{SharedTokens, TokenSecret},
	client::BerbixClient,
	http::ApiHttpClient,
	model::{UploadImagesRequest, UploadImagesResponse},
	obs::{self, OperationKind},
};

impl<C, M> BerbixClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Uploads evidence images using `client_token` as the bearer credential.
	///
	/// The client token is used as given; it is never refreshed here. Empty batches are rejected
	/// before any request is sent.
	pub async fn upload_images(
		&self,
		client_token: &TokenSecret,
		request: &UploadImagesRequest,
	) -> Result<UploadImagesResponse> {
		const KIND: OperationKind = OperationKind::UploadImages;

		obs::observe(KIND, "upload_images", None, self.send_upload(client_token, request)).await
	}

	/// Uploads evidence images with the client token held by `tokens`, refreshing the pair first
	/// when its access token is stale.
	pub async fn upload_images_with(
		&self,
		tokens: &SharedTokens,
		request: &UploadImagesRequest,
	) -> Result<UploadImagesResponse> {
		const KIND: OperationKind = OperationKind::UploadImages;

		obs::observe(KIND, "upload_images_with", tokens.transaction_id(), async move {
			self.ensure_fresh(tokens).await?;

			let client_token = tokens.client_token().ok_or_else(|| Error::InvalidRequest {
				reason: "credential pair carries no client token".into(),
			})?;

			self.send_upload(&client_token, request).await
		})
		.await
	}

	async fn send_upload(
		&self,
		client_token: &TokenSecret,
		request: &UploadImagesRequest,
	) -> Result<UploadImagesResponse> {
		if request.images.is_empty() {
			return Err(Error::InvalidRequest { reason: "upload requires at least one image".into() });
		}

		let request = ApiRequest::new(Method::POST, IMAGES_UPLOAD_PATH)
			.bearer(client_token)
			.json(request)?
			.into_http_request(&self.config)?;
		let response = api::send(
			self.http_client.as_ref(),
			self.transport_mapper.as_ref(),
			OperationKind::UploadImages,
			request,
		)
		.await?;

		api::interpret(response)
	}
}
