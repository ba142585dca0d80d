//! Transaction lifecycle calls: creation (secret-authenticated) and the bearer-authenticated
//! fetch, update, override, and delete calls.

// crates.io
use oauth2::http::Method;
// self
use crate::{
	_prelude::*,
	api::{ApiRequest, OVERRIDE_PATH, TRANSACTIONS_PATH, TransportErrorMapper},
	auth::SharedTokens,
	client::BerbixClient,
	http::ApiHttpClient,
	model::{
		CreateApiOnlyTransactionRequest, CreateApiOnlyTransactionResponse,
		CreateHostedTransactionRequest, CreateHostedTransactionResponse, CreateTransactionRequest,
		CreateTransactionResponse, Finished, OverrideTransactionRequest, Transaction,
		UpdateTransactionRequest,
	},
	obs::{self, OperationKind},
};

impl<C, M> BerbixClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a transaction and returns its freshly minted credential pair.
	pub async fn create_transaction(
		&self,
		request: &CreateTransactionRequest,
	) -> Result<CreateTransactionResponse> {
		const KIND: OperationKind = OperationKind::CreateTransaction;

		obs::observe(KIND, "create_transaction", None, async move {
			self.fetch_tokens(KIND, TRANSACTIONS_PATH, request)
				.await
				.map(|(tokens, _)| CreateTransactionResponse { tokens })
		})
		.await
	}

	/// Creates a transaction for the hosted flow and returns the URL to send the end user to.
	pub async fn create_hosted_transaction(
		&self,
		request: &CreateHostedTransactionRequest,
	) -> Result<CreateHostedTransactionResponse> {
		const KIND: OperationKind = OperationKind::CreateTransaction;

		obs::observe(KIND, "create_hosted_transaction", None, async move {
			self.fetch_tokens(KIND, TRANSACTIONS_PATH, request)
				.await
				.map(|(tokens, hosted_url)| CreateHostedTransactionResponse { tokens, hosted_url })
		})
		.await
	}

	/// Creates a transaction driven through API uploads; the returned client token authorizes
	/// [`BerbixClient::upload_images`].
	pub async fn create_api_only_transaction(
		&self,
		request: &CreateApiOnlyTransactionRequest,
	) -> Result<CreateApiOnlyTransactionResponse> {
		const KIND: OperationKind = OperationKind::CreateTransaction;

		obs::observe(KIND, "create_api_only_transaction", None, async move {
			self.fetch_tokens(KIND, TRANSACTIONS_PATH, request)
				.await
				.map(|(tokens, _)| CreateApiOnlyTransactionResponse { tokens })
		})
		.await
	}

	/// Fetches the current verification state of the transaction `tokens` belongs to.
	pub async fn fetch_transaction(&self, tokens: &SharedTokens) -> Result<Transaction> {
		const KIND: OperationKind = OperationKind::FetchTransaction;

		obs::observe(
			KIND,
			"fetch_transaction",
			tokens.transaction_id(),
			self.authenticated(KIND, tokens, ApiRequest::new(Method::GET, TRANSACTIONS_PATH)),
		)
		.await
	}

	/// Records a review action (and optional note) on the transaction.
	pub async fn update_transaction(
		&self,
		tokens: &SharedTokens,
		request: &UpdateTransactionRequest,
	) -> Result<Transaction> {
		const KIND: OperationKind = OperationKind::UpdateTransaction;

		obs::observe(KIND, "update_transaction", tokens.transaction_id(), async move {
			let request = ApiRequest::new(Method::PATCH, TRANSACTIONS_PATH).json(request)?;

			self.authenticated(KIND, tokens, request).await
		})
		.await
	}

	/// Forces fields, flags, or a canned result onto a test-mode transaction.
	pub async fn override_transaction(
		&self,
		tokens: &SharedTokens,
		request: &OverrideTransactionRequest,
	) -> Result<Finished> {
		const KIND: OperationKind = OperationKind::OverrideTransaction;

		obs::observe(KIND, "override_transaction", tokens.transaction_id(), async move {
			let request = ApiRequest::new(Method::PATCH, OVERRIDE_PATH).json(request)?;

			self.authenticated(KIND, tokens, request).await
		})
		.await
	}

	/// Deletes the transaction and everything the API stored for it.
	pub async fn delete_transaction(&self, tokens: &SharedTokens) -> Result<Finished> {
		const KIND: OperationKind = OperationKind::DeleteTransaction;

		obs::observe(
			KIND,
			"delete_transaction",
			tokens.transaction_id(),
			self.authenticated(KIND, tokens, ApiRequest::new(Method::DELETE, TRANSACTIONS_PATH)),
		)
		.await
	}
}
