//! Optional observability helpers for client operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `berbix.operation` with the `operation`,
//!   `stage` (call site) and, once known, `transaction_id` fields, plus debug events around
//!   token refreshes.
//! - Enable `metrics` to increment the `berbix_operation_total` counter for every
//!   attempt/success/failure, labeled by `operation` + `outcome`, and
//!   `berbix_refresh_coalesced_total` whenever a caller reuses a concurrent refresh.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Client operations observed by the instrumentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// Transaction creation (plain, hosted, or API-only).
	CreateTransaction,
	/// Transaction state fetch.
	FetchTransaction,
	/// Transaction update (action + note).
	UpdateTransaction,
	/// Transaction override injection.
	OverrideTransaction,
	/// Transaction deletion.
	DeleteTransaction,
	/// Refresh token exchange.
	RefreshTokens,
	/// Evidence image upload.
	UploadImages,
}
impl OperationKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::CreateTransaction => "create_transaction",
			OperationKind::FetchTransaction => "fetch_transaction",
			OperationKind::UpdateTransaction => "update_transaction",
			OperationKind::OverrideTransaction => "override_transaction",
			OperationKind::DeleteTransaction => "delete_transaction",
			OperationKind::RefreshTokens => "refresh_tokens",
			OperationKind::UploadImages => "upload_images",
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationOutcome {
	/// Entry to a client operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OperationOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationOutcome::Attempt => "attempt",
			OperationOutcome::Success => "success",
			OperationOutcome::Failure => "failure",
		}
	}
}
impl Display for OperationOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside an operation span and records attempt + outcome counters around it.
pub(crate) async fn observe<T, Fut>(
	kind: OperationKind,
	stage: &'static str,
	transaction_id: Option<u64>,
	fut: Fut,
) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = OperationSpan::new(kind, stage).with_transaction_id(transaction_id);

	record_operation_outcome(kind, OperationOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_operation_outcome(kind, OperationOutcome::Success),
		Err(_) => record_operation_outcome(kind, OperationOutcome::Failure),
	}

	result
}
