// self
use crate::obs::{OperationKind, OperationOutcome};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_operation_outcome(kind: OperationKind, outcome: OperationOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"berbix_operation_total",
			"operation" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Counts callers that reused a refresh another caller performed for the same pair.
pub fn record_refresh_coalesced(kind: OperationKind) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("berbix_refresh_coalesced_total", "operation" => kind.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = kind;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_operation_outcome_noop_without_metrics() {
		record_operation_outcome(OperationKind::DeleteTransaction, OperationOutcome::Failure);
		record_refresh_coalesced(OperationKind::RefreshTokens);
	}
}
