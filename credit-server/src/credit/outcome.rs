//! Tagged results and the credit error taxonomy

use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::LicenseStatus;

use crate::credit::remote::UpstreamError;
use crate::db::repository::RepoError;

/// Warning attached when the authoritative local write committed but the
/// paired remote effect did not.
///
/// Operators reconcile these out of band; the engine itself never retries.
#[derive(Debug, Clone, Serialize)]
pub struct RemoteSyncWarning {
    pub license_id: i64,
    /// Status the remote record should have been moved to
    pub intended_status: LicenseStatus,
    /// Upstream status code, when the remote answered at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_code: Option<u16>,
    pub upstream_message: String,
}

impl RemoteSyncWarning {
    pub fn new(license_id: i64, intended_status: LicenseStatus, fault: UpstreamError) -> Self {
        Self {
            license_id,
            intended_status,
            upstream_code: fault.code,
            upstream_message: fault.message,
        }
    }
}

/// Outcome of an operation with a local commit point.
///
/// `Degraded` is not an error: the ledger write is durable and the caller
/// must see it, but the remote flag is now stale and the warning says how.
#[derive(Debug, Clone)]
pub enum Outcome<T> {
    /// Local write and remote effect both succeeded
    Clean(T),
    /// Local write succeeded, the remote effect did not
    Degraded {
        value: T,
        warning: RemoteSyncWarning,
    },
}

impl<T> Outcome<T> {
    pub fn value(&self) -> &T {
        match self {
            Outcome::Clean(value) => value,
            Outcome::Degraded { value, .. } => value,
        }
    }

    pub fn into_parts(self) -> (T, Option<RemoteSyncWarning>) {
        match self {
            Outcome::Clean(value) => (value, None),
            Outcome::Degraded { value, warning } => (value, Some(warning)),
        }
    }

    pub fn is_clean(&self) -> bool {
        matches!(self, Outcome::Clean(_))
    }
}

/// Failures of the credit operations.
///
/// Everything before the local commit aborts cleanly with one of these;
/// failures after the commit degrade to [`Outcome::Degraded`] instead, since
/// the remote system offers no transaction to roll the ledger back into.
#[derive(Debug, thiserror::Error)]
pub enum CreditError {
    #[error("salesman {0} does not exist")]
    SalesmanNotFound(i64),

    #[error("credit record {0} does not exist")]
    CreditNotFound(i64),

    #[error("license {0} has already been credited")]
    AlreadyCredited(i64),

    #[error("license {license_id} is not available for crediting (status: {status})")]
    NotEligible {
        license_id: i64,
        status: LicenseStatus,
    },

    #[error("crediting would raise exposure {exposure} by {price} past the limit {credit_limit}")]
    LimitExceeded {
        credit_limit: Decimal,
        exposure: Decimal,
        price: Decimal,
    },

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("ledger failure: {0}")]
    Ledger(#[source] RepoError),
}
