//! Remote collaborator contracts
//!
//! The License service and the sales ledger are external systems. The engine
//! sees them only through these capability traits so the HTTP adapters can be
//! swapped for deterministic fakes in tests.

use async_trait::async_trait;
use shared::models::{LicenseStatus, RemoteLicense};

/// Opaque caller credential, forwarded verbatim on every remote call.
///
/// The engine never inspects it: it is a capability handed in by the HTTP
/// layer, not an identity.
#[derive(Debug, Clone)]
pub struct CallerToken(String);

impl CallerToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Upstream failure with the remote service's own answer preserved.
///
/// `code` is absent when the remote never answered (timeout, connect
/// failure). The message is surfaced to callers verbatim.
#[derive(Debug, Clone)]
pub struct UpstreamError {
    pub code: Option<u16>,
    pub message: String,
}

impl std::fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "upstream responded {}: {}", code, self.message),
            None => write!(f, "upstream unreachable: {}", self.message),
        }
    }
}

impl std::error::Error for UpstreamError {}

impl From<platform_client::ClientError> for UpstreamError {
    fn from(err: platform_client::ClientError) -> Self {
        match err {
            platform_client::ClientError::Status { status, message } => Self {
                code: Some(status),
                message,
            },
            other => Self {
                code: None,
                message: other.to_string(),
            },
        }
    }
}

/// Read/write handle to the remote license directory.
///
/// The directory is the source of truth for price and status; results must
/// not be cached across calls.
#[async_trait]
pub trait LicenseDirectory: Send + Sync {
    /// Current price and status of a license
    async fn fetch_license(
        &self,
        license_id: i64,
        token: &CallerToken,
    ) -> Result<RemoteLicense, UpstreamError>;

    /// Flip the remote status flag
    async fn set_status(
        &self,
        license_id: i64,
        status: LicenseStatus,
        token: &CallerToken,
    ) -> Result<(), UpstreamError>;
}

/// Probe into the sales ledger: has this license been sold?
#[async_trait]
pub trait SalesLookup: Send + Sync {
    async fn has_sale_for(
        &self,
        license_id: i64,
        token: &CallerToken,
    ) -> Result<bool, UpstreamError>;
}
