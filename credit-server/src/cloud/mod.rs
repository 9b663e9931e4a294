//! Platform adapters
//!
//! Implements the engine's capability traits over the `platform-client` HTTP
//! clients. Pure plumbing: every call forwards the caller token and maps
//! transport errors into [`UpstreamError`] with the remote answer preserved.

use async_trait::async_trait;
use platform_client::LicenseClient;
use shared::models::{LicenseStatus, RemoteLicense};

use crate::credit::{CallerToken, LicenseDirectory, SalesLookup, UpstreamError};

/// License directory backed by the remote License service
#[derive(Clone)]
pub struct PlatformLicenseDirectory {
    client: LicenseClient,
}

impl PlatformLicenseDirectory {
    pub fn new(client: LicenseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LicenseDirectory for PlatformLicenseDirectory {
    async fn fetch_license(
        &self,
        license_id: i64,
        token: &CallerToken,
    ) -> Result<RemoteLicense, UpstreamError> {
        self.client
            .fetch_license(license_id, token.as_str())
            .await
            .map_err(Into::into)
    }

    async fn set_status(
        &self,
        license_id: i64,
        status: LicenseStatus,
        token: &CallerToken,
    ) -> Result<(), UpstreamError> {
        match status {
            LicenseStatus::OnCredit => self
                .client
                .mark_on_credit(license_id, token.as_str())
                .await
                .map_err(Into::into),
            LicenseStatus::Available => self
                .client
                .mark_available(license_id, token.as_str())
                .await
                .map_err(Into::into),
            // The sales flow owns the sold flag; the credit engine never
            // sets it.
            LicenseStatus::Sold => Err(UpstreamError {
                code: None,
                message: "refusing to mark a license as sold from the credit flow".to_string(),
            }),
        }
    }
}

/// Sale probe backed by the remote sales ledger
#[derive(Clone)]
pub struct PlatformSalesLookup {
    client: LicenseClient,
}

impl PlatformSalesLookup {
    pub fn new(client: LicenseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SalesLookup for PlatformSalesLookup {
    async fn has_sale_for(
        &self,
        license_id: i64,
        token: &CallerToken,
    ) -> Result<bool, UpstreamError> {
        self.client
            .has_sale_for(license_id, token.as_str())
            .await
            .map_err(Into::into)
    }
}
