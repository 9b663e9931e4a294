//! License service API
//!
//! Typed wrapper over the License service's REST surface. The service is the
//! source of truth for license price and status; nothing here is cached.

use crate::{ClientConfig, ClientResult, HttpClient};
use shared::models::RemoteLicense;

/// Client for the remote License service
#[derive(Debug, Clone)]
pub struct LicenseClient {
    http: HttpClient,
}

impl LicenseClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        Ok(Self {
            http: HttpClient::new(config)?,
        })
    }

    /// Fetch a license's current price and status
    ///
    /// `GET /api/license/{id}`
    pub async fn fetch_license(&self, license_id: i64, token: &str) -> ClientResult<RemoteLicense> {
        self.http
            .get(&format!("api/license/{license_id}"), token)
            .await
    }

    /// Flip a license to `on_credit`
    ///
    /// `PUT /api/license/credit/{id}`. Idempotent on the remote side, so a
    /// transport-layer retry is safe if one is ever added.
    pub async fn mark_on_credit(&self, license_id: i64, token: &str) -> ClientResult<()> {
        self.http
            .put_empty(&format!("api/license/credit/{license_id}"), token)
            .await
    }

    /// Release a license back to `available`
    ///
    /// `POST /api/license/avail/{id}`
    pub async fn mark_available(&self, license_id: i64, token: &str) -> ClientResult<()> {
        self.http
            .post_empty(&format!("api/license/avail/{license_id}"), token)
            .await
    }

    /// Whether a sale record exists for this license
    ///
    /// `GET /api/license_sale/license/{id}`. A 404 from the sales ledger
    /// means "never sold", which is an answer, not an error.
    pub async fn has_sale_for(&self, license_id: i64, token: &str) -> ClientResult<bool> {
        self.http
            .exists(&format!("api/license_sale/license/{license_id}"), token)
            .await
    }
}
