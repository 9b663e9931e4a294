//! Remote platform projections
//!
//! The License service and User directory own these records. We read the
//! handful of fields the credit flow needs and never cache them; the remote
//! service is the source of truth and has concurrent writers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle of a license as reported by the License service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseStatus {
    Available,
    OnCredit,
    Sold,
}

impl LicenseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::OnCredit => "on_credit",
            Self::Sold => "sold",
        }
    }
}

impl std::fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only projection of a license record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteLicense {
    pub id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub status: LicenseStatus,
}

/// Minimal platform user projection (existence checks during registration).
///
/// The directory returns a richer document; unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformUser {
    pub id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn license_status_wire_names() {
        let license: RemoteLicense =
            serde_json::from_str(r#"{"id": 9, "price": 250.75, "status": "on_credit"}"#).unwrap();
        assert_eq!(license.status, LicenseStatus::OnCredit);
        assert_eq!(license.price, Decimal::new(25075, 2));
    }

    #[test]
    fn unknown_user_fields_are_ignored() {
        let user: PlatformUser =
            serde_json::from_str(r#"{"id": 4, "username": "ann", "email": "a@b.c"}"#).unwrap();
        assert_eq!(user.id, 4);
    }
}
