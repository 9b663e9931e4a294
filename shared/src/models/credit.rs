//! Credit Model

use serde::{Deserialize, Serialize};

/// Credit entity — one ledger row per credited license.
///
/// `license_id` is unique across all credit rows: a license can be on credit
/// to at most one salesman at any time. The row is created only by a
/// successful issue operation and removed only by a revoke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Credit {
    pub id: i64,
    pub salesman_id: i64,
    pub license_id: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Issue credit payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditCreate {
    pub salesman_id: i64,
    pub license_id: i64,
}
