//! Ledger contract and its SQLite implementation

use async_trait::async_trait;
use shared::models::{Credit, CreditCreate, Salesman};
use sqlx::SqlitePool;

use crate::db::repository::{RepoError, credit as credit_repo, salesman as salesman_repo};

/// Persistence contract the engine reads and writes through.
///
/// The backing store must provide at least read-committed isolation and a
/// unique index on `license_id`: that index, not the engine's pre-check, is
/// the authoritative guard against two credits for one license.
#[async_trait]
pub trait CreditLedger: Send + Sync {
    async fn find_salesman(&self, salesman_id: i64) -> Result<Option<Salesman>, RepoError>;

    async fn find_credit(&self, credit_id: i64) -> Result<Option<Credit>, RepoError>;

    async fn find_credit_by_license(&self, license_id: i64) -> Result<Option<Credit>, RepoError>;

    async fn credits_for_salesman(&self, salesman_id: i64) -> Result<Vec<Credit>, RepoError>;

    /// Insert a credit row. Fails with [`RepoError::Duplicate`] when the
    /// license already has one.
    async fn insert_credit(&self, data: CreditCreate) -> Result<Credit, RepoError>;

    /// Delete a credit row. Fails with [`RepoError::NotFound`] when absent.
    async fn delete_credit(&self, credit_id: i64) -> Result<(), RepoError>;
}

/// SQLite-backed ledger
#[derive(Clone)]
pub struct SqliteLedger {
    pool: SqlitePool,
}

impl SqliteLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CreditLedger for SqliteLedger {
    async fn find_salesman(&self, salesman_id: i64) -> Result<Option<Salesman>, RepoError> {
        salesman_repo::find_by_id(&self.pool, salesman_id).await
    }

    async fn find_credit(&self, credit_id: i64) -> Result<Option<Credit>, RepoError> {
        credit_repo::find_by_id(&self.pool, credit_id).await
    }

    async fn find_credit_by_license(&self, license_id: i64) -> Result<Option<Credit>, RepoError> {
        credit_repo::find_by_license_id(&self.pool, license_id).await
    }

    async fn credits_for_salesman(&self, salesman_id: i64) -> Result<Vec<Credit>, RepoError> {
        credit_repo::find_by_salesman_id(&self.pool, salesman_id).await
    }

    async fn insert_credit(&self, data: CreditCreate) -> Result<Credit, RepoError> {
        credit_repo::create(&self.pool, data).await
    }

    async fn delete_credit(&self, credit_id: i64) -> Result<(), RepoError> {
        credit_repo::delete(&self.pool, credit_id).await
    }
}
