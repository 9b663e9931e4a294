//! Credit Repository

use super::{RepoError, RepoResult};
use shared::models::{Credit, CreditCreate};
use sqlx::SqlitePool;

const CREDIT_SELECT: &str =
    "SELECT id, salesman_id, license_id, created_at, updated_at FROM credit";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Credit>> {
    let sql = format!("{CREDIT_SELECT} ORDER BY id ASC");
    let rows = sqlx::query_as::<_, Credit>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Credit>> {
    let sql = format!("{CREDIT_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Credit>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_salesman_id(pool: &SqlitePool, salesman_id: i64) -> RepoResult<Vec<Credit>> {
    let sql = format!("{CREDIT_SELECT} WHERE salesman_id = ? ORDER BY id ASC");
    let rows = sqlx::query_as::<_, Credit>(&sql)
        .bind(salesman_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_license_id(pool: &SqlitePool, license_id: i64) -> RepoResult<Option<Credit>> {
    let sql = format!("{CREDIT_SELECT} WHERE license_id = ?");
    let row = sqlx::query_as::<_, Credit>(&sql)
        .bind(license_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Insert a credit row.
///
/// The unique index on `license_id` rejects a second credit for the same
/// license; that surfaces here as [`RepoError::Duplicate`].
pub async fn create(pool: &SqlitePool, data: CreditCreate) -> RepoResult<Credit> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO credit (id, salesman_id, license_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4)",
    )
    .bind(id)
    .bind(data.salesman_id)
    .bind(data.license_id)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create credit".into()))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM credit WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Credit {id} not found")));
    }
    Ok(())
}
