//! Salesman Repository

use super::{RepoError, RepoResult};
use rust_decimal::Decimal;
use shared::models::{Salesman, SalesmanCreate, SuspensionState};
use sqlx::SqlitePool;

const SALESMAN_SELECT: &str =
    "SELECT id, user_id, credit_limit, suspension, created_at, updated_at FROM salesman";

/// Raw row. `credit_limit` comes back as the canonical decimal string it was
/// stored as; `suspension` as its integer code.
#[derive(sqlx::FromRow)]
struct SalesmanRow {
    id: i64,
    user_id: i64,
    credit_limit: String,
    suspension: i64,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<SalesmanRow> for Salesman {
    type Error = RepoError;

    fn try_from(row: SalesmanRow) -> Result<Self, RepoError> {
        let credit_limit = row.credit_limit.parse::<Decimal>().map_err(|e| {
            RepoError::Database(format!("corrupt credit_limit for salesman {}: {e}", row.id))
        })?;
        let suspension = SuspensionState::from_code(row.suspension).ok_or_else(|| {
            RepoError::Database(format!(
                "corrupt suspension code {} for salesman {}",
                row.suspension, row.id
            ))
        })?;
        Ok(Salesman {
            id: row.id,
            user_id: row.user_id,
            credit_limit,
            suspension,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Salesman>> {
    let sql = format!("{SALESMAN_SELECT} ORDER BY id DESC");
    let rows = sqlx::query_as::<_, SalesmanRow>(&sql).fetch_all(pool).await?;
    rows.into_iter().map(Salesman::try_from).collect()
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Salesman>> {
    let sql = format!("{SALESMAN_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, SalesmanRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(Salesman::try_from).transpose()
}

pub async fn find_by_user_id(pool: &SqlitePool, user_id: i64) -> RepoResult<Option<Salesman>> {
    let sql = format!("{SALESMAN_SELECT} WHERE user_id = ?");
    let row = sqlx::query_as::<_, SalesmanRow>(&sql)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    row.map(Salesman::try_from).transpose()
}

pub async fn create(pool: &SqlitePool, data: SalesmanCreate) -> RepoResult<Salesman> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO salesman (id, user_id, credit_limit, suspension, created_at, updated_at) VALUES (?1, ?2, ?3, 0, ?4, ?4)",
    )
    .bind(id)
    .bind(data.user_id)
    .bind(data.credit_limit.to_string())
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create salesman".into()))
}

pub async fn update_limit(
    pool: &SqlitePool,
    id: i64,
    credit_limit: Decimal,
) -> RepoResult<Salesman> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE salesman SET credit_limit = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(credit_limit.to_string())
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Salesman {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Salesman {id} not found")))
}

pub async fn set_suspension(
    pool: &SqlitePool,
    id: i64,
    state: SuspensionState,
) -> RepoResult<Salesman> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE salesman SET suspension = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(state.code())
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Salesman {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Salesman {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM salesman WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
