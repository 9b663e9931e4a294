//! Credit API Handlers
//!
//! Thin callers of the credit engine. The one policy decision made here is
//! the suspension gate on issuance; access control stays out of the engine
//! so the limit logic remains orthogonal to it.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;

use crate::audit::{AuditAction, AuditSink};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::credit::{CallerToken, RemoteSyncWarning};
use crate::db::repository::{credit, salesman};
use crate::utils::{AppError, AppResult};
use shared::models::{Credit, CreditCreate};

/// Response for issue/revoke: the affected credit plus the warning attached
/// when the remote status flip or compensation failed. A present `warning`
/// means "the ledger changed, the remote flag is stale"; callers must not
/// read it as full success.
#[derive(Debug, serde::Serialize)]
pub struct CreditOutcomeResponse {
    pub credit: Credit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<RemoteSyncWarning>,
}

#[derive(Debug, serde::Serialize)]
pub struct ExposureResponse {
    pub salesman_id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub exposure: Decimal,
}

/// GET /api/credits - list all credits (admin)
pub async fn list(
    State(state): State<ServerState>,
    token: CallerToken,
) -> AppResult<Json<Vec<Credit>>> {
    let credits = credit::find_all(&state.pool).await?;

    state
        .audit
        .record(&token, AuditAction::Get, "Fetched all credits".to_string());

    Ok(Json(credits))
}

/// POST /api/credits - issue a credit (admin)
///
/// 201 on success. A body with a `warning` is a partial success: the ledger
/// row exists but the license is not flagged `on_credit` remotely.
pub async fn issue(
    State(state): State<ServerState>,
    token: CallerToken,
    Json(payload): Json<CreditCreate>,
) -> AppResult<(StatusCode, Json<CreditOutcomeResponse>)> {
    // Caller-layer gate: a suspended salesman gets no new credits. The
    // engine deliberately does not re-check this.
    let salesman = salesman::find_by_id(&state.pool, payload.salesman_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Salesman {}", payload.salesman_id)))?;
    if salesman.is_suspended() {
        return Err(AppError::forbidden(
            "This salesman is suspended and cannot receive new credits",
        ));
    }

    let outcome = state
        .engine
        .issue_credit(payload.salesman_id, payload.license_id, &token)
        .await?;

    let (credit, warning) = outcome.into_parts();
    Ok((
        StatusCode::CREATED,
        Json(CreditOutcomeResponse { credit, warning }),
    ))
}

/// GET /api/credits/:id - one credit (admin or owning salesman)
pub async fn get_by_id(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    token: CallerToken,
    Path(id): Path<i64>,
) -> AppResult<Json<Credit>> {
    let record = credit::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Credit record {id}")))?;

    authorize_salesman_access(&state, &current_user, record.salesman_id).await?;

    state.audit.record(
        &token,
        AuditAction::Get,
        format!("Fetched credit record <{id}>"),
    );

    Ok(Json(record))
}

/// DELETE /api/credits/:id - revoke a credit (admin)
///
/// The deletion is reported even when the compensating release of the
/// license fails; the `warning` names the license whose remote status may
/// now be stale.
pub async fn revoke(
    State(state): State<ServerState>,
    token: CallerToken,
    Path(id): Path<i64>,
) -> AppResult<Json<CreditOutcomeResponse>> {
    let outcome = state.engine.revoke_credit(id, &token).await?;

    let (credit, warning) = outcome.into_parts();
    Ok(Json(CreditOutcomeResponse { credit, warning }))
}

/// GET /api/credits/salesman/:salesman_id - credits by salesman (admin or self)
pub async fn by_salesman(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    token: CallerToken,
    Path(salesman_id): Path<i64>,
) -> AppResult<Json<Vec<Credit>>> {
    authorize_salesman_access(&state, &current_user, salesman_id).await?;

    let credits = credit::find_by_salesman_id(&state.pool, salesman_id).await?;

    state.audit.record(
        &token,
        AuditAction::Get,
        format!("Fetched credit records by salesman <{salesman_id}>"),
    );

    Ok(Json(credits))
}

/// GET /api/credits/salesman/:salesman_id/exposure - outstanding exposure
/// (admin or self)
pub async fn exposure(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    token: CallerToken,
    Path(salesman_id): Path<i64>,
) -> AppResult<Json<ExposureResponse>> {
    authorize_salesman_access(&state, &current_user, salesman_id).await?;

    let exposure = state.engine.exposure(salesman_id, &token).await?;

    state.audit.record(
        &token,
        AuditAction::Get,
        format!("Computed exposure for salesman <{salesman_id}>"),
    );

    Ok(Json(ExposureResponse {
        salesman_id,
        exposure,
    }))
}

/// Admins see every salesman's records; a salesman only their own.
async fn authorize_salesman_access(
    state: &ServerState,
    current_user: &CurrentUser,
    salesman_id: i64,
) -> AppResult<()> {
    if current_user.is_admin() {
        return Ok(());
    }
    let salesman = salesman::find_by_id(&state.pool, salesman_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Salesman {salesman_id}")))?;
    if salesman.user_id != current_user.id {
        return Err(AppError::forbidden(
            "You are not authorised to access this resource",
        ));
    }
    Ok(())
}
