//! Salesman API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;

use crate::audit::{AuditAction, AuditSink};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::credit::CallerToken;
use crate::db::repository::salesman;
use crate::utils::{AppError, AppResult};
use shared::models::{Salesman, SalesmanCreate, SalesmanUpdate, SuspensionState};

/// GET /api/salesmen - list all salesmen (admin)
pub async fn list(State(state): State<ServerState>, token: CallerToken) -> AppResult<Json<Vec<Salesman>>> {
    let salesmen = salesman::find_all(&state.pool).await?;

    state
        .audit
        .record(&token, AuditAction::Get, "Fetched all salesmen".to_string());

    Ok(Json(salesmen))
}

/// POST /api/salesmen - register a salesman (admin)
///
/// The platform user must exist; the User directory's answer is relayed
/// verbatim if it refuses the lookup.
pub async fn register(
    State(state): State<ServerState>,
    token: CallerToken,
    Json(payload): Json<SalesmanCreate>,
) -> AppResult<Json<Salesman>> {
    if payload.credit_limit < Decimal::ZERO {
        return Err(AppError::validation("Credit limit must not be negative"));
    }

    state
        .users
        .fetch_user(payload.user_id, token.as_str())
        .await?;

    if salesman::find_by_user_id(&state.pool, payload.user_id)
        .await?
        .is_some()
    {
        return Err(AppError::conflict(
            "This user has already been registered as a salesman",
        ));
    }

    let salesman = salesman::create(&state.pool, payload).await?;

    state.audit.record(
        &token,
        AuditAction::Post,
        format!("Registered salesman <{}>", salesman.id),
    );

    Ok(Json(salesman))
}

/// GET /api/salesmen/:id - one salesman (admin or self)
pub async fn get_by_id(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    token: CallerToken,
    Path(id): Path<i64>,
) -> AppResult<Json<Salesman>> {
    let salesman = salesman::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Salesman {id}")))?;

    if !current_user.is_admin() && current_user.id != salesman.user_id {
        return Err(AppError::forbidden(
            "You are not authorised to view this salesman",
        ));
    }

    state.audit.record(
        &token,
        AuditAction::Get,
        format!("Fetched salesman <{id}>"),
    );

    Ok(Json(salesman))
}

/// GET /api/salesmen/user/:user_id - lookup by platform user (admin or self)
pub async fn get_by_user(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    token: CallerToken,
    Path(user_id): Path<i64>,
) -> AppResult<Json<Salesman>> {
    if !current_user.is_admin() && current_user.id != user_id {
        return Err(AppError::forbidden(
            "You are not authorised to view this salesman",
        ));
    }

    let salesman = salesman::find_by_user_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Salesman for user {user_id}")))?;

    state.audit.record(
        &token,
        AuditAction::Get,
        format!("Fetched salesman by user id <{user_id}>"),
    );

    Ok(Json(salesman))
}

/// PUT /api/salesmen/:id - edit the credit limit (admin)
pub async fn update_limit(
    State(state): State<ServerState>,
    token: CallerToken,
    Path(id): Path<i64>,
    Json(payload): Json<SalesmanUpdate>,
) -> AppResult<Json<Salesman>> {
    if payload.credit_limit < Decimal::ZERO {
        return Err(AppError::validation("Credit limit must not be negative"));
    }

    let salesman = salesman::update_limit(&state.pool, id, payload.credit_limit).await?;

    state.audit.record(
        &token,
        AuditAction::Put,
        format!("Updated salesman <{id}>"),
    );

    Ok(Json(salesman))
}

/// DELETE /api/salesmen/:id - remove a salesman (admin)
pub async fn remove(
    State(state): State<ServerState>,
    token: CallerToken,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let deleted = salesman::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::not_found(format!("Salesman {id}")));
    }

    state.audit.record(
        &token,
        AuditAction::Delete,
        format!("Deleted salesman <{id}>"),
    );

    Ok(Json(true))
}

/// PUT /api/salesmen/:id/suspend - block future credit issuance (admin)
pub async fn suspend(
    State(state): State<ServerState>,
    token: CallerToken,
    Path(id): Path<i64>,
) -> AppResult<Json<Salesman>> {
    let salesman = salesman::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Salesman {id}")))?;
    if salesman.is_suspended() {
        return Err(AppError::conflict("This salesman is already suspended"));
    }

    // Suspension only gates future issuance; credits already on the ledger
    // stay untouched.
    let salesman = salesman::set_suspension(&state.pool, id, SuspensionState::Suspended).await?;

    state.audit.record(
        &token,
        AuditAction::Put,
        format!("Suspended salesman <{id}>"),
    );

    Ok(Json(salesman))
}

/// PUT /api/salesmen/:id/restore - lift a suspension (admin)
pub async fn restore(
    State(state): State<ServerState>,
    token: CallerToken,
    Path(id): Path<i64>,
) -> AppResult<Json<Salesman>> {
    let salesman = salesman::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Salesman {id}")))?;
    if !salesman.is_suspended() {
        return Err(AppError::conflict("This salesman is not suspended"));
    }

    let salesman = salesman::set_suspension(&state.pool, id, SuspensionState::Restored).await?;

    state.audit.record(
        &token,
        AuditAction::Put,
        format!("Restored salesman <{id}>"),
    );

    Ok(Json(salesman))
}
