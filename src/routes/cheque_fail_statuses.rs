use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::auth::extractor::AuthUser;
use crate::db::catalog;
use crate::db::entities::{self, Entity};
use crate::error::AppError;
use crate::models::ChequeFailStatus;
use crate::pagination::{Filter, ListQuery, PageMeta, PageParams};
use crate::response::{self, ApiResponse};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ChequeFailStatusPayload {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

fn validate(req: &ChequeFailStatusPayload) -> Result<(String, String), AppError> {
    let code = super::normalize_code(&req.code, 3, "Cheque fail status code")?;
    super::require_non_empty(&req.name, "name")?;
    Ok((code, req.name.trim().to_string()))
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<ChequeFailStatus>>>, AppError> {
    let params = PageParams::from_query(&q, ChequeFailStatus::DESC.default_sort);

    let mut filter = Filter::new();
    if let Some(term) = q.search_term() {
        filter = filter.search(ChequeFailStatus::DESC.searchable, term);
    }

    let total = entities::count(&state.pool, ChequeFailStatus::DESC.table, &filter).await?;
    let statuses = entities::list::<ChequeFailStatus>(&state.pool, &filter, &params).await?;

    Ok(response::page(
        statuses,
        PageMeta::new(params.page, params.limit, total),
    ))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<ChequeFailStatusPayload>,
) -> Result<Json<ApiResponse<ChequeFailStatus>>, AppError> {
    auth.require_manager()?;
    let (code, name) = validate(&req)?;

    entities::ensure_unique(&state.pool, ChequeFailStatus::DESC.table, "code", &code, None)
        .await?;
    entities::ensure_unique(&state.pool, ChequeFailStatus::DESC.table, "name", &name, None)
        .await?;

    let status = catalog::create_cheque_fail_status(
        &state.pool,
        &code,
        &name,
        req.description.as_deref().map(str::trim),
    )
    .await?;
    Ok(response::ok(status))
}

pub async fn get(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ChequeFailStatus>>, AppError> {
    let status = entities::find_by_id::<ChequeFailStatus>(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cheque fail status not found".to_string()))?;
    Ok(response::ok(status))
}

pub async fn get_by_code(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<ApiResponse<ChequeFailStatus>>, AppError> {
    let status = entities::find_by_key::<ChequeFailStatus>(&state.pool, &code.to_uppercase())
        .await?
        .ok_or_else(|| AppError::NotFound("Cheque fail status not found".to_string()))?;
    Ok(response::ok(status))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(req): Json<ChequeFailStatusPayload>,
) -> Result<Json<ApiResponse<ChequeFailStatus>>, AppError> {
    auth.require_manager()?;
    let (code, name) = validate(&req)?;

    entities::find_by_id::<ChequeFailStatus>(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cheque fail status not found".to_string()))?;

    entities::ensure_unique(
        &state.pool,
        ChequeFailStatus::DESC.table,
        "code",
        &code,
        Some(id),
    )
    .await?;
    entities::ensure_unique(
        &state.pool,
        ChequeFailStatus::DESC.table,
        "name",
        &name,
        Some(id),
    )
    .await?;

    let status = catalog::update_cheque_fail_status(
        &state.pool,
        id,
        &code,
        &name,
        req.description.as_deref().map(str::trim),
    )
    .await?;
    Ok(response::ok(status))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    auth.require_manager()?;
    entities::delete::<ChequeFailStatus>(&state.pool, id).await?;
    Ok(response::message("Cheque fail status deleted"))
}

pub async fn stats(
    _auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let total = entities::count_all(&state.pool, ChequeFailStatus::DESC.table).await?;
    Ok(response::ok(json!({ "total": total })))
}
