use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::auth::extractor::AuthUser;
use crate::db::catalog;
use crate::db::entities::{self, Entity};
use crate::error::AppError;
use crate::models::ReimbursementType;
use crate::pagination::{Filter, ListQuery, PageMeta, PageParams};
use crate::response::{self, ApiResponse};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ReimbursementTypePayload {
    pub code: String,
    pub name: String,
}

fn validate(req: &ReimbursementTypePayload) -> Result<(String, String), AppError> {
    let code = super::normalize_code(&req.code, 3, "Reimbursement type code")?;
    super::require_non_empty(&req.name, "name")?;
    Ok((code, req.name.trim().to_string()))
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<ReimbursementType>>>, AppError> {
    let params = PageParams::from_query(&q, ReimbursementType::DESC.default_sort);

    let mut filter = Filter::new();
    if let Some(term) = q.search_term() {
        filter = filter.search(ReimbursementType::DESC.searchable, term);
    }

    let total = entities::count(&state.pool, ReimbursementType::DESC.table, &filter).await?;
    let types = entities::list::<ReimbursementType>(&state.pool, &filter, &params).await?;

    Ok(response::page(
        types,
        PageMeta::new(params.page, params.limit, total),
    ))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<ReimbursementTypePayload>,
) -> Result<Json<ApiResponse<ReimbursementType>>, AppError> {
    auth.require_manager()?;
    let (code, name) = validate(&req)?;

    entities::ensure_unique(&state.pool, ReimbursementType::DESC.table, "code", &code, None)
        .await?;
    entities::ensure_unique(&state.pool, ReimbursementType::DESC.table, "name", &name, None)
        .await?;

    let rt = catalog::create_reimbursement_type(&state.pool, &code, &name).await?;
    Ok(response::ok(rt))
}

pub async fn get(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ReimbursementType>>, AppError> {
    let rt = entities::find_by_id::<ReimbursementType>(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Reimbursement type not found".to_string()))?;
    Ok(response::ok(rt))
}

pub async fn get_by_code(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<ApiResponse<ReimbursementType>>, AppError> {
    let rt = entities::find_by_key::<ReimbursementType>(&state.pool, &code.to_uppercase())
        .await?
        .ok_or_else(|| AppError::NotFound("Reimbursement type not found".to_string()))?;
    Ok(response::ok(rt))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(req): Json<ReimbursementTypePayload>,
) -> Result<Json<ApiResponse<ReimbursementType>>, AppError> {
    auth.require_manager()?;
    let (code, name) = validate(&req)?;

    entities::find_by_id::<ReimbursementType>(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Reimbursement type not found".to_string()))?;

    entities::ensure_unique(
        &state.pool,
        ReimbursementType::DESC.table,
        "code",
        &code,
        Some(id),
    )
    .await?;
    entities::ensure_unique(
        &state.pool,
        ReimbursementType::DESC.table,
        "name",
        &name,
        Some(id),
    )
    .await?;

    let rt = catalog::update_reimbursement_type(&state.pool, id, &code, &name).await?;
    Ok(response::ok(rt))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    auth.require_manager()?;
    entities::delete::<ReimbursementType>(&state.pool, id).await?;
    Ok(response::message("Reimbursement type deleted"))
}

pub async fn stats(
    _auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let total = entities::count_all(&state.pool, ReimbursementType::DESC.table).await?;
    Ok(response::ok(json!({ "total": total })))
}
