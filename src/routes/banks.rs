use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::auth::extractor::AuthUser;
use crate::db::catalog;
use crate::db::entities::{self, Entity};
use crate::error::AppError;
use crate::models::Bank;
use crate::pagination::{Filter, ListQuery, PageMeta, PageParams};
use crate::response::{self, ApiResponse};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct BankPayload {
    pub code: String,
    pub name: String,
}

fn validate(req: &BankPayload) -> Result<(String, String), AppError> {
    let code = super::normalize_code(&req.code, 3, "Bank code")?;
    super::require_non_empty(&req.name, "name")?;
    Ok((code, req.name.trim().to_string()))
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<Bank>>>, AppError> {
    let params = PageParams::from_query(&q, Bank::DESC.default_sort);

    let mut filter = Filter::new();
    if let Some(term) = q.search_term() {
        filter = filter.search(Bank::DESC.searchable, term);
    }

    let total = entities::count(&state.pool, Bank::DESC.table, &filter).await?;
    let banks = entities::list::<Bank>(&state.pool, &filter, &params).await?;

    Ok(response::page(
        banks,
        PageMeta::new(params.page, params.limit, total),
    ))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<BankPayload>,
) -> Result<Json<ApiResponse<Bank>>, AppError> {
    auth.require_manager()?;
    let (code, name) = validate(&req)?;

    entities::ensure_unique(&state.pool, Bank::DESC.table, "code", &code, None).await?;
    entities::ensure_unique(&state.pool, Bank::DESC.table, "name", &name, None).await?;

    let bank = catalog::create_bank(&state.pool, &code, &name).await?;
    Ok(response::ok(bank))
}

pub async fn get(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Bank>>, AppError> {
    let bank = entities::find_by_id::<Bank>(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Bank not found".to_string()))?;
    Ok(response::ok(bank))
}

pub async fn get_by_code(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<ApiResponse<Bank>>, AppError> {
    let bank = entities::find_by_key::<Bank>(&state.pool, &code.to_uppercase())
        .await?
        .ok_or_else(|| AppError::NotFound("Bank not found".to_string()))?;
    Ok(response::ok(bank))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(req): Json<BankPayload>,
) -> Result<Json<ApiResponse<Bank>>, AppError> {
    auth.require_manager()?;
    let (code, name) = validate(&req)?;

    entities::find_by_id::<Bank>(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Bank not found".to_string()))?;

    entities::ensure_unique(&state.pool, Bank::DESC.table, "code", &code, Some(id)).await?;
    entities::ensure_unique(&state.pool, Bank::DESC.table, "name", &name, Some(id)).await?;

    let bank = catalog::update_bank(&state.pool, id, &code, &name).await?;
    Ok(response::ok(bank))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    auth.require_manager()?;
    entities::delete::<Bank>(&state.pool, id).await?;
    Ok(response::message("Bank deleted"))
}

pub async fn stats(
    _auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let total = entities::count_all(&state.pool, Bank::DESC.table).await?;
    let with_accounts =
        entities::count_with_children(&state.pool, &Bank::DESC, &Bank::DESC.child_refs[0]).await?;

    Ok(response::ok(json!({
        "total": total,
        "withAccounts": with_accounts,
        "withoutAccounts": total - with_accounts,
    })))
}
