use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::auth::extractor::AuthUser;
use crate::db::catalog;
use crate::db::entities::{self, Entity};
use crate::error::AppError;
use crate::models::{Branch, PriceType};
use crate::pagination::{Filter, ListQuery, PageMeta, PageParams};
use crate::response::{self, ApiResponse};
use crate::state::SharedState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchPayload {
    pub code: String,
    pub name: String,
    pub price_type: String,
    pub depreciation_months: Option<i32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchListQuery {
    #[serde(flatten)]
    pub list: ListQuery,
    pub price_type: Option<String>,
}

fn validate(req: &BranchPayload) -> Result<(String, String, PriceType, i32), AppError> {
    let code = super::normalize_code(&req.code, 3, "Branch code")?;
    super::require_non_empty(&req.name, "name")?;

    let price_type: PriceType = req.price_type.parse().map_err(AppError::BadRequest)?;

    let depreciation_months = req.depreciation_months.unwrap_or(0);
    if depreciation_months < 0 {
        return Err(AppError::BadRequest(
            "depreciationMonths must not be negative".to_string(),
        ));
    }

    Ok((
        code,
        req.name.trim().to_string(),
        price_type,
        depreciation_months,
    ))
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(q): Query<BranchListQuery>,
) -> Result<Json<ApiResponse<Vec<Branch>>>, AppError> {
    let params = PageParams::from_query(&q.list, Branch::DESC.default_sort);

    let mut filter = Filter::new();
    if let Some(term) = q.list.search_term() {
        filter = filter.search(Branch::DESC.searchable, term);
    }
    if let Some(raw) = q.price_type.as_deref() {
        let price_type: PriceType = raw.parse().map_err(AppError::BadRequest)?;
        filter = filter.eq("price_type", price_type.as_str());
    }

    let total = entities::count(&state.pool, Branch::DESC.table, &filter).await?;
    let branches = entities::list::<Branch>(&state.pool, &filter, &params).await?;

    Ok(response::page(
        branches,
        PageMeta::new(params.page, params.limit, total),
    ))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<BranchPayload>,
) -> Result<Json<ApiResponse<Branch>>, AppError> {
    auth.require_manager()?;
    let (code, name, price_type, depreciation_months) = validate(&req)?;

    entities::ensure_unique(&state.pool, Branch::DESC.table, "code", &code, None).await?;
    entities::ensure_unique(&state.pool, Branch::DESC.table, "name", &name, None).await?;

    let branch = catalog::create_branch(
        &state.pool,
        &code,
        &name,
        price_type.as_str(),
        depreciation_months,
    )
    .await?;
    Ok(response::ok(branch))
}

pub async fn get(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Branch>>, AppError> {
    let branch = entities::find_by_id::<Branch>(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Branch not found".to_string()))?;
    Ok(response::ok(branch))
}

pub async fn get_by_code(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<ApiResponse<Branch>>, AppError> {
    let branch = entities::find_by_key::<Branch>(&state.pool, &code.to_uppercase())
        .await?
        .ok_or_else(|| AppError::NotFound("Branch not found".to_string()))?;
    Ok(response::ok(branch))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(req): Json<BranchPayload>,
) -> Result<Json<ApiResponse<Branch>>, AppError> {
    auth.require_manager()?;
    let (code, name, price_type, depreciation_months) = validate(&req)?;

    entities::find_by_id::<Branch>(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Branch not found".to_string()))?;

    entities::ensure_unique(&state.pool, Branch::DESC.table, "code", &code, Some(id)).await?;
    entities::ensure_unique(&state.pool, Branch::DESC.table, "name", &name, Some(id)).await?;

    let branch = catalog::update_branch(
        &state.pool,
        id,
        &code,
        &name,
        price_type.as_str(),
        depreciation_months,
    )
    .await?;
    Ok(response::ok(branch))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    auth.require_manager()?;
    entities::delete::<Branch>(&state.pool, id).await?;
    Ok(response::message("Branch deleted"))
}

pub async fn stats(
    _auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let total = entities::count_all(&state.pool, Branch::DESC.table).await?;
    let rows = entities::count_grouped(&state.pool, Branch::DESC.table, "price_type").await?;

    let mut by_price_type = serde_json::Map::new();
    for (price_type, count) in rows {
        by_price_type.insert(price_type, json!(count));
    }

    Ok(response::ok(
        json!({ "total": total, "byPriceType": by_price_type }),
    ))
}
