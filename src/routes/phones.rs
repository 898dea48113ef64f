use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::auth::extractor::AuthUser;
use crate::db::catalog;
use crate::db::entities::{self, Entity};
use crate::error::AppError;
use crate::models::{Phone, PhoneModule};
use crate::pagination::{Filter, ListQuery, PageMeta, PageParams};
use crate::response::{self, ApiResponse};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct PhonePayload {
    pub number: String,
    pub owner: String,
    pub module: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneListQuery {
    #[serde(flatten)]
    pub list: ListQuery,
    pub module: Option<String>,
}

fn validate(req: &PhonePayload) -> Result<(String, String, PhoneModule), AppError> {
    let number = req.number.trim().to_string();
    super::validate_phone_number(&number, "number")?;

    super::require_non_empty(&req.owner, "owner")?;
    let module: PhoneModule = req.module.parse().map_err(AppError::BadRequest)?;

    Ok((number, req.owner.trim().to_string(), module))
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(q): Query<PhoneListQuery>,
) -> Result<Json<ApiResponse<Vec<Phone>>>, AppError> {
    let params = PageParams::from_query(&q.list, Phone::DESC.default_sort);

    let mut filter = Filter::new();
    if let Some(term) = q.list.search_term() {
        filter = filter.search(Phone::DESC.searchable, term);
    }
    if let Some(raw) = q.module.as_deref() {
        let module: PhoneModule = raw.parse().map_err(AppError::BadRequest)?;
        filter = filter.eq("module", module.as_str());
    }

    let total = entities::count(&state.pool, Phone::DESC.table, &filter).await?;
    let phones = entities::list::<Phone>(&state.pool, &filter, &params).await?;

    Ok(response::page(
        phones,
        PageMeta::new(params.page, params.limit, total),
    ))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<PhonePayload>,
) -> Result<Json<ApiResponse<Phone>>, AppError> {
    auth.require_manager()?;
    let (number, owner, module) = validate(&req)?;

    entities::ensure_unique(&state.pool, Phone::DESC.table, "number", &number, None).await?;

    let phone = catalog::create_phone(&state.pool, &number, &owner, module.as_str()).await?;
    Ok(response::ok(phone))
}

pub async fn get(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Phone>>, AppError> {
    let phone = entities::find_by_id::<Phone>(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Phone not found".to_string()))?;
    Ok(response::ok(phone))
}

pub async fn get_by_number(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(number): Path<String>,
) -> Result<Json<ApiResponse<Phone>>, AppError> {
    let phone = entities::find_by_key::<Phone>(&state.pool, number.trim())
        .await?
        .ok_or_else(|| AppError::NotFound("Phone not found".to_string()))?;
    Ok(response::ok(phone))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(req): Json<PhonePayload>,
) -> Result<Json<ApiResponse<Phone>>, AppError> {
    auth.require_manager()?;
    let (number, owner, module) = validate(&req)?;

    entities::find_by_id::<Phone>(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Phone not found".to_string()))?;

    entities::ensure_unique(&state.pool, Phone::DESC.table, "number", &number, Some(id)).await?;

    let phone = catalog::update_phone(&state.pool, id, &number, &owner, module.as_str()).await?;
    Ok(response::ok(phone))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    auth.require_manager()?;
    entities::delete::<Phone>(&state.pool, id).await?;
    Ok(response::message("Phone deleted"))
}

pub async fn stats(
    _auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let total = entities::count_all(&state.pool, Phone::DESC.table).await?;
    let rows = entities::count_grouped(&state.pool, Phone::DESC.table, "module").await?;

    let mut by_module = serde_json::Map::new();
    for (module, count) in rows {
        by_module.insert(module, json!(count));
    }

    Ok(response::ok(json!({ "total": total, "byModule": by_module })))
}
