use std::sync::OnceLock;

use axum::extract::{Path, Query, State};
use axum::Json;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;

use crate::auth::extractor::AuthUser;
use crate::db::catalog;
use crate::db::entities::{self, Entity};
use crate::error::AppError;
use crate::models::Color;
use crate::pagination::{Filter, ListQuery, PageMeta, PageParams};
use crate::response::{self, ApiResponse};
use crate::state::SharedState;

static HEX_CODE: OnceLock<Regex> = OnceLock::new();

#[derive(Deserialize)]
pub struct ColorPayload {
    pub code: String,
    pub name: String,
}

fn validate(req: &ColorPayload) -> Result<(String, String), AppError> {
    let code = req.code.trim().to_uppercase();
    let re = HEX_CODE.get_or_init(|| Regex::new(r"^#[0-9A-F]{6}$").expect("valid hex regex"));
    if !re.is_match(&code) {
        return Err(AppError::BadRequest(
            "Color code must be a 7-character hex value like #A1B2C3".to_string(),
        ));
    }

    super::require_non_empty(&req.name, "name")?;
    Ok((code, req.name.trim().to_string()))
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<Color>>>, AppError> {
    let params = PageParams::from_query(&q, Color::DESC.default_sort);

    let mut filter = Filter::new();
    if let Some(term) = q.search_term() {
        filter = filter.search(Color::DESC.searchable, term);
    }

    let total = entities::count(&state.pool, Color::DESC.table, &filter).await?;
    let colors = entities::list::<Color>(&state.pool, &filter, &params).await?;

    Ok(response::page(
        colors,
        PageMeta::new(params.page, params.limit, total),
    ))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<ColorPayload>,
) -> Result<Json<ApiResponse<Color>>, AppError> {
    auth.require_manager()?;
    let (code, name) = validate(&req)?;

    entities::ensure_unique(&state.pool, Color::DESC.table, "code", &code, None).await?;
    entities::ensure_unique(&state.pool, Color::DESC.table, "name", &name, None).await?;

    let color = catalog::create_color(&state.pool, &code, &name).await?;
    Ok(response::ok(color))
}

pub async fn get(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Color>>, AppError> {
    let color = entities::find_by_id::<Color>(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Color not found".to_string()))?;
    Ok(response::ok(color))
}

pub async fn get_by_code(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<ApiResponse<Color>>, AppError> {
    let color = entities::find_by_key::<Color>(&state.pool, &code.to_uppercase())
        .await?
        .ok_or_else(|| AppError::NotFound("Color not found".to_string()))?;
    Ok(response::ok(color))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(req): Json<ColorPayload>,
) -> Result<Json<ApiResponse<Color>>, AppError> {
    auth.require_manager()?;
    let (code, name) = validate(&req)?;

    entities::find_by_id::<Color>(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Color not found".to_string()))?;

    entities::ensure_unique(&state.pool, Color::DESC.table, "code", &code, Some(id)).await?;
    entities::ensure_unique(&state.pool, Color::DESC.table, "name", &name, Some(id)).await?;

    let color = catalog::update_color(&state.pool, id, &code, &name).await?;
    Ok(response::ok(color))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    auth.require_manager()?;
    entities::delete::<Color>(&state.pool, id).await?;
    Ok(response::message("Color deleted"))
}

pub async fn stats(
    _auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let total = entities::count_all(&state.pool, Color::DESC.table).await?;
    Ok(response::ok(json!({ "total": total })))
}
