use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::auth::extractor::AuthUser;
use crate::db::catalog;
use crate::db::entities::{self, Entity};
use crate::error::AppError;
use crate::models::{AccountNumber, Bank};
use crate::pagination::{Filter, ListQuery, PageMeta, PageParams};
use crate::response::{self, ApiResponse};
use crate::state::SharedState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountNumberPayload {
    pub number: String,
    pub holder: String,
    pub bank_code: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountNumberListQuery {
    #[serde(flatten)]
    pub list: ListQuery,
    pub bank_code: Option<String>,
}

async fn validate(
    state: &SharedState,
    req: &AccountNumberPayload,
) -> Result<(String, String, String), AppError> {
    let number = req.number.trim().to_string();
    if number.len() < 5 || number.len() > 20 || !number.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::BadRequest(
            "Account number must be 5 to 20 digits".to_string(),
        ));
    }

    super::require_non_empty(&req.holder, "holder")?;

    let bank_code = super::normalize_code(&req.bank_code, 3, "Bank code")?;
    entities::find_by_key::<Bank>(&state.pool, &bank_code)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("Unknown bank code: {bank_code}")))?;

    Ok((number, req.holder.trim().to_string(), bank_code))
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(q): Query<AccountNumberListQuery>,
) -> Result<Json<ApiResponse<Vec<AccountNumber>>>, AppError> {
    let params = PageParams::from_query(&q.list, AccountNumber::DESC.default_sort);

    let mut filter = Filter::new();
    if let Some(term) = q.list.search_term() {
        filter = filter.search(AccountNumber::DESC.searchable, term);
    }
    if let Some(bank_code) = q.bank_code.as_deref() {
        filter = filter.eq("bank_code", bank_code.trim().to_uppercase());
    }

    let total = entities::count(&state.pool, AccountNumber::DESC.table, &filter).await?;
    let accounts = entities::list::<AccountNumber>(&state.pool, &filter, &params).await?;

    Ok(response::page(
        accounts,
        PageMeta::new(params.page, params.limit, total),
    ))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<AccountNumberPayload>,
) -> Result<Json<ApiResponse<AccountNumber>>, AppError> {
    auth.require_manager()?;
    let (number, holder, bank_code) = validate(&state, &req).await?;

    entities::ensure_unique(&state.pool, AccountNumber::DESC.table, "number", &number, None)
        .await?;

    let account = catalog::create_account_number(&state.pool, &number, &holder, &bank_code).await?;
    Ok(response::ok(account))
}

pub async fn get(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<AccountNumber>>, AppError> {
    let account = entities::find_by_id::<AccountNumber>(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Account number not found".to_string()))?;
    Ok(response::ok(account))
}

pub async fn get_by_number(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(number): Path<String>,
) -> Result<Json<ApiResponse<AccountNumber>>, AppError> {
    let account = entities::find_by_key::<AccountNumber>(&state.pool, number.trim())
        .await?
        .ok_or_else(|| AppError::NotFound("Account number not found".to_string()))?;
    Ok(response::ok(account))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(req): Json<AccountNumberPayload>,
) -> Result<Json<ApiResponse<AccountNumber>>, AppError> {
    auth.require_manager()?;
    let (number, holder, bank_code) = validate(&state, &req).await?;

    entities::find_by_id::<AccountNumber>(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Account number not found".to_string()))?;

    entities::ensure_unique(
        &state.pool,
        AccountNumber::DESC.table,
        "number",
        &number,
        Some(id),
    )
    .await?;

    let account =
        catalog::update_account_number(&state.pool, id, &number, &holder, &bank_code).await?;
    Ok(response::ok(account))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    auth.require_manager()?;
    entities::delete::<AccountNumber>(&state.pool, id).await?;
    Ok(response::message("Account number deleted"))
}

pub async fn stats(
    _auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let total = entities::count_all(&state.pool, AccountNumber::DESC.table).await?;
    let rows = entities::count_grouped(&state.pool, AccountNumber::DESC.table, "bank_code").await?;

    let mut by_bank = serde_json::Map::new();
    for (bank_code, count) in rows {
        by_bank.insert(bank_code, json!(count));
    }

    Ok(response::ok(json!({ "total": total, "byBank": by_bank })))
}
