use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::auth::extractor::AuthUser;
use crate::db::catalog::{self, PermissionFlags};
use crate::db::entities::{self, Entity};
use crate::error::AppError;
use crate::models::{Role, UserPermission, PERMISSION_MODULES};
use crate::pagination::{Filter, ListQuery, PageMeta, PageParams};
use crate::response::{self, ApiResponse};
use crate::state::SharedState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPermissionPayload {
    pub role: String,
    pub module: String,
    #[serde(default)]
    pub can_create: bool,
    #[serde(default = "default_true")]
    pub can_read: bool,
    #[serde(default)]
    pub can_update: bool,
    #[serde(default)]
    pub can_delete: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPermissionListQuery {
    #[serde(flatten)]
    pub list: ListQuery,
    pub role: Option<String>,
    pub module: Option<String>,
}

fn validate(req: &UserPermissionPayload) -> Result<(Role, String, PermissionFlags), AppError> {
    let role: Role = req.role.parse().map_err(AppError::BadRequest)?;

    let module = req.module.trim().to_lowercase();
    if !PERMISSION_MODULES.contains(&module.as_str()) {
        return Err(AppError::BadRequest(format!("Unknown module: {module}")));
    }

    Ok((
        role,
        module,
        PermissionFlags {
            can_create: req.can_create,
            can_read: req.can_read,
            can_update: req.can_update,
            can_delete: req.can_delete,
        },
    ))
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(q): Query<UserPermissionListQuery>,
) -> Result<Json<ApiResponse<Vec<UserPermission>>>, AppError> {
    auth.require_admin()?;

    let params = PageParams::from_query(&q.list, UserPermission::DESC.default_sort);

    let mut filter = Filter::new();
    if let Some(term) = q.list.search_term() {
        filter = filter.search(UserPermission::DESC.searchable, term);
    }
    if let Some(raw) = q.role.as_deref() {
        let role: Role = raw.parse().map_err(AppError::BadRequest)?;
        filter = filter.eq("role", role.as_str());
    }
    if let Some(module) = q.module.as_deref() {
        filter = filter.eq("module", module.trim().to_lowercase());
    }

    let total = entities::count(&state.pool, UserPermission::DESC.table, &filter).await?;
    let permissions = entities::list::<UserPermission>(&state.pool, &filter, &params).await?;

    Ok(response::page(
        permissions,
        PageMeta::new(params.page, params.limit, total),
    ))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<UserPermissionPayload>,
) -> Result<Json<ApiResponse<UserPermission>>, AppError> {
    auth.require_admin()?;
    let (role, module, flags) = validate(&req)?;

    if catalog::find_permission_pair(&state.pool, role.as_str(), &module, None)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!(
            "A permission for role '{role}' and module '{module}' already exists"
        )));
    }

    let permission =
        catalog::create_user_permission(&state.pool, role.as_str(), &module, &flags).await?;
    Ok(response::ok(permission))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<UserPermission>>, AppError> {
    auth.require_admin()?;
    let permission = entities::find_by_id::<UserPermission>(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User permission not found".to_string()))?;
    Ok(response::ok(permission))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(req): Json<UserPermissionPayload>,
) -> Result<Json<ApiResponse<UserPermission>>, AppError> {
    auth.require_admin()?;
    let (role, module, flags) = validate(&req)?;

    entities::find_by_id::<UserPermission>(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User permission not found".to_string()))?;

    if catalog::find_permission_pair(&state.pool, role.as_str(), &module, Some(id))
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!(
            "A permission for role '{role}' and module '{module}' already exists"
        )));
    }

    let permission =
        catalog::update_user_permission(&state.pool, id, role.as_str(), &module, &flags).await?;
    Ok(response::ok(permission))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    auth.require_admin()?;
    entities::delete::<UserPermission>(&state.pool, id).await?;
    Ok(response::message("User permission deleted"))
}

pub async fn stats(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    auth.require_admin()?;

    let total = entities::count_all(&state.pool, UserPermission::DESC.table).await?;
    let rows = entities::count_grouped(&state.pool, UserPermission::DESC.table, "module").await?;

    let mut by_module = serde_json::Map::new();
    for (module, count) in rows {
        by_module.insert(module, json!(count));
    }

    Ok(response::ok(json!({ "total": total, "byModule": by_module })))
}
