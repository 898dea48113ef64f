use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::auth::extractor::AuthUser;
use crate::auth::password;
use crate::db;
use crate::db::entities::{self, Entity};
use crate::error::AppError;
use crate::models::{Role, User};
use crate::pagination::{Filter, ListQuery, PageMeta, PageParams};
use crate::response::{self, ApiResponse};
use crate::state::SharedState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    #[serde(flatten)]
    pub list: ListQuery,
    pub role: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub username: String,
    pub phone: String,
    pub role: String,
    pub code: String,
    pub address: Option<String>,
    /// Omit to have a strong password generated and returned once.
    pub password: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub code: Option<String>,
    pub address: Option<String>,
    pub expense_limit: Option<i64>,
    pub discount_limit: Option<i64>,
    pub point: Option<i64>,
    pub balance: Option<i64>,
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(q): Query<UserListQuery>,
) -> Result<Json<ApiResponse<Vec<User>>>, AppError> {
    auth.require_admin()?;

    let params = PageParams::from_query(&q.list, User::DESC.default_sort);

    let mut filter = Filter::new();
    if let Some(term) = q.list.search_term() {
        filter = filter.search(User::DESC.searchable, term);
    }
    if let Some(raw) = q.role.as_deref() {
        let role: Role = raw.parse().map_err(AppError::BadRequest)?;
        filter = filter.eq("role", role.as_str());
    }

    let total = entities::count(&state.pool, User::DESC.table, &filter).await?;
    let users = entities::list::<User>(&state.pool, &filter, &params).await?;

    Ok(response::page(
        users,
        PageMeta::new(params.page, params.limit, total),
    ))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    auth.require_admin()?;

    let email = req.email.trim().to_string();
    let name = req.name.trim().to_string();
    let username = req.username.trim().to_string();
    let phone = req.phone.trim().to_string();
    let code = req.code.trim().to_uppercase();

    for (value, label) in [
        (&email, "email"),
        (&name, "name"),
        (&username, "username"),
        (&phone, "phone"),
    ] {
        super::require_non_empty(value, label)?;
    }
    if !email.contains('@') {
        return Err(AppError::BadRequest(
            "email must be a valid address".to_string(),
        ));
    }
    super::validate_phone_number(&phone, "phone")?;

    let role: Role = req.role.parse().map_err(AppError::BadRequest)?;
    if role.rank() > auth.role.rank() {
        return Err(AppError::Forbidden(
            "Cannot create a user with a more privileged role".to_string(),
        ));
    }

    if code.is_empty() || code.len() > 10 {
        return Err(AppError::BadRequest(
            "code must be between 1 and 10 characters".to_string(),
        ));
    }

    let (plain, generated) = match req.password {
        Some(password) => (password, false),
        None => (password::generate(12), true),
    };
    let reasons = password::validate_strength(&plain);
    if !reasons.is_empty() {
        return Err(AppError::Validation(reasons));
    }

    entities::ensure_unique(&state.pool, "users", "email", &email, None).await?;
    entities::ensure_unique(&state.pool, "users", "username", &username, None).await?;
    entities::ensure_unique(&state.pool, "users", "phone", &phone, None).await?;
    entities::ensure_unique(&state.pool, "users", "code", &code, None).await?;

    let password_hash = password::hash(&plain).map_err(AppError::Internal)?;

    let user = db::users::create(
        &state.pool,
        &db::users::NewUser {
            code: &code,
            name: &name,
            email: &email,
            username: &username,
            phone: &phone,
            address: req.address.as_deref(),
            password_hash: &password_hash,
            role: role.as_str(),
        },
    )
    .await?;

    tracing::info!(user_id = user.id, actor = auth.user_id, "User created");

    let mut data = json!({ "user": user });
    if generated {
        data["generatedPassword"] = json!(plain);
    }
    Ok(response::ok(data))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    auth.require_admin()?;
    let user = db::users::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(response::ok(user))
}

pub async fn get_by_code(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    auth.require_admin()?;
    let user = entities::find_by_key::<User>(&state.pool, &code.to_uppercase())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(response::ok(user))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    auth.require_admin()?;

    let target = db::users::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let target_role: Role = target
        .role
        .parse()
        .map_err(|_| AppError::Internal(format!("Unknown stored role: {}", target.role)))?;
    if target_role.rank() > auth.role.rank() {
        return Err(AppError::Forbidden(
            "Cannot modify a user with a more privileged role".to_string(),
        ));
    }

    let role = match req.role.as_deref() {
        Some(raw) => {
            let role: Role = raw.parse().map_err(AppError::BadRequest)?;
            if role.rank() > auth.role.rank() {
                return Err(AppError::Forbidden(
                    "Cannot assign a more privileged role".to_string(),
                ));
            }
            Some(role)
        }
        None => None,
    };

    let email = req.email.as_deref().map(str::trim);
    let username = req.username.as_deref().map(str::trim);
    let phone = req.phone.as_deref().map(str::trim);
    let code = req.code.as_deref().map(|c| c.trim().to_uppercase());

    if let Some(email) = email {
        if !email.contains('@') {
            return Err(AppError::BadRequest(
                "email must be a valid address".to_string(),
            ));
        }
        entities::ensure_unique(&state.pool, "users", "email", email, Some(id)).await?;
    }
    if let Some(username) = username {
        super::require_non_empty(username, "username")?;
        entities::ensure_unique(&state.pool, "users", "username", username, Some(id)).await?;
    }
    if let Some(phone) = phone {
        super::validate_phone_number(phone, "phone")?;
        entities::ensure_unique(&state.pool, "users", "phone", phone, Some(id)).await?;
    }
    if let Some(code) = code.as_deref() {
        if code.is_empty() || code.len() > 10 {
            return Err(AppError::BadRequest(
                "code must be between 1 and 10 characters".to_string(),
            ));
        }
        entities::ensure_unique(&state.pool, "users", "code", code, Some(id)).await?;
    }

    let user = db::users::update(
        &state.pool,
        id,
        &db::users::UserChanges {
            code: code.as_deref(),
            name: req.name.as_deref().map(str::trim),
            email,
            username,
            phone,
            address: req.address.as_deref(),
            role: role.map(Role::as_str),
            expense_limit: req.expense_limit,
            discount_limit: req.discount_limit,
            point: req.point,
            balance: req.balance,
        },
    )
    .await?;

    Ok(response::ok(user))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    auth.require_admin()?;

    if id == auth.user_id {
        return Err(AppError::Forbidden(
            "You cannot delete your own account".to_string(),
        ));
    }

    let target = db::users::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let target_role: Role = target
        .role
        .parse()
        .map_err(|_| AppError::Internal(format!("Unknown stored role: {}", target.role)))?;
    if target_role.rank() > auth.role.rank() {
        return Err(AppError::Forbidden(
            "Cannot delete a user with a more privileged role".to_string(),
        ));
    }

    // Hard delete; refresh tokens go with the row via the FK cascade.
    db::users::delete(&state.pool, id).await?;
    tracing::info!(user_id = id, actor = auth.user_id, "User deleted");

    Ok(response::message("User deleted"))
}

pub async fn stats(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    auth.require_admin()?;

    let total = entities::count_all(&state.pool, User::DESC.table).await?;
    let rows = entities::count_grouped(&state.pool, User::DESC.table, "role").await?;

    let mut by_role = serde_json::Map::new();
    for (role, count) in rows {
        by_role.insert(role, json!(count));
    }

    Ok(response::ok(json!({ "total": total, "byRole": by_role })))
}
