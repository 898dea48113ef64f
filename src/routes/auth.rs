use axum::extract::State;
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::extractor::AuthUser;
use crate::auth::jwt::{self, TokenKind, TokenPair};
use crate::auth::{hash_token, password};
use crate::db;
use crate::db::entities;
use crate::error::AppError;
use crate::models::{Role, User};
use crate::response::{self, ApiResponse};
use crate::state::SharedState;

// Credential failures never reveal which part was wrong.
const INVALID_CREDENTIALS: &str = "Invalid email or password";
const INVALID_REFRESH: &str = "Invalid or expired refresh token";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub username: String,
    pub phone: String,
    pub role: String,
    pub code: String,
    pub address: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginData {
    pub user: User,
    pub tokens: TokenPair,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

pub async fn register(
    State(state): State<SharedState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<User>>, AppError> {
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

    if code.is_empty() || code.len() > 10 {
        return Err(AppError::BadRequest(
            "code must be between 1 and 10 characters".to_string(),
        ));
    }

    let reasons = password::validate_strength(&req.password);
    if !reasons.is_empty() {
        return Err(AppError::Validation(reasons));
    }

    // Conflict reporting order: email, then username, phone, code.
    entities::ensure_unique(&state.pool, "users", "email", &email, None).await?;
    entities::ensure_unique(&state.pool, "users", "username", &username, None).await?;
    entities::ensure_unique(&state.pool, "users", "phone", &phone, None).await?;
    entities::ensure_unique(&state.pool, "users", "code", &code, None).await?;

    let password_hash = password::hash(&req.password).map_err(AppError::Internal)?;

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

    tracing::info!(user_id = user.id, "User registered");
    Ok(response::ok(user))
}

pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginData>>, AppError> {
    if state.login_limiter.check(&req.email).is_err() {
        return Err(AppError::RateLimited(
            "Too many login attempts. Please try again later.".to_string(),
        ));
    }

    let user = db::users::find_by_email(&state.pool, req.email.trim())
        .await?
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    let valid = password::verify(&req.password, &user.password_hash).map_err(AppError::Internal)?;
    if !valid {
        state.login_limiter.record_failure(&req.email);
        tracing::warn!(user_id = user.id, "Login failed: password mismatch");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let tokens = issue_and_store(&state, &user).await?;
    Ok(response::ok(LoginData { user, tokens }))
}

pub async fn refresh(
    State(state): State<SharedState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, AppError> {
    let claims = jwt::decode_token(&req.refresh_token, &state.config.jwt_secret).map_err(|e| {
        tracing::debug!("Refresh token rejected: {e}");
        AppError::Unauthorized(INVALID_REFRESH.to_string())
    })?;
    if claims.kind != TokenKind::Refresh {
        return Err(AppError::Unauthorized(INVALID_REFRESH.to_string()));
    }

    let token_hash = hash_token(&req.refresh_token);
    let stored = db::refresh_tokens::find_by_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| AppError::Unauthorized(INVALID_REFRESH.to_string()))?;

    if stored.revoked {
        tracing::warn!(
            user_id = stored.user_id,
            "Refresh token reuse detected, revoking all sessions"
        );
        db::refresh_tokens::revoke_all_for_user(&state.pool, stored.user_id).await?;
        return Err(AppError::Unauthorized(INVALID_REFRESH.to_string()));
    }
    if stored.expires_at < Utc::now() {
        return Err(AppError::Unauthorized(INVALID_REFRESH.to_string()));
    }

    let user = db::users::find_by_id(&state.pool, stored.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized(INVALID_REFRESH.to_string()))?;

    let config = &state.config;
    let tokens = jwt::issue_pair(
        &user,
        &config.jwt_secret,
        config.access_ttl_hours,
        config.refresh_ttl_days,
    )
    .map_err(AppError::Internal)?;

    let rotated = db::refresh_tokens::rotate(
        &state.pool,
        stored.id,
        user.id,
        &hash_token(&tokens.refresh_token),
        Utc::now() + Duration::days(config.refresh_ttl_days),
    )
    .await?;
    if !rotated {
        // A concurrent refresh consumed the row first.
        return Err(AppError::Unauthorized(INVALID_REFRESH.to_string()));
    }

    Ok(response::ok(tokens))
}

pub async fn logout(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<LogoutRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    match req.refresh_token {
        Some(token) => {
            db::refresh_tokens::revoke_by_hash(&state.pool, auth.user_id, &hash_token(&token))
                .await?;
        }
        None => {
            db::refresh_tokens::revoke_all_for_user(&state.pool, auth.user_id).await?;
        }
    }

    Ok(response::message("Logged out successfully"))
}

pub async fn change_password(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let user = db::users::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    let valid =
        password::verify(&req.current_password, &user.password_hash).map_err(AppError::Internal)?;
    if !valid {
        return Err(AppError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    let reasons = password::validate_strength(&req.new_password);
    if !reasons.is_empty() {
        return Err(AppError::Validation(reasons));
    }

    if password::verify(&req.new_password, &user.password_hash).map_err(AppError::Internal)? {
        return Err(AppError::BadRequest(
            "New password must be different from the current password".to_string(),
        ));
    }

    let password_hash = password::hash(&req.new_password).map_err(AppError::Internal)?;
    db::users::update_password(&state.pool, user.id, &password_hash).await?;

    // Every existing session must log in again.
    let revoked = db::refresh_tokens::revoke_all_for_user(&state.pool, user.id).await?;
    tracing::info!(user_id = user.id, revoked, "Password changed, sessions revoked");

    Ok(response::message("Password changed. Please log in again."))
}

pub async fn me(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let user = db::users::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;
    Ok(response::ok(user))
}

pub async fn revoke_all(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let revoked = db::refresh_tokens::revoke_all_for_user(&state.pool, auth.user_id).await?;
    Ok(response::ok(json!({ "revoked": revoked })))
}

pub async fn validate(auth: AuthUser) -> Json<ApiResponse<serde_json::Value>> {
    response::ok(json!({
        "valid": true,
        "user": {
            "userId": auth.user_id,
            "email": auth.email,
            "role": auth.role.as_str(),
            "code": auth.code,
        },
    }))
}

async fn issue_and_store(state: &SharedState, user: &User) -> Result<TokenPair, AppError> {
    let config = &state.config;
    let tokens = jwt::issue_pair(
        user,
        &config.jwt_secret,
        config.access_ttl_hours,
        config.refresh_ttl_days,
    )
    .map_err(AppError::Internal)?;

    db::refresh_tokens::create(
        &state.pool,
        user.id,
        &hash_token(&tokens.refresh_token),
        Utc::now() + Duration::days(config.refresh_ttl_days),
    )
    .await?;

    Ok(tokens)
}
